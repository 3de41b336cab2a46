//! Integration tests for the full mapping pipeline.
//!
//! These run annotate, normalize, link and resolve end to end against the
//! in-memory services, so they exercise batching and provenance without a
//! network.

use std::sync::Arc;

use serde_json::{Value, json};

use biomap::annotate::AnnotationMode;
use biomap::services::{MockKestrel, MockRefMet, RefMetRecord, SearchHit, SearchKind};
use biomap::vocab::{VocabRegistry, Vocabulary};
use biomap::{Dataset, Entity, KgMapper, MapperConfig, MapperError, MappingOptions, Normalizer};

// =============================================================================
// Test Fixtures
// =============================================================================

/// Kestrel mock that knows carnitine and its aliases.
fn kestrel() -> Arc<MockKestrel> {
    Arc::new(
        MockKestrel::new()
            .with_canonical("HMDB:HMDB0000062", "CHEBI:16347")
            .with_canonical("CHEBI:16347", "CHEBI:16347")
            .with_canonical("CHEBI:17126", "CHEBI:17126")
            .with_canonical("PUBCHEM.COMPOUND:10917", "CHEBI:16347")
            .with_hits("carnitine", vec![SearchHit::new("CHEBI:16347", 2.0)])
            .with_hits("glucose", vec![SearchHit::new("CHEBI:17126", 1.5)]),
    )
}

/// RefMet mock with a record for carnitine.
fn refmet() -> Arc<MockRefMet> {
    Arc::new(MockRefMet::new().with_record(
        "carnitine",
        RefMetRecord {
            refmet_id: Some("RM0008606".to_string()),
            pubchem_cid: Some("10917".to_string()),
            ..Default::default()
        },
    ))
}

fn mapper_with(kestrel: Arc<MockKestrel>, refmet: Arc<MockRefMet>) -> KgMapper {
    KgMapper::with_services(MapperConfig::default(), kestrel.clone(), kestrel, refmet)
}

/// Mixed dataset: provided ids, a dash, a sentinel, no ids at all.
fn metabolites() -> Dataset {
    Dataset::new(vec![
        Entity::new().with("name", "carnitine").with("hmdb", "HMDB0000062"),
        Entity::new().with("name", "glucose").with("hmdb", "-"),
        Entity::new().with("name", "carnitine").with("hmdb", Value::Null),
        Entity::new().with("name", "unknown thing").with("hmdb", "NO_MATCH"),
        Entity::new().with("name", "glucose").with("hmdb", "not an id"),
    ])
}

fn kegg_compound_id(local_id: &str) -> bool {
    local_id.len() == 6
        && local_id.starts_with('C')
        && local_id[1..].chars().all(|c| c.is_ascii_digit())
}

fn positive_integer(local_id: &str) -> bool {
    local_id.parse::<u64>().is_ok_and(|n| n > 0)
}

/// Registry with just the two vocabularies of the carnitine example.
fn carnitine_registry() -> Arc<VocabRegistry> {
    Arc::new(VocabRegistry::from_vocabularies([
        Vocabulary::new("KEGG.COMPOUND", kegg_compound_id)
            .with_iri("http://identifiers.org/kegg.compound/"),
        Vocabulary::new("PUBCHEM.COMPOUND", positive_integer)
            .with_iri("http://identifiers.org/pubchem.compound/"),
    ]))
}

// =============================================================================
// Batch Equivalence
// =============================================================================

#[test]
fn test_dataset_rows_equal_single_entity_results() {
    let mapper = mapper_with(kestrel(), refmet());
    let options = MappingOptions::new("name", "metabolite").with_provided_id_fields(["hmdb"]);
    let dataset = metabolites();

    let mapped = mapper
        .map_dataset(&dataset, &options)
        .expect("dataset mapping should succeed");

    assert_eq!(mapped.len(), dataset.len());
    for (row, entity) in mapped.iter().zip(dataset.iter()) {
        let single = mapper
            .map_entity(entity, &options)
            .expect("entity mapping should succeed");
        assert_eq!(row, &single);
    }
}

#[test]
fn test_dataset_input_is_not_modified() {
    let mapper = mapper_with(kestrel(), refmet());
    let options = MappingOptions::new("name", "metabolite")
        .with_provided_id_fields(["hmdb"])
        .with_annotation_mode(AnnotationMode::All);
    let dataset = metabolites();
    let before = dataset.clone();

    let mapped = mapper.map_dataset(&dataset, &options).expect("mapping should succeed");

    assert_eq!(dataset, before);
    assert_eq!(mapped.rows[3].entity.get("hmdb"), Some(&Value::Null));
    assert_eq!(dataset.rows[3].get("hmdb"), Some(&json!("NO_MATCH")));
}

#[test]
fn test_empty_dataset_maps_to_empty_result() {
    let service = kestrel();
    let mapper = mapper_with(service.clone(), refmet());
    let options = MappingOptions::new("name", "metabolite").with_provided_id_fields(["hmdb"]);

    let mapped = mapper
        .map_dataset(&Dataset::default(), &options)
        .expect("mapping should succeed");

    assert!(mapped.is_empty());
    assert_eq!(service.canonicalize_calls(), 0);
    assert_eq!(service.search_calls(), 0);
}

// =============================================================================
// Batching
// =============================================================================

#[test]
fn test_dataset_canonicalizes_once() {
    let service = kestrel();
    let mapper = mapper_with(service.clone(), refmet());
    let options = MappingOptions::new("name", "metabolite")
        .with_provided_id_fields(["hmdb"])
        .with_annotation_mode(AnnotationMode::All);

    mapper.map_dataset(&metabolites(), &options).expect("mapping should succeed");

    assert_eq!(service.canonicalize_calls(), 1);
    let request = &service.canonicalize_requests()[0];
    let mut sorted = request.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(request, &sorted, "request should be sorted and unique");
}

#[test]
fn test_dataset_searches_each_name_once() {
    let service = kestrel();
    let mapper = mapper_with(service.clone(), refmet());
    let options = MappingOptions::new("name", "metabolite")
        .with_provided_id_fields(["hmdb"])
        .with_annotation_mode(AnnotationMode::All)
        .with_annotators(["kestrel-text-search"]);

    mapper.map_dataset(&metabolites(), &options).expect("mapping should succeed");

    assert_eq!(service.search_calls(), 1);
    assert_eq!(service.search_calls_for(SearchKind::Text), 1);
    assert_eq!(
        service.search_requests()[0].search_text,
        vec!["carnitine", "glucose", "unknown thing"]
    );
}

// =============================================================================
// Annotation Modes
// =============================================================================

/// Ten rows, seven of which carry a provided HMDB id.
fn ten_rows() -> Dataset {
    Dataset::new(
        (0..10)
            .map(|i| {
                let hmdb = if i < 7 { json!("HMDB0000062") } else { json!("") };
                Entity::new().with("name", format!("metabolite {}", i)).with("hmdb", hmdb)
            })
            .collect(),
    )
}

fn annotated_rows(mode: AnnotationMode) -> (usize, Arc<MockKestrel>) {
    let service = kestrel();
    let mapper = mapper_with(service.clone(), refmet());
    let options = MappingOptions::new("name", "metabolite")
        .with_provided_id_fields(["hmdb"])
        .with_annotation_mode(mode)
        .with_annotators(["kestrel-text-search"]);

    let mapped = mapper.map_dataset(&ten_rows(), &options).expect("mapping should succeed");
    assert_eq!(mapped.len(), 10);
    let annotated = mapped.iter().filter(|row| !row.assigned_ids.is_empty()).count();
    (annotated, service)
}

#[test]
fn test_mode_missing_annotates_rows_without_ids() {
    let (annotated, service) = annotated_rows(AnnotationMode::Missing);
    assert_eq!(annotated, 3);
    assert_eq!(service.search_requests()[0].search_text.len(), 3);
}

#[test]
fn test_mode_all_annotates_every_row() {
    let (annotated, service) = annotated_rows(AnnotationMode::All);
    assert_eq!(annotated, 10);
    assert_eq!(service.search_requests()[0].search_text.len(), 10);
}

#[test]
fn test_mode_none_annotates_nothing() {
    let (annotated, service) = annotated_rows(AnnotationMode::None);
    assert_eq!(annotated, 0);
    assert_eq!(service.search_calls(), 0);
}

#[test]
fn test_mode_parses_from_str() {
    assert_eq!("missing".parse::<AnnotationMode>().ok(), Some(AnnotationMode::Missing));
    assert_eq!("all".parse::<AnnotationMode>().ok(), Some(AnnotationMode::All));
    assert_eq!("none".parse::<AnnotationMode>().ok(), Some(AnnotationMode::None));
    assert!(matches!(
        "sometimes".parse::<AnnotationMode>(),
        Err(MapperError::InvalidMode(_))
    ));
}

// =============================================================================
// Normalization Through the Mapper
// =============================================================================

#[test]
fn test_carnitine_provided_curies() {
    let mapper =
        mapper_with(kestrel(), refmet()).with_normalizer(Normalizer::with_registry(carnitine_registry()));
    let entity = Entity::new()
        .with("name", "carnitine")
        .with("kegg", json!(["C00487"]))
        .with("pubchem", "10917");
    let options =
        MappingOptions::new("name", "metabolite").with_provided_id_fields(["kegg", "pubchem"]);

    let mapped = mapper.map_entity(&entity, &options).expect("mapping should succeed");

    assert_eq!(
        mapped.normalization.curies_provided,
        vec!["KEGG.COMPOUND:C00487", "PUBCHEM.COMPOUND:10917"]
    );
    assert!(mapped.normalization.invalid_ids_provided.is_empty());
    assert_eq!(
        mapped.normalization.iris.get("KEGG.COMPOUND:C00487").map(String::as_str),
        Some("http://identifiers.org/kegg.compound/C00487")
    );
}

#[test]
fn test_dash_values_are_absent_not_invalid() {
    let mapper = mapper_with(kestrel(), refmet());
    let options = MappingOptions::new("name", "metabolite")
        .with_provided_id_fields(["hmdb"])
        .with_annotation_mode(AnnotationMode::None);

    for dash in ["-", "\u{2013}", " \u{2014} "] {
        let entity = Entity::new().with("name", "glucose").with("hmdb", dash);
        let mapped = mapper.map_entity(&entity, &options).expect("mapping should succeed");
        assert!(mapped.normalization.curies_provided.is_empty(), "dash {:?}", dash);
        assert!(mapped.normalization.invalid_ids_provided.is_empty(), "dash {:?}", dash);
    }
}

#[test]
fn test_invalid_ids_are_reported_per_field() {
    let mapper = mapper_with(kestrel(), refmet());
    let options = MappingOptions::new("name", "metabolite")
        .with_provided_id_fields(["hmdb"])
        .with_annotation_mode(AnnotationMode::None);
    let entity = Entity::new().with("name", "glucose").with("hmdb", "HMDB0000062;not an id");

    let mapped = mapper.map_entity(&entity, &options).expect("mapping should succeed");

    assert_eq!(mapped.normalization.curies_provided, vec!["HMDB:HMDB0000062"]);
    assert_eq!(mapped.normalization.invalid_ids_provided["hmdb"], vec!["not an id"]);
}

#[test]
fn test_stop_on_invalid_id_aborts_dataset() {
    let mapper = mapper_with(kestrel(), refmet());
    let options = MappingOptions::new("name", "metabolite")
        .with_provided_id_fields(["hmdb"])
        .with_annotation_mode(AnnotationMode::None)
        .with_stop_on_invalid_id(true);

    let result = mapper.map_dataset(&metabolites(), &options);
    assert!(matches!(result, Err(MapperError::InvalidIdentifier { .. })));
}

// =============================================================================
// Annotators and Resolution
// =============================================================================

#[test]
fn test_small_molecules_use_workbench_and_fallback() {
    let refmet = refmet();
    let mapper = mapper_with(kestrel(), refmet.clone());
    let entity = Entity::new().with("name", "carnitine");
    let options = MappingOptions::new("name", "metabolite").with_provided_id_fields(["hmdb"]);

    let mapped = mapper.map_entity(&entity, &options).expect("mapping should succeed");

    assert_eq!(refmet.calls(), 1);
    assert!(mapped.assigned_ids.contains("metabolomics-workbench", "refmet_id", "RM0008606"));
    assert!(mapped.assigned_ids.contains("metabolomics-workbench", "pubchem_cid", "10917"));
    assert!(mapped.assigned_ids.contains("kestrel-hybrid-search", "CHEBI", "16347"));
    assert_eq!(mapped.resolution.chosen_kg_id_assigned.as_deref(), Some("CHEBI:16347"));
    assert_eq!(mapped.resolution.chosen_kg_id.as_deref(), Some("CHEBI:16347"));
    assert_eq!(mapped.resolution.chosen_kg_id_provided, None);
}

#[test]
fn test_unknown_annotator_is_rejected() {
    let mapper = mapper_with(kestrel(), refmet());
    let options = MappingOptions::new("name", "metabolite").with_annotators(["no-such-source"]);

    let result = mapper.map_entity(&Entity::new().with("name", "carnitine"), &options);
    assert!(matches!(result, Err(MapperError::UnknownAnnotator(slug)) if slug == "no-such-source"));
}

#[test]
fn test_failing_workbench_degrades_to_empty_annotation() {
    let refmet = refmet();
    refmet.set_failing(true);
    let mapper = mapper_with(kestrel(), refmet);
    let options = MappingOptions::new("name", "metabolite").with_annotators(["metabolomics-workbench"]);

    let mapped = mapper
        .map_entity(&Entity::new().with("name", "carnitine"), &options)
        .expect("a failing source should not abort mapping");

    assert_eq!(mapped.assigned_ids.len(), 0);
    assert!(mapped.normalization.curies.is_empty());
    assert_eq!(mapped.resolution.chosen_kg_id, None);
}

#[test]
fn test_majority_vote_picks_node() {
    let service = Arc::new(
        MockKestrel::new()
            .with_canonical("HMDB:HMDB0000062", "nodeA")
            .with_canonical("PUBCHEM.COMPOUND:10917", "nodeA")
            .with_canonical("CHEBI:17126", "nodeB"),
    );
    let mapper = mapper_with(service, refmet());
    let entity = Entity::new()
        .with("name", "carnitine")
        .with("hmdb", "HMDB0000062")
        .with("pubchem", "10917")
        .with("chebi", "CHEBI:17126");
    let options = MappingOptions::new("name", "metabolite")
        .with_provided_id_fields(["hmdb", "pubchem", "chebi"])
        .with_annotation_mode(AnnotationMode::None);

    let mapped = mapper.map_entity(&entity, &options).expect("mapping should succeed");

    assert_eq!(mapped.links.kg_ids["nodeA"].len(), 2);
    assert_eq!(mapped.links.kg_ids["nodeB"].len(), 1);
    assert_eq!(mapped.resolution.chosen_kg_id.as_deref(), Some("nodeA"));
    assert_eq!(mapped.resolution.chosen_kg_id_provided.as_deref(), Some("nodeA"));
}

#[test]
fn test_to_dataset_keeps_row_order() {
    let mapper = mapper_with(kestrel(), refmet());
    let options = MappingOptions::new("name", "metabolite").with_provided_id_fields(["hmdb"]);

    let merged = mapper
        .map_dataset(&metabolites(), &options)
        .expect("mapping should succeed")
        .to_dataset()
        .expect("stage outputs should serialize");

    let names: Vec<&str> = merged.iter().filter_map(|row| row.text("name")).collect();
    assert_eq!(names, vec!["carnitine", "glucose", "carnitine", "unknown thing", "glucose"]);
    assert!(merged.columns.iter().any(|c| c == "chosen_kg_id"));
}
