//! In-memory services for testing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;

use crate::error::{MapperError, Result};

use super::service::{
    CanonicalMap, KgService, RefMetRecord, RefMetService, SearchHit, SearchKind, SearchRequest,
    SearchResults, SearchService,
};

/// Mock KG service with fixed canonicalization and search answers.
///
/// Records every request so tests can assert how many round trips a stage
/// made and what it asked for.
#[derive(Default)]
pub struct MockKestrel {
    canonical: CanonicalMap,
    hits: HashMap<String, Vec<SearchHit>>,
    canonicalize_requests: Mutex<Vec<Vec<String>>>,
    search_requests: Mutex<Vec<SearchRequest>>,
}

impl MockKestrel {
    /// Create a mock that knows nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Canonicalize `curie` to `node`.
    pub fn with_canonical(mut self, curie: &str, node: &str) -> Self {
        self.canonical.insert(curie.to_string(), node.to_string());
        self
    }

    /// Answer searches for `text` with `hits`, best first.
    pub fn with_hits(mut self, text: &str, hits: Vec<SearchHit>) -> Self {
        self.hits.insert(text.to_string(), hits);
        self
    }

    /// Number of canonicalize calls made.
    pub fn canonicalize_calls(&self) -> usize {
        self.canonicalize_requests.lock().len()
    }

    /// Curie lists received by canonicalize, in call order.
    pub fn canonicalize_requests(&self) -> Vec<Vec<String>> {
        self.canonicalize_requests.lock().clone()
    }

    /// Number of search calls made.
    pub fn search_calls(&self) -> usize {
        self.search_requests.lock().len()
    }

    /// Search requests received, in call order.
    pub fn search_requests(&self) -> Vec<SearchRequest> {
        self.search_requests.lock().clone()
    }

    /// Search calls made against one endpoint.
    pub fn search_calls_for(&self, kind: SearchKind) -> usize {
        self.search_requests
            .lock()
            .iter()
            .filter(|r| r.kind == kind)
            .count()
    }
}

impl KgService for MockKestrel {
    fn canonicalize(&self, curies: &[String]) -> Result<CanonicalMap> {
        self.canonicalize_requests.lock().push(curies.to_vec());
        Ok(curies
            .iter()
            .filter_map(|c| Some((c.clone(), self.canonical.get(c)?.clone())))
            .collect())
    }

    fn name(&self) -> &str {
        "mock-kestrel"
    }
}

impl SearchService for MockKestrel {
    fn search(&self, request: &SearchRequest) -> Result<SearchResults> {
        self.search_requests.lock().push(request.clone());
        Ok(request
            .search_text
            .iter()
            .filter_map(|text| {
                let hits = self.hits.get(text)?;
                Some((text.clone(), hits.iter().take(request.limit).cloned().collect()))
            })
            .collect())
    }

    fn name(&self) -> &str {
        "mock-kestrel"
    }
}

/// Mock RefMet service.
#[derive(Default)]
pub struct MockRefMet {
    records: HashMap<String, RefMetRecord>,
    calls: AtomicUsize,
    failing: AtomicBool,
}

impl MockRefMet {
    /// Create a mock with no records.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer lookups for `name` with `record`.
    pub fn with_record(mut self, name: &str, record: RefMetRecord) -> Self {
        self.records.insert(name.to_string(), record);
        self
    }

    /// Make every lookup fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of lookups made.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl RefMetService for MockRefMet {
    fn lookup(&self, name: &str) -> Result<Option<RefMetRecord>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(MapperError::service("mock-refmet", "service unavailable"));
        }
        Ok(self.records.get(name).cloned())
    }

    fn name(&self) -> &str {
        "mock-refmet"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_canonicalize_drops_unknown() {
        let kg = MockKestrel::new().with_canonical("CHEBI:17126", "CHEBI:17126");
        let result = kg
            .canonicalize(&["CHEBI:17126".to_string(), "HMDB:HMDB0000062".to_string()])
            .unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(kg.canonicalize_calls(), 1);
    }

    #[test]
    fn test_mock_search_respects_limit() {
        let kg = MockKestrel::new().with_hits(
            "carnitine",
            vec![SearchHit::new("CHEBI:17126", 0.9), SearchHit::new("CHEBI:3424", 0.4)],
        );
        let request = SearchRequest::new(SearchKind::Text, vec!["carnitine".to_string(), "x".to_string()])
            .with_limit(1);
        let results = kg.search(&request).unwrap();
        assert_eq!(results["carnitine"].len(), 1);
        assert!(!results.contains_key("x"));
        assert_eq!(kg.search_calls_for(SearchKind::Text), 1);
        assert_eq!(kg.search_calls_for(SearchKind::Hybrid), 0);
    }

    #[test]
    fn test_mock_refmet_failure_mode() {
        let refmet = MockRefMet::new().with_record("carnitine", RefMetRecord::default());
        assert!(refmet.lookup("carnitine").unwrap().is_some());
        refmet.set_failing(true);
        assert!(refmet.lookup("carnitine").is_err());
        assert_eq!(refmet.calls(), 2);
    }
}
