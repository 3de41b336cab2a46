//! Splitting of provided-identifier values into individual local ids.

use serde_json::Value;

use crate::entity::value_to_list;

/// Turn a provided-identifier value into its list of raw local ids.
///
/// Strings shaped like a literal list (`['C00487', 'C00031']`,
/// `(10917,)`, `{"a", "b"}`) are parsed as lists; any other string is split
/// on the delimiter characters. Non-string values are flattened as is.
pub fn parse_delimited(value: &Value, delimiters: &[char]) -> Vec<Value> {
    match value {
        Value::String(s) => {
            if let Some(items) = parse_literal_list(s) {
                return items;
            }
            if delimiters.is_empty() {
                return vec![Value::String(s.clone())];
            }
            s.split(|c: char| delimiters.contains(&c))
                .map(|part| Value::String(part.to_string()))
                .collect()
        }
        other => value_to_list(other),
    }
}

/// Parse a bracketed literal of quoted strings and numbers.
///
/// Returns `None` when the string is not bracketed or holds anything else
/// (a dict, bare words, unbalanced quotes), so the caller can fall back to
/// delimiter splitting.
pub fn parse_literal_list(raw: &str) -> Option<Vec<Value>> {
    let s = raw.trim();
    let (open, close) = (s.chars().next()?, s.chars().last()?);
    let is_set = match (open, close) {
        ('[', ']') | ('(', ')') => false,
        ('{', '}') => true,
        _ => return None,
    };
    if s.len() < 2 {
        return None;
    }

    let inner = s[1..s.len() - 1].trim();
    if inner.is_empty() {
        // `{}` is an empty dict, not an empty set
        return if is_set { None } else { Some(Vec::new()) };
    }

    let tokens = split_top_level(inner)?;
    let last = tokens.len() - 1;
    let mut items = Vec::with_capacity(tokens.len());
    for (i, token) in tokens.iter().enumerate() {
        let token = token.trim();
        if token.is_empty() {
            // A single trailing comma is allowed: `(10917,)`
            if i == last && i > 0 {
                continue;
            }
            return None;
        }
        items.push(parse_literal(token)?);
    }
    Some(items)
}

/// Split on commas that are not inside quotes. `None` on unbalanced quotes.
fn split_top_level(inner: &str) -> Option<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut quote: Option<char> = None;
    let mut escaped = false;

    for c in inner.chars() {
        match quote {
            Some(q) => {
                current.push(c);
                if escaped {
                    escaped = false;
                } else if c == '\\' {
                    escaped = true;
                } else if c == q {
                    quote = None;
                }
            }
            None => match c {
                '\'' | '"' => {
                    quote = Some(c);
                    current.push(c);
                }
                ',' => tokens.push(std::mem::take(&mut current)),
                _ => current.push(c),
            },
        }
    }

    if quote.is_some() {
        return None;
    }
    tokens.push(current);
    Some(tokens)
}

fn parse_literal(token: &str) -> Option<Value> {
    let first = token.chars().next()?;
    if first == '\'' || first == '"' {
        let body = token.strip_prefix(first)?.strip_suffix(first)?;
        if body.contains(first) && !body.contains('\\') {
            return None;
        }
        return Some(Value::String(body.replace(&format!("\\{}", first), &first.to_string())));
    }
    if token.parse::<f64>().is_ok() && token.chars().all(|c| c.is_ascii_digit() || "+-.eE".contains(c)) {
        return Some(Value::String(token.to_string()));
    }
    None
}
