use serde::de::DeserializeOwned;
use serde_json::Value;
use votecap_api::ApiError;

/// Accumulator and cursor for a `data` / `meta.next` paginated listing.
///
/// The first request goes to `first_uri`; every later request goes to the
/// cursor supplied by the previous page. Pages are collected in order until
/// the node reports no further cursor.
#[derive(Debug)]
pub struct Pager<T> {
    first_uri: String,
    next_uri: Option<String>,
    result: Vec<T>,
}

impl<T> Pager<T> {
    pub fn new(first_uri: impl Into<String>) -> Self {
        Self {
            first_uri: first_uri.into(),
            next_uri: None,
            result: Vec::new(),
        }
    }

    /// URI of the page to fetch next.
    pub fn uri(&self) -> &str {
        self.next_uri.as_deref().unwrap_or(&self.first_uri)
    }

    /// Appends a page and moves the cursor. Returns `false` once the listing is exhausted.
    pub fn advance(&mut self, next_uri: Option<String>, page: Vec<T>) -> bool {
        self.result.extend(page);
        self.next_uri = next_uri;
        self.next_uri.is_some()
    }

    pub fn len(&self) -> usize {
        self.result.len()
    }

    pub fn is_empty(&self) -> bool {
        self.result.is_empty()
    }

    pub fn into_result(self) -> Vec<T> {
        self.result
    }
}

/// Default per-page parse function: deserializes every entry of `data` as `T`.
pub fn parse_items<T: DeserializeOwned>(data: Vec<Value>) -> Result<Vec<T>, ApiError> {
    data.into_iter()
        .map(|entry| serde_json::from_value(entry).map_err(ApiError::from))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pager_follows_cursor() {
        let mut pager: Pager<u64> = Pager::new("http://node/api/peers");
        assert_eq!(pager.uri(), "http://node/api/peers");
        assert!(pager.is_empty());

        let more = pager.advance(Some("http://node/api/peers?page=2".to_string()), vec![1, 2]);
        assert!(more);
        assert_eq!(pager.uri(), "http://node/api/peers?page=2");

        let more = pager.advance(None, vec![3]);
        assert!(!more);
        assert_eq!(pager.len(), 3);
        assert_eq!(pager.into_result(), vec![1, 2, 3]);
    }

    #[test]
    fn test_parse_items() {
        let parsed: Vec<u64> = parse_items(vec![json!(1), json!(2)]).unwrap();
        assert_eq!(parsed, vec![1, 2]);

        let failed: Result<Vec<u64>, _> = parse_items(vec![json!("x")]);
        assert!(matches!(failed, Err(ApiError::Json(_))));
    }
}
