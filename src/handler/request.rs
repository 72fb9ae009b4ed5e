//! Request line decoding
//!
//! Percent-decodes the path and parses the query string into ordered
//! parameters.

use percent_encoding::percent_decode_str;

/// Decoded request information needed by the route handlers
pub struct RequestContext<'a> {
    /// Percent-decoded path
    pub path: &'a str,
    pub params: &'a QueryParams,
    pub is_head: bool,
}

/// Percent-decode a request path, `None` if the result is not UTF-8
pub fn decode_path(raw: &str) -> Option<String> {
    percent_decode_str(raw)
        .decode_utf8()
        .ok()
        .map(std::borrow::Cow::into_owned)
}

/// Query parameters in first-seen key order
///
/// `+` decodes to a space and pairs with an empty value are dropped. A key
/// given more than once keeps all its values; lookups return the first.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueryParams {
    params: Vec<(String, Vec<String>)>,
}

impl QueryParams {
    pub fn parse(query: Option<&str>) -> Self {
        let mut params: Vec<(String, Vec<String>)> = Vec::new();

        for pair in query.unwrap_or_default().split('&') {
            let (raw_key, raw_value) = pair.split_once('=').unwrap_or((pair, ""));
            let value = decode_component(raw_value);
            if raw_key.is_empty() || value.is_empty() {
                continue;
            }
            let key = decode_component(raw_key);

            match params.iter_mut().find(|(name, _)| *name == key) {
                Some((_, values)) => values.push(value),
                None => params.push((key, vec![value])),
            }
        }

        Self { params }
    }

    /// First value given for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(name, _)| name == key)
            .and_then(|(_, values)| values.first())
            .map(String::as_str)
    }

    /// Each key with its first value
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params
            .iter()
            .filter_map(|(name, values)| Some((name.as_str(), values.first()?.as_str())))
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

fn decode_component(raw: &str) -> String {
    let spaced = raw.replace('+', " ");
    percent_decode_str(&spaced).decode_utf8_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_path() {
        assert_eq!(decode_path("/test").as_deref(), Some("/test"));
        assert_eq!(
            decode_path("/%D0%BF%D1%83%D1%82%D1%8C").as_deref(),
            Some("/путь")
        );
        assert_eq!(decode_path("/a%20b+c").as_deref(), Some("/a b+c"));
        assert_eq!(decode_path("/%FF"), None);
    }

    #[test]
    fn test_parse_query() {
        let params = QueryParams::parse(Some("param=value&name=J%C3%BCrgen+M"));
        assert_eq!(params.get("param"), Some("value"));
        assert_eq!(params.get("name"), Some("Jürgen M"));
        assert_eq!(params.get("missing"), None);
    }

    #[test]
    fn test_blank_values_dropped() {
        let params = QueryParams::parse(Some("name=&a=1&flag&=x"));
        assert_eq!(params.get("name"), None);
        assert_eq!(params.get("flag"), None);
        assert_eq!(params.iter().collect::<Vec<_>>(), vec![("a", "1")]);
    }

    #[test]
    fn test_repeated_key_keeps_first() {
        let params = QueryParams::parse(Some("x=1&y=2&x=3"));
        assert_eq!(params.get("x"), Some("1"));
        assert_eq!(params.iter().collect::<Vec<_>>(), vec![("x", "1"), ("y", "2")]);
    }

    #[test]
    fn test_no_query() {
        assert!(QueryParams::parse(None).is_empty());
        assert!(QueryParams::parse(Some("")).is_empty());
    }
}
