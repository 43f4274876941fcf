//! Request parameters and their canonical encoding

use std::collections::BTreeMap;

/// Query/body parameters for one request.
///
/// Names are unique. Entries are kept ordered by the byte value of their
/// names, so iteration and [`ParameterSet::encode`] never depend on the
/// order in which parameters were set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterSet {
    entries: BTreeMap<String, String>,
}

impl ParameterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a parameter. Last write wins.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.get(name).map(String::as_str)
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        self.entries.remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Pairs in canonical (byte-wise ascending name) order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Canonical form: `name=value` pairs sorted by name and joined with `&`.
    ///
    /// Names and values are percent-encoded leaving only ASCII letters,
    /// digits and `-_.~` untouched. A space becomes `%20`. An empty set
    /// encodes to an empty string.
    pub fn encode(&self) -> String {
        let mut out = String::new();
        for (name, value) in &self.entries {
            if !out.is_empty() {
                out.push('&');
            }
            out.push_str(&urlencoding::encode(name));
            out.push('=');
            out.push_str(&urlencoding::encode(value));
        }
        out
    }
}

impl<K, V> Extend<(K, V)> for ParameterSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.set(name, value);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for ParameterSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        params.extend(iter);
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_is_insertion_order_independent() {
        let mut a = ParameterSet::new();
        a.set("B", "2");
        a.set("A", "1");

        let mut b = ParameterSet::new();
        b.set("A", "1");
        b.set("B", "2");

        assert_eq!(a.encode(), "A=1&B=2");
        assert_eq!(a.encode(), b.encode());
    }

    #[test]
    fn test_names_sort_by_byte_value() {
        let params: ParameterSet = [("aaa", "3"), ("Aaa", "1"), ("Ab", "2"), ("_x", "4")]
            .into_iter()
            .collect();
        // 'A' (0x41) < '_' (0x5f) < 'a' (0x61)
        assert_eq!(params.encode(), "Aaa=1&Ab=2&_x=4&aaa=3");
    }

    #[test]
    fn test_strict_percent_encoding() {
        let mut params = ParameterSet::new();
        params.set("Value", "a b&c");
        assert_eq!(params.encode(), "Value=a%20b%26c");

        params.set("Value", "-_.~+/=:é");
        assert_eq!(params.encode(), "Value=-_.~%2B%2F%3D%3A%C3%A9");
    }

    #[test]
    fn test_names_are_encoded_too() {
        let mut params = ParameterSet::new();
        params.set("Item List.1", "x");
        assert_eq!(params.encode(), "Item%20List.1=x");
    }

    #[test]
    fn test_last_write_wins() {
        let mut params = ParameterSet::new();
        params.set("Action", "ListOrders");
        params.set("Action", "GetOrder");
        assert_eq!(params.len(), 1);
        assert_eq!(params.get("Action"), Some("GetOrder"));
        assert_eq!(params.encode(), "Action=GetOrder");
    }

    #[test]
    fn test_empty_set_encodes_to_empty_string() {
        let params = ParameterSet::new();
        assert!(params.is_empty());
        assert_eq!(params.encode(), "");
    }

    #[test]
    fn test_encode_is_idempotent() {
        let mut params = ParameterSet::new();
        params.set("MarketplaceId.Id.1", "ATVPDKIKX0DER");
        params.set("CreatedAfter", "2021-01-01T00:00:00Z");
        assert_eq!(params.encode(), params.encode());
    }

    #[test]
    fn test_remove_and_iter() {
        let mut params: ParameterSet = [("b", "2"), ("a", "1"), ("c", "3")].into_iter().collect();
        assert_eq!(params.remove("b").as_deref(), Some("2"));
        assert!(!params.contains("b"));
        let names: Vec<&str> = params.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["a", "c"]);
    }
}
