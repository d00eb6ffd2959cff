use serde::Serialize;

/// Field carrying the comma-joined list of signed field names.
pub const SIGNED_FIELD_NAMES: &str = "signed_field_names";
/// Field carrying the comma-joined list of fields the processor collects itself.
pub const UNSIGNED_FIELD_NAMES: &str = "unsigned_field_names";
/// Field carrying the base64 HMAC-SHA256 signature.
pub const SIGNATURE: &str = "signature";

/// Card fields posted straight to the processor. They never take part in a signature.
pub const CARD_FIELDS: [&str; 4] = ["card_number", "card_expiry_date", "card_type", "card_cvn"];

/// An ordered list of `name=value` pairs, as posted to or received from the processor.
///
/// Insertion order is preserved so that an outbound request is emitted exactly in the order it
/// was built. Setting a name that is already present replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldSet {
    fields: Vec<(String, String)>,
}

impl FieldSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `name` to `value`, keeping the original position if the name already exists.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, v)) => *v = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// The names listed in this set's own `signed_field_names` entry, in declared order.
    ///
    /// Returns `None` when the entry is absent. Duplicates are preserved.
    pub fn declared_signed_names(&self) -> Option<Vec<&str>> {
        self.get(SIGNED_FIELD_NAMES)
            .map(|list| list.split(',').collect())
    }

    /// Whether `name` appears in this set's own `signed_field_names` entry.
    pub fn is_signed(&self, name: &str) -> bool {
        self.declared_signed_names()
            .is_some_and(|names| names.contains(&name))
    }
}

impl<K, V> FromIterator<(K, V)> for FieldSet
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = FieldSet::new();
        for (name, value) in iter {
            set.set(name, value);
        }
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_replaces_in_place() {
        let mut fields = FieldSet::new();
        fields.set("a", "1");
        fields.set("b", "2");
        fields.set("a", "3");

        let names: Vec<&str> = fields.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["a", "b"]);
        assert_eq!(fields.get("a"), Some("3"));
    }

    #[test]
    fn test_empty_value_is_present() {
        let fields: FieldSet = [("c", "")].into_iter().collect();
        assert_eq!(fields.get("c"), Some(""));
        assert_eq!(fields.get("d"), None);
    }

    #[test]
    fn test_declared_signed_names_keeps_order_and_duplicates() {
        let fields: FieldSet = [(SIGNED_FIELD_NAMES, "signed_field_names,b,a,b")]
            .into_iter()
            .collect();
        assert_eq!(
            fields.declared_signed_names(),
            Some(vec!["signed_field_names", "b", "a", "b"])
        );
    }

    #[test]
    fn test_is_signed_matches_whole_names() {
        let fields: FieldSet = [
            ("decision", "ACCEPT"),
            (SIGNED_FIELD_NAMES, "signed_field_names,req_decision"),
        ]
        .into_iter()
        .collect();
        assert!(fields.is_signed(SIGNED_FIELD_NAMES));
        assert!(!fields.is_signed("decision"));

        let unsigned: FieldSet = [("decision", "ACCEPT")].into_iter().collect();
        assert!(!unsigned.is_signed("decision"));
    }
}
