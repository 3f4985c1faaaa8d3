//! Outgoing wire data
//!
//! The build step of every resource emits a flat, insertion-ordered field
//! mapping plus a separate file-payload channel. The transport encodes both
//! into the request body; the core only decides names and value shapes.
//!
//! List-valued fields use one of two conventions, chosen per field by the
//! owning resource and never globalized: the repeated-key list (`usergroupid`
//! sent once per value) and the indexed-key form (`field[0]`, `field[1]`).

/// One outgoing field value
#[derive(Debug, Clone, PartialEq)]
pub enum FormValue {
    Scalar(String),
    /// Repeated-key list: the field name is sent once per value
    Repeated(Vec<String>),
    /// Indexed-key list: values are sent under `name[0]`, `name[1]`, ...
    Indexed(Vec<String>),
}

/// Flat outgoing field mapping, insertion-ordered
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormData {
    entries: Vec<(String, FormValue)>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn put<K: Into<String>, V: Into<String>>(&mut self, name: K, value: V) {
        self.entries
            .push((name.into(), FormValue::Scalar(value.into())));
    }

    pub fn put_int<K: Into<String>>(&mut self, name: K, value: i64) {
        self.put(name, value.to_string());
    }

    /// Emits the field only when the value is present and positive
    pub fn put_positive_int<K: Into<String>>(&mut self, name: K, value: Option<i64>) {
        if let Some(v) = value {
            if v > 0 {
                self.put_int(name, v);
            }
        }
    }

    /// Emits the field only when the value is present and non-empty
    pub fn put_string<K: Into<String>>(&mut self, name: K, value: Option<&str>) {
        if let Some(v) = value {
            if !v.is_empty() {
                self.put(name, v);
            }
        }
    }

    /// Booleans serialize as `1`/`0` on the wire
    pub fn put_bool<K: Into<String>>(&mut self, name: K, value: bool) {
        self.put(name, if value { "1" } else { "0" });
    }

    pub fn put_repeated<K: Into<String>>(&mut self, name: K, values: Vec<String>) {
        self.entries.push((name.into(), FormValue::Repeated(values)));
    }

    pub fn put_repeated_ints<K: Into<String>>(&mut self, name: K, values: &[i64]) {
        self.put_repeated(name, values.iter().map(i64::to_string).collect());
    }

    pub fn put_indexed<K: Into<String>>(&mut self, name: K, values: Vec<String>) {
        self.entries.push((name.into(), FormValue::Indexed(values)));
    }

    pub fn put_indexed_ints<K: Into<String>>(&mut self, name: K, values: &[i64]) {
        self.put_indexed(name, values.iter().map(i64::to_string).collect());
    }

    pub fn get(&self, name: &str) -> Option<&FormValue> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn scalar(&self, name: &str) -> Option<&str> {
        match self.get(name) {
            Some(FormValue::Scalar(value)) => Some(value.as_str()),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, FormValue)> {
        self.entries.iter()
    }

    /// Append every entry of another mapping, preserving its order
    pub fn merge(&mut self, other: FormData) {
        self.entries.extend(other.entries);
    }

    /// Flatten to the `(key, value)` pairs the transport sends, expanding
    /// both list conventions
    pub fn encoded_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (name, value) in &self.entries {
            match value {
                FormValue::Scalar(v) => pairs.push((name.clone(), v.clone())),
                FormValue::Repeated(values) => {
                    for v in values {
                        pairs.push((name.clone(), v.clone()));
                    }
                }
                FormValue::Indexed(values) => {
                    for (idx, v) in values.iter().enumerate() {
                        pairs.push((format!("{}[{}]", name, idx), v.clone()));
                    }
                }
            }
        }
        pairs
    }
}

/// One file transmitted through the file-payload channel
#[derive(Debug, Clone, PartialEq)]
pub struct FilePayload {
    pub file_name: String,
    pub contents: Vec<u8>,
}

/// File payloads keyed by field name, kept apart from the flat field mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileMap {
    entries: Vec<(String, FilePayload)>,
}

impl FileMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn put<K: Into<String>>(&mut self, name: K, payload: FilePayload) {
        self.entries.push((name.into(), payload));
    }

    pub fn get(&self, name: &str) -> Option<&FilePayload> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, payload)| payload)
    }

    pub fn iter(&self) -> impl Iterator<Item = &(String, FilePayload)> {
        self.entries.iter()
    }

    pub fn merge(&mut self, other: FileMap) {
        self.entries.extend(other.entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bool_serialization() {
        let mut form = FormData::new();
        form.put_bool("uservisibilitycustom", true);
        form.put_bool("isenabled", false);
        assert_eq!(form.scalar("uservisibilitycustom"), Some("1"));
        assert_eq!(form.scalar("isenabled"), Some("0"));
    }

    #[test]
    fn test_positive_int_skips_non_positive() {
        let mut form = FormData::new();
        form.put_positive_int("parentdepartmentid", Some(4));
        form.put_positive_int("displayorder", Some(0));
        form.put_positive_int("staffid", None);
        assert_eq!(form.scalar("parentdepartmentid"), Some("4"));
        assert_eq!(form.get("displayorder"), None);
        assert_eq!(form.get("staffid"), None);
    }

    #[test]
    fn test_encoded_pairs_list_conventions() {
        let mut form = FormData::new();
        form.put("title", "General");
        form.put_repeated_ints("usergroupid", &[1, 2]);
        form.put_indexed_ints("colors", &[5, 9]);
        assert_eq!(
            form.encoded_pairs(),
            vec![
                ("title".to_string(), "General".to_string()),
                ("usergroupid".to_string(), "1".to_string()),
                ("usergroupid".to_string(), "2".to_string()),
                ("colors[0]".to_string(), "5".to_string()),
                ("colors[1]".to_string(), "9".to_string()),
            ]
        );
    }

    #[test]
    fn test_insertion_order_preserved_across_merge() {
        let mut form = FormData::new();
        form.put("subject", "Printer down");
        let mut tail = FormData::new();
        tail.put("contents", "It broke");
        form.merge(tail);
        let keys: Vec<&str> = form.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["subject", "contents"]);
    }

    #[test]
    fn test_file_map_separate_from_form() {
        let mut files = FileMap::new();
        files.put(
            "report",
            FilePayload {
                file_name: "report.pdf".to_string(),
                contents: vec![1, 2, 3],
            },
        );
        assert_eq!(files.len(), 1);
        assert_eq!(files.get("report").map(|p| p.file_name.as_str()), Some("report.pdf"));
        assert_eq!(files.get("missing"), None);
    }
}
