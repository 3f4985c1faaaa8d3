//! Custom field type system
//!
//! One custom field value attached to a parent resource. The concrete value
//! shape is fully determined by a numeric type discriminator read from the
//! wire: a fixed dispatch table selects one of five tagged variants at parse
//! time and callers never choose the variant directly. An unrecognized
//! discriminator is a data-format error, never a silent fallback to text.
//!
//! Custom fields only exist inside a parent's field group; the generic
//! lifecycle operations are contractually unsupported on a bare field and
//! fail without touching the transport.

pub mod definition;
pub mod group;

use std::fmt;
use std::path::Path;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::NaiveDate;

use crate::coerce;
use crate::config::Config;
use crate::form::{FileMap, FilePayload, FormData};
use crate::object::{BuildScope, BuiltData, DeclaredFields, FieldDeclaration};
use crate::result_set::{FieldAccess, FieldToken};
use crate::wire::WireNode;
use crate::{Error, Result};

pub use definition::{CustomFieldDefinition, FieldOption};
pub use group::{CustomFieldGroup, FieldGroups};

/// Separator between selected values of a multi-select field on the wire
pub const VALUES_SEPARATOR: &str = ", ";

/// Wire type discriminator of a custom field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldType {
    Text,
    Textarea,
    Password,
    Checkbox,
    Radio,
    Select,
    LinkedSelect,
    Date,
    File,
    Custom,
    MultiSelect,
}

impl FieldType {
    /// Decode the numeric discriminator; fails closed on unknown values
    pub fn from_wire(value: i64) -> Result<Self> {
        match value {
            1 => Ok(FieldType::Text),
            2 => Ok(FieldType::Textarea),
            3 => Ok(FieldType::Password),
            4 => Ok(FieldType::Checkbox),
            5 => Ok(FieldType::Radio),
            6 => Ok(FieldType::Select),
            7 => Ok(FieldType::LinkedSelect),
            8 => Ok(FieldType::Date),
            9 => Ok(FieldType::File),
            10 => Ok(FieldType::Custom),
            12 => Ok(FieldType::MultiSelect),
            other => Err(Error::data_format(format!(
                "unknown custom field type {}",
                other
            ))),
        }
    }

    pub fn to_wire(self) -> i64 {
        match self {
            FieldType::Text => 1,
            FieldType::Textarea => 2,
            FieldType::Password => 3,
            FieldType::Checkbox => 4,
            FieldType::Radio => 5,
            FieldType::Select => 6,
            FieldType::LinkedSelect => 7,
            FieldType::Date => 8,
            FieldType::File => 9,
            FieldType::Custom => 10,
            FieldType::MultiSelect => 12,
        }
    }

    /// Whether values of this type select from a declared option list
    pub fn has_options(self) -> bool {
        matches!(
            self,
            FieldType::Checkbox
                | FieldType::Radio
                | FieldType::Select
                | FieldType::LinkedSelect
                | FieldType::MultiSelect
        )
    }
}

/// Kind-specific value of one custom field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Text-like fields: the raw wire value is the value
    Plain,
    /// Single selected option, unresolvable selections are None
    Select(Option<FieldOption>),
    /// Selected options, de-duplicated by option id, first-seen order
    MultiSelect(Vec<FieldOption>),
    Date(Option<NaiveDate>),
    File {
        file_name: Option<String>,
        contents: Vec<u8>,
        /// Set by setters; unchanged files are not re-transmitted
        changed: bool,
    },
}

/// One custom field value attached to a parent resource
#[derive(Debug, Clone, PartialEq)]
pub struct CustomField {
    id: i64,
    field_type: FieldType,
    name: String,
    title: String,
    raw_value: String,
    value: FieldValue,
    definition: Option<CustomFieldDefinition>,
}

static FIELDS: &[FieldDeclaration] = &[
    FieldDeclaration::new("name", "name").filter_order(),
    FieldDeclaration::new("title", "title").filter_order(),
    FieldDeclaration::new("type", "type").filter_order(),
    FieldDeclaration::new("raw_value", "value").filter_order(),
];

impl CustomField {
    /// Parse one field element, selecting the concrete variant from the
    /// type discriminator and resolving options against the definition list
    pub fn parse(node: &WireNode, definitions: &[CustomFieldDefinition]) -> Result<Self> {
        let field_type = FieldType::from_wire(node.req_attr_int("type")?)?;
        let name = node.req_attr("name")?.to_string();
        let title = coerce::assure_string(node.attr("title"), Some("")).unwrap_or_default();
        let id = node.req_attr_int("id")?;
        let raw_value = node.text().unwrap_or_default().to_string();
        let definition = definitions.iter().find(|d| d.name() == name).cloned();

        let value = match field_type {
            FieldType::Text | FieldType::Textarea | FieldType::Password | FieldType::Custom => {
                FieldValue::Plain
            }
            FieldType::Radio | FieldType::Select | FieldType::LinkedSelect => {
                let option = definition
                    .as_ref()
                    .and_then(|d| d.resolve(&raw_value))
                    .cloned();
                FieldValue::Select(option)
            }
            FieldType::Checkbox | FieldType::MultiSelect => {
                let options = match &definition {
                    Some(def) => resolve_options(def, &raw_value),
                    None => Vec::new(),
                };
                FieldValue::MultiSelect(options)
            }
            FieldType::Date => FieldValue::Date(parse_wire_date(&raw_value)),
            FieldType::File => {
                let contents = if raw_value.trim().is_empty() {
                    Vec::new()
                } else {
                    BASE64.decode(raw_value.trim()).map_err(|e| {
                        Error::data_format(format!(
                            "invalid base64 contents of file field '{}': {}",
                            name, e
                        ))
                    })?
                };
                FieldValue::File {
                    file_name: node.attr("filename").map(str::to_owned),
                    contents,
                    changed: false,
                }
            }
        };

        Ok(Self {
            id,
            field_type,
            name,
            title,
            raw_value,
            value,
            definition,
        })
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Raw wire text of this field
    pub fn raw_value(&self) -> &str {
        &self.raw_value
    }

    pub fn definition(&self) -> Option<&CustomFieldDefinition> {
        self.definition.as_ref()
    }

    /// Selected option of a select-like field
    pub fn selected_option(&self) -> Option<&FieldOption> {
        match &self.value {
            FieldValue::Select(option) => option.as_ref(),
            _ => None,
        }
    }

    /// Selected options of a multi-select field, first-seen order
    pub fn selected_options(&self) -> &[FieldOption] {
        match &self.value {
            FieldValue::MultiSelect(options) => options,
            _ => &[],
        }
    }

    /// Date value of a date field
    pub fn date(&self) -> Option<NaiveDate> {
        match &self.value {
            FieldValue::Date(date) => *date,
            _ => None,
        }
    }

    /// Date rendered with the given format, or the process-wide date format
    pub fn date_formatted(&self, format: Option<&str>) -> Option<String> {
        let date = self.date()?;
        let format = format
            .map(str::to_owned)
            .unwrap_or_else(|| Config::global().date_format);
        Some(date.format(&format).to_string())
    }

    /// File name of a file field
    pub fn file_name(&self) -> Option<&str> {
        match &self.value {
            FieldValue::File { file_name, .. } => file_name.as_deref(),
            _ => None,
        }
    }

    /// Raw (decoded) contents of a file field
    pub fn contents(&self) -> Option<&[u8]> {
        match &self.value {
            FieldValue::File { contents, .. } => Some(contents),
            _ => None,
        }
    }

    /// Set the raw text value of a text-like field
    pub fn set_value<S: Into<String>>(&mut self, value: S) -> Result<&mut Self> {
        match self.value {
            FieldValue::Plain => {
                self.raw_value = value.into();
                Ok(self)
            }
            _ => Err(self.kind_error("set_value", "a text field")),
        }
    }

    /// Select one option by identifier or value; unresolvable selections
    /// clear the field
    pub fn set_selected_option(&mut self, token: &str) -> Result<&mut Self> {
        let option = self
            .definition
            .as_ref()
            .and_then(|d| d.resolve(token))
            .cloned();
        match &mut self.value {
            FieldValue::Select(selected) => {
                self.raw_value = option
                    .as_ref()
                    .map(|o| o.value.clone())
                    .unwrap_or_default();
                *selected = option;
                Ok(self)
            }
            _ => Err(self.kind_error("set_selected_option", "a select field")),
        }
    }

    /// Select options by identifier or value; unresolvable tokens are
    /// dropped and duplicates collapse to the first occurrence
    pub fn set_selected_options(&mut self, tokens: &[&str]) -> Result<&mut Self> {
        let resolved = match &self.definition {
            Some(def) => {
                let mut options = Vec::new();
                for token in tokens {
                    if let Some(option) = def.resolve(token) {
                        if !options.iter().any(|o: &FieldOption| o.id == option.id) {
                            options.push(option.clone());
                        }
                    }
                }
                options
            }
            None => Vec::new(),
        };
        match &mut self.value {
            FieldValue::MultiSelect(options) => {
                self.raw_value = resolved
                    .iter()
                    .map(|o| o.value.clone())
                    .collect::<Vec<_>>()
                    .join(VALUES_SEPARATOR);
                *options = resolved;
                Ok(self)
            }
            _ => Err(self.kind_error("set_selected_options", "a multi-select field")),
        }
    }

    /// Set the date value
    pub fn set_date(&mut self, date: NaiveDate) -> Result<&mut Self> {
        match &mut self.value {
            FieldValue::Date(current) => {
                self.raw_value = date.format(WIRE_DATE_FORMAT).to_string();
                *current = Some(date);
                Ok(self)
            }
            _ => Err(self.kind_error("set_date", "a date field")),
        }
    }

    /// Set the file name, marking the field dirty when it changes
    pub fn set_file_name<S: Into<String>>(&mut self, name: S) -> Result<&mut Self> {
        let name = name.into();
        match &mut self.value {
            FieldValue::File {
                file_name, changed, ..
            } => {
                if file_name.as_deref() != Some(name.as_str()) {
                    *changed = true;
                }
                *file_name = Some(name);
                Ok(self)
            }
            _ => Err(self.kind_error("set_file_name", "a file field")),
        }
    }

    /// Set the raw (not base64 encoded) contents, marking the field dirty
    /// when they change
    pub fn set_contents(&mut self, new_contents: Vec<u8>) -> Result<&mut Self> {
        match &mut self.value {
            FieldValue::File {
                contents, changed, ..
            } => {
                if *contents != new_contents {
                    *changed = true;
                }
                self.raw_value = BASE64.encode(&new_contents);
                *contents = new_contents;
                Ok(self)
            }
            _ => Err(self.kind_error("set_contents", "a file field")),
        }
    }

    /// Read contents and file name from a file on disk
    pub fn set_contents_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<&mut Self> {
        let path = path.as_ref();
        let contents = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.set_contents(contents)?;
        self.set_file_name(file_name)
    }

    /// Whether the field currently carries no value
    pub fn is_empty(&self) -> bool {
        match &self.value {
            FieldValue::Plain => self.raw_value.trim().is_empty(),
            FieldValue::Select(option) => option.is_none(),
            FieldValue::MultiSelect(options) => options.is_empty(),
            FieldValue::Date(date) => date.is_none(),
            FieldValue::File { contents, .. } => contents.is_empty(),
        }
    }

    /// Emit this field's contribution to the parent group's write
    pub fn build(&self, _scope: BuildScope) -> Result<BuiltData> {
        let mut form = FormData::new();
        let mut files = FileMap::new();
        match &self.value {
            FieldValue::Plain => form.put(self.name.clone(), self.raw_value.clone()),
            FieldValue::Select(option) => {
                if let Some(option) = option {
                    form.put_int(self.name.clone(), option.id);
                }
            }
            FieldValue::MultiSelect(options) => {
                let ids: Vec<i64> = options.iter().map(|o| o.id).collect();
                form.put_indexed_ints(self.name.clone(), &ids);
            }
            FieldValue::Date(date) => {
                if let Some(date) = date {
                    form.put(self.name.clone(), date.format(WIRE_DATE_FORMAT).to_string());
                }
            }
            FieldValue::File {
                file_name,
                contents,
                changed,
            } => {
                if *changed {
                    files.put(
                        self.name.clone(),
                        FilePayload {
                            file_name: file_name.clone().unwrap_or_default(),
                            contents: contents.clone(),
                        },
                    );
                }
            }
        }
        Ok(BuiltData::with_files(form, files))
    }

    /// Validate this field against its server-declared definition
    pub fn validate(&self) -> Result<()> {
        let Some(def) = &self.definition else {
            return Ok(());
        };
        if def.is_required() && self.is_empty() {
            return Err(Error::validation(
                self.name.clone(),
                format!("custom field '{}' is required", self.title),
            ));
        }
        if let Some(pattern) = def.regexp_validate() {
            if !self.raw_value.is_empty() {
                let re = regex::Regex::new(pattern).map_err(|e| {
                    Error::validation(self.name.clone(), format!("invalid field pattern: {}", e))
                })?;
                if !re.is_match(&self.raw_value) {
                    return Err(Error::validation(
                        self.name.clone(),
                        format!("value does not match pattern '{}'", pattern),
                    ));
                }
            }
        }
        Ok(())
    }

    fn kind_error(&self, operation: &str, expected: &str) -> Error {
        Error::unsupported(
            "CustomField",
            operation,
            format!("'{}' is not {}", self.name, expected),
        )
    }

    fn lifecycle_error(operation: &str) -> Error {
        Error::unsupported(
            "CustomField",
            operation,
            "custom fields are managed through their parent's field groups",
        )
    }

    /// Not supported: custom fields are fetched through a parent's groups
    pub fn get_all() -> Result<crate::result_set::ResultSet<CustomField>> {
        Err(Self::lifecycle_error("get_all"))
    }

    /// Not supported: custom fields are fetched through a parent's groups
    pub fn get() -> Result<CustomField> {
        Err(Self::lifecycle_error("get"))
    }

    /// Not supported: use the parent resource's custom field update
    pub fn create(&mut self) -> Result<()> {
        Err(Self::lifecycle_error("create"))
    }

    /// Not supported: use the parent resource's custom field update
    pub fn update(&mut self) -> Result<()> {
        Err(Self::lifecycle_error("update"))
    }

    /// Not supported: custom fields cannot be deleted individually
    pub fn delete(&mut self) -> Result<()> {
        Err(Self::lifecycle_error("delete"))
    }

    /// Not supported: reload the parent's field groups instead
    pub fn refresh(&mut self) -> Result<()> {
        Err(Self::lifecycle_error("refresh"))
    }
}

impl DeclaredFields for CustomField {
    fn fields() -> &'static [FieldDeclaration] {
        FIELDS
    }
}

impl FieldAccess for CustomField {
    fn field(&self, name: &str) -> Option<FieldToken> {
        match name {
            "name" => Some(FieldToken::Str(self.name.clone())),
            "title" => Some(FieldToken::Str(self.title.clone())),
            "type" => Some(FieldToken::Int(self.field_type.to_wire())),
            "raw_value" => Some(FieldToken::Str(self.raw_value.clone())),
            _ => None,
        }
    }
}

impl fmt::Display for CustomField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            FieldValue::File { file_name, .. } => write!(
                f,
                "{} = {}",
                self.title,
                file_name.as_deref().unwrap_or("")
            ),
            _ => write!(f, "{} = {}", self.title, self.raw_value),
        }
    }
}

const WIRE_DATE_FORMAT: &str = "%m/%d/%Y";

fn parse_wire_date(text: &str) -> Option<NaiveDate> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    NaiveDate::parse_from_str(trimmed, WIRE_DATE_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(trimmed, "%Y-%m-%d"))
        .ok()
}

fn resolve_options(definition: &CustomFieldDefinition, raw: &str) -> Vec<FieldOption> {
    let mut options: Vec<FieldOption> = Vec::new();
    for token in raw.split(VALUES_SEPARATOR) {
        if token.is_empty() {
            continue;
        }
        if let Some(option) = definition.resolve(token) {
            if !options.iter().any(|o| o.id == option.id) {
                options.push(option.clone());
            }
        }
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ApiResource;
    use serial_test::serial;

    fn color_definition() -> CustomFieldDefinition {
        let node = WireNode::new()
            .set_attr("customfieldid", "11")
            .set_attr("fieldname", "color")
            .set_attr("title", "Color")
            .set_attr("fieldtype", "12");
        let mut def = CustomFieldDefinition::parse(&node).unwrap();
        def.set_options(vec![
            FieldOption {
                id: 1,
                value: "Red".to_string(),
                display_order: 1,
            },
            FieldOption {
                id: 2,
                value: "Blue".to_string(),
                display_order: 2,
            },
            FieldOption {
                id: 3,
                value: "Green".to_string(),
                display_order: 3,
            },
        ]);
        def
    }

    fn field_node(field_type: i64, name: &str, contents: &str) -> WireNode {
        WireNode::new()
            .set_attr("id", "5")
            .set_attr("type", field_type.to_string())
            .set_attr("name", name)
            .set_attr("title", name)
            .set_text(contents)
    }

    #[test]
    fn test_unknown_discriminator_fails_closed() {
        let node = field_node(99, "mystery", "x");
        let err = CustomField::parse(&node, &[]).unwrap_err();
        assert!(err.is_data_format());
        assert!(err.to_string().contains("99"));
    }

    #[test]
    fn test_plain_field_value_is_raw() {
        let node = field_node(1, "serial", "ABC-123");
        let field = CustomField::parse(&node, &[]).unwrap();
        assert_eq!(field.field_type(), FieldType::Text);
        assert_eq!(field.raw_value(), "ABC-123");
        assert!(field.selected_option().is_none());
    }

    #[test]
    fn test_select_resolves_by_value_and_id() {
        let defs = vec![color_definition()];
        let by_value = CustomField::parse(&field_node(6, "color", "Blue"), &defs).unwrap();
        assert_eq!(by_value.selected_option().map(|o| o.id), Some(2));

        let by_id = CustomField::parse(&field_node(6, "color", "3"), &defs).unwrap();
        assert_eq!(
            by_id.selected_option().map(|o| o.value.as_str()),
            Some("Green")
        );

        let unresolved = CustomField::parse(&field_node(6, "color", "Mauve"), &defs).unwrap();
        assert!(unresolved.selected_option().is_none());
    }

    #[test]
    fn test_multi_select_dedupes_and_preserves_order() {
        let defs = vec![color_definition()];
        let field =
            CustomField::parse(&field_node(12, "color", "Red, Blue, Red"), &defs).unwrap();
        let ids: Vec<i64> = field.selected_options().iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![1, 2]);
    }

    #[test]
    fn test_multi_select_drops_unresolved() {
        let defs = vec![color_definition()];
        let field =
            CustomField::parse(&field_node(12, "color", "Red, Mauve, Green"), &defs).unwrap();
        let ids: Vec<i64> = field.selected_options().iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn test_multi_select_build_uses_indexed_keys() {
        let defs = vec![color_definition()];
        let field =
            CustomField::parse(&field_node(12, "color", "Blue, Green"), &defs).unwrap();
        let built = field.build(BuildScope::Update).unwrap();
        assert_eq!(
            built.form.encoded_pairs(),
            vec![
                ("color[0]".to_string(), "2".to_string()),
                ("color[1]".to_string(), "3".to_string()),
            ]
        );
    }

    #[test]
    fn test_set_selected_options_updates_raw_value() {
        let defs = vec![color_definition()];
        let mut field = CustomField::parse(&field_node(12, "color", ""), &defs).unwrap();
        field.set_selected_options(&["Green", "1", "Green"]).unwrap();
        assert_eq!(field.raw_value(), "Green, Red");
        let ids: Vec<i64> = field.selected_options().iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }

    #[test]
    #[serial]
    fn test_date_parse_and_render() {
        Config::reset_global();
        let field = CustomField::parse(&field_node(8, "due", "04/17/2024"), &[]).unwrap();
        assert_eq!(
            field.date(),
            NaiveDate::from_ymd_opt(2024, 4, 17)
        );
        assert_eq!(field.date_formatted(None).as_deref(), Some("04/17/2024"));
        assert_eq!(
            field.date_formatted(Some("%Y-%m-%d")).as_deref(),
            Some("2024-04-17")
        );
    }

    #[test]
    fn test_date_build_always_wire_format() {
        let mut field = CustomField::parse(&field_node(8, "due", "2024-04-17"), &[]).unwrap();
        let built = field.build(BuildScope::Update).unwrap();
        assert_eq!(built.form.scalar("due"), Some("04/17/2024"));

        field
            .set_date(NaiveDate::from_ymd_opt(2025, 1, 2).unwrap())
            .unwrap();
        let built = field.build(BuildScope::Update).unwrap();
        assert_eq!(built.form.scalar("due"), Some("01/02/2025"));
    }

    #[test]
    fn test_file_parse_decodes_base64() {
        let encoded = BASE64.encode(b"hello");
        let node = field_node(9, "report", &encoded).set_attr("filename", "report.txt");
        let field = CustomField::parse(&node, &[]).unwrap();
        assert_eq!(field.contents(), Some(b"hello".as_slice()));
        assert_eq!(field.file_name(), Some("report.txt"));
    }

    #[test]
    fn test_file_dirty_tracking() {
        let encoded = BASE64.encode(b"hello");
        let node = field_node(9, "report", &encoded).set_attr("filename", "report.txt");
        let mut field = CustomField::parse(&node, &[]).unwrap();

        // untouched files are not re-transmitted
        let built = field.build(BuildScope::Update).unwrap();
        assert!(built.files.is_empty());

        field.set_contents(b"changed".to_vec()).unwrap();
        let built = field.build(BuildScope::Update).unwrap();
        assert_eq!(built.files.len(), 1);
        assert_eq!(
            built.files.get("report").map(|p| p.contents.as_slice()),
            Some(b"changed".as_slice())
        );
    }

    #[test]
    fn test_file_set_contents_from_file() {
        use std::io::Write;
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"attached bytes").unwrap();

        let mut field = CustomField::parse(&field_node(9, "report", ""), &[]).unwrap();
        let built = field.build(BuildScope::Update).unwrap();
        assert!(built.files.is_empty());

        field.set_contents_from_file(tmp.path()).unwrap();
        let built = field.build(BuildScope::Update).unwrap();
        let payload = built.files.get("report").unwrap();
        assert_eq!(payload.contents, b"attached bytes");
        assert!(!payload.file_name.is_empty());
    }

    #[test]
    fn test_kind_guards() {
        let mut field = CustomField::parse(&field_node(1, "serial", "x"), &[]).unwrap();
        assert!(field.set_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()).is_err());
        assert!(field.set_contents(vec![1]).is_err());
        assert!(field.set_value("y").is_ok());
    }

    #[test]
    fn test_generic_lifecycle_is_unsupported() {
        let mut field = CustomField::parse(&field_node(1, "serial", "x"), &[]).unwrap();
        for err in [
            CustomField::get_all().unwrap_err(),
            CustomField::get().unwrap_err(),
            field.create().unwrap_err(),
            field.update().unwrap_err(),
            field.delete().unwrap_err(),
            field.refresh().unwrap_err(),
        ] {
            assert!(err.is_unsupported());
            assert!(!err.is_transport());
        }
    }

    #[test]
    fn test_required_definition_validation() {
        let node = WireNode::new()
            .set_attr("customfieldid", "11")
            .set_attr("fieldname", "serial")
            .set_attr("title", "Serial")
            .set_attr("fieldtype", "1")
            .set_attr("isrequired", "1");
        let def = CustomFieldDefinition::parse(&node).unwrap();
        let field = CustomField::parse(&field_node(1, "serial", ""), &[def]).unwrap();
        let err = field.validate().unwrap_err();
        assert!(err.is_validation());
    }
}
