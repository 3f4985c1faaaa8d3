//! Custom field definitions
//!
//! The remote helpdesk describes every custom field once: its wire name,
//! title, type discriminator, requiredness, validation pattern and (for
//! option-bearing types) the list of selectable options. Definitions are
//! fetched in one batch and memoized per client; field parsing resolves
//! selected options against them.

use std::fmt;

use crate::coerce;
use crate::custom_field::FieldType;
use crate::object::{ApiResource, BuildScope, BuiltData, DeclaredFields, FieldDeclaration, ResourceId};
use crate::result_set::{FieldAccess, FieldToken};
use crate::wire::WireNode;
use crate::{Error, Result};

/// One selectable option of a select-like custom field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldOption {
    pub id: i64,
    pub value: String,
    pub display_order: i64,
}

impl FieldOption {
    pub fn parse(node: &WireNode) -> Result<Self> {
        Ok(Self {
            id: node.req_child_int("customfieldoptionid")?,
            value: node.child_string("optionvalue").unwrap_or_default(),
            display_order: node.child_int("displayorder").unwrap_or(0),
        })
    }
}

/// Definition of one custom field as declared on the server
#[derive(Debug, Clone, PartialEq)]
pub struct CustomFieldDefinition {
    id: i64,
    name: String,
    title: String,
    field_type: FieldType,
    is_required: bool,
    regexp_validate: Option<String>,
    default_value: Option<String>,
    display_order: i64,
    options: Vec<FieldOption>,
}

static FIELDS: &[FieldDeclaration] = &[
    FieldDeclaration::new("name", "fieldname").filter_order(),
    FieldDeclaration::new("title", "title").filter_order(),
    FieldDeclaration::new("display_order", "displayorder").filter_order(),
    FieldDeclaration::new("is_required", "isrequired").filter(),
];

impl CustomFieldDefinition {
    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn field_type(&self) -> FieldType {
        self.field_type
    }

    pub fn is_required(&self) -> bool {
        self.is_required
    }

    pub fn regexp_validate(&self) -> Option<&str> {
        self.regexp_validate.as_deref()
    }

    pub fn default_value(&self) -> Option<&str> {
        self.default_value.as_deref()
    }

    pub fn display_order(&self) -> i64 {
        self.display_order
    }

    pub fn options(&self) -> &[FieldOption] {
        &self.options
    }

    /// Whether this field type carries a server-declared option list
    pub fn has_options(&self) -> bool {
        self.field_type.has_options()
    }

    /// Called by the client after fetching the option list batch
    pub(crate) fn set_options(&mut self, options: Vec<FieldOption>) {
        self.options = options;
    }

    pub fn option_by_id(&self, id: i64) -> Option<&FieldOption> {
        self.options.iter().find(|o| o.id == id)
    }

    pub fn option_by_value(&self, value: &str) -> Option<&FieldOption> {
        self.options.iter().find(|o| o.value == value)
    }

    /// Resolve one wire token to an option, by numeric identifier when the
    /// token is numeric, else by value; unresolvable tokens yield None
    pub fn resolve(&self, token: &str) -> Option<&FieldOption> {
        let trimmed = token.trim();
        if let Ok(id) = trimmed.parse::<i64>() {
            if let Some(option) = self.option_by_id(id) {
                return Some(option);
            }
        }
        self.option_by_value(trimmed)
    }
}

impl DeclaredFields for CustomFieldDefinition {
    fn fields() -> &'static [FieldDeclaration] {
        FIELDS
    }
}

impl FieldAccess for CustomFieldDefinition {
    fn field(&self, name: &str) -> Option<FieldToken> {
        match name {
            "name" => Some(FieldToken::Str(self.name.clone())),
            "title" => Some(FieldToken::Str(self.title.clone())),
            "display_order" => Some(FieldToken::Int(self.display_order)),
            "is_required" => Some(FieldToken::Bool(self.is_required)),
            _ => None,
        }
    }
}

impl ApiResource for CustomFieldDefinition {
    const CONTROLLER: &'static str = "/Base/CustomField";
    const XML_NAME: &'static str = "customfield";
    const RESOURCE: &'static str = "CustomFieldDefinition";
    const READ_ONLY: bool = true;

    fn parse(node: &WireNode) -> Result<Self> {
        let raw_type = node.req_attr_int("fieldtype")?;
        Ok(Self {
            id: node.req_attr_int("customfieldid")?,
            name: node.req_attr("fieldname")?.to_string(),
            title: coerce::assure_string(node.attr("title"), Some(""))
                .unwrap_or_default(),
            field_type: FieldType::from_wire(raw_type)?,
            is_required: coerce::assure_bool(node.attr("isrequired")),
            regexp_validate: node
                .attr("regexpvalidate")
                .filter(|v| !v.is_empty())
                .map(str::to_owned),
            default_value: node
                .attr("defaultvalue")
                .filter(|v| !v.is_empty())
                .map(str::to_owned),
            display_order: node.attr_int("displayorder").unwrap_or(0),
            options: Vec::new(),
        })
    }

    fn build(&self, _scope: BuildScope) -> Result<BuiltData> {
        Err(Error::unsupported(
            Self::RESOURCE,
            "build",
            "custom field definitions are read-only",
        ))
    }

    fn id(&self) -> Option<ResourceId> {
        Some(ResourceId::scalar(self.id))
    }
}

impl fmt::Display for CustomFieldDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (id: {}, type: {:?})",
            self.title, self.id, self.field_type
        )
    }
}
