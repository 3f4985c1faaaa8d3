//! Custom field groups and the owning-resource capability
//!
//! Field groups are fetched per owning object from a type-specific
//! controller and updated in one batched write: every field of every group
//! contributes its pairs to a single outgoing mapping.

use std::fmt;

use tracing::debug;

use crate::client::Client;
use crate::custom_field::CustomField;
use crate::object::{BuildScope, BuiltData, Cached, ResourceId};
use crate::wire::WireNode;
use crate::Result;

/// One titled group of custom fields as returned by the server
#[derive(Debug, Clone, PartialEq)]
pub struct CustomFieldGroup {
    id: i64,
    title: String,
    fields: Vec<CustomField>,
}

impl CustomFieldGroup {
    /// Parse one group element; a field with an unknown type discriminator
    /// fails the whole group
    pub fn parse(
        node: &WireNode,
        definitions: &[super::CustomFieldDefinition],
    ) -> Result<Self> {
        let id = node.req_attr_int("id")?;
        let title = node.attr("title").unwrap_or_default().to_string();
        let mut fields = Vec::new();
        for field_node in node.children("field") {
            fields.push(CustomField::parse(field_node, definitions)?);
        }
        Ok(Self { id, title, fields })
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn fields(&self) -> &[CustomField] {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut [CustomField] {
        &mut self.fields
    }

    pub fn field(&self, name: &str) -> Option<&CustomField> {
        self.fields.iter().find(|f| f.name() == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut CustomField> {
        self.fields.iter_mut().find(|f| f.name() == name)
    }

    /// Contribution of this group's fields to the batched write
    pub fn build(&self, scope: BuildScope) -> Result<BuiltData> {
        let mut built = BuiltData::default();
        for field in &self.fields {
            field.validate()?;
            built.merge(field.build(scope)?);
        }
        Ok(built)
    }
}

impl fmt::Display for CustomFieldGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} fields)", self.title, self.fields.len())
    }
}

/// Capability component embedded in resources that own custom field groups.
///
/// Holds the type-specific group controller and memoizes the fetched groups
/// until a reload is forced or an update invalidates them.
#[derive(Debug, Clone)]
pub struct FieldGroups {
    controller: &'static str,
    cache: Cached<Vec<CustomFieldGroup>>,
}

impl FieldGroups {
    pub fn new(controller: &'static str) -> Self {
        Self {
            controller,
            cache: Cached::new(),
        }
    }

    pub fn controller(&self) -> &'static str {
        self.controller
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.is_loaded()
    }

    /// Fetch (or return the memoized) groups for the owning object
    pub fn get(
        &mut self,
        client: &Client,
        owner: &ResourceId,
        reload: bool,
    ) -> Result<&[CustomFieldGroup]> {
        let controller = self.controller;
        let groups = self
            .cache
            .get_or_load(reload, || client.custom_field_groups(controller, owner))?;
        Ok(groups)
    }

    /// Look up one loaded field by wire name across all groups
    pub fn field(&self, name: &str) -> Option<&CustomField> {
        self.cache
            .get()?
            .iter()
            .find_map(|group| group.field(name))
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut CustomField> {
        self.cache
            .get_mut()?
            .iter_mut()
            .find_map(|group| group.field_mut(name))
    }

    /// Batched outgoing mapping of every loaded field
    pub fn build(&self, scope: BuildScope) -> Result<BuiltData> {
        let mut built = BuiltData::default();
        if let Some(groups) = self.cache.get() {
            for group in groups {
                built.merge(group.build(scope)?);
            }
        }
        Ok(built)
    }

    /// Send every loaded field back in one write, re-populating the cache
    /// from the server's response
    pub fn update(&mut self, client: &Client, owner: &ResourceId) -> Result<()> {
        if !self.cache.is_loaded() {
            debug!(controller = self.controller, "no custom field groups loaded, nothing to update");
            return Ok(());
        }
        let built = self.build(BuildScope::Update)?;
        let refreshed = client.update_custom_field_groups(self.controller, owner, built)?;
        match refreshed {
            Some(groups) => self.cache.set(groups),
            None => self.cache.invalidate(),
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn set_groups(&mut self, groups: Vec<CustomFieldGroup>) {
        self.cache.set(groups);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::custom_field::definition::{CustomFieldDefinition, FieldOption};
    use crate::object::ApiResource;

    fn defs() -> Vec<CustomFieldDefinition> {
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
        ]);
        vec![def]
    }

    fn group_node() -> WireNode {
        WireNode::new()
            .set_attr("id", "3")
            .set_attr("title", "Details")
            .push_child(
                "field",
                WireNode::new()
                    .set_attr("id", "5")
                    .set_attr("type", "1")
                    .set_attr("name", "serial")
                    .set_attr("title", "Serial")
                    .set_text("ABC-123"),
            )
            .push_child(
                "field",
                WireNode::new()
                    .set_attr("id", "6")
                    .set_attr("type", "12")
                    .set_attr("name", "color")
                    .set_attr("title", "Color")
                    .set_text("Red, Blue"),
            )
    }

    #[test]
    fn test_group_parse_and_lookup() {
        let group = CustomFieldGroup::parse(&group_node(), &defs()).unwrap();
        assert_eq!(group.id(), 3);
        assert_eq!(group.title(), "Details");
        assert_eq!(group.fields().len(), 2);
        assert_eq!(group.field("serial").map(|f| f.raw_value()), Some("ABC-123"));
        assert!(group.field("missing").is_none());
    }

    #[test]
    fn test_unknown_field_type_fails_the_group() {
        let node = WireNode::new().set_attr("id", "3").push_child(
            "field",
            WireNode::new()
                .set_attr("id", "5")
                .set_attr("type", "77")
                .set_attr("name", "odd")
                .set_text(""),
        );
        let err = CustomFieldGroup::parse(&node, &[]).unwrap_err();
        assert!(err.is_data_format());
    }

    #[test]
    fn test_group_build_merges_all_fields() {
        let group = CustomFieldGroup::parse(&group_node(), &defs()).unwrap();
        let built = group.build(BuildScope::Update).unwrap();
        assert_eq!(
            built.form.encoded_pairs(),
            vec![
                ("serial".to_string(), "ABC-123".to_string()),
                ("color[0]".to_string(), "1".to_string()),
                ("color[1]".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_field_groups_lookup_spans_groups() {
        let mut groups = FieldGroups::new("/Tickets/TicketCustomField");
        let first = CustomFieldGroup::parse(&group_node(), &defs()).unwrap();
        let second_node = WireNode::new().set_attr("id", "4").push_child(
            "field",
            WireNode::new()
                .set_attr("id", "7")
                .set_attr("type", "1")
                .set_attr("name", "notes")
                .set_attr("title", "Notes")
                .set_text("n/a"),
        );
        let second = CustomFieldGroup::parse(&second_node, &[]).unwrap();
        groups.set_groups(vec![first, second]);

        assert!(groups.is_loaded());
        assert_eq!(groups.field("notes").map(|f| f.raw_value()), Some("n/a"));
        groups
            .field_mut("notes")
            .unwrap()
            .set_value("updated")
            .unwrap();
        assert_eq!(groups.field("notes").map(|f| f.raw_value()), Some("updated"));

        let built = groups.build(BuildScope::Update).unwrap();
        assert_eq!(built.form.scalar("notes"), Some("updated"));
        assert_eq!(built.form.len(), 3);
    }
}
