//! Client-side lifecycle coordination
//!
//! The [`Client`] owns the transport and the memoized custom field
//! definition list, and enforces the object state machine: a new object
//! (no identifier) can only be created, a persisted one can only be
//! updated, deleted or refreshed, and read-only types reject every write.
//! Every rule is checked before a single byte leaves the process.

use std::cell::RefCell;

use tracing::{debug, info};

use crate::custom_field::{CustomFieldDefinition, CustomFieldGroup, FieldOption};
use crate::object::{ApiResource, BuildScope, BuiltData, Cached, ResourceId};
use crate::result_set::ResultSet;
use crate::transport::Transport;
use crate::wire::WireNode;
use crate::{Error, Result};

/// Entry point for all remote operations
pub struct Client {
    transport: Box<dyn Transport>,
    definitions: RefCell<Cached<Vec<CustomFieldDefinition>>>,
}

impl Client {
    pub fn new(transport: Box<dyn Transport>) -> Self {
        Self {
            transport,
            definitions: RefCell::new(Cached::new()),
        }
    }

    /// Fetch every instance of a resource type
    pub fn get_all<T: ApiResource>(&self) -> Result<ResultSet<T>> {
        self.get_all_with(&[])
    }

    /// Fetch instances through the type's controller with extra positional
    /// parameters, e.g. a parent identifier
    pub fn get_all_with<T: ApiResource>(&self, params: &[String]) -> Result<ResultSet<T>> {
        debug!(resource = T::RESOURCE, controller = T::CONTROLLER, "listing");
        let root = self.transport.get(T::CONTROLLER, params)?;
        let set = parse_set::<T>(&root)?;
        debug!(resource = T::RESOURCE, count = set.len(), "listed");
        Ok(set)
    }

    /// Fetch one instance by identifier
    pub fn get<T: ApiResource>(&self, id: &ResourceId) -> Result<T> {
        debug!(resource = T::RESOURCE, %id, "fetching");
        let root = self.transport.get(T::CONTROLLER, &id.path_params())?;
        let node = root.child(T::XML_NAME).ok_or_else(|| {
            Error::data_format(format!("response carries no '{}' element", T::XML_NAME))
        })?;
        T::parse(node)
    }

    /// Create a new object, re-populating it from the server's response
    pub fn create<T: ApiResource>(&self, object: &mut T) -> Result<()> {
        check_writable::<T>("create")?;
        if let Some(id) = object.id() {
            return Err(Error::unsupported(
                T::RESOURCE,
                "create",
                format!("the object is already persisted with id {}", id),
            ));
        }
        let built = object.build(BuildScope::Create)?;
        let response = self
            .transport
            .post(T::CONTROLLER, &[], &built.form, &built.files)?;
        if let Some(root) = response {
            let node = root.child(T::XML_NAME).ok_or_else(|| {
                Error::data_format(format!("response carries no '{}' element", T::XML_NAME))
            })?;
            object.apply(T::parse(node)?);
        }
        info!(resource = T::RESOURCE, id = ?object.id(), "created");
        Ok(())
    }

    /// Send a persisted object's state back to the server
    pub fn update<T: ApiResource>(&self, object: &mut T) -> Result<()> {
        check_writable::<T>("update")?;
        if !T::SUPPORTS_UPDATE {
            return Err(Error::unsupported(
                T::RESOURCE,
                "update",
                "this type cannot be re-sent once created",
            ));
        }
        let id = require_id(object, "update")?;
        let built = object.build(BuildScope::Update)?;
        let response =
            self.transport
                .put(T::CONTROLLER, &id.path_params(), &built.form, &built.files)?;
        if let Some(root) = response {
            let node = root.child(T::XML_NAME).ok_or_else(|| {
                Error::data_format(format!("response carries no '{}' element", T::XML_NAME))
            })?;
            object.apply(T::parse(node)?);
        }
        info!(resource = T::RESOURCE, %id, "updated");
        Ok(())
    }

    /// Destroy a persisted object on the server
    pub fn delete<T: ApiResource>(&self, object: &T) -> Result<()> {
        check_writable::<T>("delete")?;
        let id = require_id(object, "delete")?;
        self.transport.delete(T::CONTROLLER, &id.path_params())?;
        info!(resource = T::RESOURCE, %id, "deleted");
        Ok(())
    }

    /// Re-fetch a persisted object, discarding local state
    pub fn refresh<T: ApiResource>(&self, object: &mut T) -> Result<()> {
        let id = require_id(object, "refresh")?;
        object.apply(self.get::<T>(&id)?);
        Ok(())
    }

    /// The server's custom field definitions, fetched once per client.
    ///
    /// Option lists are resolved eagerly for every option-bearing
    /// definition, so field parsing never needs the transport.
    pub fn definitions(&self, reload: bool) -> Result<Vec<CustomFieldDefinition>> {
        let mut cache = self.definitions.borrow_mut();
        let definitions = cache.get_or_load(reload, || {
            debug!("fetching custom field definitions");
            let root = self.transport.get(CustomFieldDefinition::CONTROLLER, &[])?;
            let mut definitions = Vec::new();
            for node in root.children(CustomFieldDefinition::XML_NAME) {
                let mut definition = CustomFieldDefinition::parse(node)?;
                if definition.field_type().has_options() {
                    definition.set_options(self.field_options(definition.id())?);
                }
                definitions.push(definition);
            }
            debug!(count = definitions.len(), "fetched custom field definitions");
            Ok(definitions)
        })?;
        Ok(definitions.clone())
    }

    fn field_options(&self, definition_id: i64) -> Result<Vec<FieldOption>> {
        let params = vec!["ListOptions".to_string(), definition_id.to_string()];
        let root = self
            .transport
            .get(CustomFieldDefinition::CONTROLLER, &params)?;
        root.children("option").iter().map(FieldOption::parse).collect()
    }

    /// Fetch the custom field groups of one owning object
    pub fn custom_field_groups(
        &self,
        controller: &str,
        owner: &ResourceId,
    ) -> Result<Vec<CustomFieldGroup>> {
        let definitions = self.definitions(false)?;
        debug!(controller, %owner, "fetching custom field groups");
        let root = self.transport.get(controller, &owner.path_params())?;
        parse_groups(&root, &definitions)
    }

    /// Send one owning object's batched custom field write
    pub fn update_custom_field_groups(
        &self,
        controller: &str,
        owner: &ResourceId,
        built: BuiltData,
    ) -> Result<Option<Vec<CustomFieldGroup>>> {
        debug!(controller, %owner, "updating custom field groups");
        let response =
            self.transport
                .post(controller, &owner.path_params(), &built.form, &built.files)?;
        match response {
            Some(root) => {
                let definitions = self.definitions(false)?;
                Ok(Some(parse_groups(&root, &definitions)?))
            }
            None => Ok(None),
        }
    }
}

fn parse_set<T: ApiResource>(root: &WireNode) -> Result<ResultSet<T>> {
    root.children(T::XML_NAME)
        .iter()
        .map(T::parse)
        .collect::<Result<Vec<T>>>()
        .map(ResultSet::new)
}

fn parse_groups(
    root: &WireNode,
    definitions: &[CustomFieldDefinition],
) -> Result<Vec<CustomFieldGroup>> {
    root.children("group")
        .iter()
        .map(|node| CustomFieldGroup::parse(node, definitions))
        .collect()
}

fn check_writable<T: ApiResource>(operation: &'static str) -> Result<()> {
    if T::READ_ONLY {
        return Err(Error::unsupported(
            T::RESOURCE,
            operation,
            "this type is read-only",
        ));
    }
    Ok(())
}

fn require_id<T: ApiResource>(object: &T, operation: &'static str) -> Result<ResourceId> {
    object.id().ok_or_else(|| {
        Error::unsupported(
            T::RESOURCE,
            operation,
            "the object has not been created yet",
        )
    })
}
