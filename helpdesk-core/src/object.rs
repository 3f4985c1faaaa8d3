//! Generic object lifecycle
//!
//! Every remote resource type implements [`ApiResource`]: how to parse one
//! decoded wire element into a typed value, how to build the outgoing flat
//! mapping back, its identity, and a static table of [`FieldDeclaration`]s
//! driving required-field validation and the result-set filter/order surface.
//!
//! An object is either new (no identifier, create-eligible) or persisted
//! (identifier present, update/delete-eligible); the [`Client`](crate::client::Client)
//! enforces the state machine before any transport call.

use std::fmt;

use regex::Regex;

use crate::form::{FileMap, FormData, FormValue};
use crate::result_set::FieldAccess;
use crate::wire::WireNode;
use crate::{Error, Result};

/// When a required field must be present
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    Optional,
    /// Required on both create and update
    Always,
    /// Required on create only
    Create,
    /// Required on update only
    Update,
}

impl Requirement {
    pub fn applies(self, scope: BuildScope) -> bool {
        match self {
            Requirement::Optional => false,
            Requirement::Always => true,
            Requirement::Create => scope == BuildScope::Create,
            Requirement::Update => scope == BuildScope::Update,
        }
    }
}

/// Which write operation a build is for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildScope {
    Create,
    Update,
}

/// Static metadata for one declared attribute of a resource type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDeclaration {
    /// Field name as exposed to filtering and ordering
    pub name: &'static str,
    /// Field name on the wire (build output key)
    pub wire_name: &'static str,
    pub requirement: Requirement,
    /// Optional regex the built value must match
    pub pattern: Option<&'static str>,
    pub filterable: bool,
    pub orderable: bool,
}

impl FieldDeclaration {
    pub const fn new(name: &'static str, wire_name: &'static str) -> Self {
        Self {
            name,
            wire_name,
            requirement: Requirement::Optional,
            pattern: None,
            filterable: false,
            orderable: false,
        }
    }

    pub const fn required(mut self) -> Self {
        self.requirement = Requirement::Always;
        self
    }

    pub const fn required_create(mut self) -> Self {
        self.requirement = Requirement::Create;
        self
    }

    pub const fn required_update(mut self) -> Self {
        self.requirement = Requirement::Update;
        self
    }

    pub const fn pattern(mut self, pattern: &'static str) -> Self {
        self.pattern = Some(pattern);
        self
    }

    pub const fn filter(mut self) -> Self {
        self.filterable = true;
        self
    }

    pub const fn order(mut self) -> Self {
        self.orderable = true;
        self
    }

    pub const fn filter_order(self) -> Self {
        self.filter().order()
    }
}

/// Resource identity: a scalar id or a composite key ordered as it appears
/// in the request path (parent ids first, own id last)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceId(Vec<i64>);

impl ResourceId {
    pub fn scalar(id: i64) -> Self {
        Self(vec![id])
    }

    pub fn composite(parts: Vec<i64>) -> Self {
        debug_assert!(!parts.is_empty());
        Self(parts)
    }

    /// The object's own identifier (last component of a composite key)
    pub fn value(&self) -> i64 {
        *self.0.last().unwrap_or(&0)
    }

    pub fn parts(&self) -> &[i64] {
        &self.0
    }

    /// Path parameters for transport calls addressing this object
    pub fn path_params(&self) -> Vec<String> {
        self.0.iter().map(i64::to_string).collect()
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.0.iter().map(i64::to_string).collect();
        write!(f, "{}", rendered.join(", "))
    }
}

/// Output of a resource's build step
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BuiltData {
    pub form: FormData,
    pub files: FileMap,
}

impl BuiltData {
    pub fn new(form: FormData) -> Self {
        Self {
            form,
            files: FileMap::new(),
        }
    }

    pub fn with_files(form: FormData, files: FileMap) -> Self {
        Self { form, files }
    }

    pub fn merge(&mut self, other: BuiltData) {
        self.form.merge(other.form);
        self.files.merge(other.files);
    }
}

/// Static field declaration surface, shared by full resources and by
/// parse-only types that still participate in result-set filtering
pub trait DeclaredFields {
    fn fields() -> &'static [FieldDeclaration];
}

/// Contract every remote resource type implements
pub trait ApiResource: DeclaredFields + FieldAccess + fmt::Display + Sized {
    /// Controller path on the remote API
    const CONTROLLER: &'static str;
    /// Wire tag name of one resource instance
    const XML_NAME: &'static str;
    /// Human-readable type name used in error context
    const RESOURCE: &'static str;
    /// Read-only types forbid create, update and delete
    const READ_ONLY: bool = false;
    /// Types that cannot be re-sent once created (update forbidden)
    const SUPPORTS_UPDATE: bool = true;

    /// Parse one decoded wire element into a typed instance.
    ///
    /// Must tolerate missing optional keys and must not produce a partially
    /// populated object for malformed input.
    fn parse(node: &WireNode) -> Result<Self>;

    /// Emit the outgoing flat mapping for a create or update, validating
    /// required fields first
    fn build(&self, scope: BuildScope) -> Result<BuiltData>;

    /// Identity, absent while the object is new
    fn id(&self) -> Option<ResourceId>;

    /// Re-populate from a server response, discarding local state
    fn apply(&mut self, other: Self) {
        *self = other;
    }
}

/// Validates the built mapping against the type's field declarations.
///
/// Runs before the mapping leaves the process: a required field that is
/// absent or empty, or a declared pattern that fails to match, halts the
/// operation before any network call.
pub fn check_required_fields(
    resource: &'static str,
    declarations: &[FieldDeclaration],
    scope: BuildScope,
    form: &FormData,
) -> Result<()> {
    for decl in declarations {
        let value = form.get(decl.wire_name);
        let present = match value {
            Some(FormValue::Scalar(v)) => !v.trim().is_empty(),
            Some(FormValue::Repeated(v)) | Some(FormValue::Indexed(v)) => !v.is_empty(),
            None => false,
        };
        if decl.requirement.applies(scope) && !present {
            let operation = match scope {
                BuildScope::Create => "create",
                BuildScope::Update => "update",
            };
            return Err(Error::validation(
                decl.wire_name,
                format!("{} requires '{}' on {}", resource, decl.wire_name, operation),
            ));
        }
        if let (Some(pattern), Some(FormValue::Scalar(v))) = (decl.pattern, value) {
            let re = Regex::new(pattern).map_err(|e| {
                Error::validation(decl.wire_name, format!("invalid field pattern: {}", e))
            })?;
            if !re.is_match(v) {
                return Err(Error::validation(
                    decl.wire_name,
                    format!("value '{}' does not match pattern '{}'", v, pattern),
                ));
            }
        }
    }
    Ok(())
}

/// Explicit memoization cell for lazily resolved relationships and
/// sub-collections: at most one load per process unless a reload is forced.
#[derive(Debug, Clone, Default)]
pub struct Cached<T> {
    value: Option<T>,
}

impl<T> Cached<T> {
    pub fn new() -> Self {
        Self { value: None }
    }

    pub fn is_loaded(&self) -> bool {
        self.value.is_some()
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    pub fn get_mut(&mut self) -> Option<&mut T> {
        self.value.as_mut()
    }

    pub fn set(&mut self, value: T) {
        self.value = Some(value);
    }

    pub fn invalidate(&mut self) {
        self.value = None;
    }

    /// Return the memoized value, loading it on first access or when a
    /// reload is forced
    pub fn get_or_load<F>(&mut self, reload: bool, loader: F) -> Result<&T>
    where
        F: FnOnce() -> Result<T>,
    {
        match self.value.take() {
            Some(existing) if !reload => Ok(&*self.value.insert(existing)),
            _ => {
                let loaded = loader()?;
                Ok(&*self.value.insert(loaded))
            }
        }
    }
}
