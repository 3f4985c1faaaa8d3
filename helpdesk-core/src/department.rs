//! Departments
//!
//! Departments are the routing tree of the helpdesk: each one belongs to a
//! module, may sit under a parent department, and can restrict visibility
//! to an explicit set of user groups.

use std::fmt;

use crate::client::Client;
use crate::coerce::{self, ConstantGroup};
use crate::form::FormData;
use crate::object::{
    check_required_fields, ApiResource, BuildScope, BuiltData, Cached, DeclaredFields,
    FieldDeclaration, ResourceId,
};
use crate::result_set::{FieldAccess, FieldToken};
use crate::wire::WireNode;
use crate::{Error, Result};

/// Visibility types a department can have
pub static TYPE: ConstantGroup = ConstantGroup::new("department type", &["public", "private"]);

/// Product modules a department can belong to
pub static MODULE: ConstantGroup =
    ConstantGroup::new("department module", &["tickets", "livechat"]);

pub const TYPE_PUBLIC: &str = "public";
pub const TYPE_PRIVATE: &str = "private";
pub const MODULE_TICKETS: &str = "tickets";
pub const MODULE_LIVECHAT: &str = "livechat";

#[derive(Debug, Clone)]
pub struct Department {
    id: Option<i64>,
    title: String,
    department_type: String,
    module: String,
    display_order: i64,
    parent_department_id: Option<i64>,
    user_visibility_custom: bool,
    user_group_ids: Vec<i64>,
    parent: Cached<Box<Department>>,
}

static FIELDS: &[FieldDeclaration] = &[
    FieldDeclaration::new("id", "id").filter_order(),
    FieldDeclaration::new("title", "title").required().filter_order(),
    FieldDeclaration::new("type", "type").required().filter(),
    FieldDeclaration::new("module", "module").required_create().filter(),
    FieldDeclaration::new("display_order", "displayorder").filter_order(),
    FieldDeclaration::new("parent_department_id", "parentdepartmentid").filter(),
    FieldDeclaration::new("user_visibility_custom", "uservisibilitycustom").filter(),
];

impl Department {
    /// Start a new top-level public tickets department
    pub fn create_new<S: Into<String>>(title: S) -> Self {
        Self {
            id: None,
            title: title.into(),
            department_type: TYPE_PUBLIC.to_string(),
            module: MODULE_TICKETS.to_string(),
            display_order: 0,
            parent_department_id: None,
            user_visibility_custom: false,
            user_group_ids: Vec::new(),
            parent: Cached::new(),
        }
    }

    /// Start a new department under this one, inheriting type and module.
    ///
    /// This department must already be persisted so the child can reference
    /// its identifier.
    pub fn new_subdepartment<S: Into<String>>(&self, title: S) -> Result<Department> {
        let parent_id = self.id.ok_or_else(|| {
            Error::unsupported(
                "Department",
                "new_subdepartment",
                "the parent department has not been created yet",
            )
        })?;
        let mut child = Department::create_new(title);
        child.department_type = self.department_type.clone();
        child.module = self.module.clone();
        child.parent_department_id = Some(parent_id);
        Ok(child)
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn department_type(&self) -> &str {
        &self.department_type
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn display_order(&self) -> i64 {
        self.display_order
    }

    pub fn parent_department_id(&self) -> Option<i64> {
        self.parent_department_id
    }

    pub fn user_visibility_custom(&self) -> bool {
        self.user_visibility_custom
    }

    pub fn user_group_ids(&self) -> &[i64] {
        &self.user_group_ids
    }

    pub fn set_title<S: Into<String>>(&mut self, title: S) -> &mut Self {
        self.title = title.into();
        self
    }

    pub fn set_type(&mut self, value: &str) -> Result<&mut Self> {
        check_member(&TYPE, "type", value)?;
        self.department_type = value.to_string();
        Ok(self)
    }

    pub fn set_module(&mut self, value: &str) -> Result<&mut Self> {
        check_member(&MODULE, "module", value)?;
        self.module = value.to_string();
        Ok(self)
    }

    pub fn set_display_order(&mut self, order: i64) -> &mut Self {
        self.display_order = order;
        self
    }

    pub fn set_parent_department_id(&mut self, id: Option<i64>) -> &mut Self {
        self.parent_department_id = id;
        self.parent.invalidate();
        self
    }

    /// Restrict visibility to the given user groups; an empty restriction
    /// reverts to full visibility
    pub fn set_user_groups(&mut self, ids: Vec<i64>) -> &mut Self {
        self.user_visibility_custom = !ids.is_empty();
        self.user_group_ids = ids;
        self
    }

    /// The parent department, fetched lazily and memoized
    pub fn parent(&mut self, client: &Client, reload: bool) -> Result<Option<&Department>> {
        let Some(parent_id) = self.parent_department_id else {
            return Ok(None);
        };
        let parent = self.parent.get_or_load(reload, || {
            client
                .get::<Department>(&ResourceId::scalar(parent_id))
                .map(Box::new)
        })?;
        Ok(Some(&**parent))
    }
}

impl DeclaredFields for Department {
    fn fields() -> &'static [FieldDeclaration] {
        FIELDS
    }
}

impl FieldAccess for Department {
    fn field(&self, name: &str) -> Option<FieldToken> {
        match name {
            "id" => self.id.map(FieldToken::Int),
            "title" => Some(FieldToken::Str(self.title.clone())),
            "type" => Some(FieldToken::Str(self.department_type.clone())),
            "module" => Some(FieldToken::Str(self.module.clone())),
            "display_order" => Some(FieldToken::Int(self.display_order)),
            "parent_department_id" => self.parent_department_id.map(FieldToken::Int),
            "user_visibility_custom" => Some(FieldToken::Bool(self.user_visibility_custom)),
            _ => None,
        }
    }
}

impl ApiResource for Department {
    const CONTROLLER: &'static str = "/Base/Department";
    const XML_NAME: &'static str = "department";
    const RESOURCE: &'static str = "Department";

    fn parse(node: &WireNode) -> Result<Self> {
        Ok(Self {
            id: Some(node.req_child_int("id")?),
            title: node.child_string("title").unwrap_or_default(),
            department_type: coerce::assure_constant(
                node.child_text("type"),
                &TYPE,
                Some(TYPE_PUBLIC),
            )
            .unwrap_or_else(|| TYPE_PUBLIC.to_string()),
            module: coerce::assure_constant(
                node.child_text("module"),
                &MODULE,
                Some(MODULE_TICKETS),
            )
            .unwrap_or_else(|| MODULE_TICKETS.to_string()),
            display_order: node.child_int("displayorder").unwrap_or(0),
            parent_department_id: node.child_positive_int("parentdepartmentid"),
            user_visibility_custom: node.child_bool("uservisibilitycustom"),
            user_group_ids: node.child_int_list("usergroups", "id"),
            parent: Cached::new(),
        })
    }

    fn build(&self, scope: BuildScope) -> Result<BuiltData> {
        let mut form = FormData::new();
        form.put("title", self.title.clone());
        form.put("type", self.department_type.clone());
        form.put("module", self.module.clone());
        form.put_int("displayorder", self.display_order);
        form.put_positive_int("parentdepartmentid", self.parent_department_id);
        form.put_bool("uservisibilitycustom", self.user_visibility_custom);
        if self.user_visibility_custom {
            form.put_repeated_ints("usergroupid", &self.user_group_ids);
        }
        check_required_fields(Self::RESOURCE, FIELDS, scope, &form)?;
        Ok(BuiltData::new(form))
    }

    fn id(&self) -> Option<ResourceId> {
        self.id.map(ResourceId::scalar)
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.title, self.department_type)
    }
}

fn check_member(group: &ConstantGroup, field: &'static str, value: &str) -> Result<()> {
    if group.contains(value) {
        Ok(())
    } else {
        Err(Error::validation(
            field,
            format!("'{}' is not a valid {}", value, group.name),
        ))
    }
}
