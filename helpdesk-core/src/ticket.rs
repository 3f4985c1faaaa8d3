//! Tickets, their attachments and types
//!
//! The ticket type here is deliberately narrow: identity, routing and the
//! custom field group capability. Attachments address themselves through a
//! composite key (ticket first, own id last) and inline their contents as
//! base64 on the wire; ticket types are a server-managed lookup table.

use std::fmt;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use chrono::{DateTime, Utc};

use crate::client::Client;
use crate::coerce;
use crate::custom_field::{CustomField, CustomFieldGroup, FieldGroups};
use crate::form::FormData;
use crate::object::{
    check_required_fields, ApiResource, BuildScope, BuiltData, Cached, DeclaredFields,
    FieldDeclaration, ResourceId,
};
use crate::result_set::{FieldAccess, FieldToken};
use crate::wire::WireNode;
use crate::{Error, Result};

const CUSTOM_FIELD_CONTROLLER: &str = "/Tickets/TicketCustomField";

#[derive(Debug, Clone)]
pub struct Ticket {
    id: Option<i64>,
    subject: String,
    full_name: String,
    email: String,
    contents: String,
    department_id: Option<i64>,
    status_id: Option<i64>,
    priority_id: Option<i64>,
    type_id: Option<i64>,
    dateline: Option<DateTime<Utc>>,
    field_groups: FieldGroups,
}

static TICKET_FIELDS: &[FieldDeclaration] = &[
    FieldDeclaration::new("id", "id").filter_order(),
    FieldDeclaration::new("subject", "subject").required().filter_order(),
    FieldDeclaration::new("full_name", "fullname").required_create().filter_order(),
    FieldDeclaration::new("email", "email")
        .required_create()
        .pattern("^[^@\\s]+@[^@\\s]+\\.[^@\\s]+$")
        .filter(),
    FieldDeclaration::new("contents", "contents").required_create(),
    FieldDeclaration::new("department_id", "departmentid").required().filter(),
    FieldDeclaration::new("status_id", "ticketstatusid").filter(),
    FieldDeclaration::new("priority_id", "ticketpriorityid").filter(),
    FieldDeclaration::new("type_id", "tickettypeid").filter(),
    FieldDeclaration::new("dateline", "dateline").order(),
];

impl Ticket {
    /// Start a new ticket from an end user's first message
    pub fn create_new<S, N, E, C>(subject: S, full_name: N, email: E, contents: C) -> Self
    where
        S: Into<String>,
        N: Into<String>,
        E: Into<String>,
        C: Into<String>,
    {
        Self {
            id: None,
            subject: subject.into(),
            full_name: full_name.into(),
            email: email.into(),
            contents: contents.into(),
            department_id: None,
            status_id: None,
            priority_id: None,
            type_id: None,
            dateline: None,
            field_groups: FieldGroups::new(CUSTOM_FIELD_CONTROLLER),
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn department_id(&self) -> Option<i64> {
        self.department_id
    }

    pub fn status_id(&self) -> Option<i64> {
        self.status_id
    }

    pub fn priority_id(&self) -> Option<i64> {
        self.priority_id
    }

    pub fn type_id(&self) -> Option<i64> {
        self.type_id
    }

    pub fn dateline(&self) -> Option<DateTime<Utc>> {
        self.dateline
    }

    pub fn set_subject<S: Into<String>>(&mut self, subject: S) -> &mut Self {
        self.subject = subject.into();
        self
    }

    pub fn set_department_id(&mut self, id: i64) -> &mut Self {
        self.department_id = Some(id);
        self
    }

    pub fn set_status_id(&mut self, id: i64) -> &mut Self {
        self.status_id = Some(id);
        self
    }

    pub fn set_priority_id(&mut self, id: i64) -> &mut Self {
        self.priority_id = Some(id);
        self
    }

    pub fn set_type_id(&mut self, id: i64) -> &mut Self {
        self.type_id = Some(id);
        self
    }

    fn persisted_id(&self, operation: &'static str) -> Result<ResourceId> {
        self.id().ok_or_else(|| {
            Error::unsupported(
                Self::RESOURCE,
                operation,
                "the ticket has not been created yet",
            )
        })
    }

    /// The ticket's custom field groups, fetched lazily and memoized
    pub fn custom_field_groups(
        &mut self,
        client: &Client,
        reload: bool,
    ) -> Result<&[CustomFieldGroup]> {
        let owner = self.persisted_id("custom_field_groups")?;
        self.field_groups.get(client, &owner, reload)
    }

    /// Look up one loaded custom field by wire name
    pub fn custom_field(&self, name: &str) -> Option<&CustomField> {
        self.field_groups.field(name)
    }

    pub fn custom_field_mut(&mut self, name: &str) -> Option<&mut CustomField> {
        self.field_groups.field_mut(name)
    }

    /// Send every loaded custom field back in one write
    pub fn update_custom_fields(&mut self, client: &Client) -> Result<()> {
        let owner = self.persisted_id("update_custom_fields")?;
        self.field_groups.update(client, &owner)
    }
}

impl DeclaredFields for Ticket {
    fn fields() -> &'static [FieldDeclaration] {
        TICKET_FIELDS
    }
}

impl FieldAccess for Ticket {
    fn field(&self, name: &str) -> Option<FieldToken> {
        match name {
            "id" => self.id.map(FieldToken::Int),
            "subject" => Some(FieldToken::Str(self.subject.clone())),
            "full_name" => Some(FieldToken::Str(self.full_name.clone())),
            "email" => Some(FieldToken::Str(self.email.clone())),
            "contents" => Some(FieldToken::Str(self.contents.clone())),
            "department_id" => self.department_id.map(FieldToken::Int),
            "status_id" => self.status_id.map(FieldToken::Int),
            "priority_id" => self.priority_id.map(FieldToken::Int),
            "type_id" => self.type_id.map(FieldToken::Int),
            "dateline" => self.dateline.map(|d| FieldToken::Int(d.timestamp())),
            _ => None,
        }
    }
}

impl ApiResource for Ticket {
    const CONTROLLER: &'static str = "/Tickets/Ticket";
    const XML_NAME: &'static str = "ticket";
    const RESOURCE: &'static str = "Ticket";

    fn parse(node: &WireNode) -> Result<Self> {
        let id = match node.attr_int("id") {
            Some(id) if id > 0 => id,
            _ => node.req_child_int("id")?,
        };
        Ok(Self {
            id: Some(id),
            subject: node.child_string("subject").unwrap_or_default(),
            full_name: node.child_string("fullname").unwrap_or_default(),
            email: node.child_string("email").unwrap_or_default(),
            contents: node.child_string("contents").unwrap_or_default(),
            department_id: node.child_positive_int("departmentid"),
            status_id: node.child_positive_int("statusid"),
            priority_id: node.child_positive_int("priorityid"),
            type_id: node.child_positive_int("typeid"),
            dateline: node
                .child_int("dateline")
                .filter(|&ts| ts > 0)
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
            field_groups: FieldGroups::new(CUSTOM_FIELD_CONTROLLER),
        })
    }

    fn build(&self, scope: BuildScope) -> Result<BuiltData> {
        let mut form = FormData::new();
        form.put("subject", self.subject.clone());
        if scope == BuildScope::Create {
            form.put("fullname", self.full_name.clone());
            form.put("email", self.email.clone());
            form.put("contents", self.contents.clone());
        }
        form.put_positive_int("departmentid", self.department_id);
        form.put_positive_int("ticketstatusid", self.status_id);
        form.put_positive_int("ticketpriorityid", self.priority_id);
        form.put_positive_int("tickettypeid", self.type_id);
        check_required_fields(Self::RESOURCE, TICKET_FIELDS, scope, &form)?;
        Ok(BuiltData::new(form))
    }

    fn id(&self) -> Option<ResourceId> {
        self.id.map(ResourceId::scalar)
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.subject)
    }
}

/// One file attached to a ticket post.
///
/// Addressed by a composite key: the owning ticket first, the attachment's
/// own identifier last. List responses omit the contents; they are fetched
/// on demand and memoized.
#[derive(Debug, Clone)]
pub struct TicketAttachment {
    id: Option<i64>,
    ticket_id: i64,
    ticket_post_id: i64,
    file_name: String,
    file_size: u64,
    file_type: Option<String>,
    dateline: Option<DateTime<Utc>>,
    contents: Cached<Vec<u8>>,
}

static ATTACHMENT_FIELDS: &[FieldDeclaration] = &[
    FieldDeclaration::new("id", "id").filter_order(),
    FieldDeclaration::new("ticket_id", "ticketid").required_create().filter(),
    FieldDeclaration::new("ticket_post_id", "ticketpostid").required_create().filter(),
    FieldDeclaration::new("file_name", "filename").required_create().filter_order(),
    FieldDeclaration::new("file_size", "filesize").filter_order(),
    FieldDeclaration::new("contents", "contents").required_create(),
    FieldDeclaration::new("dateline", "dateline").order(),
];

impl TicketAttachment {
    /// Start a new attachment on the given ticket post
    pub fn create_new<S: Into<String>>(
        ticket_id: i64,
        ticket_post_id: i64,
        file_name: S,
        contents: Vec<u8>,
    ) -> Self {
        let file_size = contents.len() as u64;
        let mut cached = Cached::new();
        cached.set(contents);
        Self {
            id: None,
            ticket_id,
            ticket_post_id,
            file_name: file_name.into(),
            file_size,
            file_type: None,
            dateline: None,
            contents: cached,
        }
    }

    pub fn ticket_id(&self) -> i64 {
        self.ticket_id
    }

    pub fn ticket_post_id(&self) -> i64 {
        self.ticket_post_id
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn file_size(&self) -> u64 {
        self.file_size
    }

    /// File size rendered with a binary-unit suffix, e.g. `"2.00 KB"`
    pub fn file_size_formatted(&self) -> String {
        coerce::format_bytes(self.file_size)
    }

    pub fn file_type(&self) -> Option<&str> {
        self.file_type.as_deref()
    }

    pub fn dateline(&self) -> Option<DateTime<Utc>> {
        self.dateline
    }

    /// The decoded contents, fetched on demand when a list response left
    /// them out
    pub fn contents(&mut self, client: &Client, reload: bool) -> Result<&[u8]> {
        let id = self.id().ok_or_else(|| {
            Error::unsupported(
                Self::RESOURCE,
                "contents",
                "the attachment has not been created yet",
            )
        })?;
        let contents = self.contents.get_or_load(reload, || {
            let mut full = client.get::<TicketAttachment>(&id)?;
            Ok(full.contents.get_mut().map(std::mem::take).unwrap_or_default())
        })?;
        Ok(contents)
    }
}

impl DeclaredFields for TicketAttachment {
    fn fields() -> &'static [FieldDeclaration] {
        ATTACHMENT_FIELDS
    }
}

impl FieldAccess for TicketAttachment {
    fn field(&self, name: &str) -> Option<FieldToken> {
        match name {
            "id" => self.id.map(FieldToken::Int),
            "ticket_id" => Some(FieldToken::Int(self.ticket_id)),
            "ticket_post_id" => Some(FieldToken::Int(self.ticket_post_id)),
            "file_name" => Some(FieldToken::Str(self.file_name.clone())),
            "file_size" => Some(FieldToken::Int(self.file_size as i64)),
            "dateline" => self.dateline.map(|d| FieldToken::Int(d.timestamp())),
            _ => None,
        }
    }
}

impl ApiResource for TicketAttachment {
    const CONTROLLER: &'static str = "/Tickets/TicketAttachment";
    const XML_NAME: &'static str = "attachment";
    const RESOURCE: &'static str = "TicketAttachment";
    const SUPPORTS_UPDATE: bool = false;

    fn parse(node: &WireNode) -> Result<Self> {
        let mut contents = Cached::new();
        if let Some(encoded) = node.child_text("contents") {
            let trimmed: String = encoded.split_whitespace().collect();
            if !trimmed.is_empty() {
                let decoded = BASE64.decode(trimmed.as_bytes()).map_err(|e| {
                    Error::data_format(format!("invalid base64 attachment contents: {}", e))
                })?;
                contents.set(decoded);
            }
        }
        Ok(Self {
            id: Some(node.req_child_int("id")?),
            ticket_id: node.req_child_int("ticketid")?,
            ticket_post_id: node.child_int("ticketpostid").unwrap_or(0),
            file_name: node.child_string("filename").unwrap_or_default(),
            file_size: node.child_int("filesize").unwrap_or(0).max(0) as u64,
            file_type: node.child_string("filetype"),
            dateline: node
                .child_int("dateline")
                .filter(|&ts| ts > 0)
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
            contents,
        })
    }

    fn build(&self, scope: BuildScope) -> Result<BuiltData> {
        let mut form = FormData::new();
        form.put_int("ticketid", self.ticket_id);
        form.put_int("ticketpostid", self.ticket_post_id);
        form.put("filename", self.file_name.clone());
        // attachment contents travel inline, base64 encoded
        if let Some(contents) = self.contents.get() {
            form.put("contents", BASE64.encode(contents));
        }
        check_required_fields(Self::RESOURCE, ATTACHMENT_FIELDS, scope, &form)?;
        Ok(BuiltData::new(form))
    }

    fn id(&self) -> Option<ResourceId> {
        self.id
            .map(|own| ResourceId::composite(vec![self.ticket_id, own]))
    }
}

impl fmt::Display for TicketAttachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.file_name, self.file_size_formatted())
    }
}

/// Server-managed ticket classification
#[derive(Debug, Clone, PartialEq)]
pub struct TicketType {
    id: Option<i64>,
    title: String,
    display_order: i64,
    department_id: Option<i64>,
    visibility: String,
}

static TYPE_FIELDS: &[FieldDeclaration] = &[
    FieldDeclaration::new("id", "id").filter_order(),
    FieldDeclaration::new("title", "title").filter_order(),
    FieldDeclaration::new("display_order", "displayorder").filter_order(),
    FieldDeclaration::new("department_id", "departmentid").filter(),
    FieldDeclaration::new("visibility", "type").filter(),
];

impl TicketType {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn display_order(&self) -> i64 {
        self.display_order
    }

    pub fn department_id(&self) -> Option<i64> {
        self.department_id
    }

    pub fn visibility(&self) -> &str {
        &self.visibility
    }
}

impl DeclaredFields for TicketType {
    fn fields() -> &'static [FieldDeclaration] {
        TYPE_FIELDS
    }
}

impl FieldAccess for TicketType {
    fn field(&self, name: &str) -> Option<FieldToken> {
        match name {
            "id" => self.id.map(FieldToken::Int),
            "title" => Some(FieldToken::Str(self.title.clone())),
            "display_order" => Some(FieldToken::Int(self.display_order)),
            "department_id" => self.department_id.map(FieldToken::Int),
            "visibility" => Some(FieldToken::Str(self.visibility.clone())),
            _ => None,
        }
    }
}

impl ApiResource for TicketType {
    const CONTROLLER: &'static str = "/Tickets/TicketType";
    const XML_NAME: &'static str = "tickettype";
    const RESOURCE: &'static str = "TicketType";
    const READ_ONLY: bool = true;

    fn parse(node: &WireNode) -> Result<Self> {
        Ok(Self {
            id: Some(node.req_child_int("id")?),
            title: node.child_string("title").unwrap_or_default(),
            display_order: node.child_int("displayorder").unwrap_or(0),
            department_id: node.child_positive_int("departmentid"),
            visibility: node.child_string("type").unwrap_or_else(|| "public".to_string()),
        })
    }

    fn build(&self, _scope: BuildScope) -> Result<BuiltData> {
        Err(Error::unsupported(
            Self::RESOURCE,
            "build",
            "this type is read-only",
        ))
    }

    fn id(&self) -> Option<ResourceId> {
        self.id.map(ResourceId::scalar)
    }
}

impl fmt::Display for TicketType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}
