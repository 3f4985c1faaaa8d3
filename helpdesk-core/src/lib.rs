//! Client-side object mapper for a helpdesk REST API.
//!
//! The remote API speaks XML over positional controller paths; this crate
//! maps those payloads onto typed resources with a uniform lifecycle:
//! parse, build, create, update, delete and refresh, coordinated by a
//! [`Client`] that enforces the new/persisted/read-only state machine
//! before anything touches the transport.
//!
//! The main building blocks:
//!
//! - [`transport::Transport`] is the single seam to the wire: callers
//!   provide an implementation, everything above it is synchronous and
//!   deterministic.
//! - [`object::ApiResource`] is the per-type contract; static
//!   [`object::FieldDeclaration`] tables drive required-field validation
//!   and the filter/order surface of [`result_set::ResultSet`].
//! - [`custom_field`] models the server-declared polymorphic field system;
//!   the value shape is picked by a wire discriminator at parse time.
//! - Capability components ([`comment::Comments`],
//!   [`custom_field::FieldGroups`]) are embedded by the resources that
//!   support them instead of being inherited.
//!
//! ```no_run
//! use helpdesk_core::{Client, Department, ResultSet};
//! # fn demo(client: &Client) -> helpdesk_core::Result<()> {
//! let departments: ResultSet<Department> = client.get_all()?;
//! let visible = departments.filter_by("type", &helpdesk_core::Predicate::eq("public"))?;
//! for dept in &visible {
//!     println!("{}", dept);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod coerce;
pub mod comment;
pub mod config;
pub mod custom_field;
pub mod department;
pub mod error;
pub mod form;
pub mod news;
pub mod object;
pub mod result_set;
pub mod ticket;
pub mod transport;
pub mod wire;

pub use client::Client;
pub use comment::{CommentCreator, CommentData, Comments};
pub use config::Config;
pub use custom_field::{
    CustomField, CustomFieldDefinition, CustomFieldGroup, FieldGroups, FieldOption, FieldType,
    FieldValue,
};
pub use department::Department;
pub use error::{Error, Result};
pub use form::{FileMap, FilePayload, FormData, FormValue};
pub use news::{NewsComment, NewsItem, NewsSubscriber};
pub use object::{ApiResource, BuildScope, BuiltData, Cached, FieldDeclaration, ResourceId};
pub use result_set::{Direction, FieldAccess, FieldToken, Literal, Predicate, ResultSet};
pub use ticket::{Ticket, TicketAttachment, TicketType};
pub use transport::Transport;
pub use wire::WireNode;
