//! Transport boundary
//!
//! The mapping core never talks to the network itself. It hands a controller
//! path, positional path parameters and (for writes) the outgoing field and
//! file mappings to a [`Transport`] implementation, which signs the request,
//! performs the blocking round-trip, decodes the XML body and returns it as a
//! [`WireNode`] tree. Authentication, status handling, timeouts and retry
//! policy all live behind this trait; failures surface unchanged as
//! [`Error::Transport`](crate::Error::Transport). Implementors that use
//! `anyhow` internally can rely on the `From<anyhow::Error>` conversion.

use crate::form::{FileMap, FormData};
use crate::wire::WireNode;
use crate::Result;

/// Synchronous, blocking transport collaborator
pub trait Transport {
    /// Fetch one resource or resource list
    fn get(&self, controller: &str, params: &[String]) -> Result<WireNode>;

    /// Create a resource; the response body, when present, carries the
    /// server's view of the created resource
    fn post(
        &self,
        controller: &str,
        params: &[String],
        data: &FormData,
        files: &FileMap,
    ) -> Result<Option<WireNode>>;

    /// Replace a resource's state; response semantics as for `post`
    fn put(
        &self,
        controller: &str,
        params: &[String],
        data: &FormData,
        files: &FileMap,
    ) -> Result<Option<WireNode>>;

    /// Destroy a resource
    fn delete(&self, controller: &str, params: &[String]) -> Result<()>;
}

/// Joins a controller path and positional parameters into the request path
/// form the remote API expects, e.g. `/Tickets/TicketAttachment/1234/17`.
pub fn request_path(controller: &str, params: &[String]) -> String {
    let mut path = controller.trim_end_matches('/').to_string();
    for param in params {
        path.push('/');
        path.push_str(param);
    }
    path
}
