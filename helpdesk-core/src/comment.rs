//! Comment support
//!
//! Comments share one wire shape regardless of what they are attached to:
//! a creator (staff, known user, or an anonymous visitor identified only by
//! name), contents, moderation status and threading metadata. Concrete
//! comment types add their owner linkage on top of [`CommentData`], and
//! owning resources embed a [`Comments`] component for lazy listing.

use chrono::{DateTime, Utc};

use crate::client::Client;
use crate::form::FormData;
use crate::object::{ApiResource, Cached, ResourceId};
use crate::result_set::ResultSet;
use crate::wire::WireNode;
use crate::{Error, Result};

pub const STATUS_PENDING: i64 = 1;
pub const STATUS_APPROVED: i64 = 2;
pub const STATUS_SPAM: i64 = 3;

fn check_status(status: i64) -> Result<()> {
    if matches!(status, STATUS_PENDING | STATUS_APPROVED | STATUS_SPAM) {
        Ok(())
    } else {
        Err(Error::validation(
            "commentstatus",
            format!("{} is not a valid comment status", status),
        ))
    }
}

const CREATOR_STAFF: i64 = 1;
const CREATOR_USER: i64 = 2;

/// Who authored a comment.
///
/// Staff and registered users are referenced by identifier; anonymous
/// visitors carry only a display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentCreator {
    Staff(i64),
    User(i64),
    FullName(String),
}

impl CommentCreator {
    /// Decode from the wire pair (creatortype, creatorid) plus fullname
    pub fn parse(node: &WireNode) -> Result<Self> {
        let creator_type = node.child_int("creatortype").unwrap_or(0);
        let creator_id = node.child_positive_int("creatorid");
        match (creator_type, creator_id) {
            (CREATOR_STAFF, Some(id)) => Ok(CommentCreator::Staff(id)),
            (CREATOR_USER, Some(id)) => Ok(CommentCreator::User(id)),
            _ => {
                let name = node.child_string("fullname").unwrap_or_default();
                Ok(CommentCreator::FullName(name))
            }
        }
    }

    /// Emit the creator pairs into an outgoing mapping
    pub fn build(&self, form: &mut FormData) {
        match self {
            CommentCreator::Staff(id) => {
                form.put_int("creatortype", CREATOR_STAFF);
                form.put_int("creatorid", *id);
            }
            CommentCreator::User(id) => {
                form.put_int("creatortype", CREATOR_USER);
                form.put_int("creatorid", *id);
            }
            CommentCreator::FullName(name) => {
                form.put("fullname", name.clone());
            }
        }
    }

    pub fn full_name(&self) -> Option<&str> {
        match self {
            CommentCreator::FullName(name) => Some(name),
            _ => None,
        }
    }
}

/// Fields common to every comment type
#[derive(Debug, Clone, PartialEq)]
pub struct CommentData {
    pub id: Option<i64>,
    pub creator: CommentCreator,
    pub contents: String,
    pub email: Option<String>,
    pub ip_address: Option<String>,
    pub dateline: Option<DateTime<Utc>>,
    pub parent_comment_id: Option<i64>,
    pub status: i64,
}

impl CommentData {
    pub fn new(creator: CommentCreator, contents: impl Into<String>) -> Self {
        Self {
            id: None,
            creator,
            contents: contents.into(),
            email: None,
            ip_address: None,
            dateline: None,
            parent_comment_id: None,
            status: STATUS_PENDING,
        }
    }

    pub fn parse(node: &WireNode) -> Result<Self> {
        Ok(Self {
            id: node.child_positive_int("id"),
            creator: CommentCreator::parse(node)?,
            contents: node.child_string("contents").unwrap_or_default(),
            email: node.child_string("email"),
            ip_address: node.child_string("ipaddress"),
            dateline: node
                .child_int("dateline")
                .filter(|&ts| ts > 0)
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
            parent_comment_id: node.child_positive_int("parentcommentid"),
            status: node.child_int("commentstatus").unwrap_or(STATUS_PENDING),
        })
    }

    /// Emit the shared comment pairs; the owning linkage is the concrete
    /// type's responsibility
    pub fn build(&self, form: &mut FormData) -> Result<()> {
        check_status(self.status)?;
        form.put("contents", self.contents.clone());
        self.creator.build(form);
        form.put_string("email", self.email.as_deref());
        form.put_positive_int("parentcommentid", self.parent_comment_id);
        Ok(())
    }

    pub fn set_status(&mut self, status: i64) -> Result<&mut Self> {
        check_status(status)?;
        self.status = status;
        Ok(self)
    }
}

/// Capability component embedded in resources that can carry comments.
///
/// Lazily lists the owner's comments through the comment type's own
/// controller and memoizes the result set.
#[derive(Debug, Clone)]
pub struct Comments<C> {
    cache: Cached<ResultSet<C>>,
}

impl<C: ApiResource> Comments<C> {
    pub fn new() -> Self {
        Self {
            cache: Cached::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.cache.is_loaded()
    }

    pub fn invalidate(&mut self) {
        self.cache.invalidate();
    }

    /// Fetch (or return the memoized) comments of the owning object
    pub fn get(
        &mut self,
        client: &Client,
        owner: &ResourceId,
        reload: bool,
    ) -> Result<&ResultSet<C>> {
        self.cache.get_or_load(reload, || {
            let mut params = vec!["ListAll".to_string()];
            params.extend(owner.path_params());
            client.get_all_with::<C>(&params)
        })
    }

    /// Create a comment attached to the owning object, invalidating the
    /// memoized listing on success
    pub fn add(&mut self, client: &Client, comment: &mut C) -> Result<()> {
        if comment.id().is_some() {
            return Err(Error::unsupported(
                C::RESOURCE,
                "create",
                "the comment is already persisted",
            ));
        }
        client.create(comment)?;
        self.cache.invalidate();
        Ok(())
    }
}
