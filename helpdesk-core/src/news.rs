//! News items, their comments and subscribers
//!
//! A news item is staff-authored content with visibility and publishing
//! state; readers can comment on it (moderated through the shared comment
//! status machinery) and subscribe by email address.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};

use crate::client::Client;
use crate::comment::{CommentCreator, CommentData, Comments};
use crate::config::Config;
use crate::form::FormData;
use crate::object::{
    check_required_fields, ApiResource, BuildScope, BuiltData, DeclaredFields, FieldDeclaration,
    ResourceId,
};
use crate::result_set::{FieldAccess, FieldToken, ResultSet};
use crate::wire::WireNode;
use crate::{Error, Result};

pub const TYPE_GLOBAL: i64 = 1;
pub const TYPE_PUBLIC: i64 = 2;
pub const TYPE_PRIVATE: i64 = 3;

pub const STATUS_DRAFT: i64 = 1;
pub const STATUS_PUBLISHED: i64 = 2;

const EXPIRY_FORMAT: &str = "%m/%d/%Y";

fn check_news_type(value: i64) -> Result<()> {
    if matches!(value, TYPE_GLOBAL | TYPE_PUBLIC | TYPE_PRIVATE) {
        Ok(())
    } else {
        Err(Error::validation(
            "newstype",
            format!("{} is not a valid news type", value),
        ))
    }
}

fn check_news_status(value: i64) -> Result<()> {
    if matches!(value, STATUS_DRAFT | STATUS_PUBLISHED) {
        Ok(())
    } else {
        Err(Error::validation(
            "newsstatus",
            format!("{} is not a valid news status", value),
        ))
    }
}

/// Staff-authored news content
#[derive(Debug, Clone)]
pub struct NewsItem {
    id: Option<i64>,
    staff_id: Option<i64>,
    edited_staff_id: Option<i64>,
    news_type: i64,
    news_status: i64,
    subject: String,
    contents: String,
    author: Option<String>,
    email: Option<String>,
    dateline: Option<DateTime<Utc>>,
    expiry: Option<NaiveDate>,
    allow_comments: bool,
    total_comments: i64,
    user_visibility_custom: bool,
    user_group_ids: Vec<i64>,
    comments: Comments<NewsComment>,
}

static NEWS_FIELDS: &[FieldDeclaration] = &[
    FieldDeclaration::new("id", "id").filter_order(),
    FieldDeclaration::new("subject", "subject").required().filter_order(),
    FieldDeclaration::new("contents", "contents").required(),
    FieldDeclaration::new("staff_id", "staffid").required_create().filter(),
    FieldDeclaration::new("edited_staff_id", "editedstaffid").required_update(),
    FieldDeclaration::new("type", "newstype").filter(),
    FieldDeclaration::new("status", "newsstatus").filter(),
    FieldDeclaration::new("author", "author").filter_order(),
    FieldDeclaration::new("email", "email")
        .pattern("^[^@\\s]+@[^@\\s]+\\.[^@\\s]+$")
        .filter(),
    FieldDeclaration::new("allow_comments", "allowcomments").filter(),
    FieldDeclaration::new("total_comments", "totalcomments").filter_order(),
    FieldDeclaration::new("dateline", "dateline").order(),
];

impl NewsItem {
    /// Start a new draft, authored by the given staff member
    pub fn create_new<S: Into<String>, C: Into<String>>(
        subject: S,
        contents: C,
        staff_id: i64,
    ) -> Self {
        Self {
            id: None,
            staff_id: Some(staff_id),
            edited_staff_id: None,
            news_type: TYPE_GLOBAL,
            news_status: STATUS_DRAFT,
            subject: subject.into(),
            contents: contents.into(),
            author: None,
            email: None,
            dateline: None,
            expiry: None,
            allow_comments: true,
            total_comments: 0,
            user_visibility_custom: false,
            user_group_ids: Vec::new(),
            comments: Comments::new(),
        }
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn contents(&self) -> &str {
        &self.contents
    }

    pub fn staff_id(&self) -> Option<i64> {
        self.staff_id
    }

    pub fn news_type(&self) -> i64 {
        self.news_type
    }

    pub fn news_status(&self) -> i64 {
        self.news_status
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn dateline(&self) -> Option<DateTime<Utc>> {
        self.dateline
    }

    /// Publication time rendered with the given format, or the process-wide
    /// datetime format
    pub fn dateline_formatted(&self, format: Option<&str>) -> Option<String> {
        let dateline = self.dateline?;
        let format = format
            .map(str::to_owned)
            .unwrap_or_else(|| Config::global().datetime_format);
        Some(dateline.format(&format).to_string())
    }

    pub fn expiry(&self) -> Option<NaiveDate> {
        self.expiry
    }

    pub fn allow_comments(&self) -> bool {
        self.allow_comments
    }

    pub fn total_comments(&self) -> i64 {
        self.total_comments
    }

    pub fn set_subject<S: Into<String>>(&mut self, subject: S) -> &mut Self {
        self.subject = subject.into();
        self
    }

    pub fn set_contents<S: Into<String>>(&mut self, contents: S) -> &mut Self {
        self.contents = contents.into();
        self
    }

    pub fn set_type(&mut self, value: i64) -> Result<&mut Self> {
        check_news_type(value)?;
        self.news_type = value;
        Ok(self)
    }

    pub fn set_status(&mut self, value: i64) -> Result<&mut Self> {
        check_news_status(value)?;
        self.news_status = value;
        Ok(self)
    }

    /// Record who performed the edit; required before an update
    pub fn set_edited_staff_id(&mut self, staff_id: i64) -> &mut Self {
        self.edited_staff_id = Some(staff_id);
        self
    }

    pub fn set_email<S: Into<String>>(&mut self, email: S) -> &mut Self {
        self.email = Some(email.into());
        self
    }

    pub fn set_expiry(&mut self, expiry: Option<NaiveDate>) -> &mut Self {
        self.expiry = expiry;
        self
    }

    pub fn set_allow_comments(&mut self, allow: bool) -> &mut Self {
        self.allow_comments = allow;
        self
    }

    /// Restrict visibility to the given user groups; an empty restriction
    /// reverts to full visibility
    pub fn set_user_groups(&mut self, ids: Vec<i64>) -> &mut Self {
        self.user_visibility_custom = !ids.is_empty();
        self.user_group_ids = ids;
        self
    }

    /// The item's comments, fetched lazily and memoized
    pub fn comments(
        &mut self,
        client: &Client,
        reload: bool,
    ) -> Result<&ResultSet<NewsComment>> {
        let id = self.id.ok_or_else(|| {
            Error::unsupported(
                "NewsItem",
                "comments",
                "the news item has not been created yet",
            )
        })?;
        self.comments.get(client, &ResourceId::scalar(id), reload)
    }

    /// Start a new comment pre-linked to this item
    pub fn new_comment<S: Into<String>>(
        &self,
        creator: CommentCreator,
        contents: S,
    ) -> Result<NewsComment> {
        let id = self.id.ok_or_else(|| {
            Error::unsupported(
                "NewsItem",
                "new_comment",
                "the news item has not been created yet",
            )
        })?;
        Ok(NewsComment::create_new(id, creator, contents))
    }

    /// Attach a new comment to this item
    pub fn add_comment(&mut self, client: &Client, comment: &mut NewsComment) -> Result<()> {
        let id = self.id.ok_or_else(|| {
            Error::unsupported(
                "NewsItem",
                "add_comment",
                "the news item has not been created yet",
            )
        })?;
        comment.news_item_id = id;
        self.comments.add(client, comment)
    }
}

impl DeclaredFields for NewsItem {
    fn fields() -> &'static [FieldDeclaration] {
        NEWS_FIELDS
    }
}

impl FieldAccess for NewsItem {
    fn field(&self, name: &str) -> Option<FieldToken> {
        match name {
            "id" => self.id.map(FieldToken::Int),
            "subject" => Some(FieldToken::Str(self.subject.clone())),
            "contents" => Some(FieldToken::Str(self.contents.clone())),
            "staff_id" => self.staff_id.map(FieldToken::Int),
            "edited_staff_id" => self.edited_staff_id.map(FieldToken::Int),
            "type" => Some(FieldToken::Int(self.news_type)),
            "status" => Some(FieldToken::Int(self.news_status)),
            "author" => self.author.clone().map(FieldToken::Str),
            "email" => self.email.clone().map(FieldToken::Str),
            "allow_comments" => Some(FieldToken::Bool(self.allow_comments)),
            "total_comments" => Some(FieldToken::Int(self.total_comments)),
            "dateline" => self.dateline.map(|d| FieldToken::Int(d.timestamp())),
            _ => None,
        }
    }
}

impl ApiResource for NewsItem {
    const CONTROLLER: &'static str = "/News/NewsItem";
    const XML_NAME: &'static str = "newsitem";
    const RESOURCE: &'static str = "NewsItem";

    fn parse(node: &WireNode) -> Result<Self> {
        let news_type = node.child_int("newstype").unwrap_or(TYPE_GLOBAL);
        check_news_type(news_type)
            .map_err(|_| Error::data_format(format!("unknown news type {}", news_type)))?;
        Ok(Self {
            id: Some(node.req_child_int("id")?),
            staff_id: node.child_positive_int("staffid"),
            edited_staff_id: node.child_positive_int("editedstaffid"),
            news_type,
            news_status: node.child_int("newsstatus").unwrap_or(STATUS_DRAFT),
            subject: node.child_string("subject").unwrap_or_default(),
            contents: node.child_string("contents").unwrap_or_default(),
            author: node.child_string("author"),
            email: node.child_string("email"),
            dateline: node
                .child_int("dateline")
                .filter(|&ts| ts > 0)
                .and_then(|ts| DateTime::from_timestamp(ts, 0)),
            expiry: node
                .child_int("expiry")
                .filter(|&ts| ts > 0)
                .and_then(|ts| DateTime::from_timestamp(ts, 0))
                .map(|dt| dt.date_naive()),
            allow_comments: node.child_bool("allowcomments"),
            total_comments: node.child_int("totalcomments").unwrap_or(0),
            user_visibility_custom: node.child_bool("uservisibilitycustom"),
            user_group_ids: node.child_int_list("usergroupidlist", "usergroupid"),
            comments: Comments::new(),
        })
    }

    fn build(&self, scope: BuildScope) -> Result<BuiltData> {
        let mut form = FormData::new();
        form.put("subject", self.subject.clone());
        form.put("contents", self.contents.clone());
        match scope {
            BuildScope::Create => form.put_positive_int("staffid", self.staff_id),
            BuildScope::Update => form.put_positive_int("editedstaffid", self.edited_staff_id),
        }
        form.put_int("newstype", self.news_type);
        form.put_int("newsstatus", self.news_status);
        form.put_string("email", self.email.as_deref());
        form.put_bool("allowcomments", self.allow_comments);
        if let Some(expiry) = self.expiry {
            form.put("expiry", expiry.format(EXPIRY_FORMAT).to_string());
        }
        form.put_bool("uservisibilitycustom", self.user_visibility_custom);
        if self.user_visibility_custom {
            form.put_repeated_ints("usergroupidlist", &self.user_group_ids);
        }
        check_required_fields(Self::RESOURCE, NEWS_FIELDS, scope, &form)?;
        Ok(BuiltData::new(form))
    }

    fn id(&self) -> Option<ResourceId> {
        self.id.map(ResourceId::scalar)
    }
}

impl fmt::Display for NewsItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.subject)
    }
}

/// One comment on a news item
#[derive(Debug, Clone, PartialEq)]
pub struct NewsComment {
    news_item_id: i64,
    data: CommentData,
}

static COMMENT_FIELDS: &[FieldDeclaration] = &[
    FieldDeclaration::new("id", "id").filter_order(),
    FieldDeclaration::new("news_item_id", "newsitemid").required().filter(),
    FieldDeclaration::new("contents", "contents").required().filter(),
    FieldDeclaration::new("full_name", "fullname").filter_order(),
    FieldDeclaration::new("status", "commentstatus").filter(),
    FieldDeclaration::new("dateline", "dateline").order(),
];

impl NewsComment {
    /// Start a new comment on the given news item
    pub fn create_new<S: Into<String>>(
        news_item_id: i64,
        creator: CommentCreator,
        contents: S,
    ) -> Self {
        Self {
            news_item_id,
            data: CommentData::new(creator, contents),
        }
    }

    pub fn news_item_id(&self) -> i64 {
        self.news_item_id
    }

    pub fn contents(&self) -> &str {
        &self.data.contents
    }

    pub fn creator(&self) -> &CommentCreator {
        &self.data.creator
    }

    pub fn status(&self) -> i64 {
        self.data.status
    }

    pub fn dateline(&self) -> Option<DateTime<Utc>> {
        self.data.dateline
    }

    pub fn set_contents<S: Into<String>>(&mut self, contents: S) -> &mut Self {
        self.data.contents = contents.into();
        self
    }

    pub fn set_status(&mut self, status: i64) -> Result<&mut Self> {
        self.data.set_status(status)?;
        Ok(self)
    }
}

impl DeclaredFields for NewsComment {
    fn fields() -> &'static [FieldDeclaration] {
        COMMENT_FIELDS
    }
}

impl FieldAccess for NewsComment {
    fn field(&self, name: &str) -> Option<FieldToken> {
        match name {
            "id" => self.data.id.map(FieldToken::Int),
            "news_item_id" => Some(FieldToken::Int(self.news_item_id)),
            "contents" => Some(FieldToken::Str(self.data.contents.clone())),
            "full_name" => self
                .data
                .creator
                .full_name()
                .map(|n| FieldToken::Str(n.to_string())),
            "status" => Some(FieldToken::Int(self.data.status)),
            "dateline" => self.data.dateline.map(|d| FieldToken::Int(d.timestamp())),
            _ => None,
        }
    }
}

impl ApiResource for NewsComment {
    const CONTROLLER: &'static str = "/News/Comment";
    const XML_NAME: &'static str = "newsitemcomment";
    const RESOURCE: &'static str = "NewsComment";
    const SUPPORTS_UPDATE: bool = false;

    fn parse(node: &WireNode) -> Result<Self> {
        Ok(Self {
            news_item_id: node.req_child_int("newsitemid")?,
            data: CommentData::parse(node)?,
        })
    }

    fn build(&self, scope: BuildScope) -> Result<BuiltData> {
        let mut form = FormData::new();
        form.put_int("newsitemid", self.news_item_id);
        self.data.build(&mut form)?;
        check_required_fields(Self::RESOURCE, COMMENT_FIELDS, scope, &form)?;
        Ok(BuiltData::new(form))
    }

    fn id(&self) -> Option<ResourceId> {
        self.data.id.map(ResourceId::scalar)
    }
}

impl fmt::Display for NewsComment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "comment on news item {}", self.news_item_id)
    }
}

/// One email subscription to news
#[derive(Debug, Clone, PartialEq)]
pub struct NewsSubscriber {
    id: Option<i64>,
    email: String,
    is_validated: bool,
}

static SUBSCRIBER_FIELDS: &[FieldDeclaration] = &[
    FieldDeclaration::new("id", "id").filter_order(),
    FieldDeclaration::new("email", "email")
        .required()
        .pattern("^[^@\\s]+@[^@\\s]+\\.[^@\\s]+$")
        .filter_order(),
    FieldDeclaration::new("is_validated", "isvalidated").filter(),
];

impl NewsSubscriber {
    pub fn create_new<S: Into<String>>(email: S) -> Self {
        Self {
            id: None,
            email: email.into(),
            is_validated: false,
        }
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn is_validated(&self) -> bool {
        self.is_validated
    }

    pub fn set_email<S: Into<String>>(&mut self, email: S) -> &mut Self {
        self.email = email.into();
        self
    }

    pub fn set_validated(&mut self, validated: bool) -> &mut Self {
        self.is_validated = validated;
        self
    }
}

impl DeclaredFields for NewsSubscriber {
    fn fields() -> &'static [FieldDeclaration] {
        SUBSCRIBER_FIELDS
    }
}

impl FieldAccess for NewsSubscriber {
    fn field(&self, name: &str) -> Option<FieldToken> {
        match name {
            "id" => self.id.map(FieldToken::Int),
            "email" => Some(FieldToken::Str(self.email.clone())),
            "is_validated" => Some(FieldToken::Bool(self.is_validated)),
            _ => None,
        }
    }
}

impl ApiResource for NewsSubscriber {
    const CONTROLLER: &'static str = "/News/Subscriber";
    const XML_NAME: &'static str = "newssubscriber";
    const RESOURCE: &'static str = "NewsSubscriber";

    fn parse(node: &WireNode) -> Result<Self> {
        Ok(Self {
            id: Some(node.req_child_int("id")?),
            email: node.child_string("email").unwrap_or_default(),
            is_validated: node.child_bool("isvalidated"),
        })
    }

    fn build(&self, scope: BuildScope) -> Result<BuiltData> {
        let mut form = FormData::new();
        form.put("email", self.email.clone());
        // the wire protocol accepts the validation flag on create only,
        // and only an affirmative one
        if scope == BuildScope::Create && self.is_validated {
            form.put_bool("isvalidated", true);
        }
        check_required_fields(Self::RESOURCE, SUBSCRIBER_FIELDS, scope, &form)?;
        Ok(BuiltData::new(form))
    }

    fn id(&self) -> Option<ResourceId> {
        self.id.map(ResourceId::scalar)
    }
}

impl fmt::Display for NewsSubscriber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.email)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn news_node() -> WireNode {
        WireNode::new()
            .push_text_child("id", "21")
            .push_text_child("staffid", "3")
            .push_text_child("newstype", "2")
            .push_text_child("newsstatus", "2")
            .push_text_child("subject", "Maintenance window")
            .push_text_child("contents", "Saturday 02:00 UTC")
            .push_text_child("author", "Jo Staff")
            .push_text_child("email", "jo@example.com")
            .push_text_child("dateline", "1700000000")
            .push_text_child("allowcomments", "1")
            .push_text_child("totalcomments", "4")
    }

    #[test]
    fn test_news_item_parse() {
        let item = NewsItem::parse(&news_node()).unwrap();
        assert_eq!(item.id(), Some(ResourceId::scalar(21)));
        assert_eq!(item.news_type(), TYPE_PUBLIC);
        assert_eq!(item.news_status(), STATUS_PUBLISHED);
        assert_eq!(item.subject(), "Maintenance window");
        assert_eq!(item.total_comments(), 4);
        assert!(item.allow_comments());
    }

    #[test]
    fn test_news_item_unknown_type_is_fatal() {
        let node = news_node().push_text_child("newstype", "9");
        // push on an existing name appends, the first child still wins
        assert!(NewsItem::parse(&node).is_ok());

        let node = WireNode::new()
            .push_text_child("id", "21")
            .push_text_child("newstype", "9")
            .push_text_child("subject", "x")
            .push_text_child("contents", "y");
        let err = NewsItem::parse(&node).unwrap_err();
        assert!(err.is_data_format());
    }

    #[test]
    fn test_news_item_author_scoping() {
        let mut item = NewsItem::create_new("Subject", "Body", 3);
        let built = item.build(BuildScope::Create).unwrap();
        assert_eq!(built.form.scalar("staffid"), Some("3"));
        assert_eq!(built.form.get("editedstaffid"), None);

        // an update without the editing staff member is rejected
        let err = item.build(BuildScope::Update).unwrap_err();
        assert!(err.is_validation());

        item.set_edited_staff_id(7);
        let built = item.build(BuildScope::Update).unwrap();
        assert_eq!(built.form.scalar("editedstaffid"), Some("7"));
        assert_eq!(built.form.get("staffid"), None);
    }

    #[test]
    fn test_news_item_expiry_and_visibility() {
        let mut item = NewsItem::create_new("Subject", "Body", 3);
        item.set_expiry(NaiveDate::from_ymd_opt(2026, 12, 31))
            .set_user_groups(vec![2, 5]);
        let built = item.build(BuildScope::Create).unwrap();
        assert_eq!(built.form.scalar("expiry"), Some("12/31/2026"));
        let pairs = built.form.encoded_pairs();
        assert!(pairs.contains(&("usergroupidlist".to_string(), "2".to_string())));
        assert!(pairs.contains(&("usergroupidlist".to_string(), "5".to_string())));
    }

    #[test]
    #[serial]
    fn test_dateline_rendering_uses_global_config() {
        Config::reset_global();
        let item = NewsItem::parse(&news_node()).unwrap();
        assert_eq!(
            item.dateline_formatted(None).as_deref(),
            Some("11/14/2023 22:13:20")
        );
        assert_eq!(item.dateline_formatted(Some("%Y")).as_deref(), Some("2023"));
    }

    #[test]
    fn test_news_item_status_setter_validates() {
        let mut item = NewsItem::create_new("Subject", "Body", 3);
        assert!(item.set_status(STATUS_PUBLISHED).is_ok());
        assert!(item.set_status(5).unwrap_err().is_validation());
        assert!(item.set_type(TYPE_PRIVATE).is_ok());
        assert!(item.set_type(0).unwrap_err().is_validation());
    }

    #[test]
    fn test_comment_parse_and_build() {
        let node = WireNode::new()
            .push_text_child("id", "9")
            .push_text_child("newsitemid", "21")
            .push_text_child("creatortype", "2")
            .push_text_child("creatorid", "40")
            .push_text_child("contents", "Thanks for the heads up")
            .push_text_child("commentstatus", "2");
        let comment = NewsComment::parse(&node).unwrap();
        assert_eq!(comment.news_item_id(), 21);
        assert_eq!(comment.creator(), &CommentCreator::User(40));

        let fresh = NewsComment::create_new(
            21,
            CommentCreator::FullName("Visitor".to_string()),
            "hello",
        );
        let built = fresh.build(BuildScope::Create).unwrap();
        assert_eq!(built.form.scalar("newsitemid"), Some("21"));
        assert_eq!(built.form.scalar("fullname"), Some("Visitor"));
        assert_eq!(built.form.scalar("contents"), Some("hello"));
    }

    #[test]
    fn test_new_comment_requires_persisted_item() {
        let draft = NewsItem::create_new("Subject", "Body", 3);
        let err = draft
            .new_comment(CommentCreator::Staff(3), "first")
            .unwrap_err();
        assert!(err.is_unsupported());

        let item = NewsItem::parse(&news_node()).unwrap();
        let comment = item.new_comment(CommentCreator::Staff(3), "first").unwrap();
        assert_eq!(comment.news_item_id(), 21);
        assert!(comment.id().is_none());
    }

    #[test]
    fn test_comment_requires_contents() {
        let comment = NewsComment::create_new(21, CommentCreator::Staff(1), "");
        let err = comment.build(BuildScope::Create).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_subscriber_email_pattern() {
        let subscriber = NewsSubscriber::create_new("not-an-email");
        let err = subscriber.build(BuildScope::Create).unwrap_err();
        assert!(err.is_validation());

        let subscriber = NewsSubscriber::create_new("reader@example.com");
        assert!(subscriber.build(BuildScope::Create).is_ok());
    }

    #[test]
    fn subscriber_is_validated_sent_only_on_create() {
        let mut subscriber = NewsSubscriber::create_new("reader@example.com");

        // unvalidated create omits the flag entirely
        let built = subscriber.build(BuildScope::Create).unwrap();
        assert_eq!(built.form.get("isvalidated"), None);

        subscriber.set_validated(true);
        let built = subscriber.build(BuildScope::Create).unwrap();
        assert_eq!(built.form.scalar("isvalidated"), Some("1"));

        // updates never carry the flag
        subscriber.id = Some(5);
        let built = subscriber.build(BuildScope::Update).unwrap();
        assert_eq!(built.form.get("isvalidated"), None);
    }
}
