//! Conversation objects and their list pages.
use crate::OutputItem;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationObject {
    pub id: String,
    /// Always `"conversation"`.
    pub object: String,
    #[serde(with = "crate::codec::epoch_seconds")]
    pub created_at: i64,
    #[serde(with = "crate::codec::epoch_seconds")]
    pub updated_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
}

impl ConversationObject {
    pub fn new(id: impl Into<String>, created_at: i64, updated_at: i64) -> Self {
        Self {
            id: id.into(),
            object: "conversation".to_string(),
            created_at,
            updated_at,
            metadata: None,
        }
    }
}

/// A page of conversations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationList {
    /// Always `"list"`.
    pub object: String,
    pub data: Vec<ConversationObject>,
    pub has_more: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_id: Option<String>,
}

impl ConversationList {
    #[must_use]
    pub fn new(data: Vec<ConversationObject>, has_more: bool) -> Self {
        Self {
            object: "list".to_string(),
            first_id: data.first().map(|conversation| conversation.id.clone()),
            last_id: data.last().map(|conversation| conversation.id.clone()),
            data,
            has_more,
        }
    }
}

/// A page of the items stored in a conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationItemList {
    pub object: String,
    pub data: Vec<OutputItem>,
    pub has_more: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_id: Option<String>,
}

impl ConversationItemList {
    #[must_use]
    pub fn new(data: Vec<OutputItem>, has_more: bool) -> Self {
        Self {
            object: "list".to_string(),
            first_id: data.first().and_then(OutputItem::id).map(str::to_string),
            last_id: data.last().and_then(OutputItem::id).map(str::to_string),
            data,
            has_more,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationCreateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationUpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Returned when a conversation is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationDeletion {
    pub id: String,
    /// Always `"conversation.deleted"`.
    pub object: String,
    pub deleted: bool,
}
