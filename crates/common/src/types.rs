//! Transport-agnostic message model shared by channels, tools, and the dispatcher.

use std::{fmt, str::FromStr};

use {
    serde::{Deserialize, Serialize},
    uuid::Uuid,
};

use crate::{Error, Result};

/// Who authored a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Bot,
}

impl Role {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Bot => "bot",
        }
    }
}

/// A single `(key, value)` annotation. Order and duplicates are preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Opaque identifier of content held by a block store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BlockId(Uuid);

impl BlockId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse a reference token. Only the canonical lowercase hyphenated form
    /// of a version-4 UUID is accepted.
    pub fn parse_reference(token: &str) -> Option<Self> {
        let uuid = Uuid::parse_str(token).ok()?;
        if uuid.get_version_num() != 4 {
            return None;
        }
        (uuid.hyphenated().to_string() == token).then_some(Self(uuid))
    }
}

impl Default for BlockId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for BlockId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|source| Error::InvalidBlockId {
                id: s.to_string(),
                source,
            })
    }
}

/// One chat message plus its provenance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Chat thread this message belongs to. Replies keep the id of the
    /// message that triggered them.
    pub conversation_id: String,
    pub role: Role,
    pub text: String,
    #[serde(default)]
    pub tags: Vec<Tag>,
    /// Block the body can be re-fetched from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_reference: Option<BlockId>,
    /// Set when the referenced block holds binary content (audio, image).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl ChatMessage {
    pub fn new(conversation_id: impl Into<String>, role: Role, text: impl Into<String>) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            role,
            text: text.into(),
            tags: Vec::new(),
            source_reference: None,
            mime_type: None,
        }
    }

    pub fn user(conversation_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(conversation_id, Role::User, text)
    }

    pub fn bot(conversation_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self::new(conversation_id, Role::Bot, text)
    }

    /// Bot reply in the same conversation as `input`.
    pub fn reply_to(input: &ChatMessage, text: impl Into<String>) -> Self {
        Self::bot(input.conversation_id.clone(), text)
    }

    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push(Tag::new(key, value));
        self
    }

    #[must_use]
    pub fn with_tags(mut self, tags: impl IntoIterator<Item = Tag>) -> Self {
        self.tags.extend(tags);
        self
    }

    #[must_use]
    pub fn with_source(mut self, id: BlockId, mime_type: Option<String>) -> Self {
        self.source_reference = Some(id);
        self.mime_type = mime_type;
        self
    }

    /// First value tagged with `key`.
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags
            .iter()
            .find(|t| t.key == key)
            .map(|t| t.value.as_str())
    }

    /// Whether the body refers to binary content of the given top-level MIME
    /// type (e.g. `"audio"`).
    pub fn has_media_type(&self, top_level: &str) -> bool {
        self.mime_type
            .as_deref()
            .and_then(|m| m.split('/').next())
            .is_some_and(|t| t.eq_ignore_ascii_case(top_level))
    }
}
