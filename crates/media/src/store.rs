use std::{
    collections::{HashMap, VecDeque},
    sync::RwLock,
};

use {
    async_trait::async_trait,
    bytes::Bytes,
    tracing::debug,
    vocalis_common::{BlockId, ChatMessage, Tag},
};

use crate::{Error, Result};

/// A unit of stored content. Text-only blocks carry no `content`; binary
/// blocks (audio, images) keep their payload in `content` and a
/// human-readable description in `text`.
#[derive(Debug, Clone)]
pub struct Block {
    pub id: BlockId,
    pub text: String,
    pub mime_type: Option<String>,
    pub content: Option<Bytes>,
    pub tags: Vec<Tag>,
}

impl Block {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            id: BlockId::new(),
            text: text.into(),
            mime_type: None,
            content: None,
            tags: Vec::new(),
        }
    }

    pub fn binary(text: impl Into<String>, mime_type: impl Into<String>, content: Bytes) -> Self {
        Self {
            id: BlockId::new(),
            text: text.into(),
            mime_type: Some(mime_type.into()),
            content: Some(content),
            tags: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push(Tag::new(key, value));
        self
    }

    /// Bot message carrying this block's content, in the conversation of
    /// `input`.
    pub fn to_reply(&self, input: &ChatMessage) -> ChatMessage {
        ChatMessage::reply_to(input, self.text.clone())
            .with_tags(self.tags.iter().cloned())
            .with_source(self.id, self.mime_type.clone())
    }
}

/// Persistent storage for blocks.
#[async_trait]
pub trait BlockStore: Send + Sync {
    async fn put(&self, block: Block) -> Result<BlockId>;
    async fn get(&self, id: &BlockId) -> Result<Block>;
}

/// Blocks kept by [`InMemoryBlockStore::new`].
pub const DEFAULT_MAX_BLOCKS: usize = 256;

/// Process-local block store holding at most `max_blocks` blocks. Once full,
/// each `put` evicts the oldest block; evicted ids resolve to
/// [`Error::NotFound`] like ids that never existed.
pub struct InMemoryBlockStore {
    max_blocks: usize,
    inner: RwLock<Blocks>,
}

#[derive(Default)]
struct Blocks {
    by_id: HashMap<BlockId, Block>,
    /// Insertion order, oldest first.
    order: VecDeque<BlockId>,
}

impl Default for InMemoryBlockStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_BLOCKS)
    }
}

impl InMemoryBlockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A capacity of zero is treated as one.
    pub fn with_capacity(max_blocks: usize) -> Self {
        Self {
            max_blocks: max_blocks.max(1),
            inner: RwLock::new(Blocks::default()),
        }
    }

    pub fn capacity(&self) -> usize {
        self.max_blocks
    }

    pub fn len(&self) -> usize {
        self.inner
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .by_id
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlockStore for InMemoryBlockStore {
    async fn put(&self, block: Block) -> Result<BlockId> {
        let id = block.id;
        debug!(block_id = %id, mime_type = ?block.mime_type, "storing block");
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        if inner.by_id.insert(id, block).is_none() {
            inner.order.push_back(id);
        }
        while inner.order.len() > self.max_blocks {
            let Some(oldest) = inner.order.pop_front() else {
                break;
            };
            inner.by_id.remove(&oldest);
            debug!(block_id = %oldest, max_blocks = self.max_blocks, "evicted block");
        }
        Ok(id)
    }

    async fn get(&self, id: &BlockId) -> Result<Block> {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        inner.by_id.get(id).cloned().ok_or(Error::NotFound(*id))
    }
}
