//! Block storage: content produced by capabilities, addressed by opaque
//! reference tokens and resolved back into chat messages.

pub mod error;
pub mod store;

pub use {
    error::{Error, Result},
    store::{Block, BlockStore, DEFAULT_MAX_BLOCKS, InMemoryBlockStore},
};
