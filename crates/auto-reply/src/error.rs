use {std::error::Error as StdError, vocalis_common::BlockId};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The selected capability failed while doing its work.
    #[error("capability {name} failed: {source}")]
    Capability {
        name: String,
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },

    /// A capability returned a reference the block store does not know.
    #[error("capability {capability} referenced unknown block {id}")]
    BlockNotFound { capability: String, id: BlockId },

    #[error("block store failure: {0}")]
    Storage(#[source] vocalis_media::Error),
}

impl Error {
    pub fn capability(name: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Capability {
            name: name.into(),
            source: source.into(),
        }
    }
}
