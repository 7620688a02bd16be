use vocalis_common::BlockId;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("block not found: {0}")]
    NotFound(BlockId),

    #[error("block store unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, Error>;
