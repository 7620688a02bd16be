use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Telegram(#[from] teloxide::RequestError),

    #[error(transparent)]
    Channel(#[from] vocalis_channels::Error),

    #[error("invalid webhook url {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("{message}")]
    Message { message: String },
}

impl Error {
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message {
            message: message.into(),
        }
    }
}

impl vocalis_common::FromMessage for Error {
    fn from_message(message: String) -> Self {
        Self::Message { message }
    }
}

impl From<Error> for vocalis_channels::Error {
    fn from(err: Error) -> Self {
        match err {
            Error::Channel(inner) => inner,
            Error::InvalidUrl { .. } => Self::invalid_input(err),
            Error::Message { message } => Self::unavailable(message),
            Error::Telegram(source) => Self::external("telegram bot api", source),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

vocalis_common::impl_context!();
