//! Error types for the state store.
//!
//! A missing path is not an error: lookups return `Option`. Observer
//! failures never escape `patch`; see [`crate::ObserverFailure`].

#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Observers kept patching from inside their callbacks.
    #[error("re-entrant patch limit reached after {rounds} rounds, {dropped} pending operations dropped")]
    ReentrancyLimit { rounds: usize, dropped: usize },

    /// A setter fired after the store it writes to was dropped.
    #[error("the store behind this setter has been dropped")]
    StoreDropped,

    #[error("decode error: {message}")]
    Decode { message: String },

    #[error("encode error: {message}")]
    Encode { message: String },
}

impl Error {
    pub fn decode(message: impl Into<String>) -> Self {
        Error::Decode {
            message: message.into(),
        }
    }

    pub fn encode(message: impl Into<String>) -> Self {
        Error::Encode {
            message: message.into(),
        }
    }
}
