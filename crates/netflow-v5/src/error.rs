use thiserror::Error;

/// Reasons a datagram is rejected.
///
/// A rejected buffer yields nothing, never a partial batch. Every variant is
/// recoverable from the caller's side: drop the offending packet and keep
/// listening.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeError {
    #[error("packet too short for netflow v5 header")]
    HeaderTooShort,

    #[error("unsupported netflow version {0}")]
    UnsupportedVersion(u16),

    #[error("packet truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
}

static_assertions::const_assert!(std::mem::size_of::<DecodeError>() <= 24);

pub type Result<T> = std::result::Result<T, DecodeError>;
