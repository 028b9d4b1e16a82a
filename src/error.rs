//! Error type shared by every fallible operation in the crate.


/// Failures surfaced by key generation, signing and the byte-buffer API. Verification
/// never errors; it only answers `true` or `false`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A caller-supplied buffer (or seed) does not have the exact required size.
    #[error("invalid {what} length {actual} (expected {expected})")]
    InvalidLength {
        /// Which buffer was rejected, e.g. `"secret key"`.
        what: &'static str,
        /// Required length in bytes.
        expected: usize,
        /// Length that was supplied.
        actual: usize,
    },

    /// The context string is longer than 255 bytes.
    #[error("invalid context length {0} (max 255)")]
    ContextTooLong(usize),

    /// The random number generator failed or returned obviously broken output.
    #[error("secure random number generation failed")]
    Rng,

    /// The secret key bytes do not decode to a well-formed key.
    #[error("malformed secret key")]
    MalformedKey,

    /// Signing exhausted its bounded number of rejection-sampling attempts.
    #[error("signing rejection loop exceeded its bound")]
    RejectionLimit,

    /// A buffer still held non-zero bytes after being wiped.
    #[error("zeroization failed")]
    ZeroizeFailed,
}


/// Crate-wide result alias.
pub type Result<T> = core::result::Result<T, Error>;
