//! Secure randomness and memory-wiping helpers used by key generation and signing, and
//! exposed for callers that manage their own seed buffers.

use crate::error::{Error, Result};
use crate::helpers::ensure;
use rand_core::CryptoRngCore;
#[cfg(feature = "default-rng")]
use rand_core::OsRng;
use zeroize::Zeroize;


/// Fills `out` from the operating system's secure random source.
///
/// # Errors
/// Returns `Error::Rng` if the source fails, or if a request of 16 bytes or more comes back
/// with an all-zero 16-byte prefix.
#[cfg(feature = "default-rng")]
pub fn random_bytes(out: &mut [u8]) -> Result<()> { random_bytes_with_rng(&mut OsRng, out) }


/// Fills `out` from the supplied cryptographic random number generator.
///
/// # Errors
/// Returns `Error::Rng` if the generator fails, or if a request of 16 bytes or more comes
/// back with an all-zero 16-byte prefix.
pub fn random_bytes_with_rng(rng: &mut impl CryptoRngCore, out: &mut [u8]) -> Result<()> {
    rng.try_fill_bytes(out).map_err(|_| Error::Rng)?;
    if out.len() >= 16 && is_zero(&out[..16]) {
        log::debug!("random source returned an all-zero prefix for a {} byte request", out.len());
        return Err(Error::Rng);
    }
    Ok(())
}


/// Overwrites `buf` with zeros using volatile writes, then reads it back.
///
/// # Errors
/// Returns `Error::ZeroizeFailed` if any byte is still non-zero afterwards.
pub fn zeroize(buf: &mut [u8]) -> Result<()> {
    buf.zeroize();
    ensure!(is_zero(buf), Error::ZeroizeFailed);
    Ok(())
}


/// Returns `true` if every byte of `buf` is zero. Runs in time dependent only on the length.
#[must_use]
pub fn is_zero(buf: &[u8]) -> bool { buf.iter().fold(0u8, |acc, &b| acc | b) == 0 }
