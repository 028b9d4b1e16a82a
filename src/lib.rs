#![no_std]
#![deny(clippy::pedantic, missing_docs, unsafe_code)]
// Almost all of the 'allow' category...
#![deny(absolute_paths_not_starting_with_crate, explicit_outlives_requirements, keyword_idents)]
#![deny(macro_use_extern_crate, meta_variable_misuse, missing_abi, non_ascii_idents)]
#![deny(rust_2021_incompatible_closure_captures, rust_2021_incompatible_or_patterns)]
#![deny(rust_2021_prefixes_incompatible_syntax, rust_2021_prelude_collisions)]
#![deny(trivial_numeric_casts, unreachable_pub, unsafe_op_in_unsafe_fn, unstable_features)]
#![deny(unused_extern_crates, unused_import_braces, unused_lifetimes, unused_macro_rules)]
//
#![doc = include_str!("../README.md")]


// Implements the ML-DSA-87 parameter set of FIPS 204 Module-Lattice-Based Digital Signature Standard.
// See <https://nvlpubs.nist.gov/nistpubs/FIPS/NIST.FIPS.204.pdf>

// Functionality map per FIPS 204
//
// Algorithm 1 ML-DSA.KeyGen() on page 17                   --> lib.rs to ml_dsa.rs
// Algorithm 2 ML-DSA.Sign(sk,M,ctx) on page 18             --> lib.rs
// Algorithm 3 ML-DSA.Verify(pk,M,s,ctx) on page 18         --> lib.rs
// Algorithm 6 ML-DSA.KeyGen_internal(x) on page 23         --> ml_dsa.rs
// Algorithm 7 ML-DSA.Sign_internal(sk,M',rnd) on page 25   --> ml_dsa.rs
// Algorithm 8 ML-DSA.Verify_internal(pk,M',s) on page 27   --> ml_dsa.rs
// Algorithm 16-19 (Simple)BitPack/BitUnpack on page 30-31  --> conversion.rs
// Algorithm 20 HintBitPack(h) on page 32                   --> conversion.rs
// Algorithm 21 HintBitUnpack(y) on page 32                 --> conversion.rs
// Algorithm 22-27 pk/sk/sig Encode/Decode on page 33-35    --> encodings.rs
// Algorithm 28 w1Encode(w1) on page 35                     --> polyvec.rs
// Algorithm 29 SampleInBall(ρ) on page 36                  --> hashing.rs
// Algorithm 30 RejNTTPoly(ρ) on page 37                    --> hashing.rs
// Algorithm 31 RejBoundedPoly(ρ) on page 37                --> hashing.rs
// Algorithm 32 ExpandA(ρ) on page 38                       --> hashing.rs
// Algorithm 33 ExpandS(ρ) on page 38                       --> hashing.rs
// Algorithm 34 ExpandMask(ρ,µ) on page 38                  --> hashing.rs
// Algorithm 35 Power2Round(r) on page 40                   --> high_low.rs
// Algorithm 36 Decompose(r) on page 40                     --> high_low.rs
// Algorithm 39 MakeHint(z,r) on page 41                    --> high_low.rs
// Algorithm 40 UseHint(h,r) on page 41                     --> high_low.rs
// Algorithm 41 NTT(w) on page 43                           --> ntt.rs
// Algorithm 42 NTT−1(wˆ) on page 44                        --> ntt.rs
// Algorithm 45 MultiplyNTT(a,b)̂ on page 45                 --> types.rs
// Algorithm 48 MatrixVectorNTT(M,v) on page 46             --> polyvec.rs
// Algorithm 49 MontgomeryReduce(a) on page 50              --> helpers.rs
// SHAKE128/SHAKE256 (FIPS 202)                             --> keccak.rs
// Types are in types.rs, traits are in traits.rs, errors are in error.rs...

// Note that debug_assert! statements enforce correct program construction and are not involved
// in any operational dataflow (so are good fuzz targets). The ensure! statements implement
// conservative dataflow validation and do not panic.

extern crate alloc;

use alloc::vec::Vec;
use rand_core::CryptoRngCore;
#[cfg(feature = "default-rng")]
use rand_core::OsRng;
use zeroize::{Zeroize, Zeroizing};

/// The `rand_core` types are re-exported so that users of mldsa87 do not
/// have to worry about using the exact correct version of `rand_core`.
pub use rand_core::{CryptoRng, Error as RngError, RngCore};

mod conversion;
mod encodings;
mod hashing;
mod helpers;
mod high_low;
mod keccak;
mod ml_dsa;
mod ntt;
mod polyvec;
mod types;

/// Error type and crate-wide `Result` alias.
pub mod error;
/// All typed functionality is covered by traits, such that consumers can utilize trait objects as desired.
pub mod traits;
/// Secure random bytes and memory wiping.
pub mod utils;

pub use crate::error::{Error, Result};
pub use crate::types::{PrivateKey, PublicKey, Signature};

use crate::helpers::ensure;
use crate::traits::{KeyGen, SerDes, Signer, Verifier};
use crate::utils::random_bytes_with_rng;


// Ring and scheme parameters; page 15 table 1 and page 17 table 2
const Q: i32 = 8_380_417; // 2^23 - 2^13 + 1 = 0x7FE001
const ZETA: i32 = 1753; // 512th root of unity mod Q
const D: u32 = 13; // dropped bits of t
const N: usize = 256;
const K: usize = 8;
const L: usize = 7;
const ETA: i32 = 2;
const TAU: usize = 60;
#[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
const BETA: i32 = (TAU as i32) * ETA;
const GAMMA1: i32 = 1 << 19;
const GAMMA2: i32 = (Q - 1) / 32;
const OMEGA: usize = 75;

// Byte sizes of seeds and hashes
/// Length in bytes of the key generation seed `ξ` (and of `ρ` and `K`).
pub const SEEDBYTES: usize = 32;
const CRHBYTES: usize = 64;
const TRBYTES: usize = 64;
const RNDBYTES: usize = 32;
const CTILDEBYTES: usize = 64;

// Byte sizes of packed polynomials
const POLYT1_PACKEDBYTES: usize = 320;
const POLYT0_PACKEDBYTES: usize = 416;
const POLYETA_PACKEDBYTES: usize = 96;
const POLYZ_PACKEDBYTES: usize = 640;
const POLYW1_PACKEDBYTES: usize = 128;

/// Public key length in bytes.
pub const PK_LEN: usize = SEEDBYTES + K * POLYT1_PACKEDBYTES;
/// Private (secret) key length in bytes.
pub const SK_LEN: usize =
    2 * SEEDBYTES + TRBYTES + (L + K) * POLYETA_PACKEDBYTES + K * POLYT0_PACKEDBYTES;
/// Signature length in bytes.
pub const SIG_LEN: usize = CTILDEBYTES + L * POLYZ_PACKEDBYTES + OMEGA + K;

const _: () = assert!((PK_LEN == 2592) & (SK_LEN == 4896) & (SIG_LEN == 4627));

/// Context string used by existing deployments of this scheme. No function applies it
/// implicitly; pass it as `ctx` where wire compatibility requires it.
pub const DEFAULT_CTX: &[u8] = b"ZOND";


/// Source of the 32-byte per-signature randomness `rnd`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SigningMode {
    /// `rnd` is all zero; equal inputs yield equal signatures.
    Deterministic,
    /// `rnd` is drawn fresh from the random number generator (hedged signing).
    Randomized,
}


// ----- BYTE-BUFFER API -----

fn as_array<'a, const LEN: usize>(what: &'static str, bytes: &'a [u8]) -> Result<&'a [u8; LEN]> {
    <&[u8; LEN]>::try_from(bytes).map_err(|_| {
        log::debug!("rejected {what} of {} bytes (expected {LEN})", bytes.len());
        Error::InvalidLength { what, expected: LEN, actual: bytes.len() }
    })
}


fn check_len(what: &'static str, expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        log::debug!("rejected {what} of {actual} bytes (expected {expected})");
        return Err(Error::InvalidLength { what, expected, actual });
    }
    Ok(())
}


fn check_ctx(ctx: &[u8]) -> Result<()> {
    if ctx.len() > 255 {
        log::debug!("rejected context of {} bytes", ctx.len());
        return Err(Error::ContextTooLong(ctx.len()));
    }
    Ok(())
}


fn signing_rnd(
    rng: &mut impl CryptoRngCore, mode: SigningMode,
) -> Result<Zeroizing<[u8; RNDBYTES]>> {
    let mut rnd = Zeroizing::new([0u8; RNDBYTES]);
    if mode == SigningMode::Randomized {
        random_bytes_with_rng(rng, &mut *rnd)?;
    }
    Ok(rnd)
}


/// # Algorithm 1: `ML-DSA.KeyGen()` on page 17.
/// Generates a key pair into `pk` (exactly `PK_LEN` bytes) and `sk` (exactly `SK_LEN`
/// bytes). With `seed` present (exactly 32 bytes) the key pair is derived from it;
/// otherwise a fresh seed is drawn from the OS random number generator. Returns the seed.
///
/// # Errors
/// Returns `Error::InvalidLength` for a wrongly sized buffer or seed and `Error::Rng` when
/// the random number generator fails.
///
/// # Examples
/// ```rust
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// use mldsa87::{crypto_sign_keypair, PK_LEN, SK_LEN};
///
/// let (mut pk, mut sk) = ([0u8; PK_LEN], [0u8; SK_LEN]);
/// let seed = crypto_sign_keypair(Some(&[42u8; 32]), &mut pk, &mut sk)?;
/// assert_eq!(seed, [42u8; 32]);
/// # Ok(())}
/// ```
#[cfg(feature = "default-rng")]
pub fn crypto_sign_keypair(
    seed: Option<&[u8]>, pk: &mut [u8], sk: &mut [u8],
) -> Result<[u8; SEEDBYTES]> {
    crypto_sign_keypair_with_rng(&mut OsRng, seed, pk, sk)
}


/// As [`crypto_sign_keypair`], drawing an absent seed from the supplied random number
/// generator.
///
/// # Errors
/// Returns `Error::InvalidLength` for a wrongly sized buffer or seed and `Error::Rng` when
/// the random number generator fails.
pub fn crypto_sign_keypair_with_rng(
    rng: &mut impl CryptoRngCore, seed: Option<&[u8]>, pk: &mut [u8], sk: &mut [u8],
) -> Result<[u8; SEEDBYTES]> {
    check_len("public key", PK_LEN, pk.len())?;
    check_len("secret key", SK_LEN, sk.len())?;

    let xi = match seed {
        Some(seed) => *as_array::<SEEDBYTES>("seed", seed)?,
        None => {
            let mut xi = [0u8; SEEDBYTES];
            random_bytes_with_rng(rng, &mut xi)?;
            xi
        }
    };

    let (pk_bytes, mut sk_bytes) = ml_dsa::key_gen_internal(&xi);
    pk.copy_from_slice(&pk_bytes);
    sk.copy_from_slice(&sk_bytes);
    sk_bytes.zeroize();
    Ok(xi)
}


/// # Algorithm 2: `ML-DSA.Sign(sk, M, ctx)` on page 18.
/// Writes a signature over `m` under context `ctx` into `sig` (exactly `SIG_LEN` bytes).
/// Randomized signing draws from the OS random number generator.
///
/// # Errors
/// Returns `Error::InvalidLength` for wrongly sized buffers, `Error::ContextTooLong`,
/// `Error::Rng`, `Error::MalformedKey` or `Error::RejectionLimit`.
#[cfg(feature = "default-rng")]
pub fn crypto_sign_signature(
    sig: &mut [u8], m: &[u8], sk: &[u8], mode: SigningMode, ctx: &[u8],
) -> Result<()> {
    crypto_sign_signature_with_rng(&mut OsRng, sig, m, sk, mode, ctx)
}


/// As [`crypto_sign_signature`], with randomized signing drawing from `rng`.
///
/// # Errors
/// Returns `Error::InvalidLength` for wrongly sized buffers, `Error::ContextTooLong`,
/// `Error::Rng`, `Error::MalformedKey` or `Error::RejectionLimit`.
pub fn crypto_sign_signature_with_rng(
    rng: &mut impl CryptoRngCore, sig: &mut [u8], m: &[u8], sk: &[u8], mode: SigningMode,
    ctx: &[u8],
) -> Result<()> {
    check_len("signature", SIG_LEN, sig.len())?;
    let sk = as_array::<SK_LEN>("secret key", sk)?;
    check_ctx(ctx)?;

    let rnd = signing_rnd(rng, mode)?;
    let signature = ml_dsa::sign_internal(sk, m, ctx, &rnd)?;
    sig.copy_from_slice(&signature);
    Ok(())
}


/// # Algorithm 3: `ML-DSA.Verify(pk, M, σ, ctx)` on page 18.
/// Returns `true` only for a valid signature; wrongly sized inputs, an over-long context
/// or a malformed signature all yield `false`.
#[must_use]
pub fn crypto_sign_verify(sig: &[u8], m: &[u8], pk: &[u8], ctx: &[u8]) -> bool {
    let (Ok(sig), Ok(pk)) = (<&[u8; SIG_LEN]>::try_from(sig), <&[u8; PK_LEN]>::try_from(pk))
    else {
        log::debug!("verify: signature or public key has the wrong length");
        return false;
    };
    ml_dsa::verify_internal(pk, m, sig, ctx)
}


/// Signs `msg` and returns the signed message `signature || msg`.
///
/// # Errors
/// As [`crypto_sign_signature`].
#[cfg(feature = "default-rng")]
pub fn crypto_sign(msg: &[u8], sk: &[u8], mode: SigningMode, ctx: &[u8]) -> Result<Vec<u8>> {
    crypto_sign_with_rng(&mut OsRng, msg, sk, mode, ctx)
}


/// As [`crypto_sign`], with randomized signing drawing from `rng`.
///
/// # Errors
/// As [`crypto_sign_signature_with_rng`].
pub fn crypto_sign_with_rng(
    rng: &mut impl CryptoRngCore, msg: &[u8], sk: &[u8], mode: SigningMode, ctx: &[u8],
) -> Result<Vec<u8>> {
    let mut sm = alloc::vec![0u8; SIG_LEN + msg.len()];
    crypto_sign_signature_with_rng(rng, &mut sm[..SIG_LEN], msg, sk, mode, ctx)?;
    sm[SIG_LEN..].copy_from_slice(msg);
    Ok(sm)
}


/// Opens a signed message `signature || msg`, returning `msg` when the signature verifies
/// and `None` otherwise (including input shorter than a signature).
#[must_use]
pub fn crypto_sign_open(sm: &[u8], pk: &[u8], ctx: &[u8]) -> Option<Vec<u8>> {
    if sm.len() < SIG_LEN {
        return None;
    }
    let (sig, msg) = sm.split_at(SIG_LEN);
    crypto_sign_verify(sig, msg, pk, ctx).then(|| msg.to_vec())
}


/// Re-derives the public key from a secret key. The secret key's embedded hash `tr` must
/// match the recomputed public key.
///
/// # Errors
/// Returns `Error::InvalidLength` for a wrongly sized key and `Error::MalformedKey` when it
/// does not decode or is internally inconsistent.
pub fn public_key_from_secret(sk: &[u8]) -> Result<[u8; PK_LEN]> {
    let sk = as_array::<SK_LEN>("secret key", sk)?;
    ml_dsa::private_to_public(sk)
}


// ----- TYPED API -----

/// Empty struct to enable `KeyGen` trait objects. Implements the [`crate::traits::KeyGen`] trait.
pub struct KG();


/// # Algorithm 1: `ML-DSA.KeyGen()` on page 17.
/// Generates a public and private key pair using the OS default random number generator.
///
/// # Errors
/// Returns an error if the random number generator fails.
#[cfg(feature = "default-rng")]
pub fn try_keygen() -> Result<(PublicKey, PrivateKey)> { KG::try_keygen() }


/// # Algorithm 1: `ML-DSA.KeyGen()` on page 17.
/// Generates a public and private key pair using the **provided** random number generator.
///
/// # Errors
/// Returns an error if the random number generator fails.
pub fn try_keygen_with_rng(rng: &mut impl CryptoRngCore) -> Result<(PublicKey, PrivateKey)> {
    KG::try_keygen_with_rng(rng)
}


impl KeyGen for KG {
    type PrivateKey = PrivateKey;
    type PublicKey = PublicKey;

    fn try_keygen_with_rng(rng: &mut impl CryptoRngCore) -> Result<(PublicKey, PrivateKey)> {
        let (mut xi, pk, mut sk) = ml_dsa::key_gen(rng)?;
        let private = PrivateKey(sk);
        xi.zeroize();
        sk.zeroize();
        Ok((PublicKey(pk), private))
    }

    fn keygen_from_seed(xi: &[u8; 32]) -> (PublicKey, PrivateKey) {
        let (pk, mut sk) = ml_dsa::key_gen_internal(xi);
        let private = PrivateKey(sk);
        sk.zeroize();
        (PublicKey(pk), private)
    }
}


impl Signer for PrivateKey {
    type Signature = Signature;
    type PublicKey = PublicKey;

    /// # Algorithm 2: `ML-DSA.Sign(sk, M, ctx)` on page 18.
    /// Generates a hedged ML-DSA signature.
    ///
    /// **Input**:  Implemented on private key struct,
    ///             message `M ∈ {0, 1}∗`,
    ///             context string `ctx` (a byte string of 255 or fewer bytes). <br>
    /// **Output**: Signature `σ ∈ B^{64+ℓ·32·20+ω+k}`.
    ///
    /// # Errors
    /// Returns an error when the random number generator fails or context too long.
    fn try_sign_with_rng(
        &self, rng: &mut impl CryptoRngCore, message: &[u8], ctx: &[u8],
    ) -> Result<Signature> {
        // 1: if |ctx| > 255 then
        // 2:   return ⊥    ▷ return an error indication if the context string is too long
        // 3: end if
        ensure!(ctx.len() < 256, Error::ContextTooLong(ctx.len()));

        // 5: rnd ← B^32
        // 6: if rnd = NULL then
        // 7:   return ⊥    ▷ return an error indication if random bit generation failed
        // 8: end if
        let rnd = signing_rnd(rng, SigningMode::Randomized)?;

        // 10: M′ ← IntegerToBytes(0, 1) ∥ IntegerToBytes(|ctx|, 1) ∥ ctx ∥ M
        // 11: σ ← ML-DSA.Sign_internal(sk, M′, rnd)
        ml_dsa::sign_internal(&self.0, message, ctx, &rnd)
    }

    /// # Algorithm 2: `ML-DSA.Sign(sk, M, ctx)` on page 18, deterministic variant.
    /// Substitutes `rnd ← {0}^32`.
    ///
    /// # Errors
    /// Returns an error when the context is too long or the key is malformed.
    fn try_sign_deterministic(&self, message: &[u8], ctx: &[u8]) -> Result<Signature> {
        ensure!(ctx.len() < 256, Error::ContextTooLong(ctx.len()));
        ml_dsa::sign_internal(&self.0, message, ctx, &[0u8; RNDBYTES])
    }

    fn get_public_key(&self) -> Result<PublicKey> { ml_dsa::private_to_public(&self.0).map(PublicKey) }
}


impl Verifier for PublicKey {
    type Signature = Signature;

    /// # Algorithm 3: `ML-DSA.Verify(pk, M, σ, ctx)` on page 18.
    /// Verifies a signature `σ` for a message `M`.
    ///
    /// **Input**:  Implemented on public key struct,
    ///             message `M ∈ {0, 1}∗`,
    ///             signature `σ ∈ B^{64+ℓ·32·20+ω+k}`,
    ///             context string `ctx` (a byte string of 255 or fewer bytes). <br>
    /// **Output**: Boolean.
    fn verify(&self, message: &[u8], sig: &Signature, ctx: &[u8]) -> bool {
        // 1: if |ctx| > 255 then return false
        if ctx.len() > 255 {
            return false;
        };

        // 5: M′ ← IntegerToBytes(0, 1) ∥ IntegerToBytes(|ctx|, 1) ∥ ctx ∥ M
        // 6: return ML-DSA.Verify_internal(pk, M′, σ)
        ml_dsa::verify_internal(&self.0, message, sig, ctx)
    }
}


/// Signs an already formatted message `M′` without adding the `0x00 || |ctx| || ctx` prefix.
/// The NIST ACVP "internal" vectors are stated at this level; applications should use the
/// [`Signer`] trait or [`crypto_sign_signature`] instead.
///
/// # Errors
/// Returns an error when the key is malformed or the rejection loop exceeds its bound.
#[doc(hidden)]
pub fn _internal_sign(sk: &PrivateKey, message_prime: &[u8], rnd: [u8; RNDBYTES]) -> Result<Signature> {
    ml_dsa::sign_prepared(&sk.0, message_prime, &rnd)
}


/// Verifies a signature over an already formatted message `M′`; the counterpart of
/// [`_internal_sign`].
#[doc(hidden)]
#[must_use]
pub fn _internal_verify(pk: &PublicKey, message_prime: &[u8], sig: &Signature) -> bool {
    ml_dsa::verify_prepared(&pk.0, message_prime, sig)
}


// ----- SERIALIZATION AND DESERIALIZATION ---

impl SerDes for PrivateKey {
    type ByteArray = [u8; SK_LEN];

    fn try_from_bytes(sk: Self::ByteArray) -> Result<Self> {
        let (_rho, mut key, _tr, mut s1, mut s2, mut t0) = encodings::unpack_sk(&sk)?;
        key.zeroize();
        s1.zeroize();
        s2.zeroize();
        t0.zeroize();
        Ok(PrivateKey(sk))
    }

    fn into_bytes(self) -> Self::ByteArray { self.0 }
}


impl SerDes for PublicKey {
    type ByteArray = [u8; PK_LEN];

    // every 10-bit t1 field is valid, so only the (type-enforced) length matters
    fn try_from_bytes(pk: Self::ByteArray) -> Result<Self> { Ok(PublicKey(pk)) }

    fn into_bytes(self) -> Self::ByteArray { self.0 }
}
