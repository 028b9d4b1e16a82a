// This file implements functionality from FIPS 204 section 6: ML-DSA.KeyGen_internal,
// ML-DSA.Sign_internal and ML-DSA.Verify_internal, over byte-encoded keys and signatures.

use crate::encodings::{pack_pk, pack_sig, pack_sk, unpack_pk, unpack_sig, unpack_sk};
use crate::error::{Error, Result};
use crate::hashing::{expand_a, expand_mask, expand_s, poly_challenge};
use crate::helpers::{ct_eq, ensure};
use crate::keccak::shake256_into;
use crate::ntt::ntt;
use crate::polyvec;
use crate::types::{Matrix, PolyVecK, PolyVecL};
use crate::utils::random_bytes_with_rng;
use crate::{BETA, CRHBYTES, CTILDEBYTES, GAMMA1, GAMMA2, K, L, OMEGA, PK_LEN};
use crate::{POLYW1_PACKEDBYTES, RNDBYTES, SEEDBYTES, SIG_LEN, SK_LEN, TRBYTES};
use rand_core::CryptoRngCore;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};


/// Upper bound on signing attempts: every attempt consumes `L` values of the 16-bit mask
/// nonce, so at most `u16::MAX / L` attempts have distinct masks.
#[allow(clippy::cast_possible_truncation)]
pub(crate) const MAX_SIGN_ATTEMPTS: u16 = u16::MAX / (L as u16);


/// # Algorithm 1: `ML-DSA.KeyGen()` on page 17.
/// Draws a fresh 32-byte seed and derives the key pair from it.
///
/// **Output**: `(ξ, pk, sk)`
///
/// # Errors
/// Returns `Error::Rng` when the random number generator fails.
pub(crate) fn key_gen(
    rng: &mut impl CryptoRngCore,
) -> Result<([u8; SEEDBYTES], [u8; PK_LEN], [u8; SK_LEN])> {
    // 1: ξ ← B^32    ▷ Choose random seed
    let mut xi = [0u8; SEEDBYTES];
    random_bytes_with_rng(rng, &mut xi)?;

    // 2-5: return ML-DSA.KeyGen_internal(ξ)
    let (pk, sk) = key_gen_internal(&xi);
    Ok((xi, pk, sk))
}


/// # Algorithm 6: `ML-DSA.KeyGen_internal(ξ)` on page 23.
/// Generates a public-private key pair from a seed.
///
/// **Input**: Seed `ξ ∈ B^32` <br>
/// **Output**: Public key `pk ∈ B^{32+32·k·10}` and private key
///             `sk ∈ B^{32+32+64+32·((ℓ+k)·3+13·k)}`.
pub(crate) fn key_gen_internal(xi: &[u8; SEEDBYTES]) -> ([u8; PK_LEN], [u8; SK_LEN]) {
    //
    // 1: (ρ, ρ′, K) ← H(ξ || IntegerToBytes(k, 1) || IntegerToBytes(ℓ, 1), 128)    ▷ Expand seed
    let mut seed_buf = [0u8; 2 * SEEDBYTES + CRHBYTES];
    shake256_into(&mut seed_buf, &[xi, &[K.to_le_bytes()[0], L.to_le_bytes()[0]]]);
    let mut rho = [0u8; SEEDBYTES];
    let mut rho_prime = [0u8; CRHBYTES];
    let mut key = [0u8; SEEDBYTES];
    rho.copy_from_slice(&seed_buf[..SEEDBYTES]);
    rho_prime.copy_from_slice(&seed_buf[SEEDBYTES..SEEDBYTES + CRHBYTES]);
    key.copy_from_slice(&seed_buf[SEEDBYTES + CRHBYTES..]);

    // 3: A_hat ← ExpandA(ρ)    ▷ A is generated and stored in NTT representation as A_hat
    let mat = expand_a(&rho);

    // 4: (s1, s2) ← ExpandS(ρ′)
    let (mut s1, mut s2) = expand_s(&rho_prime);

    // 5: t ← NTT−1(A_hat ∘ NTT(s1)) + s2    ▷ Compute t = As1 + s2
    let mut t = compute_t(&mat, &s1, &s2);

    // 6: (t1, t0) ← Power2Round(t)    ▷ Compress t
    let (t1, mut t0) = polyvec::power2round(&t);

    // 8: pk ← pkEncode(ρ, t1)
    let pk = pack_pk(&rho, &t1);

    // 9: tr ← H(pk, 64)
    let mut tr = [0u8; TRBYTES];
    shake256_into(&mut tr, &[&pk]);

    // 10: sk ← skEncode(ρ, K, tr, s1, s2, t0)    ▷ K and tr are for use in signing
    let sk = pack_sk(&rho, &key, &tr, &s1, &s2, &t0);

    seed_buf.zeroize();
    rho_prime.zeroize();
    key.zeroize();
    s1.zeroize();
    s2.zeroize();
    t.zeroize();
    t0.zeroize();

    // 11: return (pk, sk)
    (pk, sk)
}


/// `t = NTT−1(A_hat ∘ NTT(s1)) + s2`, with coefficients in `[0, Q)`.
fn compute_t(mat: &Matrix, s1: &PolyVecL, s2: &PolyVecK) -> PolyVecK {
    let mut s1_hat = Zeroizing::new(*s1);
    polyvec::ntt(&mut *s1_hat);
    let mut t = polyvec::matrix_pointwise_montgomery(mat, &*s1_hat);
    polyvec::reduce(&mut t);
    polyvec::invntt_tomont(&mut t);
    polyvec::add_assign(&mut t, s2);
    polyvec::caddq(&mut t);
    t
}


/// Why a signing attempt was abandoned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Reject {
    /// `‖z‖∞ ≥ γ1 − β`
    ResponseNorm,
    /// `‖LowBits(w − c·s2)‖∞ ≥ γ2 − β`
    LowBitsNorm,
    /// `‖c·t0‖∞ ≥ γ2`
    CarryNorm,
    /// more than `ω` hint bits
    HintCount,
}


/// Per-signature state shared by every attempt of the rejection loop; all NTT-domain.
#[derive(Zeroize, ZeroizeOnDrop)]
struct Signing {
    mat: Matrix,
    s1_hat: PolyVecL,
    s2_hat: PolyVecK,
    t0_hat: PolyVecK,
    mu: [u8; CRHBYTES],
    rho_prime: [u8; CRHBYTES],
}


impl Signing {
    /// Steps 11-31 of Algorithm 7 for a single value of the mask counter `nonce`.
    #[allow(clippy::similar_names)]
    fn attempt(&self, nonce: u16) -> core::result::Result<[u8; SIG_LEN], Reject> {
        //
        // 11: y ∈ R^ℓ_q ← ExpandMask(ρ′, κ)
        let y = Zeroizing::new(expand_mask(&self.rho_prime, nonce));

        // 12: w ← NTT−1(A_hat ∘ NTT(y))
        let mut y_hat = Zeroizing::new(*y);
        polyvec::ntt(&mut *y_hat);
        let mut w = polyvec::matrix_pointwise_montgomery(&self.mat, &*y_hat);
        polyvec::reduce(&mut w);
        polyvec::invntt_tomont(&mut w);
        polyvec::caddq(&mut w);

        // 13: w1 ← HighBits(w)    ▷ Signer's commitment (w0 kept for step 21)
        let (w1, mut w0) = polyvec::decompose(&w);

        // 15: c˜ ← H(µ || w1Encode(w1), λ/4)    ▷ Commitment hash
        let mut w1_packed = [0u8; K * POLYW1_PACKEDBYTES];
        polyvec::pack_w1(&w1, &mut w1_packed);
        let mut ctilde = [0u8; CTILDEBYTES];
        shake256_into(&mut ctilde, &[&self.mu, &w1_packed]);

        // 16: c ∈ R_q ← SampleInBall(c˜)    ▷ Verifier's challenge
        // 17: c_hat ← NTT(c)
        let mut c_hat = poly_challenge(&ctilde);
        ntt(&mut c_hat);

        // 18: ⟨⟨c·s1⟩⟩ ← NTT−1(c_hat ∘ s1_hat)
        // 20: z ← y + ⟨⟨c·s1⟩⟩    ▷ Signer's response
        let mut z = polyvec::pointwise_poly_montgomery(&c_hat, &self.s1_hat);
        polyvec::invntt_tomont(&mut z);
        polyvec::add_assign(&mut z, &*y);
        polyvec::reduce(&mut z);

        // 23: if ||z||∞ ≥ γ1 − β then (z, h) ← ⊥    ▷ Validity checks
        if polyvec::chk_norm(&z, GAMMA1 - BETA) {
            return Err(Reject::ResponseNorm);
        }

        // 19: ⟨⟨c·s2⟩⟩ ← NTT−1(c_hat ∘ s2_hat)
        // 21: r0 ← LowBits(w − ⟨⟨c·s2⟩⟩)
        let mut cs2 = polyvec::pointwise_poly_montgomery(&c_hat, &self.s2_hat);
        polyvec::invntt_tomont(&mut cs2);
        polyvec::sub_assign(&mut w0, &cs2);
        polyvec::reduce(&mut w0);
        cs2.zeroize();

        // 23 (cont.): ... or ||r0||∞ ≥ γ2 − β
        if polyvec::chk_norm(&w0, GAMMA2 - BETA) {
            return Err(Reject::LowBitsNorm);
        }

        // 25: ⟨⟨c·t0⟩⟩ ← NTT−1(c_hat ∘ t0_hat)
        let mut ct0 = polyvec::pointwise_poly_montgomery(&c_hat, &self.t0_hat);
        polyvec::invntt_tomont(&mut ct0);
        polyvec::reduce(&mut ct0);

        // 28: if ||⟨⟨c·t0⟩⟩||∞ ≥ γ2 ... then (z, h) ← ⊥
        if polyvec::chk_norm(&ct0, GAMMA2) {
            return Err(Reject::CarryNorm);
        }

        // 26: h ← MakeHint(−⟨⟨c·t0⟩⟩, w − ⟨⟨c·s2⟩⟩ + ⟨⟨c·t0⟩⟩)    ▷ Signer's hint
        polyvec::add_assign(&mut w0, &ct0);
        let (h, hint_count) = polyvec::make_hint(&w0, &w1);
        w0.zeroize();
        ct0.zeroize();

        // 28 (cont.): ... or the number of 1's in h is greater than ω
        if hint_count > OMEGA {
            return Err(Reject::HintCount);
        }

        // 33: σ ← sigEncode(c˜, z mod± q, h)
        Ok(pack_sig(&ctilde, &z, &h))
    }
}


/// # Algorithm 7: `ML-DSA.Sign_internal(sk, M′, rnd)` on page 25.
/// Signs `0x00 || |ctx| || ctx || message` (the pure ML-DSA message encoding of Algorithm 2)
/// using the 32-byte per-signature randomness `rnd` (all zero for deterministic signing).
///
/// **Input**: Private key `sk`, message, context string, `rnd ∈ B^32`. <br>
/// **Output**: Signature `σ ∈ B^{64+ℓ·32·20+ω+k}`.
///
/// # Errors
/// Returns `Error::ContextTooLong` for a context over 255 bytes, `Error::MalformedKey` when
/// the private key does not decode, and `Error::RejectionLimit` if no attempt succeeds.
pub(crate) fn sign_internal(
    sk: &[u8; SK_LEN], message: &[u8], ctx: &[u8], rnd: &[u8; RNDBYTES],
) -> Result<[u8; SIG_LEN]> {
    ensure!(ctx.len() < 256, Error::ContextTooLong(ctx.len()));
    sign_formatted(sk, Some(ctx), message, rnd)
}


/// `µ ← H(tr || M′, 64)`. With a context, `M′ = 0x00 || |ctx| || ctx || message`; without
/// one, `message` already is the formatted `M′`.
fn message_representative(
    tr: &[u8; TRBYTES], ctx: Option<&[u8]>, message: &[u8],
) -> [u8; CRHBYTES] {
    let mut mu = [0u8; CRHBYTES];
    match ctx {
        Some(ctx) => {
            debug_assert!(ctx.len() < 256);
            shake256_into(&mut mu, &[tr, &[0u8, ctx.len().to_le_bytes()[0]], ctx, message]);
        }
        None => shake256_into(&mut mu, &[tr, message]),
    }
    mu
}


/// Algorithm 7 proper, over either a (context, message) pair or an already formatted `M′`.
fn sign_formatted(
    sk: &[u8; SK_LEN], ctx: Option<&[u8]>, message: &[u8], rnd: &[u8; RNDBYTES],
) -> Result<[u8; SIG_LEN]> {
    //
    // 1: (ρ, K, tr, s1, s2, t0) ← skDecode(sk)
    let (rho, mut key, tr, s1, s2, t0) = unpack_sk(sk)?;

    // 2-4: s1_hat ← NTT(s1), s2_hat ← NTT(s2), t0_hat ← NTT(t0)
    // 5: A_hat ← ExpandA(ρ)
    let mut state = Signing {
        mat: expand_a(&rho),
        s1_hat: s1,
        s2_hat: s2,
        t0_hat: t0,
        mu: [0u8; CRHBYTES],
        rho_prime: [0u8; CRHBYTES],
    };
    polyvec::ntt(&mut state.s1_hat);
    polyvec::ntt(&mut state.s2_hat);
    polyvec::ntt(&mut state.t0_hat);

    // 6: µ ← H(BytesToBits(tr) || M′, 64)    ▷ Compute message representative µ
    state.mu = message_representative(&tr, ctx, message);

    // 7: ρ″ ← H(K || rnd || µ, 64)    ▷ Compute private random seed
    shake256_into(&mut state.rho_prime, &[&key, rnd, &state.mu]);
    key.zeroize();

    // 8: κ ← 0    ▷ Initialize counter κ
    // 10: while (z, h) = ⊥ do    ▷ Rejection sampling loop
    for nonce in 0..MAX_SIGN_ATTEMPTS {
        match state.attempt(nonce) {
            Ok(sig) => {
                log::trace!("signature accepted after {} attempt(s)", u32::from(nonce) + 1);
                return Ok(sig);
            }
            // 32: κ ← κ + ℓ    ▷ Increment counter (kept as nonce; ExpandMask scales by ℓ)
            Err(reason) => log::trace!("signing attempt {nonce} rejected: {reason:?}"),
        }
    }

    log::debug!("no signature after {MAX_SIGN_ATTEMPTS} attempts");
    Err(Error::RejectionLimit)
}


/// # Algorithm 8: `ML-DSA.Verify_internal(pk, M′, σ)` on page 27.
/// Verifies a signature over `0x00 || |ctx| || ctx || message`. Every malformed input
/// (long context, bad hint encoding, oversized response) is simply `false`.
///
/// **Input**: Public key `pk`, message, signature `σ`, context string. <br>
/// **Output**: Boolean
pub(crate) fn verify_internal(
    pk: &[u8; PK_LEN], message: &[u8], sig: &[u8; SIG_LEN], ctx: &[u8],
) -> bool {
    if ctx.len() > 255 {
        return false;
    }
    verify_formatted(pk, Some(ctx), message, sig)
}


/// Algorithm 8 proper, over either a (context, message) pair or an already formatted `M′`.
fn verify_formatted(
    pk: &[u8; PK_LEN], ctx: Option<&[u8]>, message: &[u8], sig: &[u8; SIG_LEN],
) -> bool {
    //
    // 2: (c˜, z, h) ← sigDecode(σ)    ▷ Signer's commitment hash c˜, response z and hint h
    // 3: if h = ⊥ then return false    ▷ Hint was not properly encoded
    let Some((ctilde, mut z, h)) = unpack_sig(sig) else {
        return false;
    };

    // 13 (hoisted): return [[ ||z||∞ < γ1 − β ]]
    if polyvec::chk_norm(&z, GAMMA1 - BETA) {
        return false;
    }

    // 1: (ρ, t1) ← pkDecode(pk)
    let (rho, mut t1) = unpack_pk(pk);

    // 5: A_hat ← ExpandA(ρ)    ▷ A is generated and stored in NTT representation as A_hat
    let mat = expand_a(&rho);

    // 6: tr ← H(pk, 64)
    let mut tr = [0u8; TRBYTES];
    shake256_into(&mut tr, &[pk]);

    // 7: µ ← (H(BytesToBits(tr) || M′, 64))    ▷ Compute message representative µ
    let mu = message_representative(&tr, ctx, message);

    // 8: c ∈ R_q ← SampleInBall(c˜)    ▷ Compute verifier's challenge from c˜
    let mut c_hat = poly_challenge(&ctilde);
    ntt(&mut c_hat);

    // 9: w′_Approx ← NTT−1(A_hat ∘ NTT(z) − NTT(c) ∘ NTT(t1 · 2^d))    ▷ w′_Approx = Az − ct1·2^d
    polyvec::ntt(&mut z);
    let mut w1 = polyvec::matrix_pointwise_montgomery(&mat, &z);
    polyvec::shiftl(&mut t1);
    polyvec::ntt(&mut t1);
    let ct1 = polyvec::pointwise_poly_montgomery(&c_hat, &t1);
    polyvec::sub_assign(&mut w1, &ct1);
    polyvec::reduce(&mut w1);
    polyvec::invntt_tomont(&mut w1);

    // 10: w1′ ← UseHint(h, w′_Approx)    ▷ Reconstruction of signer's commitment
    polyvec::caddq(&mut w1);
    polyvec::use_hint(&mut w1, &h);
    let mut w1_packed = [0u8; K * POLYW1_PACKEDBYTES];
    polyvec::pack_w1(&w1, &mut w1_packed);

    // 12: c˜′ ← H(µ || w1Encode(w1′), λ/4)    ▷ Hash it; this should match c˜
    let mut ctilde_prime = [0u8; CTILDEBYTES];
    shake256_into(&mut ctilde_prime, &[&mu, &w1_packed]);

    // 13: return [[ c˜ = c˜′ ]]
    ct_eq(&ctilde, &ctilde_prime)
}


/// Algorithm 7 applied to an already formatted message `M′`, with no context prefix added.
/// This is the form the NIST ACVP "internal" vectors exercise.
///
/// # Errors
/// Returns `Error::MalformedKey` when the private key does not decode and
/// `Error::RejectionLimit` if no attempt succeeds.
pub(crate) fn sign_prepared(
    sk: &[u8; SK_LEN], message_prime: &[u8], rnd: &[u8; RNDBYTES],
) -> Result<[u8; SIG_LEN]> {
    sign_formatted(sk, None, message_prime, rnd)
}


/// Algorithm 8 applied to an already formatted message `M′`.
pub(crate) fn verify_prepared(pk: &[u8; PK_LEN], message_prime: &[u8], sig: &[u8; SIG_LEN]) -> bool {
    verify_formatted(pk, None, message_prime, sig)
}


/// Re-derives the public key from a private key: `t1` is recomputed from `ρ`, `s1` and `s2`,
/// and the embedded `tr` must equal `H(pk)`.
///
/// # Errors
/// Returns `Error::MalformedKey` when the private key does not decode or its `tr` does not
/// belong to the recomputed public key.
pub(crate) fn private_to_public(sk: &[u8; SK_LEN]) -> Result<[u8; PK_LEN]> {
    let (rho, mut key, tr, mut s1, mut s2, mut t0) = unpack_sk(sk)?;
    key.zeroize();
    t0.zeroize();

    let mat = expand_a(&rho);
    let mut t = compute_t(&mat, &s1, &s2);
    s1.zeroize();
    s2.zeroize();
    let (t1, mut t0_check) = polyvec::power2round(&t);
    t.zeroize();
    t0_check.zeroize();

    let pk = pack_pk(&rho, &t1);
    let mut tr_check = [0u8; TRBYTES];
    shake256_into(&mut tr_check, &[&pk]);
    ensure!(ct_eq(&tr, &tr_check), Error::MalformedKey);
    Ok(pk)
}
