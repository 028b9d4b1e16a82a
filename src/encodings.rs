//! This file implements functionality from FIPS 204 section 7.2 Encodings of ML-DSA Keys and Signatures

use crate::conversion::{hint_pack, hint_unpack, pack_eta, pack_t0, pack_t1, pack_z};
use crate::conversion::{unpack_eta, unpack_t0, unpack_t1, unpack_z};
use crate::error::{Error, Result};
use crate::helpers::ensure;
use crate::types::{PolyVecK, PolyVecL, POLY0};
use crate::{CTILDEBYTES, ETA, K, L, OMEGA, PK_LEN, SEEDBYTES, SIG_LEN, SK_LEN, TRBYTES};
use crate::{POLYETA_PACKEDBYTES, POLYT0_PACKEDBYTES, POLYT1_PACKEDBYTES, POLYZ_PACKEDBYTES};


// Byte offsets within the secret key
const SK_KEY: usize = SEEDBYTES;
const SK_TR: usize = SK_KEY + SEEDBYTES;
const SK_S1: usize = SK_TR + TRBYTES;
const SK_S2: usize = SK_S1 + L * POLYETA_PACKEDBYTES;
const SK_T0: usize = SK_S2 + K * POLYETA_PACKEDBYTES;

// Byte offsets within the signature
const SIG_Z: usize = CTILDEBYTES;
const SIG_H: usize = SIG_Z + L * POLYZ_PACKEDBYTES;

const _: () = assert!(SEEDBYTES + K * POLYT1_PACKEDBYTES == PK_LEN);
const _: () = assert!(SK_T0 + K * POLYT0_PACKEDBYTES == SK_LEN);
const _: () = assert!(SIG_H + OMEGA + K == SIG_LEN);


/// Decoded secret key: `(rho, key, tr, s1, s2, t0)`.
pub(crate) type SecretParts = ([u8; SEEDBYTES], [u8; SEEDBYTES], [u8; TRBYTES], PolyVecL, PolyVecK, PolyVecK);


/// # Algorithm 22: `pkEncode(ρ,t1)` on page 33.
/// Encodes a public key into a byte string. Only invoked on `key_gen` output, so the
/// coefficients of `t1` are trusted to lie in `[0, 2^10)`.
///
/// **Input**:  `ρ ∈ B^32`, `t1 ∈ R^k` with coefficients in `[0, 2^10 − 1]`. <br>
/// **Output**: Public key `pk ∈ B^{32+32·k·10}`.
pub(crate) fn pack_pk(rho: &[u8; SEEDBYTES], t1: &PolyVecK) -> [u8; PK_LEN] {
    let mut pk = [0u8; PK_LEN];

    // 1: pk ← ρ
    pk[..SEEDBYTES].copy_from_slice(rho);

    // 2-4: for i from 0 to k − 1 do pk ← pk || SimpleBitPack(t1[i], 2^10 − 1)
    for (t, chunk) in t1.iter().zip(pk[SEEDBYTES..].chunks_exact_mut(POLYT1_PACKEDBYTES)) {
        pack_t1(t, chunk);
    }

    // 5: return pk
    pk
}


/// # Algorithm 23: `pkDecode(pk)` on page 33.
/// Reverses `pack_pk()`. Every 10-bit field is a valid `t1` coefficient, so decoding
/// cannot fail once the length is right.
///
/// **Input**:  Public key `pk ∈ B^{32+32·k·10}`. <br>
/// **Output**: `ρ ∈ B^32`, `t1 ∈ R^k`.
pub(crate) fn unpack_pk(pk: &[u8; PK_LEN]) -> ([u8; SEEDBYTES], PolyVecK) {
    let mut rho = [0u8; SEEDBYTES];
    rho.copy_from_slice(&pk[..SEEDBYTES]);

    let mut t1 = [POLY0; K];
    for (t, chunk) in t1.iter_mut().zip(pk[SEEDBYTES..].chunks_exact(POLYT1_PACKEDBYTES)) {
        *t = unpack_t1(chunk);
    }
    (rho, t1)
}


/// # Algorithm 24: `skEncode(ρ, K, tr, s1, s2, t0)` on page 34.
/// Encodes a secret key into a byte string.
///
/// **Input**:  `ρ ∈ B^32`, `K ∈ B^32`, `tr ∈ B^64`, `s1 ∈ R^l` and `s2 ∈ R^k` with
///             coefficients in `[−η, η]`, `t0 ∈ R^k` with coefficients in `(−2^{d−1}, 2^{d−1}]`. <br>
/// **Output**: Private key `sk ∈ B^{32+32+64+32·((k+l)·3+13·k)}`.
pub(crate) fn pack_sk(
    rho: &[u8; SEEDBYTES], key: &[u8; SEEDBYTES], tr: &[u8; TRBYTES], s1: &PolyVecL,
    s2: &PolyVecK, t0: &PolyVecK,
) -> [u8; SK_LEN] {
    let mut sk = [0u8; SK_LEN];

    // 1: sk ← ρ || K || tr
    sk[..SK_KEY].copy_from_slice(rho);
    sk[SK_KEY..SK_TR].copy_from_slice(key);
    sk[SK_TR..SK_S1].copy_from_slice(tr);

    // 2-4: for i from 0 to l − 1 do sk ← sk || BitPack(s1[i], η, η)
    for (s, chunk) in s1.iter().zip(sk[SK_S1..SK_S2].chunks_exact_mut(POLYETA_PACKEDBYTES)) {
        pack_eta(s, chunk);
    }

    // 5-7: for i from 0 to k − 1 do sk ← sk || BitPack(s2[i], η, η)
    for (s, chunk) in s2.iter().zip(sk[SK_S2..SK_T0].chunks_exact_mut(POLYETA_PACKEDBYTES)) {
        pack_eta(s, chunk);
    }

    // 8-10: for i from 0 to k − 1 do sk ← sk || BitPack(t0[i], 2^{d−1} − 1, 2^{d−1})
    for (t, chunk) in t0.iter().zip(sk[SK_T0..].chunks_exact_mut(POLYT0_PACKEDBYTES)) {
        pack_t0(t, chunk);
    }

    // 11: return sk
    sk
}


/// # Algorithm 25: `skDecode(sk)` on page 34.
/// Reverses `pack_sk()`. A 3-bit `η` field can decode to values below `−η`; any such
/// coefficient in `s1` or `s2` means the key was not produced by `pack_sk()`.
///
/// **Input**:  Private key, `sk ∈ B^{32+32+64+32·((k+l)·3+13·k)}` <br>
/// **Output**: `(ρ, K, tr, s1, s2, t0)`
///
/// # Errors
/// Returns `Error::MalformedKey` when a secret coefficient lies outside `[−η, η]`.
pub(crate) fn unpack_sk(sk: &[u8; SK_LEN]) -> Result<SecretParts> {
    let mut rho = [0u8; SEEDBYTES];
    let mut key = [0u8; SEEDBYTES];
    let mut tr = [0u8; TRBYTES];

    // 1: (ρ, K, tr, ...) ← sk
    rho.copy_from_slice(&sk[..SK_KEY]);
    key.copy_from_slice(&sk[SK_KEY..SK_TR]);
    tr.copy_from_slice(&sk[SK_TR..SK_S1]);

    // 2-4: s1[i] ← UnpackEta(y_i)
    let mut s1 = [POLY0; L];
    for (s, chunk) in s1.iter_mut().zip(sk[SK_S1..SK_S2].chunks_exact(POLYETA_PACKEDBYTES)) {
        *s = unpack_eta(chunk);
    }

    // 5-7: s2[i] ← UnpackEta(z_i)
    let mut s2 = [POLY0; K];
    for (s, chunk) in s2.iter_mut().zip(sk[SK_S2..SK_T0].chunks_exact(POLYETA_PACKEDBYTES)) {
        *s = unpack_eta(chunk);
    }

    // 8-10: t0[i] ← BitUnpack(w_i, 2^{d−1} − 1, 2^{d−1})
    let mut t0 = [POLY0; K];
    for (t, chunk) in t0.iter_mut().zip(sk[SK_T0..].chunks_exact(POLYT0_PACKEDBYTES)) {
        *t = unpack_t0(chunk);
    }

    // 11: if s1 or s2 has a coefficient outside [−η, η] then return ⊥   (beyond FIPS 204)
    let in_range =
        s1.iter().chain(s2.iter()).all(|p| p.0.iter().all(|&c| (-ETA..=ETA).contains(&c)));
    ensure!(in_range, Error::MalformedKey);

    // 12: return (ρ, K, tr, s1, s2, t0)
    Ok((rho, key, tr, s1, s2, t0))
}


/// # Algorithm 26: `sigEncode(c˜, z, h)` on page 35.
/// Encodes a signature into a byte string.
///
/// **Input**:  `c˜ ∈ B^64`, `z ∈ R^l` with coefficients in `[−γ1 + 1, γ1]`,
///             `h ∈ R^k_2` with at most `ω` ones. <br>
/// **Output**: Signature `σ ∈ B^{64+l·32·20+ω+k}`
pub(crate) fn pack_sig(ctilde: &[u8; CTILDEBYTES], z: &PolyVecL, h: &PolyVecK) -> [u8; SIG_LEN] {
    let mut sig = [0u8; SIG_LEN];

    // 1: σ ← c˜
    sig[..SIG_Z].copy_from_slice(ctilde);

    // 2-4: for i from 0 to l − 1 do σ ← σ || BitPack(z[i], γ1 − 1, γ1)
    for (p, chunk) in z.iter().zip(sig[SIG_Z..SIG_H].chunks_exact_mut(POLYZ_PACKEDBYTES)) {
        pack_z(p, chunk);
    }

    // 5: σ ← σ || HintBitPack(h)
    hint_pack(h, &mut sig[SIG_H..]);

    // 6: return σ
    sig
}


/// # Algorithm 27: `sigDecode(σ)` on page 35.
/// Reverses `pack_sig()`. Works on untrusted input; the hint section is fully validated.
///
/// **Input**:  Signature `σ ∈ B^{64+l·32·20+ω+k}` <br>
/// **Output**: `(c˜, z, h)`, or `None` when the hint encoding is malformed.
pub(crate) fn unpack_sig(sig: &[u8; SIG_LEN]) -> Option<([u8; CTILDEBYTES], PolyVecL, PolyVecK)> {
    // 1: (c˜, x, y) ∈ B^64 × B^{l·32·20} × B^{ω+k} ← σ
    let mut ctilde = [0u8; CTILDEBYTES];
    ctilde.copy_from_slice(&sig[..SIG_Z]);

    // 2-4: for i from 0 to l − 1 do z[i] ← BitUnpack(x_i, γ1 − 1, γ1)
    let mut z = [POLY0; L];
    for (p, chunk) in z.iter_mut().zip(sig[SIG_Z..SIG_H].chunks_exact(POLYZ_PACKEDBYTES)) {
        *p = unpack_z(chunk);
    }

    // 5: h ← HintBitUnpack(y)
    let h = hint_unpack(&sig[SIG_H..])?;

    // 6: return (c˜, z, h)
    Some((ctilde, z, h))
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GAMMA1, N};
    use rand::{Rng, RngCore};

    fn random_vec<const M: usize>(lo: i32, hi: i32) -> [crate::types::Poly; M] {
        let mut rng = rand::thread_rng();
        core::array::from_fn(|_| crate::types::Poly(core::array::from_fn(|_| rng.gen_range(lo..=hi))))
    }

    #[test]
    fn test_sk_layout_and_decode() {
        let mut rng = rand::thread_rng();
        let (mut rho, mut key, mut tr) = ([0u8; 32], [0u8; 32], [0u8; 64]);
        rng.fill_bytes(&mut rho);
        rng.fill_bytes(&mut key);
        rng.fill_bytes(&mut tr);
        let s1 = random_vec::<L>(-ETA, ETA);
        let s2 = random_vec::<K>(-ETA, ETA);
        let t0 = random_vec::<K>(-(1 << 12) + 1, 1 << 12);

        let sk = pack_sk(&rho, &key, &tr, &s1, &s2, &t0);
        assert_eq!(sk[..32], rho);
        assert_eq!(sk[32..64], key);
        assert_eq!(sk[64..128], tr);

        let (rho2, key2, tr2, s1b, s2b, t0b) = unpack_sk(&sk).unwrap();
        assert_eq!((rho2, key2, tr2), (rho, key, tr));
        assert_eq!((s1b, s2b, t0b), (s1, s2, t0));
    }

    #[test]
    fn test_sk_with_out_of_range_eta_is_malformed() {
        let zero = [POLY0; K];
        let mut sk = pack_sk(&[0; 32], &[0; 32], &[0; 64], &[POLY0; L], &zero, &zero);
        assert!(unpack_sk(&sk).is_ok());
        // a 3-bit field above 2·ETA decodes below -ETA
        sk[SK_S2 + 5] |= 0x07;
        assert!(matches!(unpack_sk(&sk), Err(Error::MalformedKey)));
    }

    #[test]
    fn test_pk_layout() {
        let mut t1 = [POLY0; K];
        t1[0].0[0] = 0x3FF;
        t1[K - 1].0[N - 1] = 0x201;
        let pk = pack_pk(&[0xAB; 32], &t1);
        assert_eq!(pk[..32], [0xAB; 32]);
        assert_eq!(pk[32], 0xFF);
        assert_eq!(pk[33] & 0x03, 0x03);
        let (rho, t1b) = unpack_pk(&pk);
        assert_eq!(rho, [0xAB; 32]);
        assert_eq!(t1b, t1);
    }

    #[test]
    fn test_sig_decode_rejects_bad_hints() {
        let z = random_vec::<L>(-GAMMA1 + 1, GAMMA1);
        let mut h = [POLY0; K];
        h[2].0[10] = 1;
        h[2].0[200] = 1;
        let sig = pack_sig(&[7u8; 64], &z, &h);
        let (c, z2, h2) = unpack_sig(&sig).unwrap();
        assert_eq!((c, z2, h2), ([7u8; 64], z, h));

        // garbage after the final count
        let mut bad = sig;
        bad[SIG_H + 2] = 1;
        assert!(unpack_sig(&bad).is_none());

        // count above OMEGA
        let mut bad = sig;
        bad[SIG_LEN - 1] = u8::try_from(OMEGA + 1).unwrap();
        assert!(unpack_sig(&bad).is_none());

        // positions out of order
        let mut bad = sig;
        bad.swap(SIG_H, SIG_H + 1);
        assert!(unpack_sig(&bad).is_none());
    }
}
