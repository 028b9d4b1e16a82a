// This file implements the XOF-driven rejection samplers of FIPS 204 section 7.3 using the
// block-oriented buffering of the reference implementation.

use crate::conversion::unpack_z;
use crate::keccak::{shake128_stream_init, shake256, shake256_stream_init};
use crate::keccak::{SHAKE128_RATE, SHAKE256_RATE};
use crate::types::{Matrix, Poly, PolyVecK, PolyVecL, POLY0};
use crate::{CRHBYTES, CTILDEBYTES, K, L, N, POLYZ_PACKEDBYTES, Q, SEEDBYTES, TAU};
use zeroize::Zeroize;


const POLY_UNIFORM_NBLOCKS: usize = (768 + SHAKE128_RATE - 1) / SHAKE128_RATE;
const POLY_UNIFORM_ETA_NBLOCKS: usize = (136 + SHAKE256_RATE - 1) / SHAKE256_RATE;
const POLY_UNIFORM_GAMMA1_NBLOCKS: usize = (POLYZ_PACKEDBYTES + SHAKE256_RATE - 1) / SHAKE256_RATE;


/// Fills `a` from 3-byte little-endian chunks of `buf`, masked to 23 bits and rejected when
/// not below `Q`. Returns the number of coefficients written.
#[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
fn rej_uniform(a: &mut [i32], buf: &[u8]) -> usize {
    let mut ctr = 0;
    for chunk in buf.chunks_exact(3) {
        if ctr == a.len() {
            break;
        }
        let t = (u32::from(chunk[0]) | (u32::from(chunk[1]) << 8) | (u32::from(chunk[2]) << 16))
            & 0x7F_FFFF;
        if t < Q as u32 {
            a[ctr] = t as i32;
            ctr += 1;
        }
    }
    ctr
}


/// Fills `a` with coefficients in `[-2, 2]` from the nibbles of `buf` (low nibble first),
/// rejecting nibbles of 15 and reducing the rest mod 5 without division.
#[allow(clippy::cast_possible_wrap)]
fn rej_eta(a: &mut [i32], buf: &[u8]) -> usize {
    let mut ctr = 0;
    for &byte in buf {
        if ctr == a.len() {
            break;
        }
        for t in [u32::from(byte & 0x0F), u32::from(byte >> 4)] {
            if (t < 15) && (ctr < a.len()) {
                let t = t - ((205 * t) >> 10) * 5;
                a[ctr] = 2 - t as i32;
                ctr += 1;
            }
        }
    }
    ctr
}


/// # Algorithm 30: `RejNTTPoly(ρ)` on page 37.
/// Samples a polynomial uniformly from `T_q` using SHAKE128 over `seed || nonce`. Whenever
/// the buffered blocks run dry, the unconsumed tail is carried over and one more block
/// is squeezed.
pub(crate) fn poly_uniform(seed: &[u8; SEEDBYTES], nonce: u16) -> Poly {
    let mut buf = [0u8; POLY_UNIFORM_NBLOCKS * SHAKE128_RATE + 2];
    let mut buflen = POLY_UNIFORM_NBLOCKS * SHAKE128_RATE;
    let mut state = shake128_stream_init(seed, nonce);
    state.squeeze_blocks(&mut buf[..buflen]);

    let mut a = POLY0;
    let mut ctr = rej_uniform(&mut a.0, &buf[..buflen]);

    while ctr < N {
        let off = buflen % 3;
        buf.copy_within(buflen - off..buflen, 0);
        state.squeeze_blocks(&mut buf[off..off + SHAKE128_RATE]);
        buflen = SHAKE128_RATE + off;
        ctr += rej_uniform(&mut a.0[ctr..], &buf[..buflen]);
    }
    a
}


/// # Algorithm 31: `RejBoundedPoly(ρ)` on page 37.
/// Samples a polynomial with coefficients in `[-ETA, ETA]` using SHAKE256 over `seed || nonce`.
pub(crate) fn poly_uniform_eta(seed: &[u8; CRHBYTES], nonce: u16) -> Poly {
    let mut buf = [0u8; POLY_UNIFORM_ETA_NBLOCKS * SHAKE256_RATE];
    let mut state = shake256_stream_init(seed, nonce);
    state.squeeze_blocks(&mut buf);

    let mut a = POLY0;
    let mut ctr = rej_eta(&mut a.0, &buf);

    while ctr < N {
        state.squeeze_blocks(&mut buf[..SHAKE256_RATE]);
        ctr += rej_eta(&mut a.0[ctr..], &buf[..SHAKE256_RATE]);
    }

    buf.zeroize();
    state.zeroize();
    a
}


/// Samples a masking polynomial with coefficients in `(-GAMMA1, GAMMA1]`: the raw XOF output
/// is read directly as a packed `z`, so no rejection is involved.
pub(crate) fn poly_uniform_gamma1(seed: &[u8; CRHBYTES], nonce: u16) -> Poly {
    let mut buf = [0u8; POLY_UNIFORM_GAMMA1_NBLOCKS * SHAKE256_RATE];
    let mut state = shake256_stream_init(seed, nonce);
    state.squeeze_blocks(&mut buf);
    let a = unpack_z(&buf[..POLYZ_PACKEDBYTES]);

    buf.zeroize();
    state.zeroize();
    a
}


/// # Algorithm 29: `SampleInBall(ρ)` on page 36.
/// Derives the challenge polynomial from the commitment hash: exactly `TAU` coefficients
/// are `±1`, the rest zero. Operates on the public `ctilde`, so need not be constant-time.
///
/// **Input**: `ctilde`, the 64-byte commitment hash <br>
/// **Output**: A polynomial `c` in `R_q`.
pub(crate) fn poly_challenge(ctilde: &[u8; CTILDEBYTES]) -> Poly {
    let mut buf = [0u8; SHAKE256_RATE];

    // 2: ctx ← H.Init()
    // 3: ctx ← H.Absorb(ctx, 𝜌)
    let mut state = shake256(&[ctilde]);
    state.squeeze_blocks(&mut buf);

    // 4: (ctx, 𝑠) ← H.Squeeze(ctx, 8)
    let mut sign_bytes = [0u8; 8];
    sign_bytes.copy_from_slice(&buf[..8]);
    let mut signs = u64::from_le_bytes(sign_bytes);
    let mut pos = 8;

    // 1: c ← 0
    let mut c = POLY0;

    // 6: for 𝑖 from 256 − 𝜏 to 255 do
    for i in (N - TAU)..N {
        //
        // 7-10: squeeze bytes 𝑗 until 𝑗 ≤ 𝑖
        let j = loop {
            if pos >= SHAKE256_RATE {
                state.squeeze_blocks(&mut buf);
                pos = 0;
            }
            let b = usize::from(buf[pos]);
            pos += 1;
            if b <= i {
                break b;
            }
        };

        // 11: c_i ← c_j
        c.0[i] = c.0[j];

        // 12: c_j ← (−1)^{h[i+τ−256]}
        c.0[j] = 1 - 2 * i32::from(signs & 1 == 1);
        signs >>= 1;
    }

    debug_assert_eq!(
        c.0.iter().filter(|&&e| e != 0).count(),
        TAU,
        "SampleInBall: bad hamming weight"
    );

    // 14: return c
    c
}


/// # Algorithm 32: `ExpandA(ρ)` on page 38.
/// Expands the public seed into the matrix `A_hat`, entry `(i, j)` sampled with nonce `256·i + j`.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn expand_a(rho: &[u8; SEEDBYTES]) -> Matrix {
    core::array::from_fn(|i| core::array::from_fn(|j| poly_uniform(rho, ((i << 8) + j) as u16)))
}


/// # Algorithm 33: `ExpandS(ρ)` on page 38.
/// Samples the short secret vectors `s1` (nonces `0..L`) and `s2` (nonces `L..L+K`).
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn expand_s(rho_prime: &[u8; CRHBYTES]) -> (PolyVecL, PolyVecK) {
    let s1 = core::array::from_fn(|i| poly_uniform_eta(rho_prime, i as u16));
    let s2 = core::array::from_fn(|i| poly_uniform_eta(rho_prime, (L + i) as u16));
    (s1, s2)
}


/// # Algorithm 34: `ExpandMask(ρ,µ)` on page 38.
/// Samples the masking vector `y` for signing attempt `nonce`; polynomial `i` uses the
/// 16-bit nonce `L·nonce + i`.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn expand_mask(rho_prime: &[u8; CRHBYTES], nonce: u16) -> PolyVecL {
    core::array::from_fn(|i| {
        let kappa = (L * usize::from(nonce) + i) as u16;
        poly_uniform_gamma1(rho_prime, kappa)
    })
}
