// This file implements the per-polynomial bit packing of FIPS 204 section 7.1 (BitPack,
// BitUnpack, HintBitPack, HintBitUnpack) specialized to the fixed ML-DSA-87 field widths.

use crate::types::{Poly, PolyVecK, POLY0};
use crate::{D, ETA, GAMMA1, K, N, OMEGA, POLYETA_PACKEDBYTES, POLYT0_PACKEDBYTES};
use crate::{POLYT1_PACKEDBYTES, POLYW1_PACKEDBYTES, POLYZ_PACKEDBYTES};


/// # Algorithm 16/17: `SimpleBitPack(w,b)` / `BitPack(w,a,b)` on page 30.
/// Packs 256 values of `bitlen` bits each, least-significant bit first, with no padding.
/// Callers map signed coefficients into `[0, 2^bitlen)` beforehand.
fn bit_pack(w: &[u32; N], bitlen: u32, bytes_out: &mut [u8]) {
    debug_assert_eq!(N * bitlen as usize, bytes_out.len() * 8, "BitPack: bad output size");
    debug_assert!(w.iter().all(|&e| e < (1 << bitlen)), "BitPack: w out of range");

    let mut temp = 0u32; // new values enter on the left/MSB, output bytes leave on the right/LSB
    let mut byte_index = 0;
    let mut bit_index = 0;

    for &coeff in w {
        temp |= coeff << bit_index;
        bit_index += bitlen;
        // while we have at least a byte's worth of bits in temp
        while bit_index > 7 {
            bytes_out[byte_index] = temp.to_le_bytes()[0];
            temp >>= 8;
            byte_index += 1;
            bit_index -= 8;
        }
    }
}


/// # Algorithm 18/19: `SimpleBitUnpack(v,b)` / `BitUnpack(v,a,b)` on page 31.
/// Reverses `bit_pack()`; every output value lies in `[0, 2^bitlen)`.
fn bit_unpack(v: &[u8], bitlen: u32) -> [u32; N] {
    debug_assert_eq!(N * bitlen as usize, v.len() * 8, "BitUnpack: bad input size");

    let mut w_out = [0u32; N];
    let mut temp = 0u32;
    let mut r_index = 0;
    let mut bit_index = 0;

    for byte in v {
        temp |= u32::from(*byte) << bit_index;
        bit_index += 8;
        while bit_index >= bitlen {
            w_out[r_index] = temp & ((1 << bitlen) - 1);
            bit_index -= bitlen;
            temp >>= bitlen;
            r_index += 1;
        }
    }
    w_out
}


/// Packs a polynomial with coefficients in `[-ETA, ETA]` at 3 bits each, storing `ETA - c`.
#[allow(clippy::cast_sign_loss)]
pub(crate) fn pack_eta(p: &Poly, bytes_out: &mut [u8]) {
    debug_assert_eq!(bytes_out.len(), POLYETA_PACKEDBYTES);
    bit_pack(&core::array::from_fn(|n| (ETA - p.0[n]) as u32), 3, bytes_out);
}


/// Unpacks an ETA polynomial. Output coefficients lie in `[ETA - 7, ETA]`; the caller is
/// responsible for rejecting anything below `-ETA` from untrusted input.
#[allow(clippy::cast_possible_wrap)]
pub(crate) fn unpack_eta(v: &[u8]) -> Poly {
    let t = bit_unpack(v, 3);
    Poly(core::array::from_fn(|n| ETA - t[n] as i32))
}


/// Packs `t1` with coefficients in `[0, 2^10)`.
#[allow(clippy::cast_sign_loss)]
pub(crate) fn pack_t1(p: &Poly, bytes_out: &mut [u8]) {
    debug_assert_eq!(bytes_out.len(), POLYT1_PACKEDBYTES);
    bit_pack(&core::array::from_fn(|n| p.0[n] as u32), 10, bytes_out);
}


#[allow(clippy::cast_possible_wrap)]
pub(crate) fn unpack_t1(v: &[u8]) -> Poly {
    let t = bit_unpack(v, 10);
    Poly(core::array::from_fn(|n| t[n] as i32))
}


/// Packs `t0` with coefficients in `(-2^{D-1}, 2^{D-1}]` at 13 bits each, storing `2^{D-1} - c`.
#[allow(clippy::cast_sign_loss)]
pub(crate) fn pack_t0(p: &Poly, bytes_out: &mut [u8]) {
    debug_assert_eq!(bytes_out.len(), POLYT0_PACKEDBYTES);
    bit_pack(&core::array::from_fn(|n| ((1 << (D - 1)) - p.0[n]) as u32), D, bytes_out);
}


#[allow(clippy::cast_possible_wrap)]
pub(crate) fn unpack_t0(v: &[u8]) -> Poly {
    let t = bit_unpack(v, D);
    Poly(core::array::from_fn(|n| (1 << (D - 1)) - t[n] as i32))
}


/// Packs `z` with coefficients in `(-GAMMA1, GAMMA1]` at 20 bits each, storing `GAMMA1 - c`.
#[allow(clippy::cast_sign_loss)]
pub(crate) fn pack_z(p: &Poly, bytes_out: &mut [u8]) {
    debug_assert_eq!(bytes_out.len(), POLYZ_PACKEDBYTES);
    bit_pack(&core::array::from_fn(|n| (GAMMA1 - p.0[n]) as u32), 20, bytes_out);
}


/// Unpacks `z`; every 20-bit pattern is valid, giving coefficients in `(-GAMMA1, GAMMA1]`.
/// Also drives the masking-vector sampler, which decodes raw XOF output through this path.
#[allow(clippy::cast_possible_wrap)]
pub(crate) fn unpack_z(v: &[u8]) -> Poly {
    let t = bit_unpack(v, 20);
    Poly(core::array::from_fn(|n| GAMMA1 - t[n] as i32))
}


/// Packs a high-bits polynomial `w1` with coefficients in `[0, 15]`, two per byte.
#[allow(clippy::cast_sign_loss)]
pub(crate) fn pack_w1(p: &Poly, bytes_out: &mut [u8]) {
    debug_assert_eq!(bytes_out.len(), POLYW1_PACKEDBYTES);
    bit_pack(&core::array::from_fn(|n| p.0[n] as u32), 4, bytes_out);
}


/// # Algorithm 20: `HintBitPack(h)` on page 32.
/// Encodes the 0/1 hint vector `h` (at most `OMEGA` ones in total) into `OMEGA + K` bytes:
/// the positions of the ones, followed by the running count after each polynomial.
pub(crate) fn hint_pack(h: &PolyVecK, y_bytes: &mut [u8]) {
    debug_assert_eq!(y_bytes.len(), OMEGA + K, "HintBitPack: bad output size");
    debug_assert!(
        h.iter().map(|p| p.0.iter().filter(|&&e| e != 0).count()).sum::<usize>() <= OMEGA,
        "HintBitPack: too many 1's in h"
    );

    // 1: y ∈ B^{ω+k} ← 0^{ω+k}
    y_bytes.iter_mut().for_each(|e| *e = 0);

    // 2: Index ← 0
    let mut index = 0;

    // 3: for i from 0 to k − 1 do
    for (i, poly) in h.iter().enumerate() {
        //
        // 4: for j from 0 to 255 do
        for (j, &coeff) in poly.0.iter().enumerate() {
            //
            // 5: if h[i]_j != 0 then
            if coeff != 0 {
                // 6: y[Index] ← j      ▷ Store the locations of the nonzero coefficients in h[i]
                y_bytes[index] = j.to_le_bytes()[0];

                // 7: Index ← Index + 1
                index += 1;
            }
        }

        // 10: y[ω + i] ← Index ▷ Store the value of Index after processing h[i]
        y_bytes[OMEGA + i] = index.to_le_bytes()[0];
    }
}


/// # Algorithm 21: `HintBitUnpack(y)` on page 32.
/// Reverses `hint_pack()`. Returns `None` for any encoding that `hint_pack()` could not
/// have produced: non-monotonic or oversized counts, positions not strictly increasing
/// within a polynomial, or non-zero padding.
pub(crate) fn hint_unpack(y_bytes: &[u8]) -> Option<PolyVecK> {
    debug_assert_eq!(y_bytes.len(), OMEGA + K, "HintBitUnpack: bad input size");

    // 1: h ∈ R^k_2 ∈ ← 0^k
    let mut h: PolyVecK = [POLY0; K];

    // 2: Index ← 0
    let mut index = 0usize;

    // 3: for i from 0 to k − 1 do
    for (i, poly) in h.iter_mut().enumerate() {
        let count = usize::from(y_bytes[OMEGA + i]);

        // 4: if y[ω + i] < Index or y[ω + i] > ω then return ⊥
        if (count < index) | (count > OMEGA) {
            return None;
        }

        // 5: First ← Index
        let first = index;

        // 6: while Index < y[ω + i] do
        while index < count {
            //
            // 7: if Index > First then
            // 8:   if y[Index − 1] ≥ y[Index] then return ⊥
            if (index > first) && (y_bytes[index - 1] >= y_bytes[index]) {
                return None;
            }

            // 11: h[i]_{y[Index]} ← 1
            poly.0[usize::from(y_bytes[index])] = 1;

            // 12: Index ← Index + 1
            index += 1;
        }
    }

    // 15: for i from Index to ω − 1 do
    // 16:   if y[i] != 0 then return ⊥
    if y_bytes[index..OMEGA].iter().any(|&e| e != 0) {
        return None;
    }

    // 19: return h
    Some(h)
}
