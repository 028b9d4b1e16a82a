// This file implements the vector layer: element-wise lifts of the ring, rounding and packing
// routines over `[Poly; M]` (M = K or L), plus the matrix-vector product of FIPS 204
// Algorithm 48 `MatrixVectorNTT` computed with Montgomery multiplication.

use crate::conversion::pack_w1 as pack_w1_poly;
use crate::high_low;
use crate::ntt;
use crate::types::{Matrix, Poly, PolyVecK, PolyVecL, POLY0};
use crate::{K, POLYW1_PACKEDBYTES};


pub(crate) fn ntt<const M: usize>(v: &mut [Poly; M]) { v.iter_mut().for_each(ntt::ntt); }


pub(crate) fn invntt_tomont<const M: usize>(v: &mut [Poly; M]) {
    v.iter_mut().for_each(ntt::invntt_tomont);
}


pub(crate) fn reduce<const M: usize>(v: &mut [Poly; M]) { v.iter_mut().for_each(Poly::reduce); }


pub(crate) fn caddq<const M: usize>(v: &mut [Poly; M]) { v.iter_mut().for_each(Poly::caddq); }


pub(crate) fn add_assign<const M: usize>(v: &mut [Poly; M], rhs: &[Poly; M]) {
    v.iter_mut().zip(rhs.iter()).for_each(|(a, b)| a.add_assign(b));
}


pub(crate) fn sub_assign<const M: usize>(v: &mut [Poly; M], rhs: &[Poly; M]) {
    v.iter_mut().zip(rhs.iter()).for_each(|(a, b)| a.sub_assign(b));
}


pub(crate) fn shiftl<const M: usize>(v: &mut [Poly; M]) { v.iter_mut().for_each(Poly::shiftl); }


/// Multiplies every entry of `v` by the single NTT-domain polynomial `c`.
pub(crate) fn pointwise_poly_montgomery<const M: usize>(c: &Poly, v: &[Poly; M]) -> [Poly; M] {
    core::array::from_fn(|i| Poly::pointwise_montgomery(c, &v[i]))
}


/// # Algorithm 48: `MatrixVectorNTT(M, v)` on page 46.
/// Computes `A_hat ∘ v_hat` with every operand in the NTT domain. Each row is accumulated
/// as a sum of `L` Montgomery products without intermediate reduction.
///
/// **Input**: `A_hat ∈ T_q^{k×l}`, `v_hat ∈ T_q^l` <br>
/// **Output**: `w_hat ∈ T_q^k`
pub(crate) fn matrix_pointwise_montgomery(mat: &Matrix, v: &PolyVecL) -> PolyVecK {
    core::array::from_fn(|i| {
        let mut acc = POLY0;
        for (a_ij, v_j) in mat[i].iter().zip(v.iter()) {
            acc.add_assign(&Poly::pointwise_montgomery(a_ij, v_j));
        }
        acc
    })
}


/// Returns `true` (reject) if any polynomial in `v` has a coefficient of magnitude at
/// least `bound`.
pub(crate) fn chk_norm<const M: usize>(v: &[Poly; M], bound: i32) -> bool {
    // all polynomials are inspected; the result leaks only accept/reject
    v.iter().fold(false, |acc, p| acc | high_low::chk_norm(p, bound))
}


/// Splits every (non-negative, reduced) coefficient of `t` into `(t1, t0)`.
pub(crate) fn power2round(t: &PolyVecK) -> (PolyVecK, PolyVecK) {
    let mut t1 = [POLY0; K];
    let mut t0 = [POLY0; K];
    for ((t, t1), t0) in t.iter().zip(t1.iter_mut()).zip(t0.iter_mut()) {
        for ((&a, a1), a0) in t.0.iter().zip(t1.0.iter_mut()).zip(t0.0.iter_mut()) {
            (*a1, *a0) = high_low::power2round(a);
        }
    }
    (t1, t0)
}


/// Splits every (non-negative, reduced) coefficient of `w` into high bits `w1` and low
/// bits `w0`.
pub(crate) fn decompose(w: &PolyVecK) -> (PolyVecK, PolyVecK) {
    let mut w1 = [POLY0; K];
    let mut w0 = [POLY0; K];
    for ((w, w1), w0) in w.iter().zip(w1.iter_mut()).zip(w0.iter_mut()) {
        for ((&a, a1), a0) in w.0.iter().zip(w1.0.iter_mut()).zip(w0.0.iter_mut()) {
            (*a1, *a0) = high_low::decompose(a);
        }
    }
    (w1, w0)
}


/// Computes the hint vector for low parts `v0` and high parts `v1`, returning it together
/// with the number of set hint bits.
#[allow(clippy::cast_sign_loss)]
pub(crate) fn make_hint(v0: &PolyVecK, v1: &PolyVecK) -> (PolyVecK, usize) {
    let mut h = [POLY0; K];
    let mut count = 0usize;
    for ((h, v0), v1) in h.iter_mut().zip(v0.iter()).zip(v1.iter()) {
        for ((hint, &a0), &a1) in h.0.iter_mut().zip(v0.0.iter()).zip(v1.0.iter()) {
            *hint = high_low::make_hint(a0, a1);
            count += *hint as usize;
        }
    }
    (h, count)
}


/// Corrects the high bits of `w` in place according to the hint vector `h`.
pub(crate) fn use_hint(w: &mut PolyVecK, h: &PolyVecK) {
    for (w, h) in w.iter_mut().zip(h.iter()) {
        for (a, &hint) in w.0.iter_mut().zip(h.0.iter()) {
            *a = high_low::use_hint(*a, hint);
        }
    }
}


/// # Algorithm 28: `w1Encode(w1)` on page 35.
/// Packs the K high-bits polynomials into `K * POLYW1_PACKEDBYTES` bytes.
pub(crate) fn pack_w1(w1: &PolyVecK, bytes_out: &mut [u8; K * POLYW1_PACKEDBYTES]) {
    for (p, chunk) in w1.iter().zip(bytes_out.chunks_exact_mut(POLYW1_PACKEDBYTES)) {
        pack_w1_poly(p, chunk);
    }
}
