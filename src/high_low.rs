use crate::types::Poly;
use crate::{D, GAMMA2, Q};


// This file implements functionality from FIPS 204 section 7.4 High Order / Low Order Bits and
// Hints, in the branch-free arithmetic form specialized to GAMMA2 = (Q-1)/32.


/// # Algorithm 35: `Power2Round(r)` on page 40.
/// Decomposes `r` into `(r1, r0)` such that `r = r1·2^D + r0` with
/// `-2^{D-1} < r0 <= 2^{D-1}`.
///
/// **Input**: `r ∈ [0, Q)`. <br>
/// **Output**: Integers `(r1, r0)`.
pub(crate) const fn power2round(r: i32) -> (i32, i32) {
    let r1 = (r + (1 << (D - 1)) - 1) >> D;
    let r0 = r - (r1 << D);
    (r1, r0)
}


/// # Algorithm 36: `Decompose(r)` on page 40.
/// Decomposes `r` into `(r1, r0)` such that `r ≡ r1·(2·GAMMA2) + r0 mod Q` with
/// `-GAMMA2 < r0 <= GAMMA2`, except that the top bucket `r - r0 = Q - 1` is folded into
/// `r1 = 0` with `r0` reduced by one.
///
/// **Input**: `r ∈ [0, Q)` <br>
/// **Output**: Integers `(r1, r0)` with `r1 ∈ [0, 15]`.
pub(crate) const fn decompose(r: i32) -> (i32, i32) {
    // ceil(r / 128), then a multiply-shift approximation of division by 2·GAMMA2 / 128
    let mut r1 = (r + 127) >> 7;
    r1 = (r1 * 1025 + (1 << 21)) >> 22;
    r1 &= 15;

    let mut r0 = r - r1 * 2 * GAMMA2;
    r0 -= (((Q - 1) / 2 - r0) >> 31) & Q;
    (r1, r0)
}


/// # Algorithm 39: `MakeHint(z, r)` on page 41.
/// Computes the hint bit for a coefficient given its low part `r0` and high part `r1`:
/// set when the low part has left `(-GAMMA2, GAMMA2]`, i.e. when adding the perturbation
/// carried the high bits.
pub(crate) const fn make_hint(r0: i32, r1: i32) -> i32 {
    if (r0 > GAMMA2) | (r0 < -GAMMA2) | ((r0 == -GAMMA2) & (r1 != 0)) {
        1
    } else {
        0
    }
}


/// # Algorithm 40: `UseHint(h, r)` on page 41.
/// Returns the high bits of `r` adjusted according to hint `h`, wrapping modulo 16.
///
/// **Input**: `r ∈ [0, Q)`, hint `h ∈ {0, 1}` <br>
/// **Output**: `r1 ∈ [0, 15]`
pub(crate) const fn use_hint(r: i32, hint: i32) -> i32 {
    let (r1, r0) = decompose(r);
    if hint == 0 {
        return r1;
    }
    if r0 > 0 {
        (r1 + 1) & 15
    } else {
        (r1 - 1) & 15
    }
}


/// Infinity-norm check. Returns `true` (reject) when any coefficient of `p`, read as a
/// centered representative, has absolute value at least `bound`, or when `bound` itself is
/// larger than `(Q-1)/8`. The absolute value is computed without branching on the secret
/// coefficient; only the accept/reject outcome leaks.
pub(crate) fn chk_norm(p: &Poly, bound: i32) -> bool {
    if bound > (Q - 1) / 8 {
        return true;
    }
    p.0.iter().any(|&a| {
        let t = a >> 31;
        let t = a - (t & (2 * a));
        t >= bound
    })
}
