// This file implements the forward NTT and the inverse NTT (with folded Montgomery factor)
// of FIPS 204 section 7.5, operating in place on Montgomery-domain zetas.

use crate::helpers::{montgomery_reduce, ZETAS};
use crate::types::Poly;
use crate::N;


/// # Algorithm 41 NTT(w) on page 43.
/// Computes the Number-Theoretic Transform in place. Coefficients are not reduced; with
/// input bounded by `Q` in absolute value the output is bounded by `9Q`, in bit-reversed order.
///
/// **Input**: polynomial `w(X) = ∑_{j=0}^{255} w_j X^j ∈ R_q` <br>
/// **Output**: `w_hat = (w_hat[0], ... , w_hat[255]) ∈ T_q`
pub(crate) fn ntt(w: &mut Poly) {
    //
    // 4: m ← 0
    let mut m = 0;

    // 5: len ← 128
    let mut len = 128;

    // 6: while len ≥ 1 do
    while len >= 1 {
        //
        // 7: start ← 0
        let mut start = 0;

        // 8: while start < 256 do
        while start < N {
            //
            // 9: m ← m + 1
            m += 1;

            // 10: z ← zetas[m]   (Montgomery form)
            let zeta = i64::from(ZETAS[m]);

            // 11: for j from start to start + len − 1 do
            for j in start..(start + len) {
                //
                // 12: t ← z · w_hat[j + len]
                let t = montgomery_reduce(zeta * i64::from(w.0[j + len]));

                // 13: w_hat[j + len] ← w_hat[j] − t
                w.0[j + len] = w.0[j] - t;

                // 14: w_hat[j] ← w_hat[j] + t
                w.0[j] += t;
            }

            // 16: start ← start + 2 · len
            start += 2 * len;
        }

        // 18: len ← ⌊len/2⌋
        len >>= 1;
    }
}


/// # Algorithm 42 NTT−1(`w_hat`) on page 44.
/// Computes the inverse Number-Theoretic Transform in place and multiplies by the Montgomery
/// factor `2^32` along the way. Input coefficients must be bounded by `Q` in absolute value;
/// outputs are again bounded by `Q`.
///
/// **Input**: `w_hat = (w_hat[0], ... , w_hat[255]) ∈ T_q` <br>
/// **Output**: polynomial `w(X) · 2^32 ∈ R_q`
pub(crate) fn invntt_tomont(w: &mut Poly) {
    // mont^2 / 256 so that the final multiply also undoes the 2^{-32} of each layer product
    const F: i64 = 41_978;

    // 4: m ← 256
    let mut m = N;

    // 5: len ← 1
    let mut len = 1;

    // 6: while len < 256 do
    while len < N {
        //
        // 7: start ← 0
        let mut start = 0;

        // 8: while start < 256 do
        while start < N {
            //
            // 9: m ← m − 1
            m -= 1;

            // 10: z ← −zetas[m]
            let zeta = -i64::from(ZETAS[m]);

            // 11: for j from start to start + len − 1 do
            for j in start..(start + len) {
                //
                // 12: t ← w_j
                let t = w.0[j];

                // 13: w_j ← t + w_{j+len}
                w.0[j] = t + w.0[j + len];

                // 14: w_{j+len} ← t − w_{j+len}
                w.0[j + len] = t - w.0[j + len];

                // 15: w_{j+len} ← z · w_{j+len}
                w.0[j + len] = montgomery_reduce(zeta * i64::from(w.0[j + len]));
            }

            // 17: start ← start + 2 · len
            start += 2 * len;
        }

        // 19: len ← 2 · len
        len <<= 1;
    }

    // 21-23: w_j ← f · w_j
    for a in &mut w.0 {
        *a = montgomery_reduce(F * i64::from(*a));
    }
}
