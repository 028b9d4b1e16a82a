use crate::{Q, ZETA};


/// If the condition is not met, return the given error. Borrowed from the `anyhow` crate.
macro_rules! ensure {
    ($cond:expr, $err:expr $(,)?) => {
        if !$cond {
            return Err($err);
        }
    };
}

pub(crate) use ensure; // make available throughout crate


/// `q^{-1} mod 2^32`
const QINV: i32 = 58_728_449;


/// Montgomery reduction. For `-2^31 * Q <= a <= 2^31 * Q` returns `r ≡ a * 2^{-32} mod Q`
/// with `-Q < r < Q`.
#[inline(always)]
#[allow(clippy::inline_always, clippy::cast_possible_truncation, clippy::cast_lossless)]
pub(crate) const fn montgomery_reduce(a: i64) -> i32 {
    let t = (a as i32).wrapping_mul(QINV);
    ((a - (t as i64) * (Q as i64)) >> 32) as i32
}


/// For `a <= 2^31 - 2^22 - 1` returns `r ≡ a mod Q` with `-6283008 <= r <= 6283008`.
#[inline(always)]
#[allow(clippy::inline_always)]
pub(crate) const fn reduce32(a: i32) -> i32 {
    let t = (a + (1 << 22)) >> 23; // approximate quotient, no division
    a - t * Q
}


/// Adds `Q` if the input is negative.
#[inline(always)]
#[allow(clippy::inline_always)]
pub(crate) const fn caddq(a: i32) -> i32 { a + ((a >> 31) & Q) }


/// Constant-time equality of two byte strings of equal length.
pub(crate) fn ct_eq(a: &[u8], b: &[u8]) -> bool {
    debug_assert_eq!(a.len(), b.len(), "ct_eq: length mismatch");
    let diff = a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y));
    diff == 0
}


/// HAC Algorithm 14.76 Right-to-left binary exponentiation mod Q.
#[allow(clippy::cast_lossless)]
const fn pow_mod_q(g: i32, e: u8) -> i64 {
    let mut result = 1i64;
    let mut s = g as i64;
    let mut e = e;
    while e != 0 {
        if e & 1 != 0 {
            result = (result * s) % (Q as i64);
        };
        e >>= 1;
        if e != 0 {
            s = (s * s) % (Q as i64);
        };
    }
    result
}


/// Powers of `ZETA` in bit-reversed order, lifted to the Montgomery domain (`* 2^32`) and
/// centered in `(-Q/2, Q/2]`. Entry 0 is never consulted by the transforms.
#[allow(clippy::cast_possible_truncation, clippy::cast_lossless)]
const fn gen_zeta_table() -> [i32; 256] {
    let mut result = [0i32; 256];
    let mut i = 1;
    while i < 256 {
        let mont = (pow_mod_q(ZETA, (i as u8).reverse_bits()) << 32) % (Q as i64);
        result[i] = if mont > (Q as i64) / 2 { (mont - Q as i64) as i32 } else { mont as i32 };
        i += 1;
    }
    result
}

pub(crate) static ZETAS: [i32; 256] = gen_zeta_table();
