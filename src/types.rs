use crate::helpers::{caddq, montgomery_reduce, reduce32};
use crate::{D, K, L, N, PK_LEN, SIG_LEN, SK_LEN};
use zeroize::{Zeroize, ZeroizeOnDrop};


/// Correctly sized private (secret) key, holding the packed
/// `rho || key || tr || s1 || s2 || t0` byte encoding. <br>
/// Implements the [`crate::traits::Signer`] and [`crate::traits::SerDes`] traits.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKey(pub(crate) [u8; SK_LEN]);


/// Correctly sized public key, holding the packed `rho || t1` byte encoding. <br>
/// Implements the [`crate::traits::Verifier`] and [`crate::traits::SerDes`] traits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PublicKey(pub(crate) [u8; PK_LEN]);


/// A signature is simply a fixed-size byte array: `ctilde || z || h`.
pub type Signature = [u8; SIG_LEN];


/// Element of `R_q` or `T_q` (both share representation; the domain is implied by the
/// operations that were applied).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Zeroize)]
pub(crate) struct Poly(pub(crate) [i32; N]);

pub(crate) const POLY0: Poly = Poly([0i32; N]);

pub(crate) type PolyVecL = [Poly; L];
pub(crate) type PolyVecK = [Poly; K];

/// Public matrix `A`, K rows of L polynomials, always held in the NTT domain
pub(crate) type Matrix = [PolyVecL; K];


impl Default for Poly {
    fn default() -> Self { POLY0 }
}


impl Poly {
    /// Brings every coefficient into `[-6283008, 6283008]` (see `reduce32`).
    pub(crate) fn reduce(&mut self) { self.0.iter_mut().for_each(|a| *a = reduce32(*a)); }

    /// Adds `Q` to negative coefficients.
    pub(crate) fn caddq(&mut self) { self.0.iter_mut().for_each(|a| *a = caddq(*a)); }

    /// Coefficient-wise addition without reduction.
    pub(crate) fn add_assign(&mut self, rhs: &Poly) {
        self.0.iter_mut().zip(rhs.0.iter()).for_each(|(a, b)| *a += b);
    }

    /// Coefficient-wise subtraction without reduction.
    pub(crate) fn sub_assign(&mut self, rhs: &Poly) {
        self.0.iter_mut().zip(rhs.0.iter()).for_each(|(a, b)| *a -= b);
    }

    /// Multiplies by `2^D` without reduction; input coefficients must be below `2^{31-D}`.
    pub(crate) fn shiftl(&mut self) { self.0.iter_mut().for_each(|a| *a <<= D); }

    /// Pointwise Montgomery product of two NTT-domain polynomials, `a * b * 2^{-32}`.
    pub(crate) fn pointwise_montgomery(a: &Poly, b: &Poly) -> Poly {
        Poly(core::array::from_fn(|n| montgomery_reduce(i64::from(a.0[n]) * i64::from(b.0[n]))))
    }
}
