use crate::error::Result;
use rand_core::CryptoRngCore;
#[cfg(feature = "default-rng")]
use rand_core::OsRng;


/// The `KeyGen` trait is defined to allow trait objects.
pub trait KeyGen {
    /// The ML-DSA-87 public key type
    type PublicKey;
    /// The ML-DSA-87 private (secret) key type
    type PrivateKey;

    /// Generates a public and private key pair using the OS default random number generator.
    ///
    /// # Errors
    /// Returns an error when the random number generator fails.
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// # #[cfg(feature = "default-rng")] {
    /// use mldsa87::traits::{KeyGen, Signer, Verifier};
    ///
    /// let message = [0u8, 1, 2, 3, 4, 5, 6, 7];
    ///
    /// let (pk, sk) = mldsa87::KG::try_keygen()?; // Generate both public and secret keys
    /// let sig = sk.try_sign(&message, b"")?; // Use the secret key to generate a message signature
    /// assert!(pk.verify(&message, &sig, b""));
    /// # }
    /// # Ok(())}
    /// ```
    #[cfg(feature = "default-rng")]
    fn try_keygen() -> Result<(Self::PublicKey, Self::PrivateKey)> {
        Self::try_keygen_with_rng(&mut OsRng)
    }

    /// Generates a public and private key pair using the supplied random number generator.
    ///
    /// # Errors
    /// Returns an error when the random number generator fails.
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use mldsa87::traits::{KeyGen, Signer, Verifier};
    /// use rand_chacha::rand_core::SeedableRng;
    ///
    /// let message = [0u8, 1, 2, 3, 4, 5, 6, 7];
    /// let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
    ///
    /// let (pk, sk) = mldsa87::KG::try_keygen_with_rng(&mut rng)?;
    /// let sig = sk.try_sign_with_rng(&mut rng, &message, b"app")?;
    /// assert!(pk.verify(&message, &sig, b"app"));
    /// # Ok(())}
    /// ```
    fn try_keygen_with_rng(
        rng: &mut impl CryptoRngCore,
    ) -> Result<(Self::PublicKey, Self::PrivateKey)>;

    /// Deterministically derives a key pair from a 32-byte seed `ξ`. The same seed always
    /// yields the same key pair.
    fn keygen_from_seed(xi: &[u8; 32]) -> (Self::PublicKey, Self::PrivateKey);
}


/// The `Signer` trait is implemented for the `PrivateKey` struct.
pub trait Signer {
    /// The signature is a fixed-size byte array
    type Signature;
    /// The matching public key type
    type PublicKey;

    /// Signs `message` under context `ctx` (at most 255 bytes) with hedged randomness from the
    /// OS default random number generator.
    ///
    /// # Errors
    /// Returns an error when the random number generator fails, the context is too long, the
    /// key is malformed or the rejection loop exceeds its bound.
    #[cfg(feature = "default-rng")]
    fn try_sign(&self, message: &[u8], ctx: &[u8]) -> Result<Self::Signature> {
        self.try_sign_with_rng(&mut OsRng, message, ctx)
    }

    /// Signs `message` under context `ctx` with hedged randomness drawn from `rng`.
    ///
    /// # Errors
    /// Returns an error when the random number generator fails, the context is too long, the
    /// key is malformed or the rejection loop exceeds its bound.
    fn try_sign_with_rng(
        &self, rng: &mut impl CryptoRngCore, message: &[u8], ctx: &[u8],
    ) -> Result<Self::Signature>;

    /// Signs `message` under context `ctx` deterministically: the same key, message and
    /// context always produce the same signature.
    ///
    /// # Errors
    /// Returns an error when the context is too long, the key is malformed or the rejection
    /// loop exceeds its bound.
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use mldsa87::traits::{KeyGen, Signer};
    ///
    /// let (_pk, sk) = mldsa87::KG::keygen_from_seed(&[7u8; 32]);
    /// let sig1 = sk.try_sign_deterministic(b"msg", b"")?;
    /// let sig2 = sk.try_sign_deterministic(b"msg", b"")?;
    /// assert_eq!(sig1, sig2);
    /// # Ok(())}
    /// ```
    fn try_sign_deterministic(&self, message: &[u8], ctx: &[u8]) -> Result<Self::Signature>;

    /// Recomputes the public key belonging to this private key.
    ///
    /// # Errors
    /// Returns an error when the private key is malformed or internally inconsistent.
    fn get_public_key(&self) -> Result<Self::PublicKey>;
}


/// The `Verifier` trait is implemented for `PublicKey`.
pub trait Verifier {
    /// The signature is a fixed-size byte array
    type Signature;

    /// Verifies a signature over `message` under context `ctx`. Any malformed input,
    /// including a context longer than 255 bytes, verifies as `false`.
    fn verify(&self, message: &[u8], signature: &Self::Signature, ctx: &[u8]) -> bool;
}


/// The `SerDes` trait provides for validated serialization and deserialization of fixed-size
/// keys.
pub trait SerDes {
    /// The fixed-size byte array to be serialized or deserialized
    type ByteArray;

    /// Produces the byte encoding of the key.
    fn into_bytes(self) -> Self::ByteArray;

    /// Consumes a byte encoding of the key; performs validation.
    ///
    /// # Errors
    /// Returns an error on malformed input.
    /// # Examples
    /// ```rust
    /// # use std::error::Error;
    /// # fn main() -> Result<(), Box<dyn Error>> {
    /// use mldsa87::traits::{KeyGen, SerDes};
    ///
    /// let (pk, sk) = mldsa87::KG::keygen_from_seed(&[1u8; 32]);
    /// let pk2 = mldsa87::PublicKey::try_from_bytes(pk.clone().into_bytes())?;
    /// let _sk2 = mldsa87::PrivateKey::try_from_bytes(sk.into_bytes())?;
    /// assert_eq!(pk, pk2);
    /// # Ok(())}
    /// ```
    fn try_from_bytes(ba: Self::ByteArray) -> Result<Self>
    where
        Self: Sized;
}
