// Compares this crate against the independent `fips204` crate: same seed, same keys; same
// randomness, same signatures; and each side accepts the other's signatures.

use fips204::ml_dsa_87 as reference;
use fips204::traits::{KeyGen as _, SerDes as _, Signer as _, Verifier as _};
use mldsa87::traits::{KeyGen, SerDes, Signer, Verifier};
use rand_chacha::rand_core::SeedableRng;
use rand_core::{CryptoRng, RngCore};


// Hands out pre-loaded byte strings, last pushed first, so both implementations can be fed
// the exact randomness the other one used.
struct MyRng {
    data: Vec<Vec<u8>>,
}

impl RngCore for MyRng {
    fn next_u32(&mut self) -> u32 { unimplemented!() }

    fn next_u64(&mut self) -> u64 { unimplemented!() }

    fn fill_bytes(&mut self, out: &mut [u8]) {
        let x = self.data.pop().expect("test rng done");
        out.copy_from_slice(&x)
    }

    fn try_fill_bytes(&mut self, out: &mut [u8]) -> Result<(), rand_core::Error> {
        self.fill_bytes(out);
        Ok(())
    }
}

impl CryptoRng for MyRng {}

impl MyRng {
    fn new() -> Self { MyRng { data: Vec::new() } }

    fn push(&mut self, new_data: &[u8]) { self.data.push(new_data.to_vec()) }
}


fn reference_keys(seed: &[u8; 32]) -> (reference::PublicKey, reference::PrivateKey) {
    let mut rng = MyRng::new();
    rng.push(seed);
    reference::KG::try_keygen_with_rng(&mut rng).unwrap()
}


#[test]
fn keys_match_reference() {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(2024);
    for _ in 0..8 {
        let mut seed = [0u8; 32];
        rng.fill_bytes(&mut seed);
        let (ref_pk, ref_sk) = reference_keys(&seed);
        let (pk, sk) = mldsa87::KG::keygen_from_seed(&seed);
        assert_eq!(pk.into_bytes(), ref_pk.into_bytes());
        assert_eq!(sk.into_bytes(), ref_sk.into_bytes());
    }
}


#[test]
fn deterministic_signatures_match_reference() {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(7);
    for i in 0..6u8 {
        let mut seed = [0u8; 32];
        rng.fill_bytes(&mut seed);
        let (_, ref_sk) = reference_keys(&seed);
        let (_, sk) = mldsa87::KG::keygen_from_seed(&seed);
        let msg = vec![i; 13 * usize::from(i)];
        let ctx = vec![0x5A; usize::from(i) * 40];

        // deterministic signing is hedged signing with an all-zero rnd
        let mut zeros = MyRng::new();
        zeros.push(&[0u8; 32]);
        let ref_sig = ref_sk.try_sign_with_rng(&mut zeros, &msg, &ctx).unwrap();
        let sig = sk.try_sign_deterministic(&msg, &ctx).unwrap();
        assert_eq!(sig, ref_sig);
    }
}


#[test]
fn randomized_signatures_match_reference() {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(8);
    for _ in 0..6 {
        let (mut seed, mut rnd, mut msg) = ([0u8; 32], [0u8; 32], [0u8; 64]);
        rng.fill_bytes(&mut seed);
        rng.fill_bytes(&mut rnd);
        rng.fill_bytes(&mut msg);
        let (_, ref_sk) = reference_keys(&seed);
        let (_, sk) = mldsa87::KG::keygen_from_seed(&seed);

        let mut replay = MyRng::new();
        replay.push(&rnd);
        let ref_sig = ref_sk.try_sign_with_rng(&mut replay, &msg, mldsa87::DEFAULT_CTX).unwrap();
        replay.push(&rnd);
        let sig = sk.try_sign_with_rng(&mut replay, &msg, mldsa87::DEFAULT_CTX).unwrap();
        assert_eq!(sig, ref_sig);
    }
}


#[test]
fn signatures_verify_across_implementations() {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(9);
    for i in 0..4u8 {
        let (ref_pk, ref_sk) = reference::KG::try_keygen_with_rng(&mut rng).unwrap();
        let pk = mldsa87::PublicKey::try_from_bytes(ref_pk.clone().into_bytes()).unwrap();
        let sk = mldsa87::PrivateKey::try_from_bytes(ref_sk.clone().into_bytes()).unwrap();
        let msg = [i; 100];

        let ours = sk.try_sign_with_rng(&mut rng, &msg, &[i]).unwrap();
        assert!(ref_pk.verify(&msg, &ours, &[i]));
        assert!(!ref_pk.verify(&msg, &ours, &[i, i]));

        let theirs = ref_sk.try_sign_with_rng(&mut rng, &msg, &[i]).unwrap();
        assert!(pk.verify(&msg, &theirs, &[i]));
        assert!(!pk.verify(&msg[1..], &theirs, &[i]));

        assert_eq!(sk.get_public_key().unwrap().into_bytes(), ref_pk.into_bytes());
    }
}
