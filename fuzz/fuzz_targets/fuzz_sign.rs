#![no_main]
use libfuzzer_sys::fuzz_target;
use mldsa87::traits::{KeyGen, SerDes, Signer, Verifier};
use mldsa87::{crypto_sign_open, crypto_sign_with_rng, SigningMode};
use rand_chacha::ChaCha20Rng;
use rand_core::SeedableRng;


// Deterministic RNG from the leading input bytes
fn create_rng(seed_data: &[u8]) -> ChaCha20Rng {
    let mut seed = [0u8; 32];
    let len = seed_data.len().min(32);
    seed[..len].copy_from_slice(&seed_data[..len]);
    ChaCha20Rng::from_seed(seed)
}


fuzz_target!(|data: &[u8]| {
    // Skip empty inputs
    if data.is_empty() {
        return;
    }

    let mut rng = create_rng(data);
    let (pk, sk) = mldsa87::KG::try_keygen_with_rng(&mut rng).unwrap();

    // First byte selects the context length
    let ctx_len = usize::from(data[0]) % 8;
    let (ctx, msg) = data.split_at(ctx_len.min(data.len()));

    // Hedged signatures differ but both verify
    let sig1 = sk.try_sign_with_rng(&mut rng, msg, ctx).unwrap();
    let sig2 = sk.try_sign_with_rng(&mut rng, msg, ctx).unwrap();
    assert!(sig1 != sig2);
    assert!(pk.verify(msg, &sig1, ctx));
    assert!(pk.verify(msg, &sig2, ctx));

    // Deterministic signatures repeat
    let det = sk.try_sign_deterministic(msg, ctx).unwrap();
    assert!(det == sk.try_sign_deterministic(msg, ctx).unwrap());

    // Public key derivation agrees with keygen
    let derived_pk = sk.get_public_key().unwrap();
    assert!(derived_pk == pk);

    // Attached signatures open back to the message
    let (pk_bytes, sk_bytes) = (pk.into_bytes(), sk.into_bytes());
    for mode in [SigningMode::Deterministic, SigningMode::Randomized] {
        let sm = crypto_sign_with_rng(&mut rng, msg, &sk_bytes, mode, ctx).unwrap();
        assert_eq!(crypto_sign_open(&sm, &pk_bytes, ctx).as_deref(), Some(msg));
    }
});
