#![no_main]

use libfuzzer_sys::fuzz_target;
use mldsa87::traits::{KeyGen, SerDes, Signer, Verifier};
use mldsa87::{crypto_sign_open, crypto_sign_verify, PK_LEN, SIG_LEN, SK_LEN};

fuzz_target!(|data: [u8; SK_LEN + SIG_LEN + PK_LEN]| {
    let (sk_bytes, rest) = data.split_at(SK_LEN);
    let (sig_bytes, pk_bytes) = rest.split_at(SIG_LEN);
    let msg = [0u8, 1, 2, 3];

    // A 'fuzzy' secret key either decodes and signs, or is rejected as malformed
    if let Ok(sk) = mldsa87::PrivateKey::try_from_bytes(sk_bytes.try_into().unwrap()) {
        let _sig = sk.try_sign_deterministic(&msg, &[]);
        let _pk = sk.get_public_key();
    }

    // A 'fuzzy' signature against a good key must simply not verify
    let (pk, sk) = mldsa87::KG::keygen_from_seed(&[9u8; 32]);
    let sig: [u8; SIG_LEN] = sig_bytes.try_into().unwrap();
    assert!(!pk.verify(&msg, &sig, &[]));
    assert!(!crypto_sign_verify(sig_bytes, &msg, &pk.clone().into_bytes(), &[]));
    assert!(crypto_sign_open(rest, &pk.into_bytes(), &[]).is_none());

    // A 'fuzzy' public key must not accept a good signature made under another key
    let pk = mldsa87::PublicKey::try_from_bytes(pk_bytes.try_into().unwrap()).unwrap();
    let sig2 = sk.try_sign_deterministic(&msg, &[]).unwrap();
    let _v = pk.verify(&msg, &sig2, &[]);
});
