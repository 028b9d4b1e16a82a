use mldsa87::traits::{KeyGen, SerDes, Signer, Verifier};
use mldsa87::{
    crypto_sign_keypair, crypto_sign_keypair_with_rng, crypto_sign_open, crypto_sign_signature,
    crypto_sign_signature_with_rng, crypto_sign_verify, crypto_sign_with_rng,
    public_key_from_secret, Error, SigningMode, DEFAULT_CTX, KG, PK_LEN, SIG_LEN, SK_LEN,
};
use rand_chacha::rand_core::SeedableRng;
use rand_core::RngCore;

// cargo flamegraph --test integration

// $ cargo test --release -- --nocapture --ignored
#[ignore]
#[test]
fn forever() {
    let mut msg = [0u8; 32];
    let mut i = 0u64;
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
    loop {
        rng.fill_bytes(&mut msg);
        let (pk, sk) = KG::try_keygen_with_rng(&mut rng).unwrap();
        let sig = sk.try_sign_with_rng(&mut rng, &msg, DEFAULT_CTX).unwrap();
        assert!(pk.verify(&msg, &sig, DEFAULT_CTX));
        if i % 10000 == 0 {
            println!("So far i: {i}");
        };
        i += 1;
    }
}


#[test]
fn test_87_rounds() {
    let mut msg = [0u8, 1, 2, 3, 4, 5, 6, 7];
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(789);
    for i in 0..32u8 {
        msg[0] = i;
        let (pk, sk) = KG::try_keygen_with_rng(&mut rng).unwrap();
        let sig = sk.try_sign_with_rng(&mut rng, &msg, &[i]).unwrap();
        assert!(pk.verify(&msg, &sig, &[i]));
    }
}


#[test]
fn test_87_no_verif() {
    let msg = [0u8, 1, 2, 3, 4, 5, 6, 7];
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(123);
    let (pk, sk) = KG::try_keygen_with_rng(&mut rng).unwrap();
    let sig = sk.try_sign_with_rng(&mut rng, &msg, &[]).unwrap();
    assert!(pk.verify(&msg, &sig, &[]));

    // Bad messages
    for i in 0..8 {
        let mut msg_bad = msg;
        msg_bad[i] ^= 0x08;
        assert!(!pk.verify(&msg_bad, &sig, &[]));
    }

    // Bad secret key (the tr region, which decodes fine but no longer matches pk)
    for i in 0..8 {
        let mut sk_bad = sk.clone().into_bytes();
        sk_bad[64 + i * 8] ^= 0x08;
        let sk_bad = mldsa87::PrivateKey::try_from_bytes(sk_bad).unwrap();
        let sig = sk_bad.try_sign_with_rng(&mut rng, &msg, &[]).unwrap();
        assert!(!pk.verify(&msg, &sig, &[]));
        assert!(sk_bad.get_public_key().is_err());
    }

    // Bad public key
    for i in 0..8 {
        let mut pk_bad = pk.clone().into_bytes();
        pk_bad[i * 10] ^= 0x08;
        let pk_bad = mldsa87::PublicKey::try_from_bytes(pk_bad).unwrap();
        assert!(!pk_bad.verify(&msg, &sig, &[]));
    }

    // Bad signature (commitment hash, then response)
    for i in 0..8 {
        let mut sig_bad = sig;
        sig_bad[i * 10] ^= 0x08;
        assert!(!pk.verify(&msg, &sig_bad, &[]));
        let mut sig_bad = sig;
        sig_bad[100 + i * 500] ^= 0x01;
        assert!(!pk.verify(&msg, &sig_bad, &[]));
    }

    // Bad context
    assert!(!pk.verify(&msg, &sig, DEFAULT_CTX));
    assert!(!pk.verify(&msg, &sig, &[0u8; 256]));
}


#[test]
fn test_87_bit_flip_sweep() {
    let (pk, sk) = KG::keygen_from_seed(&[0x5Au8; 32]);
    let msg = b"every section of the signature is bound";
    let sig = sk.try_sign_deterministic(msg, DEFAULT_CTX).unwrap();
    assert!(pk.verify(msg, &sig, DEFAULT_CTX));

    // ctilde 0..64, z 64..4544, hint indices and counts 4544..SIG_LEN
    let hint_start = SIG_LEN - 83;
    let positions = (0..SIG_LEN).step_by(37).chain(hint_start..SIG_LEN).chain([SIG_LEN - 1]);
    for pos in positions {
        let mut sig_bad = sig;
        sig_bad[pos] ^= 1 << (pos % 8);
        assert!(!pk.verify(msg, &sig_bad, DEFAULT_CTX), "flip at signature byte {pos}");
    }

    // rho and t1 of the public key
    for pos in (0..PK_LEN).step_by(41).chain([PK_LEN - 1]) {
        let mut pk_bad = pk.clone().into_bytes();
        pk_bad[pos] ^= 1 << (pos % 8);
        let pk_bad = mldsa87::PublicKey::try_from_bytes(pk_bad).unwrap();
        assert!(!pk_bad.verify(msg, &sig, DEFAULT_CTX), "flip at public key byte {pos}");
    }
}


#[test]
fn test_large_message_and_zero_signature() {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(16);
    let (pk, sk) = KG::try_keygen_with_rng(&mut rng).unwrap();
    let mut msg = vec![0u8; 16 * 1024];
    rng.fill_bytes(&mut msg);

    let sig = sk.try_sign_deterministic(&msg, DEFAULT_CTX).unwrap();
    assert_eq!(sig, sk.try_sign_deterministic(&msg, DEFAULT_CTX).unwrap());
    assert!(pk.verify(&msg, &sig, DEFAULT_CTX));
    let sig = sk.try_sign_with_rng(&mut rng, &msg, DEFAULT_CTX).unwrap();
    assert!(pk.verify(&msg, &sig, DEFAULT_CTX));

    // a change in the final byte of a long message
    let mut msg_bad = msg.clone();
    *msg_bad.last_mut().unwrap() ^= 0x80;
    assert!(!pk.verify(&msg_bad, &sig, DEFAULT_CTX));
    assert!(!pk.verify(&msg[..msg.len() - 1], &sig, DEFAULT_CTX));

    let (pk_bytes, sk_bytes) = (pk.clone().into_bytes(), sk.into_bytes());
    let sm = crypto_sign_with_rng(&mut rng, &msg, &sk_bytes, SigningMode::Randomized, DEFAULT_CTX).unwrap();
    assert_eq!(sm.len(), SIG_LEN + 16 * 1024);
    assert_eq!(crypto_sign_open(&sm, &pk_bytes, DEFAULT_CTX), Some(msg.clone()));

    // one and zero byte messages
    for short in [&msg[..1], &[][..]] {
        let sig = KG::keygen_from_seed(&[1u8; 32]).1.try_sign_deterministic(short, &[]).unwrap();
        assert!(KG::keygen_from_seed(&[1u8; 32]).0.verify(short, &sig, &[]));
    }

    // an all-zero signature never verifies
    let zero_sig = [0u8; SIG_LEN];
    assert!(!pk.verify(&msg, &zero_sig, DEFAULT_CTX));
    assert!(!pk.verify(&[], &zero_sig, &[]));
    assert!(!crypto_sign_verify(&zero_sig, &msg, &pk_bytes, DEFAULT_CTX));
    let mut sm_zero = zero_sig.to_vec();
    sm_zero.extend_from_slice(&msg);
    assert!(crypto_sign_open(&sm_zero, &pk_bytes, DEFAULT_CTX).is_none());
}


#[test]
fn test_context_limits() {
    let (pk, sk) = KG::keygen_from_seed(&[5u8; 32]);
    let ctx = [0xC7u8; 256];
    let sig = sk.try_sign_deterministic(b"hello", &ctx[..255]).unwrap();
    assert!(pk.verify(b"hello", &sig, &ctx[..255]));
    assert!(!pk.verify(b"hello", &sig, &ctx[..254]));
    assert_eq!(sk.try_sign_deterministic(b"hello", &ctx), Err(Error::ContextTooLong(256)));
    assert_eq!(
        sk.try_sign_with_rng(&mut rand::thread_rng(), b"hello", &ctx),
        Err(Error::ContextTooLong(256))
    );
}


#[test]
fn test_malformed_secret_key() {
    let (_pk, sk) = KG::keygen_from_seed(&[6u8; 32]);
    let mut sk_bad = sk.into_bytes();
    // force the first s1 coefficient field to 7, i.e. ETA - 7 = -5
    sk_bad[128] |= 0x07;
    assert_eq!(mldsa87::PrivateKey::try_from_bytes(sk_bad).err(), Some(Error::MalformedKey));
    let mut sig = [0u8; SIG_LEN];
    assert_eq!(
        crypto_sign_signature(&mut sig, b"m", &sk_bad, SigningMode::Deterministic, &[]),
        Err(Error::MalformedKey)
    );
    assert_eq!(public_key_from_secret(&sk_bad), Err(Error::MalformedKey));
}


#[test]
fn test_zero_seed_scenario() {
    let (mut pk, mut sk) = ([0u8; PK_LEN], [0u8; SK_LEN]);
    let seed = crypto_sign_keypair(Some(&[0u8; 32]), &mut pk, &mut sk).unwrap();
    assert_eq!(seed, [0u8; 32]);

    // rho = SHAKE256(0^32 || 8 || 7)[0..32] leads both keys
    let rho = hex::decode("e45ffc8cc73db885dc662e62a18cd8e3803297117fa5658814a985b5ff1db7b4").unwrap();
    assert_eq!(pk[..32], rho[..]);
    assert_eq!(sk[..32], rho[..]);

    // the same seed always gives the same keys
    let (mut pk2, mut sk2) = ([0u8; PK_LEN], [0u8; SK_LEN]);
    let _ = crypto_sign_keypair(Some(&seed), &mut pk2, &mut sk2).unwrap();
    assert_eq!(pk, pk2);
    assert_eq!(sk, sk2);
    assert_eq!(public_key_from_secret(&sk).unwrap(), pk);
}


#[test]
fn test_returned_seed_reproduces_keys() {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(99);
    let (mut pk, mut sk) = ([0u8; PK_LEN], [0u8; SK_LEN]);
    let seed = crypto_sign_keypair_with_rng(&mut rng, None, &mut pk, &mut sk).unwrap();
    let (pk2, sk2) = KG::keygen_from_seed(&seed);
    assert_eq!(pk2.into_bytes(), pk);
    assert_eq!(sk2.into_bytes(), sk);
}


#[test]
fn test_sign_and_open() {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(11);
    let (pk, sk) = KG::try_keygen_with_rng(&mut rng).unwrap();
    let (pk, sk) = (pk.into_bytes(), sk.into_bytes());
    let msg = b"attack at dawn";

    let sm = crypto_sign_with_rng(&mut rng, msg, &sk, SigningMode::Randomized, DEFAULT_CTX).unwrap();
    assert_eq!(sm.len(), SIG_LEN + msg.len());
    assert_eq!(&sm[SIG_LEN..], msg);
    assert_eq!(crypto_sign_open(&sm, &pk, DEFAULT_CTX).as_deref(), Some(&msg[..]));

    // wrong context, altered message, truncated input
    assert!(crypto_sign_open(&sm, &pk, b"").is_none());
    let mut altered = sm.clone();
    *altered.last_mut().unwrap() ^= 1;
    assert!(crypto_sign_open(&altered, &pk, DEFAULT_CTX).is_none());
    assert!(crypto_sign_open(&sm[..SIG_LEN - 1], &pk, DEFAULT_CTX).is_none());

    // an empty message still carries a full signature
    let sm = crypto_sign_with_rng(&mut rng, &[], &sk, SigningMode::Deterministic, &[]).unwrap();
    assert_eq!(sm.len(), SIG_LEN);
    assert_eq!(crypto_sign_open(&sm, &pk, &[]), Some(vec![]));
}


#[test]
fn test_signing_modes() {
    let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(21);
    let (pk, sk) = KG::keygen_from_seed(&[8u8; 32]);
    let (pk, sk) = (pk.into_bytes(), sk.into_bytes());
    let (mut sig1, mut sig2) = ([0u8; SIG_LEN], [0u8; SIG_LEN]);

    crypto_sign_signature_with_rng(&mut rng, &mut sig1, b"m", &sk, SigningMode::Deterministic, &[]).unwrap();
    crypto_sign_signature_with_rng(&mut rng, &mut sig2, b"m", &sk, SigningMode::Deterministic, &[]).unwrap();
    assert_eq!(sig1, sig2);

    crypto_sign_signature_with_rng(&mut rng, &mut sig1, b"m", &sk, SigningMode::Randomized, &[]).unwrap();
    crypto_sign_signature_with_rng(&mut rng, &mut sig2, b"m", &sk, SigningMode::Randomized, &[]).unwrap();
    assert_ne!(sig1, sig2);
    assert!(crypto_sign_verify(&sig1, b"m", &pk, &[]));
    assert!(crypto_sign_verify(&sig2, b"m", &pk, &[]));
}


#[test]
fn test_byte_and_typed_apis_agree() {
    let (pk_t, sk_t) = KG::keygen_from_seed(&[0x42u8; 32]);
    let (mut pk, mut sk) = ([0u8; PK_LEN], [0u8; SK_LEN]);
    let _ = crypto_sign_keypair(Some(&[0x42u8; 32]), &mut pk, &mut sk).unwrap();
    assert_eq!(pk_t.clone().into_bytes(), pk);
    assert_eq!(sk_t.clone().into_bytes(), sk);
    assert_eq!(sk_t.get_public_key().unwrap(), pk_t);

    let mut sig = [0u8; SIG_LEN];
    crypto_sign_signature(&mut sig, b"same", &sk, SigningMode::Deterministic, DEFAULT_CTX).unwrap();
    assert_eq!(sk_t.try_sign_deterministic(b"same", DEFAULT_CTX).unwrap(), sig);

    // identical randomness yields identical hedged signatures
    let mut rng1 = rand_chacha::ChaCha8Rng::seed_from_u64(5);
    let mut rng2 = rand_chacha::ChaCha8Rng::seed_from_u64(5);
    crypto_sign_signature_with_rng(&mut rng1, &mut sig, b"same", &sk, SigningMode::Randomized, &[]).unwrap();
    assert_eq!(sk_t.try_sign_with_rng(&mut rng2, b"same", &[]).unwrap(), sig);
    assert!(pk_t.verify(b"same", &sig, &[]));
}


#[test]
fn test_default_context_and_sizes() {
    assert_eq!(DEFAULT_CTX, b"ZOND");
    assert_eq!((PK_LEN, SK_LEN, SIG_LEN), (2592, 4896, 4627));
    let (pk, _) = KG::keygen_from_seed(&[0x11u8; 32]);
    assert_eq!(pk.into_bytes()[0], 16);
}
