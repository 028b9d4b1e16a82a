#![no_main]
use libfuzzer_sys::fuzz_target;
use mldsa87::traits::{KeyGen, SerDes, Signer, Verifier};
use mldsa87::{crypto_sign_verify, DEFAULT_CTX};


fuzz_target!(|data: &[u8]| {
    // Skip empty inputs
    if data.is_empty() {
        return;
    }

    // Static keypair (for speed)
    let (pk, sk) = mldsa87::KG::keygen_from_seed(&[42u8; 32]);

    // First byte selects the context length
    let ctx_len = usize::from(data[0]) % 8;
    let (ctx, msg) = data.split_at(ctx_len.min(data.len()));

    let Ok(sig) = sk.try_sign_deterministic(msg, ctx) else { return };
    assert!(pk.verify(msg, &sig, ctx));
    assert!(crypto_sign_verify(&sig, msg, &pk.clone().into_bytes(), ctx));

    // Modified message should not verify
    if !msg.is_empty() {
        let mut modified_msg = msg.to_vec();
        modified_msg[0] ^= 1;
        assert!(!pk.verify(&modified_msg, &sig, ctx));
    }

    // Modified context should not verify
    let mut modified_ctx = ctx.to_vec();
    modified_ctx.push(1);
    assert!(!pk.verify(msg, &sig, &modified_ctx));
    if ctx != DEFAULT_CTX {
        assert!(!pk.verify(msg, &sig, DEFAULT_CTX));
    }

    // Truncated signature is rejected by the byte API
    assert!(!crypto_sign_verify(&sig[1..], msg, &pk.into_bytes(), ctx));
});
