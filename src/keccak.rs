// This file implements the Keccak-f[1600] permutation and the SHAKE128/SHAKE256 sponge of FIPS 202

use zeroize::Zeroize;


/// Number of 64-bit lanes in the Keccak state
const PLEN: usize = 25;

/// SHAKE128 absorb/squeeze rate in bytes
pub(crate) const SHAKE128_RATE: usize = 168;

/// SHAKE256 absorb/squeeze rate in bytes
pub(crate) const SHAKE256_RATE: usize = 136;

/// SHAKE domain separation bits plus the first bit of pad10*1
const SHAKE_PAD: u8 = 0x1F;


const ROUND_CONSTANTS: [u64; 24] = [
    0x0000_0000_0000_0001,
    0x0000_0000_0000_8082,
    0x8000_0000_0000_808A,
    0x8000_0000_8000_8000,
    0x0000_0000_0000_808B,
    0x0000_0000_8000_0001,
    0x8000_0000_8000_8081,
    0x8000_0000_0000_8009,
    0x0000_0000_0000_008A,
    0x0000_0000_0000_0088,
    0x0000_0000_8000_8009,
    0x0000_0000_8000_000A,
    0x0000_0000_8000_808B,
    0x8000_0000_0000_008B,
    0x8000_0000_0000_8089,
    0x8000_0000_0000_8003,
    0x8000_0000_0000_8002,
    0x8000_0000_0000_0080,
    0x0000_0000_0000_800A,
    0x8000_0000_8000_000A,
    0x8000_0000_8000_8081,
    0x8000_0000_0000_8080,
    0x0000_0000_8000_0001,
    0x8000_0000_8000_8008,
];

// Rotation offsets and lane destinations for the combined rho/pi step, walking the pi cycle
// starting from lane 1.
const RHO: [u32; 24] = [1, 3, 6, 10, 15, 21, 28, 36, 45, 55, 2, 14, 27, 41, 56, 8, 25, 43, 62, 18, 39, 61, 20, 44];
const PI: [usize; 24] = [10, 7, 11, 17, 18, 3, 5, 16, 8, 21, 24, 4, 15, 23, 19, 13, 12, 2, 20, 14, 22, 9, 6, 1];


/// The 24-round Keccak-f[1600] permutation. Lane `x + 5y` holds `A[x][y]`.
pub(crate) fn keccak_f1600(a: &mut [u64; PLEN]) {
    for rc in ROUND_CONSTANTS {
        // theta
        let mut c = [0u64; 5];
        for x in 0..5 {
            c[x] = a[x] ^ a[x + 5] ^ a[x + 10] ^ a[x + 15] ^ a[x + 20];
        }
        for x in 0..5 {
            let d = c[(x + 4) % 5] ^ c[(x + 1) % 5].rotate_left(1);
            for y in 0..5 {
                a[5 * y + x] ^= d;
            }
        }

        // rho and pi
        let mut last = a[1];
        for (&dst, &rot) in PI.iter().zip(RHO.iter()) {
            let tmp = a[dst];
            a[dst] = last.rotate_left(rot);
            last = tmp;
        }

        // chi
        for y in 0..5 {
            let row = [a[5 * y], a[5 * y + 1], a[5 * y + 2], a[5 * y + 3], a[5 * y + 4]];
            for x in 0..5 {
                a[5 * y + x] = row[x] ^ (!row[(x + 1) % 5] & row[(x + 2) % 5]);
            }
        }

        // iota
        a[0] ^= rc;
    }
}


/// Keccak sponge with a byte cursor. The lifecycle is `new()`, any number of `absorb()`
/// calls, a single `finalize()`, then any number of `squeeze()`/`squeeze_blocks()` calls.
#[derive(Clone, Zeroize)]
pub(crate) struct KeccakState {
    s: [u64; PLEN],
    pos: usize,
    rate: usize,
}


impl KeccakState {
    pub(crate) fn new(rate: usize) -> Self {
        debug_assert!((rate == SHAKE128_RATE) | (rate == SHAKE256_RATE), "Keccak: unsupported rate");
        Self { s: [0u64; PLEN], pos: 0, rate }
    }

    #[inline]
    fn xor_byte(&mut self, index: usize, byte: u8) {
        self.s[index / 8] ^= u64::from(byte) << (8 * (index % 8));
    }

    #[inline]
    #[allow(clippy::cast_possible_truncation)] // extracting a byte from a lane
    fn get_byte(&self, index: usize) -> u8 { (self.s[index / 8] >> (8 * (index % 8))) as u8 }

    /// Absorbs `input` into the sponge, permuting each time a full rate-sized block has been
    /// accumulated. May be called repeatedly prior to `finalize()`.
    pub(crate) fn absorb(&mut self, input: &[u8]) {
        for &byte in input {
            self.xor_byte(self.pos, byte);
            self.pos += 1;
            if self.pos == self.rate {
                keccak_f1600(&mut self.s);
                self.pos = 0;
            }
        }
    }

    /// Applies the SHAKE padding. The permutation itself runs lazily on the first squeeze,
    /// so the cursor is parked at the end of the block.
    pub(crate) fn finalize(&mut self) {
        self.xor_byte(self.pos, SHAKE_PAD);
        self.xor_byte(self.rate - 1, 0x80);
        self.pos = self.rate;
    }

    /// Squeezes `out.len() / rate` complete blocks, permuting once per block. Always starts
    /// on a fresh block, so any bytes left over from a prior `squeeze()` are skipped.
    pub(crate) fn squeeze_blocks(&mut self, out: &mut [u8]) {
        debug_assert_eq!(out.len() % self.rate, 0, "Keccak: partial block requested");
        for block in out.chunks_exact_mut(self.rate) {
            keccak_f1600(&mut self.s);
            for (i, b) in block.iter_mut().enumerate() {
                *b = self.get_byte(i);
            }
        }
        self.pos = self.rate;
    }

    /// Squeezes an arbitrary number of bytes, continuing from the current cursor.
    pub(crate) fn squeeze(&mut self, out: &mut [u8]) {
        for b in out.iter_mut() {
            if self.pos == self.rate {
                keccak_f1600(&mut self.s);
                self.pos = 0;
            }
            *b = self.get_byte(self.pos);
            self.pos += 1;
        }
    }
}


/// Runs the byte-string segments in `v` through SHAKE128 and returns the finalized sponge,
/// ready for squeezing.
pub(crate) fn shake128(v: &[&[u8]]) -> KeccakState {
    let mut state = KeccakState::new(SHAKE128_RATE);
    v.iter().for_each(|b| state.absorb(b));
    state.finalize();
    state
}


/// Runs the byte-string segments in `v` through SHAKE256 and returns the finalized sponge,
/// ready for squeezing.
pub(crate) fn shake256(v: &[&[u8]]) -> KeccakState {
    let mut state = KeccakState::new(SHAKE256_RATE);
    v.iter().for_each(|b| state.absorb(b));
    state.finalize();
    state
}


/// `out ← SHAKE256(v[0] || v[1] || ..., out.len())`
pub(crate) fn shake256_into(out: &mut [u8], v: &[&[u8]]) {
    let mut state = shake256(v);
    state.squeeze(out);
    state.zeroize();
}


/// Stream initializer for matrix expansion: SHAKE128 over `seed || nonce` (little endian).
pub(crate) fn shake128_stream_init(seed: &[u8; 32], nonce: u16) -> KeccakState {
    shake128(&[seed, &nonce.to_le_bytes()])
}


/// Stream initializer for secret and mask expansion: SHAKE256 over `seed || nonce` (little endian).
pub(crate) fn shake256_stream_init(seed: &[u8; 64], nonce: u16) -> KeccakState {
    shake256(&[seed, &nonce.to_le_bytes()])
}


#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, RngCore};
    use sha3::digest::{ExtendableOutput, Update, XofReader};
    use sha3::{Shake128, Shake256};

    #[test]
    fn test_empty_known_answers() {
        let mut out = [0u8; 32];
        shake128(&[]).squeeze(&mut out);
        assert_eq!(
            hex::encode(out),
            "7f9c2ba4e88f827d616045507605853ed73b8093f6efbc88eb1a6eacfa66ef26"
        );

        let mut out = [0u8; 64];
        shake256_into(&mut out, &[]);
        assert_eq!(
            hex::encode(out),
            "46b9dd2b0ba88d13233b3feb743eeb243fcd52ea62b81b82b50c27646ed5762f\
             d75dc4ddd8c0f200cb05019d67b592f6fc821c49479ab48640292eacb3b7c4be"
        );
    }

    #[test]
    fn test_shake256_against_sha3() {
        let mut rng = rand::thread_rng();
        // lengths straddling the rate boundary matter most
        for len in [0usize, 1, 135, 136, 137, 271, 272, 273, 1000] {
            let mut msg = alloc::vec![0u8; len];
            rng.fill_bytes(&mut msg);
            let split = if len == 0 { 0 } else { rng.gen_range(0..len) };

            let mut expected = [0u8; 500];
            let mut hasher = Shake256::default();
            hasher.update(&msg);
            hasher.finalize_xof().read(&mut expected);

            let mut actual = [0u8; 500];
            shake256(&[&msg[..split], &msg[split..]]).squeeze(&mut actual);
            assert_eq!(expected, actual, "len {len}");
        }
    }

    #[test]
    fn test_shake128_blocks_against_sha3() {
        let mut seed = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut seed);
        let nonce = 0x0102u16;

        let mut expected = [0u8; 5 * SHAKE128_RATE];
        let mut hasher = Shake128::default();
        hasher.update(&seed);
        hasher.update(&[0x02, 0x01]);
        hasher.finalize_xof().read(&mut expected);

        let mut state = shake128_stream_init(&seed, nonce);
        let mut actual = [0u8; 5 * SHAKE128_RATE];
        state.squeeze_blocks(&mut actual[..3 * SHAKE128_RATE]);
        state.squeeze_blocks(&mut actual[3 * SHAKE128_RATE..]);
        assert_eq!(expected, actual);
    }

    #[test]
    fn test_squeeze_in_pieces() {
        let seed = [0x5Au8; 64];
        let mut whole = [0u8; 3 * SHAKE256_RATE];
        shake256_stream_init(&seed, 7).squeeze_blocks(&mut whole);

        let mut state = shake256_stream_init(&seed, 7);
        let mut pieces = [0u8; 3 * SHAKE256_RATE];
        let (a, rest) = pieces.split_at_mut(5);
        let (b, c) = rest.split_at_mut(200);
        state.squeeze(a);
        state.squeeze(b);
        state.squeeze(c);
        assert_eq!(whole, pieces);
    }

    #[test]
    fn test_permutation_of_zero_state() {
        // First lane of Keccak-f[1600] applied to the all-zero state
        let mut a = [0u64; PLEN];
        keccak_f1600(&mut a);
        assert_eq!(a[0], 0xF125_8F79_40E1_DDE7);
        assert_eq!(a[1], 0x84D5_CCF9_33C0_478A);
    }
}
