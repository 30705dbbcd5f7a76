use crate::charset::ClassSet;
use crate::validation::PasswordLength;
use blake2::{Blake2s256, Digest};
use chacha20::ChaCha20;
use chacha20::cipher::{KeyIvInit, StreamCipher};
use log::debug;
use rand::{Rng, RngCore};
use thiserror::Error;
use zeroize::Zeroizing;

const KEYSTREAM_BUFFER_LEN: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GenerateError {
    #[error("No character class selected")]
    NoCharacterClass,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationRequest {
    pub length: PasswordLength,
    pub classes: ClassSet,
}

impl GenerationRequest {
    pub fn new(length: PasswordLength, classes: ClassSet) -> Self {
        Self { length, classes }
    }
}

/// Draws `request.length` characters uniformly, with replacement, from the
/// alphabet of the enabled classes.
pub fn generate<R: Rng + ?Sized>(
    request: &GenerationRequest,
    rng: &mut R,
) -> Result<Zeroizing<String>, GenerateError> {
    let alphabet = request.classes.alphabet();
    if alphabet.is_empty() {
        return Err(GenerateError::NoCharacterClass);
    }

    debug!(
        "generating {} chars from {} classes ({} symbols)",
        request.length,
        request.classes.len(),
        alphabet.len()
    );

    let mut password = Zeroizing::new(String::with_capacity(request.length.get()));
    for _ in 0..request.length.get() {
        let index = rng.gen_range(0..alphabet.len());
        password.push(alphabet[index] as char);
    }

    Ok(password)
}

/// Entropy in bits of a password built from `request`; zero for an empty alphabet.
pub fn entropy_bits(request: &GenerationRequest) -> f64 {
    let size = request.classes.alphabet_size();
    if size == 0 {
        return 0.0;
    }
    request.length.get() as f64 * (size as f64).log2()
}

/// Reproducible random source: a ChaCha20 keystream keyed by the Blake2s
/// digest of a seed phrase.
pub struct Keystream {
    cipher: ChaCha20,
    buffer: Zeroizing<Vec<u8>>,
    pos: usize,
}

impl Keystream {
    pub fn new(key: &[u8; 32]) -> Self {
        let mut cipher = ChaCha20::new(key.into(), &[0u8; 12].into());
        let mut buffer = Zeroizing::new(vec![0u8; KEYSTREAM_BUFFER_LEN]);
        cipher.apply_keystream(&mut buffer);

        Self {
            cipher,
            buffer,
            pos: 0,
        }
    }

    pub fn from_seed_phrase(seed: &str) -> Self {
        let mut key = Zeroizing::new([0u8; 32]);
        key.copy_from_slice(&Blake2s256::digest(seed.as_bytes()));
        Self::new(&key)
    }

    fn next_byte(&mut self) -> u8 {
        if self.pos >= self.buffer.len() {
            self.buffer.fill(0);
            self.cipher.apply_keystream(&mut self.buffer);
            self.pos = 0;
        }

        let byte = self.buffer[self.pos];
        self.pos += 1;
        byte
    }
}

impl RngCore for Keystream {
    fn next_u32(&mut self) -> u32 {
        let mut bytes = [0u8; 4];
        self.fill_bytes(&mut bytes);
        u32::from_le_bytes(bytes)
    }

    fn next_u64(&mut self) -> u64 {
        let mut bytes = [0u8; 8];
        self.fill_bytes(&mut bytes);
        u64::from_le_bytes(bytes)
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for byte in dest.iter_mut() {
            *byte = self.next_byte();
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}
