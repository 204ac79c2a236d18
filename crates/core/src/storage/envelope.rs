use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::errors::CoreError;

/// Magic bytes identifying a sealed Ji-bajeti value.
pub const MAGIC: &[u8; 4] = b"JBPV";

/// Current envelope version.
pub const CURRENT_VERSION: u16 = 1;

/// magic(4) + version(2) + kdf_params(12) + salt(16) + nonce(12) + ciphertext_len(8)
pub const HEADER_SIZE: usize = 54;

const SALT_LEN: usize = 16;
const NONCE_LEN: usize = 12;
const KEY_LEN: usize = 32;

/// Argon2id cost parameters, carried in every envelope so they can be raised later.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory cost in KiB
    pub memory_cost: u32,
    pub time_cost: u32,
    pub parallelism: u32,
}

impl Default for KdfParams {
    /// 19 MiB, 2 passes, 1 lane: light enough for a phone browser.
    fn default() -> Self {
        Self {
            memory_cost: 19_456,
            time_cost: 2,
            parallelism: 1,
        }
    }
}

impl KdfParams {
    /// Reject parameters outside the range this library will ever write,
    /// so a crafted envelope cannot make key derivation exhaust memory or CPU.
    pub fn check_bounds(&self) -> Result<(), CoreError> {
        if !(8..=1_048_576).contains(&self.memory_cost) {
            return Err(CoreError::InvalidFileFormat(format!(
                "KDF memory_cost out of range: {} KiB (expected 8..=1048576)",
                self.memory_cost
            )));
        }
        if !(1..=20).contains(&self.time_cost) {
            return Err(CoreError::InvalidFileFormat(format!(
                "KDF time_cost out of range: {} (expected 1..=20)",
                self.time_cost
            )));
        }
        if !(1..=16).contains(&self.parallelism) {
            return Err(CoreError::InvalidFileFormat(format!(
                "KDF parallelism out of range: {} (expected 1..=16)",
                self.parallelism
            )));
        }
        Ok(())
    }

    fn derive_key(&self, password: &str, salt: &[u8; SALT_LEN]) -> Result<[u8; KEY_LEN], CoreError> {
        let params = Params::new(self.memory_cost, self.time_cost, self.parallelism, Some(KEY_LEN))
            .map_err(|e| CoreError::Encryption(format!("Invalid Argon2 params: {e}")))?;
        let mut key = [0u8; KEY_LEN];
        Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
            .hash_password_into(password.as_bytes(), salt, &mut key)
            .map_err(|e| CoreError::Encryption(format!("Argon2 key derivation failed: {e}")))?;
        Ok(key)
    }
}

/// A password-sealed value: Argon2id-derived key, AES-256-GCM ciphertext.
///
/// Byte layout (integers little-endian):
/// ```text
/// [JBPV: 4B] [version: 2B] [memory_cost: 4B] [time_cost: 4B] [parallelism: 4B]
/// [salt: 16B] [nonce: 12B] [ciphertext_len: 8B] [ciphertext + GCM tag]
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedEnvelope {
    pub version: u16,
    pub kdf_params: KdfParams,
    pub salt: [u8; SALT_LEN],
    pub nonce: [u8; NONCE_LEN],
    pub ciphertext: Vec<u8>,
}

impl SealedEnvelope {
    /// Encrypt `plaintext` under `password` with default KDF costs.
    pub fn seal(plaintext: &[u8], password: &str) -> Result<Self, CoreError> {
        Self::seal_with(plaintext, password, KdfParams::default())
    }

    /// Encrypt with explicit KDF costs. A fresh salt and nonce are drawn every call.
    pub fn seal_with(plaintext: &[u8], password: &str, kdf_params: KdfParams) -> Result<Self, CoreError> {
        kdf_params.check_bounds()?;
        let salt = random_bytes::<SALT_LEN>()?;
        let nonce = random_bytes::<NONCE_LEN>()?;
        let key = kdf_params.derive_key(password, &salt)?;

        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| CoreError::Encryption(format!("Failed to create cipher: {e}")))?;
        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|e| CoreError::Encryption(format!("Encryption failed: {e}")))?;

        Ok(Self {
            version: CURRENT_VERSION,
            kdf_params,
            salt,
            nonce,
            ciphertext,
        })
    }

    /// Decrypt and authenticate. A wrong password or any tampering yields
    /// `CoreError::Decryption`.
    pub fn open(&self, password: &str) -> Result<Vec<u8>, CoreError> {
        let key = self.kdf_params.derive_key(password, &self.salt)?;
        let cipher = Aes256Gcm::new_from_slice(&key)
            .map_err(|e| CoreError::Encryption(format!("Failed to create cipher: {e}")))?;
        Ok(cipher.decrypt(Nonce::from_slice(&self.nonce), self.ciphertext.as_slice())?)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(HEADER_SIZE + self.ciphertext.len());
        buf.extend_from_slice(MAGIC);
        buf.extend_from_slice(&self.version.to_le_bytes());
        buf.extend_from_slice(&self.kdf_params.memory_cost.to_le_bytes());
        buf.extend_from_slice(&self.kdf_params.time_cost.to_le_bytes());
        buf.extend_from_slice(&self.kdf_params.parallelism.to_le_bytes());
        buf.extend_from_slice(&self.salt);
        buf.extend_from_slice(&self.nonce);
        buf.extend_from_slice(&(self.ciphertext.len() as u64).to_le_bytes());
        buf.extend_from_slice(&self.ciphertext);
        buf
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, CoreError> {
        if data.len() < HEADER_SIZE {
            return Err(CoreError::InvalidFileFormat(
                "Data too small to be a sealed value".into(),
            ));
        }
        let mut reader = Reader { data, offset: 0 };

        if reader.take::<4>()? != *MAGIC {
            return Err(CoreError::InvalidFileFormat(
                "Invalid magic bytes — not a sealed value".into(),
            ));
        }

        let version = u16::from_le_bytes(reader.take::<2>()?);
        if version == 0 || version > CURRENT_VERSION {
            return Err(CoreError::UnsupportedVersion(version));
        }

        let kdf_params = KdfParams {
            memory_cost: u32::from_le_bytes(reader.take::<4>()?),
            time_cost: u32::from_le_bytes(reader.take::<4>()?),
            parallelism: u32::from_le_bytes(reader.take::<4>()?),
        };
        kdf_params.check_bounds()?;

        let salt = reader.take::<SALT_LEN>()?;
        let nonce = reader.take::<NONCE_LEN>()?;
        let ciphertext_len = u64::from_le_bytes(reader.take::<8>()?);

        let remaining = reader.remaining();
        if (remaining.len() as u64) < ciphertext_len {
            return Err(CoreError::InvalidFileFormat(format!(
                "Sealed value truncated: expected {} bytes of ciphertext, got {}",
                ciphertext_len,
                remaining.len()
            )));
        }

        Ok(Self {
            version,
            kdf_params,
            salt,
            nonce,
            ciphertext: remaining[..ciphertext_len as usize].to_vec(),
        })
    }

    /// Cheap check for whether stored bytes look like an envelope.
    pub fn is_sealed(data: &[u8]) -> bool {
        data.len() >= HEADER_SIZE && data.starts_with(MAGIC)
    }
}

struct Reader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    fn take<const N: usize>(&mut self) -> Result<[u8; N], CoreError> {
        let end = self.offset + N;
        let bytes: [u8; N] = self
            .data
            .get(self.offset..end)
            .and_then(|s| s.try_into().ok())
            .ok_or_else(|| CoreError::InvalidFileFormat("Unexpected end of header".into()))?;
        self.offset = end;
        Ok(bytes)
    }

    fn remaining(&self) -> &'a [u8] {
        &self.data[self.offset..]
    }
}

fn random_bytes<const N: usize>() -> Result<[u8; N], CoreError> {
    let mut buf = [0u8; N];
    getrandom::getrandom(&mut buf)
        .map_err(|e| CoreError::Encryption(format!("Failed to gather randomness: {e}")))?;
    Ok(buf)
}
