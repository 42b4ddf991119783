//! Sealed store format
//!
//! The tree is serialized to JSON and encrypted with AES-256-GCM under a key
//! derived with Argon2id from the credential's composite key.
//!
//! Layout:
//!
//! ```text
//! magic "KWDB1" | m_cost u32 | t_cost u32 | p_cost u32 | salt [32] | nonce [12] | ciphertext + tag
//! ```
//!
//! Integers are little endian. Everything before the ciphertext is
//! authenticated as associated data, so the recorded KDF cost cannot be
//! altered without failing decryption.

use std::io::{Read, Write};

use argon2::{Algorithm, Argon2, Params, Version};
use ring::aead::{AES_256_GCM, Aad, LessSafeKey, Nonce, UnboundKey};
use ring::rand::{SecureRandom, SystemRandom};
use tracing::debug;
use zeroize::Zeroizing;

use crate::config::StoreSettings;
use crate::error::{FormatError, FormatResult};
use crate::models::CredentialValue;

use super::tree::{CompositeKey, FORMAT_VERSION, StoreDocument, TreeHandle};
use super::{StatusLogger, StoreFormat};

/// Magic bytes identifying a sealed store
pub const MAGIC: &[u8] = b"KWDB1";

const SALT_LEN: usize = 32;
const NONCE_LEN: usize = 12;
const HEADER_LEN: usize = MAGIC.len() + 12 + SALT_LEN + NONCE_LEN;

/// Upper bound on the KDF memory cost (1 GiB)
const MAX_MEMORY_KIB: u32 = 1024 * 1024;
/// Upper bound on the KDF iteration count
const MAX_ITERATIONS: u32 = 64;
/// Upper bound on the KDF lane count
const MAX_PARALLELISM: u32 = 16;

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KdfParams {
    /// Memory in KiB
    pub memory_kib: u32,
    /// Iterations
    pub iterations: u32,
    /// Lanes
    pub parallelism: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        // Use lighter parameters for faster unit tests
        #[cfg(test)]
        let settings = StoreSettings {
            kdf_memory_kib: 4096,
            kdf_iterations: 2,
            kdf_parallelism: 1,
        };

        #[cfg(not(test))]
        let settings = StoreSettings::default();

        Self::from(&settings)
    }
}

impl From<&StoreSettings> for KdfParams {
    fn from(settings: &StoreSettings) -> Self {
        Self {
            memory_kib: settings.kdf_memory_kib,
            iterations: settings.kdf_iterations,
            parallelism: settings.kdf_parallelism,
        }
    }
}

impl KdfParams {
    /// Checks the cost against the supported bounds
    ///
    /// # Errors
    /// Returns a description of the first value out of range.
    pub fn check_bounds(self) -> Result<(), String> {
        if self.memory_kib > MAX_MEMORY_KIB {
            return Err(format!(
                "KDF memory cost {} KiB exceeds {MAX_MEMORY_KIB} KiB",
                self.memory_kib
            ));
        }
        if self.iterations > MAX_ITERATIONS {
            return Err(format!(
                "KDF iteration count {} exceeds {MAX_ITERATIONS}",
                self.iterations
            ));
        }
        if self.parallelism > MAX_PARALLELISM {
            return Err(format!(
                "KDF lane count {} exceeds {MAX_PARALLELISM}",
                self.parallelism
            ));
        }
        Ok(())
    }

    fn derive_key(
        self,
        composite: &[u8],
        salt: &[u8],
    ) -> Result<Zeroizing<[u8; 32]>, argon2::Error> {
        let params = Params::new(self.memory_kib, self.iterations, self.parallelism, Some(32))?;
        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

        let mut key = Zeroizing::new([0u8; 32]);
        argon2.hash_password_into(composite, salt, &mut key[..])?;
        Ok(key)
    }
}

/// JSON tree sealed with AES-256-GCM
#[derive(Debug, Clone, Copy, Default)]
pub struct SealedFormat {
    kdf: KdfParams,
}

impl SealedFormat {
    /// Creates a format writing stores with the given KDF cost
    #[must_use]
    pub const fn with_kdf(kdf: KdfParams) -> Self {
        Self { kdf }
    }

    /// KDF cost used for saving
    #[must_use]
    pub const fn kdf(&self) -> KdfParams {
        self.kdf
    }
}

fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(buf)
}

fn seal(plaintext: &[u8], composite: &[u8], kdf: KdfParams) -> FormatResult<Vec<u8>> {
    kdf.check_bounds().map_err(FormatError::Serialize)?;

    let rng = SystemRandom::new();
    let mut salt = [0u8; SALT_LEN];
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill(&mut salt)
        .map_err(|_| FormatError::Serialize("Failed to generate salt".to_string()))?;
    rng.fill(&mut nonce_bytes)
        .map_err(|_| FormatError::Serialize("Failed to generate nonce".to_string()))?;

    let mut output = Vec::with_capacity(HEADER_LEN + plaintext.len() + AES_256_GCM.tag_len());
    output.extend_from_slice(MAGIC);
    output.extend_from_slice(&kdf.memory_kib.to_le_bytes());
    output.extend_from_slice(&kdf.iterations.to_le_bytes());
    output.extend_from_slice(&kdf.parallelism.to_le_bytes());
    output.extend_from_slice(&salt);
    output.extend_from_slice(&nonce_bytes);

    let key = kdf
        .derive_key(composite, &salt)
        .map_err(|e| FormatError::Serialize(format!("Invalid KDF settings: {e}")))?;
    let sealing_key = LessSafeKey::new(
        UnboundKey::new(&AES_256_GCM, &key[..])
            .map_err(|_| FormatError::Serialize("Failed to create key".to_string()))?,
    );

    let mut ciphertext = plaintext.to_vec();
    sealing_key
        .seal_in_place_append_tag(
            Nonce::assume_unique_for_key(nonce_bytes),
            Aad::from(&output[..HEADER_LEN]),
            &mut ciphertext,
        )
        .map_err(|_| FormatError::Serialize("Encryption failed".to_string()))?;

    output.extend_from_slice(&ciphertext);
    Ok(output)
}

fn unseal(data: &[u8], composite: &[u8]) -> FormatResult<Zeroizing<Vec<u8>>> {
    if !data.starts_with(MAGIC) {
        return Err(FormatError::Corrupt("Not a Keywarden store".to_string()));
    }
    if data.len() < HEADER_LEN + AES_256_GCM.tag_len() {
        return Err(FormatError::Corrupt("Store is truncated".to_string()));
    }

    let kdf = KdfParams {
        memory_kib: read_u32(data, MAGIC.len()),
        iterations: read_u32(data, MAGIC.len() + 4),
        parallelism: read_u32(data, MAGIC.len() + 8),
    };
    // The header is not authenticated until the key exists
    kdf.check_bounds().map_err(FormatError::Corrupt)?;
    let salt_start = MAGIC.len() + 12;
    let salt = &data[salt_start..salt_start + SALT_LEN];
    let mut nonce_bytes = [0u8; NONCE_LEN];
    nonce_bytes.copy_from_slice(&data[salt_start + SALT_LEN..HEADER_LEN]);

    let key = kdf
        .derive_key(composite, salt)
        .map_err(|e| FormatError::Corrupt(format!("Invalid KDF parameters: {e}")))?;
    let opening_key = LessSafeKey::new(
        UnboundKey::new(&AES_256_GCM, &key[..])
            .map_err(|_| FormatError::Corrupt("Failed to create key".to_string()))?,
    );

    let mut plaintext = Zeroizing::new(data[HEADER_LEN..].to_vec());
    let len = opening_key
        .open_in_place(
            Nonce::assume_unique_for_key(nonce_bytes),
            Aad::from(&data[..HEADER_LEN]),
            &mut plaintext[..],
        )
        .map_err(|_| FormatError::WrongCredential)?
        .len();
    plaintext.truncate(len);
    Ok(plaintext)
}

impl StoreFormat for SealedFormat {
    fn open(&self, reader: &mut dyn Read, credential: CredentialValue) -> FormatResult<TreeHandle> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;

        let key = CompositeKey::from_credential(&credential)?;
        drop(credential);

        let plaintext = unseal(&data, key.as_bytes())?;
        let document: StoreDocument = serde_json::from_slice(&plaintext)
            .map_err(|e| FormatError::Corrupt(format!("Invalid store contents: {e}")))?;
        if document.format_version > FORMAT_VERSION {
            return Err(FormatError::Corrupt(format!(
                "Unsupported store version {}",
                document.format_version
            )));
        }

        debug!(store = %document.name, "Store opened");
        Ok(TreeHandle::from_parts(document, key))
    }

    fn save(
        &self,
        writer: &mut dyn Write,
        tree: &TreeHandle,
        status: &dyn StatusLogger,
    ) -> FormatResult<()> {
        status.start("Saving");

        let plaintext = Zeroizing::new(
            serde_json::to_vec(tree.document())
                .map_err(|e| FormatError::Serialize(e.to_string()))?,
        );
        status.progress(50);

        let sealed = seal(&plaintext, tree.key().as_bytes(), self.kdf)?;
        writer.write_all(&sealed)?;
        writer.flush()?;

        status.progress(100);
        status.end();
        Ok(())
    }
}
