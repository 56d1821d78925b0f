//! Device key sources

use std::path::Path;

use crate::crypto::tdes::{self, KEY_LEN};
use crate::error::ConfigError;
use crate::protocol::DeviceKeyPair;

use super::{KEYVAULT_K1_OFFSET, KEYVAULT_K2_OFFSET, KEYVAULT_MIN_SIZE};

/// Device keys for one console
#[derive(Debug, Clone)]
pub struct KeyVault {
    keys: DeviceKeyPair,
}

impl KeyVault {
    /// Load keys from a decrypted key vault dump
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let blob = std::fs::read(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                ConfigError::Io(e)
            }
        })?;
        Self::from_bytes(&blob)
    }

    /// Read `k1` and `k2` from their fixed offsets in a key vault blob
    pub fn from_bytes(blob: &[u8]) -> Result<Self, ConfigError> {
        if blob.len() < KEYVAULT_MIN_SIZE {
            return Err(ConfigError::InvalidKeyVault { size: blob.len() });
        }

        let slot = |offset: usize, field: &str| {
            tdes::key_from_slice(&blob[offset..offset + KEY_LEN]).map_err(|_| {
                ConfigError::InvalidKey {
                    field: field.to_string(),
                }
            })
        };

        let k1 = slot(KEYVAULT_K1_OFFSET, "k1")?;
        let k2 = slot(KEYVAULT_K2_OFFSET, "k2")?;
        tracing::debug!("Loaded device keys from {}-byte key vault", blob.len());

        Ok(Self {
            keys: DeviceKeyPair::new(k1, k2),
        })
    }

    /// Build from two hex-encoded keys
    pub fn from_hex(key1: &str, key2: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            keys: DeviceKeyPair::new(parse_hex_key(key1, "key1")?, parse_hex_key(key2, "key2")?),
        })
    }

    pub fn device_keys(&self) -> DeviceKeyPair {
        self.keys.clone()
    }
}

/// Parse a 16-byte key written as 32 hex digits
pub fn parse_hex_key(value: &str, field_name: &str) -> Result<[u8; KEY_LEN], ConfigError> {
    let invalid = || ConfigError::InvalidKey {
        field: field_name.to_string(),
    };

    let bytes = hex::decode(value.trim()).map_err(|_| invalid())?;
    tdes::key_from_slice(&bytes).map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sample_vault() -> Vec<u8> {
        let mut blob = vec![0u8; KEYVAULT_MIN_SIZE];
        for i in 0..KEY_LEN {
            blob[KEYVAULT_K1_OFFSET + i] = 0x10 + i as u8;
            blob[KEYVAULT_K2_OFFSET + i] = 0x80 + i as u8;
        }
        blob
    }

    #[test]
    fn test_from_bytes_offsets() {
        let keys = KeyVault::from_bytes(&sample_vault()).unwrap().device_keys();
        assert_eq!(keys.k1[0], 0x10);
        assert_eq!(keys.k1[15], 0x1F);
        assert_eq!(keys.k2[0], 0x80);
        assert_eq!(keys.k2[15], 0x8F);
    }

    #[test]
    fn test_short_vault() {
        let result = KeyVault::from_bytes(&[0u8; 0x100]);
        assert!(matches!(
            result,
            Err(ConfigError::InvalidKeyVault { size: 0x100 })
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&sample_vault()).unwrap();

        let keys = KeyVault::from_file(file.path()).unwrap().device_keys();
        assert_eq!(keys.k2[1], 0x81);
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = KeyVault::from_file(dir.path().join("kv.bin"));
        assert!(matches!(result, Err(ConfigError::FileNotFound { .. })));
    }

    #[test]
    fn test_parse_hex_key() {
        let key = parse_hex_key("000102030405060708090a0b0c0d0e0F", "key1").unwrap();
        assert_eq!(key[15], 0x0F);

        let vault = KeyVault::from_hex(
            " 00112233445566778899aabbccddeeff ",
            "ffeeddccbbaa99887766554433221100",
        )
        .unwrap();
        assert_eq!(vault.device_keys().k2[0], 0xFF);
    }

    #[test]
    fn test_invalid_hex_key() {
        let result = parse_hex_key("not-hex", "key1");
        assert!(matches!(result, Err(ConfigError::InvalidKey { field }) if field == "key1"));

        let result = parse_hex_key("0011223344", "key2");
        assert!(matches!(result, Err(ConfigError::InvalidKey { field }) if field == "key2"));
    }
}
