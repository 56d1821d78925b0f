//! DES primitives for XSM3
//!
//! Single-block DES and the triple-keyed CBC mode the handshake uses for every
//! bulk encryption. A 16-byte key `K` is stretched to the 24-byte EDE3 key
//! `K || K[..8]`, so the first and third DES keys are equal.

use cbc::{Decryptor, Encryptor};
use des::cipher::{
    block_padding::NoPadding, generic_array::GenericArray, BlockDecrypt, BlockDecryptMut,
    BlockEncrypt, BlockEncryptMut, KeyInit, KeyIvInit,
};
use des::{Des, TdesEde3};

use crate::error::CryptoError;

/// DES block length
pub const BLOCK_LEN: usize = 8;

/// Length of a two-key triple-DES key as carried by the protocol
pub const KEY_LEN: usize = 16;

/// Length of the expanded EDE3 key
pub const EDE3_KEY_LEN: usize = 24;

type TdesCbcEnc = Encryptor<TdesEde3>;
type TdesCbcDec = Decryptor<TdesEde3>;

/// Direction of a triple-CBC operation
///
/// The discriminants are the protocol's mode flag (`1` = encrypt, `0` = decrypt).
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CryptMode {
    Decrypt = 0,
    Encrypt = 1,
}

impl From<u8> for CryptMode {
    fn from(value: u8) -> Self {
        if value == 1 {
            Self::Encrypt
        } else {
            Self::Decrypt
        }
    }
}

/// Encrypt one block with single DES
pub fn des_encrypt(key: &[u8; BLOCK_LEN], block: &[u8; BLOCK_LEN]) -> [u8; BLOCK_LEN] {
    let cipher = Des::new(GenericArray::from_slice(key));
    let mut buf = GenericArray::clone_from_slice(block);
    cipher.encrypt_block(&mut buf);

    let mut out = [0u8; BLOCK_LEN];
    out.copy_from_slice(&buf);
    out
}

/// Decrypt one block with single DES
pub fn des_decrypt(key: &[u8; BLOCK_LEN], block: &[u8; BLOCK_LEN]) -> [u8; BLOCK_LEN] {
    let cipher = Des::new(GenericArray::from_slice(key));
    let mut buf = GenericArray::clone_from_slice(block);
    cipher.decrypt_block(&mut buf);

    let mut out = [0u8; BLOCK_LEN];
    out.copy_from_slice(&buf);
    out
}

/// Stretch a 16-byte key to the 24-byte EDE3 key `(key || key)[..24]`
pub fn expand_key(key: &[u8; KEY_LEN]) -> [u8; EDE3_KEY_LEN] {
    let mut out = [0u8; EDE3_KEY_LEN];
    out[..KEY_LEN].copy_from_slice(key);
    out[KEY_LEN..].copy_from_slice(&key[..EDE3_KEY_LEN - KEY_LEN]);
    out
}

/// Copy a 16-byte key out of an arbitrary slice
pub fn key_from_slice(bytes: &[u8]) -> Result<[u8; KEY_LEN], CryptoError> {
    if bytes.len() != KEY_LEN {
        return Err(CryptoError::InvalidKeyLength {
            expected: KEY_LEN,
            got: bytes.len(),
        });
    }

    let mut key = [0u8; KEY_LEN];
    key.copy_from_slice(bytes);
    Ok(key)
}

/// Triple-keyed CBC with a zero IV
///
/// `data` must be a whole number of blocks; nothing is padded.
pub fn authentication_crypt(
    key: &[u8; KEY_LEN],
    data: &[u8],
    mode: CryptMode,
) -> Result<Vec<u8>, CryptoError> {
    if data.len() % BLOCK_LEN != 0 {
        return Err(CryptoError::InvalidLength {
            expected_multiple: BLOCK_LEN,
            got: data.len(),
        });
    }

    let key = expand_key(key);
    let key = GenericArray::from_slice(&key);
    let iv = GenericArray::from_slice(&[0u8; BLOCK_LEN]);

    match mode {
        CryptMode::Encrypt => {
            Ok(TdesCbcEnc::new(key, iv).encrypt_padded_vec_mut::<NoPadding>(data))
        }
        CryptMode::Decrypt => TdesCbcDec::new(key, iv)
            .decrypt_padded_vec_mut::<NoPadding>(data)
            .map_err(|_| CryptoError::InvalidLength {
                expected_multiple: BLOCK_LEN,
                got: data.len(),
            }),
    }
}

/// Triple-CBC on a buffer whose size is known at compile time
pub fn authentication_crypt_fixed<const N: usize>(
    key: &[u8; KEY_LEN],
    data: &[u8; N],
    mode: CryptMode,
) -> Result<[u8; N], CryptoError> {
    let out = authentication_crypt(key, data, mode)?;
    let mut fixed = [0u8; N];
    fixed.copy_from_slice(&out);
    Ok(fixed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::tables::{FIXED_SESSION_KEY_1, FIXED_SESSION_KEY_2};
    use proptest::prelude::*;

    #[test]
    fn test_expand_key() {
        let key: [u8; 16] = core::array::from_fn(|i| i as u8);
        let expanded = expand_key(&key);
        assert_eq!(&expanded[..16], &key);
        assert_eq!(&expanded[16..], &key[..8]);
    }

    #[test]
    fn test_crypt_known_answer() {
        let nonce: [u8; 16] = core::array::from_fn(|i| i as u8);
        let ciphertext =
            authentication_crypt(&FIXED_SESSION_KEY_1, &nonce, CryptMode::Encrypt).unwrap();
        assert_eq!(hex::encode(&ciphertext), "16123779e5b9f43dd2be1ce43fa2f6ef");
    }

    #[test]
    fn test_single_block_matches_ede() {
        // EDE with K1 = K3 = A and K2 = B over one zero-IV block
        let block = [0x5Au8; 8];
        let a: [u8; 8] = FIXED_SESSION_KEY_2[..8].try_into().unwrap();
        let b: [u8; 8] = FIXED_SESSION_KEY_2[8..].try_into().unwrap();
        let ede = des_encrypt(&a, &des_decrypt(&b, &des_encrypt(&a, &block)));

        let cbc = authentication_crypt(&FIXED_SESSION_KEY_2, &block, CryptMode::Encrypt).unwrap();
        assert_eq!(&cbc[..], &ede[..]);
    }

    #[test]
    fn test_des_roundtrip() {
        let key = [0x13u8, 0x34, 0x57, 0x79, 0x9B, 0xBC, 0xDF, 0xF1];
        let block = [0x01u8, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF];
        let ciphertext = des_encrypt(&key, &block);
        assert_eq!(hex::encode(ciphertext), "85e813540f0ab405");
        assert_eq!(des_decrypt(&key, &ciphertext), block);
    }

    #[test]
    fn test_rejects_partial_block() {
        let result = authentication_crypt(&[0u8; 16], &[0u8; 12], CryptMode::Decrypt);
        assert_eq!(
            result,
            Err(CryptoError::InvalidLength {
                expected_multiple: 8,
                got: 12
            })
        );
    }

    #[test]
    fn test_key_from_slice() {
        let bytes: Vec<u8> = (0..16).collect();
        assert_eq!(key_from_slice(&bytes).unwrap()[15], 15);
        assert_eq!(
            key_from_slice(&bytes[..10]),
            Err(CryptoError::InvalidKeyLength {
                expected: 16,
                got: 10
            })
        );
    }

    #[test]
    fn test_mode_flag() {
        assert_eq!(CryptMode::from(1), CryptMode::Encrypt);
        assert_eq!(CryptMode::from(0), CryptMode::Decrypt);
        assert_eq!(CryptMode::Encrypt as u8, 1);
    }

    proptest! {
        #[test]
        fn crypt_roundtrip(key in any::<[u8; 16]>(), blocks in prop::collection::vec(any::<[u8; 8]>(), 0..6)) {
            let data: Vec<u8> = blocks.concat();
            let ciphertext = authentication_crypt(&key, &data, CryptMode::Encrypt).unwrap();
            prop_assert_eq!(ciphertext.len(), data.len());
            let plaintext = authentication_crypt(&key, &ciphertext, CryptMode::Decrypt).unwrap();
            prop_assert_eq!(plaintext, data);
        }
    }
}
