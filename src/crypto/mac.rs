//! XSM3 integrity functions
//!
//! Implements the salted DES CBC-MAC that authenticates each handshake
//! message, the authentication check response (ACR), and the SHA-1 content
//! hash that keys the first verify round.

use sha1::{Digest, Sha1};

use super::tables::{REFERENCE_PLAINTEXT, SBOX};
use super::tdes::{self, CryptMode, BLOCK_LEN, KEY_LEN};
use super::parve;
use crate::error::CryptoError;

/// Length of a MAC or ACR value
pub const MAC_LEN: usize = 8;

/// Length of the salt carried between MAC computations
pub const SALT_LEN: usize = 8;

/// Length of the identification descriptor the ACR is bound to
pub const DESCRIPTOR_LEN: usize = 32;

/// Bytes of the reference plaintext folded into each ACR
const ACR_PLAINTEXT_LEN: usize = 0x80;

/// Which side of the exchange a MAC is computed for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacMode {
    /// Salted MAC: increments the salt and seeds the chain with it
    Generate,
    /// Unsalted MAC finalized with the triple-keyed CBC
    Verify,
}

/// Output of [`authentication_mac`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MacResult {
    /// The salt after this computation (incremented when generating)
    pub salt: Option<[u8; SALT_LEN]>,
    /// The 8-byte MAC
    pub mac: [u8; MAC_LEN],
}

/// Keyed CBC-MAC with salt rollover
///
/// The key splits into DES subkeys `A = key[..8]` and `B = key[8..]`. When
/// generating with a salt, the salt is incremented as a big-endian u64 and
/// `E_A(salt + 1)` seeds the chain; otherwise the chain starts at zero.
pub fn authentication_mac(
    key: &[u8; KEY_LEN],
    salt: Option<&[u8; SALT_LEN]>,
    data: &[u8],
    mode: MacMode,
) -> Result<MacResult, CryptoError> {
    if data.len() % BLOCK_LEN != 0 {
        return Err(CryptoError::InvalidLength {
            expected_multiple: BLOCK_LEN,
            got: data.len(),
        });
    }

    let (a, b) = split_key(key);
    let mut out_salt = salt.copied();
    let mut chain = [0u8; BLOCK_LEN];

    if mode == MacMode::Generate {
        if let Some(salt) = salt {
            let next = u64::from_be_bytes(*salt).wrapping_add(1).to_be_bytes();
            chain = tdes::des_encrypt(&a, &next);
            out_salt = Some(next);
        }
    }

    for chunk in data.chunks_exact(BLOCK_LEN) {
        let folded = (u64::from_be_bytes(chain) ^ read_u64(chunk)).to_be_bytes();
        chain = match mode {
            MacMode::Generate => tdes::des_encrypt(&a, &folded),
            // Verification re-derives the first subkey for every block
            MacMode::Verify => {
                let (subkey, _) = split_key(key);
                tdes::des_encrypt(&subkey, &folded)
            }
        };
    }

    chain[0] ^= 0x80;

    let mac = match mode {
        MacMode::Generate => {
            let step = tdes::des_encrypt(&a, &chain);
            let step = tdes::des_decrypt(&b, &step);
            tdes::des_encrypt(&a, &step)
        }
        MacMode::Verify => tdes::authentication_crypt_fixed(key, &chain, CryptMode::Encrypt)?,
    };

    tracing::trace!(?mode, salt = ?out_salt, "mac: {:02x?}", mac);

    Ok(MacResult {
        salt: out_salt,
        mac,
    })
}

/// Authentication check response
///
/// Binds an 8-byte session key, the peer certificate fragment and the
/// identification descriptor into an 8-byte value.
pub fn authentication_acr(
    key: &[u8; 8],
    cert: &[u8; 8],
    descriptor: &[u8; DESCRIPTOR_LEN],
) -> Result<[u8; MAC_LEN], CryptoError> {
    let mut block = [0u8; 8];
    block[..4].copy_from_slice(&descriptor[..4]);
    block[4..].copy_from_slice(&cert[..4]);

    let mut iv_block = [0u8; 8];
    iv_block.copy_from_slice(&descriptor[16..24]);
    let iv = parve::encrypt_block(key, &SBOX, &iv_block);

    let cd = parve::encrypt_block(key, &SBOX, &block);
    let plaintext = &REFERENCE_PLAINTEXT[..ACR_PLAINTEXT_LEN];
    let ab = parve::cbc_mac(key, &SBOX, &iv, plaintext)?;
    let output = parve::chain_and_sum(&cd, &ab, plaintext)?;

    Ok((u64::from_be_bytes(output) ^ u64::from_be_bytes(ab)).to_be_bytes())
}

/// SHA-1 over a decrypted message, truncated to a MAC key
pub fn content_hash(data: &[u8]) -> [u8; KEY_LEN] {
    let digest = Sha1::digest(data);
    let mut key = [0u8; KEY_LEN];
    key.copy_from_slice(&digest[..KEY_LEN]);
    key
}

fn split_key(key: &[u8; KEY_LEN]) -> ([u8; 8], [u8; 8]) {
    let mut a = [0u8; 8];
    let mut b = [0u8; 8];
    a.copy_from_slice(&key[..8]);
    b.copy_from_slice(&key[8..]);
    (a, b)
}

fn read_u64(chunk: &[u8]) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(chunk);
    u64::from_be_bytes(word)
}
