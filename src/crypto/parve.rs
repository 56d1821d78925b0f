//! Parve substitution cipher and chain-and-sum combiner
//!
//! Both are used only for the authentication check response (ACR).

use crate::error::CryptoError;

/// Parve block length
pub const BLOCK_LEN: usize = 8;

/// Modulus of the chain-and-sum arithmetic (2^31 - 1)
const CHAIN_MODULUS: u64 = 0x7FFF_FFFF;

/// Encrypt one 8-byte block with Parve
pub fn encrypt_block(key: &[u8; 8], sbox: &[u8; 256], input: &[u8; 8]) -> [u8; 8] {
    let mut block = [0u8; 9];
    block[..8].copy_from_slice(input);
    block[8] = block[0];

    for round in (1..=8u8).rev() {
        for j in 0..8 {
            let x = key[j].wrapping_add(block[j]).wrapping_add(round);
            let y = sbox[x as usize].wrapping_add(block[j + 1]);
            block[j + 1] = y.rotate_left(1);
        }
        block[0] = block[8];
    }

    let mut out = [0u8; 8];
    out.copy_from_slice(&block[..8]);
    out
}

/// Parve in ECB mode over a whole number of blocks
pub fn ecb(key: &[u8; 8], sbox: &[u8; 256], data: &[u8]) -> Result<Vec<u8>, CryptoError> {
    check_blocks(data)?;

    let mut out = Vec::with_capacity(data.len());
    for chunk in data.chunks_exact(BLOCK_LEN) {
        let mut block = [0u8; BLOCK_LEN];
        block.copy_from_slice(chunk);
        out.extend_from_slice(&encrypt_block(key, sbox, &block));
    }
    Ok(out)
}

/// Parve CBC-MAC seeded with `iv`
pub fn cbc_mac(
    key: &[u8; 8],
    sbox: &[u8; 256],
    iv: &[u8; 8],
    data: &[u8],
) -> Result<[u8; 8], CryptoError> {
    check_blocks(data)?;

    let mut chain = *iv;
    for chunk in data.chunks_exact(BLOCK_LEN) {
        let folded = u64::from_be_bytes(chain) ^ read_u64(chunk);
        chain = encrypt_block(key, sbox, &folded.to_be_bytes());
    }
    Ok(chain)
}

/// Chain-and-sum MAC over 32-bit big-endian words
///
/// `cd` keys the even words and `ab` the odd words; the output is the final
/// chain value followed by the running sum, both reduced mod 2^31 - 1.
pub fn chain_and_sum(cd: &[u8; 8], ab: &[u8; 8], data: &[u8]) -> Result<[u8; 8], CryptoError> {
    check_blocks(data)?;

    let [cd0, cd1] = split_words(cd);
    let [ab0, ab1] = split_words(ab);

    let mut chain = 0u64;
    let mut sum = 0u64;
    for chunk in data.chunks_exact(BLOCK_LEN) {
        let [x0, x1] = split_words(chunk);

        let t = ((x0 + chain) * cd0 + cd1) % CHAIN_MODULUS;
        sum += t;
        chain = ((x1 + t) * ab0 + ab1) % CHAIN_MODULUS;
        sum += chain;
    }

    let mut out = [0u8; 8];
    out[..4].copy_from_slice(&(chain as u32).to_be_bytes());
    out[4..].copy_from_slice(&((sum % CHAIN_MODULUS) as u32).to_be_bytes());
    Ok(out)
}

fn split_words(bytes: &[u8]) -> [u64; 2] {
    let hi = u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    let lo = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
    [hi as u64 % CHAIN_MODULUS, lo as u64 % CHAIN_MODULUS]
}

fn read_u64(chunk: &[u8]) -> u64 {
    let mut word = [0u8; 8];
    word.copy_from_slice(chunk);
    u64::from_be_bytes(word)
}

fn check_blocks(data: &[u8]) -> Result<(), CryptoError> {
    if data.len() % BLOCK_LEN != 0 {
        return Err(CryptoError::InvalidLength {
            expected_multiple: BLOCK_LEN,
            got: data.len(),
        });
    }
    Ok(())
}
