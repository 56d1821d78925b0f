//! Cryptographic primitives for XSM3
//!
//! This module provides the operations the handshake is built from:
//! - DES and zero-IV triple-DES CBC (tdes)
//! - Parve byte cipher, CBC-MAC and chain-and-sum (parve)
//! - Salted MAC, ACR and content hash (mac)
//! - Fixed keys and lookup tables (tables)

pub mod mac;
pub mod parve;
pub mod tables;
pub mod tdes;
