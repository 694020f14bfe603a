//! Cryptographic utilities
//!
//! This module provides:
//! - SHA-256 hashing
//! - ECDSA key management (secp256k1) and address derivation

pub mod hash;
pub mod keys;

pub use hash::{sha256, sha256_hex};
pub use keys::{public_key_to_address, KeyError, KeyPair};
