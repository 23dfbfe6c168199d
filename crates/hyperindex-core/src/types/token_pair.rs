use crate::error::{DiagError, Result};
use alloy_primitives::{keccak256, Address, B256};
use std::fmt;

/// Unordered pair of token addresses, stored sorted ascending
///
/// Byte-wise ordering of the 20-byte address is the same ordering the
/// factory uses when it compares `uint160(token)` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenPair {
    token0: Address,
    token1: Address,
}

impl TokenPair {
    /// Canonicalize two token addresses. Fails when they are the same token.
    pub fn new(token_a: Address, token_b: Address) -> Result<Self> {
        if token_a == token_b {
            return Err(DiagError::InvalidPair(token_a));
        }
        let (token0, token1) = if token_a < token_b {
            (token_a, token_b)
        } else {
            (token_b, token_a)
        };
        Ok(Self { token0, token1 })
    }

    pub fn token0(&self) -> Address {
        self.token0
    }

    pub fn token1(&self) -> Address {
        self.token1
    }

    /// keccak256 of the packed `token0 ‖ token1` bytes
    pub fn salt(&self) -> B256 {
        let mut packed = [0u8; 40];
        packed[..20].copy_from_slice(self.token0.as_slice());
        packed[20..].copy_from_slice(self.token1.as_slice());
        keccak256(packed)
    }
}

impl fmt::Display for TokenPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.token0, self.token1)
    }
}
