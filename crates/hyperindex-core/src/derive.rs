//! Deterministic pair address derivation
//!
//! Pairs are deployed by the factory with CREATE2, so their address is fully
//! determined by the factory address, the sorted token pair and the pair
//! init-code hash:
//!
//! ```text
//! salt = keccak256(token0 ‖ token1)
//! pair = keccak256(0xff ‖ factory ‖ salt ‖ init_code_hash)[12..32]
//! ```

use crate::error::Result;
use crate::types::TokenPair;
use alloy_primitives::{keccak256, Address, B256};

/// Salt the factory uses for `pair`
pub fn pair_salt(pair: &TokenPair) -> B256 {
    pair.salt()
}

/// Derive the address the factory deploys the `token_a`/`token_b` pair to.
///
/// Argument order does not matter. Fails with `InvalidPair` when both tokens
/// are the same address.
pub fn derive_pair_address(
    token_a: Address,
    token_b: Address,
    creator: Address,
    code_hash: B256,
) -> Result<Address> {
    let pair = TokenPair::new(token_a, token_b)?;
    Ok(derive_for_pair(&pair, creator, code_hash))
}

/// Same as [`derive_pair_address`] for an already canonical pair
pub fn derive_for_pair(pair: &TokenPair, creator: Address, code_hash: B256) -> Address {
    let mut buf = [0u8; 1 + 20 + 32 + 32];
    buf[0] = 0xff;
    buf[1..21].copy_from_slice(creator.as_slice());
    buf[21..53].copy_from_slice(pair.salt().as_slice());
    buf[53..85].copy_from_slice(code_hash.as_slice());
    let hash = keccak256(buf);
    Address::from_slice(&hash[12..32])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DiagError;
    use alloy_primitives::{address, b256};

    // Uniswap V2 mainnet deployment
    const FACTORY: Address = address!("5C69bEe701ef814a2B6a3EDD4B1652CB9cc5aA6f");
    const INIT_CODE_HASH: B256 =
        b256!("96e8ac4277198ff8b6f785478aa9a39f403cb768dd02cbee326c3e7da348845f");
    const USDC: Address = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");
    const WETH: Address = address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");
    const USDC_WETH_PAIR: Address = address!("B4e16d0168e52d35CaCD2c6185b44281Ec28C9Dc");

    #[test]
    fn test_known_pair_address() {
        let derived = derive_pair_address(USDC, WETH, FACTORY, INIT_CODE_HASH).unwrap();
        assert_eq!(derived, USDC_WETH_PAIR);
    }

    #[test]
    fn test_order_independent() {
        let ab = derive_pair_address(USDC, WETH, FACTORY, INIT_CODE_HASH).unwrap();
        let ba = derive_pair_address(WETH, USDC, FACTORY, INIT_CODE_HASH).unwrap();
        assert_eq!(ab, ba);
    }

    #[test]
    fn test_deterministic() {
        let first = derive_pair_address(USDC, WETH, FACTORY, INIT_CODE_HASH).unwrap();
        for _ in 0..5 {
            assert_eq!(
                derive_pair_address(USDC, WETH, FACTORY, INIT_CODE_HASH).unwrap(),
                first
            );
        }
    }

    #[test]
    fn test_identical_tokens_fail() {
        let err = derive_pair_address(WETH, WETH, FACTORY, INIT_CODE_HASH).unwrap_err();
        assert!(matches!(err, DiagError::InvalidPair(_)));
    }

    #[test]
    fn test_matches_create2_helper() {
        let pair = TokenPair::new(USDC, WETH).unwrap();
        let expected = FACTORY.create2(pair_salt(&pair), INIT_CODE_HASH);
        assert_eq!(derive_for_pair(&pair, FACTORY, INIT_CODE_HASH), expected);
    }

    #[test]
    fn test_different_code_hash_changes_address() {
        let other = B256::repeat_byte(0x11);
        let derived = derive_pair_address(USDC, WETH, FACTORY, other).unwrap();
        assert_ne!(derived, USDC_WETH_PAIR);
    }
}
