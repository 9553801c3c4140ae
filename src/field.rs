//! BLS12-381 scalar field reduction
//!
//! Ledger values (L2 keys, balances) are native 256-bit integers. Before they
//! can be used as circuit inputs they must be reduced into the scalar field of
//! the pairing curve. The reduction is kept explicit and is tested against the
//! literal modulus.

use num_bigint::BigUint;

use crate::types::{Balance, Bytes32, FieldElement};

/// Scalar field modulus of BLS12-381, big-endian
///
/// `0x73eda753299d7d483339d80809a1d80553bda402fffe5bfeffffffff00000001`
pub const R_MOD: Bytes32 = [
    0x73, 0xed, 0xa7, 0x53, 0x29, 0x9d, 0x7d, 0x48, 0x33, 0x39, 0xd8, 0x08, 0x09, 0xa1, 0xd8, 0x05,
    0x53, 0xbd, 0xa4, 0x02, 0xff, 0xfe, 0x5b, 0xfe, 0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x01,
];

/// Returns the modulus as an arbitrary-precision integer
pub fn modulus() -> BigUint { BigUint::from_bytes_be(&R_MOD) }

/// Reduces a 256-bit big-endian value modulo [`R_MOD`]
pub fn reduce(value: &Bytes32) -> FieldElement {
    let reduced = BigUint::from_bytes_be(value) % modulus();
    to_bytes32(&reduced)
}

/// Reduces a balance modulo [`R_MOD`]
pub fn reduce_balance(amount: Balance) -> FieldElement { reduce(&balance_to_bytes(amount)) }

/// Encodes a balance as a 32-byte big-endian word
pub fn balance_to_bytes(amount: Balance) -> Bytes32 {
    let mut out = [0u8; 32];
    out[16..].copy_from_slice(&amount.to_be_bytes());
    out
}

/// Returns true if the value is strictly below [`R_MOD`]
pub fn is_canonical(value: &FieldElement) -> bool { BigUint::from_bytes_be(value) < modulus() }

/// Left-pads a reduced integer into 32 big-endian bytes
fn to_bytes32(value: &BigUint) -> Bytes32 {
    let bytes = value.to_bytes_be();
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    out
}

#[cfg(test)]
mod tests {
    use ark_ff::PrimeField;

    use super::*;

    #[test]
    fn test_modulus_matches_literal() {
        let literal = BigUint::parse_bytes(
            b"73eda753299d7d483339d80809a1d80553bda402fffe5bfeffffffff00000001",
            16,
        )
        .expect("valid hex");
        assert_eq!(modulus(), literal);
    }

    #[test]
    fn test_modulus_matches_curve_scalar_field() {
        let curve_modulus: BigUint = ark_bls12_381::Fr::MODULUS.into();
        assert_eq!(modulus(), curve_modulus);
    }

    #[test]
    fn test_reduce_below_modulus_is_identity() {
        let mut value = [0u8; 32];
        value[31] = 42;
        assert_eq!(reduce(&value), value);

        let mut max_canonical = R_MOD;
        max_canonical[31] = 0; // R_MOD - 1
        assert_eq!(reduce(&max_canonical), max_canonical);
    }

    #[test]
    fn test_reduce_at_and_above_modulus() {
        assert_eq!(reduce(&R_MOD), [0u8; 32]);

        let mut r_plus_five = R_MOD;
        r_plus_five[31] = 6;
        let mut five = [0u8; 32];
        five[31] = 5;
        assert_eq!(reduce(&r_plus_five), five);

        // 2^256 - 1 mod r
        let all_ones = [0xffu8; 32];
        let expected = (BigUint::from_bytes_be(&all_ones) % modulus()).to_bytes_be();
        let reduced = reduce(&all_ones);
        assert_eq!(&reduced[32 - expected.len()..], expected.as_slice());
        assert!(is_canonical(&reduced));
    }

    #[test]
    fn test_reduce_balance() {
        let amount: Balance = 1_000_000_000_000_000_000;
        let reduced = reduce_balance(amount);
        assert_eq!(u128::from_be_bytes(reduced[16..].try_into().expect("16 bytes")), amount);
        assert_eq!(&reduced[..16], &[0u8; 16]);
    }

    #[test]
    fn test_is_canonical() {
        assert!(is_canonical(&[0u8; 32]));
        assert!(!is_canonical(&R_MOD));
        assert!(!is_canonical(&[0xffu8; 32]));
    }
}
