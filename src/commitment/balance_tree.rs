//! Balance Merkle tree
//!
//! A binary Merkle commitment over `(participant, token, amount)` leaves,
//! usable without zero-knowledge proofs for withdrawal claims.
//!
//! # Tree shape
//!
//! - Leaf hash: `H(participant || token || amount)` with `amount` as a 32-byte
//!   big-endian word
//! - Node hash: `H(min(a, b) || max(a, b))`, so sibling order never matters
//! - An odd node at any level is promoted unchanged to the next level
//! - The root of an empty leaf set is the zero sentinel `[0u8; 32]`
//!
//! Proofs are plain sibling lists; promoted levels contribute no sibling.

use sha3::{Digest, Keccak256};

use crate::field::balance_to_bytes;
use crate::types::{Address, Balance, Bytes32};

/// Root of an empty balance tree
pub const EMPTY_ROOT: Bytes32 = [0u8; 32];

/// One balance claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BalanceLeaf {
    /// Participant identity
    pub participant: Address,
    /// Token identifier
    pub token: Address,
    /// Claimed amount
    pub amount: Balance,
}

/// Hash function used by the balance tree
pub trait BalanceHasher {
    /// Hashes a leaf preimage
    fn hash_leaf(&self, leaf: &BalanceLeaf) -> Bytes32;

    /// Hashes two children in the order given
    ///
    /// Callers sort the pair; implementations must not.
    fn hash_pair(&self, first: &Bytes32, second: &Bytes32) -> Bytes32;
}

/// Keccak-256 balance hasher
#[derive(Clone, Copy, Debug, Default)]
pub struct Keccak256Hasher;

impl BalanceHasher for Keccak256Hasher {
    fn hash_leaf(&self, leaf: &BalanceLeaf) -> Bytes32 {
        let mut hasher = Keccak256::new();
        hasher.update(leaf.participant);
        hasher.update(leaf.token);
        hasher.update(balance_to_bytes(leaf.amount));
        hasher.finalize().into()
    }

    fn hash_pair(&self, first: &Bytes32, second: &Bytes32) -> Bytes32 {
        let mut hasher = Keccak256::new();
        hasher.update(first);
        hasher.update(second);
        hasher.finalize().into()
    }
}

/// Default hasher for the balance tree
pub const DEFAULT_HASHER: Keccak256Hasher = Keccak256Hasher;

/// Computes a leaf hash with the default hasher
pub fn compute_leaf_hash(leaf: &BalanceLeaf) -> Bytes32 { DEFAULT_HASHER.hash_leaf(leaf) }

/// Computes a node hash over the sorted pair with the default hasher
pub fn compute_node_hash(a: &Bytes32, b: &Bytes32) -> Bytes32 {
    compute_node_hash_with(&DEFAULT_HASHER, a, b)
}

/// Computes a node hash over the sorted pair
pub fn compute_node_hash_with<H: BalanceHasher>(hasher: &H, a: &Bytes32, b: &Bytes32) -> Bytes32 {
    if a <= b {
        hasher.hash_pair(a, b)
    } else {
        hasher.hash_pair(b, a)
    }
}

/// Computes the root over `leaves` with the default hasher
pub fn compute_merkle_root(leaves: &[BalanceLeaf]) -> Bytes32 {
    compute_merkle_root_with(&DEFAULT_HASHER, leaves)
}

/// Computes the root over `leaves`
///
/// # Returns
/// [`EMPTY_ROOT`] for an empty slice, otherwise the root of the bottom-up
/// pairing with odd nodes promoted.
pub fn compute_merkle_root_with<H: BalanceHasher>(hasher: &H, leaves: &[BalanceLeaf]) -> Bytes32 {
    if leaves.is_empty() {
        return EMPTY_ROOT;
    }

    let mut level: Vec<Bytes32> = leaves.iter().map(|leaf| hasher.hash_leaf(leaf)).collect();
    while level.len() > 1 {
        level = next_level(hasher, &level);
    }
    level[0]
}

/// Generates the sibling path for `leaves[index]` with the default hasher
pub fn generate_balance_proof(leaves: &[BalanceLeaf], index: usize) -> Option<Vec<Bytes32>> {
    generate_balance_proof_with(&DEFAULT_HASHER, leaves, index)
}

/// Generates the sibling path for `leaves[index]`
///
/// # Returns
/// * `Some(proof)` - Siblings from the leaf level upwards
/// * `None` - `index` is out of range
pub fn generate_balance_proof_with<H: BalanceHasher>(
    hasher: &H,
    leaves: &[BalanceLeaf],
    index: usize,
) -> Option<Vec<Bytes32>> {
    if index >= leaves.len() {
        return None;
    }

    let mut level: Vec<Bytes32> = leaves.iter().map(|leaf| hasher.hash_leaf(leaf)).collect();
    let mut position = index;
    let mut proof = Vec::new();
    while level.len() > 1 {
        let sibling = position ^ 1;
        if sibling < level.len() {
            proof.push(level[sibling]);
        }
        level = next_level(hasher, &level);
        position /= 2;
    }
    Some(proof)
}

/// Verifies a balance claim against `root` with the default hasher
pub fn verify_balance(root: &Bytes32, leaf: &BalanceLeaf, proof: &[Bytes32]) -> bool {
    verify_balance_with(&DEFAULT_HASHER, root, leaf, proof)
}

/// Verifies a balance claim against `root`
///
/// Replays the sibling path from the leaf hash. Returns only whether the
/// recomputed root matches.
pub fn verify_balance_with<H: BalanceHasher>(
    hasher: &H,
    root: &Bytes32,
    leaf: &BalanceLeaf,
    proof: &[Bytes32],
) -> bool {
    let computed = proof
        .iter()
        .fold(hasher.hash_leaf(leaf), |node, sibling| compute_node_hash_with(hasher, &node, sibling));
    computed == *root
}

fn next_level<H: BalanceHasher>(hasher: &H, level: &[Bytes32]) -> Vec<Bytes32> {
    level
        .chunks(2)
        .map(|pair| match pair.get(1) {
            Some(right) => compute_node_hash_with(hasher, &pair[0], right),
            None => pair[0],
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::test_utils::address;

    fn leaves(amounts: &[Balance]) -> Vec<BalanceLeaf> {
        amounts
            .iter()
            .enumerate()
            .map(|(i, amount)| BalanceLeaf {
                participant: address(i as u8 + 1),
                token: address(100),
                amount: *amount,
            })
            .collect()
    }

    #[test]
    fn test_empty_root_is_zero() {
        assert_eq!(compute_merkle_root(&[]), EMPTY_ROOT);
        assert_eq!(generate_balance_proof(&[], 0), None);
    }

    #[test]
    fn test_single_leaf_root_is_leaf_hash() {
        let set = leaves(&[5]);
        assert_eq!(compute_merkle_root(&set), compute_leaf_hash(&set[0]));

        let proof = generate_balance_proof(&set, 0).expect("proof");
        assert!(proof.is_empty());
        assert!(verify_balance(&compute_merkle_root(&set), &set[0], &proof));
    }

    #[test]
    fn test_leaf_hash_known_preimage() {
        let leaf = BalanceLeaf { participant: address(1), token: address(2), amount: 3 };
        let mut preimage = Vec::with_capacity(72);
        preimage.extend_from_slice(&[1u8; 20]);
        preimage.extend_from_slice(&[2u8; 20]);
        preimage.extend_from_slice(&[0u8; 31]);
        preimage.push(3);
        let expected: Bytes32 = Keccak256::digest(&preimage).into();

        assert_eq!(compute_leaf_hash(&leaf), expected);
    }

    #[test]
    fn test_odd_node_promoted() {
        let set = leaves(&[1, 2, 3]);
        let h: Vec<Bytes32> = set.iter().map(compute_leaf_hash).collect();
        let expected = compute_node_hash(&compute_node_hash(&h[0], &h[1]), &h[2]);

        assert_eq!(compute_merkle_root(&set), expected);

        // the promoted leaf has no sibling at the first level
        let proof = generate_balance_proof(&set, 2).expect("proof");
        assert_eq!(proof, vec![compute_node_hash(&h[0], &h[1])]);
    }

    #[test]
    fn test_proof_out_of_range() {
        assert_eq!(generate_balance_proof(&leaves(&[1, 2]), 2), None);
    }

    #[test]
    fn test_wrong_root_rejected() {
        let set = leaves(&[1, 2, 3, 4]);
        let proof = generate_balance_proof(&set, 1).expect("proof");
        assert!(!verify_balance(&[7u8; 32], &set[1], &proof));
    }

    #[test]
    fn test_leaf_order_matters_for_root() {
        let set = leaves(&[1, 2, 3]);
        let mut swapped = set.clone();
        swapped.swap(0, 2);
        assert_ne!(compute_merkle_root(&set), compute_merkle_root(&swapped));
    }

    proptest! {
        #[test]
        fn prop_node_hash_symmetric(a in any::<[u8; 32]>(), b in any::<[u8; 32]>()) {
            prop_assert_eq!(compute_node_hash(&a, &b), compute_node_hash(&b, &a));
        }

        #[test]
        fn prop_every_leaf_verifies(amounts in prop::collection::vec(any::<u128>(), 1..40)) {
            let set = leaves(&amounts);
            let root = compute_merkle_root(&set);
            for (i, leaf) in set.iter().enumerate() {
                let proof = generate_balance_proof(&set, i).expect("in range");
                prop_assert!(verify_balance(&root, leaf, &proof));
            }
        }

        #[test]
        fn prop_amount_bit_flip_rejected(
            amounts in prop::collection::vec(any::<u128>(), 1..40),
            pick in any::<prop::sample::Index>(),
            bit in 0u32..128,
        ) {
            let set = leaves(&amounts);
            let root = compute_merkle_root(&set);
            let i = pick.index(set.len());
            let proof = generate_balance_proof(&set, i).expect("in range");

            let mut forged = set[i];
            forged.amount ^= 1u128 << bit;
            prop_assert!(!verify_balance(&root, &forged, &proof));
        }
    }
}
