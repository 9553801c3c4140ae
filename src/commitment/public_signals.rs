//! Public-signal vector for the initialization circuit
//!
//! The state machine builds this vector from ledger state and never from
//! caller-supplied encodings. Layout (length `2 * tree_size + 1`):
//!
//! - `[0]` the claimed root, passed through unchanged
//! - `[1..=tree_size]` L2 keys, token-major and participant-minor, zero padded
//! - `[tree_size+1..=2*tree_size]` balances in the same order and padding
//!
//! Every key and balance is reduced modulo the BLS12-381 scalar field.

use crate::errors::ConfigError;
use crate::field::{reduce, reduce_balance};
use crate::types::{Address, Balance, FieldElement, StateRoot};
use crate::zkp::TreeSize;
use crate::Result;

/// Slot of participant `participant_index` and token `token_index`
///
/// Tokens form the outer loop, participants the inner loop.
pub const fn slot_index(
    participant_index: usize,
    token_index: usize,
    participant_count: usize,
) -> usize {
    token_index * participant_count + participant_index
}

/// Checks that participants x tokens fit in the tree
///
/// # Returns
/// * `Err(ConfigError::CapacityExceeded)` - Too many entries for `tree_size`
pub fn ensure_capacity(tree_size: TreeSize, participants: usize, tokens: usize) -> Result<()> {
    let entries = participants.saturating_mul(tokens);
    if entries > tree_size.capacity() {
        return Err(ConfigError::CapacityExceeded { entries, capacity: tree_size.capacity() }.into());
    }
    Ok(())
}

/// Builds the public-signal vector expected by the initialization circuit
///
/// # Arguments
/// * `tree_size` - Capacity of the commitment tree
/// * `participants` - Channel participants, in channel order
/// * `tokens` - Allowed tokens, in channel order
/// * `root` - The claimed commitment root
/// * `l2_key` - Lookup of the L2 key for a (participant, token) pair
/// * `deposit` - Lookup of the recorded deposit for a (participant, token) pair
///
/// # Returns
/// * `Ok(signals)` - Vector of length `2 * tree_size + 1`
/// * `Err(ConfigError::CapacityExceeded)` - Too many entries for `tree_size`
/// * `Err(ConfigError::ZeroKeyWithBalance)` - A nonzero deposit has no L2 key
pub fn build_public_signals<K, D>(
    tree_size: TreeSize,
    participants: &[Address],
    tokens: &[Address],
    root: &StateRoot,
    l2_key: K,
    deposit: D,
) -> Result<Vec<FieldElement>>
where
    K: Fn(&Address, &Address) -> FieldElement,
    D: Fn(&Address, &Address) -> Balance,
{
    ensure_capacity(tree_size, participants.len(), tokens.len())?;

    let capacity = tree_size.capacity();
    let mut signals = vec![[0u8; 32]; tree_size.signal_len()];
    signals[0] = *root;

    for (token_index, token) in tokens.iter().enumerate() {
        for (participant_index, participant) in participants.iter().enumerate() {
            let key = l2_key(participant, token);
            let amount = deposit(participant, token);
            if amount != 0 && key == [0u8; 32] {
                return Err(ConfigError::ZeroKeyWithBalance {
                    participant: *participant,
                    token: *token,
                }
                .into());
            }

            let slot = slot_index(participant_index, token_index, participants.len());
            signals[1 + slot] = reduce(&key);
            signals[1 + capacity + slot] = reduce_balance(amount);
        }
    }

    Ok(signals)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::errors::Error;
    use crate::field::{balance_to_bytes, R_MOD};
    use crate::test_utils::{address, key};

    const ETHER: Balance = 1_000_000_000_000_000_000;

    struct Book {
        keys: BTreeMap<(Address, Address), FieldElement>,
        deposits: BTreeMap<(Address, Address), Balance>,
    }

    impl Book {
        fn build(
            &self,
            tree_size: TreeSize,
            participants: &[Address],
            tokens: &[Address],
        ) -> Result<Vec<FieldElement>> {
            build_public_signals(
                tree_size,
                participants,
                tokens,
                &[0xaa; 32],
                |p, t| self.keys.get(&(*p, *t)).copied().unwrap_or([0u8; 32]),
                |p, t| self.deposits.get(&(*p, *t)).copied().unwrap_or(0),
            )
        }
    }

    #[test]
    fn test_single_token_layout() {
        let participants = [address(1), address(2), address(3)];
        let token = address(100);
        let mut book = Book { keys: BTreeMap::new(), deposits: BTreeMap::new() };
        for (i, p) in participants.iter().enumerate() {
            book.keys.insert((*p, token), key(10 + i as u8));
            book.deposits.insert((*p, token), (i as u128 + 1) * ETHER);
        }

        let signals = book.build(TreeSize::Leaves16, &participants, &[token]).expect("signals");

        assert_eq!(signals.len(), 33);
        assert_eq!(signals[0], [0xaa; 32]);
        for i in 0..3 {
            assert_eq!(signals[1 + i], key(10 + i as u8));
            assert_eq!(signals[17 + i], balance_to_bytes((i as u128 + 1) * ETHER));
        }
        assert!(signals[4..17].iter().all(|s| *s == [0u8; 32]));
        assert!(signals[20..].iter().all(|s| *s == [0u8; 32]));
    }

    #[test]
    fn test_token_major_ordering() {
        let participants = [address(1), address(2)];
        let tokens = [address(100), address(101)];
        let mut book = Book { keys: BTreeMap::new(), deposits: BTreeMap::new() };
        for (j, t) in tokens.iter().enumerate() {
            for (i, p) in participants.iter().enumerate() {
                book.keys.insert((*p, *t), key((10 * j + i + 1) as u8));
                book.deposits.insert((*p, *t), (10 * j + i + 1) as u128);
            }
        }

        let signals = book.build(TreeSize::Leaves16, &participants, &tokens).expect("signals");

        // slot = token * participants + participant
        assert_eq!(signals[1], key(1)); // p0, t0
        assert_eq!(signals[2], key(2)); // p1, t0
        assert_eq!(signals[3], key(11)); // p0, t1
        assert_eq!(signals[4], key(12)); // p1, t1
        assert_eq!(signals[17], balance_to_bytes(1));
        assert_eq!(signals[18], balance_to_bytes(2));
        assert_eq!(signals[19], balance_to_bytes(11));
        assert_eq!(signals[20], balance_to_bytes(12));
    }

    #[test]
    fn test_keys_are_reduced() {
        let participant = address(1);
        let token = address(100);
        let mut oversized = R_MOD;
        oversized[31] = 0x08; // r + 7
        let mut book = Book { keys: BTreeMap::new(), deposits: BTreeMap::new() };
        book.keys.insert((participant, token), oversized);
        book.deposits.insert((participant, token), 5);

        let signals = book.build(TreeSize::Leaves16, &[participant], &[token]).expect("signals");
        let mut seven = [0u8; 32];
        seven[31] = 7;
        assert_eq!(signals[1], seven);
    }

    #[test]
    fn test_root_passes_through() {
        let signals = build_public_signals(
            TreeSize::Leaves32,
            &[address(1)],
            &[address(100)],
            &[0xff; 32],
            |_, _| [0u8; 32],
            |_, _| 0,
        )
        .expect("signals");
        assert_eq!(signals.len(), 65);
        assert_eq!(signals[0], [0xff; 32]);
    }

    #[test]
    fn test_zero_key_with_zero_balance_allowed() {
        let book = Book { keys: BTreeMap::new(), deposits: BTreeMap::new() };
        let signals = book.build(TreeSize::Leaves16, &[address(1)], &[address(100)]).expect("ok");
        assert!(signals[1..].iter().all(|s| *s == [0u8; 32]));
    }

    #[test]
    fn test_zero_key_with_balance_rejected() {
        let mut book = Book { keys: BTreeMap::new(), deposits: BTreeMap::new() };
        book.deposits.insert((address(2), address(100)), 1);

        let err = book
            .build(TreeSize::Leaves16, &[address(1), address(2)], &[address(100)])
            .expect_err("zero key");
        assert_eq!(
            err,
            Error::Config(ConfigError::ZeroKeyWithBalance {
                participant: address(2),
                token: address(100),
            })
        );
    }

    #[test]
    fn test_capacity_exceeded() {
        let participants: Vec<Address> = (1..=9).map(address).collect();
        let tokens = [address(100), address(101)];
        let book = Book { keys: BTreeMap::new(), deposits: BTreeMap::new() };

        let err = book.build(TreeSize::Leaves16, &participants, &tokens).expect_err("capacity");
        assert_eq!(err, Error::Config(ConfigError::CapacityExceeded { entries: 18, capacity: 16 }));

        assert!(book.build(TreeSize::Leaves32, &participants, &tokens).is_ok());
    }

    #[test]
    fn test_full_capacity() {
        let participants: Vec<Address> = (1..=8).map(address).collect();
        let tokens = [address(100), address(101)];
        let book = Book { keys: BTreeMap::new(), deposits: BTreeMap::new() };
        assert!(book.build(TreeSize::Leaves16, &participants, &tokens).is_ok());
    }
}
