//! Balance conservation
//!
//! For every allowed token, the proposed final balances summed over all
//! participants must equal exactly the total recorded as deposited for that
//! token. A single mismatching token fails the whole settlement.

use tracing::warn;

use crate::errors::{ChannelError, ConservationError};
use crate::types::{Address, Balance};
use crate::Result;

/// Checks that `final_balances` is a `participants x tokens` matrix
///
/// # Returns
/// * `Err(ChannelError::BalanceMatrixMismatch)` - Wrong row count or a row of the wrong length
pub fn ensure_matrix_shape(
    final_balances: &[Vec<Balance>],
    participants: usize,
    tokens: usize,
) -> Result<()> {
    if final_balances.len() != participants || final_balances.iter().any(|row| row.len() != tokens) {
        return Err(ChannelError::BalanceMatrixMismatch { participants, tokens }.into());
    }
    Ok(())
}

/// Validates conservation of value per token
///
/// # Arguments
/// * `final_balances` - Proposed balances indexed `[participant][token]`
/// * `tokens` - Allowed tokens, in channel order
/// * `total_deposited` - Recorded deposit total per token, parallel to `tokens`
///
/// # Returns
/// * `Ok(())` - Every token conserves
/// * `Err(ChannelError::BalanceMatrixMismatch)` - Matrix shape does not match `tokens`
/// * `Err(ConservationError::SumOverflow)` - A token's final sum overflows
/// * `Err(ConservationError::Violation)` - A token's final sum differs from its deposits
pub fn validate_conservation(
    final_balances: &[Vec<Balance>],
    tokens: &[Address],
    total_deposited: &[Balance],
) -> Result<()> {
    if total_deposited.len() != tokens.len() {
        return Err(ChannelError::BalanceMatrixMismatch {
            participants: final_balances.len(),
            tokens: tokens.len(),
        }
        .into());
    }
    ensure_matrix_shape(final_balances, final_balances.len(), tokens.len())?;

    for (token_index, (token, deposited)) in tokens.iter().zip(total_deposited).enumerate() {
        let settled = final_balances
            .iter()
            .try_fold(0u128, |sum, row| sum.checked_add(row[token_index]))
            .ok_or(ConservationError::SumOverflow(*token))?;

        if settled != *deposited {
            warn!(token = ?token, deposited = *deposited, settled, "conservation violated");
            return Err(ConservationError::Violation {
                token: *token,
                deposited: *deposited,
                settled,
            }
            .into());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;
    use crate::errors::Error;
    use crate::test_utils::address;

    const ETHER: Balance = 1_000_000_000_000_000_000;

    #[test]
    fn test_conserving_balances_accepted() {
        let balances = vec![vec![ETHER], vec![2 * ETHER], vec![3 * ETHER]];
        assert!(validate_conservation(&balances, &[address(100)], &[6 * ETHER]).is_ok());
    }

    #[test]
    fn test_redistribution_accepted() {
        let balances = vec![vec![6 * ETHER], vec![0], vec![0]];
        assert!(validate_conservation(&balances, &[address(100)], &[6 * ETHER]).is_ok());
    }

    #[test]
    fn test_off_by_one_rejected() {
        let balances = vec![vec![ETHER], vec![2 * ETHER], vec![3 * ETHER + 1]];
        let err = validate_conservation(&balances, &[address(100)], &[6 * ETHER])
            .expect_err("off by one");
        assert_eq!(
            err,
            Error::Conservation(ConservationError::Violation {
                token: address(100),
                deposited: 6 * ETHER,
                settled: 6 * ETHER + 1,
            })
        );
    }

    #[test]
    fn test_second_token_violation_fails_whole_call() {
        let tokens = [address(100), address(101)];
        let balances = vec![vec![10, 5], vec![20, 4]];
        let err = validate_conservation(&balances, &tokens, &[30, 10]).expect_err("token 2");
        assert!(matches!(
            err,
            Error::Conservation(ConservationError::Violation { token, .. }) if token == address(101)
        ));
    }

    #[test]
    fn test_sum_overflow_rejected() {
        let balances = vec![vec![u128::MAX], vec![1]];
        let err = validate_conservation(&balances, &[address(100)], &[u128::MAX])
            .expect_err("overflow");
        assert_eq!(err, Error::Conservation(ConservationError::SumOverflow(address(100))));
    }

    #[test]
    fn test_matrix_shape() {
        assert!(ensure_matrix_shape(&[vec![1, 2], vec![3, 4]], 2, 2).is_ok());

        let mismatch = Error::Channel(ChannelError::BalanceMatrixMismatch { participants: 2, tokens: 2 });
        assert_eq!(ensure_matrix_shape(&[vec![1, 2]], 2, 2).expect_err("rows"), mismatch);
        assert_eq!(ensure_matrix_shape(&[vec![1, 2], vec![3]], 2, 2).expect_err("ragged"), mismatch);
    }

    #[test]
    fn test_ragged_matrix_rejected_by_validator() {
        let err = validate_conservation(&[vec![1], vec![]], &[address(100)], &[1])
            .expect_err("ragged");
        assert!(matches!(err, Error::Channel(ChannelError::BalanceMatrixMismatch { .. })));
    }

    proptest! {
        #[test]
        fn prop_any_single_unit_change_rejected(
            amounts in prop::collection::vec(0u128..u64::MAX as u128, 1..16),
            pick in any::<prop::sample::Index>(),
            up in any::<bool>(),
        ) {
            let total: Balance = amounts.iter().sum();
            let mut balances: Vec<Vec<Balance>> = amounts.iter().map(|a| vec![*a]).collect();
            prop_assert!(validate_conservation(&balances, &[address(100)], &[total]).is_ok());

            let i = pick.index(balances.len());
            if up {
                balances[i][0] += 1;
            } else if balances[i][0] > 0 {
                balances[i][0] -= 1;
            } else {
                balances[i][0] = 1;
            }
            prop_assert!(validate_conservation(&balances, &[address(100)], &[total]).is_err());
        }
    }
}
