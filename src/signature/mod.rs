//! Threshold signature verification for settlement
//!
//! A settlement is authorized by the channel's distributed signer group. The
//! group signs the canonical settlement message with its shared key; the
//! core asks a recovery capability who signed and compares the answer with
//! the signer address registered for the channel.

pub mod schnorr;

use sha3::{Digest, Keccak256};
use tracing::warn;

use crate::config::BridgeConfig;
use crate::errors::ZkpError;
use crate::field::balance_to_bytes;
use crate::types::{Address, Bytes32, ChannelId, ZERO_ADDRESS};
use crate::zkp::FunctionProof;
use crate::Result;

pub use schnorr::{schnorr_challenge, SchnorrSecp256k1Verifier};

/// Group public key as affine coordinates
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GroupPublicKey {
    /// x coordinate, big-endian
    pub x: Bytes32,
    /// y coordinate, big-endian
    pub y: Bytes32,
}

/// Aggregated threshold signature `(R, z)`
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ThresholdSignature {
    /// x coordinate of the nonce commitment R
    pub rx: Bytes32,
    /// y coordinate of the nonce commitment R
    pub ry: Bytes32,
    /// Response scalar
    pub z: Bytes32,
}

/// Signature recovery capability
///
/// Returns the identity bound to `public_key` when `signature` is valid for
/// `message`, and [`ZERO_ADDRESS`] otherwise.
pub trait SignatureVerifier: Send + Sync {
    /// Recovers the signer identity
    fn recover(
        &self,
        message: &Bytes32,
        public_key: &GroupPublicKey,
        signature: &ThresholdSignature,
    ) -> Address;
}

/// Derives the signer address bound to a group public key
///
/// The address is the last 20 bytes of `keccak256(x || y)`.
pub fn derive_signer_address(public_key: &GroupPublicKey) -> Address {
    let mut hasher = Keccak256::new();
    hasher.update(public_key.x);
    hasher.update(public_key.y);
    let digest: Bytes32 = hasher.finalize().into();
    let mut address = [0u8; 20];
    address.copy_from_slice(&digest[12..]);
    address
}

/// Computes the canonical settlement message
///
/// `keccak256(tag || channel_id || balances || proofs)` where balances are
/// 32-byte big-endian words in participant-major order and every proof
/// contributes its function signature followed by the keccak-256 hash of its
/// concatenated public inputs, in submission order.
pub fn settlement_message<C: BridgeConfig>(
    config: &C,
    channel_id: ChannelId,
    final_balances: &[Vec<u128>],
    proofs: &[FunctionProof],
) -> Bytes32 {
    let mut hasher = Keccak256::new();
    hasher.update(config.settlement_domain_tag());
    hasher.update(channel_id.to_be_bytes());
    for row in final_balances {
        for amount in row {
            hasher.update(balance_to_bytes(*amount));
        }
    }
    for proof in proofs {
        hasher.update(proof.function_signature);
        let mut inputs = Keccak256::new();
        for input in &proof.public_inputs {
            inputs.update(input);
        }
        hasher.update(inputs.finalize());
    }
    hasher.finalize().into()
}

/// Checks that `signature` over `message` recovers `signer`
///
/// # Returns
/// * `Err(ZkpError::InvalidSignature)` - Recovery failed or recovered a different identity
pub fn verify_group_signature(
    verifier: &dyn SignatureVerifier,
    message: &Bytes32,
    public_key: &GroupPublicKey,
    signature: &ThresholdSignature,
    signer: &Address,
) -> Result<()> {
    let recovered = verifier.recover(message, public_key, signature);
    if recovered == ZERO_ADDRESS || recovered != *signer {
        warn!("settlement signature rejected");
        return Err(ZkpError::InvalidSignature.into());
    }
    Ok(())
}
