//! Shared test utilities
//!
//! Deterministic fixtures used across module tests.

use k256::elliptic_curve::sec1::ToEncodedPoint;
use k256::{AffinePoint, ProjectivePoint, Scalar};

use crate::channel::{ChannelParams, InMemoryLedger};
use crate::config::DEFAULT_CONFIG;
use crate::signature::{
    derive_signer_address, schnorr_challenge, settlement_message, GroupPublicKey,
    ThresholdSignature,
};
use crate::types::{Address, Balance, Bytes32, ChannelId, FieldElement};
use crate::zkp::{
    ExecutionProofVerifier, FunctionProof, Groth16Proof, Groth16Verifier, RegisteredFunction,
    TreeSize, G1_COMPRESSED_LEN, G2_COMPRESSED_LEN,
};

/// One ether in wei
pub const ETHER: Balance = 1_000_000_000_000_000_000;

/// Channel id used by the ledger fixtures
pub const CHANNEL_ID: ChannelId = 1;

/// Leader of the fixture channel
pub const LEADER: Address = [0xaa; 20];

/// Seed of the fixture channel's group key
pub const GROUP_SEED: u64 = 7;

/// Address with every byte set to `byte`
pub fn address(byte: u8) -> Address { [byte; 20] }

/// Small L2 key with `byte` in the last position
pub fn key(byte: u8) -> FieldElement {
    let mut value = [0u8; 32];
    value[31] = byte;
    value
}

/// Proof with correctly sized but meaningless elements
pub fn dummy_proof() -> Groth16Proof {
    Groth16Proof {
        pi_a: vec![0u8; G1_COMPRESSED_LEN],
        pi_b: vec![0u8; G2_COMPRESSED_LEN],
        pi_c: vec![0u8; G1_COMPRESSED_LEN],
    }
}

/// Groth16 verifier with a fixed answer
#[derive(Debug, Clone, Copy)]
pub struct FixedVerifier(pub bool);

impl Groth16Verifier for FixedVerifier {
    fn verify(&self, _proof: &Groth16Proof, _public_signals: &[FieldElement]) -> bool { self.0 }
}

/// Groth16 verifier accepting exactly one signal vector
#[derive(Debug, Clone)]
pub struct ExpectedSignalsVerifier(pub Vec<FieldElement>);

impl Groth16Verifier for ExpectedSignalsVerifier {
    fn verify(&self, _proof: &Groth16Proof, public_signals: &[FieldElement]) -> bool {
        public_signals == self.0.as_slice()
    }
}

/// Registered function whose signature is `[n; 32]`
pub fn registered_function(n: u8) -> RegisteredFunction {
    RegisteredFunction {
        function_signature: [n; 32],
        preprocessed_part1: vec![n as u128],
        preprocessed_part2: vec![[n; 32]],
    }
}

/// Proof accepted by [`KeyMatchingVerifier`] for [`registered_function`]`(n)`
pub fn function_proof(n: u8) -> FunctionProof {
    FunctionProof {
        function_signature: [n; 32],
        proof_part1: vec![n as u128],
        proof_part2: vec![[n; 32]],
        public_inputs: vec![[n; 32], [n.wrapping_add(1); 32]],
        smax: 64,
    }
}

/// Execution verifier accepting proofs whose first half matches the key
#[derive(Debug, Clone, Copy)]
pub struct KeyMatchingVerifier;

impl ExecutionProofVerifier for KeyMatchingVerifier {
    fn verify(&self, proof: &FunctionProof, function: &RegisteredFunction) -> bool {
        proof.proof_part1 == function.preprocessed_part1
    }
}

fn coordinates(point: &AffinePoint) -> (Bytes32, Bytes32) {
    let encoded = point.to_encoded_point(false);
    let x = encoded.x().expect("affine point has x");
    let y = encoded.y().expect("uncompressed point has y");
    ((*x).into(), (*y).into())
}

/// Group secret and public key derived from a nonzero seed
pub fn group_key(seed: u64) -> (Scalar, GroupPublicKey) {
    let secret = Scalar::from(seed);
    let (x, y) = coordinates(&AffinePoint::from(ProjectivePoint::GENERATOR * secret));
    (secret, GroupPublicKey { x, y })
}

/// Schnorr signature over `message` with a nonce derived from `nonce_seed`
pub fn sign(secret: &Scalar, message: &Bytes32, nonce_seed: u64) -> ThresholdSignature {
    let nonce = Scalar::from(nonce_seed);
    let r = AffinePoint::from(ProjectivePoint::GENERATOR * nonce);
    let pk = AffinePoint::from(ProjectivePoint::GENERATOR * *secret);
    let c = schnorr_challenge(&r, &pk, message);
    let z = nonce + c * secret;

    let (rx, ry) = coordinates(&r);
    ThresholdSignature { rx, ry, z: z.to_bytes().into() }
}

/// Parameters of the fixture channel
///
/// Participants are `address(1..=participants)`, tokens `address(100..)`.
pub fn channel_params(participants: u8, tokens: u8, tree_size: TreeSize) -> ChannelParams {
    let (_, group_public_key) = group_key(GROUP_SEED);
    ChannelParams {
        id: CHANNEL_ID,
        leader: LEADER,
        participants: (1..=participants).map(address).collect(),
        allowed_tokens: (0..tokens).map(|t| address(100 + t)).collect(),
        tree_size,
        group_public_key,
        signer: derive_signer_address(&group_public_key),
    }
}

/// Ledger holding one `Initialized` channel: 3 participants, 1 token,
/// deposits of 1, 2 and 3 ether and keys `key(10..=12)`
pub fn funded_ledger() -> InMemoryLedger {
    let mut ledger = InMemoryLedger::new();
    let params = channel_params(3, 1, TreeSize::Leaves16);
    let token = params.allowed_tokens[0];
    let participants = params.participants.clone();
    ledger.open_channel(params).expect("open channel");

    for (i, participant) in participants.iter().enumerate() {
        ledger
            .deposit(CHANNEL_ID, participant, &token, (i as u128 + 1) * ETHER)
            .expect("deposit");
        ledger.set_l2_key(CHANNEL_ID, participant, &token, key(10 + i as u8)).expect("l2 key");
    }
    ledger
}

/// Group signature over the settlement of the fixture channel
pub fn sign_settlement(final_balances: &[Vec<Balance>], proofs: &[FunctionProof]) -> ThresholdSignature {
    let (secret, _) = group_key(GROUP_SEED);
    let message = settlement_message(&DEFAULT_CONFIG, CHANNEL_ID, final_balances, proofs);
    sign(&secret, &message, 99)
}
