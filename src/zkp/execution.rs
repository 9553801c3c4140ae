//! Execution proofs and the function registry
//!
//! Settlement carries one proof per executed function. Each proof is checked
//! against the preprocessed verifying key registered for its function
//! signature. Registration is administrative; the core only reads the
//! registry.

use std::collections::{BTreeMap, BTreeSet};

use tracing::warn;

use crate::errors::{ChannelError, ConfigError, ZkpError};
use crate::types::{Bytes32, FunctionSignature};
use crate::Result;

/// A function signature plus the two halves of its preprocessed verifying key
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegisteredFunction {
    /// Function signature
    pub function_signature: FunctionSignature,
    /// First half of the preprocessed verifying key
    pub preprocessed_part1: Vec<u128>,
    /// Second half of the preprocessed verifying key
    pub preprocessed_part2: Vec<Bytes32>,
}

/// One execution proof bundle in a settlement submission
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionProof {
    /// Signature of the function this proof attests to
    pub function_signature: FunctionSignature,
    /// First half of the proof
    pub proof_part1: Vec<u128>,
    /// Second half of the proof
    pub proof_part2: Vec<Bytes32>,
    /// Public inputs of the execution
    pub public_inputs: Vec<Bytes32>,
    /// Maximum circuit size parameter
    pub smax: u64,
}

/// Execution proof verification capability
///
/// Implementations must be side-effect free and report every failure as `false`.
pub trait ExecutionProofVerifier: Send + Sync {
    /// Verifies `proof` against the verifying key of `function`
    fn verify(&self, proof: &FunctionProof, function: &RegisteredFunction) -> bool;
}

/// Mapping from function signature to registered verifying key
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FunctionRegistry {
    functions: BTreeMap<FunctionSignature, RegisteredFunction>,
}

impl FunctionRegistry {
    /// Creates an empty registry
    pub fn new() -> Self { Self::default() }

    /// Registers a function
    ///
    /// # Returns
    /// * `Err(ConfigError::FunctionAlreadyRegistered)` - The signature is already registered
    pub fn register(&mut self, function: RegisteredFunction) -> Result<()> {
        let signature = function.function_signature;
        if self.functions.contains_key(&signature) {
            return Err(ConfigError::FunctionAlreadyRegistered(signature).into());
        }
        self.functions.insert(signature, function);
        Ok(())
    }

    /// Looks up a registered function
    pub fn get(&self, signature: &FunctionSignature) -> Option<&RegisteredFunction> {
        self.functions.get(signature)
    }

    /// Number of registered functions
    pub fn len(&self) -> usize { self.functions.len() }

    /// Returns true if no function is registered
    pub fn is_empty(&self) -> bool { self.functions.is_empty() }
}

/// Rejects submissions that name the same function twice
pub fn ensure_distinct_functions(proofs: &[FunctionProof]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for proof in proofs {
        if !seen.insert(proof.function_signature) {
            return Err(ChannelError::DuplicateFunctionProof(proof.function_signature).into());
        }
    }
    Ok(())
}

/// Resolves every submitted function signature against the registry
///
/// Runs before any proof is verified, so an unregistered function is
/// reported as such and never as an invalid proof.
pub fn resolve_functions<'r>(
    proofs: &[FunctionProof],
    registry: &'r FunctionRegistry,
) -> Result<Vec<&'r RegisteredFunction>> {
    proofs
        .iter()
        .map(|proof| {
            registry
                .get(&proof.function_signature)
                .ok_or_else(|| ChannelError::UnregisteredFunction(proof.function_signature).into())
        })
        .collect()
}

/// Verifies each proof against its resolved function
///
/// # Returns
/// * `Err(ZkpError::InvalidProof)` - Any proof fails; which one is not reported
pub fn verify_function_proofs(
    proofs: &[FunctionProof],
    functions: &[&RegisteredFunction],
    verifier: &dyn ExecutionProofVerifier,
) -> Result<()> {
    let all_valid = proofs.len() == functions.len()
        && proofs.iter().zip(functions).all(|(proof, function)| verifier.verify(proof, function));

    if !all_valid {
        warn!("execution proof rejected");
        return Err(ZkpError::InvalidProof.into());
    }
    Ok(())
}
