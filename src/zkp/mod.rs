//! Zero-knowledge proof verification
//!
//! This module provides the proof types consumed by channel transitions, the
//! Groth16 verification capability and its capacity dispatcher, and the
//! execution-proof registry used at settlement.

pub mod dispatcher;
pub mod execution;
pub mod groth16;

pub use dispatcher::{TreeSize, VerifierSet, VerifierVariant};
pub use execution::{
    ensure_distinct_functions, resolve_functions, verify_function_proofs, ExecutionProofVerifier,
    FunctionProof, FunctionRegistry, RegisteredFunction,
};
pub use groth16::{
    fr_to_field_element, ArkGroth16Verifier, Groth16Proof, Groth16Verifier, G1_COMPRESSED_LEN,
    G2_COMPRESSED_LEN,
};
