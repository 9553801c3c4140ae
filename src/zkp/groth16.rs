//! Groth16 proof type and verification capability
//!
//! The state machine never inspects proof internals. It hands a proof and the
//! public-signal vector it built itself to a [`Groth16Verifier`], which answers
//! with a plain boolean.

use ark_bls12_381::{Bls12_381, Fr, G1Affine, G2Affine};
use ark_ff::{BigInteger, PrimeField};
use ark_groth16::{prepare_verifying_key, Groth16, PreparedVerifyingKey, Proof, VerifyingKey};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_snark::SNARK;

use crate::errors::ZkpError;
use crate::field::is_canonical;
use crate::types::FieldElement;
use crate::Result;

/// Length of a compressed BLS12-381 G1 point
pub const G1_COMPRESSED_LEN: usize = 48;

/// Length of a compressed BLS12-381 G2 point
pub const G2_COMPRESSED_LEN: usize = 96;

/// Groth16 proof as compressed curve-point encodings
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Groth16Proof {
    /// Compressed G1 point A
    pub pi_a: Vec<u8>,
    /// Compressed G2 point B
    pub pi_b: Vec<u8>,
    /// Compressed G1 point C
    pub pi_c: Vec<u8>,
}

impl Groth16Proof {
    /// Encodes an arkworks proof
    pub fn from_ark(proof: &Proof<Bls12_381>) -> Result<Self> {
        let mut pi_a = Vec::with_capacity(G1_COMPRESSED_LEN);
        let mut pi_b = Vec::with_capacity(G2_COMPRESSED_LEN);
        let mut pi_c = Vec::with_capacity(G1_COMPRESSED_LEN);
        proof.a.serialize_compressed(&mut pi_a).map_err(|_| ZkpError::InvalidProof)?;
        proof.b.serialize_compressed(&mut pi_b).map_err(|_| ZkpError::InvalidProof)?;
        proof.c.serialize_compressed(&mut pi_c).map_err(|_| ZkpError::InvalidProof)?;
        Ok(Self { pi_a, pi_b, pi_c })
    }

    /// Decodes into an arkworks proof
    ///
    /// Decoding checks that every point is on the curve and in the prime-order
    /// subgroup. Returns `None` on any failure.
    pub fn to_ark(&self) -> Option<Proof<Bls12_381>> {
        let a = G1Affine::deserialize_compressed(self.pi_a.as_slice()).ok()?;
        let b = G2Affine::deserialize_compressed(self.pi_b.as_slice()).ok()?;
        let c = G1Affine::deserialize_compressed(self.pi_c.as_slice()).ok()?;
        Some(Proof { a, b, c })
    }
}

/// Groth16 verification capability
///
/// Implementations must be side-effect free. Any failure other than a clean
/// accept (malformed points, subgroup failures, malformed keys) is reported
/// as `false`.
pub trait Groth16Verifier: Send + Sync {
    /// Verifies `proof` against `public_signals`
    fn verify(&self, proof: &Groth16Proof, public_signals: &[FieldElement]) -> bool;
}

/// Groth16 verifier over BLS12-381 backed by arkworks
pub struct ArkGroth16Verifier {
    pvk: PreparedVerifyingKey<Bls12_381>,
}

impl ArkGroth16Verifier {
    /// Creates a verifier from a verifying key
    pub fn new(vk: &VerifyingKey<Bls12_381>) -> Self { Self { pvk: prepare_verifying_key(vk) } }

    /// Creates a verifier from a compressed verifying key encoding
    pub fn from_bytes(vk_bytes: &[u8]) -> Result<Self> {
        let vk = VerifyingKey::<Bls12_381>::deserialize_compressed(vk_bytes)
            .map_err(|_| ZkpError::InvalidProof)?;
        Ok(Self::new(&vk))
    }

    /// Number of public inputs the key expects
    pub fn public_input_count(&self) -> usize { self.pvk.vk.gamma_abc_g1.len().saturating_sub(1) }
}

impl std::fmt::Debug for ArkGroth16Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArkGroth16Verifier")
            .field("public_inputs", &self.public_input_count())
            .finish()
    }
}

impl Groth16Verifier for ArkGroth16Verifier {
    fn verify(&self, proof: &Groth16Proof, public_signals: &[FieldElement]) -> bool {
        if public_signals.len() != self.public_input_count() {
            return false;
        }
        if !public_signals.iter().all(is_canonical) {
            return false;
        }
        let Some(proof) = proof.to_ark() else {
            return false;
        };
        let inputs: Vec<Fr> =
            public_signals.iter().map(|signal| Fr::from_be_bytes_mod_order(signal)).collect();

        Groth16::<Bls12_381>::verify_with_processed_vk(&self.pvk, &inputs, &proof).unwrap_or(false)
    }
}

/// Converts a scalar into a 32-byte big-endian field element
pub fn fr_to_field_element(value: &Fr) -> FieldElement {
    let bytes = value.into_bigint().to_bytes_be();
    let mut out = [0u8; 32];
    out[32 - bytes.len()..].copy_from_slice(&bytes);
    out
}
