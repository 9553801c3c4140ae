//! Schnorr signature recovery over secp256k1
//!
//! Verifies FROST-compatible Schnorr signatures: `z·G == R + c·PK` with
//! `c = SHA-256(tag || R || PK || message) mod n`, points compressed (SEC1).
//! Threshold signatures aggregate additively, so a t-of-n group signature
//! verifies exactly like a single-key signature against the group key.

use k256::elliptic_curve::ops::Reduce;
use k256::elliptic_curve::sec1::{FromEncodedPoint, ToEncodedPoint};
use k256::elliptic_curve::PrimeField;
use k256::{AffinePoint, EncodedPoint, FieldBytes, ProjectivePoint, Scalar, U256};
use sha2::{Digest, Sha256};

use super::{derive_signer_address, GroupPublicKey, SignatureVerifier, ThresholdSignature};
use crate::types::{Address, Bytes32, SCHNORR_DOMAIN_TAG, ZERO_ADDRESS};

/// Schnorr recovery capability over secp256k1
#[derive(Clone, Copy, Debug, Default)]
pub struct SchnorrSecp256k1Verifier;

impl SignatureVerifier for SchnorrSecp256k1Verifier {
    fn recover(
        &self,
        message: &Bytes32,
        public_key: &GroupPublicKey,
        signature: &ThresholdSignature,
    ) -> Address {
        match verify(message, public_key, signature) {
            Some(true) => derive_signer_address(public_key),
            _ => ZERO_ADDRESS,
        }
    }
}

/// Computes the challenge scalar for nonce commitment `r` and public key `pk`
pub fn schnorr_challenge(r: &AffinePoint, pk: &AffinePoint, message: &Bytes32) -> Scalar {
    let mut hasher = Sha256::new();
    hasher.update(SCHNORR_DOMAIN_TAG);
    hasher.update(r.to_encoded_point(true).as_bytes());
    hasher.update(pk.to_encoded_point(true).as_bytes());
    hasher.update(message);
    let digest: FieldBytes = hasher.finalize();
    <Scalar as Reduce<U256>>::reduce_bytes(&digest)
}

/// `None` when an input does not decode
fn verify(
    message: &Bytes32,
    public_key: &GroupPublicKey,
    signature: &ThresholdSignature,
) -> Option<bool> {
    let pk = decode_point(&public_key.x, &public_key.y)?;
    let r = decode_point(&signature.rx, &signature.ry)?;
    let z = Option::<Scalar>::from(Scalar::from_repr(*FieldBytes::from_slice(&signature.z)))?;

    let c = schnorr_challenge(&r, &pk, message);
    let lhs = ProjectivePoint::GENERATOR * z;
    let rhs = ProjectivePoint::from(r) + ProjectivePoint::from(pk) * c;
    Some(lhs == rhs)
}

fn decode_point(x: &Bytes32, y: &Bytes32) -> Option<AffinePoint> {
    let encoded = EncodedPoint::from_affine_coordinates(
        FieldBytes::from_slice(x),
        FieldBytes::from_slice(y),
        false,
    );
    Option::from(AffinePoint::from_encoded_point(&encoded))
}
