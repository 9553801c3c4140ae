//! Capacity-sized verifier dispatch
//!
//! Each supported commitment-tree capacity has its own Groth16 verifying key.
//! Larger capacities may ship several verifier variants that differ only in
//! how the input-commitment (IC) terms are split. The dispatcher routes on
//! the channel's tree size and always picks the canonical variant for it;
//! callers cannot choose a variant.

use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::debug;

use super::groth16::{Groth16Proof, Groth16Verifier};
use crate::errors::ConfigError;
use crate::types::FieldElement;
use crate::Result;

/// Supported commitment-tree capacities
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TreeSize {
    /// 16 leaves
    Leaves16,
    /// 32 leaves
    Leaves32,
    /// 64 leaves
    Leaves64,
    /// 128 leaves
    Leaves128,
}

impl TreeSize {
    /// All supported capacities, ascending
    pub const ALL: [TreeSize; 4] =
        [TreeSize::Leaves16, TreeSize::Leaves32, TreeSize::Leaves64, TreeSize::Leaves128];

    /// Number of leaves
    pub const fn capacity(self) -> usize {
        match self {
            TreeSize::Leaves16 => 16,
            TreeSize::Leaves32 => 32,
            TreeSize::Leaves64 => 64,
            TreeSize::Leaves128 => 128,
        }
    }

    /// Length of the public-signal vector: root, keys, balances
    pub const fn signal_len(self) -> usize { 2 * self.capacity() + 1 }

    /// The verifier variant used for this capacity
    pub const fn canonical_variant(self) -> VerifierVariant {
        match self {
            TreeSize::Leaves16 | TreeSize::Leaves32 | TreeSize::Leaves64 => VerifierVariant::Single,
            TreeSize::Leaves128 => VerifierVariant::IcSplit { parts: 2 },
        }
    }

    /// Smallest supported capacity holding `entries` leaves
    pub fn smallest_fitting(entries: usize) -> Option<TreeSize> {
        Self::ALL.into_iter().find(|size| size.capacity() >= entries)
    }
}

impl TryFrom<usize> for TreeSize {
    type Error = ConfigError;

    fn try_from(value: usize) -> std::result::Result<Self, Self::Error> {
        match value {
            16 => Ok(TreeSize::Leaves16),
            32 => Ok(TreeSize::Leaves32),
            64 => Ok(TreeSize::Leaves64),
            128 => Ok(TreeSize::Leaves128),
            other => Err(ConfigError::UnsupportedTreeSize(other)),
        }
    }
}

/// How a verifier groups its input-commitment terms
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum VerifierVariant {
    /// All IC terms in one commitment
    Single,
    /// IC terms split across `parts` commitments
    IcSplit {
        /// Number of IC groups
        parts: u8,
    },
}

type VariantBank = BTreeMap<VerifierVariant, Arc<dyn Groth16Verifier>>;

/// Registered verification capabilities, one bank per capacity
#[derive(Default)]
pub struct VerifierSet {
    leaves_16: VariantBank,
    leaves_32: VariantBank,
    leaves_64: VariantBank,
    leaves_128: VariantBank,
}

impl VerifierSet {
    /// Creates an empty verifier set
    pub fn new() -> Self { Self::default() }

    /// Registers a verifier for one variant of a capacity, replacing any previous one
    pub fn register(
        &mut self,
        tree_size: TreeSize,
        variant: VerifierVariant,
        verifier: Arc<dyn Groth16Verifier>,
    ) {
        self.bank_mut(tree_size).insert(variant, verifier);
    }

    /// Registers a verifier as the canonical variant of a capacity
    pub fn with_canonical(mut self, tree_size: TreeSize, verifier: Arc<dyn Groth16Verifier>) -> Self {
        self.register(tree_size, tree_size.canonical_variant(), verifier);
        self
    }

    /// Returns true if the canonical variant of `tree_size` is registered
    pub fn supports(&self, tree_size: TreeSize) -> bool {
        self.bank(tree_size).contains_key(&tree_size.canonical_variant())
    }

    /// Verifies a proof against the canonical verifier for `tree_size`
    ///
    /// # Returns
    /// * `Ok(true)` / `Ok(false)` - The verifier's answer
    /// * `Err(ConfigError::SignalLengthMismatch)` - `public_signals` is not `2 * tree_size + 1` long
    /// * `Err(ConfigError::MissingVerifier)` - No canonical verifier registered for the capacity
    pub fn verify(
        &self,
        tree_size: TreeSize,
        proof: &Groth16Proof,
        public_signals: &[FieldElement],
    ) -> Result<bool> {
        let expected = tree_size.signal_len();
        if public_signals.len() != expected {
            return Err(ConfigError::SignalLengthMismatch {
                expected,
                actual: public_signals.len(),
            }
            .into());
        }

        let variant = tree_size.canonical_variant();
        let verifier = self
            .bank(tree_size)
            .get(&variant)
            .ok_or(ConfigError::MissingVerifier { tree_size, variant })?;

        debug!(?tree_size, ?variant, "dispatching groth16 verification");
        Ok(verifier.verify(proof, public_signals))
    }

    fn bank(&self, tree_size: TreeSize) -> &VariantBank {
        match tree_size {
            TreeSize::Leaves16 => &self.leaves_16,
            TreeSize::Leaves32 => &self.leaves_32,
            TreeSize::Leaves64 => &self.leaves_64,
            TreeSize::Leaves128 => &self.leaves_128,
        }
    }

    fn bank_mut(&mut self, tree_size: TreeSize) -> &mut VariantBank {
        match tree_size {
            TreeSize::Leaves16 => &mut self.leaves_16,
            TreeSize::Leaves32 => &mut self.leaves_32,
            TreeSize::Leaves64 => &mut self.leaves_64,
            TreeSize::Leaves128 => &mut self.leaves_128,
        }
    }
}

impl std::fmt::Debug for VerifierSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registered = |bank: &VariantBank| bank.keys().copied().collect::<Vec<_>>();
        f.debug_struct("VerifierSet")
            .field("leaves_16", &registered(&self.leaves_16))
            .field("leaves_32", &registered(&self.leaves_32))
            .field("leaves_64", &registered(&self.leaves_64))
            .field("leaves_128", &registered(&self.leaves_128))
            .finish()
    }
}
