//! Channel state machine
//!
//! Owns the ledger, the capacity-sized Groth16 verifier set, the function
//! registry and the verification capabilities, and sequences the two
//! proof-gated transitions:
//!
//! 1. Read the channel record
//! 2. Run the pure transition validator, producing a [`ChannelCommit`]
//! 3. Commit the change set to the ledger in one step
//!
//! Transitions take `&mut self`. Capabilities are only ever reached through
//! shared references while a transition runs, so none of them can re-enter
//! the machine.

use tracing::{info, warn};

use crate::channel::ledger::ChannelLedger;
use crate::channel::transition::{
    validate_initialize, validate_settlement, ChannelCommit, SettlementSubmission,
    SettlementVerifiers,
};
use crate::config::{BridgeConfig, ZkChannelV0Config, DEFAULT_CONFIG};
use crate::signature::SignatureVerifier;
use crate::types::{Address, ChannelId, StateRoot};
use crate::zkp::{
    ExecutionProofVerifier, FunctionRegistry, Groth16Proof, RegisteredFunction, VerifierSet,
};
use crate::Result;

/// Proof-gated channel state machine
pub struct ChannelStateMachine<L, C = ZkChannelV0Config> {
    ledger: L,
    groth16: VerifierSet,
    functions: FunctionRegistry,
    execution_verifier: Box<dyn ExecutionProofVerifier>,
    signature_verifier: Box<dyn SignatureVerifier>,
    config: C,
}

impl<L: ChannelLedger> ChannelStateMachine<L> {
    /// Creates a state machine with the default configuration
    ///
    /// # Arguments
    /// * `ledger` - Channel storage
    /// * `groth16` - Initialization verifiers per tree size
    /// * `execution_verifier` - Execution proof capability
    /// * `signature_verifier` - Signature recovery capability
    pub fn new(
        ledger: L,
        groth16: VerifierSet,
        execution_verifier: Box<dyn ExecutionProofVerifier>,
        signature_verifier: Box<dyn SignatureVerifier>,
    ) -> Self {
        Self::with_config(ledger, groth16, execution_verifier, signature_verifier, DEFAULT_CONFIG)
    }
}

impl<L: ChannelLedger, C: BridgeConfig> ChannelStateMachine<L, C> {
    /// Creates a state machine with an explicit configuration
    pub fn with_config(
        ledger: L,
        groth16: VerifierSet,
        execution_verifier: Box<dyn ExecutionProofVerifier>,
        signature_verifier: Box<dyn SignatureVerifier>,
        config: C,
    ) -> Self {
        Self {
            ledger,
            groth16,
            functions: FunctionRegistry::new(),
            execution_verifier,
            signature_verifier,
            config,
        }
    }

    /// Channel storage
    pub fn ledger(&self) -> &L { &self.ledger }

    /// Mutable channel storage, for collaborator operations
    pub fn ledger_mut(&mut self) -> &mut L { &mut self.ledger }

    /// Initialization verifiers
    pub fn verifiers(&self) -> &VerifierSet { &self.groth16 }

    /// Registered execution functions
    pub fn functions(&self) -> &FunctionRegistry { &self.functions }

    /// Protocol configuration
    pub fn config(&self) -> &C { &self.config }

    /// Registers an execution function
    ///
    /// # Returns
    /// * `Err(ConfigError::FunctionAlreadyRegistered)` - The signature is already registered
    pub fn register_function(&mut self, function: RegisteredFunction) -> Result<()> {
        self.functions.register(function)
    }

    /// Initializes a channel: Initialized → Open
    ///
    /// Builds the expected public signals from the ledger, dispatches the
    /// proof to the verifier matching the channel's tree size and on success
    /// records `root` as the channel's initial state root.
    ///
    /// # Arguments
    /// * `caller` - Identity submitting the proof, must be the leader
    /// * `id` - Channel id
    /// * `root` - Claimed commitment root
    /// * `proof` - Groth16 proof
    ///
    /// # Returns
    /// * `Ok(())` - Channel is `Open`
    /// * `Err(Error)` - Nothing was written
    pub fn initialize_channel(
        &mut self,
        caller: &Address,
        id: ChannelId,
        root: StateRoot,
        proof: &Groth16Proof,
    ) -> Result<()> {
        let commit = self.ledger.channel(id).and_then(|channel| {
            validate_initialize(channel, caller, &root, proof, &self.groth16)
        });
        self.apply(id, "initialize", commit)
    }

    /// Settles a channel: Open | Active → Closing
    ///
    /// Checks registration, execution proofs, conservation and the group
    /// signature, then records the final balances as withdraw amounts.
    ///
    /// # Returns
    /// * `Ok(())` - Channel is `Closing`
    /// * `Err(Error)` - Nothing was written
    pub fn submit_settlement(
        &mut self,
        caller: &Address,
        id: ChannelId,
        submission: &SettlementSubmission,
    ) -> Result<()> {
        let verifiers = SettlementVerifiers {
            registry: &self.functions,
            execution: self.execution_verifier.as_ref(),
            signature: self.signature_verifier.as_ref(),
        };
        let commit = self.ledger.channel(id).and_then(|channel| {
            validate_settlement(&self.config, channel, caller, submission, verifiers)
        });
        self.apply(id, "settlement", commit)
    }

    fn apply(
        &mut self,
        id: ChannelId,
        operation: &'static str,
        commit: Result<ChannelCommit>,
    ) -> Result<()> {
        let result = commit.and_then(|commit| {
            let to = commit.to();
            self.ledger.commit(commit).map(|()| to)
        });
        match result {
            Ok(state) => {
                info!(channel_id = id, operation, state = ?state, "transition committed");
                Ok(())
            }
            Err(err) => {
                warn!(channel_id = id, operation, error = %err, "transition rejected");
                Err(err)
            }
        }
    }
}
