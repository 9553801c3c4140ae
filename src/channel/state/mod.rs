//! Channel lifecycle states
//!
//! State transitions:
//! - Initialized → Open (via initialize transition)
//! - Open → Closing, Active → Closing (via settlement transition)
//! - Open → Active (external, after the channel starts processing)
//! - Closing → Closed (external, after payouts)
//!
//! Channel creation and the `Active`/`Closed` steps belong to ledger
//! collaborators; only the two proof-gated transitions live in this crate.

/// Channel lifecycle enum
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelState {
    /// Channel created, collecting deposits and L2 keys
    Initialized,
    /// Initial commitment verified
    Open,
    /// Processing off-chain transitions
    Active,
    /// Settlement accepted, withdraw amounts recorded
    Closing,
    /// Channel is permanently closed, no further transitions allowed
    Closed,
}

impl ChannelState {
    /// Returns true if the state accepts a settlement submission
    pub const fn accepts_settlement(self) -> bool { matches!(self, Self::Open | Self::Active) }
}
