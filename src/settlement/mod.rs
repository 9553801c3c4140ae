//! Settlement checks
//!
//! Pure accounting validation applied to a proposed final balance matrix
//! before any settlement is persisted.

pub mod conservation;

pub use conservation::{ensure_matrix_shape, validate_conservation};
