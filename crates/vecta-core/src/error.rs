//! Error types for document-model misuse.
//!
//! These never reach the user: the editor session logs them and turns the
//! offending gesture step into a no-op.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    /// The index does not address an item.
    #[error("item index {index} out of range (document has {len} items)")]
    IndexOutOfRange { index: usize, len: usize },

    /// The patch carries fields the target item variant does not have.
    #[error("patch does not apply to a {kind} item: {reason}")]
    PatchMismatch {
        kind: &'static str,
        reason: &'static str,
    },

    /// `end_transaction` without a matching `begin_transaction`.
    #[error("end_transaction called with no open transaction")]
    UnbalancedTransaction,
}
