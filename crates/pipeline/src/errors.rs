//! Errors we may encounter when editing a pipeline

use thiserror::Error;

/// An error we encounter when wiring a pipeline.
///
/// Every editing operation checks all of its preconditions before
/// touching anything. If a call returns one of these, the pipeline
/// is exactly as it was before the call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PipelineError {
	/// A node id does not name a live node in this pipeline
	#[error("invalid node ID")]
	InvalidNodeId,

	/// A slot index is out of range for the target node
	#[error("no such slot")]
	NoSuchSlot,

	/// The target slot is already fed by another connection
	#[error("slot already used")]
	SlotAlreadyUsed,

	/// An output's type does not match the slot it should feed
	#[error("connection type mismatch")]
	ConnectionTypeMismatch,
}
