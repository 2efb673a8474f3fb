//! Type tokens for pipeline ports

use std::any::{type_name, TypeId};
use std::fmt::Debug;
use std::hash::{Hash, Hasher};

/// A "type" of pipeline data.
///
/// This does NOT carry data. Rather, it tells us what *kind* of value
/// a port produces or consumes. Two tokens are equal if and only if
/// they stand for the same Rust type.
///
/// The token of `()` is special: a node whose output is `()` produces
/// nothing, which makes it a sink.
#[derive(Clone, Copy)]
pub struct PortType {
	id: TypeId,
	name: &'static str,
}

impl PortType {
	/// Get the token of the type `T`.
	pub fn of<T: 'static>() -> Self {
		Self {
			id: TypeId::of::<T>(),
			name: type_name::<T>(),
		}
	}

	/// The token of `()`, which marks "no value".
	pub fn void() -> Self {
		Self::of::<()>()
	}

	/// Is this the token of `()`?
	pub fn is_void(&self) -> bool {
		self.id == TypeId::of::<()>()
	}

	/// The name of the type this token stands for.
	///
	/// Only useful for diagnostics. Never compare type names,
	/// compare tokens.
	pub fn type_name(&self) -> &'static str {
		self.name
	}
}

impl Debug for PortType {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "PortType({})", self.name)
	}
}

impl PartialEq for PortType {
	fn eq(&self, other: &Self) -> bool {
		self.id == other.id
	}
}

impl Eq for PortType {}

impl Hash for PortType {
	fn hash<H: Hasher>(&self, state: &mut H) {
		self.id.hash(state);
	}
}
