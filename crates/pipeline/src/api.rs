//! Traits that allow external code to define pipeline nodes

use std::any::Any;
use std::cell::{Ref, RefCell};
use std::fmt::Debug;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::data::PortType;

/// The result of one tick of a [`PipelineNode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodePoll {
	/// This node produced a new value.
	Ready,

	/// This node has nothing to give right now,
	/// but may produce again on a later tick.
	Empty,

	/// This node will never produce a value again.
	Closed,
}

impl NodePoll {
	/// Is this [`NodePoll::Ready`]?
	pub fn is_ready(&self) -> bool {
		matches!(self, Self::Ready)
	}

	/// Is this [`NodePoll::Empty`]?
	pub fn is_empty(&self) -> bool {
		matches!(self, Self::Empty)
	}

	/// Is this [`NodePoll::Closed`]?
	pub fn is_closed(&self) -> bool {
		matches!(self, Self::Closed)
	}
}

/// A shared handle to a node owned by a pipeline.
pub type NodeRef = Rc<RefCell<dyn PipelineNode>>;

/// An instance of a pipeline node.
///
/// A node pulls values from the slots bound via [`connect`](Self::connect),
/// transforms them, and exposes its own output through
/// [`value_any`](Self::value_any). The pipeline drives it one tick at
/// a time through [`poll_next`](Self::poll_next).
pub trait PipelineNode: 'static {
	/// This node's display label. Not necessarily unique.
	fn name(&self) -> &str;

	/// Produce this node's next value.
	///
	/// The pipeline only calls this after every one of this node's
	/// inputs produced a fresh value this tick, and calls it at most
	/// once per tick.
	fn poll_next(&mut self) -> NodePoll;

	/// Bind `source` to the input with index `slot`, or clear that
	/// input if `source` is `None`.
	///
	/// The pipeline checks slot bounds and port types before calling
	/// this, and never calls it on a node with no inputs.
	fn connect(&mut self, source: Option<NodeRef>, slot: usize);

	/// The value this node produced on its last `Ready` poll,
	/// type-erased. `None` if this node is a sink.
	fn value_any(&self) -> Option<&dyn Any> {
		None
	}
}

/// Compile-time port description of a node type.
///
/// This is what makes a type usable with
/// [`Pipeline::create_node`](crate::Pipeline::create_node): the inputs
/// must be described by a tuple (possibly empty), and an output type
/// must be named. A source has `Inputs = ()`; a sink has `Output = ()`.
pub trait StaticNode: PipelineNode + Sized {
	/// The types of this node's inputs, in slot order.
	type Inputs: InputTuple;

	/// The type of this node's output. `()` if this node is a sink.
	type Output: 'static;

	/// The port token of each input, in slot order.
	fn input_types() -> Vec<PortType> {
		Self::Inputs::port_types()
	}

	/// The port token of this node's output.
	fn output_type() -> PortType {
		PortType::of::<Self::Output>()
	}
}

/// A fixed-arity, ordered list of input types.
///
/// Implemented for tuples only, up to arity 8. A node whose input
/// description is not a tuple cannot be added to a pipeline.
pub trait InputTuple {
	/// How many inputs this list describes.
	const ARITY: usize;

	/// The port token of each input, in slot order.
	fn port_types() -> Vec<PortType>;
}

impl InputTuple for () {
	const ARITY: usize = 0;

	fn port_types() -> Vec<PortType> {
		Vec::new()
	}
}

macro_rules! impl_input_tuple {
	($arity:expr, $($ty:ident),+) => {
		impl<$($ty: 'static),+> InputTuple for ($($ty,)+) {
			const ARITY: usize = $arity;

			fn port_types() -> Vec<PortType> {
				vec![$(PortType::of::<$ty>()),+]
			}
		}
	};
}

impl_input_tuple!(1, A);
impl_input_tuple!(2, A, B);
impl_input_tuple!(3, A, B, C);
impl_input_tuple!(4, A, B, C, D);
impl_input_tuple!(5, A, B, C, D, E);
impl_input_tuple!(6, A, B, C, D, E, F);
impl_input_tuple!(7, A, B, C, D, E, F, G);
impl_input_tuple!(8, A, B, C, D, E, F, G, H);

/// One typed input of a node.
///
/// Holds the upstream handle the pipeline binds through
/// [`PipelineNode::connect`] and reads that node's current value with
/// a checked downcast. Nodes keep one of these per input slot and
/// dispatch on the slot index inside their `connect`.
pub struct InputSlot<T> {
	source: Option<NodeRef>,
	_marker: PhantomData<fn() -> T>,
}

impl<T: 'static> InputSlot<T> {
	/// Make a new, unbound slot.
	pub fn new() -> Self {
		Self {
			source: None,
			_marker: PhantomData,
		}
	}

	/// Bind this slot to `source`, or clear it.
	pub fn bind(&mut self, source: Option<NodeRef>) {
		self.source = source;
	}

	/// Is this slot bound to an upstream node?
	pub fn is_bound(&self) -> bool {
		self.source.is_some()
	}

	/// Borrow the current value of the upstream node.
	///
	/// `None` if this slot is unbound, or if the upstream node's
	/// value is not a `T`.
	pub fn value(&self) -> Option<Ref<'_, T>> {
		let source = self.source.as_ref()?;
		Ref::filter_map(source.borrow(), |node| {
			node.value_any().and_then(|value| value.downcast_ref::<T>())
		})
		.ok()
	}
}

impl<T> Debug for InputSlot<T> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("InputSlot")
			.field("bound", &self.source.is_some())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testutil::Count;

	#[test]
	fn poll_predicates() {
		assert!(NodePoll::Ready.is_ready());
		assert!(NodePoll::Empty.is_empty());
		assert!(NodePoll::Closed.is_closed());
		assert!(!NodePoll::Ready.is_closed());
	}

	#[test]
	fn tuple_descriptions() {
		assert_eq!(<() as InputTuple>::ARITY, 0);
		assert_eq!(<(i64,) as InputTuple>::ARITY, 1);
		assert_eq!(<(i64, u8) as InputTuple>::ARITY, 2);

		assert_eq!(
			<(i64, u8) as InputTuple>::port_types(),
			vec![PortType::of::<i64>(), PortType::of::<u8>()]
		);
	}

	#[test]
	fn slot_reads_upstream_value() {
		let upstream: NodeRef = Rc::new(RefCell::new(Count::new("count", 3)));
		upstream.borrow_mut().poll_next();

		let mut slot = InputSlot::<i32>::new();
		assert!(!slot.is_bound());
		assert!(slot.value().is_none());

		slot.bind(Some(upstream.clone()));
		assert!(slot.is_bound());
		assert_eq!(*slot.value().unwrap(), 1);

		// A downcast to the wrong type misses
		let bad = InputSlot::<String> {
			source: Some(upstream),
			_marker: PhantomData,
		};
		assert!(bad.value().is_none());

		slot.bind(None);
		assert!(slot.value().is_none());
	}
}
