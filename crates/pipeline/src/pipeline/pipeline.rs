//! Core pipeline structs

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::{Debug, Display};
use std::rc::Rc;

use tracing::debug;

use crate::api::{NodeRef, StaticNode};
use crate::data::PortType;
use crate::errors::PipelineError;

/// A pipeline node's id.
///
/// Ids are handed out by [`Pipeline::create_node`]. They are unique
/// within one pipeline and are never reused, even after their node
/// has been erased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u64);

impl NodeId {
	/// Get this id as a `u64`
	pub fn as_u64(&self) -> u64 {
		self.0
	}
}

impl Display for NodeId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		Display::fmt(&self.0, f)
	}
}

/// Everything a pipeline keeps about one node.
///
/// Port tokens are captured once, when the node is created.
/// Connection state is kept redundantly on both ends of each edge,
/// which makes reads fast.
pub(crate) struct NodeEntry {
	/// The node itself
	pub(crate) node: NodeRef,

	/// The port token of each input, in slot order.
	/// Fixed at creation; its length is the node's arity.
	pub(crate) input_types: Vec<PortType>,

	/// The port token of this node's output.
	/// The void token marks a sink.
	pub(crate) output_type: PortType,

	/// Which upstream node feeds each input slot.
	/// A key is present iff that slot is filled.
	pub(crate) connections: BTreeMap<usize, NodeId>,

	/// Every input slot this node's output feeds, as
	/// `(downstream id, downstream slot)`. One entry per edge;
	/// the same downstream node may appear more than once.
	pub(crate) dependencies: Vec<(NodeId, usize)>,
}

impl NodeEntry {
	/// How many inputs this node has.
	pub(crate) fn arity(&self) -> usize {
		self.input_types.len()
	}

	/// Is this node a sink?
	pub(crate) fn is_sink(&self) -> bool {
		self.output_type.is_void()
	}

	/// Is this node a source?
	pub(crate) fn is_source(&self) -> bool {
		self.input_types.is_empty()
	}
}

/// A data processing pipeline.
///
/// Owns a registry of nodes and the edges between them. Hosts create
/// nodes with [`create_node`](Self::create_node), wire them with
/// [`connect`](Self::connect), check the result with
/// [`is_valid`](Self::is_valid), and drive it with
/// [`step`](Self::step) or [`run`](Self::run).
///
/// Pipelines own their nodes exclusively and cannot be cloned.
/// `std::mem::take` is the move-out idiom: the taken-from pipeline is
/// left empty but usable, with fresh id allocation.
pub struct Pipeline {
	/// All live nodes in this pipeline, ordered by id.
	pub(crate) nodes: BTreeMap<NodeId, NodeEntry>,

	/// The id the next created node will get.
	/// Starts at 1 and only ever grows.
	next_id: u64,
}

impl Default for Pipeline {
	fn default() -> Self {
		Self::new()
	}
}

impl Debug for Pipeline {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut map = f.debug_map();
		for (id, entry) in &self.nodes {
			map.entry(
				&id.as_u64(),
				&format_args!(
					"{:?} ({} in, {} out)",
					entry.node.borrow().name(),
					entry.arity(),
					entry.output_type.type_name(),
				),
			);
		}
		map.finish()
	}
}

impl Pipeline {
	/// Make a new, empty pipeline.
	pub fn new() -> Self {
		Self {
			nodes: BTreeMap::new(),
			next_id: 1,
		}
	}

	/// Move `node` into this pipeline and give it a fresh id.
	///
	/// The node's port tokens are captured from its
	/// [`StaticNode`] description here and never change.
	pub fn create_node<N: StaticNode>(&mut self, node: N) -> NodeId {
		let id = NodeId(self.next_id);
		self.next_id += 1;

		debug!(
			source = "pipeline",
			summary = "Created node",
			node = %id,
			name = node.name(),
		);

		self.nodes.insert(
			id,
			NodeEntry {
				input_types: N::input_types(),
				output_type: N::output_type(),
				node: Rc::new(RefCell::new(node)),
				connections: BTreeMap::new(),
				dependencies: Vec::new(),
			},
		);

		id
	}

	/// Get a node by id.
	///
	/// Returns `None` if this pipeline has no live node with this id.
	pub fn get_node(&self, id: NodeId) -> Option<NodeRef> {
		self.nodes.get(&id).map(|entry| entry.node.clone())
	}

	/// The number of live nodes in this pipeline.
	pub fn len_nodes(&self) -> usize {
		self.nodes.len()
	}

	/// Does this pipeline have no nodes?
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Iterate over the ids of all live nodes, in ascending order.
	pub fn iter_node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
		self.nodes.keys().copied()
	}

	/// Remove a node from this pipeline.
	///
	/// Every edge touching the node is removed with it: upstream
	/// nodes lose a dependent, downstream nodes get the fed slot
	/// back, unfilled. Downstream nodes are *not* erased.
	pub fn erase_node(&mut self, id: NodeId) -> Result<(), PipelineError> {
		if !self.nodes.contains_key(&id) {
			return Err(PipelineError::InvalidNodeId);
		}

		// Upstream nodes no longer feed us.
		let upstreams: Vec<NodeId> = self.nodes[&id].connections.values().copied().collect();
		for up in upstreams {
			if up == id {
				continue;
			}
			self.nodes
				.get_mut(&up)
				.unwrap()
				.dependencies
				.retain(|(down, _)| *down != id);
		}

		// Downstream slots open up again.
		let downstreams = self.nodes[&id].dependencies.clone();
		for (down, slot) in downstreams {
			if down == id {
				continue;
			}
			let entry = self.nodes.get_mut(&down).unwrap();
			entry.connections.remove(&slot);
			entry.node.borrow_mut().connect(None, slot);
		}

		debug!(source = "pipeline", summary = "Erased node", node = %id);
		self.nodes.remove(&id);
		Ok(())
	}

	/// Connect the output of `src` to input `slot` of `dst`.
	///
	/// Checks, in order: both ids must be live
	/// ([`InvalidNodeId`](PipelineError::InvalidNodeId)), the slot
	/// must not already be fed
	/// ([`SlotAlreadyUsed`](PipelineError::SlotAlreadyUsed)), the
	/// slot must exist ([`NoSuchSlot`](PipelineError::NoSuchSlot)),
	/// and the port types must match
	/// ([`ConnectionTypeMismatch`](PipelineError::ConnectionTypeMismatch)).
	/// All checks happen before any mutation.
	pub fn connect(&mut self, src: NodeId, dst: NodeId, slot: usize) -> Result<(), PipelineError> {
		let (src_entry, dst_entry) = match (self.nodes.get(&src), self.nodes.get(&dst)) {
			(Some(s), Some(d)) => (s, d),
			_ => return Err(PipelineError::InvalidNodeId),
		};

		if dst_entry.connections.contains_key(&slot) {
			return Err(PipelineError::SlotAlreadyUsed);
		}

		if slot >= dst_entry.arity() {
			return Err(PipelineError::NoSuchSlot);
		}

		if src_entry.output_type != dst_entry.input_types[slot] {
			return Err(PipelineError::ConnectionTypeMismatch);
		}

		let src_node = src_entry.node.clone();
		dst_entry.node.borrow_mut().connect(Some(src_node), slot);

		self.nodes
			.get_mut(&dst)
			.unwrap()
			.connections
			.insert(slot, src);
		self.nodes
			.get_mut(&src)
			.unwrap()
			.dependencies
			.push((dst, slot));

		debug!(
			source = "pipeline",
			summary = "Connected nodes",
			src = %src,
			dst = %dst,
			slot,
		);
		Ok(())
	}

	/// Remove every connection from the output of `src` into `dst`.
	///
	/// A silent no-op if the two nodes are not connected.
	pub fn disconnect(&mut self, src: NodeId, dst: NodeId) -> Result<(), PipelineError> {
		if !self.nodes.contains_key(&src) || !self.nodes.contains_key(&dst) {
			return Err(PipelineError::InvalidNodeId);
		}

		// Snapshot the matching slots first, then erase. Erasing
		// while iterating the connection map would skip entries.
		let slots: Vec<usize> = self.nodes[&dst]
			.connections
			.iter()
			.filter(|(_, up)| **up == src)
			.map(|(slot, _)| *slot)
			.collect();

		for &slot in &slots {
			let entry = self.nodes.get_mut(&dst).unwrap();
			entry.connections.remove(&slot);
			entry.node.borrow_mut().connect(None, slot);
		}

		self.nodes
			.get_mut(&src)
			.unwrap()
			.dependencies
			.retain(|(down, _)| *down != dst);

		if !slots.is_empty() {
			debug!(
				source = "pipeline",
				summary = "Disconnected nodes",
				src = %src,
				dst = %dst,
				n_slots = slots.len(),
			);
		}
		Ok(())
	}

	/// Get every input slot fed by the output of node `id`, as
	/// `(downstream id, downstream slot)` pairs.
	///
	/// Returns a snapshot; later edits don't change it.
	pub fn get_dependencies(&self, id: NodeId) -> Result<Vec<(NodeId, usize)>, PipelineError> {
		self.nodes
			.get(&id)
			.map(|entry| entry.dependencies.clone())
			.ok_or(PipelineError::InvalidNodeId)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::testutil::{Add, AddOne, Bytes, Count, Swallow};

	/// Check that `connections` and `dependencies` mirror each other
	/// exactly, in both directions.
	fn assert_mirrored(pipeline: &Pipeline) {
		for (&id, entry) in &pipeline.nodes {
			for (&slot, &up) in &entry.connections {
				assert!(slot < entry.arity());
				let matching = pipeline.nodes[&up]
					.dependencies
					.iter()
					.filter(|&&(down, down_slot)| down == id && down_slot == slot)
					.count();
				assert_eq!(matching, 1, "connection {up} -> {id}:{slot} not mirrored");
			}
			for &(down, slot) in &entry.dependencies {
				assert_eq!(pipeline.nodes[&down].connections.get(&slot), Some(&id));
			}
		}
	}

	#[test]
	fn ids_are_monotone_and_never_reused() {
		let mut pipeline = Pipeline::new();
		let a = pipeline.create_node(Count::new("a", 1));
		let b = pipeline.create_node(Count::new("b", 1));
		let c = pipeline.create_node(Count::new("c", 1));
		assert_eq!((a.as_u64(), b.as_u64(), c.as_u64()), (1, 2, 3));

		pipeline.erase_node(b).unwrap();
		let d = pipeline.create_node(Count::new("d", 1));
		assert_eq!(d.as_u64(), 4);
		assert_eq!(pipeline.len_nodes(), 3);
	}

	#[test]
	fn get_node_is_stable_until_erased() {
		let mut pipeline = Pipeline::new();
		let id = pipeline.create_node(Count::new("count", 1));

		let first = pipeline.get_node(id).unwrap();
		let second = pipeline.get_node(id).unwrap();
		assert!(Rc::ptr_eq(&first, &second));

		pipeline.erase_node(id).unwrap();
		assert!(pipeline.get_node(id).is_none());
		assert!(pipeline.get_node(NodeId(99)).is_none());
	}

	#[test]
	fn connect_records_both_ends() {
		let mut pipeline = Pipeline::new();
		let src = pipeline.create_node(Count::new("count", 3));
		let sink = pipeline.create_node(Swallow::new("sink"));

		pipeline.connect(src, sink, 0).unwrap();
		assert_eq!(pipeline.get_dependencies(src).unwrap(), vec![(sink, 0)]);
		assert_mirrored(&pipeline);
	}

	#[test]
	fn connect_error_ordering() {
		let mut pipeline = Pipeline::new();
		let count = pipeline.create_node(Count::new("count", 3));
		let bytes = pipeline.create_node(Bytes::new("bytes"));
		let add = pipeline.create_node(Add::new("add"));

		// Unknown ids take precedence over everything
		assert_eq!(
			pipeline.connect(NodeId(99), add, 0),
			Err(PipelineError::InvalidNodeId)
		);
		assert_eq!(
			pipeline.connect(count, NodeId(99), 0),
			Err(PipelineError::InvalidNodeId)
		);

		// A filled slot is reported before the type is looked at
		pipeline.connect(count, add, 0).unwrap();
		assert_eq!(
			pipeline.connect(bytes, add, 0),
			Err(PipelineError::SlotAlreadyUsed)
		);

		assert_eq!(
			pipeline.connect(count, add, 2),
			Err(PipelineError::NoSuchSlot)
		);
		assert_eq!(
			pipeline.connect(bytes, add, 1),
			Err(PipelineError::ConnectionTypeMismatch)
		);

		// A source has no slots at all
		assert_eq!(
			pipeline.connect(bytes, count, 0),
			Err(PipelineError::NoSuchSlot)
		);
	}

	#[test]
	fn failed_connect_changes_nothing() {
		let mut pipeline = Pipeline::new();
		let count = pipeline.create_node(Count::new("count", 3));
		let bytes = pipeline.create_node(Bytes::new("bytes"));
		let add = pipeline.create_node(Add::new("add"));
		pipeline.connect(count, add, 0).unwrap();

		assert!(pipeline.connect(bytes, add, 1).is_err());

		assert_eq!(pipeline.get_dependencies(bytes).unwrap(), vec![]);
		assert_eq!(pipeline.get_dependencies(count).unwrap(), vec![(add, 0)]);
		assert_eq!(
			pipeline.nodes[&add].connections,
			BTreeMap::from([(0, count)])
		);
		assert_mirrored(&pipeline);
	}

	#[test]
	fn erase_detaches_both_sides() {
		let mut pipeline = Pipeline::new();
		let count = pipeline.create_node(Count::new("count", 3));
		let add_one = pipeline.create_node(AddOne::new("add one"));
		let sink = pipeline.create_node(Swallow::new("sink"));
		pipeline.connect(count, add_one, 0).unwrap();
		pipeline.connect(add_one, sink, 0).unwrap();

		pipeline.erase_node(add_one).unwrap();

		assert_eq!(pipeline.get_dependencies(count).unwrap(), vec![]);
		assert!(pipeline.nodes[&sink].connections.is_empty());
		assert!(pipeline.get_node(add_one).is_none());
		assert_eq!(pipeline.len_nodes(), 2);
		assert_mirrored(&pipeline);

		assert_eq!(
			pipeline.erase_node(add_one),
			Err(PipelineError::InvalidNodeId)
		);
	}

	#[test]
	fn disconnect_clears_every_matching_slot() {
		let mut pipeline = Pipeline::new();
		let count = pipeline.create_node(Count::new("count", 3));
		let add = pipeline.create_node(Add::new("add"));
		pipeline.connect(count, add, 0).unwrap();
		pipeline.connect(count, add, 1).unwrap();

		pipeline.disconnect(count, add).unwrap();
		assert!(pipeline.nodes[&add].connections.is_empty());
		assert_eq!(pipeline.get_dependencies(count).unwrap(), vec![]);
		assert_mirrored(&pipeline);

		// Not connected: a silent no-op
		pipeline.disconnect(count, add).unwrap();
		assert_eq!(
			pipeline.disconnect(count, NodeId(99)),
			Err(PipelineError::InvalidNodeId)
		);
	}

	#[test]
	fn take_leaves_a_fresh_pipeline() {
		let mut pipeline = Pipeline::new();
		let count = pipeline.create_node(Count::new("count", 3));
		let sink = pipeline.create_node(Swallow::new("sink"));
		pipeline.connect(count, sink, 0).unwrap();

		let moved = std::mem::take(&mut pipeline);

		assert!(pipeline.get_node(count).is_none());
		assert!(pipeline.is_empty());
		assert!(moved.get_node(count).is_some());
		assert_eq!(moved.get_dependencies(count).unwrap(), vec![(sink, 0)]);

		// The fresh pipeline allocates ids from scratch
		let replacement = pipeline.create_node(Count::new("count", 1));
		assert_eq!(replacement.as_u64(), 1);
	}
}
