//! Pull-based tick execution

use std::collections::BTreeMap;

use tracing::debug;

use crate::api::NodePoll;

use super::pipeline::{NodeId, Pipeline};

impl Pipeline {
	/// Run one tick.
	///
	/// Every sink, in ascending id order, demands one value from its
	/// upstream chain. Returns `true` iff every sink observed
	/// [`NodePoll::Closed`] this tick, i.e. the pipeline is exhausted.
	///
	/// `step` never changes the pipeline's structure. Each node is
	/// polled at most once per tick; a node with a dry or closed
	/// upstream is not polled at all this tick. Only a valid pipeline
	/// (see [`is_valid`](Self::is_valid)) is guaranteed to make
	/// progress here.
	pub fn step(&self) -> bool {
		let mut memo: BTreeMap<NodeId, NodePoll> = BTreeMap::new();

		let mut all_closed = true;
		let sinks: Vec<NodeId> = self
			.nodes
			.iter()
			.filter(|(_, entry)| entry.is_sink())
			.map(|(&id, _)| id)
			.collect();
		for id in sinks {
			if !self.demand(id, &mut memo).is_closed() {
				all_closed = false;
			}
		}

		debug!(
			source = "pipeline",
			summary = "Finished tick",
			nodes_seen = memo.len(),
			exhausted = all_closed,
		);
		all_closed
	}

	/// Run this pipeline until every sink is closed.
	///
	/// The pipeline must be valid when this is called.
	pub fn run(&self) {
		assert!(self.is_valid(), "tried to run an invalid pipeline");
		while !self.step() {}
	}

	/// What does node `id` observe this tick?
	///
	/// The node is polled only after all of its upstream nodes
	/// produced a value. Closure and emptiness are inherited from
	/// upstream without polling the node itself: closure wins over
	/// emptiness, so the upstream scan stops at the first closed
	/// node but keeps going past a dry one.
	fn demand(&self, id: NodeId, memo: &mut BTreeMap<NodeId, NodePoll>) -> NodePoll {
		if let Some(&observed) = memo.get(&id) {
			return observed;
		}

		let entry = &self.nodes[&id];

		let mut upstream = NodePoll::Ready;
		for &up in entry.connections.values() {
			match self.demand(up, memo) {
				NodePoll::Closed => {
					upstream = NodePoll::Closed;
					break;
				}
				NodePoll::Empty => upstream = NodePoll::Empty,
				NodePoll::Ready => {}
			}
		}

		let observed = match upstream {
			NodePoll::Ready => {
				let polled = entry.node.borrow_mut().poll_next();
				debug!(
					source = "pipeline",
					summary = "Polled node",
					node = %id,
					result = ?polled,
				);
				polled
			}
			suppressed => suppressed,
		};

		memo.insert(id, observed);
		observed
	}
}
