//! Structural validity checks

use petgraph::algo::toposort;
use petgraph::graphmap::{DiGraphMap, UnGraphMap};
use petgraph::visit::Dfs;

use super::pipeline::Pipeline;

impl Pipeline {
	/// Is this pipeline ready to run?
	///
	/// True iff all of the following hold:
	/// - every input slot of every node is filled,
	/// - every non-sink's output feeds at least one slot,
	/// - there is at least one sink and at least one source,
	/// - the graph has no directed cycle,
	/// - the graph is one piece (connected, ignoring direction).
	///
	/// Never errors; a broken pipeline is just not valid.
	pub fn is_valid(&self) -> bool {
		// Every input slot must be filled...
		if self
			.nodes
			.values()
			.any(|entry| entry.connections.len() != entry.arity())
		{
			return false;
		}

		// ...and every value produced must go somewhere.
		if self
			.nodes
			.values()
			.any(|entry| !entry.is_sink() && entry.dependencies.is_empty())
		{
			return false;
		}

		// A pipeline with nothing to produce values, or nothing to
		// consume them, can't do any work.
		if !self.nodes.values().any(|entry| entry.is_sink()) {
			return false;
		}
		if !self.nodes.values().any(|entry| entry.is_source()) {
			return false;
		}

		if self.has_cycle() {
			return false;
		}

		self.is_connected()
	}

	/// Does this pipeline's graph have a directed cycle?
	fn has_cycle(&self) -> bool {
		let mut shadow = DiGraphMap::<u64, ()>::new();
		for (&id, entry) in &self.nodes {
			shadow.add_node(id.as_u64());
			for &up in entry.connections.values() {
				// A node feeding itself is already a cycle
				if up == id {
					return true;
				}
				shadow.add_edge(up.as_u64(), id.as_u64(), ());
			}
		}
		toposort(&shadow, None).is_err()
	}

	/// Is every node reachable from every other, ignoring direction?
	fn is_connected(&self) -> bool {
		let start = match self.nodes.keys().next() {
			Some(id) => id.as_u64(),
			None => return true,
		};

		let mut shadow = UnGraphMap::<u64, ()>::new();
		for (&id, entry) in &self.nodes {
			shadow.add_node(id.as_u64());
			for &up in entry.connections.values() {
				// Self-edges don't affect connectivity
				if up != id {
					shadow.add_edge(up.as_u64(), id.as_u64(), ());
				}
			}
		}

		let mut reached = 0;
		let mut dfs = Dfs::new(&shadow, start);
		while dfs.next(&shadow).is_some() {
			reached += 1;
		}
		reached == self.nodes.len()
	}
}
