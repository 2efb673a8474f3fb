use std::any::Any;

use rill_pipeline::api::{NodePoll, NodeRef, PipelineNode, StaticNode};
use smartstring::{LazyCompact, SmartString};

/// A source that counts upward from 1.
///
/// Produces `1, 2, …, bound`, then closes.
pub struct Counter {
	name: SmartString<LazyCompact>,
	bound: i64,
	current: i64,
}

impl Counter {
	/// Make a new counter that stops after `bound` values.
	pub fn new(name: &str, bound: i64) -> Self {
		Self {
			name: name.into(),
			bound,
			current: 0,
		}
	}
}

impl PipelineNode for Counter {
	fn name(&self) -> &str {
		&self.name
	}

	fn poll_next(&mut self) -> NodePoll {
		if self.current >= self.bound {
			return NodePoll::Closed;
		}
		self.current += 1;
		NodePoll::Ready
	}

	fn connect(&mut self, _source: Option<NodeRef>, _slot: usize) {
		unreachable!("a source has no input slots")
	}

	fn value_any(&self) -> Option<&dyn Any> {
		Some(&self.current)
	}
}

impl StaticNode for Counter {
	type Inputs = ();
	type Output = i64;
}
