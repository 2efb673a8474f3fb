use std::any::Any;

use rill_pipeline::api::{NodePoll, NodeRef, PipelineNode, StaticNode};
use smartstring::{LazyCompact, SmartString};

/// A counter that only delivers every other value.
///
/// Advances one count per poll, up to `bound`. Even counts are
/// delivered; odd counts are skipped with [`NodePoll::Empty`].
/// Closes once the count passes `bound`.
pub struct SkipCounter {
	name: SmartString<LazyCompact>,
	bound: i64,
	current: i64,
}

impl SkipCounter {
	/// Make a new skipping counter with the given bound.
	pub fn new(name: &str, bound: i64) -> Self {
		Self {
			name: name.into(),
			bound,
			current: 0,
		}
	}
}

impl PipelineNode for SkipCounter {
	fn name(&self) -> &str {
		&self.name
	}

	fn poll_next(&mut self) -> NodePoll {
		if self.current >= self.bound {
			return NodePoll::Closed;
		}
		self.current += 1;
		if self.current % 2 == 0 {
			NodePoll::Ready
		} else {
			NodePoll::Empty
		}
	}

	fn connect(&mut self, _source: Option<NodeRef>, _slot: usize) {
		unreachable!("a source has no input slots")
	}

	fn value_any(&self) -> Option<&dyn Any> {
		Some(&self.current)
	}
}

impl StaticNode for SkipCounter {
	type Inputs = ();
	type Output = i64;
}
