use std::any::Any;

use rill_pipeline::api::{InputSlot, NodePoll, NodeRef, PipelineNode, StaticNode};
use smartstring::{LazyCompact, SmartString};

/// A component that adds its two inputs.
pub struct Sum {
	name: SmartString<LazyCompact>,
	lhs: InputSlot<i64>,
	rhs: InputSlot<i64>,
	current: i64,
}

impl Sum {
	/// Make a new sum component.
	pub fn new(name: &str) -> Self {
		Self {
			name: name.into(),
			lhs: InputSlot::new(),
			rhs: InputSlot::new(),
			current: 0,
		}
	}
}

impl PipelineNode for Sum {
	fn name(&self) -> &str {
		&self.name
	}

	fn poll_next(&mut self) -> NodePoll {
		let lhs = self.lhs.value().map(|value| *value);
		let rhs = self.rhs.value().map(|value| *value);
		match (lhs, rhs) {
			(Some(lhs), Some(rhs)) => {
				self.current = lhs + rhs;
				NodePoll::Ready
			}

			// An open input slot. Can't happen in a valid pipeline.
			_ => NodePoll::Empty,
		}
	}

	fn connect(&mut self, source: Option<NodeRef>, slot: usize) {
		match slot {
			0 => self.lhs.bind(source),
			1 => self.rhs.bind(source),
			_ => unreachable!("sum has exactly two inputs"),
		}
	}

	fn value_any(&self) -> Option<&dyn Any> {
		Some(&self.current)
	}
}

impl StaticNode for Sum {
	type Inputs = (i64, i64);
	type Output = i64;
}
