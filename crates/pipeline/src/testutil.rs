//! Node fixtures used by this crate's tests.
//!
//! Every fixture exposes shared counters so tests can observe
//! how often it was polled without reaching into the pipeline.

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use crate::api::{InputSlot, NodePoll, NodeRef, PipelineNode, StaticNode};

/// A source that counts from 1 to `bound`, then closes.
pub struct Count {
	name: &'static str,
	bound: i32,
	current: i32,

	/// How many times this node has been polled.
	pub polls: Rc<Cell<u32>>,
}

impl Count {
	pub fn new(name: &'static str, bound: i32) -> Self {
		Self {
			name,
			bound,
			current: 0,
			polls: Rc::new(Cell::new(0)),
		}
	}
}

impl PipelineNode for Count {
	fn name(&self) -> &str {
		self.name
	}

	fn poll_next(&mut self) -> NodePoll {
		self.polls.set(self.polls.get() + 1);
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

impl StaticNode for Count {
	type Inputs = ();
	type Output = i32;
}

/// A source that plays back a fixed poll script, then closes.
pub struct Script {
	name: &'static str,
	script: VecDeque<(NodePoll, i32)>,
	current: i32,

	/// How many times this node has been polled.
	pub polls: Rc<Cell<u32>>,
}

impl Script {
	pub fn new(name: &'static str, script: &[(NodePoll, i32)]) -> Self {
		Self {
			name,
			script: script.iter().copied().collect(),
			current: 0,
			polls: Rc::new(Cell::new(0)),
		}
	}
}

impl PipelineNode for Script {
	fn name(&self) -> &str {
		self.name
	}

	fn poll_next(&mut self) -> NodePoll {
		self.polls.set(self.polls.get() + 1);
		match self.script.pop_front() {
			Some((NodePoll::Ready, value)) => {
				self.current = value;
				NodePoll::Ready
			}
			Some((poll, _)) => poll,
			None => NodePoll::Closed,
		}
	}

	fn connect(&mut self, _source: Option<NodeRef>, _slot: usize) {
		unreachable!("a source has no input slots")
	}

	fn value_any(&self) -> Option<&dyn Any> {
		Some(&self.current)
	}
}

impl StaticNode for Script {
	type Inputs = ();
	type Output = i32;
}

/// A source of bytes. Closes immediately.
/// Only good for provoking type mismatches.
pub struct Bytes {
	name: &'static str,
	current: u8,
}

impl Bytes {
	pub fn new(name: &'static str) -> Self {
		Self { name, current: 0 }
	}
}

impl PipelineNode for Bytes {
	fn name(&self) -> &str {
		self.name
	}

	fn poll_next(&mut self) -> NodePoll {
		NodePoll::Closed
	}

	fn connect(&mut self, _source: Option<NodeRef>, _slot: usize) {
		unreachable!("a source has no input slots")
	}

	fn value_any(&self) -> Option<&dyn Any> {
		Some(&self.current)
	}
}

impl StaticNode for Bytes {
	type Inputs = ();
	type Output = u8;
}

/// A component that adds one to its input.
pub struct AddOne {
	name: &'static str,
	input: InputSlot<i32>,
	current: i32,

	/// How many times this node has been polled.
	pub polls: Rc<Cell<u32>>,
}

impl AddOne {
	pub fn new(name: &'static str) -> Self {
		Self {
			name,
			input: InputSlot::new(),
			current: 0,
			polls: Rc::new(Cell::new(0)),
		}
	}
}

impl PipelineNode for AddOne {
	fn name(&self) -> &str {
		self.name
	}

	fn poll_next(&mut self) -> NodePoll {
		self.polls.set(self.polls.get() + 1);
		match self.input.value().map(|value| *value) {
			Some(value) => {
				self.current = value + 1;
				NodePoll::Ready
			}
			None => NodePoll::Empty,
		}
	}

	fn connect(&mut self, source: Option<NodeRef>, slot: usize) {
		match slot {
			0 => self.input.bind(source),
			_ => unreachable!("add one has exactly one input"),
		}
	}

	fn value_any(&self) -> Option<&dyn Any> {
		Some(&self.current)
	}
}

impl StaticNode for AddOne {
	type Inputs = (i32,);
	type Output = i32;
}

/// A component that adds its two inputs.
pub struct Add {
	name: &'static str,
	lhs: InputSlot<i32>,
	rhs: InputSlot<i32>,
	current: i32,
}

impl Add {
	pub fn new(name: &'static str) -> Self {
		Self {
			name,
			lhs: InputSlot::new(),
			rhs: InputSlot::new(),
			current: 0,
		}
	}
}

impl PipelineNode for Add {
	fn name(&self) -> &str {
		self.name
	}

	fn poll_next(&mut self) -> NodePoll {
		let lhs = self.lhs.value().map(|value| *value);
		let rhs = self.rhs.value().map(|value| *value);
		match (lhs, rhs) {
			(Some(lhs), Some(rhs)) => {
				self.current = lhs + rhs;
				NodePoll::Ready
			}
			_ => NodePoll::Empty,
		}
	}

	fn connect(&mut self, source: Option<NodeRef>, slot: usize) {
		match slot {
			0 => self.lhs.bind(source),
			1 => self.rhs.bind(source),
			_ => unreachable!("add has exactly two inputs"),
		}
	}

	fn value_any(&self) -> Option<&dyn Any> {
		Some(&self.current)
	}
}

impl StaticNode for Add {
	type Inputs = (i32, i32);
	type Output = i32;
}

/// A sink that remembers every value it consumes.
pub struct Swallow {
	name: &'static str,
	input: InputSlot<i32>,

	/// Every value this sink has consumed, in order.
	pub seen: Rc<RefCell<Vec<i32>>>,

	/// How many times this node has been polled.
	pub polls: Rc<Cell<u32>>,
}

impl Swallow {
	pub fn new(name: &'static str) -> Self {
		Self {
			name,
			input: InputSlot::new(),
			seen: Rc::new(RefCell::new(Vec::new())),
			polls: Rc::new(Cell::new(0)),
		}
	}
}

impl PipelineNode for Swallow {
	fn name(&self) -> &str {
		self.name
	}

	fn poll_next(&mut self) -> NodePoll {
		self.polls.set(self.polls.get() + 1);
		match self.input.value().map(|value| *value) {
			Some(value) => {
				self.seen.borrow_mut().push(value);
				NodePoll::Ready
			}
			None => NodePoll::Empty,
		}
	}

	fn connect(&mut self, source: Option<NodeRef>, slot: usize) {
		match slot {
			0 => self.input.bind(source),
			_ => unreachable!("swallow has exactly one input"),
		}
	}
}

impl StaticNode for Swallow {
	type Inputs = (i32,);
	type Output = ();
}
