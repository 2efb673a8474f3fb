use std::cell::RefCell;
use std::fmt::{Display, Write};
use std::rc::Rc;

use rill_pipeline::api::{InputSlot, NodePoll, NodeRef, PipelineNode, StaticNode};
use smartstring::{LazyCompact, SmartString};

/// A sink that streams every value it consumes into a shared string
/// buffer, each followed by a single space.
pub struct TextSink<T> {
	name: SmartString<LazyCompact>,
	input: InputSlot<T>,
	buffer: Rc<RefCell<String>>,
}

impl<T: Display + 'static> TextSink<T> {
	/// Make a new text sink.
	///
	/// Grab the buffer handle with [`buffer`](Self::buffer) before
	/// handing the sink to a pipeline.
	pub fn new(name: &str) -> Self {
		Self {
			name: name.into(),
			input: InputSlot::new(),
			buffer: Rc::new(RefCell::new(String::new())),
		}
	}

	/// A shared handle to this sink's output buffer.
	pub fn buffer(&self) -> Rc<RefCell<String>> {
		self.buffer.clone()
	}
}

impl<T: Display + 'static> PipelineNode for TextSink<T> {
	fn name(&self) -> &str {
		&self.name
	}

	fn poll_next(&mut self) -> NodePoll {
		match self.input.value() {
			Some(value) => {
				// Writing to a String can't fail
				let _ = write!(self.buffer.borrow_mut(), "{} ", *value);
				NodePoll::Ready
			}
			None => NodePoll::Empty,
		}
	}

	fn connect(&mut self, source: Option<NodeRef>, slot: usize) {
		match slot {
			0 => self.input.bind(source),
			_ => unreachable!("a text sink has exactly one input"),
		}
	}
}

impl<T: Display + 'static> StaticNode for TextSink<T> {
	type Inputs = (T,);
	type Output = ();
}
