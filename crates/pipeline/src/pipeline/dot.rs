//! Graphviz rendering

use std::fmt::{Display, Formatter, Result, Write};

use itertools::Itertools;

use super::pipeline::{NodeId, Pipeline};

/// Write `label` as a DOT double-quoted string.
///
/// Interior quotes and backslashes get C-style escapes.
fn write_quoted(f: &mut Formatter<'_>, label: &str) -> Result {
	f.write_char('"')?;
	for c in label.chars() {
		match c {
			'"' => f.write_str("\\\"")?,
			'\\' => f.write_str("\\\\")?,
			c => f.write_char(c)?,
		}
	}
	f.write_char('"')
}

impl Pipeline {
	/// Write one node's label: its id, a space, and its name.
	fn write_label(&self, f: &mut Formatter<'_>, id: NodeId) -> Result {
		let entry = &self.nodes[&id];
		let node = entry.node.borrow();
		write_quoted(f, &format!("{} {}", id, node.name()))
	}
}

impl Display for Pipeline {
	/// Render this pipeline in DOT format.
	///
	/// Nodes are listed in ascending id order, then a blank line,
	/// then one line per edge: per source node in ascending id order,
	/// sorted by downstream id within a source. An output feeding two
	/// slots of the same node yields that edge line twice.
	fn fmt(&self, f: &mut Formatter<'_>) -> Result {
		writeln!(f, "digraph G {{")?;

		for &id in self.nodes.keys() {
			f.write_str("  ")?;
			self.write_label(f, id)?;
			writeln!(f)?;
		}

		writeln!(f)?;

		for (&id, entry) in &self.nodes {
			for &(down, _) in entry
				.dependencies
				.iter()
				.sorted_by_key(|(down, _)| *down)
			{
				f.write_str("  ")?;
				self.write_label(f, id)?;
				f.write_str(" -> ")?;
				self.write_label(f, down)?;
				writeln!(f)?;
			}
		}

		writeln!(f, "}}")
	}
}

#[cfg(test)]
mod tests {
	use super::super::pipeline::Pipeline;
	use crate::testutil::{Add, Count, Swallow};

	#[test]
	fn renders_nodes_then_edges() {
		let mut pipeline = Pipeline::new();
		let count_a = pipeline.create_node(Count::new("count a", 5));
		let count_b = pipeline.create_node(Count::new("count b", 5));
		let add = pipeline.create_node(Add::new("add"));
		let sink = pipeline.create_node(Swallow::new("sink"));

		// Wire in an order that doesn't match the id order
		pipeline.connect(add, sink, 0).unwrap();
		pipeline.connect(count_b, add, 1).unwrap();
		pipeline.connect(count_a, add, 0).unwrap();

		assert_eq!(
			pipeline.to_string(),
			concat!(
				"digraph G {\n",
				"  \"1 count a\"\n",
				"  \"2 count b\"\n",
				"  \"3 add\"\n",
				"  \"4 sink\"\n",
				"\n",
				"  \"1 count a\" -> \"3 add\"\n",
				"  \"2 count b\" -> \"3 add\"\n",
				"  \"3 add\" -> \"4 sink\"\n",
				"}\n",
			)
		);
	}

	#[test]
	fn repeated_edges_are_kept() {
		let mut pipeline = Pipeline::new();
		let count = pipeline.create_node(Count::new("count", 5));
		let add = pipeline.create_node(Add::new("add"));
		let sink = pipeline.create_node(Swallow::new("sink"));

		pipeline.connect(count, add, 0).unwrap();
		pipeline.connect(count, add, 1).unwrap();
		pipeline.connect(add, sink, 0).unwrap();

		assert_eq!(
			pipeline.to_string(),
			concat!(
				"digraph G {\n",
				"  \"1 count\"\n",
				"  \"2 add\"\n",
				"  \"3 sink\"\n",
				"\n",
				"  \"1 count\" -> \"2 add\"\n",
				"  \"1 count\" -> \"2 add\"\n",
				"  \"2 add\" -> \"3 sink\"\n",
				"}\n",
			)
		);
	}

	#[test]
	fn labels_are_escaped() {
		let mut pipeline = Pipeline::new();
		pipeline.create_node(Count::new(r#"a "quoted" \name"#, 1));

		assert_eq!(
			pipeline.to_string(),
			concat!(
				"digraph G {\n",
				"  \"1 a \\\"quoted\\\" \\\\name\"\n",
				"\n",
				"}\n",
			)
		);
	}

	#[test]
	fn empty_pipeline_still_renders() {
		let pipeline = Pipeline::new();
		assert_eq!(pipeline.to_string(), "digraph G {\n\n}\n");
	}
}
