//! Hydration markers left in server-rendered markup.
//!
//! A single-slot marker is a comment whose data is exactly [`SLOT`]. List-valued positions additionally
//! end with a comment whose data is exactly [`LIST_END`], with the claimed run of nodes in between.
//! Any other comment is foreign (for example inserted by a browser extension) and is skipped.

use crate::dom::{Dom, NodeKind};
use tracing::{instrument, trace, warn};

/// Comment data of single-slot and list-start markers.
pub const SLOT: &str = "$";

/// Comment data of list-end markers.
pub const LIST_END: &str = "/[]";

/// A forward-only cursor over [`SLOT`] markers below a root node, in document order.
///
/// The cursor always points at the node *after* the last returned marker,
/// so callers may remove returned markers freely.
#[derive(Debug)]
pub struct MarkerWalker<D: Dom> {
	dom: D,
	root: D::Node,
	cursor: Option<D::Node>,
}
impl<D: Dom> MarkerWalker<D> {
	#[must_use]
	pub fn new(dom: D, root: D::Node) -> Self {
		let cursor = dom.first_child(&root);
		Self { dom, root, cursor }
	}

	#[must_use]
	pub fn root(&self) -> &D::Node {
		&self.root
	}

	/// Returns the next [`SLOT`] marker, or [`None`] once exhausted.
	///
	/// [`None`] is also returned if the node under the cursor was detached from the tree by someone else,
	/// since the walk can't continue from there.
	#[allow(clippy::should_implement_trait)]
	pub fn next(&mut self) -> Option<D::Node> {
		while let Some(node) = self.cursor.take() {
			if node != self.root && self.dom.parent_node(&node).is_none() {
				warn!("Hydration cursor {:?} was detached from the document. Stopping the marker walk.", node);
				return None;
			}

			self.cursor = self.successor(&node, true);
			if self.is_comment_with(&node, SLOT) {
				trace!("Found marker {:?}.", node);
				return Some(node);
			}
		}
		None
	}

	/// Claims the run of nodes between `start` and the next [`LIST_END`] sibling and removes that end marker.
	/// `start` itself is left in place.
	///
	/// Foreign comments inside the run are skipped and stay where they are.
	///
	/// Returns `Ok(None)` if there is no end marker after `start`.
	///
	/// # Errors
	///
	/// Iff removing the end marker fails.
	#[instrument(skip(self))]
	pub fn claim_run(&mut self, start: &D::Node) -> Result<Option<Vec<D::Node>>, D::Error> {
		let mut claimed = Vec::new();
		let mut next = self.dom.next_sibling(start);
		while let Some(node) = next {
			next = self.dom.next_sibling(&node);
			match self.dom.kind(&node) {
				NodeKind::Comment if self.is_comment_with(&node, LIST_END) => {
					if self.cursor.as_ref() == Some(&node) {
						self.cursor = self.successor(&node, false);
					}
					self.dom.remove(&node)?;
					trace!("Claimed {} node(s).", claimed.len());
					return Ok(Some(claimed));
				}
				NodeKind::Comment => trace!("Skipping foreign comment {:?}.", node),
				_ => claimed.push(node),
			}
		}

		warn!("No list end marker found after {:?}.", start);
		Ok(None)
	}

	/// Moves the cursor past `nodes` if it currently points at or into one of them,
	/// so that they can be replaced without cutting the walk short.
	///
	/// `nodes` must be siblings in document order.
	pub fn skip_past(&mut self, nodes: &[D::Node]) {
		let mut current = self.cursor.clone();
		while let Some(node) = current {
			if nodes.contains(&node) {
				if let Some(last) = nodes.last() {
					self.cursor = self.successor(last, false);
					trace!("Moved the hydration cursor past {} node(s) about to be replaced.", nodes.len());
				}
				return;
			}
			if node == self.root {
				return;
			}
			current = self.dom.parent_node(&node);
		}
	}

	fn is_comment_with(&self, node: &D::Node, data: &str) -> bool {
		self.dom.kind(node) == NodeKind::Comment && self.dom.character_data(node).as_deref() == Some(data)
	}

	/// The next node in document order below `root`, optionally without descending into `node`.
	fn successor(&self, node: &D::Node, descend: bool) -> Option<D::Node> {
		if descend {
			if let Some(child) = self.dom.first_child(node) {
				return Some(child);
			}
		}

		let mut current = node.clone();
		loop {
			if current == self.root {
				return None;
			}
			if let Some(sibling) = self.dom.next_sibling(&current) {
				return Some(sibling);
			}
			current = self.dom.parent_node(&current)?;
		}
	}
}
