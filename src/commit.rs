//! The DOM transitions between [`Committed`] outputs.

use crate::{
	dom::Dom,
	insert::{Anchor, Committed},
	reconcile::reconcile,
};
use tracing::{instrument, trace};

/// Removes `current`'s nodes, leaving `replacement` (or a placeholder comment) in their place.
///
/// Without an anchor, the whole parent is owned by the insertion point and simply emptied.
///
/// # Errors
///
/// Iff a DOM operation fails.
#[instrument(skip(dom, current))]
pub fn clean_children<D: Dom>(dom: &D, parent: &D::Node, anchor: &Anchor<D::Node>, current: &Committed<D::Node>, replacement: Option<D::Node>) -> Result<Committed<D::Node>, D::Error> {
	let reference = match anchor {
		Anchor::Absent => {
			dom.set_text_content(parent, "");
			return Ok(Committed::Empty);
		}
		Anchor::End => None,
		Anchor::Before(marker) => Some(marker),
	};

	let node = replacement.unwrap_or_else(|| dom.create_comment(""));
	let nodes = current.nodes();
	if nodes.is_empty() {
		dom.insert_before(parent, &node, reference)?;
	} else {
		let mut inserted = false;
		for (i, old) in nodes.iter().enumerate().rev() {
			if *old == node {
				inserted = true;
				continue;
			}

			let is_child = dom.parent_node(old).as_ref() == Some(parent);
			if !inserted && i == 0 {
				if is_child {
					dom.replace_child(parent, &node, old)?;
				} else {
					dom.insert_before(parent, &node, reference)?;
				}
			} else if is_child {
				dom.remove(old)?;
			}
		}
	}
	Ok(Committed::List(vec![node]))
}

/// Inserts `nodes` in order before the anchor, or at the end of `parent`.
///
/// # Errors
///
/// Iff a DOM operation fails.
pub fn append_nodes<D: Dom>(dom: &D, parent: &D::Node, anchor: &Anchor<D::Node>, nodes: &[D::Node]) -> Result<(), D::Error> {
	let reference = anchor.reference();
	for node in nodes {
		dom.insert_before(parent, node, reference)?;
	}
	Ok(())
}

/// Commits a flat run of nodes, choosing between clearing, reconciliation against a previous run, and plain insertion.
///
/// # Errors
///
/// Iff a DOM operation fails.
#[instrument(skip(dom, current, nodes), fields(nodes.len = nodes.len()))]
pub fn commit_list<D: Dom>(dom: &D, parent: &D::Node, anchor: &Anchor<D::Node>, current: &Committed<D::Node>, nodes: Vec<D::Node>) -> Result<Committed<D::Node>, D::Error> {
	if nodes.is_empty() {
		let cleaned = clean_children(dom, parent, anchor, current, None)?;
		return Ok(if anchor.is_absent() { Committed::List(Vec::new()) } else { cleaned });
	}

	match current {
		Committed::List(previous) if previous.is_empty() => {
			trace!("Appending to an empty run.");
			append_nodes(dom, parent, anchor, &nodes)?
		}
		Committed::List(previous) => reconcile(dom, parent, previous, &nodes)?,
		current => {
			if !current.is_vacant() {
				dom.set_text_content(parent, "");
			}
			append_nodes(dom, parent, &Anchor::Absent, &nodes)?
		}
	}
	Ok(Committed::List(nodes))
}
