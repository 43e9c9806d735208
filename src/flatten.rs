//! Normalizes nested [`Renderable::List`]s into flat node runs.

use crate::{dom::Dom, render::Renderable};
use core::slice;
use tracing::{instrument, trace};

/// The result of [`flatten`].
#[derive(Debug, Clone, PartialEq)]
pub struct Flattened<N> {
	pub nodes: Vec<N>,
	/// Whether a thunk was encountered outside of a tracked re-run.
	///
	/// If this is `true`, [`Flattened::nodes`] is incomplete and must not be committed.
	/// Instead, the whole list has to be re-flattened inside an effect with `is_computed` set.
	pub dynamic: bool,
}

/// Flattens `items` into concrete nodes.
///
/// Text is matched positionally against `previous`: a text node at the same output index with identical data is reused.
/// Empty values produce no node. Nested lists are spliced in place.
///
/// Thunks are only invoked if `is_computed` is set, i.e. if this runs inside the effect that should track them.
/// Otherwise flattening stops at the first thunk and reports [`Flattened::dynamic`].
#[instrument(skip(dom, items, previous), fields(items.len = items.len(), previous.len = previous.len()))]
pub fn flatten<D: Dom>(dom: &D, items: &[Renderable<D::Node>], previous: &[D::Node], is_computed: bool) -> Flattened<D::Node> {
	let mut nodes = Vec::with_capacity(items.len());
	let dynamic = flatten_into(dom, &mut nodes, items, previous, is_computed);
	Flattened { nodes, dynamic }
}

fn flatten_into<D: Dom>(dom: &D, nodes: &mut Vec<D::Node>, items: &[Renderable<D::Node>], previous: &[D::Node], is_computed: bool) -> bool {
	for item in items {
		match item {
			Renderable::Empty => (),
			Renderable::Node(node) => nodes.push(node.clone()),
			Renderable::List(items) => {
				if flatten_into(dom, nodes, items, previous, is_computed) {
					return true;
				}
			}
			Renderable::Thunk(thunk) if is_computed => {
				let value = thunk();
				if flatten_into(dom, nodes, slice::from_ref(&value), previous, true) {
					return true;
				}
			}
			Renderable::Thunk(_) => {
				trace!("Deferring list at index {} to a nested subscription.", nodes.len());
				return true;
			}
			Renderable::Text(text) => {
				let reused = previous
					.get(nodes.len())
					.filter(|aligned| dom.is_text(aligned) && dom.character_data(aligned).as_deref() == Some(text.as_str()))
					.cloned();
				nodes.push(reused.unwrap_or_else(|| dom.create_text(text)));
			}
		}
	}
	false
}
