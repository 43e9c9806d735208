//! The slice of the DOM that insertion and hydration touch.
//!
//! Implemented for [***web-sys***](`crate::web::WebDom`) and for an [in-memory tree](`crate::memory::MemoryDom`).

use core::fmt::Debug;

/// The [***nodeType***](https://developer.mozilla.org/en-US/docs/Web/API/Node/nodeType) subset this crate distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
	Element,
	Text,
	Comment,
	Fragment,
	Other,
}

/// A DOM backend.
///
/// Mutating methods return the backend's exception type instead of logging it away,
/// since a failure there means a node reference was used incorrectly by the caller.
pub trait Dom: Clone + Debug + 'static {
	/// A node handle. [`PartialEq`] **must** compare identity, not structure.
	type Node: Clone + PartialEq + Debug + 'static;
	type Error: Debug + 'static;

	fn create_text(&self, data: &str) -> Self::Node;
	fn create_comment(&self, data: &str) -> Self::Node;

	fn kind(&self, node: &Self::Node) -> NodeKind;

	/// [***CharacterData.data***](https://developer.mozilla.org/en-US/docs/Web/API/CharacterData/data) of text and comment nodes, [`None`] otherwise.
	fn character_data(&self, node: &Self::Node) -> Option<String>;
	fn set_character_data(&self, node: &Self::Node, data: &str);

	fn parent_node(&self, node: &Self::Node) -> Option<Self::Node>;
	fn first_child(&self, node: &Self::Node) -> Option<Self::Node>;
	fn next_sibling(&self, node: &Self::Node) -> Option<Self::Node>;

	/// Inserts `node` into `parent` before `reference`, or at the end if `reference` is [`None`].
	///
	/// Fragments are emptied into `parent`.
	///
	/// # Errors
	///
	/// Iff the backend rejects the insertion.
	fn insert_before(&self, parent: &Self::Node, node: &Self::Node, reference: Option<&Self::Node>) -> Result<(), Self::Error>;

	/// # Errors
	///
	/// Iff `old` isn't a child of `parent` or `new` can't be placed there.
	fn replace_child(&self, parent: &Self::Node, new: &Self::Node, old: &Self::Node) -> Result<(), Self::Error>;

	/// Detaches `node` from its parent, if any.
	///
	/// # Errors
	///
	/// Iff the backend rejects the removal.
	fn remove(&self, node: &Self::Node) -> Result<(), Self::Error>;

	/// [***Node.textContent***](https://developer.mozilla.org/en-US/docs/Web/API/Node/textContent) assignment.
	fn set_text_content(&self, node: &Self::Node, text: &str);

	fn append_child(&self, parent: &Self::Node, node: &Self::Node) -> Result<(), Self::Error> {
		self.insert_before(parent, node, None)
	}

	#[must_use]
	fn child_nodes(&self, node: &Self::Node) -> Vec<Self::Node> {
		let mut children = Vec::new();
		let mut next = self.first_child(node);
		while let Some(child) = next {
			next = self.next_sibling(&child);
			children.push(child);
		}
		children
	}

	#[must_use]
	fn is_text(&self, node: &Self::Node) -> bool {
		self.kind(node) == NodeKind::Text
	}
}
