//! The browser backend.

use crate::dom::{Dom, NodeKind};
use tracing::{instrument, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CharacterData, Document, Node};

/// [`Dom`] over [***web-sys***](`web_sys`) nodes of one [`Document`].
#[derive(Debug, Clone)]
pub struct WebDom {
	document: Document,
}
impl WebDom {
	#[must_use]
	pub fn for_document(document: Document) -> Self {
		Self { document }
	}

	/// The [***Document***](https://developer.mozilla.org/en-US/docs/Web/API/Document) of the current [***Window***](https://developer.mozilla.org/en-US/docs/Web/API/Window), if there is one.
	#[must_use]
	pub fn for_window() -> Option<Self> {
		web_sys::window().and_then(|window| window.document()).map(Self::for_document)
	}

	#[must_use]
	pub fn document(&self) -> &Document {
		&self.document
	}
}

impl Dom for WebDom {
	type Node = Node;
	type Error = JsValue;

	fn create_text(&self, data: &str) -> Node {
		self.document.create_text_node(data).into()
	}

	fn create_comment(&self, data: &str) -> Node {
		self.document.create_comment(data).into()
	}

	fn kind(&self, node: &Node) -> NodeKind {
		match node.node_type() {
			Node::ELEMENT_NODE => NodeKind::Element,
			Node::TEXT_NODE => NodeKind::Text,
			Node::COMMENT_NODE => NodeKind::Comment,
			Node::DOCUMENT_FRAGMENT_NODE => NodeKind::Fragment,
			_ => NodeKind::Other,
		}
	}

	fn character_data(&self, node: &Node) -> Option<String> {
		node.dyn_ref::<CharacterData>().map(CharacterData::data)
	}

	fn set_character_data(&self, node: &Node, data: &str) {
		match node.dyn_ref::<CharacterData>() {
			Some(character_data) => character_data.set_data(data),
			None => warn!("Expected `web_sys::CharacterData` but found {:?}; Not setting data.", node),
		}
	}

	fn parent_node(&self, node: &Node) -> Option<Node> {
		node.parent_node()
	}

	fn first_child(&self, node: &Node) -> Option<Node> {
		node.first_child()
	}

	fn next_sibling(&self, node: &Node) -> Option<Node> {
		node.next_sibling()
	}

	#[instrument(level = "trace")]
	fn insert_before(&self, parent: &Node, node: &Node, reference: Option<&Node>) -> Result<(), JsValue> {
		parent.insert_before(node, reference).map(drop)
	}

	#[instrument(level = "trace")]
	fn replace_child(&self, parent: &Node, new: &Node, old: &Node) -> Result<(), JsValue> {
		parent.replace_child(new, old).map(drop)
	}

	#[instrument(level = "trace")]
	fn remove(&self, node: &Node) -> Result<(), JsValue> {
		match node.parent_node() {
			Some(parent) => parent.remove_child(node).map(drop),
			None => Ok(()),
		}
	}

	fn set_text_content(&self, node: &Node, text: &str) {
		node.set_text_content(Some(text))
	}
}
