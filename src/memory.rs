//! An in-process DOM tree.
//!
//! Nodes compare by identity, like their browser counterparts.
//! Every mutation is counted, which stands in for a [***MutationObserver***](https://developer.mozilla.org/en-US/docs/Web/API/MutationObserver) in tests.

use crate::dom::{Dom, NodeKind};
use core::fmt::{self, Debug, Formatter};
use std::{
	cell::{Cell, RefCell},
	rc::{Rc, Weak},
};
use thiserror::Error;
use tracing::{trace, warn};

/// The subset of DOM exceptions [`MemoryDom`] raises.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MemoryDomError {
	/// See [***HierarchyRequestError***](https://developer.mozilla.org/en-US/docs/Web/API/DOMException#hierarchyrequesterror).
	#[error("The operation would yield an incorrect node tree.")]
	HierarchyRequest,
	/// See [***NotFoundError***](https://developer.mozilla.org/en-US/docs/Web/API/DOMException#notfounderror).
	#[error("The reference node is not a child of this parent.")]
	NotFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Data {
	Element(String),
	Text(String),
	Comment(String),
	Fragment,
}

struct Inner {
	data: RefCell<Data>,
	parent: RefCell<Weak<Inner>>,
	children: RefCell<Vec<MemoryNode>>,
}

/// A node handle of a [`MemoryDom`].
#[derive(Clone)]
pub struct MemoryNode(Rc<Inner>);
impl PartialEq for MemoryNode {
	fn eq(&self, other: &Self) -> bool {
		Rc::ptr_eq(&self.0, &other.0)
	}
}
impl Eq for MemoryNode {}
impl Debug for MemoryNode {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match &*self.0.data.borrow() {
			Data::Element(name) => write!(f, "<{}> @ {:p}", name, Rc::as_ptr(&self.0)),
			Data::Text(_) if cfg!(not(feature = "dangerous-logging")) => write!(f, "#text @ {:p}", Rc::as_ptr(&self.0)),
			Data::Comment(_) if cfg!(not(feature = "dangerous-logging")) => write!(f, "#comment @ {:p}", Rc::as_ptr(&self.0)),
			Data::Text(text) => write!(f, "#text {:?} @ {:p}", text, Rc::as_ptr(&self.0)),
			Data::Comment(comment) => write!(f, "#comment {:?} @ {:p}", comment, Rc::as_ptr(&self.0)),
			Data::Fragment => write!(f, "#document-fragment @ {:p}", Rc::as_ptr(&self.0)),
		}
	}
}
impl MemoryNode {
	fn new(data: Data) -> Self {
		Self(Rc::new(Inner {
			data: RefCell::new(data),
			parent: RefCell::new(Weak::new()),
			children: RefCell::new(Vec::new()),
		}))
	}

	fn parent(&self) -> Option<MemoryNode> {
		self.0.parent.borrow().upgrade().map(MemoryNode)
	}

	fn is_container(&self) -> bool {
		matches!(&*self.0.data.borrow(), Data::Element(_) | Data::Fragment)
	}

	fn is_inclusive_ancestor_of(&self, node: &MemoryNode) -> bool {
		let mut next = Some(node.clone());
		while let Some(current) = next {
			if &current == self {
				return true;
			}
			next = current.parent();
		}
		false
	}

	fn index_in(&self, parent: &MemoryNode) -> Option<usize> {
		parent.0.children.borrow().iter().position(|child| child == self)
	}

	fn detach(&self) {
		if let Some(parent) = self.parent() {
			match self.index_in(&parent) {
				Some(index) => drop(parent.0.children.borrow_mut().remove(index)),
				None => warn!("{:?} is missing from its parent's children. Detaching it anyway.", self),
			}
			*self.0.parent.borrow_mut() = Weak::new();
		}
	}

	fn adopt_at(&self, parent: &MemoryNode, index: usize) {
		*self.0.parent.borrow_mut() = Rc::downgrade(&parent.0);
		parent.0.children.borrow_mut().insert(index, self.clone());
	}

	fn take_children(&self) -> Vec<MemoryNode> {
		let children = core::mem::take(&mut *self.0.children.borrow_mut());
		for child in &children {
			*child.0.parent.borrow_mut() = Weak::new();
		}
		children
	}
}

/// A [`Dom`] backend that lives entirely in Rust memory.
///
/// Clones share their mutation counter.
#[derive(Debug, Clone, Default)]
pub struct MemoryDom {
	mutations: Rc<Cell<usize>>,
}
impl MemoryDom {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	#[must_use]
	pub fn create_element(&self, name: &str) -> MemoryNode {
		MemoryNode::new(Data::Element(name.to_owned()))
	}

	#[must_use]
	pub fn create_fragment(&self) -> MemoryNode {
		MemoryNode::new(Data::Fragment)
	}

	/// How many tree or character data mutations happened through this backend (and its clones) so far.
	#[must_use]
	pub fn mutation_count(&self) -> usize {
		self.mutations.get()
	}

	fn mutated(&self) {
		self.mutations.set(self.mutations.get() + 1)
	}

	/// Serializes `node` including itself. Character data is not escaped.
	#[must_use]
	pub fn outer_html(&self, node: &MemoryNode) -> String {
		let mut html = String::new();
		write_html(&mut html, node);
		html
	}

	/// Serializes the children of `node`.
	#[must_use]
	pub fn inner_html(&self, node: &MemoryNode) -> String {
		let mut html = String::new();
		for child in node.0.children.borrow().iter() {
			write_html(&mut html, child);
		}
		html
	}

	/// Builder-style convenience: appends each of `children` to `parent` and returns `parent`.
	///
	/// # Errors
	///
	/// Iff any of the insertions fails.
	pub fn with_children(&self, parent: MemoryNode, children: &[MemoryNode]) -> Result<MemoryNode, MemoryDomError> {
		for child in children {
			self.append_child(&parent, child)?;
		}
		Ok(parent)
	}
}

fn write_html(html: &mut String, node: &MemoryNode) {
	let data = node.0.data.borrow().clone();
	match data {
		Data::Element(name) => {
			html.push('<');
			html.push_str(&name);
			html.push('>');
			for child in node.0.children.borrow().iter() {
				write_html(html, child);
			}
			html.push_str("</");
			html.push_str(&name);
			html.push('>');
		}
		Data::Text(text) => html.push_str(&text),
		Data::Comment(comment) => {
			html.push_str("<!--");
			html.push_str(&comment);
			html.push_str("-->");
		}
		Data::Fragment => {
			for child in node.0.children.borrow().iter() {
				write_html(html, child);
			}
		}
	}
}

impl Dom for MemoryDom {
	type Node = MemoryNode;
	type Error = MemoryDomError;

	fn create_text(&self, data: &str) -> MemoryNode {
		MemoryNode::new(Data::Text(data.to_owned()))
	}

	fn create_comment(&self, data: &str) -> MemoryNode {
		MemoryNode::new(Data::Comment(data.to_owned()))
	}

	fn kind(&self, node: &MemoryNode) -> NodeKind {
		match &*node.0.data.borrow() {
			Data::Element(_) => NodeKind::Element,
			Data::Text(_) => NodeKind::Text,
			Data::Comment(_) => NodeKind::Comment,
			Data::Fragment => NodeKind::Fragment,
		}
	}

	fn character_data(&self, node: &MemoryNode) -> Option<String> {
		match &*node.0.data.borrow() {
			Data::Text(data) | Data::Comment(data) => Some(data.clone()),
			Data::Element(_) | Data::Fragment => None,
		}
	}

	fn set_character_data(&self, node: &MemoryNode, data: &str) {
		let assigned = match &mut *node.0.data.borrow_mut() {
			Data::Text(current) | Data::Comment(current) => {
				data.clone_into(current);
				true
			}
			Data::Element(_) | Data::Fragment => false,
		};
		if assigned {
			self.mutated()
		} else {
			trace!("Ignored character data assignment to {:?}.", node)
		}
	}

	fn parent_node(&self, node: &MemoryNode) -> Option<MemoryNode> {
		node.parent()
	}

	fn first_child(&self, node: &MemoryNode) -> Option<MemoryNode> {
		node.0.children.borrow().first().cloned()
	}

	fn next_sibling(&self, node: &MemoryNode) -> Option<MemoryNode> {
		let parent = node.parent()?;
		let index = node.index_in(&parent)?;
		let sibling = parent.0.children.borrow().get(index + 1).cloned();
		sibling
	}

	fn insert_before(&self, parent: &MemoryNode, node: &MemoryNode, reference: Option<&MemoryNode>) -> Result<(), MemoryDomError> {
		if !parent.is_container() || node.is_inclusive_ancestor_of(parent) {
			return Err(MemoryDomError::HierarchyRequest);
		}
		if let Some(reference) = reference {
			if reference.parent().as_ref() != Some(parent) {
				return Err(MemoryDomError::NotFound);
			}
		}

		// Inserting a node before itself is equivalent to inserting it before its next sibling.
		let reference = match reference {
			Some(reference) if reference == node => self.next_sibling(node),
			reference => reference.cloned(),
		};

		let nodes = if self.kind(node) == NodeKind::Fragment {
			node.take_children()
		} else {
			node.detach();
			vec![node.clone()]
		};

		let mut index = match &reference {
			Some(reference) => reference.index_in(parent).ok_or(MemoryDomError::NotFound)?,
			None => parent.0.children.borrow().len(),
		};
		for node in nodes {
			node.adopt_at(parent, index);
			index += 1;
		}
		self.mutated();
		Ok(())
	}

	fn replace_child(&self, parent: &MemoryNode, new: &MemoryNode, old: &MemoryNode) -> Result<(), MemoryDomError> {
		if old.parent().as_ref() != Some(parent) {
			return Err(MemoryDomError::NotFound);
		}
		if new == old {
			return Ok(());
		}
		self.insert_before(parent, new, Some(old))?;
		old.detach();
		Ok(())
	}

	fn remove(&self, node: &MemoryNode) -> Result<(), MemoryDomError> {
		if node.parent().is_some() {
			node.detach();
			self.mutated();
		}
		Ok(())
	}

	fn set_text_content(&self, node: &MemoryNode, text: &str) {
		if node.is_container() {
			node.take_children();
			if !text.is_empty() {
				MemoryNode::new(Data::Text(text.to_owned())).adopt_at(node, 0);
			}
		} else if let Data::Text(current) | Data::Comment(current) = &mut *node.0.data.borrow_mut() {
			text.clone_into(current)
		}
		self.mutated();
	}
}
