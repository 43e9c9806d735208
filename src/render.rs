//! Renderable values.

use core::fmt::{self, Debug, Formatter};
use std::rc::Rc;

/// A value that can be committed to the DOM at an [insertion point](`crate::insert()`).
///
/// `N` is the node handle type of the [`Dom`](`crate::dom::Dom`) backend.
pub enum Renderable<N> {
	/// Renders nothing. `false` converts to this, as does `true`.
	Empty,
	/// Rendered as a single text node. Numbers convert to this.
	Text(String),
	/// An existing node, inserted as-is.
	Node(N),
	/// An ordered, possibly nested run of renderables.
	List(Vec<Renderable<N>>),
	/// A reactive read. Evaluated inside an [`effect`](`crate::reactive::effect`) when inserted.
	Thunk(Rc<dyn Fn() -> Renderable<N>>),
}

impl<N> Renderable<N> {
	pub fn thunk(f: impl 'static + Fn() -> Renderable<N>) -> Self {
		Self::Thunk(Rc::new(f))
	}

	/// Calls thunks until something else comes out.
	#[must_use]
	pub fn settle(self) -> Self {
		let mut value = self;
		while let Self::Thunk(thunk) = value {
			value = thunk();
		}
		value
	}

	/// Whether this is or contains a [`Renderable::Thunk`], without evaluating any.
	#[must_use]
	pub fn is_reactive(&self) -> bool {
		match self {
			Self::Thunk(_) => true,
			Self::List(items) => items.iter().any(Self::is_reactive),
			Self::Empty | Self::Text(_) | Self::Node(_) => false,
		}
	}
}

impl<N: Clone> Clone for Renderable<N> {
	fn clone(&self) -> Self {
		match self {
			Self::Empty => Self::Empty,
			Self::Text(text) => Self::Text(text.clone()),
			Self::Node(node) => Self::Node(node.clone()),
			Self::List(items) => Self::List(items.clone()),
			Self::Thunk(thunk) => Self::Thunk(Rc::clone(thunk)),
		}
	}
}

impl<N: Debug> Debug for Renderable<N> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		match self {
			Self::Empty => f.write_str("Empty"),
			Self::Text(text) if cfg!(feature = "dangerous-logging") => f.debug_tuple("Text").field(text).finish(),
			Self::Text(text) => write!(f, "Text(<{} bytes>)", text.len()),
			Self::Node(node) => f.debug_tuple("Node").field(node).finish(),
			Self::List(items) => f.debug_tuple("List").field(items).finish(),
			Self::Thunk(thunk) => write!(f, "Thunk({:p})", Rc::as_ptr(thunk)),
		}
	}
}

impl<N> Default for Renderable<N> {
	fn default() -> Self {
		Self::Empty
	}
}

impl<N> From<&str> for Renderable<N> {
	fn from(text: &str) -> Self {
		Self::Text(text.to_owned())
	}
}

impl<N> From<String> for Renderable<N> {
	fn from(text: String) -> Self {
		Self::Text(text)
	}
}

impl<N> From<bool> for Renderable<N> {
	fn from(_: bool) -> Self {
		Self::Empty
	}
}

impl<N> From<()> for Renderable<N> {
	fn from((): ()) -> Self {
		Self::Empty
	}
}

macro_rules! from_number {
	($($number:ty),*$(,)?) => {$(
		impl<N> From<$number> for Renderable<N> {
			fn from(number: $number) -> Self {
				Self::Text(number.to_string())
			}
		}
	)*};
}
from_number!(i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64);

impl<N, T: Into<Renderable<N>>> From<Option<T>> for Renderable<N> {
	fn from(value: Option<T>) -> Self {
		value.map_or(Self::Empty, Into::into)
	}
}

impl<N, T: Into<Renderable<N>>> From<Vec<T>> for Renderable<N> {
	fn from(items: Vec<T>) -> Self {
		Self::List(items.into_iter().map(Into::into).collect())
	}
}
