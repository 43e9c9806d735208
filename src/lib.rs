#![doc(html_root_url = "https://docs.rs/xylem-dom/0.0.1")]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Fine-grained DOM insertion without a VDOM.
//!
//! [`insert()`] commits a [`Renderable`] (text, a node, a nested list of those, or a thunk producing one)
//! at an insertion point and, for thunks, keeps it up to date through a [`reactive::effect`].
//! Previous output is reused by identity wherever possible.
//!
//! Server-rendered markup can be adopted instead of recreated by inserting through a [hydrating](`RenderContext::hydrating`) context.
//! Insertion points in that markup are marked by comments, see [`marker`].

#[cfg(doctest)]
pub mod readme {
	doc_comment::doctest!("../README.md");
}

pub mod commit;
pub mod dom;
pub mod flatten;
pub mod insert;
pub mod marker;
pub mod memory;
pub mod mount;
pub mod reactive;
pub mod reconcile;
pub mod render;
pub mod web;

pub use crate::{
	dom::{Dom, NodeKind},
	insert::{insert, Anchor, Committed, HydrationPolicy, Options, RenderContext},
	marker::MarkerWalker,
	mount::{hydrate, render},
	render::Renderable,
};
