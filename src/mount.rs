//! Top-level entry points that own everything they create.

use crate::{
	dom::Dom,
	insert::{insert, Anchor, Options, RenderContext},
	reactive::{root, Scope},
	render::Renderable,
};
use tracing::{info, instrument, warn};

/// Renders `view` into `element` on the client.
///
/// Existing children of `element` are kept and the view is appended after them.
///
/// # Errors
///
/// Iff a DOM operation of the initial render fails. Everything created up to that point is disposed.
#[instrument(skip(view))]
pub fn render<D: Dom>(dom: D, element: &D::Node, options: Options, view: impl FnOnce(&RenderContext<D>) -> Renderable<D::Node>) -> Result<Scope, D::Error> {
	let cx = RenderContext::client(dom).with_options(options);
	let anchor = if cx.dom().first_child(element).is_some() { Anchor::End } else { Anchor::Absent };
	let (result, scope) = root(|| insert(&cx, element, view(&cx), anchor));
	match result {
		Some(Err(error)) => {
			scope.dispose();
			Err(error)
		}
		Some(Ok(_)) | None => Ok(scope),
	}
}

/// Adopts the server-rendered content of `element` for `view`.
///
/// `view` is expected to consume markers through [`RenderContext::next_marker`] and to insert at them.
/// If any marker is missing, everything is disposed, `element` is emptied and `view` is [`render`]ed from scratch.
///
/// # Errors
///
/// Iff a DOM operation fails, also during the fallback.
#[instrument(skip(view))]
pub fn hydrate<D: Dom>(dom: D, element: &D::Node, options: Options, view: impl Fn(&RenderContext<D>) -> Renderable<D::Node>) -> Result<Scope, D::Error> {
	let cx = RenderContext::hydrating(dom.clone(), element.clone()).with_options(options);
	let (result, scope) = root(|| insert(&cx, element, view(&cx), Anchor::Absent));

	match result {
		Some(Ok(_)) if !cx.mismatched() => {
			info!("Hydrated.");
			return Ok(scope);
		}
		Some(Ok(_)) | None => warn!("Server-rendered markup didn't match. Rendering from scratch instead."),
		Some(Err(error)) => warn!("Hydration failed ({:?}). Rendering from scratch instead.", error),
	}

	scope.dispose();
	dom.set_text_content(element, "");
	render(dom, element, options, view)
}
