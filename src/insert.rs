//! The insertion engine: commits [`Renderable`]s at insertion points and keeps them up to date.

use crate::{
	commit::{clean_children, commit_list},
	dom::{Dom, NodeKind},
	flatten::flatten,
	marker::MarkerWalker,
	reactive,
	render::Renderable,
};
use core::fmt::{self, Debug, Formatter};
use std::{
	cell::{Cell, RefCell},
	rc::Rc,
};
use tracing::{error, instrument, trace, trace_span, warn};

/// Where an insertion point puts its content within its parent.
#[derive(Debug, Clone, PartialEq)]
pub enum Anchor<N> {
	/// The insertion point owns all of the parent's children.
	Absent,
	/// The insertion point shares the parent and appends at its end.
	End,
	/// The insertion point shares the parent and inserts before this node.
	Before(N),
}
impl<N> Anchor<N> {
	#[must_use]
	pub fn is_absent(&self) -> bool {
		matches!(self, Self::Absent)
	}

	/// The `reference` argument for [`Dom::insert_before`].
	#[must_use]
	pub fn reference(&self) -> Option<&N> {
		match self {
			Self::Before(node) => Some(node),
			Self::Absent | Self::End => None,
		}
	}
}

/// What an insertion point currently shows, as far as the next update needs to know.
#[derive(Debug, Clone)]
pub enum Committed<N> {
	/// Nothing was committed yet, or the parent was emptied.
	Empty,
	/// Without an anchor: the parent's only content is this text, as one text node (or none, if empty).
	Text(String),
	/// Without an anchor: the parent's only content is this node.
	Node(N),
	/// An ordered run of nodes. Anchored insertion points always commit runs.
	List(Vec<N>),
	/// Output owned by a nested subscription, which replaces the cell content on each run.
	Reactive(Rc<RefCell<Committed<N>>>),
}
impl<N: Clone> Committed<N> {
	/// Snapshots [`Committed::Reactive`] cells until a concrete output is found.
	#[must_use]
	pub fn settle(&self) -> Self {
		match self {
			Self::Reactive(cell) => cell.borrow().settle(),
			concrete => concrete.clone(),
		}
	}

	/// The committed nodes, where they are tracked individually.
	#[must_use]
	pub fn nodes(&self) -> Vec<N> {
		match self.settle() {
			Self::Node(node) => vec![node],
			Self::List(nodes) => nodes,
			Self::Empty | Self::Text(_) | Self::Reactive(_) => Vec::new(),
		}
	}

	/// Whether the parent can be assumed to be empty.
	#[must_use]
	pub fn is_vacant(&self) -> bool {
		match self {
			Self::Empty => true,
			Self::Text(text) => text.is_empty(),
			Self::List(nodes) => nodes.is_empty(),
			Self::Node(_) => false,
			Self::Reactive(cell) => cell.borrow().is_vacant(),
		}
	}
}
impl<N> Default for Committed<N> {
	fn default() -> Self {
		Self::Empty
	}
}

/// How much server-rendered markup is trusted while hydrating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HydrationPolicy {
	/// Claimed nodes are compared against the value being hydrated.
	/// Mismatches are logged and repaired by falling back to client-side construction for that insertion point.
	Validate,
	/// Claimed nodes are adopted as-is.
	Trust,
}
impl Default for HydrationPolicy {
	fn default() -> Self {
		Self::Validate
	}
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
	pub hydration: HydrationPolicy,
}

struct Hydration<D: Dom> {
	walker: RefCell<MarkerWalker<D>>,
	mismatched: Cell<bool>,
}

/// Everything an insertion needs besides its arguments: the backend, configuration and, while hydrating, the marker walk.
///
/// Cheap to clone. Clones share hydration state.
pub struct RenderContext<D: Dom> {
	dom: D,
	hydration: Option<Rc<Hydration<D>>>,
	options: Options,
}
impl<D: Dom> Clone for RenderContext<D> {
	fn clone(&self) -> Self {
		Self {
			dom: self.dom.clone(),
			hydration: self.hydration.clone(),
			options: self.options,
		}
	}
}
impl<D: Dom> Debug for RenderContext<D> {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("RenderContext")
			.field("dom", &self.dom)
			.field("hydrating", &self.is_hydrating())
			.field("options", &self.options)
			.finish()
	}
}
impl<D: Dom> RenderContext<D> {
	/// A context that always constructs new nodes.
	#[must_use]
	pub fn client(dom: D) -> Self {
		Self { dom, hydration: None, options: Options::default() }
	}

	/// A context that adopts the server-rendered markup below `root`.
	#[must_use]
	pub fn hydrating(dom: D, root: D::Node) -> Self {
		let walker = MarkerWalker::new(dom.clone(), root);
		Self {
			dom,
			hydration: Some(Rc::new(Hydration {
				walker: RefCell::new(walker),
				mismatched: Cell::new(false),
			})),
			options: Options::default(),
		}
	}

	#[must_use]
	pub fn with_options(self, options: Options) -> Self {
		Self { options, ..self }
	}

	#[must_use]
	pub fn dom(&self) -> &D {
		&self.dom
	}

	#[must_use]
	pub fn options(&self) -> Options {
		self.options
	}

	#[must_use]
	pub fn is_hydrating(&self) -> bool {
		self.hydration.is_some()
	}

	/// This context without hydration, as used by re-runs.
	#[must_use]
	pub fn to_client(&self) -> Self {
		Self {
			dom: self.dom.clone(),
			hydration: None,
			options: self.options,
		}
	}

	/// Whether hydration has hit markup it couldn't adopt.
	#[must_use]
	pub fn mismatched(&self) -> bool {
		self.hydration.as_ref().map_or(false, |hydration| hydration.mismatched.get())
	}

	/// Records that the server markup couldn't be adopted, so that the caller falls back to fresh construction.
	pub fn mark_mismatch(&self) {
		if let Some(hydration) = &self.hydration {
			if !hydration.mismatched.replace(true) {
				warn!("Hydration mismatch. Falling back to client-side rendering once this pass completes.")
			}
		}
	}

	/// Pulls the next single-slot marker. Records a mismatch if there is none left.
	///
	/// Always [`None`] outside of hydration.
	pub fn next_marker(&self) -> Option<D::Node> {
		let hydration = self.hydration.as_ref()?;
		let marker = hydration.walker.borrow_mut().next();
		if marker.is_none() {
			self.mark_mismatch()
		}
		marker
	}

	/// Lets the marker walk skip `nodes` before they are replaced while hydrating.
	pub fn release(&self, nodes: &[D::Node]) {
		if let Some(hydration) = &self.hydration {
			hydration.walker.borrow_mut().skip_past(nodes)
		}
	}

	/// Claims the run after the list-start marker `start`. See [`MarkerWalker::claim_run`].
	///
	/// Records a mismatch if the run has no end. Always `Ok(None)` outside of hydration.
	///
	/// # Errors
	///
	/// Iff removing the end marker fails.
	pub fn claim_run(&self, start: &D::Node) -> Result<Option<Vec<D::Node>>, D::Error> {
		let hydration = match &self.hydration {
			Some(hydration) => hydration,
			None => return Ok(None),
		};
		let claimed = hydration.walker.borrow_mut().claim_run(start)?;
		if claimed.is_none() {
			self.mark_mismatch()
		}
		Ok(claimed)
	}
}

/// Commits `value` into `parent` at `anchor`.
///
/// A [`Renderable::Thunk`] is evaluated inside a new [`effect`](`reactive::effect`), owned by the current owner,
/// which re-commits whenever something the thunk read changes.
/// The returned [`Committed::Reactive`] always reflects the latest run.
///
/// While hydrating, values without thunks at a marker are already present in the markup.
/// Only the marker (and, for lists, the list-end marker) is removed.
///
/// # Errors
///
/// Iff a DOM operation fails. For thunks, only failures of the first run are returned here.
/// Later failures are logged and leave the previous output in place.
#[instrument(skip(cx, value))]
pub fn insert<D: Dom>(cx: &RenderContext<D>, parent: &D::Node, value: Renderable<D::Node>, anchor: Anchor<D::Node>) -> Result<Committed<D::Node>, D::Error> {
	match value {
		thunk @ Renderable::Thunk(_) => resolve(cx, parent, thunk, &anchor, initial_output(&anchor), false),
		value => match &anchor {
			Anchor::Before(marker) if cx.is_hydrating() && !value.is_reactive() => {
				trace!("Adopting static content at {:?}.", marker);
				if let Renderable::List(_) = value {
					cx.claim_run(marker)?;
				}
				cx.dom().remove(marker)?;
				Ok(Committed::Empty)
			}
			_ => resolve(cx, parent, value, &anchor, initial_output(&anchor), false),
		},
	}
}

fn initial_output<N>(anchor: &Anchor<N>) -> Committed<N> {
	if anchor.is_absent() {
		Committed::Empty
	} else {
		Committed::List(Vec::new())
	}
}

/// Runs `step` in a new effect, feeding each run the previous run's output.
///
/// Only the first run sees `cx` as given. Re-runs never hydrate.
fn subscribe<D: Dom>(
	cx: &RenderContext<D>,
	current: Committed<D::Node>,
	mut step: impl 'static + FnMut(&RenderContext<D>, Committed<D::Node>) -> Result<Committed<D::Node>, D::Error>,
) -> Result<Committed<D::Node>, D::Error> {
	let cell = Rc::new(RefCell::new(current));
	let first_failure = Rc::new(RefCell::new(None));
	let mut first_run = Some(cx.clone());
	let client = cx.to_client();

	// Stopped by the owning scope.
	let _ = reactive::effect({
		let cell = Rc::clone(&cell);
		let first_failure = Rc::clone(&first_failure);
		move || {
			let is_first = first_run.is_some();
			let cx = first_run.take().unwrap_or_else(|| client.clone());
			let previous = cell.borrow().settle();
			match step(&cx, previous) {
				Ok(next) => *cell.borrow_mut() = next,
				Err(failure) if is_first => *first_failure.borrow_mut() = Some(failure),
				Err(failure) => error!("Failed to commit re-run, keeping the previous output: {:?}", failure),
			}
		}
	});

	let failure = first_failure.borrow_mut().take();
	match failure {
		Some(failure) => Err(failure),
		None => Ok(Committed::Reactive(cell)),
	}
}

/// Commits `value` over `current` once, without subscribing to anything itself.
///
/// `is_computed` signals that this already runs inside the effect that should track nested thunks,
/// which are then evaluated inline instead of getting their own subscription.
///
/// # Errors
///
/// Iff a DOM operation fails.
#[allow(clippy::too_many_lines)]
#[instrument(skip(cx, value, current))]
pub fn resolve<D: Dom>(
	cx: &RenderContext<D>,
	parent: &D::Node,
	value: Renderable<D::Node>,
	anchor: &Anchor<D::Node>,
	current: Committed<D::Node>,
	is_computed: bool,
) -> Result<Committed<D::Node>, D::Error> {
	let dom = cx.dom();
	let current = match current.settle() {
		Committed::Empty if !anchor.is_absent() => Committed::List(Vec::new()),
		current => current,
	};

	// Content may have been moved along with its first node.
	let reparented;
	let parent = match (anchor, current.nodes().first()) {
		(Anchor::Absent, _) | (_, None) => parent,
		(_, Some(first)) => match dom.parent_node(first) {
			Some(actual) => {
				reparented = actual;
				&reparented
			}
			None => parent,
		},
	};

	match value {
		Renderable::Thunk(thunk) => {
			let parent = parent.clone();
			let anchor = anchor.clone();
			subscribe(cx, current, move |cx, current| {
				let value = thunk().settle();
				resolve(cx, &parent, value, &anchor, current, false)
			})
		}

		Renderable::Text(text) => {
			let span = trace_span!("Committing text", text = redact(&text));
			let _enter = span.enter();

			if let Committed::Text(previous) = &current {
				if *previous == text {
					return Ok(current);
				}
			}

			if cx.is_hydrating() {
				if let Some(adopted) = adopt_text(cx, parent, anchor, &text) {
					return Ok(adopted);
				}
			}

			if anchor.is_absent() {
				match (&current, dom.first_child(parent)) {
					(Committed::Text(previous), Some(first)) if !previous.is_empty() && dom.is_text(&first) => dom.set_character_data(&first, &text),
					_ => dom.set_text_content(parent, &text),
				}
				Ok(Committed::Text(text))
			} else {
				let node = match current.nodes().first() {
					Some(first) if dom.is_text(first) => {
						if dom.character_data(first).as_deref() != Some(text.as_str()) {
							dom.set_character_data(first, &text);
						}
						first.clone()
					}
					_ => dom.create_text(&text),
				};
				clean_children(dom, parent, anchor, &current, Some(node))
			}
		}

		Renderable::Empty => {
			trace!("Committing nothing.");
			if cx.is_hydrating() {
				return Ok(current);
			}
			clean_children(dom, parent, anchor, &current, None)
		}

		Renderable::Node(node) => {
			let span = trace_span!("Committing node", ?node);
			let _enter = span.enter();

			let unchanged = match &current {
				Committed::Node(previous) => *previous == node,
				Committed::List(previous) => !anchor.is_absent() && previous.len() == 1 && previous[0] == node,
				_ => false,
			};
			if unchanged {
				return Ok(current);
			}

			if cx.is_hydrating() && dom.parent_node(&node).is_some() {
				trace!("Node already present.");
				return Ok(if anchor.is_absent() { Committed::Node(node) } else { Committed::List(vec![node]) });
			}

			if !anchor.is_absent() {
				return clean_children(dom, parent, anchor, &current, Some(node));
			}

			match (&current, dom.first_child(parent)) {
				(Committed::List(_), _) => {
					clean_children(dom, parent, &Anchor::End, &current, Some(node.clone()))?;
				}
				(current, Some(first)) if !current.is_vacant() => dom.replace_child(parent, &node, &first)?,
				_ => dom.append_child(parent, &node)?,
			}
			Ok(Committed::Node(node))
		}

		Renderable::List(items) => {
			let span = trace_span!("Committing list", items.len = items.len());
			let _enter = span.enter();

			// Deferred lists claim in the first run of their nested subscription instead, so that each run is claimed once.
			let deferred = !is_computed && items.iter().any(Renderable::is_reactive);
			let current = match (anchor, cx.is_hydrating()) {
				(Anchor::Before(marker), true) if !deferred && current.nodes().is_empty() => match cx.claim_run(marker)? {
					Some(claimed) => Committed::List(claimed),
					None => current,
				},
				(Anchor::Absent, true) if !deferred && current.nodes().is_empty() => Committed::List(
					dom.child_nodes(parent)
						.into_iter()
						.filter(|child| dom.kind(child) != NodeKind::Comment)
						.collect(),
				),
				_ => current,
			};
			let previous = current.nodes();

			let flattened = flatten(dom, &items, &previous, is_computed);
			if flattened.dynamic {
				let parent = parent.clone();
				let anchor = anchor.clone();
				return subscribe(cx, current, move |cx, current| resolve(cx, &parent, Renderable::List(items.clone()), &anchor, current, true));
			}
			let nodes = flattened.nodes;

			if cx.is_hydrating() {
				if previous == nodes || cx.options().hydration == HydrationPolicy::Trust {
					return Ok(Committed::List(previous));
				}
				warn!("Claimed {} node(s) that don't match the {} expected one(s). Rebuilding this list.", previous.len(), nodes.len());
				cx.release(&previous);
			}

			if let Committed::List(previous) = &current {
				if *previous == nodes && !previous.is_empty() {
					trace!("Same nodes as before.");
					return Ok(current);
				}
			}
			commit_list(dom, parent, anchor, &current, nodes)
		}
	}
}

/// Adopts existing text during hydration, or returns [`None`] to fall back to construction.
///
/// Content mismatches are repaired locally. Only missing markers fail the whole hydration pass.
fn adopt_text<D: Dom>(cx: &RenderContext<D>, parent: &D::Node, anchor: &Anchor<D::Node>, text: &str) -> Option<Committed<D::Node>> {
	let dom = cx.dom();
	let existing = match anchor {
		Anchor::Before(marker) => dom.next_sibling(marker),
		Anchor::Absent => dom.first_child(parent),
		Anchor::End => None,
	};

	match existing.filter(|existing| dom.is_text(existing)) {
		Some(existing) => {
			if cx.options().hydration == HydrationPolicy::Validate && dom.character_data(&existing).as_deref() != Some(text) {
				warn!("Hydrated text differs from the server-rendered text. Overwriting it.");
				dom.set_character_data(&existing, text);
			}
			Some(adopted(anchor, existing, text))
		}
		None => {
			warn!("Expected text while hydrating. Constructing it instead.");
			None
		}
	}
}

fn adopted<N>(anchor: &Anchor<N>, node: N, text: &str) -> Committed<N> {
	if anchor.is_absent() {
		Committed::Text(text.to_owned())
	} else {
		Committed::List(vec![node])
	}
}

#[cfg(feature = "dangerous-logging")]
fn redact(text: &str) -> &str {
	text
}

#[cfg(not(feature = "dangerous-logging"))]
fn redact(_: &str) -> &str {
	"<redacted>"
}
