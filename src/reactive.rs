//! The reactive core, provided by [***spark-signals***](`spark_signals`).
//!
//! Effects run synchronously when created and again whenever a [`Signal`] they read changes.
//! An effect created while another one runs belongs to it and is torn down before its owner re-runs,
//! so nested subscriptions never outlive the run that created them.
//!
//! [`root`] adds an explicit ownership [`Scope`] on top. That is what [`render`](`crate::render()`) and
//! [`hydrate`](`crate::hydrate()`) hand out.

use core::fmt::{self, Debug, Formatter};
use spark_signals::{effect_scope, EffectScope};
use tracing::trace;

pub use spark_signals::{batch, effect, flush_sync, on_scope_dispose as on_dispose, peek, signal, untrack, Signal};

/// An ownership root. Disposing it stops every effect created (transitively) inside it.
pub struct Scope(EffectScope);
impl Scope {
	#[must_use]
	pub fn new() -> Self {
		Self(effect_scope(false))
	}

	/// Stops everything created inside this scope and runs its [`on_dispose`] callbacks.
	pub fn dispose(self) {
		trace!("Disposing scope.");
		self.0.stop()
	}

	/// Runs `f` with this scope as owner, for example to add further effects to it later on.
	///
	/// Returns [`None`] iff the scope declined to run `f`.
	pub fn run<T>(&self, f: impl FnOnce() -> T) -> Option<T> {
		let mut value = None;
		self.0.run(|| value = Some(f()));
		value
	}
}
impl Default for Scope {
	fn default() -> Self {
		Self::new()
	}
}
impl Debug for Scope {
	fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
		f.debug_struct("Scope").finish_non_exhaustive()
	}
}

/// Creates a new ownership root and runs `f` inside it.
///
/// The value is [`None`] only if the scope declined to run `f`, which a fresh scope doesn't.
pub fn root<T>(f: impl FnOnce() -> T) -> (Option<T>, Scope) {
	let scope = Scope::new();
	let value = scope.run(f);
	(value, scope)
}
