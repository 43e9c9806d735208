// ============================================================================
// spark-signals - Effect Scope
//
// Group effects for batch disposal with pause/resume support.
// Based on Vue 3's effectScope pattern.
// ============================================================================
//
// An EffectScope groups effects so they can be disposed together.
// This is useful for component lifecycle - create a scope when mounting,
// dispose the scope when unmounting, all effects clean up automatically.
//
// Key features:
// - run(fn) - Execute function with this scope active
// - stop() - Dispose all effects and run cleanups
// - pause()/resume() - Temporarily disable effects
// - Nested scopes (child scopes auto-disposed with parent)
// - Detached scopes (opt out of parent collection)
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::core::constants::*;
use crate::core::types::AnyReaction;
use crate::primitives::effect::{destroy_effect, EffectInner};
use crate::reactivity::scheduling::{flush_sync, schedule_effect_inner};

// =============================================================================
// THREAD-LOCAL SCOPE STATE
// =============================================================================

thread_local! {
    /// Currently active scope (if any)
    static ACTIVE_SCOPE: RefCell<Option<Rc<EffectScopeInner>>> = const { RefCell::new(None) };
}

/// Get the currently active scope
fn get_active_scope() -> Option<Rc<EffectScopeInner>> {
    ACTIVE_SCOPE.with(|s| s.borrow().clone())
}

/// Set the active scope, returning the previous one
fn set_active_scope(scope: Option<Rc<EffectScopeInner>>) -> Option<Rc<EffectScopeInner>> {
    ACTIVE_SCOPE.with(|s| {
        let prev = s.borrow().clone();
        *s.borrow_mut() = scope;
        prev
    })
}

// =============================================================================
// CLEANUP TYPE
// =============================================================================

/// Cleanup function type for scope disposal
pub type ScopeCleanupFn = Box<dyn FnOnce()>;

// =============================================================================
// EFFECT SCOPE INNER
// =============================================================================

/// Internal scope implementation
pub struct EffectScopeInner {
    /// Whether the scope is still active (not stopped)
    active: Cell<bool>,

    /// Whether the scope is paused
    paused: Cell<bool>,

    /// Effects created within this scope
    effects: RefCell<Vec<Rc<EffectInner>>>,

    /// Cleanup functions to run on stop
    cleanups: RefCell<Vec<ScopeCleanupFn>>,

    /// Parent scope (for nested scopes)
    parent: RefCell<Option<Weak<EffectScopeInner>>>,

    /// Child scopes
    scopes: RefCell<Vec<Rc<EffectScopeInner>>>,

    /// Self-reference for returning from run()
    self_weak: RefCell<Weak<EffectScopeInner>>,
}

impl EffectScopeInner {
    /// Create a new scope
    fn new(detached: bool) -> Rc<Self> {
        let parent = if detached { None } else { get_active_scope() };

        let scope = Rc::new(Self {
            active: Cell::new(true),
            paused: Cell::new(false),
            effects: RefCell::new(Vec::new()),
            cleanups: RefCell::new(Vec::new()),
            parent: RefCell::new(parent.as_ref().map(Rc::downgrade)),
            scopes: RefCell::new(Vec::new()),
            self_weak: RefCell::new(Weak::new()),
        });

        // Store self-reference
        *scope.self_weak.borrow_mut() = Rc::downgrade(&scope);

        // Register with parent scope unless detached
        if let Some(ref parent_scope) = parent {
            parent_scope.scopes.borrow_mut().push(scope.clone());
        }

        scope
    }

    /// Check if scope is active
    pub fn is_active(&self) -> bool {
        self.active.get()
    }

    /// Check if scope is paused
    pub fn is_paused(&self) -> bool {
        self.paused.get()
    }

    /// Run a function within this scope
    pub fn run<R, F: FnOnce() -> R>(&self, f: F) -> Option<R> {
        if !self.active.get() {
            return None;
        }

        // Get Rc to self
        let self_rc = self.self_weak.borrow().upgrade()?;

        let prev_scope = set_active_scope(Some(self_rc));
        let result = f();
        set_active_scope(prev_scope);

        Some(result)
    }

    /// Stop the scope, disposing all tracked effects
    pub fn stop(&self) {
        if !self.active.get() {
            return;
        }

        // Flush any pending effects first to ensure clean state
        flush_sync();

        // Dispose all effects
        let effects: Vec<_> = self.effects.borrow_mut().drain(..).collect();
        for effect in effects {
            destroy_effect(effect, true);
        }

        // Run cleanups (in reverse order for proper nesting)
        let cleanups: Vec<_> = self.cleanups.borrow_mut().drain(..).collect();
        for cleanup in cleanups.into_iter().rev() {
            // Cleanup errors are silently ignored (like TypeScript)
            let _ = std::panic::catch_unwind(std::panic::AssertUnwindSafe(cleanup));
        }

        // Stop child scopes
        let child_scopes: Vec<_> = self.scopes.borrow_mut().drain(..).collect();
        for child in child_scopes {
            child.stop();
        }

        // Remove from parent's scope list
        if let Some(parent) = self.parent.borrow().as_ref().and_then(|w| w.upgrade()) {
            if let Some(self_rc) = self.self_weak.borrow().upgrade() {
                parent.scopes.borrow_mut().retain(|s| !Rc::ptr_eq(s, &self_rc));
            }
        }

        self.active.set(false);
    }

    /// Pause all effects in this scope
    pub fn pause(&self) {
        if !self.active.get() || self.paused.get() {
            return;
        }

        self.paused.set(true);

        // Mark all effects as inert (paused)
        for effect in self.effects.borrow().iter() {
            let flags = effect.flags();
            effect.set_flags(flags | INERT);
        }

        // Pause child scopes
        for child in self.scopes.borrow().iter() {
            child.pause();
        }
    }

    /// Resume all paused effects in this scope
    pub fn resume(&self) {
        if !self.active.get() || !self.paused.get() {
            return;
        }

        self.paused.set(false);

        // Unmark effects and reschedule dirty ones
        for effect in self.effects.borrow().iter() {
            let flags = effect.flags();
            effect.set_flags(flags & !INERT);

            // If effect is dirty, reschedule it
            if (flags & DIRTY) != 0 {
                schedule_effect_inner(effect.clone());
            }
        }

        // Resume child scopes
        for child in self.scopes.borrow().iter() {
            child.resume();
        }
    }

    /// Add an effect to this scope
    pub fn add_effect(&self, effect: Rc<EffectInner>) {
        self.effects.borrow_mut().push(effect);
    }

    /// Add a cleanup function to this scope
    pub fn add_cleanup(&self, cleanup: ScopeCleanupFn) {
        self.cleanups.borrow_mut().push(cleanup);
    }
}

impl Drop for EffectScopeInner {
    fn drop(&mut self) {
        // Stop the scope if it's still active
        // This ensures all effects are disposed and cleanups run
        if self.active.get() {
            self.stop();
        }
    }
}

// =============================================================================
// EFFECT SCOPE (Public wrapper)
// =============================================================================

/// An effect scope that groups effects for batch disposal.
///
/// Effects created while a scope is active are automatically tracked by that scope.
/// When the scope is stopped, all tracked effects are disposed together.
///
/// # Example
///
/// ```ignore
/// let scope = effect_scope(false);
///
/// scope.run(|| {
///     // These effects are tracked by the scope
///     effect(|| println!("Effect A"));
///     effect(|| println!("Effect B"));
/// });
///
/// // Later, dispose all effects at once
/// scope.stop();
/// ```
#[derive(Clone)]
pub struct EffectScope {
    inner: Rc<EffectScopeInner>,
}

impl EffectScope {
    /// Create from inner
    fn from_inner(inner: Rc<EffectScopeInner>) -> Self {
        Self { inner }
    }

    /// Whether the scope is still active (not stopped)
    pub fn active(&self) -> bool {
        self.inner.is_active()
    }

    /// Whether the scope is paused
    pub fn paused(&self) -> bool {
        self.inner.is_paused()
    }

    /// Run a function within this scope.
    ///
    /// Effects created during execution are tracked by this scope.
    /// Returns None if the scope has been stopped.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let scope = effect_scope(false);
    ///
    /// let result = scope.run(|| {
    ///     effect(|| println!("Tracked by scope"));
    ///     42
    /// });
    ///
    /// assert_eq!(result, Some(42));
    /// ```
    pub fn run<R, F: FnOnce() -> R>(&self, f: F) -> Option<R> {
        self.inner.run(f)
    }

    /// Stop the scope, disposing all tracked effects.
    ///
    /// - All effects are destroyed
    /// - All cleanup callbacks are run (in reverse order)
    /// - All child scopes are stopped
    ///
    /// After stopping, `run()` will return None.
    pub fn stop(&self) {
        self.inner.stop();
    }

    /// Pause all effects in this scope.
    ///
    /// Paused effects won't run when their dependencies change.
    /// Changes are accumulated and effects will run when resumed.
    pub fn pause(&self) {
        self.inner.pause();
    }

    /// Resume all paused effects in this scope.
    ///
    /// Dirty effects (those whose dependencies changed while paused)
    /// will be scheduled for execution.
    pub fn resume(&self) {
        self.inner.resume();
    }
}

impl Drop for EffectScope {
    fn drop(&mut self) {
        // Auto-stop if this is the last strong reference
        // We check for 1 because we hold one reference in self.inner
        if Rc::strong_count(&self.inner) == 1 {
            self.inner.stop();
        }
    }
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Create an effect scope.
///
/// Effects created within the scope can be disposed together.
/// Child scopes are automatically disposed when the parent is stopped.
///
/// # Arguments
///
/// * `detached` - If true, scope won't be collected by parent scope
///
/// # Example
///
/// ```ignore
/// let scope = effect_scope(false);
///
/// scope.run(|| {
///     // These effects are tracked by the scope
///     effect(|| println!("count: {}", count.get()));
///     effect(|| println!("name: {}", name.get()));
/// });
///
/// // Later, dispose all effects at once
/// scope.stop();
/// ```
///
/// # Example: Pause/Resume
///
/// ```ignore
/// let scope = effect_scope(false);
///
/// scope.run(|| {
///     effect(|| println!("count: {}", count.get()));
/// });
///
/// // Pause effects (they won't run while paused)
/// scope.pause();
///
/// count.set(count.get() + 1); // Effect doesn't run
///
/// // Resume effects (pending updates will run)
/// scope.resume();
/// ```
///
/// # Example: Detached Scope
///
/// ```ignore
/// let parent = effect_scope(false);
///
/// parent.run(|| {
///     // This scope is NOT tracked by parent
///     let detached = effect_scope(true);
///     detached.run(|| {
///         effect(|| println!("I survive parent.stop()"));
///     });
/// });
///
/// parent.stop(); // Detached scope's effects still run!
/// ```
pub fn effect_scope(detached: bool) -> EffectScope {
    EffectScope::from_inner(EffectScopeInner::new(detached))
}

/// Get the currently active scope, if any.
///
/// Returns None if not inside a scope's `run()` call.
///
/// # Example
///
/// ```ignore
/// assert!(get_current_scope().is_none());
///
/// let scope = effect_scope(false);
/// scope.run(|| {
///     assert!(get_current_scope().is_some());
/// });
/// ```
pub fn get_current_scope() -> Option<EffectScope> {
    get_active_scope().map(EffectScope::from_inner)
}

/// Register a cleanup function on the current scope.
///
/// Will be called when the scope is stopped.
/// Does nothing if called outside of a scope context (with a warning).
///
/// # Example
///
/// ```ignore
/// scope.run(|| {
///     let timer = start_timer();
///
///     on_scope_dispose(move || {
///         stop_timer(timer);
///     });
/// });
///
/// // Later...
/// scope.stop(); // Timer is stopped
/// ```
pub fn on_scope_dispose<F: FnOnce() + 'static>(f: F) {
    if let Some(scope) = get_active_scope() {
        scope.add_cleanup(Box::new(f));
    } else {
        #[cfg(debug_assertions)]
        eprintln!("on_scope_dispose() called outside of scope context");
    }
}

/// Register an effect with the current scope.
///
/// Called internally when an effect is created.
/// This is what allows scopes to track and dispose effects.
pub fn register_effect_with_scope(effect: &Rc<EffectInner>) {
    if let Some(scope) = get_active_scope() {
        scope.add_effect(effect.clone());
    }
}

// =============================================================================
// TESTS
// =============================================================================
