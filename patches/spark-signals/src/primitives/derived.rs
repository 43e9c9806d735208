// ============================================================================
// spark-signals - Derived Signals
// Lazy computed values that cache and update when dependencies change
// ============================================================================
//
// A Derived is BOTH a Source (can be read, has reactions) AND a Reaction
// (has deps, can be marked dirty, has update method). This dual nature is
// essential for the MAYBE_DIRTY optimization.
// ============================================================================

use std::any::Any;
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::core::constants::*;
use crate::core::context::with_context;
use crate::core::types::{default_equals, AnyReaction, AnySource, EqualsFn};
use crate::reactivity::tracking::{install_dependencies, set_source_status, track_read};

// =============================================================================
// DERIVED INNER
// =============================================================================

/// Marker value for uninitialized derived (currently unused, reserved for future use)
#[allow(dead_code)]
const UNINITIALIZED: u32 = u32::MAX;

/// The internal data for a derived signal.
///
/// Implements BOTH AnySource (can be read, has reactions) AND AnyReaction
/// (has deps, can be marked dirty, executes computation).
pub struct DerivedInner<T> {
    /// Flags bitmask (DERIVED | status)
    flags: Cell<u32>,

    /// The computation function
    fn_: RefCell<Option<Box<dyn Fn() -> T>>>,

    /// Cached value (None = uninitialized)
    value: RefCell<Option<T>>,

    /// Equality function for comparing values
    equals: EqualsFn<T>,

    /// Write version - incremented when value changes
    write_version: Cell<u32>,

    /// Read version - for dependency deduplication
    read_version: Cell<u32>,

    /// Reactions that depend on this derived (Source side)
    reactions: RefCell<Vec<Weak<dyn AnyReaction>>>,

    /// Dependencies this derived reads from (Reaction side)
    deps: RefCell<Vec<Rc<dyn AnySource>>>,

    /// Self-reference for as_derived_source()
    /// Set immediately during construction in new_with_equals()
    self_ref: RefCell<Option<Weak<DerivedInner<T>>>>,
}

impl<T> DerivedInner<T> {
    /// Create a new derived with the given computation function
    pub fn new<F>(fn_: F) -> Rc<Self>
    where
        F: Fn() -> T + 'static,
        T: PartialEq,
    {
        Self::new_with_equals(fn_, default_equals)
    }

    /// Create a new derived with a custom equality function
    pub fn new_with_equals<F>(fn_: F, equals: EqualsFn<T>) -> Rc<Self>
    where
        F: Fn() -> T + 'static,
    {
        let inner = Rc::new(Self {
            flags: Cell::new(DERIVED | SOURCE | DIRTY), // Start dirty (needs first computation)
            fn_: RefCell::new(Some(Box::new(fn_))),
            value: RefCell::new(None),
            equals,
            write_version: Cell::new(0),
            read_version: Cell::new(0),
            reactions: RefCell::new(Vec::new()),
            deps: RefCell::new(Vec::new()),
            self_ref: RefCell::new(None),
        });

        // Store weak self-reference for as_derived_source()
        *inner.self_ref.borrow_mut() = Some(Rc::downgrade(&inner));

        inner
    }

    /// Get the cached value (panics if uninitialized)
    pub fn get_value(&self) -> T
    where
        T: Clone,
    {
        self.value.borrow().as_ref().expect("derived not initialized").clone()
    }

    /// Check if the value has been computed at least once
    pub fn is_initialized(&self) -> bool {
        self.value.borrow().is_some()
    }

    /// Execute the computation and update the cached value.
    /// Returns true if the value changed.
    pub fn compute(&self) -> bool
    where
        T: Clone,
    {
        let fn_ref = self.fn_.borrow();
        let fn_ = fn_ref.as_ref().expect("derived fn disposed");

        // Run the computation
        let new_value = fn_();

        // Check if value changed
        let changed = {
            let current = self.value.borrow();
            match current.as_ref() {
                Some(v) => !(self.equals)(v, &new_value),
                None => true, // First computation - always "changed"
            }
        };

        if changed {
            *self.value.borrow_mut() = Some(new_value);
            // Increment write version when value changes
            with_context(|ctx| {
                self.write_version.set(ctx.increment_write_version());
            });
        }

        changed
    }

    /// Get the equality function
    pub fn equals_fn(&self) -> EqualsFn<T> {
        self.equals
    }
}

// =============================================================================
// AnySource implementation for DerivedInner
// =============================================================================

impl<T: 'static + Clone> AnySource for DerivedInner<T> {
    fn flags(&self) -> u32 {
        self.flags.get()
    }

    fn set_flags(&self, flags: u32) {
        self.flags.set(flags);
    }

    fn write_version(&self) -> u32 {
        self.write_version.get()
    }

    fn set_write_version(&self, version: u32) {
        self.write_version.set(version);
    }

    fn read_version(&self) -> u32 {
        self.read_version.get()
    }

    fn set_read_version(&self, version: u32) {
        self.read_version.set(version);
    }

    fn reaction_count(&self) -> usize {
        self.reactions.borrow().len()
    }

    fn add_reaction(&self, reaction: Weak<dyn AnyReaction>) {
        self.reactions.borrow_mut().push(reaction);
    }

    fn cleanup_dead_reactions(&self) {
        self.reactions.borrow_mut().retain(|w| w.strong_count() > 0);
    }

    fn for_each_reaction(&self, f: &mut dyn FnMut(Rc<dyn AnyReaction>) -> bool) {
        let reactions = self.reactions.borrow();
        for weak in reactions.iter() {
            if let Some(rc) = weak.upgrade() {
                if !f(rc) {
                    break;
                }
            }
        }
    }

    fn remove_reaction(&self, reaction: &Rc<dyn AnyReaction>) {
        let reaction_ptr = Rc::as_ptr(reaction) as *const ();
        self.reactions.borrow_mut().retain(|weak| {
            if let Some(rc) = weak.upgrade() {
                let ptr = Rc::as_ptr(&rc) as *const ();
                ptr != reaction_ptr
            } else {
                false // remove dead refs
            }
        });
    }

    fn clear_reactions(&self) {
        self.reactions.borrow_mut().clear();
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_derived_reaction(&self) -> Option<Rc<dyn AnyReaction>> {
        // Return self as Rc<dyn AnyReaction> for MAYBE_DIRTY checking
        self.self_ref
            .borrow()
            .as_ref()
            .and_then(|weak| weak.upgrade())
            .map(|rc| rc as Rc<dyn AnyReaction>)
    }
}

// =============================================================================
// AnyReaction implementation for DerivedInner
// =============================================================================

impl<T: 'static + Clone> AnyReaction for DerivedInner<T> {
    fn flags(&self) -> u32 {
        self.flags.get()
    }

    fn set_flags(&self, flags: u32) {
        self.flags.set(flags);
    }

    fn dep_count(&self) -> usize {
        self.deps.borrow().len()
    }

    fn add_dep(&self, source: Rc<dyn AnySource>) {
        self.deps.borrow_mut().push(source);
    }

    fn clear_deps(&self) {
        self.deps.borrow_mut().clear();
    }

    fn remove_deps_from(&self, start: usize) {
        self.deps.borrow_mut().truncate(start);
    }

    fn for_each_dep(&self, f: &mut dyn FnMut(&Rc<dyn AnySource>) -> bool) {
        for dep in self.deps.borrow().iter() {
            if !f(dep) {
                break;
            }
        }
    }

    fn remove_source(&self, source: &Rc<dyn AnySource>) {
        let source_ptr = Rc::as_ptr(source) as *const ();
        self.deps.borrow_mut().retain(|dep| {
            let dep_ptr = Rc::as_ptr(dep) as *const ();
            dep_ptr != source_ptr
        });
    }

    fn update(&self) -> bool {
        // Execute the computation and return whether value changed
        self.compute()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_derived_source(&self) -> Option<Rc<dyn AnySource>> {
        // Return self as Rc<dyn AnySource> for cascade propagation
        self.self_ref
            .borrow()
            .as_ref()
            .and_then(|weak| weak.upgrade())
            .map(|rc| rc as Rc<dyn AnySource>)
    }
}

// =============================================================================
// DERIVED<T> WRAPPER
// =============================================================================

/// A derived signal - a lazily computed value that caches and updates.
///
/// Derived signals only recompute when their dependencies change.
/// They implement the MAYBE_DIRTY optimization: if a dependency is marked
/// MAYBE_DIRTY but its value didn't actually change, the derived doesn't
/// need to recompute.
///
/// # Example
/// ```ignore
/// let count = signal(1);
/// let doubled = derived(|| count.get() * 2);
/// assert_eq!(doubled.get(), 2);
/// count.set(5);
/// assert_eq!(doubled.get(), 10);
/// ```
#[derive(Clone)]
pub struct Derived<T> {
    inner: Rc<DerivedInner<T>>,
}

impl<T: 'static + Clone> Derived<T> {
    /// Create a new derived signal from an inner
    pub(crate) fn from_inner(inner: Rc<DerivedInner<T>>) -> Self {
        Self { inner }
    }

    /// Get the derived's value.
    ///
    /// If the derived is dirty, it will recompute first.
    /// If inside a reaction, registers this derived as a dependency.
    pub fn get(&self) -> T {
        // Update the derived if needed
        update_derived_chain(self.inner.clone() as Rc<dyn AnySource>);

        // Track the read (registers dependency if inside a reaction)
        track_read(self.inner.clone() as Rc<dyn AnySource>);

        // Return the cached value
        self.inner.get_value()
    }

    /// Get access to the inner for graph operations
    pub fn inner(&self) -> &Rc<DerivedInner<T>> {
        &self.inner
    }

    /// Convert to type-erased AnySource
    pub fn as_any_source(&self) -> Rc<dyn AnySource> {
        self.inner.clone() as Rc<dyn AnySource>
    }

    /// Convert to type-erased AnyReaction
    pub fn as_any_reaction(&self) -> Rc<dyn AnyReaction> {
        self.inner.clone() as Rc<dyn AnyReaction>
    }
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Create a derived signal.
///
/// Derived signals are lazy - they only compute when read.
/// They cache their value and only recompute when dependencies change.
///
/// # Example
/// ```ignore
/// let count = signal(1);
/// let doubled = derived(|| count.get() * 2);
/// assert_eq!(doubled.get(), 2);
/// count.set(5);
/// assert_eq!(doubled.get(), 10);
/// ```
pub fn derived<T, F>(fn_: F) -> Derived<T>
where
    T: 'static + Clone + PartialEq,
    F: Fn() -> T + 'static,
{
    Derived::from_inner(DerivedInner::new(fn_))
}

/// Create a derived signal with a custom equality function.
pub fn derived_with_equals<T, F>(fn_: F, equals: EqualsFn<T>) -> Derived<T>
where
    T: 'static + Clone,
    F: Fn() -> T + 'static,
{
    Derived::from_inner(DerivedInner::new_with_equals(fn_, equals))
}

// =============================================================================
// UPDATE DERIVED CHAIN - The MAYBE_DIRTY optimization
// =============================================================================

/// Update a derived and all its dirty dependencies iteratively.
///
/// This is the key algorithm for the MAYBE_DIRTY optimization:
/// 1. Collect all dirty/maybe-dirty deriveds in the dependency chain
/// 2. Process from deepest (sources) to shallowest (target)
/// 3. For DIRTY: always update
/// 4. For MAYBE_DIRTY: check if any dep's write_version > self.write_version
///
/// Uses iterative approach to avoid stack overflow on deep chains.
pub fn update_derived_chain(target: Rc<dyn AnySource>) {
    // Quick check: if clean, nothing to do
    let flags = target.flags();
    if (flags & (DIRTY | MAYBE_DIRTY)) == 0 {
        return;
    }

    // Collect all deriveds that need checking
    // Walk from target toward sources, collecting dirty/maybe-dirty deriveds
    let mut chain: Vec<Rc<dyn AnySource>> = vec![target.clone()];
    let mut visited: Vec<*const ()> = vec![Rc::as_ptr(&target) as *const ()];
    let mut idx = 0;

    while idx < chain.len() {
        let current = chain[idx].clone();
        idx += 1;

        // Skip if already clean
        let flags = current.flags();
        if (flags & (DIRTY | MAYBE_DIRTY)) == 0 {
            continue;
        }

        // For deriveds, check their dependencies
        // Use as_derived_reaction() to get the reaction side
        if let Some(reaction) = current.as_derived_reaction() {
            // Collect deps that are derived and dirty/maybe-dirty
            let mut deps_to_add = Vec::new();
            reaction.for_each_dep(&mut |dep| {
                let dep_flags = dep.flags();
                if (dep_flags & DERIVED) != 0 && (dep_flags & (DIRTY | MAYBE_DIRTY)) != 0 {
                    let dep_ptr = Rc::as_ptr(dep) as *const ();
                    if !visited.contains(&dep_ptr) {
                        deps_to_add.push(dep.clone());
                        visited.push(dep_ptr);
                    }
                }
                true // continue
            });
            chain.extend(deps_to_add);
        }
    }

    // Update from deepest (end) to shallowest (start)
    for i in (0..chain.len()).rev() {
        let current = &chain[i];

        // Skip if already clean (might have been cleaned by a previous iteration)
        let flags = current.flags();
        if (flags & (DIRTY | MAYBE_DIRTY)) == 0 {
            continue;
        }

        if (flags & DIRTY) != 0 {
            // Definitely dirty - must update
            update_derived(current);
        } else {
            // MAYBE_DIRTY - check if any dep actually changed
            let needs_update = check_deps_changed(current);

            if needs_update {
                update_derived(current);
            } else {
                // All deps are clean and unchanged - mark as clean
                set_source_status(&**current, CLEAN);
            }
        }
    }
}

/// Check if any dependency has a newer write_version than the derived.
fn check_deps_changed(source: &Rc<dyn AnySource>) -> bool {
    let self_wv = source.write_version();

    if let Some(reaction) = source.as_derived_reaction() {
        let mut changed = false;
        reaction.for_each_dep(&mut |dep| {
            if dep.write_version() > self_wv {
                changed = true;
                false // stop iteration
            } else {
                true // continue
            }
        });
        changed
    } else {
        false
    }
}

/// Update a single derived signal.
///
/// This function:
/// 1. Sets up the tracking context (active reaction, read version)
/// 2. Runs the computation function (which calls signal.get() and tracks deps)
/// 3. Installs the new dependencies (wires up the reactive graph)
/// 4. Marks the derived as clean
fn update_derived(source: &Rc<dyn AnySource>) {
    if let Some(reaction) = source.as_derived_reaction() {
        // Save previous tracking state
        let prev_reaction = with_context(|ctx| ctx.get_active_reaction());
        let prev_new_deps = with_context(|ctx| ctx.swap_new_deps(Vec::new()));

        // Set up tracking for this derived
        with_context(|ctx| {
            ctx.set_active_reaction(Some(Rc::downgrade(&reaction)));
            ctx.increment_read_version();
        });

        // Mark as updating
        let old_flags = reaction.flags();
        reaction.set_flags(old_flags | REACTION_IS_UPDATING);

        // Run the computation (this calls signal.get() which calls track_read())
        let _changed = reaction.update();

        // Clear updating flag
        let new_flags = reaction.flags() & !REACTION_IS_UPDATING;
        reaction.set_flags(new_flags);

        // Install the collected dependencies
        // For a derived that was previously computed, we'd use skipped deps optimization
        // For simplicity, we start fresh with skipped=0
        install_dependencies(reaction.clone(), 0);

        // Mark as clean
        set_source_status(&**source, CLEAN);

        // Restore previous tracking state
        with_context(|ctx| {
            ctx.set_active_reaction(prev_reaction);
            ctx.swap_new_deps(prev_new_deps);
        });
    }
}

// =============================================================================
// TESTS
// =============================================================================
