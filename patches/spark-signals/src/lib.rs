// ============================================================================
// spark-signals - A Reactive Signals Library for Rust
// ============================================================================
//
// A faithful port of @rlabs-inc/signals TypeScript package.
// See CLAUDE.md for implementation notes and .planning/ for roadmap.
// ============================================================================

pub mod collections;
pub mod core;
#[macro_use]
pub mod macros;
pub mod primitives;
pub mod reactivity;
pub mod shared;

// Re-export core items at crate root for ergonomic access
pub use core::constants;
pub use core::context::{
    is_batching, is_tracking, is_untracking, read_version, with_context, write_version,
    ReactiveContext,
};
pub use core::types::{default_equals, AnyReaction, AnySource, EqualsFn, SourceInner};

// Re-export primitives at crate root (TypeScript-like API)
pub use primitives::bind::{
    bind, bind_chain, bind_getter, bind_readonly, bind_readonly_from, bind_readonly_static,
    bind_static, bind_value, binding_has_internal_source, disconnect_binding, disconnect_source,
    is_binding, unwrap_binding, unwrap_readonly, Binding, IsBinding, ReadonlyBinding,
};
pub use primitives::derived::{derived, derived_with_equals, Derived, DerivedInner};
pub use primitives::effect::{
    effect, effect_root, effect_sync, effect_sync_with_cleanup, effect_tracking,
    effect_with_cleanup, CleanupFn, DisposeFn, Effect, EffectFn, EffectInner,
};
pub use primitives::linked::{
    is_linked_signal, linked_signal, linked_signal_full, linked_signal_with_options,
    IsLinkedSignal, LinkedSignal, LinkedSignalOptionsSimple, PreviousValue,
};
pub use primitives::props::{into_derived, reactive_prop, PropValue, PropsBuilder, UnwrapProp};
pub use primitives::selector::{create_selector, create_selector_eq, Selector};
pub use primitives::scope::{
    effect_scope, get_current_scope, on_scope_dispose, EffectScope, ScopeCleanupFn,
};
pub use primitives::signal::{
    mutable_source, signal, signal_f32, signal_f64, signal_with_equals, source, Signal,
    SourceOptions,
};
pub use primitives::slot::{
    dirty_set, is_slot, slot, slot_array, slot_with_value, tracked_slot, tracked_slot_array,
    DirtySet, IsSlot, Slot, SlotArray, SlotWriteError, TrackedSlot, TrackedSlotArray,
};

// Re-export reactivity functions
pub use reactivity::batching::{batch, peek, tick, untrack};
pub use reactivity::equality::{
    always_equals, by_field, deep_equals, equals, never_equals, safe_equals_f32, safe_equals_f64,
    safe_equals_option_f64, safe_not_equal_f32, safe_not_equal_f64, shallow_equals_slice,
    shallow_equals_vec,
};
pub use reactivity::scheduling::flush_sync;
pub use reactivity::tracking::{
    is_dirty, mark_reactions, notify_write, remove_reactions, set_signal_status, track_read,
};

// Re-export collections
pub use collections::{ReactiveMap, ReactiveSet, ReactiveVec};

// Re-export repeater
pub use primitives::repeater::{repeat, RepeaterInner};

// Re-export shared memory primitives (for FFI bridges)
pub use shared::{
    wait_for_wake, wait_for_wake_timeout, MutableSharedArray, MutableSharedF32Array,
    ReactiveSharedArray, ReactiveSharedF32Array, ReactiveSharedI32Array, ReactiveSharedU32Array,
    ReactiveSharedU8Array, SharedBufferContext,
};

// Re-export new shared primitives (Layer 1 + Notifier)
pub use shared::notify::{platform_wake, AtomicsNotifier, Notifier, NoopNotifier};
pub use shared::shared_slot_buffer::SharedSlotBuffer;

// =============================================================================
// TESTS
// =============================================================================
