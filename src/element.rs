//! Keyed element descriptors and the native view capability they target.

use core::fmt;

use portable_atomic_util::Arc;

use crate::error::ElementError;
use crate::handler::{EventHandler, EventHandlerSet};
use crate::prop::{apply_props, Prop};

/// A handle to a live platform object that elements create and configure.
///
/// Handles are cheap to clone and clones refer to the same object. The kind
/// replaces runtime type inspection: an existing object is reusable for a
/// descriptor exactly when their kinds match.
pub trait NativeView: Clone {
    type Kind: Copy + PartialEq + fmt::Debug + 'static;

    /// Payload handed to event handlers when the view fires an action.
    type Event: 'static;

    fn kind(&self) -> Self::Kind;

    /// Object identity, not structural equality.
    fn is_same(&self, other: &Self) -> bool;

    /// Route `action` to `handler`, replacing any previous target for it.
    fn bind(&self, action: &str, handler: Arc<EventHandler<Self::Event>>);

    /// Remove bindings for every action not listed.
    fn retain_bindings(&self, actions: &[&str]);
}

type MakeFn<V> = dyn Fn(Option<&V>) -> V;
type ApplyFn<Msg, V> =
    dyn Fn(&V, &mut EventHandlerSet<Msg, <V as NativeView>::Event>) -> Result<(), ElementError>;

/// Immutable description of one keyed UI node.
///
/// `make` returns the existing object when it can be reused, otherwise a
/// freshly constructed one. `apply` sets every declared property and binds
/// event handlers; it runs on every render pass and must be idempotent.
pub struct Element<Msg, V: NativeView> {
    key: String,
    make: Box<MakeFn<V>>,
    apply: Box<ApplyFn<Msg, V>>,
}

impl<Msg, V: NativeView> Element<Msg, V> {
    pub fn new<M, A>(key: impl Into<String>, make: M, apply: A) -> Self
    where
        M: Fn(Option<&V>) -> V + 'static,
        A: Fn(&V, &mut EventHandlerSet<Msg, V::Event>) -> Result<(), ElementError> + 'static,
    {
        Self {
            key: key.into(),
            make: Box::new(make),
            apply: Box::new(apply),
        }
    }

    /// The usual descriptor: reuse a view of `kind`, else `construct` one,
    /// then apply `props` in stage order.
    ///
    /// Applying to a view of another kind fails with
    /// [`ElementError::IncompatibleView`] and leaves the view untouched.
    pub fn with_props<C>(
        key: impl Into<String>,
        kind: V::Kind,
        construct: C,
        props: Vec<Prop<Msg, V>>,
    ) -> Self
    where
        C: Fn() -> V + 'static,
        Msg: Send + 'static,
        V: 'static,
    {
        let key = key.into();
        let element_key = key.clone();

        Self::new(
            key,
            move |existing: Option<&V>| match existing {
                Some(view) if view.kind() == kind => view.clone(),
                _ => construct(),
            },
            move |view: &V, handlers: &mut EventHandlerSet<Msg, V::Event>| {
                let found = view.kind();
                if found != kind {
                    return Err(ElementError::IncompatibleView {
                        key: element_key.clone(),
                        expected: format!("{kind:?}"),
                        found: format!("{found:?}"),
                    });
                }
                apply_props(&props, view, handlers);
                Ok(())
            },
        )
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn make(&self, existing: Option<&V>) -> V {
        (self.make)(existing)
    }

    pub fn apply(
        &self,
        view: &V,
        handlers: &mut EventHandlerSet<Msg, V::Event>,
    ) -> Result<(), ElementError> {
        (self.apply)(view, handlers)
    }
}

impl<Msg, V: NativeView> fmt::Debug for Element<Msg, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element").field("key", &self.key).finish_non_exhaustive()
    }
}
