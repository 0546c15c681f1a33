//! Keyed reconciliation of element descriptors onto a native container.

use std::collections::{HashMap, HashSet};

use crate::error::{LayoutError, ReconcileError};
use crate::handler::EventHandlerSet;
use crate::{Element, Emitter, NativeView};

/// The native parent that reconciled views live in.
pub trait Container {
    type View: NativeView;

    /// Positioning rule produced by a layout pass.
    type Constraint;

    fn attach(&mut self, view: &Self::View);

    fn detach(&mut self, view: &Self::View);

    /// Activate the constraints of one layout pass, all at once.
    fn activate(&mut self, constraints: Vec<Self::Constraint>);
}

type ViewEvent<C> = <<C as Container>::View as NativeView>::Event;

/// What one [`Reconciler::update`] did to the native hierarchy.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Reconciliation {
    /// Keys seen for the first time.
    pub created: usize,
    /// Keys whose object was swapped for a new one.
    pub replaced: usize,
    /// Keys whose existing object was kept.
    pub reused: usize,
}

impl Reconciliation {
    /// `true` when nothing was attached or detached.
    pub fn is_structurally_unchanged(&self) -> bool {
        self.created == 0 && self.replaced == 0
    }
}

/// Maps a keyed, flat list of elements onto objects in one container.
///
/// Objects are matched to descriptors by key. An object is only replaced when
/// the descriptor refuses to reuse it; everything else is reconfigured in
/// place. Existing objects are never reordered.
///
/// Keys that disappear from a pass keep their object and handlers; nothing is
/// pruned.
pub struct Reconciler<Msg, C: Container> {
    container: C,
    emitter: Emitter<Msg>,
    views: HashMap<String, C::View>,
    handlers: HashMap<String, EventHandlerSet<Msg, ViewEvent<C>>>,
}

impl<Msg, C> Reconciler<Msg, C>
where
    Msg: Send + 'static,
    C: Container,
{
    pub fn new(container: C, emitter: Emitter<Msg>) -> Self {
        Self {
            container,
            emitter,
            views: HashMap::new(),
            handlers: HashMap::new(),
        }
    }

    /// Reconcile `elements`, in order.
    ///
    /// Keys must be unique within `elements`; a duplicate is rejected before
    /// anything is touched. An element that fails to apply stops the pass,
    /// leaving earlier elements applied.
    pub fn update(&mut self, elements: &[Element<Msg, C::View>]) -> Result<Reconciliation, ReconcileError> {
        let mut seen = HashSet::with_capacity(elements.len());
        for element in elements {
            if !seen.insert(element.key()) {
                tracing::warn!(key = element.key(), "duplicate element key");
                return Err(ReconcileError::DuplicateKey(element.key().to_owned()));
            }
        }

        let mut report = Reconciliation::default();

        for element in elements {
            let key = element.key();
            let existing = self.views.get(key).cloned();
            let view = element.make(existing.as_ref());

            let handlers = self
                .handlers
                .entry(key.to_owned())
                .or_insert_with(|| EventHandlerSet::new(self.emitter.clone()));

            match existing {
                None => {
                    tracing::trace!(key, "attaching new view");
                    self.container.attach(&view);
                    self.views.insert(key.to_owned(), view.clone());
                    report.created += 1;
                }
                Some(old) if !old.is_same(&view) => {
                    tracing::debug!(key, from = ?old.kind(), to = ?view.kind(), "replacing view");
                    self.container.detach(&old);
                    handlers.reset();
                    self.container.attach(&view);
                    self.views.insert(key.to_owned(), view.clone());
                    report.replaced += 1;
                }
                Some(_) => report.reused += 1,
            }

            element.apply(&view, handlers)?;
        }

        tracing::trace!(
            created = report.created,
            replaced = report.replaced,
            reused = report.reused,
            "reconciled"
        );
        Ok(report)
    }

    /// The object currently on file for `key`.
    pub fn lookup(&self, key: &str) -> Option<&C::View> {
        self.views.get(key)
    }

    pub fn handlers(&self, key: &str) -> Option<&EventHandlerSet<Msg, ViewEvent<C>>> {
        self.handlers.get(key)
    }

    /// A read-only view of the key map for layout code.
    pub fn layout_context(&self) -> LayoutContext<'_, C::View> {
        LayoutContext { views: &self.views }
    }

    /// Run a layout pass and activate its constraints.
    ///
    /// Must follow [`update`](Self::update): layout resolves objects by key.
    pub fn apply_layout<F>(&mut self, layout: F) -> Result<(), LayoutError>
    where
        F: FnOnce(&LayoutContext<'_, C::View>) -> Result<Vec<C::Constraint>, LayoutError>,
    {
        let constraints = layout(&LayoutContext { views: &self.views })?;
        self.container.activate(constraints);
        Ok(())
    }

    pub fn container(&self) -> &C {
        &self.container
    }
}

/// Key lookup handed to layout passes.
pub struct LayoutContext<'a, V> {
    views: &'a HashMap<String, V>,
}

impl<'a, V> LayoutContext<'a, V> {
    pub fn view(&self, key: &str) -> Option<&'a V> {
        self.views.get(key)
    }

    /// Like [`view`](Self::view), for keys the layout cannot do without.
    pub fn require(&self, key: &str) -> Result<&'a V, LayoutError> {
        self.view(key)
            .ok_or_else(|| LayoutError::MissingKey(key.to_owned()))
    }
}
