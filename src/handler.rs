//! Event handlers that turn native callbacks into messages.

use std::borrow::Cow;
use std::collections::HashMap;

use portable_atomic_util::Arc;

use crate::Emitter;

/// Identity of a [`Projection`], used to decide whether a handler can be reused.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ProjectionId {
    /// Chosen by the application. Two projections with the same key must
    /// produce the same message for the same event.
    Keyed(Cow<'static, str>),
    /// Identified by the projection's allocation; clones share it.
    Anonymous(usize),
}

struct ProjectionFn<Msg, Ev>(Box<dyn Fn(&Ev) -> Msg + Send + Sync>);

/// A mapping from a native event to a message, with an explicit identity.
///
/// Closures have no usable identity, so projections carry one: either the
/// allocation made by [`Projection::new`] or a key given to
/// [`Projection::keyed`]. Handlers are reused across renders exactly when
/// the identity matches.
pub struct Projection<Msg, Ev> {
    id: ProjectionId,
    func: Arc<ProjectionFn<Msg, Ev>>,
}

impl<Msg, Ev> Clone for Projection<Msg, Ev> {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            func: self.func.clone(),
        }
    }
}

impl<Msg, Ev> Projection<Msg, Ev> {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Ev) -> Msg + Send + Sync + 'static,
    {
        let func = Arc::new(ProjectionFn(Box::new(f)));
        let id = ProjectionId::Anonymous(Arc::as_ptr(&func) as usize);
        Self { id, func }
    }

    /// A projection identified by `key`.
    ///
    /// The key has to cover everything the closure captures; a stale handler
    /// is kept for as long as the key stays the same.
    pub fn keyed<F>(key: impl Into<Cow<'static, str>>, f: F) -> Self
    where
        F: Fn(&Ev) -> Msg + Send + Sync + 'static,
    {
        Self {
            id: ProjectionId::Keyed(key.into()),
            func: Arc::new(ProjectionFn(Box::new(f))),
        }
    }

    pub fn id(&self) -> &ProjectionId {
        &self.id
    }

    pub fn project(&self, event: &Ev) -> Msg {
        (self.func.0)(event)
    }
}

/// Per-registration behaviour of a handler.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct HandlerOptions {
    /// The native view gives up input focus after the handler fires.
    pub release_focus: bool,
}

impl HandlerOptions {
    pub fn releasing_focus() -> Self {
        Self {
            release_focus: true,
        }
    }
}

/// Target bound to a native view's action.
///
/// The message type is erased so a view can store handlers of any program.
pub struct EventHandler<Ev> {
    id: ProjectionId,
    options: HandlerOptions,
    perform: Box<dyn Fn(&Ev) + Send + Sync>,
}

impl<Ev> EventHandler<Ev> {
    fn new<Msg>(emitter: Emitter<Msg>, projection: Projection<Msg, Ev>, options: HandlerOptions) -> Self
    where
        Msg: Send + 'static,
        Ev: 'static,
    {
        let id = projection.id.clone();
        Self {
            id,
            options,
            perform: Box::new(move |event: &Ev| emitter.emit(projection.project(event))),
        }
    }

    /// Project `event` to a message and queue it.
    pub fn perform(&self, event: &Ev) {
        (self.perform)(event)
    }

    pub fn options(&self) -> HandlerOptions {
        self.options
    }

    pub fn projection_id(&self) -> &ProjectionId {
        &self.id
    }
}

/// Handlers registered for one element key, by action key.
///
/// Registering the same action again with the same projection identity and
/// options returns the existing handler, so native bindings made with it
/// stay valid. Anything else replaces the handler in place.
pub struct EventHandlerSet<Msg, Ev> {
    emitter: Emitter<Msg>,
    handlers: HashMap<String, Arc<EventHandler<Ev>>>,
}

impl<Msg, Ev> EventHandlerSet<Msg, Ev>
where
    Msg: Send + 'static,
    Ev: 'static,
{
    pub fn new(emitter: Emitter<Msg>) -> Self {
        Self {
            emitter,
            handlers: HashMap::new(),
        }
    }

    pub fn register(
        &mut self,
        action: &str,
        projection: &Projection<Msg, Ev>,
        options: HandlerOptions,
    ) -> Arc<EventHandler<Ev>> {
        if let Some(existing) = self.handlers.get(action) {
            if existing.id == projection.id && existing.options == options {
                return existing.clone();
            }
            tracing::trace!(action, "replacing event handler");
        }

        let handler = Arc::new(EventHandler::new(
            self.emitter.clone(),
            projection.clone(),
            options,
        ));
        self.handlers.insert(action.to_owned(), handler.clone());
        handler
    }

    pub fn get(&self, action: &str) -> Option<&Arc<EventHandler<Ev>>> {
        self.handlers.get(action)
    }

    /// Drop every handler, e.g. when the element's view was replaced.
    pub fn reset(&mut self) {
        self.handlers.clear();
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
