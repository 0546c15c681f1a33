//! Wiring of a store, a reconciler and a layout pass into one application.

use portable_atomic_util::Arc;
use spin::Mutex;

use crate::error::{LayoutError, ProgramError};
use crate::reconciler::{Container, LayoutContext, Reconciler};
use crate::store::Spawner;
use crate::{Command, Element, Emitter, MonotonicClock, Store, Subscription};

type View<C> = <C as Container>::View;

/// Application logic driven by a [`Program`].
///
/// Implementations provide the update function and a pure render of the
/// model into elements. Layout runs after every reconciliation and can
/// resolve any rendered key to its native object.
pub trait ProgramLogic<Msg, Model, C: Container> {
    /// Adjust the initial model and produce the command to run at startup.
    ///
    /// The command runs after the first render.
    fn init(&self, model: &mut Model) -> Command<Msg> {
        let _ = model;
        Command::none()
    }

    /// Apply `msg` to the model.
    fn update(&self, msg: Msg, model: &mut Model) -> Command<Msg>;

    /// Describe the UI for `model`, in attach order.
    fn render(&self, model: &Model) -> Vec<Element<Msg, View<C>>>;

    /// Constraints positioning the rendered objects.
    ///
    /// They are activated together after every render pass.
    fn layout(
        &self,
        model: &Model,
        context: &LayoutContext<'_, View<C>>,
    ) -> Result<Vec<C::Constraint>, LayoutError> {
        let _ = (model, context);
        Ok(Vec::new())
    }
}

struct Renderer<Msg, Model, C: Container, L> {
    logic: Arc<L>,
    reconciler: Arc<Mutex<Reconciler<Msg, C>>>,
    errors: Arc<Mutex<Vec<ProgramError>>>,
    _model: core::marker::PhantomData<fn(&Model)>,
}

impl<Msg, Model, C, L> Renderer<Msg, Model, C, L>
where
    Msg: Send + 'static,
    C: Container,
    L: ProgramLogic<Msg, Model, C>,
{
    fn render(&self, model: &Model) {
        if let Err(error) = self.try_render(model) {
            tracing::error!(%error, "render pass failed");
            self.errors.lock().push(error);
        }
    }

    fn try_render(&self, model: &Model) -> Result<(), ProgramError> {
        let elements = self.logic.render(model);
        let mut reconciler = self.reconciler.lock();
        reconciler.update(&elements)?;
        reconciler.apply_layout(|context| self.logic.layout(model, context))?;
        Ok(())
    }
}

/// A running application: model, native objects and the loop between them.
///
/// Every model broadcast by the store is rendered, reconciled into the
/// container and laid out before the message's command runs. Render and
/// layout failures do not stop the program; they are logged and kept for
/// [`take_errors`](Self::take_errors).
///
/// # Example
///
/// ```rust
/// use oxide_reconcile::headless::{self, HeadlessContainer, HeadlessView};
/// use oxide_reconcile::{Command, Element, Program, ProgramLogic};
///
/// struct Counter;
///
/// impl ProgramLogic<(), u32, HeadlessContainer> for Counter {
///     fn update(&self, _: (), count: &mut u32) -> Command<()> {
///         *count += 1;
///         Command::none()
///     }
///
///     fn render(&self, count: &u32) -> Vec<Element<(), HeadlessView>> {
///         vec![headless::label("count", vec![headless::text(count.to_string())])]
///     }
/// }
///
/// let mut program = Program::new(HeadlessContainer::new(), 0, Counter);
/// program.send(());
///
/// let label = program.lookup("count").unwrap();
/// assert_eq!(label.text().as_deref(), Some("1"));
/// ```
pub struct Program<Msg, Model, C: Container> {
    store: Store<Model, Msg>,
    reconciler: Arc<Mutex<Reconciler<Msg, C>>>,
    errors: Arc<Mutex<Vec<ProgramError>>>,
    subscription: Subscription,
}

impl<Msg, Model, C> Program<Msg, Model, C>
where
    Msg: Send + 'static,
    Model: 'static,
    C: Container + Send + 'static,
    View<C>: Send,
{
    /// Start a program rendering into `container`.
    ///
    /// Renders the initial model, then runs the command returned by
    /// [`ProgramLogic::init`]. Asynchronous commands are driven to
    /// completion in place.
    pub fn new<L>(container: C, model: Model, logic: L) -> Self
    where
        L: ProgramLogic<Msg, Model, C> + Send + Sync + 'static,
    {
        Self::start(container, model, logic, |store| store)
    }

    /// Like [`new`](Self::new), spawning asynchronous commands on `spawner`.
    pub fn with_spawner<L, S>(container: C, model: Model, logic: L, spawner: S) -> Self
    where
        L: ProgramLogic<Msg, Model, C> + Send + Sync + 'static,
        S: Spawner + Send + 'static,
    {
        Self::start(container, model, logic, |store| store.with_spawner(spawner))
    }

    fn start<L, F>(container: C, mut model: Model, logic: L, configure: F) -> Self
    where
        L: ProgramLogic<Msg, Model, C> + Send + Sync + 'static,
        F: FnOnce(Store<Model, Msg>) -> Store<Model, Msg>,
    {
        let logic = Arc::new(logic);
        let initial_command = logic.init(&mut model);

        let update_logic = logic.clone();
        let mut store = configure(Store::new(model, move |msg: Msg, model: &mut Model| {
            update_logic.update(msg, model)
        }));

        let renderer = Renderer {
            logic,
            reconciler: Arc::new(Mutex::new(Reconciler::new(container, store.emitter()))),
            errors: Arc::new(Mutex::new(Vec::new())),
            _model: core::marker::PhantomData,
        };
        let reconciler = renderer.reconciler.clone();
        let errors = renderer.errors.clone();

        renderer.render(store.model());
        let subscription = store.subscribe(move |model: &Model| renderer.render(model));
        store.dispatch(initial_command);

        Program {
            store,
            reconciler,
            errors,
            subscription,
        }
    }

    /// Feed `msg` to the store and process everything it leads to.
    pub fn send(&mut self, msg: Msg) {
        self.store.receive(msg);
    }

    /// Process messages queued through [`emitter`](Self::emitter), e.g. by
    /// native event handlers.
    pub fn process_pending(&mut self) -> usize {
        self.store.process_pending()
    }

    /// Process messages as they arrive. Never returns while emitters exist.
    pub async fn run(&mut self) {
        self.store.run().await
    }

    pub fn model(&self) -> &Model {
        self.store.model()
    }

    pub fn version(&self) -> MonotonicClock {
        self.store.version()
    }

    pub fn emitter(&self) -> Emitter<Msg> {
        self.store.emitter()
    }

    /// The native object currently rendered for `key`.
    pub fn lookup(&self, key: &str) -> Option<View<C>> {
        self.reconciler.lock().lookup(key).cloned()
    }

    /// Run `f` against the container.
    ///
    /// The reconciler stays locked while `f` runs, so `f` must not call back
    /// into this program.
    pub fn with_container<R>(&self, f: impl FnOnce(&C) -> R) -> R {
        f(self.reconciler.lock().container())
    }

    /// Render failures since the last call, oldest first.
    pub fn take_errors(&self) -> Vec<ProgramError> {
        core::mem::take(&mut *self.errors.lock())
    }

    /// Stop rendering. The store keeps processing messages.
    pub fn detach(&self) {
        self.subscription.unsubscribe();
    }
}
