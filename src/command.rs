//! Deferred units of work that feed messages back into the store.

use core::fmt;
use core::future::Future;

use futures::future::BoxFuture;
use futures::stream::FuturesUnordered;

use crate::store::Spawner;
use crate::Emitter;

/// Declarative description of work that yields messages.
///
/// Commands are returned from the update function alongside the model change.
/// They are inert until run: building one never executes anything.
///
/// Running a command calls `send` once per produced message:
/// - an empty command sends nothing,
/// - a routine invokes its closure exactly once and sends the result,
/// - a batch runs its children in order.
///
/// # Example
///
/// ```rust
/// use oxide_reconcile::Command;
///
/// #[derive(Clone, Debug, PartialEq)]
/// enum Msg { A, B }
///
/// let command = Command::batch(vec![
///     Command::routine(|| Msg::A),
///     Command::just(Msg::B),
/// ]);
///
/// let mut sent = Vec::new();
/// command.run(&mut |msg| sent.push(msg));
/// assert_eq!(sent, vec![Msg::A, Msg::B]);
/// ```
pub struct Command<Msg>(Inner<Msg>);

type Detach<Msg> = fn(BoxFuture<'static, Msg>, Emitter<Msg>) -> BoxFuture<'static, ()>;

enum Inner<Msg> {
    Empty,
    Routine(Box<dyn FnOnce() -> Msg + Send>),
    Batch(Vec<Command<Msg>>),
    Task {
        future: BoxFuture<'static, Msg>,
        detach: Detach<Msg>,
    },
}

fn detach<Msg: Send + 'static>(
    future: BoxFuture<'static, Msg>,
    emitter: Emitter<Msg>,
) -> BoxFuture<'static, ()> {
    Box::pin(async move {
        let msg = future.await;
        emitter.emit(msg);
    })
}

impl<Msg> Command<Msg> {
    /// A command that does nothing.
    pub fn none() -> Self {
        Self(Inner::Empty)
    }

    /// A command that calls `routine` once when run and sends its message.
    ///
    /// The routine may block; it must eventually produce exactly one message.
    pub fn routine<F>(routine: F) -> Self
    where
        F: FnOnce() -> Msg + Send + 'static,
    {
        Self(Inner::Routine(Box::new(routine)))
    }

    /// A command that sends `msg` when run.
    pub fn just(msg: Msg) -> Self
    where
        Msg: Send + 'static,
    {
        Self::routine(move || msg)
    }

    /// Combine commands; children run in the given order.
    ///
    /// An empty batch is the same as [`Command::none`].
    pub fn batch(commands: Vec<Command<Msg>>) -> Self {
        if commands.is_empty() {
            Self::none()
        } else {
            Self(Inner::Batch(commands))
        }
    }

    /// A command backed by a future.
    ///
    /// Run directly, the future is driven to completion on the calling thread.
    /// Dispatched by a store that has a [`Spawner`], it is spawned instead and
    /// its message is queued on the store once the future resolves.
    pub fn perform<F>(future: F) -> Self
    where
        F: Future<Output = Msg> + Send + 'static,
        Msg: Send + 'static,
    {
        Self(Inner::Task {
            future: Box::pin(future),
            detach: detach::<Msg>,
        })
    }

    /// `true` if running this command can never produce a message.
    pub fn is_empty(&self) -> bool {
        match &self.0 {
            Inner::Empty => true,
            Inner::Batch(commands) => commands.iter().all(Command::is_empty),
            Inner::Routine(_) | Inner::Task { .. } => false,
        }
    }

    /// Run the command, passing every produced message to `send`.
    ///
    /// Everything happens before `run` returns, futures included.
    pub fn run(self, send: &mut dyn FnMut(Msg)) {
        match self.0 {
            Inner::Empty => {}
            Inner::Routine(routine) => send(routine()),
            Inner::Batch(commands) => {
                for command in commands {
                    command.run(send);
                }
            }
            Inner::Task { future, .. } => send(futures::executor::block_on(future)),
        }
    }

    /// Run the command on behalf of a store.
    ///
    /// Messages go to `emitter`. Futures are handed to `spawner` when there is
    /// one, otherwise they are driven in place like [`Command::run`].
    pub(crate) fn dispatch(self, emitter: &Emitter<Msg>, spawner: Option<&dyn Spawner>) {
        match self.0 {
            Inner::Empty => {}
            Inner::Routine(routine) => emitter.emit(routine()),
            Inner::Batch(commands) => {
                for command in commands {
                    command.dispatch(emitter, spawner);
                }
            }
            Inner::Task { future, detach } => match spawner {
                Some(spawner) => spawner.spawn(detach(future, emitter.clone())),
                None => emitter.emit(futures::executor::block_on(future)),
            },
        }
    }

    /// Like [`dispatch`](Self::dispatch), for callers that are already being
    /// polled. Without a spawner, futures are pushed onto `tasks` for the
    /// caller to drive instead of being blocked on.
    pub(crate) fn schedule(
        self,
        emitter: &Emitter<Msg>,
        spawner: Option<&dyn Spawner>,
        tasks: &mut FuturesUnordered<BoxFuture<'static, ()>>,
    ) {
        match self.0 {
            Inner::Empty => {}
            Inner::Routine(routine) => emitter.emit(routine()),
            Inner::Batch(commands) => {
                for command in commands {
                    command.schedule(emitter, spawner, tasks);
                }
            }
            Inner::Task { future, detach } => match spawner {
                Some(spawner) => spawner.spawn(detach(future, emitter.clone())),
                None => tasks.push(detach(future, emitter.clone())),
            },
        }
    }
}

impl<Msg> Default for Command<Msg> {
    fn default() -> Self {
        Self::none()
    }
}

impl<Msg> From<Vec<Command<Msg>>> for Command<Msg> {
    fn from(commands: Vec<Command<Msg>>) -> Self {
        Self::batch(commands)
    }
}

impl<Msg> FromIterator<Command<Msg>> for Command<Msg> {
    fn from_iter<I: IntoIterator<Item = Command<Msg>>>(iter: I) -> Self {
        Self::batch(iter.into_iter().collect())
    }
}

impl<Msg> fmt::Debug for Command<Msg> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Inner::Empty => write!(f, "Empty"),
            Inner::Routine(_) => write!(f, "Routine(...)"),
            Inner::Batch(commands) => f.debug_tuple("Batch").field(commands).finish(),
            Inner::Task { .. } => write!(f, "Task(...)"),
        }
    }
}
