//! The single-writer store that owns the model and processes messages.

use core::future::Future;
use core::pin::Pin;
use core::sync::atomic::{AtomicBool, Ordering};

use flume::Receiver;
use futures::future::{self, BoxFuture, Either};
use futures::stream::{FuturesUnordered, StreamExt};
use portable_atomic_util::Arc;

use crate::{Command, Emitter, MonotonicClock, MonotonicallyTracked};

/// A spawner for executing futures on an async runtime.
///
/// Used by the store to run [`Command::perform`] futures off the update
/// thread. Whatever the future produces is queued back through the store's
/// [`Emitter`].
///
/// Function pointers and closures implement this trait via the blanket
/// implementation.
pub trait Spawner {
    fn spawn(&self, future: Pin<Box<dyn Future<Output = ()> + Send>>);
}

impl<F> Spawner for F
where
    F: Fn(Pin<Box<dyn Future<Output = ()> + Send>>),
{
    fn spawn(&self, future: Pin<Box<dyn Future<Output = ()> + Send>>) {
        self(future)
    }
}

type UpdateFn<Model, Msg> = dyn Fn(Msg, &mut Model) -> Command<Msg> + Send;

struct Subscriber<Model> {
    active: Arc<AtomicBool>,
    callback: Box<dyn FnMut(&Model) + Send>,
}

/// Handle returned by [`Store::subscribe`].
///
/// Dropping the handle keeps the subscription alive; call
/// [`unsubscribe`](Self::unsubscribe) to end it.
#[derive(Clone)]
pub struct Subscription {
    active: Arc<AtomicBool>,
}

impl Subscription {
    /// Stop receiving broadcasts. Calling this more than once is harmless.
    pub fn unsubscribe(&self) {
        self.active.store(false, Ordering::Release);
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }
}

/// Single-writer state container.
///
/// Every change to the model goes through [`receive`](Self::receive):
/// 1. the update function mutates the model and returns a [`Command`],
/// 2. the model's version ticks,
/// 3. every active subscriber is called with the new model, in subscription order,
/// 4. the command runs; its messages are queued behind any already pending.
///
/// Messages sent while a message is being processed (from subscribers,
/// commands or event handlers) are queued rather than handled recursively.
/// The queue is drained in FIFO order until empty before `receive` returns.
///
/// # Example
///
/// ```rust
/// use oxide_reconcile::{Command, Store};
///
/// #[derive(Clone)]
/// enum Msg { Add(i32), Double }
///
/// let mut store = Store::new(1, |msg: Msg, total: &mut i32| match msg {
///     Msg::Add(n) => {
///         *total += n;
///         Command::just(Msg::Double)
///     }
///     Msg::Double => {
///         *total *= 2;
///         Command::none()
///     }
/// });
///
/// store.receive(Msg::Add(2));
/// assert_eq!(*store.model(), 6);
/// ```
pub struct Store<Model, Msg> {
    model: MonotonicallyTracked<Model>,
    update: Box<UpdateFn<Model, Msg>>,
    subscribers: Vec<Subscriber<Model>>,
    emitter: Emitter<Msg>,
    receiver: Receiver<Msg>,
    spawner: Option<Box<dyn Spawner + Send>>,
}

impl<Model, Msg> Store<Model, Msg> {
    /// Create a store holding `model`.
    ///
    /// Nothing is broadcast until the first message arrives.
    pub fn new<U>(model: Model, update: U) -> Self
    where
        U: Fn(Msg, &mut Model) -> Command<Msg> + Send + 'static,
    {
        let (sender, receiver) = flume::unbounded();

        Store {
            model: MonotonicallyTracked::new(model),
            update: Box::new(update),
            subscribers: Vec::new(),
            emitter: Emitter::new(sender),
            receiver,
            spawner: None,
        }
    }

    /// Spawn [`Command::perform`] futures on `spawner` instead of blocking on them.
    pub fn with_spawner<S>(mut self, spawner: S) -> Self
    where
        S: Spawner + Send + 'static,
    {
        self.spawner = Some(Box::new(spawner));
        self
    }

    /// The most recently broadcast model.
    pub fn model(&self) -> &Model {
        self.model.value()
    }

    pub fn tracked(&self) -> &MonotonicallyTracked<Model> {
        &self.model
    }

    pub fn version(&self) -> MonotonicClock {
        self.model.clock()
    }

    /// A handle for queueing messages from event handlers or other threads.
    pub fn emitter(&self) -> Emitter<Msg> {
        self.emitter.clone()
    }

    /// Register a callback invoked with the model after every update.
    pub fn subscribe<F>(&mut self, callback: F) -> Subscription
    where
        F: FnMut(&Model) + Send + 'static,
    {
        let active = Arc::new(AtomicBool::new(true));
        self.subscribers.push(Subscriber {
            active: active.clone(),
            callback: Box::new(callback),
        });
        Subscription { active }
    }

    /// Queue `msg` and process the queue until it is empty.
    pub fn receive(&mut self, msg: Msg) {
        self.emitter.emit(msg);
        self.process_pending();
    }

    /// Run `command` as if it had been returned by an update, then process
    /// whatever it queued.
    pub fn dispatch(&mut self, command: Command<Msg>) {
        command.dispatch(&self.emitter, self.spawner());
        self.process_pending();
    }

    /// Process queued messages until the queue is empty.
    ///
    /// Returns how many messages were processed. Without a spawner,
    /// [`Command::perform`] futures are blocked on, so call this from
    /// synchronous code; inside an executor use [`run`](Self::run).
    pub fn process_pending(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(msg) = self.receiver.try_recv() {
            let command = self.step(msg);
            command.dispatch(&self.emitter, self.spawner());
            processed += 1;
        }
        processed
    }

    /// Process messages as they arrive, for the lifetime of the store.
    ///
    /// Emitters may be used from other threads while this future is polled;
    /// their messages are still handled here, one at a time. Without a
    /// spawner, [`Command::perform`] futures are polled by this future
    /// alongside the queue.
    pub async fn run(&mut self) {
        let mut tasks: FuturesUnordered<BoxFuture<'static, ()>> = FuturesUnordered::new();
        loop {
            let msg = if tasks.is_empty() {
                match self.receiver.recv_async().await {
                    Ok(msg) => msg,
                    Err(_) => break,
                }
            } else {
                let received = self.receiver.recv_async();
                futures::pin_mut!(received);
                match future::select(received, tasks.next()).await {
                    Either::Left((Ok(msg), _)) => msg,
                    Either::Left((Err(_), _)) => break,
                    // A finished task queued its message; pick it up next turn.
                    Either::Right(_) => continue,
                }
            };

            let mut next = Some(msg);
            while let Some(msg) = next {
                let command = self.step(msg);
                command.schedule(&self.emitter, self.spawner(), &mut tasks);
                next = self.receiver.try_recv().ok();
            }
        }
    }

    fn spawner(&self) -> Option<&dyn Spawner> {
        self.spawner.as_deref().map(|spawner| spawner as &dyn Spawner)
    }

    fn step(&mut self, msg: Msg) -> Command<Msg> {
        let update = &self.update;
        let command = self.model.update(|model| update(msg, model));

        tracing::debug!(
            version = self.model.clock().ticks(),
            subscribers = self.subscribers.len(),
            "model updated"
        );

        self.subscribers
            .retain(|subscriber| subscriber.active.load(Ordering::Acquire));
        for subscriber in &mut self.subscribers {
            // A subscriber may have unsubscribed another one during this broadcast.
            if subscriber.active.load(Ordering::Acquire) {
                (subscriber.callback)(self.model.value());
            }
        }

        command
    }
}

/// Drives a spawned future to completion on a helper thread and waits for it,
/// so it works both from plain code and from inside [`Store::run`].
#[cfg(any(test, feature = "testing"))]
fn test_spawner_fn(fut: Pin<Box<dyn Future<Output = ()> + Send>>) {
    let worker = std::thread::spawn(move || futures::executor::block_on(fut));
    if let Err(panic) = worker.join() {
        std::panic::resume_unwind(panic);
    }
}

#[cfg(any(test, feature = "testing"))]
/// Creates a test spawner that executes futures synchronously.
///
/// Messages produced by the futures are queued on the store, so they are
/// handled after the message whose command spawned them.
pub fn create_test_spawner() -> fn(Pin<Box<dyn Future<Output = ()> + Send>>) {
    test_spawner_fn
}
