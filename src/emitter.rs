//! Message emitter feeding the store's queue.

use flume::Sender;

/// Handle for sending messages into a [`Store`](crate::Store).
///
/// Event handlers, commands and background tasks all hold a clone of the
/// store's emitter. Emitting only enqueues the message; the store processes
/// the queue on its own thread, in order, one message at a time.
///
/// `Emitter` wraps a channel sender, so it is cheap to clone and can
/// be moved to other threads when `Msg: Send`.
///
/// # Example
///
/// ```rust
/// use oxide_reconcile::{Command, Store};
///
/// enum Msg { Ping }
///
/// let mut store = Store::new(0u32, |msg: Msg, pings: &mut u32| {
///     match msg {
///         Msg::Ping => *pings += 1,
///     }
///     Command::none()
/// });
///
/// let emitter = store.emitter();
/// emitter.emit(Msg::Ping);
/// emitter.emit(Msg::Ping);
///
/// assert_eq!(*store.model(), 0);
/// store.process_pending();
/// assert_eq!(*store.model(), 2);
/// ```
pub struct Emitter<Msg>(pub(crate) Sender<Msg>);

impl<Msg> Clone for Emitter<Msg> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<Msg> Emitter<Msg> {
    pub(crate) fn new(sender: Sender<Msg>) -> Self {
        Self(sender)
    }

    /// Queue a message for the store.
    ///
    /// Messages emitted after the store has been dropped are discarded.
    pub fn emit(&self, msg: Msg) {
        if self.0.send(msg).is_err() {
            tracing::trace!("message dropped (store gone)");
        }
    }

    /// Number of messages waiting to be processed.
    pub fn pending(&self) -> usize {
        self.0.len()
    }
}
