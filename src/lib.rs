//! A keyed view reconciler and single-writer message store for declarative UI.
//!
//! Applications describe their UI as a flat, keyed list of [`Element`]s
//! rendered from a model. A [`Store`] owns the model and folds messages into
//! it; a [`Reconciler`] maps every rendered list onto long-lived native
//! objects, reusing them by key and replacing them only when their kind
//! changes. A [`Program`] ties the two together with a layout pass.
//!
//! Side effects are [`Command`]s: deferred work returned by the update
//! function that eventually yields messages of its own.
//!
//! ## Example
//!
//! ```rust
//! use oxide_reconcile::headless::{self, HeadlessContainer, HeadlessView};
//! use oxide_reconcile::{Command, Element, Program, ProgramLogic};
//!
//! #[derive(Clone)]
//! enum Msg { Increment }
//!
//! struct Model { counter: i64 }
//!
//! struct Counter;
//!
//! impl ProgramLogic<Msg, Model, HeadlessContainer> for Counter {
//!     fn update(&self, msg: Msg, model: &mut Model) -> Command<Msg> {
//!         match msg {
//!             Msg::Increment => model.counter += 1,
//!         }
//!         Command::none()
//!     }
//!
//!     fn render(&self, model: &Model) -> Vec<Element<Msg, HeadlessView>> {
//!         vec![
//!             headless::label("counter", vec![headless::text(model.counter.to_string())]),
//!             headless::button(
//!                 "increment",
//!                 vec![headless::title("+"), headless::on_press(|| Msg::Increment)],
//!             ),
//!         ]
//!     }
//! }
//!
//! let mut program = Program::new(HeadlessContainer::new(), Model { counter: 5 }, Counter);
//!
//! // A native press queues the message; the program folds it in.
//! program.lookup("increment").unwrap().send_action("touchUpInside");
//! program.process_pending();
//!
//! let label = program.lookup("counter").unwrap();
//! assert_eq!(label.text().as_deref(), Some("6"));
//! ```

mod command;
mod decode;
mod element;
mod emitter;
mod error;
mod generator;
mod handler;
mod program;
mod prop;
mod reconciler;
mod store;
mod tracking;

#[cfg(any(test, feature = "testing"))]
pub mod headless;

pub use command::Command;
pub use decode::{decode_element, decode_elements, ElementFactory};
pub use element::{Element, NativeView};
pub use emitter::Emitter;
pub use error::{DecodeError, ElementError, GeneratorError, LayoutError, ProgramError, ReconcileError};
pub use generator::RandomGenerator;
pub use handler::{EventHandler, EventHandlerSet, HandlerOptions, Projection, ProjectionId};
pub use program::{Program, ProgramLogic};
pub use prop::{apply_props, prioritised, Prop};
pub use reconciler::{Container, LayoutContext, Reconciler, Reconciliation};
pub use store::{Spawner, Store, Subscription};
pub use tracking::{MonotonicClock, MonotonicallyTracked, Trackable};

// Test utilities (only available with 'testing' feature or during tests)
#[cfg(any(test, feature = "testing"))]
pub use store::create_test_spawner;
