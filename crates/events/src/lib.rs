//! Domain event machinery: the `Event` contract, handler trait, and the
//! synchronous in-process event bus.
//!
//! Concrete event types live in the domain crates; this crate only carries the
//! mechanics of subscribing and dispatching.

pub mod bus;
pub mod event;
pub mod handler;

pub use bus::EventBus;
pub use event::Event;
pub use handler::{EventHandler, FnHandler};
