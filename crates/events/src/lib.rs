//! `meshguard-events`: event sink abstraction and an in-memory bus.

pub mod bus;
pub mod envelope;
pub mod in_memory_bus;

pub use bus::{EventSink, PublishError, Subscription};
pub use envelope::EventEnvelope;
pub use in_memory_bus::InMemoryEventBus;
