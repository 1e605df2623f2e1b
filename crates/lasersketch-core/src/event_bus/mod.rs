//! # Event Bus Module
//!
//! Decoupled publish/subscribe between the session, the transport and any
//! front-end views (position label, layers list, console).
//!
//! ```rust,ignore
//! use lasersketch_core::event_bus::{AppEvent, EventBus, EventCategory, EventFilter};
//!
//! let bus = EventBus::new();
//! let subscription = bus.subscribe(
//!     EventFilter::Categories(vec![EventCategory::Machine]),
//!     |event| println!("{}", event.description()),
//! );
//! bus.unsubscribe(subscription);
//! ```

mod bus;
mod events;

pub use bus::*;
pub use events::*;
