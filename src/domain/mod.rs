//! Storefront domain: value objects, aggregates and events
pub mod aggregates;
pub mod events;
pub mod value_objects;

pub use aggregates::*;
pub use events::{DomainEvent, Restock};
pub use value_objects::{Coordinates, Money, PhoneNumber, Quantity};
