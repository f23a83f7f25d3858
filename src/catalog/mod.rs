//! Component catalog wiring.
//!
//! This module wraps the `components.json` bundle so the controller can load a
//! validated snapshot and resolve names and aliases consistently. Types here
//! mirror the bundle fields; callers use `ComponentIndex` for lookups.

pub mod identity;
pub mod index;
pub mod model;

pub use identity::{Affordance, Alias, ComponentName};
pub use index::ComponentIndex;
pub use model::{ComponentBundle, ComponentEntry, OrderedMap};
