//! # The `alt` API
//!
//! - `objects` - Object types and their capability sets
//! - `alt` - Global functions, properties, timers and custom events
//! - `events` - Host lifecycle events

pub mod alt;
pub mod events;
pub mod objects;

use crate::context::BindingContext;
use crate::module::Module;

pub const MODULE_NAME: &str = "alt";

/// The complete `alt` module; object types come first as the global
/// declarations refer to them
pub fn alt_module() -> Module<BindingContext> {
    Module::new(MODULE_NAME)
        .with(objects::register)
        .with(alt::register)
        .with(events::register)
}
