//! # asbridge-bindings
//!
//! The `alt` scripting module: host objects, functions and events exposed
//! to scripts, plus the runtime that loads modules and drives timers and
//! event dispatch for one resource.

pub mod api;
pub mod context;
pub mod convert;
pub mod events;
pub mod identity;
pub mod module;
pub mod runtime;
pub mod timers;

pub use api::{alt_module, MODULE_NAME};
pub use context::BindingContext;
pub use convert::ValueConverter;
pub use events::{EventRegistry, HostEvent, HostEventKind};
pub use identity::IdentityBridge;
pub use module::{Module, Registration};
pub use runtime::ScriptRuntime;
pub use timers::{TimerId, TimerManager};
