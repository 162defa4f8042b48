//! # asbridge Host Interface
//!
//! The game server side of the bridge.
//!
//! ## Modules
//!
//! - `runtime` - The `HostRuntime` trait the bindings call into
//! - `memory` - In-process host used by the binary and in tests
//! - `hash` - joaat string hash
//! - `error` - Host error types

pub mod error;
pub mod hash;
pub mod memory;
pub mod runtime;

pub use error::{HostError, Result};
pub use hash::joaat;
pub use memory::MemoryHost;
pub use runtime::{HostRuntime, ResourceInfo, ServerInfo};
