//! asbridge Core - Fundamental types shared by the host and the script side

mod error;
mod types;
mod idgen;
mod positions;
mod value;

pub use error::*;
pub use types::*;
pub use idgen::*;
pub use positions::*;
pub use value::*;
