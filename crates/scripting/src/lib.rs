//! # asbridge Scripting Model
//!
//! Typed model of the embedded script engine the host API is bound to.
//!
//! ## Features
//! - Script types and values (`array<T>`, `dictionary`, `any`, handles)
//! - Declaration parser for AngelScript style signatures
//! - Engine symbol table with overload resolution
//! - Registration layer that documents every symbol it installs
//! - Declaration file generator

pub mod decl;
pub mod docs;
pub mod engine;
pub mod error;
pub mod registry;
pub mod types;
pub mod value;

pub use docs::DocsGenerator;
pub use engine::{CallArgs, Engine, ObjectKind, Param, Signature};
pub use error::{RegistrationError, Result, ScriptError, ScriptResult};
pub use registry::{Registrar, RegistrationRecord};
pub use types::ScriptType;
pub use value::{
    ObjectHandle, ScriptArray, ScriptDictionary, ScriptFunction, ScriptObject, ScriptValue,
    VariadicArgs, WeakHandle, MAX_VARIADIC_ARGS,
};
