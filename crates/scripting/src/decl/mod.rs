//! Declaration strings
//!
//! Symbols are registered with AngelScript-style declaration strings such as
//! `uint Hash(const string &in value)`. This module turns them into a
//! syntax tree; type names are resolved later against the engine.

pub mod lexer;
pub mod parser;

pub use lexer::{Lexer, Token};
pub use parser::{
    parse_function, parse_params, parse_property, FunctionDecl, ParamDecl, PropertyDecl, RefKind,
    TypeExpr,
};
