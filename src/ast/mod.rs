//! The abstract syntax tree handed over by the parser.
//!
//! Every node is generic over an `info` slot: the parser produces nodes with
//! `()`, the analyzer rebuilds them with
//! [`TypeInformation`](crate::typechecker::TypeInformation). Nodes also carry
//! their source [`Location`](crate::location::Location) for diagnostics.

mod declaration;
mod expression;
mod pattern;
mod statement;
mod type_name;

pub use self::declaration::*;
pub use self::expression::*;
pub use self::pattern::*;
pub use self::statement::*;
pub use self::type_name::*;
