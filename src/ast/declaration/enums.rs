use serde::{Deserialize, Serialize};

use crate::ast::TypeName;
use crate::location::Location;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumMemberDeclaration {
    pub name: String,
    /// Explicit value; members without one continue counting from the
    /// previous member.
    pub value: Option<i64>,
    pub position: Location,
}

/// C-style enum with a numeric backing kind (`enum Color as u8 { ... }`,
/// defaulting to `u32`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumDeclaration {
    pub name: String,
    pub backing: Option<TypeName>,
    pub members: Vec<EnumMemberDeclaration>,
    pub position: Location,
}

/// A closed set of string literals.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StringEnumDeclaration {
    pub name: String,
    pub values: Vec<String>,
    pub position: Location,
}
