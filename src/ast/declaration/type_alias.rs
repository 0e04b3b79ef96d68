use serde::{Deserialize, Serialize};

use crate::ast::TypeName;
use crate::location::Location;

/// `type Name = T` — resolved into a named reference type.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeAliasDeclaration {
    pub name: String,
    pub target: TypeName,
    pub position: Location,
}
