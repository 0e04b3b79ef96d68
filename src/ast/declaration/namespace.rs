use serde::{Deserialize, Serialize};

use crate::ast::FunctionDeclaration;
use crate::location::Location;

/// A namespace groups functions under a qualifier; members are reached via
/// member-access syntax on the namespace name.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NamespaceDeclaration<I> {
    pub name: String,
    pub functions: Vec<FunctionDeclaration<I>>,
    pub position: Location,
}
