use serde::{Deserialize, Serialize};

use crate::ast::{Parameter, TypeName};
use crate::location::Location;

/// A method belonging to a foreign-function-interface group. Callable like
/// a function (arguments matched strictly) but never generic and never a
/// value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FfiMethodDeclaration {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeName>,
    pub position: Location,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FfiDeclaration {
    pub name: String,
    pub methods: Vec<FfiMethodDeclaration>,
    pub position: Location,
}
