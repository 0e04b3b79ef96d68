use serde::{Deserialize, Serialize};

use crate::ast::{Parameter, TypeName};
use crate::location::Location;

/// Interface methods carry no body and may be neither generic nor static.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceMethodDeclaration {
    pub name: String,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeName>,
    pub position: Location,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterfaceDeclaration {
    pub name: String,
    pub super_interfaces: Vec<TypeName>,
    pub methods: Vec<InterfaceMethodDeclaration>,
    pub position: Location,
}
