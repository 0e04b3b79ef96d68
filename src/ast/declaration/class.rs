use serde::{Deserialize, Serialize};

use crate::ast::{FunctionBody, GenericParameter, Parameter, Statement, TypeName};
use crate::location::Location;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDeclaration {
    pub name: String,
    pub type_name: TypeName,
    pub is_static: bool,
    pub position: Location,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MethodDeclaration<I> {
    pub name: String,
    pub generics: Vec<GenericParameter>,
    pub parameters: Vec<Parameter>,
    pub return_type: Option<TypeName>,
    pub body: FunctionBody<I>,
    pub is_static: bool,
    pub is_override: bool,
    pub position: Location,
}

/// Reference to a named implementation block pulled into a class.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImplReference {
    pub name: String,
    pub position: Location,
}

/// A class: nominal, implementing zero or more interfaces, optionally
/// pulling in method groups via `impl` references and carrying a static
/// initialisation block.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClassDeclaration<I> {
    pub name: String,
    pub super_interfaces: Vec<TypeName>,
    pub attributes: Vec<AttributeDeclaration>,
    pub methods: Vec<MethodDeclaration<I>>,
    pub impls: Vec<ImplReference>,
    pub static_block: Option<Vec<Statement<I>>>,
    pub info: I,
    pub position: Location,
}
