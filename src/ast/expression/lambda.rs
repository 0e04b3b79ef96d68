use serde::{Deserialize, Serialize};

use crate::ast::{Expression, Id, Statement, TypeName};
use crate::location::Location;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LambdaParameter<I> {
    pub name: Id<I>,
    pub type_name: Option<TypeName>,
    pub mutable: bool,
    pub position: Location,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum LambdaBody<I> {
    Expression(Box<Expression<I>>),
    Block(Vec<Statement<I>>),
}

/// An anonymous function. During analysis every lambda registers itself on
/// the module root under a generated, globally unique name which is recorded
/// back onto the node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Lambda<I> {
    pub parameters: Vec<LambdaParameter<I>>,
    pub return_type: Option<TypeName>,
    pub body: LambdaBody<I>,
    /// A coroutine-callable lambda may `yield` but must not `return`.
    pub is_coroutine: bool,
    pub registered_name: Option<String>,
    pub info: I,
    pub position: Location,
}
