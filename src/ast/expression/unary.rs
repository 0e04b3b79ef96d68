use serde::{Deserialize, Serialize};

use crate::ast::Expression;
use crate::location::Location;
use crate::typechecker::types::OperatorOverload;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOperator {
    /// `-x`
    Minus,
    /// `!x`
    Not,
    /// `x!!` — strip the nullable wrapper, trapping at runtime on null
    Denull,
    /// `~x`
    BitNot,
    PreIncrement,
    PostIncrement,
    PreDecrement,
    PostDecrement,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnaryExpression<I> {
    pub operator: UnaryOperator,
    pub expr: Expression<I>,
    #[serde(skip)]
    pub overload: Option<OperatorOverload>,
    pub info: I,
    pub position: Location,
}
