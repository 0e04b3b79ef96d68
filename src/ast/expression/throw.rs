use serde::{Deserialize, Serialize};

use crate::ast::Expression;
use crate::location::Location;

/// `throw message` / `throw message, code`. The whole expression diverges.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThrowExpression<I> {
    pub message: Expression<I>,
    pub code: Option<Expression<I>>,
    pub info: I,
    pub position: Location,
}

/// The `unreachable` expression marker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnreachableExpression<I> {
    pub info: I,
    pub position: Location,
}
