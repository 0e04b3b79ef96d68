use serde::{Deserialize, Serialize};

use crate::ast::Statement;
use crate::location::Location;

/// A statement block used in expression position. Its last statement must be
/// a `return`, whose value becomes the value of the whole expression.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DoExpression<I> {
    pub statements: Vec<Statement<I>>,
    pub info: I,
    pub position: Location,
}
