use serde::{Deserialize, Serialize};

use crate::ast::Expression;
use crate::location::Location;

/// Conditional expression, possibly chained:
/// `if c1 => e1 if c2 => e2 else e3`.
///
/// `branches` always holds one more entry than `conditions` (the trailing
/// `else` value).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IfElseExpression<I> {
    pub conditions: Vec<Expression<I>>,
    pub branches: Vec<Expression<I>>,
    /// Compilation-unique label assigned by the analyzer for branch
    /// lowering.
    pub branch_label: Option<usize>,
    pub info: I,
    pub position: Location,
}
