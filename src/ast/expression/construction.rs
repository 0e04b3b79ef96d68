use serde::{Deserialize, Serialize};

use crate::ast::Expression;
use crate::location::Location;

/// Tuple construction. Only legal in return positions and as a
/// destructuring assignment target; the analyzer enforces the placement.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TupleConstruction<I> {
    pub elements: Vec<Expression<I>>,
    pub info: I,
    pub position: Location,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum ArrayElement<I> {
    Single(Expression<I>),
    /// `...values` — the operand must itself be an array.
    Spread(Expression<I>),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArrayConstruction<I> {
    pub elements: Vec<ArrayElement<I>>,
    pub info: I,
    pub position: Location,
}
