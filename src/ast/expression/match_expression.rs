use serde::{Deserialize, Serialize};

use crate::ast::{Expression, Pattern};
use crate::location::Location;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchExpression<I> {
    pub expr: Expression<I>,
    pub cases: Vec<MatchCase<I>>,
    pub info: I,
    pub position: Location,
}

/// A single case. The pattern is matched against the discriminant's type,
/// binding pattern-local names into a fresh scope in which the optional
/// guard and the body are inferred.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MatchCase<I> {
    pub pattern: Pattern,
    pub guard: Option<Expression<I>>,
    pub body: Expression<I>,
    pub info: I,
    pub position: Location,
}
