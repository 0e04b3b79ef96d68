use serde::{Deserialize, Serialize};

use crate::ast::Expression;
use crate::location::Location;

/// `mutate e` — treat a constant binding as mutable for this use. Redundant
/// on an already-mutable target (warned).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MutateExpression<I> {
    pub expr: Expression<I>,
    pub info: I,
    pub position: Location,
}
