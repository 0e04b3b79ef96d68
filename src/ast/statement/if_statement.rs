use serde::{Deserialize, Serialize};

use crate::ast::{Block, Expression};
use crate::location::Location;

/// Statement form of `if` with an optional `else`. Branches yield no value;
/// for the expression form see `IfElseExpression`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IfStatement<I> {
    pub condition: Expression<I>,
    pub then_block: Block<I>,
    pub else_block: Option<Block<I>>,
    pub info: I,
    pub position: Location,
}
