use serde::{Deserialize, Serialize};

use crate::ast::{Block, Expression};
use crate::location::Location;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WhileLoop<I> {
    pub condition: Expression<I>,
    pub block: Block<I>,
    pub info: I,
    pub position: Location,
}
