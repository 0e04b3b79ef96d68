use serde::{Deserialize, Serialize};

use crate::ast::{Block, Expression, Initialisation, Statement};
use crate::location::Location;

/// C-style loop: `for (init; condition; step) { ... }`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForLoop<I> {
    pub init: Option<Initialisation<I>>,
    pub condition: Option<Expression<I>>,
    pub step: Option<Box<Statement<I>>>,
    pub block: Block<I>,
    pub info: I,
    pub position: Location,
}
