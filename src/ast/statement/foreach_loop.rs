use serde::{Deserialize, Serialize};

use crate::ast::{Block, Expression, Id};
use crate::location::Location;

/// `foreach x in e { ... }` — `e` must be an array or expose the iterator
/// protocol (`getIterable`). The analyzer records the generated iterator
/// variable name for code generation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ForeachLoop<I> {
    pub binding: Id<I>,
    pub iterable: Expression<I>,
    pub block: Block<I>,
    pub iterator_name: Option<String>,
    pub info: I,
    pub position: Location,
}
