use serde::{Deserialize, Serialize};

use crate::ast::Expression;
use crate::location::Location;

/// `spawn e` — run `e` asynchronously, producing a promise for its value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnExpression<I> {
    pub expr: Expression<I>,
    pub info: I,
    pub position: Location,
}

/// `await e` — unwrap a promise.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AwaitExpression<I> {
    pub expr: Expression<I>,
    pub info: I,
    pub position: Location,
}
