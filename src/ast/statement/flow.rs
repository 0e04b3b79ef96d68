use serde::{Deserialize, Serialize};

use crate::ast::Expression;
use crate::location::Location;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakStatement {
    pub position: Location,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContinueStatement {
    pub position: Location,
}

/// `yield value` — only valid inside a coroutine-callable lambda.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct YieldStatement<I> {
    pub value: Expression<I>,
    pub info: I,
    pub position: Location,
}
