use serde::{Deserialize, Serialize};

use crate::ast::Expression;
use crate::location::Location;

/// `return [value]`. The analyzer collects every return of a function body
/// into the function's accumulator for return-type reconciliation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReturnStatement<I> {
    pub value: Option<Expression<I>>,
    pub info: I,
    pub position: Location,
}
