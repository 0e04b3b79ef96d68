use serde::{Deserialize, Serialize};

use crate::ast::Statement;
use crate::location::Location;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Block<I> {
    pub statements: Vec<Statement<I>>,
    pub info: I,
    pub position: Location,
}
