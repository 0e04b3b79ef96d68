use serde::{Deserialize, Serialize};

use crate::ast::{Expression, Id, TypeName};
use crate::location::Location;

/// `let [mut] name[: T] = value`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Initialisation<I> {
    pub id: Id<I>,
    pub mutable: bool,
    pub type_name: Option<TypeName>,
    pub value: Expression<I>,
    pub info: I,
    pub position: Location,
}
