use serde::{Deserialize, Serialize};

use crate::ast::{Expression, TypeName};
use crate::location::Location;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CastMode {
    /// `e as T` — must be a valid cast
    Regular,
    /// `e as? T` — always yields `T?`
    Safe,
    /// `e as! T` — anything goes, warned when unsafe
    Force,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CastExpression<I> {
    pub expr: Expression<I>,
    pub target: TypeName,
    pub mode: CastMode,
    pub info: I,
    pub position: Location,
}
