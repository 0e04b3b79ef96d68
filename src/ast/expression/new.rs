use serde::{Deserialize, Serialize};

use crate::ast::{Expression, TypeName};
use crate::location::Location;
use crate::typechecker::types::ResolvedCallee;

/// `new C(args)` — only valid for classes; resolution picks the matching
/// `init` method (zero or one may exist).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct New<I> {
    pub class: TypeName,
    pub args: Vec<Expression<I>>,
    #[serde(skip)]
    pub resolved: Option<ResolvedCallee>,
    pub info: I,
    pub position: Location,
}
