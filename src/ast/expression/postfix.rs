use serde::{Deserialize, Serialize};

use crate::ast::{Expression, Id, TypeName};
use crate::location::Location;
use crate::typechecker::types::{OperatorOverload, ResolvedCallee};

/// Call, index and member access forms. The analyzer records its resolution
/// on the node (`resolved` / `overload`) so downstream stages never have to
/// repeat the lookup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Postfix<I> {
    Call {
        expr: Box<Expression<I>>,
        type_args: Vec<TypeName>,
        args: Vec<Expression<I>>,
        #[serde(skip)]
        resolved: Option<ResolvedCallee>,
        /// Filled when the call dispatched to a `__call__` overload.
        #[serde(skip)]
        overload: Option<OperatorOverload>,
        info: I,
        position: Location,
    },
    Index {
        expr: Box<Expression<I>>,
        index: Box<Expression<I>>,
        /// `expr[^index]` — counted from the end; dispatches to the reverse
        /// overload slots on classes.
        reverse: bool,
        #[serde(skip)]
        overload: Option<OperatorOverload>,
        info: I,
        position: Location,
    },
    MemberAccess {
        expr: Box<Expression<I>>,
        member: Id<I>,
        /// `expr?.member`
        nullable: bool,
        info: I,
        position: Location,
    },
}
