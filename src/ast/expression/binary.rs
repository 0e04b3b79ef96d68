use serde::{Deserialize, Serialize};

use crate::ast::Expression;
use crate::location::Location;
use crate::typechecker::types::OperatorOverload;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOperator {
    Add,
    Substract,
    Multiply,
    Divide,
    Modulo,
    Equals,
    NotEquals,
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
    And,
    Or,
    BitAnd,
    BitOr,
    BitXor,
    ShiftLeft,
    ShiftRight,
    NullCoalesce,
    Assign,
}

impl BinaryOperator {
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Equals
                | BinaryOperator::NotEquals
                | BinaryOperator::LessThan
                | BinaryOperator::LessOrEqual
                | BinaryOperator::GreaterThan
                | BinaryOperator::GreaterOrEqual
        )
    }

    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Add
                | BinaryOperator::Substract
                | BinaryOperator::Multiply
                | BinaryOperator::Divide
                | BinaryOperator::Modulo
        )
    }

    pub fn is_bitwise(&self) -> bool {
        matches!(
            self,
            BinaryOperator::BitAnd
                | BinaryOperator::BitOr
                | BinaryOperator::BitXor
                | BinaryOperator::ShiftLeft
                | BinaryOperator::ShiftRight
        )
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, BinaryOperator::And | BinaryOperator::Or)
    }
}

/// `overload` is filled by the analyzer when the operator dispatches to a
/// user-defined method on a class or interface; code generation reads it
/// back instead of re-resolving.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpression<I> {
    pub left: Expression<I>,
    pub right: Expression<I>,
    pub operator: BinaryOperator,
    #[serde(skip)]
    pub overload: Option<OperatorOverload>,
    pub info: I,
    pub position: Location,
}
