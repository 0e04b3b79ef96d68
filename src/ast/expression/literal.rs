use serde::{Deserialize, Serialize};

use crate::location::Location;

/// Literal values. Integer literals keep their value as `i128` so that
/// 64-bit boundary checks can be carried out with wide arithmetic.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Literal<I> {
    Integer(i128, I, Location),
    /// `1.5f` single precision literal
    Float(f64, I, Location),
    /// `1.5` double precision literal
    Double(f64, I, Location),
    Bool(bool, I, Location),
    Char(char, I, Location),
    Str(String, I, Location),
    Null(I, Location),
}

impl<I> Literal<I> {
    pub fn get_info(&self) -> I
    where
        I: Clone,
    {
        match self {
            Literal::Integer(_, info, _)
            | Literal::Float(_, info, _)
            | Literal::Double(_, info, _)
            | Literal::Bool(_, info, _)
            | Literal::Char(_, info, _)
            | Literal::Str(_, info, _)
            | Literal::Null(info, _) => info.clone(),
        }
    }

    pub fn position(&self) -> Location {
        match self {
            Literal::Integer(_, _, position)
            | Literal::Float(_, _, position)
            | Literal::Double(_, _, position)
            | Literal::Bool(_, _, position)
            | Literal::Char(_, _, position)
            | Literal::Str(_, _, position)
            | Literal::Null(_, position) => position.clone(),
        }
    }
}
