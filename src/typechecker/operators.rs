//! Reserved operator-overload slots: the well-known method names the
//! analyzer consults on classes and interfaces when an operator's left side
//! is not numeric.

use crate::ast::{BinaryOperator, UnaryOperator};
use crate::location::Location;

use super::classes::{find_class_methods, find_interface_methods};
use super::context::Context;
use super::error::{AmbiguousCall, StructuralViolation, TypeCheckError};
use super::types::{OperatorOverload, OverloadTarget, Type};
use super::TypeResult;

pub const INDEX: &str = "__index__";
pub const INDEX_SET: &str = "__index_set__";
pub const REVERSE_INDEX: &str = "__reverse_index__";
pub const REVERSE_INDEX_SET: &str = "__reverse_index_set__";
pub const CALL: &str = "__call__";

pub const INIT_METHOD: &str = "init";
pub const ITERATOR_METHOD: &str = "getIterable";

/// Every reserved slot, for class-resolution validation.
pub const OPERATOR_METHOD_NAMES: [&str; 26] = [
    INDEX,
    INDEX_SET,
    REVERSE_INDEX,
    REVERSE_INDEX_SET,
    CALL,
    "__add__",
    "__sub__",
    "__mul__",
    "__div__",
    "__mod__",
    "__lt__",
    "__le__",
    "__gt__",
    "__ge__",
    "__and__",
    "__or__",
    "__band__",
    "__bor__",
    "__xor__",
    "__lshift__",
    "__rshift__",
    "__neg__",
    "__not__",
    "__bnot__",
    "__inc__",
    "__dec__",
];

/// The slot a binary operator dispatches to, if overloadable. `==`, `!=`,
/// `??` and `=` have no slot.
pub fn binary_overload_slot(operator: BinaryOperator) -> Option<&'static str> {
    match operator {
        BinaryOperator::Add => Some("__add__"),
        BinaryOperator::Substract => Some("__sub__"),
        BinaryOperator::Multiply => Some("__mul__"),
        BinaryOperator::Divide => Some("__div__"),
        BinaryOperator::Modulo => Some("__mod__"),
        BinaryOperator::LessThan => Some("__lt__"),
        BinaryOperator::LessOrEqual => Some("__le__"),
        BinaryOperator::GreaterThan => Some("__gt__"),
        BinaryOperator::GreaterOrEqual => Some("__ge__"),
        BinaryOperator::And => Some("__and__"),
        BinaryOperator::Or => Some("__or__"),
        BinaryOperator::BitAnd => Some("__band__"),
        BinaryOperator::BitOr => Some("__bor__"),
        BinaryOperator::BitXor => Some("__xor__"),
        BinaryOperator::ShiftLeft => Some("__lshift__"),
        BinaryOperator::ShiftRight => Some("__rshift__"),
        BinaryOperator::Equals
        | BinaryOperator::NotEquals
        | BinaryOperator::NullCoalesce
        | BinaryOperator::Assign => None,
    }
}

pub fn unary_overload_slot(operator: UnaryOperator) -> Option<&'static str> {
    match operator {
        UnaryOperator::Minus => Some("__neg__"),
        UnaryOperator::Not => Some("__not__"),
        UnaryOperator::BitNot => Some("__bnot__"),
        UnaryOperator::PreIncrement | UnaryOperator::PostIncrement => Some("__inc__"),
        UnaryOperator::PreDecrement | UnaryOperator::PostDecrement => Some("__dec__"),
        UnaryOperator::Denull => None,
    }
}

/// Whether a slot's return type is constrained to `bool` (the comparison
/// family).
pub fn slot_must_return_bool(slot: &str) -> bool {
    matches!(slot, "__lt__" | "__le__" | "__gt__" | "__ge__")
}

/// Declared arity (excluding the receiver) of each overload slot, where
/// fixed. `__call__` is unconstrained.
pub fn slot_arity(slot: &str) -> Option<usize> {
    match slot {
        "__neg__" | "__not__" | "__bnot__" | "__inc__" | "__dec__" => Some(0),
        "__add__" | "__sub__" | "__mul__" | "__div__" | "__mod__" | "__lt__" | "__le__"
        | "__gt__" | "__ge__" | "__and__" | "__or__" | "__band__" | "__bor__" | "__xor__"
        | "__lshift__" | "__rshift__" => Some(1),
        INDEX | REVERSE_INDEX => Some(1),
        INDEX_SET | REVERSE_INDEX_SET => Some(2),
        _ => None,
    }
}

/// Look up a user-defined operator method on a class or interface receiver.
/// Returns `None` when the receiver is no such type (numeric handling then
/// applies); a class/interface receiver without a fitting method is an
/// error, since there is nothing to fall through to.
pub fn resolve_operator_overload(
    ctx: &Context,
    receiver: &Type,
    slot: &str,
    arg_types: &[Type],
    return_hint: Option<&Type>,
    position: &Location,
) -> TypeResult<Option<(OperatorOverload, Type)>> {
    match receiver.dereference() {
        Type::Class(class) => {
            let candidates = find_class_methods(
                ctx, &class, slot, arg_types, return_hint, &[], false, position,
            )?;
            match candidates.len() {
                0 => Err(TypeCheckError::StructuralViolation(
                    StructuralViolation::new(format!(
                        "'{slot}' is not defined for class '{}'",
                        class.borrow().name
                    )),
                    position.clone(),
                )),
                1 => {
                    let method = candidates.into_iter().next().expect("just checked");
                    let return_type = (*method.borrow().signature.return_type).clone();
                    Ok(Some((
                        OperatorOverload {
                            target: OverloadTarget::ClassMethod(method),
                        },
                        return_type,
                    )))
                }
                count => Err(TypeCheckError::AmbiguousCall(
                    AmbiguousCall {
                        name: slot.to_string(),
                        candidates: count,
                    },
                    position.clone(),
                )),
            }
        }
        Type::Interface(interface) => {
            let candidates =
                find_interface_methods(ctx, &interface, slot, arg_types, return_hint);
            match candidates.len() {
                0 => Err(TypeCheckError::StructuralViolation(
                    StructuralViolation::new(format!(
                        "'{slot}' is not defined for this interface"
                    )),
                    position.clone(),
                )),
                1 => {
                    let method = candidates.into_iter().next().expect("just checked");
                    let return_type = (*method.signature.return_type).clone();
                    Ok(Some((
                        OperatorOverload {
                            target: OverloadTarget::InterfaceMethod(method),
                        },
                        return_type,
                    )))
                }
                count => Err(TypeCheckError::AmbiguousCall(
                    AmbiguousCall {
                        name: slot.to_string(),
                        candidates: count,
                    },
                    position.clone(),
                )),
            }
        }
        _ => Ok(None),
    }
}
