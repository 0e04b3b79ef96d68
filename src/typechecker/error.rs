use std::{error::Error, fmt::Display};

use crate::location::Location;

use super::types::Type;

/// Fatal diagnostics. Any of these aborts analysis of the current
/// compilation unit; they propagate with `?` up to the driver.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeCheckError {
    TypeMismatch(TypeMismatch, Location),
    UndefinedVariable(UndefinedVariable, Location),
    UndefinedType(UndefinedType, Location),
    AmbiguousCall(AmbiguousCall, Location),
    ArityMismatch(ArityMismatch, Location),
    ImmutableAssignment(ImmutableAssignment, Location),
    InvalidAssignmentTarget(InvalidAssignmentTarget, Location),
    StructuralViolation(StructuralViolation, Location),
    GenericConstraintViolation(GenericConstraintViolation, Location),
    RedefinedSymbol(RedefinedSymbol, Location),
    ClassResolution(ClassResolutionError, Location),
}

impl TypeCheckError {
    pub fn position(&self) -> Location {
        match self {
            TypeCheckError::TypeMismatch(_, position)
            | TypeCheckError::UndefinedVariable(_, position)
            | TypeCheckError::UndefinedType(_, position)
            | TypeCheckError::AmbiguousCall(_, position)
            | TypeCheckError::ArityMismatch(_, position)
            | TypeCheckError::ImmutableAssignment(_, position)
            | TypeCheckError::InvalidAssignmentTarget(_, position)
            | TypeCheckError::StructuralViolation(_, position)
            | TypeCheckError::GenericConstraintViolation(_, position)
            | TypeCheckError::RedefinedSymbol(_, position)
            | TypeCheckError::ClassResolution(_, position) => position.clone(),
        }
    }

    fn err(&self) -> Box<dyn Error> {
        match self {
            TypeCheckError::TypeMismatch(e, _) => Box::new(e.clone()),
            TypeCheckError::UndefinedVariable(e, _) => Box::new(e.clone()),
            TypeCheckError::UndefinedType(e, _) => Box::new(e.clone()),
            TypeCheckError::AmbiguousCall(e, _) => Box::new(e.clone()),
            TypeCheckError::ArityMismatch(e, _) => Box::new(e.clone()),
            TypeCheckError::ImmutableAssignment(e, _) => Box::new(e.clone()),
            TypeCheckError::InvalidAssignmentTarget(e, _) => Box::new(e.clone()),
            TypeCheckError::StructuralViolation(e, _) => Box::new(e.clone()),
            TypeCheckError::GenericConstraintViolation(e, _) => Box::new(e.clone()),
            TypeCheckError::RedefinedSymbol(e, _) => Box::new(e.clone()),
            TypeCheckError::ClassResolution(e, _) => Box::new(e.clone()),
        }
    }
}

impl Display for TypeCheckError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.position().annotate(self.err()).as_str())
    }
}

impl Error for TypeCheckError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeMismatch {
    pub expected: Type,
    pub actual: Type,
    pub detail: Option<String>,
}

impl TypeMismatch {
    pub fn new(expected: Type, actual: Type) -> TypeMismatch {
        TypeMismatch {
            expected,
            actual,
            detail: None,
        }
    }
}

impl Display for TypeMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Expected type '{:?}' but got '{:?}'",
            self.expected, self.actual
        )?;
        if let Some(detail) = &self.detail {
            write!(f, " ({detail})")?;
        }
        Ok(())
    }
}

impl Error for TypeMismatch {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UndefinedVariable {
    pub variable_name: String,
}

impl Display for UndefinedVariable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Tried to access undefined variable '{}'",
            self.variable_name
        )
    }
}

impl Error for UndefinedVariable {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UndefinedType {
    pub type_name: String,
}

impl Display for UndefinedType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Undefined type '{}'", self.type_name)
    }
}

impl Error for UndefinedType {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AmbiguousCall {
    pub name: String,
    pub candidates: usize,
}

impl Display for AmbiguousCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Call to '{}' is ambiguous: {} candidates match",
            self.name, self.candidates
        )
    }
}

impl Error for AmbiguousCall {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ArityMismatch {
    pub name: String,
    pub expected: usize,
    pub actual: usize,
}

impl Display for ArityMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "'{}' takes {} argument(s) but {} were supplied",
            self.name, self.expected, self.actual
        )
    }
}

impl Error for ArityMismatch {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImmutableAssignment {
    pub name: String,
}

impl Display for ImmutableAssignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Can not mutate immutable binding '{}'", self.name)
    }
}

impl Error for ImmutableAssignment {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InvalidAssignmentTarget {
    pub detail: String,
}

impl Display for InvalidAssignmentTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Invalid assignment target: {}", self.detail)
    }
}

impl Error for InvalidAssignmentTarget {}

/// Misplaced constructs: `this` in a static method, `break` outside a loop,
/// `yield` outside a coroutine, tuple construction in expression position,
/// and friends.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructuralViolation {
    pub detail: String,
}

impl StructuralViolation {
    pub fn new(detail: impl ToString) -> StructuralViolation {
        StructuralViolation {
            detail: detail.to_string(),
        }
    }
}

impl Display for StructuralViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.detail)
    }
}

impl Error for StructuralViolation {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenericConstraintViolation {
    pub generic: String,
    pub argument: Type,
    pub constraint: Type,
}

impl Display for GenericConstraintViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Type argument '{:?}' for generic '{}' does not satisfy constraint '{:?}'",
            self.argument, self.generic, self.constraint
        )
    }
}

impl Error for GenericConstraintViolation {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedefinedSymbol {
    pub name: String,
}

impl Display for RedefinedSymbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Symbol '{}' is already defined", self.name)
    }
}

impl Error for RedefinedSymbol {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClassResolutionError {
    pub class_name: String,
    pub detail: String,
}

impl Display for ClassResolutionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "In class '{}': {}", self.class_name, self.detail)
    }
}

impl Error for ClassResolutionError {}
