use super::Type;

/// A parameter of a function type. `mutable` is part of the signature: a
/// mutable parameter only accepts mutable arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionParameter {
    pub name: String,
    pub type_id: Type,
    pub mutable: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FunctionType {
    pub parameters: Vec<FunctionParameter>,
    pub return_type: Box<Type>,
}

impl FunctionType {
    pub fn new(parameters: Vec<FunctionParameter>, return_type: Type) -> FunctionType {
        FunctionType {
            parameters,
            return_type: Box::new(return_type),
        }
    }

    pub fn parameter_types(&self) -> Vec<Type> {
        self.parameters.iter().map(|p| p.type_id.clone()).collect()
    }
}

/// An interface method: a name plus a function type. Interface methods are
/// never generic and never static.
#[derive(Clone, Debug, PartialEq)]
pub struct MethodSignature {
    pub name: String,
    pub signature: FunctionType,
}
