mod class;
mod enums;
mod ffi;
mod function;
mod implementation;
mod interface;
mod namespace;
mod type_alias;
mod variant;

pub use self::class::*;
pub use self::enums::*;
pub use self::ffi::*;
pub use self::function::*;
pub use self::implementation::*;
pub use self::interface::*;
pub use self::namespace::*;
pub use self::type_alias::*;
pub use self::variant::*;

use serde::{Deserialize, Serialize};

use crate::location::Location;

/// Everything that can appear at the top level of a compilation unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Declaration<I> {
    Function(FunctionDeclaration<I>),
    Class(ClassDeclaration<I>),
    Interface(InterfaceDeclaration),
    Variant(VariantDeclaration),
    Enum(EnumDeclaration),
    StringEnum(StringEnumDeclaration),
    TypeAlias(TypeAliasDeclaration),
    Namespace(NamespaceDeclaration<I>),
    Ffi(FfiDeclaration),
    Impl(ImplDeclaration<I>),
}

impl<I> Declaration<I> {
    pub fn name(&self) -> &str {
        match self {
            Declaration::Function(function) => &function.name,
            Declaration::Class(class) => &class.name,
            Declaration::Interface(interface) => &interface.name,
            Declaration::Variant(variant) => &variant.name,
            Declaration::Enum(enum_declaration) => &enum_declaration.name,
            Declaration::StringEnum(string_enum) => &string_enum.name,
            Declaration::TypeAlias(alias) => &alias.name,
            Declaration::Namespace(namespace) => &namespace.name,
            Declaration::Ffi(ffi) => &ffi.name,
            Declaration::Impl(implementation) => &implementation.name,
        }
    }

    pub fn position(&self) -> Location {
        match self {
            Declaration::Function(function) => function.position.clone(),
            Declaration::Class(class) => class.position.clone(),
            Declaration::Interface(interface) => interface.position.clone(),
            Declaration::Variant(variant) => variant.position.clone(),
            Declaration::Enum(enum_declaration) => enum_declaration.position.clone(),
            Declaration::StringEnum(string_enum) => string_enum.position.clone(),
            Declaration::TypeAlias(alias) => alias.position.clone(),
            Declaration::Namespace(namespace) => namespace.position.clone(),
            Declaration::Ffi(ffi) => ffi.position.clone(),
            Declaration::Impl(implementation) => implementation.position.clone(),
        }
    }
}
