//! The semantic type lattice.
//!
//! A closed set of type variants shared by the whole analyzer. Types are
//! immutable once resolved; classes and variants are shared behind
//! `Rc<RefCell<...>>` because they are cyclic (a class may mention itself in
//! attribute or method position) and accumulate their identity exactly once.

mod basic;
mod class;
mod convert;
mod extract;
mod function;
mod interface;
mod serialize;
mod substitute;
mod variant;

pub use self::basic::*;
pub use self::class::*;
pub use self::convert::*;
pub use self::extract::*;
pub use self::function::*;
pub use self::interface::*;
pub use self::substitute::*;
pub use self::variant::*;

use std::cell::RefCell;
use std::rc::Rc;

/// A named alias. The target slot is filled when the alias declaration
/// resolves; `dereference` unwraps chains of these.
#[derive(Clone, Debug)]
pub struct ReferenceType {
    pub name: String,
    pub target: Rc<RefCell<Option<Type>>>,
}

impl ReferenceType {
    pub fn unresolved(name: impl ToString) -> ReferenceType {
        ReferenceType {
            name: name.to_string(),
            target: Rc::new(RefCell::new(None)),
        }
    }
}

/// A generic placeholder, only valid inside an unresolved generic context.
/// The matcher must never see one at check time.
#[derive(Clone, Debug, PartialEq)]
pub struct GenericType {
    pub name: String,
    pub constraint: Option<Box<Type>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnumType {
    pub name: String,
    pub members: Vec<(String, i64)>,
    pub backing: BasicKind,
}

impl EnumType {
    pub fn member_value(&self, name: &str) -> Option<i64> {
        self.members
            .iter()
            .find(|(member, _)| member == name)
            .map(|(_, value)| *value)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StringEnumType {
    pub values: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StructField {
    pub name: String,
    pub type_id: Type,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StructType {
    pub fields: Vec<StructField>,
}

impl StructType {
    pub fn field(&self, name: &str) -> Option<&StructField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Clone)]
pub enum Type {
    Basic(BasicKind),
    /// The type of an integer literal before a numeric hint settles it; the
    /// kind is the storage the literal would default to.
    LiteralInt(BasicKind),
    Boolean,
    Void,
    Null,
    /// The type of diverging expressions (`throw`, `unreachable`).
    Unreachable,
    /// A declared but not yet inferred return type.
    Unset,
    Nullable(Box<Type>),
    Array {
        element: Box<Type>,
        /// Advisory only; never part of identity.
        length: Option<u64>,
    },
    Tuple(Vec<Type>),
    Struct(StructType),
    Function(FunctionType),
    /// A suspended invocation of a function type.
    Coroutine(Box<FunctionType>),
    Promise(Box<Type>),
    Interface(InterfaceType),
    Class(ClassRef),
    Variant(VariantRef),
    VariantConstructor(VariantConstructorRef),
    Enum(EnumType),
    StringEnum(StringEnumType),
    Reference(ReferenceType),
    Generic(GenericType),
    /// Structural conjunction of interface-convertible types; behaves as an
    /// interface for subtyping.
    Join(Vec<Type>),
    /// Alternatives, only valid inside generic constraints.
    Union(Vec<Type>),
    MetaClass(ClassRef),
    MetaVariant(VariantRef),
    MetaVariantConstructor(VariantConstructorRef),
    FfiMethod(FunctionType),
}

impl Type {
    pub fn nullable(inner: Type) -> Type {
        Type::Nullable(Box::new(inner))
    }

    pub fn array(element: Type) -> Type {
        Type::Array {
            element: Box::new(element),
            length: None,
        }
    }

    pub fn function(parameters: Vec<FunctionParameter>, return_type: Type) -> Type {
        Type::Function(FunctionType::new(parameters, return_type))
    }

    /// Unwrap chains of named references. A depth cap stops degenerate alias
    /// cycles; the remaining reference is then treated as opaque.
    pub fn dereference(&self) -> Type {
        let mut current = self.clone();
        let mut depth = 0;
        while let Type::Reference(reference) = &current {
            let target = reference.target.borrow().clone();
            match target {
                Some(inner) => current = inner,
                None => break,
            }
            depth += 1;
            if depth > 64 {
                break;
            }
        }
        current
    }

    pub fn is_numeric(&self) -> bool {
        matches!(
            self.dereference(),
            Type::Basic(_) | Type::LiteralInt(_)
        )
    }

    /// The numeric kind this type contributes to promotion, if any.
    pub fn numeric_kind(&self) -> Option<BasicKind> {
        match self.dereference() {
            Type::Basic(kind) | Type::LiteralInt(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self.dereference(), Type::Nullable(_))
    }

    pub fn nullable_inner(&self) -> Option<Type> {
        match self.dereference() {
            Type::Nullable(inner) => Some(*inner),
            _ => None,
        }
    }

    /// Whether any generic placeholder occurs inside this type.
    pub fn contains_generic(&self) -> bool {
        match self {
            Type::Generic(_) => true,
            Type::Nullable(inner) | Type::Promise(inner) => inner.contains_generic(),
            Type::Array { element, .. } => element.contains_generic(),
            Type::Tuple(elements) | Type::Join(elements) | Type::Union(elements) => {
                elements.iter().any(|e| e.contains_generic())
            }
            Type::Struct(strukt) => strukt.fields.iter().any(|f| f.type_id.contains_generic()),
            Type::Function(function) | Type::FfiMethod(function) => {
                function.parameters.iter().any(|p| p.type_id.contains_generic())
                    || function.return_type.contains_generic()
            }
            Type::Coroutine(function) => {
                function.parameters.iter().any(|p| p.type_id.contains_generic())
                    || function.return_type.contains_generic()
            }
            Type::Variant(variant) => variant
                .borrow()
                .args
                .iter()
                .any(|a| a.contains_generic()),
            Type::Reference(reference) => reference
                .target
                .borrow()
                .as_ref()
                .map(|t| t.contains_generic())
                .unwrap_or(false),
            _ => false,
        }
    }

    /// Whether expressions of this type may be stored in variables and
    /// passed as values.
    pub fn is_value_type(&self) -> bool {
        !matches!(
            self.dereference(),
            Type::Unset
                | Type::Generic(_)
                | Type::Union(_)
                | Type::FfiMethod(_)
                | Type::MetaClass(_)
                | Type::MetaVariant(_)
                | Type::MetaVariantConstructor(_)
        )
    }
}

/// Nominal identity for classes and variants (by id), structural everywhere
/// else. References compare through their targets.
impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Type::Reference(_), _) | (_, Type::Reference(_)) => {
                self.dereference().eq_resolved(&other.dereference())
            }
            _ => self.eq_resolved(other),
        }
    }
}

impl Eq for Type {}

impl Type {
    fn eq_resolved(&self, other: &Type) -> bool {
        match (self, other) {
            (Type::Basic(a), Type::Basic(b)) => a == b,
            (Type::LiteralInt(a), Type::LiteralInt(b)) => a == b,
            (Type::Boolean, Type::Boolean)
            | (Type::Void, Type::Void)
            | (Type::Null, Type::Null)
            | (Type::Unreachable, Type::Unreachable)
            | (Type::Unset, Type::Unset) => true,
            (Type::Nullable(a), Type::Nullable(b)) => a == b,
            (Type::Array { element: a, .. }, Type::Array { element: b, .. }) => a == b,
            (Type::Tuple(a), Type::Tuple(b)) => a == b,
            (Type::Struct(a), Type::Struct(b)) => {
                a.fields.len() == b.fields.len()
                    && a.fields.iter().all(|field| {
                        b.field(&field.name)
                            .map(|other| other.type_id == field.type_id)
                            .unwrap_or(false)
                    })
            }
            (Type::Function(a), Type::Function(b)) => {
                a.return_type == b.return_type
                    && a.parameters.len() == b.parameters.len()
                    && a.parameters.iter().zip(b.parameters.iter()).all(|(x, y)| {
                        x.mutable == y.mutable && x.type_id == y.type_id
                    })
            }
            (Type::Coroutine(a), Type::Coroutine(b)) => {
                Type::Function(*a.clone()) == Type::Function(*b.clone())
            }
            (Type::Promise(a), Type::Promise(b)) => a == b,
            (Type::Interface(a), Type::Interface(b)) => {
                let a = a.all_methods();
                let b = b.all_methods();
                a.len() == b.len()
                    && a.iter().all(|method| {
                        b.iter().any(|other| {
                            other.name == method.name
                                && Type::Function(other.signature.clone())
                                    == Type::Function(method.signature.clone())
                        })
                    })
            }
            (Type::Class(a), Type::Class(b))
            | (Type::MetaClass(a), Type::MetaClass(b)) => a.borrow().id == b.borrow().id,
            (Type::Variant(a), Type::Variant(b))
            | (Type::MetaVariant(a), Type::MetaVariant(b)) => a.borrow().id == b.borrow().id,
            (Type::VariantConstructor(a), Type::VariantConstructor(b))
            | (Type::MetaVariantConstructor(a), Type::MetaVariantConstructor(b)) => {
                let (a, b) = (a.borrow(), b.borrow());
                a.name == b.name
                    && match (a.parent_variant(), b.parent_variant()) {
                        (Some(pa), Some(pb)) => pa.borrow().id == pb.borrow().id,
                        _ => false,
                    }
            }
            (Type::Enum(a), Type::Enum(b)) => a == b,
            (Type::StringEnum(a), Type::StringEnum(b)) => a == b,
            (Type::Generic(a), Type::Generic(b)) => a.name == b.name,
            (Type::Join(a), Type::Join(b)) | (Type::Union(a), Type::Union(b)) => a == b,
            (Type::FfiMethod(a), Type::FfiMethod(b)) => {
                Type::Function(a.clone()) == Type::Function(b.clone())
            }
            _ => false,
        }
    }
}

impl std::fmt::Debug for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Type::Basic(kind) => write!(f, "{kind}"),
            Type::LiteralInt(kind) => write!(f, "literal-int<{kind}>"),
            Type::Boolean => write!(f, "bool"),
            Type::Void => write!(f, "void"),
            Type::Null => write!(f, "null"),
            Type::Unreachable => write!(f, "unreachable"),
            Type::Unset => write!(f, "unset"),
            Type::Nullable(inner) => write!(f, "{inner:?}?"),
            Type::Array { element, .. } => write!(f, "{element:?}[]"),
            Type::Tuple(elements) => {
                let elements = elements
                    .iter()
                    .map(|e| format!("{e:?}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "({elements})")
            }
            Type::Struct(strukt) => {
                let fields = strukt
                    .fields
                    .iter()
                    .map(|field| format!("{}: {:?}", field.name, field.type_id))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{{{fields}}}")
            }
            Type::Function(function) => {
                let params = function
                    .parameters
                    .iter()
                    .map(|p| format!("{:?}", p.type_id))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "({params}) -> {:?}", function.return_type)
            }
            Type::Coroutine(function) => {
                write!(f, "coroutine<{:?}>", Type::Function(*function.clone()))
            }
            Type::Promise(inner) => write!(f, "promise<{inner:?}>"),
            Type::Interface(interface) => match &interface.name {
                Some(name) => write!(f, "interface {name}"),
                None => write!(f, "interface"),
            },
            Type::Class(class) => match class.try_borrow() {
                Ok(class) => write!(f, "class {}", class.name),
                Err(_) => write!(f, "class"),
            },
            Type::Variant(variant) => match variant.try_borrow() {
                Ok(variant) => write!(f, "variant {}", variant.name),
                Err(_) => write!(f, "variant"),
            },
            Type::VariantConstructor(constructor) => match constructor.try_borrow() {
                Ok(constructor) => {
                    let parent = constructor
                        .parent_variant()
                        .and_then(|p| p.try_borrow().map(|p| p.name.clone()).ok())
                        .unwrap_or_default();
                    write!(f, "{parent}.{}", constructor.name)
                }
                Err(_) => write!(f, "constructor"),
            },
            Type::Enum(e) => write!(f, "enum {}", e.name),
            Type::StringEnum(_) => write!(f, "string-enum"),
            Type::Reference(reference) => write!(f, "{}", reference.name),
            Type::Generic(generic) => write!(f, "{}", generic.name),
            Type::Join(parts) => {
                let parts = parts
                    .iter()
                    .map(|p| format!("{p:?}"))
                    .collect::<Vec<_>>()
                    .join(" & ");
                write!(f, "{parts}")
            }
            Type::Union(parts) => {
                let parts = parts
                    .iter()
                    .map(|p| format!("{p:?}"))
                    .collect::<Vec<_>>()
                    .join(" | ");
                write!(f, "{parts}")
            }
            Type::MetaClass(class) => match class.try_borrow() {
                Ok(class) => write!(f, "typeof class {}", class.name),
                Err(_) => write!(f, "typeof class"),
            },
            Type::MetaVariant(variant) => match variant.try_borrow() {
                Ok(variant) => write!(f, "typeof variant {}", variant.name),
                Err(_) => write!(f, "typeof variant"),
            },
            Type::MetaVariantConstructor(constructor) => match constructor.try_borrow() {
                Ok(constructor) => write!(f, "typeof {}", constructor.name),
                Err(_) => write!(f, "typeof constructor"),
            },
            Type::FfiMethod(function) => {
                write!(f, "ffi {:?}", Type::Function(function.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dereference_chain() {
        let inner = ReferenceType {
            name: "A".into(),
            target: Rc::new(RefCell::new(Some(Type::Basic(BasicKind::U32)))),
        };
        let outer = ReferenceType {
            name: "B".into(),
            target: Rc::new(RefCell::new(Some(Type::Reference(inner)))),
        };

        assert_eq!(
            Type::Reference(outer).dereference(),
            Type::Basic(BasicKind::U32)
        );
    }

    #[test]
    fn test_struct_equality_ignores_field_order() {
        let a = Type::Struct(StructType {
            fields: vec![
                StructField {
                    name: "x".into(),
                    type_id: Type::Basic(BasicKind::U32),
                },
                StructField {
                    name: "y".into(),
                    type_id: Type::Boolean,
                },
            ],
        });
        let b = Type::Struct(StructType {
            fields: vec![
                StructField {
                    name: "y".into(),
                    type_id: Type::Boolean,
                },
                StructField {
                    name: "x".into(),
                    type_id: Type::Basic(BasicKind::U32),
                },
            ],
        });

        assert_eq!(a, b);
    }

    #[test]
    fn test_function_equality_ignores_parameter_names() {
        let a = Type::function(
            vec![FunctionParameter {
                name: "a".into(),
                type_id: Type::Basic(BasicKind::U32),
                mutable: false,
            }],
            Type::Void,
        );
        let b = Type::function(
            vec![FunctionParameter {
                name: "b".into(),
                type_id: Type::Basic(BasicKind::U32),
                mutable: false,
            }],
            Type::Void,
        );

        assert_eq!(a, b);
    }
}
