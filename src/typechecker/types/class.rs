use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::ast::FunctionBody;
use crate::location::Location;
use crate::typechecker::functions::DeclaredFunction;
use crate::typechecker::TypeInformation;

use super::{FunctionType, GenericType, MethodSignature, Type};

pub type ClassRef = Rc<RefCell<ClassType>>;

#[derive(Clone, Debug, PartialEq)]
pub struct ClassAttribute {
    pub name: String,
    pub type_id: Type,
    pub is_static: bool,
    pub position: Location,
}

/// A method attached to a class: the interface-method view of its signature
/// plus the body used for inference and monomorph cloning.
#[derive(Clone, Debug)]
pub struct ClassMethod {
    pub name: String,
    pub signature: FunctionType,
    /// Generic placeholders; empty for a concrete method.
    pub generics: Vec<GenericType>,
    /// The untyped body, kept for monomorph cloning.
    pub body: FunctionBody<()>,
    /// The inferred body; filled once the enclosing class resolves (for
    /// generic methods, only on monomorphized instances).
    pub checked_body: Option<FunctionBody<TypeInformation>>,
    pub is_static: bool,
    pub is_override: bool,
    /// Synthesized from an `impl` block rather than declared on the class.
    pub is_external: bool,
    /// Re-entrancy guard: body inference is in progress.
    pub inferring: bool,
    /// Stable position in the class's enumerated method list, assigned when
    /// the method (or monomorph) lands in `all_methods`.
    pub index_in_class: Option<usize>,
    /// Monomorphized instances point back at the generic template.
    pub source_method: Option<Weak<RefCell<ClassMethod>>>,
    /// Concrete instances of a generic method, keyed by the positional
    /// type-argument vector.
    pub monomorphs: Vec<(Vec<Type>, Rc<RefCell<ClassMethod>>)>,
    pub position: Location,
}

impl ClassMethod {
    pub fn is_generic(&self) -> bool {
        !self.generics.is_empty()
    }

    pub fn as_signature(&self) -> MethodSignature {
        MethodSignature {
            name: self.name.clone(),
            signature: self.signature.clone(),
        }
    }
}

/// A nominal class. Identity is the `id`, assigned once at construction from
/// a monotone counter; serialization and equality go through it, which also
/// breaks cycles for self-referential classes.
#[derive(Clone, Debug)]
pub struct ClassType {
    pub id: usize,
    pub name: String,
    pub attributes: Vec<ClassAttribute>,
    pub methods: Vec<Rc<RefCell<ClassMethod>>>,
    /// Final enumeration handed to code generation: concrete methods plus
    /// every monomorphized instance, in stable order.
    pub all_methods: Vec<Rc<RefCell<ClassMethod>>>,
    pub super_interfaces: Vec<Type>,
    pub resolving: bool,
    pub resolved: bool,
    pub position: Location,
}

impl ClassType {
    pub fn attribute(&self, name: &str) -> Option<&ClassAttribute> {
        self.attributes.iter().find(|a| a.name == name)
    }

    pub fn methods_named(&self, name: &str) -> Vec<Rc<RefCell<ClassMethod>>> {
        self.methods
            .iter()
            .filter(|m| m.borrow().name == name)
            .cloned()
            .collect()
    }

    /// Append a concrete method to the enumeration, assigning its stable
    /// index. Re-appending the same reference is a no-op.
    pub fn enumerate_method(&mut self, method: &Rc<RefCell<ClassMethod>>) {
        if self
            .all_methods
            .iter()
            .any(|existing| Rc::ptr_eq(existing, method))
        {
            return;
        }
        method.borrow_mut().index_in_class = Some(self.all_methods.len());
        self.all_methods.push(Rc::clone(method));
    }

    /// Structural projection: the class viewed as an interface over its
    /// non-static, non-generic methods.
    pub fn as_interface(&self) -> super::InterfaceType {
        let methods = self
            .methods
            .iter()
            .filter(|m| {
                let m = m.borrow();
                !m.is_static && !m.is_generic()
            })
            .map(|m| m.borrow().as_signature())
            .collect();
        super::InterfaceType::new(Some(self.name.clone()), methods, vec![])
    }
}

/// What an operator position dispatched to: a concrete class method or an
/// interface method signature.
#[derive(Clone, Debug)]
pub enum OverloadTarget {
    ClassMethod(Rc<RefCell<ClassMethod>>),
    InterfaceMethod(MethodSignature),
}

impl OverloadTarget {
    pub fn signature(&self) -> FunctionType {
        match self {
            OverloadTarget::ClassMethod(method) => method.borrow().signature.clone(),
            OverloadTarget::InterfaceMethod(method) => method.signature.clone(),
        }
    }
}

/// Resolution record for an operator position that dispatched to a
/// user-defined method. Equality is intentionally degenerate: the record is
/// derived data and irrelevant to node equality.
#[derive(Clone, Debug)]
pub struct OperatorOverload {
    pub target: OverloadTarget,
}

impl PartialEq for OperatorOverload {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}

impl Eq for OperatorOverload {}

/// Resolution record for a call site. Exactly one form is recorded per call;
/// FFI calls, call-operator overloads and variant-constructor forms record
/// none.
#[derive(Clone, Debug)]
pub enum ResolvedCallee {
    Function(Rc<RefCell<DeclaredFunction>>),
    ClassMethod(Rc<RefCell<ClassMethod>>),
    InterfaceMethod(MethodSignature),
}

impl PartialEq for ResolvedCallee {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}

impl Eq for ResolvedCallee {}
