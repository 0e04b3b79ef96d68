use std::{cell::RefCell, collections::HashMap, rc::Rc};

use crate::location::Location;

use super::error::{RedefinedSymbol, TypeCheckError};
use super::functions::DeclaredFunction;
use super::types::{FunctionType, Type, VariantTemplate};

/// Variable metadata held in a frame: the shared mutable type slot, the
/// mutability bit and whether the binding's value is statically constant.
/// `used` is flipped by name resolution so parameter-usage warnings can read
/// it back.
#[derive(Clone, Debug)]
pub struct StoredVariable {
    pub type_id: Rc<RefCell<Option<Type>>>,
    pub mutable: bool,
    pub constant_value: bool,
    pub used: Rc<std::cell::Cell<bool>>,
    pub position: Location,
}

/// A named type in scope: either a resolved (possibly reference-wrapped)
/// type, or a variant declaration awaiting instantiation.
#[derive(Clone, Debug)]
pub enum TypeSymbol {
    Type(Type),
    Variant(Rc<VariantTemplate>),
}

/// A namespace exposes its functions through member-access syntax.
#[derive(Debug, Default)]
pub struct Namespace {
    pub name: String,
    pub functions: HashMap<String, Rc<RefCell<DeclaredFunction>>>,
}

/// A foreign-function-interface group; methods behave like functions for
/// call resolution but are matched strictly and are never values.
#[derive(Clone, Debug, Default)]
pub struct FfiNamespace {
    pub name: String,
    pub methods: HashMap<String, FunctionType>,
}

/// A single lexical frame in the scope stack.
#[derive(Clone, Default)]
pub struct Frame {
    variables: HashMap<String, StoredVariable>,
    types: HashMap<String, TypeSymbol>,
    functions: HashMap<String, Rc<RefCell<DeclaredFunction>>>,
    namespaces: HashMap<String, Rc<RefCell<Namespace>>>,
    ffi_namespaces: HashMap<String, Rc<FfiNamespace>>,
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field(
                "variables",
                &self
                    .variables
                    .iter()
                    .map(|(name, variable)| (name, variable.type_id.borrow().clone()))
                    .collect::<HashMap<_, _>>(),
            )
            .field("types", &self.types.keys().collect::<Vec<_>>())
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .finish()
    }
}

type StackFrame = Rc<RefCell<Frame>>;

/// Hierarchical lexical scope stack. The `stacks` vector is inner-most at
/// the end; lookups walk from the end backwards.
#[derive(Clone, Debug)]
pub struct Scope {
    stacks: Vec<StackFrame>,
}

impl Default for Scope {
    fn default() -> Self {
        Scope {
            stacks: vec![StackFrame::default()],
        }
    }
}

impl Scope {
    pub fn new() -> Scope {
        Self::default()
    }

    pub fn enter_scope(&mut self) {
        self.stacks.push(StackFrame::default())
    }

    pub fn exit_scope(&mut self) {
        self.stacks.pop();
    }

    /// Insert or override a variable binding in the current frame
    /// (latest-wins, shadowing of outer frames included).
    pub fn add_variable(
        &mut self,
        name: impl ToString,
        type_id: Rc<RefCell<Option<Type>>>,
        mutable: bool,
        constant_value: bool,
        position: Location,
    ) {
        if let Some(frame) = self.stacks.last() {
            frame.borrow_mut().variables.insert(
                name.to_string(),
                StoredVariable {
                    type_id,
                    mutable,
                    constant_value,
                    used: Rc::new(std::cell::Cell::new(false)),
                    position,
                },
            );
        }
    }

    /// Like `add_variable`, but hands back the stored binding so the caller
    /// can keep watching its usage flag (parameters do this).
    pub fn add_tracked_variable(
        &mut self,
        name: impl ToString,
        type_id: Rc<RefCell<Option<Type>>>,
        mutable: bool,
        position: Location,
    ) -> StoredVariable {
        self.add_variable(name.to_string(), type_id, mutable, false, position);
        self.resolve_variable(name)
            .expect("binding was just inserted")
    }

    pub fn resolve_variable(&self, name: impl ToString) -> Option<StoredVariable> {
        let name = name.to_string();
        self.stacks
            .iter()
            .rev()
            .find_map(|frame| frame.borrow().variables.get(&name).cloned())
    }

    /// Register a named type in the current frame; errors on duplicates
    /// within the same frame.
    pub fn add_type(
        &mut self,
        name: impl ToString,
        symbol: TypeSymbol,
    ) -> Result<(), TypeCheckError> {
        let name = name.to_string();
        let Some(last) = self.stacks.last() else {
            unreachable!("trying to add type {name} in empty scope");
        };

        if last.borrow().types.contains_key(&name) {
            return Err(TypeCheckError::RedefinedSymbol(
                RedefinedSymbol { name },
                Location::default(),
            ));
        }

        last.borrow_mut().types.insert(name, symbol);
        Ok(())
    }

    /// Bind a type name unconditionally in the current frame. Used to bind
    /// generic placeholders (and their concrete substitutes) during
    /// instantiation.
    pub fn shadow_type(&mut self, name: impl ToString, type_id: Type) {
        if let Some(frame) = self.stacks.last() {
            frame
                .borrow_mut()
                .types
                .insert(name.to_string(), TypeSymbol::Type(type_id));
        }
    }

    pub fn get_type_symbol(&self, name: impl ToString) -> Option<TypeSymbol> {
        let name = name.to_string();
        self.stacks
            .iter()
            .rev()
            .find_map(|frame| frame.borrow().types.get(&name).cloned())
    }

    /// Resolve a type name to a resolved type, skipping variant templates.
    pub fn get_type(&self, name: impl ToString) -> Option<Type> {
        match self.get_type_symbol(name) {
            Some(TypeSymbol::Type(type_id)) => Some(type_id),
            _ => None,
        }
    }

    pub fn add_function(
        &mut self,
        name: impl ToString,
        function: Rc<RefCell<DeclaredFunction>>,
        position: &Location,
    ) -> Result<(), TypeCheckError> {
        let name = name.to_string();
        let Some(last) = self.stacks.last() else {
            unreachable!("trying to add function {name} in empty scope");
        };

        if last.borrow().functions.contains_key(&name) {
            return Err(TypeCheckError::RedefinedSymbol(
                RedefinedSymbol { name },
                position.clone(),
            ));
        }

        last.borrow_mut().functions.insert(name, function);
        Ok(())
    }

    pub fn get_function(&self, name: impl ToString) -> Option<Rc<RefCell<DeclaredFunction>>> {
        let name = name.to_string();
        self.stacks
            .iter()
            .rev()
            .find_map(|frame| frame.borrow().functions.get(&name).cloned())
    }

    pub fn add_namespace(
        &mut self,
        namespace: Rc<RefCell<Namespace>>,
        position: &Location,
    ) -> Result<(), TypeCheckError> {
        let name = namespace.borrow().name.clone();
        let Some(last) = self.stacks.last() else {
            unreachable!("trying to add namespace {name} in empty scope");
        };

        if last.borrow().namespaces.contains_key(&name) {
            return Err(TypeCheckError::RedefinedSymbol(
                RedefinedSymbol { name },
                position.clone(),
            ));
        }

        last.borrow_mut().namespaces.insert(name, namespace);
        Ok(())
    }

    pub fn get_namespace(&self, name: impl ToString) -> Option<Rc<RefCell<Namespace>>> {
        let name = name.to_string();
        self.stacks
            .iter()
            .rev()
            .find_map(|frame| frame.borrow().namespaces.get(&name).cloned())
    }

    pub fn add_ffi_namespace(
        &mut self,
        namespace: Rc<FfiNamespace>,
        position: &Location,
    ) -> Result<(), TypeCheckError> {
        let name = namespace.name.clone();
        let Some(last) = self.stacks.last() else {
            unreachable!("trying to add ffi namespace {name} in empty scope");
        };

        if last.borrow().ffi_namespaces.contains_key(&name) {
            return Err(TypeCheckError::RedefinedSymbol(
                RedefinedSymbol { name },
                position.clone(),
            ));
        }

        last.borrow_mut().ffi_namespaces.insert(name, namespace);
        Ok(())
    }

    pub fn get_ffi_namespace(&self, name: impl ToString) -> Option<Rc<FfiNamespace>> {
        let name = name.to_string();
        self.stacks
            .iter()
            .rev()
            .find_map(|frame| frame.borrow().ffi_namespaces.get(&name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use crate::location::Location;
    use crate::typechecker::types::{BasicKind, Type};

    use super::Scope;

    #[test]
    fn test_variable_shadowing_and_scopes() {
        let mut scope = Scope::new();

        scope.add_variable(
            "foo",
            Rc::new(RefCell::new(Some(Type::Basic(BasicKind::U32)))),
            false,
            false,
            Location::default(),
        );

        scope.enter_scope();
        scope.add_variable(
            "foo",
            Rc::new(RefCell::new(Some(Type::Boolean))),
            true,
            false,
            Location::default(),
        );

        let inner = scope.resolve_variable("foo").unwrap();
        assert_eq!(inner.type_id.borrow().clone(), Some(Type::Boolean));
        assert!(inner.mutable);

        scope.exit_scope();
        let outer = scope.resolve_variable("foo").unwrap();
        assert_eq!(
            outer.type_id.borrow().clone(),
            Some(Type::Basic(BasicKind::U32))
        );
        assert!(!outer.mutable);
    }

    #[test]
    fn test_shared_variable_slots() {
        let mut scope = Scope::new();
        let slot = Rc::new(RefCell::new(None));

        scope.add_variable("foo", Rc::clone(&slot), false, false, Location::default());

        *slot.borrow_mut() = Some(Type::Boolean);

        let stored = scope.resolve_variable("foo").unwrap();
        assert_eq!(stored.type_id.borrow().clone(), Some(Type::Boolean));
    }

    #[test]
    fn test_type_registration_rejects_duplicates() {
        let mut scope = Scope::new();
        scope.shadow_type("T", Type::Boolean);

        assert!(scope
            .add_type("T", super::TypeSymbol::Type(Type::Void))
            .is_err());
        assert_eq!(scope.get_type("T"), Some(Type::Boolean));
    }
}
