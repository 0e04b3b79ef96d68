//! Inference context: the current lexical scope, environment flags and the
//! compilation-wide shared state (warning sink, identity counters, matcher
//! caches, lambda registry).
//!
//! Contexts are cloned freely to snapshot scope state into AST nodes; all
//! sharing happens through `Rc`. Equality is intentionally degenerate
//! (always true) because context identity is not semantically relevant to
//! type equality comparisons.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use once_cell::unsync::OnceCell;

use crate::ast::FunctionBody;
use crate::location::Location;

use super::scope::Scope;
use super::types::{
    BasicKind, ClassMethod, ClassRef, ClassType, FunctionParameter, FunctionType, Type,
};
use super::warning::TypeCheckWarning;

/// One collected `return` of the function currently being inferred. The
/// hint slot is shared with the return node's info, so reconciliation can
/// set the hint after the fact.
#[derive(Clone, Debug)]
pub struct CollectedReturn {
    pub type_id: Type,
    pub position: Location,
    pub hint_slot: Rc<RefCell<Option<Type>>>,
}

/// Per-function return accumulation: the declared return type (`None` while
/// it is still being inferred) plus every `return` seen so far.
#[derive(Clone, Debug, Default)]
pub struct ReturnContext {
    pub declared: Option<Type>,
    pub collected: Rc<RefCell<Vec<CollectedReturn>>>,
}

/// A lambda registered on the module root under its generated name.
#[derive(Clone, Debug)]
pub struct RegisteredLambda {
    pub name: String,
    pub signature: FunctionType,
    pub position: Location,
}

#[derive(Debug, Default)]
pub struct SharedState {
    pub warnings: RefCell<Vec<TypeCheckWarning>>,
    class_counter: Cell<usize>,
    variant_counter: Cell<usize>,
    lambda_counter: Cell<usize>,
    branch_counter: Cell<usize>,
    iterator_counter: Cell<usize>,
    field_ids: RefCell<HashMap<String, usize>>,
    pub match_cache: RefCell<HashMap<(u32, u32, bool), bool>>,
    pub matching_stack: RefCell<Vec<(u32, u32, bool)>>,
    pub lambdas: RefCell<Vec<RegisteredLambda>>,
    string_class: OnceCell<ClassRef>,
}

#[derive(Clone, Debug)]
pub struct Context {
    pub scope: Scope,
    pub active_class: Option<ClassRef>,
    pub active_method: Option<String>,
    pub in_static_method: bool,
    pub within_loop: bool,
    pub within_coroutine: bool,
    /// Set while inferring the left side of `??` so nullable member access
    /// yields the raw member type instead of re-wrapping it.
    pub within_nullish_coalescing: bool,
    pub yield_hint: Option<Type>,
    pub return_context: Option<ReturnContext>,
    pub shared: Rc<SharedState>,
}

impl Default for Context {
    fn default() -> Self {
        Context {
            scope: Scope::new(),
            active_class: None,
            active_method: None,
            in_static_method: false,
            within_loop: false,
            within_coroutine: false,
            within_nullish_coalescing: false,
            yield_hint: None,
            return_context: None,
            shared: Rc::new(SharedState::default()),
        }
    }
}

impl PartialEq for Context {
    fn eq(&self, _: &Self) -> bool {
        true
    }
}

impl Eq for Context {}

impl Context {
    pub fn warn(&self, warning: TypeCheckWarning) {
        self.shared.warnings.borrow_mut().push(warning);
    }

    pub fn take_warnings(&self) -> Vec<TypeCheckWarning> {
        self.shared.warnings.borrow_mut().drain(..).collect()
    }

    pub fn next_class_id(&self) -> usize {
        let id = self.shared.class_counter.get();
        self.shared.class_counter.set(id + 1);
        id
    }

    pub fn next_variant_id(&self) -> usize {
        let id = self.shared.variant_counter.get();
        self.shared.variant_counter.set(id + 1);
        id
    }

    pub fn next_lambda_name(&self) -> String {
        let id = self.shared.lambda_counter.get();
        self.shared.lambda_counter.set(id + 1);
        format!("lambda-{id}")
    }

    pub fn next_branch_label(&self) -> usize {
        let id = self.shared.branch_counter.get();
        self.shared.branch_counter.set(id + 1);
        id
    }

    pub fn next_iterator_name(&self) -> String {
        let id = self.shared.iterator_counter.get();
        self.shared.iterator_counter.set(id + 1);
        format!("iterator-{id}")
    }

    /// Globally intern a constructor field name; parameters sharing a name
    /// receive the same id across all variants of the compilation.
    pub fn intern_field(&self, name: &str) -> usize {
        let mut ids = self.shared.field_ids.borrow_mut();
        let next = ids.len();
        *ids.entry(name.to_string()).or_insert(next)
    }

    pub fn register_lambda(&self, signature: FunctionType, position: Location) -> String {
        let name = self.next_lambda_name();
        self.shared.lambdas.borrow_mut().push(RegisteredLambda {
            name: name.clone(),
            signature,
            position,
        });
        name
    }

    /// The built-in `String` class. Constructed once per compilation; string
    /// literals, string-enum conversions and `throw` messages all use this
    /// identity.
    pub fn string_class(&self) -> ClassRef {
        Rc::clone(
            self.shared
                .string_class
                .get_or_init(|| build_string_class(self.next_class_id())),
        )
    }

    pub fn string_type(&self) -> Type {
        Type::Class(self.string_class())
    }

    pub fn is_string_class(&self, class: &ClassRef) -> bool {
        class.borrow().id == self.string_class().borrow().id
    }
}

fn builtin_method(name: &str, parameters: Vec<FunctionParameter>, return_type: Type) -> ClassMethod {
    ClassMethod {
        name: name.to_string(),
        signature: FunctionType::new(parameters, return_type),
        generics: vec![],
        body: FunctionBody::Block(vec![]),
        checked_body: None,
        is_static: false,
        is_override: false,
        is_external: true,
        inferring: false,
        index_in_class: None,
        source_method: None,
        monomorphs: vec![],
        position: Location::default(),
    }
}

fn build_string_class(id: usize) -> ClassRef {
    let class = Rc::new(RefCell::new(ClassType {
        id,
        name: "String".to_string(),
        attributes: vec![],
        methods: vec![],
        all_methods: vec![],
        super_interfaces: vec![],
        resolving: false,
        resolved: true,
        position: Location::default(),
    }));

    let string = Type::Class(Rc::clone(&class));
    let u64_type = Type::Basic(BasicKind::U64);
    let byte = Type::Basic(BasicKind::U8);

    let param = |name: &str, type_id: &Type| FunctionParameter {
        name: name.to_string(),
        type_id: type_id.clone(),
        mutable: false,
    };

    let methods = vec![
        builtin_method("length", vec![], u64_type.clone()),
        builtin_method("__add__", vec![param("other", &string)], string.clone()),
        builtin_method("__index__", vec![param("index", &u64_type)], byte),
        builtin_method(
            "substring",
            vec![param("start", &u64_type), param("end", &u64_type)],
            string.clone(),
        ),
        builtin_method("contains", vec![param("other", &string)], Type::Boolean),
    ];

    {
        let mut class_mut = class.borrow_mut();
        for method in methods {
            let method = Rc::new(RefCell::new(method));
            class_mut.methods.push(Rc::clone(&method));
            class_mut.enumerate_method(&method);
        }
    }

    class
}

#[cfg(test)]
mod tests {
    use super::Context;

    #[test]
    fn test_counters_are_monotone() {
        let ctx = Context::default();
        assert_eq!(ctx.next_class_id(), 0);
        assert_eq!(ctx.next_class_id(), 1);
        assert_eq!(ctx.next_lambda_name(), "lambda-0");
        assert_eq!(ctx.next_lambda_name(), "lambda-1");
    }

    #[test]
    fn test_field_interning_is_stable() {
        let ctx = Context::default();
        let a = ctx.intern_field("value");
        let b = ctx.intern_field("other");
        let c = ctx.intern_field("value");
        assert_eq!(a, c);
        assert_ne!(a, b);
    }

    #[test]
    fn test_string_class_identity_is_stable() {
        let ctx = Context::default();
        let a = ctx.string_class();
        let b = ctx.string_class();
        assert_eq!(a.borrow().id, b.borrow().id);
    }
}
