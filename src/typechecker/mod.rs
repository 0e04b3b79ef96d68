//! The semantic analyzer.
//!
//! Consumes the untyped AST handed over by the parser and produces the same
//! tree with every expression annotated: an inferred type, the hint it was
//! inferred under, and a constness bit. Call sites carry their resolved
//! callee, operator positions their resolved overload, classes their
//! enumerated method lists, variant constructors their tag ids.
//!
//! The sweep: register every top-level name, resolve type headers (aliases,
//! interfaces, class signatures), declare functions, then infer bodies.
//! Expressions are inferred exactly once per node; cycle-prone corners
//! (self-referential classes, recursive variants, mutually recursive
//! functions, re-entrant matches) are each guarded by an in-progress marker.

pub mod classes;
pub mod context;
pub mod error;
pub mod functions;
pub mod generics;
pub mod matcher;
pub mod operators;
pub mod promotion;
pub mod scope;
pub mod typed_ast;
pub mod types;
pub mod unify;
pub mod warning;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::ast::{
    ClassDeclaration, Declaration, FunctionDeclaration, ImplDeclaration, MethodDeclaration,
    NamespaceDeclaration, Statement,
};
use crate::location::Location;
use crate::Ast;

use self::context::{Context, RegisteredLambda};
use self::error::TypeCheckError;
use self::matcher::expect_assignable;
use self::scope::{FfiNamespace, Namespace, TypeSymbol};
use self::types::{
    signature_from_declaration, ClassRef, FunctionType, ReferenceType, Type,
};
use self::warning::TypeCheckWarning;

pub use self::context::Context as InferenceContext;
pub use self::error::TypeCheckError as SemanticError;
pub use self::types::Type as SemanticType;

pub type TypeResult<T> = Result<T, TypeCheckError>;

/// Inference slots attached to every checked AST node. The type and hint
/// slots are shared (`Rc`) so that late reconciliation (return hints,
/// retro-applied argument hints) is visible through the tree.
#[derive(Clone, Debug, PartialEq)]
pub struct TypeInformation {
    pub type_id: Rc<RefCell<Option<Type>>>,
    pub hint: Rc<RefCell<Option<Type>>>,
    pub constant: bool,
    pub context: Context,
}

impl TypeInformation {
    pub fn new(ctx: &Context, type_id: Type, hint: Option<&Type>) -> TypeInformation {
        TypeInformation {
            type_id: Rc::new(RefCell::new(Some(type_id))),
            hint: Rc::new(RefCell::new(hint.cloned())),
            constant: false,
            context: ctx.clone(),
        }
    }

    pub fn constant(mut self) -> TypeInformation {
        self.constant = true;
        self
    }

    pub fn resolved_type(&self) -> Type {
        self.type_id.borrow().clone().unwrap_or(Type::Unset)
    }
}

/// Confirm a bottom-up inferred type against the top-down hint, strictly.
pub fn confirm_hint(
    ctx: &Context,
    hint: Option<&Type>,
    inferred: &Type,
    position: &Location,
) -> TypeResult<()> {
    match hint {
        Some(hint) => expect_assignable(ctx, hint, inferred, true, position),
        None => Ok(()),
    }
}

/// One inference behavior per node kind: consume the untyped node, return
/// the annotated one. The hint flows top-down, the result type bottom-up.
pub trait TypeCheckable {
    type Typed;

    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed>;
}

/// Retro-fitting of hints onto already-checked expressions: overload
/// selection happens after arguments are inferred, and the chosen parameter
/// types are pushed back into literal-bearing nodes.
pub trait TypedConstruct {
    fn update_type(&mut self, type_id: Type) -> TypeResult<()>;
}

/// The fully analyzed compilation unit.
#[derive(Debug)]
pub struct CheckedModule {
    /// The typed declarations. Generic templates are represented by their
    /// monomorphized instances; `impl` blocks are consumed into the classes
    /// that reference them.
    pub declarations: Ast<TypeInformation>,
    pub warnings: Vec<TypeCheckWarning>,
    /// Lambdas registered on the module root under generated names.
    pub lambdas: Vec<RegisteredLambda>,
}

#[derive(Debug, Default)]
pub struct TypeChecker {
    declarations: Ast<()>,
    context: Context,
}

impl TypeChecker {
    pub fn new(declarations: Ast<()>) -> TypeChecker {
        TypeChecker {
            declarations,
            ..Default::default()
        }
    }

    pub fn check(mut self) -> TypeResult<CheckedModule> {
        let declarations = std::mem::take(&mut self.declarations);

        // Sweep 1: register every named declaration so later phases see all
        // names. Aliases and interfaces go in as empty reference slots.
        let mut alias_slots: HashMap<String, Rc<RefCell<Option<Type>>>> = HashMap::new();
        let mut impls: HashMap<String, ImplDeclaration<()>> = HashMap::new();
        let mut classes: Vec<(ClassDeclaration<()>, ClassRef)> = vec![];

        for declaration in &declarations {
            match declaration {
                Declaration::TypeAlias(alias) => {
                    let reference = ReferenceType::unresolved(&alias.name);
                    alias_slots.insert(alias.name.clone(), Rc::clone(&reference.target));
                    self.context
                        .scope
                        .add_type(&alias.name, TypeSymbol::Type(Type::Reference(reference)))
                        .map_err(|e| at_position(e, &alias.position))?;
                }
                Declaration::Interface(interface) => {
                    let reference = ReferenceType::unresolved(&interface.name);
                    alias_slots.insert(interface.name.clone(), Rc::clone(&reference.target));
                    self.context
                        .scope
                        .add_type(&interface.name, TypeSymbol::Type(Type::Reference(reference)))
                        .map_err(|e| at_position(e, &interface.position))?;
                }
                Declaration::Class(class) => {
                    let class_ref = classes::construct_class(&self.context, class);
                    self.context
                        .scope
                        .add_type(&class.name, TypeSymbol::Type(Type::Class(Rc::clone(&class_ref))))
                        .map_err(|e| at_position(e, &class.position))?;
                    classes.push((class.clone(), class_ref));
                }
                Declaration::Variant(variant) => {
                    let template = types::VariantTemplate::new(variant.clone());
                    self.context
                        .scope
                        .add_type(&variant.name, TypeSymbol::Variant(template))
                        .map_err(|e| at_position(e, &variant.position))?;
                }
                Declaration::Enum(enum_declaration) => {
                    let enum_type = resolve_enum(&self.context, enum_declaration)?;
                    self.context
                        .scope
                        .add_type(&enum_declaration.name, TypeSymbol::Type(enum_type))
                        .map_err(|e| at_position(e, &enum_declaration.position))?;
                }
                Declaration::StringEnum(string_enum) => {
                    let values = string_enum.values.clone();
                    self.context
                        .scope
                        .add_type(
                            &string_enum.name,
                            TypeSymbol::Type(Type::StringEnum(types::StringEnumType { values })),
                        )
                        .map_err(|e| at_position(e, &string_enum.position))?;
                }
                Declaration::Impl(implementation) => {
                    impls.insert(implementation.name.clone(), implementation.clone());
                }
                Declaration::Function(_)
                | Declaration::Namespace(_)
                | Declaration::Ffi(_) => {}
            }
        }

        // Sweep 2: fill alias and interface slots, then class headers. All
        // names exist by now, so mutual recursion resolves through the
        // reference indirection.
        for declaration in &declarations {
            match declaration {
                Declaration::TypeAlias(alias) => {
                    let target = Type::try_from((alias.target.clone(), &self.context))?;
                    *alias_slots[&alias.name].borrow_mut() = Some(target);
                }
                Declaration::Interface(interface) => {
                    let resolved = classes::resolve_interface(&self.context, interface)?;
                    *alias_slots[&interface.name].borrow_mut() =
                        Some(Type::Interface(resolved));
                }
                _ => {}
            }
        }
        for (declaration, class_ref) in &classes {
            classes::resolve_class_header(&self.context, declaration, class_ref, &impls)?;
        }

        // Non-generic variants instantiate eagerly so their constructors
        // get tags even when never mentioned in a type position.
        for declaration in &declarations {
            if let Declaration::Variant(variant) = declaration {
                if variant.generics.is_empty() {
                    if let Some(TypeSymbol::Variant(template)) =
                        self.context.scope.get_type_symbol(&variant.name)
                    {
                        template.instantiate(&self.context, &[], &variant.position)?;
                    }
                }
            }
        }

        // Sweep 3: declare functions, namespaces and FFI groups.
        let mut functions = vec![];
        let mut namespaces: Vec<(NamespaceDeclaration<()>, Rc<RefCell<Namespace>>)> = vec![];
        for declaration in &declarations {
            match declaration {
                Declaration::Function(function) => {
                    let handle = functions::declare_function(&self.context, function.clone())?;
                    self.context
                        .scope
                        .add_function(&function.name, Rc::clone(&handle), &function.position)?;
                    functions.push(handle);
                }
                Declaration::Namespace(namespace) => {
                    let mut members = HashMap::new();
                    for function in &namespace.functions {
                        let handle =
                            functions::declare_function(&self.context, function.clone())?;
                        members.insert(function.name.clone(), handle);
                    }
                    let namespace_ref = Rc::new(RefCell::new(Namespace {
                        name: namespace.name.clone(),
                        functions: members,
                    }));
                    self.context
                        .scope
                        .add_namespace(Rc::clone(&namespace_ref), &namespace.position)?;
                    namespaces.push((namespace.clone(), namespace_ref));
                }
                Declaration::Ffi(ffi) => {
                    let mut methods = HashMap::new();
                    for method in &ffi.methods {
                        let signature = signature_from_declaration(
                            &self.context,
                            &method.parameters,
                            &method.return_type,
                        )?;
                        // FFI methods default to void, they are never
                        // inferred from a body.
                        let signature = match signature.return_type.dereference() {
                            Type::Unset => {
                                FunctionType::new(signature.parameters, Type::Void)
                            }
                            _ => signature,
                        };
                        methods.insert(method.name.clone(), signature);
                    }
                    self.context.scope.add_ffi_namespace(
                        Rc::new(FfiNamespace {
                            name: ffi.name.clone(),
                            methods,
                        }),
                        &ffi.position,
                    )?;
                }
                _ => {}
            }
        }

        // Sweep 4: bodies. Class methods first (so functions can construct
        // and call into classes with final signatures), then functions and
        // namespace members, then static blocks.
        let mut checked_static_blocks: HashMap<usize, Vec<Statement<TypeInformation>>> =
            HashMap::new();
        for (declaration, class_ref) in &classes {
            classes::resolve_class_bodies(&self.context, declaration, class_ref)?;
            if let Some(static_block) = &declaration.static_block {
                let checked =
                    self.check_static_block(class_ref, static_block.clone())?;
                checked_static_blocks.insert(class_ref.borrow().id, checked);
            }
        }
        for handle in &functions {
            functions::infer_function(&self.context, handle)?;
        }
        for (_, namespace_ref) in &namespaces {
            let members = namespace_ref
                .borrow()
                .functions
                .values()
                .cloned()
                .collect::<Vec<_>>();
            for handle in members {
                functions::infer_function(&self.context, &handle)?;
            }
        }

        debug!("module analysis complete");
        self.build_output(declarations, classes, checked_static_blocks)
    }

    fn check_static_block(
        &self,
        class: &ClassRef,
        statements: Vec<Statement<()>>,
    ) -> TypeResult<Vec<Statement<TypeInformation>>> {
        let mut inner = self.context.clone();
        inner.scope.enter_scope();
        inner.active_class = Some(Rc::clone(class));
        inner.in_static_method = true;
        let mut checked = Vec::with_capacity(statements.len());
        for statement in statements {
            checked.push(statement.check(&mut inner, None)?);
        }
        Ok(checked)
    }

    fn build_output(
        self,
        declarations: Ast<()>,
        classes: Vec<(ClassDeclaration<()>, ClassRef)>,
        mut static_blocks: HashMap<usize, Vec<Statement<TypeInformation>>>,
    ) -> TypeResult<CheckedModule> {
        let ctx = &self.context;
        let mut out: Ast<TypeInformation> = vec![];

        for declaration in declarations {
            match declaration {
                Declaration::Function(function) => {
                    let handle = ctx
                        .scope
                        .get_function(&function.name)
                        .expect("function was declared in sweep 3");
                    for checked in checked_function_instances(&handle) {
                        out.push(Declaration::Function(checked));
                    }
                }
                Declaration::Class(class_declaration) => {
                    let (_, class_ref) = classes
                        .iter()
                        .find(|(d, _)| d.name == class_declaration.name)
                        .expect("class was registered in sweep 1");
                    out.push(Declaration::Class(build_checked_class(
                        ctx,
                        class_declaration,
                        class_ref,
                        static_blocks.remove(&class_ref.borrow().id),
                    )));
                }
                Declaration::Interface(interface) => {
                    out.push(Declaration::Interface(interface));
                }
                Declaration::Variant(variant) => out.push(Declaration::Variant(variant)),
                Declaration::Enum(enum_declaration) => {
                    out.push(Declaration::Enum(enum_declaration))
                }
                Declaration::StringEnum(string_enum) => {
                    out.push(Declaration::StringEnum(string_enum))
                }
                Declaration::TypeAlias(alias) => out.push(Declaration::TypeAlias(alias)),
                Declaration::Namespace(namespace) => {
                    let namespace_ref = ctx
                        .scope
                        .get_namespace(&namespace.name)
                        .expect("namespace was declared in sweep 3");
                    let mut checked_functions = vec![];
                    for function in &namespace.functions {
                        let handle = namespace_ref
                            .borrow()
                            .functions
                            .get(&function.name)
                            .cloned()
                            .expect("namespace member was declared");
                        checked_functions.extend(checked_function_instances(&handle));
                    }
                    out.push(Declaration::Namespace(NamespaceDeclaration {
                        name: namespace.name,
                        functions: checked_functions,
                        position: namespace.position,
                    }));
                }
                Declaration::Ffi(ffi) => out.push(Declaration::Ffi(ffi)),
                // Impl blocks are consumed into the classes referencing
                // them; their methods live on those classes.
                Declaration::Impl(_) => {}
            }
        }

        Ok(CheckedModule {
            declarations: out,
            warnings: ctx.take_warnings(),
            lambdas: ctx.shared.lambdas.borrow().clone(),
        })
    }
}

/// A concrete function yields its checked declaration; a generic template
/// yields one checked declaration per monomorphized instance.
fn checked_function_instances(
    handle: &Rc<RefCell<functions::DeclaredFunction>>,
) -> Vec<FunctionDeclaration<TypeInformation>> {
    let function = handle.borrow();
    if function.is_generic() {
        return function
            .monomorphs
            .iter()
            .flat_map(|(_, instance)| checked_function_instances(instance))
            .collect();
    }
    function.checked.clone().into_iter().collect()
}

fn build_checked_class(
    ctx: &Context,
    declaration: ClassDeclaration<()>,
    class: &ClassRef,
    static_block: Option<Vec<Statement<TypeInformation>>>,
) -> ClassDeclaration<TypeInformation> {
    let mut methods: Vec<MethodDeclaration<TypeInformation>> = vec![];
    for method in &class.borrow().all_methods {
        let method = method.borrow();
        let Some(checked_body) = method.checked_body.clone() else {
            continue;
        };
        methods.push(MethodDeclaration {
            name: method.name.clone(),
            generics: vec![],
            parameters: vec![],
            return_type: None,
            body: checked_body,
            is_static: method.is_static,
            is_override: method.is_override,
            position: method.position.clone(),
        });
    }

    ClassDeclaration {
        name: declaration.name,
        super_interfaces: declaration.super_interfaces,
        attributes: declaration.attributes,
        methods,
        impls: declaration.impls,
        static_block,
        info: TypeInformation::new(ctx, Type::Class(Rc::clone(class)), None),
        position: declaration.position,
    }
}

fn resolve_enum(
    ctx: &Context,
    declaration: &crate::ast::EnumDeclaration,
) -> TypeResult<Type> {
    let backing = match &declaration.backing {
        Some(type_name) => match Type::try_from((type_name.clone(), ctx))?.dereference() {
            Type::Basic(kind) if kind.is_integer() => kind,
            other => {
                return Err(TypeCheckError::StructuralViolation(
                    error::StructuralViolation::new(format!(
                        "enums are backed by integer kinds, not '{other:?}'"
                    )),
                    type_name.position(),
                ))
            }
        },
        None => types::BasicKind::U32,
    };

    let mut members = Vec::with_capacity(declaration.members.len());
    let mut next_value = 0i64;
    for member in &declaration.members {
        let value = member.value.unwrap_or(next_value);
        if members.iter().any(|(name, _)| name == &member.name) {
            return Err(TypeCheckError::RedefinedSymbol(
                error::RedefinedSymbol {
                    name: member.name.clone(),
                },
                member.position.clone(),
            ));
        }
        members.push((member.name.clone(), value));
        next_value = value + 1;
    }

    Ok(Type::Enum(types::EnumType {
        name: declaration.name.clone(),
        members,
        backing,
    }))
}

fn at_position(error: TypeCheckError, position: &Location) -> TypeCheckError {
    match error {
        TypeCheckError::RedefinedSymbol(payload, _) => {
            TypeCheckError::RedefinedSymbol(payload, position.clone())
        }
        other => other,
    }
}
