//! Function declaration handling: signature resolution, body inference,
//! declared-vs-inferred return reconciliation and monomorphization of
//! generic functions.
//!
//! Mutually recursive functions go through a per-function `inferring` guard:
//! re-entering a function that is already being inferred simply leaves its
//! current (possibly `Unset`) header in place; the matcher treats `Unset` as
//! a universal match and the final check happens when the function finishes.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::ast::{FunctionBody, FunctionDeclaration, GenericParameter, Parameter};
use crate::location::Location;

use super::context::{CollectedReturn, Context, ReturnContext};
use super::error::{StructuralViolation, TypeCheckError, TypeMismatch};
use super::generics::argument_vector;
use super::matcher::expect_assignable;
use super::types::{
    signature_from_declaration, substitute_function, FunctionType, GenericType, Type,
};
use super::warning::TypeCheckWarning;
use super::{TypeCheckable, TypeInformation, TypeResult};

/// The symbol-table view of a declared function. Generic functions keep
/// their untyped declaration for monomorph cloning; concrete ones carry the
/// checked body after inference.
#[derive(Clone, Debug)]
pub struct DeclaredFunction {
    pub name: String,
    pub declaration: FunctionDeclaration<()>,
    pub generics: Vec<GenericType>,
    pub signature: FunctionType,
    /// The type visible to name resolution; patched once the return type is
    /// reconciled so later call sites observe the final signature.
    pub type_slot: Rc<RefCell<Option<Type>>>,
    pub checked: Option<FunctionDeclaration<TypeInformation>>,
    pub monomorphs: Vec<(Vec<Type>, Rc<RefCell<DeclaredFunction>>)>,
    pub inferring: bool,
}

impl DeclaredFunction {
    pub fn is_generic(&self) -> bool {
        !self.generics.is_empty()
    }

    pub fn function_type(&self) -> Type {
        Type::Function(self.signature.clone())
    }
}

/// Resolve the generic parameter list of a declaration: first bind every
/// placeholder, then resolve constraints (which may refer to other types in
/// scope, but not to each other).
pub fn resolve_generics(
    ctx: &mut Context,
    generics: &[GenericParameter],
) -> TypeResult<Vec<GenericType>> {
    for generic in generics {
        ctx.scope.shadow_type(
            &generic.name,
            Type::Generic(GenericType {
                name: generic.name.clone(),
                constraint: None,
            }),
        );
    }

    let mut resolved = Vec::with_capacity(generics.len());
    for generic in generics {
        let constraint = match &generic.constraint {
            Some(type_name) => Some(Box::new(Type::try_from((type_name.clone(), &*ctx))?)),
            None => None,
        };
        let generic_type = GenericType {
            name: generic.name.clone(),
            constraint,
        };
        ctx.scope
            .shadow_type(&generic.name, Type::Generic(generic_type.clone()));
        resolved.push(generic_type);
    }
    Ok(resolved)
}

/// Build the `DeclaredFunction` for a parsed declaration. Signature types
/// resolve in a child scope where the generics are bound as placeholders.
pub fn declare_function(
    ctx: &Context,
    declaration: FunctionDeclaration<()>,
) -> TypeResult<Rc<RefCell<DeclaredFunction>>> {
    let mut inner = ctx.clone();
    inner.scope.enter_scope();
    let generics = resolve_generics(&mut inner, &declaration.generics)?;
    let signature =
        signature_from_declaration(&inner, &declaration.parameters, &declaration.return_type)?;

    for parameter in &signature.parameters {
        if matches!(parameter.type_id.dereference(), Type::Union(_)) {
            return Err(TypeCheckError::StructuralViolation(
                StructuralViolation::new(
                    "union types are only valid inside generic constraints",
                ),
                declaration.position.clone(),
            ));
        }
    }

    let function = DeclaredFunction {
        name: declaration.name.clone(),
        type_slot: Rc::new(RefCell::new(Some(Type::Function(signature.clone())))),
        generics,
        signature,
        declaration,
        checked: None,
        monomorphs: vec![],
        inferring: false,
    };
    Ok(Rc::new(RefCell::new(function)))
}

/// Bind parameters into a fresh function scope and hand back the bindings
/// for usage tracking.
fn bind_parameters(
    ctx: &mut Context,
    parameters: &[Parameter],
    signature: &FunctionType,
) -> Vec<(String, Location, Rc<std::cell::Cell<bool>>)> {
    let mut tracked = Vec::with_capacity(parameters.len());
    for (parameter, resolved) in parameters.iter().zip(signature.parameters.iter()) {
        let stored = ctx.scope.add_tracked_variable(
            &parameter.name,
            Rc::new(RefCell::new(Some(resolved.type_id.clone()))),
            resolved.mutable,
            parameter.position.clone(),
        );
        tracked.push((parameter.name.clone(), parameter.position.clone(), stored.used));
    }
    tracked
}

/// Infer the body of a concrete function and reconcile its return type.
/// Generic functions are only inferred through their monomorphs.
pub fn infer_function(ctx: &Context, handle: &Rc<RefCell<DeclaredFunction>>) -> TypeResult<()> {
    {
        let function = handle.borrow();
        if function.inferring || function.checked.is_some() || function.is_generic() {
            return Ok(());
        }
    }
    handle.borrow_mut().inferring = true;
    let result = infer_function_inner(ctx, handle, &HashMap::new());
    handle.borrow_mut().inferring = false;
    result
}

fn infer_function_inner(
    ctx: &Context,
    handle: &Rc<RefCell<DeclaredFunction>>,
    substitution: &HashMap<String, Type>,
) -> TypeResult<()> {
    let (declaration, signature) = {
        let function = handle.borrow();
        (function.declaration.clone(), function.signature.clone())
    };
    debug!("inferring function '{}'", declaration.name);

    let mut inner = ctx.clone();
    inner.scope.enter_scope();
    inner.within_loop = false;
    inner.within_coroutine = false;
    inner.yield_hint = None;
    for (name, concrete) in substitution {
        inner.scope.shadow_type(name, concrete.clone());
    }

    let tracked = bind_parameters(&mut inner, &declaration.parameters, &signature);

    let declared = match &*signature.return_type {
        Type::Unset => None,
        other => Some(other.clone()),
    };
    let return_context = ReturnContext {
        declared: declared.clone(),
        collected: Rc::new(RefCell::new(vec![])),
    };
    inner.return_context = Some(return_context.clone());

    let checked_body = check_function_body(&mut inner, declaration.body.clone(), &declared)?;

    let collected = return_context.collected.borrow().clone();
    let return_type = reconcile_return_type(
        &inner,
        &signature.return_type,
        &checked_body,
        &collected,
        &declaration.position,
    )?;

    for (name, position, used) in tracked {
        if !used.get() {
            inner.warn(TypeCheckWarning::UnusedParameter { name, position });
        }
    }

    {
        let mut function = handle.borrow_mut();
        function.signature.return_type = Box::new(return_type);
        let final_type = Type::Function(function.signature.clone());
        *function.type_slot.borrow_mut() = Some(final_type);

        let mut checked = declaration;
        let body = checked_body;
        function.checked = Some(FunctionDeclaration {
            name: checked.name.clone(),
            generics: std::mem::take(&mut checked.generics),
            parameters: std::mem::take(&mut checked.parameters),
            return_type: checked.return_type.clone(),
            body,
            info: TypeInformation {
                type_id: Rc::clone(&function.type_slot),
                hint: Rc::new(RefCell::new(None)),
                constant: true,
                context: ctx.clone(),
            },
            position: checked.position.clone(),
        });
    }

    Ok(())
}

/// Check a function body, driving statement inference (block form) or
/// expression inference with the declared return as hint (expression form).
pub fn check_function_body(
    ctx: &mut Context,
    body: FunctionBody<()>,
    declared: &Option<Type>,
) -> TypeResult<FunctionBody<TypeInformation>> {
    match body {
        FunctionBody::Block(statements) => {
            let mut checked = Vec::with_capacity(statements.len());
            for statement in statements {
                checked.push(statement.check(ctx, None)?);
            }
            Ok(FunctionBody::Block(checked))
        }
        FunctionBody::Expression(expression) => {
            let hint = match declared {
                Some(Type::Void) | None => None,
                Some(other) => Some(other.clone()),
            };
            // Tuple construction is legal in an expression-form body, which
            // is a return position.
            let checked = match *expression {
                crate::ast::Expression::Tuple(tuple) => crate::ast::Expression::Tuple(
                    crate::typechecker::typed_ast::expression::check_tuple_construction(
                        ctx,
                        tuple,
                        hint.as_ref(),
                    )?,
                ),
                other => other.check(ctx, hint.as_ref())?,
            };
            if matches!(declared, Some(Type::Void)) {
                // Expression result is discarded; leave a void hint for the
                // code generator.
                *checked.get_info().hint.borrow_mut() = Some(Type::Void);
            }
            Ok(FunctionBody::Expression(Box::new(checked)))
        }
    }
}

/// The reconciliation rules of declared vs inferred return types.
pub fn reconcile_return_type(
    ctx: &Context,
    declared: &Type,
    body: &FunctionBody<TypeInformation>,
    collected: &[CollectedReturn],
    position: &Location,
) -> TypeResult<Type> {
    let expression_type = match body {
        FunctionBody::Expression(expression) => expression.get_info().type_id.borrow().clone(),
        FunctionBody::Block(_) => None,
    };

    match declared {
        Type::Unset => {
            if let Some(expression_type) = expression_type {
                return Ok(settle_literal(expression_type));
            }
            if collected.is_empty() {
                return Ok(Type::Void);
            }
            let any_void = collected
                .iter()
                .any(|r| matches!(r.type_id.dereference(), Type::Void));
            if any_void {
                for collected_return in collected {
                    if !matches!(
                        collected_return.type_id.dereference(),
                        Type::Void | Type::Unreachable
                    ) {
                        return Err(TypeCheckError::TypeMismatch(
                            TypeMismatch {
                                expected: Type::Void,
                                actual: collected_return.type_id.clone(),
                                detail: Some(
                                    "either all returns carry a value or none do".to_string(),
                                ),
                            },
                            collected_return.position.clone(),
                        ));
                    }
                }
                return Ok(Type::Void);
            }
            let types = collected
                .iter()
                .map(|r| r.type_id.clone())
                .collect::<Vec<_>>();
            match super::unify::find_compatible_types(ctx, &types) {
                Some(unified) => Ok(settle_literal(unified)),
                None => Err(TypeCheckError::TypeMismatch(
                    TypeMismatch {
                        expected: types[0].clone(),
                        actual: types[types.len() - 1].clone(),
                        detail: Some("return statements disagree on a common type".to_string()),
                    },
                    position.clone(),
                )),
            }
        }
        Type::Void => {
            for collected_return in collected {
                if !matches!(
                    collected_return.type_id.dereference(),
                    Type::Void | Type::Unreachable
                ) {
                    return Err(TypeCheckError::TypeMismatch(
                        TypeMismatch {
                            expected: Type::Void,
                            actual: collected_return.type_id.clone(),
                            detail: Some("this function does not return a value".to_string()),
                        },
                        collected_return.position.clone(),
                    ));
                }
            }
            Ok(Type::Void)
        }
        other => {
            for collected_return in collected {
                expect_assignable(
                    ctx,
                    other,
                    &collected_return.type_id,
                    false,
                    &collected_return.position,
                )?;
                *collected_return.hint_slot.borrow_mut() = Some(other.clone());
            }
            Ok(other.clone())
        }
    }
}

/// An inferred type that is still a literal settles to its storage kind when
/// it becomes a function's return type.
fn settle_literal(type_id: Type) -> Type {
    match type_id {
        Type::LiteralInt(kind) => Type::Basic(kind),
        other => other,
    }
}

/// Instantiate a generic function for a concrete substitution, reusing the
/// cached instance for an equal positional argument vector.
pub fn instantiate_function(
    ctx: &Context,
    handle: &Rc<RefCell<DeclaredFunction>>,
    substitution: &HashMap<String, Type>,
    position: &Location,
) -> TypeResult<Rc<RefCell<DeclaredFunction>>> {
    let (generics, name) = {
        let function = handle.borrow();
        (function.generics.clone(), function.name.clone())
    };
    let vector = argument_vector(&generics, substitution);

    if let Some((_, instance)) = handle
        .borrow()
        .monomorphs
        .iter()
        .find(|(cached, _)| cached.as_slice() == vector.as_slice())
    {
        return Ok(Rc::clone(instance));
    }

    debug!("monomorphizing '{name}' for {vector:?}");

    let instance = {
        let function = handle.borrow();
        let signature = substitute_function(&function.signature, substitution, ctx)?;
        let instance_name = format!(
            "{name}<{}>",
            vector
                .iter()
                .map(|t| format!("{t:?}"))
                .collect::<Vec<_>>()
                .join(", ")
        );
        DeclaredFunction {
            name: instance_name,
            type_slot: Rc::new(RefCell::new(Some(Type::Function(signature.clone())))),
            generics: vec![],
            signature,
            declaration: function.declaration.clone(),
            checked: None,
            monomorphs: vec![],
            inferring: false,
        }
    };
    let instance = Rc::new(RefCell::new(instance));
    handle
        .borrow_mut()
        .monomorphs
        .push((vector, Rc::clone(&instance)));

    instance.borrow_mut().inferring = true;
    let result = infer_function_inner(ctx, &instance, substitution);
    instance.borrow_mut().inferring = false;
    result?;

    Ok(instance)
}
