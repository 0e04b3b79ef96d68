//! Class and interface resolution, and signature-directed method lookup.
//!
//! Classes resolve in two sweeps: headers first (attributes and method
//! signatures, so mutually recursive classes can see each other), then
//! bodies (method inference, override replacement, required-method coverage,
//! duplicate detection and operator-overload validation).

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::debug;

use crate::ast::{ClassDeclaration, ImplDeclaration, InterfaceDeclaration, MethodDeclaration};
use crate::location::Location;

use super::context::{Context, ReturnContext};
use super::error::{
    AmbiguousCall, ClassResolutionError, TypeCheckError, TypeMismatch, UndefinedVariable,
};
use super::functions::{check_function_body, reconcile_return_type, resolve_generics};
use super::generics::{argument_vector, build_substitution};
use super::matcher::match_types;
use super::operators::{slot_arity, slot_must_return_bool, INIT_METHOD, OPERATOR_METHOD_NAMES};
use super::types::{
    signature_from_declaration, substitute_function, ClassAttribute, ClassMethod, ClassRef,
    ClassType, FunctionType, InterfaceType, MethodSignature, Type,
};
use super::warning::TypeCheckWarning;
use super::TypeResult;

fn class_error(class: &str, detail: impl ToString, position: &Location) -> TypeCheckError {
    TypeCheckError::ClassResolution(
        ClassResolutionError {
            class_name: class.to_string(),
            detail: detail.to_string(),
        },
        position.clone(),
    )
}

/// Create the nominal identity for a declared class. Runs during symbol
/// registration so that every later type mention shares this identity.
pub fn construct_class(ctx: &Context, declaration: &ClassDeclaration<()>) -> ClassRef {
    Rc::new(RefCell::new(ClassType {
        id: ctx.next_class_id(),
        name: declaration.name.clone(),
        attributes: vec![],
        methods: vec![],
        all_methods: vec![],
        super_interfaces: vec![],
        resolving: false,
        resolved: false,
        position: declaration.position.clone(),
    }))
}

fn method_from_declaration(
    ctx: &Context,
    declaration: &MethodDeclaration<()>,
    is_external: bool,
) -> TypeResult<ClassMethod> {
    let mut inner = ctx.clone();
    inner.scope.enter_scope();
    let generics = resolve_generics(&mut inner, &declaration.generics)?;
    let signature =
        signature_from_declaration(&inner, &declaration.parameters, &declaration.return_type)?;

    Ok(ClassMethod {
        name: declaration.name.clone(),
        signature,
        generics,
        body: declaration.body.clone(),
        checked_body: None,
        is_static: declaration.is_static,
        is_override: declaration.is_override,
        is_external,
        inferring: false,
        index_in_class: None,
        source_method: None,
        monomorphs: vec![],
        position: declaration.position.clone(),
    })
}

/// Header resolution: super-interfaces, attribute types, impl coverage and
/// every method signature. No bodies are inferred here.
pub fn resolve_class_header(
    ctx: &Context,
    declaration: &ClassDeclaration<()>,
    class: &ClassRef,
    impls: &HashMap<String, ImplDeclaration<()>>,
) -> TypeResult<()> {
    {
        let class = class.borrow();
        if class.resolving || class.resolved {
            return Ok(());
        }
    }
    class.borrow_mut().resolving = true;
    debug!("resolving class header '{}'", declaration.name);

    let mut super_interfaces = Vec::with_capacity(declaration.super_interfaces.len());
    for super_type in &declaration.super_interfaces {
        let resolved = Type::try_from((super_type.clone(), ctx))?;
        match resolved.dereference() {
            Type::Interface(_) | Type::Join(_) => super_interfaces.push(resolved),
            other => {
                return Err(class_error(
                    &declaration.name,
                    format!("'{other:?}' is not an interface"),
                    &super_type.position(),
                ))
            }
        }
    }

    let mut attributes: Vec<ClassAttribute> = Vec::with_capacity(declaration.attributes.len());
    for attribute in &declaration.attributes {
        if attribute.name == INIT_METHOD {
            return Err(class_error(
                &declaration.name,
                "'init' is reserved for the constructor method",
                &attribute.position,
            ));
        }
        if attributes.iter().any(|a| a.name == attribute.name) {
            return Err(class_error(
                &declaration.name,
                format!("duplicate attribute '{}'", attribute.name),
                &attribute.position,
            ));
        }
        attributes.push(ClassAttribute {
            name: attribute.name.clone(),
            type_id: Type::try_from((attribute.type_name.clone(), ctx))?,
            is_static: attribute.is_static,
            position: attribute.position.clone(),
        });
    }

    let mut methods: Vec<Rc<RefCell<ClassMethod>>> = vec![];
    for method in &declaration.methods {
        methods.push(Rc::new(RefCell::new(method_from_declaration(
            ctx, method, false,
        )?)));
    }

    // Pull in method groups from impl blocks; required attributes must be
    // covered by name and type.
    for impl_reference in &declaration.impls {
        let Some(implementation) = impls.get(&impl_reference.name) else {
            return Err(class_error(
                &declaration.name,
                format!("unknown implementation '{}'", impl_reference.name),
                &impl_reference.position,
            ));
        };
        for (required_name, required_type) in &implementation.required_attributes {
            let required_type = Type::try_from((required_type.clone(), ctx))?;
            let Some(attribute) = attributes.iter().find(|a| a.name == *required_name) else {
                return Err(class_error(
                    &declaration.name,
                    format!(
                        "implementation '{}' requires attribute '{required_name}'",
                        impl_reference.name
                    ),
                    &impl_reference.position,
                ));
            };
            if match_types(ctx, &required_type, &attribute.type_id, true).is_err() {
                return Err(class_error(
                    &declaration.name,
                    format!(
                        "attribute '{required_name}' has type '{:?}', implementation '{}' requires '{required_type:?}'",
                        attribute.type_id, impl_reference.name
                    ),
                    &attribute.position,
                ));
            }
        }
        for method in &implementation.methods {
            methods.push(Rc::new(RefCell::new(method_from_declaration(
                ctx, method, true,
            )?)));
        }
    }

    // Constructor rules: non-static, non-generic, void (or still unset,
    // promoted to void).
    let mut init_count = 0;
    for method in &methods {
        let mut method = method.borrow_mut();
        if method.name != INIT_METHOD {
            continue;
        }
        init_count += 1;
        if method.is_static {
            return Err(class_error(
                &declaration.name,
                "'init' can not be static",
                &method.position,
            ));
        }
        if method.is_generic() {
            return Err(class_error(
                &declaration.name,
                "'init' can not be generic",
                &method.position,
            ));
        }
        match method.signature.return_type.dereference() {
            Type::Void => {}
            Type::Unset => method.signature.return_type = Box::new(Type::Void),
            other => {
                return Err(class_error(
                    &declaration.name,
                    format!("'init' must return void, not '{other:?}'"),
                    &method.position,
                ));
            }
        }
    }
    if init_count > 1 {
        return Err(class_error(
            &declaration.name,
            "at most one 'init' method is allowed",
            &declaration.position,
        ));
    }
    if init_count == 0 && attributes.iter().any(|a| !a.is_static) {
        ctx.warn(TypeCheckWarning::MissingInitMethod {
            class_name: declaration.name.clone(),
            position: declaration.position.clone(),
        });
    }

    {
        let mut class = class.borrow_mut();
        class.super_interfaces = super_interfaces;
        class.attributes = attributes;
        class.methods = methods;
        class.resolving = false;
    }
    Ok(())
}

/// Body resolution: infer every method, replace overridden external
/// methods, check required-method coverage and duplicates, validate
/// operator overloads, enumerate concrete methods.
pub fn resolve_class_bodies(
    ctx: &Context,
    declaration: &ClassDeclaration<()>,
    class: &ClassRef,
) -> TypeResult<()> {
    if class.borrow().resolved {
        return Ok(());
    }
    debug!("resolving class bodies of '{}'", declaration.name);

    let methods = class.borrow().methods.clone();
    for method in &methods {
        if method.borrow().is_generic() {
            // Generic methods are only inferred through their monomorphs.
            continue;
        }
        infer_method_body(ctx, class, method, &HashMap::new())?;
    }

    // Overrides replace exactly one external method with a strictly equal
    // signature.
    let mut replaced = class.borrow().methods.clone();
    for method in &methods {
        let (is_override, name, signature, position) = {
            let m = method.borrow();
            (
                m.is_override,
                m.name.clone(),
                m.signature.clone(),
                m.position.clone(),
            )
        };
        if !is_override {
            continue;
        }
        let matching = replaced
            .iter()
            .filter(|candidate| {
                let candidate = candidate.borrow();
                candidate.is_external
                    && candidate.name == name
                    && parameters_equal(&candidate.signature, &signature)
            })
            .cloned()
            .collect::<Vec<_>>();
        if matching.len() != 1 {
            return Err(class_error(
                &class.borrow().name,
                format!(
                    "override '{name}' must match exactly one external method, found {}",
                    matching.len()
                ),
                &position,
            ));
        }
        replaced.retain(|candidate| !Rc::ptr_eq(candidate, &matching[0]));
    }
    class.borrow_mut().methods = replaced;

    check_required_methods(class, declaration)?;
    check_duplicate_methods(class)?;
    validate_operator_overloads(ctx, class)?;

    let methods = class.borrow().methods.clone();
    {
        let mut class = class.borrow_mut();
        for method in &methods {
            if !method.borrow().is_generic() {
                class.enumerate_method(method);
            }
        }
        class.resolved = true;
    }
    Ok(())
}

fn parameters_equal(a: &FunctionType, b: &FunctionType) -> bool {
    a.parameters.len() == b.parameters.len()
        && a.parameters
            .iter()
            .zip(b.parameters.iter())
            .all(|(x, y)| x.mutable == y.mutable && x.type_id == y.type_id)
}

fn check_required_methods(
    class: &ClassRef,
    declaration: &ClassDeclaration<()>,
) -> TypeResult<()> {
    let super_interfaces = class.borrow().super_interfaces.clone();
    let methods = class.borrow().methods.clone();

    for super_interface in &super_interfaces {
        let Some(interface) = super::matcher::as_interface(super_interface) else {
            continue;
        };
        for required in interface.all_methods() {
            let covered = methods.iter().any(|method| {
                let method = method.borrow();
                !method.is_static
                    && !method.is_generic()
                    && method.name == required.name
                    && Type::Function(method.signature.clone())
                        == Type::Function(required.signature.clone())
            });
            if !covered {
                return Err(class_error(
                    &class.borrow().name,
                    format!(
                        "method '{}' required by '{super_interface:?}' is missing",
                        required.name
                    ),
                    &declaration.position,
                ));
            }
        }
    }
    Ok(())
}

fn check_duplicate_methods(class: &ClassRef) -> TypeResult<()> {
    let methods = class.borrow().methods.clone();
    for (index, method) in methods.iter().enumerate() {
        let method = method.borrow();
        if method.is_generic() {
            continue;
        }
        for other in methods.iter().skip(index + 1) {
            let other = other.borrow();
            if other.is_generic() {
                continue;
            }
            if method.name == other.name && parameters_equal(&method.signature, &other.signature)
            {
                return Err(class_error(
                    &class.borrow().name,
                    format!("duplicate method '{}'", method.name),
                    &other.position,
                ));
            }
        }
    }
    Ok(())
}

fn validate_operator_overloads(ctx: &Context, class: &ClassRef) -> TypeResult<()> {
    let methods = class.borrow().methods.clone();
    for method in methods {
        let method = method.borrow();
        let name = method.name.as_str();
        if !OPERATOR_METHOD_NAMES.contains(&name) {
            continue;
        }
        if method.is_static || method.is_generic() {
            return Err(class_error(
                &class.borrow().name,
                format!("operator method '{name}' must be a plain instance method"),
                &method.position,
            ));
        }
        if let Some(arity) = slot_arity(name) {
            if method.signature.parameters.len() != arity {
                return Err(class_error(
                    &class.borrow().name,
                    format!("operator method '{name}' takes {arity} parameter(s)"),
                    &method.position,
                ));
            }
        }
        if slot_must_return_bool(name)
            && match_types(ctx, &Type::Boolean, &method.signature.return_type, true).is_err()
        {
            return Err(class_error(
                &class.borrow().name,
                format!("operator method '{name}' must return bool"),
                &method.position,
            ));
        }
    }
    Ok(())
}

/// Infer one method body in the class's context, reconciling its return
/// type. Also used for monomorphized instances (with the substitution bound
/// into scope).
pub fn infer_method_body(
    ctx: &Context,
    class: &ClassRef,
    method: &Rc<RefCell<ClassMethod>>,
    substitution: &HashMap<String, Type>,
) -> TypeResult<()> {
    let (signature, body, is_static, name, position) = {
        let method_ref = method.borrow();
        // Re-entry on a method already being inferred leaves its current
        // (possibly unset) header in place; the matcher treats that as a
        // universal match until inference completes.
        if method_ref.checked_body.is_some() || method_ref.inferring {
            return Ok(());
        }
        (
            method_ref.signature.clone(),
            method_ref.body.clone(),
            method_ref.is_static,
            method_ref.name.clone(),
            method_ref.position.clone(),
        )
    };
    method.borrow_mut().inferring = true;
    let result = infer_method_body_inner(
        ctx,
        class,
        method,
        substitution,
        signature,
        body,
        is_static,
        name,
        position,
    );
    method.borrow_mut().inferring = false;
    result
}

#[allow(clippy::too_many_arguments)]
fn infer_method_body_inner(
    ctx: &Context,
    class: &ClassRef,
    method: &Rc<RefCell<ClassMethod>>,
    substitution: &HashMap<String, Type>,
    signature: FunctionType,
    body: crate::ast::FunctionBody<()>,
    is_static: bool,
    name: String,
    position: Location,
) -> TypeResult<()> {
    let mut inner = ctx.clone();
    inner.scope.enter_scope();
    inner.active_class = Some(Rc::clone(class));
    inner.active_method = Some(name);
    inner.in_static_method = is_static;
    inner.within_loop = false;
    inner.within_coroutine = false;
    inner.yield_hint = None;
    for (generic_name, concrete) in substitution {
        inner.scope.shadow_type(generic_name, concrete.clone());
    }

    for parameter in &signature.parameters {
        inner.scope.add_variable(
            &parameter.name,
            Rc::new(RefCell::new(Some(parameter.type_id.clone()))),
            parameter.mutable,
            false,
            position.clone(),
        );
    }

    let declared = match &*signature.return_type {
        Type::Unset => None,
        other => Some(other.clone()),
    };
    let return_context = ReturnContext {
        declared: declared.clone(),
        collected: Rc::new(RefCell::new(vec![])),
    };
    inner.return_context = Some(return_context.clone());

    let checked_body = check_function_body(&mut inner, body, &declared)?;
    let collected = return_context.collected.borrow().clone();
    let return_type = reconcile_return_type(
        &inner,
        &signature.return_type,
        &checked_body,
        &collected,
        &position,
    )?;

    {
        let mut method = method.borrow_mut();
        method.signature.return_type = Box::new(return_type);
        method.checked_body = Some(checked_body);
    }
    Ok(())
}

/// Instantiate a generic method for a concrete substitution. The instance
/// is cached on the template, enumerated on the class with a stable index,
/// and back-linked to its template.
pub fn instantiate_method(
    ctx: &Context,
    class: &ClassRef,
    template: &Rc<RefCell<ClassMethod>>,
    substitution: &HashMap<String, Type>,
    _position: &Location,
) -> TypeResult<Rc<RefCell<ClassMethod>>> {
    let generics = template.borrow().generics.clone();
    let vector = argument_vector(&generics, substitution);

    if let Some((_, instance)) = template
        .borrow()
        .monomorphs
        .iter()
        .find(|(cached, _)| cached.as_slice() == vector.as_slice())
    {
        return Ok(Rc::clone(instance));
    }

    debug!(
        "monomorphizing method '{}' of '{}' for {vector:?}",
        template.borrow().name,
        class.borrow().name
    );

    let instance = {
        let template_ref = template.borrow();
        ClassMethod {
            name: template_ref.name.clone(),
            signature: substitute_function(&template_ref.signature, substitution, ctx)?,
            generics: vec![],
            body: template_ref.body.clone(),
            checked_body: None,
            is_static: template_ref.is_static,
            is_override: template_ref.is_override,
            is_external: template_ref.is_external,
            inferring: false,
            index_in_class: None,
            source_method: Some(Rc::downgrade(template)),
            monomorphs: vec![],
            position: template_ref.position.clone(),
        }
    };
    let instance = Rc::new(RefCell::new(instance));
    template
        .borrow_mut()
        .monomorphs
        .push((vector, Rc::clone(&instance)));

    infer_method_body(ctx, class, &instance, substitution)?;
    class.borrow_mut().enumerate_method(&instance);

    Ok(instance)
}

/// Whether a signature accepts the argument types (and the return hint)
/// under the given mode.
fn signature_matches(
    ctx: &Context,
    signature: &FunctionType,
    arg_types: &[Type],
    return_hint: Option<&Type>,
    strict: bool,
) -> bool {
    if signature.parameters.len() != arg_types.len() {
        return false;
    }
    for (parameter, arg) in signature.parameters.iter().zip(arg_types.iter()) {
        if match_types(ctx, &parameter.type_id, arg, strict).is_err() {
            return false;
        }
    }
    if let Some(return_hint) = return_hint {
        if match_types(ctx, return_hint, &signature.return_type, strict).is_err() {
            return false;
        }
    }
    true
}

/// Signature-directed method search on a class: strict matches first, lax
/// as a fallback. Generic methods are instantiated (through extraction or
/// explicit type arguments) and their concrete instances returned. The
/// caller reports zero candidates (unknown) or more than one (ambiguous).
pub fn find_class_methods(
    ctx: &Context,
    class: &ClassRef,
    name: &str,
    arg_types: &[Type],
    return_hint: Option<&Type>,
    explicit_type_args: &[Type],
    want_static: bool,
    position: &Location,
) -> TypeResult<Vec<Rc<RefCell<ClassMethod>>>> {
    let named = class
        .borrow()
        .methods_named(name)
        .into_iter()
        .filter(|m| m.borrow().is_static == want_static)
        .collect::<Vec<_>>();

    // A candidate whose return type is still being inferred resolves on
    // demand, so later call sites see the final signature.
    for candidate in &named {
        let needs_inference = {
            let candidate = candidate.borrow();
            !candidate.is_generic()
                && candidate.checked_body.is_none()
                && matches!(*candidate.signature.return_type, Type::Unset)
        };
        if needs_inference {
            infer_method_body(ctx, class, candidate, &HashMap::new())?;
        }
    }

    for strict in [true, false] {
        let mut found = Vec::new();
        for candidate in &named {
            let (is_generic, signature, generics) = {
                let c = candidate.borrow();
                (c.is_generic(), c.signature.clone(), c.generics.clone())
            };

            if !is_generic {
                if signature_matches(ctx, &signature, arg_types, return_hint, strict) {
                    found.push(Rc::clone(candidate));
                }
                continue;
            }

            if explicit_type_args.is_empty() && signature.parameters.len() != arg_types.len() {
                continue;
            }
            let substitution = match build_substitution(
                ctx,
                name,
                &generics,
                &signature.parameter_types(),
                arg_types,
                explicit_type_args,
                position,
            ) {
                Ok(substitution) => substitution,
                Err(_) => continue,
            };
            let substituted = substitute_function(&signature, &substitution, ctx)?;
            if signature_matches(ctx, &substituted, arg_types, return_hint, strict) {
                let instance = instantiate_method(ctx, class, candidate, &substitution, position)?;
                found.push(instance);
            }
        }
        if !found.is_empty() {
            return Ok(found);
        }
    }

    Ok(vec![])
}

/// The interface analogue of `find_class_methods`.
pub fn find_interface_methods(
    ctx: &Context,
    interface: &InterfaceType,
    name: &str,
    arg_types: &[Type],
    return_hint: Option<&Type>,
) -> Vec<MethodSignature> {
    let named = interface.find_methods(name);
    for strict in [true, false] {
        let found = named
            .iter()
            .filter(|m| signature_matches(ctx, &m.signature, arg_types, return_hint, strict))
            .cloned()
            .collect::<Vec<_>>();
        if !found.is_empty() {
            return found;
        }
    }
    vec![]
}

/// Report a method search outcome at a call site: exactly one survivor or a
/// diagnostic.
pub fn expect_single_candidate<T>(
    mut candidates: Vec<T>,
    name: &str,
    position: &Location,
) -> TypeResult<T> {
    match candidates.len() {
        0 => Err(TypeCheckError::UndefinedVariable(
            UndefinedVariable {
                variable_name: name.to_string(),
            },
            position.clone(),
        )),
        1 => Ok(candidates.remove(0)),
        count => Err(TypeCheckError::AmbiguousCall(
            AmbiguousCall {
                name: name.to_string(),
                candidates: count,
            },
            position.clone(),
        )),
    }
}

/// Resolve an interface declaration into its structural type. The alias
/// slot trick (register first, fill later) lets mutually recursive
/// interfaces reference each other by name.
pub fn resolve_interface(
    ctx: &Context,
    declaration: &InterfaceDeclaration,
) -> TypeResult<InterfaceType> {
    let mut required = Vec::with_capacity(declaration.super_interfaces.len());
    for super_type in &declaration.super_interfaces {
        required.push(Type::try_from((super_type.clone(), ctx))?);
    }

    let mut methods: Vec<MethodSignature> = Vec::with_capacity(declaration.methods.len());
    for method in &declaration.methods {
        if methods.iter().any(|m| m.name == method.name) {
            return Err(TypeCheckError::ClassResolution(
                ClassResolutionError {
                    class_name: declaration.name.clone(),
                    detail: format!("duplicate interface method '{}'", method.name),
                },
                method.position.clone(),
            ));
        }
        let signature =
            signature_from_declaration(ctx, &method.parameters, &method.return_type)?;
        let signature = match signature.return_type.dereference() {
            // An interface method with no annotation returns void.
            Type::Unset => FunctionType::new(signature.parameters, Type::Void),
            _ => signature,
        };
        methods.push(MethodSignature {
            name: method.name.clone(),
            signature,
        });
    }

    Ok(InterfaceType::new(
        Some(declaration.name.clone()),
        methods,
        required,
    ))
}

/// Zero-or-one matching `init` method for `new C(args)`; argument hints are
/// the init's parameter types.
pub fn resolve_init(
    ctx: &Context,
    class: &ClassRef,
    arg_types: &[Type],
    position: &Location,
) -> TypeResult<Option<Rc<RefCell<ClassMethod>>>> {
    let candidates = find_class_methods(
        ctx,
        class,
        INIT_METHOD,
        arg_types,
        None,
        &[],
        false,
        position,
    )?;
    match candidates.len() {
        0 => {
            let has_init = class
                .borrow()
                .methods
                .iter()
                .any(|m| m.borrow().name == INIT_METHOD);
            if has_init {
                // An init exists but the arguments do not fit it.
                let init = class
                    .borrow()
                    .methods_named(INIT_METHOD)
                    .first()
                    .cloned()
                    .expect("just observed an init method");
                let signature = init.borrow().signature.clone();
                return Err(TypeCheckError::TypeMismatch(
                    TypeMismatch {
                        expected: Type::Function(signature),
                        actual: Type::Tuple(arg_types.to_vec()),
                        detail: Some("arguments do not match 'init'".to_string()),
                    },
                    position.clone(),
                ));
            }
            Ok(None)
        }
        1 => Ok(Some(candidates.into_iter().next().expect("just checked"))),
        count => Err(TypeCheckError::AmbiguousCall(
            AmbiguousCall {
                name: INIT_METHOD.to_string(),
                candidates: count,
            },
            position.clone(),
        )),
    }
}
