//! Calls, indexing and member access.
//!
//! Call resolution goes by the shape of the callee: method calls on class
//! and interface receivers, static dispatch through meta types, variant
//! construction, namespace and FFI qualification, and finally plain
//! function values. The chosen callee (or operator overload) is recorded on
//! the node for code generation.

use std::rc::Rc;

use crate::ast::{Expression, Id, Postfix};
use crate::location::Location;
use crate::typechecker::classes::{
    expect_single_candidate, find_class_methods, find_interface_methods,
};
use crate::typechecker::context::Context;
use crate::typechecker::error::{
    AmbiguousCall, ArityMismatch, ImmutableAssignment, StructuralViolation, TypeCheckError,
    TypeMismatch, UndefinedVariable,
};
use crate::typechecker::functions::{infer_function, instantiate_function};
use crate::typechecker::generics::build_substitution;
use crate::typechecker::matcher::expect_assignable;
use crate::typechecker::operators::{
    resolve_operator_overload, CALL, INDEX, REVERSE_INDEX,
};
use crate::typechecker::scope::TypeSymbol;
use crate::typechecker::types::{BasicKind, FunctionType, ResolvedCallee, Type};
use crate::typechecker::{
    confirm_hint, TypeCheckable, TypeInformation, TypeResult, TypedConstruct,
};

impl TypeCheckable for Postfix<()> {
    type Typed = Postfix<TypeInformation>;

    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        match self {
            Postfix::Call {
                expr,
                type_args,
                args,
                position,
                ..
            } => check_call(ctx, *expr, type_args, args, position, hint),
            Postfix::Index {
                expr,
                index,
                reverse,
                position,
                ..
            } => check_index(ctx, *expr, *index, reverse, position, hint),
            Postfix::MemberAccess {
                expr,
                member,
                nullable,
                position,
                ..
            } => check_member_access(ctx, *expr, member, nullable, position, hint),
        }
    }
}

/// An identifier that names no variable may qualify a namespace, an FFI
/// group or a type; variables always shadow those readings.
fn unshadowed_name<'a>(ctx: &Context, expr: &'a Expression<()>) -> Option<&'a str> {
    match expr {
        Expression::Id(id)
            if id.type_args.is_empty() && ctx.scope.resolve_variable(&id.name).is_none() =>
        {
            Some(&id.name)
        }
        _ => None,
    }
}

/// The qualifier identifier of a namespace access is not a value; it is
/// annotated void.
fn qualifier_id(ctx: &Context, id: Id<()>) -> Id<TypeInformation> {
    Id {
        name: id.name,
        type_args: vec![],
        info: TypeInformation::new(ctx, Type::Void, None),
        position: id.position,
    }
}

fn typed_member(ctx: &Context, id: Id<()>, type_id: Type) -> Id<TypeInformation> {
    Id {
        name: id.name,
        type_args: vec![],
        info: TypeInformation::new(ctx, type_id, None),
        position: id.position,
    }
}

// ---------------------------------------------------------------------------
// member access
// ---------------------------------------------------------------------------

fn check_member_access(
    ctx: &mut Context,
    object: Expression<()>,
    member: Id<()>,
    nullable: bool,
    position: Location,
    hint: Option<&Type>,
) -> TypeResult<Postfix<TypeInformation>> {
    // Namespace, FFI and enum qualifiers resolve without treating the
    // object as a value.
    if let Some(name) = unshadowed_name(ctx, &object) {
        if let Some(namespace) = ctx.scope.get_namespace(name) {
            let Some(function) = namespace.borrow().functions.get(&member.name).cloned() else {
                return Err(undefined(&member.name, &member.position));
            };
            let type_id = function
                .borrow()
                .type_slot
                .borrow()
                .clone()
                .unwrap_or(Type::Unset);
            let Expression::Id(object_id) = object else {
                unreachable!("unshadowed_name only matches identifiers");
            };
            confirm_hint(ctx, hint, &type_id, &position)?;
            return Ok(Postfix::MemberAccess {
                expr: Box::new(Expression::Id(qualifier_id(ctx, object_id))),
                member: typed_member(ctx, member, type_id.clone()),
                nullable,
                info: TypeInformation::new(ctx, type_id, hint),
                position,
            });
        }
        if let Some(ffi) = ctx.scope.get_ffi_namespace(name) {
            let Some(signature) = ffi.methods.get(&member.name).cloned() else {
                return Err(undefined(&member.name, &member.position));
            };
            let type_id = Type::FfiMethod(signature);
            let Expression::Id(object_id) = object else {
                unreachable!("unshadowed_name only matches identifiers");
            };
            confirm_hint(ctx, hint, &type_id, &position)?;
            return Ok(Postfix::MemberAccess {
                expr: Box::new(Expression::Id(qualifier_id(ctx, object_id))),
                member: typed_member(ctx, member, type_id.clone()),
                nullable,
                info: TypeInformation::new(ctx, type_id, hint),
                position,
            });
        }
        if let Some(TypeSymbol::Type(type_id)) = ctx.scope.get_type_symbol(name) {
            if let Type::Enum(enum_type) = type_id.dereference() {
                if enum_type.member_value(&member.name).is_none() {
                    return Err(undefined(&member.name, &member.position));
                }
                let enum_value = Type::Enum(enum_type);
                let Expression::Id(object_id) = object else {
                    unreachable!("unshadowed_name only matches identifiers");
                };
                confirm_hint(ctx, hint, &enum_value, &position)?;
                return Ok(Postfix::MemberAccess {
                    expr: Box::new(Expression::Id(Id {
                        name: object_id.name,
                        type_args: vec![],
                        info: TypeInformation::new(ctx, enum_value.clone(), None),
                        position: object_id.position,
                    })),
                    member: typed_member(ctx, member, enum_value.clone()),
                    nullable,
                    info: TypeInformation::new(ctx, enum_value, hint).constant(),
                    position,
                });
            }
        }
    }

    let object = object.check(ctx, None)?;
    let object_type = object.get_info().resolved_type();

    let type_id = match object_type.dereference() {
        Type::Nullable(inner) => {
            if !nullable {
                return Err(TypeCheckError::TypeMismatch(
                    TypeMismatch {
                        expected: (*inner).clone(),
                        actual: object_type.clone(),
                        detail: Some("use '?.' to reach through a nullable value".to_string()),
                    },
                    position,
                ));
            }
            let member_type = member_type_on(ctx, &inner, &member.name, &member.position)?;
            if ctx.within_nullish_coalescing || member_type.is_nullable() {
                member_type
            } else {
                Type::nullable(member_type)
            }
        }
        other => member_type_on(ctx, &other, &member.name, &member.position)?,
    };

    confirm_hint(ctx, hint, &type_id, &position)?;
    Ok(Postfix::MemberAccess {
        expr: Box::new(object),
        member: typed_member(ctx, member, type_id.clone()),
        nullable,
        info: TypeInformation::new(ctx, type_id, hint),
        position,
    })
}

/// The type of `value.member` for a non-nullable receiver.
fn member_type_on(
    ctx: &Context,
    receiver: &Type,
    member: &str,
    position: &Location,
) -> TypeResult<Type> {
    match receiver.dereference() {
        Type::Struct(strukt) => strukt
            .field(member)
            .map(|f| f.type_id.clone())
            .ok_or_else(|| undefined(member, position)),
        Type::Class(class) => {
            let attribute = class
                .borrow()
                .attributes
                .iter()
                .find(|a| a.name == member && !a.is_static)
                .map(|a| a.type_id.clone());
            if let Some(attribute) = attribute {
                return Ok(attribute);
            }
            let methods = class
                .borrow()
                .methods_named(member)
                .into_iter()
                .filter(|m| {
                    let m = m.borrow();
                    !m.is_static && !m.is_generic()
                })
                .collect::<Vec<_>>();
            match methods.len() {
                0 => Err(undefined(member, position)),
                1 => Ok(Type::Function(methods[0].borrow().signature.clone())),
                count => Err(TypeCheckError::AmbiguousCall(
                    AmbiguousCall {
                        name: member.to_string(),
                        candidates: count,
                    },
                    position.clone(),
                )),
            }
        }
        Type::MetaClass(class) => {
            let attribute = class
                .borrow()
                .attributes
                .iter()
                .find(|a| a.name == member && a.is_static)
                .map(|a| a.type_id.clone());
            if let Some(attribute) = attribute {
                return Ok(attribute);
            }
            let methods = class
                .borrow()
                .methods_named(member)
                .into_iter()
                .filter(|m| {
                    let m = m.borrow();
                    m.is_static && !m.is_generic()
                })
                .collect::<Vec<_>>();
            match methods.len() {
                0 => Err(undefined(member, position)),
                1 => Ok(Type::Function(methods[0].borrow().signature.clone())),
                count => Err(TypeCheckError::AmbiguousCall(
                    AmbiguousCall {
                        name: member.to_string(),
                        candidates: count,
                    },
                    position.clone(),
                )),
            }
        }
        Type::MetaVariant(variant) => {
            let constructor = variant.borrow().constructor(member);
            constructor
                .map(Type::MetaVariantConstructor)
                .ok_or_else(|| undefined(member, position))
        }
        Type::Interface(interface) => {
            let methods = interface.find_methods(member);
            match methods.len() {
                0 => Err(undefined(member, position)),
                1 => Ok(Type::Function(methods[0].signature.clone())),
                count => Err(TypeCheckError::AmbiguousCall(
                    AmbiguousCall {
                        name: member.to_string(),
                        candidates: count,
                    },
                    position.clone(),
                )),
            }
        }
        Type::VariantConstructor(constructor) => constructor
            .borrow()
            .parameters
            .iter()
            .find(|p| p.name == member)
            .map(|p| p.type_id.clone())
            .ok_or_else(|| undefined(member, position)),
        other => Err(TypeCheckError::TypeMismatch(
            TypeMismatch {
                expected: Type::Struct(crate::typechecker::types::StructType { fields: vec![] }),
                actual: other,
                detail: Some(format!("'{member}' can not be resolved on this type")),
            },
            position.clone(),
        )),
    }
}

fn undefined(name: &str, position: &Location) -> TypeCheckError {
    TypeCheckError::UndefinedVariable(
        UndefinedVariable {
            variable_name: name.to_string(),
        },
        position.clone(),
    )
}

// ---------------------------------------------------------------------------
// indexing
// ---------------------------------------------------------------------------

/// Array indices are unsigned; an unsettled literal settles to `u64`.
pub(crate) fn check_array_index(
    ctx: &mut Context,
    index: Expression<()>,
) -> TypeResult<Expression<TypeInformation>> {
    let mut index = index.check(ctx, None)?;
    let index_type = index.get_info().resolved_type();
    match index_type.dereference() {
        Type::Basic(kind) if kind.is_unsigned() => Ok(index),
        Type::LiteralInt(_) => {
            index.update_type(Type::Basic(BasicKind::U64))?;
            Ok(index)
        }
        other => Err(TypeCheckError::TypeMismatch(
            TypeMismatch {
                expected: Type::Basic(BasicKind::U64),
                actual: other,
                detail: Some("array indices are unsigned integers".to_string()),
            },
            index.position(),
        )),
    }
}

fn check_index(
    ctx: &mut Context,
    object: Expression<()>,
    index: Expression<()>,
    reverse: bool,
    position: Location,
    hint: Option<&Type>,
) -> TypeResult<Postfix<TypeInformation>> {
    let object = object.check(ctx, None)?;
    let object_type = object.get_info().resolved_type();

    match object_type.dereference() {
        Type::Array { element, .. } => {
            let index = check_array_index(ctx, index)?;
            confirm_hint(ctx, hint, &element, &position)?;
            Ok(Postfix::Index {
                expr: Box::new(object),
                index: Box::new(index),
                reverse,
                overload: None,
                info: TypeInformation::new(ctx, *element, hint),
                position,
            })
        }
        Type::Class(_) | Type::Interface(_) => {
            let slot = if reverse { REVERSE_INDEX } else { INDEX };
            let mut index = index.check(ctx, None)?;
            let (overload, return_type) = resolve_operator_overload(
                ctx,
                &object_type,
                slot,
                &[index.get_info().resolved_type()],
                hint,
                &position,
            )?
            .expect("receiver is a class or interface");
            index.update_type(overload.target.signature().parameters[0].type_id.clone())?;
            confirm_hint(ctx, hint, &return_type, &position)?;
            Ok(Postfix::Index {
                expr: Box::new(object),
                index: Box::new(index),
                reverse,
                overload: Some(overload),
                info: TypeInformation::new(ctx, return_type, hint),
                position,
            })
        }
        other => Err(TypeCheckError::TypeMismatch(
            TypeMismatch {
                expected: Type::array(Type::Unset),
                actual: other,
                detail: Some("only arrays and index overloads can be indexed".to_string()),
            },
            position,
        )),
    }
}

// ---------------------------------------------------------------------------
// calls
// ---------------------------------------------------------------------------

pub(crate) fn infer_arguments(
    ctx: &mut Context,
    args: Vec<Expression<()>>,
) -> TypeResult<(Vec<Expression<TypeInformation>>, Vec<Type>)> {
    let mut checked = Vec::with_capacity(args.len());
    let mut types = Vec::with_capacity(args.len());
    for arg in args {
        let arg = arg.check(ctx, None)?;
        types.push(arg.get_info().resolved_type());
        checked.push(arg);
    }
    Ok((checked, types))
}

/// A mutable parameter needs a mutable argument; literals and immutable
/// bindings are rejected, `mutate` and `this` always qualify.
fn expect_mutable_argument(
    ctx: &Context,
    arg: &Expression<TypeInformation>,
    parameter_name: &str,
) -> TypeResult<()> {
    let acceptable = match arg {
        Expression::Id(id) => id.binding_mutability(ctx).unwrap_or(true),
        Expression::Literal(_) => false,
        Expression::Mutate(_) | Expression::This(_) => true,
        _ => true,
    };
    if acceptable {
        Ok(())
    } else {
        Err(TypeCheckError::ImmutableAssignment(
            ImmutableAssignment {
                name: parameter_name.to_string(),
            },
            arg.position(),
        ))
    }
}

/// Retro-fit the selected signature onto already-inferred arguments: lax
/// assignability, hint push-back, mutability.
pub(crate) fn apply_signature(
    ctx: &Context,
    args: &mut [Expression<TypeInformation>],
    signature: &FunctionType,
) -> TypeResult<()> {
    for (arg, parameter) in args.iter_mut().zip(signature.parameters.iter()) {
        expect_assignable(
            ctx,
            &parameter.type_id,
            &arg.get_info().resolved_type(),
            false,
            &arg.position(),
        )?;
        arg.update_type(parameter.type_id.clone())?;
        if parameter.mutable {
            expect_mutable_argument(ctx, arg, &parameter.name)?;
        }
    }
    Ok(())
}

/// Check arguments directly against a known signature, hints first.
fn check_arguments_against(
    ctx: &mut Context,
    name: &str,
    args: Vec<Expression<()>>,
    signature: &FunctionType,
    strict: bool,
    position: &Location,
) -> TypeResult<Vec<Expression<TypeInformation>>> {
    if args.len() != signature.parameters.len() {
        return Err(TypeCheckError::ArityMismatch(
            ArityMismatch {
                name: name.to_string(),
                expected: signature.parameters.len(),
                actual: args.len(),
            },
            position.clone(),
        ));
    }
    let mut checked = Vec::with_capacity(args.len());
    for (arg, parameter) in args.into_iter().zip(signature.parameters.iter()) {
        let arg = arg.check(ctx, Some(&parameter.type_id))?;
        if strict {
            expect_assignable(
                ctx,
                &parameter.type_id,
                &arg.get_info().resolved_type(),
                true,
                &arg.position(),
            )?;
        }
        if parameter.mutable {
            expect_mutable_argument(ctx, &arg, &parameter.name)?;
        }
        checked.push(arg);
    }
    Ok(checked)
}

fn check_call(
    ctx: &mut Context,
    callee: Expression<()>,
    type_args: Vec<crate::ast::TypeName>,
    args: Vec<Expression<()>>,
    position: Location,
    hint: Option<&Type>,
) -> TypeResult<Postfix<TypeInformation>> {
    let mut explicit = Vec::with_capacity(type_args.len());
    for type_arg in &type_args {
        explicit.push(Type::try_from((type_arg.clone(), &*ctx))?);
    }

    // Method-call shapes resolve against the receiver without turning the
    // method group into a value first.
    if let Expression::Postfix(Postfix::MemberAccess {
        expr: object,
        member,
        nullable: false,
        position: access_position,
        ..
    }) = callee
    {
        return check_method_call(
            ctx,
            *object,
            member,
            access_position,
            type_args,
            explicit,
            args,
            position,
            hint,
        );
    }

    // A bare identifier naming a declared function is a direct call; it may
    // monomorphize here.
    if let Expression::Id(ref id) = callee {
        if unshadowed_name(ctx, &callee).is_some() {
            if let Some(function) = ctx.scope.get_function(&id.name) {
                let id = id.clone();
                return check_declared_function_call(
                    ctx, id, function, type_args, explicit, args, position, hint,
                );
            }
        }
    }

    // Everything else is a call on a value.
    let callee = callee.check(ctx, None)?;
    let callee_type = callee.get_info().resolved_type();

    match callee_type.dereference() {
        Type::Function(signature) => {
            let name = callee_name(&callee);
            let args = check_arguments_against(ctx, &name, args, &signature, false, &position)?;
            let return_type = (*signature.return_type).clone();
            confirm_hint(ctx, hint, &return_type, &position)?;
            Ok(Postfix::Call {
                expr: Box::new(callee),
                type_args,
                args,
                resolved: None,
                overload: None,
                info: TypeInformation::new(ctx, return_type, hint),
                position,
            })
        }
        Type::Coroutine(signature) => {
            if !args.is_empty() {
                return Err(TypeCheckError::ArityMismatch(
                    ArityMismatch {
                        name: "coroutine".to_string(),
                        expected: 0,
                        actual: args.len(),
                    },
                    position,
                ));
            }
            let return_type = (*signature.return_type).clone();
            confirm_hint(ctx, hint, &return_type, &position)?;
            Ok(Postfix::Call {
                expr: Box::new(callee),
                type_args,
                args: vec![],
                resolved: None,
                overload: None,
                info: TypeInformation::new(ctx, return_type, hint),
                position,
            })
        }
        Type::FfiMethod(signature) => {
            let name = callee_name(&callee);
            let args = check_arguments_against(ctx, &name, args, &signature, true, &position)?;
            let return_type = (*signature.return_type).clone();
            confirm_hint(ctx, hint, &return_type, &position)?;
            Ok(Postfix::Call {
                expr: Box::new(callee),
                type_args,
                args,
                resolved: None,
                overload: None,
                info: TypeInformation::new(ctx, return_type, hint),
                position,
            })
        }
        Type::Class(_) | Type::Interface(_) => {
            let (mut args, arg_types) = infer_arguments(ctx, args)?;
            let (overload, return_type) = resolve_operator_overload(
                ctx,
                &callee_type,
                CALL,
                &arg_types,
                hint,
                &position,
            )?
            .expect("receiver is a class or interface");
            apply_signature(ctx, &mut args, &overload.target.signature())?;
            confirm_hint(ctx, hint, &return_type, &position)?;
            Ok(Postfix::Call {
                expr: Box::new(callee),
                type_args,
                args,
                resolved: None,
                overload: Some(overload),
                info: TypeInformation::new(ctx, return_type, hint),
                position,
            })
        }
        Type::MetaVariantConstructor(constructor) => {
            check_constructor_call(ctx, callee, constructor, type_args, args, position, hint)
        }
        Type::MetaClass(_) => Err(TypeCheckError::StructuralViolation(
            StructuralViolation::new("classes are constructed with 'new'"),
            position,
        )),
        other => Err(TypeCheckError::TypeMismatch(
            TypeMismatch {
                expected: Type::function(vec![], Type::Unset),
                actual: other,
                detail: Some("this expression is not callable".to_string()),
            },
            position,
        )),
    }
}

fn callee_name(callee: &Expression<TypeInformation>) -> String {
    match callee {
        Expression::Id(id) => id.name.clone(),
        Expression::Postfix(Postfix::MemberAccess { member, .. }) => member.name.clone(),
        _ => "function".to_string(),
    }
}

#[allow(clippy::too_many_arguments)]
fn check_declared_function_call(
    ctx: &mut Context,
    id: Id<()>,
    function: Rc<std::cell::RefCell<crate::typechecker::functions::DeclaredFunction>>,
    type_args: Vec<crate::ast::TypeName>,
    explicit: Vec<Type>,
    args: Vec<Expression<()>>,
    position: Location,
    hint: Option<&Type>,
) -> TypeResult<Postfix<TypeInformation>> {
    // A callee whose return type is still unresolved infers on demand; a
    // recursive call simply observes the in-progress (unset) header.
    let needs_inference = {
        let function = function.borrow();
        !function.is_generic()
            && function.checked.is_none()
            && !function.inferring
            && matches!(*function.signature.return_type, Type::Unset)
    };
    if needs_inference {
        infer_function(ctx, &function)?;
    }

    let (is_generic, name, signature, generics) = {
        let function = function.borrow();
        (
            function.is_generic(),
            function.name.clone(),
            function.signature.clone(),
            function.generics.clone(),
        )
    };

    if !is_generic {
        let args = check_arguments_against(ctx, &name, args, &signature, false, &position)?;
        let return_type = (*signature.return_type).clone();
        confirm_hint(ctx, hint, &return_type, &position)?;
        let callee = Expression::Id(Id {
            name: id.name,
            type_args: vec![],
            info: TypeInformation::new(ctx, Type::Function(signature), None),
            position: id.position,
        });
        return Ok(Postfix::Call {
            expr: Box::new(callee),
            type_args,
            args,
            resolved: Some(ResolvedCallee::Function(function)),
            overload: None,
            info: TypeInformation::new(ctx, return_type, hint),
            position,
        });
    }

    if explicit.is_empty() && args.len() != signature.parameters.len() {
        return Err(TypeCheckError::ArityMismatch(
            ArityMismatch {
                name,
                expected: signature.parameters.len(),
                actual: args.len(),
            },
            position,
        ));
    }

    let (mut args, arg_types) = infer_arguments(ctx, args)?;
    let substitution = build_substitution(
        ctx,
        &name,
        &generics,
        &signature.parameter_types(),
        &arg_types,
        &explicit,
        &position,
    )?;
    let instance = instantiate_function(ctx, &function, &substitution, &position)?;
    let instance_signature = instance.borrow().signature.clone();
    apply_signature(ctx, &mut args, &instance_signature)?;

    let return_type = (*instance_signature.return_type).clone();
    confirm_hint(ctx, hint, &return_type, &position)?;
    let callee = Expression::Id(Id {
        name: id.name,
        type_args: vec![],
        info: TypeInformation::new(ctx, Type::Function(instance_signature), None),
        position: id.position,
    });
    Ok(Postfix::Call {
        expr: Box::new(callee),
        type_args,
        args,
        resolved: Some(ResolvedCallee::Function(instance)),
        overload: None,
        info: TypeInformation::new(ctx, return_type, hint),
        position,
    })
}

#[allow(clippy::too_many_arguments)]
fn check_method_call(
    ctx: &mut Context,
    object: Expression<()>,
    member: Id<()>,
    access_position: Location,
    type_args: Vec<crate::ast::TypeName>,
    explicit: Vec<Type>,
    args: Vec<Expression<()>>,
    position: Location,
    hint: Option<&Type>,
) -> TypeResult<Postfix<TypeInformation>> {
    // Namespace and FFI calls reuse the member-access reading of the
    // qualified name and then dispatch on the member's type.
    if let Some(name) = unshadowed_name(ctx, &object) {
        if ctx.scope.get_namespace(name).is_some() {
            let namespace = ctx.scope.get_namespace(name).expect("just checked");
            let function = namespace
                .borrow()
                .functions
                .get(&member.name)
                .cloned()
                .ok_or_else(|| undefined(&member.name, &member.position))?;
            let Expression::Id(object_id) = object else {
                unreachable!("unshadowed_name only matches identifiers");
            };
            return check_declared_function_call(
                ctx, member, function, type_args, explicit, args, position, hint,
            )
            .map(|call| requalify(ctx, call, object_id, access_position));
        }
        if let Some(ffi) = ctx.scope.get_ffi_namespace(name) {
            let signature = ffi
                .methods
                .get(&member.name)
                .cloned()
                .ok_or_else(|| undefined(&member.name, &member.position))?;
            let args = check_arguments_against(
                ctx,
                &member.name,
                args,
                &signature,
                true,
                &position,
            )?;
            let return_type = (*signature.return_type).clone();
            let Expression::Id(object_id) = object else {
                unreachable!("unshadowed_name only matches identifiers");
            };
            confirm_hint(ctx, hint, &return_type, &position)?;
            let callee = Expression::Postfix(Postfix::MemberAccess {
                expr: Box::new(Expression::Id(qualifier_id(ctx, object_id))),
                member: typed_member(ctx, member, Type::FfiMethod(signature)),
                nullable: false,
                info: TypeInformation::new(ctx, return_type.clone(), None),
                position: access_position,
            });
            return Ok(Postfix::Call {
                expr: Box::new(callee),
                type_args,
                args,
                resolved: None,
                overload: None,
                info: TypeInformation::new(ctx, return_type, hint),
                position,
            });
        }
    }

    let object = object.check(ctx, None)?;
    let object_type = object.get_info().resolved_type();

    match object_type.dereference() {
        Type::Class(class) => {
            let (mut args, arg_types) = infer_arguments(ctx, args)?;
            let candidates = find_class_methods(
                ctx,
                &class,
                &member.name,
                &arg_types,
                hint,
                &explicit,
                false,
                &position,
            )?;
            if candidates.is_empty() {
                // An attribute holding a function value is callable too.
                let attribute = class
                    .borrow()
                    .attributes
                    .iter()
                    .find(|a| a.name == member.name && !a.is_static)
                    .map(|a| a.type_id.clone());
                if let Some(attribute_type) = attribute {
                    if let Type::Function(signature) = attribute_type.dereference() {
                        apply_signature(ctx, &mut args, &signature)?;
                        let return_type = (*signature.return_type).clone();
                        confirm_hint(ctx, hint, &return_type, &position)?;
                        let callee = Expression::Postfix(Postfix::MemberAccess {
                            expr: Box::new(object),
                            member: typed_member(ctx, member, Type::Function(signature)),
                            nullable: false,
                            info: TypeInformation::new(ctx, return_type.clone(), None),
                            position: access_position,
                        });
                        return Ok(Postfix::Call {
                            expr: Box::new(callee),
                            type_args,
                            args,
                            resolved: None,
                            overload: None,
                            info: TypeInformation::new(ctx, return_type, hint),
                            position,
                        });
                    }
                }
            }
            let method = expect_single_candidate(candidates, &member.name, &position)?;
            let signature = method.borrow().signature.clone();
            if args.len() != signature.parameters.len() {
                return Err(TypeCheckError::ArityMismatch(
                    ArityMismatch {
                        name: member.name.clone(),
                        expected: signature.parameters.len(),
                        actual: args.len(),
                    },
                    position,
                ));
            }
            apply_signature(ctx, &mut args, &signature)?;
            let return_type = (*signature.return_type).clone();
            confirm_hint(ctx, hint, &return_type, &position)?;
            let callee = Expression::Postfix(Postfix::MemberAccess {
                expr: Box::new(object),
                member: typed_member(ctx, member, Type::Function(signature)),
                nullable: false,
                info: TypeInformation::new(ctx, return_type.clone(), None),
                position: access_position,
            });
            Ok(Postfix::Call {
                expr: Box::new(callee),
                type_args,
                args,
                resolved: Some(ResolvedCallee::ClassMethod(method)),
                overload: None,
                info: TypeInformation::new(ctx, return_type, hint),
                position,
            })
        }
        Type::Interface(interface) => {
            let (mut args, arg_types) = infer_arguments(ctx, args)?;
            let candidates =
                find_interface_methods(ctx, &interface, &member.name, &arg_types, hint);
            let method = expect_single_candidate(candidates, &member.name, &position)?;
            apply_signature(ctx, &mut args, &method.signature)?;
            let return_type = (*method.signature.return_type).clone();
            confirm_hint(ctx, hint, &return_type, &position)?;
            let callee = Expression::Postfix(Postfix::MemberAccess {
                expr: Box::new(object),
                member: typed_member(ctx, member, Type::Function(method.signature.clone())),
                nullable: false,
                info: TypeInformation::new(ctx, return_type.clone(), None),
                position: access_position,
            });
            Ok(Postfix::Call {
                expr: Box::new(callee),
                type_args,
                args,
                resolved: Some(ResolvedCallee::InterfaceMethod(method)),
                overload: None,
                info: TypeInformation::new(ctx, return_type, hint),
                position,
            })
        }
        Type::MetaClass(class) => {
            let (mut args, arg_types) = infer_arguments(ctx, args)?;
            let candidates = find_class_methods(
                ctx,
                &class,
                &member.name,
                &arg_types,
                hint,
                &explicit,
                true,
                &position,
            )?;
            let method = expect_single_candidate(candidates, &member.name, &position)?;
            let signature = method.borrow().signature.clone();
            apply_signature(ctx, &mut args, &signature)?;
            let return_type = (*signature.return_type).clone();
            confirm_hint(ctx, hint, &return_type, &position)?;
            let callee = Expression::Postfix(Postfix::MemberAccess {
                expr: Box::new(object),
                member: typed_member(ctx, member, Type::Function(signature)),
                nullable: false,
                info: TypeInformation::new(ctx, return_type.clone(), None),
                position: access_position,
            });
            Ok(Postfix::Call {
                expr: Box::new(callee),
                type_args,
                args,
                resolved: Some(ResolvedCallee::ClassMethod(method)),
                overload: None,
                info: TypeInformation::new(ctx, return_type, hint),
                position,
            })
        }
        Type::MetaVariant(variant) => {
            let constructor = variant
                .borrow()
                .constructor(&member.name)
                .ok_or_else(|| undefined(&member.name, &member.position))?;
            let callee = Expression::Postfix(Postfix::MemberAccess {
                expr: Box::new(object),
                member: typed_member(
                    ctx,
                    member,
                    Type::MetaVariantConstructor(Rc::clone(&constructor)),
                ),
                nullable: false,
                info: TypeInformation::new(
                    ctx,
                    Type::MetaVariantConstructor(Rc::clone(&constructor)),
                    None,
                ),
                position: access_position,
            });
            check_constructor_call(ctx, callee, constructor, type_args, args, position, hint)
        }
        // Any other receiver: resolve the member as a value and call it.
        _ => {
            let member_type =
                member_type_on(ctx, &object_type, &member.name, &member.position)?;
            match member_type.dereference() {
                Type::Function(signature) => {
                    let args = check_arguments_against(
                        ctx,
                        &member.name,
                        args,
                        &signature,
                        false,
                        &position,
                    )?;
                    let return_type = (*signature.return_type).clone();
                    confirm_hint(ctx, hint, &return_type, &position)?;
                    let callee = Expression::Postfix(Postfix::MemberAccess {
                        expr: Box::new(object),
                        member: typed_member(ctx, member, Type::Function(signature)),
                        nullable: false,
                        info: TypeInformation::new(ctx, return_type.clone(), None),
                        position: access_position,
                    });
                    Ok(Postfix::Call {
                        expr: Box::new(callee),
                        type_args,
                        args,
                        resolved: None,
                        overload: None,
                        info: TypeInformation::new(ctx, return_type, hint),
                        position,
                    })
                }
                other => Err(TypeCheckError::TypeMismatch(
                    TypeMismatch {
                        expected: Type::function(vec![], Type::Unset),
                        actual: other,
                        detail: Some(format!("'{}' is not callable", member.name)),
                    },
                    position,
                )),
            }
        }
    }
}

/// Rewrap a declared-function call so the callee keeps its namespace
/// qualification in the output tree.
fn requalify(
    ctx: &Context,
    call: Postfix<TypeInformation>,
    qualifier: Id<()>,
    access_position: Location,
) -> Postfix<TypeInformation> {
    let Postfix::Call {
        expr,
        type_args,
        args,
        resolved,
        overload,
        info,
        position,
    } = call
    else {
        unreachable!("declared function calls are call nodes");
    };
    let member_info = expr.get_info();
    let Expression::Id(member_id) = *expr else {
        unreachable!("declared function callees are identifiers");
    };
    let callee = Expression::Postfix(Postfix::MemberAccess {
        expr: Box::new(Expression::Id(qualifier_id(ctx, qualifier))),
        member: member_id,
        nullable: false,
        info: member_info,
        position: access_position,
    });
    Postfix::Call {
        expr: Box::new(callee),
        type_args,
        args,
        resolved,
        overload,
        info,
        position,
    }
}

fn check_constructor_call(
    ctx: &mut Context,
    callee: Expression<TypeInformation>,
    constructor: crate::typechecker::types::VariantConstructorRef,
    type_args: Vec<crate::ast::TypeName>,
    args: Vec<Expression<()>>,
    position: Location,
    hint: Option<&Type>,
) -> TypeResult<Postfix<TypeInformation>> {
    let parameters = constructor.borrow().parameters.clone();
    let name = constructor.borrow().name.clone();
    if args.len() != parameters.len() {
        return Err(TypeCheckError::ArityMismatch(
            ArityMismatch {
                name,
                expected: parameters.len(),
                actual: args.len(),
            },
            position,
        ));
    }

    let mut checked = Vec::with_capacity(args.len());
    for (arg, parameter) in args.into_iter().zip(parameters.iter()) {
        let arg = arg.check(ctx, Some(&parameter.type_id))?;
        checked.push(arg);
    }

    let type_id = Type::VariantConstructor(constructor);
    confirm_hint(ctx, hint, &type_id, &position)?;
    Ok(Postfix::Call {
        expr: Box::new(callee),
        type_args,
        args: checked,
        resolved: None,
        overload: None,
        info: TypeInformation::new(ctx, type_id, hint),
        position,
    })
}
