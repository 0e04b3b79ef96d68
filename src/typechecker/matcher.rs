//! Structural/nominal assignability checking.
//!
//! `match_types(ctx, expected, actual, strict)` decides whether a value of
//! `actual` may stand where `expected` is required. Strict mode demands
//! exact widths and kinds; lax mode additionally permits safe numeric
//! widening, struct/tuple/interface width-subtyping and enum/numeric
//! coercion.
//!
//! Cycle safety: a global stack of `(hash, hash, strict)` keys makes a
//! re-entrant match succeed co-inductively, and a memo map caches completed
//! successes. Self-referential classes and mutually recursive variants
//! terminate because their serializations go by id.

use log::trace;

use super::context::Context;
use super::error::{TypeCheckError, TypeMismatch};
use super::promotion::promote;
use super::types::{InterfaceType, MethodSignature, StructField, StructType, Type};
use crate::location::Location;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchError {
    pub message: String,
}

impl MatchError {
    fn new(message: impl ToString) -> MatchError {
        MatchError {
            message: message.to_string(),
        }
    }

    fn mismatch(expected: &Type, actual: &Type) -> MatchError {
        MatchError::new(format!("'{actual:?}' is not assignable to '{expected:?}'"))
    }
}

pub type MatchResult = Result<(), MatchError>;

/// Convert a failed match into the fatal diagnostic carrying short names
/// and the matcher's detail message.
pub fn expect_assignable(
    ctx: &Context,
    expected: &Type,
    actual: &Type,
    strict: bool,
    position: &Location,
) -> Result<(), TypeCheckError> {
    match_types(ctx, expected, actual, strict).map_err(|e| {
        TypeCheckError::TypeMismatch(
            TypeMismatch {
                expected: expected.clone(),
                actual: actual.clone(),
                detail: Some(e.message),
            },
            position.clone(),
        )
    })
}

pub fn match_types(ctx: &Context, expected: &Type, actual: &Type, strict: bool) -> MatchResult {
    let expected = expected.dereference();
    let actual = actual.dereference();

    // `Unset` is the universal match: a recursive call site may observe a
    // return type that is still being inferred; the final check happens when
    // the target function finishes.
    if matches!(expected, Type::Unset) || matches!(actual, Type::Unset) {
        return Ok(());
    }
    if matches!(expected, Type::Unreachable) || matches!(actual, Type::Unreachable) {
        return Ok(());
    }

    let key = (expected.fingerprint(), actual.fingerprint(), strict);

    if ctx
        .shared
        .match_cache
        .borrow()
        .get(&key)
        .copied()
        .unwrap_or(false)
    {
        return Ok(());
    }

    // Already matching this very pair further up the stack: succeed
    // co-inductively.
    if ctx.shared.matching_stack.borrow().contains(&key) {
        trace!("co-inductive match hit for {expected:?} / {actual:?}");
        return Ok(());
    }

    ctx.shared.matching_stack.borrow_mut().push(key);
    let result = dispatch(ctx, &expected, &actual, strict);
    ctx.shared.matching_stack.borrow_mut().pop();

    if result.is_ok() {
        ctx.shared.match_cache.borrow_mut().insert(key, true);
    }

    result
}

fn dispatch(ctx: &Context, expected: &Type, actual: &Type, strict: bool) -> MatchResult {
    debug_assert!(
        !matches!(expected, Type::Generic(_)) && !matches!(actual, Type::Generic(_)),
        "generic placeholder reached the matcher"
    );

    match (expected, actual) {
        (Type::Generic(_), _) | (_, Type::Generic(_)) | (Type::Union(_), _) => Err(
            MatchError::new("internal: unresolved type reached the matcher"),
        ),

        (Type::Null, Type::Null) => Ok(()),
        (Type::Null, _) => Err(MatchError::mismatch(expected, actual)),

        (Type::Nullable(inner), Type::Nullable(actual_inner)) => {
            match_types(ctx, inner, actual_inner, strict)
        }
        (Type::Nullable(_), Type::Null) => Ok(()),
        (Type::Nullable(inner), _) => match_types(ctx, inner, actual, strict),
        (_, Type::Nullable(_)) => Err(MatchError::new(format!(
            "'{actual:?}' may be null here, expected '{expected:?}'"
        ))),
        (_, Type::Null) => Err(MatchError::new(format!(
            "null is only assignable to nullable types, expected '{expected:?}'"
        ))),

        (Type::Void, Type::Void) => Ok(()),
        (Type::Void, _) | (_, Type::Void) => Err(MatchError::mismatch(expected, actual)),

        (Type::Boolean, Type::Boolean) => Ok(()),

        (Type::Basic(e), Type::Basic(a)) => {
            if e == a {
                Ok(())
            } else if !strict && promote(*e, *a) == *e {
                Ok(())
            } else {
                Err(MatchError::mismatch(expected, actual))
            }
        }
        // Literal fit against the concrete kind is checked at the literal's
        // own site. Strictly, an integer literal only stands in for integer
        // kinds, which is what makes overload resolution on literal
        // arguments prefer the integer candidate.
        (Type::Basic(kind), Type::LiteralInt(_)) => {
            if kind.is_integer() || !strict {
                Ok(())
            } else {
                Err(MatchError::mismatch(expected, actual))
            }
        }
        (Type::LiteralInt(_), Type::Basic(_)) | (Type::LiteralInt(_), Type::LiteralInt(_)) => {
            Ok(())
        }

        (Type::Array { element, .. }, Type::Array { element: actual_element, .. }) => {
            match_types(ctx, element, actual_element, strict)
        }

        (Type::Enum(e), Type::Enum(a)) => {
            let mut expected_members = e.members.clone();
            let mut actual_members = a.members.clone();
            expected_members.sort();
            actual_members.sort();
            if expected_members == actual_members && e.backing == a.backing {
                Ok(())
            } else {
                Err(MatchError::mismatch(expected, actual))
            }
        }
        (Type::Enum(e), _) if !strict && actual.numeric_kind() == Some(e.backing) => Ok(()),
        (Type::Basic(kind), Type::Enum(a)) if !strict && a.backing == *kind => Ok(()),

        (Type::StringEnum(e), Type::StringEnum(a)) => {
            if a.values.iter().all(|v| e.values.contains(v)) {
                Ok(())
            } else {
                Err(MatchError::new(
                    "string enum values are not a subset of the expected values",
                ))
            }
        }
        (Type::StringEnum(_), Type::Class(class)) if ctx.is_string_class(class) => Ok(()),
        (Type::Class(class), Type::StringEnum(_)) if ctx.is_string_class(class) => Ok(()),

        (Type::Function(e), Type::Function(a)) => match_functions(ctx, e, a),
        (Type::Coroutine(e), Type::Coroutine(a)) => match_functions(ctx, e, a),
        (Type::FfiMethod(e), Type::FfiMethod(a)) => match_functions(ctx, e, a),

        (Type::Promise(inner), Type::Promise(actual_inner)) => {
            match_types(ctx, inner, actual_inner, strict)
        }

        (Type::Interface(_) | Type::Join(_), _) => {
            let Some(expected_interface) = as_interface(expected) else {
                return Err(MatchError::mismatch(expected, actual));
            };
            let Some(actual_interface) = as_interface(actual) else {
                return Err(MatchError::mismatch(expected, actual));
            };
            match_interfaces(ctx, &expected_interface, &actual_interface)
        }

        (Type::Class(e), Type::Class(a)) => {
            if e.borrow().id == a.borrow().id {
                Ok(())
            } else {
                Err(MatchError::new(format!(
                    "class '{}' is not class '{}'",
                    a.borrow().name,
                    e.borrow().name
                )))
            }
        }

        (Type::Variant(e), Type::Variant(a)) => match_variants(ctx, expected, e, a, strict),
        (Type::Variant(e), Type::VariantConstructor(a)) => {
            let constructors = e.borrow().constructors.clone();
            let a = a.borrow();
            for candidate in constructors {
                let candidate = candidate.borrow();
                if candidate.name == a.name
                    && candidate.parameters.len() == a.parameters.len()
                    && candidate
                        .parameters
                        .iter()
                        .zip(a.parameters.iter())
                        .all(|(ep, ap)| {
                            ep.name == ap.name
                                && match_types(ctx, &ep.type_id, &ap.type_id, true).is_ok()
                        })
                {
                    return Ok(());
                }
            }
            Err(MatchError::new(format!(
                "variant has no constructor matching '{}'",
                a.name
            )))
        }
        (Type::VariantConstructor(e), Type::VariantConstructor(a)) => {
            let (e, a) = (e.borrow(), a.borrow());
            if e.name == a.name
                && e.parameters.len() == a.parameters.len()
                && e.parameters
                    .iter()
                    .zip(a.parameters.iter())
                    .all(|(ep, ap)| match_types(ctx, &ep.type_id, &ap.type_id, true).is_ok())
            {
                Ok(())
            } else {
                Err(MatchError::mismatch(expected, actual))
            }
        }

        (Type::Struct(e), Type::Struct(a)) => match_structs(ctx, e, a, strict),

        (Type::Tuple(e), Type::Tuple(a)) => {
            if strict && e.len() != a.len() {
                return Err(MatchError::new(format!(
                    "expected a tuple of {} elements, got {}",
                    e.len(),
                    a.len()
                )));
            }
            if a.len() < e.len() {
                return Err(MatchError::new(format!(
                    "expected a tuple of at least {} elements, got {}",
                    e.len(),
                    a.len()
                )));
            }
            for (element, actual_element) in e.iter().zip(a.iter()) {
                match_types(ctx, element, actual_element, strict)?;
            }
            Ok(())
        }

        (Type::MetaClass(e), Type::MetaClass(a)) => {
            if e.borrow().id == a.borrow().id {
                Ok(())
            } else {
                Err(MatchError::mismatch(expected, actual))
            }
        }
        (Type::MetaVariant(e), Type::MetaVariant(a)) => {
            if e.borrow().id == a.borrow().id {
                Ok(())
            } else {
                Err(MatchError::mismatch(expected, actual))
            }
        }
        (Type::MetaVariantConstructor(_), Type::MetaVariantConstructor(_)) => {
            if expected == actual {
                Ok(())
            } else {
                Err(MatchError::mismatch(expected, actual))
            }
        }

        _ => Err(MatchError::mismatch(expected, actual)),
    }
}

/// Same arity and mutabilities; parameters contravariant, return covariant.
/// Everything inside a function type is matched strictly.
fn match_functions(
    ctx: &Context,
    expected: &super::types::FunctionType,
    actual: &super::types::FunctionType,
) -> MatchResult {
    if expected.parameters.len() != actual.parameters.len() {
        return Err(MatchError::new(format!(
            "expected a function of {} parameter(s), got {}",
            expected.parameters.len(),
            actual.parameters.len()
        )));
    }
    for (ep, ap) in expected.parameters.iter().zip(actual.parameters.iter()) {
        if ep.mutable != ap.mutable {
            return Err(MatchError::new(format!(
                "parameter '{}' differs in mutability",
                ap.name
            )));
        }
        match_types(ctx, &ap.type_id, &ep.type_id, true)?;
    }
    match_types(ctx, &expected.return_type, &actual.return_type, true)
}

/// Flatten interface-convertible types (interfaces, joins, classes) into an
/// interface view for method-set subtyping.
pub(crate) fn as_interface(type_id: &Type) -> Option<InterfaceType> {
    match type_id.dereference() {
        Type::Interface(interface) => Some(interface),
        Type::Class(class) => Some(class.borrow().as_interface()),
        Type::Join(parts) => {
            let mut methods: Vec<MethodSignature> = Vec::new();
            for part in &parts {
                let interface = as_interface(part)?;
                for method in interface.all_methods() {
                    if !methods
                        .iter()
                        .any(|m| m.name == method.name && m.signature == method.signature)
                    {
                        methods.push(method);
                    }
                }
            }
            Some(InterfaceType::new(None, methods, vec![]))
        }
        _ => None,
    }
}

fn match_interfaces(
    ctx: &Context,
    expected: &InterfaceType,
    actual: &InterfaceType,
) -> MatchResult {
    let actual_methods = actual.all_methods();
    for method in expected.all_methods() {
        let found = actual_methods.iter().any(|candidate| {
            candidate.name == method.name
                && match_functions(ctx, &method.signature, &candidate.signature).is_ok()
        });
        if !found {
            return Err(MatchError::new(format!(
                "missing method '{}' required by the interface",
                method.name
            )));
        }
    }
    Ok(())
}

fn match_variants(
    ctx: &Context,
    expected: &Type,
    e: &super::types::VariantRef,
    a: &super::types::VariantRef,
    strict: bool,
) -> MatchResult {
    let expected_constructors = e.borrow().constructors.clone();
    let actual_constructors = a.borrow().constructors.clone();

    if strict && expected_constructors.len() != actual_constructors.len() {
        return Err(MatchError::new(format!(
            "variant '{}' has a different constructor list",
            a.borrow().name
        )));
    }
    // Lax: the expected constructor list must be a leading subset so that
    // shared constructors keep their tag positions.
    if expected_constructors.len() > actual_constructors.len() {
        return Err(MatchError::mismatch(expected, &Type::Variant(a.clone())));
    }

    for (ec, ac) in expected_constructors.iter().zip(actual_constructors.iter()) {
        let (ec, ac) = (ec.borrow(), ac.borrow());
        if ec.name != ac.name {
            return Err(MatchError::new(format!(
                "constructor '{}' does not match '{}'",
                ac.name, ec.name
            )));
        }
        if ec.parameters.len() != ac.parameters.len() {
            return Err(MatchError::new(format!(
                "constructor '{}' differs in arity",
                ec.name
            )));
        }
        for (ep, ap) in ec.parameters.iter().zip(ac.parameters.iter()) {
            if ep.name != ap.name {
                return Err(MatchError::new(format!(
                    "constructor field '{}' does not match '{}'",
                    ap.name, ep.name
                )));
            }
            match_types(ctx, &ep.type_id, &ap.type_id, true)?;
        }
    }
    Ok(())
}

fn match_structs(ctx: &Context, e: &StructType, a: &StructType, strict: bool) -> MatchResult {
    // Reduce duplicate field names on the right, last wins, after checking
    // that all same-named fields agree strictly.
    let mut reduced: Vec<StructField> = Vec::with_capacity(a.fields.len());
    for field in &a.fields {
        if let Some(existing) = reduced.iter_mut().find(|f| f.name == field.name) {
            match_types(ctx, &existing.type_id, &field.type_id, true)?;
            existing.type_id = field.type_id.clone();
        } else {
            reduced.push(field.clone());
        }
    }

    if strict && reduced.len() != e.fields.len() {
        return Err(MatchError::new(format!(
            "expected a struct of {} field(s), got {}",
            e.fields.len(),
            reduced.len()
        )));
    }

    for field in &e.fields {
        let Some(actual_field) = reduced.iter().find(|f| f.name == field.name) else {
            return Err(MatchError::new(format!(
                "missing struct field '{}'",
                field.name
            )));
        };
        match_types(ctx, &field.type_id, &actual_field.type_id, strict)?;
    }
    Ok(())
}

/// Numeric casting helper: basic-to-basic always casts; everything else
/// defers to a strict match.
pub fn can_cast(ctx: &Context, target: &Type, source: &Type) -> bool {
    let target_deref = target.dereference();
    let source_deref = source.dereference();
    if target_deref.is_numeric() && source_deref.is_numeric() {
        return true;
    }
    match_types(ctx, target, source, true).is_ok()
}

#[cfg(test)]
mod tests {
    use crate::typechecker::context::Context;
    use crate::typechecker::types::{
        BasicKind, EnumType, FunctionParameter, StringEnumType, StructField, StructType, Type,
    };

    use super::match_types;

    fn u(kind: BasicKind) -> Type {
        Type::Basic(kind)
    }

    #[test]
    fn test_reflexivity_both_modes() {
        let ctx = Context::default();
        let samples = [
            u(BasicKind::U8),
            Type::Boolean,
            Type::Void,
            Type::nullable(u(BasicKind::I64)),
            Type::array(Type::Boolean),
            Type::Tuple(vec![Type::Boolean, u(BasicKind::F32)]),
            Type::function(vec![], Type::Void),
            ctx.string_type(),
        ];
        for sample in samples {
            assert_eq!(match_types(&ctx, &sample, &sample, true), Ok(()));
            assert_eq!(match_types(&ctx, &sample, &sample, false), Ok(()));
        }
    }

    #[test]
    fn test_numeric_widening_lax_only() {
        let ctx = Context::default();
        let expected = u(BasicKind::U32);
        let actual = u(BasicKind::U8);

        assert!(match_types(&ctx, &expected, &actual, false).is_ok());
        assert!(match_types(&ctx, &expected, &actual, true).is_err());
        // Narrowing is rejected in both modes.
        assert!(match_types(&ctx, &actual, &expected, false).is_err());
    }

    #[test]
    fn test_nullable_rules() {
        let ctx = Context::default();
        let nullable = Type::nullable(u(BasicKind::U32));

        assert!(match_types(&ctx, &nullable, &Type::Null, true).is_ok());
        assert!(match_types(&ctx, &nullable, &u(BasicKind::U32), true).is_ok());
        assert!(match_types(&ctx, &u(BasicKind::U32), &nullable, false).is_err());
        assert!(match_types(&ctx, &u(BasicKind::U32), &Type::Null, false).is_err());
    }

    #[test]
    fn test_struct_width_subtyping() {
        let ctx = Context::default();
        let narrow = Type::Struct(StructType {
            fields: vec![StructField {
                name: "x".into(),
                type_id: u(BasicKind::U32),
            }],
        });
        let wide = Type::Struct(StructType {
            fields: vec![
                StructField {
                    name: "x".into(),
                    type_id: u(BasicKind::U32),
                },
                StructField {
                    name: "y".into(),
                    type_id: Type::Boolean,
                },
            ],
        });

        assert!(match_types(&ctx, &narrow, &wide, false).is_ok());
        assert!(match_types(&ctx, &narrow, &wide, true).is_err());
        assert!(match_types(&ctx, &wide, &narrow, false).is_err());
    }

    #[test]
    fn test_function_parameters_are_contravariant() {
        let ctx = Context::default();
        let take_wide = Type::function(
            vec![FunctionParameter {
                name: "x".into(),
                type_id: u(BasicKind::U32),
                mutable: false,
            }],
            Type::Void,
        );
        let take_narrow = Type::function(
            vec![FunctionParameter {
                name: "x".into(),
                type_id: u(BasicKind::U8),
                mutable: false,
            }],
            Type::Void,
        );

        // A function expecting u8 cannot stand where one expecting u32 is
        // required under strict parameter matching.
        assert!(match_types(&ctx, &take_wide, &take_narrow, false).is_err());
        assert!(match_types(&ctx, &take_wide, &take_wide, true).is_ok());
    }

    #[test]
    fn test_enum_numeric_coercion_lax_only() {
        let ctx = Context::default();
        let color = Type::Enum(EnumType {
            name: "Color".into(),
            members: vec![("red".into(), 0), ("green".into(), 1)],
            backing: BasicKind::U8,
        });

        assert!(match_types(&ctx, &color, &u(BasicKind::U8), false).is_ok());
        assert!(match_types(&ctx, &u(BasicKind::U8), &color, false).is_ok());
        assert!(match_types(&ctx, &color, &u(BasicKind::U8), true).is_err());
        assert!(match_types(&ctx, &color, &u(BasicKind::U16), false).is_err());
    }

    #[test]
    fn test_string_enum_accepts_string_class() {
        let ctx = Context::default();
        let string_enum = Type::StringEnum(StringEnumType {
            values: vec!["on".into(), "off".into()],
        });

        assert!(match_types(&ctx, &string_enum, &ctx.string_type(), false).is_ok());

        let subset = Type::StringEnum(StringEnumType {
            values: vec!["on".into()],
        });
        assert!(match_types(&ctx, &string_enum, &subset, false).is_ok());
        assert!(match_types(&ctx, &subset, &string_enum, false).is_err());
    }

    #[test]
    fn test_unreachable_matches_everything() {
        let ctx = Context::default();
        assert!(match_types(&ctx, &Type::Boolean, &Type::Unreachable, true).is_ok());
        assert!(match_types(&ctx, &Type::Unreachable, &Type::Boolean, true).is_ok());
    }

    #[test]
    fn test_matcher_terminates_on_self_referential_class() {
        use std::cell::RefCell;
        use std::rc::Rc;

        use crate::ast::FunctionBody;
        use crate::location::Location;
        use crate::typechecker::types::{
            ClassMethod, ClassType, FunctionParameter, FunctionType, InterfaceType,
            MethodSignature,
        };

        let ctx = Context::default();

        // class Node { fn next(other: Node) -> Node }
        let class = Rc::new(RefCell::new(ClassType {
            id: ctx.next_class_id(),
            name: "Node".into(),
            attributes: vec![],
            methods: vec![],
            all_methods: vec![],
            super_interfaces: vec![],
            resolving: false,
            resolved: true,
            position: Location::default(),
        }));
        let self_type = Type::Class(Rc::clone(&class));
        let signature = FunctionType::new(
            vec![FunctionParameter {
                name: "other".into(),
                type_id: self_type.clone(),
                mutable: false,
            }],
            self_type.clone(),
        );
        class
            .borrow_mut()
            .methods
            .push(Rc::new(RefCell::new(ClassMethod {
                name: "next".into(),
                signature: signature.clone(),
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
            })));

        // Nominal reflexivity through the cycle.
        assert!(match_types(&ctx, &self_type, &self_type, true).is_ok());

        // An interface mentioning the class recursively still terminates.
        let interface = Type::Interface(InterfaceType::new(
            None,
            vec![MethodSignature {
                name: "next".into(),
                signature,
            }],
            vec![],
        ));
        assert!(match_types(&ctx, &interface, &self_type, false).is_ok());
        assert!(match_types(&ctx, &interface, &Type::Boolean, false).is_err());
    }
}
