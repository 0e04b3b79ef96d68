use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::{Id, Initialisation};
use crate::typechecker::context::Context;
use crate::typechecker::error::{StructuralViolation, TypeCheckError};
use crate::typechecker::types::Type;
use crate::typechecker::{TypeCheckable, TypeInformation, TypeResult, TypedConstruct};

impl TypeCheckable for Initialisation<()> {
    type Typed = Initialisation<TypeInformation>;

    fn check(self, ctx: &mut Context, _hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let Initialisation {
            id,
            mutable,
            type_name,
            value,
            position,
            ..
        } = self;

        let declared = match &type_name {
            Some(type_name) => Some(Type::try_from((type_name.clone(), &*ctx))?),
            None => None,
        };

        let mut value = value.check(ctx, declared.as_ref())?;

        // With no annotation the binding adopts the value's type; a literal
        // settles to its storage kind at the binding point.
        let binding_type = match declared {
            Some(declared) => declared,
            None => match value.get_info().resolved_type() {
                Type::LiteralInt(kind) => {
                    let settled = Type::Basic(kind);
                    value.update_type(settled.clone())?;
                    settled
                }
                other => other,
            },
        };

        if !binding_type.is_value_type() {
            return Err(TypeCheckError::StructuralViolation(
                StructuralViolation::new(format!(
                    "'{binding_type:?}' can not be stored in a variable"
                )),
                position,
            ));
        }

        let constant_value = !mutable && value.get_info().constant;
        let slot = Rc::new(RefCell::new(Some(binding_type.clone())));
        ctx.scope.add_variable(
            &id.name,
            Rc::clone(&slot),
            mutable,
            constant_value,
            id.position.clone(),
        );

        let mut id_info = TypeInformation::new(ctx, binding_type, None);
        id_info.type_id = slot;
        id_info.constant = constant_value;
        Ok(Initialisation {
            id: Id {
                name: id.name,
                type_args: vec![],
                info: id_info,
                position: id.position,
            },
            mutable,
            type_name,
            value,
            info: TypeInformation::new(ctx, Type::Void, None),
            position,
        })
    }
}

#[cfg(test)]
mod tests {
    type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

    use crate::ast::{Expression, Id, Initialisation, Literal, TypeName};
    use crate::location::Location;
    use crate::typechecker::context::Context;
    use crate::typechecker::types::{BasicKind, Type};
    use crate::typechecker::TypeCheckable;

    #[test]
    fn test_annotated_initialisation() -> Result<()> {
        let mut ctx = Context::default();
        let initialisation = Initialisation {
            id: Id::new("x"),
            mutable: false,
            type_name: Some(TypeName::named("u16")),
            value: Expression::Literal(Literal::Integer(300, (), Location::default())),
            info: (),
            position: Location::default(),
        };

        initialisation.check(&mut ctx, None)?;

        let stored = ctx.scope.resolve_variable("x").unwrap();
        assert_eq!(
            stored.type_id.borrow().clone(),
            Some(Type::Basic(BasicKind::U16))
        );
        assert!(stored.constant_value);
        Ok(())
    }

    #[test]
    fn test_inferred_initialisation_settles_literal() -> Result<()> {
        let mut ctx = Context::default();
        let initialisation = Initialisation {
            id: Id::new("x"),
            mutable: true,
            type_name: None,
            value: Expression::Literal(Literal::Integer(5, (), Location::default())),
            info: (),
            position: Location::default(),
        };

        initialisation.check(&mut ctx, None)?;

        let stored = ctx.scope.resolve_variable("x").unwrap();
        assert_eq!(
            stored.type_id.borrow().clone(),
            Some(Type::Basic(BasicKind::I32))
        );
        assert!(stored.mutable);
        assert!(!stored.constant_value);
        Ok(())
    }

    #[test]
    fn test_annotation_mismatch() {
        let mut ctx = Context::default();
        let initialisation = Initialisation {
            id: Id::new("x"),
            mutable: false,
            type_name: Some(TypeName::named("bool")),
            value: Expression::Literal(Literal::Str("no".into(), (), Location::default())),
            info: (),
            position: Location::default(),
        };

        assert!(initialisation.check(&mut ctx, None).is_err());
    }
}
