use crate::ast::Id;
use crate::typechecker::context::Context;
use crate::typechecker::error::{StructuralViolation, TypeCheckError, UndefinedVariable};
use crate::typechecker::functions::instantiate_function;
use crate::typechecker::generics::build_substitution;
use crate::typechecker::scope::TypeSymbol;
use crate::typechecker::types::Type;
use crate::typechecker::{confirm_hint, TypeCheckable, TypeInformation, TypeResult};

impl TypeCheckable for Id<()> {
    type Typed = Id<TypeInformation>;

    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let Id {
            name,
            type_args,
            position,
            ..
        } = self;

        // Value bindings shadow functions, which shadow type names.
        if let Some(variable) = ctx.scope.resolve_variable(&name) {
            variable.used.set(true);
            let type_id = variable.type_id.borrow().clone().unwrap_or(Type::Unset);
            confirm_hint(ctx, hint, &type_id, &position)?;
            let mut info = TypeInformation::new(ctx, type_id, hint);
            info.type_id = variable.type_id;
            info.constant = variable.constant_value;
            return Ok(Id {
                name,
                type_args,
                info,
                position,
            });
        }

        if let Some(function) = ctx.scope.get_function(&name) {
            let is_generic = function.borrow().is_generic();
            let type_id = if is_generic {
                if type_args.is_empty() {
                    return Err(TypeCheckError::StructuralViolation(
                        StructuralViolation::new(format!(
                            "generic function '{name}' needs explicit type arguments here"
                        )),
                        position,
                    ));
                }
                let mut explicit = Vec::with_capacity(type_args.len());
                for type_arg in &type_args {
                    explicit.push(Type::try_from((type_arg.clone(), &*ctx))?);
                }
                let (generics, parameter_types) = {
                    let function = function.borrow();
                    (function.generics.clone(), function.signature.parameter_types())
                };
                let substitution = build_substitution(
                    ctx,
                    &name,
                    &generics,
                    &parameter_types,
                    &[],
                    &explicit,
                    &position,
                )?;
                let instance = instantiate_function(ctx, &function, &substitution, &position)?;
                let instance = instance.borrow();
                instance.function_type()
            } else {
                function
                    .borrow()
                    .type_slot
                    .borrow()
                    .clone()
                    .unwrap_or(Type::Unset)
            };
            confirm_hint(ctx, hint, &type_id, &position)?;
            return Ok(Id {
                name,
                type_args,
                info: TypeInformation::new(ctx, type_id, hint),
                position,
            });
        }

        // Type names in expression position become meta types, enabling
        // static dispatch and variant construction syntax.
        match ctx.scope.get_type_symbol(&name) {
            Some(TypeSymbol::Type(type_id)) => {
                let meta = match type_id.dereference() {
                    Type::Class(class) => Some(Type::MetaClass(class)),
                    other => {
                        // Enums and string enums are reachable through
                        // member access; other type names are not values.
                        let _ = other;
                        None
                    }
                };
                if let Some(meta) = meta {
                    confirm_hint(ctx, hint, &meta, &position)?;
                    return Ok(Id {
                        name,
                        type_args,
                        info: TypeInformation::new(ctx, meta, hint),
                        position,
                    });
                }
            }
            Some(TypeSymbol::Variant(template)) => {
                let mut args = Vec::with_capacity(type_args.len());
                for type_arg in &type_args {
                    args.push(Type::try_from((type_arg.clone(), &*ctx))?);
                }
                let variant = template.instantiate(ctx, &args, &position)?;
                let meta = Type::MetaVariant(variant);
                confirm_hint(ctx, hint, &meta, &position)?;
                return Ok(Id {
                    name,
                    type_args,
                    info: TypeInformation::new(ctx, meta, hint),
                    position,
                });
            }
            None => {}
        }

        Err(TypeCheckError::UndefinedVariable(
            UndefinedVariable {
                variable_name: name,
            },
            position,
        ))
    }
}

impl Id<TypeInformation> {
    /// The mutability of the binding behind this id, if it is one.
    pub fn binding_mutability(&self, ctx: &Context) -> Option<bool> {
        ctx.scope.resolve_variable(&self.name).map(|v| v.mutable)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;

    use crate::ast::Id;
    use crate::location::Location;
    use crate::typechecker::context::Context;
    use crate::typechecker::error::{TypeCheckError, UndefinedVariable};
    use crate::typechecker::types::{BasicKind, Type};
    use crate::typechecker::TypeCheckable;

    #[test]
    fn test_variable_lookup() -> Result<()> {
        let mut ctx = Context::default();
        ctx.scope.add_variable(
            "foo",
            Rc::new(RefCell::new(Some(Type::Basic(BasicKind::U32)))),
            false,
            true,
            Location::default(),
        );

        let id = Id::new("foo").check(&mut ctx, None)?;
        assert_eq!(
            id.info.type_id.borrow().clone(),
            Some(Type::Basic(BasicKind::U32))
        );
        assert!(id.info.constant);
        Ok(())
    }

    #[test]
    fn test_unknown_name() {
        let mut ctx = Context::default();
        let result = Id::new("missing").check(&mut ctx, None);
        assert_eq!(
            result,
            Err(TypeCheckError::UndefinedVariable(
                UndefinedVariable {
                    variable_name: "missing".into()
                },
                Location::default()
            ))
        );
    }
}
