use crate::ast::New;
use crate::typechecker::classes::resolve_init;
use crate::typechecker::context::Context;
use crate::typechecker::error::{ArityMismatch, StructuralViolation, TypeCheckError};
use crate::typechecker::types::{ResolvedCallee, Type};
use crate::typechecker::{confirm_hint, TypeCheckable, TypeInformation, TypeResult};

use super::postfix::{apply_signature, infer_arguments};

impl TypeCheckable for New<()> {
    type Typed = New<TypeInformation>;

    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let New {
            class,
            args,
            position,
            ..
        } = self;

        let target = Type::try_from((class.clone(), &*ctx))?;
        let Type::Class(class_ref) = target.dereference() else {
            return Err(TypeCheckError::StructuralViolation(
                StructuralViolation::new(format!(
                    "'new' constructs classes, '{target:?}' is not one"
                )),
                position,
            ));
        };

        let (mut args, arg_types) = infer_arguments(ctx, args)?;
        let init = resolve_init(ctx, &class_ref, &arg_types, &position)?;

        let resolved = match init {
            Some(init) => {
                let signature = init.borrow().signature.clone();
                apply_signature(ctx, &mut args, &signature)?;
                Some(ResolvedCallee::ClassMethod(init))
            }
            None => {
                if !args.is_empty() {
                    return Err(TypeCheckError::ArityMismatch(
                        ArityMismatch {
                            name: class_ref.borrow().name.clone(),
                            expected: 0,
                            actual: args.len(),
                        },
                        position,
                    ));
                }
                None
            }
        };

        let type_id = Type::Class(class_ref);
        confirm_hint(ctx, hint, &type_id, &position)?;
        Ok(New {
            class,
            args,
            resolved,
            info: TypeInformation::new(ctx, type_id, hint),
            position,
        })
    }
}
