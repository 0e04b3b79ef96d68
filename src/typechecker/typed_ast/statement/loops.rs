use std::cell::RefCell;
use std::rc::Rc;

use crate::ast::{ForLoop, ForeachLoop, Id, WhileLoop};
use crate::typechecker::context::Context;
use crate::typechecker::error::{TypeCheckError, TypeMismatch, UndefinedVariable};
use crate::typechecker::matcher::as_interface;
use crate::typechecker::operators::ITERATOR_METHOD;
use crate::typechecker::types::Type;
use crate::typechecker::{TypeCheckable, TypeInformation, TypeResult};

impl TypeCheckable for WhileLoop<()> {
    type Typed = WhileLoop<TypeInformation>;

    fn check(self, ctx: &mut Context, _hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let WhileLoop {
            condition,
            block,
            position,
            ..
        } = self;

        let condition = condition.check(ctx, Some(&Type::Boolean))?;

        let mut inner = ctx.clone();
        inner.within_loop = true;
        let block = block.check(&mut inner, None)?;

        Ok(WhileLoop {
            condition,
            block,
            info: TypeInformation::new(ctx, Type::Void, None),
            position,
        })
    }
}

impl TypeCheckable for ForLoop<()> {
    type Typed = ForLoop<TypeInformation>;

    fn check(self, ctx: &mut Context, _hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let ForLoop {
            init,
            condition,
            step,
            block,
            position,
            ..
        } = self;

        // The init binding is visible to the condition, step and body.
        let mut inner = ctx.clone();
        inner.scope.enter_scope();

        let init = match init {
            Some(init) => Some(init.check(&mut inner, None)?),
            None => None,
        };
        let condition = match condition {
            Some(condition) => Some(condition.check(&mut inner, Some(&Type::Boolean))?),
            None => None,
        };

        inner.within_loop = true;
        let step = match step {
            Some(step) => Some(Box::new(step.check(&mut inner, None)?)),
            None => None,
        };
        let block = block.check(&mut inner, None)?;

        Ok(ForLoop {
            init,
            condition,
            step,
            block,
            info: TypeInformation::new(ctx, Type::Void, None),
            position,
        })
    }
}

impl TypeCheckable for ForeachLoop<()> {
    type Typed = ForeachLoop<TypeInformation>;

    fn check(self, ctx: &mut Context, _hint: Option<&Type>) -> TypeResult<Self::Typed> {
        let ForeachLoop {
            binding,
            iterable,
            block,
            position,
            ..
        } = self;

        let iterable = iterable.check(ctx, None)?;
        let iterable_type = iterable.get_info().resolved_type();

        let element_type = match iterable_type.dereference() {
            Type::Array { element, .. } => *element,
            Type::Class(_) | Type::Interface(_) => {
                iterator_element_type(ctx, &iterable_type, &position)?
            }
            other => {
                return Err(TypeCheckError::TypeMismatch(
                    TypeMismatch {
                        expected: Type::array(Type::Unset),
                        actual: other,
                        detail: Some(
                            "'foreach' needs an array or a value exposing the iterator protocol"
                                .to_string(),
                        ),
                    },
                    position,
                ))
            }
        };

        let mut inner = ctx.clone();
        inner.scope.enter_scope();
        inner.within_loop = true;
        let slot = Rc::new(RefCell::new(Some(element_type.clone())));
        inner.scope.add_variable(
            &binding.name,
            Rc::clone(&slot),
            false,
            false,
            binding.position.clone(),
        );
        let block = block.check(&mut inner, None)?;

        let mut binding_info = TypeInformation::new(ctx, element_type, None);
        binding_info.type_id = slot;
        Ok(ForeachLoop {
            binding: Id {
                name: binding.name,
                type_args: vec![],
                info: binding_info,
                position: binding.position,
            },
            iterable,
            block,
            iterator_name: Some(ctx.next_iterator_name()),
            info: TypeInformation::new(ctx, Type::Void, None),
            position,
        })
    }
}

/// The iterator protocol: `getIterable()` returning a value whose type
/// exposes `hasNext(): bool` and `next(): T`; `T` is the element type.
fn iterator_element_type(
    ctx: &Context,
    iterable: &Type,
    position: &crate::location::Location,
) -> TypeResult<Type> {
    let missing = |name: &str| {
        TypeCheckError::UndefinedVariable(
            UndefinedVariable {
                variable_name: name.to_string(),
            },
            position.clone(),
        )
    };

    let interface = as_interface(iterable).ok_or_else(|| missing(ITERATOR_METHOD))?;
    let get_iterable = interface
        .find_methods(ITERATOR_METHOD)
        .into_iter()
        .find(|m| m.signature.parameters.is_empty())
        .ok_or_else(|| missing(ITERATOR_METHOD))?;

    let iterator = as_interface(&get_iterable.signature.return_type)
        .ok_or_else(|| missing("hasNext"))?;

    let has_next = iterator
        .find_methods("hasNext")
        .into_iter()
        .find(|m| m.signature.parameters.is_empty())
        .ok_or_else(|| missing("hasNext"))?;
    if !matches!(has_next.signature.return_type.dereference(), Type::Boolean) {
        return Err(TypeCheckError::TypeMismatch(
            TypeMismatch {
                expected: Type::Boolean,
                actual: (*has_next.signature.return_type).clone(),
                detail: Some("'hasNext' must return bool".to_string()),
            },
            position.clone(),
        ));
    }

    let next = iterator
        .find_methods("next")
        .into_iter()
        .find(|m| m.signature.parameters.is_empty())
        .ok_or_else(|| missing("next"))?;

    Ok((*next.signature.return_type).clone())
}
