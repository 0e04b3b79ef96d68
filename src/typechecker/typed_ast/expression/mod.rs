mod async_expression;
mod binary;
mod cast;
mod construction;
mod do_expression;
mod id;
mod if_expression;
mod lambda;
mod literal;
mod match_expression;
mod mutate;
mod new;
mod postfix;
mod struct_initialisation;
mod this;
mod throw;
mod unary;

pub(crate) use self::construction::check_tuple_construction;

use crate::ast::{ArrayElement, Expression, LambdaBody, Literal};
use crate::typechecker::context::Context;
use crate::typechecker::error::{TypeCheckError, TypeMismatch};
use crate::typechecker::types::Type;
use crate::typechecker::{TypeCheckable, TypeInformation, TypeResult, TypedConstruct};

impl TypeCheckable for Expression<()> {
    type Typed = Expression<TypeInformation>;

    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        match self {
            Expression::Id(id) => Ok(Expression::Id(id.check(ctx, hint)?)),
            Expression::Literal(literal) => Ok(Expression::Literal(literal.check(ctx, hint)?)),
            Expression::Binary(binary) => {
                Ok(Expression::Binary(Box::new(binary.check(ctx, hint)?)))
            }
            Expression::Unary(unary) => Ok(Expression::Unary(Box::new(unary.check(ctx, hint)?))),
            Expression::Postfix(postfix) => Ok(Expression::Postfix(postfix.check(ctx, hint)?)),
            Expression::New(new) => Ok(Expression::New(new.check(ctx, hint)?)),
            Expression::Cast(cast) => Ok(Expression::Cast(Box::new(cast.check(ctx, hint)?))),
            Expression::IfElse(if_else) => {
                Ok(Expression::IfElse(Box::new(if_else.check(ctx, hint)?)))
            }
            Expression::Match(match_expression) => Ok(Expression::Match(Box::new(
                match_expression.check(ctx, hint)?,
            ))),
            Expression::Do(do_expression) => {
                Ok(Expression::Do(do_expression.check(ctx, hint)?))
            }
            Expression::Lambda(lambda) => Ok(Expression::Lambda(lambda.check(ctx, hint)?)),
            Expression::This(this) => Ok(Expression::This(this.check(ctx, hint)?)),
            Expression::Spawn(spawn) => Ok(Expression::Spawn(Box::new(spawn.check(ctx, hint)?))),
            Expression::Await(await_expression) => Ok(Expression::Await(Box::new(
                await_expression.check(ctx, hint)?,
            ))),
            Expression::Throw(throw) => Ok(Expression::Throw(Box::new(throw.check(ctx, hint)?))),
            Expression::Mutate(mutate) => {
                Ok(Expression::Mutate(Box::new(mutate.check(ctx, hint)?)))
            }
            Expression::Unreachable(unreachable) => {
                Ok(Expression::Unreachable(unreachable.check(ctx, hint)?))
            }
            Expression::Tuple(tuple) => Ok(Expression::Tuple(tuple.check(ctx, hint)?)),
            Expression::Array(array) => Ok(Expression::Array(array.check(ctx, hint)?)),
            Expression::StructInit(init) => Ok(Expression::StructInit(init.check(ctx, hint)?)),
            Expression::AnonStructInit(init) => {
                Ok(Expression::AnonStructInit(init.check(ctx, hint)?))
            }
        }
    }
}

/// Push a late hint into an already-checked expression. Literal-bearing
/// nodes settle their inferred type (with a fit check); everything else
/// records the hint for code generation and keeps its type.
impl TypedConstruct for Expression<TypeInformation> {
    fn update_type(&mut self, type_id: Type) -> TypeResult<()> {
        *self.get_info().hint.borrow_mut() = Some(type_id.clone());

        match self {
            Expression::Literal(literal) => update_literal(literal, type_id),
            Expression::Array(array) => {
                if let Type::Array { element, .. } = type_id.dereference() {
                    for array_element in array.elements.iter_mut() {
                        match array_element {
                            ArrayElement::Single(expression) => {
                                expression.update_type((*element).clone())?
                            }
                            ArrayElement::Spread(expression) => {
                                expression.update_type(Type::array((*element).clone()))?
                            }
                        }
                    }
                    *array.info.type_id.borrow_mut() = Some(type_id);
                }
                Ok(())
            }
            Expression::IfElse(if_else) => {
                for branch in if_else.branches.iter_mut() {
                    branch.update_type(type_id.clone())?;
                }
                *if_else.info.type_id.borrow_mut() = Some(type_id);
                Ok(())
            }
            Expression::Match(match_expression) => {
                for case in match_expression.cases.iter_mut() {
                    case.body.update_type(type_id.clone())?;
                }
                *match_expression.info.type_id.borrow_mut() = Some(type_id);
                Ok(())
            }
            Expression::Lambda(lambda) => {
                if let LambdaBody::Expression(body) = &mut lambda.body {
                    if let Type::Function(function) = type_id.dereference() {
                        body.update_type((*function.return_type).clone())?;
                    }
                }
                Ok(())
            }
            // The inferred type of every other node is already final; only
            // the hint is recorded.
            _ => Ok(()),
        }
    }
}

fn update_literal(literal: &mut Literal<TypeInformation>, type_id: Type) -> TypeResult<()> {
    let Literal::Integer(value, info, position) = literal else {
        return Ok(());
    };
    let current = info.type_id.borrow().clone();
    if !matches!(current, Some(Type::LiteralInt(_))) {
        return Ok(());
    }
    match type_id.dereference() {
        Type::Basic(kind) | Type::LiteralInt(kind) => {
            if !kind.fits(*value) {
                return Err(TypeCheckError::TypeMismatch(
                    TypeMismatch {
                        expected: Type::Basic(kind),
                        actual: current.unwrap_or(Type::Unset),
                        detail: Some(format!("literal {value} does not fit into {kind}")),
                    },
                    position.clone(),
                ));
            }
            *info.type_id.borrow_mut() = Some(Type::Basic(kind));
            Ok(())
        }
        _ => Ok(()),
    }
}
