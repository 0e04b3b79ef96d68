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

pub use self::async_expression::*;
pub use self::binary::*;
pub use self::cast::*;
pub use self::construction::*;
pub use self::do_expression::*;
pub use self::id::*;
pub use self::if_expression::*;
pub use self::lambda::*;
pub use self::literal::*;
pub use self::match_expression::*;
pub use self::mutate::*;
pub use self::new::*;
pub use self::postfix::*;
pub use self::struct_initialisation::*;
pub use self::this::*;
pub use self::throw::*;
pub use self::unary::*;

use serde::{Deserialize, Serialize};

use crate::location::Location;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Expression<I> {
    Id(Id<I>),
    Literal(Literal<I>),
    Binary(Box<BinaryExpression<I>>),
    Unary(Box<UnaryExpression<I>>),
    Postfix(Postfix<I>),
    New(New<I>),
    Cast(Box<CastExpression<I>>),
    IfElse(Box<IfElseExpression<I>>),
    Match(Box<MatchExpression<I>>),
    Do(DoExpression<I>),
    Lambda(Lambda<I>),
    This(This<I>),
    Spawn(Box<SpawnExpression<I>>),
    Await(Box<AwaitExpression<I>>),
    Throw(Box<ThrowExpression<I>>),
    Mutate(Box<MutateExpression<I>>),
    Unreachable(UnreachableExpression<I>),
    Tuple(TupleConstruction<I>),
    Array(ArrayConstruction<I>),
    StructInit(StructInitialisation<I>),
    AnonStructInit(AnonymousStructInitialisation<I>),
}

impl<I> Expression<I>
where
    I: Clone,
{
    pub fn get_info(&self) -> I {
        match self {
            Expression::Id(id) => id.info.clone(),
            Expression::Literal(literal) => literal.get_info(),
            Expression::Binary(binary) => binary.info.clone(),
            Expression::Unary(unary) => unary.info.clone(),
            Expression::Postfix(postfix) => postfix.get_info(),
            Expression::New(new) => new.info.clone(),
            Expression::Cast(cast) => cast.info.clone(),
            Expression::IfElse(if_else) => if_else.info.clone(),
            Expression::Match(match_expression) => match_expression.info.clone(),
            Expression::Do(do_expression) => do_expression.info.clone(),
            Expression::Lambda(lambda) => lambda.info.clone(),
            Expression::This(this) => this.info.clone(),
            Expression::Spawn(spawn) => spawn.info.clone(),
            Expression::Await(await_expression) => await_expression.info.clone(),
            Expression::Throw(throw) => throw.info.clone(),
            Expression::Mutate(mutate) => mutate.info.clone(),
            Expression::Unreachable(unreachable) => unreachable.info.clone(),
            Expression::Tuple(tuple) => tuple.info.clone(),
            Expression::Array(array) => array.info.clone(),
            Expression::StructInit(init) => init.info.clone(),
            Expression::AnonStructInit(init) => init.info.clone(),
        }
    }
}

impl<I> Expression<I> {
    pub fn position(&self) -> Location {
        match self {
            Expression::Id(id) => id.position.clone(),
            Expression::Literal(literal) => literal.position(),
            Expression::Binary(binary) => binary.position.clone(),
            Expression::Unary(unary) => unary.position.clone(),
            Expression::Postfix(postfix) => postfix.position(),
            Expression::New(new) => new.position.clone(),
            Expression::Cast(cast) => cast.position.clone(),
            Expression::IfElse(if_else) => if_else.position.clone(),
            Expression::Match(match_expression) => match_expression.position.clone(),
            Expression::Do(do_expression) => do_expression.position.clone(),
            Expression::Lambda(lambda) => lambda.position.clone(),
            Expression::This(this) => this.position.clone(),
            Expression::Spawn(spawn) => spawn.position.clone(),
            Expression::Await(await_expression) => await_expression.position.clone(),
            Expression::Throw(throw) => throw.position.clone(),
            Expression::Mutate(mutate) => mutate.position.clone(),
            Expression::Unreachable(unreachable) => unreachable.position.clone(),
            Expression::Tuple(tuple) => tuple.position.clone(),
            Expression::Array(array) => array.position.clone(),
            Expression::StructInit(init) => init.position.clone(),
            Expression::AnonStructInit(init) => init.position.clone(),
        }
    }
}

impl<I> Postfix<I>
where
    I: Clone,
{
    pub fn get_info(&self) -> I {
        match self {
            Postfix::Call { info, .. }
            | Postfix::Index { info, .. }
            | Postfix::MemberAccess { info, .. } => info.clone(),
        }
    }
}

impl<I> Postfix<I> {
    pub fn position(&self) -> Location {
        match self {
            Postfix::Call { position, .. }
            | Postfix::Index { position, .. }
            | Postfix::MemberAccess { position, .. } => position.clone(),
        }
    }
}
