mod block;
mod flow;
mod for_loop;
mod foreach_loop;
mod if_statement;
mod initialisation;
mod return_statement;
mod while_loop;

pub use self::block::*;
pub use self::flow::*;
pub use self::for_loop::*;
pub use self::foreach_loop::*;
pub use self::if_statement::*;
pub use self::initialisation::*;
pub use self::return_statement::*;
pub use self::while_loop::*;

use serde::{Deserialize, Serialize};

use crate::ast::Expression;
use crate::location::Location;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Statement<I> {
    Expression(Expression<I>),
    Initialisation(Initialisation<I>),
    Return(ReturnStatement<I>),
    If(IfStatement<I>),
    While(WhileLoop<I>),
    For(ForLoop<I>),
    Foreach(ForeachLoop<I>),
    Break(BreakStatement),
    Continue(ContinueStatement),
    Yield(YieldStatement<I>),
    Block(Block<I>),
}

impl<I> Statement<I> {
    pub fn position(&self) -> Location {
        match self {
            Statement::Expression(expression) => expression.position(),
            Statement::Initialisation(initialisation) => initialisation.position.clone(),
            Statement::Return(return_statement) => return_statement.position.clone(),
            Statement::If(if_statement) => if_statement.position.clone(),
            Statement::While(while_loop) => while_loop.position.clone(),
            Statement::For(for_loop) => for_loop.position.clone(),
            Statement::Foreach(foreach_loop) => foreach_loop.position.clone(),
            Statement::Break(break_statement) => break_statement.position.clone(),
            Statement::Continue(continue_statement) => continue_statement.position.clone(),
            Statement::Yield(yield_statement) => yield_statement.position.clone(),
            Statement::Block(block) => block.position.clone(),
        }
    }
}
