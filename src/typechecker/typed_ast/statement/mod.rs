mod block;
mod flow;
mod if_statement;
mod initialisation;
mod loops;
mod return_statement;

use crate::ast::Statement;
use crate::typechecker::context::Context;
use crate::typechecker::types::Type;
use crate::typechecker::{TypeCheckable, TypeInformation, TypeResult};

impl TypeCheckable for Statement<()> {
    type Typed = Statement<TypeInformation>;

    fn check(self, ctx: &mut Context, hint: Option<&Type>) -> TypeResult<Self::Typed> {
        match self {
            Statement::Expression(expression) => {
                Ok(Statement::Expression(expression.check(ctx, hint)?))
            }
            Statement::Initialisation(initialisation) => {
                Ok(Statement::Initialisation(initialisation.check(ctx, None)?))
            }
            Statement::Return(return_statement) => {
                Ok(Statement::Return(return_statement.check(ctx, None)?))
            }
            Statement::If(if_statement) => Ok(Statement::If(if_statement.check(ctx, None)?)),
            Statement::While(while_loop) => Ok(Statement::While(while_loop.check(ctx, None)?)),
            Statement::For(for_loop) => Ok(Statement::For(for_loop.check(ctx, None)?)),
            Statement::Foreach(foreach_loop) => {
                Ok(Statement::Foreach(foreach_loop.check(ctx, None)?))
            }
            Statement::Break(break_statement) => {
                Ok(Statement::Break(flow::check_break(ctx, break_statement)?))
            }
            Statement::Continue(continue_statement) => Ok(Statement::Continue(
                flow::check_continue(ctx, continue_statement)?,
            )),
            Statement::Yield(yield_statement) => {
                Ok(Statement::Yield(yield_statement.check(ctx, None)?))
            }
            Statement::Block(block) => Ok(Statement::Block(block.check(ctx, None)?)),
        }
    }
}
