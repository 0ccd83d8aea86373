use stylish_ast::{Node, Variable};
use stylish_expr::ExpressionParser;

use super::Parser;
use crate::error::Error;

impl<'a, P: ExpressionParser> Parser<'a, P> {
    /// `!name [||] = expr`. The leading `!` is what routes here
    /// from `child()`; by that point this production is committed.
    pub(crate) fn variable(&mut self) -> Result<Node, Error> {
        let line = self.scanner.line();
        self.expect_char('!', "\"!\"")?;
        let name = self.expect_ident("variable name")?;
        self.skip_ws_inline();
        let guarded = self.consume_literal("||");
        if guarded {
            self.skip_ws_inline();
        }
        self.expect_char('=', "\"=\"")?;
        self.skip_ws_inline();
        let expr = self.expr()?;
        Ok(Node::Variable(Variable {
            line,
            name,
            expr,
            guarded,
        }))
    }
}
