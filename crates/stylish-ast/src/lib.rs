//! Abstract syntax tree for the Stylish stylesheet dialect.
//!
//! Every node carries the 1-based source line on which its first
//! contributing token appeared. The grammar engine (in `stylish-parser`)
//! builds these; nothing in this crate parses or evaluates anything.

mod expr;
mod node;
mod span;

pub use expr::{ArgList, Expr};
pub use node::{
    Comment, Debug, Declaration, Directive, For, If, Import, MixinDefinition, MixinInvocation,
    Node, Root, Rule, Variable, While,
};
pub use span::Span;
