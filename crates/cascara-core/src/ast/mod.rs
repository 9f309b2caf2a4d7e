//! The block tree produced by parsing.

mod block;
mod tree;

pub use block::{Block, Declaration, Position, Span};
pub use tree::AbstractTree;
