//! Nested-CSS parsing module.
//!
//! The parser is a single left-to-right character scan; it never backtracks
//! and never recovers. The first structural violation aborts the parse with
//! the position at which it was detected.

mod scanner;

use crate::ast::AbstractTree;
use crate::Result;
use scanner::Scanner;

/// Parse a nested stylesheet into a block tree.
///
/// # Arguments
///
/// * `source` - The stylesheet text, with nesting, at-rules and custom
///   properties.
///
/// # Returns
///
/// Returns `Ok(AbstractTree)` holding the root-level blocks in source
/// order, or [`Error::Parse`](crate::Error::Parse) with the 1-based line
/// and column of the first violation.
///
/// # Example
///
/// ```
/// let tree = cascara_core::parser::parse(".panel { color: red; }").unwrap();
/// assert_eq!(tree.len(), 1);
/// assert_eq!(tree.blocks[0].selectors, vec![".panel"]);
/// ```
pub fn parse(source: &str) -> Result<AbstractTree> {
    let tree = Scanner::new().run(source)?;
    tracing::debug!("parsed {} top-level blocks", tree.len());
    Ok(tree)
}
