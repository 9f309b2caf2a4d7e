//! Flattening renderer.
//!
//! Rendering walks the block tree and distributes every block into a named
//! output context: `root` for ordinary rules, or an at-rule prelude such as
//! `@media screen (min-width:600px)`. Selectors are combined with the
//! inherited parent selectors on the way down; contexts are concatenated in
//! first-seen order at the end.

mod context;

use crate::ast::{AbstractTree, Block};
use crate::error::{Error, Result};
use context::{ContextMap, ROOT_CONTEXT};

/// Prelude prefix that marks a responsive media query.
const RESPONSIVE_PREFIX: &str = "@media screen";

/// Flatten a block tree into CSS text.
///
/// # Returns
///
/// Returns the assembled stylesheet, or [`Error::Render`](crate::Error::Render)
/// carrying the offending block's start position when the tree nests
/// at-rules in a way that has no flat representation:
///
/// - a responsive media query inside a responsive media query,
/// - a responsive media query inside a color-scheme block,
/// - a color-scheme block inside a color-scheme block,
/// - any other at-rule inside any at-rule context.
///
/// A color-scheme block inside a responsive query is legal: it folds into
/// the enclosing responsive context instead of opening a sibling one.
pub fn render(tree: &AbstractTree) -> Result<String> {
    let mut output = ContextMap::new();
    for block in tree.iter() {
        render_block(block, &mut output, ROOT_CONTEXT, &[])?;
    }

    let css = output.assemble();
    tracing::debug!(bytes = css.len(), "rendered stylesheet");
    Ok(css)
}

fn render_block(
    block: &Block,
    output: &mut ContextMap,
    context: &str,
    parents: &[String],
) -> Result<()> {
    let prelude = block.prelude();

    // Responsive media query: opens (or re-enters) a context named after
    // its own prelude; the inherited selectors pass through unchanged.
    if prelude.starts_with(RESPONSIVE_PREFIX) {
        if is_responsive(context) {
            return Err(structure_error(
                block,
                "a responsive media query cannot be nested inside another responsive media query",
            ));
        }
        if is_color_scheme(context) {
            return Err(structure_error(
                block,
                "a responsive media query cannot be nested inside a color-scheme block",
            ));
        }
        output.enter(prelude);
        emit(block, output, prelude, parents);
        for child in &block.children {
            render_block(child, output, prelude, parents)?;
        }
        return Ok(());
    }

    // Color-scheme query: folds into an enclosing responsive context when
    // there is one, otherwise opens its own.
    if prelude.starts_with("@media") && prelude.contains("-color-scheme") {
        if is_color_scheme(context) {
            return Err(structure_error(
                block,
                "a color-scheme block cannot be nested inside another color-scheme block",
            ));
        }
        let target = if is_responsive(context) {
            let condition = first_paren_group(prelude).ok_or_else(|| {
                structure_error(block, "color-scheme query has no parenthesised condition")
            })?;
            // Longstanding output behavior: no whitespace around `and`.
            format!("{context}and{condition}")
        } else {
            prelude.to_string()
        };
        output.enter(&target);
        emit(block, output, &target, parents);
        for child in &block.children {
            render_block(child, output, &target, parents)?;
        }
        return Ok(());
    }

    // Any other at-rule: own context, and the inherited selectors do not
    // apply to its declarations.
    if prelude.starts_with('@') {
        if is_at_rule(context) {
            return Err(structure_error(
                block,
                "an at-rule cannot be nested inside another at-rule",
            ));
        }
        output.enter(prelude);
        emit(block, output, prelude, &[]);
        for child in &block.children {
            render_block(child, output, prelude, &[])?;
        }
        return Ok(());
    }

    // Ordinary rule: combine with the inherited selectors and stay in the
    // current context.
    let combined = combine_selectors(parents, &block.selectors);
    emit(block, output, context, &combined);
    for child in &block.children {
        render_block(child, output, context, &combined)?;
    }
    Ok(())
}

/// Serialise a block's declarations into its target context.
///
/// Rule blocks emit `sel1,sel2{name:value;name:value}`. At-rule blocks can
/// carry declarations with no selector at all (an empty list); those are
/// emitted bare with a trailing `;` so consecutive fragments stay well
/// formed.
fn emit(block: &Block, output: &mut ContextMap, context: &str, selectors: &[String]) {
    if block.declarations.is_empty() {
        return;
    }

    let mut declarations = String::new();
    for (index, declaration) in block.declarations.iter().enumerate() {
        if index > 0 {
            declarations.push(';');
        }
        declarations.push_str(&declaration.name);
        declarations.push(':');
        declarations.push_str(&declaration.value);
    }

    let fragment = if selectors.is_empty() {
        format!("{declarations};")
    } else {
        format!("{}{{{declarations}}}", selectors.join(","))
    };
    output.push(context, fragment);
}

/// Cross product of inherited parent selectors and the block's own.
///
/// A selector containing `&` substitutes the parent into it; anything else
/// becomes a descendant of the parent. With no parents the block's own
/// selectors are used unchanged.
fn combine_selectors(parents: &[String], selectors: &[String]) -> Vec<String> {
    if parents.is_empty() {
        return selectors.to_vec();
    }

    let mut combined = Vec::with_capacity(parents.len() * selectors.len());
    for parent in parents {
        for selector in selectors {
            if selector.contains('&') {
                combined.push(selector.replace('&', parent));
            } else {
                combined.push(format!("{parent} {selector}"));
            }
        }
    }
    combined
}

fn is_responsive(context: &str) -> bool {
    context.starts_with(RESPONSIVE_PREFIX)
}

fn is_color_scheme(context: &str) -> bool {
    context.starts_with("@media") && context.contains("-color-scheme")
}

fn is_at_rule(context: &str) -> bool {
    context.starts_with('@')
}

/// The first balanced `(...)` group of an at-rule prelude, parens included.
fn first_paren_group(prelude: &str) -> Option<&str> {
    let start = prelude.find('(')?;
    let mut depth = 0usize;
    for (offset, ch) in prelude[start..].char_indices() {
        match ch {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&prelude[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

fn structure_error(block: &Block, message: &str) -> Error {
    let position = block.span.map(|s| s.start).unwrap_or_default();
    Error::render(message, position.line, position.column)
}
