//! The character-driven scan state machine.
//!
//! Ten characters are structural (`{` `}` `;` `:` `,` `&` `@` `"` `(` `)`);
//! everything else accumulates verbatim into a buffer that becomes a
//! selector or a declaration value once the next delimiter lands. What the
//! buffer will become is tracked as an explicit [`ScanMode`] value rather
//! than a set of independent flags, so states like "selector text with a
//! pending declaration name" cannot be represented at all.

use crate::ast::{AbstractTree, Block, Declaration, Position, Span};
use crate::error::{Error, Result};

/// What the accumulating buffer will become once the next delimiter lands.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ScanMode {
    /// Collecting selector text, possibly an at-rule prelude.
    ///
    /// `at_rule` is set once an `@` is seen and suppresses the structural
    /// meaning of `:` inside preludes like `@media (min-width:600px)`.
    /// `nested` is set once an `&` is seen and does the same for fragments
    /// like `&:hover`.
    Selector { at_rule: bool, nested: bool },
    /// Collecting the value of the declaration named `property`.
    ///
    /// `verbatim` is set for custom properties (names starting with `!`)
    /// and suppresses every structural character except `;`, so arbitrary
    /// text passes through untouched.
    Value { property: String, verbatim: bool },
}

impl ScanMode {
    fn selector() -> Self {
        ScanMode::Selector {
            at_rule: false,
            nested: false,
        }
    }

    fn is_value(&self) -> bool {
        matches!(self, ScanMode::Value { .. })
    }

    fn is_verbatim_value(&self) -> bool {
        matches!(self, ScanMode::Value { verbatim: true, .. })
    }
}

/// Single parse's worth of mutable state.
///
/// Created fresh per [`run`](Scanner::run) call and discarded afterwards;
/// nothing here outlives one parse.
pub(super) struct Scanner {
    /// Accumulator for the current token text.
    buffer: String,
    /// Currently open blocks, innermost last. Blocks are attached to their
    /// parent (or to the tree) when their closing brace is consumed.
    stack: Vec<Block>,
    /// Comma-separated selector fragments collected before the next `{`.
    selector_stack: Vec<String>,
    /// The forest under construction.
    tree: AbstractTree,
    mode: ScanMode,
    /// Inside a `"..."` literal. Orthogonal to the mode: strings occur in
    /// selectors and in values alike.
    in_string: bool,
    /// Open parenthesis depth, which suppresses comma-as-separator inside
    /// function calls like `rgb(1,2,3)`.
    paren_depth: u32,
    line: u32,
    column: u32,
}

impl Scanner {
    pub(super) fn new() -> Self {
        Self {
            buffer: String::new(),
            stack: vec![],
            selector_stack: vec![],
            tree: AbstractTree::new(),
            mode: ScanMode::selector(),
            in_string: false,
            paren_depth: 0,
            line: 1,
            column: 0,
        }
    }

    /// Scan the whole source and return the finished tree.
    pub(super) fn run(mut self, source: &str) -> Result<AbstractTree> {
        for ch in source.chars() {
            self.step(ch)?;
        }

        if let Some(open) = self.stack.last() {
            return Err(self.err(format!(
                "unclosed block '{}' (missing '}}')",
                open.selectors.join(",")
            )));
        }
        if !self.buffer.trim().is_empty() {
            tracing::warn!(
                line = self.line,
                "discarding trailing characters after the last block"
            );
        }

        Ok(self.tree)
    }

    fn step(&mut self, ch: char) -> Result<()> {
        if ch == '\n' {
            self.line += 1;
            self.column = 0;
            self.buffer.push(ch);
            return Ok(());
        }
        self.column += 1;

        match ch {
            '{' => self.open_block(),
            '}' => self.close_block(),
            ';' => self.end_declaration(),
            ':' => self.begin_value(),
            ',' => self.separate_selector(),
            '&' => {
                self.buffer.push('&');
                if !self.in_string
                    && let ScanMode::Selector { nested, .. } = &mut self.mode
                {
                    *nested = true;
                }
                Ok(())
            }
            '@' => {
                self.buffer.push('@');
                if let ScanMode::Selector { at_rule, .. } = &mut self.mode {
                    *at_rule = true;
                }
                Ok(())
            }
            '"' => {
                self.quote();
                Ok(())
            }
            '(' => {
                self.buffer.push('(');
                if !self.in_string && !self.mode.is_verbatim_value() {
                    self.paren_depth += 1;
                }
                Ok(())
            }
            ')' => {
                self.buffer.push(')');
                if !self.in_string && !self.mode.is_verbatim_value() {
                    self.paren_depth = self.paren_depth.saturating_sub(1);
                }
                Ok(())
            }
            _ => {
                self.buffer.push(ch);
                Ok(())
            }
        }
    }

    /// `{` closes the pending selector and opens a block.
    ///
    /// Braces are structural even inside string literals; quoted text does
    /// not shield them.
    fn open_block(&mut self) -> Result<()> {
        if self.mode.is_value() {
            return Err(self.err("unexpected '{' in declaration value"));
        }

        let selector = self.buffer.trim().to_string();
        if selector.is_empty() {
            return Err(self.err("missing selector before '{'"));
        }

        let mut selectors = std::mem::take(&mut self.selector_stack);
        selectors.push(selector);
        if selectors.len() > 1 && selectors.iter().any(|s| s.starts_with('@')) {
            return Err(self.err("at-rule cannot be grouped with other selectors"));
        }

        let mut block = Block::new(selectors);
        block.span = Some(Span::starting_at(self.position()));
        self.stack.push(block);

        self.buffer.clear();
        self.mode = ScanMode::selector();
        Ok(())
    }

    /// `}` closes the innermost block and attaches it to its owner.
    fn close_block(&mut self) -> Result<()> {
        if self.mode.is_value() {
            return Err(self.err("unexpected '}' before the declaration was terminated"));
        }
        let Some(mut block) = self.stack.pop() else {
            return Err(self.err("unexpected '}' with no open block"));
        };

        if let Some(span) = block.span.as_mut() {
            span.end = Some(self.position());
        }
        match self.stack.last_mut() {
            Some(parent) => parent.children.push(block),
            None => self.tree.push(block),
        }

        self.buffer.clear();
        self.mode = ScanMode::selector();
        Ok(())
    }

    /// `;` completes the pending declaration.
    fn end_declaration(&mut self) -> Result<()> {
        if self.in_string {
            self.buffer.push(';');
            return Ok(());
        }

        let property = match &self.mode {
            ScanMode::Value { property, .. } => property.clone(),
            ScanMode::Selector { .. } => {
                return Err(self.err("unexpected ';' outside a declaration"));
            }
        };
        if property.is_empty() {
            return Err(self.err("declaration has an empty name"));
        }
        let value = self.buffer.trim().to_string();
        if value.is_empty() {
            return Err(self.err(format!("declaration '{property}' has an empty value")));
        }
        let Some(block) = self.stack.last_mut() else {
            return Err(self.err("declaration outside of any block"));
        };

        block.declarations.push(Declaration::new(property, value));
        self.buffer.clear();
        self.mode = ScanMode::selector();
        Ok(())
    }

    /// `:` splits a declaration name from its value.
    ///
    /// Literal inside strings, at-rule preludes, nested selector fragments,
    /// verbatim values, and at the top level where no block is open.
    fn begin_value(&mut self) -> Result<()> {
        let literal = self.in_string
            || self.stack.is_empty()
            || matches!(
                self.mode,
                ScanMode::Selector { at_rule: true, .. } | ScanMode::Selector { nested: true, .. }
            )
            || self.mode.is_verbatim_value();
        if literal {
            self.buffer.push(':');
            return Ok(());
        }
        if self.mode.is_value() {
            return Err(self.err("second ':' in a declaration"));
        }

        let property = self.buffer.trim().to_string();
        let verbatim = property.starts_with('!');
        self.mode = ScanMode::Value { property, verbatim };
        self.buffer.clear();
        Ok(())
    }

    /// `,` accumulates one more comma-separated selector.
    fn separate_selector(&mut self) -> Result<()> {
        if self.in_string || self.paren_depth > 0 || self.mode.is_value() {
            self.buffer.push(',');
            return Ok(());
        }

        let selector = self.buffer.trim().to_string();
        if selector.is_empty() {
            return Err(self.err("empty selector before ','"));
        }
        self.selector_stack.push(selector);
        self.buffer.clear();
        Ok(())
    }

    /// `"` toggles string-literal state, honoring `\"` escapes.
    fn quote(&mut self) {
        if self.mode.is_verbatim_value() {
            self.buffer.push('"');
            return;
        }
        if self.in_string {
            // The quote closes the literal only when not escaped.
            let escaped = self.buffer.ends_with('\\');
            self.buffer.push('"');
            if !escaped {
                self.in_string = false;
            }
        } else {
            self.buffer.push('"');
            self.in_string = true;
        }
    }

    fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn err(&self, message: impl Into<String>) -> Error {
        Error::parse(message, self.line, self.column)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(source: &str) -> Result<AbstractTree> {
        Scanner::new().run(source)
    }

    #[test]
    fn parse_flat_rule() {
        let tree = parse("a { color: red; }").unwrap();

        assert_eq!(tree.len(), 1);
        assert_eq!(tree.blocks[0].selectors, vec!["a"]);
        assert_eq!(
            tree.blocks[0].declarations,
            vec![Declaration::new("color", "red")]
        );
    }

    #[test]
    fn parse_comma_separated_selectors() {
        let tree = parse("a, b , .c { color: red; }").unwrap();

        assert_eq!(tree.blocks[0].selectors, vec!["a", "b", ".c"]);
    }

    #[test]
    fn parse_nested_blocks() {
        let tree = parse("a { b { color: red; } c { color: blue; } }").unwrap();

        let outer = &tree.blocks[0];
        assert_eq!(outer.children.len(), 2);
        assert_eq!(outer.children[0].selectors, vec!["b"]);
        assert_eq!(outer.children[1].selectors, vec!["c"]);
    }

    #[test]
    fn sibling_order_is_preserved() {
        let tree = parse("a { x: 1; } b { y: 2; }").unwrap();

        assert_eq!(tree.blocks[0].selectors, vec!["a"]);
        assert_eq!(tree.blocks[1].selectors, vec!["b"]);
    }

    #[test]
    fn duplicate_declarations_are_kept_in_order() {
        let tree = parse("a { b: 1; b: 2; }").unwrap();

        assert_eq!(
            tree.blocks[0].declarations,
            vec![Declaration::new("b", "1"), Declaration::new("b", "2")]
        );
    }

    #[test]
    fn comma_inside_parentheses_is_not_a_separator() {
        let tree = parse(".a { background: rgb(1,2,3); }").unwrap();

        assert_eq!(
            tree.blocks[0].declarations,
            vec![Declaration::new("background", "rgb(1,2,3)")]
        );
    }

    #[test]
    fn escaped_quote_does_not_terminate_string() {
        let tree = parse(r#".a { content: "a\"b"; }"#).unwrap();

        assert_eq!(
            tree.blocks[0].declarations,
            vec![Declaration::new("content", r#""a\"b""#)]
        );
    }

    #[test]
    fn semicolon_inside_string_is_literal() {
        let tree = parse(r#".a { content: "x;y"; }"#).unwrap();

        assert_eq!(
            tree.blocks[0].declarations,
            vec![Declaration::new("content", r#""x;y""#)]
        );
    }

    #[test]
    fn at_rule_prelude_keeps_colons() {
        let tree = parse("@media (min-width:600px) { a { color: red; } }").unwrap();

        assert_eq!(tree.blocks[0].selectors, vec!["@media (min-width:600px)"]);
        assert_eq!(tree.blocks[0].children[0].selectors, vec!["a"]);
    }

    #[test]
    fn nested_fragment_keeps_colons() {
        let tree = parse(".a { &:hover { color: red; } }").unwrap();

        assert_eq!(tree.blocks[0].children[0].selectors, vec!["&:hover"]);
    }

    #[test]
    fn top_level_colon_is_literal() {
        let tree = parse("a:hover { color: red; }").unwrap();

        assert_eq!(tree.blocks[0].selectors, vec!["a:hover"]);
    }

    #[test]
    fn custom_property_value_passes_through_verbatim() {
        let tree = parse(r#".a { !raw: url(a:b),"x" @media &; }"#).unwrap();

        assert_eq!(
            tree.blocks[0].declarations,
            vec![Declaration::new("!raw", r#"url(a:b),"x" @media &"#)]
        );
    }

    #[test]
    fn at_rule_mixed_with_selectors_is_rejected() {
        let err = parse("@media screen, a { }").unwrap_err();

        assert!(
            err.to_string().contains("at-rule cannot be grouped"),
            "unexpected message: {err}"
        );
    }

    #[test]
    fn missing_selector_is_rejected() {
        assert!(parse("{ color: red; }").is_err());
    }

    #[test]
    fn empty_selector_before_comma_is_rejected() {
        assert!(parse(", a { color: red; }").is_err());
    }

    #[test]
    fn unclosed_block_fails_at_end_of_input() {
        let err = parse("a{b:1;").unwrap_err();

        assert!(err.to_string().contains("unclosed block"), "got: {err}");
    }

    #[test]
    fn unexpected_close_brace_fails_with_position() {
        let err = parse("a}").unwrap_err();

        match err {
            Error::Parse { line, column, .. } => {
                assert_eq!((line, column), (1, 2));
            }
            other => panic!("expected parse error, got {other}"),
        }
    }

    #[test]
    fn unterminated_declaration_before_close_is_rejected() {
        assert!(parse("a{b:1}").is_err());
    }

    #[test]
    fn second_colon_in_declaration_is_rejected() {
        assert!(parse("a { background: url(http://x); }").is_err());
    }

    #[test]
    fn stray_semicolon_is_rejected() {
        assert!(parse("a { ; }").is_err());
    }

    #[test]
    fn empty_value_is_rejected() {
        assert!(parse("a { color: ; }").is_err());
    }

    #[test]
    fn positions_track_lines_and_columns() {
        let err = parse("a {\n  color red;\n}").unwrap_err();

        match err {
            Error::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("expected parse error, got {other}"),
        }
    }

    #[test]
    fn block_spans_are_stamped() {
        let tree = parse("a {\n}").unwrap();

        let span = tree.blocks[0].span.unwrap();
        assert_eq!(span.start, Position::new(1, 3));
        assert_eq!(span.end, Some(Position::new(2, 1)));
    }
}
