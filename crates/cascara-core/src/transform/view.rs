//! The restricted block view handed to transform handlers.

use crate::ast::{Block, Declaration};

/// A capability-scoped view over one [`Block`].
///
/// Handlers query and mutate selectors and declarations through this view;
/// tree-structural state (children, source span) stays out of reach. The
/// view borrows the block, so every mutation lands immediately.
#[derive(Debug)]
pub struct BlockView<'a> {
    block: &'a mut Block,
}

impl<'a> BlockView<'a> {
    /// Wrap a block.
    pub fn new(block: &'a mut Block) -> Self {
        Self { block }
    }

    /// Whether the underlying block has child blocks.
    pub fn has_children(&self) -> bool {
        !self.block.children.is_empty()
    }

    /// The block's selectors, copied out.
    pub fn selectors(&self) -> Vec<String> {
        self.block.selectors.clone()
    }

    /// Replace the selectors wholesale.
    ///
    /// No validation is performed; a handler can introduce structurally
    /// invalid selectors and the renderer will take them at face value.
    pub fn set_selectors(&mut self, selectors: Vec<String>) {
        self.block.selectors = selectors;
    }

    /// Whether any declaration has the given name.
    pub fn has_property(&self, name: &str) -> bool {
        self.block.declarations.iter().any(|d| d.name == name)
    }

    /// The value of the first declaration with the given name.
    pub fn property(&self, name: &str) -> Option<&str> {
        self.block
            .declarations
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.value.as_str())
    }

    /// A snapshot copy of all declarations, in order.
    pub fn properties(&self) -> Vec<Declaration> {
        self.block.declarations.clone()
    }

    /// Set a declaration value.
    ///
    /// Updates the first declaration with that name in place, or appends a
    /// new one when the name is absent.
    pub fn set_property(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.block.declarations.iter_mut().find(|d| d.name == name) {
            Some(declaration) => declaration.value = value,
            None => self.block.declarations.push(Declaration::new(name, value)),
        }
    }

    /// Remove every declaration with the given name.
    pub fn remove_property(&mut self, name: &str) {
        self.block.declarations.retain(|d| d.name != name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Block {
        Block::new(["a"])
            .with_declaration("b", "1")
            .with_declaration("c", "2")
            .with_declaration("b", "3")
    }

    #[test]
    fn property_returns_first_match() {
        let mut block = sample();
        let view = BlockView::new(&mut block);

        assert_eq!(view.property("b"), Some("1"));
        assert_eq!(view.property("missing"), None);
    }

    #[test]
    fn first_match_is_stable_under_unrelated_mutation() {
        let mut block = sample();
        let mut view = BlockView::new(&mut block);

        view.set_property("c", "20");
        view.remove_property("d");

        assert_eq!(view.property("b"), Some("1"));
    }

    #[test]
    fn set_property_updates_first_match_in_place() {
        let mut block = sample();
        let mut view = BlockView::new(&mut block);

        view.set_property("b", "10");

        assert_eq!(block.declarations[0], Declaration::new("b", "10"));
        // The later duplicate is untouched.
        assert_eq!(block.declarations[2], Declaration::new("b", "3"));
    }

    #[test]
    fn set_property_appends_when_absent() {
        let mut block = sample();
        let mut view = BlockView::new(&mut block);

        view.set_property("d", "4");

        assert_eq!(block.declarations.len(), 4);
        assert_eq!(block.declarations[3], Declaration::new("d", "4"));
    }

    #[test]
    fn remove_property_strips_every_occurrence() {
        let mut block = sample();
        let mut view = BlockView::new(&mut block);

        view.remove_property("b");

        assert!(!view.has_property("b"));
        assert_eq!(block.declarations, vec![Declaration::new("c", "2")]);
    }

    #[test]
    fn selectors_copy_in_and_out() {
        let mut block = sample();
        let mut view = BlockView::new(&mut block);

        let mut selectors = view.selectors();
        selectors.push(".extra".to_string());
        view.set_selectors(selectors);

        assert_eq!(block.selectors, vec!["a", ".extra"]);
    }

    #[test]
    fn mutation_is_visible_on_the_block() {
        let mut block = Block::new(["a"]).with_child(Block::new(["b"]));
        let mut view = BlockView::new(&mut block);

        assert!(view.has_children());
        view.set_property("x", "y");

        assert_eq!(block.declarations, vec![Declaration::new("x", "y")]);
    }
}
