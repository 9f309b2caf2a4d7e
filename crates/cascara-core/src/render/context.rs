//! Output contexts collected during rendering.

/// The context that top-level rules render into.
pub(super) const ROOT_CONTEXT: &str = "root";

/// Insertion-ordered map from context name to rendered fragments.
///
/// A context is either `root` or an at-rule prelude such as
/// `@media screen (min-width:600px)`. Contexts keep the order in which they
/// were first entered; fragment order within a context is emission order.
#[derive(Debug, Default)]
pub(super) struct ContextMap {
    contexts: Vec<OutputContext>,
}

#[derive(Debug)]
struct OutputContext {
    name: String,
    fragments: Vec<String>,
}

impl ContextMap {
    pub(super) fn new() -> Self {
        Self::default()
    }

    /// Register a context, keeping its first-seen position.
    pub(super) fn enter(&mut self, name: &str) {
        if !self.contexts.iter().any(|c| c.name == name) {
            self.contexts.push(OutputContext {
                name: name.to_string(),
                fragments: vec![],
            });
        }
    }

    /// Append a fragment to a context, creating it on first touch.
    pub(super) fn push(&mut self, name: &str, fragment: String) {
        match self.contexts.iter_mut().find(|c| c.name == name) {
            Some(context) => context.fragments.push(fragment),
            None => self.contexts.push(OutputContext {
                name: name.to_string(),
                fragments: vec![fragment],
            }),
        }
    }

    /// Join every context into the final output string.
    ///
    /// `root` fragments are emitted bare; every other context wraps its
    /// fragments as `name{fragments}`. Contexts that collected nothing are
    /// omitted entirely.
    pub(super) fn assemble(self) -> String {
        let mut out = String::new();
        for context in self.contexts {
            if context.fragments.is_empty() {
                continue;
            }
            if context.name == ROOT_CONTEXT {
                for fragment in context.fragments {
                    out.push_str(&fragment);
                }
            } else {
                out.push_str(&context.name);
                out.push('{');
                for fragment in context.fragments {
                    out.push_str(&fragment);
                }
                out.push('}');
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contexts_keep_first_seen_order() {
        let mut map = ContextMap::new();
        map.push("@media print", "a{x:1}".to_string());
        map.push(ROOT_CONTEXT, "b{y:2}".to_string());
        map.push("@media print", "c{z:3}".to_string());

        assert_eq!(map.assemble(), "@media print{a{x:1}c{z:3}}b{y:2}");
    }

    #[test]
    fn empty_contexts_are_omitted() {
        let mut map = ContextMap::new();
        map.enter("@media screen");
        map.push(ROOT_CONTEXT, "a{x:1}".to_string());

        assert_eq!(map.assemble(), "a{x:1}");
    }

    #[test]
    fn entering_twice_does_not_duplicate() {
        let mut map = ContextMap::new();
        map.enter("@media screen");
        map.enter("@media screen");
        map.push("@media screen", "a{x:1}".to_string());

        assert_eq!(map.assemble(), "@media screen{a{x:1}}");
    }
}
