//! The processing pipeline.
//!
//! A [`Pipeline`] carries the registered handlers for the three stages and
//! runs the fixed sequence: input handlers over the raw text, parse,
//! transform handlers over the tree, render, output handlers over the
//! rendered text. Discovering and classifying handlers is the caller's
//! business; the pipeline only needs each handler's stage and callable
//! behavior.
//!
//! # Example
//!
//! ```
//! use cascara_core::pipeline::Pipeline;
//!
//! let pipeline = Pipeline::new();
//! let css = pipeline.process(".panel { &:hover { color: red; } }").unwrap();
//! assert_eq!(css, ".panel:hover{color:red}");
//! ```

use std::path::Path;

use crate::ast::AbstractTree;
use crate::error::{Error, Result};
use crate::transform::{transform, BlockTransform};
use crate::{parser, render};

/// The stage a handler runs in.
///
/// External loaders classify each discovered handler with one of these tags
/// before registering it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginStage {
    /// Runs over the raw source text, before parsing.
    Input,
    /// Runs over every block of the parsed tree.
    Transform,
    /// Runs over the rendered text, after rendering.
    Output,
}

/// A handler that rewrites the raw source text before parsing.
pub trait InputPlugin {
    /// Produce the replacement source text.
    fn apply(&self, source: String) -> Result<String>;
}

impl<F> InputPlugin for F
where
    F: Fn(String) -> Result<String>,
{
    fn apply(&self, source: String) -> Result<String> {
        self(source)
    }
}

/// A handler that rewrites the rendered text after rendering.
///
/// Output handlers also receive the transformed tree, so they can consult
/// structure the rendered text no longer carries.
pub trait OutputPlugin {
    /// Produce the replacement output text.
    fn apply(&self, css: String, tree: &AbstractTree) -> Result<String>;
}

impl<F> OutputPlugin for F
where
    F: Fn(String, &AbstractTree) -> Result<String>,
{
    fn apply(&self, css: String, tree: &AbstractTree) -> Result<String> {
        self(css, tree)
    }
}

/// The preprocessor pipeline.
///
/// Holds the handlers for each stage in registration order. Handlers run
/// strictly in that order and may depend on one another's effects; any
/// handler failure aborts the whole run with no partial output. A pipeline
/// has no interior mutability, so independent `process` calls are safe to
/// run concurrently on separate inputs.
#[derive(Default)]
pub struct Pipeline {
    input: Vec<Box<dyn InputPlugin>>,
    transforms: Vec<Box<dyn BlockTransform>>,
    output: Vec<Box<dyn OutputPlugin>>,
}

impl Pipeline {
    /// Create a pipeline with no handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an input-stage handler.
    pub fn add_input(&mut self, plugin: impl InputPlugin + 'static) -> &mut Self {
        self.input.push(Box::new(plugin));
        self
    }

    /// Register a transform-stage handler.
    pub fn add_transform(&mut self, plugin: impl BlockTransform + 'static) -> &mut Self {
        self.transforms.push(Box::new(plugin));
        self
    }

    /// Register an output-stage handler.
    pub fn add_output(&mut self, plugin: impl OutputPlugin + 'static) -> &mut Self {
        self.output.push(Box::new(plugin));
        self
    }

    /// Number of handlers registered for a stage.
    pub fn plugin_count(&self, stage: PluginStage) -> usize {
        match stage {
            PluginStage::Input => self.input.len(),
            PluginStage::Transform => self.transforms.len(),
            PluginStage::Output => self.output.len(),
        }
    }

    /// Run the full pipeline over a source string.
    pub fn process(&self, source: &str) -> Result<String> {
        let mut text = source.to_string();
        for plugin in &self.input {
            text = plugin.apply(text)?;
        }
        tracing::debug!(handlers = self.input.len(), "input stage done");

        let mut tree = parser::parse(&text)?;
        transform(&mut tree, &self.transforms)?;
        tracing::debug!(handlers = self.transforms.len(), "transform stage done");

        let mut css = render::render(&tree)?;
        for plugin in &self.output {
            css = plugin.apply(css, &tree)?;
        }
        tracing::debug!(handlers = self.output.len(), "output stage done");

        Ok(css)
    }

    /// Run the full pipeline over a stylesheet file.
    pub fn process_file(&self, path: impl AsRef<Path>) -> Result<String> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        self.process(&source)
    }
}
