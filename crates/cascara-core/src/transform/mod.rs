//! Tree transformation passes.
//!
//! Transform handlers see one block at a time through a [`BlockView`] and
//! run in the order the caller supplies them. Handlers may depend on each
//! other's side effects on the same block; that ordering contract belongs
//! to the caller and is not arbitrated here.

mod view;

pub use view::BlockView;

use crate::ast::{AbstractTree, Block};
use crate::error::{Error, Result};

/// A transformation applied to every block of the tree.
///
/// Implemented by plugin objects; closures of the matching shape work
/// through the blanket impl:
///
/// ```
/// use cascara_core::transform::BlockView;
///
/// let uppercase = |view: &mut BlockView<'_>| -> cascara_core::Result<()> {
///     let selectors = view.selectors().iter().map(|s| s.to_uppercase()).collect();
///     view.set_selectors(selectors);
///     Ok(())
/// };
/// # let _: Box<dyn cascara_core::transform::BlockTransform> = Box::new(uppercase);
/// ```
pub trait BlockTransform {
    /// Apply this transformation to one block.
    fn apply(&self, view: &mut BlockView<'_>) -> Result<()>;
}

impl<F> BlockTransform for F
where
    F: Fn(&mut BlockView<'_>) -> Result<()>,
{
    fn apply(&self, view: &mut BlockView<'_>) -> Result<()> {
        self(view)
    }
}

/// Apply every handler to every block of the tree, in place.
///
/// The walk is pre-order depth-first: all handlers run on a block before
/// any of them sees its children, so a handler never observes a child
/// whose ancestors have not been transformed yet.
///
/// A handler failure aborts the walk and is re-wrapped as
/// [`Error::Transform`], keeping the original message and adding the
/// block's start line when the block has one.
pub fn transform(tree: &mut AbstractTree, handlers: &[Box<dyn BlockTransform>]) -> Result<()> {
    for block in tree.iter_mut() {
        transform_block(block, handlers)?;
    }
    Ok(())
}

fn transform_block(block: &mut Block, handlers: &[Box<dyn BlockTransform>]) -> Result<()> {
    let line = block.start_line();
    {
        let mut view = BlockView::new(block);
        for handler in handlers {
            handler
                .apply(&mut view)
                .map_err(|e| Error::transform(e, line))?;
        }
    }

    for child in &mut block.children {
        transform_block(child, handlers)?;
    }
    Ok(())
}
