mod arena;
mod handle;
mod node;
mod raw_bst_map;

pub(crate) use handle::Handle;
pub(crate) use raw_bst_map::{Inorder, RawBstMap};
