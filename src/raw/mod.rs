mod arena;
mod counters;
mod handle;
mod node;
mod raw_avl_map;

pub(crate) use handle::Handle;
pub(crate) use node::Node;
pub(crate) use raw_avl_map::RawAvlMap;
