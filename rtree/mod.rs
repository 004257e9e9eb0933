pub mod algorithms;
pub mod hilbert;
pub mod node;
pub mod rectangle;
#[allow(clippy::module_inception)]
pub mod rtree;

// 重新导出主要类型
pub use algorithms::debug::InvariantError;
pub use algorithms::search::EntryIter;
pub use hilbert::{hilbert_index, HilbertMapper};
pub use node::{Entry, Node, NodeEntries, NodeType};
pub use rectangle::{GeometryError, Point, Rectangle, DIMENSIONS};
pub use rtree::RTree;
