//! # hrtree
//!
//! 内存中的 Hilbert 排序 R-tree 空间索引。
//!
//! - 轴对齐矩形的插入与重叠搜索
//! - 二次分裂算法（Quadratic Split）处理节点溢出
//! - 独立的 Hilbert 曲线映射，用于按空间局部性预排序插入
//!
//! ```rust
//! use hrtree::{RTree, Rectangle};
//!
//! let mut rtree = RTree::new(4);
//! rtree.insert(Rectangle::from_bounds(0.0, 0.0, 1.0, 1.0)?, "a");
//! rtree.insert(Rectangle::from_bounds(5.0, 5.0, 6.0, 6.0)?, "b");
//!
//! let query = Rectangle::from_bounds(0.0, 0.0, 2.0, 2.0)?;
//! let hits: Vec<_> = rtree.search(&query).map(|entry| entry.data).collect();
//! assert_eq!(hits, vec!["a"]);
//! # Ok::<(), hrtree::Error>(())
//! ```

pub mod config;
pub mod rtree;

// 重新导出主要的公共接口
pub use crate::config::{ConfigError, HrtreeConfig, LoggingConfig, TreeConfig};
pub use crate::rtree::{
    hilbert_index, Entry, EntryIter, GeometryError, HilbertMapper, InvariantError, Node,
    NodeEntries, NodeType, Point, RTree, Rectangle, DIMENSIONS,
};

/// crate 级错误类型
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
