use crate::config::{ConfigError, TreeConfig};
use crate::rtree::hilbert::{HilbertMapper, DEFAULT_ORDER};
use crate::rtree::node::{Entry, Node, NodeEntries, NodeType};
use crate::rtree::rectangle::Rectangle;
use serde::Serialize;

/// 用于JSON序列化的简化树结构
#[derive(Debug, Serialize)]
pub struct TreeVisualization<'a, T> {
    /// 根节点（如果存在）
    pub root: Option<NodeVisualization<'a, T>>,
    /// 树的配置参数
    pub config: TreeSummary,
}

/// 用于JSON序列化的树配置
#[derive(Debug, Serialize)]
pub struct TreeSummary {
    pub max_entries: usize,
    pub min_entries: usize,
    pub len: usize,
    pub depth: usize,
}

/// 用于JSON序列化的节点结构
#[derive(Debug, Serialize)]
pub struct NodeVisualization<'a, T> {
    /// 节点的最小边界矩形
    pub mbr: Option<Rectangle>,
    /// 节点类型
    pub node_type: NodeType,
    /// 节点层级
    pub level: usize,
    /// 数据条目（仅叶子节点）
    pub data_entries: &'a [Entry<T>],
    /// 子节点（仅索引节点）
    pub child_nodes: Vec<NodeVisualization<'a, T>>,
}

/// R-tree主结构
#[derive(Debug, Clone)]
pub struct RTree<T> {
    /// 根节点，空树时为 None
    root: Option<Node<T>>,
    /// 最大条目数M
    max_entries: usize,
    /// 分裂后每个节点的最小条目数m
    min_entries: usize,
    /// Hilbert 曲线阶数
    hilbert_order: u32,
    /// 条目总数
    len: usize,
}

impl<T> RTree<T> {
    /// 创建新的R-tree，不强制最小填充（m = 1）
    ///
    /// # Panics
    /// `max_entries < 2` 时 panic
    pub fn new(max_entries: usize) -> Self {
        Self::with_min_entries(max_entries, 1)
    }

    /// 创建指定最大/最小条目数的R-tree
    ///
    /// # Panics
    /// 参数不满足 `max_entries >= 2` 且 `1 <= min_entries <= max_entries / 2` 时 panic
    pub fn with_min_entries(max_entries: usize, min_entries: usize) -> Self {
        assert!(max_entries >= 2, "Max entries must be at least 2");
        assert!(
            min_entries >= 1 && min_entries * 2 <= max_entries,
            "Min entries must be between 1 and max_entries / 2"
        );

        RTree {
            root: None,
            max_entries,
            min_entries,
            hilbert_order: DEFAULT_ORDER,
            len: 0,
        }
    }

    /// 按配置创建R-tree，配置非法时返回错误
    pub fn with_config(config: &TreeConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut rtree = Self::with_min_entries(config.max_entries, config.min_entries);
        rtree.hilbert_order = config.effective_hilbert_order();
        Ok(rtree)
    }

    /// 检查R-tree是否为空
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// 获取R-tree的根节点MBR
    pub fn root_mbr(&self) -> Option<&Rectangle> {
        self.root.as_ref().and_then(|node| node.mbr())
    }

    pub fn root(&self) -> Option<&Node<T>> {
        self.root.as_ref()
    }

    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    pub fn min_entries(&self) -> usize {
        self.min_entries
    }

    pub fn hilbert_order(&self) -> u32 {
        self.hilbert_order
    }

    /// 获取树的深度（层数），空树为0
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, |node| node.level() + 1)
    }

    /// 获取总的条目数量
    pub fn len(&self) -> usize {
        self.len
    }

    /// 以树的 Hilbert 阶数构造映射器，用于在插入前按空间局部性排序
    pub fn hilbert_mapper(&self, extent: Rectangle) -> HilbertMapper {
        HilbertMapper::new(extent, self.hilbert_order)
    }

    pub(crate) fn root_mut(&mut self) -> &mut Option<Node<T>> {
        &mut self.root
    }

    pub(crate) fn increment_len(&mut self) {
        self.len += 1;
    }
}

impl<T: Serialize> RTree<T> {
    /// 导出树结构为JSON格式
    ///
    /// 返回包含完整树结构的JSON字符串，用于诊断和可视化
    pub fn export_to_json(&self) -> Result<String, serde_json::Error> {
        let visualization = TreeVisualization {
            root: self.root.as_ref().map(create_node_visualization),
            config: TreeSummary {
                max_entries: self.max_entries,
                min_entries: self.min_entries,
                len: self.len,
                depth: self.depth(),
            },
        };
        serde_json::to_string_pretty(&visualization)
    }
}

/// 递归创建节点的可视化结构
fn create_node_visualization<T>(node: &Node<T>) -> NodeVisualization<'_, T> {
    let child_nodes = match node.entries() {
        NodeEntries::Leaf(_) => Vec::new(),
        NodeEntries::Index(children) => children.iter().map(create_node_visualization).collect(),
    };

    NodeVisualization {
        mbr: node.mbr().copied(),
        node_type: node.node_type(),
        level: node.level(),
        data_entries: node.data_entries(),
        child_nodes,
    }
}

impl<T> Extend<(Rectangle, T)> for RTree<T> {
    fn extend<I: IntoIterator<Item = (Rectangle, T)>>(&mut self, iter: I) {
        for (mbr, data) in iter {
            self.insert(mbr, data);
        }
    }
}
