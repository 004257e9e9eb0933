use crate::rtree::rectangle::Rectangle;
use serde::{Deserialize, Serialize};

/// R-tree节点类型
///
/// 用于明确区分R-tree中的两种节点类型，避免概念混淆
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeType {
    /// 叶子节点：包含用户插入的真实数据条目
    Leaf,
    /// 索引节点：包含子节点，用于索引和导航
    Index,
}

/// 叶子层的数据条目
///
/// 包含数据的最小边界矩形和调用者希望在命中时拿回的数据值。
/// 每个条目只属于一个叶子节点。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Entry<T> {
    pub mbr: Rectangle,
    pub data: T,
}

impl<T> Entry<T> {
    pub fn new(mbr: Rectangle, data: T) -> Self {
        Entry { mbr, data }
    }
}

/// 节点内容
///
/// 节点要么是只存放数据条目的叶子，要么是只存放子节点的索引节点，二者不会混合
#[derive(Debug, Clone)]
pub enum NodeEntries<T> {
    Leaf(Vec<Entry<T>>),
    Index(Vec<Node<T>>),
}

/// R-tree节点
///
/// `mbr` 是缓存的最小边界矩形，始终等于所有条目/子节点矩形的并集，
/// 每次修改内容后都会重新计算。空节点没有边界矩形。
#[derive(Debug, Clone)]
pub struct Node<T> {
    mbr: Option<Rectangle>,
    entries: NodeEntries<T>,
    /// 节点在树中的层级，叶子层为0
    level: usize,
    /// 最大条目数M
    capacity: usize,
}

impl<T> Node<T> {
    /// 创建新的叶子节点，层级固定为0
    pub fn new_leaf_node(capacity: usize) -> Self {
        Node {
            mbr: None,
            entries: NodeEntries::Leaf(Vec::with_capacity(capacity)),
            level: 0,
            capacity,
        }
    }

    /// 创建新的索引节点
    ///
    /// # 参数
    /// * `level` - 节点在树中的层级，必须 > 0
    /// * `capacity` - 最大子节点数
    pub fn new_index_node(level: usize, capacity: usize) -> Self {
        assert!(level > 0, "Index node level must be greater than 0");
        Node {
            mbr: None,
            entries: NodeEntries::Index(Vec::with_capacity(capacity)),
            level,
            capacity,
        }
    }

    /// 创建与当前节点同类型、同层级的空节点（用于分裂）
    pub(crate) fn new_sibling(&self) -> Self {
        match self.entries {
            NodeEntries::Leaf(_) => Self::new_leaf_node(self.capacity),
            NodeEntries::Index(_) => Self::new_index_node(self.level, self.capacity),
        }
    }

    pub fn node_type(&self) -> NodeType {
        match self.entries {
            NodeEntries::Leaf(_) => NodeType::Leaf,
            NodeEntries::Index(_) => NodeType::Index,
        }
    }

    pub fn is_leaf_node(&self) -> bool {
        matches!(self.entries, NodeEntries::Leaf(_))
    }

    pub fn is_index_node(&self) -> bool {
        matches!(self.entries, NodeEntries::Index(_))
    }

    pub fn mbr(&self) -> Option<&Rectangle> {
        self.mbr.as_ref()
    }

    pub fn level(&self) -> usize {
        self.level
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn entries(&self) -> &NodeEntries<T> {
        &self.entries
    }

    /// 叶子节点的数据条目；索引节点返回空切片
    pub fn data_entries(&self) -> &[Entry<T>] {
        match &self.entries {
            NodeEntries::Leaf(entries) => entries,
            NodeEntries::Index(_) => &[],
        }
    }

    /// 索引节点的子节点；叶子节点返回空切片
    pub fn children(&self) -> &[Node<T>] {
        match &self.entries {
            NodeEntries::Leaf(_) => &[],
            NodeEntries::Index(children) => children,
        }
    }

    /// 条目或子节点的数量
    pub fn len(&self) -> usize {
        match &self.entries {
            NodeEntries::Leaf(entries) => entries.len(),
            NodeEntries::Index(children) => children.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 检查节点是否已满
    pub fn is_full(&self) -> bool {
        self.len() >= self.capacity
    }

    /// 添加数据条目，并把节点MBR扩展为包含该条目
    ///
    /// # Panics
    /// 节点不是叶子或已满时直接 panic：这是调用方的编程错误，必须先分裂
    pub fn add_entry(&mut self, entry: Entry<T>) {
        let capacity = self.capacity;
        let rect = entry.mbr;
        match &mut self.entries {
            NodeEntries::Leaf(entries) => {
                assert!(
                    entries.len() < capacity,
                    "Leaf node is full ({} entries), split before adding",
                    capacity
                );
                entries.push(entry);
            }
            NodeEntries::Index(_) => panic!("Cannot add a data entry to an index node"),
        }
        self.extend_mbr(&rect);
    }

    /// 添加子节点，并把节点MBR扩展为包含该子节点
    ///
    /// # Panics
    /// 节点是叶子、已满、子节点为空或层级不匹配时 panic
    pub fn add_child(&mut self, child: Node<T>) {
        let index = self.len();
        self.insert_child(index, child);
    }

    /// 在指定位置插入子节点
    pub(crate) fn insert_child(&mut self, index: usize, child: Node<T>) {
        assert!(self.is_index_node(), "Cannot add a child node to a leaf node");
        assert!(
            !self.is_full(),
            "Index node is full ({} children), split before adding",
            self.capacity
        );
        assert_eq!(
            child.level + 1,
            self.level,
            "Child level must be exactly one below its parent"
        );
        let rect = match child.mbr {
            Some(rect) => rect,
            None => panic!("Cannot add an empty child node"),
        };
        if let NodeEntries::Index(children) = &mut self.entries {
            children.insert(index, child);
        }
        self.extend_mbr(&rect);
    }

    /// 取出指定位置的子节点，节点MBR随之重算
    pub(crate) fn take_child(&mut self, index: usize) -> Node<T> {
        let child = match &mut self.entries {
            NodeEntries::Index(children) => children.remove(index),
            NodeEntries::Leaf(_) => panic!("Leaf node has no children"),
        };
        self.update_mbr();
        child
    }

    /// 拆出全部内容，节点变为空节点
    pub(crate) fn into_entries(self) -> NodeEntries<T> {
        self.entries
    }

    fn extend_mbr(&mut self, rect: &Rectangle) {
        self.mbr = Some(match self.mbr {
            Some(mbr) => mbr.union(rect),
            None => *rect,
        });
    }

    /// 重新计算节点的MBR，使之等于所有条目/子节点矩形的并集
    pub fn update_mbr(&mut self) {
        self.mbr = match &self.entries {
            NodeEntries::Leaf(entries) => union_all(entries.iter().map(|e| &e.mbr)),
            NodeEntries::Index(children) => union_all(children.iter().filter_map(|c| c.mbr())),
        };
    }

    /// 直接改写缓存的MBR，用于构造损坏的节点测试不变量检查
    #[cfg(test)]
    pub(crate) fn overwrite_mbr(&mut self, mbr: Option<Rectangle>) {
        self.mbr = mbr;
    }
}

/// 一组矩形的并集，空集合返回 None
pub(crate) fn union_all<'a>(rects: impl IntoIterator<Item = &'a Rectangle>) -> Option<Rectangle> {
    rects
        .into_iter()
        .fold(None, |acc: Option<Rectangle>, rect| match acc {
            Some(mbr) => Some(mbr.union(rect)),
            None => Some(*rect),
        })
}
