use crate::rtree::node::{Entry, Node, NodeEntries};
use crate::rtree::rectangle::Rectangle;
use crate::rtree::rtree::RTree;
use std::slice;

/// 惰性搜索迭代器
///
/// 用显式栈代替递归：节点出栈时若其MBR与查询矩形不重叠则整棵子树被剪枝，
/// 叶子中的条目逐个检查后产出。没有查询矩形时遍历全部条目。
#[derive(Debug)]
pub struct EntryIter<'a, T> {
    query: Option<Rectangle>,
    stack: Vec<&'a Node<T>>,
    current: slice::Iter<'a, Entry<T>>,
}

impl<'a, T> EntryIter<'a, T> {
    pub(crate) fn new(root: Option<&'a Node<T>>, query: Option<Rectangle>) -> Self {
        EntryIter {
            query,
            stack: root.into_iter().collect(),
            current: <&[Entry<T>]>::default().iter(),
        }
    }

    fn matches(&self, rect: Option<&Rectangle>) -> bool {
        match (&self.query, rect) {
            (None, _) => true,
            (Some(query), Some(rect)) => rect.overlaps(query),
            (Some(_), None) => false,
        }
    }
}

impl<'a, T> Iterator for EntryIter<'a, T> {
    type Item = &'a Entry<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            while let Some(entry) = self.current.next() {
                if self.matches(Some(&entry.mbr)) {
                    return Some(entry);
                }
            }

            let node = self.stack.pop()?;
            // S1: 节点MBR不重叠则剪枝整棵子树
            if !self.matches(node.mbr()) {
                continue;
            }
            match node.entries() {
                NodeEntries::Leaf(entries) => self.current = entries.iter(),
                NodeEntries::Index(children) => {
                    // 逆序入栈以保持子节点数组顺序
                    self.stack.extend(children.iter().rev());
                }
            }
        }
    }
}

impl<T> Node<T> {
    /// 搜索以当前节点为根的子树中与查询矩形重叠的所有条目
    pub fn search(&self, query: &Rectangle) -> EntryIter<'_, T> {
        EntryIter::new(Some(self), Some(*query))
    }
}

/// 搜索操作相关算法
impl<T> RTree<T> {
    /// 搜索与查询矩形重叠的所有条目
    ///
    /// 返回惰性迭代器；结果顺序取决于子节点顺序，但不重不漏
    pub fn search(&self, query: &Rectangle) -> EntryIter<'_, T> {
        EntryIter::new(self.root(), Some(*query))
    }

    /// 遍历全部条目（不剪枝）
    pub fn iter(&self) -> EntryIter<'_, T> {
        EntryIter::new(self.root(), None)
    }
}

impl<'a, T> IntoIterator for &'a RTree<T> {
    type Item = &'a Entry<T>;
    type IntoIter = EntryIter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
