use super::split::{preferred_side, Side};
use crate::rtree::node::{Entry, Node};
use crate::rtree::rectangle::Rectangle;
use crate::rtree::rtree::RTree;
use tracing::debug;

/// 子树插入后的结果
///
/// 递归插入不通过可变引用改写父节点，而是返回子树新的顶部节点，
/// 由调用者（父节点或树）替换原先保存的引用
#[derive(Debug)]
pub(crate) enum InsertOutcome<T> {
    /// 子树吸收了新条目，顶部仍是一个节点
    Absorbed(Node<T>),
    /// 子树顶部节点已分裂为两个
    Split(Node<T>, Node<T>),
}

/// 插入操作相关算法
impl<T> RTree<T> {
    /// 插入新的数据条目
    pub fn insert(&mut self, mbr: Rectangle, data: T) {
        self.insert_entry(Entry::new(mbr, data));
    }

    /// 插入一个已构造的条目
    ///
    /// 空树时创建只含该条目的叶子根节点；根节点分裂时创建新的索引根节点，
    /// 这是树高增长的唯一途径
    pub fn insert_entry(&mut self, entry: Entry<T>) {
        let max_entries = self.max_entries();
        let min_entries = self.min_entries();

        let new_root = match self.root_mut().take() {
            None => {
                let mut root = Node::new_leaf_node(max_entries);
                root.add_entry(entry);
                root
            }
            Some(root) => match root.insert(entry, min_entries) {
                InsertOutcome::Absorbed(root) => root,
                InsertOutcome::Split(node1, node2) => {
                    let level = node1.level() + 1;
                    let mut root = Node::new_index_node(level, max_entries);
                    root.add_child(node1);
                    root.add_child(node2);
                    debug!("Root split, tree height grows to {}", level + 1);
                    root
                }
            },
        };

        *self.root_mut() = Some(new_root);
        self.increment_len();
    }
}

impl<T> Node<T> {
    /// 把条目插入以当前节点为根的子树
    pub(crate) fn insert(mut self, entry: Entry<T>, min_entries: usize) -> InsertOutcome<T> {
        if self.is_leaf_node() {
            if !self.is_full() {
                self.add_entry(entry);
                return InsertOutcome::Absorbed(self);
            }
            // 叶子已满：先分裂，再放入扩大代价较小的一半
            let (mut node1, mut node2) = self.split(min_entries);
            match choose_half(&node1, &node2, &entry.mbr) {
                Side::First => node1.add_entry(entry),
                Side::Second => node2.add_entry(entry),
            }
            return InsertOutcome::Split(node1, node2);
        }

        let index = self.choose_subtree(&entry.mbr);
        let child = self.take_child(index);

        match child.insert(entry, min_entries) {
            InsertOutcome::Absorbed(child) => {
                self.insert_child(index, child);
                InsertOutcome::Absorbed(self)
            }
            InsertOutcome::Split(child1, child2) => {
                self.insert_child(index, child1);
                if !self.is_full() {
                    self.insert_child(index + 1, child2);
                    return InsertOutcome::Absorbed(self);
                }
                // 索引节点溢出，分裂并向上传播
                let (mut node1, mut node2) = self.split(min_entries);
                let rect = match child2.mbr() {
                    Some(rect) => *rect,
                    None => panic!("Split produced an empty node"),
                };
                match choose_half(&node1, &node2, &rect) {
                    Side::First => node1.add_child(child2),
                    Side::Second => node2.add_child(child2),
                }
                InsertOutcome::Split(node1, node2)
            }
        }
    }

    /// 选择子树 - 扩大面积最小的子节点，相同时选择面积最小的
    pub(crate) fn choose_subtree(&self, rect: &Rectangle) -> usize {
        let mut best_index = 0;
        let mut min_enlargement = f64::INFINITY;
        let mut min_area = f64::INFINITY;

        for (i, child) in self.children().iter().enumerate() {
            let Some(mbr) = child.mbr() else {
                continue;
            };
            let enlargement = mbr.enlargement(rect);
            let area = mbr.area();

            if enlargement < min_enlargement || (enlargement == min_enlargement && area < min_area) {
                min_enlargement = enlargement;
                min_area = area;
                best_index = i;
            }
        }

        best_index
    }
}

fn choose_half<T>(node1: &Node<T>, node2: &Node<T>, rect: &Rectangle) -> Side {
    preferred_side((node1.mbr(), node1.len()), (node2.mbr(), node2.len()), rect)
}
