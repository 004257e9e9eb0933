use crate::rtree::node::{union_all, Node, NodeEntries};
use crate::rtree::rectangle::Rectangle;
use crate::rtree::rtree::RTree;
use std::fmt::{Debug, Write};
use tracing::debug;

/// 树结构不变量被破坏
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum InvariantError {
    #[error("Node at level {level} has a stale bounding rectangle")]
    StaleBoundingBox { level: usize },
    #[error("Item {index} of node at level {level} lies outside the node's bounding rectangle")]
    EscapedBounds { level: usize, index: usize },
    #[error("Node at level {level} holds {len} entries, capacity is {capacity}")]
    Overflow { level: usize, len: usize, capacity: usize },
    #[error("Non-root node at level {level} is empty")]
    EmptyNode { level: usize },
    #[error("Child at level {child} under parent at level {parent}")]
    LevelMismatch { parent: usize, child: usize },
    #[error("Leaf found at depth {depth}, expected {expected}")]
    Unbalanced { depth: usize, expected: usize },
    #[error("Tree reports {expected} entries but holds {actual}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// R-tree调试功能实现
impl<T: Debug> RTree<T> {
    /// 生成完整的树结构文本，用于调试
    ///
    /// 按先序遍历输出每个节点的类型、层级、MBR边界和条目数量，子节点逐层缩进
    pub fn dump_structure(&self) -> String {
        let mut out = String::new();
        let Some(root) = self.root() else {
            out.push_str("Empty tree (no root)\n");
            return out;
        };

        let depth = self.depth();
        root.traverse_preorder(|node| {
            let indent = "  ".repeat(depth - 1 - node.level());
            let _ = writeln!(
                out,
                "{}Node (level={}, type={:?}, mbr={}, {} entries)",
                indent,
                node.level(),
                node.node_type(),
                describe(node.mbr()),
                node.len()
            );
            for (i, entry) in node.data_entries().iter().enumerate() {
                let _ = writeln!(out, "{}  [{}] Data: {:?} at {}", indent, i, entry.data, entry.mbr);
            }
        });

        out
    }

    /// 以 debug 级别输出树结构
    pub fn log_structure(&self) {
        debug!(
            "R-tree structure: {} entries, depth {}, {} nodes\n{}",
            self.len(),
            self.depth(),
            self.node_count(),
            self.dump_structure()
        );
    }
}

fn describe(mbr: Option<&Rectangle>) -> String {
    match mbr {
        Some(mbr) => mbr.to_string(),
        None => "none".to_string(),
    }
}

impl<T> RTree<T> {
    /// 检查整棵树的结构不变量
    ///
    /// - 每个条目/子节点的矩形都落在所属节点的MBR内
    /// - 每个节点缓存的MBR等于其内容的并集
    /// - 条目数不超过容量，非根节点不为空
    /// - 子节点层级恰好比父节点低一层，所有叶子处于同一深度
    /// - 条目计数与实际条目数一致
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        let actual = match self.root() {
            Some(root) => check_node(root, true, root.level())?,
            None => 0,
        };
        if actual != self.len() {
            return Err(InvariantError::SizeMismatch {
                expected: self.len(),
                actual,
            });
        }
        Ok(())
    }
}

/// 递归检查子树，返回子树中的条目数
fn check_node<T>(node: &Node<T>, is_root: bool, root_level: usize) -> Result<usize, InvariantError> {
    let level = node.level();

    if node.len() > node.capacity() {
        return Err(InvariantError::Overflow {
            level,
            len: node.len(),
            capacity: node.capacity(),
        });
    }
    if !is_root && node.is_empty() {
        return Err(InvariantError::EmptyNode { level });
    }

    let rects: Vec<&Rectangle> = match node.entries() {
        NodeEntries::Leaf(entries) => entries.iter().map(|e| &e.mbr).collect(),
        NodeEntries::Index(children) => children.iter().filter_map(|c| c.mbr()).collect(),
    };
    if let Some(mbr) = node.mbr() {
        if let Some(index) = rects.iter().position(|rect| !mbr.contains(rect)) {
            return Err(InvariantError::EscapedBounds { level, index });
        }
    }

    let expected_mbr = union_all(rects.iter().copied());
    if node.mbr() != expected_mbr.as_ref() {
        return Err(InvariantError::StaleBoundingBox { level });
    }

    match node.entries() {
        NodeEntries::Leaf(entries) => {
            if level != 0 {
                return Err(InvariantError::Unbalanced {
                    depth: root_level - level,
                    expected: root_level,
                });
            }
            Ok(entries.len())
        }
        NodeEntries::Index(children) => {
            let mut total = 0;
            for child in children {
                if child.level() + 1 != level {
                    return Err(InvariantError::LevelMismatch {
                        parent: level,
                        child: child.level(),
                    });
                }
                total += check_node(child, false, root_level)?;
            }
            Ok(total)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtree::node::Entry;
    use crate::rtree::rectangle::Point;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn rect(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Rectangle {
        Rectangle::from_bounds(x_min, y_min, x_max, y_max).unwrap()
    }

    #[test]
    fn test_dump_structure() {
        let mut rtree = RTree::new(4);
        assert_eq!(rtree.dump_structure(), "Empty tree (no root)\n");

        rtree.insert(rect(0.0, 0.0, 1.0, 1.0), "1");
        rtree.insert(rect(2.0, 2.0, 3.0, 3.0), "2");

        let dump = rtree.dump_structure();
        assert!(dump.starts_with("Node (level=0, type=Leaf"));
        assert!(dump.contains("[1] Data: \"2\""));
        rtree.log_structure();
    }

    #[test]
    fn test_dump_structure_indents_children() {
        let mut rtree = RTree::new(2);
        for i in 0..5 {
            let x = i as f64;
            rtree.insert(Rectangle::from_point(Point::new(x, x).unwrap()), i);
        }
        let dump = rtree.dump_structure();
        assert!(dump.lines().next().unwrap().contains("type=Index"));
        assert!(dump.lines().any(|line| line.starts_with("  Node")));
    }

    #[test]
    fn test_bounding_invariant_after_random_inserts() {
        let mut rng = StdRng::seed_from_u64(7);
        for max_entries in [2, 3, 4, 8] {
            let mut rtree = RTree::new(max_entries);
            for i in 0..300 {
                let x = rng.gen_range(-500.0..500.0);
                let y = rng.gen_range(-500.0..500.0);
                rtree.insert(rect(x, y, x + rng.gen_range(0.0..5.0), y), i);
                assert_eq!(rtree.check_invariants(), Ok(()));
            }
            // 根MBR等于所有条目矩形的并集
            let all = union_all(rtree.iter().map(|e| &e.mbr));
            assert_eq!(rtree.root_mbr(), all.as_ref());
        }
    }

    #[test]
    fn test_detects_entry_outside_node_bounds() {
        let mut leaf = Node::new_leaf_node(4);
        leaf.add_entry(Entry::new(rect(0.0, 0.0, 1.0, 1.0), 1));
        leaf.add_entry(Entry::new(rect(5.0, 5.0, 6.0, 6.0), 2));

        let mut rtree = RTree::new(4);
        rtree.insert(rect(0.0, 0.0, 1.0, 1.0), 1);
        rtree.insert(rect(5.0, 5.0, 6.0, 6.0), 2);
        assert_eq!(rtree.check_invariants(), Ok(()));

        // MBR 只覆盖第一个条目：第二个条目越界
        let mut shrunk = leaf.clone();
        shrunk.overwrite_mbr(Some(rect(0.0, 0.0, 1.0, 1.0)));
        *rtree.root_mut() = Some(shrunk);
        assert_eq!(
            rtree.check_invariants(),
            Err(InvariantError::EscapedBounds { level: 0, index: 1 })
        );

        // MBR 覆盖全部条目但并不紧致
        let mut loose = leaf;
        loose.overwrite_mbr(Some(rect(0.0, 0.0, 10.0, 10.0)));
        *rtree.root_mut() = Some(loose);
        assert_eq!(
            rtree.check_invariants(),
            Err(InvariantError::StaleBoundingBox { level: 0 })
        );
    }

    #[test]
    fn test_detects_empty_child() {
        let mut root: Node<i32> = Node::new_index_node(1, 4);
        let mut leaf = Node::new_leaf_node(4);
        leaf.add_entry(Entry::new(rect(0.0, 0.0, 1.0, 1.0), 1));
        root.add_child(leaf);
        assert_eq!(check_node(&root, true, 1), Ok(1));

        let mut emptied = root.clone();
        let _ = emptied.take_child(0);
        assert_eq!(check_node(&emptied, false, 1), Err(InvariantError::EmptyNode { level: 1 }));
    }
}
