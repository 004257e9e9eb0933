use crate::rtree::node::{Node, NodeEntries};
use crate::rtree::rectangle::Rectangle;
use tracing::trace;

/// 分组归属
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    First,
    Second,
}

/// 决定一个矩形应归入哪一组
///
/// 规则：扩大面积较小者优先；相同则选当前面积较小者；仍相同则选条目较少者，再相同选第一组。
/// 空组（没有MBR）吸收矩形的扩大量视为矩形自身面积。
pub(crate) fn preferred_side(
    first: (Option<&Rectangle>, usize),
    second: (Option<&Rectangle>, usize),
    rect: &Rectangle,
) -> Side {
    let cost = |mbr: Option<&Rectangle>| match mbr {
        Some(mbr) => (mbr.enlargement(rect), mbr.area()),
        None => (rect.area(), 0.0),
    };
    let (enlargement1, area1) = cost(first.0);
    let (enlargement2, area2) = cost(second.0);

    if enlargement1 != enlargement2 {
        return if enlargement1 < enlargement2 { Side::First } else { Side::Second };
    }
    if area1 != area2 {
        return if area1 < area2 { Side::First } else { Side::Second };
    }
    if first.1 <= second.1 {
        Side::First
    } else {
        Side::Second
    }
}

/// PickSeeds - 选择代表点（矩形中心）欧氏距离平方最大的一对作为种子
///
/// 扫描所有无序对，距离相同时保留扫描顺序中第一个遇到的对。
///
/// # Panics
/// 少于两个矩形时 panic
pub(crate) fn pick_seeds(rects: &[Rectangle]) -> (usize, usize) {
    assert!(rects.len() >= 2, "Cannot pick seeds from fewer than 2 entries");

    let centers: Vec<_> = rects.iter().map(Rectangle::center).collect();
    let mut max_distance = -1.0;
    let mut best_pair = (0, 1);

    for i in 0..centers.len() {
        for j in (i + 1)..centers.len() {
            let distance = centers[i].distance_squared(&centers[j]);
            if distance > max_distance {
                max_distance = distance;
                best_pair = (i, j);
            }
        }
    }

    best_pair
}

/// 二次分裂算法
///
/// 先用 `pick_seeds` 选出两个种子分别放入两组，其余条目按原顺序逐个分配到
/// `preferred_side` 选出的组。若某一组只有把剩余条目全部拿走才能达到 `min_entries`，
/// 则剩余条目强制归入该组。
fn quadratic_split<I>(
    items: Vec<I>,
    min_entries: usize,
    rect_of: impl Fn(&I) -> Rectangle,
) -> (Vec<I>, Vec<I>) {
    let rects: Vec<Rectangle> = items.iter().map(&rect_of).collect();
    let (seed1, seed2) = pick_seeds(&rects);

    let mut group1 = Vec::with_capacity(items.len());
    let mut group2 = Vec::with_capacity(items.len());
    let mut remaining = Vec::with_capacity(items.len());
    for (i, item) in items.into_iter().enumerate() {
        if i == seed1 {
            group1.push(item);
        } else if i == seed2 {
            group2.push(item);
        } else {
            remaining.push((rects[i], item));
        }
    }

    let mut mbr1 = rects[seed1];
    let mut mbr2 = rects[seed2];
    let mut left = remaining.len();

    for (rect, item) in remaining {
        let side = if group1.len() + left <= min_entries {
            Side::First
        } else if group2.len() + left <= min_entries {
            Side::Second
        } else {
            preferred_side((Some(&mbr1), group1.len()), (Some(&mbr2), group2.len()), &rect)
        };

        match side {
            Side::First => {
                mbr1 = mbr1.union(&rect);
                group1.push(item);
            }
            Side::Second => {
                mbr2 = mbr2.union(&rect);
                group2.push(item);
            }
        }
        left -= 1;
    }

    (group1, group2)
}

/// 节点分裂
impl<T> Node<T> {
    /// 种子选择：返回当前条目/子节点中代表点相距最远的一对下标
    pub fn choose_seeds(&self) -> (usize, usize) {
        let rects: Vec<Rectangle> = match self.entries() {
            NodeEntries::Leaf(entries) => entries.iter().map(|e| e.mbr).collect(),
            NodeEntries::Index(children) => children.iter().filter_map(|c| c.mbr().copied()).collect(),
        };
        pick_seeds(&rects)
    }

    /// 把节点全部内容分配到两个新节点中，原节点被消耗
    ///
    /// 两个新节点继承原节点的类型和层级；不会丢失或重复任何条目。
    ///
    /// # Panics
    /// 节点内容少于两个时 panic
    pub fn split(self, min_entries: usize) -> (Node<T>, Node<T>) {
        let mut node1 = self.new_sibling();
        let mut node2 = self.new_sibling();
        let level = self.level();

        match self.into_entries() {
            NodeEntries::Leaf(entries) => {
                let (group1, group2) = quadratic_split(entries, min_entries, |e| e.mbr);
                group1.into_iter().for_each(|e| node1.add_entry(e));
                group2.into_iter().for_each(|e| node2.add_entry(e));
            }
            NodeEntries::Index(children) => {
                let (group1, group2) = quadratic_split(children, min_entries, |c| {
                    match c.mbr() {
                        Some(mbr) => *mbr,
                        None => panic!("Index node holds an empty child"),
                    }
                });
                group1.into_iter().for_each(|c| node1.add_child(c));
                group2.into_iter().for_each(|c| node2.add_child(c));
            }
        }

        trace!(
            "Split node at level {} into {} + {} entries",
            level,
            node1.len(),
            node2.len()
        );

        (node1, node2)
    }
}
