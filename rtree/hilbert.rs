//! Hilbert 曲线映射
//!
//! 把二维整数坐标映射为 Hilbert 空间填充曲线上的一维位置。该映射与树的插入路径
//! 相互独立：调用者可以用它生成排序键，按空间局部性预排序后再逐个插入。

use super::node::Entry;
use super::rectangle::{Point, Rectangle};

/// 支持的最大曲线阶数（32 位量化坐标）
pub const MAX_ORDER: u32 = 32;

/// 默认曲线阶数
pub const DEFAULT_ORDER: u32 = 32;

/// 计算 `(x, y)` 在覆盖 `2^order x 2^order` 网格的 Hilbert 曲线上的索引
///
/// 坐标必须事先量化到 `[0, 2^order)`，这里不做越界检查，越界输入得到的索引没有意义。
/// `order` 超过 [`MAX_ORDER`] 时按 [`MAX_ORDER`] 处理；`order == 0` 时恒为 0。
pub fn hilbert_index(x: u32, y: u32, order: u32) -> u64 {
    let order = order.min(MAX_ORDER);
    if order == 0 {
        return 0;
    }

    let mut x = u64::from(x);
    let mut y = u64::from(y);
    let mut index = 0u64;
    let mut s = 1u64 << (order - 1);

    while s > 0 {
        let rx = u64::from(x & s != 0);
        let ry = u64::from(y & s != 0);
        index += s * s * ((3 * rx) ^ ry);

        // 后续迭代只看低位
        x &= s - 1;
        y &= s - 1;
        rotate(s, &mut x, &mut y, rx, ry);

        s >>= 1;
    }

    index
}

/// 曲线自相似的旋转/翻转：`ry == 0` 时交换 x、y，若 `rx == 1` 先关于 `s-1` 翻转
fn rotate(s: u64, x: &mut u64, y: &mut u64, rx: u64, ry: u64) {
    if ry == 0 {
        if rx == 1 {
            *x = s - 1 - *x;
            *y = s - 1 - *y;
        }
        std::mem::swap(x, y);
    }
}

/// 把实数坐标量化到网格并计算 Hilbert 键
///
/// `extent` 是坐标空间的范围，落在范围之外的坐标会被夹到边界上。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HilbertMapper {
    extent: Rectangle,
    order: u32,
}

impl HilbertMapper {
    pub fn new(extent: Rectangle, order: u32) -> Self {
        HilbertMapper {
            extent,
            order: order.min(MAX_ORDER),
        }
    }

    pub fn extent(&self) -> &Rectangle {
        &self.extent
    }

    pub fn order(&self) -> u32 {
        self.order
    }

    /// 将点量化为网格坐标
    pub fn quantize(&self, point: &Point) -> (u32, u32) {
        let cells = ((1u64 << self.order) - 1) as f64;
        let axis = |value: f64, lo: f64, hi: f64| -> u32 {
            let span = hi - lo;
            if span <= 0.0 {
                return 0;
            }
            let t = ((value - lo) / span).clamp(0.0, 1.0);
            (t * cells).round() as u32
        };

        let (min, max) = (self.extent.min(), self.extent.max());
        (
            axis(point.x(), min.x(), max.x()),
            axis(point.y(), min.y(), max.y()),
        )
    }

    /// 矩形的 Hilbert 键（取中心点）
    pub fn key(&self, rect: &Rectangle) -> u64 {
        let (x, y) = self.quantize(&rect.center());
        hilbert_index(x, y, self.order)
    }

    /// 按 Hilbert 键对一批条目排序，排序稳定
    pub fn sort_entries<T>(&self, entries: &mut [Entry<T>]) {
        entries.sort_by_cached_key(|entry| self.key(&entry.mbr));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_origin_is_zero() {
        assert_eq!(hilbert_index(0, 0, 2), 0);
        assert_eq!(hilbert_index(0, 0, 32), 0);
    }

    #[test]
    fn test_order_one_curve() {
        // 一阶曲线：(0,0) -> (0,1) -> (1,1) -> (1,0)
        assert_eq!(hilbert_index(0, 0, 1), 0);
        assert_eq!(hilbert_index(0, 1, 1), 1);
        assert_eq!(hilbert_index(1, 1, 1), 2);
        assert_eq!(hilbert_index(1, 0, 1), 3);
    }

    #[test]
    fn test_order_two_is_bijection() {
        let mut seen = HashSet::new();
        for x in 0..4 {
            for y in 0..4 {
                let d = hilbert_index(x, y, 2);
                assert!(d < 16);
                assert!(seen.insert(d), "duplicate index {} at ({}, {})", d, x, y);
            }
        }
        assert_eq!(seen.len(), 16);
    }

    #[test]
    fn test_order_five_is_bijection() {
        let side = 1u32 << 5;
        let mut seen = vec![false; (side * side) as usize];
        for x in 0..side {
            for y in 0..side {
                let d = hilbert_index(x, y, 5) as usize;
                assert!(!seen[d]);
                seen[d] = true;
            }
        }
        assert!(seen.iter().all(|&v| v));
    }

    #[test]
    fn test_consecutive_indices_are_adjacent() {
        // Hilbert 曲线上相邻的索引对应网格上相邻的单元
        let order = 4;
        let side = 1u32 << order;
        let mut cells = vec![(0u32, 0u32); (side * side) as usize];
        for x in 0..side {
            for y in 0..side {
                cells[hilbert_index(x, y, order) as usize] = (x, y);
            }
        }
        for pair in cells.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let manhattan = a.0.abs_diff(b.0) + a.1.abs_diff(b.1);
            assert_eq!(manhattan, 1);
        }
    }

    #[test]
    fn test_full_order_corner() {
        // 32 阶时最大坐标不会溢出
        let d = hilbert_index(u32::MAX, 0, 32);
        assert_eq!(d, u64::MAX);
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(hilbert_index(123, 456, 16), hilbert_index(123, 456, 16));
    }

    #[test]
    fn test_mapper_quantize_and_key() {
        let extent = Rectangle::from_bounds(0.0, 0.0, 100.0, 100.0).unwrap();
        let mapper = HilbertMapper::new(extent, 2);
        assert_eq!(mapper.quantize(&Point::new(0.0, 0.0).unwrap()), (0, 0));
        assert_eq!(mapper.quantize(&Point::new(100.0, 100.0).unwrap()), (3, 3));
        // 范围外的坐标被夹到边界
        assert_eq!(mapper.quantize(&Point::new(-50.0, 500.0).unwrap()), (0, 3));

        let origin = Rectangle::from_point(Point::new(0.0, 0.0).unwrap());
        assert_eq!(mapper.key(&origin), 0);
    }

    #[test]
    fn test_mapper_sort_entries() {
        let extent = Rectangle::from_bounds(0.0, 0.0, 3.0, 3.0).unwrap();
        let mapper = HilbertMapper::new(extent, 2);
        let mut entries: Vec<Entry<u32>> = [(3.0, 0.0), (0.0, 0.0), (1.0, 1.0), (0.0, 1.0)]
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Entry::new(Rectangle::from_point(Point::new(x, y).unwrap()), i as u32))
            .collect();
        mapper.sort_entries(&mut entries);
        let keys: Vec<u64> = entries.iter().map(|e| mapper.key(&e.mbr)).collect();
        assert!(keys.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(entries[0].data, 1);
        assert_eq!(entries[3].data, 0);
    }
}
