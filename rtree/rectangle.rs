use serde::Serialize;
use std::fmt;

/// 空间维度数
pub const DIMENSIONS: usize = 2;

/// 几何构造错误
///
/// 维度不匹配或边界非法的点/矩形在构造时即被拒绝，不会进入几何计算
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeometryError {
    #[error("Expected {expected} coordinates, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
    #[error("Malformed rectangle: min {min} is not <= max {max} in dimension {dimension}")]
    Malformed { dimension: usize, min: f64, max: f64 },
    #[error("Coordinate {value} in dimension {dimension} is not finite")]
    NonFinite { dimension: usize, value: f64 },
}

/// 固定维度的点，构造后不可变
///
/// 所有坐标都是有限值：NaN 和无穷在构造时即被拒绝
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    coords: [f64; DIMENSIONS],
}

impl Point {
    pub fn new(x: f64, y: f64) -> Result<Self, GeometryError> {
        Self::from_coords([x, y])
    }

    /// 从切片创建点，坐标数量必须等于 `DIMENSIONS`
    pub fn from_slice(coords: &[f64]) -> Result<Self, GeometryError> {
        let coords: [f64; DIMENSIONS] =
            coords
                .try_into()
                .map_err(|_| GeometryError::DimensionMismatch {
                    expected: DIMENSIONS,
                    actual: coords.len(),
                })?;
        Self::from_coords(coords)
    }

    fn from_coords(coords: [f64; DIMENSIONS]) -> Result<Self, GeometryError> {
        if let Some(dimension) = coords.iter().position(|c| !c.is_finite()) {
            return Err(GeometryError::NonFinite {
                dimension,
                value: coords[dimension],
            });
        }
        Ok(Point { coords })
    }

    pub fn x(&self) -> f64 {
        self.coords[0]
    }

    pub fn y(&self) -> f64 {
        self.coords[1]
    }

    /// 两点之间欧氏距离的平方
    pub fn distance_squared(&self, other: &Point) -> f64 {
        self.coords
            .iter()
            .zip(other.coords.iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.2}, {:.2})", self.coords[0], self.coords[1])
    }
}

/// 矩形边界框 - 用于表示R-tree中的最小边界矩形(MBR)
///
/// 每个维度都满足 `min[i] <= max[i]`；退化矩形（面积为0，例如单个点）是合法的
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rectangle {
    min: Point,
    max: Point,
}

impl Rectangle {
    /// 由两个角点创建矩形，任一维度 `min > max` 时返回错误
    pub fn new(min: Point, max: Point) -> Result<Self, GeometryError> {
        for dimension in 0..DIMENSIONS {
            let (lo, hi) = (min.coords[dimension], max.coords[dimension]);
            if lo > hi {
                return Err(GeometryError::Malformed {
                    dimension,
                    min: lo,
                    max: hi,
                });
            }
        }
        Ok(Rectangle { min, max })
    }

    pub fn from_bounds(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Result<Self, GeometryError> {
        Self::new(Point::new(x_min, y_min)?, Point::new(x_max, y_max)?)
    }

    pub fn from_slices(min: &[f64], max: &[f64]) -> Result<Self, GeometryError> {
        Self::new(Point::from_slice(min)?, Point::from_slice(max)?)
    }

    /// 创建一个点矩形，点的坐标已是有限值，无需再校验
    pub fn from_point(point: Point) -> Self {
        Rectangle {
            min: point,
            max: point,
        }
    }

    pub fn min(&self) -> &Point {
        &self.min
    }

    pub fn max(&self) -> &Point {
        &self.max
    }

    /// 计算矩形面积
    pub fn area(&self) -> f64 {
        (0..DIMENSIONS)
            .map(|i| self.max.coords[i] - self.min.coords[i])
            .product()
    }

    /// 计算两个矩形的并集MBR
    pub fn union(&self, other: &Rectangle) -> Rectangle {
        let mut min = self.min.coords;
        let mut max = self.max.coords;
        for i in 0..DIMENSIONS {
            min[i] = min[i].min(other.min.coords[i]);
            max[i] = max[i].max(other.max.coords[i]);
        }
        Rectangle {
            min: Point { coords: min },
            max: Point { coords: max },
        }
    }

    /// 判断两个矩形是否重叠（闭区间，边界接触也算重叠）
    pub fn overlaps(&self, other: &Rectangle) -> bool {
        (0..DIMENSIONS).all(|i| {
            self.max.coords[i] >= other.min.coords[i] && self.min.coords[i] <= other.max.coords[i]
        })
    }

    /// 判断当前矩形是否包含另一个矩形
    pub fn contains(&self, other: &Rectangle) -> bool {
        (0..DIMENSIONS).all(|i| {
            self.min.coords[i] <= other.min.coords[i] && self.max.coords[i] >= other.max.coords[i]
        })
    }

    /// 计算扩大到包含另一个矩形所需的面积增量
    pub fn enlargement(&self, other: &Rectangle) -> f64 {
        self.union(other).area() - self.area()
    }

    /// 计算矩形中心点
    pub fn center(&self) -> Point {
        let mut coords = [0.0; DIMENSIONS];
        for (i, c) in coords.iter_mut().enumerate() {
            *c = (self.min.coords[i] + self.max.coords[i]) / 2.0;
        }
        Point { coords }
    }
}

impl From<Point> for Rectangle {
    fn from(point: Point) -> Self {
        Rectangle::from_point(point)
    }
}

impl fmt::Display for Rectangle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} - {}]", self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x_min: f64, y_min: f64, x_max: f64, y_max: f64) -> Rectangle {
        Rectangle::from_bounds(x_min, y_min, x_max, y_max).unwrap()
    }

    #[test]
    fn test_rectangle_creation() {
        let r = rect(0.0, 0.0, 10.0, 10.0);
        assert_eq!(r.min(), &point(0.0, 0.0));
        assert_eq!(r.max(), &point(10.0, 10.0));
    }

    #[test]
    fn test_rectangle_rejects_inverted_bounds() {
        let err = Rectangle::from_bounds(5.0, 0.0, 1.0, 1.0).unwrap_err();
        assert_eq!(
            err,
            GeometryError::Malformed {
                dimension: 0,
                min: 5.0,
                max: 1.0
            }
        );
        assert!(matches!(
            Rectangle::from_bounds(0.0, 3.0, 1.0, 2.0),
            Err(GeometryError::Malformed { dimension: 1, .. })
        ));
    }

    fn point(x: f64, y: f64) -> Point {
        Point::new(x, y).unwrap()
    }

    #[test]
    fn test_rectangle_rejects_nan() {
        assert!(matches!(
            Rectangle::from_bounds(f64::NAN, 0.0, 1.0, 1.0),
            Err(GeometryError::NonFinite { dimension: 0, .. })
        ));
        assert!(matches!(
            Rectangle::from_bounds(0.0, 0.0, 1.0, f64::NAN),
            Err(GeometryError::NonFinite { dimension: 1, .. })
        ));
    }

    #[test]
    fn test_point_rejects_non_finite() {
        // 点矩形不经过 Rectangle::new，坐标必须在构造点时就被拒绝
        assert!(matches!(
            Point::new(f64::NAN, 0.0),
            Err(GeometryError::NonFinite { dimension: 0, .. })
        ));
        assert_eq!(
            Point::new(0.0, f64::INFINITY),
            Err(GeometryError::NonFinite {
                dimension: 1,
                value: f64::INFINITY
            })
        );
        assert!(Point::from_slice(&[f64::NEG_INFINITY, 1.0]).is_err());
        assert!(Rectangle::from_slices(&[0.0, 0.0], &[1.0, f64::NAN]).is_err());

        let r: Rectangle = point(3.0, 4.0).into();
        assert_eq!(r, Rectangle::from_point(point(3.0, 4.0)));
        assert_eq!(r.area(), 0.0);
    }

    #[test]
    fn test_dimension_mismatch() {
        assert_eq!(
            Point::from_slice(&[1.0, 2.0, 3.0]),
            Err(GeometryError::DimensionMismatch {
                expected: 2,
                actual: 3
            })
        );
        assert!(Rectangle::from_slices(&[0.0], &[1.0, 1.0]).is_err());
        assert!(Rectangle::from_slices(&[0.0, 0.0], &[1.0, 1.0]).is_ok());
    }

    #[test]
    fn test_rectangle_area() {
        assert_eq!(rect(0.0, 0.0, 10.0, 5.0).area(), 50.0);
        // 退化矩形面积为0
        assert_eq!(Rectangle::from_point(point(3.0, 4.0)).area(), 0.0);
        assert_eq!(rect(0.0, 0.0, 0.0, 7.0).area(), 0.0);
    }

    #[test]
    fn test_rectangle_union() {
        let rect1 = rect(0.0, 0.0, 5.0, 5.0);
        let rect2 = rect(3.0, -1.0, 8.0, 4.0);
        let union = rect1.union(&rect2);
        assert_eq!(union, rect(0.0, -1.0, 8.0, 5.0));
        assert_eq!(union, rect2.union(&rect1));
        assert!(union.contains(&rect1));
        assert!(union.contains(&rect2));
    }

    #[test]
    fn test_rectangle_overlaps() {
        let rect1 = rect(0.0, 0.0, 5.0, 5.0);
        let rect2 = rect(3.0, 3.0, 8.0, 8.0);
        let rect3 = rect(10.0, 10.0, 15.0, 15.0);
        // 边界接触
        let rect4 = rect(5.0, 5.0, 6.0, 6.0);

        assert!(rect1.overlaps(&rect2));
        assert!(rect2.overlaps(&rect1));
        assert!(!rect1.overlaps(&rect3));
        assert!(!rect3.overlaps(&rect1));
        assert!(rect1.overlaps(&rect4));
        assert!(rect1.overlaps(&rect1));
    }

    #[test]
    fn test_overlap_requires_every_dimension() {
        let wide = rect(0.0, 0.0, 100.0, 1.0);
        let tall = rect(50.0, 2.0, 51.0, 100.0);
        assert!(!wide.overlaps(&tall));
    }

    #[test]
    fn test_rectangle_contains() {
        let rect1 = rect(0.0, 0.0, 10.0, 10.0);
        let rect2 = rect(2.0, 2.0, 8.0, 8.0);
        let rect3 = rect(5.0, 5.0, 15.0, 15.0);

        assert!(rect1.contains(&rect2));
        assert!(!rect1.contains(&rect3));
    }

    #[test]
    fn test_rectangle_enlargement() {
        let rect1 = rect(0.0, 0.0, 5.0, 5.0);
        let rect2 = rect(3.0, 3.0, 8.0, 8.0);
        assert_eq!(rect1.enlargement(&rect2), 39.0); // 8*8 - 5*5 = 64 - 25 = 39
        assert_eq!(rect1.enlargement(&rect(1.0, 1.0, 2.0, 2.0)), 0.0);
    }

    #[test]
    fn test_center_and_distance() {
        let r = rect(0.0, 0.0, 4.0, 2.0);
        assert_eq!(r.center(), point(2.0, 1.0));
        assert_eq!(point(0.0, 0.0).distance_squared(&point(3.0, 4.0)), 25.0);
    }
}
