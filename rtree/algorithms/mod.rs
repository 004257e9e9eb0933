// R-tree算法模块
//
// 这个模块包含R-tree的所有核心算法实现，按功能分解为不同的子模块：
// - split: 种子选择与二次分裂算法
// - insert: 插入和树生长算法
// - search: 重叠搜索（惰性迭代器）
// - traverse: 先序遍历
// - debug: 结构输出与不变量检查

pub mod debug;
pub mod insert;
pub mod search;
pub mod split;
pub mod traverse;
