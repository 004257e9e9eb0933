use crate::rtree::node::Node;
use crate::rtree::rtree::RTree;

impl<T> Node<T> {
    /// 先序遍历：先访问节点本身，再依次访问子节点
    pub fn traverse_preorder<F: FnMut(&Node<T>)>(&self, mut visit: F) {
        self.visit_preorder(&mut visit);
    }

    fn visit_preorder<F: FnMut(&Node<T>)>(&self, visit: &mut F) {
        visit(self);
        for child in self.children() {
            child.visit_preorder(visit);
        }
    }
}

impl<T> RTree<T> {
    /// 从根节点开始先序遍历整棵树，每个节点恰好访问一次，不做剪枝
    pub fn traverse_preorder<F: FnMut(&Node<T>)>(&self, visit: F) {
        if let Some(root) = self.root() {
            root.traverse_preorder(visit);
        }
    }

    /// 节点总数
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.traverse_preorder(|_| count += 1);
        count
    }
}
