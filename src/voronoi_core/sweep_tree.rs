//! An arena backed AVL tree with stable node handles.
//!
//! Both the event queue and the beach line are stored in a [SweepTree]. Besides the usual
//! search tree links, every node keeps a pointer to its in-order predecessor and successor.
//! Nodes keep their [NodeId] until they are removed, which allows other structures (e.g.
//! circle events) to refer to them.
//!
//! All operations are iterative. Removal walks an explicit root-to-node path, see
//! [SweepTree::path_to].
use std::cmp::Ordering;

/// Refers to a node of a [SweepTree].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    fn new(index: usize) -> Self {
        NodeId(index as u32)
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// The outcome of [SweepTree::insert_by].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Insertion {
    /// No node compared equal, a new node was created.
    Inserted(NodeId),
    /// A node with an equal key exists already. The tree was not modified.
    Existing(NodeId),
}

#[derive(Clone, Debug)]
struct Node<T> {
    value: T,
    parent: Option<NodeId>,
    left: Option<NodeId>,
    right: Option<NodeId>,
    prev: Option<NodeId>,
    next: Option<NodeId>,
    height: u32,
}

#[derive(Clone, Debug)]
enum Slot<T> {
    Occupied(Node<T>),
    Vacant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Side {
    Left,
    Right,
}

#[derive(Clone, Debug)]
pub struct SweepTree<T> {
    slots: Vec<Slot<T>>,
    root: Option<NodeId>,
    first: Option<NodeId>,
    last: Option<NodeId>,
    len: usize,
}

impl<T> Default for SweepTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SweepTree<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            root: None,
            first: None,
            last: None,
            len: 0,
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Returns the smallest node.
    pub fn first(&self) -> Option<NodeId> {
        self.first
    }

    /// Returns the largest node.
    pub fn last(&self) -> Option<NodeId> {
        self.last
    }

    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.try_node(id).map(|node| &node.value)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        match self.slots.get_mut(id.index()) {
            Some(Slot::Occupied(node)) => Some(&mut node.value),
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn contains(&self, id: NodeId) -> bool {
        self.try_node(id).is_some()
    }

    /// Returns the in-order predecessor of a node.
    pub fn prev(&self, id: NodeId) -> Option<NodeId> {
        self.try_node(id)?.prev
    }

    /// Returns the in-order successor of a node.
    pub fn next(&self, id: NodeId) -> Option<NodeId> {
        self.try_node(id)?.next
    }

    pub fn left(&self, id: NodeId) -> Option<NodeId> {
        self.try_node(id)?.left
    }

    pub fn right(&self, id: NodeId) -> Option<NodeId> {
        self.try_node(id)?.right
    }

    #[cfg(test)]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.try_node(id)?.parent
    }

    /// Returns the smallest node of the subtree rooted at `id`.
    pub fn subtree_min(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(left) = self.node(current).left {
            current = left;
        }
        current
    }

    /// Returns the largest node of the subtree rooted at `id`.
    #[cfg(test)]
    pub fn subtree_max(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(right) = self.node(current).right {
            current = right;
        }
        current
    }

    /// Iterates over all nodes in order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &T)> + '_ {
        let mut current = self.first;
        std::iter::from_fn(move || {
            let id = current?;
            let node = self.node(id);
            current = node.next;
            Some((id, &node.value))
        })
    }

    /// Returns all nodes on the way from the root down to `id`, both inclusive.
    pub fn path_to(&self, id: NodeId) -> Vec<NodeId> {
        let mut path = vec![id];
        let mut current = id;
        while let Some(parent) = self.node(current).parent {
            path.push(parent);
            current = parent;
        }
        path.reverse();
        path
    }

    /// Inserts a new value unless an equal key exists already.
    ///
    /// `cmp` compares the new key against the key of an existing node. `make` is only
    /// called if no equal node was found.
    pub fn insert_by<C, M>(&mut self, mut cmp: C, make: M) -> Insertion
    where
        C: FnMut(&T) -> Ordering,
        M: FnOnce() -> T,
    {
        let mut current = self.root;
        let mut position = None;
        while let Some(id) = current {
            let node = self.node(id);
            match cmp(&node.value) {
                Ordering::Less => {
                    position = Some((id, Side::Left));
                    current = node.left;
                }
                Ordering::Greater => {
                    position = Some((id, Side::Right));
                    current = node.right;
                }
                Ordering::Equal => return Insertion::Existing(id),
            }
        }
        Insertion::Inserted(self.attach(position, make()))
    }

    /// Inserts a value directly after `id` in the in-order sequence.
    pub fn insert_after(&mut self, id: NodeId, value: T) -> NodeId {
        let position = match self.node(id).right {
            None => (id, Side::Right),
            Some(right) => (self.subtree_min(right), Side::Left),
        };
        self.attach(Some(position), value)
    }

    /// Inserts a value directly before `id` in the in-order sequence.
    #[cfg(test)]
    pub fn insert_before(&mut self, id: NodeId, value: T) -> NodeId {
        let position = match self.node(id).left {
            None => (id, Side::Left),
            Some(left) => (self.subtree_max(left), Side::Right),
        };
        self.attach(Some(position), value)
    }

    /// Appends a value after the current largest node.
    pub fn push_back(&mut self, value: T) -> NodeId {
        match self.last {
            Some(last) => self.insert_after(last, value),
            None => self.attach(None, value),
        }
    }

    /// Removes a node and returns its value.
    ///
    /// Returns `None` if the node has already been removed.
    pub fn remove(&mut self, id: NodeId) -> Option<T> {
        self.try_node(id)?;
        let mut path = self.path_to(id);
        let (left, right, parent) = {
            let node = self.node(id);
            (node.left, node.right, node.parent)
        };

        match (left, right) {
            (Some(left), Some(right)) => {
                // Replace the node by its successor
                let successor = self.subtree_min(right);
                let depth = path.len() - 1;
                let mut current = right;
                path.push(current);
                while current != successor {
                    current = self.node(current).left.unwrap_or(successor);
                    path.push(current);
                }

                if self.node(successor).parent != Some(id) {
                    let successor_parent = self.node(successor).parent;
                    let successor_right = self.node(successor).right;
                    if let Some(successor_parent) = successor_parent {
                        self.node_mut(successor_parent).left = successor_right;
                    }
                    if let Some(successor_right) = successor_right {
                        self.node_mut(successor_right).parent = successor_parent;
                    }
                    self.node_mut(successor).right = Some(right);
                    self.node_mut(right).parent = Some(successor);
                }
                self.node_mut(successor).left = Some(left);
                self.node_mut(left).parent = Some(successor);
                self.node_mut(successor).parent = parent;
                self.node_mut(successor).height = self.node(id).height;
                self.replace_child(parent, id, Some(successor));

                path[depth] = successor;
                path.pop();
            }
            (child, None) | (None, child) => {
                if let Some(child) = child {
                    self.node_mut(child).parent = parent;
                }
                self.replace_child(parent, id, child);
                path.pop();
            }
        }

        while let Some(ancestor) = path.pop() {
            self.rebalance(ancestor);
        }

        let (prev, next) = {
            let node = self.node(id);
            (node.prev, node.next)
        };
        match prev {
            Some(prev) => self.node_mut(prev).next = next,
            None => self.first = next,
        }
        match next {
            Some(next) => self.node_mut(next).prev = prev,
            None => self.last = prev,
        }

        self.len -= 1;
        match std::mem::replace(&mut self.slots[id.index()], Slot::Vacant) {
            Slot::Occupied(node) => Some(node.value),
            Slot::Vacant => None,
        }
    }

    fn try_node(&self, id: NodeId) -> Option<&Node<T>> {
        match self.slots.get(id.index()) {
            Some(Slot::Occupied(node)) => Some(node),
            _ => None,
        }
    }

    fn node(&self, id: NodeId) -> &Node<T> {
        match &self.slots[id.index()] {
            Slot::Occupied(node) => node,
            Slot::Vacant => panic!("Access to removed tree node {:?}. This is a bug.", id),
        }
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<T> {
        match &mut self.slots[id.index()] {
            Slot::Occupied(node) => node,
            Slot::Vacant => panic!("Access to removed tree node {:?}. This is a bug.", id),
        }
    }

    fn height(&self, id: Option<NodeId>) -> u32 {
        id.map_or(0, |id| self.node(id).height)
    }

    fn balance_factor(&self, id: NodeId) -> i64 {
        let node = self.node(id);
        i64::from(self.height(node.left)) - i64::from(self.height(node.right))
    }

    fn update_height(&mut self, id: NodeId) {
        let node = self.node(id);
        let height = 1 + self.height(node.left).max(self.height(node.right));
        self.node_mut(id).height = height;
    }

    /// Creates a new node as child of `position` and links it into the in-order list.
    fn attach(&mut self, position: Option<(NodeId, Side)>, value: T) -> NodeId {
        let id = NodeId::new(self.slots.len());
        let (prev, next) = match position {
            None => (None, None),
            Some((parent, Side::Left)) => (self.node(parent).prev, Some(parent)),
            Some((parent, Side::Right)) => (Some(parent), self.node(parent).next),
        };
        self.slots.push(Slot::Occupied(Node {
            value,
            parent: position.map(|(parent, _)| parent),
            left: None,
            right: None,
            prev,
            next,
            height: 1,
        }));
        self.len += 1;

        match position {
            None => self.root = Some(id),
            Some((parent, Side::Left)) => self.node_mut(parent).left = Some(id),
            Some((parent, Side::Right)) => self.node_mut(parent).right = Some(id),
        }
        match prev {
            Some(prev) => self.node_mut(prev).next = Some(id),
            None => self.first = Some(id),
        }
        match next {
            Some(next) => self.node_mut(next).prev = Some(id),
            None => self.last = Some(id),
        }

        let mut current = position.map(|(parent, _)| parent);
        while let Some(ancestor) = current {
            let subtree_root = self.rebalance(ancestor);
            current = self.node(subtree_root).parent;
        }
        id
    }

    fn replace_child(&mut self, parent: Option<NodeId>, old: NodeId, new: Option<NodeId>) {
        match parent {
            None => self.root = new,
            Some(parent) => {
                let parent = self.node_mut(parent);
                if parent.left == Some(old) {
                    parent.left = new;
                } else {
                    parent.right = new;
                }
            }
        }
    }

    fn rotate_left(&mut self, x: NodeId) -> NodeId {
        let Some(y) = self.node(x).right else {
            return x;
        };
        let parent = self.node(x).parent;
        let inner = self.node(y).left;

        self.node_mut(x).right = inner;
        if let Some(inner) = inner {
            self.node_mut(inner).parent = Some(x);
        }
        self.node_mut(y).parent = parent;
        self.replace_child(parent, x, Some(y));
        self.node_mut(y).left = Some(x);
        self.node_mut(x).parent = Some(y);

        self.update_height(x);
        self.update_height(y);
        y
    }

    fn rotate_right(&mut self, x: NodeId) -> NodeId {
        let Some(y) = self.node(x).left else {
            return x;
        };
        let parent = self.node(x).parent;
        let inner = self.node(y).right;

        self.node_mut(x).left = inner;
        if let Some(inner) = inner {
            self.node_mut(inner).parent = Some(x);
        }
        self.node_mut(y).parent = parent;
        self.replace_child(parent, x, Some(y));
        self.node_mut(y).right = Some(x);
        self.node_mut(x).parent = Some(y);

        self.update_height(x);
        self.update_height(y);
        y
    }

    /// Restores the AVL property at `id` and returns the new root of its subtree.
    fn rebalance(&mut self, id: NodeId) -> NodeId {
        self.update_height(id);
        let balance = self.balance_factor(id);
        if balance > 1 {
            if let Some(left) = self.node(id).left {
                if self.balance_factor(left) < 0 {
                    self.rotate_left(left);
                }
            }
            self.rotate_right(id)
        } else if balance < -1 {
            if let Some(right) = self.node(id).right {
                if self.balance_factor(right) > 0 {
                    self.rotate_right(right);
                }
            }
            self.rotate_left(id)
        } else {
            id
        }
    }

    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        fn check<T>(tree: &SweepTree<T>, id: NodeId, in_order: &mut Vec<NodeId>) -> u32 {
            let node = tree.node(id);
            let left_height = node.left.map_or(0, |left| {
                assert_eq!(tree.node(left).parent, Some(id));
                check(tree, left, in_order)
            });
            in_order.push(id);
            let right_height = node.right.map_or(0, |right| {
                assert_eq!(tree.node(right).parent, Some(id));
                check(tree, right, in_order)
            });
            assert!((i64::from(left_height) - i64::from(right_height)).abs() <= 1);
            assert_eq!(node.height, 1 + left_height.max(right_height));
            node.height
        }

        let mut in_order = Vec::new();
        if let Some(root) = self.root {
            assert_eq!(self.node(root).parent, None);
            check(self, root, &mut in_order);
        }
        let linked: Vec<_> = self.iter().map(|(id, _)| id).collect();
        assert_eq!(in_order, linked);
        assert_eq!(linked.len(), self.len);
        let mut backwards = Vec::new();
        let mut current = self.last;
        while let Some(id) = current {
            backwards.push(id);
            current = self.node(id).prev;
        }
        backwards.reverse();
        assert_eq!(backwards, linked);
    }
}
