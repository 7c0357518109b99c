//! # rb-index
//!
//! An ordered set of unique values backed by an arena-allocated red-black tree.
//!
//! Values are ordered by their `Ord` implementation. Lookups accept any borrowed
//! form of the value (`T: Borrow<Q>`), so a record ordered by one of its fields can
//! be found by that field alone.
//!
//! ## Example
//!
//! ```rust
//! use rb_index::{IndexError, RbTree};
//!
//! let mut tree: RbTree<u32> = RbTree::new();
//! tree.insert(10).unwrap();
//! tree.insert(20).unwrap();
//! tree.insert(30).unwrap();
//!
//! assert_eq!(tree.get(&20), Ok(&20));
//! assert_eq!(tree.insert(20), Err(IndexError::DuplicateKey));
//! assert_eq!(tree.in_order(), vec![&10, &20, &30]);
//! assert_eq!(tree.remove(&10), Ok(10));
//! assert_eq!(tree.len(), 2);
//! ```

#![deny(unsafe_op_in_unsafe_fn)]

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;

use thiserror::Error;

// =============================================================================
// Errors
// =============================================================================

pub type Result<T> = std::result::Result<T, IndexError>;

/// Failures reported by [`RbTree`]. A failed call never changes the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IndexError {
    /// An input was structurally unusable (empty prefix, unrelated rotation operands).
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("duplicate key")]
    DuplicateKey,

    #[error("key not found")]
    NotFound,

    #[error("index is empty")]
    EmptyContainer,
}

// =============================================================================
// Node links
// =============================================================================

/// Link to a node: index into the node arena.
///
/// `NIL` stands for an absent child or parent. Parent links are navigation only;
/// the arena owns every node.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct NodeId(u32);

impl NodeId {
    const NIL: NodeId = NodeId(u32::MAX);

    #[inline]
    fn new(index: usize) -> Self {
        debug_assert!(index < u32::MAX as usize);
        Self(index as u32)
    }

    #[inline]
    fn is_nil(self) -> bool {
        self == Self::NIL
    }

    #[inline]
    fn index(self) -> usize {
        debug_assert!(!self.is_nil());
        self.0 as usize
    }
}

/// Node color. Absent (`NIL`) positions count as black.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Color {
    Red,
    Black,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Dir {
    Left = 0,
    Right = 1,
}

impl Dir {
    #[inline]
    fn opposite(self) -> Self {
        match self {
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }
}

#[derive(Clone, Debug)]
struct Node<T> {
    value: T,
    parent: NodeId,
    children: [NodeId; 2],
    color: Color,
}

impl<T> Node<T> {
    #[inline]
    fn child(&self, dir: Dir) -> NodeId {
        self.children[dir as usize]
    }
}

// =============================================================================
// RbTree
// =============================================================================

/// An ordered set of unique values kept balanced with red-black coloring.
///
/// Nodes live in a dense arena (`Vec`); removal moves the last arena slot into the
/// freed one, so the arena length is always the element count.
///
/// After every public call returns:
/// - the root is black;
/// - no red node has a red child;
/// - every path from a node to an absent position crosses the same number of
///   black nodes;
/// - in-order traversal is strictly ascending.
#[derive(Clone)]
pub struct RbTree<T> {
    nodes: Vec<Node<T>>,
    root: NodeId,
}

impl<T> RbTree<T> {
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: NodeId::NIL,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = NodeId::NIL;
    }

    /// Values in ascending order.
    pub fn iter(&self) -> Iter<'_, T> {
        let mut iter = Iter {
            tree: self,
            stack: Vec::new(),
            remaining: self.len(),
        };
        iter.push_left_spine(self.root);
        iter
    }

    pub fn in_order(&self) -> Vec<&T> {
        self.iter().collect()
    }

    pub fn count_black_nodes(&self) -> usize {
        self.iter_nodes()
            .filter(|node| node.color == Color::Black)
            .count()
    }

    pub fn count_red_nodes(&self) -> usize {
        self.iter_nodes()
            .filter(|node| node.color == Color::Red)
            .count()
    }

    /// Number of black nodes on the path from the root to its leftmost absent
    /// position. Every other root path carries the same count.
    pub fn black_height(&self) -> usize {
        let mut height = 0;
        let mut current = self.root;
        while !current.is_nil() {
            let node = self.node(current);
            if node.color == Color::Black {
                height += 1;
            }
            current = node.child(Dir::Left);
        }
        height
    }

    // -------------------------------------------------------------------------
    // Arena access
    // -------------------------------------------------------------------------

    #[inline]
    fn node(&self, id: NodeId) -> &Node<T> {
        &self.nodes[id.index()]
    }

    #[inline]
    fn node_mut(&mut self, id: NodeId) -> &mut Node<T> {
        &mut self.nodes[id.index()]
    }

    #[inline]
    fn parent(&self, id: NodeId) -> NodeId {
        self.node(id).parent
    }

    #[inline]
    fn child(&self, id: NodeId, dir: Dir) -> NodeId {
        self.node(id).child(dir)
    }

    #[inline]
    fn color(&self, id: NodeId) -> Color {
        if id.is_nil() {
            Color::Black
        } else {
            self.node(id).color
        }
    }

    #[inline]
    fn paint(&mut self, id: NodeId, color: Color) {
        self.node_mut(id).color = color;
    }

    /// Preorder walk over reachable nodes; order does not matter to callers.
    fn iter_nodes(&self) -> impl Iterator<Item = &Node<T>> + '_ {
        let mut stack = Vec::new();
        if !self.root.is_nil() {
            stack.push(self.root);
        }
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            let node = self.node(id);
            for child in node.children {
                if !child.is_nil() {
                    stack.push(child);
                }
            }
            Some(node)
        })
    }

    /// Side of its parent that `id` hangs on. `id` must have a parent.
    #[inline]
    fn side_of(&self, id: NodeId) -> Dir {
        if self.child(self.parent(id), Dir::Left) == id {
            Dir::Left
        } else {
            Dir::Right
        }
    }

    fn leftmost(&self, mut id: NodeId) -> NodeId {
        loop {
            let left = self.child(id, Dir::Left);
            if left.is_nil() {
                return id;
            }
            id = left;
        }
    }

    /// Sets `parent.children[dir] = child` and the matching back link.
    #[inline]
    fn link(&mut self, parent: NodeId, dir: Dir, child: NodeId) {
        self.node_mut(parent).children[dir as usize] = child;
        if !child.is_nil() {
            self.node_mut(child).parent = parent;
        }
    }

    /// Puts `new` where `old` hangs under `parent` (or at the root when `parent`
    /// is `NIL`).
    fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        if parent.is_nil() {
            self.root = new;
            if !new.is_nil() {
                self.node_mut(new).parent = NodeId::NIL;
            }
            return;
        }
        let dir = if self.child(parent, Dir::Left) == old {
            Dir::Left
        } else {
            Dir::Right
        };
        self.link(parent, dir, new);
    }

    fn alloc(&mut self, value: T, parent: NodeId) -> Result<NodeId> {
        if self.nodes.len() >= NodeId::NIL.0 as usize {
            return Err(IndexError::InvalidArgument("node arena is full"));
        }
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(Node {
            value,
            parent,
            children: [NodeId::NIL; 2],
            color: Color::Red,
        });
        Ok(id)
    }

    /// Frees a node that is already unlinked from the tree and returns its value.
    ///
    /// The last arena node is moved into the freed slot and its neighbours are
    /// re-pointed at the new index.
    fn release(&mut self, id: NodeId) -> T {
        let last = NodeId::new(self.nodes.len() - 1);
        if id != last {
            let moved = self.node(last);
            let (parent, children) = (moved.parent, moved.children);
            if parent.is_nil() {
                self.root = id;
            } else {
                let dir = if self.child(parent, Dir::Left) == last {
                    Dir::Left
                } else {
                    Dir::Right
                };
                self.node_mut(parent).children[dir as usize] = id;
            }
            for child in children {
                if !child.is_nil() {
                    self.node_mut(child).parent = id;
                }
            }
        }
        self.nodes.swap_remove(id.index()).value
    }

    fn swap_values(&mut self, a: NodeId, b: NodeId) {
        debug_assert_ne!(a, b);
        let (lo, hi) = if a.index() < b.index() {
            (a.index(), b.index())
        } else {
            (b.index(), a.index())
        };
        let (head, tail) = self.nodes.split_at_mut(hi);
        std::mem::swap(&mut head[lo].value, &mut tail[0].value);
    }

    // -------------------------------------------------------------------------
    // Rotation
    // -------------------------------------------------------------------------

    /// Moves `child` into `parent`'s position and makes `parent` its child.
    ///
    /// A left child rotates right, a right child rotates left. The subtree between
    /// the two nodes changes sides so in-order sequence is preserved.
    fn rotate(&mut self, child: NodeId, parent: NodeId) -> Result<()> {
        if child.is_nil() || parent.is_nil() || self.parent(child) != parent {
            return Err(IndexError::InvalidArgument(
                "rotation operands are not parent and child",
            ));
        }

        let dir = self.side_of(child);
        let grandparent = self.parent(parent);
        let inner = self.child(child, dir.opposite());

        self.link(parent, dir, inner);
        self.link(child, dir.opposite(), parent);
        self.replace_child(grandparent, parent, child);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Repair
    // -------------------------------------------------------------------------

    fn repair_after_insert(&mut self, mut node: NodeId) -> Result<()> {
        loop {
            let parent = self.parent(node);
            if parent.is_nil() || self.color(parent) == Color::Black {
                break;
            }

            // A red parent is never the root, so the grandparent exists.
            let grandparent = self.parent(parent);
            let parent_side = self.side_of(parent);
            let uncle = self.child(grandparent, parent_side.opposite());

            if self.color(uncle) == Color::Red {
                self.paint(parent, Color::Black);
                self.paint(uncle, Color::Black);
                self.paint(grandparent, Color::Red);
                node = grandparent;
                continue;
            }

            let mut top = parent;
            if self.side_of(node) != parent_side {
                // Zig-zag: straighten the line first.
                self.rotate(node, parent)?;
                top = node;
            }
            self.rotate(top, grandparent)?;
            self.paint(top, Color::Black);
            self.paint(grandparent, Color::Red);
            break;
        }

        let root = self.root;
        self.paint(root, Color::Black);
        Ok(())
    }

    /// Double-black fix-up. `node` (possibly `NIL`) is short one black node on
    /// every path through it; `parent` is its parent.
    fn repair_after_remove(&mut self, mut node: NodeId, mut parent: NodeId) -> Result<()> {
        while !parent.is_nil() && self.color(node) == Color::Black {
            let side = if self.child(parent, Dir::Left) == node {
                Dir::Left
            } else {
                Dir::Right
            };

            // The sibling side has black-height >= 1, so the sibling exists.
            let mut sibling = self.child(parent, side.opposite());
            if self.color(sibling) == Color::Red {
                self.paint(sibling, Color::Black);
                self.paint(parent, Color::Red);
                self.rotate(sibling, parent)?;
                sibling = self.child(parent, side.opposite());
            }

            let near = self.child(sibling, side);
            let far = self.child(sibling, side.opposite());
            if self.color(near) == Color::Black && self.color(far) == Color::Black {
                self.paint(sibling, Color::Red);
                node = parent;
                parent = self.parent(node);
                continue;
            }

            if self.color(far) == Color::Black {
                self.paint(near, Color::Black);
                self.paint(sibling, Color::Red);
                self.rotate(near, sibling)?;
                sibling = near;
            }

            let far = self.child(sibling, side.opposite());
            let parent_color = self.color(parent);
            self.paint(sibling, parent_color);
            self.paint(parent, Color::Black);
            self.paint(far, Color::Black);
            self.rotate(sibling, parent)?;
            node = self.root;
            break;
        }

        if !node.is_nil() {
            self.paint(node, Color::Black);
        }
        Ok(())
    }
}

impl<T: Ord> RbTree<T> {
    /// Inserts `value`, failing with [`IndexError::DuplicateKey`] if an equal
    /// value is already stored.
    pub fn insert(&mut self, value: T) -> Result<()> {
        let mut parent = NodeId::NIL;
        let mut side = Dir::Left;
        let mut current = self.root;
        while !current.is_nil() {
            let node = self.node(current);
            side = match value.cmp(&node.value) {
                Ordering::Less => Dir::Left,
                Ordering::Greater => Dir::Right,
                Ordering::Equal => return Err(IndexError::DuplicateKey),
            };
            parent = current;
            current = node.child(side);
        }

        let id = self.alloc(value, parent)?;
        if parent.is_nil() {
            self.root = id;
        } else {
            self.node_mut(parent).children[side as usize] = id;
        }
        self.repair_after_insert(id)
    }

    /// Removes and returns the value equal to `key`.
    ///
    /// Rebalancing is the localized double-black fix-up along the path from the
    /// unlinked node to the root: O(log n), no tree rebuild.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut target = self.find(key);
        if target.is_nil() {
            return Err(IndexError::NotFound);
        }

        let right = self.child(target, Dir::Right);
        if !self.child(target, Dir::Left).is_nil() && !right.is_nil() {
            // Two children: take the successor's value, unlink the successor.
            let successor = self.leftmost(right);
            self.swap_values(target, successor);
            target = successor;
        }

        let left = self.child(target, Dir::Left);
        let child = if left.is_nil() {
            self.child(target, Dir::Right)
        } else {
            left
        };
        let parent = self.parent(target);
        self.replace_child(parent, target, child);

        if self.node(target).color == Color::Black {
            if self.color(child) == Color::Red {
                self.paint(child, Color::Black);
            } else {
                self.repair_after_remove(child, parent)?;
            }
        }

        Ok(self.release(target))
    }

    pub fn get<Q>(&self, key: &Q) -> Result<&T>
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        if self.is_empty() {
            return Err(IndexError::EmptyContainer);
        }
        let id = self.find(key);
        if id.is_nil() {
            return Err(IndexError::NotFound);
        }
        Ok(&self.node(id).value)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        !self.find(key).is_nil()
    }

    /// All values whose `Display` form starts with the first character of
    /// `initial`, compared case-insensitively, in ascending order.
    ///
    /// This is a filtered full traversal, O(n).
    pub fn prefix_search(&self, initial: &str) -> Result<Vec<&T>>
    where
        T: fmt::Display,
    {
        let wanted = initial
            .chars()
            .next()
            .map(fold_case)
            .ok_or(IndexError::InvalidArgument("prefix must not be empty"))?;

        Ok(self
            .iter()
            .filter(|value| value.to_string().chars().next().map(fold_case) == Some(wanted))
            .collect())
    }

    fn find<Q>(&self, key: &Q) -> NodeId
    where
        T: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;
        while !current.is_nil() {
            let node = self.node(current);
            current = match key.cmp(node.value.borrow()) {
                Ordering::Less => node.child(Dir::Left),
                Ordering::Greater => node.child(Dir::Right),
                Ordering::Equal => return current,
            };
        }
        NodeId::NIL
    }
}

#[inline]
fn fold_case(c: char) -> char {
    c.to_uppercase().next().unwrap_or(c)
}

impl<T> Default for RbTree<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for RbTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

/// Renders the contents in order as `[ a, b, c ]`.
impl<T: fmt::Display> fmt::Display for RbTree<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[ ")?;
        for (i, value) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{value}")?;
        }
        f.write_str(" ]")
    }
}

/// Collects values, skipping any that compare equal to one already collected.
impl<T: Ord> FromIterator<T> for RbTree<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

/// Inserts values, skipping duplicates.
impl<T: Ord> Extend<T> for RbTree<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for value in iter {
            let _ = self.insert(value);
        }
    }
}

impl<'a, T> IntoIterator for &'a RbTree<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// In-order iterator. Keeps one stack entry per level, so auxiliary space is
/// O(height).
pub struct Iter<'a, T> {
    tree: &'a RbTree<T>,
    stack: Vec<NodeId>,
    remaining: usize,
}

impl<'a, T> Iter<'a, T> {
    fn push_left_spine(&mut self, mut id: NodeId) {
        while !id.is_nil() {
            self.stack.push(id);
            id = self.tree.child(id, Dir::Left);
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let tree = self.tree;
        let node = tree.node(id);
        self.push_left_spine(node.child(Dir::Right));
        self.remaining -= 1;
        Some(&node.value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<T> ExactSizeIterator for Iter<'_, T> {}

impl<T> FusedIterator for Iter<'_, T> {}


#[cfg(test)]
mod proptests;
