//! An index-addressed tree stored in a single arena.
//!
//! Nodes never hold references to one another; every link is an [`Id`] into
//! the owning [`Arena`].  Links live in `Cell`s so the shape of the tree can
//! be changed through a shared borrow of the arena, while node payloads need
//! an exclusive one.

use std::cell::Cell;
use std::fmt;

/// A handle to a node stored in an [`Arena`].
#[derive(Hash, PartialOrd, Ord, Debug)]
pub struct Id<T>(id_arena::Id<Node<T>>);

impl<T> Copy for Id<T> {}

impl<T> Clone for Id<T> {
    #[inline]
    fn clone(&self) -> Id<T> {
        *self
    }
}

impl<T> Eq for Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

/// The storage backing a tree.
pub type Arena<T> = id_arena::Arena<Node<T>>;

/// Allocate a detached node holding `data`.
pub fn alloc<T>(arena: &mut Arena<T>, data: T) -> Id<T> {
    Id(arena.alloc(Node::new(data)))
}

/// Failure to link a node into the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkError {
    /// A node cannot become its own child.
    SelfLink,
    /// The new child is an ancestor of the intended parent.
    Cycle,
}

impl fmt::Display for LinkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkError::SelfLink => f.write_str("node appended to itself"),
            LinkError::Cycle => f.write_str("node appended below one of its descendants"),
        }
    }
}

/// A node inside the tree.
pub struct Node<T> {
    parent: Cell<Option<Id<T>>>,
    previous_sibling: Cell<Option<Id<T>>>,
    next_sibling: Cell<Option<Id<T>>>,
    first_child: Cell<Option<Id<T>>>,
    last_child: Cell<Option<Id<T>>>,

    /// The payload.
    pub data: T,
}

/// Prints only the payload; the links form cycles.
impl<T> fmt::Debug for Node<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        f.debug_struct("Node").field("data", &self.data).finish()
    }
}

impl<T> Node<T> {
    fn new(data: T) -> Node<T> {
        Node {
            parent: Cell::new(None),
            first_child: Cell::new(None),
            last_child: Cell::new(None),
            previous_sibling: Cell::new(None),
            next_sibling: Cell::new(None),
            data,
        }
    }

    fn detach(&self, arena: &Arena<T>) {
        let parent = self.parent.take().map(|i| &arena[i.0]);
        let previous_sibling = self.previous_sibling.take();
        let next_sibling = self.next_sibling.take();

        if let Some(next_sibling) = next_sibling {
            arena[next_sibling.0].previous_sibling.set(previous_sibling);
        } else if let Some(parent) = parent {
            parent.last_child.set(previous_sibling);
        }

        if let Some(previous_sibling) = previous_sibling {
            arena[previous_sibling.0].next_sibling.set(next_sibling);
        } else if let Some(parent) = parent {
            parent.first_child.set(next_sibling);
        }
    }
}

impl<T> Id<T> {
    /// The parent, unless this node is a root.
    pub fn parent(self, arena: &Arena<T>) -> Option<Id<T>> {
        arena[self.0].parent.get()
    }

    /// The first child, if any.
    pub fn first_child(self, arena: &Arena<T>) -> Option<Id<T>> {
        arena[self.0].first_child.get()
    }

    /// The last child, if any.
    pub fn last_child(self, arena: &Arena<T>) -> Option<Id<T>> {
        arena[self.0].last_child.get()
    }

    /// The sibling before this one, if any.
    pub fn previous_sibling(self, arena: &Arena<T>) -> Option<Id<T>> {
        arena[self.0].previous_sibling.get()
    }

    /// The sibling after this one, if any.
    pub fn next_sibling(self, arena: &Arena<T>) -> Option<Id<T>> {
        arena[self.0].next_sibling.get()
    }

    /// This node followed by each of its ancestors, nearest first.
    pub fn ancestors(self, arena: &Arena<T>) -> Ancestors<'_, T> {
        Ancestors(Some((arena, self)))
    }

    /// The children of this node, in order.
    pub fn children(self, arena: &Arena<T>) -> Children<'_, T> {
        Children(arena[self.0].first_child.get().map(|r| (arena, r)))
    }

    /// This node and all of its descendants, in tree order.
    pub fn descendants(self, arena: &Arena<T>) -> Descendants<'_, T> {
        Descendants(self.traverse(arena))
    }

    /// Start and end edges of this node and its descendants, in tree order.
    pub fn traverse(self, arena: &Arena<T>) -> Traverse<'_, T> {
        Traverse {
            arena,
            root: self,
            next: Some(NodeEdge::Start(self)),
        }
    }

    /// Whether this node has no children.
    pub fn is_leaf(self, arena: &Arena<T>) -> bool {
        arena[self.0].first_child.get().is_none()
    }

    /// Detach this node from its parent and siblings.  Children stay put.
    #[inline]
    pub fn detach(self, arena: &Arena<T>) {
        arena[self.0].detach(arena);
    }

    /// Append `new_child` after any existing children, detaching it from
    /// wherever it was first.
    pub fn append(self, arena: &Arena<T>, new_child: Id<T>) -> Result<(), LinkError> {
        if self == new_child {
            return Err(LinkError::SelfLink);
        }
        if self.ancestors(arena).any(|a| a == new_child) {
            return Err(LinkError::Cycle);
        }

        let node = &arena[self.0];
        let new_child_node = &arena[new_child.0];
        new_child_node.detach(arena);

        new_child_node.parent.set(Some(self));
        if let Some(last_child) = node.last_child.take() {
            let last_child_node = &arena[last_child.0];
            debug_assert!(last_child_node.next_sibling.get().is_none());
            new_child_node.previous_sibling.set(Some(last_child));
            last_child_node.next_sibling.set(Some(new_child));
        } else {
            debug_assert!(node.first_child.get().is_none());
            node.first_child.set(Some(new_child));
        }
        node.last_child.set(Some(new_child));
        Ok(())
    }

    /// The payload of this node.
    #[inline]
    pub fn data(self, arena: &Arena<T>) -> &T {
        &arena[self.0].data
    }

    /// The payload of this node, mutably.
    #[inline]
    pub fn data_mut(self, arena: &mut Arena<T>) -> &mut T {
        &mut arena[self.0].data
    }
}

macro_rules! axis_iterator {
    (#[$attr:meta] $name:ident: $next:ident) => {
        #[$attr]
        #[derive(Debug)]
        pub struct $name<'a, T>(Option<(&'a Arena<T>, Id<T>)>);

        impl<'a, T> Iterator for $name<'a, T> {
            type Item = Id<T>;

            fn next(&mut self) -> Option<Id<T>> {
                let (arena, id) = self.0.take()?;
                self.0 = arena[id.0].$next.get().map(|r| (arena, r));
                Some(id)
            }
        }
    };
}

axis_iterator! {
    #[doc = "An iterator over a node and its ancestors."]
    Ancestors: parent
}

axis_iterator! {
    #[doc = "An iterator over the children of a node."]
    Children: next_sibling
}

/// An iterator over a node and its descendants, in tree order.
#[derive(Debug)]
pub struct Descendants<'a, T: 'a>(Traverse<'a, T>);

impl<'a, T> Iterator for Descendants<'a, T> {
    type Item = Id<T>;

    fn next(&mut self) -> Option<Id<T>> {
        loop {
            match self.0.next()? {
                NodeEdge::Start(node) => return Some(node),
                NodeEdge::End(_) => {}
            }
        }
    }
}

/// Whether a traversal is entering or leaving a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeEdge<T> {
    /// Yielded before the node's descendants; an opening tag.
    Start(T),

    /// Yielded after the node's descendants; a closing tag.
    End(T),
}

/// An iterator over the start and end edges of a subtree, in tree order.
#[derive(Debug)]
pub struct Traverse<'a, T: 'a> {
    arena: &'a Arena<T>,
    root: Id<T>,
    next: Option<NodeEdge<Id<T>>>,
}

impl<'a, T> Iterator for Traverse<'a, T> {
    type Item = NodeEdge<Id<T>>;

    fn next(&mut self) -> Option<NodeEdge<Id<T>>> {
        let item = self.next.take()?;
        self.next = match item {
            NodeEdge::Start(id) => match self.arena[id.0].first_child.get() {
                Some(child) => Some(NodeEdge::Start(child)),
                None => Some(NodeEdge::End(id)),
            },
            NodeEdge::End(id) if id == self.root => None,
            NodeEdge::End(id) => match self.arena[id.0].next_sibling.get() {
                Some(sibling) => Some(NodeEdge::Start(sibling)),
                None => self.arena[id.0].parent.get().map(NodeEdge::End),
            },
        };
        Some(item)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_and_walk() {
        let mut arena = Arena::new();
        let root = alloc(&mut arena, "root");
        let a = alloc(&mut arena, "a");
        let b = alloc(&mut arena, "b");
        let c = alloc(&mut arena, "c");
        root.append(&arena, a).unwrap();
        a.append(&arena, b).unwrap();
        root.append(&arena, c).unwrap();

        let order: Vec<_> = root
            .descendants(&arena)
            .map(|id| *id.data(&arena))
            .collect();
        assert_eq!(order, ["root", "a", "b", "c"]);

        let up: Vec<_> = b.ancestors(&arena).map(|id| *id.data(&arena)).collect();
        assert_eq!(up, ["b", "a", "root"]);
    }

    #[test]
    fn append_rejects_cycles() {
        let mut arena = Arena::new();
        let root = alloc(&mut arena, 0);
        let child = alloc(&mut arena, 1);
        root.append(&arena, child).unwrap();
        assert_eq!(root.append(&arena, root), Err(LinkError::SelfLink));
        assert_eq!(child.append(&arena, root), Err(LinkError::Cycle));
    }

    #[test]
    fn reappend_moves_node() {
        let mut arena = Arena::new();
        let root = alloc(&mut arena, 0);
        let a = alloc(&mut arena, 1);
        let b = alloc(&mut arena, 2);
        root.append(&arena, a).unwrap();
        root.append(&arena, b).unwrap();
        b.append(&arena, a).unwrap();
        assert_eq!(root.children(&arena).count(), 1);
        assert_eq!(a.parent(&arena), Some(b));
    }
}
