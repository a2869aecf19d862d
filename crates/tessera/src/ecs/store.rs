//! # SplayStore: A Self-Adjusting Keyed Store
//!
//! Every [`Entity`](super::Entity) keeps its components and its children in a
//! [`SplayStore`]: a binary search tree keyed by `u64` that owns boxed values.
//! The values may be unsized (`SplayStore<dyn Component>`), which is how one
//! store holds a transform, a material and a controller side by side.
//!
//! ## Move-to-Root
//!
//! Every `insert`, `search` and `remove` *splays* the tree: the touched key
//! (or the last node on its search path, when the key is absent) is rotated up
//! until it becomes the root. A game loop touches the same handful of
//! components every frame (the player's transform, the camera, the renderer),
//! so those keys stay at or near the root and lookups stay cheap.
//!
//! ```text
//!  search(3)            zig-zig              zig
//!
//!        7                 7                  3
//!       / \               / \                / \
//!      5   8             3   8              1   7
//!     / \       ──►     / \       ──►          / \
//!    3   6             1   5                  5   8
//!   /                       \                  \
//!  1                         6                  6
//! ```
//!
//! ## Top-Down Splaying
//!
//! The splay walks down from the root once, peeling nodes off into a *left
//! spine* (everything smaller than the key) and a *right spine* (everything
//! larger), and performs the zig-zig rotation on the way down. When the walk
//! stops, the spines are reattached under the new root. The walk is iterative,
//! so a degenerate tree (say, ten thousand ascending pushes) cannot overflow
//! the stack. Dropping the store is iterative for the same reason.
//!
//! ## Array Mode
//!
//! [`push`](SplayStore::push) stores a value under the next sequential index
//! of the store's own counter. The counter starts at 0 and is never rewound, so
//! an index is never reused after a removal.
//!
//! ## Comparison
//!
//! - **`BTreeMap`**: Balanced and cache friendly, but cannot hold unsized
//!   values inline and does not adapt to access patterns.
//! - **`HashMap<u64, Box<dyn Any>>`** (what most ECS resource maps use): O(1)
//!   lookups but no ordering, so array-mode iteration would need a side list.

use std::cmp::Ordering;

type Link<T> = Option<Box<Node<T>>>;

struct Node<T: ?Sized> {
    key: u64,
    value: Box<T>,
    left: Link<T>,
    right: Link<T>,
}

impl<T: ?Sized> Node<T> {
    fn new(key: u64, value: Box<T>) -> Box<Self> {
        Box::new(Self {
            key,
            value,
            left: None,
            right: None,
        })
    }
}

/// A splay tree from `u64` keys to owned, possibly unsized values.
pub struct SplayStore<T: ?Sized> {
    root: Link<T>,
    len: usize,
    next_index: u64,
}

impl<T: ?Sized> SplayStore<T> {
    pub fn new() -> Self {
        Self {
            root: None,
            len: 0,
            next_index: 0,
        }
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Key currently at the root, i.e. the most recently touched key.
    pub fn root_key(&self) -> Option<u64> {
        self.root.as_ref().map(|node| node.key)
    }

    /// Insert `value` under `key` and return the stored value.
    ///
    /// If `key` is already present the new value is dropped and the existing
    /// one is returned untouched (first writer wins).
    pub fn insert(&mut self, key: u64, value: Box<T>) -> &mut T {
        let Some(root) = self.root.take() else {
            self.len += 1;
            self.next_index += 1;
            let root = self.root.insert(Node::new(key, value));
            return &mut *root.value;
        };

        let mut root = splay(root, key);
        let node = match key.cmp(&root.key) {
            Ordering::Equal => {
                let root = self.root.insert(root);
                return &mut *root.value;
            }
            Ordering::Less => {
                let mut node = Node::new(key, value);
                node.left = root.left.take();
                node.right = Some(root);
                node
            }
            Ordering::Greater => {
                let mut node = Node::new(key, value);
                node.right = root.right.take();
                node.left = Some(root);
                node
            }
        };
        self.len += 1;
        self.next_index += 1;
        let root = self.root.insert(node);
        &mut *root.value
    }

    /// Insert `value` under the next array index and return it.
    ///
    /// The index counts every insert since the last [`clear`](Self::clear),
    /// keyed or pushed, so it equals [`len`](Self::len) until something is
    /// removed. Removed indices are never handed out again.
    pub fn push(&mut self, value: Box<T>) -> &mut T {
        self.insert(self.next_index, value)
    }

    /// The key the next [`push`](Self::push) will use.
    pub fn next_index(&self) -> u64 {
        self.next_index
    }

    /// Look up `key`, moving it (or its nearest neighbour) to the root.
    pub fn search(&mut self, key: u64) -> Option<&mut T> {
        let root = self.root.take()?;
        let root = self.root.insert(splay(root, key));
        if root.key == key {
            Some(&mut *root.value)
        } else {
            None
        }
    }

    /// Returns `true` if `key` is present. Splays like [`search`](Self::search).
    pub fn contains(&mut self, key: u64) -> bool {
        self.search(key).is_some()
    }

    /// Detach and return the value under `key`.
    pub fn take(&mut self, key: u64) -> Option<Box<T>> {
        let root = splay(self.root.take()?, key);
        if root.key != key {
            self.root = Some(root);
            return None;
        }

        let Node {
            value, left, right, ..
        } = *root;
        self.root = match left {
            None => right,
            Some(left) => {
                // Every key on the left is smaller, so splaying for `key`
                // brings the maximum up and leaves its right slot empty.
                let mut left = splay(left, key);
                left.right = right;
                Some(left)
            }
        };
        self.len -= 1;
        Some(value)
    }

    /// Remove and drop the value under `key`. Returns `false` if absent.
    pub fn remove(&mut self, key: u64) -> bool {
        self.take(key).is_some()
    }

    /// Drop every value and restart array indices at 0.
    pub fn clear(&mut self) {
        let mut stack: Vec<Box<Node<T>>> = self.root.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
        self.len = 0;
        self.next_index = 0;
    }

    /// Values in ascending key order. Does not restructure the tree.
    pub fn ordered(&self) -> Vec<&T> {
        let mut out = Vec::with_capacity(self.len);
        let mut work: Vec<Visit<&Node<T>, &T>> = Vec::new();
        if let Some(root) = self.root.as_deref() {
            work.push(Visit::Node(root));
        }
        while let Some(item) = work.pop() {
            match item {
                Visit::Emit(value) => out.push(value),
                Visit::Node(node) => {
                    if let Some(right) = node.right.as_deref() {
                        work.push(Visit::Node(right));
                    }
                    work.push(Visit::Emit(&*node.value));
                    if let Some(left) = node.left.as_deref() {
                        work.push(Visit::Node(left));
                    }
                }
            }
        }
        out
    }

    /// Mutable values in ascending key order. Does not restructure the tree.
    pub fn ordered_mut(&mut self) -> Vec<&mut T> {
        let mut out = Vec::with_capacity(self.len);
        let mut work: Vec<Visit<&mut Node<T>, &mut T>> = Vec::new();
        if let Some(root) = self.root.as_deref_mut() {
            work.push(Visit::Node(root));
        }
        while let Some(item) = work.pop() {
            match item {
                Visit::Emit(value) => out.push(value),
                Visit::Node(node) => {
                    let Node {
                        value, left, right, ..
                    } = node;
                    if let Some(right) = right.as_deref_mut() {
                        work.push(Visit::Node(right));
                    }
                    work.push(Visit::Emit(&mut **value));
                    if let Some(left) = left.as_deref_mut() {
                        work.push(Visit::Node(left));
                    }
                }
            }
        }
        out
    }

    /// Keys in ascending order. Does not restructure the tree.
    pub fn keys(&self) -> Vec<u64> {
        let mut out = Vec::with_capacity(self.len);
        let mut stack: Vec<&Node<T>> = Vec::new();
        let mut cursor = self.root.as_deref();
        loop {
            while let Some(node) = cursor {
                stack.push(node);
                cursor = node.left.as_deref();
            }
            let Some(node) = stack.pop() else { break };
            out.push(node.key);
            cursor = node.right.as_deref();
        }
        out
    }
}

impl<T: ?Sized> Default for SplayStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: ?Sized> Drop for SplayStore<T> {
    fn drop(&mut self) {
        self.clear();
    }
}

impl<T: ?Sized> std::fmt::Debug for SplayStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SplayStore")
            .field("len", &self.len)
            .field("root", &self.root_key())
            .field("keys", &self.keys())
            .finish()
    }
}

/// Work item for the iterative in-order walks.
enum Visit<N, V> {
    Node(N),
    Emit(V),
}

/// Top-down splay: returns the new root, which holds `key` if it is present,
/// otherwise the last node visited on the search path.
fn splay<T: ?Sized>(root: Box<Node<T>>, key: u64) -> Box<Node<T>> {
    let mut t = root;
    // Nodes larger than `key`, top to bottom. Each one's left slot is empty.
    let mut right_spine: Vec<Box<Node<T>>> = Vec::new();
    // Nodes smaller than `key`, top to bottom. Each one's right slot is empty.
    let mut left_spine: Vec<Box<Node<T>>> = Vec::new();

    loop {
        match key.cmp(&t.key) {
            Ordering::Equal => break,
            Ordering::Less => {
                let Some(mut child) = t.left.take() else { break };
                if key < child.key {
                    // zig-zig: rotate right before descending.
                    t.left = child.right.take();
                    child.right = Some(t);
                    t = child;
                    let Some(next) = t.left.take() else { break };
                    right_spine.push(t);
                    t = next;
                } else {
                    right_spine.push(t);
                    t = child;
                }
            }
            Ordering::Greater => {
                let Some(mut child) = t.right.take() else { break };
                if key > child.key {
                    // zig-zig: rotate left before descending.
                    t.right = child.left.take();
                    child.left = Some(t);
                    t = child;
                    let Some(next) = t.right.take() else { break };
                    left_spine.push(t);
                    t = next;
                } else {
                    left_spine.push(t);
                    t = child;
                }
            }
        }
    }

    let mut acc = t.left.take();
    for mut node in left_spine.into_iter().rev() {
        node.right = acc;
        acc = Some(node);
    }
    t.left = acc;

    let mut acc = t.right.take();
    for mut node in right_spine.into_iter().rev() {
        node.left = acc;
        acc = Some(node);
    }
    t.right = acc;

    t
}
