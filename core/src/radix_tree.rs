//! Radix tree for prefix lookups over string keys.
//!
//! Edges are byte strings, so splitting never lands inside a UTF-8 sequence
//! of a stored `&str`: lookups only ever compare whole edges.

/// A radix tree (compressed trie) keyed by strings.
///
/// # Performance
///
/// - Insert: O(k) where k is key length
/// - Lookup: O(k), children are binary-searched by first byte
///
/// # Example
///
/// ```
/// use mtree::RadixTree;
///
/// let mut tree = RadixTree::new();
/// tree.insert("/", "root");
/// tree.insert("/api", "api");
/// tree.insert("/api/v2", "api_v2");
///
/// assert_eq!(tree.longest_prefix("/api/v2/users"), Some(&"api_v2"));
/// assert_eq!(tree.prefixes_of("/api/v1"), vec![&"root", &"api"]);
/// assert_eq!(tree.longest_prefix("nope"), None);
/// ```
#[derive(Debug, Clone)]
pub struct RadixTree<V> {
    root: Node<V>,
    len: usize,
}

#[derive(Debug, Clone)]
struct Node<V> {
    /// Edge label from the parent. Empty only at the root.
    edge: Vec<u8>,
    value: Option<V>,
    /// Sorted by first edge byte.
    children: Vec<Node<V>>,
}

impl<V> Default for RadixTree<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> RadixTree<V> {
    /// Create an empty radix tree.
    #[must_use]
    pub fn new() -> Self {
        Self {
            root: Node::new(Vec::new()),
            len: 0,
        }
    }

    /// Insert a key-value pair, returning the previous value for `key`.
    pub fn insert(&mut self, key: &str, value: V) -> Option<V> {
        let previous = self.root.insert(key.as_bytes(), value);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// Value stored under exactly `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&V> {
        let mut node = &self.root;
        let mut rest = key.as_bytes();
        while !rest.is_empty() {
            let child = node.child(rest[0])?;
            rest = rest.strip_prefix(child.edge.as_slice())?;
            node = child;
        }
        node.value.as_ref()
    }

    /// Returns `true` if `key` is stored.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Values of every stored key that is a prefix of `key`, shortest first.
    #[must_use]
    pub fn prefixes_of(&self, key: &str) -> Vec<&V> {
        let mut found = Vec::new();
        let mut node = &self.root;
        let mut rest = key.as_bytes();
        loop {
            if let Some(value) = &node.value {
                found.push(value);
            }
            let Some(&first) = rest.first() else {
                break;
            };
            let Some(child) = node.child(first) else {
                break;
            };
            let Some(remaining) = rest.strip_prefix(child.edge.as_slice()) else {
                break;
            };
            rest = remaining;
            node = child;
        }
        found
    }

    /// Value of the longest stored key that prefixes `key`.
    #[must_use]
    pub fn longest_prefix(&self, key: &str) -> Option<&V> {
        self.prefixes_of(key).pop()
    }

    /// All stored values, in no particular order.
    pub fn values(&self) -> impl Iterator<Item = &V> {
        let mut stack = vec![&self.root];
        std::iter::from_fn(move || {
            while let Some(node) = stack.pop() {
                stack.extend(node.children.iter());
                if let Some(value) = &node.value {
                    return Some(value);
                }
            }
            None
        })
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns `true` if no key is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<V> Node<V> {
    fn new(edge: Vec<u8>) -> Self {
        Self {
            edge,
            value: None,
            children: Vec::new(),
        }
    }

    fn child(&self, first: u8) -> Option<&Node<V>> {
        self.position(first).ok().map(|pos| &self.children[pos])
    }

    fn position(&self, first: u8) -> Result<usize, usize> {
        self.children
            .binary_search_by_key(&Some(first), |child| child.edge.first().copied())
    }

    fn insert(&mut self, key: &[u8], value: V) -> Option<V> {
        let Some(&first) = key.first() else {
            return self.value.replace(value);
        };

        match self.position(first) {
            Err(pos) => {
                let mut leaf = Node::new(key.to_vec());
                leaf.value = Some(value);
                self.children.insert(pos, leaf);
                None
            }
            Ok(pos) => {
                let child = &mut self.children[pos];
                let common = common_prefix_len(key, &child.edge);
                if common < child.edge.len() {
                    child.split(common);
                }
                child.insert(&key[common..], value)
            }
        }
    }

    /// Shorten this edge to `at` bytes, pushing the rest into a new child.
    fn split(&mut self, at: usize) {
        let tail = Node {
            edge: self.edge.split_off(at),
            value: self.value.take(),
            children: std::mem::take(&mut self.children),
        };
        self.children.push(tail);
    }
}

#[inline]
fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b).take_while(|(x, y)| x == y).count()
}
