//! Binary prefix trie keyed by address bits.
//!
//! Addresses are left-aligned into the low `width` bits of a `u128`
//! (32 for IPv4, 128 for IPv6) and walked most significant bit first.

/// A binary trie of fixed bit width. Each node owns an ordered value list.
pub(crate) struct PrefixTrie<V> {
    width: u8,
    root: TrieNode<V>,
}

struct TrieNode<V> {
    children: [Option<Box<TrieNode<V>>>; 2],
    values: Vec<V>,
}

impl<V> TrieNode<V> {
    fn new() -> Self {
        Self {
            children: [None, None],
            values: Vec::new(),
        }
    }
}

impl<V> PrefixTrie<V> {
    pub(crate) fn new(width: u8) -> Self {
        Self {
            width,
            root: TrieNode::new(),
        }
    }

    /// Value list of the node for `addr/len`, creating the path as needed.
    ///
    /// Only the first `len` bits of `addr` are read. `len` must not exceed
    /// the trie width.
    pub(crate) fn entry(&mut self, addr: u128, len: u8) -> &mut Vec<V> {
        debug_assert!(len <= self.width);
        let width = self.width;
        let mut node = &mut self.root;
        for index in 0..len.min(width) {
            let bit = bit_at(addr, width, index);
            node = node.children[bit].get_or_insert_with(|| Box::new(TrieNode::new())).as_mut();
        }
        &mut node.values
    }

    /// Value lists of every non-empty node on the path of `addr`, deepest first.
    pub(crate) fn matching(&self, addr: u128) -> Vec<&[V]> {
        let mut path = Vec::new();
        let mut node = &self.root;
        let mut index = 0;
        loop {
            if !node.values.is_empty() {
                path.push(node.values.as_slice());
            }
            if index == self.width {
                break;
            }
            let Some(child) = &node.children[bit_at(addr, self.width, index)] else {
                break;
            };
            node = child.as_ref();
            index += 1;
        }
        path.reverse();
        path
    }
}

/// Bit `index` of `addr`, counted from the most significant of `width` bits.
#[inline]
fn bit_at(addr: u128, width: u8, index: u8) -> usize {
    ((addr >> (width - 1 - index)) & 1) as usize
}
