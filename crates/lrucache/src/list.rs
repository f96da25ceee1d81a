//! Recency list backed by a slot arena
//!
//! Nodes live in a `Vec` and refer to each other by slot index. Slots 0 and 1
//! are the head and tail sentinels, so linking and unlinking never branch on
//! the ends of the list. Freed slots are recycled through a free list.

const HEAD: usize = 0;
const TAIL: usize = 1;

/// Stable reference to a live entry in a [`RecencyList`]
///
/// A handle stays valid until its entry is popped; the slot may then be
/// reused for a different entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct Handle(usize);

/// Node in the doubly-linked list
struct Node<K, V> {
    entry: Option<(K, V)>,
    prev: usize,
    next: usize,
}

impl<K, V> Node<K, V> {
    fn unlinked(prev: usize, next: usize) -> Self {
        Self {
            entry: None,
            prev,
            next,
        }
    }
}

/// Entries ordered from most- to least-recently-used
pub(crate) struct RecencyList<K, V> {
    nodes: Vec<Node<K, V>>,
    free_list: Vec<usize>,
    len: usize,
}

impl<K, V> RecencyList<K, V> {
    /// Create an empty list with room for `capacity` entries
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity.saturating_add(2));
        // Sentinels: head.next and tail.prev point at each other when empty
        nodes.push(Node::unlinked(HEAD, TAIL));
        nodes.push(Node::unlinked(HEAD, TAIL));

        Self {
            nodes,
            free_list: Vec::new(),
            len: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Insert a new entry at the most-recently-used position
    pub(crate) fn push_front(&mut self, key: K, value: V) -> Handle {
        let idx = self.alloc_node();
        self.nodes[idx].entry = Some((key, value));
        self.link_front(idx);
        self.len += 1;
        Handle(idx)
    }

    /// Relocate an entry to the most-recently-used position
    pub(crate) fn move_to_front(&mut self, handle: Handle) {
        let idx = handle.0;
        if self.nodes[HEAD].next == idx {
            return;
        }
        self.unlink(idx);
        self.link_front(idx);
    }

    /// Remove and return the least-recently-used entry
    pub(crate) fn pop_back(&mut self) -> Option<(K, V)> {
        let idx = self.nodes[TAIL].prev;
        if idx == HEAD {
            return None;
        }

        self.unlink(idx);
        let entry = self.nodes[idx].entry.take();
        self.free_node(idx);
        self.len -= 1;
        entry
    }

    /// Value of a live entry
    pub(crate) fn value(&self, handle: Handle) -> Option<&V> {
        self.nodes[handle.0].entry.as_ref().map(|(_, value)| value)
    }

    #[cfg(test)]
    pub(crate) fn key(&self, handle: Handle) -> Option<&K> {
        self.nodes[handle.0].entry.as_ref().map(|(key, _)| key)
    }

    /// Iterate from most- to least-recently-used
    pub(crate) fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            list: self,
            cursor: self.nodes[HEAD].next,
        }
    }

    fn link_front(&mut self, idx: usize) {
        let first = self.nodes[HEAD].next;

        let node = &mut self.nodes[idx];
        node.prev = HEAD;
        node.next = first;

        self.nodes[first].prev = idx;
        self.nodes[HEAD].next = idx;
    }

    fn unlink(&mut self, idx: usize) {
        let (prev, next) = (self.nodes[idx].prev, self.nodes[idx].next);

        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;

        let node = &mut self.nodes[idx];
        node.prev = idx;
        node.next = idx;
    }

    fn alloc_node(&mut self) -> usize {
        if let Some(idx) = self.free_list.pop() {
            idx
        } else {
            let idx = self.nodes.len();
            self.nodes.push(Node::unlinked(idx, idx));
            idx
        }
    }

    fn free_node(&mut self, idx: usize) {
        self.free_list.push(idx);
    }

    /// Walk the links front to back and report the first inconsistency
    #[cfg(test)]
    pub(crate) fn check_links(&self) -> std::result::Result<(), String> {
        let mut forward = 0;
        let mut prev = HEAD;
        let mut cursor = self.nodes[HEAD].next;
        while cursor != TAIL {
            if self.nodes[cursor].prev != prev {
                return Err(format!(
                    "slot {} has prev {}, expected {}",
                    cursor, self.nodes[cursor].prev, prev
                ));
            }
            if self.nodes[cursor].entry.is_none() {
                return Err(format!("slot {} is linked but holds no entry", cursor));
            }
            forward += 1;
            if forward > self.len {
                return Err("forward walk exceeds len".to_string());
            }
            prev = cursor;
            cursor = self.nodes[cursor].next;
        }
        if self.nodes[TAIL].prev != prev {
            return Err("tail sentinel does not point at last entry".to_string());
        }
        if forward != self.len {
            return Err(format!("walked {} entries, len is {}", forward, self.len));
        }
        if self.len + self.free_list.len() + 2 != self.nodes.len() {
            return Err("live and free slots do not account for the arena".to_string());
        }
        Ok(())
    }
}

/// Iterator over `(key, value)` pairs in recency order
pub(crate) struct Iter<'a, K, V> {
    list: &'a RecencyList<K, V>,
    cursor: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor == TAIL {
            return None;
        }
        let list = self.list;
        let node = &list.nodes[self.cursor];
        self.cursor = node.next;
        node.entry.as_ref().map(|(key, value)| (key, value))
    }
}
