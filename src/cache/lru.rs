//! Recency List Module
//!
//! Implements Least Recently Used ordering for cache eviction.

use crate::cache::CacheEntry;

// == Node ==
#[derive(Debug)]
struct Node<K, V> {
    entry: CacheEntry<K, V>,
    prev: Option<usize>,
    next: Option<usize>,
}

// == Recency List ==
/// Doubly linked list of cache entries ordered by recency.
///
/// Nodes live in a slab so every operation addressed by slot is O(1):
/// - Head = Most recently used
/// - Tail = Least recently used
///
/// A slot stays valid until its node is removed; freed slots are reused by
/// later insertions.
#[derive(Debug)]
pub struct RecencyList<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
    len: usize,
}

impl<K, V> Default for RecencyList<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> RecencyList<K, V> {
    // == Constructor ==
    /// Creates a new empty list.
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            head: None,
            tail: None,
            len: 0,
        }
    }

    // == Push Front ==
    /// Inserts an entry as most recently used and returns its slot.
    pub fn push_front(&mut self, entry: CacheEntry<K, V>) -> usize {
        let node = Node {
            entry,
            prev: None,
            next: self.head,
        };

        let slot = match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                slot
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        };

        if let Some(old_head) = self.head {
            self.node_mut(old_head).prev = Some(slot);
        }
        self.head = Some(slot);
        if self.tail.is_none() {
            self.tail = Some(slot);
        }
        self.len += 1;
        slot
    }

    // == Move To Front ==
    /// Marks the entry at `slot` as most recently used.
    ///
    /// Unknown slots are ignored.
    pub fn move_to_front(&mut self, slot: usize) {
        if self.head == Some(slot) || !self.is_occupied(slot) {
            return;
        }
        self.unlink(slot);

        let old_head = self.head;
        {
            let node = self.node_mut(slot);
            node.prev = None;
            node.next = old_head;
        }
        if let Some(old_head) = old_head {
            self.node_mut(old_head).prev = Some(slot);
        }
        self.head = Some(slot);
        if self.tail.is_none() {
            self.tail = Some(slot);
        }
    }

    // == Remove ==
    /// Removes the entry at `slot` and returns it.
    pub fn remove(&mut self, slot: usize) -> Option<CacheEntry<K, V>> {
        if !self.is_occupied(slot) {
            return None;
        }
        self.unlink(slot);
        let node = self.slots[slot].take()?;
        self.free.push(slot);
        self.len -= 1;
        Some(node.entry)
    }

    // == Pop Back ==
    /// Removes and returns the least recently used entry.
    ///
    /// Returns None if the list is empty.
    pub fn pop_back(&mut self) -> Option<CacheEntry<K, V>> {
        let tail = self.tail?;
        self.remove(tail)
    }

    // == Get ==
    /// Returns the entry stored at `slot`.
    pub fn get(&self, slot: usize) -> Option<&CacheEntry<K, V>> {
        self.slots.get(slot)?.as_ref().map(|node| &node.entry)
    }

    /// Returns the entry stored at `slot` mutably.
    pub fn get_mut(&mut self, slot: usize) -> Option<&mut CacheEntry<K, V>> {
        self.slots.get_mut(slot)?.as_mut().map(|node| &mut node.entry)
    }

    // == Iter ==
    /// Iterates `(slot, entry)` pairs from most to least recently used.
    pub fn iter(&self) -> RecencyIter<'_, K, V> {
        RecencyIter {
            list: self,
            cursor: self.head,
        }
    }

    // == Clear ==
    /// Drops every entry and releases the slab.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
        self.len = 0;
    }

    // == Length ==
    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    // == Is Empty ==
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn is_occupied(&self, slot: usize) -> bool {
        matches!(self.slots.get(slot), Some(Some(_)))
    }

    fn node(&self, slot: usize) -> &Node<K, V> {
        match &self.slots[slot] {
            Some(node) => node,
            None => unreachable!("linked slot {slot} is vacant"),
        }
    }

    fn node_mut(&mut self, slot: usize) -> &mut Node<K, V> {
        match &mut self.slots[slot] {
            Some(node) => node,
            None => unreachable!("linked slot {slot} is vacant"),
        }
    }

    /// Detaches `slot` from its neighbours, fixing head and tail.
    fn unlink(&mut self, slot: usize) {
        let (prev, next) = {
            let node = self.node(slot);
            (node.prev, node.next)
        };

        match prev {
            Some(prev) => self.node_mut(prev).next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => self.node_mut(next).prev = prev,
            None => self.tail = prev,
        }

        let node = self.node_mut(slot);
        node.prev = None;
        node.next = None;
    }
}

// == Iterator ==
/// Iterator over a [`RecencyList`] from head to tail.
#[derive(Debug)]
pub struct RecencyIter<'a, K, V> {
    list: &'a RecencyList<K, V>,
    cursor: Option<usize>,
}

impl<'a, K, V> Iterator for RecencyIter<'a, K, V> {
    type Item = (usize, &'a CacheEntry<K, V>);

    fn next(&mut self) -> Option<Self::Item> {
        let slot = self.cursor?;
        let node = self.list.node(slot);
        self.cursor = node.next;
        Some((slot, &node.entry))
    }
}
