//! Forest of quote prefixes, each node owning a color from the quote palette.
//!
//! Nodes live in an arena and link to each other by index. A child's prefix
//! always extends its parent's prefix, and siblings never prefix one another.
//! When a new prefix turns out to be a shorter common prefix of existing nodes,
//! it is spliced in above them and the depth indices of later nodes shift by
//! one, which changes colors already painted on screen.

use crate::model::QuoteId;
use ratatui::style::Style;

#[derive(Debug, Clone)]
struct QuoteNode {
    prefix: Vec<u8>,
    depth_index: usize,
    parent: Option<usize>,
    first_child: Option<usize>,
    next: Option<usize>,
    prev: Option<usize>,
}

impl QuoteNode {
    fn new(prefix: &[u8]) -> Self {
        Self {
            prefix: prefix.to_vec(),
            depth_index: 0,
            parent: None,
            first_child: None,
            next: None,
            prev: None,
        }
    }
}

/// Result of classifying one quote prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuoteMatch {
    /// Node for the prefix.
    pub id: QuoteId,
    /// True if existing nodes were re-parented or recolored.
    pub restructured: bool,
}

/// Prefix forest assigning palette colors to quote levels.
#[derive(Debug, Clone)]
pub struct QuoteForest {
    nodes: Vec<QuoteNode>,
    first_root: Option<usize>,
    next_index: usize,
    palette: Vec<Style>,
}

impl QuoteForest {
    /// Create an empty forest over a palette of quote colors.
    pub fn new(palette: Vec<Style>) -> Self {
        Self {
            nodes: Vec::new(),
            first_root: None,
            next_index: 0,
            palette,
        }
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True if no prefix has been classified yet.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drop every node.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.first_root = None;
        self.next_index = 0;
    }

    /// Find or create the node for `prefix`.
    pub fn classify(&mut self, prefix: &[u8]) -> QuoteMatch {
        if self.palette.len() <= 1 {
            if self.nodes.is_empty() {
                self.nodes.push(QuoteNode::new(b""));
                self.first_root = Some(0);
            }
            return QuoteMatch {
                id: QuoteId::new(0),
                restructured: false,
            };
        }

        let len = prefix.len();
        let mut parent: Option<usize> = None;
        let mut cursor = self.first_root;
        // Node spliced in above shorter-prefixed siblings, and the depth index it takes over.
        let mut spliced: Option<(usize, usize)> = None;

        while let Some(current) = cursor {
            let node_prefix = &self.nodes[current].prefix;
            if len <= node_prefix.len() {
                if node_prefix[..len] != *prefix {
                    cursor = self.nodes[current].next;
                    continue;
                }
                if len == node_prefix.len() {
                    return QuoteMatch {
                        id: QuoteId::new(current),
                        restructured: false,
                    };
                }
                let taken_index = self.nodes[current].depth_index;
                match spliced {
                    None => {
                        let ancestor = self.alloc(prefix);
                        self.replace_with(current, ancestor);
                        spliced = Some((ancestor, taken_index));
                        cursor = self.nodes[ancestor].next;
                    }
                    Some((ancestor, _)) => {
                        let after = self.nodes[current].next;
                        self.unlink(current);
                        self.append_child(ancestor, current);
                        spliced = Some((ancestor, taken_index));
                        cursor = after;
                    }
                }
            } else if spliced.is_none() && prefix.starts_with(node_prefix) {
                parent = Some(current);
                cursor = self.nodes[current].first_child;
            } else {
                cursor = self.nodes[current].next;
            }
        }

        if let Some((ancestor, index)) = spliced {
            self.shift_indices(ancestor, index);
            return QuoteMatch {
                id: QuoteId::new(ancestor),
                restructured: true,
            };
        }

        let id = self.alloc(prefix);
        self.nodes[id].depth_index = self.next_index;
        self.next_index += 1;
        match parent {
            Some(p) => self.push_front_child(p, id),
            None => self.push_front_root(id),
        }
        QuoteMatch {
            id: QuoteId::new(id),
            restructured: false,
        }
    }

    /// Color for a byte position on a line quoted with node `id`.
    ///
    /// Positions inside an ancestor's prefix take the color of the outermost
    /// ancestor whose prefix still covers them.
    pub fn style_at(&self, id: QuoteId, pos: usize) -> Style {
        let mut style = self.style_of(id);
        let mut cursor = Some(id.get());
        while let Some(current) = cursor.filter(|&c| c < self.nodes.len()) {
            let node = &self.nodes[current];
            if node.prefix.len() <= pos {
                break;
            }
            style = self.palette_style(node.depth_index);
            cursor = node.parent;
        }
        style
    }

    /// Color assigned to node `id`.
    pub fn style_of(&self, id: QuoteId) -> Style {
        self.nodes
            .get(id.get())
            .map_or_else(|| self.palette_style(0), |n| self.palette_style(n.depth_index))
    }

    /// Depth index of node `id`.
    pub fn depth_index(&self, id: QuoteId) -> Option<usize> {
        self.nodes.get(id.get()).map(|n| n.depth_index)
    }

    /// Prefix bytes of node `id`.
    pub fn prefix(&self, id: QuoteId) -> &[u8] {
        self.nodes.get(id.get()).map_or(&[], |n| n.prefix.as_slice())
    }

    /// Parent of node `id`.
    pub fn parent(&self, id: QuoteId) -> Option<QuoteId> {
        self.nodes
            .get(id.get())
            .and_then(|n| n.parent)
            .map(QuoteId::new)
    }

    /// Children of node `id` in sibling order.
    pub fn children(&self, id: QuoteId) -> Vec<QuoteId> {
        let first = self.nodes.get(id.get()).and_then(|n| n.first_child);
        self.siblings_from(first)
    }

    /// Top-level nodes in sibling order.
    pub fn roots(&self) -> Vec<QuoteId> {
        self.siblings_from(self.first_root)
    }

    fn siblings_from(&self, first: Option<usize>) -> Vec<QuoteId> {
        let mut out = Vec::new();
        let mut cursor = first;
        while let Some(current) = cursor {
            out.push(QuoteId::new(current));
            cursor = self.nodes[current].next;
        }
        out
    }

    fn palette_style(&self, depth_index: usize) -> Style {
        if self.palette.is_empty() {
            return Style::default();
        }
        self.palette[depth_index % self.palette.len()]
    }

    fn alloc(&mut self, prefix: &[u8]) -> usize {
        self.nodes.push(QuoteNode::new(prefix));
        self.nodes.len() - 1
    }

    /// Put `new` in `old`'s place among its siblings and make `old` its only child.
    fn replace_with(&mut self, old: usize, new: usize) {
        let QuoteNode {
            parent, next, prev, ..
        } = self.nodes[old];
        self.nodes[new].parent = parent;
        self.nodes[new].next = next;
        self.nodes[new].prev = prev;
        if let Some(n) = next {
            self.nodes[n].prev = Some(new);
        }
        match prev {
            Some(p) => self.nodes[p].next = Some(new),
            None => self.set_first_of(parent, Some(new)),
        }

        self.nodes[new].first_child = Some(old);
        let old_node = &mut self.nodes[old];
        old_node.parent = Some(new);
        old_node.next = None;
        old_node.prev = None;
    }

    fn unlink(&mut self, id: usize) {
        let QuoteNode {
            parent, next, prev, ..
        } = self.nodes[id];
        if let Some(n) = next {
            self.nodes[n].prev = prev;
        }
        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.set_first_of(parent, next),
        }
        let node = &mut self.nodes[id];
        node.parent = None;
        node.next = None;
        node.prev = None;
    }

    fn append_child(&mut self, parent: usize, child: usize) {
        self.nodes[child].parent = Some(parent);
        let Some(mut tail) = self.nodes[parent].first_child else {
            self.nodes[parent].first_child = Some(child);
            return;
        };
        while let Some(n) = self.nodes[tail].next {
            tail = n;
        }
        self.nodes[tail].next = Some(child);
        self.nodes[child].prev = Some(tail);
    }

    fn push_front_child(&mut self, parent: usize, child: usize) {
        let head = self.nodes[parent].first_child;
        self.link_front(head, child);
        self.nodes[child].parent = Some(parent);
        self.nodes[parent].first_child = Some(child);
    }

    fn push_front_root(&mut self, id: usize) {
        let head = self.first_root;
        self.link_front(head, id);
        self.first_root = Some(id);
    }

    fn link_front(&mut self, head: Option<usize>, id: usize) {
        self.nodes[id].next = head;
        self.nodes[id].prev = None;
        if let Some(h) = head {
            self.nodes[h].prev = Some(id);
        }
    }

    fn set_first_of(&mut self, parent: Option<usize>, first: Option<usize>) {
        match parent {
            Some(p) => self.nodes[p].first_child = first,
            None => self.first_root = first,
        }
    }

    /// Give `new` depth index `index`, pushing every other node at or above it up by one.
    fn shift_indices(&mut self, new: usize, index: usize) {
        for (id, node) in self.nodes.iter_mut().enumerate() {
            if id != new && node.depth_index >= index {
                node.depth_index += 1;
            }
        }
        self.nodes[new].depth_index = index;
        self.next_index += 1;
    }
}
