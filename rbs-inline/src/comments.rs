//! Comment lines of a Ruby file, indexed by row

use std::collections::BTreeMap;
use std::ops::Range;

use tree_sitter::Node;

/// One `#` comment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentLine {
    /// Zero-based row
    pub row: usize,
    pub bytes: Range<usize>,
    /// Nothing but whitespace precedes the comment on its row
    pub standalone: bool,
}

impl CommentLine {
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.bytes.clone()).unwrap_or_default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct CommentIndex {
    by_row: BTreeMap<usize, CommentLine>,
}

impl CommentIndex {
    /// Collect every `#` comment below `root`
    pub fn collect(root: Node<'_>, source: &str) -> Self {
        let mut index = Self::default();
        let mut cursor = root.walk();
        let mut descend = true;

        loop {
            let node = cursor.node();
            if descend && node.kind() == "comment" {
                index.insert(node, source);
            }

            if descend && cursor.goto_first_child() {
                continue;
            }
            if cursor.goto_next_sibling() {
                descend = true;
                continue;
            }
            if !cursor.goto_parent() {
                break;
            }
            descend = false;
        }

        index
    }

    fn insert(&mut self, node: Node<'_>, source: &str) {
        let bytes = node.start_byte()..node.end_byte();
        if !source.get(bytes.clone()).is_some_and(|text| text.starts_with('#')) {
            // =begin/=end blocks
            return;
        }

        let line_start = source[..bytes.start].rfind('\n').map_or(0, |index| index + 1);
        let standalone = source[line_start..bytes.start].trim().is_empty();
        let row = node.start_position().row;

        self.by_row.insert(
            row,
            CommentLine {
                row,
                bytes,
                standalone,
            },
        );
    }

    pub fn len(&self) -> usize {
        self.by_row.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_row.is_empty()
    }

    pub fn get(&self, row: usize) -> Option<&CommentLine> {
        self.by_row.get(&row)
    }

    /// Contiguous standalone comments ending on the row before `row`, in document order
    pub fn leading_block(&self, row: usize) -> Vec<&CommentLine> {
        let mut block = Vec::new();
        let mut current = row;

        while current > 0 {
            current -= 1;
            match self.by_row.get(&current) {
                Some(comment) if comment.standalone => block.push(comment),
                _ => break,
            }
        }

        block.reverse();
        block
    }

    /// Comment after `after_byte` on `row`
    pub fn trailing(&self, row: usize, after_byte: usize) -> Option<&CommentLine> {
        self.by_row
            .get(&row)
            .filter(|comment| !comment.standalone && comment.bytes.start >= after_byte)
    }
}
