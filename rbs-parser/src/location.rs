//! Buffers and locations
//!
//! Every declaration, annotation and diagnostic is anchored to a [`Location`]: a
//! character range over a [`Buffer`]. A buffer may be a *child* carved out of a
//! parent buffer (for instance the text of a comment block with the `#` markers
//! stripped) so that annotation text can be parsed as a document of its own while
//! positions still map back to the file that contains it.
//!
//! Positions are character offsets, lines are 1-based and columns 0-based.

use std::fmt;
use std::marker::PhantomData;
use std::ops::Range;
use std::sync::{Arc, OnceLock};

use miette::{NamedSource, SourceSpan};

use crate::error::LocationError;

/// Placeholder printed for a location that is absent
pub const ABSENT_LOCATION: &str = "*:*:*...*:*";

/// Named, immutable source text with a precomputed line index
pub struct Buffer {
    name: String,
    content: String,
    /// Byte offset of every character, followed by `content.len()`
    char_offsets: Vec<usize>,
    /// Character offset of the first character of every line
    line_starts: Vec<usize>,
    parent: Option<ParentLink>,
}

/// Link from a child buffer back to the buffer it was carved out of
struct ParentLink {
    buffer: Arc<Buffer>,
    /// Parent ranges making up the child, one per child line
    ranges: Vec<Range<usize>>,
    /// Child offset at which each range begins
    range_starts: Vec<usize>,
}

impl Buffer {
    /// Create a top-level buffer
    pub fn new(name: impl Into<String>, content: impl Into<String>) -> Arc<Self> {
        let content = content.into();
        let (char_offsets, line_starts) = index_content(&content);

        Arc::new(Self {
            name: name.into(),
            content,
            char_offsets,
            line_starts,
            parent: None,
        })
    }

    /// Create a child buffer from ranges of `parent`.
    ///
    /// The child's content is the text of each range joined with `\n`.
    pub fn child(parent: &Arc<Buffer>, ranges: Vec<Range<usize>>) -> Result<Arc<Self>, LocationError> {
        if ranges.is_empty() {
            return Err(LocationError::EmptyChildBuffer {
                buffer: parent.name.clone(),
            });
        }

        let mut content = String::new();
        let mut range_starts = Vec::with_capacity(ranges.len());
        let mut offset = 0;

        for (index, range) in ranges.iter().enumerate() {
            if index > 0 {
                content.push('\n');
                offset += 1;
            }
            range_starts.push(offset);

            let text = parent.slice(range.start, range.end)?;
            content.push_str(text);
            offset += range.end - range.start;
        }

        let (char_offsets, line_starts) = index_content(&content);

        Ok(Arc::new(Self {
            name: parent.name.clone(),
            content,
            char_offsets,
            line_starts,
            parent: Some(ParentLink {
                buffer: Arc::clone(parent),
                ranges,
                range_starts,
            }),
        }))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.char_offsets.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn is_top(&self) -> bool {
        self.parent.is_none()
    }

    pub fn parent(&self) -> Option<&Arc<Buffer>> {
        self.parent.as_ref().map(|link| &link.buffer)
    }

    /// The buffer at the end of the parent chain
    pub fn top(&self) -> &Buffer {
        match &self.parent {
            Some(link) => link.buffer.top(),
            None => self,
        }
    }

    /// Number of lines in this buffer's own content
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Convert an offset in this buffer into an offset in the top buffer
    pub fn absolute_position(&self, pos: usize) -> Result<usize, LocationError> {
        self.check_position(pos)?;

        let Some(link) = &self.parent else {
            return Ok(pos);
        };

        let index = match link.range_starts.binary_search(&pos) {
            Ok(index) => index,
            Err(index) => index.saturating_sub(1),
        };
        let (Some(range), Some(range_start)) = (link.ranges.get(index), link.range_starts.get(index))
        else {
            return Err(self.out_of_range(pos));
        };

        link.buffer.absolute_position(range.start + (pos - range_start))
    }

    /// Line (1-based) and column (0-based) of an offset, in top buffer coordinates
    pub fn pos_to_line_col(&self, pos: usize) -> Result<(usize, usize), LocationError> {
        let absolute = self.absolute_position(pos)?;
        let top = self.top();

        let line_index = match top.line_starts.binary_search(&absolute) {
            Ok(index) => index,
            Err(index) => index.saturating_sub(1),
        };
        let line_start = top.line_starts.get(line_index).copied().unwrap_or(0);

        Ok((line_index + 1, absolute - line_start))
    }

    /// Text between two character offsets
    pub fn slice(&self, start: usize, end: usize) -> Result<&str, LocationError> {
        if start > end || end > self.len() {
            return Err(LocationError::InvalidRange {
                buffer: self.name.clone(),
                start,
                end,
                len: self.len(),
            });
        }

        match (self.char_offsets.get(start), self.char_offsets.get(end)) {
            (Some(&from), Some(&to)) => Ok(&self.content[from..to]),
            _ => Err(self.out_of_range(end)),
        }
    }

    /// Text of the given line (1-based), without its line terminator
    pub fn line(&self, line: usize) -> Option<&str> {
        let start = *self.line_starts.get(line.checked_sub(1)?)?;
        let end = self
            .line_starts
            .get(line)
            .map(|next| next - 1)
            .unwrap_or_else(|| self.len());
        self.slice(start, end).ok()
    }

    /// Character offset for a byte offset; bytes inside a character round down
    pub fn byte_to_char(&self, byte: usize) -> usize {
        let index = self.char_offsets.partition_point(|&offset| offset <= byte);
        index.saturating_sub(1)
    }

    /// Byte offset for a character offset
    pub fn char_to_byte(&self, pos: usize) -> Result<usize, LocationError> {
        self.char_offsets
            .get(pos)
            .copied()
            .ok_or_else(|| self.out_of_range(pos))
    }

    /// Named source of the top buffer for miette reports
    pub fn named_source(&self) -> NamedSource<String> {
        let top = self.top();
        NamedSource::new(top.name.clone(), top.content.clone())
    }

    fn check_position(&self, pos: usize) -> Result<(), LocationError> {
        if pos > self.len() {
            return Err(self.out_of_range(pos));
        }
        Ok(())
    }

    fn out_of_range(&self, pos: usize) -> LocationError {
        LocationError::OutOfRange {
            buffer: self.name.clone(),
            pos,
            len: self.len(),
        }
    }
}

impl fmt::Debug for Buffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buffer")
            .field("name", &self.name)
            .field("len", &self.len())
            .field("child", &self.parent.is_some())
            .finish()
    }
}

fn index_content(content: &str) -> (Vec<usize>, Vec<usize>) {
    let mut char_offsets = Vec::with_capacity(content.len() + 1);
    let mut line_starts = vec![0];

    for (index, (byte, ch)) in content.char_indices().enumerate() {
        char_offsets.push(byte);
        if ch == '\n' {
            line_starts.push(index + 1);
        }
    }
    char_offsets.push(content.len());

    (char_offsets, line_starts)
}

/// Key naming one child of a location.
///
/// Each node shape declares its own required and optional key enums, so asking a
/// location for a child it cannot have does not compile.
pub trait ChildKey: Copy + Eq + fmt::Debug + Send + Sync + 'static {
    /// Every key of the set, in declaration order
    const ALL: &'static [Self];

    fn index(self) -> usize;

    fn name(self) -> &'static str;
}

/// Key set of locations without children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NoChildren {}

impl ChildKey for NoChildren {
    const ALL: &'static [Self] = &[];

    fn index(self) -> usize {
        match self {}
    }

    fn name(self) -> &'static str {
        match self {}
    }
}

/// Declare a [`ChildKey`] enum: `child_keys! { pub enum Key { Name => "name" } }`
#[macro_export]
macro_rules! child_keys {
    ($(#[$meta:meta])* $vis:vis enum $name:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant),+
        }

        impl $crate::location::ChildKey for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn index(self) -> usize {
                self as usize
            }

            fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $label),+
                }
            }
        }
    };
}

/// State of an optional child slot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildState {
    /// Never assigned
    Unset,
    /// Explicitly assigned as absent
    Absent,
    Present,
}

#[derive(Debug, Clone)]
enum Slot {
    Unset,
    Absent,
    Present(Range<usize>),
}

/// A character range over a buffer, with keyed sub-ranges
pub struct Location<R: ChildKey = NoChildren, O: ChildKey = NoChildren> {
    buffer: Arc<Buffer>,
    start: usize,
    end: usize,
    required: Vec<Option<Range<usize>>>,
    optional: Vec<Slot>,
    start_loc: OnceLock<(usize, usize)>,
    end_loc: OnceLock<(usize, usize)>,
    source: OnceLock<String>,
    keys: PhantomData<fn() -> (R, O)>,
}

impl<R: ChildKey, O: ChildKey> Location<R, O> {
    pub fn new(buffer: Arc<Buffer>, range: Range<usize>) -> Result<Self, LocationError> {
        check_range(&buffer, &range)?;

        Ok(Self {
            buffer,
            start: range.start,
            end: range.end,
            required: vec![None; R::ALL.len()],
            optional: vec![Slot::Unset; O::ALL.len()],
            start_loc: OnceLock::new(),
            end_loc: OnceLock::new(),
            source: OnceLock::new(),
            keys: PhantomData,
        })
    }

    pub fn buffer(&self) -> &Arc<Buffer> {
        &self.buffer
    }

    pub fn name(&self) -> &str {
        self.buffer.name()
    }

    pub fn start_pos(&self) -> usize {
        self.start
    }

    pub fn end_pos(&self) -> usize {
        self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn start_loc(&self) -> (usize, usize) {
        // The range was validated in `new`, so the conversion cannot fail.
        *self
            .start_loc
            .get_or_init(|| self.buffer.pos_to_line_col(self.start).unwrap_or((1, 0)))
    }

    pub fn end_loc(&self) -> (usize, usize) {
        *self
            .end_loc
            .get_or_init(|| self.buffer.pos_to_line_col(self.end).unwrap_or((1, 0)))
    }

    pub fn start_line(&self) -> usize {
        self.start_loc().0
    }

    pub fn start_column(&self) -> usize {
        self.start_loc().1
    }

    pub fn end_line(&self) -> usize {
        self.end_loc().0
    }

    pub fn end_column(&self) -> usize {
        self.end_loc().1
    }

    /// Text covered by this location
    pub fn source(&self) -> &str {
        self.source.get_or_init(|| {
            self.buffer
                .slice(self.start, self.end)
                .map(str::to_string)
                .unwrap_or_default()
        })
    }

    pub fn add_required_child(&mut self, key: R, range: Range<usize>) -> Result<(), LocationError> {
        check_range(&self.buffer, &range)?;
        if let Some(slot) = self.required.get_mut(key.index()) {
            *slot = Some(range);
        }
        Ok(())
    }

    /// Assign an optional child; `None` records it as explicitly absent
    pub fn add_optional_child(
        &mut self,
        key: O,
        range: Option<Range<usize>>,
    ) -> Result<(), LocationError> {
        let slot = match range {
            Some(range) => {
                check_range(&self.buffer, &range)?;
                Slot::Present(range)
            }
            None => Slot::Absent,
        };
        if let Some(existing) = self.optional.get_mut(key.index()) {
            *existing = slot;
        }
        Ok(())
    }

    /// Builder form of [`Location::add_required_child`]
    pub fn with_required(mut self, key: R, range: Range<usize>) -> Result<Self, LocationError> {
        self.add_required_child(key, range)?;
        Ok(self)
    }

    /// Builder form of [`Location::add_optional_child`]
    pub fn with_optional(mut self, key: O, range: Option<Range<usize>>) -> Result<Self, LocationError> {
        self.add_optional_child(key, range)?;
        Ok(self)
    }

    /// Location of a required child; fails only if the child was never assigned
    pub fn required_child(&self, key: R) -> Result<Location, LocationError> {
        match self.required.get(key.index()) {
            Some(Some(range)) => self.sub_location(range.clone()),
            _ => Err(LocationError::RequiredChildNotSet { key: key.name() }),
        }
    }

    /// Location of an optional child, `None` when absent or unset
    pub fn optional_child(&self, key: O) -> Option<Location> {
        match self.optional.get(key.index()) {
            Some(Slot::Present(range)) => self.sub_location(range.clone()).ok(),
            _ => None,
        }
    }

    pub fn optional_child_state(&self, key: O) -> ChildState {
        match self.optional.get(key.index()) {
            Some(Slot::Present(_)) => ChildState::Present,
            Some(Slot::Absent) => ChildState::Absent,
            Some(Slot::Unset) | None => ChildState::Unset,
        }
    }

    pub fn required_keys(&self) -> Vec<R> {
        R::ALL.to_vec()
    }

    pub fn optional_keys(&self) -> Vec<O> {
        O::ALL.to_vec()
    }

    /// Same range, without children
    pub fn plain(&self) -> Location {
        Location {
            buffer: Arc::clone(&self.buffer),
            start: self.start,
            end: self.end,
            required: Vec::new(),
            optional: Vec::new(),
            start_loc: self.start_loc.clone(),
            end_loc: self.end_loc.clone(),
            source: self.source.clone(),
            keys: PhantomData,
        }
    }

    /// Smallest location covering both `self` and `other`
    pub fn cover(&self, other: &Location) -> Location {
        let start = self.start.min(other.start_pos());
        let end = self.end.max(other.end_pos());
        Location::new(Arc::clone(&self.buffer), start..end).unwrap_or_else(|_| self.plain())
    }

    /// Rewrite this location onto a detached buffer holding only its own text.
    ///
    /// The result starts at offset zero; children are shifted accordingly.
    pub fn local_location(&self) -> Location<R, O> {
        let buffer = Buffer::new(self.buffer.name(), self.source());
        let len = buffer.len();
        let shift = |range: &Range<usize>| {
            let start = range.start.saturating_sub(self.start).min(len);
            let end = range.end.saturating_sub(self.start).clamp(start, len);
            start..end
        };

        Location {
            required: self
                .required
                .iter()
                .map(|slot| slot.as_ref().map(shift))
                .collect(),
            optional: self
                .optional
                .iter()
                .map(|slot| match slot {
                    Slot::Present(range) => Slot::Present(shift(range)),
                    other => other.clone(),
                })
                .collect(),
            buffer,
            start: 0,
            end: len,
            start_loc: OnceLock::new(),
            end_loc: OnceLock::new(),
            source: OnceLock::new(),
            keys: PhantomData,
        }
    }

    /// Byte span in the top buffer
    pub fn source_span(&self) -> SourceSpan {
        let top = self.buffer.top();
        let to_byte = |pos: usize| {
            self.buffer
                .absolute_position(pos)
                .and_then(|absolute| top.char_to_byte(absolute))
                .unwrap_or(0)
        };
        let start = to_byte(self.start);
        let end = to_byte(self.end).max(start);
        SourceSpan::new(start.into(), end - start)
    }

    pub fn named_source(&self) -> NamedSource<String> {
        self.buffer.named_source()
    }

    fn sub_location(&self, range: Range<usize>) -> Result<Location, LocationError> {
        Location::new(Arc::clone(&self.buffer), range)
    }
}

fn check_range(buffer: &Buffer, range: &Range<usize>) -> Result<(), LocationError> {
    if range.start > range.end || range.end > buffer.len() {
        return Err(LocationError::InvalidRange {
            buffer: buffer.name().to_string(),
            start: range.start,
            end: range.end,
            len: buffer.len(),
        });
    }
    Ok(())
}

impl<R: ChildKey, O: ChildKey> Clone for Location<R, O> {
    fn clone(&self) -> Self {
        Self {
            buffer: Arc::clone(&self.buffer),
            start: self.start,
            end: self.end,
            required: self.required.clone(),
            optional: self.optional.clone(),
            start_loc: self.start_loc.clone(),
            end_loc: self.end_loc.clone(),
            source: self.source.clone(),
            keys: PhantomData,
        }
    }
}

impl<R: ChildKey, O: ChildKey> PartialEq for Location<R, O> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.buffer, &other.buffer) && self.start == other.start && self.end == other.end
    }
}

impl<R: ChildKey, O: ChildKey> Eq for Location<R, O> {}

impl<R: ChildKey, O: ChildKey> fmt::Display for Location<R, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (start_line, start_column) = self.start_loc();
        let (end_line, end_column) = self.end_loc();
        write!(
            f,
            "{}:{}:{}...{}:{}",
            self.name(),
            start_line,
            start_column,
            end_line,
            end_column
        )
    }
}

impl<R: ChildKey, O: ChildKey> fmt::Debug for Location<R, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Location({self})")
    }
}

/// Display a location that may be absent
pub fn format_optional<R: ChildKey, O: ChildKey>(location: Option<&Location<R, O>>) -> String {
    match location {
        Some(location) => location.to_string(),
        None => ABSENT_LOCATION.to_string(),
    }
}
