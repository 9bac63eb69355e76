//! Unit tests for buffers
//!
//! Offset conversion, slicing and child buffers carved out of comment lines

use crate::error::LocationError;
use crate::location::Buffer;

#[test]
fn test_line_and_column_of_offsets() {
    let buffer = Buffer::new("a.rb", "a\nbc\n");

    assert_eq!(buffer.len(), 5);
    assert_eq!(buffer.line_count(), 3);
    assert_eq!(buffer.pos_to_line_col(0).unwrap(), (1, 0));
    assert_eq!(buffer.pos_to_line_col(1).unwrap(), (1, 1));
    assert_eq!(buffer.pos_to_line_col(2).unwrap(), (2, 0));
    assert_eq!(buffer.pos_to_line_col(3).unwrap(), (2, 1));
    assert_eq!(buffer.pos_to_line_col(5).unwrap(), (3, 0));
}

#[test]
fn test_offset_past_end_is_out_of_range() {
    let buffer = Buffer::new("a.rb", "abc");

    match buffer.pos_to_line_col(4) {
        Err(LocationError::OutOfRange { pos, len, .. }) => {
            assert_eq!(pos, 4);
            assert_eq!(len, 3);
        }
        other => panic!("Expected out of range error, got {:?}", other),
    }
    assert!(buffer.absolute_position(4).is_err());
}

#[test]
fn test_slice_bounds() {
    let buffer = Buffer::new("a.rb", "a\nbc\n");

    assert_eq!(buffer.slice(2, 4).unwrap(), "bc");
    assert_eq!(buffer.slice(5, 5).unwrap(), "");
    assert!(matches!(
        buffer.slice(3, 2),
        Err(LocationError::InvalidRange { .. })
    ));
    assert!(matches!(
        buffer.slice(0, 6),
        Err(LocationError::InvalidRange { .. })
    ));
}

#[test]
fn test_lines_by_number() {
    let buffer = Buffer::new("a.rb", "first\nsecond\n");

    assert_eq!(buffer.line(1), Some("first"));
    assert_eq!(buffer.line(2), Some("second"));
    assert_eq!(buffer.line(3), Some(""));
    assert_eq!(buffer.line(0), None);
    assert_eq!(buffer.line(4), None);
}

#[test]
fn test_multibyte_characters_are_single_positions() {
    let buffer = Buffer::new("a.rb", "é = 1");

    assert_eq!(buffer.len(), 5);
    assert_eq!(buffer.slice(0, 1).unwrap(), "é");
    assert_eq!(buffer.char_to_byte(1).unwrap(), 2);
    assert_eq!(buffer.byte_to_char(2), 1);
    assert_eq!(buffer.byte_to_char(1), 0);
}

#[test]
fn test_child_buffer_content_joins_ranges() {
    let parent = Buffer::new("a.rb", "# hello\n# world\n");
    let child = Buffer::child(&parent, vec![1..7, 9..15]).unwrap();

    assert_eq!(child.content(), " hello\n world");
    assert!(!child.is_top());
    assert_eq!(child.top().content(), parent.content());
}

#[test]
fn test_child_positions_map_to_top_buffer() {
    let parent = Buffer::new("a.rb", "# hello\n# world\n");
    let child = Buffer::child(&parent, vec![1..7, 9..15]).unwrap();

    assert_eq!(child.absolute_position(0).unwrap(), 1);
    assert_eq!(child.absolute_position(6).unwrap(), 7);
    assert_eq!(child.absolute_position(7).unwrap(), 9);
    assert_eq!(child.absolute_position(8).unwrap(), 10);

    // Line and column are always reported in top buffer coordinates
    assert_eq!(child.pos_to_line_col(1).unwrap(), (1, 2));
    assert_eq!(child.pos_to_line_col(8).unwrap(), (2, 2));
}

#[test]
fn test_grandchild_buffer_resolves_through_parents() {
    let parent = Buffer::new("a.rb", "x # @rbs return: Integer\n");
    let child = Buffer::child(&parent, vec![4..24]).unwrap();
    assert_eq!(child.content(), "@rbs return: Integer");

    let grandchild = Buffer::child(&child, vec![13..20]).unwrap();
    assert_eq!(grandchild.content(), "Integer");
    assert_eq!(grandchild.absolute_position(0).unwrap(), 17);
    assert_eq!(grandchild.pos_to_line_col(0).unwrap(), (1, 17));
}

#[test]
fn test_child_buffer_requires_ranges() {
    let parent = Buffer::new("a.rb", "# hello");

    assert!(matches!(
        Buffer::child(&parent, Vec::new()),
        Err(LocationError::EmptyChildBuffer { .. })
    ));
    assert!(Buffer::child(&parent, vec![0..20]).is_err());
}
