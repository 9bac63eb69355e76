//! Unit tests for locations and their keyed children

use pretty_assertions::assert_eq;

use crate::ast::{ClassKey, ClassOptionalKey};
use crate::error::LocationError;
use crate::location::*;

fn class_location() -> Location<ClassKey, ClassOptionalKey> {
    let buffer = Buffer::new("a.rbs", "  class Foo\n  end");
    Location::new(buffer, 2..17).unwrap()
}

#[test]
fn test_location_display() {
    let buffer = Buffer::new("test.rbs", "class Foo\nend");
    let location: Location = Location::new(buffer, 0..13).unwrap();

    assert_eq!(location.to_string(), "test.rbs:1:0...2:3");
    assert_eq!(location.source(), "class Foo\nend");
}

#[test]
fn test_cached_fields_are_stable() {
    let location = class_location();

    let first = (location.start_loc(), location.end_loc(), location.source().to_string());
    let second = (location.start_loc(), location.end_loc(), location.source().to_string());

    assert_eq!(first, second);
    assert_eq!(location.start_line(), 1);
    assert_eq!(location.start_column(), 2);
    assert_eq!(location.end_line(), 2);
    assert_eq!(location.end_column(), 5);
}

#[test]
fn test_location_must_fit_buffer() {
    let buffer = Buffer::new("a.rbs", "abc");

    assert!(Location::<NoChildren, NoChildren>::new(buffer.clone(), 0..3).is_ok());
    assert!(Location::<NoChildren, NoChildren>::new(buffer.clone(), 0..4).is_err());
    #[allow(clippy::reversed_empty_ranges)]
    let reversed = Location::<NoChildren, NoChildren>::new(buffer, 2..1);
    assert!(reversed.is_err());
}

#[test]
fn test_required_child_round_trip() {
    let mut location = class_location();
    location.add_required_child(ClassKey::Keyword, 2..7).unwrap();
    location.add_required_child(ClassKey::Name, 8..11).unwrap();

    assert_eq!(location.required_child(ClassKey::Keyword).unwrap().source(), "class");
    assert_eq!(location.required_child(ClassKey::Name).unwrap().source(), "Foo");
}

#[test]
fn test_unset_required_child_is_an_error() {
    let location = class_location();

    match location.required_child(ClassKey::End) {
        Err(LocationError::RequiredChildNotSet { key }) => assert_eq!(key, "end"),
        other => panic!("Expected unset required child error, got {:?}", other),
    }
}

#[test]
fn test_optional_child_absent_and_unset() {
    let mut location = class_location();
    location
        .add_optional_child(ClassOptionalKey::TypeParams, None)
        .unwrap();

    assert!(location.optional_child(ClassOptionalKey::TypeParams).is_none());
    assert_eq!(
        location.optional_child_state(ClassOptionalKey::TypeParams),
        ChildState::Absent
    );

    // Never assigned: still reads as absent
    assert!(location.optional_child(ClassOptionalKey::Lt).is_none());
    assert_eq!(
        location.optional_child_state(ClassOptionalKey::Lt),
        ChildState::Unset
    );
}

#[test]
fn test_optional_child_present() {
    let location = class_location()
        .with_optional(ClassOptionalKey::Lt, Some(14..17))
        .unwrap();

    let lt = location.optional_child(ClassOptionalKey::Lt).unwrap();
    assert_eq!(lt.source(), "end");
    assert_eq!(
        location.optional_child_state(ClassOptionalKey::Lt),
        ChildState::Present
    );
}

#[test]
fn test_child_keys_in_declaration_order() {
    let location = class_location();

    assert_eq!(
        location.required_keys(),
        vec![ClassKey::Keyword, ClassKey::Name, ClassKey::End]
    );
    assert_eq!(
        location.optional_keys(),
        vec![ClassOptionalKey::TypeParams, ClassOptionalKey::Lt]
    );
    assert_eq!(ClassKey::Name.name(), "name");
}

#[test]
fn test_equality_uses_buffer_identity() {
    let buffer = Buffer::new("a.rbs", "class Foo");
    let other_buffer = Buffer::new("a.rbs", "class Foo");

    let first: Location = Location::new(buffer.clone(), 0..5).unwrap();
    let same: Location = Location::new(buffer.clone(), 0..5).unwrap();
    let shorter: Location = Location::new(buffer, 0..4).unwrap();
    let elsewhere: Location = Location::new(other_buffer, 0..5).unwrap();

    assert_eq!(first, same);
    assert_ne!(first, shorter);
    assert_ne!(first, elsewhere);
}

#[test]
fn test_children_are_ignored_by_equality() {
    let plain = class_location();
    let with_child = plain
        .clone()
        .with_required(ClassKey::Name, 8..11)
        .unwrap();

    assert_eq!(plain, with_child);
}

#[test]
fn test_local_location_rebases_children() {
    let location = class_location()
        .with_required(ClassKey::Name, 8..11)
        .unwrap()
        .with_optional(ClassOptionalKey::TypeParams, None)
        .unwrap();

    let local = location.local_location();

    assert_eq!(local.start_pos(), 0);
    assert_eq!(local.end_pos(), 15);
    assert_eq!(local.source(), "class Foo\n  end");
    assert!(local.buffer().is_top());

    let name = local.required_child(ClassKey::Name).unwrap();
    assert_eq!(name.range(), 6..9);
    assert_eq!(name.source(), "Foo");
    assert_eq!(
        local.optional_child_state(ClassOptionalKey::TypeParams),
        ChildState::Absent
    );
}

#[test]
fn test_absent_location_placeholder() {
    let location = class_location();

    assert_eq!(format_optional::<NoChildren, NoChildren>(None), "*:*:*...*:*");
    assert_eq!(format_optional(Some(&location)), "a.rbs:1:2...2:5");
}

#[test]
fn test_source_span_in_top_buffer_bytes() {
    let parent = Buffer::new("a.rb", "é # ok\n");
    let child = Buffer::child(&parent, vec![4..6]).unwrap();
    let location: Location = Location::new(child, 0..2).unwrap();

    let span = location.source_span();
    assert_eq!(span.offset(), 5);
    assert_eq!(span.len(), 2);
    assert_eq!(location.start_loc(), (1, 4));
}

#[test]
fn test_cover_spans_both_locations() {
    let buffer = Buffer::new("a.rbs", "class Foo < Bar");
    let name: Location = Location::new(buffer.clone(), 6..9).unwrap();
    let parent: Location = Location::new(buffer, 12..15).unwrap();

    assert_eq!(name.cover(&parent).source(), "Foo < Bar");
}
