#![doc = include_str!("../README.md")]

mod builder;
mod diagnostic;
mod error;
mod value;

pub use builder::TreeBuilder;
pub use error::Error;
pub use value::{Entry, Mapping, Value};
pub use yamlet_parse::{ErrorKind, Event, Parser, ScalarStyle, SourceError, Span};

/// Parse a raw byte buffer into a single value.
///
/// Empty input yields [`Value::Null`]. A stream holding several documents
/// yields the last one. On failure no partial tree is returned.
pub fn parse(input: &[u8]) -> Result<Value, Error> {
    let mut parser = Parser::new(input);
    let mut builder = TreeBuilder::new();
    while let Some(step) = parser.next_event() {
        let event = step.map_err(Error::from)?;
        let at_end = matches!(event, Event::StreamEnd);
        builder.event(event)?;
        if at_end {
            break;
        }
    }
    Ok(builder.finish())
}

/// Parse a string into a single value.
pub fn parse_str(source: &str) -> Result<Value, Error> {
    parse(source.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_input() {
        assert_eq!(parse(b"").unwrap(), Value::Null);
        assert_eq!(parse(b"   \n# nothing here\n").unwrap(), Value::Null);
    }

    #[test]
    fn test_bare_scalar() {
        assert_eq!(parse(b"hello").unwrap(), Value::scalar("hello"));
    }

    #[test]
    fn test_flat_sequence() {
        assert_eq!(
            parse(b"- 1\n- 2\n- 3\n").unwrap(),
            Value::seq(vec![
                Value::scalar("1"),
                Value::scalar("2"),
                Value::scalar("3"),
            ])
        );
    }

    #[test]
    fn test_flat_mapping() {
        let value = parse(b"a: 1\nb: 2\n").unwrap();
        let mapping = value.as_mapping().expect("expected a mapping");
        assert_eq!(mapping.len(), 2);
        assert_eq!(mapping.entries[0].key.as_str(), Some("a"));
        assert_eq!(mapping.entries[0].value.as_str(), Some("1"));
        assert_eq!(mapping.entries[1].key.as_str(), Some("b"));
        assert_eq!(mapping.entries[1].value.as_str(), Some("2"));
    }

    #[test]
    fn test_duplicate_key_overwrite() {
        let value = parse(b"a: 1\na: 2\n").unwrap();
        let mapping = value.as_mapping().expect("expected a mapping");
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.get("a").and_then(|v| v.as_str()), Some("2"));
    }

    #[test]
    fn test_nesting() {
        // a: [1, {b: 2}], spelled in block style.
        let value = parse(b"a:\n  - 1\n  - b: 2\n").unwrap();
        let items = value
            .get("a")
            .and_then(|v| v.as_sequence())
            .expect("expected a sequence under `a`");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].as_str(), Some("1"));
        assert_eq!(items[1].get("b").and_then(|v| v.as_str()), Some("2"));

        // The flow spelling builds an identical tree.
        assert_eq!(value, parse(b"a: [1, {b: 2}]").unwrap());
    }

    #[test]
    fn test_invalid_utf8_scalar() {
        let err = parse(b"key: \xff\xfe\n").unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[test]
    fn test_malformed_input_message() {
        let err = parse(b"}").unwrap_err();
        assert_eq!(
            err.to_string(),
            "while parsing a block node did not find expected node content, line 1"
        );

        let err = parse(b"a: 1\nb: c: d\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "mapping values are not allowed here, line 2"
        );

        let err = parse(b"a: 1\n  b: 2\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "while parsing a block mapping did not find expected key, line 2"
        );
    }

    #[test]
    fn test_reparse_yields_equal_trees() {
        let input = b"server:\n  hosts:\n    - alpha\n    - beta\n  port: 8080\n";
        assert_eq!(parse(input).unwrap(), parse(input).unwrap());
    }

    #[test]
    fn test_path_access() {
        let value = parse(b"server:\n  hosts:\n    - alpha\n    - beta\n").unwrap();
        assert_eq!(
            value.get_path("server.hosts[1]").and_then(|v| v.as_str()),
            Some("beta")
        );
        assert_eq!(value.get_path("server.missing"), None);
    }

    #[test]
    fn test_quoted_scalars() {
        assert_eq!(
            parse_str(r#""a\nb""#).unwrap(),
            Value::scalar("a\nb")
        );
        assert_eq!(parse_str("'it''s'").unwrap(), Value::scalar("it's"));
    }

    #[test]
    fn test_multiple_documents_last_wins() {
        let value = parse(b"first: 1\n---\nsecond: 2\n").unwrap();
        let mapping = value.as_mapping().expect("expected a mapping");
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.get("second").and_then(|v| v.as_str()), Some("2"));
    }

    #[test]
    fn test_alias_produces_no_value() {
        // `b`'s value is an alias, which produces nothing; the stranded key
        // is dropped with its frame.
        let value = parse(b"a: &x 1\nb: *x\n").unwrap();
        let mapping = value.as_mapping().expect("expected a mapping");
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.get("a").and_then(|v| v.as_str()), Some("1"));
        assert_eq!(mapping.get("b"), None);
    }

    // The acceptance cases of the system this replaces.

    #[test]
    fn test_string() {
        assert_eq!(parse_str("foo").unwrap(), Value::scalar("foo"));
    }

    #[test]
    fn test_dict() {
        assert_eq!(
            parse_str("foo: bar\negg: spam").unwrap(),
            Value::map(vec![
                (Value::scalar("foo"), Value::scalar("bar")),
                (Value::scalar("egg"), Value::scalar("spam")),
            ])
        );
    }

    #[test]
    fn test_list() {
        assert_eq!(
            parse_str("- foo\n- bar").unwrap(),
            Value::seq(vec![Value::scalar("foo"), Value::scalar("bar")])
        );
    }

    #[test]
    fn test_dict_in_list() {
        assert_eq!(
            parse_str("- foo: bar\n- egg").unwrap(),
            Value::seq(vec![
                Value::map(vec![(Value::scalar("foo"), Value::scalar("bar"))]),
                Value::scalar("egg"),
            ])
        );
    }

    #[test]
    fn test_list_in_dict() {
        assert_eq!(
            parse_str("foo:\n - bar\n - egg\nspam: stuff").unwrap(),
            Value::map(vec![
                (
                    Value::scalar("foo"),
                    Value::seq(vec![Value::scalar("bar"), Value::scalar("egg")]),
                ),
                (Value::scalar("spam"), Value::scalar("stuff")),
            ])
        );
    }

    proptest! {
        /// Parsing is deterministic: the same buffer always yields the same
        /// result, valid input or not.
        #[test]
        fn reparse_is_deterministic(input in proptest::collection::vec(any::<u8>(), 0..256)) {
            prop_assert_eq!(parse(&input), parse(&input));
        }
    }
}
