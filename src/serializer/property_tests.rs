//! Property-Based Tests for Serializers
//!
//! Uses proptest to check that both codecs return what was written.

use proptest::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::serializer::{JsonSerializer, MsgPackSerializer, Serializer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct ComplexClass {
    name: String,
    count: i64,
    tags: Vec<String>,
    attributes: HashMap<String, u32>,
    parent: Option<String>,
}

fn complex_strategy() -> impl Strategy<Value = ComplexClass> {
    (
        "[a-zA-Z0-9 ]{0,32}",
        any::<i64>(),
        prop::collection::vec("[a-z]{1,8}", 0..5),
        prop::collection::hash_map("[a-z]{1,8}", any::<u32>(), 0..5),
        prop::option::of("[a-zA-Z]{1,16}"),
    )
        .prop_map(|(name, count, tags, attributes, parent)| ComplexClass {
            name,
            count,
            tags,
            attributes,
            parent,
        })
}

fn assert_round_trip<S: Serializer>(
    serializer: &S,
    value: &ComplexClass,
) -> Result<(), TestCaseError> {
    let bytes = serializer.serialize(value).unwrap();
    prop_assert!(!serializer.is_nil(&bytes), "Struct must not encode as nil");
    let decoded: ComplexClass = serializer.deserialize(&bytes).unwrap();
    prop_assert_eq!(&decoded, value);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // What goes in through a codec comes back out equal.
    #[test]
    fn prop_json_round_trip(value in complex_strategy()) {
        assert_round_trip(&JsonSerializer, &value)?;
    }

    #[test]
    fn prop_msgpack_round_trip(value in complex_strategy()) {
        assert_round_trip(&MsgPackSerializer, &value)?;
    }

    // Only the null encoding is reported as nil.
    #[test]
    fn prop_strings_are_never_nil(text in ".{0,64}") {
        let json = JsonSerializer.serialize(&text).unwrap();
        let packed = MsgPackSerializer.serialize(&text).unwrap();
        prop_assert!(!JsonSerializer.is_nil(&json));
        prop_assert!(!MsgPackSerializer.is_nil(&packed));
    }
}
