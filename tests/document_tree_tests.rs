//! Tests for flattening and canonicalizing document trees built in code
//!
//! Front-ends other than the JSON parser can hand over trees containing raw
//! text, binary data, or node kinds that have no flattened form.

use json_config::{
    FormatError, JsonConfigError, JsonNode, JsonObject, JsonPrimitive, NodeKind, Position,
    canonicalize_str, flatten, load_document, to_canonical_string,
};

fn object(entries: Vec<(&str, JsonNode)>) -> JsonNode {
    let mut object = JsonObject::new();
    for (key, value) in entries {
        object.insert(key.to_string(), value);
    }
    JsonNode::Object(object)
}

#[test]
fn test_raw_and_bytes_primitives_flatten_to_text() {
    let document = object(vec![
        ("price", JsonNode::Primitive(JsonPrimitive::Raw("12.50".to_string()))),
        ("key", JsonNode::Primitive(JsonPrimitive::Bytes(b"secret".to_vec()))),
    ]);

    let config = flatten(&document).unwrap();
    assert_eq!(config.get_str("price"), Some("12.50"));
    assert_eq!(config.get_str("key"), Some("c2VjcmV0"));
}

#[test]
fn test_comment_node_is_unsupported() {
    let document = object(vec![
        ("a", JsonNode::from(1_i64)),
        (
            "b",
            JsonNode::array([
                JsonNode::from(true),
                JsonNode::Comment {
                    text: "disabled for now".to_string(),
                    position: Some(Position::at(7, 12)),
                },
            ]),
        ),
    ]);

    let err = flatten(&document).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Format error: Unsupported JSON token 'Comment' was found. Path 'b:1', line 7 position 12."
    );
}

#[test]
fn test_constructor_and_undefined_nodes_are_unsupported() {
    let cases = vec![
        (
            JsonNode::Constructor {
                name: "Date".to_string(),
                arguments: vec![JsonNode::from(0_i64)],
                position: None,
            },
            NodeKind::Constructor,
        ),
        (JsonNode::Undefined { position: None }, NodeKind::Undefined),
    ];

    for (node, expected_kind) in cases {
        let document = object(vec![("value", node)]);
        match flatten(&document) {
            Err(JsonConfigError::Format(FormatError::UnsupportedToken { kind, path, .. })) => {
                assert_eq!(kind, expected_kind);
                assert_eq!(path, "value");
            }
            other => panic!("Expected UnsupportedToken error, got: {:?}", other),
        }
    }
}

#[test]
fn test_tree_from_serde_json_value_matches_parsed_text() {
    let text = r#"{"name": "api", "ports": [80, 443], "tls": {"enabled": true, "ca": null}}"#;
    let from_value = JsonNode::from(serde_json::from_str::<serde_json::Value>(text).unwrap());
    let from_text = load_document(text.as_bytes()).unwrap();

    assert_eq!(from_value, from_text);
    assert_eq!(flatten(&from_value).unwrap(), flatten(&from_text).unwrap());
}

#[test]
fn test_canonical_string_keeps_source_order_and_values() {
    let document = load_document(
        br#"{
            "zeta": { "b": 2, "a": 1 },
            "alpha": [ null, true, "text", -7, 0.25 ]
        }"#,
    )
    .unwrap();

    assert_eq!(
        to_canonical_string(&document).unwrap(),
        r#"{"zeta":{"b":2,"a":1},"alpha":[null,true,"text",-7,0.25]}"#
    );
}

#[test]
fn test_canonicalization_is_idempotent() {
    let inputs = vec![
        "{}",
        "[]",
        r#"{"a":{"b":[1,2,{"c":"d"}]},"e":null}"#,
        r#"["\"quoted\"","tab\there","😀",1.0,1e-7,18446744073709551615]"#,
        r#"{"id":123456789012345678901234567890,"hash":98765432109876543210987654321098765432109876543210}"#,
    ];

    for input in inputs {
        let once = canonicalize_str(input).unwrap();
        assert_eq!(once, input, "canonical input should be unchanged");
        assert_eq!(canonicalize_str(&once).unwrap(), once);
    }
}

#[test]
fn test_canonicalization_rejects_malformed_input() {
    assert!(matches!(
        canonicalize_str("{\"a\": }"),
        Err(JsonConfigError::MalformedDocument { .. })
    ));
}
