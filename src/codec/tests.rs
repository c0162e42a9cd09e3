use super::*;
use chrono::{TimeZone, Utc};
use serde_json::json;

fn person() -> Required<(Field<StringCodec>, Field<NumberCodec>, Field<BooleanCodec>)> {
    required((
        field("name", string()),
        field("age", number()),
        field("admin", boolean()),
    ))
}

#[test]
fn test_primitive_mismatch_messages() {
    let err = string().decode(&json!(1)).unwrap_err();
    assert_eq!(err.message(), "Expected string but got -> number");

    let err = number().decode(&json!("1")).unwrap_err();
    assert_eq!(err.message(), "Expected number but got -> string");

    let err = boolean().decode(&json!(null)).unwrap_err();
    assert_eq!(err.message(), "Expected boolean but got -> null");

    let err = integer().decode(&json!(1.5)).unwrap_err();
    assert_eq!(err.message(), "Expected integer but got -> number");
}

#[test]
fn test_required_fails_on_first_field_in_declaration_order() {
    // both `age` and `admin` are wrong, only `age` is reported
    let wire = json!({"name": "Ada", "age": "old", "admin": "yes"});
    let err = person().decode(&wire).unwrap_err();
    assert_eq!(
        err.message(),
        "Error decoding field age: Expected number but got -> string"
    );

    let wire = json!({"age": 36});
    let err = person().decode(&wire).unwrap_err();
    assert_eq!(err.message(), "Missing field(s): name");
}

#[test]
fn test_required_ignores_unknown_keys() {
    let wire = json!({"name": "Ada", "age": 36, "admin": false, "extra": [1, 2]});
    let value = person().decode(&wire).unwrap();
    assert_eq!(value, ("Ada".to_string(), 36.0, false));
    assert!(person().is(&wire));
}

#[test]
fn test_required_rejects_non_object() {
    let err = person().decode(&json!([1])).unwrap_err();
    assert_eq!(err.message(), "Expected object but got -> array");
    assert!(!person().is(&json!("x")));
}

#[test]
fn test_optional_omission() {
    let codec = optional((field("nickname", string()), field("score", number())));

    assert_eq!(codec.decode(&json!({})).unwrap(), (None, None));
    assert_eq!(
        codec.decode(&json!({"nickname": null, "score": 3})).unwrap(),
        (None, Some(3.0))
    );

    let encoded = codec.encode(&(None, Some(3.0)));
    assert_eq!(encoded, json!({"score": 3.0}));
    assert!(encoded.as_object().unwrap().get("nickname").is_none());
}

#[test]
fn test_optional_present_but_invalid_fails() {
    let codec = optional((field("nickname", string()),));
    let err = codec.decode(&json!({"nickname": 7})).unwrap_err();
    assert_eq!(
        err.message(),
        "Error decoding field nickname: Expected string but got -> number"
    );
}

#[test]
fn test_intersection_decodes_both_sides() {
    let codec = intersection(
        required((field("email", string()),)),
        optional((field("isAdmin", boolean()),)),
    );
    let value = codec
        .decode(&json!({"email": "a@b.c", "isAdmin": true}))
        .unwrap();
    assert_eq!(value, (("a@b.c".to_string(),), (Some(true),)));

    let err = codec.decode(&json!({"isAdmin": true})).unwrap_err();
    assert_eq!(err.message(), "Missing field(s): email");
}

#[test]
fn test_intersection_encode_right_wins() {
    let codec = intersection(
        required((field("role", string()),)),
        required((field("role", string()),)),
    );
    let encoded = codec.encode(&(("left".to_string(),), ("right".to_string(),)));
    assert_eq!(encoded, json!({"role": "right"}));
}

#[test]
fn test_array_accumulates_element_errors() {
    let codec = array(number());

    let err = codec.decode(&json!([1, "x", 2])).unwrap_err();
    assert_eq!(
        err.message(),
        "Error decoding element(s): [1] Expected number but got -> string"
    );

    let err = codec.decode(&json!([1, "x", true])).unwrap_err();
    assert!(err.message().contains("[1] Expected number but got -> string"));
    assert!(err.message().contains("[2] Expected number but got -> boolean"));

    assert_eq!(codec.decode(&json!([3, 1, 2])).unwrap(), vec![3.0, 1.0, 2.0]);
    assert_eq!(codec.decode(&json!([])).unwrap(), Vec::<f64>::new());
}

#[test]
fn test_array_of_objects_round_trip() {
    let codec = array(required((field("id", integer()),)));
    let value = vec![(1,), (2,)];
    assert_eq!(codec.decode(&codec.encode(&value)).unwrap(), value);
}

#[test]
fn test_date_accepts_rfc3339_and_epoch_millis() {
    let expected = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();

    assert_eq!(date().decode(&json!("2024-01-02T03:04:05Z")).unwrap(), expected);
    assert_eq!(
        date().decode(&json!(expected.timestamp_millis())).unwrap(),
        expected
    );
    assert_eq!(date().encode(&expected), json!("2024-01-02T03:04:05.000Z"));

    assert!(date().decode(&json!("yesterday")).is_err());
    assert!(!date().is(&json!(true)));
}

#[test]
fn test_map_adapts_domain_type() {
    #[derive(Debug, PartialEq)]
    struct Score(f64);

    let codec = number().map(Score, |s| s.0);
    assert_eq!(codec.decode(&json!(9)).unwrap(), Score(9.0));
    assert_eq!(codec.encode(&Score(1.5)), json!(1.5));
}

#[test]
fn test_is_agrees_with_decode() {
    let codec = person();
    let samples = [
        json!({"name": "Ada", "age": 1, "admin": true}),
        json!({"name": "Ada", "age": 1}),
        json!({"name": 1, "age": 1, "admin": true}),
        json!(null),
    ];
    for wire in &samples {
        assert_eq!(codec.is(wire), codec.decode(wire).is_ok(), "{wire}");
    }
}

#[test]
fn test_envelope_serialize_and_decode() {
    let codec = required((field("id", string()),));

    let text = serialize(&codec, &Envelope::Data(("abc".to_string(),)));
    assert_eq!(text, r#"{"data":{"id":"abc"}}"#);
    let wire: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        decode_envelope(&codec, &wire).unwrap(),
        Envelope::Data(("abc".to_string(),))
    );

    let text = serialize(&codec, &Envelope::Error("nope".into()));
    assert_eq!(text, r#"{"error":"nope"}"#);
    let wire: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(
        decode_envelope(&codec, &wire).unwrap(),
        Envelope::Error("nope".into())
    );
}

#[test]
fn test_envelope_rejects_both_keys() {
    let wire = json!({"data": {"id": "a"}, "error": "b"});
    assert!(decode_envelope(&string(), &wire).is_err());
}

#[test]
fn test_deserialize_reports_invalid_json() {
    let err = deserialize(&string(), "{not json").unwrap_err();
    assert!(err.message().starts_with("Invalid JSON"));
    assert_eq!(deserialize(&string(), r#""hi""#).unwrap(), "hi");
}

fn round_trip<C: Codec>(codec: &C, value: &C::Value) -> C::Value {
    codec.decode(&codec.encode(value)).unwrap()
}

#[test]
fn test_object_codecs_are_codecs_with_tuple_values() {
    let person: &dyn Codec<Value = (String, f64, bool)> = &person();
    assert_eq!(
        round_trip(&person, &("Ada".to_string(), 36.0, true)),
        ("Ada".to_string(), 36.0, true)
    );

    let extras = optional((field("nickname", string()),));
    let value: (Option<String>,) = round_trip(&extras, &(None,));
    assert_eq!(value, (None,));

    let both = intersection(required((field("id", string()),)), extras);
    let value: ((String,), (Option<String>,)) =
        round_trip(&both, &(("u1".to_string(),), (Some("ada".to_string()),)));
    assert_eq!(value, (("u1".to_string(),), (Some("ada".to_string()),)));
}
