use metaobjects_types::{AttrValue, Error, ValueKind};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

// ── Sniffing ────────────────────────────────────────────────────

#[test]
fn sniff_booleans_case_insensitively() {
    assert_eq!(AttrValue::sniff("true"), AttrValue::Boolean(true));
    assert_eq!(AttrValue::sniff("FALSE"), AttrValue::Boolean(false));
}

#[test]
fn sniff_integers() {
    assert_eq!(AttrValue::sniff("40"), AttrValue::Int(40));
    assert_eq!(AttrValue::sniff("-7"), AttrValue::Int(-7));
}

#[test]
fn sniff_overflowing_integer_as_long() {
    assert_eq!(AttrValue::sniff("3000000000"), AttrValue::Long(3_000_000_000));
}

#[test]
fn sniff_integer_beyond_long_stays_string() {
    let huge = "99999999999999999999999";
    assert_eq!(AttrValue::sniff(huge), AttrValue::String(huge.to_string()));
}

#[test]
fn sniff_decimals() {
    assert_eq!(AttrValue::sniff("3.5"), AttrValue::Double(3.5));
    assert_eq!(AttrValue::sniff(".5"), AttrValue::Double(0.5));
    assert_eq!(AttrValue::sniff("1.5e3"), AttrValue::Double(1500.0));
}

#[test]
fn sniff_malformed_decimal_stays_string() {
    assert_eq!(AttrValue::sniff("1."), AttrValue::String("1.".into()));
    assert_eq!(AttrValue::sniff("1.2.3"), AttrValue::String("1.2.3".into()));
}

#[test]
fn sniff_bracketed_list() {
    assert_eq!(
        AttrValue::sniff("[id, name]"),
        AttrValue::StringArray(vec!["id".into(), "name".into()])
    );
}

#[test]
fn sniff_falls_back_to_string() {
    assert_eq!(AttrValue::sniff("hello"), AttrValue::String("hello".into()));
}

// ── Declared kinds ──────────────────────────────────────────────

#[test]
fn parse_as_declared_kind() {
    assert_eq!(AttrValue::parse_as(ValueKind::Long, "40").unwrap(), AttrValue::Long(40));
    assert_eq!(
        AttrValue::parse_as(ValueKind::String, "40").unwrap(),
        AttrValue::String("40".into())
    );
    assert_eq!(
        AttrValue::parse_as(ValueKind::StringArray, "a,b").unwrap(),
        AttrValue::StringArray(vec!["a".into(), "b".into()])
    );
}

#[test]
fn parse_as_rejects_mismatched_literal() {
    let err = AttrValue::parse_as(ValueKind::Int, "forty").unwrap_err();
    assert!(matches!(err, Error::InvalidLiteral { kind: ValueKind::Int, .. }));
}

#[test]
fn convert_widens_numbers() {
    assert_eq!(AttrValue::Int(4).convert(ValueKind::Long).unwrap(), AttrValue::Long(4));
    assert_eq!(AttrValue::Int(4).convert(ValueKind::Double).unwrap(), AttrValue::Double(4.0));
}

#[test]
fn kind_subtype_mapping() {
    for kind in ValueKind::ALL {
        assert_eq!(ValueKind::from_subtype(kind.subtype()), Some(kind));
        assert_eq!(kind.subtype().parse::<ValueKind>().unwrap(), kind);
    }
    assert!("blob".parse::<ValueKind>().is_err());
}

// ── Properties ──────────────────────────────────────────────────

mod sniff_properties {
    use super::*;

    proptest! {
        #[test]
        fn any_i32_sniffs_as_int(v in any::<i32>()) {
            prop_assert_eq!(AttrValue::sniff(&v.to_string()), AttrValue::Int(v));
        }

        #[test]
        fn wide_i64_sniffs_as_long(v in any::<i64>().prop_filter("outside i32", |v| i32::try_from(*v).is_err())) {
            prop_assert_eq!(AttrValue::sniff(&v.to_string()), AttrValue::Long(v));
        }

        #[test]
        fn words_sniff_as_strings(s in prop::string::string_regex("[g-z][a-z]{0,10}").unwrap().prop_filter("not a boolean", |s| s != "true")) {
            prop_assert_eq!(AttrValue::sniff(&s), AttrValue::String(s.clone()));
        }

        #[test]
        fn display_then_parse_preserves_kind(v in any::<i64>()) {
            let value = AttrValue::Long(v);
            prop_assert_eq!(AttrValue::parse_as(ValueKind::Long, &value.to_string()).unwrap(), value);
        }
    }
}
