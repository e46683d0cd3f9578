use metaobjects_types::name::{
    expand_package, is_qualified, is_relative, qualify, split_qualified, validate_name,
};
use metaobjects_types::{Error, MetaIdentity};
use proptest::prelude::*;

// ── Validation ──────────────────────────────────────────────────

#[test]
fn simple_identifiers_are_valid() {
    assert!(validate_name("field", "goodName").is_ok());
    assert!(validate_name("field", "a1_b2").is_ok());
}

#[test]
fn leading_digit_is_rejected() {
    let err = validate_name("field", "1bad").unwrap_err();
    assert!(matches!(err, Error::InvalidName { .. }));
}

#[test]
fn qualified_names_validate_each_segment() {
    assert!(validate_name("object", "acme::fleet::Car").is_ok());
    assert!(validate_name("object", "acme::9fleet::Car").is_err());
    assert!(validate_name("object", "acme::::Car").is_err());
}

#[test]
fn private_marker_only_allowed_for_attributes() {
    assert!(validate_name("attr", "_isAbstract").is_ok());
    assert!(validate_name("field", "_hidden").is_err());
}

#[test]
fn hyphen_only_allowed_for_loader_and_view() {
    assert!(validate_name("view", "text-area").is_ok());
    assert!(validate_name("loader", "main-loader").is_ok());
    assert!(validate_name("field", "first-name").is_err());
}

#[test]
fn empty_name_is_rejected() {
    assert!(validate_name("object", "").is_err());
}

// ── Qualification ───────────────────────────────────────────────

#[test]
fn qualify_with_empty_package_is_bare() {
    assert_eq!(qualify("", "Car"), "Car");
    assert_eq!(qualify("acme", "Car"), "acme::Car");
}

#[test]
fn identity_exposes_package_and_short_name() {
    let id = MetaIdentity::new("object", "pojo", "acme::fleet::Car");
    assert_eq!(id.package(), "acme::fleet");
    assert_eq!(id.short_name(), "Car");
    assert_eq!(id.to_string(), "object.pojo(acme::fleet::Car)");
}

#[test]
fn private_identity_requires_attr_type() {
    assert!(MetaIdentity::new("attr", "boolean", "_isAbstract").is_private());
    assert!(!MetaIdentity::new("field", "string", "_isAbstract").is_private());
}

// ── Relative packages ───────────────────────────────────────────

#[test]
fn leading_separator_appends_to_base() {
    assert_eq!(expand_package("acme", "::fleet").unwrap(), "acme::fleet");
    assert_eq!(expand_package("", "::fleet").unwrap(), "fleet");
}

#[test]
fn parent_prefix_drops_segments() {
    assert_eq!(expand_package("acme::fleet", "..::Car").unwrap(), "acme::Car");
    assert_eq!(expand_package("acme::fleet", "..::..::Car").unwrap(), "Car");
}

#[test]
fn climbing_past_root_fails() {
    let err = expand_package("acme", "..::..::Car").unwrap_err();
    assert!(matches!(err, Error::InvalidPackage { .. }));
}

#[test]
fn absolute_values_are_unchanged() {
    assert_eq!(expand_package("acme", "other::Car").unwrap(), "other::Car");
    assert!(!is_relative("other::Car"));
    assert!(is_relative("::Car"));
    assert!(is_relative("..::Car"));
}

// ── Properties ──────────────────────────────────────────────────

fn segment_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z][a-zA-Z0-9_]{0,8}").unwrap()
}

mod name_properties {
    use super::*;

    proptest! {
        #[test]
        fn generated_identifiers_validate(segments in prop::collection::vec(segment_strategy(), 1..4)) {
            let name = segments.join("::");
            prop_assert!(validate_name("object", &name).is_ok());
        }

        #[test]
        fn qualify_then_split_round_trips(pkg in prop::collection::vec(segment_strategy(), 0..3), short in segment_strategy()) {
            let package = pkg.join("::");
            let qualified = qualify(&package, &short);
            prop_assert_eq!(split_qualified(&qualified), (package.as_str(), short.as_str()));
            prop_assert_eq!(is_qualified(&qualified), !package.is_empty());
        }

        #[test]
        fn parent_prefix_shortens_base(base in prop::collection::vec(segment_strategy(), 1..4), short in segment_strategy()) {
            let package = base.join("::");
            let expanded = expand_package(&package, &format!("..::{short}")).unwrap();
            let expected = qualify(&base[..base.len() - 1].join("::"), &short);
            prop_assert_eq!(expanded, expected);
        }
    }
}
