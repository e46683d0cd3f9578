use metaobjects_constraint::{Glob, TargetPattern};
use metaobjects_types::MetaIdentity;
use proptest::prelude::*;

#[test]
fn bare_star_matches_everything() {
    let glob = Glob::any();
    assert!(glob.matches(""));
    assert!(glob.matches("Car"));
    assert!(glob.matches("acme::fleet::Car"));
    assert_eq!(glob.wildcards(), 1);
}

#[test]
fn literal_matches_exactly() {
    let glob = Glob::new("acme::Car");
    assert!(glob.matches("acme::Car"));
    assert!(!glob.matches("acme::Cars"));
    assert!(!glob.matches("Car"));
    assert_eq!(glob.wildcards(), 0);
}

#[test]
fn at_matches_exactly_one_segment() {
    let glob = Glob::new("acme::@");
    assert!(glob.matches("acme::Car"));
    assert!(!glob.matches("acme"));
    assert!(!glob.matches("acme::fleet::Car"));
    assert_eq!(glob.wildcards(), 1);
}

#[test]
fn star_within_segment() {
    let glob = Glob::new("acme::*Car");
    assert!(glob.matches("acme::SportsCar"));
    assert!(glob.matches("acme::Car"));
    assert!(!glob.matches("acme::Truck"));
}

#[test]
fn target_pattern_matches_all_three_parts() {
    let pattern = TargetPattern::new("field", "*", "name");
    assert!(pattern.matches(&MetaIdentity::new("field", "string", "name")));
    assert!(!pattern.matches(&MetaIdentity::new("field", "string", "label")));
    assert!(!pattern.matches(&MetaIdentity::new("attr", "string", "name")));
    assert_eq!(pattern.wildcards(), 1);
    assert_eq!(pattern.to_string(), "field.*(name)");
}

fn segment() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z][a-zA-Z0-9]{0,6}").unwrap()
}

mod glob_properties {
    use super::*;

    proptest! {
        #[test]
        fn literal_glob_matches_itself(parts in prop::collection::vec(segment(), 1..4)) {
            let name = parts.join("::");
            prop_assert!(Glob::new(name.clone()).matches(&name));
        }

        #[test]
        fn at_per_segment_matches_same_depth_only(parts in prop::collection::vec(segment(), 1..4)) {
            let name = parts.join("::");
            let pattern = vec!["@"; parts.len()].join("::");
            let glob = Glob::new(pattern);
            prop_assert!(glob.matches(&name));
            let deeper = format!("{name}::extra");
            prop_assert!(!glob.matches(&deeper));
            prop_assert_eq!(glob.wildcards(), parts.len());
        }

        #[test]
        fn replacing_a_segment_with_wildcard_keeps_match(
            parts in prop::collection::vec(segment(), 2..5),
            idx in 0usize..5,
        ) {
            let idx = idx % parts.len();
            let name = parts.join("::");
            let mut pattern = parts.clone();
            pattern[idx] = "*".to_string();
            let glob = Glob::new(pattern.join("::"));
            prop_assert!(glob.matches(&name));
            prop_assert!(glob.wildcards() > Glob::new(name.clone()).wildcards());
        }
    }
}
