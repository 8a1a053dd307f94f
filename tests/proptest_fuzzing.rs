//! Property-Based Testing for bindery
//!
//! Coverage targets:
//! - Path resolution (binding/resolve.rs)
//! - Templates (binding/template.rs)
//! - Trigger path matching (binding/source.rs)

use proptest::prelude::*;

use bindery::binding::{
    BindablePath, BindingData, BindingTemplate, PathResolver, ResourcePath, TriggerPathSource,
};
use bindery::BindingError;

prop_compose! {
    /// Valid container names without hyphens
    fn arb_container()(name in "[a-z0-9]{3,24}") -> String {
        name
    }
}

prop_compose! {
    /// Valid single-segment item names
    fn arb_item()(stem in "[A-Za-z0-9_]{1,20}", ext in "(\\.[a-z]{1,4})?") -> String {
        format!("{}{}", stem, ext)
    }
}

prop_compose! {
    /// Two distinct parameter names
    fn arb_names()(a in "[a-z][a-z0-9_]{0,8}", b in "[a-z][a-z0-9_]{0,8}") -> (String, String) {
        (a, b)
    }
}

// =============================================================================
// Resolution
// =============================================================================

proptest! {
    /// Property: resolve never panics on arbitrary patterns
    #[test]
    fn test_resolve_never_panics(pattern in ".*", container_only in any::<bool>()) {
        let _ = PathResolver::new().resolve_uncached(&pattern, container_only);
    }

    /// Property: literal valid paths are Bound and bind ignores its input
    #[test]
    fn test_literal_is_bound_and_idempotent(
        container in arb_container(),
        item in arb_item(),
        noise in "[a-z]{1,8}",
    ) {
        let pattern = format!("{}/{}", container, item);
        let path = PathResolver::new().resolve_uncached(&pattern, false).unwrap();
        prop_assert!(path.is_bound());
        prop_assert!(path.required_parameter_names().is_empty());

        let expected = ResourcePath::parse(&pattern).unwrap();
        let first = path.bind(&BindingData::new()).unwrap();
        let second = path.bind(&BindingData::new().with(noise.as_str(), "value")).unwrap();
        prop_assert_eq!(&first, &expected);
        prop_assert_eq!(first, second);
    }

    /// Property: required names are exactly the placeholders present
    #[test]
    fn test_required_names_match_placeholders(
        container in arb_container(),
        (a, b) in arb_names(),
    ) {
        prop_assume!(a != b);
        let pattern = format!("{}/{{{}}}-{{{}}}.txt", container, a, b);
        let path = PathResolver::new().resolve_uncached(&pattern, false).unwrap();

        prop_assert!(matches!(path, BindablePath::Parameterized(_)));
        let names: Vec<&str> = path.required_parameter_names().into_iter().collect();
        let mut expected = vec![a.as_str(), b.as_str()];
        expected.sort_unstable();
        prop_assert_eq!(names, expected);
    }

    /// Property: bind is literal substitution; any missing name is reported
    #[test]
    fn test_bind_substitutes_or_reports_missing(
        container in arb_container(),
        (a, b) in arb_names(),
        va in "[a-z0-9]{1,10}",
        vb in "[a-z0-9]{1,10}",
    ) {
        prop_assume!(a != b);
        let pattern = format!("{}/{{{}}}-{{{}}}.txt", container, a, b);
        let path = PathResolver::new().resolve_uncached(&pattern, false).unwrap();

        let values = BindingData::new()
            .with(a.as_str(), va.as_str())
            .with(b.as_str(), vb.as_str());
        let bound = path.bind(&values).unwrap();
        prop_assert_eq!(bound.container_name(), container.as_str());
        let expected_item = format!("{}-{}.txt", va, vb);
        prop_assert_eq!(bound.item_name(), Some(expected_item.as_str()));

        let partial = BindingData::new().with(a.as_str(), va.as_str());
        match path.bind(&partial) {
            Err(BindingError::MissingParameter { parameter, .. }) => prop_assert_eq!(parameter, b),
            other => prop_assert!(false, "expected MissingParameter, got {:?}", other),
        }
    }

    /// Property: uppercase containers fail at resolve when literal, at bind when parameterized
    #[test]
    fn test_uppercase_container_fails_eagerly_or_lazily(name in "[A-Z]{3,12}") {
        let resolver = PathResolver::new();

        let literal = resolver.resolve_uncached(&format!("{}/item", name), false);
        prop_assert!(matches!(literal, Err(BindingError::NamingViolation { .. })), "expected NamingViolation, got {:?}", literal);

        let path = resolver.resolve_uncached("{c}/item", false).unwrap();
        let bound = path.bind(&BindingData::new().with("c", name.as_str()));
        prop_assert!(matches!(bound, Err(BindingError::NamingViolation { .. })), "expected NamingViolation, got {:?}", bound);
    }

    /// Property: short containers are rejected
    #[test]
    fn test_short_container_rejected(name in "[a-z]{1,2}") {
        let result = PathResolver::new().resolve_uncached(&format!("{}/item", name), false);
        prop_assert!(matches!(result, Err(BindingError::NamingViolation { .. })), "expected NamingViolation, got {:?}", result);
    }

    /// Property: storage URLs resolve to the container/item they name
    #[test]
    fn test_storage_url_resolves(
        account in "[a-z0-9]{3,12}",
        container in arb_container(),
        item in arb_item(),
    ) {
        let url = format!("https://{}.blob.core.windows.net/{}/{}", account, container, item);
        let path = PathResolver::new().resolve_uncached(&url, false).unwrap();
        let bound = path.bind(&BindingData::new()).unwrap();
        prop_assert_eq!(bound.container_name(), container.as_str());
        prop_assert_eq!(bound.item_name(), Some(item.as_str()));
    }
}

// =============================================================================
// Templates and trigger matching
// =============================================================================

proptest! {
    /// Property: template parsing never panics
    #[test]
    fn test_template_parse_never_panics(pattern in ".*") {
        let _ = BindingTemplate::parse(&pattern);
    }

    /// Property: doubled braces bind to literal braces
    #[test]
    fn test_escaped_braces(text in "[a-z0-9 ]{0,20}") {
        let template = BindingTemplate::parse(&format!("{{{{{}}}}}", text)).unwrap();
        prop_assert!(!template.has_parameters());
        prop_assert_eq!(template.bind(&BindingData::new()).unwrap(), format!("{{{}}}", text));
    }

    /// Property: matching a bound path recovers the bound value
    #[test]
    fn test_trigger_match_inverts_bind(container in arb_container(), value in "[a-z0-9_-]{1,16}") {
        let source = TriggerPathSource::new(&format!("{}/{{name}}.txt", container)).unwrap();
        let path = ResourcePath::parse(&format!("{}/{}.txt", container, value)).unwrap();

        let matched = source.match_path(&path).unwrap();
        prop_assert_eq!(matched.get("name"), Some(value.as_str()));
    }
}
