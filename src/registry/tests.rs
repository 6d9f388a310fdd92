use super::*;
use proptest::prelude::*;

fn descriptor(key: &str, priority: i32) -> BackendDescriptor {
    BackendDescriptor::new(key, format!("http://{}.example.com", key), key, priority)
}

#[test]
fn test_descriptor_serialization() {
    let backend = descriptor("cloud", 2);
    let json = serde_json::to_string(&backend).unwrap();
    let parsed: BackendDescriptor = serde_json::from_str(&json).unwrap();
    assert_eq!(parsed, backend);
}

#[test]
fn test_list_enabled_sorted_by_priority() {
    let registry = BackendRegistry::new(vec![
        descriptor("c", 3),
        descriptor("a", 1),
        descriptor("b", 2),
    ])
    .unwrap();

    let keys: Vec<_> = registry.list_enabled().into_iter().map(|b| b.key).collect();
    assert_eq!(keys, vec!["a", "b", "c"]);
}

#[test]
fn test_list_enabled_ties_keep_declaration_order() {
    let registry = BackendRegistry::new(vec![
        descriptor("second", 5),
        descriptor("first", 1),
        descriptor("third", 5),
    ])
    .unwrap();

    let keys: Vec<_> = registry.list_enabled().into_iter().map(|b| b.key).collect();
    assert_eq!(keys, vec!["first", "second", "third"]);
}

#[test]
fn test_list_enabled_excludes_disabled() {
    let registry = BackendRegistry::new(vec![
        descriptor("a", 1).with_enabled(false),
        descriptor("b", 2),
    ])
    .unwrap();

    let enabled = registry.list_enabled();
    assert_eq!(enabled.len(), 1);
    assert_eq!(enabled[0].key, "b");
    assert_eq!(registry.enabled_count(), 1);
    assert_eq!(registry.backend_count(), 2);
}

#[test]
fn test_list_all_keeps_declaration_order() {
    let registry = BackendRegistry::new(vec![descriptor("z", 9), descriptor("y", 1)]).unwrap();
    let keys: Vec<_> = registry.list_all().iter().map(|b| b.key.as_str()).collect();
    assert_eq!(keys, vec!["z", "y"]);
}

#[test]
fn test_empty_registry() {
    let registry = BackendRegistry::new(vec![]).unwrap();
    assert!(registry.list_enabled().is_empty());
}

#[test]
fn test_duplicate_key_rejected() {
    let result = BackendRegistry::new(vec![descriptor("a", 1), descriptor("a", 2)]);
    assert!(matches!(result, Err(RegistryError::DuplicateBackend(ref k)) if k == "a"));
}

#[test]
fn test_empty_key_rejected() {
    let result = BackendRegistry::new(vec![descriptor(" ", 1)]);
    assert!(matches!(result, Err(RegistryError::EmptyKey)));
}

#[test]
fn test_invalid_url_rejected() {
    let result = BackendRegistry::new(vec![BackendDescriptor::new("a", "not a url", "A", 1)]);
    assert!(matches!(result, Err(RegistryError::InvalidUrl { .. })));

    let result = BackendRegistry::new(vec![BackendDescriptor::new(
        "ftp",
        "ftp://files.example.com",
        "FTP",
        1,
    )]);
    assert!(matches!(
        result,
        Err(RegistryError::InvalidUrl { ref message, .. }) if message.contains("scheme")
    ));
}

#[test]
fn test_trailing_slash_stripped() {
    let registry = BackendRegistry::new(vec![BackendDescriptor::new(
        "a",
        "https://api.example.com/v1//",
        "A",
        1,
    )])
    .unwrap();
    assert_eq!(registry.get("a").unwrap().url, "https://api.example.com/v1");
}

#[test]
fn test_blank_display_name_defaults_to_key() {
    let registry =
        BackendRegistry::new(vec![BackendDescriptor::new("a", "http://a.example.com", "", 1)])
            .unwrap();
    assert_eq!(registry.get("a").unwrap().display_name, "a");
}

#[test]
fn test_is_local() {
    let local = [
        "http://localhost:8000",
        "http://LOCALHOST",
        "http://api.localhost:3000",
        "http://127.0.0.1:5000",
        "http://127.1.2.3",
        "http://[::1]:8000",
        "http://0.0.0.0:8000",
    ];
    for url in local {
        assert!(BackendDescriptor::new("k", url, "k", 1).is_local(), "{}", url);
    }

    let remote = [
        "https://api.example.com",
        "http://192.168.1.10:8000",
        "https://localhost.example.com",
    ];
    for url in remote {
        assert!(!BackendDescriptor::new("k", url, "k", 1).is_local(), "{}", url);
    }
}

#[test]
fn test_endpoint_url_joins_paths() {
    let backend = BackendDescriptor::new("k", "http://h:1", "k", 1);
    assert_eq!(backend.endpoint_url("/analyze"), "http://h:1/analyze");
    assert_eq!(backend.endpoint_url("markdown/42"), "http://h:1/markdown/42");
}

proptest! {
    #[test]
    fn prop_list_enabled_is_sorted_filtered_and_stable(
        entries in proptest::collection::vec((-3i32..3, any::<bool>()), 0..12)
    ) {
        let descriptors: Vec<_> = entries
            .iter()
            .enumerate()
            .map(|(i, (priority, enabled))| {
                descriptor(&format!("b{}", i), *priority).with_enabled(*enabled)
            })
            .collect();
        let registry = BackendRegistry::new(descriptors).unwrap();
        let listed = registry.list_enabled();

        prop_assert_eq!(listed.len(), entries.iter().filter(|(_, e)| *e).count());
        prop_assert!(listed.iter().all(|b| b.enabled));

        for pair in listed.windows(2) {
            prop_assert!(pair[0].priority <= pair[1].priority);
            if pair[0].priority == pair[1].priority {
                let i: usize = pair[0].key[1..].parse().unwrap();
                let j: usize = pair[1].key[1..].parse().unwrap();
                prop_assert!(i < j);
            }
        }
    }
}
