//! Backends command implementation

use crate::cli::output::{format_backends_json, format_backends_table, BackendView};
use crate::cli::BackendsListArgs;
use crate::registry::BackendRegistry;

/// Handle backends list command
///
/// Enabled backends are listed in the order Probed resolution tries them;
/// `--all` appends disabled ones in declaration order.
pub fn handle_backends_list(
    args: &BackendsListArgs,
    registry: &BackendRegistry,
) -> Result<String, Box<dyn std::error::Error>> {
    let mut backends = registry.list_enabled();
    if args.all {
        backends.extend(registry.list_all().iter().filter(|b| !b.enabled).cloned());
    }

    let views: Vec<BackendView> = backends.iter().map(BackendView::from).collect();

    if args.json {
        Ok(format_backends_json(&views))
    } else {
        Ok(format_backends_table(&views))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::BackendDescriptor;
    use std::path::PathBuf;

    fn registry() -> BackendRegistry {
        BackendRegistry::new(vec![
            BackendDescriptor::new("cloud", "https://api.example.com", "Cloud", 2),
            BackendDescriptor::new("off", "http://localhost:9000", "Off", 0).with_enabled(false),
            BackendDescriptor::new("local", "http://localhost:8000", "Local", 1),
        ])
        .unwrap()
    }

    fn args(json: bool, all: bool) -> BackendsListArgs {
        BackendsListArgs {
            json,
            all,
            config: PathBuf::from("paperscope.toml"),
        }
    }

    fn keys(output: &str) -> Vec<String> {
        let parsed: serde_json::Value = serde_json::from_str(output).unwrap();
        parsed["backends"]
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["key"].as_str().unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_list_enabled_in_priority_order() {
        let output = handle_backends_list(&args(true, false), &registry()).unwrap();
        assert_eq!(keys(&output), vec!["local", "cloud"]);
    }

    #[test]
    fn test_list_all_appends_disabled() {
        let output = handle_backends_list(&args(true, true), &registry()).unwrap();
        assert_eq!(keys(&output), vec!["local", "cloud", "off"]);
    }

    #[test]
    fn test_list_table() {
        let output = handle_backends_list(&args(false, false), &registry()).unwrap();
        assert!(output.contains("https://api.example.com"));
        assert!(!output.contains("localhost:9000"));
    }
}
