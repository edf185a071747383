//! Host configuration merging
//!
//! Later sources take precedence:
//! 1. /etc/cloud/cloud.cfg (base)
//! 2. /etc/cloud/cloud.cfg.d/*.cfg (sorted alphabetically)

use serde_yaml::Value;
use tracing::debug;

/// Merge two YAML values recursively
///
/// Mappings merge key by key. Scalars and lists from `overlay` replace the
/// base value; a null overlay keeps it.
pub fn merge_yaml_values(base: &Value, overlay: &Value) -> Value {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            let mut result = base_map.clone();

            for (key, overlay_value) in overlay_map {
                let merged = match result.get(key) {
                    Some(base_value) => merge_yaml_values(base_value, overlay_value),
                    None => overlay_value.clone(),
                };
                result.insert(key.clone(), merged);
            }

            Value::Mapping(result)
        }

        (base_value, Value::Null) => base_value.clone(),

        (_, overlay_value) => overlay_value.clone(),
    }
}

/// Merge multiple YAML documents in order (later documents have higher priority)
pub fn merge_all(values: &[Value]) -> Value {
    values.iter().fold(Value::Null, |acc, value| {
        debug!("Merging host config document");
        merge_yaml_values(&acc, value)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn test_nested_override_keeps_siblings() {
        let base = yaml("datasource:\n  Vultr:\n    retries: 10\n    timeout: 1\n");
        let overlay = yaml("datasource:\n  Vultr:\n    retries: 2\n");

        let merged = merge_yaml_values(&base, &overlay);
        assert_eq!(merged["datasource"]["Vultr"]["retries"], Value::from(2));
        assert_eq!(merged["datasource"]["Vultr"]["timeout"], Value::from(1));
    }

    #[test]
    fn test_lists_replaced_by_default() {
        let base = yaml("dns_servers: [10.61.10.10]");
        let overlay = yaml("dns_servers: [1.1.1.1, 8.8.8.8]");

        let merged = merge_all(&[base, overlay]);
        let seq = merged["dns_servers"].as_sequence().unwrap();
        assert_eq!(seq.len(), 2);
        assert_eq!(seq[0], Value::from("1.1.1.1"));
    }

    #[test]
    fn test_scalar_replaced_by_list() {
        let base = yaml("dns_servers: 10.61.10.10");
        let overlay = yaml("dns_servers: [1.1.1.1]");

        let merged = merge_yaml_values(&base, &overlay);
        assert_eq!(merged["dns_servers"].as_sequence().map(Vec::len), Some(1));
    }

    #[test]
    fn test_null_overlay_keeps_base() {
        let base = yaml("retries: 4");
        let merged = merge_yaml_values(&base, &Value::Null);
        assert_eq!(merged, base);
    }

    #[test]
    fn test_merge_all_empty() {
        assert_eq!(merge_all(&[]), Value::Null);
    }
}
