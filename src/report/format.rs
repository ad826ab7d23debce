//! Text rendering for composite cells.

use crate::models::{IngressRule, Labels, PolicyRule, ServicePort, Subject};

/// `key: value` lines, sorted.
pub fn format_labels(labels: &Labels) -> String {
    let mut lines: Vec<String> = labels
        .iter()
        .map(|(k, v)| format!("{}: {}", k, v))
        .collect();
    lines.sort();
    lines.join("\n")
}

/// One block per rule, blocks separated by a `---` line.
pub fn format_rules(rules: &[PolicyRule]) -> String {
    rules
        .iter()
        .map(|rule| {
            let mut block = format!(
                "API Groups: [{}]\nResources: [{}]\nVerbs: [{}]",
                rule.api_groups.join(", "),
                rule.resources.join(", "),
                rule.verbs.join(", ")
            );
            if !rule.resource_names.is_empty() {
                block.push_str(&format!(
                    "\nResource Names: [{}]",
                    rule.resource_names.join(", ")
                ));
            }
            block
        })
        .collect::<Vec<_>>()
        .join("\n---\n")
}

/// `PORT[→TARGET][/PROTOCOL]`, one per line.
pub fn format_ports(ports: &[ServicePort]) -> String {
    ports
        .iter()
        .map(|p| {
            let mut entry = p.port.to_string();
            if p.target_port != 0 {
                entry.push_str(&format!("→{}", p.target_port));
            }
            if !p.protocol.is_empty() {
                entry.push_str(&format!("/{}", p.protocol));
            }
            entry
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `HOST → svc:port/path, ...`, one host per line.
pub fn format_ingress_rules(rules: &[IngressRule]) -> String {
    rules
        .iter()
        .map(|rule| {
            let paths = rule
                .paths
                .iter()
                .map(|p| format!("{}:{}{}", p.service_name, p.service_port, p.path))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{} → {}", rule.host, paths)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// `NAMESPACE/NAME (KIND)`, comma separated.
pub fn format_subjects(subjects: &[Subject]) -> String {
    subjects
        .iter()
        .map(|s| format!("{}/{} ({})", s.namespace, s.name, s.kind))
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn format_capabilities(capabilities: &[String]) -> String {
    capabilities.join(", ")
}

/// Whether an environment variable name looks like it holds a credential.
///
/// Substring match only. Names are hidden from the Pods sheet on a match;
/// this is a display filter, not a control.
pub fn is_sensitive_env_name(name: &str) -> bool {
    let lower = name.to_lowercase();
    ["secret", "password", "key"]
        .iter()
        .any(|needle| lower.contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::IngressPath;
    use proptest::prelude::*;

    #[test]
    fn test_format_labels_sorted() {
        let labels: Labels = [("tier", "web"), ("app", "shop")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(format_labels(&labels), "app: shop\ntier: web");
        assert_eq!(format_labels(&Labels::new()), "");
    }

    #[test]
    fn test_format_rules() {
        let rules = vec![
            PolicyRule {
                api_groups: vec!["".into()],
                resources: vec!["pods".into(), "secrets".into()],
                resource_names: vec![],
                verbs: vec!["get".into()],
            },
            PolicyRule {
                api_groups: vec!["apps".into()],
                resources: vec!["deployments".into()],
                resource_names: vec!["web".into()],
                verbs: vec!["patch".into(), "update".into()],
            },
        ];

        assert_eq!(
            format_rules(&rules),
            "API Groups: []\nResources: [pods, secrets]\nVerbs: [get]\n---\n\
             API Groups: [apps]\nResources: [deployments]\nVerbs: [patch, update]\n\
             Resource Names: [web]"
        );
        assert_eq!(format_rules(&[]), "");
    }

    #[test]
    fn test_format_ports() {
        let ports = vec![
            ServicePort { port: 80, target_port: 8080, protocol: "TCP".into() },
            ServicePort { port: 443, target_port: 0, protocol: "TCP".into() },
            ServicePort { port: 53, target_port: 53, protocol: String::new() },
        ];
        assert_eq!(format_ports(&ports), "80→8080/TCP\n443/TCP\n53→53");
    }

    #[test]
    fn test_format_ingress_rules() {
        let rules = vec![IngressRule {
            host: "shop.example.com".into(),
            paths: vec![
                IngressPath { path: "/".into(), service_name: "web".into(), service_port: 80 },
                IngressPath { path: "/api".into(), service_name: "api".into(), service_port: 8080 },
            ],
        }];
        assert_eq!(
            format_ingress_rules(&rules),
            "shop.example.com → web:80/, api:8080/api"
        );
    }

    #[test]
    fn test_format_subjects() {
        let subjects = vec![
            Subject { kind: "ServiceAccount".into(), name: "builder".into(), namespace: "ci".into() },
            Subject { kind: "Group".into(), name: "ops".into(), namespace: String::new() },
        ];
        assert_eq!(
            format_subjects(&subjects),
            "ci/builder (ServiceAccount), /ops (Group)"
        );
    }

    #[test]
    fn test_format_capabilities() {
        let caps = vec!["+NET_ADMIN".to_string(), "-SETUID".to_string()];
        assert_eq!(format_capabilities(&caps), "+NET_ADMIN, -SETUID");
    }

    #[test]
    fn test_sensitive_env_names() {
        assert!(is_sensitive_env_name("DB_PASSWORD"));
        assert!(is_sensitive_env_name("aws_secret_access_key"));
        assert!(is_sensitive_env_name("API_KEY"));
        assert!(is_sensitive_env_name("MONKEY_MODE"));
        assert!(!is_sensitive_env_name("LOG_LEVEL"));
    }

    proptest! {
        #[test]
        fn prop_label_lines_are_sorted(labels in prop::collection::btree_map("[a-z./-]{1,12}", "[a-z0-9]{0,8}", 0..20)) {
            let rendered = format_labels(&labels);
            let lines: Vec<&str> = if rendered.is_empty() { vec![] } else { rendered.split('\n').collect() };
            prop_assert_eq!(lines.len(), labels.len());
            let mut sorted = lines.clone();
            sorted.sort();
            prop_assert_eq!(lines, sorted);
        }

        #[test]
        fn prop_label_rendering_is_stable(labels in prop::collection::btree_map("[a-z]{1,8}", "[a-z]{0,8}", 0..10)) {
            prop_assert_eq!(format_labels(&labels), format_labels(&labels.clone()));
        }
    }
}
