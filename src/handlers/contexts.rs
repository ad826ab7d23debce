use crate::collector::list_contexts;
use colored::*;
use std::path::PathBuf;

/// One line per context; the current one is marked with `*`.
pub fn render_contexts(contexts: &[String], current: Option<&str>) -> String {
    if contexts.is_empty() {
        return "No contexts found in kubeconfig.\n".to_string();
    }

    let mut out = String::new();
    for name in contexts {
        if Some(name.as_str()) == current {
            out.push_str(&format!("* {}\n", name.green().bold()));
        } else {
            out.push_str(&format!("  {}\n", name));
        }
    }
    out
}

pub fn handle_contexts(kubeconfig: Option<PathBuf>) -> crate::Result<()> {
    let (contexts, current) = list_contexts(kubeconfig.as_deref())?;
    print!("{}", render_contexts(&contexts, current.as_deref()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_context_marked() {
        colored::control::set_override(false);
        let contexts = vec!["staging".to_string(), "prod".to_string()];
        assert_eq!(
            render_contexts(&contexts, Some("prod")),
            "  staging\n* prod\n"
        );
    }

    #[test]
    fn test_no_contexts() {
        assert_eq!(
            render_contexts(&[], None),
            "No contexts found in kubeconfig.\n"
        );
    }
}
