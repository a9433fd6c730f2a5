//! Theme variable resolution
//!
//! Design-system themes hand out CSS custom-property references
//! (`var(--surface)`) rather than literal colors. This module resolves such
//! references against a per-mode variable map so theme values can be fed
//! straight into the shade search.

use std::collections::HashMap;

/// Variable name to color string, for one theme mode
pub type ThemeColors = HashMap<String, String>;

/// Mode name (`"light"`, `"dark"`, ...) to its variable map
pub type Theme = HashMap<String, ThemeColors>;

/// Pull the variable name out of a `var(...)` value.
///
/// Returns `None` when the value is not a `var()` reference.
pub fn extract_var_name(css_value: &str) -> Option<&str> {
    let inner = css_value.trim().strip_prefix("var(")?.strip_suffix(')')?;
    let name = inner.trim();
    (!name.is_empty()).then_some(name)
}

/// Resolve a variable name in one mode's color map.
pub fn resolve<'a>(var_name: &str, colors: &'a ThemeColors) -> Option<&'a str> {
    colors.get(var_name).map(String::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_var_name() {
        assert_eq!(extract_var_name("var(--surface)"), Some("--surface"));
        assert_eq!(extract_var_name("  var( --text-primary ) "), Some("--text-primary"));
    }

    #[test]
    fn test_extract_rejects_non_references() {
        assert_eq!(extract_var_name("#ffffff"), None);
        assert_eq!(extract_var_name("red-500"), None);
        assert_eq!(extract_var_name("var(--unclosed"), None);
        assert_eq!(extract_var_name("var()"), None);
        assert_eq!(extract_var_name(""), None);
    }

    #[test]
    fn test_resolve() {
        let mut colors = ThemeColors::new();
        colors.insert("--surface".to_string(), "#1e293b".to_string());

        assert_eq!(resolve("--surface", &colors), Some("#1e293b"));
        assert_eq!(resolve("--missing", &colors), None);
    }
}
