//! Color and styling helpers for CLI output.
//!
//! Semantic Color Theme:
//!   - Success/Done:   green   (resolved issues, completed actions)
//!   - Warning/Active: yellow  (in-progress states, major priority)
//!   - Error/Urgent:   red     (critical and show-stopper priority)
//!   - Info/Reference: cyan    (issue ids, project short names)
//!   - Accent:         magenta (tags)
//!   - Muted:          dimmed  (field labels, timestamps)
//!   - Emphasis:       bold    (section headers)

use colored::Colorize;

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Apply semantic "info" color (cyan) to text.
pub fn info(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.cyan().to_string()
}

/// Color a state value. Resolved issues are green whatever the state name.
pub(crate) fn colorize_state(state: &str, resolved: bool, config: &OutputConfig) -> String {
    if !config.use_colors {
        return state.to_string();
    }
    if resolved {
        return state.green().to_string();
    }
    let lower = state.to_ascii_lowercase();
    if lower.contains("progress") || lower.contains("review") {
        state.yellow().to_string()
    } else {
        state.white().to_string()
    }
}

/// Color a priority value by its conventional severity.
pub(crate) fn colorize_priority(priority: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return priority.to_string();
    }
    match priority.to_ascii_lowercase().as_str() {
        "show-stopper" | "critical" => priority.red().bold().to_string(),
        "major" => priority.yellow().to_string(),
        _ => priority.to_string(),
    }
}

/// Colorize an issue id (cyan).
pub(crate) fn colorize_id(id: &str, config: &OutputConfig) -> String {
    info(id, config)
}

/// Colorize tag names (magenta).
pub(crate) fn colorize_tags(tags: &[String], config: &OutputConfig) -> String {
    if tags.is_empty() {
        return String::new();
    }
    let text = tags.join(", ");
    if !config.use_colors {
        return text;
    }
    text.magenta().to_string()
}

/// Resolution icon, with ASCII fallback.
pub(crate) fn resolution_icon(resolved: bool, config: &OutputConfig) -> String {
    let icon = match (resolved, config.use_ascii) {
        (true, true) => "+",
        (false, true) => "o",
        (true, false) => "✓",
        (false, false) => "○",
    };
    if !config.use_colors {
        return icon.to_string();
    }
    if resolved {
        icon.green().to_string()
    } else {
        icon.white().to_string()
    }
}

/// Apply dimmed style to text (for labels/field names).
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Apply bold style to text (for section headers).
pub(crate) fn bold(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.bold().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use colored::control::set_override;
    use rstest::rstest;
    use std::sync::{Mutex, MutexGuard};

    static GLOBAL_STATE_MUTEX: Mutex<()> = Mutex::new(());

    struct ColorGuard<'a> {
        _guard: MutexGuard<'a, ()>,
    }

    impl ColorGuard<'_> {
        fn new() -> Self {
            let guard = GLOBAL_STATE_MUTEX
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            set_override(true);
            Self { _guard: guard }
        }
    }

    impl Drop for ColorGuard<'_> {
        fn drop(&mut self) {
            set_override(false);
        }
    }

    fn with_colors_enabled<F, R>(f: F) -> R
    where
        F: FnOnce() -> R,
    {
        let _guard = ColorGuard::new();
        f()
    }

    #[test]
    fn test_colorize_state_contains_ansi_codes() {
        with_colors_enabled(|| {
            let config = OutputConfig::new(80, false, true);
            let open = colorize_state("Open", false, &config);
            let active = colorize_state("In Progress", false, &config);
            let fixed = colorize_state("Fixed", true, &config);

            assert!(open.contains("Open"));
            assert!(active.contains("In Progress"));
            assert!(fixed.contains("Fixed"));
            assert_ne!(active, open, "in-progress states use a different color");
            assert!(fixed.contains("\x1b["), "Resolved state should have ANSI codes");
        });
    }

    #[rstest]
    #[case("Open", false)]
    #[case("In Progress", false)]
    #[case("Fixed", true)]
    fn test_colorize_state_without_colors(#[case] state: &str, #[case] resolved: bool) {
        let config = OutputConfig::new(80, false, false);
        assert_eq!(colorize_state(state, resolved, &config), state);
    }

    #[test]
    fn test_colorize_priority_contains_ansi_codes() {
        with_colors_enabled(|| {
            let config = OutputConfig::new(80, false, true);
            assert!(colorize_priority("Critical", &config).contains("\x1b["));
            assert!(colorize_priority("Major", &config).contains("\x1b["));
            assert_eq!(colorize_priority("Normal", &config), "Normal");
        });
    }

    #[test]
    fn test_colorize_tags_joins_names() {
        let config = OutputConfig::new(80, false, false);
        let tags = vec!["backend".to_string(), "urgent".to_string()];
        assert_eq!(colorize_tags(&tags, &config), "backend, urgent");
        assert_eq!(colorize_tags(&[], &config), "");
    }

    #[rstest]
    #[case::unicode_open(false, false, "○")]
    #[case::unicode_resolved(true, false, "✓")]
    #[case::ascii_open(false, true, "o")]
    #[case::ascii_resolved(true, true, "+")]
    fn test_resolution_icon(#[case] resolved: bool, #[case] ascii: bool, #[case] expected: &str) {
        let config = OutputConfig::new(80, ascii, false);
        assert_eq!(resolution_icon(resolved, &config), expected);
    }

    #[test]
    fn test_semantic_colors_without_colors() {
        let config = OutputConfig::new(80, false, false);
        assert_eq!(success("ok", &config), "ok");
        assert_eq!(error("bad", &config), "bad");
        assert_eq!(warning("hmm", &config), "hmm");
        assert_eq!(info("DEMO-1", &config), "DEMO-1");
        assert_eq!(dimmed("Label:", &config), "Label:");
        assert_eq!(bold("Header", &config), "Header");
    }
}
