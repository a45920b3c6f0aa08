//! TTY detection, colour and hyperlink support logic

use std::io::IsTerminal;

/// Determine if colours should be used based on environment and TTY status
pub fn supports_colour() -> bool {
    colour_from_env(|name| std::env::var(name).ok(), std::io::stdout().is_terminal())
}

/// Determine if the terminal understands OSC 8 hyperlinks
pub fn supports_hyperlinks() -> bool {
    hyperlinks_from_env(|name| std::env::var(name).ok(), std::io::stdout().is_terminal())
}

/// Colour decision given a way to read the environment and whether stdout
/// is a terminal.
pub fn colour_from_env<F>(var: F, is_tty: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    // Priority order:
    // 1. NO_COLOR takes precedence (https://no-color.org/)
    if var("NO_COLOR").is_some() {
        return false;
    }

    // 2. CLICOLOR_FORCE or FORCE_COLOR enables colours even when piped
    for name in ["CLICOLOR_FORCE", "FORCE_COLOR"] {
        if let Some(val) = var(name) {
            if val != "0" && val != "false" {
                return true;
            }
        }
    }

    // 3. CLICOLOR=0 disables colours
    if var("CLICOLOR").as_deref() == Some("0") {
        return false;
    }

    // 4. Otherwise only on a TTY
    is_tty
}

/// Hyperlink decision given a way to read the environment and whether
/// stdout is a terminal.
pub fn hyperlinks_from_env<F>(var: F, is_tty: bool) -> bool
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(val) = var("FORCE_HYPERLINK") {
        return val != "0" && val != "false";
    }
    if !is_tty {
        return false;
    }

    if let Some(program) = var("TERM_PROGRAM") {
        if matches!(program.as_str(), "iTerm.app" | "WezTerm" | "vscode") {
            return true;
        }
    }
    // VTE based terminals gained support in 0.50.
    if let Some(version) = var("VTE_VERSION") {
        if version.parse::<u32>().is_ok_and(|v| v >= 5000) {
            return true;
        }
    }
    ["WT_SESSION", "KONSOLE_VERSION", "DOMTERM"]
        .into_iter()
        .any(|name| var(name).is_some())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<String> + 'a {
        move |name| {
            pairs
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_no_color_disables() {
        assert!(!colour_from_env(env(&[("NO_COLOR", "1")]), true));
    }

    #[test]
    fn test_clicolor_force_enables() {
        assert!(colour_from_env(env(&[("CLICOLOR_FORCE", "1")]), false));
        assert!(colour_from_env(env(&[("FORCE_COLOR", "3")]), false));
        assert!(!colour_from_env(env(&[("FORCE_COLOR", "0")]), false));
    }

    #[test]
    fn test_no_color_overrides_force() {
        assert!(!colour_from_env(
            env(&[("NO_COLOR", "1"), ("CLICOLOR_FORCE", "1")]),
            true
        ));
    }

    #[test]
    fn test_clicolor_zero_disables() {
        assert!(!colour_from_env(env(&[("CLICOLOR", "0")]), true));
    }

    #[test]
    fn test_tty_decides_by_default() {
        assert!(colour_from_env(env(&[]), true));
        assert!(!colour_from_env(env(&[]), false));
    }

    #[test]
    fn test_hyperlinks_need_tty() {
        assert!(!hyperlinks_from_env(env(&[("TERM_PROGRAM", "WezTerm")]), false));
        assert!(hyperlinks_from_env(env(&[("TERM_PROGRAM", "WezTerm")]), true));
        assert!(!hyperlinks_from_env(env(&[("TERM_PROGRAM", "Apple_Terminal")]), true));
    }

    #[test]
    fn test_hyperlinks_forced() {
        assert!(hyperlinks_from_env(env(&[("FORCE_HYPERLINK", "1")]), false));
        assert!(!hyperlinks_from_env(
            env(&[("FORCE_HYPERLINK", "0"), ("WT_SESSION", "x")]),
            true
        ));
    }

    #[test]
    fn test_hyperlinks_vte_version() {
        assert!(hyperlinks_from_env(env(&[("VTE_VERSION", "6003")]), true));
        assert!(!hyperlinks_from_env(env(&[("VTE_VERSION", "4601")]), true));
        assert!(hyperlinks_from_env(env(&[("KONSOLE_VERSION", "220401")]), true));
    }
}
