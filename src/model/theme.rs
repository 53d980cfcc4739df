use std::fmt;

use serde::{Deserialize, Serialize};

/// Color theme persisted under the `theme` key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    Vibe,
}

impl Theme {
    /// Cycle: light → dark → vibe → light
    pub fn next(self) -> Theme {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Vibe,
            Theme::Vibe => Theme::Light,
        }
    }

    /// First-run default derived from the dark-mode preference
    pub fn default_for(prefers_dark: bool) -> Theme {
        if prefers_dark { Theme::Dark } else { Theme::Light }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Vibe => "vibe",
        }
    }

    pub fn parse_theme(s: &str) -> Option<Theme> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            "vibe" => Some(Theme::Vibe),
            _ => None,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read the terminal's dark-background hint from `COLORFGBG` ("fg;bg").
/// Background colors 0-6 and 8 are the dark ANSI colors.
pub fn detect_prefers_dark() -> bool {
    std::env::var("COLORFGBG")
        .ok()
        .as_deref()
        .and_then(parse_colorfgbg)
        .unwrap_or(false)
}

fn parse_colorfgbg(value: &str) -> Option<bool> {
    let bg: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    Some(matches!(bg, 0..=6 | 8))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_returns_to_start_after_three_steps() {
        assert_eq!(Theme::Light.next(), Theme::Dark);
        assert_eq!(Theme::Dark.next(), Theme::Vibe);
        assert_eq!(Theme::Vibe.next(), Theme::Light);
        assert_eq!(Theme::Light.next().next().next(), Theme::Light);
    }

    #[test]
    fn test_default_follows_dark_preference() {
        assert_eq!(Theme::default_for(true), Theme::Dark);
        assert_eq!(Theme::default_for(false), Theme::Light);
    }

    #[test]
    fn test_serializes_as_lowercase_json_string() {
        assert_eq!(serde_json::to_string(&Theme::Vibe).unwrap(), "\"vibe\"");
        let theme: Theme = serde_json::from_str("\"dark\"").unwrap();
        assert_eq!(theme, Theme::Dark);
        assert!(serde_json::from_str::<Theme>("\"sepia\"").is_err());
    }

    #[test]
    fn test_colorfgbg_background_decides_darkness() {
        assert_eq!(parse_colorfgbg("15;0"), Some(true));
        assert_eq!(parse_colorfgbg("0;15"), Some(false));
        assert_eq!(parse_colorfgbg("15;default;8"), Some(true));
        assert_eq!(parse_colorfgbg("garbage"), None);
    }
}
