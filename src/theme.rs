use serde::Deserialize;

/// Class token on the document element that marks dark mode.
pub const DARK_CLASS: &str = "dark";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Reads the theme from a `class` attribute value.
    pub fn from_class_list(classes: &str) -> Theme {
        if classes.split_ascii_whitespace().any(|c| c == DARK_CLASS) {
            Theme::Dark
        } else {
            Theme::Light
        }
    }

    pub fn is_dark(&self) -> bool {
        matches!(self, Theme::Dark)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dark_token_must_match_whole_class() {
        assert_eq!(Theme::from_class_list("scroll-smooth dark"), Theme::Dark);
        assert_eq!(Theme::from_class_list("darkroom"), Theme::Light);
        assert_eq!(Theme::from_class_list(""), Theme::Light);
    }
}
