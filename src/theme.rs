use ratatui::style::Color;

/// Light/dark palette for the whole UI. The preference is persisted via
/// the config module and read once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "light" => Some(Theme::Light),
            "dark" => Some(Theme::Dark),
            _ => None,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    /// Primary text.
    pub fn fg(&self) -> Color {
        match self {
            Theme::Light => Color::Black,
            Theme::Dark => Color::White,
        }
    }

    /// Secondary text: captions, hints, placeholders.
    pub fn dim(&self) -> Color {
        match self {
            Theme::Light => Color::Gray,
            Theme::Dark => Color::DarkGray,
        }
    }

    /// Brand accent used for calls to action and focus.
    pub fn accent(&self) -> Color {
        Color::Rgb(255, 83, 8)
    }

    /// Border of the focused pane or field.
    pub fn focus_border(&self) -> Color {
        Color::Cyan
    }

    /// Border of unfocused panes.
    pub fn border(&self) -> Color {
        self.dim()
    }
}
