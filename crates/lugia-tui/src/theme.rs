use ratatui::style::Color;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

/// Colors used across the UI for one theme
#[derive(Debug, Clone, Copy)]
pub struct Palette {
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub user: Color,
    pub assistant: Color,
    pub code: Color,
    pub code_gutter: Color,
    pub bar_bg: Color,
    pub bar_fg: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,
    pub error_bg: Color,
    pub info_bg: Color,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "dark" => Some(Theme::Dark),
            "light" => Some(Theme::Light),
            _ => None,
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    /// Name of the bundled syntect theme for code blocks
    pub fn syntax_theme(&self) -> &'static str {
        match self {
            Theme::Dark => "base16-ocean.dark",
            Theme::Light => "base16-ocean.light",
        }
    }

    pub fn palette(&self) -> Palette {
        match self {
            Theme::Dark => Palette {
                text: Color::White,
                muted: Color::DarkGray,
                accent: Color::Cyan,
                user: Color::Cyan,
                assistant: Color::Yellow,
                code: Color::Rgb(200, 200, 200),
                code_gutter: Color::DarkGray,
                bar_bg: Color::DarkGray,
                bar_fg: Color::White,
                selection_bg: Color::Blue,
                selection_fg: Color::White,
                error_bg: Color::Red,
                info_bg: Color::Blue,
            },
            Theme::Light => Palette {
                text: Color::Black,
                muted: Color::Gray,
                accent: Color::Blue,
                user: Color::Blue,
                assistant: Color::Magenta,
                code: Color::Rgb(60, 60, 60),
                code_gutter: Color::Gray,
                bar_bg: Color::Gray,
                bar_fg: Color::Black,
                selection_bg: Color::LightBlue,
                selection_fg: Color::Black,
                error_bg: Color::LightRed,
                info_bg: Color::LightCyan,
            },
        }
    }
}
