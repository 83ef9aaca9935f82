use ratatui::style::Color;
use scrollreel_core::sequence::TextColor;
use tracing::warn;

/// Colours used to paint the page chrome and captions
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: &'static str,

    /// Page background and static sections
    pub bg0: Color,
    pub bg1: Color,
    pub bg2: Color,

    pub fg0: Color,
    pub fg1: Color,
    pub grey0: Color,
    pub grey1: Color,

    /// Divider fill; matches the section that follows a sequence
    pub divider: Color,
    pub accent: Color,
    pub error: Color,
    pub success: Color,

    pub caption_light: Color,
    pub caption_dark: Color,
    pub caption_gold: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::obsidian()
    }
}

impl Theme {
    pub fn obsidian() -> Self {
        Self {
            name: "obsidian",
            bg0: Color::Rgb(0x12, 0x12, 0x14),
            bg1: Color::Rgb(0x1c, 0x1c, 0x20),
            bg2: Color::Rgb(0x2a, 0x2a, 0x30),
            fg0: Color::Rgb(0xe8, 0xe6, 0xe1),
            fg1: Color::Rgb(0xc9, 0xc5, 0xbc),
            grey0: Color::Rgb(0x6b, 0x6b, 0x73),
            grey1: Color::Rgb(0x8e, 0x8e, 0x96),
            divider: Color::Rgb(0x12, 0x12, 0x14),
            accent: Color::Rgb(0xc8, 0xa9, 0x6a),
            error: Color::Rgb(0xe0, 0x6c, 0x75),
            success: Color::Rgb(0x98, 0xc3, 0x79),
            caption_light: Color::Rgb(0xff, 0xff, 0xff),
            caption_dark: Color::Rgb(0x1a, 0x1a, 0x1a),
            caption_gold: Color::Rgb(0xc8, 0xa9, 0x6a),
        }
    }

    pub fn ivory() -> Self {
        Self {
            name: "ivory",
            bg0: Color::Rgb(0xf7, 0xf4, 0xee),
            bg1: Color::Rgb(0xee, 0xea, 0xe1),
            bg2: Color::Rgb(0xdd, 0xd7, 0xcb),
            fg0: Color::Rgb(0x22, 0x22, 0x22),
            fg1: Color::Rgb(0x44, 0x42, 0x3e),
            grey0: Color::Rgb(0x9a, 0x96, 0x8e),
            grey1: Color::Rgb(0x7a, 0x76, 0x6e),
            divider: Color::Rgb(0xf7, 0xf4, 0xee),
            accent: Color::Rgb(0xa0, 0x7e, 0x3c),
            error: Color::Rgb(0xb0, 0x3a, 0x2e),
            success: Color::Rgb(0x4f, 0x7a, 0x28),
            caption_light: Color::Rgb(0xff, 0xff, 0xff),
            caption_dark: Color::Rgb(0x1a, 0x1a, 0x1a),
            caption_gold: Color::Rgb(0xa0, 0x7e, 0x3c),
        }
    }

    pub fn caption(&self, color: TextColor) -> Color {
        match color {
            TextColor::Light => self.caption_light,
            TextColor::Dark => self.caption_dark,
            TextColor::Gold => self.caption_gold,
        }
    }
}

/// Built-in theme by name, falling back to the default
pub fn load_theme(name: &str) -> Theme {
    match name.trim().to_lowercase().as_str() {
        "obsidian" | "dark" => Theme::obsidian(),
        "ivory" | "light" => Theme::ivory(),
        other => {
            warn!(theme = other, "Unknown theme, using obsidian");
            Theme::obsidian()
        }
    }
}

/// RGB components of a colour; non-RGB colours map to mid grey
pub fn rgb(color: Color) -> (u8, u8, u8) {
    match color {
        Color::Rgb(r, g, b) => (r, g, b),
        Color::Black => (0, 0, 0),
        Color::White => (0xff, 0xff, 0xff),
        _ => (0x80, 0x80, 0x80),
    }
}

/// Mix `top` over `bottom`; `alpha` 1 is fully `top`
pub fn blend(top: Color, bottom: Color, alpha: f64) -> Color {
    let alpha = alpha.clamp(0.0, 1.0);
    let (tr, tg, tb) = rgb(top);
    let (br, bg, bb) = rgb(bottom);
    let mix = |t: u8, b: u8| (b as f64 + (t as f64 - b as f64) * alpha).round() as u8;
    Color::Rgb(mix(tr, br), mix(tg, bg), mix(tb, bb))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_theme() {
        assert_eq!(load_theme("ivory").name, "ivory");
        assert_eq!(load_theme(" Obsidian ").name, "obsidian");
        assert_eq!(load_theme("neon").name, "obsidian");
    }

    #[test]
    fn test_blend() {
        let white = Color::Rgb(255, 255, 255);
        let black = Color::Rgb(0, 0, 0);
        assert_eq!(blend(white, black, 1.0), white);
        assert_eq!(blend(white, black, 0.0), black);
        assert_eq!(blend(white, black, 0.5), Color::Rgb(128, 128, 128));
        assert_eq!(blend(white, black, 7.0), white);
    }

    #[test]
    fn test_caption_colours() {
        let theme = Theme::default();
        assert_eq!(theme.caption(TextColor::Gold), theme.caption_gold);
        assert_ne!(theme.caption(TextColor::Light), theme.caption(TextColor::Dark));
    }
}
