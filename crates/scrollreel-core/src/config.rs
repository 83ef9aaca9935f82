use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::sequence::{CurveVariant, FrameLayout, TextColor};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
    #[serde(default)]
    pub overlay: OverlayConfig,
    #[serde(default)]
    pub ui: UiConfig,
    #[serde(default)]
    pub keymap: KeymapConfig,
    #[serde(default)]
    pub page: PageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Root directory containing `sequence/<name>/` frame folders
    #[serde(default = "default_assets_dir")]
    pub assets_dir: PathBuf,
    /// Data directory path (frame cache, log file)
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Refuse to start when a sequence's frame count does not match its files
    #[serde(default)]
    pub strict_assets: bool,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            assets_dir: default_assets_dir(),
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            strict_assets: false,
        }
    }
}

/// Where frame files are fetched from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    #[default]
    Filesystem,
    Http,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoaderConfig {
    /// Frame source: "filesystem" or "http"
    #[serde(default)]
    pub source: SourceKind,
    /// Base URL for the http source (frames live under `images/sequence/`)
    #[serde(default)]
    pub base_url: Option<String>,
    /// Frames fetched first, ahead of everything else
    #[serde(default = "default_priority_batch")]
    pub priority_batch: usize,
    /// Frames in flight per follow-up batch
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Lazy sections start loading within this fraction of a viewport height
    #[serde(default = "default_lazy_margin")]
    pub lazy_margin: f64,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub request_timeout_secs: u64,
    /// Keep downloaded frames in the data directory
    #[serde(default = "default_true")]
    pub disk_cache: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            source: SourceKind::default(),
            base_url: None,
            priority_batch: default_priority_batch(),
            batch_size: default_batch_size(),
            lazy_margin: default_lazy_margin(),
            request_timeout_secs: default_timeout(),
            disk_cache: default_true(),
        }
    }
}

/// Caption fade choreography, in units of sequence progress
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayConfig {
    #[serde(default = "default_fade_in")]
    pub fade_in: [f64; 2],
    #[serde(default = "default_fade_out")]
    pub fade_out: [f64; 2],
    /// Caption travel distance in surface pixels
    #[serde(default = "default_rise")]
    pub rise: f64,
    #[serde(default = "default_overlay_easing")]
    pub easing: EasingType,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            fade_in: default_fade_in(),
            fade_out: default_fade_out(),
            rise: default_rise(),
            easing: default_overlay_easing(),
        }
    }
}

/// Easing curve applied to animated values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EasingType {
    None,
    Linear,
    #[default]
    Cubic,
    Quintic,
    EaseOut,
}

/// Smooth page scrolling
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrollConfig {
    #[serde(default = "default_true")]
    pub smooth_enabled: bool,
    #[serde(default = "default_animation_duration")]
    pub animation_duration_ms: u64,
    #[serde(default)]
    pub easing: EasingType,
    /// Rows moved per scroll step when smooth scrolling is off
    #[serde(default = "default_scroll_lines")]
    pub scroll_lines: u16,
    #[serde(default = "default_animation_fps")]
    pub animation_fps: u32,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            smooth_enabled: default_true(),
            animation_duration_ms: default_animation_duration(),
            easing: EasingType::default(),
            scroll_lines: default_scroll_lines(),
            animation_fps: default_animation_fps(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Tick rate in milliseconds
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
    #[serde(default)]
    pub scroll: ScrollConfig,
    /// Theme name ("obsidian" or "ivory")
    #[serde(default = "default_theme_name")]
    pub theme: String,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_rate_ms: default_tick_rate(),
            scroll: ScrollConfig::default(),
            theme: default_theme_name(),
        }
    }
}

/// Keymap configuration using Vim-style notation
/// Format: "j", "k", "<C-d>" (Ctrl+d), "G" (Shift+g), "<Tab>", "<Space>"
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeymapConfig {
    #[serde(default = "default_key_quit")]
    pub quit: String,
    #[serde(default = "default_key_scroll_down")]
    pub scroll_down: String,
    #[serde(default = "default_key_scroll_up")]
    pub scroll_up: String,
    #[serde(default = "default_key_scroll_half_down")]
    pub scroll_half_down: String,
    #[serde(default = "default_key_scroll_half_up")]
    pub scroll_half_up: String,
    #[serde(default = "default_key_scroll_page_down")]
    pub scroll_page_down: String,
    #[serde(default = "default_key_scroll_page_up")]
    pub scroll_page_up: String,
    #[serde(default = "default_key_jump_to_top")]
    pub jump_to_top: String,
    #[serde(default = "default_key_jump_to_bottom")]
    pub jump_to_bottom: String,
    /// Jump to the start of the next section
    #[serde(default = "default_key_next_section")]
    pub next_section: String,
    /// Jump to the start of the previous section
    #[serde(default = "default_key_prev_section")]
    pub prev_section: String,
}

impl Default for KeymapConfig {
    fn default() -> Self {
        Self {
            quit: default_key_quit(),
            scroll_down: default_key_scroll_down(),
            scroll_up: default_key_scroll_up(),
            scroll_half_down: default_key_scroll_half_down(),
            scroll_half_up: default_key_scroll_half_up(),
            scroll_page_down: default_key_scroll_page_down(),
            scroll_page_up: default_key_scroll_page_up(),
            jump_to_top: default_key_jump_to_top(),
            jump_to_bottom: default_key_jump_to_bottom(),
            next_section: default_key_next_section(),
            prev_section: default_key_prev_section(),
        }
    }
}

fn default_key_quit() -> String { "q".to_string() }
fn default_key_scroll_down() -> String { "j".to_string() }
fn default_key_scroll_up() -> String { "k".to_string() }
fn default_key_scroll_half_down() -> String { "<C-d>".to_string() }
fn default_key_scroll_half_up() -> String { "<C-u>".to_string() }
fn default_key_scroll_page_down() -> String { "<C-f>".to_string() }
fn default_key_scroll_page_up() -> String { "<C-b>".to_string() }
fn default_key_jump_to_top() -> String { "gg".to_string() }
fn default_key_jump_to_bottom() -> String { "G".to_string() }
fn default_key_next_section() -> String { "<Tab>".to_string() }
fn default_key_prev_section() -> String { "<S-Tab>".to_string() }

/// Sections of the long-scroll page, top to bottom
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    #[serde(default = "default_sections")]
    pub sections: Vec<SectionConfig>,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            sections: default_sections(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SectionConfig {
    Sequence(SequenceSectionConfig),
    Static(StaticSectionConfig),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SequenceSectionConfig {
    /// Asset directory key under `sequence/`
    pub name: String,
    #[serde(default = "default_frame_count")]
    pub frame_count: u32,
    /// Scroll distance, in viewport heights, over which the sequence plays
    #[serde(default = "default_pin_distance")]
    pub pin_distance: f64,
    #[serde(default = "default_true")]
    pub lazy: bool,
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_subtitle")]
    pub subtitle: String,
    #[serde(default)]
    pub text_color: TextColor,
    #[serde(default)]
    pub curve: CurveVariant,
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_pad")]
    pub pad: usize,
    #[serde(default = "default_ext")]
    pub ext: String,
}

impl SequenceSectionConfig {
    pub fn layout(&self) -> FrameLayout {
        FrameLayout {
            prefix: self.prefix.clone(),
            pad: self.pad,
            ext: self.ext.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaticSectionConfig {
    pub label: String,
    /// Height in viewport heights
    #[serde(default = "default_static_height")]
    pub height: f64,
}

fn default_sections() -> Vec<SectionConfig> {
    vec![
        SectionConfig::Static(StaticSectionConfig {
            label: "Hero".to_string(),
            height: 1.0,
        }),
        SectionConfig::Sequence(SequenceSectionConfig {
            name: "scroll-sequence".to_string(),
            frame_count: default_frame_count(),
            pin_distance: default_pin_distance(),
            lazy: true,
            title: default_title(),
            subtitle: default_subtitle(),
            text_color: TextColor::Light,
            curve: CurveVariant::Asymmetric,
            prefix: default_prefix(),
            pad: default_pad(),
            ext: default_ext(),
        }),
        SectionConfig::Static(StaticSectionConfig {
            label: "Featured Properties".to_string(),
            height: default_static_height(),
        }),
    ]
}

fn default_assets_dir() -> PathBuf {
    PathBuf::from("public/images")
}

fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("scrollreel")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_priority_batch() -> usize {
    1
}

fn default_batch_size() -> usize {
    12
}

fn default_lazy_margin() -> f64 {
    0.5 // begin when within half a viewport height
}

fn default_timeout() -> u64 {
    30
}

fn default_fade_in() -> [f64; 2] {
    [0.0, 0.2]
}

fn default_fade_out() -> [f64; 2] {
    [0.75, 1.0]
}

fn default_rise() -> f64 {
    50.0
}

fn default_overlay_easing() -> EasingType {
    EasingType::Linear
}

fn default_animation_duration() -> u64 {
    150
}

fn default_scroll_lines() -> u16 {
    1
}

fn default_animation_fps() -> u32 {
    60
}

fn default_tick_rate() -> u64 {
    100
}

fn default_theme_name() -> String {
    "obsidian".to_string()
}

fn default_frame_count() -> u32 {
    120
}

fn default_pin_distance() -> f64 {
    1.5
}

fn default_title() -> String {
    "Cinematic Living".to_string()
}

fn default_subtitle() -> String {
    "Experience every moment in perfect detail.".to_string()
}

fn default_prefix() -> String {
    "frame_".to_string()
}

fn default_pad() -> usize {
    4
}

fn default_ext() -> String {
    "webp".to_string()
}

fn default_static_height() -> f64 {
    1.0
}

/// Expand tilde (~) in path to user's home directory
fn expand_tilde(path: &Path) -> PathBuf {
    if let Some(path_str) = path.to_str() {
        if let Some(stripped) = path_str.strip_prefix("~/") {
            if let Some(home) = dirs::home_dir() {
                return home.join(stripped);
            }
        } else if path_str == "~" {
            if let Some(home) = dirs::home_dir() {
                return home;
            }
        }
    }
    path.to_path_buf()
}

impl AppConfig {
    /// Load configuration from the default location or return defaults
    pub fn load() -> crate::Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Load configuration from a specific file, or defaults if it does not exist
    pub fn load_from(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Self::from_toml(&content)
        } else {
            Ok(Self::default())
        }
    }

    pub fn from_toml(content: &str) -> crate::Result<Self> {
        toml::from_str(content).map_err(|e| crate::Error::Config(e.to_string()))
    }

    /// Save configuration to file
    pub fn save(&self) -> crate::Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| crate::Error::Config(e.to_string()))?;
        std::fs::write(&config_path, content)?;

        Ok(())
    }

    /// Get the configuration file path
    /// Always uses ~/.config/scrollreel/config.toml on all platforms
    pub fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("scrollreel")
            .join("config.toml")
    }

    /// Get the data directory (with tilde expansion)
    pub fn data_dir(&self) -> PathBuf {
        expand_tilde(&self.general.data_dir)
    }

    /// Get the assets directory (with tilde expansion)
    pub fn assets_dir(&self) -> PathBuf {
        expand_tilde(&self.general.assets_dir)
    }

    /// Directory for cached frame downloads
    pub fn frame_cache_dir(&self) -> PathBuf {
        self.data_dir().join("frame_cache")
    }

    /// Log file used while the terminal UI owns stdout
    pub fn log_path(&self) -> PathBuf {
        self.data_dir().join("scrollreel.log")
    }

    /// Sequence sections in page order
    pub fn sequences(&self) -> impl Iterator<Item = &SequenceSectionConfig> {
        self.page.sections.iter().filter_map(|s| match s {
            SectionConfig::Sequence(seq) => Some(seq),
            SectionConfig::Static(_) => None,
        })
    }

    /// Validate cross-field constraints the deserializer cannot express
    pub fn validate(&self) -> crate::Result<()> {
        if self.loader.batch_size == 0 {
            return Err(crate::Error::Config("loader.batch_size must be at least 1".into()));
        }
        if !(self.loader.lazy_margin.is_finite() && self.loader.lazy_margin >= 0.0) {
            return Err(crate::Error::Config("loader.lazy_margin must be >= 0".into()));
        }
        for range in [self.overlay.fade_in, self.overlay.fade_out] {
            let [start, end] = range;
            if !(0.0..=1.0).contains(&start) || !(0.0..=1.0).contains(&end) || start > end {
                return Err(crate::Error::Config(format!(
                    "overlay range [{}, {}] must satisfy 0 <= start <= end <= 1",
                    start, end
                )));
            }
        }
        if self.loader.source == SourceKind::Http && self.loader.base_url.is_none() {
            return Err(crate::Error::Config(
                "loader.base_url is required when loader.source = \"http\"".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.loader.priority_batch, 1);
        assert_eq!(config.loader.batch_size, 12);
        assert!((config.loader.lazy_margin - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.sequences().count(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml() {
        let toml = r#"
            [loader]
            batch_size = 4

            [[page.sections]]
            kind = "sequence"
            name = "Dubai_Hyper_Zoom_To_Home"
            frame_count = 20
            curve = "stepped_top"
            text_color = "gold"

            [[page.sections]]
            kind = "static"
            label = "FAQ"
            height = 2.0
        "#;
        let config = AppConfig::from_toml(toml).unwrap();
        assert_eq!(config.loader.batch_size, 4);
        assert_eq!(config.loader.priority_batch, 1);
        assert_eq!(config.page.sections.len(), 2);

        let seq = config.sequences().next().unwrap();
        assert_eq!(seq.frame_count, 20);
        assert_eq!(seq.curve, CurveVariant::SteppedTop);
        assert_eq!(seq.text_color, TextColor::Gold);
        assert_eq!(seq.layout().file_name(0), "frame_0001.webp");
        assert!(seq.lazy);
    }

    #[test]
    fn test_unknown_curve_rejected() {
        let toml = r#"
            [[page.sections]]
            kind = "sequence"
            name = "x"
            curve = "wavy"
        "#;
        assert!(matches!(AppConfig::from_toml(toml), Err(crate::Error::Config(_))));
    }

    #[test]
    fn test_validate_overlay_range() {
        let mut config = AppConfig::default();
        config.overlay.fade_out = [0.9, 0.5];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_http_requires_base_url() {
        let mut config = AppConfig::default();
        config.loader.source = SourceKind::Http;
        assert!(config.validate().is_err());
        config.loader.base_url = Some("https://example.com".to_string());
        assert!(config.validate().is_ok());
    }
}
