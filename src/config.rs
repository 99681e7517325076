use anyhow::{Context, Result};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};

use crate::time_utils;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub screen: ScreenConfig,
    #[serde(default = "default_zones")]
    pub zone: Vec<ZoneEntry>,
    #[serde(default = "default_fonts")]
    pub fonts: Vec<FontPairEntry>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct DeviceConfig {
    /// Offset the device clock runs in. `None` means "whatever the host says".
    #[serde(default, deserialize_with = "deserialize_opt_offset")]
    pub utc_offset: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScreenConfig {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ZoneEntry {
    pub name: String,
    #[serde(deserialize_with = "deserialize_offset")]
    pub offset: i32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FontSpec {
    pub font: String,
    pub size: f32,
}

/// Font pair used once at least `min_zones` zones are configured.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FontPairEntry {
    #[serde(default)]
    pub min_zones: usize,
    pub thin: FontSpec,
    pub thick: FontSpec,
}

// Defaults

fn default_width() -> u32 { 144 }
fn default_height() -> u32 { 168 }

fn default_zones() -> Vec<ZoneEntry> {
    vec![
        ZoneEntry { name: "Sao Paulo".into(), offset: -3 * 60 },
        ZoneEntry { name: "Tokyo".into(), offset: 9 * 60 },
        ZoneEntry { name: "Eindhoven".into(), offset: 60 },
    ]
}

fn default_fonts() -> Vec<FontPairEntry> {
    vec![
        FontPairEntry {
            min_zones: 0,
            thin: FontSpec { font: "DejaVuSans".into(), size: 16.0 },
            thick: FontSpec { font: "DejaVuSans-Bold".into(), size: 30.0 },
        },
        FontPairEntry {
            min_zones: 4,
            thin: FontSpec { font: "DejaVuSans".into(), size: 12.0 },
            thick: FontSpec { font: "DejaVuSans-Bold".into(), size: 20.0 },
        },
    ]
}

#[derive(Deserialize)]
#[serde(untagged)]
enum OffsetRepr {
    Minutes(i32),
    Text(String),
}

impl OffsetRepr {
    fn minutes(self) -> Result<i32> {
        match self {
            OffsetRepr::Minutes(m) => Ok(m),
            OffsetRepr::Text(s) => time_utils::parse_offset(&s),
        }
    }
}

fn deserialize_offset<'de, D: Deserializer<'de>>(d: D) -> Result<i32, D::Error> {
    OffsetRepr::deserialize(d)?.minutes().map_err(serde::de::Error::custom)
}

fn deserialize_opt_offset<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i32>, D::Error> {
    let repr = Option::<OffsetRepr>::deserialize(d)?;
    match repr {
        // "auto" defers to the host clock.
        Some(OffsetRepr::Text(s)) if s.eq_ignore_ascii_case("auto") => Ok(None),
        Some(r) => r.minutes().map(Some).map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

// Implementations

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            device: DeviceConfig::default(),
            screen: ScreenConfig::default(),
            zone: default_zones(),
            fonts: default_fonts(),
        }
    }
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self { width: default_width(), height: default_height() }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        anyhow::ensure!(self.screen.width > 0 && self.screen.height > 0, "Screen size must be non-zero");
        anyhow::ensure!(
            self.zone.len() <= self.screen.height as usize,
            "{} zones do not fit on a screen {} pixels high",
            self.zone.len(),
            self.screen.height
        );
        anyhow::ensure!(!self.fonts.is_empty(), "At least one [[fonts]] entry is required");
        for entry in &self.fonts {
            for spec in [&entry.thin, &entry.thick] {
                anyhow::ensure!(spec.size > 0.0, "Font size for {:?} must be positive", spec.font);
            }
        }
        Ok(())
    }

    /// Font pair for `zones` configured zones: the entry with the largest
    /// `min_zones` not above `zones`, else the one with the smallest.
    pub fn font_pair_for(&self, zones: usize) -> Option<&FontPairEntry> {
        self.fonts
            .iter()
            .filter(|e| e.min_zones <= zones)
            .max_by_key(|e| e.min_zones)
            .or_else(|| self.fonts.iter().min_by_key(|e| e.min_zones))
    }
}

pub fn default_config_path() -> PathBuf {
    dirs_path().join("config.toml")
}

fn dirs_path() -> PathBuf {
    let base = std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
            PathBuf::from(home).join(".config")
        });
    base.join("timezones")
}

pub fn load_config(path: &Path) -> Result<AppConfig> {
    if !path.exists() {
        log::info!("Config file not found at {}, using built-in zones", path.display());
        return Ok(AppConfig::default());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path.display()))?;
    let config = parse_config(&content)
        .with_context(|| format!("Failed to parse config: {}", path.display()))?;
    log::info!("Loaded {} zones from {}", config.zone.len(), path.display());
    Ok(config)
}

pub fn parse_config(content: &str) -> Result<AppConfig> {
    let config: AppConfig = toml::from_str(content)?;
    config.validate()?;
    Ok(config)
}

pub fn generate_default_config() -> String {
    r#"# timezones - world clock watch face
# Defaults are shown. Copy to ~/.config/timezones/config.toml and edit.

[device]
# Offset the device clock runs in: "+HH:MM", minutes, or "auto" for the
# offset of the machine running the simulator. Leaving it out means "auto".
utc_offset = "+09:00"

[screen]
width  = 144
height = 168

# One band per zone, top to bottom. DST is not applied; adjust offsets by hand.

[[zone]]
name   = "Sao Paulo"
offset = "-03:00"

[[zone]]
name   = "Tokyo"
offset = "+09:00"

[[zone]]
name   = "Eindhoven"
offset = "+01:00"

# Font pairs by zone count. The entry with the largest min_zones not above the
# zone count wins. `font` is a file path or a font file name.

[[fonts]]
min_zones = 0
thin  = { font = "DejaVuSans", size = 16.0 }
thick = { font = "DejaVuSans-Bold", size = 30.0 }

[[fonts]]
min_zones = 4
thin  = { font = "DejaVuSans", size = 12.0 }
thick = { font = "DejaVuSans-Bold", size = 20.0 }
"#
    .to_string()
}
