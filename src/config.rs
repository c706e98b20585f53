//! User configuration stored as `setting = value` lines.
//!
//! Only whitelisted settings are recognized. Unknown keys and malformed
//! lines in the file are skipped with a warning; the file is always
//! rewritten in full when a setting changes.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::error::ErrorKind;
use crate::store;

/// Highest accepted frame rate.
pub const MAX_FRAMERATE: f32 = 240.0;

/// Errors reading, writing or changing the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The setting is not on the whitelist.
    #[error("unknown setting '{0}'")]
    UnknownSetting(String),
    /// The value does not parse or is out of range.
    #[error("invalid value '{value}' for {setting}: expected {expected}")]
    InvalidValue {
        /// Setting being changed.
        setting: &'static str,
        /// Rejected text.
        value: String,
        /// Description of the accepted values.
        expected: &'static str,
    },
    /// The file could not be read or written.
    #[error("{}: {source}", .path.display())]
    Io {
        /// Config file path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            ConfigError::UnknownSetting(_) | ConfigError::InvalidValue { .. } => {
                ErrorKind::Validation
            }
            ConfigError::Io { .. } => ErrorKind::Io,
        }
    }
}

/// An opaque 24-bit color written as `r,g,b`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{}", self.0, self.1, self.2)
    }
}

impl FromStr for Rgb {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(',').map(|p| p.trim().parse::<u8>());
        match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(Ok(r)), Some(Ok(g)), Some(Ok(b)), None) => Ok(Rgb(r, g, b)),
            _ => Err(()),
        }
    }
}

/// A whitelisted setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Setting {
    /// View frames per second.
    Framerate,
    /// View width in cells.
    WindowWidth,
    /// View height in cells.
    WindowHeight,
    /// View background.
    BackgroundColor,
    /// Text color.
    FontColor,
    /// Frame color.
    BorderColor,
    /// Font for graphical frontends.
    FontPath,
}

impl Setting {
    /// Every setting, in file order.
    pub const ALL: [Setting; 7] = [
        Setting::Framerate,
        Setting::WindowWidth,
        Setting::WindowHeight,
        Setting::BackgroundColor,
        Setting::FontColor,
        Setting::BorderColor,
        Setting::FontPath,
    ];

    /// Key used in the file and on the console.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Setting::Framerate => "framerate",
            Setting::WindowWidth => "window_width",
            Setting::WindowHeight => "window_height",
            Setting::BackgroundColor => "background_color",
            Setting::FontColor => "font_color",
            Setting::BorderColor => "border_color",
            Setting::FontPath => "font_path",
        }
    }

    /// Human description of the accepted values.
    #[must_use]
    pub const fn expected(self) -> &'static str {
        match self {
            Setting::Framerate => "a number greater than 0 and at most 240",
            Setting::WindowWidth => "an integer from 16 to 400",
            Setting::WindowHeight => "an integer from 8 to 200",
            Setting::BackgroundColor | Setting::FontColor | Setting::BorderColor => {
                "r,g,b with each part from 0 to 255"
            }
            Setting::FontPath => "a non-empty path",
        }
    }

    /// Look a setting up by key.
    #[must_use]
    pub fn lookup(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.name() == name)
    }
}

impl fmt::Display for Setting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// View and frontend settings.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// View frames per second.
    pub framerate: f32,
    /// View width in cells.
    pub window_width: u16,
    /// View height in cells.
    pub window_height: u16,
    /// View background.
    pub background_color: Rgb,
    /// Text color.
    pub font_color: Rgb,
    /// Frame color.
    pub border_color: Rgb,
    /// Font for graphical frontends.
    pub font_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            framerate: 30.0,
            window_width: 40,
            window_height: 22,
            background_color: Rgb(16, 16, 24),
            font_color: Rgb(220, 220, 210),
            border_color: Rgb(120, 120, 140),
            font_path: String::from("font.ttf"),
        }
    }
}

fn parse_ranged<T>(text: &str, min: T, max: T) -> Option<T>
where
    T: FromStr + PartialOrd,
{
    text.parse::<T>().ok().filter(|v| *v >= min && *v <= max)
}

impl Config {
    /// Parse config text, starting from defaults.
    ///
    /// Returns the config and one warning per skipped line.
    #[must_use]
    pub fn parse(text: &str) -> (Self, Vec<String>) {
        let mut config = Self::default();
        let mut warnings = Vec::new();

        for (number, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                warnings.push(format!("line {}: expected 'setting = value'", number + 1));
                continue;
            };
            if let Err(e) = config.set(key.trim(), value.trim()) {
                warnings.push(format!("line {}: {e}", number + 1));
            }
        }

        (config, warnings)
    }

    /// Read the config file, falling back to defaults if it does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file exists but cannot be read.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let (config, warnings) = Self::parse(&text);
        for warning in warnings {
            warn!(path = %path.display(), "{warning}");
        }
        Ok(config)
    }

    /// Write every setting to `path`, replacing the file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] on write failure.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        store::write_file(path, &self.render()).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "saved config");
        Ok(())
    }

    /// Serialize to file text.
    #[must_use]
    pub fn render(&self) -> String {
        let mut text = String::from("# townhall configuration\n");
        for setting in Setting::ALL {
            text.push_str(setting.name());
            text.push_str(" = ");
            text.push_str(&self.get(setting));
            text.push('\n');
        }
        text
    }

    /// Current value of a setting as text.
    #[must_use]
    pub fn get(&self, setting: Setting) -> String {
        match setting {
            Setting::Framerate => self.framerate.to_string(),
            Setting::WindowWidth => self.window_width.to_string(),
            Setting::WindowHeight => self.window_height.to_string(),
            Setting::BackgroundColor => self.background_color.to_string(),
            Setting::FontColor => self.font_color.to_string(),
            Setting::BorderColor => self.border_color.to_string(),
            Setting::FontPath => self.font_path.clone(),
        }
    }

    /// Change one setting from text.
    ///
    /// The config is only modified when the key is known and the value is
    /// valid.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownSetting`] or
    /// [`ConfigError::InvalidValue`].
    pub fn set(&mut self, name: &str, value: &str) -> Result<Setting, ConfigError> {
        let setting =
            Setting::lookup(name).ok_or_else(|| ConfigError::UnknownSetting(name.to_string()))?;
        let invalid = || ConfigError::InvalidValue {
            setting: setting.name(),
            value: value.to_string(),
            expected: setting.expected(),
        };

        match setting {
            Setting::Framerate => {
                let rate = value
                    .parse::<f32>()
                    .ok()
                    .filter(|r| r.is_finite() && *r > 0.0 && *r <= MAX_FRAMERATE)
                    .ok_or_else(invalid)?;
                self.framerate = rate;
            }
            Setting::WindowWidth => {
                self.window_width = parse_ranged(value, 16, 400).ok_or_else(invalid)?;
            }
            Setting::WindowHeight => {
                self.window_height = parse_ranged(value, 8, 200).ok_or_else(invalid)?;
            }
            Setting::BackgroundColor => {
                self.background_color = value.parse().map_err(|()| invalid())?;
            }
            Setting::FontColor => self.font_color = value.parse().map_err(|()| invalid())?,
            Setting::BorderColor => self.border_color = value.parse().map_err(|()| invalid())?,
            Setting::FontPath => {
                if value.is_empty() {
                    return Err(invalid());
                }
                self.font_path = value.to_string();
            }
        }
        Ok(setting)
    }

    /// Time between two view frames.
    #[must_use]
    pub fn frame_interval(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f32(1.0 / self.framerate.clamp(0.1, MAX_FRAMERATE))
    }
}
