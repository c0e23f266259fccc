//! Configuration management

use crate::gateway::{FallbackPolicy, GatewayConfig, RelayConfig};
use crate::speech::VoiceSettings;
use crate::{Result, VoxError};
use ini::Ini;
use log::{debug, info, warn};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding `[backend] base_url`
pub const API_URL_ENV: &str = "VOXFORM_API_URL";

/// Application configuration
///
/// Backend location, speech parameters and relay settings, persisted in
/// an INI file.
pub struct Config {
    /// INI configuration storage
    ini: Ini,

    /// Config file path (~/.voxform.cfg)
    path: PathBuf,
}

impl Config {
    /// Load configuration from the default path, creating it if missing
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from `path`, creating it with defaults if missing
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        debug!("Loading config from {:?}", path);

        let ini = if path.exists() {
            Ini::load_from_file(&path)
                .map_err(|e| VoxError::IniParse(format!("Failed to load config: {}", e)))?
        } else {
            info!("Config file not found, creating default");
            let default = Self::default_config();
            default
                .write_to_file(&path)
                .map_err(|e| VoxError::IniParse(format!("Failed to write config: {}", e)))?;
            default
        };

        Ok(Self { ini, path })
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        debug!("Saving config to {:?}", self.path);
        self.ini
            .write_to_file(&self.path)
            .map_err(|e| VoxError::Config(format!("Failed to save config: {}", e)))
    }

    /// Get config file path (~/.voxform.cfg)
    fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".voxform.cfg")
    }

    /// Expose the config file path for display
    pub fn path(&self) -> &PathBuf {
        &self.path
    }

    /// Create default configuration
    fn default_config() -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("backend"))
            .set("base_url", "")
            .set("require_secure_transport", "false")
            .set("fallback", "static")
            .set("form_id", "1")
            .set("timeout_secs", "30");

        ini.with_section(Some("speech"))
            .set("enabled", "true")
            .set("lang", "en-US")
            .set("rate", "0.8")
            .set("pitch", "1.0")
            .set("volume", "1.0")
            .set("auto_speak", "true");

        ini.with_section(Some("relay"))
            .set("listen", "127.0.0.1:3000")
            .set("upstream", "http://127.0.0.1:8000");

        ini
    }

    /// Get a boolean value from config
    pub fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Get a string value from config
    pub fn get_string(&self, section: &str, key: &str, default: &str) -> String {
        self.ini
            .get_from(Some(section), key)
            .unwrap_or(default)
            .to_string()
    }

    /// Get an integer value from config
    pub fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Get a float value from config
    pub fn get_float(&self, section: &str, key: &str, default: f32) -> f32 {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    /// Set a value in config
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.ini.with_section(Some(section)).set(key, value);
    }

    // Backend

    /// Backend base URL; the environment variable wins over the file.
    /// Empty means "use the bundled questions".
    pub fn base_url(&self) -> Option<String> {
        let raw = std::env::var(API_URL_ENV)
            .unwrap_or_else(|_| self.get_string("backend", "base_url", ""));
        let url = raw.trim().trim_end_matches('/');
        if url.is_empty() {
            None
        } else {
            Some(url.to_string())
        }
    }

    pub fn require_secure_transport(&self) -> bool {
        self.get_bool("backend", "require_secure_transport", false)
    }

    pub fn fallback_policy(&self) -> FallbackPolicy {
        let raw = self.get_string("backend", "fallback", "static");
        raw.parse().unwrap_or_else(|_| {
            warn!("Unknown fallback policy '{}', using static", raw);
            FallbackPolicy::Static
        })
    }

    pub fn form_id(&self) -> u32 {
        self.get_int("backend", "form_id", 1).try_into().unwrap_or(1)
    }

    pub fn timeout(&self) -> Duration {
        let secs = self.get_int("backend", "timeout_secs", 30).max(1);
        Duration::from_secs(secs as u64)
    }

    /// Everything the gateway needs, in one struct
    pub fn gateway(&self) -> GatewayConfig {
        GatewayConfig {
            base_url: self.base_url(),
            require_secure_transport: self.require_secure_transport(),
            fallback: self.fallback_policy(),
            form_id: self.form_id(),
            timeout: self.timeout(),
        }
    }

    // Speech

    /// Should the host speech engine be used at all?
    pub fn speech_enabled(&self) -> bool {
        self.get_bool("speech", "enabled", true)
    }

    /// Should focus and hover be narrated without an explicit command?
    pub fn auto_speak(&self) -> bool {
        self.get_bool("speech", "auto_speak", true)
    }

    pub fn voice(&self) -> VoiceSettings {
        let defaults = VoiceSettings::default();
        VoiceSettings {
            lang: self.get_string("speech", "lang", &defaults.lang),
            rate: self.get_float("speech", "rate", defaults.rate).clamp(0.1, 10.0),
            pitch: self.get_float("speech", "pitch", defaults.pitch).clamp(0.0, 2.0),
            volume: self.get_float("speech", "volume", defaults.volume).clamp(0.0, 1.0),
        }
    }

    // Relay

    pub fn relay(&self) -> RelayConfig {
        let defaults = RelayConfig::default();
        RelayConfig {
            listen: self.get_string("relay", "listen", &defaults.listen),
            upstream: self
                .get_string("relay", "upstream", &defaults.upstream)
                .trim_end_matches('/')
                .to_string(),
            timeout: self.timeout(),
        }
    }
}
