use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_IP_DIR: &str = "py/fofa/ip";
pub const DEFAULT_RTP_DIR: &str = "py/fofa/rtp";
pub const DEFAULT_OUTPUT_TXT: &str = "py/fofa/IPTV.txt";
pub const DEFAULT_OUTPUT_M3U: &str = "py/fofa/IPTV.m3u";
pub const DEFAULT_M3U_DIR: &str = "py/fofa/m3u_groups";
pub const DEFAULT_LOGO_BASE: &str = "https://gcore.jsdelivr.net/gh/kenye201/TVlog/img/";
pub const DEFAULT_EPG_URL: &str = "http://epg.51zmt.top:8000/e.xml";
pub const DEFAULT_TIMEZONE: &str = "Asia/Shanghai";
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 1500;
pub const DEFAULT_PORT: u16 = 80;

/// Satellite channels that sort ahead of every other 卫视 channel.
pub const CORE_SATELLITES: &[&str] = &[
    "湖南卫视", "东方卫视", "浙江卫视", "江苏卫视", "北京卫视", "湖北卫视", "深圳卫视",
];

/// Everything the batch job needs to know about its environment.
///
/// Every field falls back to its default when missing from a config file, so a
/// partial JSON document only overrides what it names.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct PipelineConfig {
    /// Directory of `{isp}.txt` files, one candidate IP per line.
    pub ip_dir: PathBuf,
    /// Directory of `{isp}.txt` files, one `name,url_template` per line.
    pub rtp_dir: PathBuf,
    pub output_txt: PathBuf,
    pub output_m3u: PathBuf,
    pub m3u_dir: PathBuf,
    pub logo_base: String,
    pub epg_url: String,
    pub core_satellites: Vec<String>,
    pub probe_timeout_ms: u64,
    pub default_port: u16,
    /// IANA zone used for the `更新时间` / `refresh` timestamp.
    pub timezone: String,
    pub write_group_playlists: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ip_dir: PathBuf::from(DEFAULT_IP_DIR),
            rtp_dir: PathBuf::from(DEFAULT_RTP_DIR),
            output_txt: PathBuf::from(DEFAULT_OUTPUT_TXT),
            output_m3u: PathBuf::from(DEFAULT_OUTPUT_M3U),
            m3u_dir: PathBuf::from(DEFAULT_M3U_DIR),
            logo_base: DEFAULT_LOGO_BASE.to_string(),
            epg_url: DEFAULT_EPG_URL.to_string(),
            core_satellites: CORE_SATELLITES.iter().map(|s| s.to_string()).collect(),
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            default_port: DEFAULT_PORT,
            timezone: DEFAULT_TIMEZONE.to_string(),
            write_group_playlists: false,
        }
    }
}

impl PipelineConfig {
    /// Resolve the configuration: explicit file, then the per-user config
    /// file if one exists, then built-in defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, anyhow::Error> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        if let Some(path) = Self::user_config_path() {
            if path.exists() {
                return Self::from_file(&path);
            }
        }

        Ok(Self::default())
    }

    pub fn from_file(path: &Path) -> Result<Self, anyhow::Error> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config = Self::from_json(&content)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self, anyhow::Error> {
        let config: PipelineConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "fofa", "fofa-m3u").map(|dirs| dirs.config_dir().join("config.json"))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.tz()?;
        if self.probe_timeout_ms == 0 {
            anyhow::bail!("probe_timeout_ms must be greater than zero");
        }
        Ok(())
    }

    pub fn tz(&self) -> Result<chrono_tz::Tz, anyhow::Error> {
        self.timezone
            .parse::<chrono_tz::Tz>()
            .map_err(|e| anyhow::anyhow!("unknown timezone {:?}: {}", self.timezone, e))
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_fixed_layout() {
        let config = PipelineConfig::default();
        assert_eq!(config.ip_dir, PathBuf::from("py/fofa/ip"));
        assert_eq!(config.rtp_dir, PathBuf::from("py/fofa/rtp"));
        assert_eq!(config.probe_timeout(), Duration::from_millis(1500));
        assert_eq!(config.core_satellites.len(), 7);
        assert!(!config.write_group_playlists);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = PipelineConfig::from_json(r#"{"ip_dir": "/tmp/ip", "probe_timeout_ms": 300}"#)
            .unwrap();
        assert_eq!(config.ip_dir, PathBuf::from("/tmp/ip"));
        assert_eq!(config.probe_timeout_ms, 300);
        assert_eq!(config.epg_url, DEFAULT_EPG_URL);
        assert_eq!(config.timezone, "Asia/Shanghai");
    }

    #[test]
    fn test_unknown_timezone_rejected() {
        assert!(PipelineConfig::from_json(r#"{"timezone": "Mars/Olympus"}"#).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        assert!(PipelineConfig::from_json(r#"{"probe_timeout_ms": 0}"#).is_err());
    }
}
