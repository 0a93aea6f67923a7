use crate::config::PipelineConfig;
use anyhow::Context;
use std::fs;
use std::path::Path;

/// Create the per-group playlist directory if it is missing.
pub fn ensure_group_dir(config: &PipelineConfig) -> Result<(), anyhow::Error> {
    if !config.m3u_dir.exists() {
        fs::create_dir_all(&config.m3u_dir)
            .with_context(|| format!("failed to create {}", config.m3u_dir.display()))?;
        tracing::info!(dir = %config.m3u_dir.display(), "created group playlist directory");
    }
    Ok(())
}

fn mark(path: &Path) -> &'static str {
    if path.exists() {
        "✓"
    } else {
        "x"
    }
}

/// Human-readable report of the configured filesystem layout.
pub fn layout_report(config: &PipelineConfig) -> Vec<String> {
    [
        ("IP lists", config.ip_dir.as_path()),
        ("Templates", config.rtp_dir.as_path()),
        ("Text playlist", config.output_txt.as_path()),
        ("M3U playlist", config.output_m3u.as_path()),
        ("Group playlists", config.m3u_dir.as_path()),
    ]
    .into_iter()
    .map(|(label, path)| format!("{} {:<16} {}", mark(path), label, path.display()))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_group_dir_creates_nested() {
        let root = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            m3u_dir: root.path().join("a/b/groups"),
            ..Default::default()
        };
        ensure_group_dir(&config).unwrap();
        assert!(config.m3u_dir.is_dir());
        ensure_group_dir(&config).unwrap();
    }

    #[test]
    fn test_layout_report_marks_missing() {
        let root = tempfile::tempdir().unwrap();
        let config = PipelineConfig {
            ip_dir: root.path().to_path_buf(),
            rtp_dir: root.path().join("missing"),
            ..Default::default()
        };
        let report = layout_report(&config);
        assert_eq!(report.len(), 5);
        assert!(report[0].starts_with('✓'));
        assert!(report[1].starts_with('x'));
    }
}
