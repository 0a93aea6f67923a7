//! Playlist serialization.
//!
//! Both formats are rendered to a `String` first and written with a single
//! whole-file overwrite.

use crate::preprocessing::{group_runs, ChannelRecord};
use anyhow::Context;
use std::fs;
use std::path::{Path, PathBuf};

pub const TXT_TIMESTAMP_LABEL: &str = "更新时间";
pub const GENRE_MARKER: &str = "#genre#";

/// `{group},#genre#` sections of `{name},{url}` lines under a timestamp header.
pub fn render_txt(records: &[ChannelRecord], timestamp: &str) -> String {
    let mut out = format!("{}: {}\n", TXT_TIMESTAMP_LABEL, timestamp);
    for (group, run) in group_runs(records) {
        out.push_str(&format!("\n{},{}\n", group, GENRE_MARKER));
        for record in run {
            out.push_str(&format!("{},{}\n", record.name, record.url));
        }
    }
    out
}

pub fn logo_url(logo_base: &str, name: &str) -> String {
    format!("{}{}.png", logo_base, name)
}

pub fn render_m3u(records: &[ChannelRecord], timestamp: &str, epg_url: &str, logo_base: &str) -> String {
    let mut out = format!("#EXTM3U x-tvg-url=\"{}\" refresh=\"{}\"\n", epg_url, timestamp);
    for record in records {
        out.push_str(&format!(
            "#EXTINF:-1 tvg-logo=\"{}\" group-title=\"{}\",{}\n{}\n",
            logo_url(logo_base, &record.name),
            record.group,
            record.name,
            record.url
        ));
    }
    out
}

pub fn write_file(path: &Path, content: &str) -> Result<(), anyhow::Error> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::info!(path = %path.display(), bytes = content.len(), "wrote playlist");
    Ok(())
}

/// One `{group}.m3u` per group inside `dir`. Returns the paths written.
pub fn write_group_playlists(
    dir: &Path,
    records: &[ChannelRecord],
    timestamp: &str,
    epg_url: &str,
    logo_base: &str,
) -> Result<Vec<PathBuf>, anyhow::Error> {
    let mut written = Vec::new();
    for (group, run) in group_runs(records) {
        let path = dir.join(format!("{}.m3u", group));
        write_file(&path, &render_m3u(run, timestamp, epg_url, logo_base))?;
        written.push(path);
    }
    Ok(written)
}
