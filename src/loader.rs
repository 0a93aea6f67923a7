//! Per-ISP input discovery.
//!
//! An ISP batch is a pair of same-named `.txt` files: one in the IP directory
//! (candidate relay IPs) and one in the template directory (`name,url` lines).

use crate::errors::LoadError;
use std::fs;
use std::path::{Path, PathBuf};

const BATCH_EXTENSION: &str = ".txt";
const CITY_SUFFIX: &str = "市";

/// One `name,url_template` line
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateLine {
    pub name: String,
    pub url: String,
}

impl TemplateLine {
    /// Split on the first comma; `None` for lines without one.
    pub fn parse(line: &str) -> Option<Self> {
        let (name, url) = line.trim().split_once(',')?;
        Some(Self {
            name: name.to_string(),
            url: url.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct IspBatch {
    /// Display label, e.g. `广东电信` for `广东市电信.txt`
    pub isp: String,
    pub ips: Vec<String>,
    pub templates: Vec<TemplateLine>,
}

/// Why a batch file did not yield an [`IspBatch`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkipReason {
    MissingTemplates,
    NoCandidates,
    NoTemplates,
}

impl SkipReason {
    pub fn describe(&self) -> &'static str {
        match self {
            SkipReason::MissingTemplates => "no companion template file",
            SkipReason::NoCandidates => "empty IP list",
            SkipReason::NoTemplates => "no template lines",
        }
    }
}

/// Strip the batch extension and every city marker from a file name.
pub fn isp_label(file_name: &str) -> String {
    file_name
        .replace(BATCH_EXTENSION, "")
        .replace(CITY_SUFFIX, "")
}

pub fn parse_ip_list(content: &str) -> Vec<String> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn parse_templates(content: &str) -> Vec<TemplateLine> {
    content.lines().filter_map(TemplateLine::parse).collect()
}

/// Batch file names in the IP directory, ascending.
pub fn list_batch_files(ip_dir: &Path) -> Result<Vec<String>, LoadError> {
    let entries = fs::read_dir(ip_dir).map_err(|source| LoadError::ListDir {
        path: ip_dir.to_path_buf(),
        source,
    })?;

    let mut names = Vec::new();
    for entry in entries {
        match entry {
            Ok(entry) => {
                let name = entry.file_name().to_string_lossy().into_owned();
                if name.ends_with(BATCH_EXTENSION) {
                    names.push(name);
                }
            }
            Err(e) => tracing::warn!(dir = %ip_dir.display(), error = %e, "unreadable directory entry"),
        }
    }
    names.sort();
    Ok(names)
}

fn read(path: PathBuf) -> Result<String, LoadError> {
    fs::read_to_string(&path).map_err(|source| LoadError::Read { path, source })
}

/// Load one batch by file name.
///
/// `Ok(Err(reason))` means the batch is valid input that simply contributes
/// nothing; only unreadable files are errors.
pub fn load_batch(
    ip_dir: &Path,
    rtp_dir: &Path,
    file_name: &str,
) -> Result<Result<IspBatch, SkipReason>, LoadError> {
    let rtp_path = rtp_dir.join(file_name);
    if !rtp_path.exists() {
        return Ok(Err(SkipReason::MissingTemplates));
    }

    let ips = parse_ip_list(&read(ip_dir.join(file_name))?);
    let templates = parse_templates(&read(rtp_path)?);

    if ips.is_empty() {
        return Ok(Err(SkipReason::NoCandidates));
    }
    if templates.is_empty() {
        return Ok(Err(SkipReason::NoTemplates));
    }

    Ok(Ok(IspBatch {
        isp: isp_label(file_name),
        ips,
        templates,
    }))
}
