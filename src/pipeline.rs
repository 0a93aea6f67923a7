//! The batch job: load every ISP batch, probe its candidate IPs one at a time,
//! expand templates onto the reachable ones, sort, write.

use crate::config::PipelineConfig;
use crate::loader::{self, IspBatch};
use crate::parser::Classifier;
use crate::preprocessing::{group_name, group_runs, records_for_ip, sort_records, ChannelRecord};
use crate::probe::{relay_url, Probe, TcpProbe};
use crate::{setup, writer};
use chrono::Utc;
use std::io::{self, Write};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Default, Clone, PartialEq)]
pub struct RunSummary {
    /// Batches that had both an IP list and template lines
    pub batches: usize,
    pub probes: usize,
    pub reachable: usize,
    pub groups: usize,
    pub records: usize,
}

pub fn timestamp_now(tz: chrono_tz::Tz) -> String {
    Utc::now().with_timezone(&tz).format(TIMESTAMP_FORMAT).to_string()
}

/// Run with the real TCP prober and the current time.
pub async fn run(config: &PipelineConfig) -> Result<RunSummary, anyhow::Error> {
    let probe = TcpProbe::new(config.probe_timeout(), config.default_port);
    let timestamp = timestamp_now(config.tz()?);
    run_with(config, &probe, &timestamp).await
}

pub async fn run_with<P: Probe>(
    config: &PipelineConfig,
    probe: &P,
    timestamp: &str,
) -> Result<RunSummary, anyhow::Error> {
    if !config.ip_dir.exists() {
        tracing::debug!(dir = %config.ip_dir.display(), "IP directory missing, nothing to do");
        return Ok(RunSummary::default());
    }
    setup::ensure_group_dir(config)?;

    let (mut records, mut summary) = collect_records(config, probe).await;
    if records.is_empty() {
        tracing::info!("no reachable relays, outputs left untouched");
        return Ok(summary);
    }

    sort_records(&mut records);
    summary.groups = group_runs(&records).len();
    summary.records = records.len();

    writer::write_file(&config.output_txt, &writer::render_txt(&records, timestamp))?;
    writer::write_file(
        &config.output_m3u,
        &writer::render_m3u(&records, timestamp, &config.epg_url, &config.logo_base),
    )?;
    if config.write_group_playlists {
        writer::write_group_playlists(
            &config.m3u_dir,
            &records,
            timestamp,
            &config.epg_url,
            &config.logo_base,
        )?;
    }

    println!(
        "\n✨ 处理完成，共 {} 个分组、{} 个频道，已按频道类型排序。",
        summary.groups, summary.records
    );
    Ok(summary)
}

/// Every record from every batch, in production order.
pub async fn collect_records<P: Probe>(
    config: &PipelineConfig,
    probe: &P,
) -> (Vec<ChannelRecord>, RunSummary) {
    let classifier = Classifier::new(config.core_satellites.clone());
    let mut records = Vec::new();
    let mut summary = RunSummary::default();

    let files = match loader::list_batch_files(&config.ip_dir) {
        Ok(files) => files,
        Err(e) => {
            tracing::warn!(error = %e, "cannot list IP directory");
            return (records, summary);
        }
    };

    for file_name in files {
        let batch = match loader::load_batch(&config.ip_dir, &config.rtp_dir, &file_name) {
            Ok(Ok(batch)) => batch,
            Ok(Err(reason)) => {
                tracing::info!(file = %file_name, reason = reason.describe(), "skipping batch");
                continue;
            }
            Err(e) => {
                tracing::warn!(file = %file_name, error = %e, "skipping unreadable batch");
                continue;
            }
        };
        summary.batches += 1;
        probe_batch(&batch, probe, &classifier, &mut records, &mut summary).await;
    }

    (records, summary)
}

/// Only the first template is probed; the rest share its verdict.
async fn probe_batch<P: Probe>(
    batch: &IspBatch,
    probe: &P,
    classifier: &Classifier,
    records: &mut Vec<ChannelRecord>,
    summary: &mut RunSummary,
) {
    let Some(first) = batch.templates.first() else {
        return;
    };

    let mut next_group = 1;
    for ip in &batch.ips {
        let test_url = relay_url(ip, &first.url);
        print!("📡 探测 [{}] {} ... ", batch.isp, ip);
        let _ = io::stdout().flush();
        summary.probes += 1;

        match probe.probe(&test_url).await {
            Ok(endpoint) => {
                println!("✅");
                tracing::debug!(isp = %batch.isp, %endpoint, "relay reachable");
                let group = group_name(&batch.isp, next_group);
                records.extend(records_for_ip(&batch.isp, &group, ip, &batch.templates, classifier));
                summary.reachable += 1;
                next_group += 1;
            }
            Err(e) => {
                println!("❌");
                tracing::debug!(isp = %batch.isp, url = %test_url, kind = e.kind(), error = %e, "relay unreachable");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ProbeError;
    use crate::probe::parse_endpoint;
    use std::collections::HashSet;
    use std::fs;

    /// Reachable iff the probe URL's host:port is in the set.
    struct FakeProbe(HashSet<String>);

    impl Probe for FakeProbe {
        async fn probe(&self, url: &str) -> Result<crate::probe::Endpoint, ProbeError> {
            let endpoint = parse_endpoint(url, 80)?;
            if self.0.contains(&endpoint.to_string()) {
                Ok(endpoint)
            } else {
                Err(ProbeError::Timeout { addr: endpoint.to_string(), timeout_ms: 0 })
            }
        }
    }

    fn layout(root: &std::path::Path) -> PipelineConfig {
        PipelineConfig {
            ip_dir: root.join("ip"),
            rtp_dir: root.join("rtp"),
            output_txt: root.join("IPTV.txt"),
            output_m3u: root.join("IPTV.m3u"),
            m3u_dir: root.join("m3u_groups"),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_missing_ip_dir_is_noop() {
        let root = tempfile::tempdir().unwrap();
        let config = layout(root.path());
        let probe = FakeProbe(HashSet::new());
        let summary = run_with(&config, &probe, "t").await.unwrap();
        assert_eq!(summary, RunSummary::default());
        assert!(!config.m3u_dir.exists());
        assert!(!config.output_txt.exists());
    }

    #[tokio::test]
    async fn test_group_counter_skips_unreachable() {
        let root = tempfile::tempdir().unwrap();
        let config = layout(root.path());
        fs::create_dir_all(&config.ip_dir).unwrap();
        fs::create_dir_all(&config.rtp_dir).unwrap();
        fs::write(config.ip_dir.join("电信.txt"), "10.0.0.1:80\n10.0.0.2:80\n10.0.0.3:80\n").unwrap();
        fs::write(
            config.rtp_dir.join("电信.txt"),
            "CCTV1,rtp://239.0.0.1:5000\n湖南卫视,rtp://239.0.0.2:5000\n",
        )
        .unwrap();

        let probe = FakeProbe(["10.0.0.2:80".to_string(), "10.0.0.3:80".to_string()].into());
        let (records, summary) = collect_records(&config, &probe).await;

        assert_eq!(summary.probes, 3);
        assert_eq!(summary.reachable, 2);
        let groups: Vec<&str> = records.iter().map(|r| r.group.as_str()).collect();
        assert_eq!(groups, vec!["电信1", "电信1", "电信2", "电信2"]);
        assert!(records[0].url.starts_with("http://10.0.0.2:80/"));
    }

    #[tokio::test]
    async fn test_nothing_reachable_writes_nothing() {
        let root = tempfile::tempdir().unwrap();
        let config = layout(root.path());
        fs::create_dir_all(&config.ip_dir).unwrap();
        fs::create_dir_all(&config.rtp_dir).unwrap();
        fs::write(config.ip_dir.join("a.txt"), "10.0.0.1\n").unwrap();
        fs::write(config.rtp_dir.join("a.txt"), "CCTV1,rtp://239.0.0.1:5000\n").unwrap();

        let summary = run_with(&config, &FakeProbe(HashSet::new()), "t").await.unwrap();
        assert_eq!(summary.batches, 1);
        assert_eq!(summary.records, 0);
        assert!(config.m3u_dir.is_dir());
        assert!(!config.output_txt.exists());
        assert!(!config.output_m3u.exists());
    }

    #[test]
    fn test_timestamp_format() {
        let ts = timestamp_now(chrono_tz::Asia::Shanghai);
        assert!(chrono::NaiveDateTime::parse_from_str(&ts, TIMESTAMP_FORMAT).is_ok());
    }
}
