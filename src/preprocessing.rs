use crate::loader::TemplateLine;
use crate::parser::{normalize_name, Classifier};
use crate::probe::relay_url;
use std::cmp::Ordering;

/// One playable channel on one validated relay.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelRecord {
    pub isp: String,
    /// `{isp}{n}`, n counting reachable IPs from 1
    pub group: String,
    /// Normalized name, also the classification key
    pub name: String,
    pub url: String,
    pub weight: u32,
}

pub fn group_name(isp: &str, n: usize) -> String {
    format!("{}{}", isp, n)
}

/// Expand every template line of a batch onto one reachable IP.
pub fn records_for_ip(
    isp: &str,
    group: &str,
    ip: &str,
    templates: &[TemplateLine],
    classifier: &Classifier,
) -> Vec<ChannelRecord> {
    templates
        .iter()
        .map(|t| {
            let name = normalize_name(&t.name);
            let weight = classifier.weight(&name);
            ChannelRecord {
                isp: isp.to_string(),
                group: group.to_string(),
                url: relay_url(ip, &t.url),
                name,
                weight,
            }
        })
        .collect()
}

fn compare(a: &ChannelRecord, b: &ChannelRecord) -> Ordering {
    a.isp
        .cmp(&b.isp)
        .then_with(|| a.group.cmp(&b.group))
        .then_with(|| a.weight.cmp(&b.weight))
        .then_with(|| a.name.cmp(&b.name))
}

/// Order by (isp, group, weight, name). `sort_by` is stable, so records with
/// equal keys keep production order. Duplicates are not merged.
pub fn sort_records(records: &mut [ChannelRecord]) {
    records.sort_by(compare);
}

/// Consecutive runs of records sharing a group, in order.
pub fn group_runs(records: &[ChannelRecord]) -> Vec<(&str, &[ChannelRecord])> {
    let mut runs = Vec::new();
    let mut start = 0;
    for i in 1..=records.len() {
        if i == records.len() || records[i].group != records[start].group {
            runs.push((records[start].group.as_str(), &records[start..i]));
            start = i;
        }
    }
    runs
}
