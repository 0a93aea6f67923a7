use once_cell::sync::Lazy;
use regex::Regex;

/// Parenthetical / bracketed qualifiers, ASCII or fullwidth: `(高清)`, `[HD]`, `（备）`
static QUALIFIER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[(\[（].*?[)\]）]").expect("qualifier pattern"));

static CCTV_NUM_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"CCTV(\d+)").expect("cctv pattern"));

pub const CCTV5_PLUS: &str = "CCTV5+";
const CCTV5_PLUS_MARKER: &str = "5+";
const SATELLITE_MARKER: &str = "卫视";

/// CCTV themed channels without a channel number.
pub const CCTV_THEME_KEYWORDS: &[&str] = &["剧场", "兵器", "风云", "女性", "世界地理", "央视", "CCTV"];

/// Name prefixes that mark a provincial / municipal station.
pub const PROVINCES: &[&str] = &[
    "山东", "江苏", "浙江", "广东", "湖南", "湖北", "河南", "河北", "安徽", "福建", "江西",
    "辽宁", "吉林", "黑龙江", "山西", "陕西", "甘肃", "青海", "四川", "贵州", "云南", "海南",
    "台湾", "北京", "天津", "上海", "重庆", "广西", "内蒙古", "西藏", "宁夏", "新疆",
];

pub const WEIGHT_CCTV_BASE: u32 = 100;
pub const WEIGHT_CCTV5_PLUS: u32 = 118;
pub const WEIGHT_4K: u32 = 200;
pub const WEIGHT_CORE_SATELLITE: u32 = 300;
pub const WEIGHT_SATELLITE: u32 = 310;
pub const WEIGHT_PROVINCE: u32 = 400;
pub const WEIGHT_OTHER: u32 = 500;
pub const WEIGHT_CCTV_THEME: u32 = 600;

/// Canonical display name for a raw channel name.
///
/// Drops bracketed qualifiers, upper-cases and removes spaces and hyphens.
/// Numbered CCTV channels collapse to `CCTV{n}` (`CCTV5+` when the cleaned
/// name carries the `5+` marker).
pub fn normalize_name(raw: &str) -> String {
    let clean = QUALIFIER_RE
        .replace_all(raw, "")
        .to_uppercase()
        .replace([' ', '-'], "");

    if let Some(caps) = CCTV_NUM_RE.captures(&clean) {
        if clean.contains(CCTV5_PLUS_MARKER) {
            return CCTV5_PLUS.to_string();
        }
        return format!("CCTV{}", &caps[1]);
    }
    clean
}

fn cctv_number(name: &str) -> Option<u32> {
    let caps = CCTV_NUM_RE.captures(name)?;
    // Absurdly long digit runs saturate instead of failing the match.
    Some(caps[1].parse::<u32>().unwrap_or(u32::MAX))
}

/// One row of the classification table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightRule {
    Cctv5Plus,
    CctvNumbered,
    FourK,
    CoreSatellite,
    Satellite,
    CctvTheme,
    Province,
}

/// Evaluation order. First rule that yields a weight wins, so `CctvTheme`
/// (600) fires before `Province` (400) for names that satisfy both.
pub const RULES: [WeightRule; 7] = [
    WeightRule::Cctv5Plus,
    WeightRule::CctvNumbered,
    WeightRule::FourK,
    WeightRule::CoreSatellite,
    WeightRule::Satellite,
    WeightRule::CctvTheme,
    WeightRule::Province,
];

impl WeightRule {
    pub fn apply(&self, name: &str, core_satellites: &[String]) -> Option<u32> {
        match self {
            WeightRule::Cctv5Plus => (name == CCTV5_PLUS).then_some(WEIGHT_CCTV5_PLUS),
            WeightRule::CctvNumbered => {
                cctv_number(name).map(|n| WEIGHT_CCTV_BASE.saturating_add(n))
            }
            WeightRule::FourK => name.contains("4K").then_some(WEIGHT_4K),
            WeightRule::CoreSatellite => (name.contains(SATELLITE_MARKER)
                && core_satellites.iter().any(|s| name.contains(s.as_str())))
            .then_some(WEIGHT_CORE_SATELLITE),
            WeightRule::Satellite => name.contains(SATELLITE_MARKER).then_some(WEIGHT_SATELLITE),
            WeightRule::CctvTheme => CCTV_THEME_KEYWORDS
                .iter()
                .any(|k| name.contains(k))
                .then_some(WEIGHT_CCTV_THEME),
            WeightRule::Province => PROVINCES
                .iter()
                .any(|p| name.starts_with(p))
                .then_some(WEIGHT_PROVINCE),
        }
    }
}

/// Sort-bucket classifier over normalized names. Lower weight sorts first.
#[derive(Debug, Clone)]
pub struct Classifier {
    core_satellites: Vec<String>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(
            crate::config::CORE_SATELLITES
                .iter()
                .map(|s| s.to_string())
                .collect(),
        )
    }
}

impl Classifier {
    pub fn new(core_satellites: Vec<String>) -> Self {
        Self { core_satellites }
    }

    /// The rule that decides `name`, if any.
    pub fn matching_rule(&self, name: &str) -> Option<(WeightRule, u32)> {
        RULES
            .iter()
            .find_map(|rule| rule.apply(name, &self.core_satellites).map(|w| (*rule, w)))
    }

    pub fn weight(&self, name: &str) -> u32 {
        self.matching_rule(name).map(|(_, w)| w).unwrap_or(WEIGHT_OTHER)
    }
}
