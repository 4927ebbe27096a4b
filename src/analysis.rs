use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::LazyLock;
use time::macros::format_description;

// Uppercase prefix only; `cve-...` in the text is not an identifier here.
// Word boundaries are ASCII: an accented or CJK neighbour still delimits an id.
static CVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u:\b)CVE-[0-9]{4}-[0-9]{4,7}(?-u:\b)").expect("static CVE pattern")
});

static LABELED_TS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:Generated|Report saved|Last Updated)[:\s]+([A-Za-z0-9_: \-/]+)(?-u:\b)")
        .expect("static label pattern")
});

static ISO_TS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?-u:\b)20[0-9]{2}-[0-9]{2}-[0-9]{2}[ T][0-9]{2}:[0-9]{2}:[0-9]{2}(?-u:\b)")
        .expect("static timestamp pattern")
});

pub const NVD_DETAIL_BASE: &str = "https://nvd.nist.gov/vuln/detail/";

/// Distinct CVE identifiers in `text`, sorted by plain string comparison.
///
/// Ordering is lexicographic, so suffixes of different widths do not sort
/// numerically (`CVE-2021-10000` comes before `CVE-2021-2000`).
pub fn extract_cve_ids(text: &str) -> Vec<String> {
    CVE_RE
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampSource {
    /// Captured after a `Generated` / `Report saved` / `Last Updated` label.
    Labeled,
    /// A bare `20YY-MM-DD HH:MM:SS` anywhere in the text.
    Iso,
    /// Nothing found; this is the local clock at inference time and says
    /// nothing about when the report was produced.
    WallClock,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferredTimestamp {
    pub value: String,
    pub source: TimestampSource,
}

impl InferredTimestamp {
    pub fn is_authoritative(&self) -> bool {
        self.source != TimestampSource::WallClock
    }
}

pub fn infer_timestamp(text: &str) -> String {
    infer_timestamp_detailed(text).value
}

pub fn infer_timestamp_detailed(text: &str) -> InferredTimestamp {
    if let Some(cap) = LABELED_TS_RE.captures(text).and_then(|c| c.get(1)) {
        return InferredTimestamp {
            value: cap.as_str().to_string(),
            source: TimestampSource::Labeled,
        };
    }
    if let Some(m) = ISO_TS_RE.find(text) {
        return InferredTimestamp {
            value: m.as_str().to_string(),
            source: TimestampSource::Iso,
        };
    }
    InferredTimestamp {
        value: local_now_display(),
        source: TimestampSource::WallClock,
    }
}

/// Format used for the wall-clock fallback.
pub const DISPLAY_FORMAT: &[time::format_description::BorrowedFormatItem<'static>] =
    format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

fn local_now_display() -> String {
    let now = time::OffsetDateTime::now_local().unwrap_or_else(|_| time::OffsetDateTime::now_utc());
    now.format(DISPLAY_FORMAT)
        .unwrap_or_else(|_| "1970-01-01 00:00:00".to_string())
}

/// Case-insensitive substring filter over identifiers. A blank query keeps
/// everything.
pub fn filter_ids<'a>(ids: &'a [String], query: &str) -> Vec<&'a String> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
        return ids.iter().collect();
    }
    ids.iter().filter(|id| id.to_lowercase().contains(&q)).collect()
}

pub fn nvd_url(cve_id: &str) -> String {
    format!("{NVD_DETAIL_BASE}{cve_id}")
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub cve_ids: Vec<String>,
    pub cve_count: usize,
    pub last_updated: InferredTimestamp,
}

pub fn summarize(text: &str) -> ReportSummary {
    let cve_ids = extract_cve_ids(text);
    ReportSummary {
        cve_count: cve_ids.len(),
        cve_ids,
        last_updated: infer_timestamp_detailed(text),
    }
}
