//! Host classification by hostname convention
//!
//! Every host belongs to exactly one cluster. The pattern table is checked
//! in order and the first match wins; anything unmatched is `unknown`.

use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

/// Cluster a host is deployed in
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Cluster {
    Rtc,
    R2,
    Tsnet,
    Qloud,
    Zerling,
    Unknown,
}

impl Cluster {
    /// Label used in metric paths and snapshots
    pub fn as_str(&self) -> &'static str {
        match self {
            Cluster::Rtc => "rtc",
            Cluster::R2 => "r2",
            Cluster::Tsnet => "tsnet",
            Cluster::Qloud => "qloud",
            Cluster::Zerling => "zerling",
            Cluster::Unknown => crate::UNKNOWN,
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Hostname patterns, in match order
const HOST_PATTERNS: &[(Cluster, &str)] = &[
    (Cluster::Rtc, r"^.*\.vm\.search\.yandex\.net$"),
    (Cluster::R2, r"^s1.*\.qloud\.yandex\.net$"),
    (Cluster::Tsnet, r"^tsnet.*search\.yandex\.net$"),
    (Cluster::Qloud, r"^pool.*\.qloud\.yandex\.net$"),
    (Cluster::Zerling, r"^zergling.*$"),
];

static COMPILED_PATTERNS: OnceLock<Vec<(Cluster, Regex)>> = OnceLock::new();

fn patterns() -> &'static [(Cluster, Regex)] {
    COMPILED_PATTERNS.get_or_init(|| {
        HOST_PATTERNS
            .iter()
            .filter_map(|(cluster, pattern)| match Regex::new(pattern) {
                Ok(re) => Some((*cluster, re)),
                Err(e) => {
                    tracing::warn!(cluster = %cluster, error = %e, "Skipping invalid host pattern");
                    None
                }
            })
            .collect()
    })
}

/// Classify a hostname into its cluster
pub fn classify(hostname: &str) -> Cluster {
    patterns()
        .iter()
        .find(|(_, re)| re.is_match(hostname))
        .map(|(cluster, _)| *cluster)
        .unwrap_or(Cluster::Unknown)
}
