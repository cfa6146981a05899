use std::fmt;

use serde::{Deserialize, Serialize};

/// The stage of project execution a bar represents.
///
/// Labels outside the known six are kept verbatim in `Other` and rendered with
/// the fallback color.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PhaseKind {
    /// "P+M": planning and management.
    PlanManage,
    Plan,
    /// "A+C": analysis and configuration.
    AnalyzeConfigure,
    Testing,
    Deploy,
    PostGoLive,
    Other(String),
}

impl PhaseKind {
    /// Known phases in their default sequence.
    pub const CANONICAL: [PhaseKind; 6] = [
        PhaseKind::PlanManage,
        PhaseKind::Plan,
        PhaseKind::AnalyzeConfigure,
        PhaseKind::Testing,
        PhaseKind::Deploy,
        PhaseKind::PostGoLive,
    ];

    pub fn parse(label: &str) -> Self {
        let trimmed = label.trim();
        Self::CANONICAL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(trimmed))
            .unwrap_or_else(|| Self::Other(trimmed.to_string()))
    }

    pub fn label(&self) -> &str {
        match self {
            Self::PlanManage => "P+M",
            Self::Plan => "Plan",
            Self::AnalyzeConfigure => "A+C",
            Self::Testing => "Testing",
            Self::Deploy => "Deploy",
            Self::PostGoLive => "Post Go Live",
            Self::Other(label) => label,
        }
    }

    /// 1-based default sequence; unknown phases sort last.
    pub fn sequence(&self) -> u8 {
        match self {
            Self::PlanManage => 1,
            Self::Plan => 2,
            Self::AnalyzeConfigure => 3,
            Self::Testing => 4,
            Self::Deploy => 5,
            Self::PostGoLive => 6,
            Self::Other(_) => u8::MAX,
        }
    }
}

impl From<String> for PhaseKind {
    fn from(label: String) -> Self {
        Self::parse(&label)
    }
}

impl From<&str> for PhaseKind {
    fn from(label: &str) -> Self {
        Self::parse(label)
    }
}

impl From<PhaseKind> for String {
    fn from(kind: PhaseKind) -> Self {
        match kind {
            PhaseKind::Other(label) => label,
            known => known.label().to_string(),
        }
    }
}

impl fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
