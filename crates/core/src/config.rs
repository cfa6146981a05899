//! Construction-time configuration for [`TimelineView`](crate::view::TimelineView).
//!
//! Every field is optional in JSON; missing fields take the defaults below.

use std::collections::BTreeMap;

use hcm_timeline_protocol::Color;
use serde::{Deserialize, Serialize};

use crate::error::TimelineError;
use crate::model::PhaseKind;
use crate::time::Granularity;

/// Key of the fallback entry in the color map.
pub const DEFAULT_COLOR_KEY: &str = "default";

const FALLBACK_COLOR: Color = Color::rgb(0x99, 0x99, 0x99);

const DEFAULT_PALETTE: [(&str, &str); 7] = [
    ("P+M", "#4A90D9"),
    ("Plan", "#7B68EE"),
    ("A+C", "#50C878"),
    ("Testing", "#FFB347"),
    ("Deploy", "#FF6B6B"),
    ("Post Go Live", "#20B2AA"),
    (DEFAULT_COLOR_KEY, "#999999"),
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TimelineConfig {
    pub granularity: Granularity,
    /// Lane height in CSS pixels.
    pub row_height: f64,
    pub padding: Padding,
    pub colors: PhasePalette,
    pub show_tooltips: bool,
    /// Delay before a burst of resize events triggers a relayout.
    pub resize_debounce_ms: u32,
}

impl Default for TimelineConfig {
    fn default() -> Self {
        Self {
            granularity: Granularity::Weekly,
            row_height: 40.0,
            padding: Padding::default(),
            colors: PhasePalette::default(),
            show_tooltips: true,
            resize_debounce_ms: 250,
        }
    }
}

impl TimelineConfig {
    pub fn from_json(json: &str) -> Result<Self, TimelineError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config.sanitized())
    }

    /// Replace non-finite or non-positive geometry with defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.row_height.is_finite() && self.row_height > 0.0) {
            tracing::warn!(row_height = self.row_height, "invalid row height, using default");
            self.row_height = defaults.row_height;
        }
        self.padding = self.padding.sanitized();
        self
    }
}

/// Insets of the plot rectangle from the surface edges.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Padding {
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
    pub left: f64,
}

impl Default for Padding {
    fn default() -> Self {
        Self {
            top: 60.0,
            right: 20.0,
            bottom: 40.0,
            left: 250.0,
        }
    }
}

impl Padding {
    fn sanitized(self) -> Self {
        let fix = |v: f64| if v.is_finite() && v >= 0.0 { v } else { 0.0 };
        Self {
            top: fix(self.top),
            right: fix(self.right),
            bottom: fix(self.bottom),
            left: fix(self.left),
        }
    }
}

/// Phase label to CSS color map.
///
/// User entries are merged over the six-phase default palette; unparseable
/// colors are dropped with a warning so the `default` entry takes over.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "BTreeMap<String, String>", into = "BTreeMap<String, String>")]
pub struct PhasePalette {
    entries: BTreeMap<String, String>,
    resolved: BTreeMap<String, Color>,
}

impl Default for PhasePalette {
    fn default() -> Self {
        Self::from(BTreeMap::new())
    }
}

impl From<BTreeMap<String, String>> for PhasePalette {
    fn from(overrides: BTreeMap<String, String>) -> Self {
        let mut entries: BTreeMap<String, String> = DEFAULT_PALETTE
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        entries.extend(overrides);

        let mut resolved = BTreeMap::new();
        for (label, css) in &entries {
            match Color::parse(css) {
                Some(color) => {
                    resolved.insert(label.clone(), color);
                }
                None => tracing::warn!(label = %label, css = %css, "ignoring unparseable phase color"),
            }
        }
        Self { entries, resolved }
    }
}

impl From<PhasePalette> for BTreeMap<String, String> {
    fn from(palette: PhasePalette) -> Self {
        palette.entries
    }
}

impl PhasePalette {
    /// Base color for a phase: exact label match, then the `default` entry.
    pub fn color_for(&self, kind: &PhaseKind) -> Color {
        self.resolved
            .get(kind.label())
            .or_else(|| self.resolved.get(DEFAULT_COLOR_KEY))
            .copied()
            .unwrap_or(FALLBACK_COLOR)
    }

    pub fn insert(&mut self, label: impl Into<String>, css: impl Into<String>) {
        let mut entries = std::mem::take(&mut self.entries);
        entries.insert(label.into(), css.into());
        *self = Self::from(entries);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = TimelineConfig::default();
        assert_eq!(cfg.granularity, Granularity::Weekly);
        assert_eq!(cfg.row_height, 40.0);
        assert_eq!(
            cfg.padding,
            Padding {
                top: 60.0,
                right: 20.0,
                bottom: 40.0,
                left: 250.0
            }
        );
        assert!(cfg.show_tooltips);
        assert_eq!(cfg.resize_debounce_ms, 250);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = TimelineConfig::from_json(
            r##"{ "granularity": "monthly", "padding": { "left": 180 }, "colors": { "Testing": "#000000" } }"##,
        )
        .unwrap();
        assert_eq!(cfg.granularity, Granularity::Monthly);
        assert_eq!(cfg.padding.left, 180.0);
        assert_eq!(cfg.padding.top, 60.0);
        assert_eq!(cfg.colors.color_for(&PhaseKind::Testing), Color::rgb(0, 0, 0));
        assert_eq!(
            cfg.colors.color_for(&PhaseKind::Plan),
            Color::rgb(0x7b, 0x68, 0xee)
        );
    }

    #[test]
    fn unknown_phase_uses_default_entry() {
        let mut palette = PhasePalette::default();
        assert_eq!(
            palette.color_for(&PhaseKind::Other("Hypercare".into())),
            Color::rgb(0x99, 0x99, 0x99)
        );
        palette.insert(DEFAULT_COLOR_KEY, "#123456");
        assert_eq!(
            palette.color_for(&PhaseKind::Other("Hypercare".into())),
            Color::rgb(0x12, 0x34, 0x56)
        );
    }

    #[test]
    fn bad_color_falls_back() {
        let mut palette = PhasePalette::default();
        palette.insert("Deploy", "not-a-color");
        assert_eq!(
            palette.color_for(&PhaseKind::Deploy),
            Color::rgb(0x99, 0x99, 0x99)
        );
    }

    #[test]
    fn garbage_geometry_is_sanitized() {
        let cfg = TimelineConfig {
            row_height: -3.0,
            ..TimelineConfig::default()
        }
        .sanitized();
        assert_eq!(cfg.row_height, 40.0);
    }
}
