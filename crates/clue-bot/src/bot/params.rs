use serde::{Deserialize, Serialize};

/// Tunable thresholds of the automated decision policy.
///
/// The standard accusation gate interpolates each `*_start`/`*_end` pair
/// linearly by elimination progress.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotParams {
    pub info_weight: f64,
    pub bold_enabled: bool,
    pub bold_top: f64,
    pub bold_strong_top: f64,
    pub bold_strong_lead: f64,
    pub min_top_start: f64,
    pub min_top_end: f64,
    pub min_lead_start: f64,
    pub min_lead_end: f64,
    pub min_joint_start: f64,
    pub min_joint_end: f64,
    pub probe_enabled: bool,
}

impl Default for BotParams {
    fn default() -> Self {
        Self {
            info_weight: 0.5,
            bold_enabled: true,
            bold_top: 0.85,
            bold_strong_top: 0.75,
            bold_strong_lead: 0.40,
            min_top_start: 0.50,
            min_top_end: 0.75,
            min_lead_start: 0.05,
            min_lead_end: 0.20,
            min_joint_start: 0.20,
            min_joint_end: 0.50,
            probe_enabled: true,
        }
    }
}

impl BotParams {
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Applies `CLUE_BOT_*` overrides read through `read`. Unparseable or
    /// out-of-range values keep the current setting.
    pub fn with_overrides<F>(mut self, mut read: F) -> Self
    where
        F: FnMut(&str) -> Option<String>,
    {
        let mut unit = |key: &str, slot: &mut f64| {
            if let Some(value) = read(key)
                .and_then(|raw| raw.trim().parse::<f64>().ok())
                .filter(|value| value.is_finite() && (0.0..=1.0).contains(value))
            {
                *slot = value;
            }
        };
        unit("CLUE_BOT_INFO_WEIGHT", &mut self.info_weight);
        unit("CLUE_BOT_BOLD_TOP", &mut self.bold_top);
        unit("CLUE_BOT_BOLD_STRONG_TOP", &mut self.bold_strong_top);
        unit("CLUE_BOT_BOLD_STRONG_LEAD", &mut self.bold_strong_lead);
        unit("CLUE_BOT_MIN_TOP_START", &mut self.min_top_start);
        unit("CLUE_BOT_MIN_TOP_END", &mut self.min_top_end);
        unit("CLUE_BOT_MIN_LEAD_START", &mut self.min_lead_start);
        unit("CLUE_BOT_MIN_LEAD_END", &mut self.min_lead_end);
        unit("CLUE_BOT_MIN_JOINT_START", &mut self.min_joint_start);
        unit("CLUE_BOT_MIN_JOINT_END", &mut self.min_joint_end);

        if let Some(flag) = read("CLUE_BOT_BOLD").map(|raw| parse_flag(&raw)) {
            self.bold_enabled = flag;
        }
        if let Some(flag) = read("CLUE_BOT_PROBE").map(|raw| parse_flag(&raw)) {
            self.probe_enabled = flag;
        }
        self
    }

    /// First threshold that is not a finite value in `[0, 1]`, by field name.
    pub fn out_of_range(&self) -> Option<(&'static str, f64)> {
        [
            ("info_weight", self.info_weight),
            ("bold_top", self.bold_top),
            ("bold_strong_top", self.bold_strong_top),
            ("bold_strong_lead", self.bold_strong_lead),
            ("min_top_start", self.min_top_start),
            ("min_top_end", self.min_top_end),
            ("min_lead_start", self.min_lead_start),
            ("min_lead_end", self.min_lead_end),
            ("min_joint_start", self.min_joint_start),
            ("min_joint_end", self.min_joint_end),
        ]
        .into_iter()
        .find(|(_, value)| !(value.is_finite() && (0.0..=1.0).contains(value)))
    }

    pub fn min_top(&self, progress: f64) -> f64 {
        lerp(self.min_top_start, self.min_top_end, progress)
    }

    pub fn min_lead(&self, progress: f64) -> f64 {
        lerp(self.min_lead_start, self.min_lead_end, progress)
    }

    pub fn min_joint(&self, progress: f64) -> f64 {
        lerp(self.min_joint_start, self.min_joint_end, progress)
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim(), "1" | "true" | "TRUE" | "on" | "ON")
}

fn lerp(start: f64, end: f64, progress: f64) -> f64 {
    let t = if progress.is_finite() {
        progress.clamp(0.0, 1.0)
    } else {
        0.0
    };
    start + (end - start) * t
}
