use serde::Deserialize;

/// Thresholds for finger extension ratios.
///
/// Ratios between the two thresholds count as neither extended nor folded.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct GestureTuning {
    /// A finger is extended when its ratio is strictly above this.
    pub extended_threshold: f32,

    /// A finger is folded when its ratio is strictly below this.
    pub folded_threshold: f32,
}

impl Default for GestureTuning {
    fn default() -> Self {
        Self {
            extended_threshold: 0.7,
            folded_threshold: 0.4,
        }
    }
}
