//! Target volume with clamping
//!
//! Ambient sounds use a plain linear level in [0.0, 1.0], the same scale the
//! audio handle understands. Out-of-range input is corrected, never rejected.

/// Steady-state volume target
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Volume {
    /// Linear level (0.0-1.0)
    level: f32,
}

impl Volume {
    /// Create a volume target, clamping to [0.0, 1.0]
    pub fn new(level: f32) -> Self {
        Self {
            level: Self::clamp(level),
        }
    }

    /// Create from a 0-100 slider position
    pub fn from_percent(percent: u8) -> Self {
        Self::new(f32::from(percent) / 100.0)
    }

    /// Set level, clamping to [0.0, 1.0]
    pub fn set_level(&mut self, level: f32) {
        self.level = Self::clamp(level);
    }

    /// Current level (0.0-1.0)
    pub fn level(&self) -> f32 {
        self.level
    }

    /// Current level as a 0-100 slider position
    pub fn percent(&self) -> u8 {
        (self.level * 100.0).round() as u8
    }

    /// NaN maps to silence; infinities saturate
    fn clamp(level: f32) -> f32 {
        if level.is_nan() {
            0.0
        } else {
            level.clamp(0.0, 1.0)
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(0.5)
    }
}
