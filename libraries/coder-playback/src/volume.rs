//! Volume control
//!
//! The embed takes a plain 0-100 level. Muting sends 0 to the embed but
//! remembers the last audible level so unmuting restores it exactly.

use serde::{Deserialize, Serialize};

/// Volume level and mute flag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volume {
    /// Volume level (0-100)
    level: u8,

    /// Mute state (preserves volume level)
    muted: bool,

    /// Last non-zero level, restored on unmute
    restore_level: u8,
}

impl Volume {
    /// Create new volume controller
    ///
    /// # Arguments
    /// * `level` - Initial volume (0-100, clamped)
    pub fn new(level: u8) -> Self {
        let level = level.min(100);
        Self {
            level,
            muted: false,
            restore_level: if level == 0 { 100 } else { level },
        }
    }

    /// Set volume level (0-100)
    ///
    /// Does not unmute.
    pub fn set_level(&mut self, level: u8) {
        self.level = level.min(100);
        if self.level > 0 {
            self.restore_level = self.level;
        }
    }

    /// Get current volume level (0-100)
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Mute audio (preserves volume level)
    pub fn mute(&mut self) {
        self.muted = true;
    }

    /// Unmute audio
    ///
    /// A level left at 0 comes back as the last audible level.
    pub fn unmute(&mut self) {
        self.muted = false;
        if self.level == 0 {
            self.level = self.restore_level;
        }
    }

    /// Toggle mute state
    pub fn toggle_mute(&mut self) {
        if self.muted {
            self.unmute();
        } else {
            self.mute();
        }
    }

    /// Check if muted
    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Level the embed should be playing at
    ///
    /// Returns 0 if muted.
    pub fn effective_level(&self) -> u8 {
        if self.muted {
            0
        } else {
            self.level
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(50)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_volume() {
        let vol = Volume::new(80);
        assert_eq!(vol.level(), 80);
        assert!(!vol.is_muted());
        assert_eq!(vol.effective_level(), 80);
    }

    #[test]
    fn set_volume_level() {
        let mut vol = Volume::new(50);
        vol.set_level(75);
        assert_eq!(vol.level(), 75);

        // Clamp to 100
        vol.set_level(150);
        assert_eq!(vol.level(), 100);
    }

    #[test]
    fn mute_unmute_restores_level() {
        let mut vol = Volume::new(80);

        vol.mute();
        assert!(vol.is_muted());
        assert_eq!(vol.effective_level(), 0);
        assert_eq!(vol.level(), 80); // Level preserved

        vol.unmute();
        assert_eq!(vol.effective_level(), 80);
    }

    #[test]
    fn set_level_while_muted_stays_muted() {
        let mut vol = Volume::new(80);
        vol.mute();

        vol.set_level(30);
        assert!(vol.is_muted());
        assert_eq!(vol.effective_level(), 0);

        vol.unmute();
        assert_eq!(vol.effective_level(), 30);
    }

    #[test]
    fn unmute_after_dragging_to_zero_restores_last_audible_level() {
        let mut vol = Volume::new(65);
        vol.set_level(0);
        vol.mute();

        vol.unmute();
        assert_eq!(vol.level(), 65);
    }

    #[test]
    fn toggle_mute() {
        let mut vol = Volume::new(80);

        vol.toggle_mute();
        assert!(vol.is_muted());

        vol.toggle_mute();
        assert!(!vol.is_muted());
        assert_eq!(vol.effective_level(), 80);
    }
}
