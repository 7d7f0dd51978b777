//=========================================================================
// Aim Mode
//=========================================================================
//
// Two-valued mode the action binding flips between.
//
//=========================================================================

//=== AimMode =============================================================

/// Which half of the aim split is active.
///
/// Starts in [`AimMode::Look`] and flips on every toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AimMode {
    /// Input drives the camera.
    #[default]
    Look,

    /// Input drives the weapon.
    Shoot,
}

impl AimMode {
    /// Returns the other mode.
    #[inline]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Look => Self::Shoot,
            Self::Shoot => Self::Look,
        }
    }

    #[inline]
    pub const fn is_shoot(self) -> bool {
        matches!(self, Self::Shoot)
    }

    /// Name used in log lines.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Look => "Look",
            Self::Shoot => "Shoot",
        }
    }
}

impl std::fmt::Display for AimMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

//=========================================================================
// Unit Tests
//=========================================================================
