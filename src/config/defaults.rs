//! Default value functions for configuration.

// =============================================================================
// Bot Defaults
// =============================================================================

pub fn default_bot_name() -> String {
    "motionbot".to_string()
}

// =============================================================================
// Server Defaults (until ISUPPORT says otherwise)
// =============================================================================

pub fn default_prefix() -> String {
    crate::permissions::DEFAULT_PREFIX.to_string()
}

pub fn default_chantypes() -> String {
    "#&".to_string()
}

// =============================================================================
// Permission Defaults
// =============================================================================

/// Halfop when the network has it, otherwise op.
pub fn default_admin_markers() -> Vec<char> {
    vec!['%', '@']
}

pub fn default_voice_mode() -> char {
    'v'
}

// =============================================================================
// Logging Defaults
// =============================================================================

pub fn default_log_level() -> String {
    "info".to_string()
}
