//! Default values for topograph configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// Config File Locations
// ============================================================================

/// Project-local config file name.
pub const DEFAULT_CONFIG_FILE: &str = "topograph.toml";

/// Directory under the user config dir.
pub const DEFAULT_CONFIG_DIR: &str = "topograph";

/// File name inside the user config directory.
pub const DEFAULT_USER_CONFIG_FILE: &str = "config.toml";

// ============================================================================
// Analysis Defaults
// ============================================================================

/// Restart count above which a pod is reported as restarting.
pub const DEFAULT_RESTART_THRESHOLD: i32 = 5;

/// Window before `now` in which a restart or crash counts as recent (minutes).
pub const DEFAULT_RESTART_WINDOW_MINUTES: i64 = 10;

/// Largest accepted restart window (one year, in minutes).
pub const MAX_RESTART_WINDOW_MINUTES: i64 = 525_600;

/// Command suggested to inspect container logs.
pub const DEFAULT_LOGS_COMMAND: &str = "oc logs";

/// Command suggested to add a probe to a controller.
pub const DEFAULT_SET_PROBE_COMMAND: &str = "oc set probe";

/// Command suggested to create an autoscaler.
pub const DEFAULT_AUTOSCALE_COMMAND: &str = "oc autoscale";

/// Waiting reason of a container stuck in a crash loop.
pub const CRASH_LOOP_BACK_OFF_REASON: &str = "CrashLoopBackOff";

// ============================================================================
// Namer Defaults
// ============================================================================

/// Namespace whose resources are named without a namespace suffix.
pub const DEFAULT_CURRENT_NAMESPACE: &str = "default";
