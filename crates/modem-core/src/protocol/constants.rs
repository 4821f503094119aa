//! Protocol constants for the u-blox AT command set.
//!
//! Derived from the u-blox AT commands manual (TOBY-L2 / LISA-U / SARA-U).

// ============================================================================
// Device Identification
// ============================================================================

/// u-blox AG Vendor ID
pub const UBLOX_VENDOR_ID: u16 = 0x1546;

/// TOBY-L2 product ID in the back-compatible (CDC-ACM only) profile
pub const TOBY_L2_BACK_COMPATIBLE_PID: u16 = 0x1141;
/// TOBY-L2 product ID in the ECM profile
pub const TOBY_L2_ECM_PID: u16 = 0x1143;
/// TOBY-L2 product ID in the RNDIS profile
pub const TOBY_L2_RNDIS_PID: u16 = 0x1146;

// ============================================================================
// Reply Tags (Device -> Host)
// ============================================================================

pub const TAG_UPINCNT: &str = "+UPINCNT:";
pub const TAG_UUSBCONF: &str = "+UUSBCONF:";
pub const TAG_UBMCONF: &str = "+UBMCONF:";
pub const TAG_UIPADDR: &str = "+UIPADDR:";
pub const TAG_CFUN: &str = "+CFUN:";
pub const TAG_URAT: &str = "+URAT:";

// ============================================================================
// Commands (Host -> Device)
// ============================================================================

/// PIN/PUK retry counters
pub const CMD_UPINCNT: &str = "+UPINCNT";
/// Current USB profile
pub const CMD_UUSBCONF_QUERY: &str = "+UUSBCONF?";
/// Router / bridge networking mode
pub const CMD_UBMCONF_QUERY: &str = "+UBMCONF?";
/// Prefix of the per-context IP configuration query
pub const CMD_UIPADDR_PREFIX: &str = "+UIPADDR=";
/// Functionality level
pub const CMD_CFUN_QUERY: &str = "+CFUN?";
/// Full functionality
pub const CMD_CFUN_FULL: &str = "+CFUN=1";
/// Supported radio access technology combinations
pub const CMD_URAT_TEST: &str = "+URAT=?";
/// Current radio access technology selection
pub const CMD_URAT_QUERY: &str = "+URAT?";
/// Prefix of the radio access technology set command
pub const CMD_URAT_SET_PREFIX: &str = "+URAT=";

// ============================================================================
// +UUSBCONF profile names
// ============================================================================

pub const USB_PROFILE_RNDIS: &str = "RNDIS";
pub const USB_PROFILE_ECM: &str = "ECM";

// ============================================================================
// +UBMCONF mode ids
// ============================================================================

pub const NETWORKING_MODE_ROUTER: u32 = 1;
pub const NETWORKING_MODE_BRIDGE: u32 = 2;

// ============================================================================
// +CFUN functionality levels
// ============================================================================

/// Full functionality
pub const CFUN_FULL: u32 = 1;
/// Minimum functionality
pub const CFUN_MINIMUM: u32 = 0;
/// Airplane mode
pub const CFUN_AIRPLANE: u32 = 4;
/// Minimum functionality with the SIM deactivated
pub const CFUN_MINIMUM_SIM_OFF: u32 = 19;

// ============================================================================
// Per-model technology restrictions
// ============================================================================

/// TOBY-L2 / MPCI-L2 variants without 2G.
pub const MODELS_WITHOUT_2G: &[&str] = &["TOBY-L201", "TOBY-L220", "MPCI-L201"];

/// Model prefixes of the 3G-only families (no 4G).
pub const MODEL_PREFIXES_WITHOUT_4G: &[&str] = &["LISA-U", "SARA-U"];

/// SARA-U variants that additionally lack 2G.
pub const SARA_U_MODELS_WITHOUT_2G: &[&str] = &["SARA-U270-53S", "SARA-U280"];
