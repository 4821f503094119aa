//! Reply parsers for the u-blox AT command set.
//!
//! Every parser takes the full reply text and is pure. Field order is fixed
//! per command; optional fields come back as `None`.

use std::sync::LazyLock;

use regex::{Captures, Regex};
use tracing::debug;

use super::constants::*;
use super::error::ParseError;
use super::helpers::{parse_uint_list, split_groups, strip_tag, unquote};
use crate::modes::{CapabilityError, RadioCombination, build_combinations, mode_for_code};

/// PIN / PUK retry counters from `+UPINCNT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PinRetryCounts {
    pub pin: u32,
    pub pin2: u32,
    pub puk: u32,
    pub puk2: u32,
}

/// USB profile reported by `+UUSBCONF?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsbProfile {
    /// No networking function; the default profile on older firmware.
    BackCompatible,
    Rndis,
    Ecm,
}

/// Networking mode reported by `+UBMCONF?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkingMode {
    Router,
    Bridge,
}

/// Power state derived from `+CFUN?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerState {
    On,
    /// Minimum functionality, airplane mode, or minimum functionality with
    /// the SIM deactivated.
    Low,
}

/// Which `+UIPADDR` fields the caller wants.
///
/// Requested `cid` and `if_name` are mandatory; the addresses are optional
/// even when requested.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IpConfigQuery {
    pub cid: bool,
    pub if_name: bool,
    pub ipv4_address: bool,
    pub ipv4_subnet: bool,
    pub ipv6_global_address: bool,
    pub ipv6_link_local_address: bool,
}

impl IpConfigQuery {
    pub fn all() -> Self {
        Self {
            cid: true,
            if_name: true,
            ipv4_address: true,
            ipv4_subnet: true,
            ipv6_global_address: true,
            ipv6_link_local_address: true,
        }
    }
}

/// IP configuration of one context from `+UIPADDR=<cid>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpConfig {
    pub cid: Option<u32>,
    pub if_name: Option<String>,
    pub ipv4_address: Option<String>,
    pub ipv4_subnet: Option<String>,
    pub ipv6_global_address: Option<String>,
    pub ipv6_link_local_address: Option<String>,
}

fn uint_group(caps: &Captures<'_>, idx: usize) -> Option<u32> {
    caps.get(idx).and_then(|m| m.as_str().trim().parse().ok())
}

fn string_group(caps: &Captures<'_>, idx: usize) -> Option<String> {
    caps.get(idx)
        .and_then(|m| unquote(m.as_str()))
        .map(str::to_string)
}

/// Parse `+UPINCNT: <pin>,<pin2>,<puk>,<puk2>`.
pub fn parse_upincnt_response(reply: &str) -> Result<PinRetryCounts, ParseError> {
    static RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\+UPINCNT:([^,\r\n]*)(?:,([^,\r\n]*))?(?:,([^,\r\n]*))?(?:,([^,\r\n]*))?")
            .unwrap()
    });

    let caps = RE
        .captures(reply)
        .ok_or_else(|| ParseError::malformed(CMD_UPINCNT, reply))?;

    let field = |idx, name| uint_group(&caps, idx).ok_or(ParseError::missing(CMD_UPINCNT, name));

    Ok(PinRetryCounts {
        pin: field(1, "PIN attempts")?,
        pin2: field(2, "PIN2 attempts")?,
        puk: field(3, "PUK attempts")?,
        puk2: field(4, "PUK2 attempts")?,
    })
}

/// Parse `+UUSBCONF: <id>,"<name>",<ignored>,"<pid>"`.
///
/// The PID is not used; future modules may change it and keep the names.
pub fn parse_uusbconf_response(reply: &str) -> Result<UsbProfile, ParseError> {
    static RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\+UUSBCONF:\s*(\d+),([^,\r\n]*),([^,\r\n]*),([^,\r\n]*)").unwrap()
    });

    let caps = RE
        .captures(reply)
        .ok_or_else(|| ParseError::malformed(CMD_UUSBCONF_QUERY, reply))?;

    match caps.get(2).and_then(|m| unquote(m.as_str())) {
        None => Ok(UsbProfile::BackCompatible),
        Some(USB_PROFILE_RNDIS) => Ok(UsbProfile::Rndis),
        Some(USB_PROFILE_ECM) => Ok(UsbProfile::Ecm),
        Some(other) => Err(ParseError::unsupported(
            CMD_UUSBCONF_QUERY,
            "USB profile",
            other,
        )),
    }
}

/// Parse `+UBMCONF: <id>`.
pub fn parse_ubmconf_response(reply: &str) -> Result<NetworkingMode, ParseError> {
    static RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\+UBMCONF:\s*(\d+)").unwrap());

    let caps = RE
        .captures(reply)
        .ok_or_else(|| ParseError::malformed(CMD_UBMCONF_QUERY, reply))?;
    let mode_id =
        uint_group(&caps, 1).ok_or(ParseError::missing(CMD_UBMCONF_QUERY, "mode id"))?;

    match mode_id {
        NETWORKING_MODE_ROUTER => Ok(NetworkingMode::Router),
        NETWORKING_MODE_BRIDGE => Ok(NetworkingMode::Bridge),
        other => Err(ParseError::unsupported(CMD_UBMCONF_QUERY, "mode id", other)),
    }
}

/// Parse a single `+UIPADDR` line.
///
/// The query is issued for one cid, so only the first line is looked at.
pub fn parse_uipaddr_response(reply: &str, query: IpConfigQuery) -> Result<IpConfig, ParseError> {
    static RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(
            r"\+UIPADDR:\s*([^,\r\n]*),([^,\r\n]*),([^,\r\n]*),([^,\r\n]*),([^,\r\n]*),([^,\r\n]*)",
        )
        .unwrap()
    });

    let caps = RE
        .captures(reply)
        .ok_or_else(|| ParseError::malformed(CMD_UIPADDR_PREFIX, reply))?;

    let mut config = IpConfig::default();

    if query.cid {
        config.cid = Some(
            uint_group(&caps, 1).ok_or(ParseError::missing(CMD_UIPADDR_PREFIX, "cid"))?,
        );
    }
    if query.if_name {
        config.if_name = Some(
            string_group(&caps, 2)
                .ok_or(ParseError::missing(CMD_UIPADDR_PREFIX, "interface name"))?,
        );
    }
    if query.ipv4_address {
        config.ipv4_address = string_group(&caps, 3);
    }
    if query.ipv4_subnet {
        config.ipv4_subnet = string_group(&caps, 4);
    }
    if query.ipv6_global_address {
        config.ipv6_global_address = string_group(&caps, 5);
    }
    if query.ipv6_link_local_address {
        config.ipv6_link_local_address = string_group(&caps, 6);
    }

    Ok(config)
}

/// Parse `+CFUN: <state>[,<ignored>]`.
pub fn parse_cfun_response(reply: &str) -> Result<PowerState, ParseError> {
    static RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\+CFUN:\s*(\d+)(?:,\d+)?").unwrap());

    let caps = RE
        .captures(reply)
        .ok_or_else(|| ParseError::malformed(CMD_CFUN_QUERY, reply))?;
    let value = uint_group(&caps, 1).ok_or(ParseError::missing(CMD_CFUN_QUERY, "power state"))?;

    match value {
        CFUN_FULL => Ok(PowerState::On),
        CFUN_MINIMUM | CFUN_AIRPLANE | CFUN_MINIMUM_SIM_OFF => Ok(PowerState::Low),
        _ => Err(ParseError::malformed(CMD_CFUN_QUERY, reply)),
    }
}

/// Parse `+URAT: (<selected>),(<preferred>)` into radio combinations.
///
/// Both groups accept ranges and lists. The preferred group may be empty or
/// missing.
pub fn parse_urat_test_response(reply: &str) -> Result<Vec<RadioCombination>, CapabilityError> {
    let body = strip_tag(reply, TAG_URAT)
        .and_then(|body| body.lines().next())
        .ok_or_else(|| ParseError::malformed(CMD_URAT_TEST, reply))?;

    let groups = split_groups(CMD_URAT_TEST, body)?;
    if groups.is_empty() || groups.len() > 2 {
        return Err(ParseError::malformed(CMD_URAT_TEST, reply).into());
    }

    let selected = parse_uint_list(CMD_URAT_TEST, groups[0])?;
    if selected.is_empty() {
        return Err(ParseError::missing(CMD_URAT_TEST, "selected AcT list").into());
    }

    let preferred = match groups.get(1) {
        Some(group) => parse_uint_list(CMD_URAT_TEST, group)?,
        None => Vec::new(),
    };

    build_combinations(&selected, &preferred)
}

/// Parse `+URAT: <selected>[,<preferred>]`.
pub fn parse_urat_read_response(reply: &str) -> Result<RadioCombination, ParseError> {
    static RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\+URAT:\s*(\d+)(?:,\s*(\d+))?").unwrap());

    let caps = RE
        .captures(reply)
        .ok_or_else(|| ParseError::malformed(CMD_URAT_QUERY, reply))?;

    let selected =
        uint_group(&caps, 1).ok_or(ParseError::missing(CMD_URAT_QUERY, "AcT selected value"))?;
    let allowed = mode_for_code(selected)
        .ok_or_else(|| ParseError::unsupported(CMD_URAT_QUERY, "AcT selected value", selected))?;
    debug!(allowed = %allowed, "Current allowed modes retrieved");

    let Some(m) = caps.get(2) else {
        return RadioCombination::new(allowed)
            .ok_or_else(|| ParseError::malformed(CMD_URAT_QUERY, reply));
    };

    let preferred_code: u32 = m
        .as_str()
        .parse()
        .map_err(|_| ParseError::missing(CMD_URAT_QUERY, "AcT preferred value"))?;
    let preferred = mode_for_code(preferred_code).ok_or_else(|| {
        ParseError::unsupported(CMD_URAT_QUERY, "AcT preferred value", preferred_code)
    })?;
    debug!(preferred = %preferred, "Current preferred modes retrieved");

    if !preferred.is_single() {
        return Err(ParseError::InconsistentValue {
            command: CMD_URAT_QUERY,
            reason: format!("AcT preferred value should be a single AcT: {preferred}"),
        });
    }

    RadioCombination::with_preferred(allowed, preferred).ok_or_else(|| {
        ParseError::InconsistentValue {
            command: CMD_URAT_QUERY,
            reason: format!(
                "AcT preferred value ({preferred}) not a subset of the allowed value ({allowed})"
            ),
        }
    })
}
