//! Protocol module - u-blox AT reply parsing and command building.

pub mod command;
pub mod constants;
pub mod error;
pub mod helpers;
pub mod parser;

pub use command::{build_set_current_modes_command, build_uipaddr_query, build_urat_set_command};
pub use error::ParseError;
pub use parser::{
    IpConfig, IpConfigQuery, NetworkingMode, PinRetryCounts, PowerState, UsbProfile,
    parse_cfun_response, parse_ubmconf_response, parse_uipaddr_response, parse_upincnt_response,
    parse_urat_read_response, parse_urat_test_response, parse_uusbconf_response,
};
