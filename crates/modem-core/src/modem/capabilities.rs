//! AT exchange helpers: send one query over the text port and parse the reply.

use thiserror::Error;
use tracing::{debug, instrument};

use crate::modes::{CapabilityError, ModeRequest, ModeSet, RadioCombination, load_supported_modes};
use crate::port::{AtPort, PortError};
use crate::protocol::constants::*;
use crate::protocol::{
    IpConfig, IpConfigQuery, NetworkingMode, ParseError, PinRetryCounts, PowerState, UsbProfile,
    build_uipaddr_query, build_urat_set_command, parse_cfun_response, parse_ubmconf_response,
    parse_uipaddr_response, parse_upincnt_response, parse_urat_read_response,
    parse_uusbconf_response,
};

#[derive(Error, Debug)]
pub enum CommandError {
    #[error(transparent)]
    Port(#[from] PortError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Capability(#[from] CapabilityError),
}

/// Capability queries over a text port.
pub struct Capabilities<'a, A: AtPort + ?Sized> {
    port: &'a A,
    model: Option<&'a str>,
}

impl<'a, A: AtPort + ?Sized> Capabilities<'a, A> {
    pub fn new(port: &'a A) -> Self {
        Self { port, model: None }
    }

    /// Model used to restrict the supported modes.
    pub fn with_model(mut self, model: Option<&'a str>) -> Self {
        self.model = model;
        self
    }

    async fn query(&self, command: &str) -> Result<String, CommandError> {
        let reply = self.port.command(command).await?;
        debug!(port = %self.port.name(), command = %command, reply = %reply.trim(), "AT exchange");
        Ok(reply)
    }

    pub async fn load_unlock_retries(&self) -> Result<PinRetryCounts, CommandError> {
        let reply = self.query(CMD_UPINCNT).await?;
        Ok(parse_upincnt_response(&reply)?)
    }

    pub async fn load_usb_profile(&self) -> Result<UsbProfile, CommandError> {
        let reply = self.query(CMD_UUSBCONF_QUERY).await?;
        Ok(parse_uusbconf_response(&reply)?)
    }

    pub async fn load_networking_mode(&self) -> Result<NetworkingMode, CommandError> {
        let reply = self.query(CMD_UBMCONF_QUERY).await?;
        Ok(parse_ubmconf_response(&reply)?)
    }

    pub async fn load_ip_config(
        &self,
        cid: u32,
        query: IpConfigQuery,
    ) -> Result<IpConfig, CommandError> {
        let reply = self.query(&build_uipaddr_query(cid)).await?;
        Ok(parse_uipaddr_response(&reply, query)?)
    }

    pub async fn load_power_state(&self) -> Result<PowerState, CommandError> {
        let reply = self.query(CMD_CFUN_QUERY).await?;
        Ok(parse_cfun_response(&reply)?)
    }

    /// Supported combinations, already restricted to the model.
    #[instrument(level = "debug", skip(self), fields(model = ?self.model))]
    pub async fn load_supported_modes(&self) -> Result<Vec<RadioCombination>, CommandError> {
        let reply = self.query(CMD_URAT_TEST).await?;
        Ok(load_supported_modes(self.model, &reply)?)
    }

    pub async fn load_current_modes(&self) -> Result<RadioCombination, CommandError> {
        let reply = self.query(CMD_URAT_QUERY).await?;
        Ok(parse_urat_read_response(&reply)?)
    }

    /// Resolve `request` against `combinations`, send `+URAT=` and return
    /// what was applied.
    pub async fn set_current_modes(
        &self,
        combinations: &[RadioCombination],
        request: ModeRequest,
    ) -> Result<(ModeSet, ModeSet), CommandError> {
        let (allowed, preferred) = request.resolve(combinations)?;
        let command = build_urat_set_command(allowed, preferred)?;
        self.query(&command).await?;
        Ok((allowed, preferred))
    }
}
