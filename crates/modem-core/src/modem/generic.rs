//! Text-protocol modem base.
//!
//! The legacy path of a binary-protocol modem: initialization reads the
//! functionality level over the AT port, enabling switches it to full power.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use tracing::{debug, info};

use super::capabilities::Capabilities;
use super::traits::ModemBase;
use crate::port::AtPort;
use crate::protocol::PowerState;
use crate::protocol::constants::CMD_CFUN_FULL;

pub struct AtModemBase<A: AtPort> {
    port: Arc<A>,
}

impl<A: AtPort> AtModemBase<A> {
    pub fn new(port: Arc<A>) -> Self {
        Self { port }
    }

    pub fn port(&self) -> &Arc<A> {
        &self.port
    }
}

#[async_trait]
impl<A: AtPort + 'static> ModemBase for AtModemBase<A> {
    type InitContext = PowerState;

    async fn initialization_started(&self) -> Result<PowerState> {
        let power = Capabilities::new(self.port.as_ref())
            .load_power_state()
            .await
            .with_context(|| format!("failed to query power state on {}", self.port.name()))?;
        debug!(port = %self.port.name(), power = ?power, "Legacy initialization done");
        Ok(power)
    }

    async fn enabling_started(&self) -> Result<()> {
        self.port
            .command(CMD_CFUN_FULL)
            .await
            .with_context(|| format!("failed to power up through {}", self.port.name()))?;
        info!(port = %self.port.name(), "Radio powered up");
        Ok(())
    }
}
