//! Modem session - dry-run orchestrator for a full bring-up.
//!
//! Builds a modem against scripted ports described by [`SessionConfig`],
//! initializes and enables it, then discovers its radio capabilities.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

use crate::events::{ModemObserver, TracingObserver};
use crate::modem::{AtModemBase, BinaryModem, Capabilities, ModemIdentity};
use crate::modes::RadioCombination;
use crate::port::{MockAtPort, MockBinaryPort};
use crate::protocol::PowerState;
use crate::protocol::constants::*;
use crate::state::BringUpState;

/// Scripted peer used by the dry run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// The binary port node is gone.
    pub port_missing: bool,
    /// Opening the binary port fails with this message.
    pub open_error: Option<String>,
    /// Opening the binary port never completes.
    pub open_hangs: bool,
    /// Legacy initialization fails with this device error.
    pub legacy_init_error: Option<String>,
    /// Legacy enabling fails with this device error.
    pub legacy_enable_error: Option<String>,
    /// AT command -> reply.
    pub replies: BTreeMap<String, String>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let replies = [
            (CMD_CFUN_QUERY, "+CFUN: 4"),
            (CMD_CFUN_FULL, ""),
            (CMD_URAT_TEST, "+URAT: (0-6),(0,2,3)"),
            (CMD_URAT_QUERY, "+URAT: 4,3"),
            (CMD_UPINCNT, "+UPINCNT: 3,3,10,10"),
            (CMD_UUSBCONF_QUERY, "+UUSBCONF: 3,\"RNDIS\",,\"0x1146\""),
            (CMD_UBMCONF_QUERY, "+UBMCONF: 1"),
        ]
        .into_iter()
        .map(|(command, reply)| (command.to_string(), reply.to_string()))
        .collect();

        Self {
            port_missing: false,
            open_error: None,
            open_hangs: false,
            legacy_init_error: None,
            legacy_enable_error: None,
            replies,
        }
    }
}

/// Configuration for a modem session.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Physical device path.
    pub device: String,
    pub plugin: String,
    /// Model name used for capability filtering.
    pub model: Option<String>,
    pub vendor_id: u16,
    pub product_id: u16,
    pub drivers: Vec<String>,
    /// Binary management port, e.g. `cdc-wdm0`.
    pub binary_port: String,
    /// Optional text port, e.g. `ttyACM0`.
    pub text_port: Option<String>,
    /// Give up on the binary port open after this long.
    pub open_timeout_ms: u64,
    pub simulation: SimulationConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            device: "/sys/devices/platform/usb1/1-1".into(),
            plugin: "u-blox".into(),
            model: None,
            vendor_id: UBLOX_VENDOR_ID,
            product_id: TOBY_L2_RNDIS_PID,
            drivers: vec!["cdc_mbim".into(), "cdc_acm".into()],
            binary_port: "cdc-wdm0".into(),
            text_port: Some("ttyACM0".into()),
            open_timeout_ms: 5000,
            simulation: SimulationConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SessionConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn identity(&self) -> ModemIdentity {
        ModemIdentity {
            device: self.device.clone(),
            drivers: self.drivers.clone(),
            plugin: self.plugin.clone(),
            vendor_id: self.vendor_id,
            product_id: self.product_id,
            model: self.model.clone(),
        }
    }
}

/// What a session found out.
#[derive(Debug, Clone, Default)]
pub struct SessionReport {
    pub state: BringUpState,
    /// Power state read by the legacy initialization.
    pub power_state: Option<PowerState>,
    /// Non-fatal problems, in the order they happened.
    pub diagnostics: Vec<String>,
    pub supported_modes: Vec<RadioCombination>,
    pub current_modes: Option<RadioCombination>,
    /// Binary port the SIM is reachable through.
    pub sim_port: Option<String>,
}

/// Modem session - orchestrates a complete bring-up.
pub struct ModemSession<O: ModemObserver> {
    config: SessionConfig,
    observer: Arc<O>,
}

impl ModemSession<TracingObserver> {
    /// Create a new session with default tracing observer.
    pub fn new(config: SessionConfig) -> Self {
        Self::with_observer(config, Arc::new(TracingObserver))
    }
}

impl<O: ModemObserver + 'static> ModemSession<O> {
    /// Create a new session with a custom observer.
    pub fn with_observer(config: SessionConfig, observer: Arc<O>) -> Self {
        Self { config, observer }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    fn build_text_port(&self) -> Arc<MockAtPort> {
        let sim = &self.config.simulation;
        let name = self.config.text_port.as_deref().unwrap_or("ttyACM0");
        let port = MockAtPort::new(name);
        for (command, reply) in &sim.replies {
            port.set_reply(command, reply);
        }
        if let Some(error) = &sim.legacy_init_error {
            port.set_error(CMD_CFUN_QUERY, error);
        }
        if let Some(error) = &sim.legacy_enable_error {
            port.set_error(CMD_CFUN_FULL, error);
        }
        if self.config.text_port.is_none() {
            port.disconnect();
        }
        Arc::new(port)
    }

    fn build_binary_port(&self) -> Option<Arc<MockBinaryPort>> {
        let sim = &self.config.simulation;
        if sim.port_missing {
            return None;
        }
        let mut port = MockBinaryPort::new(self.config.binary_port.clone());
        if sim.open_hangs {
            // Never notified
            port = port.with_open_gate(Arc::new(Notify::new()));
        }
        if let Some(message) = &sim.open_error {
            port.queue_open_failure(message);
        }
        Some(Arc::new(port))
    }

    /// Run the complete session.
    #[instrument(skip(self), fields(device = %self.config.device))]
    pub async fn run(&self) -> Result<SessionReport> {
        let text_port = self.build_text_port();
        let modem = BinaryModem::new(
            self.config.identity(),
            AtModemBase::new(text_port.clone()),
            self.build_binary_port(),
            self.observer.clone(),
        );

        let mut report = SessionReport::default();

        let cancel = CancellationToken::new();
        let timeout = Duration::from_millis(self.config.open_timeout_ms);
        let attempt = modem.initialization_started(&cancel);
        tokio::pin!(attempt);
        let initialized = tokio::select! {
            result = &mut attempt => result,
            _ = tokio::time::sleep(timeout) => {
                warn!(timeout_ms = self.config.open_timeout_ms, "Bring-up timed out, cancelling");
                cancel.cancel();
                attempt.await
            }
        };
        let outcome = initialized.context("modem initialization failed")?;
        report.power_state = outcome.parent_context;
        report
            .diagnostics
            .extend(outcome.diagnostics.iter().map(ToString::to_string));

        let diagnostics = modem
            .enabling_started()
            .await
            .context("modem enabling failed")?;
        report
            .diagnostics
            .extend(diagnostics.iter().map(ToString::to_string));

        let caps = Capabilities::new(text_port.as_ref()).with_model(self.config.model.as_deref());
        match caps.load_supported_modes().await {
            Ok(modes) => report.supported_modes = modes,
            Err(e) => {
                warn!(error = %e, "Could not load supported modes");
                report.diagnostics.push(format!("supported modes: {e}"));
            }
        }
        match caps.load_current_modes().await {
            Ok(current) => report.current_modes = Some(current),
            Err(e) => {
                warn!(error = %e, "Could not load current modes");
                report.diagnostics.push(format!("current modes: {e}"));
            }
        }

        let sim = modem.create_sim().await.context("SIM creation failed")?;
        report.sim_port = Some(sim.port);
        report.state = modem.state();

        info!(
            state = %report.state,
            supported = report.supported_modes.len(),
            diagnostics = report.diagnostics.len(),
            "Session complete"
        );
        Ok(report)
    }
}
