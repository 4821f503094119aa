//! Binary-protocol (MBIM) modem bring-up.
//!
//! The binary port is mandatory: failing to acquire or open it ends the
//! attempt. The generic modem base is best-effort: its failures are recorded
//! as diagnostics and bring-up carries on.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::identity::ModemIdentity;
use super::objects::{BearerProperties, MbimBearer, MbimSim};
use super::traits::ModemBase;
use crate::events::{LogLevel, ModemEvent, ModemObserver};
use crate::port::{BinaryPort, PortError};
use crate::state::{BringUpContext, BringUpError, BringUpState, FailureReason, LegacyStep};

/// Result of a successful initialization.
#[derive(Debug)]
pub struct InitializationOutcome<C> {
    /// What the generic base returned; `None` when its step failed.
    pub parent_context: Option<C>,
    /// Non-fatal failures met on the way.
    pub diagnostics: Vec<BringUpError>,
}

/// Resets the in-progress flag however the attempt ends.
struct AttemptGuard<'a>(&'a AtomicBool);

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Modem driven over a binary management port. Any text port belongs to the
/// generic base.
pub struct BinaryModem<P: ModemBase, B: BinaryPort, O: ModemObserver> {
    identity: ModemIdentity,
    parent: P,
    binary_port: Mutex<Option<Arc<B>>>,
    state: Mutex<BringUpState>,
    in_progress: AtomicBool,
    opened_by_us: AtomicBool,
    observer: Arc<O>,
}

impl<P: ModemBase, B: BinaryPort, O: ModemObserver> BinaryModem<P, B, O> {
    pub fn new(
        identity: ModemIdentity,
        parent: P,
        binary_port: Option<Arc<B>>,
        observer: Arc<O>,
    ) -> Self {
        Self {
            identity,
            parent,
            binary_port: Mutex::new(binary_port),
            state: Mutex::new(BringUpState::Idle),
            in_progress: AtomicBool::new(false),
            opened_by_us: AtomicBool::new(false),
            observer,
        }
    }

    pub fn identity(&self) -> &ModemIdentity {
        &self.identity
    }

    pub fn parent(&self) -> &P {
        &self.parent
    }

    pub fn state(&self) -> BringUpState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn binary_port(&self) -> Option<Arc<B>> {
        self.binary_port
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Drop our handle on the binary port, as when the device node vanishes.
    pub fn release_binary_port(&self) -> Option<Arc<B>> {
        self.binary_port
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }

    fn begin_attempt(&self) -> Result<AttemptGuard<'_>, BringUpError> {
        if self
            .in_progress
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(BringUpError::InProgress {
                state: self.state(),
            });
        }
        Ok(AttemptGuard(&self.in_progress))
    }

    fn close_binary_port(&self, port: &B) {
        match port.close() {
            Ok(()) => {
                self.opened_by_us.store(false, Ordering::Release);
                self.observer.on_event(&ModemEvent::PortClosed {
                    port: port.name().to_string(),
                });
            }
            Err(e) => debug!(port = %port.name(), error = %e, "Ignoring close failure"),
        }
    }

    /// Bring the modem from `Idle` to `Ready`.
    ///
    /// Fails with `PortMissing` when there is no binary port, with the
    /// transport error when opening it fails and with `Cancelled` when
    /// `cancel` fires while the open is pending.
    #[instrument(skip_all, fields(device = %self.identity.device))]
    pub async fn initialization_started(
        &self,
        cancel: &CancellationToken,
    ) -> Result<InitializationOutcome<P::InitContext>, BringUpError> {
        let _attempt = self.begin_attempt()?;
        let mut ctx = BringUpContext::new(&self.state, self.observer.as_ref());

        let Some(port) = self.binary_port() else {
            return Err(ctx.fail(FailureReason::PortMissing, BringUpError::PortMissing));
        };
        ctx.goto_state(BringUpState::PortAcquired);

        if port.is_open() {
            ctx.emit(ModemEvent::Log {
                level: LogLevel::Debug,
                message: format!("Binary port {} already open", port.name()),
            });
        } else {
            ctx.goto_state(BringUpState::BinaryPortOpening);

            let opened = tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(BringUpError::Cancelled),
                result = port.open() => result.map_err(BringUpError::from),
            };

            match opened {
                Ok(()) => {
                    self.opened_by_us.store(true, Ordering::Release);
                    ctx.emit(ModemEvent::PortOpened {
                        port: port.name().to_string(),
                    });
                }
                Err(BringUpError::Cancelled) => {
                    // The abandoned open may already have opened the node;
                    // Drop retries if this close fails
                    if port.is_open() {
                        self.opened_by_us.store(true, Ordering::Release);
                        self.close_binary_port(&port);
                    }
                    return Err(ctx.fail(FailureReason::Cancelled, BringUpError::Cancelled));
                }
                Err(e) => return Err(ctx.fail(FailureReason::PortOpenFailed, e)),
            }

            if cancel.is_cancelled() {
                self.close_binary_port(&port);
                return Err(ctx.fail(FailureReason::Cancelled, BringUpError::Cancelled));
            }
        }
        ctx.goto_state(BringUpState::BinaryPortOpen);

        ctx.goto_state(BringUpState::ParentInitDelegated);
        let parent_context = ctx
            .attempt_non_fatal(LegacyStep::Initialization, self.parent.initialization_started())
            .await;
        ctx.goto_state(BringUpState::LegacyInitAttempted);

        ctx.goto_state(BringUpState::Ready);
        ctx.emit(ModemEvent::Complete);

        Ok(InitializationOutcome {
            parent_context,
            diagnostics: ctx.into_diagnostics(),
        })
    }

    /// Enable a `Ready` modem. Returns the non-fatal diagnostics.
    #[instrument(skip_all, fields(device = %self.identity.device))]
    pub async fn enabling_started(&self) -> Result<Vec<BringUpError>, BringUpError> {
        let _attempt = self.begin_attempt()?;
        let mut ctx = BringUpContext::new(&self.state, self.observer.as_ref());

        let state = ctx.state();
        if state != BringUpState::Ready {
            return Err(BringUpError::NotReady { state });
        }
        if self.binary_port().is_none() {
            return Err(ctx.fail(FailureReason::PortMissing, BringUpError::PortMissing));
        }

        ctx.goto_state(BringUpState::Enabling);
        ctx.attempt_non_fatal(LegacyStep::Enabling, self.parent.enabling_started())
            .await;
        ctx.goto_state(BringUpState::Ready);
        ctx.emit(ModemEvent::Complete);

        Ok(ctx.into_diagnostics())
    }

    /// Create a data bearer for this modem.
    pub fn create_bearer(&self, properties: BearerProperties) -> MbimBearer {
        debug!(device = %self.identity.device, apn = ?properties.apn, "Creating bearer");
        MbimBearer {
            device: self.identity.device.clone(),
            properties,
        }
    }

    /// Create the SIM object, which needs an open binary port.
    pub async fn create_sim(&self) -> Result<MbimSim, BringUpError> {
        let port = self.binary_port().ok_or(BringUpError::PortMissing)?;
        if !port.is_open() {
            return Err(PortError::NotOpen(port.name().to_string()).into());
        }
        debug!(port = %port.name(), "Creating SIM");
        Ok(MbimSim {
            device: self.identity.device.clone(),
            port: port.name().to_string(),
        })
    }
}

impl<P, B, O> BinaryModem<P, B, O>
where
    P: ModemBase + 'static,
    B: BinaryPort + 'static,
    O: ModemObserver + 'static,
{
    /// Run initialization on a task; `on_complete` is called exactly once.
    pub fn spawn_initialization<F>(
        self: &Arc<Self>,
        cancel: CancellationToken,
        on_complete: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(Result<InitializationOutcome<P::InitContext>, BringUpError>) + Send + 'static,
    {
        let modem = Arc::clone(self);
        tokio::spawn(async move {
            let result = modem.initialization_started(&cancel).await;
            on_complete(result);
        })
    }
}

impl<P: ModemBase, B: BinaryPort, O: ModemObserver> Drop for BinaryModem<P, B, O> {
    fn drop(&mut self) {
        if !*self.opened_by_us.get_mut() {
            return;
        }
        let port = self
            .binary_port
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(port) = port {
            if port.is_open() {
                self.close_binary_port(&port);
            }
        }
    }
}
