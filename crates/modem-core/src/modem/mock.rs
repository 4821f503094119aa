//! Mock modem base for testing.

use std::sync::{Arc, Mutex};

use anyhow::{Result, bail};
use async_trait::async_trait;

use super::traits::ModemBase;

/// Scripted generic modem base that records how often it was asked to work.
#[derive(Clone, Default)]
pub struct MockModemBase {
    fail_init: Arc<Mutex<Option<String>>>,
    fail_enable: Arc<Mutex<Option<String>>>,
    init_calls: Arc<Mutex<usize>>,
    enable_calls: Arc<Mutex<usize>>,
}

impl MockModemBase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make initialization fail with `message`.
    pub fn fail_initialization(&self, message: &str) {
        *self.fail_init.lock().unwrap() = Some(message.to_string());
    }

    /// Make enabling fail with `message`.
    pub fn fail_enabling(&self, message: &str) {
        *self.fail_enable.lock().unwrap() = Some(message.to_string());
    }

    pub fn init_calls(&self) -> usize {
        *self.init_calls.lock().unwrap()
    }

    pub fn enable_calls(&self) -> usize {
        *self.enable_calls.lock().unwrap()
    }
}

#[async_trait]
impl ModemBase for MockModemBase {
    /// Number of the initialization call that produced it.
    type InitContext = usize;

    async fn initialization_started(&self) -> Result<usize> {
        let call = {
            let mut calls = self.init_calls.lock().unwrap();
            *calls += 1;
            *calls
        };
        if let Some(message) = self.fail_init.lock().unwrap().clone() {
            bail!(message);
        }
        Ok(call)
    }

    async fn enabling_started(&self) -> Result<()> {
        *self.enable_calls.lock().unwrap() += 1;
        if let Some(message) = self.fail_enable.lock().unwrap().clone() {
            bail!(message);
        }
        Ok(())
    }
}
