//! Mock ports for testing.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::traits::{AtPort, BinaryPort, PortError};

/// Mock binary port for bring-up state machine tests.
pub struct MockBinaryPort {
    name: String,
    /// Whether the port is "open".
    open: Arc<Mutex<bool>>,
    /// Queued results for `open()`; empty means success.
    open_results: Arc<Mutex<VecDeque<Result<(), PortError>>>>,
    /// When set, `open()` waits for a notification before completing.
    open_gate: Option<Arc<Notify>>,
    open_calls: Arc<Mutex<usize>>,
    close_calls: Arc<Mutex<usize>>,
    fail_close: Arc<Mutex<bool>>,
}

impl MockBinaryPort {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            open: Arc::new(Mutex::new(false)),
            open_results: Arc::new(Mutex::new(VecDeque::new())),
            open_gate: None,
            open_calls: Arc::new(Mutex::new(0)),
            close_calls: Arc::new(Mutex::new(0)),
            fail_close: Arc::new(Mutex::new(false)),
        }
    }

    /// Hold every `open()` until `gate` is notified.
    pub fn with_open_gate(mut self, gate: Arc<Notify>) -> Self {
        self.open_gate = Some(gate);
        self
    }

    /// Queue a result to be returned by the next `open()`.
    pub fn queue_open_result(&self, result: Result<(), PortError>) {
        self.open_results.lock().unwrap().push_back(result);
    }

    /// Queue an open failure carrying `message`.
    pub fn queue_open_failure(&self, message: &str) {
        self.queue_open_result(Err(PortError::OpenFailed {
            port: self.name.clone(),
            message: message.to_string(),
        }));
    }

    /// Mark the port as already open (opened by someone else).
    pub fn set_open(&self, open: bool) {
        *self.open.lock().unwrap() = open;
    }

    /// Make subsequent `close()` calls fail.
    pub fn fail_close(&self) {
        *self.fail_close.lock().unwrap() = true;
    }

    pub fn open_calls(&self) -> usize {
        *self.open_calls.lock().unwrap()
    }

    pub fn close_calls(&self) -> usize {
        *self.close_calls.lock().unwrap()
    }
}

#[async_trait]
impl BinaryPort for MockBinaryPort {
    fn name(&self) -> &str {
        &self.name
    }

    fn is_open(&self) -> bool {
        *self.open.lock().unwrap()
    }

    async fn open(&self) -> Result<(), PortError> {
        *self.open_calls.lock().unwrap() += 1;

        // Gated opens behave like a device node that is already open while
        // the open handshake is still pending.
        if let Some(gate) = &self.open_gate {
            *self.open.lock().unwrap() = true;
            gate.notified().await;
        }

        let result = self
            .open_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(()));
        *self.open.lock().unwrap() = result.is_ok();
        result
    }

    fn close(&self) -> Result<(), PortError> {
        *self.close_calls.lock().unwrap() += 1;
        if *self.fail_close.lock().unwrap() {
            return Err(PortError::CloseFailed {
                port: self.name.clone(),
                message: "device busy".into(),
            });
        }
        *self.open.lock().unwrap() = false;
        Ok(())
    }
}

/// Mock text port answering from a script keyed by command.
pub struct MockAtPort {
    name: String,
    /// Scripted replies; `Err` holds the error text the device answers with.
    replies: Arc<Mutex<HashMap<String, Result<String, String>>>>,
    /// Captured commands.
    sent: Arc<Mutex<Vec<String>>>,
    connected: Arc<Mutex<bool>>,
}

impl MockAtPort {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            replies: Arc::new(Mutex::new(HashMap::new())),
            sent: Arc::new(Mutex::new(Vec::new())),
            connected: Arc::new(Mutex::new(true)),
        }
    }

    pub fn set_reply(&self, command: &str, reply: &str) {
        self.replies
            .lock()
            .unwrap()
            .insert(command.to_string(), Ok(reply.to_string()));
    }

    pub fn set_error(&self, command: &str, error: &str) {
        self.replies
            .lock()
            .unwrap()
            .insert(command.to_string(), Err(error.to_string()));
    }

    /// Get all captured commands.
    pub fn sent_commands(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }

    /// Simulate the port going away.
    pub fn disconnect(&self) {
        *self.connected.lock().unwrap() = false;
    }
}

#[async_trait]
impl AtPort for MockAtPort {
    fn name(&self) -> &str {
        &self.name
    }

    async fn command(&self, command: &str) -> Result<String, PortError> {
        if !*self.connected.lock().unwrap() {
            return Err(PortError::NotOpen(self.name.clone()));
        }
        self.sent.lock().unwrap().push(command.to_string());

        match self.replies.lock().unwrap().get(command) {
            Some(Ok(reply)) => Ok(reply.clone()),
            Some(Err(message)) => Err(PortError::CommandFailed {
                command: command.to_string(),
                message: message.clone(),
            }),
            None => Err(PortError::CommandFailed {
                command: command.to_string(),
                message: "ERROR".into(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_open_queue() {
        let port = MockBinaryPort::new("cdc-wdm0");
        port.queue_open_failure("no such device");

        assert!(port.open().await.is_err());
        assert!(!port.is_open());

        port.open().await.unwrap();
        assert!(port.is_open());
        assert_eq!(port.open_calls(), 2);

        port.close().unwrap();
        assert!(!port.is_open());
        assert_eq!(port.close_calls(), 1);
    }

    #[tokio::test]
    async fn test_mock_close_failure_keeps_port_open() {
        let port = MockBinaryPort::new("cdc-wdm0");
        port.set_open(true);
        port.fail_close();

        assert!(matches!(port.close(), Err(PortError::CloseFailed { .. })));
        assert!(port.is_open());
    }

    #[tokio::test]
    async fn test_mock_open_gate() {
        let gate = Arc::new(Notify::new());
        let port = Arc::new(MockBinaryPort::new("cdc-wdm0").with_open_gate(gate.clone()));

        let task = {
            let port = port.clone();
            tokio::spawn(async move { port.open().await })
        };
        while port.open_calls() == 0 {
            tokio::task::yield_now().await;
        }
        assert!(port.is_open());
        assert!(!task.is_finished());

        gate.notify_one();
        task.await.unwrap().unwrap();
        assert!(port.is_open());
    }

    #[tokio::test]
    async fn test_mock_at_script() {
        let port = MockAtPort::new("ttyACM0");
        port.set_reply("+CFUN?", "+CFUN: 1,0");
        port.set_error("+UBMCONF?", "+CME ERROR: 4");

        assert_eq!(port.command("+CFUN?").await.unwrap(), "+CFUN: 1,0");
        assert!(matches!(
            port.command("+UBMCONF?").await,
            Err(PortError::CommandFailed { message, .. }) if message == "+CME ERROR: 4"
        ));
        assert!(port.command("+URAT?").await.is_err());
        assert_eq!(port.sent_commands(), vec!["+CFUN?", "+UBMCONF?", "+URAT?"]);

        port.disconnect();
        assert!(matches!(
            port.command("+CFUN?").await,
            Err(PortError::NotOpen(_))
        ));
    }
}
