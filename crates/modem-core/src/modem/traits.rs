//! Generic modem base abstraction.

use async_trait::async_trait;

/// Generic (text-protocol) modem implementation the binary-protocol modem
/// delegates its best-effort steps to.
#[async_trait]
pub trait ModemBase: Send + Sync {
    /// Whatever the generic initialization hands back on success.
    type InitContext: Send + 'static;

    async fn initialization_started(&self) -> anyhow::Result<Self::InitContext>;

    async fn enabling_started(&self) -> anyhow::Result<()>;
}
