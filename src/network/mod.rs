pub mod client;
pub mod offline;
pub mod protocol;

pub use client::MoveServiceClient;
pub use offline::RandomMoveService;
pub use protocol::{MoveRequest, MoveResponse};

use crate::error::ServiceError;
use async_trait::async_trait;

/// 指し手サービス
///
/// Every failure, whatever its cause, comes back as a `ServiceError` and is
/// reported once. There are no retries.
#[async_trait]
pub trait MoveService: Send + Sync {
    async fn request_move(&self, request: &MoveRequest) -> Result<String, ServiceError>;

    /// Reachability probe.
    async fn ping(&self) -> Result<(), ServiceError>;
}
