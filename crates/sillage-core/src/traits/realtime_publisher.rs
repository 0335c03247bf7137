use crate::errors::SillageResult;
use crate::models::RealtimeMessage;

/// Push capability offered by the transport/session layer.
///
/// The core never depends on a concrete transport; it only publishes.
pub trait RealtimePublisher: Send + Sync {
    fn publish(&self, user_id: &str, message: RealtimeMessage) -> SillageResult<()>;
}
