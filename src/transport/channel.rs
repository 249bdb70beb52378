use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::{OutboundAction, Transport};

/// Transport that renders actions as protocol lines onto a channel
///
/// The receiving end is owned by whatever writes to the socket (or stdout).
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    sender: mpsc::UnboundedSender<String>,
}

impl ChannelTransport {
    pub fn new(sender: mpsc::UnboundedSender<String>) -> Self {
        Self { sender }
    }
}

#[async_trait]
impl Transport for ChannelTransport {
    async fn send(&self, action: OutboundAction) {
        let line = action.to_protocol_line();
        debug!(line = %line, "Sending action");

        if self.sender.send(line).is_err() {
            warn!(?action, "Outbound channel closed, action dropped");
        }
    }
}
