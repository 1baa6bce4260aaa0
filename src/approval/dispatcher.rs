//! Best-effort broadcast of approval requests to every registered channel.

use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;

use super::model::ApprovalRequest;
use crate::error::{ApprovalError, Result};

/// Something that can put an approval request in front of a human.
///
/// Object-safe; channels are held as `Arc<dyn ApprovalChannel>`.
#[async_trait]
pub trait ApprovalChannel: Send + Sync + 'static {
    /// Channel name used in logs
    fn name(&self) -> &str;

    /// Deliver the request. Decisions come back later through `resolve`.
    async fn send_approval_request(&self, request: &ApprovalRequest) -> anyhow::Result<()>;
}

/// Fans a request out to all channels, isolating per-channel failures.
pub struct NotificationDispatcher {
    channels: Vec<Arc<dyn ApprovalChannel>>,
}

impl NotificationDispatcher {
    pub fn new(channels: Vec<Arc<dyn ApprovalChannel>>) -> Self {
        Self { channels }
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    /// Send `request` through every channel.
    ///
    /// Returns the number of channels that accepted it. A failing channel is logged
    /// and skipped; only an empty channel list is an error.
    pub async fn notify(&self, request: &ApprovalRequest) -> Result<usize> {
        if self.channels.is_empty() {
            return Err(ApprovalError::NoChannels);
        }

        let sends = self.channels.iter().map(|channel| async move {
            match channel.send_approval_request(request).await {
                Ok(()) => {
                    tracing::info!(
                        request_id = %request.id,
                        channel = channel.name(),
                        "Approval request sent"
                    );
                    true
                }
                Err(e) => {
                    tracing::error!(
                        request_id = %request.id,
                        channel = channel.name(),
                        "Failed to send approval request: {:#}",
                        e
                    );
                    false
                }
            }
        });

        let delivered = join_all(sends).await.into_iter().filter(|ok| *ok).count();
        if delivered == 0 {
            tracing::warn!(
                request_id = %request.id,
                "Approval request was not delivered by any channel"
            );
        }

        Ok(delivered)
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::RecordingChannel;
    use super::*;

    #[tokio::test]
    async fn no_channels_is_an_error() {
        let dispatcher = NotificationDispatcher::new(Vec::new());
        let request = ApprovalRequest::new("q", None);

        let result = dispatcher.notify(&request).await;
        assert!(matches!(result, Err(ApprovalError::NoChannels)));
    }

    #[tokio::test]
    async fn broadcasts_to_every_channel() {
        let a = RecordingChannel::ok("a");
        let b = RecordingChannel::ok("b");
        let dispatcher = NotificationDispatcher::new(vec![a.clone(), b.clone()]);
        let request = ApprovalRequest::new("q", None);

        let delivered = dispatcher.notify(&request).await.unwrap();

        assert_eq!(delivered, 2);
        assert_eq!(a.sent_ids(), vec![request.id.clone()]);
        assert_eq!(b.sent_ids(), vec![request.id.clone()]);
    }

    #[tokio::test]
    async fn failing_channel_does_not_stop_others() {
        let broken = RecordingChannel::failing("broken");
        let healthy = RecordingChannel::ok("healthy");
        let dispatcher = NotificationDispatcher::new(vec![broken.clone(), healthy.clone()]);
        let request = ApprovalRequest::new("q", None);

        let delivered = dispatcher.notify(&request).await.unwrap();

        assert_eq!(delivered, 1);
        assert!(broken.sent_ids().is_empty());
        assert_eq!(healthy.sent_ids(), vec![request.id]);
    }

    #[tokio::test]
    async fn all_channels_failing_is_not_an_error() {
        let dispatcher = NotificationDispatcher::new(vec![
            RecordingChannel::failing("a"),
            RecordingChannel::failing("b"),
        ]);
        let request = ApprovalRequest::new("q", None);

        assert_eq!(dispatcher.notify(&request).await.unwrap(), 0);
    }

    #[test]
    fn lists_channel_names() {
        let dispatcher =
            NotificationDispatcher::new(vec![RecordingChannel::ok("telegram"), RecordingChannel::ok("x")]);
        assert_eq!(dispatcher.channel_names(), vec!["telegram", "x"]);
    }
}
