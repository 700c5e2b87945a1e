use crate::error::EventBusError;
use crate::media::SourceKind;
use serde::{Deserialize, Serialize};
use std::time::SystemTime;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Severity of a user-facing notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationLevel {
    Info,
    Error,
}

/// Events emitted by a capture/analysis session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEvent {
    /// Camera stream acquired or released
    CameraStatusChanged {
        active: bool,
        timestamp: SystemTime,
    },
    /// Recorder started buffering chunks
    RecordingStarted { timestamp: SystemTime },
    /// Recorder finalized into a blob
    RecordingStopped { bytes: usize, timestamp: SystemTime },
    /// A new candidate source replaced the previous one of its kind
    SourceSelected { kind: SourceKind, bytes: usize },
    /// A submission to the relay is in flight
    AnalysisStarted { kind: SourceKind },
    /// A submission resolved with a result
    AnalysisCompleted { timestamp: SystemTime },
    /// Message to surface to the user (toast)
    Notification {
        level: NotificationLevel,
        title: String,
        description: String,
    },
}

impl SessionEvent {
    pub fn error_notification<S: Into<String>>(description: S) -> Self {
        SessionEvent::Notification {
            level: NotificationLevel::Error,
            title: "Error".to_string(),
            description: description.into(),
        }
    }

    /// Get a human-readable description of the event
    pub fn description(&self) -> String {
        match self {
            SessionEvent::CameraStatusChanged { active, .. } => {
                format!("Camera {}", if *active { "started" } else { "stopped" })
            }
            SessionEvent::RecordingStarted { .. } => "Recording started".to_string(),
            SessionEvent::RecordingStopped { bytes, .. } => {
                format!("Recording stopped ({} bytes)", bytes)
            }
            SessionEvent::SourceSelected { kind, bytes } => {
                format!("{} video selected ({} bytes)", kind, bytes)
            }
            SessionEvent::AnalysisStarted { kind } => {
                format!("Submitting {} video for analysis", kind)
            }
            SessionEvent::AnalysisCompleted { .. } => "Analysis completed".to_string(),
            SessionEvent::Notification {
                title, description, ..
            } => format!("{}: {}", title, description),
        }
    }

    /// Get the event type as a string for filtering
    pub fn event_type(&self) -> &'static str {
        match self {
            SessionEvent::CameraStatusChanged { .. } => "camera_status_changed",
            SessionEvent::RecordingStarted { .. } => "recording_started",
            SessionEvent::RecordingStopped { .. } => "recording_stopped",
            SessionEvent::SourceSelected { .. } => "source_selected",
            SessionEvent::AnalysisStarted { .. } => "analysis_started",
            SessionEvent::AnalysisCompleted { .. } => "analysis_completed",
            SessionEvent::Notification { .. } => "notification",
        }
    }
}

/// Async event bus for session notifications using broadcast channels
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    /// Create a new event bus with the specified channel capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events and get a receiver
    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all subscribers
    pub fn publish(&self, event: SessionEvent) -> Result<usize, EventBusError> {
        match &event {
            SessionEvent::Notification {
                level: NotificationLevel::Error,
                description,
                ..
            } => {
                error!("Session error: {}", description);
            }
            SessionEvent::CameraStatusChanged { active, .. } => {
                if *active {
                    info!("Camera started");
                } else {
                    info!("Camera stopped");
                }
            }
            SessionEvent::AnalysisCompleted { .. } => {
                info!("Analysis completed");
            }
            _ => {
                debug!("Event: {}", event.description());
            }
        }

        self.sender.send(event).map_err(|e| EventBusError::PublishFailed {
            details: e.to_string(),
        })
    }

    /// Publish without caring whether anyone is listening
    pub fn notify(&self, event: SessionEvent) {
        if let Err(e) = self.publish(event) {
            warn!("Dropped session event: {}", e);
        }
    }

    /// Get the number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::{timeout, Duration};

    #[tokio::test]
    async fn test_event_bus_basic_operations() {
        let event_bus = EventBus::new(10);
        let mut receiver = event_bus.subscribe();

        let subscriber_count = event_bus
            .publish(SessionEvent::RecordingStopped {
                bytes: 42,
                timestamp: SystemTime::now(),
            })
            .unwrap();
        assert_eq!(subscriber_count, 1);

        match receiver.recv().await.unwrap() {
            SessionEvent::RecordingStopped { bytes, .. } => assert_eq!(bytes, 42),
            other => panic!("Unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let event_bus = EventBus::new(10);
        let mut receiver1 = event_bus.subscribe();
        let mut receiver2 = event_bus.subscribe();

        assert_eq!(event_bus.subscriber_count(), 2);

        event_bus
            .publish(SessionEvent::error_notification("Failed to access camera"))
            .unwrap();

        let _ = timeout(Duration::from_millis(100), receiver1.recv())
            .await
            .unwrap()
            .unwrap();
        let _ = timeout(Duration::from_millis(100), receiver2.recv())
            .await
            .unwrap()
            .unwrap();
    }

    #[test]
    fn test_publish_without_subscribers() {
        let event_bus = EventBus::new(10);

        assert!(event_bus
            .publish(SessionEvent::AnalysisCompleted {
                timestamp: SystemTime::now(),
            })
            .is_err());

        // notify swallows the missing-subscriber case
        event_bus.notify(SessionEvent::RecordingStarted {
            timestamp: SystemTime::now(),
        });
    }

    #[test]
    fn test_event_descriptions() {
        let event = SessionEvent::error_notification("Failed to analyze pose");
        assert_eq!(event.event_type(), "notification");
        assert_eq!(event.description(), "Error: Failed to analyze pose");

        let event = SessionEvent::SourceSelected {
            kind: SourceKind::Uploaded,
            bytes: 3,
        };
        assert_eq!(event.description(), "uploaded video selected (3 bytes)");
    }
}
