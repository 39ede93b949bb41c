#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Event system for async communication in pkgd
//!
//! The packager reports every admitted activity, state change and repository
//! refresh as an [`AppEvent`] wrapped in an [`EventMessage`]. Delivery is
//! fire-and-forget over an unbounded tokio channel so the install worker
//! never blocks on a slow consumer.

pub mod meta;
pub use meta::{EventLevel, EventMessage, EventMeta, EventSource};

pub mod events;
pub use events::{AppEvent, FailureContext, GeneralEvent, InstallEvent, RepoEvent};

use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

/// Type alias for event sender
pub type EventSender = UnboundedSender<EventMessage>;

/// Type alias for event receiver
pub type EventReceiver = UnboundedReceiver<EventMessage>;

/// Create a new event channel
#[must_use]
pub fn channel() -> (EventSender, EventReceiver) {
    tokio::sync::mpsc::unbounded_channel()
}

/// The unified trait for emitting events throughout pkgd
///
/// Implemented for the raw [`EventSender`] and for components that hold
/// one once it is attached.
pub trait EventEmitter {
    /// Get the event sender for this emitter
    fn event_sender(&self) -> Option<&EventSender>;

    /// Emit an event through this emitter
    fn emit(&self, event: AppEvent) {
        self.emit_message(EventMessage::new(event));
    }

    /// Emit an event tagged with the activity it belongs to
    fn emit_for_activity(&self, activity_id: u64, event: AppEvent) {
        self.emit_message(EventMessage::new(event).with_correlation_id(activity_id.to_string()));
    }

    fn emit_message(&self, message: EventMessage) {
        if let Some(sender) = self.event_sender() {
            // Receiver dropped: nothing left to inform.
            let _ = sender.send(message);
        }
    }

    /// Emit a warning event
    fn emit_warning(&self, message: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning(message)));
    }

    /// Emit a warning event with context
    fn emit_warning_with_context(&self, message: impl Into<String>, context: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::warning_with_context(
            message, context,
        )));
    }

    /// Emit an error event with details
    fn emit_error_with_details(&self, message: impl Into<String>, details: impl Into<String>) {
        self.emit(AppEvent::General(GeneralEvent::error_with_details(
            message, details,
        )));
    }
}

impl EventEmitter for EventSender {
    fn event_sender(&self) -> Option<&EventSender> {
        Some(self)
    }
}
