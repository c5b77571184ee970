//! The event engine
//!
//! Device readers run as independent tasks and send their logical events
//! over one channel. The engine is the only consumer: it owns the chord
//! tracker, the keysym resolver and the configuration, so none of them
//! need locking. Events from different devices interleave at frame
//! granularity and each one is handled to completion before the next.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::combo::{ComboOutcome, ComboTracker, Resolution};
use crate::dispatcher::CommandDispatcher;
use crate::frame::LogicalEvent;
use crate::keysym::KeysymResolver;
use crate::resolver::StimulusResolver;
use crate::switch::SwitchStimulus;

/// Capacity of the channel between device readers and the engine
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// A logical event tagged with the device it came from
#[derive(Debug, Clone)]
pub struct DeviceEvent {
    pub device: Arc<str>,
    pub event: LogicalEvent,
}

pub struct Engine<D> {
    tracker: ComboTracker,
    keysyms: Box<dyn KeysymResolver>,
    resolver: StimulusResolver<D>,
}

impl<D: CommandDispatcher> Engine<D> {
    pub fn new(keysyms: Box<dyn KeysymResolver>, resolver: StimulusResolver<D>) -> Self {
        Self {
            tracker: ComboTracker::new(),
            keysyms,
            resolver,
        }
    }

    /// Handle one logical event to completion
    pub fn handle(&mut self, event: &DeviceEvent) {
        tracing::trace!("{}: {:?}", event.device, event.event);

        match event.event {
            LogicalEvent::Key { code, value } => {
                let resolver = &self.resolver;
                let outcome = self.tracker.handle_key(
                    code,
                    value,
                    self.keysyms.as_ref(),
                    |chord| resolver.resolve(chord),
                );

                if let ComboOutcome::Attempted { chord, resolution } = outcome {
                    match resolution {
                        Resolution::Resolved => {
                            tracing::debug!("{}: chord '{}' resolved", event.device, chord)
                        }
                        Resolution::Unresolved => {
                            tracing::debug!("{}: chord '{}' unresolved", event.device, chord)
                        }
                    }
                }

                tracing::trace!(
                    "Combo {:?}, held codes {:?}",
                    self.tracker.state(),
                    self.tracker.held()
                );
            }
            LogicalEvent::Switch { code, value } => {
                match SwitchStimulus::from_event(code, value) {
                    Some(stimulus) => {
                        tracing::debug!("{}: switch {}", event.device, stimulus);
                        self.resolver.resolve(stimulus.as_str());
                    }
                    None => {
                        tracing::debug!(
                            "{}: ignoring switch {} = {}",
                            event.device,
                            code,
                            value
                        );
                    }
                }
            }
        }
    }

    /// Consume events until every sender has gone away
    pub async fn run(mut self, mut events: mpsc::Receiver<DeviceEvent>) {
        while let Some(event) = events.recv().await {
            self.handle(&event);
        }
    }

    #[cfg(test)]
    pub fn tracker(&self) -> &ComboTracker {
        &self.tracker
    }
}
