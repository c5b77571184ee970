//! Stimulus resolution against the configuration store

use kbmapper_config::ConfigStore;

use crate::combo::Resolution;
use crate::dispatcher::CommandDispatcher;

/// Looks stimuli up in the store and dispatches the winning section
pub struct StimulusResolver<D> {
    store: ConfigStore,
    dispatcher: D,
}

impl<D: CommandDispatcher> StimulusResolver<D> {
    pub fn new(store: ConfigStore, dispatcher: D) -> Self {
        Self { store, dispatcher }
    }

    /// Resolve a stimulus and run its command.
    ///
    /// `Resolved` means a section was found and handed to the dispatcher,
    /// whatever happens to the command afterwards.
    pub fn resolve(&self, stimulus: &str) -> Resolution {
        match self.store.lookup(stimulus) {
            Some(found) => {
                tracing::debug!("'{}' matched in {}", stimulus, found.source.display());
                self.dispatcher.dispatch(stimulus, found.section);
                Resolution::Resolved
            }
            None => {
                tracing::debug!("No command bound to '{}'", stimulus);
                Resolution::Unresolved
            }
        }
    }

    #[cfg(test)]
    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }
}
