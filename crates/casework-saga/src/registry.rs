use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use casework_core::{ActionType, FAILED_COMPENSATION_PREFIX, NOT_COMPENSATED_PREFIX};
use tracing::debug;

use crate::error::RegistryError;
use crate::handler::CompensationHandler;

/// Maps an action type to the handler that reverses it.
///
/// Lookups are read-only and the registry is shared behind an `Arc`, so any
/// number of instances can compensate concurrently against the same registry.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<ActionType, Arc<dyn CompensationHandler>>,
}

impl HandlerRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `action_type`, replacing any previous handler.
    ///
    /// # Errors
    ///
    /// Returns an error if the handler's reversal tag is empty or collides
    /// with the prefixes reserved for failed and unhandled actions.
    pub fn register<H>(&mut self, action_type: ActionType, handler: H) -> Result<(), RegistryError>
    where
        H: CompensationHandler + 'static,
    {
        self.register_arc(action_type, Arc::new(handler))
    }

    /// # Errors
    ///
    /// Same as [`HandlerRegistry::register`].
    pub fn register_arc(
        &mut self,
        action_type: ActionType,
        handler: Arc<dyn CompensationHandler>,
    ) -> Result<(), RegistryError> {
        let tag = handler.reversed_tag();
        if tag.trim().is_empty() {
            return Err(RegistryError::EmptyTag { action_type });
        }
        if tag.starts_with(FAILED_COMPENSATION_PREFIX) || tag.starts_with(NOT_COMPENSATED_PREFIX) {
            return Err(RegistryError::ReservedTag {
                tag: tag.to_string(),
                action_type,
            });
        }

        debug!(%action_type, tag, "registering compensation handler");
        self.handlers.insert(action_type, handler);
        Ok(())
    }

    /// Builder-style variant of [`HandlerRegistry::register`].
    ///
    /// # Errors
    ///
    /// Same as [`HandlerRegistry::register`].
    pub fn with_handler<H>(
        mut self,
        action_type: ActionType,
        handler: H,
    ) -> Result<Self, RegistryError>
    where
        H: CompensationHandler + 'static,
    {
        self.register(action_type, handler)?;
        Ok(self)
    }

    #[must_use]
    pub fn get(&self, action_type: &ActionType) -> Option<Arc<dyn CompensationHandler>> {
        self.handlers.get(action_type).cloned()
    }

    #[must_use]
    pub fn contains(&self, action_type: &ActionType) -> bool {
        self.handlers.contains_key(action_type)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut types: Vec<_> = self.handlers.keys().map(ActionType::as_str).collect();
        types.sort_unstable();
        f.debug_struct("HandlerRegistry")
            .field("action_types", &types)
            .finish()
    }
}
