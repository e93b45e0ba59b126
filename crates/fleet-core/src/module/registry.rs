//! Registry that selects the launch module for this process.
//!
//! Modules are checked in registration order; the first available one wins unless a name is requested.
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::{error::CoreError, module::LaunchModule};

#[derive(Default)]
pub struct ModuleRegistry {
    modules: Vec<Arc<dyn LaunchModule>>,
}

impl ModuleRegistry {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn register(&mut self, module: Arc<dyn LaunchModule>) {
        self.modules.push(module);
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.modules.iter().map(|m| m.name()).collect()
    }

    /// Pick a module.
    ///
    /// - `Some(name)`: the module with that name, if it is available;
    /// - `None`: the first available module.
    #[instrument(level = "debug", skip(self))]
    pub fn select(&self, name: Option<&str>) -> Result<Arc<dyn LaunchModule>, CoreError> {
        let picked = self
            .modules
            .iter()
            .filter(|m| m.available())
            .find(|m| name.is_none_or(|n| m.name() == n))
            .cloned();

        match picked {
            Some(m) => {
                debug!(module = m.name(), "launch module selected");
                Ok(m)
            }
            None => Err(CoreError::NoModule(
                name.map_or_else(|| "no module available".to_string(), str::to_string),
            )),
        }
    }
}
