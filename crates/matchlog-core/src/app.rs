use anyhow::Result;
use std::sync::Arc;

use crate::Config;

/// Main application state and lifecycle manager
pub struct App {
    config: Arc<Config>,
    initialized: bool,
}

impl App {
    /// Create a new application instance from the on-disk configuration
    pub fn new() -> Result<Self> {
        let (config, _validation) = Config::load_validated()?;
        Ok(Self::with_config(config))
    }

    /// Create an application instance around an already loaded configuration
    pub fn with_config(config: Config) -> Self {
        Self {
            config: Arc::new(config),
            initialized: false,
        }
    }

    /// Prepare the data directory used by the journal store
    pub fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        std::fs::create_dir_all(&self.config.config_dir)?;
        tracing::info!(
            "Application initialized (data dir: {})",
            self.config.config_dir.display()
        );

        self.initialized = true;
        Ok(())
    }

    /// Shutdown the application
    pub fn shutdown(&mut self) -> Result<()> {
        tracing::info!("Shutting down application");
        self.initialized = false;
        Ok(())
    }

    /// Get reference to application config
    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }
}
