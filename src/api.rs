use std::path::{Path, PathBuf};
use std::sync::Arc;
use crate::config::{EnvSource, PluginConfig, ProcessEnv};
use crate::drp::client::{DrpClient, MachineSource};
use crate::error::{InventoryError, Result};
use crate::inventory::inventory::Inventory;
use crate::output::{NullOutputHandler, OutputHandler, OutputHandlerRef, ParseSummary};
use crate::plugins::machines::{verify_file, MachinesPlugin, PLUGIN_NAME};

/// Main API for building an inventory from a source file
pub struct InventoryLoader {
    source_path: PathBuf,
    output_handler: OutputHandlerRef,
    env: Box<dyn EnvSource>,
}

/// Result of a load
#[derive(Debug)]
pub struct LoadResult {
    pub inventory: Inventory,
    pub summary: ParseSummary,
}

impl InventoryLoader {
    /// Create a loader for the given source file, reading the process environment
    pub fn new<P: Into<PathBuf>>(source_path: P) -> Self {
        Self {
            source_path: source_path.into(),
            output_handler: Arc::new(NullOutputHandler),
            env: Box::new(ProcessEnv),
        }
    }

    /// Set a custom output handler
    pub fn with_output_handler(mut self, handler: Arc<dyn OutputHandler>) -> Self {
        self.output_handler = handler;
        self
    }

    /// Replace the environment options are read from
    pub fn with_env(mut self, env: Box<dyn EnvSource>) -> Self {
        self.env = env;
        self
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// Resolve the configuration without contacting the endpoint
    pub fn config(&self) -> Result<PluginConfig> {
        if !verify_file(&self.source_path) {
            return Err(InventoryError::Config(format!(
                "{} is not a readable {} source (expected a name ending in rackn.yml, rackn.yaml, drp.yml or drp.yaml)",
                self.source_path.display(), PLUGIN_NAME
            )));
        }
        PluginConfig::from_file(&self.source_path, self.env.as_ref())
    }

    /// Read the source file, query the endpoint and build the inventory
    pub fn load(&self) -> Result<LoadResult> {
        let config = self.config()?;
        let client = DrpClient::new(&config);
        self.load_from_config(config, &client)
    }

    /// As `load`, but with machines coming from `source` instead of the endpoint
    /// named in the file.
    pub fn load_with_source(&self, source: &dyn MachineSource) -> Result<LoadResult> {
        let config = self.config()?;
        self.load_from_config(config, source)
    }

    fn load_from_config(&self, config: PluginConfig, source: &dyn MachineSource) -> Result<LoadResult> {
        self.output_handler.on_parse_start(&self.source_path.display().to_string());

        let plugin = MachinesPlugin::new(config)
            .with_output_handler(Arc::clone(&self.output_handler));
        let mut inventory = Inventory::new();
        let summary = plugin.parse(&mut inventory, source)?;

        self.output_handler.on_parse_end(&summary);
        Ok(LoadResult { inventory, summary })
    }
}

/// Builder-style shortcut: `load_inventory("site.rackn.yml")`
pub fn load_inventory<P: Into<PathBuf>>(source_path: P) -> Result<Inventory> {
    Ok(InventoryLoader::new(source_path).load()?.inventory)
}
