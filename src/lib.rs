pub mod api;
pub mod cli;
pub mod config;
pub mod drp;
pub mod error;
pub mod inventory;
pub mod output;
pub mod plugins;
pub mod templar;
pub mod util;

// Re-export commonly used types for library users
pub use api::{InventoryLoader, LoadResult, load_inventory};
pub use config::{PluginConfig, KeyedGroup, EnvSource, ProcessEnv};
pub use drp::client::{DrpClient, MachineSource, StaticMachineSource};
pub use drp::machine::Machine;
pub use error::{InventoryError, Result};
pub use output::{OutputHandler, OutputHandlerRef, TerminalOutputHandler, NullOutputHandler, CaptureOutputHandler, LogLevel, ParseSummary};
pub use inventory::inventory::Inventory;
pub use inventory::sink::InventorySink;
pub use plugins::machines::MachinesPlugin;
