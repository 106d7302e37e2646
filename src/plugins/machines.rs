// Jetpack
// Copyright (C) Riff Labs Limited <team@riff.cc>
// Based on Jetporch by Michael DeHaan <michael@michaeldehaan.net> + contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// long with this program.  If not, see <http://www.gnu.org/licenses/>.

//! The `rackn.drp.machines` inventory source.
//!
//! Fetches every machine from a DRP endpoint and turns each record into a host:
//! all record fields become `rackn_`-prefixed host variables, then `compose`,
//! `groups` and `keyed_groups` are applied.
//!
//! ```yaml
//! plugin: rackn.drp.machines
//! rs_endpoint: https://10.10.10.6:8092
//! rs_key: rocketskates:r0cketsk8ts
//! compose:
//!   ansible_host: Address
//! keyed_groups:
//!   - key: rackn_Stage
//!     prefix: stage
//! ```

use std::path::Path;
use std::sync::Arc;
use indexmap::IndexSet;
use crate::config::PluginConfig;
use crate::drp::client::MachineSource;
use crate::drp::machine::{machine_name, prefixed_variable, Machine};
use crate::error::Result;
use crate::inventory::sink::InventorySink;
use crate::output::{NullOutputHandler, OutputHandlerRef, ParseSummary};
use crate::plugins::constructed::Constructable;
use crate::util::io::{is_readable_file, path_basename_as_string};

pub use crate::config::PLUGIN_NAME;

/// File name endings this source accepts
pub const VALID_EXTENSIONS: [&str; 4] = ["rackn.yml", "rackn.yaml", "drp.yml", "drp.yaml"];

/// Whether `path` looks like a source file for this plugin: an existing readable
/// file whose name ends in one of `VALID_EXTENSIONS`.
pub fn verify_file(path: &Path) -> bool {
    if !is_readable_file(path) {
        return false;
    }
    let name = path_basename_as_string(path);
    VALID_EXTENSIONS.iter().any(|ext| name.ends_with(ext))
}

pub struct MachinesPlugin {
    config: PluginConfig,
    constructable: Constructable,
    output_handler: OutputHandlerRef,
}

impl MachinesPlugin {

    pub fn new(config: PluginConfig) -> Self {
        let constructable = Constructable::new(config.leading_separator, config.sanitize_group_names);
        Self {
            config,
            constructable,
            output_handler: Arc::new(NullOutputHandler),
        }
    }

    pub fn with_output_handler(mut self, handler: OutputHandlerRef) -> Self {
        self.constructable = self.constructable.with_output_handler(Arc::clone(&handler));
        self.output_handler = handler;
        self
    }

    pub fn config(&self) -> &PluginConfig {
        &self.config
    }

    /// Fetch all machines from `source` and materialize them into `sink`.
    pub fn parse(&self, sink: &mut dyn InventorySink, source: &dyn MachineSource) -> Result<ParseSummary> {
        self.output_handler.on_fetch_start(&source.describe());
        if !self.config.validate_certs {
            self.output_handler.debug("certificate validation is disabled for this endpoint");
        }
        let machines = source.fetch_machines()?;
        self.output_handler.on_fetch_complete(machines.len());
        self.populate(sink, &machines)
    }

    /// Materialize already fetched records. Records without a usable `Name` are
    /// reported and skipped; expression failures that the configuration makes
    /// fatal abort the whole run.
    pub fn populate(&self, sink: &mut dyn InventorySink, machines: &[Machine]) -> Result<ParseSummary> {
        let mut hosts: IndexSet<String> = IndexSet::new();
        let mut groups: IndexSet<String> = IndexSet::new();
        let mut skipped = 0usize;

        for (index, machine) in machines.iter().enumerate() {
            let name = match machine_name(machine) {
                Ok(name) => name,
                Err(reason) => {
                    self.output_handler.on_record_skipped(index, &reason);
                    skipped += 1;
                    continue;
                }
            };
            for group in self.materialize(sink, &name, machine)? {
                groups.insert(group);
            }
            hosts.insert(name);
        }

        Ok(ParseSummary {
            records: machines.len(),
            hosts: hosts.len(),
            groups: groups.len(),
            skipped,
        })
    }

    fn materialize(&self, sink: &mut dyn InventorySink, name: &str, machine: &Machine) -> Result<Vec<String>> {
        sink.add_host(name);

        for (field, value) in machine.iter() {
            sink.set_variable(name, &prefixed_variable(field), value.clone())?;
        }

        // composed variables are always strict, group membership follows the `strict` option
        self.constructable.set_composite_vars(sink, &self.config.compose, machine, name, true)?;

        let mut groups = self.constructable.add_host_to_composed_groups(
            sink, &self.config.groups, machine, name, self.config.strict
        )?;
        groups.extend(self.constructable.add_host_to_keyed_groups(
            sink, &self.config.keyed_groups, machine, name, self.config.strict
        )?);
        Ok(groups)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    #[test]
    fn test_verify_file_suffixes() {
        let temp_dir = TempDir::new().unwrap();
        for name in ["site.rackn.yml", "rackn.yaml", "lab.drp.yml", "drp.yaml"] {
            let path = temp_dir.path().join(name);
            File::create(&path).unwrap();
            assert!(verify_file(&path), "{} should be accepted", name);
        }
        for name in ["hosts.yml", "rackn.json", "drp.yml.bak"] {
            let path = temp_dir.path().join(name);
            File::create(&path).unwrap();
            assert!(!verify_file(&path), "{} should be rejected", name);
        }
    }

    #[test]
    fn test_verify_file_missing() {
        assert!(!verify_file(Path::new("/non/existent/site.rackn.yml")));
    }
}
