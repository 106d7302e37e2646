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

use serde_json::{Map, Value};
use crate::error::Result;

/// The inventory mutation capability a plugin populates. `Inventory` is the
/// in-memory implementation; anything else that can hold hosts, variables and
/// group memberships can stand in for it.
pub trait InventorySink {
    /// Register a host. Registering an existing name is a no-op.
    fn add_host(&mut self, host: &str);

    fn set_variable(&mut self, host: &str, name: &str, value: Value) -> Result<()>;

    fn get_host_variables(&self, host: &str) -> Option<Map<String, Value>>;

    /// Ensure a group exists, returning its name. Reserved names are refused.
    fn add_group(&mut self, group: &str) -> Result<String>;

    fn add_host_to_group(&mut self, group: &str, host: &str) -> Result<()>;

    fn add_child_group(&mut self, parent: &str, child: &str) -> Result<()>;
}
