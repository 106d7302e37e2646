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

//! Composed variables, composed groups and keyed groups.
//!
//! These are the "constructable" features an inventory source offers on top of
//! plain host registration. Each helper takes the variables to evaluate against,
//! the host they apply to and whether failures are fatal (`strict`) or just skip
//! the entry for that host.

use std::sync::Arc;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use crate::config::KeyedGroup;
use crate::error::{InventoryError, Result};
use crate::inventory::inventory::{is_reserved_group_name, ALL_GROUP};
use crate::inventory::sink::InventorySink;
use crate::output::{NullOutputHandler, OutputHandlerRef};
use crate::templar::{is_truthy, TemplateMode, Templar};

static INVALID_GROUP_CHARS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[^A-Za-z0-9_]").expect("group name regex")
});

pub struct Constructable {
    templar: Templar,
    leading_separator: bool,
    sanitize_group_names: bool,
    output_handler: OutputHandlerRef,
}

impl Constructable {

    pub fn new(leading_separator: bool, sanitize_group_names: bool) -> Self {
        Self {
            templar: Templar::new(),
            leading_separator,
            sanitize_group_names,
            output_handler: Arc::new(NullOutputHandler),
        }
    }

    pub fn with_output_handler(mut self, handler: OutputHandlerRef) -> Self {
        self.output_handler = handler;
        self
    }

    // a generated name that would clobber part of the --list document is dropped, not fatal
    fn usable_group_name(&self, group: &str, host: &str) -> bool {
        if is_reserved_group_name(group) {
            self.output_handler.warning(&format!(
                "not adding host {} to group '{}': the name is reserved", host, group
            ));
            return false;
        }
        true
    }

    pub fn sanitize_group_name(&self, name: &str) -> String {
        match self.sanitize_group_names {
            true => INVALID_GROUP_CHARS.replace_all(name, "_").to_string(),
            false => name.to_string(),
        }
    }

    /// `variables` overlaid with the host's current variables; the host wins.
    pub fn combined_variables(&self, sink: &dyn InventorySink, variables: &Map<String, Value>, host: &str) -> Map<String, Value> {
        let mut combined = variables.clone();
        if let Some(host_vars) = sink.get_host_variables(host) {
            for (k, v) in host_vars.into_iter() {
                combined.insert(k, v);
            }
        }
        combined
    }

    /// Set one host variable per `compose` entry.
    pub fn set_composite_vars(&self, sink: &mut dyn InventorySink, compose: &IndexMap<String, String>,
            variables: &Map<String, Value>, host: &str, strict: bool) -> Result<()> {

        let mode = TemplateMode::from_strict(strict);
        for (varname, expr) in compose.iter() {
            match self.templar.evaluate(expr, variables, mode) {
                Ok(Some(value)) => sink.set_variable(host, varname, value)?,
                Ok(None) => continue,
                Err(e) if strict => {
                    return Err(InventoryError::Template(format!("Could not set {} for host {}: {}", varname, host, e)));
                },
                Err(_) => continue,
            }
        }
        Ok(())
    }

    /// Add the host to every `groups` entry whose condition holds. Returns the
    /// groups the host was added to.
    pub fn add_host_to_composed_groups(&self, sink: &mut dyn InventorySink, groups: &IndexMap<String, String>,
            variables: &Map<String, Value>, host: &str, strict: bool) -> Result<Vec<String>> {

        let mut added = Vec::new();
        if groups.is_empty() {
            return Ok(added);
        }
        let variables = self.combined_variables(sink, variables, host);
        let mode = TemplateMode::from_strict(strict);

        for (group_name, condition) in groups.iter() {
            let group_name = self.sanitize_group_name(group_name);
            match self.templar.test_condition(condition, &variables, mode) {
                Ok(true) => {
                    if !self.usable_group_name(&group_name, host) {
                        continue;
                    }
                    let group = sink.add_group(&group_name)?;
                    sink.add_host_to_group(&group, host)?;
                    added.push(group);
                },
                Ok(false) => {},
                Err(e) if strict => {
                    return Err(InventoryError::Group(format!("Could not add host {} to group {}: {}", host, group_name, e)));
                },
                Err(_) => {},
            }
        }
        Ok(added)
    }

    /// Add the host to groups named after the value of each `keyed_groups` key.
    /// Returns the groups the host was added to.
    pub fn add_host_to_keyed_groups(&self, sink: &mut dyn InventorySink, keys: &[KeyedGroup],
            variables: &Map<String, Value>, host: &str, strict: bool) -> Result<Vec<String>> {

        let mut added = Vec::new();
        if keys.is_empty() {
            return Ok(added);
        }
        let variables = self.combined_variables(sink, variables, host);
        let mode = TemplateMode::from_strict(strict);

        for keyed in keys.iter() {
            keyed.validate()?;
            let key_expr = match &keyed.key {
                Some(k) => k,
                None => continue,
            };

            let key = match self.templar.evaluate(key_expr, &variables, mode) {
                Ok(Some(v)) => v,
                Ok(None) => continue,
                Err(e) if strict => {
                    return Err(InventoryError::Group(format!(
                        "Could not generate group for host {} from {} entry: {}", host, key_expr, e
                    )));
                },
                Err(_) => continue,
            };

            let empty_with_default = key.as_str() == Some("") && keyed.default_value.is_some();
            if !is_truthy(&key) && !empty_with_default {
                // empty list and map are valid keys that simply produce no groups
                let empty_collection = matches!(&key, Value::Array(a) if a.is_empty())
                    || matches!(&key, Value::Object(m) if m.is_empty());
                if strict && !empty_collection {
                    return Err(InventoryError::Group(format!(
                        "No key or key resulted empty for {} in host {}, invalid entry", key_expr, host
                    )));
                }
                continue;
            }

            let parent_name = match &keyed.parent_group {
                Some(raw) => match self.templar.render(raw, &variables, mode) {
                    Ok(rendered) => Some(self.sanitize_group_name(&rendered)),
                    Err(e) if strict => {
                        return Err(InventoryError::Group(format!(
                            "Could not generate parent group {} for group {}: {}", raw, key_expr, e
                        )));
                    },
                    Err(_) => continue,
                },
                None => None,
            };

            for bare_name in self.bare_group_names(keyed, &key) {
                let separator = match keyed.prefix.is_empty() && !self.leading_separator {
                    true => "",
                    false => keyed.separator.as_str(),
                };
                let gname = self.sanitize_group_name(&format!("{}{}{}", keyed.prefix, separator, bare_name));
                if !self.usable_group_name(&gname, host) {
                    continue;
                }
                let group = sink.add_group(&gname)?;
                sink.add_host_to_group(&group, host)?;
                if let Some(parent) = &parent_name {
                    if !parent.is_empty() && group != ALL_GROUP && self.usable_group_name(parent, host) {
                        sink.add_group(parent)?;
                        sink.add_child_group(parent, &group)?;
                    }
                }
                added.push(group);
            }
        }
        Ok(added)
    }

    fn bare_group_names(&self, keyed: &KeyedGroup, key: &Value) -> Vec<String> {
        let default_value = keyed.default_value.as_deref();
        match key {
            Value::Array(items) => items.iter()
                .map(|item| {
                    let name = value_as_group_text(item);
                    match (name.is_empty(), default_value) {
                        (true, Some(d)) => d.to_string(),
                        _ => name,
                    }
                })
                .collect(),
            Value::Object(map) => map.iter()
                .map(|(gname, gval)| {
                    let gval = value_as_group_text(gval);
                    if gval.is_empty() {
                        if let Some(d) = default_value {
                            return format!("{}{}{}", gname, keyed.separator, d);
                        }
                        if keyed.trailing_separator == Some(false) {
                            return gname.clone();
                        }
                    }
                    format!("{}{}{}", gname, keyed.separator, gval)
                })
                .collect(),
            other => {
                let name = value_as_group_text(other);
                match (name.is_empty(), default_value) {
                    (true, Some(d)) => vec![d.to_string()],
                    _ => vec![name],
                }
            }
        }
    }
}

fn value_as_group_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
