use indexmap::IndexMap;
use serde_json::{json, Map, Value};
use crate::error::{InventoryError, Result};
use crate::inventory::groups::Group;
use crate::inventory::hosts::Host;
use crate::inventory::sink::InventorySink;

pub const ALL_GROUP: &str = "all";
pub const UNGROUPED_GROUP: &str = "ungrouped";
/// Top-level key of the `--list` document holding host variables; never a group name.
pub const META_KEY: &str = "_meta";

// guards against parent_group loops when walking descendants
const GROUP_DEPTH_LIMIT: usize = 20;

#[derive(Debug)]
pub struct Inventory {
    pub groups : IndexMap<String, Group>,
    pub hosts  : IndexMap<String, Host>,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new()
    }
}

impl Inventory {

    pub fn new() -> Self {
        let mut groups = IndexMap::new();
        groups.insert(ALL_GROUP.to_string(), Group::new(ALL_GROUP));
        Self {
            groups,
            hosts : IndexMap::new(),
        }
    }

    pub fn has_group(&self, group_name: &str) -> bool {
        return self.groups.contains_key(group_name);
    }

    pub fn get_group(&self, group_name: &str) -> Option<&Group> {
        return self.groups.get(group_name);
    }

    pub fn has_host(&self, host_name: &str) -> bool {
        return self.hosts.contains_key(host_name);
    }

    pub fn get_host(&self, host_name: &str) -> Option<&Host> {
        return self.hosts.get(host_name);
    }

    pub fn get_host_names(&self) -> Vec<String> {
        return self.hosts.keys().cloned().collect();
    }

    /// Groups other than the implicit `all`
    pub fn get_group_names(&self) -> Vec<String> {
        return self.groups.keys().filter(|k| k.as_str() != ALL_GROUP).cloned().collect();
    }

    /// Hosts that belong to no group besides `all`, plus hosts placed in an
    /// explicit `ungrouped` group
    pub fn get_ungrouped_host_names(&self) -> Vec<String> {
        return self.hosts.values()
            .filter(|h| h.has_group(UNGROUPED_GROUP) || h.groups.is_empty())
            .map(|h| h.name.clone())
            .collect();
    }

    /// Hosts of a group and of all groups below it. `all` holds every host.
    pub fn get_descendant_host_names(&self, group_name: &str) -> Vec<String> {
        if group_name == ALL_GROUP {
            return self.get_host_names();
        }
        if group_name == UNGROUPED_GROUP {
            let mut results = self.get_ungrouped_host_names();
            if let Some(group) = self.groups.get(UNGROUPED_GROUP) {
                for child in group.subgroups.iter() {
                    self.collect_descendant_hosts(child, GROUP_DEPTH_LIMIT, &mut results);
                }
            }
            return results;
        }
        let mut results: Vec<String> = Vec::new();
        self.collect_descendant_hosts(group_name, GROUP_DEPTH_LIMIT, &mut results);
        results
    }

    fn collect_descendant_hosts(&self, group_name: &str, depth_limit: usize, results: &mut Vec<String>) {
        let group = match self.groups.get(group_name) {
            Some(g) => g,
            None => return,
        };
        for host in group.hosts.iter() {
            if !results.contains(host) {
                results.push(host.clone());
            }
        }
        if depth_limit == 0 {
            return;
        }
        for child in group.subgroups.iter() {
            self.collect_descendant_hosts(child, depth_limit - 1, results);
        }
    }

    // ==============================================================================================================
    // INVENTORY SCRIPT OUTPUT
    // ==============================================================================================================

    /// The `--list` document: every group with its hosts and children plus
    /// `_meta.hostvars`.
    pub fn to_list_json(&self) -> Value {
        let mut doc = Map::new();

        let mut hostvars = Map::new();
        for (name, host) in self.hosts.iter() {
            hostvars.insert(name.clone(), host.get_variables_json());
        }
        doc.insert(META_KEY.to_string(), json!({ "hostvars": hostvars }));

        let mut top_level: Vec<String> = self.groups.values()
            .filter(|g| g.name != ALL_GROUP && g.name != UNGROUPED_GROUP && g.is_top_level())
            .map(|g| g.name.clone())
            .collect();
        top_level.push(UNGROUPED_GROUP.to_string());
        doc.insert(ALL_GROUP.to_string(), json!({ "children": top_level }));

        for group in self.groups.values() {
            if group.name == ALL_GROUP || group.name == UNGROUPED_GROUP {
                continue;
            }
            doc.insert(group.name.clone(), group_entry(group.get_direct_host_names(), group.get_subgroup_names()));
        }

        let ungrouped = self.get_ungrouped_host_names();
        let ungrouped_children = match self.groups.get(UNGROUPED_GROUP) {
            Some(g) => g.get_subgroup_names(),
            None => Vec::new(),
        };
        doc.insert(UNGROUPED_GROUP.to_string(), group_entry(ungrouped, ungrouped_children));

        Value::Object(doc)
    }

    /// The `--host NAME` document. Unknown hosts yield an empty mapping.
    pub fn host_vars_json(&self, host_name: &str) -> Value {
        match self.hosts.get(host_name) {
            Some(host) => host.get_variables_json(),
            None => Value::Object(Map::new()),
        }
    }
}

/// Names that would collide with the structure of the `--list` document.
pub fn is_reserved_group_name(name: &str) -> bool {
    name == META_KEY
}

fn group_entry(hosts: Vec<String>, children: Vec<String>) -> Value {
    let mut entry = Map::new();
    if !hosts.is_empty() {
        entry.insert(String::from("hosts"), json!(hosts));
    }
    if !children.is_empty() {
        entry.insert(String::from("children"), json!(children));
    }
    Value::Object(entry)
}

impl InventorySink for Inventory {

    fn add_host(&mut self, host: &str) {
        if self.has_host(host) {
            return;
        }
        self.hosts.insert(host.to_string(), Host::new(host));
        if let Some(all) = self.groups.get_mut(ALL_GROUP) {
            all.add_host(host);
        }
    }

    fn set_variable(&mut self, host: &str, name: &str, value: Value) -> Result<()> {
        match self.hosts.get_mut(host) {
            Some(h) => {
                h.set_variable(name, value);
                Ok(())
            },
            None => Err(InventoryError::Record(format!("cannot set '{}' on unknown host '{}'", name, host))),
        }
    }

    fn get_host_variables(&self, host: &str) -> Option<Map<String, Value>> {
        self.hosts.get(host).map(|h| h.get_variables().clone())
    }

    fn add_group(&mut self, group: &str) -> Result<String> {
        if is_reserved_group_name(group) {
            return Err(InventoryError::Group(format!("'{}' is reserved and cannot be used as a group name", group)));
        }
        if !self.has_group(group) {
            self.groups.insert(group.to_string(), Group::new(group));
        }
        Ok(group.to_string())
    }

    fn add_host_to_group(&mut self, group: &str, host: &str) -> Result<()> {
        if group == ALL_GROUP {
            return Ok(());
        }
        self.add_group(group)?;
        let host_obj = self.hosts.get_mut(host).ok_or_else(
            || InventoryError::Group(format!("cannot add unknown host '{}' to group '{}'", host, group))
        )?;
        host_obj.add_group(group);
        if let Some(g) = self.groups.get_mut(group) {
            g.add_host(host);
        }
        Ok(())
    }

    fn add_child_group(&mut self, parent: &str, child: &str) -> Result<()> {
        if parent == ALL_GROUP {
            self.add_group(child)?;
            return Ok(());
        }
        if child == ALL_GROUP {
            return Err(InventoryError::Group(format!("'{}' cannot be a child of '{}'", ALL_GROUP, parent)));
        }
        self.add_group(parent)?;
        self.add_group(child)?;
        if let Some(p) = self.groups.get_mut(parent) {
            p.add_subgroup(child).map_err(InventoryError::Group)?;
        }
        if let Some(c) = self.groups.get_mut(child) {
            c.add_parent(parent).map_err(InventoryError::Group)?;
        }
        Ok(())
    }
}
