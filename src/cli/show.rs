use crate::error::Result;
use crate::inventory::inventory::{Inventory, UNGROUPED_GROUP};
use crate::util::terminal::{banner, two_column_table};

/// Serialize an inventory document for stdout
pub fn render_document(doc: &serde_json::Value, yaml: bool, pretty: bool) -> Result<String> {
    if yaml {
        return Ok(serde_yaml::to_string(doc)?);
    }
    match pretty {
        true => Ok(serde_json::to_string_pretty(doc)?),
        false => Ok(serde_json::to_string(doc)?),
    }
}

pub fn render_list(inventory: &Inventory, yaml: bool, pretty: bool) -> Result<String> {
    render_document(&inventory.to_list_json(), yaml, pretty)
}

pub fn render_host(inventory: &Inventory, host_name: &str, yaml: bool, pretty: bool) -> Result<String> {
    render_document(&inventory.host_vars_json(host_name), yaml, pretty)
}

/// Rows of (group, hosts below it), `ungrouped` last
pub fn group_rows(inventory: &Inventory) -> Vec<(String, String)> {
    let mut rows: Vec<(String, String)> = inventory.get_group_names().into_iter()
        .filter(|name| name != UNGROUPED_GROUP)
        .map(|name| {
            let hosts = inventory.get_descendant_host_names(&name).join(", ");
            (name, hosts)
        })
        .collect();
    let ungrouped = inventory.get_descendant_host_names(UNGROUPED_GROUP);
    if !ungrouped.is_empty() {
        rows.push((UNGROUPED_GROUP.to_string(), ungrouped.join(", ")));
    }
    rows
}

/// Rows of (host, its direct groups)
pub fn host_rows(inventory: &Inventory) -> Vec<(String, String)> {
    inventory.hosts.values()
        .map(|host| {
            let groups = match host.groups.is_empty() {
                true => UNGROUPED_GROUP.to_string(),
                false => host.get_group_names().join(", "),
            };
            (host.name.clone(), groups)
        })
        .collect()
}

// drp-inventory -i drp.yml --show
pub fn show_inventory(inventory: &Inventory) {
    banner(&format!("{} hosts, {} groups", inventory.hosts.len(), inventory.get_group_names().len()));
    println!();
    two_column_table("Group", "Hosts", &group_rows(inventory));
    println!();
    two_column_table("Host", "Groups", &host_rows(inventory));
}
