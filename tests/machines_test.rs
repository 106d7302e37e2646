mod common;

use common::machine;
use drp_inventory::{
    CaptureOutputHandler, Inventory, InventoryError, KeyedGroup, LogLevel, MachineSource,
    MachinesPlugin, PluginConfig, StaticMachineSource,
};
use serde_json::json;
use std::sync::Arc;

fn config() -> PluginConfig {
    PluginConfig::new("https://drp.example:8092", "rocketskates:r0cketsk8ts").unwrap()
}

#[test]
fn test_every_record_becomes_a_host_with_prefixed_variables() {
    let source = StaticMachineSource::from_json(common::MACHINES_JSON).unwrap();
    let machines = source.fetch_machines().unwrap();
    let plugin = MachinesPlugin::new(config());
    let mut inventory = Inventory::new();

    let summary = plugin.parse(&mut inventory, &source).unwrap();

    assert_eq!(summary.records, 2);
    assert_eq!(summary.hosts, 2);
    assert_eq!(summary.skipped, 0);
    assert_eq!(inventory.hosts.len(), 2);
    for record in machines.iter() {
        let name = record["Name"].as_str().unwrap();
        let host = inventory.get_host(name).unwrap();
        assert_eq!(host.get_variables().len(), record.len());
        for (field, value) in record.iter() {
            assert_eq!(host.get_variable(&format!("rackn_{}", field)), Some(value));
        }
    }
}

#[test]
fn test_populating_twice_is_idempotent() {
    let source = StaticMachineSource::from_json(common::MACHINES_JSON).unwrap();
    let machines = source.fetch_machines().unwrap();
    let plugin = MachinesPlugin::new(config().keyed_group(KeyedGroup::new("rackn_Stage")));

    let mut once = Inventory::new();
    plugin.populate(&mut once, &machines).unwrap();
    let mut twice = Inventory::new();
    plugin.populate(&mut twice, &machines).unwrap();
    plugin.populate(&mut twice, &machines).unwrap();

    assert_eq!(once.to_list_json(), twice.to_list_json());
}

#[test]
fn test_record_without_name_is_skipped_not_fatal() {
    let machines = vec![
        machine(json!({"Uuid": "no-name", "Stage": "discover"})),
        machine(json!({"Name": "d00-01", "Stage": "boot"})),
        machine(json!({"Name": 12, "Stage": "boot"})),
        machine(json!({"Name": "d00-02", "Stage": "boot"})),
    ];
    let capture = Arc::new(CaptureOutputHandler::new());
    let plugin = MachinesPlugin::new(config()).with_output_handler(capture.clone());
    let mut inventory = Inventory::new();

    let summary = plugin.populate(&mut inventory, &machines).unwrap();

    assert_eq!(summary.skipped, 2);
    assert_eq!(summary.hosts, 2);
    assert_eq!(inventory.get_host_names(), vec!["d00-01".to_string(), "d00-02".to_string()]);
    let warnings = capture.messages_at(LogLevel::Warning);
    assert_eq!(warnings.len(), 2);
    assert!(warnings[0].starts_with("record 0"));
    assert!(warnings[1].starts_with("record 2"));
}

#[test]
fn test_keyed_groups_on_stage() {
    let source = StaticMachineSource::from_json(common::MACHINES_JSON).unwrap();
    let plugin = MachinesPlugin::new(config().keyed_group(KeyedGroup::new("rackn_Stage")));
    let mut inventory = Inventory::new();

    let summary = plugin.parse(&mut inventory, &source).unwrap();

    assert_eq!(summary.groups, 2);
    assert_eq!(inventory.get_group("_discover").unwrap().get_direct_host_names(), vec!["d52-54-00-11-22-33".to_string()]);
    assert_eq!(inventory.get_group("_boot").unwrap().get_direct_host_names(), vec!["d52-54-00-44-55-66".to_string()]);
}

#[test]
fn test_duplicate_names_last_write_wins() {
    let machines = vec![
        machine(json!({"Name": "d00-01", "Stage": "discover", "Address": "10.0.0.1"})),
        machine(json!({"Name": "d00-01", "Stage": "boot"})),
    ];
    let plugin = MachinesPlugin::new(config());
    let mut inventory = Inventory::new();
    let summary = plugin.populate(&mut inventory, &machines).unwrap();

    assert_eq!(summary.hosts, 1);
    let host = inventory.get_host("d00-01").unwrap();
    assert_eq!(host.get_variable("rackn_Stage"), Some(&json!("boot")));
    assert_eq!(host.get_variable("rackn_Address"), Some(&json!("10.0.0.1")));
}

#[test]
fn test_compose_is_strict_even_when_strict_is_off() {
    let machines = vec![machine(json!({"Name": "d00-01"}))];
    let plugin = MachinesPlugin::new(config().strict(false).compose("ansible_host", "Address"));
    let mut inventory = Inventory::new();

    let err = plugin.populate(&mut inventory, &machines).unwrap_err();
    assert!(matches!(err, InventoryError::Template(_)));
}

#[test]
fn test_compose_runs_before_groups() {
    let source = StaticMachineSource::from_json(common::MACHINES_JSON).unwrap();
    let plugin = MachinesPlugin::new(
        config()
            .compose("ansible_host", "Address")
            .compose("lifecycle", "Stage")
            .keyed_group(KeyedGroup::new("lifecycle").prefix("lc"))
            .group("runnable", "rackn_Runnable")
    );
    let mut inventory = Inventory::new();
    plugin.parse(&mut inventory, &source).unwrap();

    let host = inventory.get_host("d52-54-00-11-22-33").unwrap();
    assert_eq!(host.get_variable("ansible_host"), Some(&json!("10.0.0.11")));
    assert!(inventory.get_group("lc_discover").unwrap().has_host("d52-54-00-11-22-33"));
    assert_eq!(inventory.get_group("runnable").unwrap().get_direct_host_names(), vec!["d52-54-00-11-22-33".to_string()]);
}

#[test]
fn test_group_failures_follow_strict_flag() {
    let source = StaticMachineSource::from_json(common::MACHINES_JSON).unwrap();

    let lenient = MachinesPlugin::new(config().group("pooled", "eq Pool \"default\""));
    let mut inventory = Inventory::new();
    lenient.parse(&mut inventory, &source).unwrap();
    assert!(inventory.get_group("pooled").is_none());

    let strict = MachinesPlugin::new(config().strict(true).group("pooled", "eq Pool \"default\""));
    let mut inventory = Inventory::new();
    let err = strict.parse(&mut inventory, &source).unwrap_err();
    assert!(matches!(err, InventoryError::Group(_)));
}

#[test]
fn test_list_document() {
    let source = StaticMachineSource::from_json(common::MACHINES_JSON).unwrap();
    let plugin = MachinesPlugin::new(config().group("discovering", "eq rackn_Stage \"discover\""));
    let mut inventory = Inventory::new();
    plugin.parse(&mut inventory, &source).unwrap();

    let doc = inventory.to_list_json();
    assert_eq!(doc["all"]["children"], json!(["discovering", "ungrouped"]));
    assert_eq!(doc["discovering"]["hosts"], json!(["d52-54-00-11-22-33"]));
    assert_eq!(doc["ungrouped"]["hosts"], json!(["d52-54-00-44-55-66"]));
    assert_eq!(doc["_meta"]["hostvars"]["d52-54-00-44-55-66"]["rackn_Address"], json!("10.0.0.12"));
}

#[test]
fn test_stage_named_meta_keeps_hostvars() {
    let source = StaticMachineSource::new(vec![
        machine(json!({"Name": "h1", "Stage": "meta"})),
        machine(json!({"Name": "h2", "Stage": "boot"})),
    ]);
    let capture = Arc::new(CaptureOutputHandler::new());
    let plugin = MachinesPlugin::new(config().keyed_group(KeyedGroup::new("rackn_Stage")))
        .with_output_handler(capture.clone());
    let mut inventory = Inventory::new();
    plugin.parse(&mut inventory, &source).unwrap();

    let doc = inventory.to_list_json();
    assert_eq!(doc["_meta"]["hostvars"]["h1"]["rackn_Stage"], json!("meta"));
    assert_eq!(doc["_meta"]["hostvars"]["h2"]["rackn_Stage"], json!("boot"));
    assert_eq!(doc["_boot"]["hosts"], json!(["h2"]));
    assert_eq!(doc["ungrouped"]["hosts"], json!(["h1"]));
    assert_eq!(capture.messages_at(LogLevel::Warning).len(), 1);
}

#[test]
fn test_configured_ungrouped_group_lists_its_hosts() {
    let source = StaticMachineSource::new(vec![machine(json!({"Name": "h1"}))]);
    let plugin = MachinesPlugin::new(config().group("ungrouped", "true"));
    let mut inventory = Inventory::new();
    plugin.parse(&mut inventory, &source).unwrap();

    let doc = inventory.to_list_json();
    assert_eq!(doc["all"]["children"], json!(["ungrouped"]));
    assert_eq!(doc["ungrouped"]["hosts"], json!(["h1"]));
}
