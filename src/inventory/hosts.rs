use indexmap::IndexSet;
use serde_json::{Map, Value};

#[derive(Debug)]
pub struct Host {
    pub name      : String,
    pub variables : Map<String, Value>,
    pub groups    : IndexSet<String>,
}

impl Host {

    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            variables: Map::new(),
            groups: IndexSet::new(),
        }
    }

    // ==============================================================================================================
    // PUBLIC API - most code can use this
    // ==============================================================================================================

    pub fn has_group(&self, group_name: &str) -> bool {
        return self.groups.contains(group_name);
    }

    pub fn get_group_names(&self) -> Vec<String> {
        return self.groups.iter().cloned().collect();
    }

    pub fn add_group(&mut self, name: &str) {
        self.groups.insert(name.to_string());
    }

    pub fn get_variables(&self) -> &Map<String, Value> {
        return &self.variables;
    }

    pub fn get_variable(&self, name: &str) -> Option<&Value> {
        return self.variables.get(name);
    }

    /// Last write wins; an existing key keeps its original position.
    pub fn set_variable(&mut self, name: &str, value: Value) {
        self.variables.insert(name.to_string(), value);
    }

    pub fn get_variables_json(&self) -> Value {
        return Value::Object(self.variables.clone());
    }
}
