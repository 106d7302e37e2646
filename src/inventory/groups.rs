use indexmap::IndexSet;

/// A named group. Hosts and related groups are held by name; the inventory owns
/// the objects themselves.
#[derive(Debug)]
pub struct Group {
    pub name : String,
    pub subgroups : IndexSet<String>,
    pub parents : IndexSet<String>,
    pub hosts : IndexSet<String>,
}

impl Group {

    pub fn new(name: &str) -> Self {
        Self {
            name : name.to_string(),
            subgroups : IndexSet::new(),
            parents : IndexSet::new(),
            hosts : IndexSet::new(),
        }
    }

    pub fn add_subgroup(&mut self, name: &str) -> Result<(), String> {
        if name == self.name {
            return Err(format!("group '{}' cannot be a child of itself", name));
        }
        self.subgroups.insert(name.to_string());
        Ok(())
    }

    pub fn add_parent(&mut self, name: &str) -> Result<(), String> {
        if name == self.name {
            return Err(format!("group '{}' cannot be a parent of itself", name));
        }
        self.parents.insert(name.to_string());
        Ok(())
    }

    pub fn add_host(&mut self, name: &str) {
        self.hosts.insert(name.to_string());
    }

    pub fn has_host(&self, name: &str) -> bool {
        self.hosts.contains(name)
    }

    pub fn get_direct_host_names(&self) -> Vec<String> {
        return self.hosts.iter().cloned().collect();
    }

    pub fn get_subgroup_names(&self) -> Vec<String> {
        return self.subgroups.iter().cloned().collect();
    }

    pub fn is_top_level(&self) -> bool {
        self.parents.is_empty()
    }
}
