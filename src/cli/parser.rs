use std::path::PathBuf;
use clap::{ArgAction, Parser};

/// What the binary was asked to print
#[derive(Debug, Clone, PartialEq)]
pub enum CliMode {
    List,
    Host(String),
    Show,
}

#[derive(Parser, Debug)]
#[command(name = "drp-inventory", version, about = "Dynamic inventory of Digital Rebar Provision machines")]
pub struct CliParser {
    /// Inventory source file (name must end in rackn.yml, rackn.yaml, drp.yml or drp.yaml)
    #[arg(short = 'i', long = "inventory", env = "DRP_INVENTORY_SOURCE", value_name = "PATH")]
    pub inventory: String,

    /// Print every group and host variable as an inventory document (default)
    #[arg(long, conflicts_with_all = ["host", "show"])]
    pub list: bool,

    /// Print the variables of one host
    #[arg(long, value_name = "NAME", conflicts_with = "show")]
    pub host: Option<String>,

    /// Print groups and hosts as tables
    #[arg(long)]
    pub show: bool,

    /// Emit YAML instead of JSON
    #[arg(long, conflicts_with = "show")]
    pub yaml: bool,

    /// Indent JSON output
    #[arg(long)]
    pub pretty: bool,

    /// More output on stderr, repeat for more detail
    #[arg(short = 'v', long = "verbose", action = ArgAction::Count)]
    pub verbosity: u8,
}

impl CliParser {

    pub fn mode(&self) -> CliMode {
        if self.show {
            return CliMode::Show;
        }
        match &self.host {
            Some(name) => CliMode::Host(name.clone()),
            None => CliMode::List,
        }
    }

    /// The inventory path with a leading `~` expanded
    pub fn inventory_path(&self) -> Result<PathBuf, String> {
        expanduser::expanduser(&self.inventory).map_err(
            |e| format!("unable to expand inventory path {}: {}", self.inventory, e)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_mode_is_list() {
        let parser = CliParser::try_parse_from(["drp-inventory", "-i", "site.rackn.yml"]).unwrap();
        assert_eq!(parser.mode(), CliMode::List);
        assert_eq!(parser.verbosity, 0);
    }

    #[test]
    fn test_host_mode() {
        let parser = CliParser::try_parse_from(["drp-inventory", "-i", "drp.yml", "--host", "d00-11", "-vv"]).unwrap();
        assert_eq!(parser.mode(), CliMode::Host("d00-11".to_string()));
        assert_eq!(parser.verbosity, 2);
    }

    #[test]
    fn test_show_mode() {
        let parser = CliParser::try_parse_from(["drp-inventory", "-i", "drp.yml", "--show"]).unwrap();
        assert_eq!(parser.mode(), CliMode::Show);
    }

    #[test]
    fn test_list_conflicts_with_host() {
        assert!(CliParser::try_parse_from(["drp-inventory", "-i", "drp.yml", "--list", "--host", "x"]).is_err());
    }

    #[test]
    fn test_inventory_path_plain() {
        let parser = CliParser::try_parse_from(["drp-inventory", "-i", "/etc/ansible/drp.yml"]).unwrap();
        assert_eq!(parser.inventory_path().unwrap(), PathBuf::from("/etc/ansible/drp.yml"));
    }
}
