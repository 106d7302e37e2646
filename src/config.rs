use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use indexmap::IndexMap;
use serde::Deserialize;
use crate::error::{InventoryError, Result, ErrorContext};
use crate::util::io::read_local_file;

/// Name a source file may declare in its `plugin:` key
pub const PLUGIN_NAME: &str = "rackn.drp.machines";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

// later entries win when more than one is set
const ENDPOINT_ENV: [&str; 1] = ["RS_ENDPOINT"];
const KEY_ENV: [&str; 2] = ["RS_KEY", "TOWER_PASSWORD"];

/// Where environment-provided options come from. The process environment in
/// production, a plain map in tests.
pub trait EnvSource {
    fn get(&self, name: &str) -> Option<String>;
}

pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

impl EnvSource for HashMap<String, String> {
    fn get(&self, name: &str) -> Option<String> {
        HashMap::get(self, name).cloned()
    }
}

/// One `keyed_groups` entry.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct KeyedGroup {
    pub key: Option<String>,
    #[serde(default)]
    pub prefix: String,
    #[serde(default = "default_separator")]
    pub separator: String,
    pub parent_group: Option<String>,
    pub default_value: Option<String>,
    pub trailing_separator: Option<bool>,
}

fn default_separator() -> String {
    String::from("_")
}

impl KeyedGroup {
    pub fn new(key: &str) -> Self {
        Self {
            key: Some(key.to_string()),
            prefix: String::new(),
            separator: default_separator(),
            parent_group: None,
            default_value: None,
            trailing_separator: None,
        }
    }

    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = prefix.to_string();
        self
    }

    pub fn separator(mut self, separator: &str) -> Self {
        self.separator = separator.to_string();
        self
    }

    pub fn parent_group(mut self, parent: &str) -> Self {
        self.parent_group = Some(parent.to_string());
        self
    }

    pub fn default_value(mut self, value: &str) -> Self {
        self.default_value = Some(value.to_string());
        self
    }

    pub fn trailing_separator(mut self, trailing: bool) -> Self {
        self.trailing_separator = Some(trailing);
        self
    }

    /// Reject entries with no `key` or with both `default_value` and `trailing_separator`.
    pub fn validate(&self) -> Result<()> {
        match &self.key {
            Some(k) if !k.trim().is_empty() => {},
            _ => return Err(InventoryError::Config(String::from("keyed_groups entry is missing 'key'"))),
        }
        if self.default_value.is_some() && self.trailing_separator.is_some() {
            return Err(InventoryError::Config(String::from(
                "parameters are mutually exclusive for keyed groups: default_value|trailing_separator"
            )));
        }
        Ok(())
    }
}

// the on-disk shape of a source file, before environment fallback and validation
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
struct SourceFile {
    plugin: Option<String>,
    rs_endpoint: Option<String>,
    rs_key: Option<String>,
    validate_certs: Option<bool>,
    strict: Option<bool>,
    compose: Option<IndexMap<String, String>>,
    groups: Option<IndexMap<String, String>>,
    keyed_groups: Option<Vec<KeyedGroup>>,
    leading_separator: Option<bool>,
    sanitize_group_names: Option<bool>,
    timeout: Option<u64>,
}

/// Resolved options for one parse. Immutable once built.
#[derive(Clone)]
pub struct PluginConfig {
    pub endpoint: String,
    pub user: String,
    pub password: String,
    pub validate_certs: bool,
    pub strict: bool,
    pub compose: IndexMap<String, String>,
    pub groups: IndexMap<String, String>,
    pub keyed_groups: Vec<KeyedGroup>,
    pub leading_separator: bool,
    pub sanitize_group_names: bool,
    pub timeout: Duration,
}

impl fmt::Debug for PluginConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginConfig")
            .field("endpoint", &self.endpoint)
            .field("user", &self.user)
            .field("password", &"********")
            .field("validate_certs", &self.validate_certs)
            .field("strict", &self.strict)
            .field("compose", &self.compose)
            .field("groups", &self.groups)
            .field("keyed_groups", &self.keyed_groups)
            .field("leading_separator", &self.leading_separator)
            .field("sanitize_group_names", &self.sanitize_group_names)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl PluginConfig {

    /// Build a config directly, `credential` is `user:password`.
    pub fn new(endpoint: &str, credential: &str) -> Result<Self> {
        let endpoint = normalize_endpoint(endpoint)?;
        let (user, password) = split_credential(credential)?;
        Ok(Self {
            endpoint,
            user,
            password,
            validate_certs: false,
            strict: false,
            compose: IndexMap::new(),
            groups: IndexMap::new(),
            keyed_groups: Vec::new(),
            leading_separator: true,
            sanitize_group_names: false,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        })
    }

    pub fn from_file(path: &Path, env: &dyn EnvSource) -> Result<Self> {
        let contents = read_local_file(path).context("reading inventory source")?;
        Self::from_yaml_str(&contents, env)
    }

    pub fn from_yaml_str(contents: &str, env: &dyn EnvSource) -> Result<Self> {
        let source: SourceFile = match contents.trim().is_empty() {
            true => SourceFile::default(),
            false => serde_yaml::from_str(contents)?,
        };

        if let Some(plugin) = &source.plugin {
            if plugin != PLUGIN_NAME {
                return Err(InventoryError::Config(format!(
                    "source file is for plugin '{}', expected '{}'", plugin, PLUGIN_NAME
                )));
            }
        }

        let endpoint = resolve_option(source.rs_endpoint, &ENDPOINT_ENV, env)
            .ok_or_else(|| InventoryError::Config(String::from(
                "rs_endpoint is required (set it in the source file or RS_ENDPOINT)"
            )))?;
        let credential = resolve_option(source.rs_key, &KEY_ENV, env)
            .ok_or_else(|| InventoryError::Config(String::from(
                "rs_key is required (set it in the source file, RS_KEY or TOWER_PASSWORD)"
            )))?;

        let mut config = Self::new(&endpoint, &credential)?;
        config.validate_certs = source.validate_certs.unwrap_or(false);
        config.strict = source.strict.unwrap_or(false);
        config.compose = source.compose.unwrap_or_default();
        config.groups = source.groups.unwrap_or_default();
        config.keyed_groups = source.keyed_groups.unwrap_or_default();
        config.leading_separator = source.leading_separator.unwrap_or(true);
        config.sanitize_group_names = source.sanitize_group_names.unwrap_or(false);

        match source.timeout {
            Some(0) => return Err(InventoryError::Config(String::from("timeout must be at least 1 second"))),
            Some(secs) => config.timeout = Duration::from_secs(secs),
            None => {}
        }

        for keyed in config.keyed_groups.iter() {
            keyed.validate()?;
        }
        Ok(config)
    }

    pub fn machines_url(&self) -> String {
        format!("{}/api/v3/machines", self.endpoint)
    }

    pub fn validate_certs(mut self, validate: bool) -> Self {
        self.validate_certs = validate;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn compose(mut self, variable: &str, expression: &str) -> Self {
        self.compose.insert(variable.to_string(), expression.to_string());
        self
    }

    pub fn group(mut self, group: &str, condition: &str) -> Self {
        self.groups.insert(group.to_string(), condition.to_string());
        self
    }

    pub fn keyed_group(mut self, keyed: KeyedGroup) -> Self {
        self.keyed_groups.push(keyed);
        self
    }

    pub fn leading_separator(mut self, leading: bool) -> Self {
        self.leading_separator = leading;
        self
    }

    pub fn sanitize_group_names(mut self, sanitize: bool) -> Self {
        self.sanitize_group_names = sanitize;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// the file wins over the environment, and among env vars the last one set wins
fn resolve_option(direct: Option<String>, env_names: &[&str], env: &dyn EnvSource) -> Option<String> {
    if direct.is_some() {
        return direct;
    }
    let mut value = None;
    for name in env_names.iter() {
        if let Some(v) = env.get(name) {
            value = Some(v);
        }
    }
    value
}

fn normalize_endpoint(endpoint: &str) -> Result<String> {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(InventoryError::Config(String::from("rs_endpoint must not be empty")));
    }
    Ok(trimmed.to_string())
}

/// Split `user:password` on the first colon.
pub fn split_credential(credential: &str) -> Result<(String, String)> {
    match credential.split_once(':') {
        Some((user, _)) if user.is_empty() => {
            Err(InventoryError::Config(String::from("rs_key has an empty user name")))
        },
        Some((user, password)) => Ok((user.to_string(), password.to_string())),
        None => Err(InventoryError::Config(String::from("rs_key must be in the form 'user:password'"))),
    }
}
