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

use std::time::Duration;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use crate::config::PluginConfig;
use crate::drp::machine::{decode_machines, excerpt, Machine};
use crate::error::{InventoryError, Result};

/// Something that can produce the full list of machine records.
pub trait MachineSource {
    /// Human readable origin, used in logs.
    fn describe(&self) -> String;
    fn fetch_machines(&self) -> Result<Vec<Machine>>;
}

/// Blocking client for `GET {endpoint}/api/v3/machines`.
///
/// Certificate checking is a property of this client only: when `validate_certs`
/// is off the underlying reqwest client accepts invalid certificates and nothing
/// else in the process is affected.
pub struct DrpClient {
    url: String,
    user: String,
    password: String,
    validate_certs: bool,
    timeout: Duration,
}

impl DrpClient {

    pub fn new(config: &PluginConfig) -> Self {
        Self {
            url: config.machines_url(),
            user: config.user.clone(),
            password: config.password.clone(),
            validate_certs: config.validate_certs,
            timeout: config.timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn build_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .user_agent(concat!("drp-inventory/", env!("CARGO_PKG_VERSION")))
            .danger_accept_invalid_certs(!self.validate_certs)
            .timeout(self.timeout)
            .build()
            .map_err(|e| InventoryError::Http(format!("Failed to create HTTP client: {}", e)))
    }
}

impl MachineSource for DrpClient {

    fn describe(&self) -> String {
        self.url.clone()
    }

    fn fetch_machines(&self) -> Result<Vec<Machine>> {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| InventoryError::Http(format!("Failed to create async runtime: {}", e)))?;

        rt.block_on(async {
            let client = self.build_client()?;

            let response = client.get(&self.url)
                .basic_auth(&self.user, Some(&self.password))
                .header(ACCEPT, "application/json")
                .header(CONTENT_TYPE, "application/json")
                .send()
                .await
                .map_err(|e| InventoryError::Http(format!("Failed to fetch machines from {}: {}", self.url, e)))?;

            let status = response.status();
            let text = response.text()
                .await
                .map_err(|e| InventoryError::Http(format!("Failed to read response from {}: {}", self.url, e)))?;

            if !status.is_success() {
                return Err(InventoryError::Http(format!("{} returned status {}: {}", self.url, status, excerpt(&text))));
            }

            decode_machines(&text)
        })
    }
}

/// A fixed set of records, for offline use and tests.
pub struct StaticMachineSource {
    machines: Vec<Machine>,
}

impl StaticMachineSource {
    pub fn new(machines: Vec<Machine>) -> Self {
        Self { machines }
    }

    pub fn from_json(body: &str) -> Result<Self> {
        Ok(Self::new(decode_machines(body)?))
    }
}

impl MachineSource for StaticMachineSource {
    fn describe(&self) -> String {
        format!("{} static machine records", self.machines.len())
    }

    fn fetch_machines(&self) -> Result<Vec<Machine>> {
        Ok(self.machines.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_url_and_settings_from_config() {
        let config = PluginConfig::new("https://10.10.10.6:8092/", "rocketskates:r0cketsk8ts")
            .unwrap()
            .timeout(Duration::from_secs(7));
        let client = DrpClient::new(&config);
        assert_eq!(client.url(), "https://10.10.10.6:8092/api/v3/machines");
        assert_eq!(client.timeout, Duration::from_secs(7));
        assert!(!client.validate_certs);
        assert!(client.build_client().is_ok());
    }

    #[test]
    fn test_unreachable_endpoint_is_http_error() {
        // port 9 (discard) on localhost is not expected to accept connections
        let config = PluginConfig::new("http://127.0.0.1:9", "a:b")
            .unwrap()
            .timeout(Duration::from_secs(2));
        let err = DrpClient::new(&config).fetch_machines().unwrap_err();
        assert!(matches!(err, InventoryError::Http(_)));
    }

    #[test]
    fn test_static_source() {
        let source = StaticMachineSource::from_json(r#"[{"Name":"a"},{"Name":"b"}]"#).unwrap();
        assert_eq!(source.fetch_machines().unwrap().len(), 2);
        assert_eq!(source.describe(), "2 static machine records");
    }
}
