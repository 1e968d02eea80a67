//! Where a run gets its cluster state from
//!
//! The raw JSON is kept next to the typed view so the exact document that
//! was aggregated can be dumped for debugging.

use crate::client::CapiClient;
use crate::error::Result;
use crate::models::ClusterState;
use serde_json::Value;
use std::path::PathBuf;
use tracing::debug;

/// A parsed state document
#[derive(Debug, Clone)]
pub struct StateDocument {
    /// Document as received
    pub raw: Value,
    /// Typed view used for aggregation
    pub state: ClusterState,
}

impl StateDocument {
    /// Parse a state document from its text
    pub fn parse(text: &str) -> Result<Self> {
        let raw: Value = serde_json::from_str(text)?;
        let state = ClusterState::from_value(&raw)?;
        Ok(Self { raw, state })
    }

    pub fn host_count(&self) -> usize {
        self.state.hosts.len()
    }
}

/// Source of the state document for one run
#[derive(Debug, Clone)]
pub enum StateSource {
    /// Fetch from the live cluster API
    Live(CapiClient),
    /// Read a previously saved snapshot; no network access
    File(PathBuf),
}

impl StateSource {
    /// Load and parse the document
    pub async fn load(&self) -> Result<StateDocument> {
        let text = match self {
            StateSource::Live(client) => client.fetch_state_text().await?,
            StateSource::File(path) => {
                debug!(path = %path.display(), "Reading cluster state file");
                tokio::fs::read_to_string(path).await?
            }
        };
        StateDocument::parse(&text)
    }

    /// Short description for log records
    pub fn describe(&self) -> String {
        match self {
            StateSource::Live(client) => client
                .state_url()
                .map(|u| u.to_string())
                .unwrap_or_else(|_| "cluster API".to_string()),
            StateSource::File(path) => path.display().to_string(),
        }
    }
}
