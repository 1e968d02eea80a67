//! Core data models for the cluster state document

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;

/// Top-level cluster state as served by `/rest/v0/state/0`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClusterState {
    #[serde(default, deserialize_with = "null_as_default")]
    pub hosts: HashMap<String, HostRecord>,
}

impl ClusterState {
    /// Interpret an already-parsed JSON document as cluster state
    pub fn from_value(document: &Value) -> serde_json::Result<Self> {
        Self::deserialize(document)
    }
}

/// Per-host entry of the state document
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub host_health: Option<HostHealth>,
    /// Workloads placed on the host
    #[serde(default, deserialize_with = "null_as_default")]
    pub entities: Vec<WorkloadRecord>,
    /// Host-level capacity, only read by the histogram tool
    #[serde(default, deserialize_with = "lenient")]
    pub computing_resources: Option<ResourceBlock>,
}

impl HostRecord {
    /// Health state label, `unknown` when the host does not report one
    pub fn health_state(&self) -> &str {
        self.host_health
            .as_ref()
            .and_then(|h| h.state.as_deref())
            .unwrap_or(crate::UNKNOWN)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HostHealth {
    #[serde(default, deserialize_with = "lenient_label")]
    pub state: Option<String>,
}

/// One workload ("entity") running on a host
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkloadRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub scheduler_id: Option<SchedulerId>,
    #[serde(default, deserialize_with = "lenient")]
    pub computing_requirements: Option<ResourceBlock>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchedulerId {
    #[serde(default, deserialize_with = "lenient_label")]
    pub name: Option<String>,
}

/// A `resources` block keyed by vendor-qualified resource type.
///
/// Entries are kept as raw JSON so that resource kinds this tool does not
/// know about never fail the parse.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResourceBlock {
    #[serde(default, deserialize_with = "null_as_default")]
    pub resources: HashMap<String, Value>,
}

impl ResourceBlock {
    /// Raw quantity for a resource kind, if both the entry and its value field exist
    pub fn quantity(&self, kind: ResourceKind) -> Option<&Value> {
        self.resources
            .get(kind.wire_key())?
            .get(kind.value_field())
            .filter(|v| !v.is_null())
    }

    /// Quantity as a finite float, numeric strings included
    pub fn quantity_f64(&self, kind: ResourceKind) -> Option<f64> {
        let value = match self.quantity(kind)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }?;
        value.is_finite().then_some(value)
    }

    /// Quantity as an unsigned integer; fractions truncate, negatives clamp to 0
    pub fn quantity_u64(&self, kind: ResourceKind) -> Option<u64> {
        match self.quantity(kind)? {
            Value::Number(n) => n.as_u64().or_else(|| n.as_f64().and_then(clamp_to_u64)),
            Value::String(s) => {
                let s = s.trim();
                s.parse::<u64>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(clamp_to_u64))
            }
            _ => None,
        }
    }
}

fn clamp_to_u64(value: f64) -> Option<u64> {
    value.is_finite().then(|| value.max(0.0) as u64)
}

/// Resource kinds the tooling understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Ram,
    HddSpace,
    CpuPower,
}

/// Wire key and value field for each resource kind, indexed by discriminant
static RESOURCE_TABLE: [(ResourceKind, &str, &str); 3] = [
    (
        ResourceKind::Ram,
        "ru.yandex.schedulers.cluster.api.computing.RAM",
        "capacity",
    ),
    (
        ResourceKind::HddSpace,
        "ru.yandex.schedulers.cluster.api.computing.HDDSpace",
        "capacity",
    ),
    (
        ResourceKind::CpuPower,
        "ru.yandex.schedulers.cluster.api.computing.CPUPower",
        "powerPercents",
    ),
];

impl ResourceKind {
    fn entry(self) -> &'static (ResourceKind, &'static str, &'static str) {
        &RESOURCE_TABLE[self as usize]
    }

    /// Vendor-qualified key under `resources`
    pub fn wire_key(self) -> &'static str {
        self.entry().1
    }

    /// Field inside the resource entry holding the quantity
    pub fn value_field(self) -> &'static str {
        self.entry().2
    }

    /// Look a kind up by its wire key
    pub fn from_wire_key(key: &str) -> Option<Self> {
        RESOURCE_TABLE
            .iter()
            .find(|(_, wire, _)| *wire == key)
            .map(|(kind, _, _)| *kind)
    }
}

/// Deserialize `null` the same as an absent field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Deserialize a nested object, treating a value of the wrong shape as absent
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    Ok(Option::<Value>::deserialize(deserializer)?.and_then(|v| serde_json::from_value(v).ok()))
}

/// Deserialize a label from any scalar; arrays and objects count as absent
fn lenient_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        _ => None,
    })
}
