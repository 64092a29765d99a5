//! Route53-style wire shape of the mutation plan
//!
//! ```json
//! {"Changes": [{"Action": "CREATE",
//!               "ResourceRecordSet": {"Name": "web1.example.com.", "Type": "A", "TTL": 300,
//!                                     "ResourceRecords": [{"Value": "10.0.0.1"}]}}]}
//! ```
//!
//! DELETE carries the existing record unmodified, so the provider can match it
//! exactly.

use serde::{Deserialize, Serialize};

use crate::model::{ChangeAction, MutationAction, RECORD_TYPE, ZoneRecord};

/// One value of a resource record set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceRecord {
    pub value: String,
}

/// A resource record set as the provider API expects it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceRecordSet {
    pub name: String,
    #[serde(rename = "Type")]
    pub record_type: String,
    #[serde(rename = "TTL")]
    pub ttl: u32,
    pub resource_records: Vec<ResourceRecord>,
}

/// A single change entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Change {
    pub action: ChangeAction,
    pub resource_record_set: ResourceRecordSet,
}

/// One submission to the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ChangeBatch {
    pub changes: Vec<Change>,
}

impl From<&ZoneRecord> for ResourceRecordSet {
    fn from(record: &ZoneRecord) -> Self {
        Self {
            name: record.name.clone(),
            record_type: RECORD_TYPE.to_string(),
            ttl: record.ttl,
            resource_records: record
                .values
                .iter()
                .map(|ip| ResourceRecord {
                    value: ip.to_string(),
                })
                .collect(),
        }
    }
}

impl From<&MutationAction> for Change {
    fn from(mutation: &MutationAction) -> Self {
        Self {
            action: mutation.action(),
            resource_record_set: mutation.record().into(),
        }
    }
}

impl ChangeBatch {
    /// Wire form of a batch of mutations, in order
    pub fn from_mutations(batch: &[MutationAction]) -> Self {
        Self {
            changes: batch.iter().map(Change::from).collect(),
        }
    }

    /// Compact JSON rendering
    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
