//! Tenant data snapshot: the typed, read-only view of one collection run.
//!
//! Each per-domain document is optional. A missing or unparsable file is
//! logged and treated as absent, so an empty data directory loads as an
//! empty snapshot.

pub mod de;
pub mod schema;

pub use schema::{
    AutoAttendant, AutoAttendantDoc, CallFlowDefinition, CallQueue, CallQueueDoc, CallTarget,
    DtmfResponse, Menu, MenuAction, MenuOption, NumberType, PhoneInventoryRecord, QueueAction,
    ResourceBinding, RoutingMethod, TargetType, UserSettingsDoc, VoiceRoutingDoc, VoiceUserRecord,
};

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::infra::config::DataFiles;
use crate::infra::io::{parse_json_document, read_text_lossy_bom};

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("data directory not found: {0}")]
    MissingDirectory(PathBuf),

    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default)]
pub struct TenantSnapshot {
    pub voice_routing: Option<VoiceRoutingDoc>,
    pub user_settings: Option<UserSettingsDoc>,
    pub call_queues: Option<CallQueueDoc>,
    pub auto_attendants: Option<AutoAttendantDoc>,
    pub calling_policies: Option<Value>,
    pub emergency: Option<Value>,
    pub compliance: Option<Value>,
}

impl TenantSnapshot {
    /// Load every domain document from `dir`. Only a missing directory is fatal.
    pub fn load(dir: &Path, files: &DataFiles) -> Result<Self, SnapshotError> {
        if !dir.is_dir() {
            return Err(SnapshotError::MissingDirectory(dir.to_path_buf()));
        }

        let snapshot = Self {
            voice_routing: load_optional(dir, &files.voice_routing),
            user_settings: load_optional(dir, &files.user_settings),
            call_queues: load_optional(dir, &files.call_queues),
            auto_attendants: load_optional(dir, &files.auto_attendants),
            calling_policies: load_optional(dir, &files.calling_policies),
            emergency: load_optional(dir, &files.emergency),
            compliance: load_optional(dir, &files.compliance),
        };

        info!(
            numbers = snapshot.phone_inventory().len(),
            users = snapshot.voice_users().len(),
            queues = snapshot.queues().len(),
            attendants = snapshot.attendants().len(),
            "loaded tenant snapshot from {}",
            dir.display()
        );

        Ok(snapshot)
    }

    pub fn phone_inventory(&self) -> &[PhoneInventoryRecord] {
        self.voice_routing
            .as_ref()
            .map(|doc| doc.phone_number_assignments.as_slice())
            .unwrap_or_default()
    }

    pub fn voice_users(&self) -> &[VoiceUserRecord] {
        self.user_settings
            .as_ref()
            .map(|doc| doc.voice_user_settings.as_slice())
            .unwrap_or_default()
    }

    pub fn queue_bindings(&self) -> &[ResourceBinding] {
        self.call_queues
            .as_ref()
            .map(|doc| doc.call_queue_permissions.as_slice())
            .unwrap_or_default()
    }

    pub fn queues(&self) -> &[CallQueue] {
        self.call_queues
            .as_ref()
            .map(|doc| doc.call_queue_details.as_slice())
            .unwrap_or_default()
    }

    pub fn attendant_bindings(&self) -> &[ResourceBinding] {
        self.auto_attendants
            .as_ref()
            .map(|doc| doc.auto_attendant_permissions.as_slice())
            .unwrap_or_default()
    }

    pub fn attendants(&self) -> &[AutoAttendant] {
        self.auto_attendants
            .as_ref()
            .map(|doc| doc.auto_attendant_details.as_slice())
            .unwrap_or_default()
    }

    /// Call queue by identity.
    pub fn queue(&self, id: &str) -> Option<&CallQueue> {
        self.queues().iter().find(|q| q.id() == Some(id))
    }

    /// Auto attendant by identity.
    pub fn attendant(&self, id: &str) -> Option<&AutoAttendant> {
        self.attendants().iter().find(|a| a.id() == Some(id))
    }

    /// True when no domain document was loaded at all.
    pub fn is_empty(&self) -> bool {
        self.voice_routing.is_none()
            && self.user_settings.is_none()
            && self.call_queues.is_none()
            && self.auto_attendants.is_none()
            && self.calling_policies.is_none()
            && self.emergency.is_none()
            && self.compliance.is_none()
    }

    /// Passthrough settings for the detailed report, in display order.
    pub fn detailed_sections(&self) -> Vec<(&'static str, Value)> {
        let mut sections = Vec::new();

        if let Some(doc) = &self.voice_routing
            && !doc.other.is_empty()
        {
            sections.push(("Voice Routing", Value::Object(doc.other.clone())));
        }
        if let Some(v) = &self.calling_policies {
            sections.push(("Calling Policies", v.clone()));
        }
        if let Some(v) = &self.emergency {
            sections.push(("Emergency Settings", v.clone()));
        }
        if let Some(v) = &self.compliance {
            sections.push(("Compliance Settings", v.clone()));
        }

        sections
    }
}

/// Read and parse one document; absence and failures both yield `None`.
fn load_optional<T: DeserializeOwned>(dir: &Path, file_name: &str) -> Option<T> {
    let path = dir.join(file_name);
    if !path.exists() {
        debug!("{} not present; treating domain as absent", path.display());
        return None;
    }

    match load_document(&path) {
        Ok(doc) => doc,
        Err(e) => {
            warn!("{e}; treating domain as absent");
            None
        }
    }
}

/// Read and parse one document, surfacing the failure.
pub fn load_document<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, SnapshotError> {
    let text = read_text_lossy_bom(path).map_err(|source| SnapshotError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    parse_json_document(&text).map_err(|source| SnapshotError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn missing_directory_is_an_error() {
        let err = TenantSnapshot::load(Path::new("/definitely/not/here"), &DataFiles::default())
            .unwrap_err();
        assert!(matches!(err, SnapshotError::MissingDirectory(_)));
    }

    #[test]
    fn empty_directory_loads_empty_snapshot() {
        let tmp = TempDir::new().unwrap();
        let snapshot = TenantSnapshot::load(tmp.path(), &DataFiles::default()).unwrap();

        assert!(snapshot.is_empty());
        assert!(snapshot.phone_inventory().is_empty());
        assert!(snapshot.queues().is_empty());
        assert!(snapshot.detailed_sections().is_empty());
    }

    #[test]
    fn unparsable_document_is_absent() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("CallQueues.json"), "{ not json").unwrap();
        fs::write(
            tmp.path().join("UserSettings.json"),
            "\u{feff}{\"VoiceUserSettings\": {\"LineURI\": \"tel:+15550001111\"}}",
        )
        .unwrap();

        let snapshot = TenantSnapshot::load(tmp.path(), &DataFiles::default()).unwrap();
        assert!(snapshot.call_queues.is_none());
        assert_eq!(snapshot.voice_users().len(), 1);
    }

    #[test]
    fn voice_routing_extras_become_detailed_section() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join("VoiceRouting.json"),
            r#"{"PhoneNumberAssignments": [], "OnlineVoiceRoutingPolicies": [{"Identity": "Global"}]}"#,
        )
        .unwrap();

        let snapshot = TenantSnapshot::load(tmp.path(), &DataFiles::default()).unwrap();
        let sections = snapshot.detailed_sections();
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].0, "Voice Routing");
        assert!(sections[0].1.get("OnlineVoiceRoutingPolicies").is_some());
    }
}
