//! Per-domain record schemas for the collected tenant exports.
//!
//! Field names follow the PascalCase keys written by the collection layer.
//! Everything except list containers is optional; absent or mis-shaped
//! values decode to `None` (see [`super::de`]).

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::de::{self, CodedEnum, coded_enum_deserialize};

// ---------------------------------------------------------------------------
// Voice routing
// ---------------------------------------------------------------------------

/// `VoiceRouting.json`: phone number inventory plus routing configuration
/// that is only passed through to the detailed report.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VoiceRoutingDoc {
    #[serde(default, deserialize_with = "de::one_or_many")]
    pub phone_number_assignments: Vec<PhoneInventoryRecord>,

    /// Voice routing policies, PSTN usages, gateways, ...
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PhoneInventoryRecord {
    #[serde(default, deserialize_with = "de::text")]
    pub telephone_number: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub assigned_pstn_target_id: Option<String>,
    #[serde(default, deserialize_with = "de::lenient")]
    pub number_type: Option<NumberType>,
    #[serde(default, deserialize_with = "de::flag")]
    pub capabilities_user: Option<bool>,
    #[serde(default, deserialize_with = "de::flag")]
    pub capabilities_voice_application: Option<bool>,
    #[serde(default, deserialize_with = "de::text")]
    pub pstn_assignment_status: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub activation_state: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub place_name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NumberType {
    User,
    ResourceAccount,
    Unknown,
}

impl CodedEnum for NumberType {
    fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::User),
            1 => Some(Self::ResourceAccount),
            _ => None,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "user" => Some(Self::User),
            "resourceaccount" | "voiceapplication" | "voiceapp" => Some(Self::ResourceAccount),
            _ => None,
        }
    }

    fn other(_raw: String) -> Self {
        Self::Unknown
    }
}

impl NumberType {
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::ResourceAccount => "Resource Account",
            Self::Unknown => "Unknown",
        }
    }
}

// ---------------------------------------------------------------------------
// User voice settings
// ---------------------------------------------------------------------------

/// `UserSettings.json`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UserSettingsDoc {
    #[serde(default, deserialize_with = "de::one_or_many")]
    pub voice_user_settings: Vec<VoiceUserRecord>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct VoiceUserRecord {
    #[serde(rename = "LineURI", default, deserialize_with = "de::text")]
    pub line_uri: Option<String>,
    #[serde(rename = "OnPremLineURI", default, deserialize_with = "de::text")]
    pub on_prem_line_uri: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub user_principal_name: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub display_name: Option<String>,
    #[serde(default, deserialize_with = "de::policy_name")]
    pub voice_policy: Option<String>,
    #[serde(default, deserialize_with = "de::policy_name")]
    pub voice_routing_policy: Option<String>,
    #[serde(default, deserialize_with = "de::policy_name")]
    pub calling_line_identity: Option<String>,
    #[serde(default, deserialize_with = "de::flag")]
    pub enterprise_voice_enabled: Option<bool>,
}

impl VoiceUserRecord {
    /// Online line URI first, on-premises variant as fallback.
    pub fn effective_line_uri(&self) -> Option<&str> {
        self.line_uri
            .as_deref()
            .or(self.on_prem_line_uri.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Resource account bindings (shared by queues and attendants)
// ---------------------------------------------------------------------------

/// Binding of a call queue or auto attendant to a resource account.
///
/// Exports may carry both a key and its alias (`ResourceAccountId` and
/// `ObjectId`); the first present key wins instead of rejecting the record.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ResourceBinding {
    #[serde(rename = "CallQueueId")]
    pub owner_id: Option<String>,
    #[serde(rename = "CallQueueName")]
    pub owner_name: Option<String>,
    #[serde(rename = "ResourceAccount")]
    pub resource_account: Option<String>,
    #[serde(rename = "ResourceAccountId")]
    pub resource_account_id: Option<String>,
    #[serde(rename = "PhoneNumber")]
    pub phone_number: Option<String>,
}

impl<'de> Deserialize<'de> for ResourceBinding {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(d)?;
        let first = |keys: &[&str]| {
            keys.iter()
                .find_map(|k| map.get(*k).and_then(de::value_to_text))
        };

        Ok(Self {
            owner_id: first(&["CallQueueId", "AutoAttendantId"]),
            owner_name: first(&["CallQueueName", "AutoAttendantName"]),
            resource_account: first(&["ResourceAccount"]),
            resource_account_id: first(&["ResourceAccountId", "ObjectId"]),
            phone_number: first(&["PhoneNumber"]),
        })
    }
}

// ---------------------------------------------------------------------------
// Call queues
// ---------------------------------------------------------------------------

/// `CallQueues.json`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CallQueueDoc {
    #[serde(default, deserialize_with = "de::one_or_many")]
    pub call_queue_permissions: Vec<ResourceBinding>,
    #[serde(default, deserialize_with = "de::one_or_many")]
    pub call_queue_details: Vec<CallQueue>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CallQueue {
    #[serde(default, deserialize_with = "de::text")]
    pub identity: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de::lenient")]
    pub routing_method: Option<RoutingMethod>,
    #[serde(default, deserialize_with = "de::flag")]
    pub conference_mode: Option<bool>,
    #[serde(default, deserialize_with = "de::count")]
    pub agent_alert_time: Option<u32>,
    #[serde(default, deserialize_with = "de::count")]
    pub overflow_threshold: Option<u32>,
    #[serde(default, deserialize_with = "de::lenient")]
    pub overflow_action: Option<QueueAction>,
    #[serde(default, deserialize_with = "de::lenient")]
    pub overflow_action_target: Option<CallTarget>,
    #[serde(default, deserialize_with = "de::count")]
    pub timeout_threshold: Option<u32>,
    #[serde(default, deserialize_with = "de::lenient")]
    pub timeout_action: Option<QueueAction>,
    #[serde(default, deserialize_with = "de::lenient")]
    pub timeout_action_target: Option<CallTarget>,
    /// Agent references; identities are not resolvable from the export
    #[serde(default, deserialize_with = "de::one_or_many")]
    pub agents: Vec<Value>,
    #[serde(default, deserialize_with = "de::one_or_many")]
    pub application_instances: Vec<String>,
}

impl CallQueue {
    pub fn id(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.identity.as_deref())
            .unwrap_or("Unnamed Call Queue")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RoutingMethod {
    AttendantRouting,
    Serial,
    RoundRobin,
    LongestIdle,
    Other(String),
}

impl CodedEnum for RoutingMethod {
    fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::AttendantRouting),
            1 => Some(Self::Serial),
            2 => Some(Self::RoundRobin),
            3 => Some(Self::LongestIdle),
            _ => None,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "attendant" | "attendantrouting" => Some(Self::AttendantRouting),
            "serial" => Some(Self::Serial),
            "roundrobin" => Some(Self::RoundRobin),
            "longestidle" => Some(Self::LongestIdle),
            _ => None,
        }
    }

    fn other(raw: String) -> Self {
        Self::Other(raw)
    }
}

impl RoutingMethod {
    pub fn label(&self) -> String {
        match self {
            Self::AttendantRouting => "Attendant Routing".to_string(),
            Self::Serial => "Serial Routing".to_string(),
            Self::RoundRobin => "Round Robin".to_string(),
            Self::LongestIdle => "Longest Idle".to_string(),
            Self::Other(raw) => format!("Routing Method {raw}"),
        }
    }
}

/// Overflow and timeout handling share one action vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum QueueAction {
    Disconnect,
    Forward,
    Voicemail,
    SharedVoicemail,
    Other(String),
}

impl CodedEnum for QueueAction {
    fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Disconnect),
            1 => Some(Self::Forward),
            2 => Some(Self::Voicemail),
            3 => Some(Self::SharedVoicemail),
            _ => None,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "disconnect" | "disconnectwithbusy" => Some(Self::Disconnect),
            "forward" => Some(Self::Forward),
            "voicemail" => Some(Self::Voicemail),
            "sharedvoicemail" => Some(Self::SharedVoicemail),
            _ => None,
        }
    }

    fn other(raw: String) -> Self {
        Self::Other(raw)
    }
}

impl QueueAction {
    pub fn label(&self) -> String {
        match self {
            Self::Disconnect => "Disconnect".to_string(),
            Self::Forward => "Forward".to_string(),
            Self::Voicemail => "Voicemail".to_string(),
            Self::SharedVoicemail => "Shared Voicemail".to_string(),
            Self::Other(raw) => format!("Action {raw}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Auto attendants
// ---------------------------------------------------------------------------

/// `AutoAttendants.json`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AutoAttendantDoc {
    #[serde(default, deserialize_with = "de::one_or_many")]
    pub auto_attendant_permissions: Vec<ResourceBinding>,
    #[serde(default, deserialize_with = "de::one_or_many")]
    pub auto_attendant_details: Vec<AutoAttendant>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct AutoAttendant {
    #[serde(default, deserialize_with = "de::text")]
    pub identity: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub language_id: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub voice_id: Option<String>,
    #[serde(default, deserialize_with = "de::text")]
    pub time_zone_id: Option<String>,
    #[serde(default, deserialize_with = "de::lenient")]
    pub default_call_flow: Option<CallFlowDefinition>,
    /// Schedule-based routing rules; only counted
    #[serde(default, deserialize_with = "de::one_or_many")]
    pub call_handling_associations: Vec<Value>,
    #[serde(default, deserialize_with = "de::one_or_many")]
    pub application_instances: Vec<String>,
}

impl AutoAttendant {
    pub fn id(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.identity.as_deref())
            .unwrap_or("Unnamed Auto Attendant")
    }

    pub fn menu(&self) -> Option<&Menu> {
        self.default_call_flow
            .as_ref()
            .and_then(|flow| flow.menu.as_ref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CallFlowDefinition {
    #[serde(default, deserialize_with = "de::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de::lenient")]
    pub menu: Option<Menu>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Menu {
    #[serde(default, deserialize_with = "de::text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de::one_or_many")]
    pub menu_options: Vec<MenuOption>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct MenuOption {
    #[serde(default, deserialize_with = "de::lenient")]
    pub dtmf_response: Option<DtmfResponse>,
    #[serde(default, deserialize_with = "de::one_or_many")]
    pub voice_responses: Vec<String>,
    #[serde(default, deserialize_with = "de::lenient")]
    pub action: Option<MenuAction>,
    #[serde(default, deserialize_with = "de::lenient")]
    pub call_target: Option<CallTarget>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CallTarget {
    #[serde(default, deserialize_with = "de::text")]
    pub id: Option<String>,
    #[serde(rename = "Type", default, deserialize_with = "de::lenient")]
    pub target_type: Option<TargetType>,
}

/// Key that selects a menu option. `Automatic` is the no-input/timeout sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum DtmfResponse {
    Digit(u8),
    Star,
    Pound,
    Automatic,
    Other(String),
}

impl CodedEnum for DtmfResponse {
    fn from_code(code: i64) -> Option<Self> {
        match code {
            0..=9 => u8::try_from(code).ok().map(Self::Digit),
            10 => Some(Self::Star),
            11 => Some(Self::Pound),
            12 => Some(Self::Automatic),
            _ => None,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "tonestar" | "*" => Some(Self::Star),
            "tonepound" | "#" => Some(Self::Pound),
            "automatic" | "timeout" => Some(Self::Automatic),
            other => other
                .strip_prefix("tone")
                .and_then(|digit| digit.parse::<u8>().ok())
                .filter(|digit| *digit <= 9)
                .map(Self::Digit),
        }
    }

    fn other(raw: String) -> Self {
        Self::Other(raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum MenuAction {
    Disconnect,
    TransferToTarget,
    PlayAnnouncement,
    TransferToOperator,
    Other(String),
}

impl CodedEnum for MenuAction {
    fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::Disconnect),
            1 => Some(Self::TransferToTarget),
            2 => Some(Self::PlayAnnouncement),
            3 => Some(Self::TransferToOperator),
            _ => None,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "disconnect" | "disconnectcall" => Some(Self::Disconnect),
            "transfertotarget" | "transfercalltotarget" => Some(Self::TransferToTarget),
            "playannouncement" | "announcement" => Some(Self::PlayAnnouncement),
            "transfertooperator" | "transfercalltooperator" => Some(Self::TransferToOperator),
            _ => None,
        }
    }

    fn other(raw: String) -> Self {
        Self::Other(raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum TargetType {
    User,
    AutoAttendant,
    CallQueue,
    Voicemail,
    Pstn,
    Other(String),
}

impl CodedEnum for TargetType {
    fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Self::User),
            1 => Some(Self::AutoAttendant),
            2 => Some(Self::CallQueue),
            3 => Some(Self::Voicemail),
            4 => Some(Self::Pstn),
            _ => None,
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "user" => Some(Self::User),
            "autoattendant" => Some(Self::AutoAttendant),
            "callqueue" => Some(Self::CallQueue),
            "voicemail" | "sharedvoicemail" => Some(Self::Voicemail),
            "pstn" | "externalpstn" => Some(Self::Pstn),
            _ => None,
        }
    }

    fn other(raw: String) -> Self {
        Self::Other(raw)
    }
}

coded_enum_deserialize!(NumberType, RoutingMethod, QueueAction, DtmfResponse, MenuAction, TargetType);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn binding_with_key_and_alias_keeps_its_number() {
        let doc: CallQueueDoc = serde_json::from_value(json!({
            "CallQueuePermissions": [{
                "CallQueueId": "q1",
                "AutoAttendantId": "ignored",
                "ResourceAccountId": "acct-1",
                "ObjectId": "acct-2",
                "PhoneNumber": "+15550001111"
            }]
        }))
        .unwrap();

        assert_eq!(doc.call_queue_permissions.len(), 1);
        let binding = &doc.call_queue_permissions[0];
        assert_eq!(binding.owner_id.as_deref(), Some("q1"));
        assert_eq!(binding.resource_account_id.as_deref(), Some("acct-1"));
        assert_eq!(binding.phone_number.as_deref(), Some("+15550001111"));
    }

    #[test]
    fn attendant_binding_reads_alias_keys() {
        let binding: ResourceBinding = serde_json::from_value(json!({
            "AutoAttendantId": "aa1",
            "AutoAttendantName": "Main",
            "ObjectId": "acct-9",
            "PhoneNumber": 18005550100_u64
        }))
        .unwrap();

        assert_eq!(binding.owner_id.as_deref(), Some("aa1"));
        assert_eq!(binding.owner_name.as_deref(), Some("Main"));
        assert_eq!(binding.resource_account_id.as_deref(), Some("acct-9"));
        assert_eq!(binding.phone_number.as_deref(), Some("18005550100"));
    }

    #[test]
    fn enums_decode_from_codes_and_names() {
        let q: CallQueue = serde_json::from_value(json!({
            "Identity": "q1",
            "RoutingMethod": "RoundRobin",
            "OverflowAction": 0,
            "TimeoutAction": "7"
        }))
        .unwrap();

        assert_eq!(q.routing_method, Some(RoutingMethod::RoundRobin));
        assert_eq!(q.overflow_action, Some(QueueAction::Disconnect));
        assert_eq!(q.timeout_action, Some(QueueAction::Other("7".to_string())));
    }

    #[test]
    fn dtmf_tones_decode() {
        let option: MenuOption = serde_json::from_value(json!({
            "DtmfResponse": "Tone3",
            "Action": "TransferCallToTarget",
            "CallTarget": { "Id": "abc", "Type": 2 }
        }))
        .unwrap();

        assert_eq!(option.dtmf_response, Some(DtmfResponse::Digit(3)));
        assert_eq!(option.action, Some(MenuAction::TransferToTarget));
        let target = option.call_target.unwrap();
        assert_eq!(target.target_type, Some(TargetType::CallQueue));
        assert_eq!(target.id.as_deref(), Some("abc"));
    }

    #[test]
    fn depth_truncated_menu_is_absent() {
        let aa: AutoAttendant = serde_json::from_value(json!({
            "Identity": "aa1",
            "DefaultCallFlow": { "Name": "Default", "Menu": "Microsoft.Rtc.Management.Hosted.OAA.Models.Menu" }
        }))
        .unwrap();

        let flow = aa.default_call_flow.as_ref().unwrap();
        assert_eq!(flow.name.as_deref(), Some("Default"));
        assert!(aa.menu().is_none());
    }

    #[test]
    fn binding_accepts_attendant_keys() {
        let b: ResourceBinding = serde_json::from_value(json!({
            "AutoAttendantId": "aa1",
            "AutoAttendantName": "Main",
            "ResourceAccount": "main@contoso.com",
            "PhoneNumber": "tel:+18005550100"
        }))
        .unwrap();

        assert_eq!(b.owner_id.as_deref(), Some("aa1"));
        assert_eq!(b.owner_name.as_deref(), Some("Main"));
        assert_eq!(b.phone_number.as_deref(), Some("tel:+18005550100"));
    }

    #[test]
    fn number_type_falls_back_to_unknown() {
        let r: PhoneInventoryRecord = serde_json::from_value(json!({
            "TelephoneNumber": "+19845551234",
            "NumberType": "DirectRouting"
        }))
        .unwrap();

        assert_eq!(r.number_type, Some(NumberType::Unknown));
    }

    #[test]
    fn user_line_uri_prefers_online_value() {
        let u: VoiceUserRecord = serde_json::from_value(json!({
            "LineURI": "",
            "OnPremLineURI": "tel:+15551230000"
        }))
        .unwrap();

        assert_eq!(u.effective_line_uri(), Some("tel:+15551230000"));
    }
}
