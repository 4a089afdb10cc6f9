//! Phone number resolution engine with last-writer-wins merging
//!
//! Implements an ordered pass pipeline keyed by normalized number:
//! 1. Inventory → every assigned number, type Unknown
//! 2. Users → line URI holders, type User
//! 3. Call queue bindings → resource accounts with numbers, type CallQueue
//! 4. Auto attendant bindings → resource accounts with numbers, type AutoAttendant
//!
//! A later pass overwrites the holder and configuration written by an earlier
//! one for the same number. Shared-line setups therefore surface as the last
//! writer; the previous holder type is kept in `overridden_from`.

use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;

use crate::core::phone::normalize_number;
use crate::core::snapshot::{
    AutoAttendant, CallQueue, NumberType, PhoneInventoryRecord, ResourceBinding, TenantSnapshot,
    VoiceUserRecord,
};

/// Resolved numbers in first-seen order
pub type PhoneNumberMap = IndexMap<String, PhoneNumberAssignment>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum AssignmentType {
    User,
    CallQueue,
    AutoAttendant,
    Unknown,
}

impl AssignmentType {
    pub fn label(self) -> &'static str {
        match self {
            Self::User => "User",
            Self::CallQueue => "Call Queue",
            Self::AutoAttendant => "Auto Attendant",
            Self::Unknown => "Unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub can_serve_user: bool,
    pub can_serve_voice_application: bool,
}

/// Voice settings attached to a user-held number
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserVoiceConfig {
    pub user_principal_name: Option<String>,
    pub display_name: Option<String>,
    pub voice_policy: Option<String>,
    pub voice_routing_policy: Option<String>,
    pub calling_line_identity: Option<String>,
    pub enterprise_voice_enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueAssignment {
    pub queue_id: Option<String>,
    pub queue_name: String,
    pub resource_account: Option<String>,
    pub queue_details: Option<CallQueue>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendantAssignment {
    pub attendant_id: Option<String>,
    pub attendant_name: String,
    pub resource_account: Option<String>,
    pub attendant_details: Option<AutoAttendant>,
}

/// What a number is routed to. One variant per assignment type, so the
/// configuration can never disagree with the type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "assignmentType", content = "configuration")]
pub enum AssignmentConfig {
    Unknown,
    User(UserVoiceConfig),
    CallQueue(QueueAssignment),
    AutoAttendant(AttendantAssignment),
}

impl AssignmentConfig {
    pub fn assignment_type(&self) -> AssignmentType {
        match self {
            Self::Unknown => AssignmentType::Unknown,
            Self::User(_) => AssignmentType::User,
            Self::CallQueue(_) => AssignmentType::CallQueue,
            Self::AutoAttendant(_) => AssignmentType::AutoAttendant,
        }
    }

    /// Queue or attendant identity the number is bound to.
    pub fn resource_id(&self) -> Option<&str> {
        match self {
            Self::CallQueue(q) => q.queue_id.as_deref(),
            Self::AutoAttendant(a) => a.attendant_id.as_deref(),
            Self::Unknown | Self::User(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhoneNumberAssignment {
    /// Canonical `+<digits>` key
    pub number: String,
    pub assigned_to: String,
    pub number_type: NumberType,
    pub capabilities: Capabilities,
    pub assigned_target_id: Option<String>,
    pub status: Option<String>,
    pub activation_state: Option<String>,
    pub place_name: Option<String>,
    #[serde(flatten)]
    pub configuration: AssignmentConfig,
    /// Holder type replaced by a later pass, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overridden_from: Option<AssignmentType>,
}

impl PhoneNumberAssignment {
    fn new(number: String, number_type: NumberType) -> Self {
        Self {
            number,
            assigned_to: String::new(),
            number_type,
            capabilities: Capabilities::default(),
            assigned_target_id: None,
            status: None,
            activation_state: None,
            place_name: None,
            configuration: AssignmentConfig::Unknown,
            overridden_from: None,
        }
    }

    pub fn assignment_type(&self) -> AssignmentType {
        self.configuration.assignment_type()
    }

    /// Replace holder and configuration, remembering a displaced holder.
    fn assign(&mut self, assigned_to: String, configuration: AssignmentConfig) {
        let previous = self.assignment_type();
        if previous != AssignmentType::Unknown {
            debug!(
                number = %self.number,
                from = previous.label(),
                to = configuration.assignment_type().label(),
                "later resolution pass overrides assignment"
            );
            self.overridden_from = Some(previous);
        }

        self.assigned_to = assigned_to;
        self.configuration = configuration;
    }
}

/// Run all resolution passes in their fixed order.
pub fn resolve(snapshot: &TenantSnapshot) -> PhoneNumberMap {
    let mut numbers = PhoneNumberMap::new();

    inventory_pass(snapshot.phone_inventory(), &mut numbers);
    user_pass(snapshot.voice_users(), &mut numbers);
    queue_pass(snapshot, &mut numbers);
    attendant_pass(snapshot, &mut numbers);

    debug!(count = numbers.len(), "resolved phone numbers");
    numbers
}

fn inventory_pass(records: &[PhoneInventoryRecord], numbers: &mut PhoneNumberMap) {
    for record in records {
        let Some(number) = record
            .telephone_number
            .as_deref()
            .and_then(normalize_number)
        else {
            continue;
        };

        let mut entry =
            PhoneNumberAssignment::new(number.clone(), record.number_type.unwrap_or(NumberType::Unknown));
        entry.assigned_to = record
            .assigned_pstn_target_id
            .clone()
            .unwrap_or_default();
        entry.assigned_target_id = record.assigned_pstn_target_id.clone();
        entry.capabilities = Capabilities {
            can_serve_user: record.capabilities_user.unwrap_or(false),
            can_serve_voice_application: record
                .capabilities_voice_application
                .unwrap_or(false),
        };
        entry.status = record.pstn_assignment_status.clone();
        entry.activation_state = record.activation_state.clone();
        entry.place_name = record.place_name.clone();

        numbers.insert(number, entry);
    }
}

fn user_pass(users: &[VoiceUserRecord], numbers: &mut PhoneNumberMap) {
    for user in users {
        let Some(number) = user
            .effective_line_uri()
            .and_then(normalize_number)
        else {
            continue;
        };

        let label = user
            .user_principal_name
            .clone()
            .or_else(|| user.display_name.clone())
            .unwrap_or_else(|| number.clone());
        let config = AssignmentConfig::User(UserVoiceConfig {
            user_principal_name: user.user_principal_name.clone(),
            display_name: user.display_name.clone(),
            voice_policy: user.voice_policy.clone(),
            voice_routing_policy: user.voice_routing_policy.clone(),
            calling_line_identity: user.calling_line_identity.clone(),
            enterprise_voice_enabled: user.enterprise_voice_enabled.unwrap_or(false),
        });

        numbers
            .entry(number.clone())
            .or_insert_with(|| PhoneNumberAssignment::new(number, NumberType::User))
            .assign(label, config);
    }
}

fn queue_pass(snapshot: &TenantSnapshot, numbers: &mut PhoneNumberMap) {
    for binding in snapshot.queue_bindings() {
        let Some(number) = binding_number(binding) else {
            continue;
        };

        let details = binding
            .owner_id
            .as_deref()
            .and_then(|id| snapshot.queue(id))
            .cloned();
        let queue_name = binding
            .owner_name
            .clone()
            .or_else(|| details.as_ref().map(|q| q.display_name().to_string()))
            .unwrap_or_else(|| "Unnamed Call Queue".to_string());
        let label = binding
            .resource_account
            .clone()
            .unwrap_or_else(|| queue_name.clone());
        let config = AssignmentConfig::CallQueue(QueueAssignment {
            queue_id: binding.owner_id.clone(),
            queue_name,
            resource_account: binding.resource_account.clone(),
            queue_details: details,
        });

        numbers
            .entry(number.clone())
            .or_insert_with(|| PhoneNumberAssignment::new(number, NumberType::ResourceAccount))
            .assign(label, config);
    }
}

fn attendant_pass(snapshot: &TenantSnapshot, numbers: &mut PhoneNumberMap) {
    for binding in snapshot.attendant_bindings() {
        let Some(number) = binding_number(binding) else {
            continue;
        };

        let details = binding
            .owner_id
            .as_deref()
            .and_then(|id| snapshot.attendant(id))
            .cloned();
        let attendant_name = binding
            .owner_name
            .clone()
            .or_else(|| details.as_ref().map(|a| a.display_name().to_string()))
            .unwrap_or_else(|| "Unnamed Auto Attendant".to_string());
        let label = binding
            .resource_account
            .clone()
            .unwrap_or_else(|| attendant_name.clone());
        let config = AssignmentConfig::AutoAttendant(AttendantAssignment {
            attendant_id: binding.owner_id.clone(),
            attendant_name,
            resource_account: binding.resource_account.clone(),
            attendant_details: details,
        });

        numbers
            .entry(number.clone())
            .or_insert_with(|| PhoneNumberAssignment::new(number, NumberType::ResourceAccount))
            .assign(label, config);
    }
}

/// Normalized number carried by a resource-account binding.
pub(crate) fn binding_number(binding: &ResourceBinding) -> Option<String> {
    binding
        .phone_number
        .as_deref()
        .and_then(normalize_number)
}

/// Per-type totals over a resolved map.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentCounts {
    pub total: usize,
    pub users: usize,
    pub call_queues: usize,
    pub auto_attendants: usize,
    pub unknown: usize,
}

impl AssignmentCounts {
    pub fn tally<'a>(assignments: impl IntoIterator<Item = &'a PhoneNumberAssignment>) -> Self {
        let mut counts = Self::default();
        for a in assignments {
            counts.total += 1;
            match a.assignment_type() {
                AssignmentType::User => counts.users += 1,
                AssignmentType::CallQueue => counts.call_queues += 1,
                AssignmentType::AutoAttendant => counts.auto_attendants += 1,
                AssignmentType::Unknown => counts.unknown += 1,
            }
        }
        counts
    }
}
