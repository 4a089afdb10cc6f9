//! Call flow reconstruction for a single resolved phone number.
//!
//! The builder dispatches on the assignment type to one of four templates
//! (User, CallQueue, AutoAttendant, Unknown). Auto attendant menu options are
//! expanded one level as branch steps; transfer targets are described and
//! linked, never followed, so cyclic menus cannot loop.
//!
//! Steps are numbered with a running counter starting at 1. Optional steps
//! that do not apply are skipped without leaving gaps, and branch steps
//! continue the sequence of their parent.

use serde::{Serialize, Serializer};

use crate::core::resolve::{
    AssignmentConfig, AttendantAssignment, PhoneNumberAssignment, PhoneNumberMap, QueueAssignment,
    UserVoiceConfig,
};
use crate::core::resource_index::ResourceIndex;
use crate::core::snapshot::{
    AutoAttendant, CallQueue, CallTarget, DtmfResponse, MenuAction, MenuOption, TargetType,
    TenantSnapshot,
};
use crate::infra::utils::{NameUtils, TextUtils};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StepType {
    IncomingCall,
    UserRouting,
    VoicePolicy,
    CallQueueProcessing,
    QueueSettings,
    OverflowAction,
    TimeoutAction,
    AutoAttendantProcessing,
    LanguageVoice,
    MenuPresentation,
    MenuOption,
    CallHandling,
    UnknownConfiguration,
    QueueEntry,
    RoutingMethod,
    AgentAssignment,
    TimeoutHandling,
    OverflowHandling,
}

impl StepType {
    pub fn label(self) -> &'static str {
        match self {
            Self::IncomingCall => "Incoming Call",
            Self::UserRouting => "User Routing",
            Self::VoicePolicy => "Voice Policy",
            Self::CallQueueProcessing => "Call Queue Processing",
            Self::QueueSettings => "Queue Settings",
            Self::OverflowAction => "Overflow Action",
            Self::TimeoutAction => "Timeout Action",
            Self::AutoAttendantProcessing => "Auto Attendant Processing",
            Self::LanguageVoice => "Language & Voice",
            Self::MenuPresentation => "Menu Presentation",
            Self::MenuOption => "Menu Option",
            Self::CallHandling => "Call Handling",
            Self::UnknownConfiguration => "Unknown Configuration",
            Self::QueueEntry => "Queue Entry",
            Self::RoutingMethod => "Routing Method",
            Self::AgentAssignment => "Agent Assignment",
            Self::TimeoutHandling => "Timeout Handling",
            Self::OverflowHandling => "Overflow Handling",
        }
    }

    /// Presentation hint for renderers
    pub fn icon(self) -> &'static str {
        match self {
            Self::IncomingCall => "📞",
            Self::UserRouting => "👤",
            Self::VoicePolicy | Self::QueueSettings | Self::RoutingMethod => "⚙️",
            Self::CallQueueProcessing | Self::QueueEntry => "📋",
            Self::OverflowAction | Self::OverflowHandling => "⚠️",
            Self::TimeoutAction | Self::TimeoutHandling => "⏱️",
            Self::AutoAttendantProcessing => "🤖",
            Self::LanguageVoice => "🗣️",
            Self::MenuPresentation => "📜",
            Self::MenuOption => "↳",
            Self::CallHandling => "📅",
            Self::AgentAssignment => "👥",
            Self::UnknownConfiguration => "❓",
        }
    }
}

impl Serialize for StepType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}

/// Tenant component a step belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Component {
    Pstn,
    User,
    CallQueue,
    AutoAttendant,
    Voicemail,
    Operator,
    System,
    Unknown,
}

impl Component {
    /// Presentation hint for renderers
    pub fn color(self) -> &'static str {
        match self {
            Self::Pstn => "#2563eb",
            Self::User => "#16a34a",
            Self::CallQueue => "#ea580c",
            Self::AutoAttendant => "#7c3aed",
            Self::Voicemail => "#0891b2",
            Self::Operator => "#db2777",
            Self::System => "#475569",
            Self::Unknown => "#6b7280",
        }
    }
}

/// Cross-page navigation hint. A standalone page wins over a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StepTarget {
    #[serde(rename = "targetPhoneNumber")]
    PhoneNumber(String),
    #[serde(rename = "targetFile")]
    File(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CallFlowStep {
    pub step: u32,
    #[serde(rename = "type")]
    pub step_type: StepType,
    pub description: String,
    pub details: String,
    pub component: Component,
    pub action: String,
    pub is_branch: bool,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub target: Option<StepTarget>,
}

impl CallFlowStep {
    pub fn target_phone_number(&self) -> Option<&str> {
        match &self.target {
            Some(StepTarget::PhoneNumber(n)) => Some(n),
            _ => None,
        }
    }

    pub fn target_file(&self) -> Option<&str> {
        match &self.target {
            Some(StepTarget::File(f)) => Some(f),
            _ => None,
        }
    }
}

/// Appends steps with a running 1-based counter.
#[derive(Debug, Default)]
pub(crate) struct StepWriter {
    steps: Vec<CallFlowStep>,
}

impl StepWriter {
    pub(crate) fn push(
        &mut self,
        step_type: StepType,
        component: Component,
        description: impl Into<String>,
        details: impl Into<String>,
        action: impl Into<String>,
    ) -> &mut CallFlowStep {
        let step = u32::try_from(self.steps.len() + 1).unwrap_or(u32::MAX);
        self.steps.push(CallFlowStep {
            step,
            step_type,
            description: description.into(),
            details: details.into(),
            component,
            action: action.into(),
            is_branch: false,
            target: None,
        });

        let last = self.steps.len() - 1;
        &mut self.steps[last]
    }

    pub(crate) fn finish(self) -> Vec<CallFlowStep> {
        self.steps
    }
}

/// Read-only inputs shared by every flow of one report run.
#[derive(Debug, Clone, Copy)]
pub struct FlowContext<'a> {
    pub snapshot: &'a TenantSnapshot,
    pub index: &'a ResourceIndex,
    pub numbers: &'a PhoneNumberMap,
}

/// Build the ordered call flow for one assignment. Never fails and always
/// returns at least one step.
pub fn build(assignment: &PhoneNumberAssignment, ctx: &FlowContext<'_>) -> Vec<CallFlowStep> {
    let mut w = StepWriter::default();

    match &assignment.configuration {
        AssignmentConfig::User(user) => user_flow(&mut w, assignment, user),
        AssignmentConfig::CallQueue(queue) => queue_flow(&mut w, assignment, queue, ctx),
        AssignmentConfig::AutoAttendant(attendant) => attendant_flow(&mut w, assignment, attendant, ctx),
        AssignmentConfig::Unknown => unknown_flow(&mut w, assignment),
    }

    w.finish()
}

fn user_flow(w: &mut StepWriter, assignment: &PhoneNumberAssignment, user: &UserVoiceConfig) {
    w.push(
        StepType::IncomingCall,
        Component::Pstn,
        format!("Call arrives from the PSTN on {}", assignment.number),
        "External caller dials the number directly",
        "Route to assigned user",
    );

    let enterprise_voice = if user.enterprise_voice_enabled { "Enabled" } else { "Disabled" };
    let mut details = format!("Enterprise Voice: {enterprise_voice}");
    if let Some(clid) = &user.calling_line_identity {
        details.push_str(&format!("; Caller ID policy: {clid}"));
    }
    w.push(
        StepType::UserRouting,
        Component::User,
        format!("Call rings {}", assignment.assigned_to),
        details,
        "Ring user",
    );

    if let Some(policy) = user
        .voice_routing_policy
        .as_deref()
        .filter(|p| !p.trim().is_empty())
    {
        w.push(
            StepType::VoicePolicy,
            Component::System,
            format!("Voice routing policy {policy}"),
            format!(
                "Voice policy: {}",
                NameUtils::or_fallback(user.voice_policy.as_deref(), "Default")
            ),
            "Apply routing policy",
        );
    }
}

fn queue_flow(
    w: &mut StepWriter,
    assignment: &PhoneNumberAssignment,
    binding: &QueueAssignment,
    ctx: &FlowContext<'_>,
) {
    let account = binding
        .resource_account
        .as_deref()
        .unwrap_or(&assignment.assigned_to);
    w.push(
        StepType::IncomingCall,
        Component::Pstn,
        format!("Call arrives on resource account {account}"),
        format!("Dialed number {}", assignment.number),
        "Hand off to call queue",
    );
    w.push(
        StepType::CallQueueProcessing,
        Component::CallQueue,
        format!("Call enters queue {}", binding.queue_name),
        "Caller waits for an available agent",
        "Queue call",
    );

    let Some(queue) = binding
        .queue_id
        .as_deref()
        .and_then(|id| ctx.snapshot.queue(id))
    else {
        return;
    };

    queue_settings_steps(w, queue, ctx);
}

fn queue_settings_steps(w: &mut StepWriter, queue: &CallQueue, ctx: &FlowContext<'_>) {
    if let Some(method) = &queue.routing_method {
        let timeout = queue
            .timeout_threshold
            .map(|t| format!("{t} seconds"))
            .unwrap_or_else(|| "Not set".to_string());
        w.push(
            StepType::QueueSettings,
            Component::CallQueue,
            format!("Agents are offered calls by {}", method.label()),
            format!(
                "Routing: {}; Conference mode: {}; Timeout: {}",
                method.label(),
                TextUtils::on_off(queue.conference_mode),
                timeout
            ),
            "Distribute call",
        );
    }

    if let Some(action) = &queue.overflow_action {
        let threshold = queue
            .overflow_threshold
            .map(|t| format!("{t} calls"))
            .unwrap_or_else(|| "Not set".to_string());
        w.push(
            StepType::OverflowAction,
            Component::CallQueue,
            format!("When the queue is full: {}", action.label()),
            with_target(format!("Threshold: {threshold}"), queue.overflow_action_target.as_ref(), ctx),
            action.label(),
        );
    }

    if let Some(action) = &queue.timeout_action {
        let threshold = queue
            .timeout_threshold
            .map(|t| format!("{t} seconds"))
            .unwrap_or_else(|| "Not set".to_string());
        w.push(
            StepType::TimeoutAction,
            Component::CallQueue,
            format!("When callers wait too long: {}", action.label()),
            with_target(format!("Threshold: {threshold}"), queue.timeout_action_target.as_ref(), ctx),
            action.label(),
        );
    }
}

/// Append a resolved target description to a details string.
fn with_target(details: String, target: Option<&CallTarget>, ctx: &FlowContext<'_>) -> String {
    let Some(id) = target.and_then(|t| t.id.as_deref()) else {
        return details;
    };

    let name = match ctx.index.entry(id) {
        Some(entry) => entry.display_name.clone(),
        None => id.to_string(),
    };
    format!("{details}; Target: {name}")
}

fn attendant_flow(
    w: &mut StepWriter,
    assignment: &PhoneNumberAssignment,
    binding: &AttendantAssignment,
    ctx: &FlowContext<'_>,
) {
    let account = binding
        .resource_account
        .as_deref()
        .unwrap_or(&assignment.assigned_to);
    w.push(
        StepType::IncomingCall,
        Component::Pstn,
        format!("Call arrives on resource account {account}"),
        format!("Dialed number {}", assignment.number),
        "Hand off to auto attendant",
    );
    w.push(
        StepType::AutoAttendantProcessing,
        Component::AutoAttendant,
        format!("Auto attendant {} answers", binding.attendant_name),
        "Greeting and menu handling",
        "Answer call",
    );

    let Some(attendant) = binding
        .attendant_id
        .as_deref()
        .and_then(|id| ctx.snapshot.attendant(id))
    else {
        return;
    };

    attendant_detail_steps(w, attendant, ctx);
}

fn attendant_detail_steps(w: &mut StepWriter, attendant: &AutoAttendant, ctx: &FlowContext<'_>) {
    w.push(
        StepType::LanguageVoice,
        Component::AutoAttendant,
        "Prompts use the configured language and voice",
        format!(
            "Language: {}; Voice: {}; Time zone: {}",
            NameUtils::or_fallback(attendant.language_id.as_deref(), "Not set"),
            NameUtils::or_fallback(attendant.voice_id.as_deref(), "Not set"),
            NameUtils::or_fallback(attendant.time_zone_id.as_deref(), "Not set"),
        ),
        "Configure prompts",
    );

    if let Some(menu) = attendant.menu() {
        let flow_name = attendant
            .default_call_flow
            .as_ref()
            .and_then(|f| f.name.as_deref());
        w.push(
            StepType::MenuPresentation,
            Component::AutoAttendant,
            format!("Menu offers {}", TextUtils::plural(menu.menu_options.len(), "option")),
            format!(
                "Call flow: {}",
                NameUtils::or_fallback(flow_name.or(menu.name.as_deref()), "Default")
            ),
            "Play menu",
        );

        for option in &menu.menu_options {
            menu_option_step(w, option, ctx);
        }
    }

    let rules = attendant.call_handling_associations.len();
    if rules > 0 {
        w.push(
            StepType::CallHandling,
            Component::AutoAttendant,
            format!("{} for business hours and holidays", TextUtils::plural(rules, "call handling rule")),
            "Schedules can replace the default call flow",
            "Apply schedule",
        );
    }
}

/// Human description of the key or phrase that selects an option.
pub fn describe_trigger(option: &MenuOption) -> String {
    let key = option.dtmf_response.as_ref().map(|dtmf| match dtmf {
        DtmfResponse::Digit(d) => format!("Press {d}"),
        DtmfResponse::Star => "Press *".to_string(),
        DtmfResponse::Pound => "Press #".to_string(),
        DtmfResponse::Automatic => "No input (timeout)".to_string(),
        DtmfResponse::Other(raw) => format!("Key {raw}"),
    });

    let phrases = option
        .voice_responses
        .iter()
        .map(|p| format!("\"{p}\""))
        .collect::<Vec<_>>()
        .join(" / ");

    match (key, phrases.is_empty()) {
        (Some(key), true) => key,
        (Some(key), false) => format!("{key} or say {phrases}"),
        (None, false) => format!("Say {phrases}"),
        (None, true) => "Any input".to_string(),
    }
}

/// Description, details, component and navigation target of one option.
struct OptionOutcome {
    description: String,
    details: String,
    component: Component,
    target: Option<StepTarget>,
}

fn describe_outcome(option: &MenuOption, ctx: &FlowContext<'_>) -> OptionOutcome {
    let target_id = option
        .call_target
        .as_ref()
        .and_then(|t| t.id.as_deref());
    let raw_details = target_id
        .map(|id| format!("Target ID: {id}"))
        .unwrap_or_default();
    let outcome = |description: String, component: Component| OptionOutcome {
        description,
        details: raw_details.clone(),
        component,
        target: None,
    };

    match &option.action {
        Some(MenuAction::Disconnect) => outcome("Disconnect".to_string(), Component::System),
        Some(MenuAction::PlayAnnouncement) => outcome("Play Announcement".to_string(), Component::AutoAttendant),
        Some(MenuAction::TransferToOperator) => outcome("Transfer to Operator".to_string(), Component::Operator),
        Some(MenuAction::Other(code)) => outcome(format!("Action Code {code}"), Component::Unknown),
        None => outcome("Action Code unset".to_string(), Component::Unknown),
        Some(MenuAction::TransferToTarget) => {
            let target_type = option
                .call_target
                .as_ref()
                .and_then(|t| t.target_type.as_ref());
            match (target_type, target_id) {
                (Some(TargetType::User), _) => outcome("Transfer to User".to_string(), Component::User),
                (Some(TargetType::Voicemail), _) => outcome("Transfer to Voicemail".to_string(), Component::Voicemail),
                (Some(TargetType::Pstn), _) => outcome("Transfer to Phone Number".to_string(), Component::Pstn),
                (Some(TargetType::AutoAttendant), Some(id)) => OptionOutcome {
                    description: "Transfer to Auto Attendant".to_string(),
                    details: format!("Auto attendant: {}", ctx.index.display_name(id)),
                    component: Component::AutoAttendant,
                    target: ctx
                        .index
                        .phone_number(id, ctx.numbers)
                        .map(StepTarget::PhoneNumber),
                },
                (Some(TargetType::CallQueue), Some(id)) => {
                    let target = ctx
                        .index
                        .file_handle(id)
                        .map(StepTarget::File)
                        .or_else(|| {
                            ctx.index
                                .phone_number(id, ctx.numbers)
                                .map(StepTarget::PhoneNumber)
                        });
                    OptionOutcome {
                        description: format!("Transfer to {} Queue", ctx.index.display_name(id)),
                        details: raw_details.clone(),
                        component: Component::CallQueue,
                        target,
                    }
                }
                (Some(TargetType::AutoAttendant), None) => {
                    outcome("Transfer to Auto Attendant".to_string(), Component::AutoAttendant)
                }
                (Some(TargetType::CallQueue), None) => outcome(
                    format!("Transfer to {} Queue", crate::core::resource_index::UNKNOWN_RESOURCE),
                    Component::CallQueue,
                ),
                (Some(TargetType::Other(raw)), _) => outcome(format!("Transfer (Type {raw})"), Component::Unknown),
                (None, _) => outcome("Transfer (Type unknown)".to_string(), Component::Unknown),
            }
        }
    }
}

fn menu_option_step(w: &mut StepWriter, option: &MenuOption, ctx: &FlowContext<'_>) {
    let trigger = describe_trigger(option);
    let outcome = describe_outcome(option, ctx);

    let step = w.push(
        StepType::MenuOption,
        outcome.component,
        outcome.description,
        outcome.details,
        trigger,
    );
    step.is_branch = true;
    step.target = outcome.target;
}

fn unknown_flow(w: &mut StepWriter, assignment: &PhoneNumberAssignment) {
    let mut details = format!("Number type: {}", assignment.number_type.label());
    if let Some(status) = &assignment.status {
        details.push_str(&format!("; Status: {status}"));
    }
    w.push(
        StepType::UnknownConfiguration,
        Component::Unknown,
        format!(
            "Number {} has assignment type {}",
            assignment.number,
            assignment.assignment_type().label()
        ),
        details,
        "No routing found",
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resolve::resolve;
    use crate::core::snapshot::{
        AutoAttendantDoc, CallFlowDefinition, CallQueueDoc, Menu, PhoneInventoryRecord, QueueAction,
        ResourceBinding, RoutingMethod, UserSettingsDoc, VoiceRoutingDoc, VoiceUserRecord,
    };

    fn flows_for(snapshot: &TenantSnapshot, number: &str) -> Vec<CallFlowStep> {
        let numbers = resolve(snapshot);
        let index = ResourceIndex::build(snapshot);
        let ctx = FlowContext { snapshot, index: &index, numbers: &numbers };
        build(&numbers[number], &ctx)
    }

    fn bind(owner: &str, name: &str, number: Option<&str>) -> ResourceBinding {
        ResourceBinding {
            owner_id: Some(owner.to_string()),
            owner_name: Some(name.to_string()),
            resource_account: Some(format!("{owner}@contoso.com")),
            resource_account_id: None,
            phone_number: number.map(str::to_string),
        }
    }

    fn option(action: MenuAction, target: Option<(TargetType, &str)>) -> MenuOption {
        MenuOption {
            dtmf_response: Some(DtmfResponse::Digit(1)),
            voice_responses: Vec::new(),
            action: Some(action),
            call_target: target.map(|(t, id)| CallTarget {
                id: Some(id.to_string()),
                target_type: Some(t),
            }),
        }
    }

    fn attendant_snapshot(options: Vec<MenuOption>, rules: usize) -> TenantSnapshot {
        TenantSnapshot {
            auto_attendants: Some(AutoAttendantDoc {
                auto_attendant_permissions: vec![bind("aa1", "Main", Some("+18005550100"))],
                auto_attendant_details: vec![AutoAttendant {
                    identity: Some("aa1".to_string()),
                    name: Some("Main".to_string()),
                    language_id: Some("en-US".to_string()),
                    default_call_flow: Some(CallFlowDefinition {
                        name: Some("Business hours".to_string()),
                        menu: Some(Menu { name: None, menu_options: options }),
                    }),
                    call_handling_associations: vec![serde_json::json!({}); rules],
                    ..Default::default()
                }],
            }),
            call_queues: Some(CallQueueDoc {
                call_queue_permissions: vec![bind("q1", "Sales", Some("+18005551111"))],
                call_queue_details: vec![
                    CallQueue {
                        identity: Some("q1".to_string()),
                        name: Some("Sales".to_string()),
                        ..Default::default()
                    },
                    CallQueue {
                        identity: Some("q2".to_string()),
                        name: Some("Billing".to_string()),
                        ..Default::default()
                    },
                ],
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_unknown_number_has_single_step() {
        let snapshot = TenantSnapshot {
            voice_routing: Some(VoiceRoutingDoc {
                phone_number_assignments: vec![PhoneInventoryRecord {
                    telephone_number: Some("+19845551234".to_string()),
                    ..Default::default()
                }],
                ..Default::default()
            }),
            ..Default::default()
        };

        let steps = flows_for(&snapshot, "+19845551234");
        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].step_type, StepType::UnknownConfiguration);
        assert!(steps[0].description.contains("+19845551234"));
    }

    #[test]
    fn test_user_with_routing_policy_has_three_steps() {
        let snapshot = TenantSnapshot {
            user_settings: Some(UserSettingsDoc {
                voice_user_settings: vec![VoiceUserRecord {
                    line_uri: Some("tel:+19845551234".to_string()),
                    user_principal_name: Some("alex@contoso.com".to_string()),
                    voice_routing_policy: Some("RoutePolicy1".to_string()),
                    ..Default::default()
                }],
            }),
            ..Default::default()
        };

        let steps = flows_for(&snapshot, "+19845551234");
        assert_eq!(steps.len(), 3);
        assert_eq!(steps[2].step_type, StepType::VoicePolicy);
        assert!(steps[2].description.contains("RoutePolicy1"));
        assert!(steps[1].description.contains("alex@contoso.com"));
    }

    #[test]
    fn test_queue_without_overflow_action_omits_step() {
        let mut snapshot = attendant_snapshot(Vec::new(), 0);
        if let Some(doc) = snapshot.call_queues.as_mut() {
            doc.call_queue_details[0].routing_method = Some(RoutingMethod::RoundRobin);
            doc.call_queue_details[0].timeout_action = Some(QueueAction::Voicemail);
            doc.call_queue_details[0].timeout_threshold = Some(120);
        }

        let steps = flows_for(&snapshot, "+18005551111");
        let types: Vec<StepType> = steps.iter().map(|s| s.step_type).collect();
        assert_eq!(
            types,
            vec![
                StepType::IncomingCall,
                StepType::CallQueueProcessing,
                StepType::QueueSettings,
                StepType::TimeoutAction,
            ]
        );
        assert_eq!(steps[3].step, 4);
        assert!(steps[3].details.contains("120 seconds"));
    }

    #[test]
    fn test_missing_queue_entity_yields_two_generic_steps() {
        let snapshot = TenantSnapshot {
            call_queues: Some(CallQueueDoc {
                call_queue_permissions: vec![bind("ghost", "Ghost", Some("+15550000000"))],
                call_queue_details: Vec::new(),
            }),
            ..Default::default()
        };

        let steps = flows_for(&snapshot, "+15550000000");
        assert_eq!(steps.len(), 2);
        assert!(steps[1].description.contains("Ghost"));
    }

    #[test]
    fn test_empty_menu_reports_zero_options() {
        let steps = flows_for(&attendant_snapshot(Vec::new(), 0), "+18005550100");

        assert_eq!(steps.len(), 4);
        assert_eq!(steps[3].step_type, StepType::MenuPresentation);
        assert!(steps[3].description.contains("0 options"));
        assert!(steps.iter().all(|s| !s.is_branch));
    }

    #[test]
    fn test_menu_branches_continue_numbering() {
        let options = vec![
            option(MenuAction::TransferToTarget, Some((TargetType::CallQueue, "q1"))),
            option(MenuAction::Disconnect, None),
            option(MenuAction::Other("9".to_string()), Some((TargetType::User, "u-1"))),
        ];
        let steps = flows_for(&attendant_snapshot(options, 2), "+18005550100");

        let numbers: Vec<u32> = steps.iter().map(|s| s.step).collect();
        assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6, 7, 8]);

        let branches: Vec<&CallFlowStep> = steps.iter().filter(|s| s.is_branch).collect();
        assert_eq!(branches.len(), 3);
        assert_eq!(branches[0].description, "Transfer to Sales Queue");
        assert_eq!(branches[0].target_phone_number(), Some("+18005551111"));
        assert_eq!(branches[0].target_file(), None);
        assert_eq!(branches[1].description, "Disconnect");
        assert_eq!(branches[2].description, "Action Code 9");
        assert_eq!(branches[2].details, "Target ID: u-1");

        let last = steps.last().unwrap();
        assert_eq!(last.step_type, StepType::CallHandling);
        assert_eq!(last.step, 5 + 3);
        assert!(!last.is_branch);
    }

    #[test]
    fn test_numberless_queue_target_prefers_file() {
        let options = vec![option(MenuAction::TransferToTarget, Some((TargetType::CallQueue, "q2")))];
        let steps = flows_for(&attendant_snapshot(options, 0), "+18005550100");

        let branch = steps.iter().find(|s| s.is_branch).unwrap();
        assert_eq!(branch.description, "Transfer to Billing Queue");
        assert_eq!(branch.target_file(), Some("CallQueue_Billing"));
        assert_eq!(branch.target_phone_number(), None);
    }

    #[test]
    fn test_unrecognized_target_type_echoes_raw_value() {
        let options = vec![
            option(MenuAction::TransferToTarget, Some((TargetType::Other("7".to_string()), "x"))),
            option(MenuAction::TransferToTarget, Some((TargetType::AutoAttendant, "missing"))),
        ];
        let steps = flows_for(&attendant_snapshot(options, 0), "+18005550100");

        let branches: Vec<&CallFlowStep> = steps.iter().filter(|s| s.is_branch).collect();
        assert_eq!(branches[0].description, "Transfer (Type 7)");
        assert_eq!(branches[1].description, "Transfer to Auto Attendant");
        assert_eq!(branches[1].details, "Auto attendant: Unknown Resource");
        assert_eq!(branches[1].target, None);
    }

    #[test]
    fn test_triggers_describe_keys_and_phrases() {
        let mut opt = option(MenuAction::Disconnect, None);
        assert_eq!(describe_trigger(&opt), "Press 1");

        opt.voice_responses = vec!["sales".to_string()];
        assert_eq!(describe_trigger(&opt), "Press 1 or say \"sales\"");

        opt.dtmf_response = Some(DtmfResponse::Automatic);
        opt.voice_responses.clear();
        assert_eq!(describe_trigger(&opt), "No input (timeout)");
    }

    #[test]
    fn test_build_is_deterministic() {
        let options = vec![option(MenuAction::TransferToTarget, Some((TargetType::CallQueue, "q2")))];
        let snapshot = attendant_snapshot(options, 1);

        assert_eq!(flows_for(&snapshot, "+18005550100"), flows_for(&snapshot, "+18005550100"));
    }
}
