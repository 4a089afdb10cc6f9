//! Standalone flows for call queues reached only through transfers.

use serde::Serialize;
use serde_json::Value;

use crate::core::flow::{CallFlowStep, Component, StepType, StepWriter};
use crate::core::resource_index::ResourceIndex;
use crate::core::snapshot::CallQueue;
use crate::infra::utils::TextUtils;

/// Agents shown in the summary before it is cut off
const AGENT_SAMPLE_SIZE: usize = 3;

/// Agent references as collected. Identities are raw object ids; the export
/// carries no cross-reference to display names, so `resolved` is always false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AgentSummary {
    pub total: usize,
    pub sample: Vec<String>,
    pub resolved: bool,
}

impl AgentSummary {
    pub fn from_agents(agents: &[Value]) -> Self {
        let sample = agents
            .iter()
            .filter_map(agent_reference)
            .take(AGENT_SAMPLE_SIZE)
            .collect();

        Self {
            total: agents.len(),
            sample,
            resolved: false,
        }
    }
}

/// Raw identifier of one agent entry: a bare string or an object's `ObjectId`.
fn agent_reference(agent: &Value) -> Option<String> {
    match agent {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Object(map) => map
            .get("ObjectId")
            .or_else(|| map.get("Id"))
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueFlow {
    pub queue_id: String,
    pub queue_name: String,
    pub file_handle: String,
    pub agents: AgentSummary,
    pub steps: Vec<CallFlowStep>,
}

/// Build the flow for a queue that owns a standalone page.
///
/// Returns `None` for queues without an identity or without a page handle;
/// those are covered by the flow of the number that reaches them.
pub fn build_queue_flow(queue: &CallQueue, index: &ResourceIndex) -> Option<QueueFlow> {
    let queue_id = queue.id()?;
    let file_handle = index.file_handle(queue_id)?;
    let agents = AgentSummary::from_agents(&queue.agents);
    let mut w = StepWriter::default();

    w.push(
        StepType::QueueEntry,
        Component::CallQueue,
        format!("Call transferred into queue {}", queue.display_name()),
        "Queue has no direct phone number; reached from auto attendant menus",
        "Queue call",
    );

    let routing = queue
        .routing_method
        .as_ref()
        .map(|m| m.label())
        .unwrap_or_else(|| "Not set".to_string());
    let alert = queue
        .agent_alert_time
        .map(|t| format!("{t} seconds"))
        .unwrap_or_else(|| "Not set".to_string());
    w.push(
        StepType::RoutingMethod,
        Component::CallQueue,
        format!("Calls are distributed by {routing}"),
        format!(
            "Agent alert time: {alert}; Conference mode: {}",
            TextUtils::on_off(queue.conference_mode)
        ),
        "Distribute call",
    );

    let details = if agents.sample.is_empty() {
        "Agent identities are not resolved".to_string()
    } else {
        let more = agents.total.saturating_sub(agents.sample.len());
        let suffix = if more > 0 { format!(" and {more} more") } else { String::new() };
        format!("Unresolved agent ids: {}{suffix}", agents.sample.join(", "))
    };
    w.push(
        StepType::AgentAssignment,
        Component::User,
        format!("{} assigned", TextUtils::plural(agents.total, "agent")),
        details,
        "Ring agents",
    );

    if let Some(threshold) = queue.timeout_threshold.filter(|t| *t > 0) {
        let action = queue
            .timeout_action
            .as_ref()
            .map(|a| a.label())
            .unwrap_or_else(|| "Not set".to_string());
        w.push(
            StepType::TimeoutHandling,
            Component::CallQueue,
            format!("After {threshold} seconds: {action}"),
            format!("Timeout threshold: {threshold} seconds"),
            action,
        );
    }

    if let Some(threshold) = queue.overflow_threshold.filter(|t| *t > 0) {
        let action = queue
            .overflow_action
            .as_ref()
            .map(|a| a.label())
            .unwrap_or_else(|| "Not set".to_string());
        w.push(
            StepType::OverflowHandling,
            Component::CallQueue,
            format!("Beyond {threshold} waiting calls: {action}"),
            format!("Overflow threshold: {threshold} calls"),
            action,
        );
    }

    Some(QueueFlow {
        queue_id: queue_id.to_string(),
        queue_name: queue.display_name().to_string(),
        file_handle,
        agents,
        steps: w.finish(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::snapshot::{CallQueueDoc, QueueAction, RoutingMethod, TenantSnapshot};
    use serde_json::json;

    fn index_for(queue: &CallQueue) -> ResourceIndex {
        ResourceIndex::build(&TenantSnapshot {
            call_queues: Some(CallQueueDoc {
                call_queue_permissions: Vec::new(),
                call_queue_details: vec![queue.clone()],
            }),
            ..Default::default()
        })
    }

    #[test]
    fn test_full_queue_flow() {
        let queue = CallQueue {
            identity: Some("q-support".to_string()),
            name: Some("Support".to_string()),
            routing_method: Some(RoutingMethod::LongestIdle),
            timeout_threshold: Some(300),
            timeout_action: Some(QueueAction::Voicemail),
            overflow_threshold: Some(50),
            overflow_action: Some(QueueAction::Disconnect),
            agents: vec![
                json!({"ObjectId": "a1"}),
                json!("a2"),
                json!({"ObjectId": "a3"}),
                json!({"ObjectId": "a4"}),
            ],
            ..Default::default()
        };

        let flow = build_queue_flow(&queue, &index_for(&queue)).unwrap();
        let types: Vec<StepType> = flow.steps.iter().map(|s| s.step_type).collect();
        assert_eq!(
            types,
            vec![
                StepType::QueueEntry,
                StepType::RoutingMethod,
                StepType::AgentAssignment,
                StepType::TimeoutHandling,
                StepType::OverflowHandling,
            ]
        );
        assert_eq!(flow.file_handle, "CallQueue_Support");
        assert_eq!(flow.agents.total, 4);
        assert_eq!(flow.agents.sample, vec!["a1", "a2", "a3"]);
        assert!(!flow.agents.resolved);
        assert!(flow.steps[1].description.contains("Longest Idle"));
        assert!(flow.steps[2].details.ends_with("and 1 more"));
    }

    #[test]
    fn test_zero_thresholds_skip_handling_steps() {
        let queue = CallQueue {
            identity: Some("q-empty".to_string()),
            name: Some("Empty".to_string()),
            timeout_threshold: Some(0),
            timeout_action: Some(QueueAction::Forward),
            ..Default::default()
        };

        let flow = build_queue_flow(&queue, &index_for(&queue)).unwrap();
        assert_eq!(flow.steps.len(), 3);
        assert_eq!(flow.steps[2].description, "0 agents assigned");
        assert_eq!(flow.steps[2].details, "Agent identities are not resolved");
    }

    #[test]
    fn test_queue_without_handle_has_no_flow() {
        let queue = CallQueue {
            identity: Some("q-x".to_string()),
            ..Default::default()
        };

        assert!(build_queue_flow(&queue, &ResourceIndex::default()).is_none());
    }
}
