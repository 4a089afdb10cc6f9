//! Report model: every flow of one run, ready for rendering and export.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::HashSet;
use tracing::{info, instrument};

use crate::core::callgraph::{CallGraph, GraphReport};
use crate::core::flow::{self, CallFlowStep, FlowContext};
use crate::core::phone::matches_filter;
use crate::core::queue_flow::{QueueFlow, build_queue_flow};
use crate::core::resolve::{AssignmentCounts, PhoneNumberAssignment, resolve};
use crate::core::resource_index::ResourceIndex;
use crate::core::snapshot::TenantSnapshot;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NumberFlow {
    pub assignment: PhoneNumberAssignment,
    pub steps: Vec<CallFlowStep>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportModel {
    pub generated_at: DateTime<Local>,
    pub counts: AssignmentCounts,
    pub flows: Vec<NumberFlow>,
    pub queue_flows: Vec<QueueFlow>,
    pub graph: GraphReport,
    /// Number filters the run was restricted to
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<String>,
}

impl ReportModel {
    /// True when a page exists for this number in the current run.
    pub fn has_flow(&self, number: &str) -> bool {
        self.flows.iter().any(|f| f.assignment.number == number)
    }

    pub fn flow(&self, number: &str) -> Option<&NumberFlow> {
        self.flows.iter().find(|f| f.assignment.number == number)
    }
}

/// Resolve, index and build every flow for one run.
///
/// With filters, only matching numbers are kept, and standalone queue flows
/// are limited to queues a kept flow links to. Graph findings always cover
/// the whole tenant.
#[instrument(skip_all, fields(filters = filters.len()))]
pub fn assemble(snapshot: &TenantSnapshot, filters: &[String]) -> ReportModel {
    let numbers = resolve(snapshot);
    let index = ResourceIndex::build(snapshot);
    let ctx = FlowContext {
        snapshot,
        index: &index,
        numbers: &numbers,
    };

    let flows: Vec<NumberFlow> = numbers
        .values()
        .filter(|a| matches_filter(&a.number, filters))
        .map(|a| NumberFlow {
            assignment: a.clone(),
            steps: flow::build(a, &ctx),
        })
        .collect();

    let linked: HashSet<&str> = flows
        .iter()
        .flat_map(|f| f.steps.iter())
        .filter_map(CallFlowStep::target_file)
        .collect();
    let queue_flows: Vec<QueueFlow> = snapshot
        .queues()
        .iter()
        .filter_map(|q| build_queue_flow(q, &index))
        .filter(|qf| filters.is_empty() || linked.contains(qf.file_handle.as_str()))
        .collect();

    let graph = CallGraph::build(snapshot, &numbers, &index).analyze();
    let counts = AssignmentCounts::tally(flows.iter().map(|f| &f.assignment));

    info!(
        numbers = flows.len(),
        standalone_queues = queue_flows.len(),
        loops = graph.menu_loops.len(),
        "assembled report model"
    );

    ReportModel {
        generated_at: Local::now(),
        counts,
        flows,
        queue_flows,
        graph,
        filters: filters.to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::snapshot::{
        AutoAttendant, AutoAttendantDoc, CallFlowDefinition, CallQueue, CallQueueDoc, CallTarget,
        DtmfResponse, Menu, MenuAction, MenuOption, ResourceBinding, TargetType,
    };

    fn tenant() -> TenantSnapshot {
        let to_queue = |id: &str| MenuOption {
            dtmf_response: Some(DtmfResponse::Digit(1)),
            action: Some(MenuAction::TransferToTarget),
            call_target: Some(CallTarget {
                id: Some(id.to_string()),
                target_type: Some(TargetType::CallQueue),
            }),
            ..Default::default()
        };
        let attendant = |id: &str, queue: &str| AutoAttendant {
            identity: Some(id.to_string()),
            name: Some(id.to_uppercase()),
            default_call_flow: Some(CallFlowDefinition {
                name: None,
                menu: Some(Menu { name: None, menu_options: vec![to_queue(queue)] }),
            }),
            ..Default::default()
        };
        let binding = |id: &str, number: &str| ResourceBinding {
            owner_id: Some(id.to_string()),
            phone_number: Some(number.to_string()),
            ..Default::default()
        };
        let queue = |id: &str| CallQueue {
            identity: Some(id.to_string()),
            name: Some(id.to_string()),
            ..Default::default()
        };

        TenantSnapshot {
            auto_attendants: Some(AutoAttendantDoc {
                auto_attendant_permissions: vec![binding("aa1", "+18005550001"), binding("aa2", "+18005550002")],
                auto_attendant_details: vec![attendant("aa1", "qa"), attendant("aa2", "qb")],
            }),
            call_queues: Some(CallQueueDoc {
                call_queue_permissions: Vec::new(),
                call_queue_details: vec![queue("qa"), queue("qb")],
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_empty_snapshot_has_no_flows() {
        let model = assemble(&TenantSnapshot::default(), &[]);

        assert!(model.flows.is_empty());
        assert!(model.queue_flows.is_empty());
        assert_eq!(model.counts, AssignmentCounts::default());
    }

    #[test]
    fn test_unfiltered_run_keeps_all_standalone_queues() {
        let model = assemble(&tenant(), &[]);

        assert_eq!(model.flows.len(), 2);
        assert_eq!(model.queue_flows.len(), 2);
        assert_eq!(model.counts.auto_attendants, 2);
        assert!(model.has_flow("+18005550002"));
    }

    #[test]
    fn test_filter_limits_queues_to_linked_ones() {
        let model = assemble(&tenant(), &["0001".to_string()]);

        assert_eq!(model.flows.len(), 1);
        assert_eq!(model.queue_flows.len(), 1);
        assert_eq!(model.queue_flows[0].file_handle, "CallQueue_qa");
        assert!(!model.has_flow("+18005550002"));
    }
}
