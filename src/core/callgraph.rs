//! Directed graph over numbers, queues and attendants.
//!
//! Built after resolution as a separate analysis pass. Flow building stays one
//! hop deep; this graph is where multi-hop questions (menu loops, resources no
//! number can reach) are answered.

use std::collections::{HashMap, HashSet};

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Dfs;
use serde::Serialize;
use tracing::debug;

use crate::core::resolve::{AssignmentConfig, PhoneNumberMap};
use crate::core::resource_index::{ResourceIndex, ResourceKind};
use crate::core::snapshot::{CallTarget, MenuAction, TargetType, TenantSnapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ExternalKind {
    User,
    Voicemail,
    Pstn,
    Operator,
}

/// Graph node keyed by canonical identity.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GraphNode {
    Number(String),
    Queue(String),
    Attendant(String),
    External(ExternalKind),
}

impl GraphNode {
    fn is_resource(&self) -> bool {
        matches!(self, Self::Queue(_) | Self::Attendant(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeKind {
    /// Number rings its holder
    Routes,
    /// Menu option, labelled with its trigger
    MenuOption(String),
    Overflow,
    Timeout,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphReport {
    /// Resource cycles, each sorted by label
    pub menu_loops: Vec<Vec<String>>,
    /// Queues and attendants no number can reach
    pub unreachable: Vec<String>,
    pub node_count: usize,
    pub edge_count: usize,
}

impl GraphReport {
    pub fn is_clean(&self) -> bool {
        self.menu_loops.is_empty() && self.unreachable.is_empty()
    }
}

#[derive(Debug, Default)]
pub struct CallGraph {
    graph: DiGraph<GraphNode, EdgeKind>,
    nodes: HashMap<GraphNode, NodeIndex>,
    labels: HashMap<NodeIndex, String>,
}

impl CallGraph {
    pub fn build(snapshot: &TenantSnapshot, numbers: &PhoneNumberMap, index: &ResourceIndex) -> Self {
        let mut g = Self::default();

        // Every known resource is a node, reachable or not
        for entry in index.entries() {
            let node = match entry.kind {
                ResourceKind::CallQueue => GraphNode::Queue(entry.identity.clone()),
                ResourceKind::AutoAttendant => GraphNode::Attendant(entry.identity.clone()),
            };
            g.node(node, &entry.display_name);
        }

        for assignment in numbers.values() {
            let from = g.node(GraphNode::Number(assignment.number.clone()), &assignment.number);
            let target = match &assignment.configuration {
                AssignmentConfig::User(_) => Some(GraphNode::External(ExternalKind::User)),
                AssignmentConfig::CallQueue(q) => q
                    .queue_id
                    .as_deref()
                    .map(|id| resource_node(index, id, ResourceKind::CallQueue)),
                AssignmentConfig::AutoAttendant(a) => a
                    .attendant_id
                    .as_deref()
                    .map(|id| resource_node(index, id, ResourceKind::AutoAttendant)),
                AssignmentConfig::Unknown => None,
            };
            if let Some(target) = target {
                let label = g.label_for(&target, index);
                let to = g.node(target, &label);
                g.graph.add_edge(from, to, EdgeKind::Routes);
            }
        }

        for attendant in snapshot.attendants() {
            let Some(id) = attendant.id() else {
                continue;
            };
            let from_node = resource_node(index, id, ResourceKind::AutoAttendant);
            let Some(menu) = attendant.menu() else {
                continue;
            };

            for option in &menu.menu_options {
                let target = match &option.action {
                    Some(MenuAction::TransferToOperator) => Some(GraphNode::External(ExternalKind::Operator)),
                    Some(MenuAction::TransferToTarget) => option
                        .call_target
                        .as_ref()
                        .and_then(|t| target_node(index, t)),
                    _ => None,
                };
                if let Some(target) = target {
                    let trigger = crate::core::flow::describe_trigger(option);
                    g.connect(&from_node, target, EdgeKind::MenuOption(trigger), index);
                }
            }
        }

        for queue in snapshot.queues() {
            let Some(id) = queue.id() else {
                continue;
            };
            let from_node = resource_node(index, id, ResourceKind::CallQueue);

            let routes = [
                (queue.overflow_action_target.as_ref(), EdgeKind::Overflow),
                (queue.timeout_action_target.as_ref(), EdgeKind::Timeout),
            ];
            for (target, kind) in routes {
                if let Some(target) = target.and_then(|t| target_node(index, t)) {
                    g.connect(&from_node, target, kind, index);
                }
            }
        }

        debug!(
            nodes = g.graph.node_count(),
            edges = g.graph.edge_count(),
            "built call graph"
        );
        g
    }

    fn node(&mut self, node: GraphNode, label: &str) -> NodeIndex {
        if let Some(&ix) = self.nodes.get(&node) {
            return ix;
        }

        let ix = self.graph.add_node(node.clone());
        self.nodes.insert(node, ix);
        self.labels.insert(ix, label.to_string());
        ix
    }

    fn connect(&mut self, from: &GraphNode, to: GraphNode, kind: EdgeKind, index: &ResourceIndex) {
        let from_label = self.label_for(from, index);
        let from = self.node(from.clone(), &from_label);
        let to_label = self.label_for(&to, index);
        let to = self.node(to, &to_label);
        self.graph.add_edge(from, to, kind);
    }

    fn label_for(&self, node: &GraphNode, index: &ResourceIndex) -> String {
        match node {
            GraphNode::Number(n) => n.clone(),
            GraphNode::Queue(id) | GraphNode::Attendant(id) => match index.entry(id) {
                Some(entry) => entry.display_name.clone(),
                None => id.clone(),
            },
            GraphNode::External(kind) => format!("{kind:?}"),
        }
    }

    fn describe(&self, ix: NodeIndex) -> String {
        let label = self.labels.get(&ix).cloned().unwrap_or_default();
        match &self.graph[ix] {
            GraphNode::Queue(_) => format!("Call Queue: {label}"),
            GraphNode::Attendant(_) => format!("Auto Attendant: {label}"),
            GraphNode::Number(_) | GraphNode::External(_) => label,
        }
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn analyze(&self) -> GraphReport {
        let mut menu_loops: Vec<Vec<String>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| {
                component.iter().all(|&ix| self.graph[ix].is_resource())
                    && (component.len() > 1 || self.graph.contains_edge(component[0], component[0]))
            })
            .map(|component| {
                let mut names: Vec<String> = component.into_iter().map(|ix| self.describe(ix)).collect();
                names.sort();
                names
            })
            .collect();
        menu_loops.sort();

        let mut reached: HashSet<NodeIndex> = HashSet::new();
        let mut dfs = Dfs::empty(&self.graph);
        for ix in self.graph.node_indices() {
            if matches!(self.graph[ix], GraphNode::Number(_)) {
                dfs.move_to(ix);
                while let Some(visited) = dfs.next(&self.graph) {
                    reached.insert(visited);
                }
            }
        }

        let unreachable = self
            .graph
            .node_indices()
            .filter(|ix| self.graph[*ix].is_resource() && !reached.contains(ix))
            .map(|ix| self.describe(ix))
            .collect();

        GraphReport {
            menu_loops,
            unreachable,
            node_count: self.node_count(),
            edge_count: self.edge_count(),
        }
    }
}

/// Node for a queue or attendant id, canonicalized through the index.
fn resource_node(index: &ResourceIndex, id: &str, fallback: ResourceKind) -> GraphNode {
    let (kind, identity) = match index.entry(id) {
        Some(entry) => (entry.kind, entry.identity.clone()),
        None => (fallback, id.to_string()),
    };

    match kind {
        ResourceKind::CallQueue => GraphNode::Queue(identity),
        ResourceKind::AutoAttendant => GraphNode::Attendant(identity),
    }
}

/// Known resources win over the declared target type; unknown ids of a
/// resource type are dropped.
fn target_node(index: &ResourceIndex, target: &CallTarget) -> Option<GraphNode> {
    if let Some(entry) = target.id.as_deref().and_then(|id| index.entry(id)) {
        return Some(match entry.kind {
            ResourceKind::CallQueue => GraphNode::Queue(entry.identity.clone()),
            ResourceKind::AutoAttendant => GraphNode::Attendant(entry.identity.clone()),
        });
    }

    match target.target_type.as_ref()? {
        TargetType::User => Some(GraphNode::External(ExternalKind::User)),
        TargetType::Voicemail => Some(GraphNode::External(ExternalKind::Voicemail)),
        TargetType::Pstn => Some(GraphNode::External(ExternalKind::Pstn)),
        TargetType::AutoAttendant | TargetType::CallQueue | TargetType::Other(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resolve::resolve;
    use crate::core::snapshot::{
        AutoAttendant, AutoAttendantDoc, CallFlowDefinition, CallQueue, CallQueueDoc, DtmfResponse,
        Menu, MenuOption, ResourceBinding,
    };

    fn transfer(digit: u8, kind: TargetType, id: &str) -> MenuOption {
        MenuOption {
            dtmf_response: Some(DtmfResponse::Digit(digit)),
            action: Some(MenuAction::TransferToTarget),
            call_target: Some(CallTarget {
                id: Some(id.to_string()),
                target_type: Some(kind),
            }),
            ..Default::default()
        }
    }

    fn attendant(id: &str, name: &str, options: Vec<MenuOption>) -> AutoAttendant {
        AutoAttendant {
            identity: Some(id.to_string()),
            name: Some(name.to_string()),
            default_call_flow: Some(CallFlowDefinition {
                name: None,
                menu: Some(Menu { name: None, menu_options: options }),
            }),
            ..Default::default()
        }
    }

    fn report(snapshot: &TenantSnapshot) -> GraphReport {
        let numbers = resolve(snapshot);
        let index = ResourceIndex::build(snapshot);
        CallGraph::build(snapshot, &numbers, &index).analyze()
    }

    fn tenant() -> TenantSnapshot {
        TenantSnapshot {
            auto_attendants: Some(AutoAttendantDoc {
                auto_attendant_permissions: vec![ResourceBinding {
                    owner_id: Some("aa-main".to_string()),
                    phone_number: Some("+18005550100".to_string()),
                    ..Default::default()
                }],
                auto_attendant_details: vec![
                    attendant(
                        "aa-main",
                        "Main",
                        vec![
                            transfer(1, TargetType::AutoAttendant, "aa-sub"),
                            transfer(2, TargetType::User, "u1"),
                        ],
                    ),
                    attendant("aa-sub", "Sub", vec![transfer(9, TargetType::AutoAttendant, "aa-main")]),
                ],
            }),
            call_queues: Some(CallQueueDoc {
                call_queue_permissions: Vec::new(),
                call_queue_details: vec![CallQueue {
                    identity: Some("q-orphan".to_string()),
                    name: Some("Orphan".to_string()),
                    ..Default::default()
                }],
            }),
            ..Default::default()
        }
    }

    #[test]
    fn detects_menu_loop_between_attendants() {
        let report = report(&tenant());

        assert_eq!(
            report.menu_loops,
            vec![vec!["Auto Attendant: Main".to_string(), "Auto Attendant: Sub".to_string()]]
        );
        assert!(!report.is_clean());
    }

    #[test]
    fn reports_unreachable_queue() {
        let report = report(&tenant());

        assert_eq!(report.unreachable, vec!["Call Queue: Orphan".to_string()]);
        // number, two attendants, the queue and the user sink
        assert_eq!(report.node_count, 5);
        assert_eq!(report.edge_count, 4);
    }

    #[test]
    fn self_transfer_is_a_loop() {
        let snapshot = TenantSnapshot {
            auto_attendants: Some(AutoAttendantDoc {
                auto_attendant_permissions: Vec::new(),
                auto_attendant_details: vec![attendant(
                    "aa-self",
                    "Echo",
                    vec![transfer(0, TargetType::AutoAttendant, "aa-self")],
                )],
            }),
            ..Default::default()
        };

        let report = report(&snapshot);
        assert_eq!(report.menu_loops, vec![vec!["Auto Attendant: Echo".to_string()]]);
        assert_eq!(report.unreachable, vec!["Auto Attendant: Echo".to_string()]);
    }

    #[test]
    fn empty_snapshot_is_clean() {
        let report = report(&TenantSnapshot::default());

        assert!(report.is_clean());
        assert_eq!(report.node_count, 0);
    }
}
