use std::collections::{HashMap, HashSet};

use serde::Serialize;
use tracing::trace;

use crate::core::resolve::{PhoneNumberMap, binding_number};
use crate::core::snapshot::{ResourceBinding, TenantSnapshot};
use crate::infra::utils::NameUtils;

/// Display name returned for identifiers no index entry covers
pub const UNKNOWN_RESOURCE: &str = "Unknown Resource";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ResourceKind
{
    CallQueue,
    AutoAttendant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceEntry
{
    pub kind: ResourceKind,

    /// Canonical identity of the queue or attendant
    pub identity: String,

    pub display_name: String,

    /// Standalone page handle; only queues without a direct number get one
    pub file_handle: Option<String>,

    /// First normalized number bound to this resource, if any
    pub direct_number: Option<String>,
}

/// Account-level binding kept for transitive number lookups
#[derive(Debug, Clone)]
struct BoundNumber
{
    owner_id: Option<String>,
    account_id: Option<String>,
    number: String,
}

/// Read-only lookup from resource identifiers (queue/attendant identity or
/// embedded application-instance id) to names, page handles and numbers.
#[derive(Debug, Clone, Default)]
pub struct ResourceIndex
{
    /// All queue entries followed by all attendant entries
    entries: Vec<ResourceEntry>,

    /// Identifier → entry position; first registration wins
    by_id: HashMap<String, usize>,

    /// Queue bindings followed by attendant bindings, numbers normalized
    bound_numbers: Vec<BoundNumber>,
}

impl ResourceIndex
{
    /// Build the index once per report run.
    ///
    /// Identifiers are registered in lookup priority order:
    /// - queue identities
    /// - queue application instances
    /// - attendant identities
    /// - attendant application instances
    pub fn build(snapshot: &TenantSnapshot) -> Self
    {
        let mut index = Self::default();
        let mut used_handles: HashSet<String> = HashSet::new();

        index.bound_numbers = snapshot
            .queue_bindings()
            .iter()
            .chain(snapshot.attendant_bindings())
            .filter_map(Self::bound_number)
            .collect();

        // Queue entries, with standalone handles for number-less queues
        let mut queue_instances: Vec<(usize, &str)> = Vec::new();
        for queue in snapshot.queues()
        {
            let Some(id) = queue.id()
            else
            {
                continue;
            };

            let direct_number = Self::direct_number(snapshot.queue_bindings(), id, &queue.application_instances);
            let file_handle = direct_number
                .is_none()
                .then(|| unique_handle(queue.display_name(), &mut used_handles));

            let pos = index.push_entry(ResourceEntry {
                kind: ResourceKind::CallQueue,
                identity: id.to_string(),
                display_name: queue.display_name().to_string(),
                file_handle,
                direct_number,
            });
            queue_instances.extend(
                queue
                    .application_instances
                    .iter()
                    .map(|inst| (pos, inst.as_str())),
            );
        }

        // Attendant entries
        let mut attendant_instances: Vec<(usize, &str)> = Vec::new();
        let mut attendant_ids: Vec<(usize, &str)> = Vec::new();
        for attendant in snapshot.attendants()
        {
            let Some(id) = attendant.id()
            else
            {
                continue;
            };

            let direct_number =
                Self::direct_number(snapshot.attendant_bindings(), id, &attendant.application_instances);
            let pos = index.push_entry(ResourceEntry {
                kind: ResourceKind::AutoAttendant,
                identity: id.to_string(),
                display_name: attendant.display_name().to_string(),
                file_handle: None,
                direct_number,
            });
            attendant_ids.push((pos, id));
            attendant_instances.extend(
                attendant
                    .application_instances
                    .iter()
                    .map(|inst| (pos, inst.as_str())),
            );
        }

        // Register identifiers in lookup priority order
        let queue_count = index.entries.len() - attendant_ids.len();
        for pos in 0..queue_count
        {
            let id = index.entries[pos]
                .identity
                .clone();
            index.register(id, pos);
        }
        for (pos, inst) in queue_instances
        {
            index.register(inst.to_string(), pos);
        }
        for (pos, id) in attendant_ids
        {
            index.register(id.to_string(), pos);
        }
        for (pos, inst) in attendant_instances
        {
            index.register(inst.to_string(), pos);
        }

        trace!(entries = index.entries.len(), ids = index.by_id.len(), "built resource index");
        index
    }

    fn push_entry(
        &mut self,
        entry: ResourceEntry,
    ) -> usize
    {
        self.entries
            .push(entry);
        self.entries.len() - 1
    }

    fn register(
        &mut self,
        id: String,
        pos: usize,
    )
    {
        self.by_id
            .entry(id)
            .or_insert(pos);
    }

    fn bound_number(binding: &ResourceBinding) -> Option<BoundNumber>
    {
        Some(BoundNumber {
            owner_id: binding
                .owner_id
                .clone(),
            account_id: binding
                .resource_account_id
                .clone(),
            number: binding_number(binding)?,
        })
    }

    /// First number bound to the resource by identity or instance id.
    fn direct_number(
        bindings: &[ResourceBinding],
        id: &str,
        instances: &[String],
    ) -> Option<String>
    {
        bindings
            .iter()
            .filter(|b| {
                b.owner_id.as_deref() == Some(id)
                    || b.resource_account_id
                        .as_ref()
                        .is_some_and(|acct| instances.contains(acct))
            })
            .find_map(binding_number)
    }

    /// Entry for an identity or application-instance id.
    pub fn entry(
        &self,
        resource_id: &str,
    ) -> Option<&ResourceEntry>
    {
        self.by_id
            .get(resource_id)
            .map(|&pos| &self.entries[pos])
    }

    pub fn entries(&self) -> &[ResourceEntry]
    {
        &self.entries
    }

    /// Display name, or [`UNKNOWN_RESOURCE`] when nothing matches.
    pub fn display_name(
        &self,
        resource_id: &str,
    ) -> String
    {
        self.entry(resource_id)
            .map(|e| e.display_name.clone())
            .unwrap_or_else(|| UNKNOWN_RESOURCE.to_string())
    }

    /// Standalone page handle for the resource, if it has one.
    pub fn file_handle(
        &self,
        resource_id: &str,
    ) -> Option<String>
    {
        self.entry(resource_id)
            .and_then(|e| e.file_handle.clone())
    }

    /// Phone number that reaches the resource, resolved transitively.
    ///
    /// Searches resolved assignments bound to the id (or the canonical
    /// identity it maps to) first, then falls back to raw bindings matched
    /// by owner or resource-account id.
    pub fn phone_number(
        &self,
        resource_id: &str,
        numbers: &PhoneNumberMap,
    ) -> Option<String>
    {
        let canonical = self
            .entry(resource_id)
            .map(|e| e.identity.as_str());
        let matches = |candidate: Option<&str>| {
            candidate.is_some_and(|c| c == resource_id || Some(c) == canonical)
        };

        numbers
            .values()
            .find(|a| matches(a.configuration.resource_id()))
            .map(|a| a.number.clone())
            .or_else(|| {
                self.bound_numbers
                    .iter()
                    .find(|b| matches(b.owner_id.as_deref()) || b.account_id.as_deref() == Some(resource_id))
                    .map(|b| b.number.clone())
            })
    }

    /// Queues that need a standalone page, in snapshot order.
    pub fn standalone_queues(&self) -> impl Iterator<Item = &ResourceEntry>
    {
        self.entries
            .iter()
            .filter(|e| e.kind == ResourceKind::CallQueue && e.file_handle.is_some())
    }
}

/// `CallQueue_<slug>`, suffixed with a counter when the slug repeats.
/// Repeats compare case-insensitively since the pages land on
/// case-insensitive filesystems.
fn unique_handle(
    name: &str,
    used: &mut HashSet<String>,
) -> String
{
    let base = format!("CallQueue_{}", NameUtils::slug(name));
    let mut handle = base.clone();
    let mut n = 2;

    while !used.insert(handle.to_ascii_lowercase())
    {
        handle = format!("{base}_{n}");
        n += 1;
    }

    handle
}
