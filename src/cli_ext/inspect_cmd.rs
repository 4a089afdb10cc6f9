//! Read-only inspection commands: `resolve`, `flow` and `analyze`.

use anyhow::{Result, bail};
use ptree::TreeBuilder;
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::instrument;

use crate::cli::{AnalyzeArgs, AppContext, FlowArgs, ResolveArgs};
use crate::cli_ext::report_cmd::load_inputs;
use crate::core::callgraph::CallGraph;
use crate::core::flow::{self, CallFlowStep, FlowContext};
use crate::core::phone::{digits, matches_filter, normalize_number};
use crate::core::resolve::{AssignmentCounts, PhoneNumberAssignment, PhoneNumberMap, resolve};
use crate::core::resource_index::ResourceIndex;

#[derive(Tabled)]
struct NumberRow
{
    #[tabled(rename = "Number")]
    number: String,
    #[tabled(rename = "Type")]
    assignment_type: String,
    #[tabled(rename = "Assigned To")]
    assigned_to: String,
    #[tabled(rename = "Number Type")]
    number_type: String,
    #[tabled(rename = "Status")]
    status: String,
}

impl From<&PhoneNumberAssignment> for NumberRow
{
    fn from(a: &PhoneNumberAssignment) -> Self
    {
        Self {
            number: a.number.clone(),
            assignment_type: a.assignment_type().label().to_string(),
            assigned_to: a.assigned_to.clone(),
            number_type: a.number_type.label().to_string(),
            status: a.status.clone().unwrap_or_default(),
        }
    }
}

#[instrument(skip_all)]
pub fn resolve_run(
    args: ResolveArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let (_, snapshot) = load_inputs(&args.data)?;
    let numbers = resolve(&snapshot);
    let kept: Vec<&PhoneNumberAssignment> = numbers
        .values()
        .filter(|a| matches_filter(&a.number, &args.numbers))
        .collect();

    if args.json
    {
        println!("{}", serde_json::to_string_pretty(&kept)?);
        return Ok(());
    }

    if kept.is_empty()
    {
        if !ctx.quiet
        {
            println!("{}", ctx.warn("No phone numbers resolved"));
        }
        return Ok(());
    }

    let rows: Vec<NumberRow> = kept
        .iter()
        .map(|a| NumberRow::from(*a))
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");

    if !ctx.quiet
    {
        let c = AssignmentCounts::tally(kept.iter().copied());
        println!(
            "{} {} numbers: {} users, {} call queues, {} auto attendants, {} unknown",
            ctx.strong("Total:"),
            c.total,
            c.users,
            c.call_queues,
            c.auto_attendants,
            c.unknown
        );
    }

    Ok(())
}

/// Look a number up by its normalized form, then by exact digits.
fn find_number<'a>(
    numbers: &'a PhoneNumberMap,
    raw: &str,
) -> Option<&'a PhoneNumberAssignment>
{
    if let Some(a) = normalize_number(raw).and_then(|n| numbers.get(&n))
    {
        return Some(a);
    }

    let wanted = digits(raw);
    numbers
        .values()
        .find(|a| !wanted.is_empty() && digits(&a.number) == wanted)
}

fn step_label(
    step: &CallFlowStep,
    ctx: &AppContext,
) -> String
{
    let mut label = format!(
        "{}. {} {}: {}",
        step.step,
        step.step_type.icon(),
        ctx.strong(step.step_type.label()),
        step.description
    );
    if step.is_branch
    {
        label = format!("[{}] {label}", step.action);
    }
    if let Some(n) = step.target_phone_number()
    {
        label.push_str(&format!(" → {n}"));
    }
    if let Some(f) = step.target_file()
    {
        label.push_str(&format!(" → {f}.html"));
    }
    label
}

#[instrument(skip_all, fields(number = %args.number))]
pub fn flow_run(
    args: FlowArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let (_, snapshot) = load_inputs(&args.data)?;
    let numbers = resolve(&snapshot);
    let index = ResourceIndex::build(&snapshot);

    let Some(assignment) = find_number(&numbers, &args.number)
    else
    {
        bail!("Number {} was not found in the tenant data", args.number);
    };

    let fctx = FlowContext {
        snapshot: &snapshot,
        index: &index,
        numbers: &numbers,
    };
    let steps = flow::build(assignment, &fctx);

    if args.json
    {
        println!("{}", serde_json::to_string_pretty(&steps)?);
        return Ok(());
    }

    let root = format!(
        "{} ({}: {})",
        assignment.number,
        assignment.assignment_type().label(),
        assignment.assigned_to
    );
    let mut builder = TreeBuilder::new(root);

    let mut iter = steps.iter().peekable();
    while let Some(step) = iter.next()
    {
        let has_branches = iter
            .peek()
            .is_some_and(|next| next.is_branch);

        if has_branches
        {
            builder.begin_child(step_label(step, ctx));
            while let Some(branch) = iter.next_if(|s| s.is_branch)
            {
                builder.add_empty_child(step_label(branch, ctx));
            }
            builder.end_child();
        }
        else
        {
            builder.add_empty_child(step_label(step, ctx));
        }
    }

    ptree::print_tree(&builder.build())?;
    Ok(())
}

#[instrument(skip_all)]
pub fn analyze_run(
    args: AnalyzeArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let (_, snapshot) = load_inputs(&args.data)?;
    let numbers = resolve(&snapshot);
    let index = ResourceIndex::build(&snapshot);
    let report = CallGraph::build(&snapshot, &numbers, &index).analyze();

    if args.json
    {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if ctx.quiet
    {
        return Ok(());
    }

    println!(
        "{} {} nodes, {} edges",
        ctx.strong("Call graph:"),
        report.node_count,
        report.edge_count
    );

    if report.is_clean()
    {
        println!("{}", ctx.ok("✓ No transfer loops or unreachable resources"));
        return Ok(());
    }

    for cycle in &report.menu_loops
    {
        println!("{} {}", ctx.warn("Transfer loop:"), cycle.join(" → "));
    }
    for name in &report.unreachable
    {
        println!("{} {name}", ctx.warn("Unreachable:"));
    }

    Ok(())
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::core::snapshot::{TenantSnapshot, UserSettingsDoc, VoiceUserRecord};

    #[test]
    fn numbers_are_found_in_any_format()
    {
        let snapshot = TenantSnapshot {
            user_settings: Some(UserSettingsDoc {
                voice_user_settings: vec![VoiceUserRecord {
                    line_uri: Some("tel:+19845551234".to_string()),
                    ..Default::default()
                }],
            }),
            ..Default::default()
        };
        let numbers = resolve(&snapshot);

        assert!(find_number(&numbers, "+19845551234").is_some());
        assert!(find_number(&numbers, "tel:+19845551234").is_some());
        assert!(find_number(&numbers, "+1 984 555 1234").is_some());
        assert!(find_number(&numbers, "555").is_none());
    }
}
