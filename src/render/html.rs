//! HTML pages for call flow reports.
//!
//! Three page kinds:
//! - per-number flow pages (`Individual/CallFlow_<digits>.html`)
//! - standalone call queue pages (`Individual/<handle>.html`)
//! - the summary dashboard (`Summary/Dashboard.html`)
//!
//! All tenant-provided text goes through [`HtmlUtils::escape`].

use chrono::{DateTime, Local};
use serde_json::Value;

use crate::core::flow::{CallFlowStep, StepTarget};
use crate::core::phone::digits;
use crate::core::queue_flow::QueueFlow;
use crate::core::report::{NumberFlow, ReportModel};
use crate::infra::utils::{HtmlUtils, TextUtils};

/// Folder of per-number and per-queue pages
pub const INDIVIDUAL_DIR: &str = "Individual";
/// Folder of the dashboard
pub const SUMMARY_DIR: &str = "Summary";
pub const DASHBOARD_FILE: &str = "Dashboard.html";

/// Shared page header/footer inputs
#[derive(Debug, Clone)]
pub struct PageMeta
{
    pub title: String,
    pub tenant_name: Option<String>,
    pub generated_at: DateTime<Local>,
}

/// Page stem for a number, without extension.
pub fn flow_page_name(number: &str) -> String
{
    format!("CallFlow_{}", digits(number))
}

/// Per-number flow page.
pub fn render_flow_page(
    flow: &NumberFlow,
    model: &ReportModel,
    meta: &PageMeta,
) -> String
{
    let a = &flow.assignment;
    let subtitle = format!("{} &middot; {}", HtmlUtils::escape(&a.number), a.assignment_type().label());

    let mut facts = vec![
        ("Assigned To", HtmlUtils::escape(&a.assigned_to)),
        ("Assignment Type", a.assignment_type().label().to_string()),
        ("Number Type", a.number_type.label().to_string()),
    ];
    if let Some(status) = &a.status
    {
        facts.push(("Status", HtmlUtils::escape(status)));
    }
    if let Some(place) = &a.place_name
    {
        facts.push(("Location", HtmlUtils::escape(place)));
    }
    if let Some(previous) = a.overridden_from
    {
        facts.push(("Also Assigned As", previous.label().to_string()));
    }

    let body = format!(
        "{facts}\n{steps}",
        facts = facts_section(&facts),
        steps = steps_section(&flow.steps, &|target: &StepTarget| link_for_target(target, model)),
    );

    page(&format!("Call Flow {}", a.number), &subtitle, &body, meta, "../")
}

/// Standalone page for a call queue without a direct number.
pub fn render_queue_page(
    queue: &QueueFlow,
    meta: &PageMeta,
) -> String
{
    let agents = if queue.agents.resolved { "Resolved" } else { "Unresolved (raw ids only)" };
    let facts = [
        ("Queue", HtmlUtils::escape(&queue.queue_name)),
        ("Identity", HtmlUtils::escape(&queue.queue_id)),
        ("Agents", TextUtils::plural(queue.agents.total, "agent")),
        ("Agent Identities", agents.to_string()),
    ];

    let body = format!(
        "{facts}\n{steps}",
        facts = facts_section(&facts),
        steps = steps_section(&queue.steps, &|_: &StepTarget| None),
    );

    page(&format!("Call Queue {}", queue.queue_name), "Reached by transfer only", &body, meta, "../")
}

/// Summary dashboard. `detailed` adds passthrough tenant settings.
pub fn render_dashboard(
    model: &ReportModel,
    meta: &PageMeta,
    detailed: &[(&str, Value)],
) -> String
{
    let c = &model.counts;
    let cards = [
        ("Phone Numbers", c.total),
        ("Users", c.users),
        ("Call Queues", c.call_queues),
        ("Auto Attendants", c.auto_attendants),
        ("Unknown", c.unknown),
        ("Standalone Queues", model.queue_flows.len()),
    ]
    .iter()
    .map(|(label, value)| {
        format!(
            r#"                <div class="summary-card"><div class="summary-value">{value}</div><div class="summary-label">{label}</div></div>"#
        )
    })
    .collect::<Vec<_>>()
    .join("\n");

    let mut body = format!(
        r#"        <section class="section">
            <h2 class="section-title">Summary</h2>
            <div class="summary-grid">
{cards}
            </div>
        </section>
{numbers}
{queues}
{graph}"#,
        numbers = numbers_table(model),
        queues = queues_table(model),
        graph = graph_section(model),
    );

    if !detailed.is_empty()
    {
        body.push('\n');
        body.push_str(&detailed_section(detailed));
    }

    let subtitle = match &meta.tenant_name
    {
        Some(t) => HtmlUtils::escape(t),
        None => "Tenant telephony overview".to_string(),
    };

    page("Dashboard", &subtitle, &body, meta, "../")
}

/// Relative link for a step target, from inside `Individual/`.
/// Numbers without a page in this run are not linked.
fn link_for_target(
    target: &StepTarget,
    model: &ReportModel,
) -> Option<String>
{
    match target
    {
        StepTarget::File(handle) => Some(format!("{handle}.html")),
        StepTarget::PhoneNumber(n) if model.has_flow(n) => Some(format!("{}.html", flow_page_name(n))),
        StepTarget::PhoneNumber(_) => None,
    }
}

fn facts_section(facts: &[(&str, String)]) -> String
{
    let rows = facts
        .iter()
        .map(|(k, v)| format!("                <tr><th>{k}</th><td>{v}</td></tr>"))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"        <section class="section">
            <h2 class="section-title">Overview</h2>
            <table class="facts">
{rows}
            </table>
        </section>"#
    )
}

/// Ordered step list; branch steps nest under the step before them.
fn steps_section(
    steps: &[CallFlowStep],
    link: &dyn Fn(&StepTarget) -> Option<String>,
) -> String
{
    let mut out = String::new();
    let mut in_branch = false;

    for step in steps
    {
        if step.is_branch && !in_branch
        {
            out.push_str("                <ul class=\"branches\">\n");
            in_branch = true;
        }
        else if !step.is_branch && in_branch
        {
            out.push_str("                </ul>\n");
            in_branch = false;
        }

        if !step.is_branch && !out.is_empty()
        {
            out.push_str("            </li>\n");
        }

        out.push_str(&step_item(step, link));
    }

    if in_branch
    {
        out.push_str("                </ul>\n");
    }
    if !steps.is_empty()
    {
        out.push_str("            </li>\n");
    }

    format!(
        r#"        <section class="section">
            <h2 class="section-title">Call Flow</h2>
            <ol class="flow">
{out}            </ol>
        </section>"#
    )
}

fn step_item(
    step: &CallFlowStep,
    link: &dyn Fn(&StepTarget) -> Option<String>,
) -> String
{
    let description = HtmlUtils::escape(&step.description);
    let description = match step.target.as_ref()
    {
        Some(target) => match link(target)
        {
            Some(href) => format!(r#"<a href="{}">{description}</a>"#, HtmlUtils::escape(&href)),
            None => match target
            {
                StepTarget::PhoneNumber(n) => format!("{description} ({})", HtmlUtils::escape(n)),
                StepTarget::File(_) => description,
            },
        },
        None => description,
    };

    let details = if step.details.is_empty()
    {
        String::new()
    }
    else
    {
        format!(r#"<div class="step-details">{}</div>"#, HtmlUtils::escape(&step.details))
    };

    let tag = if step.is_branch { "                    <li class=\"branch\"" } else { "            <li class=\"step\"" };
    let close = if step.is_branch { "</li>\n" } else { "\n" };

    format!(
        r#"{tag} style="border-left-color: {color}"><span class="step-no">{no}</span> <span class="step-icon">{icon}</span> <span class="step-type">{kind}</span> <span class="step-action">{action}</span><div class="step-desc">{description}</div>{details}{close}"#,
        color = step.component.color(),
        no = step.step,
        icon = step.step_type.icon(),
        kind = step.step_type.label(),
        action = HtmlUtils::escape(&step.action),
    )
}

fn numbers_table(model: &ReportModel) -> String
{
    if model.flows.is_empty()
    {
        return r#"        <section class="section">
            <h2 class="section-title">Phone Numbers</h2>
            <p class="empty">No phone numbers found.</p>
        </section>"#
            .to_string();
    }

    let rows = model
        .flows
        .iter()
        .map(|f| {
            let a = &f.assignment;
            format!(
                r#"                <tr><td><a href="../{dir}/{page}.html">{number}</a></td><td>{kind}</td><td>{holder}</td><td>{steps}</td></tr>"#,
                dir = INDIVIDUAL_DIR,
                page = flow_page_name(&a.number),
                number = HtmlUtils::escape(&a.number),
                kind = a.assignment_type().label(),
                holder = HtmlUtils::escape(&a.assigned_to),
                steps = f.steps.len(),
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"        <section class="section">
            <h2 class="section-title">Phone Numbers</h2>
            <table class="data">
                <tr><th>Number</th><th>Type</th><th>Assigned To</th><th>Steps</th></tr>
{rows}
            </table>
        </section>"#
    )
}

fn queues_table(model: &ReportModel) -> String
{
    if model.queue_flows.is_empty()
    {
        return String::new();
    }

    let rows = model
        .queue_flows
        .iter()
        .map(|q| {
            format!(
                r#"                <tr><td><a href="../{dir}/{handle}.html">{name}</a></td><td>{agents}</td></tr>"#,
                dir = INDIVIDUAL_DIR,
                handle = HtmlUtils::escape(&q.file_handle),
                name = HtmlUtils::escape(&q.queue_name),
                agents = q.agents.total,
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"        <section class="section">
            <h2 class="section-title">Standalone Call Queues</h2>
            <table class="data">
                <tr><th>Queue</th><th>Agents</th></tr>
{rows}
            </table>
        </section>"#
    )
}

fn graph_section(model: &ReportModel) -> String
{
    let g = &model.graph;
    let mut items = Vec::new();

    for cycle in &g.menu_loops
    {
        let names = cycle
            .iter()
            .map(|n| HtmlUtils::escape(n))
            .collect::<Vec<_>>()
            .join(" &rarr; ");
        items.push(format!(r#"                <li class="finding warn">Transfer loop: {names}</li>"#));
    }
    for name in &g.unreachable
    {
        items.push(format!(
            r#"                <li class="finding info">Not reachable from any number: {}</li>"#,
            HtmlUtils::escape(name)
        ));
    }

    let findings = if items.is_empty()
    {
        r#"            <p class="empty">No transfer loops or unreachable resources.</p>"#.to_string()
    }
    else
    {
        format!("            <ul class=\"findings\">\n{}\n            </ul>", items.join("\n"))
    };

    format!(
        r#"        <section class="section">
            <h2 class="section-title">Routing Analysis</h2>
            <p class="meta-line">{nodes} nodes, {edges} edges</p>
{findings}
        </section>"#,
        nodes = g.node_count,
        edges = g.edge_count,
    )
}

fn detailed_section(sections: &[(&str, Value)]) -> String
{
    let blocks = sections
        .iter()
        .map(|(name, value)| {
            let pretty = serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string());
            format!(
                r#"            <details class="settings"><summary>{name}</summary><pre>{}</pre></details>"#,
                HtmlUtils::escape(&pretty)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"        <section class="section">
            <h2 class="section-title">Detailed Settings</h2>
{blocks}
        </section>"#
    )
}

fn page(
    heading: &str,
    subtitle: &str,
    body: &str,
    meta: &PageMeta,
    root: &str,
) -> String
{
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{heading} - {title}</title>
    <style>
{css}
    </style>
</head>
<body>
    <div class="container">
{header}
{body}
{footer}
    </div>
</body>
</html>"#,
        heading = HtmlUtils::escape(heading),
        title = HtmlUtils::escape(&meta.title),
        css = css_styles(),
        header = header(heading, subtitle, meta, root),
        footer = footer(meta),
    )
}

fn header(
    heading: &str,
    subtitle: &str,
    meta: &PageMeta,
    root: &str,
) -> String
{
    format!(
        r#"        <header class="header">
            <nav class="crumbs"><a href="{root}{summary}/{dashboard}">Dashboard</a></nav>
            <h1>{heading}</h1>
            <div class="subtitle">{subtitle}</div>
            <div class="metadata"><span>{title}</span><span>Generated: {date}</span></div>
        </header>"#,
        summary = SUMMARY_DIR,
        dashboard = DASHBOARD_FILE,
        heading = HtmlUtils::escape(heading),
        title = HtmlUtils::escape(&meta.title),
        date = meta.generated_at.format("%Y-%m-%d %H:%M"),
    )
}

fn footer(meta: &PageMeta) -> String
{
    let tenant = meta
        .tenant_name
        .as_deref()
        .map(|t| format!("<p>Tenant: {}</p>", HtmlUtils::escape(t)))
        .unwrap_or_default();

    format!(
        r#"        <footer class="footer">
            {tenant}
            <p>Generated {date} by callflow</p>
        </footer>"#,
        date = meta.generated_at.format("%Y-%m-%d %H:%M:%S %Z"),
    )
}

fn css_styles() -> &'static str
{
    r#"
        :root {
            --primary: #4f46e5;
            --secondary: #64748b;
            --light: #f8fafc;
            --dark: #1e293b;
            --border: #e2e8f0;
            --warn: #ca8a04;
        }

        * { margin: 0; padding: 0; box-sizing: border-box; }

        body {
            font-family: 'Segoe UI', system-ui, -apple-system, sans-serif;
            line-height: 1.6;
            color: var(--dark);
            background: var(--light);
        }

        .container {
            max-width: 1100px;
            margin: 0 auto;
            padding: 2rem;
            background: white;
            min-height: 100vh;
        }

        .header {
            padding: 1.5rem 0;
            border-bottom: 3px solid var(--primary);
            margin-bottom: 2rem;
        }

        .header h1 { color: var(--primary); font-size: 1.8rem; font-weight: 600; }
        .header .subtitle { color: var(--secondary); font-size: 1.1rem; }
        .header .metadata { display: flex; gap: 2rem; margin-top: 0.5rem; font-size: 0.85rem; color: var(--secondary); }
        .crumbs { font-size: 0.85rem; margin-bottom: 0.5rem; }

        a { color: var(--primary); }

        .section { margin-bottom: 2rem; }

        .section-title {
            font-size: 1.25rem;
            font-weight: 600;
            color: var(--primary);
            margin-bottom: 1rem;
            padding-bottom: 0.5rem;
            border-bottom: 2px solid var(--border);
        }

        .summary-grid {
            display: grid;
            grid-template-columns: repeat(auto-fit, minmax(150px, 1fr));
            gap: 1rem;
        }

        .summary-card {
            border: 1px solid var(--border);
            border-radius: 8px;
            padding: 1rem;
            text-align: center;
        }

        .summary-value { font-size: 2rem; font-weight: bold; color: var(--primary); }
        .summary-label { color: var(--secondary); font-size: 0.9rem; }

        table { width: 100%; border-collapse: collapse; }
        th, td { text-align: left; padding: 0.5rem 0.75rem; border-bottom: 1px solid var(--border); }
        table.facts th { width: 220px; color: var(--secondary); font-weight: 600; }
        table.data th { background: var(--light); }

        ol.flow { list-style: none; }

        li.step, li.branch {
            border: 1px solid var(--border);
            border-left: 4px solid;
            border-radius: 8px;
            padding: 0.75rem 1rem;
            margin-bottom: 0.75rem;
        }

        ul.branches { list-style: none; margin: 0.75rem 0 0 1.5rem; }
        li.branch { background: var(--light); }

        .step-no {
            display: inline-block;
            min-width: 1.75rem;
            font-weight: bold;
            color: var(--secondary);
        }

        .step-type { font-weight: 600; }
        .step-action { float: right; font-size: 0.85rem; color: var(--secondary); }
        .step-desc { margin-top: 0.25rem; }
        .step-details { font-size: 0.85rem; color: var(--secondary); }

        .findings { list-style: none; }
        .finding { padding: 0.5rem 0.75rem; border-left: 4px solid var(--secondary); margin-bottom: 0.5rem; }
        .finding.warn { border-left-color: var(--warn); }
        .empty, .meta-line { color: var(--secondary); }

        details.settings { margin-bottom: 0.75rem; }
        details.settings summary { cursor: pointer; font-weight: 600; }
        details.settings pre { font-size: 0.8rem; background: var(--light); padding: 1rem; overflow-x: auto; }

        .footer {
            margin-top: 3rem;
            padding-top: 1rem;
            border-top: 1px solid var(--border);
            text-align: center;
            font-size: 0.85rem;
            color: var(--secondary);
        }

        @page { size: letter; margin: 0.75in; }

        @media print {
            * { -webkit-print-color-adjust: exact; print-color-adjust: exact; }
            .container { max-width: none; padding: 0; }
            .crumbs { display: none; }
            li.step, li.branch { break-inside: avoid; }
        }
"#
}
