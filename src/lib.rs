//! **teams-callflow** - Reconstructs Microsoft Teams phone number call flows from tenant exports
//!
//! Resolves every number to its holder (user, call queue or auto attendant), rebuilds the
//! ordered routing steps a caller goes through, and renders linked HTML/PDF call flow maps.

/// Command-line interface with clap integration
pub mod cli;

/// Shell completion generation
pub mod completion;

/// Core pipeline - snapshot → resolution → flows → report model
pub mod core {
    /// Typed, lenient view of the collected tenant exports
    pub mod snapshot;
    pub use snapshot::{SnapshotError, TenantSnapshot};

    /// Phone number normalization and filtering
    pub mod phone;

    /// Phone number resolution passes (inventory, users, queues, attendants)
    pub mod resolve;
    pub use resolve::{AssignmentType, PhoneNumberAssignment, PhoneNumberMap, resolve};

    /// Resource id → display name / page handle / number lookups
    pub mod resource_index;
    pub use resource_index::ResourceIndex;

    /// Per-number call flow builder
    pub mod flow;
    pub use flow::{CallFlowStep, FlowContext, StepType};

    /// Flows for call queues reached only by transfer
    pub mod queue_flow;

    /// Directed call graph with loop and reachability analysis
    pub mod callgraph;

    /// Report model assembly for one run
    pub mod report;
    pub use report::{ReportModel, assemble};
}

/// Presentation - HTML pages and PDF conversion
pub mod render {
    /// Flow pages, queue pages and dashboard
    pub mod html;

    /// Headless browser PDF conversion
    pub mod pdf;
    pub use pdf::{PdfConverter, PdfError};
}

/// Command handlers
pub mod cli_ext {
    /// `report`
    pub mod report_cmd;

    /// `resolve`, `flow`, `analyze`
    pub mod inspect_cmd;

    /// `pdf`
    pub mod pdf_cmd;
}

/// Infrastructure - Configuration, I/O, and utilities
pub mod infra {
    /// Configuration management with TOML support
    pub mod config;
    pub use config::{Config, init as config_init, load_config};

    /// BOM-tolerant reads, JSON documents, path expansion
    pub mod io;

    /// Utility functions and helpers for common operations
    pub mod utils;
}

// Strategic re-exports for clean CLI interface
pub use cli::{AppContext, Cli, Commands};
pub use cli_ext::inspect_cmd::{analyze_run, flow_run, resolve_run};
pub use cli_ext::pdf_cmd::run as pdf_run;
pub use cli_ext::report_cmd::run as report_run;
pub use infra::{Config, load_config};

// Core types for external consumers
pub use crate::core::{CallFlowStep, PhoneNumberAssignment, TenantSnapshot};
