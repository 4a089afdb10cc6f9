use clap::Parser;
use teams_callflow::cli::{Cli, Commands, PdfArgs, ReportArgs};

#[test]
fn report_flags_parsing() {
    // Given
    let argv = vec![
        "callflow",
        "report",
        "--data",
        "exports",
        "-o",
        "out",
        "--pdf",
        "--numbers",
        "+1 984,8005550100",
        "--quiet",
    ];

    // When
    let cli = Cli::parse_from(argv);

    // Then
    assert!(cli.quiet);
    match cli.command {
        Commands::Report(ReportArgs { data, output, pdf, detailed, numbers, json }) => {
            assert!(data.data.ends_with("exports"));
            assert!(output.ends_with("out"));
            assert!(pdf);
            assert!(!detailed);
            assert!(!json);
            assert_eq!(numbers, vec!["+1 984".to_string(), "8005550100".to_string()]);
        }
        _ => panic!("expected Report command"),
    }
}

#[test]
fn data_directory_defaults_to_current_dir() {
    let cli = Cli::parse_from(["callflow", "analyze"]);

    match cli.command {
        Commands::Analyze(args) => assert_eq!(args.data.data.to_string_lossy(), "."),
        _ => panic!("expected Analyze command"),
    }
}

#[test]
fn flow_requires_a_number() {
    assert!(Cli::try_parse_from(["callflow", "flow"]).is_err());

    let cli = Cli::parse_from(["callflow", "flow", "tel:+18005550100", "--json"]);
    match cli.command {
        Commands::Flow(args) => {
            assert_eq!(args.number, "tel:+18005550100");
            assert!(args.json);
        }
        _ => panic!("expected Flow command"),
    }
}

#[test]
fn pdf_check_needs_no_input() {
    let cli = Cli::parse_from(["callflow", "pdf", "--check"]);

    match cli.command {
        Commands::Pdf(PdfArgs { input, output, check }) => {
            assert!(check);
            assert!(input.is_none());
            assert!(output.is_none());
        }
        _ => panic!("expected Pdf command"),
    }
}

#[test]
fn global_flags_work_after_subcommand() {
    let cli = Cli::parse_from(["callflow", "resolve", "--no-color", "--dry-run", "-v"]);

    assert!(cli.no_color);
    assert!(cli.dry_run);
    assert!(cli.verbose);
}
