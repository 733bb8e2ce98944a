use super::*;

#[test]
fn parses_db_ping_command() {
    let cli = Cli::try_parse_from(["wftrack-cli", "db", "ping"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Ping
        })
    ));
}

#[test]
fn parses_db_migrate_command() {
    let cli =
        Cli::try_parse_from(["wftrack-cli", "db", "migrate"]).expect("expected valid cli args");

    assert!(matches!(
        cli.command,
        Some(Commands::Db {
            command: DbCommands::Migrate
        })
    ));
}

#[test]
fn no_command_is_none() {
    let cli = Cli::try_parse_from(["wftrack-cli"]).expect("expected valid cli args");
    assert!(cli.command.is_none());
}

#[test]
fn collect_without_flags_means_all_defaults() {
    let cli = Cli::try_parse_from(["wftrack-cli", "collect"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Collect {
            ref platforms,
            ref countries,
            dry_run: false
        }) if platforms.is_empty() && countries.is_empty()
    ));
}

#[test]
fn collect_accepts_repeated_platforms_and_countries() {
    let cli = Cli::try_parse_from([
        "wftrack-cli",
        "collect",
        "--platform",
        "youtube",
        "--platform",
        "google",
        "--country",
        "IN",
        "--dry-run",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Collect {
            ref platforms,
            ref countries,
            dry_run: true
        }) if platforms == &["youtube", "google"] && countries == &["IN"]
    ));
}

#[test]
fn workflows_defaults() {
    let cli = Cli::try_parse_from(["wftrack-cli", "workflows"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Workflows {
            platform: None,
            country: None,
            sort: None,
            limit: 20,
            offset: 0
        })
    ));
}

#[test]
fn workflows_with_filters() {
    let cli = Cli::try_parse_from([
        "wftrack-cli",
        "workflows",
        "--platform",
        "forum",
        "--sort",
        "recent",
        "--limit",
        "5",
        "--offset",
        "10",
    ])
    .unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Workflows {
            platform: Some(ref p),
            sort: Some(ref s),
            limit: 5,
            offset: 10,
            ..
        }) if p == "forum" && s == "recent"
    ));
}

#[test]
fn parses_stats_and_runs() {
    let cli = Cli::try_parse_from(["wftrack-cli", "stats"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Stats)));

    let cli = Cli::try_parse_from(["wftrack-cli", "runs", "--limit", "3"]).unwrap();
    assert!(matches!(cli.command, Some(Commands::Runs { limit: 3 })));
}

#[test]
fn rejects_unknown_subcommand() {
    assert!(Cli::try_parse_from(["wftrack-cli", "report"]).is_err());
}
