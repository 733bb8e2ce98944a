//! Collection command handlers for the CLI.
//!
//! A real run goes through the same orchestrator as the server and writes
//! one run log per platform. A dry run calls the adapters and prints the
//! scored items without touching the database.

use std::time::Duration;

use wftrack_collect::{run_collection, CollectionRequest, PipelineOptions, RunSummary, SourceSet};
use wftrack_core::{score_raw, AppConfig, RawWorkflowData};

/// Build the request, falling back to the configured countries rather than
/// the HTTP defaults.
fn build_request(
    config: &AppConfig,
    platforms: &[String],
    countries: &[String],
) -> anyhow::Result<CollectionRequest> {
    let countries = if countries.is_empty() {
        config.countries.as_slice()
    } else {
        countries
    };
    Ok(CollectionRequest::parse(platforms, countries)?)
}

/// Run a collection pass and persist the results.
///
/// # Errors
///
/// Returns an error if a platform key is unknown or the HTTP client cannot be
/// built. Adapter and per-record failures are reported in the summary, not
/// propagated.
pub(crate) async fn run_collect(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    platforms: &[String],
    countries: &[String],
) -> anyhow::Result<()> {
    let request = build_request(config, platforms, countries)?;
    let sources = SourceSet::from_config(config)?;
    tracing::info!(
        platforms = request.platforms.len(),
        countries = ?request.countries,
        "starting collection"
    );
    let options = PipelineOptions {
        platform_delay: Duration::from_secs(config.platform_delay_secs),
    };

    let summary = run_collection(pool, &sources, &request, &options).await;
    print_summary(&summary);

    if !summary.all_succeeded() {
        anyhow::bail!("one or more platforms failed; see run logs");
    }
    Ok(())
}

/// Call each adapter and print the scored items without persisting anything.
///
/// # Errors
///
/// Returns an error if a platform key is unknown or the HTTP client cannot be
/// built.
pub(crate) async fn run_collect_dry_run(
    config: &AppConfig,
    platforms: &[String],
    countries: &[String],
) -> anyhow::Result<()> {
    let request = build_request(config, platforms, countries)?;
    let sources = SourceSet::from_config(config)?;

    for &platform in &request.platforms {
        let Some(source) = sources.get(platform) else {
            println!("{platform}: no source configured");
            continue;
        };
        for country in request.countries_for(platform) {
            match source.collect_workflows(&country).await {
                Ok(items) => print_dry_run_items(&platform.to_string(), &country, &items),
                Err(e) => println!("{platform} [{country}]: error: {e}"),
            }
        }
    }

    println!("dry-run: nothing was written");
    Ok(())
}

fn print_dry_run_items(platform: &str, country: &str, items: &[RawWorkflowData]) {
    println!("{platform} [{country}]: {} item(s)", items.len());
    let mut scored: Vec<(f64, &RawWorkflowData)> =
        items.iter().map(|item| (score_raw(item), item)).collect();
    scored.sort_by(|a, b| b.0.total_cmp(&a.0));

    for (score, item) in scored {
        println!("  {score:>12.2}  {}", item.workflow_name);
    }
}

fn print_summary(summary: &RunSummary) {
    println!(
        "{:<16}{:<8}{:<8}{:<10}{:<10}SKIPPED",
        "PLATFORM", "STATUS", "FOUND", "INSERTED", "UPDATED"
    );
    for platform in &summary.platforms {
        let (inserted, updated, skipped) = platform
            .countries
            .iter()
            .fold((0_u32, 0_u32, 0_u32), |(i, u, s), c| {
                (i + c.tally.inserted, u + c.tally.updated, s + c.tally.skipped)
            });
        println!(
            "{:<16}{:<8}{:<8}{:<10}{:<10}{}",
            platform.platform.to_string(),
            platform.status.as_str(),
            platform.workflows_found,
            inserted,
            updated,
            skipped
        );
        if let Some(message) = &platform.error_message {
            println!("  error: {message}");
        }
    }

    let elapsed = summary.finished_at - summary.started_at;
    println!(
        "found {} workflow(s) in {}s",
        summary.workflows_found(),
        elapsed.num_seconds()
    );
}
