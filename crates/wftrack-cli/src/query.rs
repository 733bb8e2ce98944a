//! Read-only query handlers.

use wftrack_db::{clamp_limit, WorkflowFilter, WorkflowSort};

#[derive(Debug)]
pub(crate) struct WorkflowListArgs {
    pub platform: Option<String>,
    pub country: Option<String>,
    pub sort: Option<String>,
    pub limit: i64,
    pub offset: i64,
}

/// Truncate for a fixed-width column, marking the cut with `…`.
fn fit(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        value.to_string()
    } else {
        let mut cut: String = value.chars().take(width.saturating_sub(1)).collect();
        cut.push('\u{2026}');
        cut
    }
}

/// List stored workflows.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_workflows(
    pool: &sqlx::PgPool,
    args: &WorkflowListArgs,
) -> anyhow::Result<()> {
    let filter = WorkflowFilter::from_params(args.platform.as_deref(), args.country.as_deref());
    let sort = WorkflowSort::parse_lenient(args.sort.as_deref());
    let page = wftrack_db::list_workflows(
        pool,
        &filter,
        sort,
        clamp_limit(Some(args.limit)),
        args.offset.max(0),
    )
    .await?;

    if page.rows.is_empty() {
        println!("no workflows found; run `collect` first");
        return Ok(());
    }

    println!("{:<42}{:<15}{:<8}SCORE", "WORKFLOW", "PLATFORM", "COUNTRY");
    for row in &page.rows {
        println!(
            "{:<42}{:<15}{:<8}{:.2}",
            fit(&row.name, 40),
            row.platform,
            row.country,
            row.engagement_score
        );
    }
    println!(
        "showing {} of {} (offset {})",
        page.rows.len(),
        page.total,
        args.offset.max(0)
    );

    Ok(())
}

/// Show per-platform and per-country totals.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_stats(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let stats = wftrack_db::get_stats(pool).await?;

    println!("total workflows: {}", stats.total_workflows);
    println!();
    println!("{:<16}{:<8}AVG ENGAGEMENT", "PLATFORM", "COUNT");
    for p in &stats.platforms {
        println!(
            "{:<16}{:<8}{:.2}",
            p.platform,
            p.count,
            p.avg_engagement.unwrap_or(0.0)
        );
    }
    println!();
    println!("{:<10}COUNT", "COUNTRY");
    for c in &stats.countries {
        println!("{:<10}{}", c.country, c.count);
    }
    println!();
    println!("top workflows:");
    for (rank, row) in stats.top_workflows.iter().enumerate() {
        println!(
            "{:>3}. {} [{} / {}] {:.2}",
            rank + 1,
            fit(&row.name, 60),
            row.platform,
            row.country,
            row.engagement_score
        );
    }
    println!();
    println!("recent collections:");
    for log in &stats.recent_collections {
        println!(
            "  {} {} {} ({} found)",
            log.timestamp.format("%Y-%m-%d %H:%M"),
            log.platform,
            log.status,
            log.workflows_found
        );
    }

    Ok(())
}

/// Show recent collection run logs, newest first.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_runs(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<()> {
    let logs = wftrack_db::list_collection_logs(pool, limit.max(1)).await?;

    if logs.is_empty() {
        println!("no collection runs recorded yet");
        return Ok(());
    }

    println!("{:<18}{:<16}{:<9}{:<7}ERROR", "TIMESTAMP", "PLATFORM", "STATUS", "FOUND");
    for log in &logs {
        println!(
            "{:<18}{:<16}{:<9}{:<7}{}",
            log.timestamp.format("%Y-%m-%d %H:%M"),
            log.platform,
            log.status,
            log.workflows_found,
            log.error_message.as_deref().unwrap_or("")
        );
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::fit;

    #[test]
    fn fit_keeps_short_values() {
        assert_eq!(fit("Slack sync", 40), "Slack sync");
    }

    #[test]
    fn fit_marks_truncation() {
        let cut = fit("abcdefghij", 5);
        assert_eq!(cut, "abcd\u{2026}");
        assert_eq!(cut.chars().count(), 5);
    }
}
