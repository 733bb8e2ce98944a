mod collect;
mod query;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "wftrack-cli")]
#[command(about = "Workflow popularity tracker command line interface")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Database maintenance
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
    /// Run a collection pass against the configured sources
    Collect {
        /// Platform key to collect (youtube, forum, google); repeatable. Defaults to all.
        #[arg(long = "platform")]
        platforms: Vec<String>,
        /// Country code to collect for; repeatable. Defaults to `WFTRACK_COUNTRIES`.
        #[arg(long = "country")]
        countries: Vec<String>,
        /// Fetch and score without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// List stored workflows
    Workflows {
        #[arg(long)]
        platform: Option<String>,
        #[arg(long)]
        country: Option<String>,
        /// engagement, views, likes or recent
        #[arg(long)]
        sort: Option<String>,
        #[arg(long, default_value = "20")]
        limit: i64,
        #[arg(long, default_value = "0")]
        offset: i64,
    },
    /// Show per-platform and per-country totals
    Stats,
    /// Show recent collection run logs
    Runs {
        #[arg(long, default_value = "10")]
        limit: i64,
    },
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check database connectivity
    Ping,
    /// Apply pending migrations
    Migrate,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("wftrack-cli: no command given; run with --help for usage");
        return Ok(());
    };

    let config = wftrack_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    // Dry runs never touch the database.
    if let Commands::Collect {
        platforms,
        countries,
        dry_run: true,
    } = &command
    {
        return collect::run_collect_dry_run(&config, platforms, countries).await;
    }

    let pool_config = wftrack_db::PoolConfig::from_app_config(&config);
    let pool = wftrack_db::connect_pool(&config.database_url, pool_config).await?;

    let result = match command {
        Commands::Db {
            command: DbCommands::Ping,
        } => {
            wftrack_db::ping(&pool).await?;
            println!("database ok");
            Ok(())
        }
        Commands::Db {
            command: DbCommands::Migrate,
        } => {
            let applied = wftrack_db::run_migrations(&pool).await?;
            println!("applied {applied} migration(s)");
            Ok(())
        }
        Commands::Collect {
            platforms,
            countries,
            ..
        } => collect::run_collect(&pool, &config, &platforms, &countries).await,
        Commands::Workflows {
            platform,
            country,
            sort,
            limit,
            offset,
        } => {
            let args = query::WorkflowListArgs {
                platform,
                country,
                sort,
                limit,
                offset,
            };
            query::run_workflows(&pool, &args).await
        }
        Commands::Stats => query::run_stats(&pool).await,
        Commands::Runs { limit } => query::run_runs(&pool, limit).await,
    };

    pool.close().await;
    result
}

#[cfg(test)]
mod tests;
