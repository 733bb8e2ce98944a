//! Offline tests for wftrack-db pool configuration and row conversions.
//! These tests do not require a live database connection.

use chrono::{TimeZone, Utc};
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use uuid::Uuid;
use wftrack_core::{AppConfig, Environment, Platform};
use wftrack_db::{DbError, PoolConfig, WorkflowRow};

fn app_config() -> AppConfig {
    AppConfig {
        database_url: "postgres://example".to_string(),
        env: Environment::Test,
        bind_addr: SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 5000),
        log_level: "info".to_string(),
        db_max_connections: 42,
        db_min_connections: 7,
        db_acquire_timeout_secs: 9,
        youtube_api_key: None,
        youtube_max_results: 10,
        countries: vec!["US".to_string()],
        collect_cron: "0 0 2 * * *".to_string(),
        collect_on_startup: false,
        platform_delay_secs: 5,
        request_timeout_secs: 30,
        user_agent: "ua".to_string(),
        api_keys: Vec::new(),
    }
}

fn forum_row(platform: &str) -> WorkflowRow {
    let created = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
    WorkflowRow {
        id: 7,
        public_id: Uuid::new_v4(),
        name: "Gmail to Airtable".to_string(),
        platform: platform.to_string(),
        country: "Global".to_string(),
        views: 500,
        likes: 10,
        comments: 0,
        replies: 5,
        contributors: 2,
        search_volume: 0,
        trend_score: 0,
        trend_change: 0.0,
        like_to_view: 0.02,
        comment_to_view: 0.0,
        reply_to_view: 0.01,
        engagement_score: 545.0,
        source_url: Some("https://community.n8n.io/t/1".to_string()),
        related_queries: Vec::new(),
        created_at: created,
        last_updated: created,
    }
}

#[test]
fn pool_config_from_app_config_uses_core_values() {
    let pool_config = PoolConfig::from_app_config(&app_config());
    assert_eq!(pool_config.max_connections, 42);
    assert_eq!(pool_config.min_connections, 7);
    assert_eq!(pool_config.acquire_timeout_secs, 9);
}

#[test]
fn workflow_row_converts_into_record() {
    let record = forum_row("Forum").into_record().expect("known platform");
    assert_eq!(record.key.platform, Platform::Forum);
    assert_eq!(record.key.country, "Global");
    assert_eq!(record.metrics.replies, 5);
    assert!((record.ratios.like_to_view - 0.02).abs() < f64::EPSILON);
    assert_eq!(record.created_at, record.last_updated);
}

#[test]
fn workflow_row_with_unknown_platform_is_rejected() {
    let err = forum_row("forum").into_record().expect_err("labels are case-sensitive");
    assert!(matches!(err, DbError::UnknownPlatform(ref p) if p == "forum"));
}
