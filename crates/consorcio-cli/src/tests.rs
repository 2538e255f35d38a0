//! CLI command tests
//!
//! Commands that talk to the data store are exercised against the mock
//! store server from consorcio-core's test utilities.

use clap::Parser;
use consorcio_core::test_utils::MockStoreServer;
use serde_json::json;

use crate::cli::{Cli, Commands};
use crate::commands::{self, truncate};

fn seed_expenses(server: &MockStoreServer) {
    server.seed(
        "buildings",
        vec![json!({"id": "b1", "address": "Av. Rivadavia 1234", "total_units": 10})],
    );
    server.seed(
        "expenses",
        vec![
            json!({
                "amount": 100.50,
                "description": "Limpieza mensual",
                "building_id": "b1",
                "provider_id": null,
                "provider_name": "Limpieza Total",
                "provider_category": "Limpieza",
                "expense_reporting_month": "2024-11"
            }),
            json!({
                "amount": 50.0,
                "description": null,
                "building_id": "b1",
                "provider_id": null,
                "expense_reporting_month": "2024-10"
            }),
        ],
    );
}

// ========== Argument Parsing Tests ==========

#[test]
fn test_cli_parses_serve_defaults() {
    let cli = Cli::parse_from(["consorcio", "serve"]);
    match cli.command {
        Commands::Serve {
            port,
            host,
            static_dir,
            origin,
        } => {
            assert_eq!(port, 3000);
            assert_eq!(host, "127.0.0.1");
            assert!(static_dir.is_none());
            assert!(origin.is_empty());
        }
        _ => panic!("expected serve command"),
    }
}

#[test]
fn test_cli_parses_repeated_origins() {
    let cli = Cli::parse_from([
        "consorcio",
        "serve",
        "--origin",
        "https://a.example",
        "--origin",
        "https://b.example",
    ]);
    match cli.command {
        Commands::Serve { origin, .. } => assert_eq!(origin.len(), 2),
        _ => panic!("expected serve command"),
    }
}

#[test]
fn test_cli_parses_summary_month() {
    let cli = Cli::parse_from([
        "consorcio", "summary", "--building", "b1", "--month", "2024-11", "--json",
    ]);
    match cli.command {
        Commands::Summary {
            building,
            month,
            json,
        } => {
            assert_eq!(building, "b1");
            assert_eq!(month.as_deref(), Some("2024-11"));
            assert!(json);
        }
        _ => panic!("expected summary command"),
    }
}

// ========== Status Command Tests ==========

#[tokio::test]
async fn test_cmd_status_against_live_store() {
    let server = MockStoreServer::start().await;
    seed_expenses(&server);

    let store = server.client();
    assert!(commands::cmd_status_with(&store, false).await.is_ok());
    assert!(commands::cmd_status_with(&store, true).await.is_ok());
}

#[tokio::test]
async fn test_cmd_status_with_unreachable_store() {
    let mut server = MockStoreServer::start().await;
    let store = server.client();
    server.stop();
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    // Unreachability is reported, not raised.
    assert!(commands::cmd_status_with(&store, false).await.is_ok());
}

// ========== Summary Command Tests ==========

#[tokio::test]
async fn test_cmd_summary_defaults_to_latest_month() {
    let server = MockStoreServer::start().await;
    seed_expenses(&server);

    let store = server.client();
    assert!(commands::cmd_summary_with(&store, "b1", None, false)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_cmd_summary_all_months_json() {
    let server = MockStoreServer::start().await;
    seed_expenses(&server);

    let store = server.client();
    assert!(commands::cmd_summary_with(&store, "b1", Some("all"), true)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_cmd_summary_rejects_bad_month() {
    let server = MockStoreServer::start().await;
    seed_expenses(&server);

    let store = server.client();
    let result = commands::cmd_summary_with(&store, "b1", Some("noviembre"), false).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_cmd_summary_unknown_building_fails() {
    let server = MockStoreServer::start().await;
    seed_expenses(&server);

    let store = server.client();
    let result = commands::cmd_summary_with(&store, "ghost", None, false).await;
    assert!(result.is_err());
}

// ========== Helper Tests ==========

#[test]
fn test_truncate_counts_characters() {
    assert_eq!(truncate("short", 30), "short");
    assert_eq!(truncate("abcdefghij", 8), "abcde...");
    // Multi-byte characters are never split.
    assert_eq!(truncate("añañañañ", 7), "añañ...");
}
