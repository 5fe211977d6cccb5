//! End-to-end DI wiring check: [`toolgate::build`] must assemble every
//! adapter and use case against the deterministic/in-process provider stack
//! `AppConfig::default()` selects, with no network dependency, and the
//! resulting dispatcher must actually serve a tool call.

use serde_json::json;
use toolgate_domain::value_objects::TenantFingerprint;
use toolgate_infrastructure::config::AppConfig;

fn in_memory_config() -> AppConfig {
    AppConfig { database_path: ":memory:".to_owned(), ..AppConfig::default() }
}

#[tokio::test]
async fn build_wires_the_application_against_an_in_memory_database() {
    let config = in_memory_config();
    let app = toolgate::build(&config).await.expect("DI wiring succeeds against the default provider stack");

    assert_eq!(app.index_workers.len(), config.index.workers);

    let tenant = TenantFingerprint::from_api_key("sk-integration-test");
    let stat = app.dispatch.call(&tenant, "proj", "file_stat", json!({"project": "proj", "path": "/missing.txt"}), None).await.unwrap();
    assert_eq!(stat["exists"], json!(false));
}

#[tokio::test]
async fn written_file_round_trips_through_read() {
    let config = in_memory_config();
    let app = toolgate::build(&config).await.expect("DI wiring succeeds");
    let tenant = TenantFingerprint::from_api_key("sk-integration-roundtrip");

    app.dispatch
        .call(&tenant, "proj", "file_write", json!({"project": "proj", "path": "/note.txt", "mode": "OVERWRITE", "content": "hello from the gateway"}), None)
        .await
        .unwrap();

    let read = app.dispatch.call(&tenant, "proj", "file_read", json!({"project": "proj", "path": "/note.txt"}), None).await.unwrap();
    assert_eq!(read["content"], json!("hello from the gateway"));
}

#[tokio::test]
async fn spawned_background_tasks_shut_down_cleanly() {
    let config = in_memory_config();
    let app = toolgate::build(&config).await.expect("DI wiring succeeds");
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    let handles = toolgate::spawn_background_tasks(&app, shutdown_rx);

    shutdown_tx.send(true).expect("receiver is still alive");
    for handle in handles {
        tokio::time::timeout(std::time::Duration::from_secs(5), handle).await.expect("worker observes shutdown promptly").unwrap();
    }
}
