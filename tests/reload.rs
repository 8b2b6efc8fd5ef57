//! Configuration reload.

use std::time::Duration;

use axum::http::StatusCode;
use edge_forwarder::config::watcher::ConfigWatcher;
use edge_forwarder::config::{validate_config, ForwarderConfig};
use url::Url;

mod common;

#[tokio::test]
async fn test_new_config_switches_backend() {
    let old = common::start_mock_backend("old", StatusCode::OK).await;
    let new = common::start_mock_backend("new", StatusCode::OK).await;
    let proxy = common::start_forwarder(&old.base_url()).await;
    let client = common::client();

    let res = client.get(proxy.url("/api/who")).send().await.unwrap();
    assert_eq!(res.headers()["x-backend"], "old");

    let mut config = ForwarderConfig::default();
    config.listener.bind_address = proxy.addr.to_string();
    config.backend.base_url = Url::parse(&new.base_url()).unwrap();
    proxy.config_tx.send(config).unwrap();

    let mut switched = false;
    for _ in 0..50 {
        let res = client.get(proxy.url("/api/who")).send().await.unwrap();
        if res.headers()["x-backend"] == "new" {
            switched = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(switched, "requests should reach the new backend after reload");

    proxy.shutdown.trigger();
}

#[tokio::test]
async fn test_watcher_emits_parsed_changes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("forwarder.toml");
    std::fs::write(&path, "[backend]\nbase_url = \"http://127.0.0.1:4000\"\n").unwrap();

    let (watcher, mut updates) = ConfigWatcher::new(&path);
    let _handle = watcher.run().unwrap();

    // The watcher only parses; an invalid version is still passed on and
    // left to the receiver to reject.
    std::fs::write(&path, "[timeouts]\nconnect_secs = 0\n").unwrap();
    let invalid = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let config = updates.recv().await.expect("watcher stopped");
            if config.timeouts.connect_secs == 0 {
                return config;
            }
        }
    })
    .await
    .expect("no reload observed");
    assert!(validate_config(&invalid).is_err());

    std::fs::write(&path, "[backend]\nbase_url = \"http://127.0.0.1:4001\"\n").unwrap();

    let config = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let config = updates.recv().await.expect("watcher stopped");
            if config.backend.base_url.port() == Some(4001) {
                return config;
            }
        }
    })
    .await
    .expect("no reload observed");

    assert_eq!(config.backend.base_url.as_str(), "http://127.0.0.1:4001/");
}
