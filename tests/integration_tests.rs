// Integration tests: scrape endpoint over HTTP

mod common;

use axum_test::TestServer;
use common::*;
use infrahealth::commands::{ExportSettings, serve};
use infrahealth::metrics::ExporterMetrics;
use infrahealth::models::{ContainerSnapshot, ContainerState, HostSnapshot};
use infrahealth::routes;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

fn test_server() -> (TestServer, Arc<ExporterMetrics>) {
    let metrics = Arc::new(ExporterMetrics::new().unwrap());
    let server = TestServer::try_new(routes::app(metrics.clone())).unwrap();
    (server, metrics)
}

#[tokio::test]
async fn test_root_endpoint() {
    let (server, _) = test_server();
    let response = server.get("/").await;
    response.assert_status_ok();
    assert!(response.text().contains("metrics at /metrics"));
}

#[tokio::test]
async fn test_version_endpoint() {
    let (server, _) = test_server();
    let response = server.get("/version").await;
    response.assert_status_ok();
    let json: serde_json::Value = response.json();
    assert_eq!(
        json.get("name").and_then(|v| v.as_str()),
        Some("infrahealth")
    );
    assert!(json.get("version").and_then(|v| v.as_str()).is_some());
}

#[tokio::test]
async fn test_metrics_endpoint_exposes_recorded_values() {
    let (server, metrics) = test_server();
    metrics.record_host(&HostSnapshot {
        cpu_percent: 12.5,
        memory_percent: 50.5,
        disk_percent: 75.5,
        detail: None,
    });
    metrics.record_containers(&[ContainerSnapshot {
        name: "web".into(),
        status: ContainerState::Running,
        cpu_percent: 40.5,
        memory_percent: 45.5,
        detail: None,
        app_health: None,
    }]);

    let response = server.get("/metrics").await;
    response.assert_status_ok();
    let content_type = response.header(axum::http::header::CONTENT_TYPE);
    assert!(content_type.to_str().unwrap().starts_with("text/plain"));

    let body = response.text();
    assert!(body.contains("# TYPE infrahealth_server_cpu_percent gauge"));
    assert!(body.contains("infrahealth_server_cpu_percent 12.5"));
    assert!(body.contains("infrahealth_server_disk_percent 75.5"));
    assert!(body.contains("infrahealth_container_cpu_percent{container_name=\"web\"} 40.5"));
    assert!(body.contains("infrahealth_container_memory_percent{container_name=\"web\"} 45.5"));
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let (server, _) = test_server();
    server.get("/nope").expect_failure().await.assert_status_not_found();
}

async fn scrape(addr: std::net::SocketAddr) -> String {
    let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
    stream
        .write_all(b"GET /metrics HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
        .await
        .unwrap();
    let mut buf = String::new();
    stream.read_to_string(&mut buf).await.unwrap();
    buf
}

#[tokio::test]
async fn test_serve_runs_loop_and_stops_on_shutdown() {
    let host = Arc::new(FakeHost::new(HostValues {
        cpu: 12.5,
        ..HostValues::default()
    }));
    let runtime = Arc::new(FakeRuntime::new(vec![FakeContainer::running("web")]));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let settings = ExportSettings {
        host: "127.0.0.1".into(),
        port: addr.port(),
        interval: Duration::from_millis(20),
        collect_timeout: Duration::from_secs(5),
    };

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        serve(
            listener,
            Arc::new(host_collector(host)),
            Arc::new(container_collector(runtime)),
            &settings,
            async {
                let _ = shutdown_rx.await;
            },
        )
        .await
    });

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    loop {
        let body = scrape(addr).await;
        if body.contains("infrahealth_server_cpu_percent 12.5")
            && body.contains("infrahealth_container_cpu_percent{container_name=\"web\"} 40")
        {
            break;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "gauges never populated: {}",
            body
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    shutdown_tx.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("serve did not stop")
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_serve_publishes_host_gauges_without_container_runtime() {
    let host = Arc::new(FakeHost::new(HostValues {
        cpu: 21.5,
        ..HostValues::default()
    }));
    let runtime = Arc::new(FakeRuntime::new(vec![FakeContainer::running("web")]));
    runtime.set_unavailable(true);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let settings = ExportSettings {
        host: "127.0.0.1".into(),
        port: addr.port(),
        interval: Duration::from_millis(20),
        collect_timeout: Duration::from_secs(5),
    };

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();
    let handle = tokio::spawn(async move {
        serve(
            listener,
            Arc::new(host_collector(host)),
            Arc::new(container_collector(runtime)),
            &settings,
            async {
                let _ = shutdown_rx.await;
            },
        )
        .await
    });

    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    let body = loop {
        let body = scrape(addr).await;
        if body.contains("infrahealth_server_cpu_percent 21.5") {
            break body;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "host gauges never populated: {}",
            body
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    };
    assert!(!body.contains("container_name=\"web\""));
    // Still serving after several failed container steps.
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(scrape(addr).await.contains("infrahealth_server_cpu_percent 21.5"));

    shutdown_tx.send(()).unwrap();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("serve did not stop")
        .unwrap();
    assert!(result.is_ok());
}
