use lazy_static::lazy_static;
use prometheus::{IntCounterVec, Opts, Registry};
use std::sync::Once;
use tokio::sync::watch;
use warp::{Filter, Rejection, Reply};

lazy_static! {
    pub static ref RECONCILE_ATTEMPTS: IntCounterVec = IntCounterVec::new(
        Opts::new("reconcile_attempts_total", "reconcile attempts per namespace"),
        &["namespace"]
    )
    .expect("metric can not be created");

    pub static ref RECONCILE_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new("reconcile_failures_total", "failed reconcile attempts per namespace"),
        &["namespace"]
    )
    .expect("metric can not be created");

    pub static ref RECORDS_UPDATED: IntCounterVec = IntCounterVec::new(
        Opts::new("records_updated_total", "records updated with a fetched value"),
        &["namespace"]
    )
    .expect("metric can not be created");

    pub static ref REPORT_EVENTS: IntCounterVec = IntCounterVec::new(
        Opts::new("report_events_total", "report events emitted for failed reconciles"),
        &["namespace"]
    )
    .expect("metric can not be created");

    pub static ref REGISTRY: Registry = Registry::new();
}

static REGISTER: Once = Once::new();

fn register_custom_metrics() {
    REGISTER.call_once(|| {
        REGISTRY
            .register(Box::new(RECONCILE_ATTEMPTS.clone()))
            .expect("collector can be registered");
        REGISTRY
            .register(Box::new(RECONCILE_FAILURES.clone()))
            .expect("collector can be registered");
        REGISTRY
            .register(Box::new(RECORDS_UPDATED.clone()))
            .expect("collector can be registered");
        REGISTRY
            .register(Box::new(REPORT_EVENTS.clone()))
            .expect("collector can be registered");
    });
}

pub async fn start_server(port: u16, mut shutdown_signal: watch::Receiver<()>) {
    register_custom_metrics();

    let metrics_route = warp::path!("metrics").and_then(metrics_handler);

    let (_, server) =
        warp::serve(metrics_route).bind_with_graceful_shutdown(([0, 0, 0, 0], port), async move {
            let _ = shutdown_signal.changed().await;
        });
    server.await;
}

async fn metrics_handler() -> Result<impl Reply, Rejection> {
    Ok(render_metrics())
}

/// Export metrics for Prometheus to scrape
pub fn render_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&REGISTRY.gather(), &mut buffer) {
        eprintln!("could not encode custom metrics: {}", e);
    };
    let mut res = match String::from_utf8(buffer) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("custom metrics could not be from_utf8'd: {}", e);
            String::default()
        }
    };

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&prometheus::gather(), &mut buffer) {
        eprintln!("could not encode prometheus metrics: {}", e);
    };
    let res_default = match String::from_utf8(buffer) {
        Ok(v) => v,
        Err(e) => {
            eprintln!("prometheus metrics could not be from_utf8'd: {}", e);
            String::default()
        }
    };

    res.push_str(&res_default);
    res
}
