//! HTTP attack engine backed by reqwest

use std::sync::Arc;
use std::time::{Duration, Instant};

use barrage_config::EngineConfig;
use barrage_core::{AttackOpts, AttackResult};
use barrage_interfaces::{AttackEngine, ResultStream};
use chrono::Utc;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    redirect, Client, Method,
};
use tokio::sync::{mpsc, Semaphore};
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

/// Issues requests against the attack target at a constant rate.
///
/// Each attack gets its own client so per-attack options (timeouts,
/// redirects, HTTP version) never leak between attacks. At most `workers`
/// requests are in flight at a time; the pacer waits for a free worker when
/// the target falls behind.
pub struct HttpAttackEngine {
    config: EngineConfig,
}

struct PreparedAttack {
    client: Client,
    method: Method,
    url: String,
    headers: HeaderMap,
    body: Option<String>,
}

impl HttpAttackEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    fn prepare(&self, opts: &AttackOpts) -> Result<PreparedAttack, String> {
        let method = Method::from_bytes(opts.target.method.to_uppercase().as_bytes())
            .map_err(|e| format!("invalid method {}: {}", opts.target.method, e))?;

        let mut headers = HeaderMap::new();
        for (name, value) in &opts.target.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| format!("invalid header name {}: {}", name, e))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| format!("invalid value for header {}: {}", name, e))?;
            headers.insert(name, value);
        }

        let redirects = if opts.redirects < 0 {
            redirect::Policy::none()
        } else {
            redirect::Policy::limited(opts.redirects as usize)
        };

        let mut builder = Client::builder()
            .user_agent(self.config.user_agent.as_str())
            .timeout(opts.timeout)
            .connect_timeout(self.config.connect_timeout)
            .redirect(redirects)
            .danger_accept_invalid_certs(self.config.insecure)
            .pool_max_idle_per_host(if opts.keepalive { opts.connections } else { 0 });
        if opts.h2c {
            builder = builder.http2_prior_knowledge();
        } else if !opts.http2 {
            builder = builder.http1_only();
        }
        let client = builder.build().map_err(|e| e.to_string())?;

        Ok(PreparedAttack {
            client,
            method,
            url: opts.target.url.clone(),
            headers,
            body: opts.target.body.clone(),
        })
    }
}

impl AttackEngine for HttpAttackEngine {
    fn attack(&self, opts: &AttackOpts) -> Option<ResultStream> {
        let prepared = match self.prepare(opts) {
            Ok(prepared) => prepared,
            Err(e) => {
                warn!(attack = %opts.name, error = %e, "Cannot start attack");
                return None;
            }
        };

        let (tx, rx) = mpsc::channel(self.config.result_buffer);
        tokio::spawn(pace(Arc::new(prepared), opts.clone(), tx));
        Some(rx)
    }
}

/// Total number of requests an attack issues
fn planned_requests(rate: u32, duration: Duration) -> u64 {
    (f64::from(rate) * duration.as_secs_f64()).round() as u64
}

async fn pace(attack: Arc<PreparedAttack>, opts: AttackOpts, tx: mpsc::Sender<AttackResult>) {
    let total = planned_requests(opts.rate, opts.duration);
    let workers = Arc::new(Semaphore::new(opts.workers.max(1) as usize));
    let mut ticker = tokio::time::interval(Duration::from_secs_f64(1.0 / f64::from(opts.rate)));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);

    info!(attack = %opts.name, rate = opts.rate, requests = total, "Issuing requests");
    for seq in 0..total {
        ticker.tick().await;
        if tx.is_closed() {
            debug!(attack = %opts.name, seq, "Result stream dropped, stopping attack");
            return;
        }

        let Ok(permit) = Arc::clone(&workers).acquire_owned().await else {
            return;
        };
        let attack = Arc::clone(&attack);
        let tx = tx.clone();
        let name = opts.name.clone();
        let max_body = opts.max_body;
        tokio::spawn(async move {
            let result = hit(&attack, name, seq, max_body).await;
            drop(permit);
            // a closed stream means the attack was abandoned
            let _ = tx.send(result).await;
        });
    }
    debug!(attack = %opts.name, "All requests issued");
}

async fn hit(attack: &PreparedAttack, name: String, seq: u64, max_body: i64) -> AttackResult {
    let mut request = attack
        .client
        .request(attack.method.clone(), attack.url.as_str())
        .headers(attack.headers.clone());
    let bytes_out = attack.body.as_ref().map_or(0, |body| body.len() as u64);
    if let Some(body) = &attack.body {
        request = request.body(body.clone());
    }

    let timestamp = Utc::now();
    let started = Instant::now();
    let mut result = AttackResult {
        attack: name,
        seq,
        code: 0,
        timestamp,
        latency: Duration::ZERO,
        bytes_out,
        bytes_in: 0,
        error: String::new(),
    };

    match request.send().await {
        Ok(response) => {
            let status = response.status();
            result.code = status.as_u16();
            match response.bytes().await {
                Ok(body) => {
                    let read = body.len() as u64;
                    result.bytes_in = if max_body >= 0 { read.min(max_body as u64) } else { read };
                }
                Err(e) => result.error = e.to_string(),
            }
            if result.error.is_empty() && (status.is_client_error() || status.is_server_error()) {
                result.error = status.to_string();
            }
        }
        Err(e) => result.error = e.to_string(),
    }
    result.latency = started.elapsed();
    result
}
