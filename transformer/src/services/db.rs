//! Connection pool construction with bounded-backoff verification.

use std::time::Duration;

use mysql_async::{Opts, OptsBuilder, Pool};

use crate::config::{DestinationConfig, SourceConfig};
use crate::utils::{TransformError, TransformResult};

/// Connect-time retries before a worker gives up.
const CONNECT_ATTEMPTS: usize = 3;
const BACKOFF_INITIAL: Duration = Duration::from_secs(4);
const BACKOFF_MAX: Duration = Duration::from_secs(10);

pub fn source_opts(config: &SourceConfig) -> Opts {
    OptsBuilder::default()
        .ip_or_hostname(config.host.clone())
        .tcp_port(config.port)
        .user(Some(config.user.clone()))
        .pass(Some(config.password.clone()))
        .db_name(Some(config.database.clone()))
        .into()
}

pub fn destination_opts(config: &DestinationConfig, database: &str) -> Opts {
    OptsBuilder::default()
        .ip_or_hostname(config.host.clone())
        .tcp_port(config.port)
        .user(Some(config.user.clone()))
        .pass(Some(config.password.clone()))
        .db_name(Some(database.to_string()))
        .into()
}

/// Build a pool and verify it by taking one connection, retrying with
/// bounded exponential backoff. Once this returns, no further
/// reconnection-on-failure is attempted for the run.
pub async fn connect_with_retry(opts: Opts, target: &str) -> TransformResult<Pool> {
    let mut delay = BACKOFF_INITIAL;
    let mut last_error = String::new();
    for attempt in 1..=CONNECT_ATTEMPTS {
        let pool = Pool::new(opts.clone());
        match pool.get_conn().await {
            Ok(_conn) => {
                tracing::info!("Connected to {} database on {}", target, opts.ip_or_hostname());
                return Ok(pool);
            },
            Err(e) => {
                tracing::warn!(
                    "Connection attempt {}/{} to {} failed: {}",
                    attempt,
                    CONNECT_ATTEMPTS,
                    target,
                    e
                );
                last_error = e.to_string();
                pool.disconnect().await.ok();
                if attempt < CONNECT_ATTEMPTS {
                    tokio::time::sleep(delay).await;
                    delay = (delay * 2).min(BACKOFF_MAX);
                }
            },
        }
    }
    Err(TransformError::connection_failed(target, CONNECT_ATTEMPTS, last_error))
}
