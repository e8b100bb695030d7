use futures_util::StreamExt;
use reqwest::Client;
use tokio::time::Instant;

use crate::metrics::{RequestKind, RequestMetric};

/// One finished GET. `body` is only kept when the caller asked for it.
#[derive(Debug)]
pub(super) struct FetchOutcome {
    pub(super) metric: RequestMetric,
    pub(super) body: Option<String>,
}

pub(super) async fn fetch(client: &Client, url: &str, kind: RequestKind) -> FetchOutcome {
    let start = Instant::now();
    let keep_body = matches!(kind, RequestKind::Page);
    let result = match client.get(url).send().await {
        Ok(response) => {
            let status = response.status().as_u16();
            if keep_body {
                read_body(response)
                    .await
                    .map(|(bytes, body)| (status, bytes, Some(body)))
            } else {
                drain_response_body(response)
                    .await
                    .map(|bytes| (status, bytes, None))
            }
        }
        Err(err) => Err(err),
    };

    match result {
        Ok((status_code, response_bytes, body)) => FetchOutcome {
            metric: RequestMetric {
                kind,
                start,
                response_time: start.elapsed(),
                status_code,
                timed_out: false,
                transport_error: false,
                response_bytes,
            },
            body,
        },
        Err(err) => {
            let timed_out = err.is_timeout();
            tracing::debug!("GET {} failed: {}", url, err);
            FetchOutcome {
                metric: RequestMetric {
                    kind,
                    start,
                    response_time: start.elapsed(),
                    status_code: err.status().map_or(0, |status| status.as_u16()),
                    timed_out,
                    transport_error: !timed_out,
                    response_bytes: 0,
                },
                body: None,
            }
        }
    }
}

async fn read_body(response: reqwest::Response) -> Result<(u64, String), reqwest::Error> {
    let bytes = response.bytes().await?;
    let len = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
    Ok((len, String::from_utf8_lossy(&bytes).into_owned()))
}

async fn drain_response_body(response: reqwest::Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}
