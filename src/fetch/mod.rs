//! Retry and fallback primitives shared by every probe
//!
//! [`Fetcher::fetch_with_retry`] drives one candidate through its retry
//! budget with exponential backoff. [`Fetcher::fetch_with_fallback`] walks an
//! ordered candidate list, one candidate at a time, and returns the first
//! success.

pub mod fallback;
pub mod retry;

pub use fallback::FallbackSuccess;
pub use retry::RetryPolicy;

use crate::client::HttpTransport;
use crate::clock::Clock;
use crate::logging::FetchLogger;
use std::sync::Arc;

/// Issues requests through a transport, sleeping on the injected clock
#[derive(Clone)]
pub struct Fetcher {
    transport: Arc<dyn HttpTransport>,
    clock: Arc<dyn Clock>,
    logger: FetchLogger,
}

impl Fetcher {
    pub fn new(transport: Arc<dyn HttpTransport>, clock: Arc<dyn Clock>, logger: FetchLogger) -> Self {
        Self {
            transport,
            clock,
            logger,
        }
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::client::{HttpResponse, HttpTransport, RequestConfig};
    use crate::clock::testing::ManualClock;
    use crate::error::TransportError;
    use crate::logging::{FetchLogger, Logger};
    use async_trait::async_trait;
    use bytes::Bytes;
    use reqwest::Method;
    use std::collections::{HashMap, VecDeque};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Scripted answer to one request
    #[derive(Debug, Clone)]
    pub struct Reply {
        result: Result<u16, TransportError>,
        delay: Duration,
        body_len: usize,
    }

    impl Reply {
        pub fn ok() -> Self {
            Self::status(200)
        }

        pub fn status(code: u16) -> Self {
            Self {
                result: Ok(code),
                delay: Duration::ZERO,
                body_len: 0,
            }
        }

        pub fn error(error: TransportError) -> Self {
            Self {
                result: Err(error),
                delay: Duration::ZERO,
                body_len: 0,
            }
        }

        pub fn refused() -> Self {
            Self::error(TransportError::Connect("connection refused".to_string()))
        }

        /// Advance the manual clock by `delay` while "in flight"
        pub fn after(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        pub fn with_body(mut self, body_len: usize) -> Self {
            self.body_len = body_len;
            self
        }
    }

    #[derive(Debug, Clone)]
    pub struct RecordedRequest {
        pub url: String,
        pub method: Method,
        pub body_len: usize,
    }

    /// Transport answering from per-URL scripts; the last reply repeats.
    /// Unscripted URLs are refused.
    pub struct ScriptedTransport {
        clock: Arc<ManualClock>,
        scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
        requests: Mutex<Vec<RecordedRequest>>,
    }

    impl ScriptedTransport {
        pub fn new(clock: Arc<ManualClock>) -> Self {
            Self {
                clock,
                scripts: Mutex::new(HashMap::new()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn on(self, url: &str, replies: Vec<Reply>) -> Self {
            self.scripts
                .lock()
                .unwrap()
                .insert(url.to_string(), replies.into_iter().collect());
            self
        }

        pub fn requests(&self) -> Vec<RecordedRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn calls_to(&self, url: &str) -> usize {
            self.requests().iter().filter(|r| r.url == url).count()
        }

        pub fn total_calls(&self) -> usize {
            self.requests.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl HttpTransport for ScriptedTransport {
        async fn request(&self, url: &str, config: &RequestConfig) -> Result<HttpResponse, TransportError> {
            self.requests.lock().unwrap().push(RecordedRequest {
                url: url.to_string(),
                method: config.method.clone(),
                body_len: config.body_len(),
            });

            let reply = {
                let mut scripts = self.scripts.lock().unwrap();
                match scripts.get_mut(url) {
                    Some(queue) if queue.len() > 1 => queue.pop_front(),
                    Some(queue) => queue.front().cloned(),
                    None => None,
                }
            }
            .unwrap_or_else(Reply::refused);

            self.clock.advance(reply.delay);

            let status_code = reply.result?;
            let body = if config.consume_body {
                Bytes::from(vec![0u8; reply.body_len])
            } else {
                Bytes::new()
            };

            Ok(HttpResponse {
                status_code,
                body,
            })
        }
    }

    pub fn quiet_fetch_logger() -> FetchLogger {
        FetchLogger::from_logger(Logger::quiet("TEST"))
    }

    /// Fetcher over a scripted transport and a manual clock
    pub fn fetcher(transport: Arc<ScriptedTransport>, clock: Arc<ManualClock>) -> super::Fetcher {
        super::Fetcher::new(transport, clock, quiet_fetch_logger())
    }
}
