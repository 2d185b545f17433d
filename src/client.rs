use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tracing::{debug, trace};

use crate::logger::MessageLogger;
use crate::protocol::WriteRequest;
use crate::{Error, Result};

/// Thin GET-and-return-body client for the controller's XML endpoints.
pub(crate) struct XmlClient {
    http: reqwest::Client,
    base_url: String,
    logger: Option<Mutex<MessageLogger>>,
}

impl XmlClient {
    pub fn new(
        base_url: String,
        timeout: Duration,
        logger: Option<MessageLogger>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url,
            logger: logger.map(Mutex::new),
        })
    }

    /// Single attempt. Transport errors and any status other than 200 fail.
    pub async fn fetch(&self, path: &str, query: &[(&str, String)]) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, ?query, "GET");
        self.with_logger(|l| l.log_request(path, query));

        let resp = self.http.get(&url).query(query).send().await?;
        let status = resp.status().as_u16();
        if status != 200 {
            debug!(url = %url, status, "unexpected status");
            self.with_logger(|l| l.log_response(path, query, status, ""));
            return Err(Error::Status(status));
        }

        let body = resp.text().await?;
        trace!(url = %url, len = body.len(), "response body");
        self.with_logger(|l| l.log_response(path, query, status, &body));
        Ok(body)
    }

    pub async fn write(&self, request: &WriteRequest) -> Result<()> {
        self.with_logger(|l| l.log_command(request.action, request.zone, &request.params));
        self.fetch(request.endpoint, &request.params).await.map(|_| ())
    }

    fn with_logger(&self, f: impl FnOnce(&mut MessageLogger)) {
        if let Some(ref logger) = self.logger {
            let mut guard = logger.lock().unwrap_or_else(PoisonError::into_inner);
            f(&mut guard);
        }
    }
}
