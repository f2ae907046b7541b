//! Client for the remote prediction service

use anyhow::Result;
use futures::future::{BoxFuture, FutureExt};
use machwatch_core::{PredictionError, PredictionRequest, PredictionResponse};
use std::time::Duration;

/// Anything that turns a sensor payload into a risk prediction
pub trait Predictor: Send + Sync {
    fn predict<'a>(
        &'a self,
        request: &'a PredictionRequest,
    ) -> BoxFuture<'a, Result<PredictionResponse, PredictionError>>;
}

/// JSON over HTTP POST
pub struct HttpPredictor {
    url: String,
    client: reqwest::Client,
}

impl HttpPredictor {
    pub fn new(url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { url, client })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Predictor for HttpPredictor {
    fn predict<'a>(
        &'a self,
        request: &'a PredictionRequest,
    ) -> BoxFuture<'a, Result<PredictionResponse, PredictionError>> {
        async move {
            let response = self
                .client
                .post(&self.url)
                .json(request)
                .send()
                .await
                .map_err(|e| PredictionError::Transport(e.to_string()))?;

            let status = response.status();
            let body = response
                .text()
                .await
                .map_err(|e| PredictionError::Transport(e.to_string()))?;

            if !status.is_success() {
                return Err(PredictionError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            PredictionResponse::from_json(&body)
        }
        .boxed()
    }
}
