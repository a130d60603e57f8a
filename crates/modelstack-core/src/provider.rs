use crate::error::{DeployError, Result};
use crate::types::{OutputRecord, StackHandle, StackStatus, StackView};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;

// ---------------------------------------------------------------------------
// StackProvider
// ---------------------------------------------------------------------------

/// Boundary to the provider's infrastructure-as-code API. The convergence
/// loop only ever talks to this trait; tests substitute scripted fakes.
pub trait StackProvider {
    /// Current remote state of a named stack. `StackNotFound` when absent.
    fn describe(&self, name: &str) -> Result<StackView>;

    /// Submit a creation request. A `Provider` error here (malformed
    /// template, authorization failure) is never retried locally.
    fn create(
        &self,
        name: &str,
        template_body: &str,
        parameters: &[(String, String)],
    ) -> Result<StackHandle>;

    /// Named outputs of a stack. Only meaningful once the stack is
    /// complete; a stack with no outputs yields an empty vec.
    fn outputs(&self, name: &str) -> Result<Vec<OutputRecord>>;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct DescribeResponse {
    stack_name: String,
    stack_status: String,
    #[serde(default)]
    outputs: Vec<WireOutput>,
}

#[derive(Debug, Serialize, Deserialize)]
struct WireOutput {
    output_key: String,
    output_value: String,
}

#[derive(Debug, Serialize)]
struct CreateRequest<'a> {
    stack_name: &'a str,
    template_body: &'a str,
    parameters: Vec<WireParameter<'a>>,
}

#[derive(Debug, Serialize)]
struct WireParameter<'a> {
    parameter_key: &'a str,
    parameter_value: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    stack_id: String,
}

// ---------------------------------------------------------------------------
// HttpStackProvider
// ---------------------------------------------------------------------------

/// Blocking JSON client for the provider API.
pub struct HttpStackProvider {
    client: Client,
    base_url: String,
    region: String,
}

impl HttpStackProvider {
    pub fn new(base_url: impl Into<String>, region: impl Into<String>) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            region: region.into(),
        })
    }

    fn stack_url(&self, name: &str) -> String {
        format!("{}/stacks/{}", self.base_url, name)
    }

    fn reject(status: StatusCode, body: String) -> DeployError {
        DeployError::Provider {
            message: format!("{}: {}", status.as_u16(), body),
        }
    }
}

impl StackProvider for HttpStackProvider {
    fn describe(&self, name: &str) -> Result<StackView> {
        let response = self
            .client
            .get(self.stack_url(name))
            .header("x-region", &self.region)
            .send()?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(DeployError::StackNotFound(name.to_string())),
            status if status.is_success() => {
                let body: DescribeResponse = response.json()?;
                Ok(StackView {
                    name: body.stack_name,
                    status: StackStatus::parse(&body.stack_status),
                    outputs: body
                        .outputs
                        .into_iter()
                        .map(|o| OutputRecord::new(o.output_key, o.output_value))
                        .collect(),
                })
            }
            status => Err(Self::reject(status, response.text().unwrap_or_default())),
        }
    }

    fn create(
        &self,
        name: &str,
        template_body: &str,
        parameters: &[(String, String)],
    ) -> Result<StackHandle> {
        let request = CreateRequest {
            stack_name: name,
            template_body,
            parameters: parameters
                .iter()
                .map(|(k, v)| WireParameter {
                    parameter_key: k,
                    parameter_value: v,
                })
                .collect(),
        };

        let response = self
            .client
            .post(format!("{}/stacks", self.base_url))
            .header("x-region", &self.region)
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(Self::reject(status, response.text().unwrap_or_default()));
        }
        let body: CreateResponse = response.json()?;
        Ok(StackHandle(body.stack_id))
    }

    fn outputs(&self, name: &str) -> Result<Vec<OutputRecord>> {
        Ok(self.describe(name)?.outputs)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
