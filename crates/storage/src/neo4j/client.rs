use graphlink_core::StoreConfig;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::response::{StatementResult, TransactionRequest, TransactionResponse};
use super::statements::Statement;
use crate::error::{Result, StorageError};

/// HTTP client for the Neo4j transactional Cypher endpoint
pub struct Neo4jClient {
    client: Client,
    transaction_url: String,
    user: String,
    password: String,
}

/// A server-side transaction holding the results of its statements
#[derive(Debug)]
pub(crate) struct OpenTransaction {
    url: String,
    commit_url: String,
    pub results: Vec<StatementResult>,
}

fn transport_error(e: reqwest::Error) -> StorageError {
    let error_kind = if e.is_timeout() {
        "timeout"
    } else if e.is_connect() {
        "connection"
    } else if e.is_request() {
        "request"
    } else if e.is_body() {
        "body"
    } else {
        "unknown"
    };
    StorageError::Unavailable(format!("{error_kind} error: {e}"))
}

impl Neo4jClient {
    /// Build a client for the endpoint described by `config`
    ///
    /// No request is made; an unreachable server surfaces on first use as
    /// [`StorageError::Unavailable`].
    pub fn new(config: &StoreConfig) -> Result<Self> {
        let transaction_url = config.transaction_url();
        info!("Using Neo4j HTTP endpoint at {transaction_url}");

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| StorageError::InvalidConfig(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            transaction_url,
            user: config.user.clone(),
            password: config.password.clone(),
        })
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<(TransactionResponse, Option<String>)> {
        let response = request
            .basic_auth(&self.user, Some(&self.password))
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                warn!("Neo4j request failed: {e}");
                transport_error(e)
            })?;
        let location = response
            .headers()
            .get(reqwest::header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = Self::decode(response).await?;
        Ok((body.check()?, location))
    }

    async fn decode(response: Response) -> Result<TransactionResponse> {
        let status = response.status();
        if status.is_server_error() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            warn!("Neo4j returned {status}: {error_text}");
            return Err(StorageError::Unavailable(format!(
                "server returned {status}: {error_text}"
            )));
        }

        let text = response.text().await.map_err(transport_error)?;
        match serde_json::from_str::<TransactionResponse>(&text) {
            Ok(body) if status.is_success() || !body.errors.is_empty() => Ok(body),
            _ if status == StatusCode::NOT_FOUND => Err(StorageError::Server {
                code: status.to_string(),
                message: "transaction not found".to_string(),
            }),
            Ok(_) => Err(StorageError::Server {
                code: status.to_string(),
                message: text,
            }),
            Err(e) => Err(StorageError::Protocol(format!(
                "Failed to parse Neo4j response ({status}): {e}"
            ))),
        }
    }

    /// Run statements in a transaction that commits in the same request
    pub(crate) async fn run(&self, statements: &[Statement]) -> Result<Vec<StatementResult>> {
        let url = format!("{}/commit", self.transaction_url);
        debug!(statements = statements.len(), "Running auto-commit transaction");
        let (response, _) = self
            .send(self.client.post(&url).json(&TransactionRequest { statements }))
            .await?;
        Self::expect_results(response.results, statements.len())
    }

    /// Open a transaction and run statements in it, leaving it uncommitted
    ///
    /// If a statement fails the server rolls the transaction back itself.
    pub(crate) async fn open(&self, statements: &[Statement]) -> Result<OpenTransaction> {
        debug!(statements = statements.len(), "Opening transaction");
        let (response, location) = self
            .send(
                self.client
                    .post(&self.transaction_url)
                    .json(&TransactionRequest { statements }),
            )
            .await?;

        let commit_url = response.commit.ok_or_else(|| {
            StorageError::Protocol("open transaction has no commit URL".to_string())
        })?;
        let url = match location {
            Some(url) => url,
            None => commit_url
                .strip_suffix("/commit")
                .map(str::to_string)
                .ok_or_else(|| {
                    StorageError::Protocol(format!("unexpected commit URL {commit_url}"))
                })?,
        };
        let results = Self::expect_results(response.results, statements.len())?;

        Ok(OpenTransaction {
            url,
            commit_url,
            results,
        })
    }

    pub(crate) async fn commit(&self, transaction: &OpenTransaction) -> Result<()> {
        debug!(url = %transaction.url, "Committing transaction");
        self.send(
            self.client
                .post(&transaction.commit_url)
                .json(&TransactionRequest { statements: &[] }),
        )
        .await?;
        Ok(())
    }

    pub(crate) async fn rollback(&self, transaction: &OpenTransaction) -> Result<()> {
        debug!(url = %transaction.url, "Rolling back transaction");
        self.send(self.client.delete(&transaction.url)).await?;
        Ok(())
    }

    fn expect_results(
        results: Vec<StatementResult>,
        expected: usize,
    ) -> Result<Vec<StatementResult>> {
        if results.len() != expected {
            return Err(StorageError::Protocol(format!(
                "expected {expected} statement results, got {}",
                results.len()
            )));
        }
        Ok(results)
    }
}
