//! Wrapper HTTP sobre um transporte injetável.
//!
//! - [`HttpTransport`] – envia uma requisição crua (reqwest em produção,
//!   mock nos testes)
//! - [`ApiClient`] – URL base + header bearer + mapeamento de status em
//!   [`DashboardError`] + retry com backoff apenas para GET

use crate::config::HttpConfig;
use crate::error::{DashboardError, Result};
use crate::session::SessionContext;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Verbo HTTP usado pelas APIs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// Só GET é repetido automaticamente.
    pub fn is_idempotent_read(&self) -> bool {
        matches!(self, Method::Get)
    }
}

/// Requisição já resolvida (URL completa, token, corpo JSON).
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub bearer: Option<String>,
    pub body: Option<Value>,
}

/// Resposta crua: status e corpo em texto.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Abstração do cliente HTTP para injeção de dependência.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait HttpTransport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Transporte de produção usando reqwest.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DashboardError::Config(format!("Falha ao criar cliente HTTP: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = request.method.as_str();
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
            Method::Put => self.client.put(&request.url),
            Method::Delete => self.client.delete(&request.url),
        };
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                DashboardError::Network(format!("{method} {} expirou: {e}", request.url))
            } else {
                DashboardError::Network(format!("{method} {} falhou: {e}", request.url))
            }
        })?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| DashboardError::Network(format!("Lendo corpo da resposta: {e}")))?;

        debug!("{method} {} -> {} ({} bytes)", request.url, status, body.len());
        Ok(HttpResponse { status, body })
    }
}

/// Política de retry com backoff exponencial e jitter.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_ms: u64,
    pub factor: f64,
    pub max_ms: u64,
    pub jitter_percent: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from(&HttpConfig::default())
    }
}

impl From<&HttpConfig> for RetryPolicy {
    fn from(cfg: &HttpConfig) -> Self {
        Self {
            max_attempts: cfg.max_attempts.max(1),
            base_ms: cfg.backoff_base_ms,
            factor: cfg.backoff_factor,
            max_ms: cfg.backoff_max_ms,
            jitter_percent: cfg.jitter_percent,
        }
    }
}

impl RetryPolicy {
    /// Sem retry (uma única tentativa).
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Espera antes da tentativa seguinte a `attempt` (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        use rand::Rng;

        let base = (self.base_ms as f64 * self.factor.powi(attempt as i32)).min(self.max_ms as f64);
        let jitter_range = base * self.jitter_percent;
        let jitter = if jitter_range > 0.0 {
            rand::thread_rng().gen_range(-jitter_range..=jitter_range)
        } else {
            0.0
        };
        Duration::from_millis((base + jitter).max(0.0) as u64)
    }
}

/// Exigência de autenticação de uma chamada.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Nunca envia token; 401 é um status comum (ex: credenciais erradas).
    Public,
    /// Envia o token da sessão; rejeição derruba a sessão.
    Authenticated,
}

/// Cliente REST ligado a uma URL base.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    transport: Arc<dyn HttpTransport>,
    session: Arc<SessionContext>,
    retry: RetryPolicy,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("retry", &self.retry)
            .finish()
    }
}

impl ApiClient {
    pub fn new(
        base_url: impl Into<String>,
        transport: Arc<dyn HttpTransport>,
        session: Arc<SessionContext>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            transport,
            session,
            retry,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &Arc<SessionContext> {
        &self.session
    }

    /// Monta a URL completa com query string codificada.
    pub fn url(&self, path: &str, query: &[(&str, &str)]) -> Result<String> {
        let raw = format!("{}{}", self.base_url, path);
        let mut url = reqwest::Url::parse(&raw)
            .map_err(|e| DashboardError::Config(format!("URL inválida {raw:?}: {e}")))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url.to_string())
    }

    /// Executa a chamada e devolve o corpo JSON (`Null` se vazio).
    pub async fn request_json(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
        access: Access,
    ) -> Result<Value> {
        let bearer = match access {
            Access::Public => None,
            Access::Authenticated => self.session.token(),
        };
        let request = HttpRequest {
            method,
            url: self.url(path, query)?,
            bearer,
            body,
        };

        let attempts = if method.is_idempotent_read() {
            self.retry.max_attempts.max(1)
        } else {
            1
        };

        let mut attempt = 0;
        loop {
            let outcome = self.send_once(&request, access).await;
            match outcome {
                Err(e) if e.is_transient() && attempt + 1 < attempts => {
                    let delay = self.retry.delay(attempt);
                    warn!(
                        "{} {} falhou ({e}); tentativa {}/{} em {:?}",
                        method.as_str(),
                        request.url,
                        attempt + 1,
                        attempts,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }

    /// Executa a chamada e deserializa o corpo em `T`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<Value>,
        access: Access,
    ) -> Result<T> {
        let value = self.request_json(method, path, query, body, access).await?;
        serde_json::from_value(value).map_err(|e| {
            DashboardError::Decode(format!("{} {path}: {e}", method.as_str()))
        })
    }

    async fn send_once(&self, request: &HttpRequest, access: Access) -> Result<Value> {
        let response = self.transport.send(request.clone()).await?;
        let status = response.status;

        if (200..300).contains(&status) {
            if response.body.trim().is_empty() {
                return Ok(Value::Null);
            }
            return serde_json::from_str(&response.body).map_err(|e| {
                DashboardError::Decode(format!("{} {}: {e}", request.method.as_str(), request.url))
            });
        }

        let message = error_message(status, &response.body);
        if access == Access::Authenticated && is_token_rejection(status, request.bearer.is_some()) {
            if let Some(token) = &request.bearer {
                self.session.invalidate(token, &message);
            }
            return Err(DashboardError::Auth(message));
        }
        Err(DashboardError::HttpStatus { status, message })
    }
}

/// 401 sempre; 422 só quando um token foi enviado (JWT malformado).
fn is_token_rejection(status: u16, sent_token: bool) -> bool {
    status == 401 || (status == 422 && sent_token)
}

/// Extrai a mensagem de erro do corpo (`error`, `message` ou `msg`).
pub fn error_message(status: u16, body: &str) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_str::<Value>(body) {
        for key in ["error", "message", "msg"] {
            if let Some(Value::String(msg)) = map.get(key) {
                return msg.clone();
            }
        }
    }
    let text = body.trim();
    if text.is_empty() {
        format!("status {status}")
    } else {
        text.chars().take(200).collect()
    }
}
