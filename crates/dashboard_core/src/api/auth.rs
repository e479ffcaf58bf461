//! Cliente do serviço de autenticação (`/signin`, `/register`, `/profile`, `/logout`).

use crate::error::{DashboardError, Result};
use crate::http::{Access, ApiClient, Method};
use crate::session::Session;
use crate::types::{Profile, SignInResponse};
use serde_json::json;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Autentica e abre a sessão local com o token recebido.
    pub async fn sign_in(&self, username: &str, password: &str) -> Result<SignInResponse> {
        let mut errors = Vec::new();
        if username.trim().is_empty() {
            errors.push("Usuário é obrigatório".into());
        }
        if password.is_empty() {
            errors.push("Senha é obrigatória".into());
        }
        if !errors.is_empty() {
            return Err(DashboardError::Validation(errors));
        }

        let response: SignInResponse = self
            .client
            .request(
                Method::Post,
                "/signin",
                &[],
                Some(json!({ "username": username, "password": password })),
                Access::Public,
            )
            .await?;

        self.client.session().open(Session {
            token: response.token.clone(),
            username: response.user.clone(),
        })?;
        info!("Sign-in de {} concluído", response.user);
        Ok(response)
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> Result<()> {
        let mut errors = Vec::new();
        if username.trim().is_empty() {
            errors.push("Usuário é obrigatório".into());
        }
        if email.trim().is_empty() {
            errors.push("E-mail é obrigatório".into());
        } else if !email.contains('@') {
            errors.push(format!("E-mail inválido: {email}"));
        }
        if password.is_empty() {
            errors.push("Senha é obrigatória".into());
        }
        if !errors.is_empty() {
            return Err(DashboardError::Validation(errors));
        }

        self.client
            .request_json(
                Method::Post,
                "/register",
                &[],
                Some(json!({ "username": username, "email": email, "password": password })),
                Access::Public,
            )
            .await?;
        info!("Usuário {username} registrado");
        Ok(())
    }

    pub async fn profile(&self) -> Result<Profile> {
        self.client
            .request(Method::Get, "/profile", &[], None, Access::Authenticated)
            .await
    }

    /// Encerra a sessão no servidor e, sempre, localmente.
    pub async fn logout(&self) -> Result<()> {
        let remote = self
            .client
            .request_json(Method::Post, "/logout", &[], Some(json!({})), Access::Authenticated)
            .await;
        if let Err(ref e) = remote {
            warn!("Logout remoto falhou: {e}");
        }
        self.client.session().close()?;
        remote.map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpResponse, MockHttpTransport, RetryPolicy};
    use crate::session::SessionContext;
    use std::sync::Arc;

    fn api(mock: MockHttpTransport, session: Arc<SessionContext>) -> AuthApi {
        AuthApi::new(ApiClient::new(
            "http://localhost:5000",
            Arc::new(mock),
            session,
            RetryPolicy::none(),
        ))
    }

    #[tokio::test]
    async fn sign_in_opens_session() {
        let mut mock = MockHttpTransport::new();
        mock.expect_send()
            .withf(|req| {
                req.url == "http://localhost:5000/signin"
                    && req.body
                        == Some(json!({"username": "alice", "password": "secret"}))
            })
            .returning(|_| {
                Box::pin(async {
                    Ok(HttpResponse {
                        status: 200,
                        body: r#"{"message":"Login successful","user":"alice","token":"jwt-1"}"#
                            .into(),
                    })
                })
            });

        let session = Arc::new(SessionContext::in_memory());
        let response = api(mock, session.clone())
            .sign_in("alice", "secret")
            .await
            .unwrap();
        assert_eq!(response.user, "alice");
        assert_eq!(session.token().as_deref(), Some("jwt-1"));
    }

    #[tokio::test]
    async fn sign_in_validates_before_calling() {
        let mock = MockHttpTransport::new(); // nenhuma chamada esperada
        let err = api(mock, Arc::new(SessionContext::in_memory()))
            .sign_in("", "")
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Validation(ref v) if v.len() == 2));
    }

    #[tokio::test]
    async fn failed_sign_in_keeps_no_session() {
        let mut mock = MockHttpTransport::new();
        mock.expect_send().returning(|_| {
            Box::pin(async {
                Ok(HttpResponse {
                    status: 401,
                    body: r#"{"message":"Invalid credentials"}"#.into(),
                })
            })
        });
        let session = Arc::new(SessionContext::in_memory());
        let err = api(mock, session.clone())
            .sign_in("alice", "wrong")
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert!(!session.is_signed_in());
    }

    #[tokio::test]
    async fn register_requires_email() {
        let mock = MockHttpTransport::new();
        let err = api(mock, Arc::new(SessionContext::in_memory()))
            .register("bob", "not-an-email", "pw")
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::Validation(_)));
    }

    #[tokio::test]
    async fn logout_clears_session_even_on_failure() {
        let mut mock = MockHttpTransport::new();
        mock.expect_send()
            .withf(|req| req.bearer.as_deref() == Some("jwt-1"))
            .returning(|_| Box::pin(async { Err(DashboardError::Network("down".into())) }));

        let session = Arc::new(SessionContext::in_memory());
        session
            .open(Session {
                token: "jwt-1".into(),
                username: "alice".into(),
            })
            .unwrap();

        let result = api(mock, session.clone()).logout().await;
        assert!(result.is_err());
        assert!(!session.is_signed_in());
    }
}
