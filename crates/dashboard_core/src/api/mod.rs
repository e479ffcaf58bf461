//! Clientes de domínio, um por serviço REST.
//!
//! - [`auth`] – sign-in, registro, perfil, logout
//! - [`devices`] – CRUD do registro de dispositivos
//! - [`telemetry`] – séries de temperatura e de end devices

pub mod auth;
pub mod devices;
pub mod telemetry;

pub use auth::AuthApi;
pub use devices::DeviceApi;
pub use telemetry::TelemetryApi;

use crate::config::AppConfig;
use crate::error::Result;
use crate::http::{ApiClient, HttpTransport, ReqwestTransport, RetryPolicy};
use crate::session::SessionContext;
use std::sync::Arc;

/// Os três clientes compartilhando transporte e sessão.
#[derive(Debug, Clone)]
pub struct Clients {
    pub auth: AuthApi,
    pub devices: DeviceApi,
    pub telemetry: Arc<TelemetryApi>,
    pub session: Arc<SessionContext>,
}

impl Clients {
    /// Monta os clientes com transporte reqwest a partir da config.
    pub fn from_config(config: &AppConfig, session: Arc<SessionContext>) -> Result<Self> {
        let transport = Arc::new(ReqwestTransport::new(config.http.timeout()?)?);
        Ok(Self::with_transport(config, transport, session))
    }

    /// Monta os clientes sobre um transporte arbitrário (fakes em testes).
    pub fn with_transport(
        config: &AppConfig,
        transport: Arc<dyn HttpTransport>,
        session: Arc<SessionContext>,
    ) -> Self {
        let retry = RetryPolicy::from(&config.http);
        let client = |base: &str| {
            ApiClient::new(base, transport.clone(), session.clone(), retry.clone())
        };

        Self {
            auth: AuthApi::new(client(&config.auth.base_url)),
            devices: DeviceApi::new(client(&config.devices.base_url)),
            telemetry: Arc::new(TelemetryApi::new(client(&config.telemetry.base_url))),
            session,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;

    #[test]
    fn bad_timeout_rejected_when_building_clients() {
        let mut config = AppConfig::default();
        config.http.timeout_secs = -1.0;
        let result = Clients::from_config(&config, Arc::new(SessionContext::in_memory()));
        assert!(matches!(result, Err(DashboardError::Config(_))));
    }
}
