//! # Dashboard Core
//!
//! Crate compartilhada do dashboard IoT: tipos do registro de dispositivos e
//! da telemetria, clientes REST dos três serviços, sessão, configuração TOML
//! e a camada que transforma leituras em séries de gráfico.
//!
//! ## Módulos
//! - [`types`] – Device, TelemetryRecord, ChartSeries…
//! - [`config`] – Configuração unificada via TOML
//! - [`error`] – Taxonomia de erros (rede, status, validação, sessão)
//! - [`session`] – Sessão persistida + gate de acesso
//! - [`http`] – Wrapper HTTP com token bearer e retry
//! - [`api`] – Clientes de autenticação, dispositivos e telemetria
//! - [`series`] – Registros → séries label/dataset
//! - [`fetch`] – Máquina de estados de uma busca
//! - [`hooks`] – Buscas disparadas por seleção
//! - [`theme`] – Cores dos datasets e tons de status

pub mod types;
pub mod config;
pub mod error;
pub mod session;
pub mod http;
pub mod api;
pub mod series;
pub mod fetch;
pub mod hooks;
pub mod theme;

// Re-exports convenientes
pub use api::Clients;
pub use config::AppConfig;
pub use error::{DashboardError, Result};
pub use fetch::FetchState;
pub use session::{AuthGate, GateDecision, SessionContext, SessionEvent};
pub use types::{ChartSeries, Device, TelemetryRecord};
