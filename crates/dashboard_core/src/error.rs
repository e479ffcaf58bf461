//! Erros do cliente do dashboard.
//!
//! Taxonomia única para as três APIs: falha de rede, status HTTP não-2xx,
//! validação local antes do envio e sessão inválida/expirada.

/// Erros que podem surgir em qualquer camada do cliente.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DashboardError {
    /// Requisição não pôde ser enviada ou a resposta não chegou.
    #[error("Erro de rede: {0}")]
    Network(String),

    /// Resposta recebida com status fora da faixa 2xx.
    #[error("HTTP {status}: {message}")]
    HttpStatus { status: u16, message: String },

    /// Campos obrigatórios ausentes ou fora de faixa (checado antes do envio).
    #[error("Dados inválidos: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Token ausente, expirado ou rejeitado pelo servidor.
    #[error("Sessão inválida: {0}")]
    Auth(String),

    /// Corpo da resposta não corresponde ao formato esperado.
    #[error("Resposta inesperada: {0}")]
    Decode(String),

    /// Tarefa de busca terminou sem entregar resultado.
    #[error("Busca interrompida: {0}")]
    Interrupted(String),

    #[error("Erro de configuração: {0}")]
    Config(String),

    #[error("Erro de I/O: {0}")]
    Io(String),
}

impl DashboardError {
    /// Status HTTP associado ao erro, se houver.
    pub fn status(&self) -> Option<u16> {
        match self {
            DashboardError::HttpStatus { status, .. } => Some(*status),
            DashboardError::Auth(_) => Some(401),
            _ => None,
        }
    }

    /// Indica se uma nova tentativa pode ter resultado diferente.
    ///
    /// Só falhas de rede e erros 5xx são transitórios.
    pub fn is_transient(&self) -> bool {
        match self {
            DashboardError::Network(_) => true,
            DashboardError::HttpStatus { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn is_auth(&self) -> bool {
        matches!(self, DashboardError::Auth(_))
    }
}

impl From<std::io::Error> for DashboardError {
    fn from(e: std::io::Error) -> Self {
        DashboardError::Io(e.to_string())
    }
}

impl From<serde_json::Error> for DashboardError {
    fn from(e: serde_json::Error) -> Self {
        DashboardError::Decode(e.to_string())
    }
}

/// Alias de resultado usado em todo o crate.
pub type Result<T> = std::result::Result<T, DashboardError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(DashboardError::Network("refused".into()).is_transient());
        assert!(
            DashboardError::HttpStatus {
                status: 503,
                message: "down".into()
            }
            .is_transient()
        );
        assert!(
            !DashboardError::HttpStatus {
                status: 404,
                message: "Device not found".into()
            }
            .is_transient()
        );
        assert!(!DashboardError::Auth("expired".into()).is_transient());
    }

    #[test]
    fn validation_message_joins_problems() {
        let err = DashboardError::Validation(vec!["a".into(), "b".into()]);
        assert_eq!(err.to_string(), "Dados inválidos: a; b");
    }

    #[test]
    fn status_code_exposed() {
        let err = DashboardError::HttpStatus {
            status: 409,
            message: "Device ID already exists".into(),
        };
        assert_eq!(err.status(), Some(409));
        assert_eq!(DashboardError::Network("x".into()).status(), None);
    }
}
