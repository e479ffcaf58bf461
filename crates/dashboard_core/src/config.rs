//! Configuração unificada via TOML.
//!
//! Um único `config.toml` com o endereço de cada serviço REST, a política
//! HTTP (timeout e retry) e onde a sessão fica guardada.

use crate::error::DashboardError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Serviço de autenticação.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// URL base (ex: "http://localhost:5000")
    pub base_url: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".into(),
        }
    }
}

/// Serviço de registro de dispositivos.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DevicesConfig {
    pub base_url: String,
}

impl Default for DevicesConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5001".into(),
        }
    }
}

/// Serviço de telemetria.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub base_url: String,
    /// Ordena registros por timestamp antes de montar os gráficos.
    /// Desligado = mantém a ordem do backend.
    pub sort_by_timestamp: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5010".into(),
            sort_by_timestamp: false,
        }
    }
}

/// Política HTTP: timeout por requisição e retry com backoff (só GET).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// Timeout de cada requisição (segundos)
    pub timeout_secs: f64,
    /// Total de tentativas para GET (1 = sem retry)
    pub max_attempts: u32,
    /// Espera antes da segunda tentativa (ms)
    pub backoff_base_ms: u64,
    /// Multiplicador a cada nova tentativa
    pub backoff_factor: f64,
    /// Teto da espera (ms)
    pub backoff_max_ms: u64,
    /// Jitter relativo (0.2 = ±20%)
    pub jitter_percent: f64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10.0,
            max_attempts: 3,
            backoff_base_ms: 200,
            backoff_factor: 2.0,
            backoff_max_ms: 2000,
            jitter_percent: 0.2,
        }
    }
}

impl HttpConfig {
    /// Timeout como `Duration`; valores negativos, NaN ou enormes são erro.
    pub fn timeout(&self) -> crate::error::Result<Duration> {
        match Duration::try_from_secs_f64(self.timeout_secs) {
            Ok(timeout) if !timeout.is_zero() => Ok(timeout),
            _ => Err(DashboardError::Config(format!(
                "timeout_secs inválido: {}",
                self.timeout_secs
            ))),
        }
    }
}

/// Onde a sessão (token + usuário) é persistida.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Caminho do arquivo de sessão (vazio = `session.toml` ao lado da config)
    pub path: String,
}

/// Preferências de exibição.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Tema: "dark", "light", "high_contrast"
    pub theme: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            theme: "dark".into(),
        }
    }
}

/// Configuração raiz do aplicativo.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub auth: AuthConfig,
    pub devices: DevicesConfig,
    pub telemetry: TelemetryConfig,
    pub http: HttpConfig,
    pub session: SessionConfig,
    pub display: DisplayConfig,
}

impl AppConfig {
    /// Carrega configuração de um arquivo TOML.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str::<AppConfig>(&content) {
                    Ok(config) => {
                        info!("Configuração carregada de {}", path.display());
                        return config;
                    }
                    Err(e) => {
                        warn!("Erro ao parsear {}: {}", path.display(), e);
                    }
                },
                Err(e) => {
                    warn!("Erro ao ler {}: {}", path.display(), e);
                }
            }
        }

        info!("Usando configuração padrão");
        AppConfig::default()
    }

    /// Salva configuração em arquivo TOML.
    pub fn save(&self, path: &Path) -> Result<(), String> {
        let content = toml::to_string_pretty(self).map_err(|e| e.to_string())?;
        std::fs::write(path, content).map_err(|e| e.to_string())?;
        info!("Configuração salva em {}", path.display());
        Ok(())
    }

    /// Retorna o caminho padrão do config.toml.
    pub fn default_path() -> PathBuf {
        exe_dir().join("config.toml")
    }

    /// Caminho efetivo do arquivo de sessão.
    pub fn session_path(&self, config_path: &Path) -> PathBuf {
        if self.session.path.trim().is_empty() {
            config_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(exe_dir)
                .join("session.toml")
        } else {
            PathBuf::from(&self.session.path)
        }
    }

    /// Valida a configuração e retorna lista de erros.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (name, url) in [
            ("auth", &self.auth.base_url),
            ("devices", &self.devices.base_url),
            ("telemetry", &self.telemetry.base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                errors.push(format!("URL base de {name} inválida: {url:?}"));
            }
        }
        if !(self.http.timeout_secs > 0.0 && self.http.timeout_secs <= 300.0) {
            errors.push(format!(
                "Timeout HTTP inválido: {} (0–300)",
                self.http.timeout_secs
            ));
        }
        if self.http.max_attempts == 0 || self.http.max_attempts > 10 {
            errors.push(format!(
                "Número de tentativas inválido: {} (1–10)",
                self.http.max_attempts
            ));
        }
        if self.http.backoff_factor < 1.0 {
            errors.push(format!(
                "Fator de backoff inválido: {} (>= 1.0)",
                self.http.backoff_factor
            ));
        }
        if !(0.0..1.0).contains(&self.http.jitter_percent) {
            errors.push(format!(
                "Jitter inválido: {} (0.0–1.0)",
                self.http.jitter_percent
            ));
        }

        errors
    }
}

fn exe_dir() -> PathBuf {
    std::env::current_exe()
        .map(|p| p.parent().unwrap_or(Path::new(".")).to_path_buf())
        .unwrap_or_else(|_| PathBuf::from("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        let errors = config.validate();
        assert!(errors.is_empty(), "Erros: {:?}", errors);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let partial = r#"
[devices]
base_url = "http://registry.lan:8080"

[http]
max_attempts = 1
"#;
        let config: AppConfig = toml::from_str(partial).unwrap();
        assert_eq!(config.devices.base_url, "http://registry.lan:8080");
        assert_eq!(config.http.max_attempts, 1);
        // Outros campos devem ter valor padrão
        assert_eq!(config.auth.base_url, "http://localhost:5000");
        assert_eq!(config.telemetry.base_url, "http://localhost:5010");
        assert!(!config.telemetry.sort_by_timestamp);
    }

    #[test]
    fn rejects_bad_urls_and_policy() {
        let mut config = AppConfig::default();
        config.auth.base_url = "localhost:5000".into();
        config.http.max_attempts = 0;
        config.http.jitter_percent = 1.5;
        assert_eq!(config.validate().len(), 3);
    }

    #[test]
    fn bad_timeout_is_an_error_not_a_panic() {
        let mut config = AppConfig::default();
        assert_eq!(config.http.timeout().unwrap(), Duration::from_secs(10));

        for bad in [-1.0, 0.0, f64::NAN, f64::INFINITY, 1e300] {
            config.http.timeout_secs = bad;
            assert!(
                matches!(config.http.timeout(), Err(DashboardError::Config(_))),
                "timeout_secs = {bad}"
            );
            assert!(!config.validate().is_empty(), "timeout_secs = {bad}");
        }
    }

    #[test]
    fn session_path_defaults_next_to_config() {
        let config = AppConfig::default();
        let path = config.session_path(Path::new("/etc/dashboard/config.toml"));
        assert_eq!(path, PathBuf::from("/etc/dashboard/session.toml"));

        let mut custom = AppConfig::default();
        custom.session.path = "/tmp/s.toml".into();
        assert_eq!(
            custom.session_path(Path::new("/etc/dashboard/config.toml")),
            PathBuf::from("/tmp/s.toml")
        );
    }

    #[test]
    fn save_and_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut config = AppConfig::default();
        config.display.theme = "light".into();
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path);
        assert_eq!(loaded.display.theme, "light");
        assert_eq!(loaded.http.max_attempts, config.http.max_attempts);
    }
}
