//! Argumentos de linha de comando (clap).

use clap::{Parser, Subcommand};
use dashboard_core::types::{DeviceStatus, DeviceType};
use std::path::PathBuf;

/// Dashboard IoT no terminal: registro de dispositivos e gráficos de telemetria
#[derive(Parser, Debug)]
#[command(name = "dashboard", version, about, long_about = None)]
pub struct Cli {
    /// Caminho do config.toml (padrão: ao lado do executável)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Nível de log (sobrepõe RUST_LOG)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Autentica e salva a sessão local
    Signin {
        username: String,
        #[arg(long)]
        password: String,
    },

    /// Cria uma conta
    Register {
        username: String,
        email: String,
        #[arg(long)]
        password: String,
    },

    /// Mostra o perfil do usuário autenticado
    Profile,

    /// Encerra a sessão (local sempre, remota se possível)
    Logout,

    /// Registro de dispositivos (requer sessão)
    Devices {
        #[command(subcommand)]
        action: DeviceCommands,
    },

    /// Séries de telemetria
    Telemetry {
        #[command(subcommand)]
        action: TelemetryCommands,
    },

    /// Mostra a configuração efetiva e problemas de validação
    Config,
}

#[derive(Subcommand, Debug)]
pub enum DeviceCommands {
    /// Lista todos os dispositivos
    List,

    /// Detalhes de um dispositivo, incluindo a última leitura
    Get { id: String },

    /// Registra um dispositivo novo
    Create {
        id: String,
        #[arg(long = "type")]
        device_type: DeviceType,
        #[arg(long, default_value = "active")]
        status: DeviceStatus,
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        lon: Option<f64>,
        /// Parâmetros monitorados em JSON (ex: '["temperature"]')
        #[arg(long)]
        params: Option<String>,
    },

    /// Altera status, localização ou parâmetros
    Update {
        id: String,
        #[arg(long)]
        status: Option<DeviceStatus>,
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, allow_hyphen_values = true)]
        lon: Option<f64>,
        #[arg(long)]
        params: Option<String>,
    },

    /// Remove um dispositivo
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum TelemetryCommands {
    /// IDs de dispositivos IoT com telemetria
    Ids,

    /// Temperatura e umidade de um dispositivo IoT
    Temperature { device_id: String },

    /// IPs de end devices com telemetria
    EndDevices,

    /// CPU, disco e memória de um end device
    EndDevice { ip_address: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_create_with_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "dashboard", "devices", "create", "meteo-sp", "--type", "api", "--lat", "-23.55",
            "--lon", "-46.63",
        ])
        .unwrap();
        match cli.command {
            Commands::Devices {
                action: DeviceCommands::Create { device_type, status, lat, lon, .. },
            } => {
                assert_eq!(device_type, DeviceType::Api);
                assert_eq!(status, DeviceStatus::Active);
                assert_eq!(lat, Some(-23.55));
                assert_eq!(lon, Some(-46.63));
            }
            other => panic!("comando inesperado: {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_device_type() {
        let result = Cli::try_parse_from(["dashboard", "devices", "create", "x", "--type", "robot"]);
        assert!(result.is_err());
    }

    #[test]
    fn global_config_flag_after_subcommand() {
        let cli = Cli::try_parse_from(["dashboard", "telemetry", "ids", "--config", "/tmp/c.toml"])
            .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
    }
}
