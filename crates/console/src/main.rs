//! # Dashboard Console
//!
//! Front-end de terminal do dashboard IoT: autenticação, CRUD do registro
//! de dispositivos e tabelas das séries de telemetria.
//!
//! A sessão fica em `session.toml` ao lado do `config.toml`. Comandos de
//! dispositivos exigem sessão; se o servidor rejeitar o token, a sessão é
//! descartada e o usuário é mandado de volta ao `signin`.

mod cli;
mod render;

use clap::Parser;
use cli::{Cli, Commands, DeviceCommands, TelemetryCommands};
use dashboard_core::config::AppConfig;
use dashboard_core::hooks::{
    device_list_hook, device_options_hook, end_device_hook, end_device_options_hook,
    temperature_hook,
};
use dashboard_core::session::FileSessionStore;
use dashboard_core::theme::{Theme, get_theme};
use dashboard_core::types::{DeviceUpdate, NewDevice};
use dashboard_core::{AuthGate, Clients, FetchState, GateDecision, SessionContext, SessionEvent};
use serde_json::Value;
use std::error::Error;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

type CmdResult = Result<(), Box<dyn Error>>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Logging ──
    let filter = match &cli.log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    // ── Config ──
    let config_path = cli.config.clone().unwrap_or_else(AppConfig::default_path);
    let config = AppConfig::load(&config_path);

    if !config_path.exists() {
        let _ = config.save(&config_path);
    }
    for problem in config.validate() {
        warn!("config: {problem}");
    }

    // ── Sessão + clientes ──
    let store = FileSessionStore::new(config.session_path(&config_path));
    let session = Arc::new(SessionContext::new(store));
    let mut events = session.subscribe();

    let clients = match Clients::from_config(&config, session) {
        Ok(clients) => clients,
        Err(e) => {
            eprintln!("Erro: {e}");
            return ExitCode::FAILURE;
        }
    };

    let app = App {
        clients,
        theme: get_theme(&config.display.theme),
        sort: config.telemetry.sort_by_timestamp,
        config,
    };
    let result = app.run(cli.command).await;

    // rejeição de token durante o comando: volta para o sign-in
    while let Ok(event) = events.try_recv() {
        debug!("evento de sessão: {event:?}");
        if let SessionEvent::Expired { reason } = event {
            eprintln!("Sessão expirada ({reason}). Execute `dashboard signin` novamente.");
        }
    }

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Erro: {e}");
            ExitCode::FAILURE
        }
    }
}

struct App {
    clients: Clients,
    config: AppConfig,
    theme: Theme,
    sort: bool,
}

impl App {
    async fn run(&self, command: Commands) -> CmdResult {
        match command {
            Commands::Signin { username, password } => self.sign_in(&username, &password).await,
            Commands::Register {
                username,
                email,
                password,
            } => {
                self.clients.auth.register(&username, &email, &password).await?;
                println!("Conta criada. Faça signin para continuar.");
                Ok(())
            }
            Commands::Profile => {
                AuthGate::require(&self.clients.session)?;
                let profile = self.clients.auth.profile().await?;
                println!("Usuário: {}", profile.username);
                if let Some(email) = profile.email {
                    println!("E-mail:  {email}");
                }
                if let Some(created) = profile.created_at {
                    println!("Desde:   {created}");
                }
                Ok(())
            }
            Commands::Logout => self.logout().await,
            Commands::Devices { action } => {
                AuthGate::require(&self.clients.session)?;
                self.devices(action).await
            }
            Commands::Telemetry { action } => self.telemetry(action).await,
            Commands::Config => {
                println!("{}", serde_json::to_string_pretty(&self.config)?);
                let problems = self.config.validate();
                if problems.is_empty() {
                    println!("Configuração válida.");
                } else {
                    for p in &problems {
                        println!("  ⚠ {p}");
                    }
                }
                Ok(())
            }
        }
    }

    async fn sign_in(&self, username: &str, password: &str) -> CmdResult {
        if let GateDecision::Allow(current) = AuthGate::check(&self.clients.session) {
            println!(
                "Já autenticado como {}. Use `dashboard logout` para trocar de usuário.",
                current.username
            );
            return Ok(());
        }

        let response = self.clients.auth.sign_in(username, password).await?;
        println!(
            "{} ({})",
            response.message.as_deref().unwrap_or("Login efetuado"),
            response.user
        );
        Ok(())
    }

    async fn logout(&self) -> CmdResult {
        if !self.clients.session.is_signed_in() {
            println!("Nenhuma sessão ativa.");
            return Ok(());
        }
        match self.clients.auth.logout().await {
            Ok(()) => println!("Sessão encerrada."),
            Err(e) => println!("Sessão encerrada localmente (servidor: {e})."),
        }
        Ok(())
    }

    async fn devices(&self, action: DeviceCommands) -> CmdResult {
        let api = &self.clients.devices;
        match action {
            DeviceCommands::List => {
                let mut hook = device_list_hook(api.clone());
                hook.select(());
                let devices = settled(hook.settle().await)?;
                print!("{}", render::devices_table(devices));
            }
            DeviceCommands::Get { id } => {
                let device = api.get(&id).await?;
                print!("{}", render::device_detail(&device));
            }
            DeviceCommands::Create {
                id,
                device_type,
                status,
                lat,
                lon,
                params,
            } => {
                let new_device = NewDevice {
                    device_id: id,
                    device_type: Some(device_type),
                    status,
                    location_lat: lat,
                    location_lon: lon,
                    monitored_params: parse_params(params.as_deref())?,
                };
                let created = api.create(&new_device).await?;
                println!("Dispositivo {} registrado.", created.device_id);
            }
            DeviceCommands::Update {
                id,
                status,
                lat,
                lon,
                params,
            } => {
                let update = DeviceUpdate {
                    status,
                    location_lat: lat,
                    location_lon: lon,
                    monitored_params: parse_params(params.as_deref())?,
                };
                // formulário de edição: carrega o atual para validar contra o tipo
                let current = api.get(&id).await?;
                let updated = api.update(&id, &update, Some(current.device_type)).await?;
                print!("{}", render::device_detail(&updated));
            }
            DeviceCommands::Delete { id } => {
                api.delete(&id).await?;
                println!("Dispositivo {id} removido.");
            }
        }
        Ok(())
    }

    async fn telemetry(&self, action: TelemetryCommands) -> CmdResult {
        let api = self.clients.telemetry.clone();
        match action {
            TelemetryCommands::Ids => {
                let mut hook = device_options_hook(api);
                hook.select(());
                print!("{}", render::options_list(settled(hook.settle().await)?));
            }
            TelemetryCommands::EndDevices => {
                let mut hook = end_device_options_hook(api);
                hook.select(());
                print!("{}", render::options_list(settled(hook.settle().await)?));
            }
            TelemetryCommands::Temperature { device_id } => {
                let mut hook = temperature_hook(api, self.theme.clone(), self.sort);
                hook.select(device_id);
                let charts = settled(hook.settle().await)?;
                print!("{}", render::series_table("Temperatura", &charts.temperature));
                print!("{}", render::series_table("Umidade", &charts.humidity));
            }
            TelemetryCommands::EndDevice { ip_address } => {
                let mut hook = end_device_hook(api, self.theme.clone(), self.sort);
                hook.select(ip_address);
                let charts = settled(hook.settle().await)?;
                print!("{}", render::series_table("CPU", &charts.cpu));
                print!("{}", render::series_table("Disco", &charts.disk));
                print!("{}", render::series_table("Memória", &charts.memory));
            }
        }
        Ok(())
    }
}

/// Dado de um hook já resolvido, ou a mensagem de erro.
fn settled<T>(state: &FetchState<T>) -> Result<&T, Box<dyn Error>> {
    match state {
        FetchState::Ready(data) => Ok(data),
        FetchState::Failed { message, .. } => Err(message.clone().into()),
        other => Err(format!("busca não concluída ({})", other.name()).into()),
    }
}

fn parse_params(raw: Option<&str>) -> Result<Option<Value>, Box<dyn Error>> {
    raw.map(serde_json::from_str::<Value>)
        .transpose()
        .map_err(|e| format!("--params não é JSON válido: {e}").into())
}
