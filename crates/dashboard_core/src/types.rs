//! Definição de tipos/structs do dashboard.
//!
//! Espelham os objetos JSON trocados com os serviços de autenticação,
//! de dispositivos e de telemetria.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ──────────────────────────────────────────────
// Dispositivos
// ──────────────────────────────────────────────

/// Categoria do dispositivo no registro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceType {
    /// Sensor de temperatura/umidade
    Iot,
    /// PC monitorado (CPU, disco, memória)
    EndDevice,
    /// Fonte externa georreferenciada (ex: API meteorológica)
    Api,
}

impl DeviceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceType::Iot => "iot",
            DeviceType::EndDevice => "end_device",
            DeviceType::Api => "api",
        }
    }
}

impl std::str::FromStr for DeviceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "iot" => Ok(DeviceType::Iot),
            "end_device" | "end-device" => Ok(DeviceType::EndDevice),
            "api" => Ok(DeviceType::Api),
            other => Err(format!("Tipo de dispositivo inválido: {other} (iot, end_device, api)")),
        }
    }
}

impl std::fmt::Display for DeviceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Estado operacional do dispositivo.
///
/// O registro aceita `active`/`inactive`; os demais aparecem apenas na exibição.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceStatus {
    #[default]
    Active,
    Inactive,
    Maintenance,
    Offline,
    #[serde(other)]
    Unknown,
}

impl DeviceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceStatus::Active => "active",
            DeviceStatus::Inactive => "inactive",
            DeviceStatus::Maintenance => "maintenance",
            DeviceStatus::Offline => "offline",
            DeviceStatus::Unknown => "unknown",
        }
    }
}

impl std::str::FromStr for DeviceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "active" => Ok(DeviceStatus::Active),
            "inactive" => Ok(DeviceStatus::Inactive),
            "maintenance" => Ok(DeviceStatus::Maintenance),
            "offline" => Ok(DeviceStatus::Offline),
            other => Err(format!("Status inválido: {other}")),
        }
    }
}

impl std::fmt::Display for DeviceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dispositivo como devolvido pelo serviço de registro.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// Identificador único e imutável
    pub device_id: String,
    #[serde(rename = "type")]
    pub device_type: DeviceType,
    #[serde(default)]
    pub status: DeviceStatus,
    /// Latitude (só faz sentido para `api`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_lat: Option<f64>,
    /// Longitude (só faz sentido para `api`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_lon: Option<f64>,
    /// Parâmetros monitorados (opaco)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monitored_params: Option<Value>,
    /// Última leitura registrada (opaco, formato depende do tipo)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

impl Device {
    /// Geolocalização, apenas para dispositivos `api` com ambas as coordenadas.
    pub fn location(&self) -> Option<(f64, f64)> {
        if self.device_type != DeviceType::Api {
            return None;
        }
        Some((self.location_lat?, self.location_lon?))
    }
}

/// Payload de criação de dispositivo (formulário "novo dispositivo").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewDevice {
    pub device_id: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub device_type: Option<DeviceType>,
    pub status: DeviceStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_lon: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitored_params: Option<Value>,
}

impl NewDevice {
    /// Valida os campos obrigatórios e retorna lista de erros.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.device_id.trim().is_empty() {
            errors.push("Device ID é obrigatório".into());
        }
        match self.device_type {
            None => errors.push("Tipo do dispositivo é obrigatório".into()),
            Some(DeviceType::Api) => match (self.location_lat, self.location_lon) {
                (Some(lat), Some(lon)) => check_coordinates(&mut errors, lat, lon),
                _ => errors.push("Coordenadas são obrigatórias para dispositivos api".into()),
            },
            Some(_) => {
                if self.location_lat.is_some()
                    || self.location_lon.is_some()
                    || self.monitored_params.is_some()
                {
                    errors.push("Localização e parâmetros só se aplicam a dispositivos api".into());
                }
            }
        }

        errors
    }
}

/// Atualização parcial de dispositivo; só campos presentes são enviados.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeviceUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DeviceStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_lat: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_lon: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monitored_params: Option<Value>,
}

impl DeviceUpdate {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.location_lat.is_none()
            && self.location_lon.is_none()
            && self.monitored_params.is_none()
    }

    /// Valida a atualização contra o tipo atual do dispositivo.
    pub fn validate(&self, device_type: DeviceType) -> Vec<String> {
        let mut errors = Vec::new();

        if self.is_empty() {
            errors.push("Nenhum campo para atualizar".into());
        }
        let touches_location = self.location_lat.is_some()
            || self.location_lon.is_some()
            || self.monitored_params.is_some();
        if touches_location && device_type != DeviceType::Api {
            errors.push("Localização e parâmetros só se aplicam a dispositivos api".into());
        }
        if let Some(lat) = self.location_lat {
            check_coordinates(&mut errors, lat, 0.0);
        }
        if let Some(lon) = self.location_lon {
            check_coordinates(&mut errors, 0.0, lon);
        }

        errors
    }
}

fn check_coordinates(errors: &mut Vec<String>, lat: f64, lon: f64) {
    if !(-90.0..=90.0).contains(&lat) {
        errors.push(format!("Latitude fora da faixa: {lat} (-90–90)"));
    }
    if !(-180.0..=180.0).contains(&lon) {
        errors.push(format!("Longitude fora da faixa: {lon} (-180–180)"));
    }
}

// ──────────────────────────────────────────────
// Telemetria
// ──────────────────────────────────────────────

/// Leitura de telemetria com timestamp.
///
/// Registros IoT trazem `temperature`/`humidity`; registros de end devices
/// trazem `cpu_load`/`disk_usage`/`memory_usage`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryRecord {
    /// Timestamp como enviado pelo backend (usado como label do gráfico)
    #[serde(default, deserialize_with = "timestamp_as_string")]
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    /// Temperatura (°C)
    #[serde(default)]
    pub temperature: Option<f64>,
    /// Umidade relativa (%)
    #[serde(default)]
    pub humidity: Option<f64>,
    /// Carga da CPU (%)
    #[serde(default)]
    pub cpu_load: Option<f64>,
    /// Uso de disco (%)
    #[serde(default)]
    pub disk_usage: Option<f64>,
    /// Uso de memória (%)
    #[serde(default)]
    pub memory_usage: Option<f64>,
}

/// Aceita timestamps como string ou número (epoch) sem perder o valor.
fn timestamp_as_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

/// Opção de seleção (`{value, label}`) para listas de IDs e IPs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

impl SelectOption {
    pub fn from_id(id: impl Into<String>) -> Self {
        let value = id.into();
        Self {
            label: value.clone(),
            value,
        }
    }
}

// ──────────────────────────────────────────────
// Autenticação
// ──────────────────────────────────────────────

/// Resposta de `POST /signin`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignInResponse {
    pub token: String,
    pub user: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Perfil do usuário autenticado (`GET /profile`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

// ──────────────────────────────────────────────
// Gráficos
// ──────────────────────────────────────────────

/// Série de valores de uma métrica com metadados de estilo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub label: String,
    /// Um ponto por label; `None` quando o registro não trouxe a métrica
    pub data: Vec<Option<f64>>,
    pub fill: bool,
    pub border_color: String,
    pub tension: f32,
}

/// Estrutura label + datasets consumida pela camada de gráficos.
///
/// Invariante: todo `dataset.data` tem o mesmo tamanho de `labels`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl ChartSeries {
    /// Série sem pontos: a view mostra "sem dados", não erro.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }
}

// ──────────────────────────────────────────────
// Testes
// ──────────────────────────────────────────────
