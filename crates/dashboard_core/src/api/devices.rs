//! Cliente do registro de dispositivos (`/devices`, `/devices/{id}`).
//!
//! Criação e atualização respondem `{"message", "device"}`; leitura responde
//! o dispositivo puro. [`unwrap_device`] aceita os dois formatos.

use crate::error::{DashboardError, Result};
use crate::http::{Access, ApiClient, Method};
use crate::types::{Device, DeviceType, DeviceUpdate, NewDevice};
use serde_json::Value;
use tracing::info;

#[derive(Debug, Clone)]
pub struct DeviceApi {
    client: ApiClient,
}

impl DeviceApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Device>> {
        self.client
            .request(Method::Get, "/devices", &[], None, Access::Authenticated)
            .await
    }

    pub async fn get(&self, id: &str) -> Result<Device> {
        let value = self
            .client
            .request_json(Method::Get, &device_path(id)?, &[], None, Access::Authenticated)
            .await?;
        unwrap_device(value)
    }

    pub async fn create(&self, device: &NewDevice) -> Result<Device> {
        let errors = device.validate();
        if !errors.is_empty() {
            return Err(DashboardError::Validation(errors));
        }

        let body = serde_json::to_value(device)?;
        let value = self
            .client
            .request_json(Method::Post, "/devices", &[], Some(body), Access::Authenticated)
            .await?;
        let created = unwrap_device(value)?;
        info!("Dispositivo {} criado ({})", created.device_id, created.device_type);
        Ok(created)
    }

    /// Atualiza campos mutáveis. `current_type` permite validar localmente;
    /// sem ele, a validação de tipo fica com o servidor.
    pub async fn update(
        &self,
        id: &str,
        update: &DeviceUpdate,
        current_type: Option<DeviceType>,
    ) -> Result<Device> {
        let errors = update.validate(current_type.unwrap_or(DeviceType::Api));
        if !errors.is_empty() {
            return Err(DashboardError::Validation(errors));
        }

        let body = serde_json::to_value(update)?;
        let value = self
            .client
            .request_json(Method::Put, &device_path(id)?, &[], Some(body), Access::Authenticated)
            .await?;
        let updated = unwrap_device(value)?;
        info!("Dispositivo {} atualizado", updated.device_id);
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client
            .request_json(Method::Delete, &device_path(id)?, &[], None, Access::Authenticated)
            .await?;
        info!("Dispositivo {id} removido");
        Ok(())
    }
}

/// Caminho `/devices/{id}`.
///
/// IDs com separadores, `%` ou segmentos `.`/`..` mudariam a rota depois da
/// normalização da URL e são recusados antes do envio.
fn device_path(id: &str) -> Result<String> {
    let id = id.trim();
    if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\', '?', '#', '%']) {
        return Err(DashboardError::Validation(vec![format!(
            "Device ID inválido: {id:?}"
        )]));
    }
    Ok(format!("/devices/{id}"))
}

/// Extrai o dispositivo de `{"device": {...}}` ou do objeto puro.
pub fn unwrap_device(value: Value) -> Result<Device> {
    let inner = match value {
        Value::Object(mut map) if map.contains_key("device") && !map.contains_key("device_id") => {
            map.remove("device").unwrap_or(Value::Null)
        }
        other => other,
    };
    serde_json::from_value(inner).map_err(|e| DashboardError::Decode(format!("dispositivo: {e}")))
}
