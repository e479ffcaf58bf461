//! Cliente do serviço de telemetria (leitura pública, sem token).

use crate::error::Result;
use crate::http::{Access, ApiClient, Method};
use crate::types::TelemetryRecord;

#[derive(Debug, Clone)]
pub struct TelemetryApi {
    client: ApiClient,
}

impl TelemetryApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// IDs de dispositivos IoT com leituras.
    pub async fn list_device_ids(&self) -> Result<Vec<String>> {
        self.client
            .request(Method::Get, "/get-device-ids", &[], None, Access::Public)
            .await
    }

    /// Série de temperatura/umidade de um dispositivo IoT.
    pub async fn temperature_series(&self, device_id: &str) -> Result<Vec<TelemetryRecord>> {
        self.client
            .request(
                Method::Get,
                "/get-temperature-data",
                &[("device_id", device_id)],
                None,
                Access::Public,
            )
            .await
    }

    /// Endereços IP dos end devices monitorados.
    pub async fn list_end_device_addresses(&self) -> Result<Vec<String>> {
        self.client
            .request(Method::Get, "/get-enddevice-ip", &[], None, Access::Public)
            .await
    }

    /// Série de CPU/disco/memória de um end device.
    pub async fn end_device_series(&self, ip_address: &str) -> Result<Vec<TelemetryRecord>> {
        self.client
            .request(
                Method::Get,
                "/get-enddevice-data",
                &[("ip_address", ip_address)],
                None,
                Access::Public,
            )
            .await
    }
}
