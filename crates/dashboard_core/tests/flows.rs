//! Fluxos ponta a ponta contra um backend falso em memória.

use async_trait::async_trait;
use dashboard_core::api::Clients;
use dashboard_core::config::AppConfig;
use dashboard_core::error::{DashboardError, Result};
use dashboard_core::hooks::{device_list_hook, device_options_hook, end_device_hook, temperature_hook};
use dashboard_core::http::{HttpRequest, HttpResponse, HttpTransport, Method};
use dashboard_core::session::{SessionContext, SessionEvent};
use dashboard_core::theme::dark_theme;
use dashboard_core::types::{DeviceStatus, DeviceType, DeviceUpdate, NewDevice};
use dashboard_core::FetchState;
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

/// Backend falso: auth, registro de dispositivos e telemetria.
#[derive(Default)]
struct FakeBackend {
    log: Mutex<Vec<HttpRequest>>,
    devices: Mutex<Vec<Value>>,
    temperature: Mutex<Vec<Value>>,
    expired: bool,
}

impl FakeBackend {
    fn requests(&self) -> Vec<HttpRequest> {
        self.log.lock().unwrap().clone()
    }

    fn reply(status: u16, body: Value) -> Result<HttpResponse> {
        Ok(HttpResponse {
            status,
            body: body.to_string(),
        })
    }
}

#[async_trait]
impl HttpTransport for FakeBackend {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.log.lock().unwrap().push(request.clone());
        let url = reqwest::Url::parse(&request.url).unwrap();
        let path = url.path().to_string();

        let authorized = request.bearer.as_deref() == Some("jwt-alice");
        let needs_auth = path.starts_with("/devices") || path == "/profile" || path == "/logout";
        if needs_auth && (self.expired || !authorized) {
            return Self::reply(401, json!({"msg": "Token has expired"}));
        }

        match (request.method, path.as_str()) {
            (Method::Post, "/signin") => {
                let body = request.body.unwrap_or_default();
                if body["username"] == "alice" && body["password"] == "secret" {
                    Self::reply(200, json!({"message": "Login successful", "user": "alice", "token": "jwt-alice"}))
                } else {
                    Self::reply(401, json!({"message": "Invalid credentials"}))
                }
            }
            (Method::Get, "/devices") => {
                Self::reply(200, Value::Array(self.devices.lock().unwrap().clone()))
            }
            (Method::Post, "/devices") => {
                let mut device = request.body.unwrap_or_default();
                let mut devices = self.devices.lock().unwrap();
                if devices.iter().any(|d| d["device_id"] == device["device_id"]) {
                    return Self::reply(409, json!({"error": "Device ID already exists"}));
                }
                device["created_at"] = json!("2024-03-01T10:00:00");
                devices.push(device.clone());
                Self::reply(201, json!({"message": "Device registered successfully", "device": device}))
            }
            (method, p) if p.starts_with("/devices/") => {
                let id = &p["/devices/".len()..];
                let mut devices = self.devices.lock().unwrap();
                let Some(pos) = devices.iter().position(|d| d["device_id"] == id) else {
                    return Self::reply(404, json!({"error": "Device not found"}));
                };
                match method {
                    Method::Get => Self::reply(200, devices[pos].clone()),
                    Method::Put => {
                        if let Some(Value::Object(changes)) = request.body {
                            for (k, v) in changes {
                                devices[pos][k] = v;
                            }
                        }
                        Self::reply(200, json!({"message": "Device updated successfully", "device": devices[pos]}))
                    }
                    Method::Delete => {
                        devices.remove(pos);
                        Self::reply(200, json!({"message": "Device deleted successfully"}))
                    }
                    Method::Post => Self::reply(405, json!({"error": "method not allowed"})),
                }
            }
            (Method::Get, "/get-device-ids") => Self::reply(200, json!(["sensor-1", "sensor-2"])),
            (Method::Get, "/get-temperature-data") => {
                let device_id = url
                    .query_pairs()
                    .find(|(k, _)| k == "device_id")
                    .map(|(_, v)| v.to_string())
                    .unwrap_or_default();
                let data = if device_id == "sensor-1" {
                    self.temperature.lock().unwrap().clone()
                } else {
                    Vec::new()
                };
                Self::reply(200, Value::Array(data))
            }
            (Method::Get, "/get-enddevice-data") => Self::reply(200, json!([])),
            _ => Self::reply(404, json!({"error": "not found"})),
        }
    }
}

fn setup(backend: Arc<FakeBackend>) -> Clients {
    let mut config = AppConfig::default();
    config.http.max_attempts = 1;
    Clients::with_transport(&config, backend, Arc::new(SessionContext::in_memory()))
}

#[tokio::test]
async fn sign_in_then_list_sends_one_bearer_get() {
    let backend = Arc::new(FakeBackend::default());
    let clients = setup(backend.clone());

    clients.auth.sign_in("alice", "secret").await.unwrap();
    assert_eq!(clients.session.token().as_deref(), Some("jwt-alice"));

    let mut hook = device_list_hook(clients.devices.clone());
    hook.select(());
    let state = hook.settle().await;
    assert_eq!(state, &FetchState::Ready(Vec::new()));

    let gets: Vec<_> = backend
        .requests()
        .into_iter()
        .filter(|r| r.method == Method::Get && r.url == "http://localhost:5001/devices")
        .collect();
    assert_eq!(gets.len(), 1);
    assert_eq!(gets[0].bearer.as_deref(), Some("jwt-alice"));
}

#[tokio::test]
async fn create_get_roundtrip_and_delete() {
    let backend = Arc::new(FakeBackend::default());
    let clients = setup(backend);
    clients.auth.sign_in("alice", "secret").await.unwrap();

    let new_device = NewDevice {
        device_id: "meteo-paris".into(),
        device_type: Some(DeviceType::Api),
        status: DeviceStatus::Active,
        location_lat: Some(48.85),
        location_lon: Some(2.35),
        monitored_params: Some(json!(["temperature", "humidity"])),
    };
    let created = clients.devices.create(&new_device).await.unwrap();
    let fetched = clients.devices.get("meteo-paris").await.unwrap();

    assert_eq!(fetched.device_id, new_device.device_id);
    assert_eq!(Some(fetched.device_type), new_device.device_type);
    assert_eq!(fetched.status, new_device.status);
    assert_eq!(fetched.location(), Some((48.85, 2.35)));
    assert_eq!(fetched.monitored_params, new_device.monitored_params);
    assert_eq!(fetched, created);

    let updated = clients
        .devices
        .update(
            "meteo-paris",
            &DeviceUpdate {
                status: Some(DeviceStatus::Inactive),
                ..Default::default()
            },
            Some(DeviceType::Api),
        )
        .await
        .unwrap();
    assert_eq!(updated.status, DeviceStatus::Inactive);

    clients.devices.delete("meteo-paris").await.unwrap();
    let remaining = clients.devices.list().await.unwrap();
    assert!(remaining.iter().all(|d| d.device_id != "meteo-paris"));

    let err = clients.devices.delete("meteo-paris").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn failed_create_leaves_registry_intact() {
    let backend = Arc::new(FakeBackend::default());
    let clients = setup(backend);
    clients.auth.sign_in("alice", "secret").await.unwrap();

    let device = NewDevice {
        device_id: "s1".into(),
        device_type: Some(DeviceType::Iot),
        ..Default::default()
    };
    clients.devices.create(&device).await.unwrap();
    let err = clients.devices.create(&device).await.unwrap_err();
    assert_eq!(err.status(), Some(409));
    assert_eq!(clients.devices.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_rejections_redirect_once() {
    let backend = Arc::new(FakeBackend {
        expired: true,
        ..Default::default()
    });
    let clients = setup(backend);
    clients.auth.sign_in("alice", "secret").await.unwrap();
    let mut events = clients.session.subscribe();

    let (a, b, c) = tokio::join!(
        clients.devices.list(),
        clients.devices.get("x"),
        clients.auth.profile()
    );
    for result in [a.map(|_| ()), b.map(|_| ()), c.map(|_| ())] {
        assert!(matches!(result, Err(DashboardError::Auth(_))));
    }
    assert!(!clients.session.is_signed_in());

    let mut redirects = 0;
    while let Ok(event) = events.try_recv() {
        if matches!(event, SessionEvent::Expired { .. }) {
            redirects += 1;
        }
    }
    assert_eq!(redirects, 1);
}

#[tokio::test]
async fn temperature_hook_builds_equal_length_series() {
    let backend = Arc::new(FakeBackend::default());
    *backend.temperature.lock().unwrap() = vec![
        json!({"timestamp": "2024-03-01T10:00:00", "temperature": 21.0, "humidity": 40.0}),
        json!({"timestamp": "2024-03-01T10:05:00", "temperature": 21.4}),
        json!({"timestamp": "2024-03-01T10:10:00", "temperature": null, "humidity": 42.5}),
    ];
    let clients = setup(backend);

    let mut options = device_options_hook(clients.telemetry.clone());
    options.select(());
    let ids: Vec<String> = options
        .settle()
        .await
        .data()
        .unwrap()
        .iter()
        .map(|o| o.value.clone())
        .collect();
    assert_eq!(ids, vec!["sensor-1", "sensor-2"]);

    let mut hook = temperature_hook(clients.telemetry.clone(), dark_theme(), false);
    hook.select("sensor-1".into());
    let charts = hook.settle().await.data().cloned().unwrap();

    assert_eq!(charts.temperature.labels.len(), 3);
    assert_eq!(charts.temperature.datasets[0].data, vec![Some(21.0), Some(21.4), None]);
    assert_eq!(charts.humidity.datasets[0].data, vec![Some(40.0), None, Some(42.5)]);

    // dispositivo sem leituras: "sem dados", não erro
    hook.select("sensor-2".into());
    let state = hook.settle().await;
    assert!(state.error().is_none());
    assert!(state.data().unwrap().is_empty());
}

#[tokio::test]
async fn end_device_hook_handles_empty_response() {
    let clients = setup(Arc::new(FakeBackend::default()));
    let mut hook = end_device_hook(clients.telemetry.clone(), dark_theme(), true);
    hook.select("10.0.0.9".into());
    let state = hook.settle().await;
    assert_eq!(state.name(), "ready");
    assert!(state.data().unwrap().is_empty());
}
