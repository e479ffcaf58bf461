//! Hooks de busca: selecionam uma chave, disparam a requisição numa task e
//! entregam o resultado normalizado para a view.
//!
//! A view chama [`Hook::poll`] a cada frame (ou [`Hook::settle`] para
//! aguardar). Trocar a seleção aborta a task anterior; se a resposta antiga
//! ainda chegar, a geração desatualizada a descarta.

use crate::api::{DeviceApi, TelemetryApi};
use crate::error::{DashboardError, Result};
use crate::fetch::{FetchCell, FetchState, FetchTicket};
use crate::series::{EndDeviceCharts, TemperatureCharts};
use crate::theme::Theme;
use crate::types::{Device, SelectOption};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::{JoinError, JoinHandle};
use tracing::{debug, warn};

type BoxFuture<T> = Pin<Box<dyn Future<Output = Result<T>> + Send>>;
type Loader<K, T> = Arc<dyn Fn(K) -> BoxFuture<T> + Send + Sync>;

/// Resultado de uma task de busca, marcado com seu ticket.
struct Completion<T> {
    ticket: FetchTicket,
    result: Result<T>,
}

/// Hook genérico sobre uma função de carga assíncrona.
pub struct Hook<K, T> {
    name: &'static str,
    cell: FetchCell<K, T>,
    loader: Loader<K, T>,
    tx: UnboundedSender<Completion<T>>,
    rx: UnboundedReceiver<Completion<T>>,
    inflight: Option<(FetchTicket, JoinHandle<()>)>,
}

/// O que acordou um `settle`.
enum Wake<T> {
    Completed(Option<Completion<T>>),
    Exited(std::result::Result<(), JoinError>),
}

impl<K, T> Hook<K, T>
where
    K: Clone + PartialEq + Send + 'static,
    T: Send + 'static,
{
    pub fn new<F, Fut>(name: &'static str, loader: F) -> Self
    where
        F: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let loader: Loader<K, T> = Arc::new(move |key: K| -> BoxFuture<T> { Box::pin(loader(key)) });
        Self {
            name,
            cell: FetchCell::new(),
            loader,
            tx,
            rx,
            inflight: None,
        }
    }

    pub fn state(&self) -> &FetchState<T> {
        self.cell.state()
    }

    pub fn key(&self) -> Option<&K> {
        self.cell.key()
    }

    /// Seleciona uma chave; busca só se ela mudou. Requer runtime tokio.
    pub fn select(&mut self, key: K) {
        if let Some(ticket) = self.cell.select(key.clone()) {
            self.spawn(ticket, key);
        }
    }

    /// Busca novamente a chave atual (ex: após criar/remover um dispositivo).
    pub fn refresh(&mut self) {
        let Some(key) = self.cell.key().cloned() else {
            return;
        };
        if let Some(ticket) = self.cell.restart() {
            self.spawn(ticket, key);
        }
    }

    fn spawn(&mut self, ticket: FetchTicket, key: K) {
        if let Some((_, previous)) = self.inflight.take() {
            previous.abort();
        }
        debug!("[{}] busca geração {}", self.name, ticket.generation());

        let fut = (self.loader)(key);
        let tx = self.tx.clone();
        let handle = tokio::spawn(async move {
            let result = fut.await;
            let _ = tx.send(Completion { ticket, result });
        });
        self.inflight = Some((ticket, handle));
    }

    /// Drena resultados pendentes sem bloquear. Retorna `true` se o estado mudou.
    pub fn poll(&mut self) -> bool {
        let mut changed = self.drain();
        let finished = self
            .inflight
            .as_ref()
            .is_some_and(|(_, task)| task.is_finished());
        if finished {
            if let Some((ticket, _)) = self.inflight.take() {
                changed |= self.fail_if_pending(ticket, "tarefa encerrada sem resultado".into());
            }
        }
        changed
    }

    fn drain(&mut self) -> bool {
        let mut changed = false;
        while let Ok(done) = self.rx.try_recv() {
            changed |= self.cell.complete(done.ticket, done.result);
        }
        changed
    }

    /// Task terminou sem entregar resultado (panic ou cancelamento).
    fn fail_if_pending(&mut self, ticket: FetchTicket, reason: String) -> bool {
        // o resultado pode ter chegado logo antes do fim da task
        let drained = self.drain();
        if !self.cell.is_current(ticket) {
            return drained;
        }
        warn!("[{}] {reason}", self.name);
        self.cell
            .complete(ticket, Err(DashboardError::Interrupted(reason)))
    }

    /// Aguarda até a busca corrente terminar (ou retorna já, se não há busca).
    ///
    /// Se a task morrer sem resultado, o estado vira `Failed`.
    pub async fn settle(&mut self) -> &FetchState<T> {
        self.poll();
        while self.cell.state().is_loading() {
            let Some((ticket, task)) = self.inflight.as_mut() else {
                break;
            };
            let ticket = *ticket;
            let wake = tokio::select! {
                biased;
                done = self.rx.recv() => Wake::Completed(done),
                joined = task => Wake::Exited(joined),
            };
            match wake {
                Wake::Completed(Some(done)) => {
                    self.cell.complete(done.ticket, done.result);
                }
                Wake::Completed(None) => break,
                Wake::Exited(joined) => {
                    self.inflight = None;
                    let reason = match joined {
                        Err(e) if e.is_panic() => "tarefa de busca entrou em pânico".to_string(),
                        Err(e) => format!("tarefa de busca cancelada: {e}"),
                        Ok(()) => "tarefa encerrada sem resultado".to_string(),
                    };
                    self.fail_if_pending(ticket, reason);
                }
            }
        }
        self.cell.state()
    }
}

impl<K, T> Drop for Hook<K, T> {
    fn drop(&mut self) {
        if let Some((_, task)) = self.inflight.take() {
            task.abort();
        }
    }
}

// ──────────────────────────────────────────────
// Hooks concretos
// ──────────────────────────────────────────────

/// Gráficos de temperatura e umidade do dispositivo IoT selecionado.
pub fn temperature_hook(
    api: Arc<TelemetryApi>,
    theme: Theme,
    sort: bool,
) -> Hook<String, TemperatureCharts> {
    Hook::new("temperature", move |device_id: String| {
        let api = api.clone();
        let theme = theme.clone();
        async move {
            let records = api.temperature_series(&device_id).await?;
            Ok(TemperatureCharts::from_records(records, &theme, sort))
        }
    })
}

/// Gráficos de CPU, disco e memória do end device selecionado (por IP).
pub fn end_device_hook(
    api: Arc<TelemetryApi>,
    theme: Theme,
    sort: bool,
) -> Hook<String, EndDeviceCharts> {
    Hook::new("end_device", move |ip_address: String| {
        let api = api.clone();
        let theme = theme.clone();
        async move {
            let records = api.end_device_series(&ip_address).await?;
            Ok(EndDeviceCharts::from_records(records, &theme, sort))
        }
    })
}

/// Opções de seleção com os IDs dos dispositivos IoT. Carrega com `select(())`.
pub fn device_options_hook(api: Arc<TelemetryApi>) -> Hook<(), Vec<SelectOption>> {
    Hook::new("device_options", move |()| {
        let api = api.clone();
        async move {
            let ids = api.list_device_ids().await?;
            Ok(ids.into_iter().map(SelectOption::from_id).collect())
        }
    })
}

/// Opções de seleção com os IPs dos end devices. Carrega com `select(())`.
pub fn end_device_options_hook(api: Arc<TelemetryApi>) -> Hook<(), Vec<SelectOption>> {
    Hook::new("end_device_options", move |()| {
        let api = api.clone();
        async move {
            let ips = api.list_end_device_addresses().await?;
            Ok(ips.into_iter().map(SelectOption::from_id).collect())
        }
    })
}

/// Lista do registro de dispositivos. Carrega com `select(())`.
pub fn device_list_hook(api: DeviceApi) -> Hook<(), Vec<Device>> {
    let api = Arc::new(api);
    Hook::new("device_list", move |()| {
        let api = api.clone();
        async move { api.list().await }
    })
}
