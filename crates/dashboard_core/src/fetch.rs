//! Estado de uma busca: `Idle → Loading → {Ready, Failed}`.
//!
//! Cada nova seleção incrementa a geração; só o resultado da geração mais
//! recente é aplicado. Respostas atrasadas de seleções antigas são descartadas.

use crate::error::DashboardError;
use tracing::debug;

/// Estado visível por uma view. Exatamente uma variante ativa por vez.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    /// Nenhuma chave selecionada ainda.
    Idle,
    /// Requisição em andamento; `previous` é o último dado válido.
    Loading { previous: Option<T> },
    Ready(T),
    /// Falha exibível; mantém o último dado válido.
    Failed { message: String, previous: Option<T> },
}

impl<T> FetchState<T> {
    /// Dado disponível para renderizar (atual ou anterior).
    pub fn data(&self) -> Option<&T> {
        match self {
            FetchState::Idle => None,
            FetchState::Loading { previous } => previous.as_ref(),
            FetchState::Ready(data) => Some(data),
            FetchState::Failed { previous, .. } => previous.as_ref(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading { .. })
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Failed { message, .. } => Some(message),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FetchState::Idle => "idle",
            FetchState::Loading { .. } => "loading",
            FetchState::Ready(_) => "ready",
            FetchState::Failed { .. } => "failed",
        }
    }

    fn into_data(self) -> Option<T> {
        match self {
            FetchState::Idle => None,
            FetchState::Loading { previous } => previous,
            FetchState::Ready(data) => Some(data),
            FetchState::Failed { previous, .. } => previous,
        }
    }
}

/// Identifica uma requisição emitida por um [`FetchCell`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    generation: u64,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// Chave selecionada + geração + estado.
#[derive(Debug)]
pub struct FetchCell<K, T> {
    key: Option<K>,
    generation: u64,
    state: FetchState<T>,
}

impl<K, T> Default for FetchCell<K, T> {
    fn default() -> Self {
        Self {
            key: None,
            generation: 0,
            state: FetchState::Idle,
        }
    }
}

impl<K: PartialEq, T> FetchCell<K, T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    pub fn state(&self) -> &FetchState<T> {
        &self.state
    }

    /// Seleciona uma chave. Retorna um ticket se uma busca deve começar;
    /// `None` se a chave não mudou.
    pub fn select(&mut self, key: K) -> Option<FetchTicket> {
        if self.key.as_ref() == Some(&key) {
            return None;
        }
        self.key = Some(key);
        Some(self.begin())
    }

    /// Refaz a busca da chave atual. `None` se ainda não há chave.
    pub fn restart(&mut self) -> Option<FetchTicket> {
        self.key.as_ref()?;
        Some(self.begin())
    }

    fn begin(&mut self) -> FetchTicket {
        self.generation += 1;
        let previous = std::mem::replace(&mut self.state, FetchState::Idle).into_data();
        self.state = FetchState::Loading { previous };
        FetchTicket {
            generation: self.generation,
        }
    }

    pub fn is_current(&self, ticket: FetchTicket) -> bool {
        ticket.generation == self.generation && self.state.is_loading()
    }

    /// Aplica o resultado se o ticket for o mais recente.
    ///
    /// Retorna `false` (e não altera nada) para tickets superados.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<T, DashboardError>,
    ) -> bool {
        if !self.is_current(ticket) {
            debug!(
                "Descartando resposta da geração {} (atual: {})",
                ticket.generation, self.generation
            );
            return false;
        }

        let previous = std::mem::replace(&mut self.state, FetchState::Idle).into_data();
        self.state = match result {
            Ok(data) => FetchState::Ready(data),
            Err(e) => FetchState::Failed {
                message: e.to_string(),
                previous,
            },
        };
        true
    }
}
