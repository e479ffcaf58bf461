//! Sessão do usuário: token bearer + nome, persistidos em chaves fixas.
//!
//! [`SessionContext`] é injetado nos clientes de API em vez de ler estado
//! global. Escritas só acontecem em sign-in, sign-out e invalidação.

use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Token + usuário do sign-in. No arquivo, as chaves são `token` e `user`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    #[serde(rename = "user")]
    pub username: String,
}

/// Armazenamento local da sessão.
pub trait SessionStore: Send + Sync {
    fn load(&self) -> Result<Option<Session>>;
    fn save(&self, session: &Session) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// Sessão em arquivo TOML (`token = "..."`, `user = "..."`).
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    path: PathBuf,
}

impl FileSessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SessionStore for FileSessionStore {
    fn load(&self) -> Result<Option<Session>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path)?;
        let session = toml::from_str::<Session>(&content)
            .map_err(|e| DashboardError::Decode(format!("{}: {e}", self.path.display())))?;
        Ok(Some(session))
    }

    fn save(&self, session: &Session) -> Result<()> {
        let content =
            toml::to_string(session).map_err(|e| DashboardError::Io(e.to_string()))?;
        std::fs::write(&self.path, content)?;
        debug!("Sessão salva em {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Sessão só em memória (testes e execuções efêmeras).
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    slot: Mutex<Option<Session>>,
}

impl SessionStore for MemorySessionStore {
    fn load(&self) -> Result<Option<Session>> {
        Ok(self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }

    fn save(&self, session: &Session) -> Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Mudanças de sessão observáveis pela camada de views.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    SignedIn { username: String },
    SignedOut,
    /// Token rejeitado pelo servidor: a view deve ir para o sign-in.
    Expired { reason: String },
}

/// Contexto de sessão compartilhado pelos clientes de API.
pub struct SessionContext {
    store: Box<dyn SessionStore>,
    current: Mutex<Option<Session>>,
    events: broadcast::Sender<SessionEvent>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("signed_in", &self.is_signed_in())
            .finish()
    }
}

impl SessionContext {
    /// Cria o contexto e restaura a sessão persistida, se houver.
    pub fn new(store: impl SessionStore + 'static) -> Self {
        let current = match store.load() {
            Ok(session) => session,
            Err(e) => {
                warn!("Sessão salva ilegível, ignorando: {e}");
                None
            }
        };
        if let Some(ref s) = current {
            info!("Sessão restaurada para {}", s.username);
        }
        let (events, _) = broadcast::channel(16);
        Self {
            store: Box::new(store),
            current: Mutex::new(current),
            events,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(MemorySessionStore::default())
    }

    fn slot(&self) -> MutexGuard<'_, Option<Session>> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn current(&self) -> Option<Session> {
        self.slot().clone()
    }

    pub fn token(&self) -> Option<String> {
        self.slot().as_ref().map(|s| s.token.clone())
    }

    pub fn is_signed_in(&self) -> bool {
        self.slot().is_some()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Abre uma sessão após sign-in bem-sucedido.
    pub fn open(&self, session: Session) -> Result<()> {
        self.store.save(&session)?;
        let username = session.username.clone();
        *self.slot() = Some(session);
        info!("Sessão aberta para {username}");
        let _ = self.events.send(SessionEvent::SignedIn { username });
        Ok(())
    }

    /// Encerra a sessão local (logout explícito).
    pub fn close(&self) -> Result<()> {
        let previous = self.slot().take();
        self.store.clear()?;
        if previous.is_some() {
            info!("Sessão encerrada");
            let _ = self.events.send(SessionEvent::SignedOut);
        }
        Ok(())
    }

    /// Derruba a sessão cujo token foi rejeitado.
    ///
    /// Só a primeira rejeição de um mesmo token tem efeito; as demais (e as
    /// de tokens antigos após novo sign-in) retornam `false`.
    pub fn invalidate(&self, token: &str, reason: &str) -> bool {
        let mut slot = self.slot();
        if slot.as_ref().is_none_or(|s| s.token != token) {
            debug!("Invalidação ignorada: token já substituído ou removido");
            return false;
        }
        *slot = None;
        drop(slot);

        if let Err(e) = self.store.clear() {
            warn!("Falha ao apagar sessão persistida: {e}");
        }
        warn!("Sessão invalidada: {reason}");
        let _ = self.events.send(SessionEvent::Expired {
            reason: reason.to_string(),
        });
        true
    }
}

/// Resultado da checagem de acesso de uma view protegida.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow(Session),
    RedirectToSignIn,
}

/// Checagem síncrona de presença de sessão antes de renderizar.
pub struct AuthGate;

impl AuthGate {
    pub fn check(ctx: &SessionContext) -> GateDecision {
        match ctx.current() {
            Some(session) => GateDecision::Allow(session),
            None => GateDecision::RedirectToSignIn,
        }
    }

    /// Variante para o fluxo com `?`.
    pub fn require(ctx: &SessionContext) -> Result<Session> {
        match Self::check(ctx) {
            GateDecision::Allow(session) => Ok(session),
            GateDecision::RedirectToSignIn => {
                Err(DashboardError::Auth("nenhuma sessão ativa".into()))
            }
        }
    }
}
