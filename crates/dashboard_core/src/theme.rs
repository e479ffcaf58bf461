//! Temas de cores dos gráficos e da lista de dispositivos.
//!
//! Cada métrica tem uma cor fixa de linha; o status do dispositivo vira um
//! "tom" (success, error, warning, default) para a exibição.

use crate::types::DeviceStatus;
use serde::{Deserialize, Serialize};

/// Suavização das linhas dos gráficos.
pub const LINE_TENSION: f32 = 0.1;

/// Paleta de um tema: cor de linha por métrica.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub temperature: String,
    pub humidity: String,
    pub cpu: String,
    pub disk: String,
    pub memory: String,
}

/// Tom de destaque para o status de um dispositivo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusTone {
    Success,
    Error,
    Warning,
    Default,
}

impl StatusTone {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusTone::Success => "success",
            StatusTone::Error => "error",
            StatusTone::Warning => "warning",
            StatusTone::Default => "default",
        }
    }
}

/// Tom usado para exibir um status.
pub fn status_tone(status: DeviceStatus) -> StatusTone {
    match status {
        DeviceStatus::Active => StatusTone::Success,
        DeviceStatus::Inactive => StatusTone::Error,
        DeviceStatus::Maintenance => StatusTone::Warning,
        DeviceStatus::Offline | DeviceStatus::Unknown => StatusTone::Default,
    }
}

/// Converte "rgba(r,g,b,a)" ou "#RRGGBB" para tupla (r, g, b).
pub fn color_to_rgb(color: &str) -> (u8, u8, u8) {
    let color = color.trim();
    if let Some(inner) = color
        .strip_prefix("rgba(")
        .or_else(|| color.strip_prefix("rgb("))
        .and_then(|s| s.strip_suffix(')'))
    {
        let mut parts = inner.split(',').map(|p| p.trim().parse::<u8>().unwrap_or(255));
        let r = parts.next().unwrap_or(255);
        let g = parts.next().unwrap_or(255);
        let b = parts.next().unwrap_or(255);
        return (r, g, b);
    }

    let hex = color.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return (255, 255, 255); // fallback branco
    }
    let r = u8::from_str_radix(&hex[0..2], 16).unwrap_or(255);
    let g = u8::from_str_radix(&hex[2..4], 16).unwrap_or(255);
    let b = u8::from_str_radix(&hex[4..6], 16).unwrap_or(255);
    (r, g, b)
}

/// Tema Escuro (padrão), com as cores originais dos gráficos.
pub fn dark_theme() -> Theme {
    Theme {
        name: "dark".into(),
        temperature: "rgba(75,192,192,1)".into(),
        humidity: "rgba(255,159,64,1)".into(),
        cpu: "rgba(75,192,192,1)".into(),
        disk: "rgba(255,159,64,1)".into(),
        memory: "rgba(153,102,255,1)".into(),
    }
}

/// Tema Claro.
pub fn light_theme() -> Theme {
    Theme {
        name: "light".into(),
        temperature: "rgba(0,128,128,1)".into(),
        humidity: "rgba(204,119,0,1)".into(),
        cpu: "rgba(0,128,128,1)".into(),
        disk: "rgba(204,119,0,1)".into(),
        memory: "rgba(119,68,170,1)".into(),
    }
}

/// Tema High Contrast (acessibilidade).
pub fn high_contrast_theme() -> Theme {
    Theme {
        name: "high_contrast".into(),
        temperature: "rgba(0,255,255,1)".into(),
        humidity: "rgba(255,255,0,1)".into(),
        cpu: "rgba(0,255,0,1)".into(),
        disk: "rgba(255,102,0,1)".into(),
        memory: "rgba(255,0,255,1)".into(),
    }
}

/// Retorna tema pelo nome.
pub fn get_theme(name: &str) -> Theme {
    match name.to_lowercase().as_str() {
        "light" => light_theme(),
        "high_contrast" => high_contrast_theme(),
        _ => dark_theme(),
    }
}

/// Nomes de temas disponíveis.
pub fn theme_names() -> Vec<&'static str> {
    vec!["dark", "light", "high_contrast"]
}
