//! Saída em texto: tabelas de dispositivos e de séries.
//!
//! Cores ANSI true-color vêm do tema (cor do dataset) e do tom de status.

use dashboard_core::theme::{StatusTone, color_to_rgb, status_tone};
use dashboard_core::types::{ChartSeries, Device, SelectOption};
use std::fmt::Write;

pub const NO_DATA: &str = "sem dados";

/// Pinta o texto com uma cor "rgba(...)" / "#RRGGBB".
pub fn paint(text: &str, color: &str) -> String {
    let (r, g, b) = color_to_rgb(color);
    format!("\x1b[38;2;{r};{g};{b}m{text}\x1b[0m")
}

fn tone_color(tone: StatusTone) -> Option<&'static str> {
    match tone {
        StatusTone::Success => Some("#2ECC71"),
        StatusTone::Error => Some("#E74C3C"),
        StatusTone::Warning => Some("#F1C40F"),
        StatusTone::Default => None,
    }
}

fn status_cell(device: &Device, width: usize) -> String {
    let text = format!("{:<width$}", device.status.as_str());
    match tone_color(status_tone(device.status)) {
        Some(color) => paint(&text, color),
        None => text,
    }
}

pub fn devices_table(devices: &[Device]) -> String {
    if devices.is_empty() {
        return "nenhum dispositivo registrado\n".into();
    }

    let id_w = devices
        .iter()
        .map(|d| d.device_id.chars().count())
        .max()
        .unwrap_or(0)
        .max("DEVICE ID".len());

    let mut out = String::new();
    let _ = writeln!(out, "{:<id_w$}  {:<10}  {:<12}  LOCALIZAÇÃO", "DEVICE ID", "TIPO", "STATUS");
    for device in devices {
        let location = device
            .location()
            .map(|(lat, lon)| format!("{lat:.4}, {lon:.4}"))
            .unwrap_or_else(|| "-".into());
        let _ = writeln!(
            out,
            "{:<id_w$}  {:<10}  {}  {}",
            device.device_id,
            device.device_type.as_str(),
            status_cell(device, 12),
            location
        );
    }
    out
}

pub fn device_detail(device: &Device) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Device ID:   {}", device.device_id);
    let _ = writeln!(out, "Tipo:        {}", device.device_type);
    let _ = writeln!(out, "Status:      {}", status_cell(device, 0));
    if let Some((lat, lon)) = device.location() {
        let _ = writeln!(out, "Localização: {lat}, {lon}");
    }
    if let Some(params) = &device.monitored_params {
        let _ = writeln!(out, "Parâmetros:  {params}");
    }
    if let Some(created) = &device.created_at {
        let _ = writeln!(out, "Criado em:   {created}");
    }
    if let Some(updated) = &device.updated_at {
        let _ = writeln!(out, "Atualizado:  {updated}");
    }
    match &device.latest_data {
        Some(latest) => {
            let pretty = serde_json::to_string_pretty(latest).unwrap_or_else(|_| latest.to_string());
            let _ = writeln!(out, "Última leitura:\n{pretty}");
        }
        None => {
            let _ = writeln!(out, "Última leitura: {NO_DATA}");
        }
    }
    out
}

pub fn options_list(options: &[SelectOption]) -> String {
    if options.is_empty() {
        return format!("{NO_DATA}\n");
    }
    options.iter().fold(String::new(), |mut out, opt| {
        let _ = writeln!(out, "{}", opt.label);
        out
    })
}

/// Tabela timestamp × datasets. Pontos ausentes aparecem como "-".
pub fn series_table(title: &str, series: &ChartSeries) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "── {title} ──");
    if series.is_empty() {
        let _ = writeln!(out, "{NO_DATA}");
        return out;
    }

    let ts_w = series
        .labels
        .iter()
        .map(|l| l.chars().count())
        .max()
        .unwrap_or(0)
        .max("TIMESTAMP".len());

    let _ = write!(out, "{:<ts_w$}", "TIMESTAMP");
    for ds in &series.datasets {
        let _ = write!(out, "  {}", paint(&ds.label, &ds.border_color));
    }
    out.push('\n');

    for (i, label) in series.labels.iter().enumerate() {
        let _ = write!(out, "{label:<ts_w$}");
        for ds in &series.datasets {
            let width = ds.label.chars().count();
            let cell = match ds.data.get(i).copied().flatten() {
                Some(v) => format!("{v:.2}"),
                None => "-".into(),
            };
            let _ = write!(out, "  {cell:>width$}");
        }
        out.push('\n');
    }
    out
}
