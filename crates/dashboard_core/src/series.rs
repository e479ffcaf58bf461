//! Normalização de registros de telemetria em séries de gráfico.
//!
//! Os timestamps viram labels e cada métrica vira um dataset com cor fixa.
//! A ordem do backend é mantida, a não ser que `sort` seja pedido.

use crate::theme::{LINE_TENSION, Theme};
use crate::types::{ChartSeries, Dataset, TelemetryRecord};
use chrono::{DateTime, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Métrica plotável de um [`TelemetryRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Metric {
    Temperature,
    Humidity,
    CpuLoad,
    DiskUsage,
    MemoryUsage,
}

impl Metric {
    /// Legenda do dataset.
    pub fn label(&self) -> &'static str {
        match self {
            Metric::Temperature => "Temperature (°C)",
            Metric::Humidity => "Humidity (%)",
            Metric::CpuLoad => "CPU Load (%)",
            Metric::DiskUsage => "Disk Usage (%)",
            Metric::MemoryUsage => "Memory Usage (%)",
        }
    }

    pub fn value(&self, record: &TelemetryRecord) -> Option<f64> {
        match self {
            Metric::Temperature => record.temperature,
            Metric::Humidity => record.humidity,
            Metric::CpuLoad => record.cpu_load,
            Metric::DiskUsage => record.disk_usage,
            Metric::MemoryUsage => record.memory_usage,
        }
    }

    pub fn color<'a>(&self, theme: &'a Theme) -> &'a str {
        match self {
            Metric::Temperature => &theme.temperature,
            Metric::Humidity => &theme.humidity,
            Metric::CpuLoad => &theme.cpu,
            Metric::DiskUsage => &theme.disk,
            Metric::MemoryUsage => &theme.memory,
        }
    }
}

/// Monta uma série com um dataset por métrica.
///
/// Registro sem a métrica gera ponto `None`, mantendo
/// `data.len() == labels.len()` em todo dataset.
pub fn build_series(records: &[TelemetryRecord], metrics: &[Metric], theme: &Theme) -> ChartSeries {
    let labels = records.iter().map(|r| r.timestamp.clone()).collect();
    let datasets = metrics
        .iter()
        .map(|metric| Dataset {
            label: metric.label().to_string(),
            data: records.iter().map(|r| metric.value(r)).collect(),
            fill: false,
            border_color: metric.color(theme).to_string(),
            tension: LINE_TENSION,
        })
        .collect();

    ChartSeries { labels, datasets }
}

/// Converte um timestamp do backend em milissegundos UTC.
///
/// Aceita RFC 3339, RFC 2822 (formato do Flask), ISO sem fuso e epoch em
/// segundos.
pub fn parse_timestamp(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.timestamp_millis());
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.timestamp_millis());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(naive.and_utc().timestamp_millis());
        }
    }
    raw.parse::<f64>().ok().map(|secs| (secs * 1000.0) as i64)
}

/// Ordena por timestamp se pedido (sort estável).
///
/// Timestamps não reconhecidos vão para o fim, na ordem original.
pub fn order_records(mut records: Vec<TelemetryRecord>, sort: bool) -> Vec<TelemetryRecord> {
    if sort {
        records.sort_by_key(|r| match parse_timestamp(&r.timestamp) {
            Some(ms) => (0u8, ms),
            None => (1u8, 0),
        });
    }
    records
}

/// Gráficos da página de dispositivos IoT.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemperatureCharts {
    pub temperature: ChartSeries,
    pub humidity: ChartSeries,
}

impl TemperatureCharts {
    pub fn from_records(records: Vec<TelemetryRecord>, theme: &Theme, sort: bool) -> Self {
        let records = order_records(records, sort);
        Self {
            temperature: build_series(&records, &[Metric::Temperature], theme),
            humidity: build_series(&records, &[Metric::Humidity], theme),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.temperature.is_empty()
    }
}

/// Gráficos da página de end devices.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EndDeviceCharts {
    pub cpu: ChartSeries,
    pub disk: ChartSeries,
    pub memory: ChartSeries,
}

impl EndDeviceCharts {
    pub fn from_records(records: Vec<TelemetryRecord>, theme: &Theme, sort: bool) -> Self {
        let records = order_records(records, sort);
        Self {
            cpu: build_series(&records, &[Metric::CpuLoad], theme),
            disk: build_series(&records, &[Metric::DiskUsage], theme),
            memory: build_series(&records, &[Metric::MemoryUsage], theme),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cpu.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::dark_theme;

    fn record(ts: &str, temp: Option<f64>, hum: Option<f64>) -> TelemetryRecord {
        TelemetryRecord {
            timestamp: ts.into(),
            temperature: temp,
            humidity: hum,
            ..Default::default()
        }
    }

    #[test]
    fn lengths_match_for_any_input_size() {
        let theme = dark_theme();
        for n in [0usize, 1, 7, 250] {
            let records: Vec<_> = (0..n)
                .map(|i| TelemetryRecord {
                    timestamp: format!("t{i}"),
                    cpu_load: if i % 3 == 0 { None } else { Some(i as f64) },
                    disk_usage: Some(50.0),
                    memory_usage: Some(60.0),
                    ..Default::default()
                })
                .collect();
            let charts = EndDeviceCharts::from_records(records, &theme, false);
            for series in [&charts.cpu, &charts.disk, &charts.memory] {
                assert_eq!(series.labels.len(), n);
                for ds in &series.datasets {
                    assert_eq!(ds.data.len(), n);
                }
            }
        }
    }

    #[test]
    fn empty_records_give_no_data_not_error() {
        let charts = TemperatureCharts::from_records(Vec::new(), &dark_theme(), true);
        assert!(charts.is_empty());
        assert!(charts.humidity.labels.is_empty());
        assert_eq!(charts.temperature.datasets.len(), 1);
    }

    #[test]
    fn datasets_carry_fixed_style() {
        let charts = TemperatureCharts::from_records(
            vec![record("a", Some(20.0), Some(40.0))],
            &dark_theme(),
            false,
        );
        let ds = &charts.temperature.datasets[0];
        assert_eq!(ds.label, "Temperature (°C)");
        assert_eq!(ds.border_color, "rgba(75,192,192,1)");
        assert!(!ds.fill);
        assert_eq!(ds.tension, 0.1);
        assert_eq!(charts.humidity.datasets[0].border_color, "rgba(255,159,64,1)");
    }

    #[test]
    fn backend_order_preserved_by_default() {
        let records = vec![
            record("2024-03-01T10:05:00", Some(2.0), None),
            record("2024-03-01T10:00:00", Some(1.0), None),
        ];
        let series = build_series(&order_records(records, false), &[Metric::Temperature], &dark_theme());
        assert_eq!(series.labels, vec!["2024-03-01T10:05:00", "2024-03-01T10:00:00"]);
        assert_eq!(series.datasets[0].data, vec![Some(2.0), Some(1.0)]);
    }

    #[test]
    fn sort_orders_and_keeps_unparsed_at_end() {
        let records = vec![
            record("garbage", Some(9.0), None),
            record("Fri, 01 Mar 2024 10:05:00 GMT", Some(2.0), None),
            record("2024-03-01T10:00:00Z", Some(1.0), None),
        ];
        let sorted = order_records(records, true);
        let temps: Vec<_> = sorted.iter().map(|r| r.temperature).collect();
        assert_eq!(temps, vec![Some(1.0), Some(2.0), Some(9.0)]);
    }

    #[test]
    fn parses_common_timestamp_formats() {
        let iso = parse_timestamp("2024-03-01T10:00:00").unwrap();
        assert_eq!(parse_timestamp("2024-03-01 10:00:00.000"), Some(iso));
        assert_eq!(parse_timestamp("2024-03-01T10:00:00+00:00"), Some(iso));
        assert_eq!(parse_timestamp("Fri, 01 Mar 2024 10:00:00 GMT"), Some(iso));
        assert_eq!(parse_timestamp("1709287200"), Some(iso));
        assert_eq!(parse_timestamp("soon"), None);
    }
}
