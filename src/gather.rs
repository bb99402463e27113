//! One polling cycle over every configured source.

use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;

use printwatch_adapters::filament::PgFilamentStore;
use printwatch_adapters::octoprint::OctoPrintClient;
use printwatch_adapters::{AdapterError, FilamentStore, PrinterApi};
use printwatch_sdk::{Accumulator, Collector};
use printwatch_types::{ConnectionState, LayerProgress, MetricRecord, Tool};

use crate::settings::Settings;

/// Counts from one gather cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Records handed to the accumulator.
    pub emitted: usize,
    /// Source reads that failed and were skipped.
    pub failures: usize,
}

/// Orchestrates the printer API and the optional filament store.
///
/// A failing source is logged and its records are left out; the cycle
/// itself always completes.
pub struct Gatherer {
    printer: Box<dyn PrinterApi>,
    filament: Option<Box<dyn FilamentStore>>,
    layer_progress: bool,
}

impl Gatherer {
    pub fn new(printer: impl PrinterApi + 'static) -> Self {
        Self {
            printer: Box::new(printer),
            filament: None,
            layer_progress: true,
        }
    }

    /// Also read spool usage from a FilamentManager store.
    pub fn with_filament(mut self, store: impl FilamentStore + 'static) -> Self {
        self.filament = Some(Box::new(store));
        self
    }

    /// Toggle polling of the DisplayLayerProgress plugin.
    pub fn layer_progress(mut self, enabled: bool) -> Self {
        self.layer_progress = enabled;
        self
    }

    pub fn has_filament(&self) -> bool {
        self.filament.is_some()
    }

    /// Build the live sources described by `settings`.
    ///
    /// An unreachable filament database is fatal here, unlike failures
    /// during a cycle.
    pub async fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let client = OctoPrintClient::builder()
            .endpoint(&settings.octoprint.url)
            .api_key(&settings.octoprint.apikey)
            .timeout(settings.timeout)
            .build()
            .context("failed to build OctoPrint client")?;

        tracing::info!(endpoint = client.endpoint(), "using OctoPrint");

        let mut gatherer = Gatherer::new(client).layer_progress(settings.octoprint.layer_progress);

        if settings.filament_enabled() {
            let store = connect_filament(settings, settings.timeout).await?;
            gatherer = gatherer.with_filament(store);
        } else {
            tracing::info!("filament database not configured, spool metrics disabled");
        }

        Ok(gatherer)
    }

    /// Temperatures of every heating element, ordered by name.
    pub async fn tool_info(&self) -> Result<Vec<Tool>, AdapterError> {
        Ok(self.printer.full_state().await?.tools())
    }

    /// Raw connection state.
    pub async fn state(&self) -> Result<ConnectionState, AdapterError> {
        self.printer.connection_state().await
    }

    /// Parsed layer counters.
    pub async fn layers(&self) -> Result<LayerProgress, AdapterError> {
        self.printer.layer_progress().await?.parse()
    }

    /// Run one cycle, emitting into `acc`.
    pub async fn gather(&self, acc: &mut dyn Accumulator) -> CycleReport {
        let mut report = CycleReport::default();

        if self.layer_progress {
            let result = self.layers().await.map(|l| vec![l.to_record()]);
            report.absorb(acc, "layer_progress", result);
        }

        let result = self.state().await.map(|s| vec![s.to_record()]);
        report.absorb(acc, "connection", result);

        let result = self
            .tool_info()
            .await
            .map(|tools| tools.iter().map(Tool::to_record).collect());
        report.absorb(acc, "printer", result);

        if let Some(store) = &self.filament {
            let result = store.selected_spool().await.map(|s| vec![s.to_record()]);
            report.absorb(acc, "selected_spool", result);

            let result = store
                .profiles()
                .await
                .map(|profiles| profiles.iter().map(|p| p.to_record()).collect());
            report.absorb(acc, "profiles", result);
        }

        tracing::debug!(
            emitted = report.emitted,
            failures = report.failures,
            "gathered printer metrics"
        );
        report
    }
}

impl CycleReport {
    fn absorb(
        &mut self,
        acc: &mut dyn Accumulator,
        source: &'static str,
        result: Result<Vec<MetricRecord>, AdapterError>,
    ) {
        match result {
            Ok(records) => {
                self.emitted += records.len();
                for record in records {
                    acc.add_record(record);
                }
            }
            Err(e) => {
                self.failures += 1;
                tracing::warn!(source, kind = e.kind(), error = %e, "skipping source this cycle");
            }
        }
    }
}

#[async_trait]
impl Collector for Gatherer {
    async fn collect(&self, acc: &mut dyn Accumulator) {
        self.gather(acc).await;
    }
}

async fn connect_filament(
    settings: &Settings,
    timeout: Duration,
) -> anyhow::Result<PgFilamentStore> {
    let store = PgFilamentStore::connect(&settings.filament, timeout)
        .await
        .with_context(|| {
            format!(
                "failed to connect to filament database {:?} at {}",
                settings.filament.name, settings.filament.host
            )
        })?;
    tracing::info!(host = %settings.filament.host, "connected to filament database");
    Ok(store)
}
