//! Observability infrastructure for the connector
//!
//! Provides:
//! - Structured JSON logging to stdout with tracing
//! - An in-memory copy of the run log, uploaded next to the document
//! - Named events for the significant steps of a run

use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Shared byte buffer receiving a plain-text copy of every log line
#[derive(Clone, Default)]
pub struct LogBuffer {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl LogBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything logged so far
    pub fn contents(&self) -> Vec<u8> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

impl std::fmt::Debug for LogBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LogBuffer").finish_non_exhaustive()
    }
}

/// Writer handed out per log event
pub struct LogBufferWriter {
    inner: Arc<Mutex<Vec<u8>>>,
}

impl Write for LogBufferWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBufferWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogBufferWriter {
            inner: self.inner.clone(),
        }
    }
}

/// Install the global subscriber.
///
/// Stdout gets JSON at `info` (`debug` when verbose), overridable through
/// `RUST_LOG`. The buffer always records at `debug`.
pub fn init_tracing(verbose: bool, buffer: &LogBuffer) -> Result<(), TryInitError> {
    let default_level = if verbose { "debug" } else { "info" };
    let stdout_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(fmt::layer().json().with_filter(stdout_filter))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_writer(buffer.clone())
                .with_filter(LevelFilter::DEBUG),
        )
        .try_init()
}

/// Structured logger for connector events
///
/// Every event carries the cluster name so that logs from several
/// connector instances can be told apart.
#[derive(Clone)]
pub struct StructuredLogger {
    cluster_name: String,
}

impl StructuredLogger {
    pub fn new(cluster_name: impl Into<String>) -> Self {
        Self {
            cluster_name: cluster_name.into(),
        }
    }

    /// Log connector startup
    pub fn log_startup(&self, version: &str, connector_id: &str, workspace: &str) {
        info!(
            event = "run_started",
            cluster = %self.cluster_name,
            connector_version = %version,
            connector_id = %connector_id,
            workspace = %workspace,
            "Kubernetes connector started"
        );
    }

    /// Log the realized namespace blacklist
    pub fn log_blacklist(&self, namespaces: &[String]) {
        info!(
            event = "namespaces_blacklisted",
            cluster = %self.cluster_name,
            count = namespaces.len(),
            namespaces = ?namespaces,
            "Resolved namespace blacklist"
        );
    }

    pub fn log_cluster_summary(&self, nodes: usize, cpu_capacity: i64, memory_capacity_gb: f64) {
        info!(
            event = "cluster_aggregated",
            cluster = %self.cluster_name,
            nodes = nodes,
            cpu_capacity = cpu_capacity,
            memory_capacity_gb = memory_capacity_gb,
            "Aggregated node data"
        );
    }

    pub fn log_workloads(&self, kind: &str, total: usize, redundant: usize) {
        info!(
            event = "workloads_classified",
            cluster = %self.cluster_name,
            kind = %kind,
            total = total,
            redundant = redundant,
            "Classified workloads"
        );
    }

    /// Log the outcome of an upload
    pub fn log_upload(&self, target: &str, bytes: usize, success: bool) {
        if success {
            info!(
                event = "document_uploaded",
                cluster = %self.cluster_name,
                target = %target,
                bytes = bytes,
                "Uploaded output"
            );
        } else {
            warn!(
                event = "document_upload_failed",
                cluster = %self.cluster_name,
                target = %target,
                bytes = bytes,
                "Failed to upload output"
            );
        }
    }

    pub fn log_finished(&self, records: usize) {
        info!(
            event = "run_finished",
            cluster = %self.cluster_name,
            records = records,
            "Kubernetes connector finished"
        );
    }
}
