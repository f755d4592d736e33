//! Shared application state for the handlers.

use std::sync::Arc;

use hostsvc_dynalloc::{Catalog, HostAllocator};
use hostsvc_encoding::HostCharset;
use hostsvc_intrdr::{InternalReader, JobQueue};
use tracing::info_span;

use crate::config::{ConfigError, ServiceConfig};
use crate::submit::{Backends, SubmissionOrchestrator, SubmitSettings};

/// State available to all handlers via `State<Arc<AppState>>`.
pub struct AppState {
    /// Server configuration.
    pub config: Arc<ServiceConfig>,
    /// Submission pipeline.
    pub orchestrator: Arc<SubmissionOrchestrator>,
}

/// The emulated host built from [`crate::config::HostConfig`].
pub struct HostBackends {
    /// Allocator and dataset reader over the catalog.
    pub allocator: Arc<HostAllocator>,
    /// Internal reader.
    pub reader: Arc<InternalReader>,
    /// Job input queue behind the reader.
    pub queue: Arc<JobQueue>,
}

impl HostBackends {
    /// Build the catalog, allocator and internal reader.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ConfigError> {
        let (_, code_page) = config.submit.code_page()?;
        let catalog = Catalog::with_definitions(&config.host.dataset_dir, &config.host.datasets)
            .map_err(|e| ConfigError::Invalid(format!("host.datasets: {e}")))?;
        catalog.set_available(config.host.catalog_available);

        let allocator = HostAllocator::new(
            Arc::new(catalog),
            code_page,
            info_span!("hostsvc", component = "allocator"),
        );
        for volume in &config.host.offline_volumes {
            allocator.set_volume_online(volume, false);
        }

        let queue = Arc::new(JobQueue::with_capacity(config.host.max_jobs));
        let reader = InternalReader::new(
            Arc::clone(&queue),
            code_page,
            config.submit.max_records,
            info_span!("hostsvc", component = "intrdr"),
        );
        Ok(Self {
            allocator: Arc::new(allocator),
            reader: Arc::new(reader),
            queue,
        })
    }

    /// Pipeline collaborators backed by this host.
    pub fn backends(&self) -> Backends {
        Backends {
            allocator: self.allocator.clone(),
            datasets: self.allocator.clone(),
            sink: self.reader.clone(),
            charset: Arc::new(HostCharset),
        }
    }
}

impl AppState {
    /// State backed by the emulated host described in `config`.
    pub fn new(config: ServiceConfig) -> Result<Self, ConfigError> {
        let host = HostBackends::from_config(&config)?;
        Self::with_backends(config, host.backends())
    }

    /// State running submissions against the given collaborators.
    pub fn with_backends(config: ServiceConfig, backends: Backends) -> Result<Self, ConfigError> {
        config.validate()?;
        let settings = SubmitSettings::from_config(&config.submit)?;
        let orchestrator = SubmissionOrchestrator::new(
            backends,
            settings,
            info_span!("hostsvc", component = "orchestrator"),
        );
        Ok(Self {
            config: Arc::new(config),
            orchestrator: Arc::new(orchestrator),
        })
    }
}
