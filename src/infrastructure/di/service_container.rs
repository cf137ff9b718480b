//! Service container for dependency injection
//!
//! Wires the application services to their collaborators.

use std::sync::Arc;

use crate::application::services::{GraphDumper, TreeService};
use crate::config::Settings;
use crate::infrastructure::traits::{
    CommandRunner, DotRenderer, GraphRenderer, HtmlLogFile, LineLog, RealCommandRunner,
};

/// Container holding the application settings and I/O collaborators.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Command runner abstraction
    pub cmd: Arc<dyn CommandRunner>,

    /// Image renderer used by graph dumps
    pub renderer: Arc<dyn GraphRenderer>,

    /// Dump log receiving one line per rendered image
    pub log: Arc<dyn LineLog>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        let cmd: Arc<dyn CommandRunner> = Arc::new(RealCommandRunner);
        let renderer = Arc::new(DotRenderer::new(
            cmd.clone(),
            settings.graph.dot_command.clone(),
            settings.graph.format.clone(),
        ));
        let log = Arc::new(HtmlLogFile::new(settings.log_file.clone()));
        Self::with_deps(settings, cmd, renderer, log)
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        cmd: Arc<dyn CommandRunner>,
        renderer: Arc<dyn GraphRenderer>,
        log: Arc<dyn LineLog>,
    ) -> Self {
        Self {
            settings: Arc::new(settings),
            cmd,
            renderer,
            log,
        }
    }

    /// Fresh dumper; its image counter starts at zero.
    pub fn graph_dumper(&self) -> GraphDumper {
        GraphDumper::new(
            self.renderer.clone(),
            self.log.clone(),
            &self.settings.graph,
        )
    }

    pub fn tree_service(&self) -> TreeService {
        TreeService::new(self.settings.parse.clone())
    }
}
