//! Graph dump service
//!
//! Turns a tree into a DOT description, has it rendered to an image, and
//! records the image in the dump log.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;
use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::config::GraphSettings;
use crate::domain::{GraphDescription, GraphStyle, Tree};
use crate::infrastructure::traits::{GraphRenderer, LineLog};

/// Exports trees as rendered images.
///
/// Each dumper owns its image counter; the counter starts at zero and grows
/// by one per [`GraphDumper::dump`] call, failed calls included.
pub struct GraphDumper {
    renderer: Arc<dyn GraphRenderer>,
    log: Arc<dyn LineLog>,
    style: GraphStyle,
    image_dir: PathBuf,
    format: String,
    stamp: String,
    next_index: usize,
}

impl GraphDumper {
    /// Create a dumper stamped with the current local time.
    pub fn new(
        renderer: Arc<dyn GraphRenderer>,
        log: Arc<dyn LineLog>,
        settings: &GraphSettings,
    ) -> Self {
        Self {
            renderer,
            log,
            style: settings.style(),
            image_dir: settings.image_dir.clone(),
            format: settings.format.clone(),
            stamp: Local::now().format("%H-%M-%S").to_string(),
            next_index: 0,
        }
    }

    /// Replace the session stamp embedded in image names.
    pub fn with_stamp(mut self, stamp: impl Into<String>) -> Self {
        self.stamp = stamp.into();
        self
    }

    pub fn next_index(&self) -> usize {
        self.next_index
    }

    pub fn image_path(&self, index: usize) -> PathBuf {
        self.image_dir
            .join(format!("img_{}_time_{}.{}", index, self.stamp, self.format))
    }

    /// DOT text for `tree` in this dumper's style.
    pub fn describe(&self, tree: &Tree) -> String {
        GraphDescription::from_tree(tree).to_dot(&self.style)
    }

    /// Renders `tree` to the next image and appends an `<img>` line to the log.
    #[instrument(level = "debug", skip_all, fields(index = self.next_index))]
    pub fn dump(&mut self, tree: &Tree) -> ApplicationResult<PathBuf> {
        let description = GraphDescription::from_tree(tree);
        debug!(
            nodes = description.nodes.len(),
            edges = description.edges.len(),
            "graph described"
        );
        let dot = description.to_dot(&self.style);

        let image = self.image_path(self.next_index);
        self.next_index += 1;

        self.renderer
            .render(&dot, &image)
            .map_err(|source| ApplicationError::RenderFailed {
                image: image.clone(),
                source,
            })?;
        self.log
            .append_line(&img_line(&image))
            .with_path_context("append dump log entry", &image)?;

        info!(image = %image.display(), "graph dumped");
        Ok(image)
    }
}

fn img_line(image: &Path) -> String {
    format!("<img src = \"{}\">", image.display())
}
