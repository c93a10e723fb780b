//! Question document service
//!
//! Loads question trees from documents on disk and saves them back.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::application::{ApplicationError, ApplicationResult, IoResultExt};
use crate::domain::{QuestionTree, TagMatching, TreeBuilder};
use crate::infrastructure::traits::FileSystem;

/// Service for reading and writing question documents.
pub struct DocumentService {
    fs: Arc<dyn FileSystem>,
    builder: TreeBuilder,
}

impl DocumentService {
    /// Create a new document service.
    pub fn new(fs: Arc<dyn FileSystem>, matching: TagMatching) -> Self {
        Self {
            fs,
            builder: TreeBuilder::with_matching(matching),
        }
    }

    pub fn exists(&self, path: &Path) -> bool {
        self.fs.is_file(path)
    }

    /// Read and parse a question document.
    #[instrument(level = "debug", skip(self))]
    pub fn load(&self, path: &Path) -> ApplicationResult<QuestionTree> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read question document", path)?;
        let tree = self.builder.parse_str(&content)?;
        debug!(
            "load: {} nodes from {}",
            tree.node_count(),
            path.display()
        );
        Ok(tree)
    }

    /// Load the document if it exists, otherwise start from a single object.
    #[instrument(level = "debug", skip(self))]
    pub fn load_or_seed(&self, path: &Path, seed: &str) -> ApplicationResult<QuestionTree> {
        if self.exists(path) {
            self.load(path)
        } else {
            info!(
                "no question document at {}, starting from '{}'",
                path.display(),
                seed
            );
            Ok(QuestionTree::from_object(seed))
        }
    }

    /// Write the tree to `path`, replacing any previous document atomically.
    ///
    /// Fails with `InvalidSink` when no destination is given or it is a directory.
    #[instrument(level = "debug", skip(self, tree))]
    pub fn save(&self, tree: &QuestionTree, path: Option<&Path>) -> ApplicationResult<()> {
        let path = path.ok_or_else(|| {
            ApplicationError::InvalidSink("no destination given".to_string())
        })?;
        if self.fs.is_dir(path) {
            return Err(ApplicationError::InvalidSink(format!(
                "{} is a directory",
                path.display()
            )));
        }

        self.fs
            .ensure_parent(path)
            .with_path_context("create directory for", path)?;
        self.fs
            .write_atomic(path, &tree.to_document())
            .with_path_context("write question document", path)?;
        info!("saved {} nodes to {}", tree.node_count(), path.display());
        Ok(())
    }
}
