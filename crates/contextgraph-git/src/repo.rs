use crate::{errors::*, history::HistoryOptions};
use contextgraph_core::{CommitInfo, VersionControl};
use git2::Repository;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Length of the abbreviated revision used as a snapshot version id.
pub const SHORT_REVISION_LEN: usize = 7;

/// A repository opened for an analyzed tree, which may be a subdirectory of
/// the work tree.
pub struct GitRepository {
    path: PathBuf,
    /// Tree root relative to the work tree, `/`-separated, empty at the top.
    prefix: String,
    options: HistoryOptions,
    // git2::Repository is Send but not Sync
    repo: Mutex<Repository>,
}

impl GitRepository {
    /// Discovers the repository containing `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        let repo = Repository::discover(path_ref)
            .map_err(|_| GitIntegrationError::RepoNotFound(path_ref.display().to_string()))?;
        let workdir = repo
            .workdir()
            .ok_or(GitIntegrationError::BareRepository)?
            .to_path_buf();
        let prefix = tree_prefix(&workdir, path_ref)?;
        debug!("Opened git repository at {:?} (prefix {:?})", workdir, prefix);

        Ok(Self {
            path: path_ref.to_path_buf(),
            prefix,
            options: HistoryOptions::default(),
            repo: Mutex::new(repo),
        })
    }

    pub fn with_options(mut self, options: HistoryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Work-tree path of a file id relative to the analyzed tree.
    pub fn repo_path(&self, id: &str) -> String {
        if self.prefix.is_empty() {
            id.to_string()
        } else {
            format!("{}/{}", self.prefix, id)
        }
    }

    pub(crate) fn options(&self) -> &HistoryOptions {
        &self.options
    }

    pub(crate) fn with_repo<T>(&self, f: impl FnOnce(&Repository) -> Result<T>) -> Result<T> {
        let repo = self.repo.lock();
        f(&repo)
    }

    /// Abbreviated id of the commit `HEAD` points at, `None` on an unborn branch.
    pub fn head_revision(&self) -> Result<Option<String>> {
        self.with_repo(|repo| {
            let head = match repo.head() {
                Ok(h) => h,
                Err(e)
                    if e.code() == git2::ErrorCode::UnbornBranch
                        || e.code() == git2::ErrorCode::NotFound =>
                {
                    return Ok(None);
                }
                Err(e) => return Err(e.into()),
            };
            let commit = head.peel_to_commit()?;
            Ok(Some(short_revision(&commit.id())))
        })
    }
}

pub fn short_revision(oid: &git2::Oid) -> String {
    oid.to_string().chars().take(SHORT_REVISION_LEN).collect()
}

fn tree_prefix(workdir: &Path, tree: &Path) -> Result<String> {
    let workdir = workdir.canonicalize()?;
    let tree = tree.canonicalize()?;
    let rel = tree.strip_prefix(&workdir).unwrap_or(Path::new(""));
    let mut parts = Vec::new();
    for component in rel.components() {
        parts.push(
            component
                .as_os_str()
                .to_str()
                .ok_or(GitIntegrationError::InvalidUtf8)?
                .to_string(),
        );
    }
    Ok(parts.join("/"))
}

impl VersionControl for GitRepository {
    fn last_commit_for(&self, path: &str) -> Option<CommitInfo> {
        match self.last_commit_touching(path) {
            Ok(found) => found,
            Err(e) => {
                debug!("No commit info for {}: {}", path, e);
                None
            }
        }
    }

    fn current_revision(&self) -> Option<String> {
        match self.head_revision() {
            Ok(rev) => rev,
            Err(e) => {
                debug!("No current revision: {}", e);
                None
            }
        }
    }
}
