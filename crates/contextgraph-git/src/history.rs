use crate::{errors::*, repo::short_revision};
use chrono::{TimeZone, Utc};
use contextgraph_core::CommitInfo;
use git2::{Commit, DiffOptions, Repository, Sort};

#[derive(Debug, Clone)]
pub struct HistoryOptions {
    /// Upper bound on commits inspected per lookup.
    pub max_commits: usize,
}

impl Default for HistoryOptions {
    fn default() -> Self {
        Self { max_commits: 10_000 }
    }
}

impl super::GitRepository {
    /// Newest commit on `HEAD` whose diff against its first parent touches
    /// `id`. `None` when the file was never committed or `HEAD` is unborn.
    pub fn last_commit_touching(&self, id: &str) -> Result<Option<CommitInfo>> {
        let path = self.repo_path(id);
        let max_commits = self.options().max_commits;

        self.with_repo(|repo| {
            if repo.head().is_err() {
                return Ok(None);
            }
            let mut revwalk = repo.revwalk()?;
            revwalk.set_sorting(Sort::TIME)?;
            revwalk.push_head()?;

            for (i, oid_res) in revwalk.enumerate() {
                if i >= max_commits {
                    break;
                }
                let oid = match oid_res {
                    Ok(oid) => oid,
                    Err(_) => continue,
                };
                let commit = match repo.find_commit(oid) {
                    Ok(c) => c,
                    Err(_) => continue,
                };
                if touches(repo, &commit, &path)? {
                    return Ok(Some(commit_info(&commit)));
                }
            }
            Ok(None)
        })
    }
}

fn touches(repo: &Repository, commit: &Commit<'_>, path: &str) -> Result<bool> {
    let tree = commit.tree()?;
    let parent_tree = match commit.parent(0) {
        Ok(parent) => Some(parent.tree()?),
        Err(_) => None,
    };
    let mut opts = DiffOptions::new();
    opts.pathspec(path).disable_pathspec_match(true);
    let diff = repo.diff_tree_to_tree(parent_tree.as_ref(), Some(&tree), Some(&mut opts))?;
    Ok(diff.deltas().len() > 0)
}

fn commit_info(commit: &Commit<'_>) -> CommitInfo {
    let author = commit.author();
    let timestamp = Utc
        .timestamp_opt(commit.time().seconds(), 0)
        .single()
        .unwrap_or_default();
    CommitInfo {
        revision: short_revision(&commit.id()),
        author: author.name().unwrap_or("unknown").to_string(),
        email: author.email().unwrap_or("").to_string(),
        timestamp,
        subject: commit.summary().unwrap_or("").to_string(),
    }
}
