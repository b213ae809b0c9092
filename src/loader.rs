//! Sources of tree data for the front-end.
//!
//! [`FsLoader`] lists directories on a worker thread so a slow disk never
//! blocks the UI; results are polled once per frame with
//! [`FsLoader::try_recv`]. [`synthetic_tree`] builds large in-memory trees for
//! demos and benchmarks.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};

use thiserror::Error;

use crate::engine::VirtualTree;
use crate::tree::{NodeId, TreeNode};

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("{0} is not a directory")]
    NotADirectory(PathBuf),
    #[error("loader worker is gone")]
    Disconnected,
}

impl LoadError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        LoadError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// List `dir` one level deep: directories first, then files, each sorted by
/// name. Subdirectories come back lazy and childless. Symlinks are listed as
/// plain entries and never followed.
pub fn read_dir_children(dir: &Path) -> Result<Vec<TreeNode>, LoadError> {
    let mut dirs = Vec::new();
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(|err| LoadError::io(dir, err))? {
        let entry = entry.map_err(|err| LoadError::io(dir, err))?;
        let name = entry.file_name().to_string_lossy().into_owned();
        let is_dir = entry
            .file_type()
            .map_err(|err| LoadError::io(&entry.path(), err))?
            .is_dir();
        if is_dir {
            dirs.push(name);
        } else {
            files.push(name);
        }
    }
    dirs.sort();
    files.sort();
    Ok(dirs
        .into_iter()
        .map(|name| TreeNode::new(name).lazy())
        .chain(files.into_iter().map(TreeNode::leaf))
        .collect())
}

/// Walk all of `dir` up front. Directories come back collapsed.
pub fn read_dir_recursive(dir: &Path) -> Result<Vec<TreeNode>, LoadError> {
    let mut children = read_dir_children(dir)?;
    for child in &mut children {
        if child.lazy {
            child.lazy = false;
            child.children = read_dir_recursive(&dir.join(&child.label))?;
        }
    }
    Ok(children)
}

/// Root node for `path`, open and populated one level deep (or fully, when
/// `lazy` is false).
pub fn fs_root(path: &Path, lazy: bool) -> Result<TreeNode, LoadError> {
    if !path.is_dir() {
        return Err(LoadError::NotADirectory(path.to_path_buf()));
    }
    let children = if lazy {
        read_dir_children(path)?
    } else {
        read_dir_recursive(path)?
    };
    let mut root = TreeNode::with_children(path.display().to_string(), children).expanded();
    root.lazy = lazy;
    Ok(root)
}

/// Filesystem path of `id`, rebuilt from the labels of its ancestors below
/// the root.
pub fn path_of(tree: &VirtualTree, base: &Path, id: NodeId) -> Option<PathBuf> {
    let mut parts = Vec::new();
    let mut current = tree.node(id)?;
    while let Some(parent) = current.parent {
        parts.push(current.label()?);
        current = tree.node(parent)?;
    }
    let mut path = base.to_path_buf();
    path.extend(parts.iter().rev());
    Some(path)
}

/// A breadth-first tree of `nodes` nodes (root included) where every inner
/// node has up to `fanout` children. Only the root starts open.
pub fn synthetic_tree(nodes: usize, fanout: usize) -> TreeNode {
    let nodes = nodes.max(1);
    let fanout = fanout.max(1);
    let mut pending: Vec<Vec<TreeNode>> = (0..nodes).map(|_| Vec::new()).collect();
    for i in (1..nodes).rev() {
        let mut children = std::mem::take(&mut pending[i]);
        children.reverse();
        pending[(i - 1) / fanout].push(TreeNode::with_children(format!("node-{i}"), children));
    }
    let mut top = std::mem::take(&mut pending[0]);
    top.reverse();
    TreeNode::with_children("root", top).expanded()
}

#[derive(Debug)]
struct LoadRequest {
    node: NodeId,
    path: PathBuf,
}

/// A finished directory listing for `node`.
#[derive(Debug)]
pub struct LoadResult {
    pub node: NodeId,
    pub path: PathBuf,
    pub children: Result<Vec<TreeNode>, LoadError>,
}

/// Directory lister running on its own thread.
pub struct FsLoader {
    requests: Option<Sender<LoadRequest>>,
    results: Receiver<LoadResult>,
    worker: Option<JoinHandle<()>>,
}

impl FsLoader {
    pub fn spawn() -> Self {
        let (request_tx, request_rx) = mpsc::channel::<LoadRequest>();
        let (result_tx, result_rx) = mpsc::channel();
        let worker = thread::spawn(move || {
            for request in request_rx {
                let children = read_dir_children(&request.path);
                let result = LoadResult {
                    node: request.node,
                    path: request.path,
                    children,
                };
                if result_tx.send(result).is_err() {
                    break;
                }
            }
        });
        Self {
            requests: Some(request_tx),
            results: result_rx,
            worker: Some(worker),
        }
    }

    /// Queue a listing of `path` on behalf of `node`.
    pub fn request(&self, node: NodeId, path: PathBuf) -> Result<(), LoadError> {
        tracing::debug!(node = %node, path = %path.display(), "load requested");
        self.requests
            .as_ref()
            .ok_or(LoadError::Disconnected)?
            .send(LoadRequest { node, path })
            .map_err(|_| LoadError::Disconnected)
    }

    /// Next finished listing, if one is ready.
    pub fn try_recv(&self) -> Option<LoadResult> {
        match self.results.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                tracing::warn!("loader worker exited");
                None
            }
        }
    }

    /// Block until the next listing arrives. Used by tests and the benchmark.
    pub fn recv(&self) -> Result<LoadResult, LoadError> {
        self.results.recv().map_err(|_| LoadError::Disconnected)
    }
}

impl Drop for FsLoader {
    fn drop(&mut self) {
        self.requests.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
