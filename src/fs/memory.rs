use super::{FileSystem, FsError, PathKind};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
enum Node {
    File(Vec<u8>),
    Dir,
    Special,
}

/// In-memory tree for tests.
///
/// Directory listings come back in insertion order rather than sorted, which
/// is what lets tests shuffle the order the engine sees.
#[derive(Debug, Clone, Default)]
pub(crate) struct MemoryFs {
    nodes: Vec<(PathBuf, Node)>,
}

impl MemoryFs {
    pub(crate) fn new() -> Self {
        let mut fs = MemoryFs::default();
        fs.nodes.push((PathBuf::from("/"), Node::Dir));
        fs
    }

    pub(crate) fn add_dir(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.insert(path.as_ref(), Node::Dir);
        self
    }

    pub(crate) fn add_file(&mut self, path: impl AsRef<Path>, content: impl AsRef<[u8]>) -> &mut Self {
        self.insert(path.as_ref(), Node::File(content.as_ref().to_vec()));
        self
    }

    /// A FIFO-like entry that is neither a file nor a directory.
    pub(crate) fn add_special(&mut self, path: impl AsRef<Path>) -> &mut Self {
        self.insert(path.as_ref(), Node::Special);
        self
    }

    fn insert(&mut self, path: &Path, node: Node) {
        if let Some(parent) = path.parent()
            && self.node(parent).is_none()
        {
            self.insert(parent, Node::Dir);
        }
        self.nodes.retain(|(p, _)| p != path);
        self.nodes.push((path.to_path_buf(), node));
    }

    fn node(&self, path: &Path) -> Option<&Node> {
        self.nodes
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, node)| node)
    }
}

impl FileSystem for MemoryFs {
    fn exists(&self, path: &Path) -> bool {
        self.node(path).is_some()
    }

    fn kind(&self, path: &Path) -> Result<PathKind, FsError> {
        match self.node(path) {
            Some(Node::File(_)) => Ok(PathKind::File),
            Some(Node::Dir) => Ok(PathKind::Directory),
            Some(Node::Special) => Ok(PathKind::Other),
            None => Err(FsError::NotFound(path.to_path_buf())),
        }
    }

    fn list_directory(&self, path: &Path) -> Result<Vec<String>, FsError> {
        match self.node(path) {
            Some(Node::Dir) => {}
            Some(_) => {
                return Err(FsError::Io {
                    path: path.to_path_buf(),
                    source: std::io::Error::other("not a directory"),
                });
            }
            None => return Err(FsError::NotFound(path.to_path_buf())),
        }

        Ok(self
            .nodes
            .iter()
            .filter(|(p, _)| p.parent() == Some(path))
            .filter_map(|(p, _)| p.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect())
    }

    fn read_file(&self, path: &Path) -> Result<Vec<u8>, FsError> {
        match self.node(path) {
            Some(Node::File(content)) => Ok(content.clone()),
            Some(_) => Err(FsError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::other("not a file"),
            }),
            None => Err(FsError::NotFound(path.to_path_buf())),
        }
    }

    fn read_to_string(&self, path: &Path) -> Result<String, FsError> {
        let bytes = self.read_file(path)?;
        String::from_utf8(bytes).map_err(|e| FsError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        })
    }

    fn canonicalize(&self, path: &Path) -> Result<PathBuf, FsError> {
        if self.exists(path) {
            Ok(path.to_path_buf())
        } else {
            Err(FsError::NotFound(path.to_path_buf()))
        }
    }
}
