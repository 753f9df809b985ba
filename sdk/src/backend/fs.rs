use {
    crate::backend::Blockstore,
    anyhow::{Context as _, Result, bail},
    encblock_protocol::Cid,
    fs_err::{create_dir_all, read, remove_file},
    std::{
        io::{self, Write},
        path::{Path, PathBuf},
    },
    tempfile::NamedTempFile,
    tracing::debug,
};

/// Stores every block in a separate file.
///
/// Files are spread over `<root>/xx/yy/` directories, where `xx` and `yy` are the first
/// two digest bytes of the identifier in hex. New blocks are written to `<root>/tmp`
/// first and renamed into place, so a reader never sees a partially written block.
#[derive(Debug)]
pub struct FsBlockstore {
    root: PathBuf,
    tmp: PathBuf,
}

fn block_paths(root: &Path, cid: &Cid) -> (PathBuf, PathBuf) {
    let [first, second, ..] = *cid.digest();
    let dir = root
        .join(hex::encode([first]))
        .join(hex::encode([second]));
    let file_path = dir.join(cid.to_string());
    (dir, file_path)
}

fn ignore_not_found<T>(result: io::Result<T>) -> io::Result<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

impl FsBlockstore {
    /// Opens a store in an existing directory.
    #[inline]
    pub fn new(root: PathBuf) -> Result<Self> {
        if !root.try_exists()? {
            bail!("storage root doesn't exist: {}", root.display());
        }

        let tmp = root.join("tmp");
        create_dir_all(&tmp)?;

        Ok(Self { root, tmp })
    }

    #[must_use]
    #[inline]
    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Blockstore for FsBlockstore {
    #[inline]
    fn put(&self, cid: &Cid, data: &[u8]) -> Result<()> {
        let (dir, path) = block_paths(&self.root, cid);
        let mut file = NamedTempFile::new_in(&self.tmp)?;
        file.write_all(data)?;
        file.flush()?;
        create_dir_all(dir)?;
        file.persist(&path)
            .map_err(|err| err.error)
            .with_context(|| format!("failed to move block into {}", path.display()))?;
        debug!(%cid, len = data.len(), "wrote block file");
        Ok(())
    }

    #[inline]
    fn get(&self, cid: &Cid) -> Result<Option<Vec<u8>>> {
        let (_, path) = block_paths(&self.root, cid);
        Ok(ignore_not_found(read(path))?)
    }

    #[inline]
    fn has(&self, cid: &Cid) -> Result<bool> {
        let (_, path) = block_paths(&self.root, cid);
        Ok(path.try_exists()?)
    }

    #[inline]
    fn delete(&self, cid: &Cid) -> Result<()> {
        let (_, path) = block_paths(&self.root, cid);
        ignore_not_found(remove_file(path))?;
        Ok(())
    }
}
