use {
    crate::backend::Blockstore, anyhow::Result, encblock_protocol::Cid, std::path::Path,
    tracing::debug,
};

/// Stores blocks in a sled database.
pub struct SledBlockstore {
    db: sled::Db,
    blocks: sled::Tree,
}

impl SledBlockstore {
    #[inline]
    pub fn open(path: &Path) -> Result<Self> {
        let db = sled::open(path)?;
        Ok(Self {
            blocks: db.open_tree("blocks")?,
            db,
        })
    }
}

impl Blockstore for SledBlockstore {
    #[inline]
    fn put(&self, cid: &Cid, data: &[u8]) -> Result<()> {
        self.blocks.insert(cid.to_bytes(), data)?;
        Ok(())
    }

    #[inline]
    fn get(&self, cid: &Cid) -> Result<Option<Vec<u8>>> {
        Ok(self.blocks.get(cid.to_bytes())?.map(|value| value.to_vec()))
    }

    #[inline]
    fn has(&self, cid: &Cid) -> Result<bool> {
        Ok(self.blocks.contains_key(cid.to_bytes())?)
    }

    #[inline]
    fn delete(&self, cid: &Cid) -> Result<()> {
        self.blocks.remove(cid.to_bytes())?;
        Ok(())
    }

    #[inline]
    fn flush(&self) -> Result<()> {
        let bytes = self.db.flush()?;
        debug!(bytes, "flushed block database");
        Ok(())
    }
}
