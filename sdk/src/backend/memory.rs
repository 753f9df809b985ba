use {
    crate::backend::Blockstore,
    anyhow::Result,
    encblock_protocol::Cid,
    parking_lot::RwLock,
    std::collections::HashMap,
};

/// Keeps blocks in a hash map. Contents are lost when the value is dropped.
#[derive(Debug, Default)]
pub struct MemoryBlockstore {
    blocks: RwLock<HashMap<Cid, Vec<u8>>>,
}

impl MemoryBlockstore {
    #[must_use]
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    #[inline]
    pub fn len(&self) -> usize {
        self.blocks.read().len()
    }

    #[must_use]
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.blocks.read().is_empty()
    }
}

impl Blockstore for MemoryBlockstore {
    #[inline]
    fn put(&self, cid: &Cid, data: &[u8]) -> Result<()> {
        self.blocks.write().insert(*cid, data.to_vec());
        Ok(())
    }

    #[inline]
    fn get(&self, cid: &Cid) -> Result<Option<Vec<u8>>> {
        Ok(self.blocks.read().get(cid).cloned())
    }

    #[inline]
    fn has(&self, cid: &Cid) -> Result<bool> {
        Ok(self.blocks.read().contains_key(cid))
    }

    #[inline]
    fn delete(&self, cid: &Cid) -> Result<()> {
        self.blocks.write().remove(cid);
        Ok(())
    }
}
