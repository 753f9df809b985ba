//! Unencrypted block storage that [`EncBlockstore`](crate::EncBlockstore) can wrap.

mod fs;
mod memory;
mod sled;

pub use {fs::FsBlockstore, memory::MemoryBlockstore, sled::SledBlockstore};

use {anyhow::Result, encblock_protocol::Cid, std::sync::Arc};

/// Byte storage keyed by content identifier.
///
/// Implementations must store payloads as-is. They never compute or check identifiers.
pub trait Blockstore: Send + Sync {
    /// Stores `data` under `cid`, replacing any previous value.
    fn put(&self, cid: &Cid, data: &[u8]) -> Result<()>;

    /// Returns `None` if there is no block with this identifier.
    fn get(&self, cid: &Cid) -> Result<Option<Vec<u8>>>;

    fn has(&self, cid: &Cid) -> Result<bool>;

    /// Removes the block. Removing a missing block is not an error.
    fn delete(&self, cid: &Cid) -> Result<()>;

    /// Writes buffered changes to durable storage.
    #[inline]
    fn flush(&self) -> Result<()> {
        Ok(())
    }
}

macro_rules! forward_blockstore {
    ($($ty:ty),*) => {
        $(
            impl<S: Blockstore + ?Sized> Blockstore for $ty {
                #[inline]
                fn put(&self, cid: &Cid, data: &[u8]) -> Result<()> {
                    (**self).put(cid, data)
                }

                #[inline]
                fn get(&self, cid: &Cid) -> Result<Option<Vec<u8>>> {
                    (**self).get(cid)
                }

                #[inline]
                fn has(&self, cid: &Cid) -> Result<bool> {
                    (**self).has(cid)
                }

                #[inline]
                fn delete(&self, cid: &Cid) -> Result<()> {
                    (**self).delete(cid)
                }

                #[inline]
                fn flush(&self) -> Result<()> {
                    (**self).flush()
                }
            }
        )*
    };
}

forward_blockstore!(&S, Box<S>, Arc<S>);
