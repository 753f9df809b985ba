//! Minimal content-addressing layer on top of a [`Blockstore`].
//!
//! A file is split into fixed-size chunks, each stored as a [`Codec::Raw`] block.
//! If there is more than one chunk, a [`FileManifest`] listing them is stored as a
//! [`Codec::Manifest`] block and its identifier becomes the identifier of the file.
//! Otherwise the identifier of the only chunk is used directly.
//!
//! Identifiers are always computed from plaintext, so this layer works the same way
//! on top of an [`EncBlockstore`](crate::EncBlockstore) and on top of a plain store.

use {
    crate::backend::Blockstore,
    anyhow::{Result, ensure},
    encblock_protocol::{Cid, Codec, encoding},
    serde::{Deserialize, Serialize},
    std::io::{self, Read, Write},
    tracing::debug,
};

pub const DEFAULT_CHUNK_SIZE: usize = 256 * 1024;

/// Root block of a file that spans multiple chunks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileManifest {
    /// Total size of the file content.
    pub size: u64,
    pub chunks: Vec<Cid>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ContentError {
    #[error("block not found: {0}")]
    MissingBlock(Cid),
    #[error("block content does not match its identifier: {0}")]
    BlockHashMismatch(Cid),
    #[error("manifest {0} refers to a non-raw block {1}")]
    UnexpectedCodec(Cid, Cid),
}

fn put_block<S: Blockstore + ?Sized>(store: &S, codec: Codec, data: &[u8]) -> Result<Cid> {
    let cid = Cid::for_block(codec, data);
    if !store.has(&cid)? {
        store.put(&cid, data)?;
    }
    Ok(cid)
}

/// Reads a block and checks that its content matches the identifier.
#[inline]
pub fn read_block<S: Blockstore + ?Sized>(store: &S, cid: &Cid) -> Result<Vec<u8>> {
    let data = store.get(cid)?.ok_or(ContentError::MissingBlock(*cid))?;
    if !cid.matches(&data) {
        return Err(ContentError::BlockHashMismatch(*cid).into());
    }
    Ok(data)
}

/// Fills `buf` unless the reader ends first. Returns the number of bytes read.
fn read_chunk(reader: &mut impl Read, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while let Some(rest) = buf.get_mut(filled..) {
        if rest.is_empty() {
            break;
        }
        match reader.read(rest) {
            Ok(0) => break,
            Ok(len) => filled += len,
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => return Err(err),
        }
    }
    Ok(filled)
}

/// Stores the content of `reader` and returns the identifier of the file.
#[inline]
pub fn add_reader<S: Blockstore + ?Sized>(
    store: &S,
    mut reader: impl Read,
    chunk_size: usize,
) -> Result<Cid> {
    ensure!(chunk_size > 0, "chunk size must be positive");
    let mut buf = vec![0u8; chunk_size];
    let mut chunks = Vec::new();
    let mut size = 0u64;
    loop {
        let len = read_chunk(&mut reader, &mut buf)?;
        if len == 0 && !chunks.is_empty() {
            break;
        }
        let chunk = buf.get(..len).unwrap_or_default();
        chunks.push(put_block(store, Codec::Raw, chunk)?);
        size += u64::try_from(len)?;
        if len < chunk_size {
            break;
        }
    }

    if let [single] = *chunks {
        debug!(cid = %single, size, "added single-block file");
        return Ok(single);
    }
    let count = chunks.len();
    let manifest = encoding::serialize(&FileManifest { size, chunks })?;
    let cid = put_block(store, Codec::Manifest, &manifest)?;
    debug!(%cid, size, chunks = count, "added file");
    Ok(cid)
}

#[inline]
pub fn add_bytes<S: Blockstore + ?Sized>(store: &S, data: &[u8], chunk_size: usize) -> Result<Cid> {
    add_reader(store, data, chunk_size)
}

/// Reads the manifest of a multi-chunk file.
#[inline]
pub fn read_manifest<S: Blockstore + ?Sized>(store: &S, cid: &Cid) -> Result<FileManifest> {
    encoding::deserialize(&read_block(store, cid)?)
}

/// Writes the content of the file to `output`. Returns the number of bytes written.
#[inline]
pub fn cat<S: Blockstore + ?Sized>(store: &S, cid: &Cid, mut output: impl Write) -> Result<u64> {
    match cid.codec() {
        Codec::Raw => {
            let data = read_block(store, cid)?;
            output.write_all(&data)?;
            Ok(u64::try_from(data.len())?)
        }
        Codec::Manifest => {
            let manifest = read_manifest(store, cid)?;
            let mut written = 0u64;
            for chunk in &manifest.chunks {
                if chunk.codec() != Codec::Raw {
                    return Err(ContentError::UnexpectedCodec(*cid, *chunk).into());
                }
                let data = read_block(store, chunk)?;
                output.write_all(&data)?;
                written += u64::try_from(data.len())?;
            }
            ensure!(
                written == manifest.size,
                "file size mismatch for {cid}: manifest says {}, got {written}",
                manifest.size,
            );
            Ok(written)
        }
    }
}

#[inline]
pub fn read_bytes<S: Blockstore + ?Sized>(store: &S, cid: &Cid) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    cat(store, cid, &mut output)?;
    Ok(output)
}
