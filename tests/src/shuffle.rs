use {
    anyhow::{Result, bail, ensure},
    encblock_protocol::{Cid, Codec},
    encblock_sdk::{EncBlockstore, Error, backend::FsBlockstore, content},
    fs_err::read_dir,
    rand::{
        Rng,
        distr::{Alphanumeric, Distribution, SampleString, weighted::WeightedIndex},
        seq::{IndexedMutRandom, IndexedRandom},
    },
    std::{
        collections::HashMap,
        path::{Path, PathBuf},
    },
    tracing::debug,
};

pub type Store = EncBlockstore<FsBlockstore>;

/// Blocks that one worker expects to find in the store.
#[derive(Debug, Default)]
pub struct Model {
    blocks: HashMap<Cid, Vec<u8>>,
    files: HashMap<Cid, Vec<u8>>,
}

impl Model {
    pub fn blocks(&self) -> impl Iterator<Item = (&Cid, &Vec<u8>)> {
        self.blocks.iter()
    }

    pub fn files(&self) -> impl Iterator<Item = (&Cid, &Vec<u8>)> {
        self.files.iter()
    }

    fn random_block(&self, rng: &mut impl Rng) -> Option<Cid> {
        let cids: Vec<_> = self.blocks.keys().copied().collect();
        cids.choose(rng).copied()
    }
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Put,
    PutAgain,
    Get,
    GetMissing,
    Has,
    Delete,
    AddFile,
    ReadFile,
}

const OPS: [(Op, u32); 8] = [
    (Op::Put, 30),
    (Op::PutAgain, 5),
    (Op::Get, 25),
    (Op::GetMissing, 5),
    (Op::Has, 10),
    (Op::Delete, 10),
    (Op::AddFile, 3),
    (Op::ReadFile, 5),
];

/// Generates content that no other worker can produce. Blocks and files get different
/// prefixes so that deleting a block never removes a chunk of a file.
pub fn random_content(rng: &mut impl Rng, prefix: &str, max_len: usize) -> Vec<u8> {
    let len = rng.random_range(0..=max_len);
    let mut content = format!("{prefix}:").into_bytes();
    content.extend(Alphanumeric.sample_string(rng, len).into_bytes());
    content
}

/// Runs one random operation against `store` and checks the result against `model`.
pub fn step(store: &Store, model: &mut Model, rng: &mut impl Rng, worker: usize) -> Result<()> {
    let weights = WeightedIndex::new(OPS.iter().map(|(_, weight)| *weight))?;
    let Some((op, _)) = OPS.get(weights.sample(rng)) else {
        bail!("weighted index out of range");
    };
    match op {
        Op::Put => {
            let data = random_content(rng, &worker.to_string(), 2000);
            let cid = Cid::for_block(Codec::Raw, &data);
            store.put(&cid, &data)?;
            debug!(worker, %cid, "put");
            model.blocks.insert(cid, data);
        }
        Op::PutAgain => {
            if let Some(cid) = model.random_block(rng)
                && let Some(data) = model.blocks.get(&cid)
            {
                store.put(&cid, data)?;
                debug!(worker, %cid, "put again");
            }
        }
        Op::Get => {
            if let Some(cid) = model.random_block(rng)
                && let Some(expected) = model.blocks.get(&cid)
            {
                let data = store.get(&cid)?;
                ensure!(&data == expected, "content mismatch for {cid}");
            }
        }
        Op::GetMissing => {
            let data = random_content(rng, &worker.to_string(), 100);
            let cid = Cid::for_block(Codec::Raw, &data);
            if !model.blocks.contains_key(&cid) {
                ensure!(!store.has(&cid)?, "unexpected block {cid}");
                match store.get(&cid) {
                    Err(Error::NotFound(missing)) if missing == cid => {}
                    other => bail!("expected NotFound for {cid}, got {other:?}"),
                }
            }
        }
        Op::Has => {
            if let Some(cid) = model.random_block(rng) {
                ensure!(store.has(&cid)?, "block {cid} is missing");
            }
        }
        Op::Delete => {
            if let Some(cid) = model.random_block(rng) {
                store.delete(&cid)?;
                model.blocks.remove(&cid);
                ensure!(!store.has(&cid)?, "block {cid} survived delete");
                debug!(worker, %cid, "deleted");
            }
        }
        Op::AddFile => {
            let data = random_content(rng, &format!("file{worker}"), 20_000);
            let chunk_size = rng.random_range(100..=5000);
            let cid = content::add_bytes(store, &data, chunk_size)?;
            debug!(worker, %cid, size = data.len(), chunk_size, "added file");
            model.files.insert(cid, data);
        }
        Op::ReadFile => {
            let cids: Vec<_> = model.files.keys().copied().collect();
            if let Some(cid) = cids.choose(rng)
                && let Some(expected) = model.files.get(cid)
            {
                let data = content::read_bytes(store, cid)?;
                ensure!(&data == expected, "file content mismatch for {cid}");
            }
        }
    }
    Ok(())
}

fn find_files(dir: &Path, output: &mut Vec<PathBuf>) -> Result<()> {
    for entry in read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if entry.file_type()?.is_dir() {
            find_files(&path, output)?;
        } else {
            output.push(path);
        }
    }
    Ok(())
}

/// Flips one random bit in one random stored record. Returns the record's file name.
pub fn corrupt_random_record(root: &Path, rng: &mut impl Rng) -> Result<Option<String>> {
    let mut files = Vec::new();
    find_files(root, &mut files)?;
    files.retain(|path| !path.starts_with(root.join("tmp")));
    let Some(path) = files.choose(rng) else {
        return Ok(None);
    };
    let mut data = fs_err::read(path)?;
    let Some(byte) = data.choose_mut(rng) else {
        bail!("empty record at {}", path.display());
    };
    *byte ^= 1 << rng.random_range(0..8);
    fs_err::write(path, &data)?;
    Ok(path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned()))
}
