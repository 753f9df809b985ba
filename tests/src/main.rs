mod shuffle;

use {
    anyhow::{Result, bail, ensure},
    clap::Parser,
    encblock_protocol::{Cid, Codec},
    encblock_sdk::{EncBlockstore, Error, StoreState, backend::FsBlockstore, content},
    rand::{Rng, SeedableRng, rngs::StdRng},
    shuffle::{Model, Store, corrupt_random_record, step},
    std::{path::Path, thread, time::Instant},
    tempfile::TempDir,
    tracing::{info, warn},
    tracing_subscriber::EnvFilter,
};

const PASSWORD: &[u8] = b"strong-password-is-strong1";
const SALT: &[u8] = b"salty-salt-is-salty1";

/// Hammers an encrypted filesystem block store from several threads
/// and checks every result against an in-memory model.
#[derive(Debug, Parser)]
struct Args {
    /// Operations per thread.
    #[arg(long, default_value_t = 2000)]
    iterations: usize,
    /// Number of worker threads sharing the store.
    #[arg(long, default_value_t = 8)]
    threads: usize,
    /// Seed for the random workload. Random if not specified.
    #[arg(long)]
    seed: Option<u64>,
    /// Keep the storage directory after the run.
    #[arg(long)]
    keep: bool,
}

fn open_store(root: &Path, password: &[u8], salt: &[u8]) -> Result<Store> {
    let mut store = EncBlockstore::new(FsBlockstore::new(root.into())?);
    store.init_from_bytes(password, salt)?;
    store.open()?;
    Ok(store)
}

fn run_workers(store: &Store, args: &Args, seed: u64) -> Result<Vec<Model>> {
    thread::scope(|scope| {
        let handles: Vec<_> = (0..args.threads)
            .map(|worker| {
                scope.spawn(move || -> Result<Model> {
                    let mut rng = StdRng::seed_from_u64(seed.wrapping_add(u64::try_from(worker)?));
                    let mut model = Model::default();
                    for _ in 0..args.iterations {
                        step(store, &mut model, &mut rng, worker)?;
                    }
                    info!(worker, "worker finished");
                    Ok(model)
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| match handle.join() {
                Ok(result) => result,
                Err(_) => bail!("worker panicked"),
            })
            .collect()
    })
}

fn check_contents(store: &Store, models: &[Model]) -> Result<usize> {
    let mut count = 0_usize;
    for model in models {
        for (cid, expected) in model.blocks() {
            ensure!(&store.get(cid)? == expected, "content mismatch for {cid}");
            count = count.saturating_add(1);
        }
        for (cid, expected) in model.files() {
            let data = content::read_bytes(store, cid)?;
            ensure!(&data == expected, "file content mismatch for {cid}");
        }
    }
    Ok(count)
}

fn check_rejected(store: &Store, models: &[Model]) -> Result<()> {
    for (cid, _) in models.iter().flat_map(Model::blocks) {
        match store.get(cid) {
            Err(Error::Authentication(rejected)) if rejected == *cid => {}
            other => bail!("expected Authentication for {cid}, got {other:?}"),
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new("info")?)
        .init();

    let seed = args.seed.unwrap_or_else(|| rand::rng().random());
    let dir = TempDir::new()?;
    let root = dir.path().join("blocks");
    fs_err::create_dir(&root)?;
    info!(seed, root = %root.display(), "starting");

    let started = Instant::now();
    let mut store = open_store(&root, PASSWORD, SALT)?;
    let models = run_workers(&store, &args, seed)?;
    info!(elapsed = ?started.elapsed(), "workers finished");

    store.close()?;
    ensure!(store.state() == StoreState::Closed);
    match store.get(&Cid::for_block(Codec::Raw, b"")) {
        Err(Error::InvalidState { .. }) => {}
        other => bail!("expected InvalidState after close, got {other:?}"),
    }
    store.open()?;
    let count = check_contents(&store, &models)?;
    info!(count, "contents intact after reopen");
    drop(store);

    let store = open_store(&root, PASSWORD, SALT)?;
    check_contents(&store, &models)?;
    info!("contents intact in a fresh store");

    check_rejected(&open_store(&root, PASSWORD, b"salty-salt-is-salty2")?, &models)?;
    check_rejected(
        &open_store(&root, b"strong-password-is-strong2", SALT)?,
        &models,
    )?;
    info!("wrong secrets rejected");

    let mut rng = StdRng::seed_from_u64(seed);
    if let Some(name) = corrupt_random_record(&root, &mut rng)? {
        let cid: Cid = name.parse()?;
        match store.get(&cid) {
            Err(Error::Authentication(_)) => info!(%cid, "corrupted record rejected"),
            other => bail!("expected Authentication for corrupted {cid}, got {other:?}"),
        }
    } else {
        warn!("no records to corrupt");
    }

    if args.keep {
        let path = dir.keep();
        info!(path = %path.display(), "kept storage directory");
    }
    info!(elapsed = ?started.elapsed(), "done");
    Ok(())
}
