//! RomM sync command-line client
//!
//! Drives the background sync worker from the command line and prints what
//! it publishes.
//!
//! # Usage
//!
//! - `rommsync me` - Show the signed-in user
//! - `rommsync platforms` - List platforms available on this device
//! - `rommsync collections` - List collections
//! - `rommsync titles <platform>` - List titles for a platform slug
//! - `rommsync download <platform> [name...]` - Download titles whose name
//!   contains any of the given words (all missing titles when none given)
//!
//! `--volume2` switches to the second storage volume first.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use rommsync_core::{
    Command, HttpTransport, Selection, Signal, SyncContext, SyncStatus, Title, WorkerHandle, config,
};

/// How often the progress line is refreshed
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Longest wait for a single catalog fetch
const FETCH_WAIT: Duration = Duration::from_secs(1900);

/// What the user asked for
#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    Me,
    Platforms,
    Collections,
    Titles { platform: String },
    Download { platform: String, filters: Vec<String> },
}

/// Parse the action and flags from command line args
fn parse_args(args: &[String]) -> Option<(Action, bool)> {
    let switch_volume = args.iter().any(|arg| arg == "--volume2");
    let mut words = args.iter().skip(1).filter(|arg| !arg.starts_with("--"));

    let action = match words.next()?.as_str() {
        "me" => Action::Me,
        "platforms" => Action::Platforms,
        "collections" => Action::Collections,
        "titles" => Action::Titles {
            platform: words.next()?.clone(),
        },
        "download" => Action::Download {
            platform: words.next()?.clone(),
            filters: words.map(|word| word.to_lowercase()).collect(),
        },
        _ => return None,
    };
    Some((action, switch_volume))
}

fn print_usage() {
    eprintln!(
        "Usage: rommsync [--volume2] \
         <me|platforms|collections|titles <platform>|download <platform> [name...]>"
    );
}

/// Send a command and block until its signal is raised.
fn run_and_wait(worker: &WorkerHandle, command: Command, signal: &Signal) -> Result<()> {
    let before = signal.raise_count();
    if !worker.send(command) {
        bail!("sync worker has stopped");
    }
    let deadline = std::time::Instant::now() + FETCH_WAIT;
    while signal.raise_count() == before {
        if worker.is_finished() {
            bail!("sync worker stopped while running {:?}", command);
        }
        if std::time::Instant::now() >= deadline {
            bail!("timed out waiting for {:?}", command);
        }
        signal.wait_timeout(POLL_INTERVAL);
    }
    Ok(())
}

fn check_connection(status: &SyncStatus) -> Result<()> {
    if !status.valid_host() {
        bail!("cannot reach the RomM server, check HOST");
    }
    if !status.valid_credentials() {
        bail!("the RomM server rejected the credentials, check USERNAME and PASSWORD");
    }
    Ok(())
}

/// Fetch platforms, select `slug` and fetch its titles.
fn load_titles(worker: &WorkerHandle, status: &SyncStatus, slug: &str) -> Result<Vec<Title>> {
    run_and_wait(worker, Command::FetchPlatforms, &status.platforms_ready)?;
    check_connection(status)?;

    let platform = status
        .platforms()
        .into_iter()
        .find(|platform| platform.slug.eq_ignore_ascii_case(slug))
        .with_context(|| format!("platform '{}' is not available on this device", slug))?;

    status.select(Selection::Platform(platform));
    run_and_wait(worker, Command::FetchTitles, &status.titles_ready)?;
    check_connection(status)?;
    Ok(status.titles())
}

fn download(
    worker: &WorkerHandle,
    ctx: &SyncContext,
    status: &SyncStatus,
    titles: Vec<Title>,
    filters: &[String],
) -> Result<()> {
    let wanted = titles.into_iter().filter(|title| {
        if filters.is_empty() {
            !ctx.storage.is_title_on_device(&ctx.resolver, title)
        } else {
            let name = title.name.to_lowercase();
            filters.iter().any(|filter| name.contains(filter.as_str()))
        }
    });
    let queued = wanted.filter(|title| status.enqueue(title.clone())).count();
    if queued == 0 {
        println!("Nothing to download");
        return Ok(());
    }

    let before = status.download_ready.raise_count();
    if !worker.send(Command::Download) {
        bail!("sync worker has stopped");
    }
    while status.download_ready.raise_count() == before {
        if worker.is_finished() {
            bail!("sync worker stopped during download");
        }
        let progress = status.transfer_progress();
        if let Some(title) = &progress.title {
            if progress.extracting {
                println!(
                    "[{}/{}] {} extracting {:.0}%",
                    progress.position, progress.queue_len, title.name, progress.extract_percent
                );
            } else {
                println!(
                    "[{}/{}] {} {:.0}% of {}",
                    progress.position,
                    progress.queue_len,
                    title.name,
                    progress.download_percent,
                    title.human_size
                );
            }
        }
        status.download_ready.wait_timeout(POLL_INTERVAL);
    }
    check_connection(status)?;
    println!("Downloaded {} titles to {}", queued, ctx.storage.roms_root().display());
    Ok(())
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args: Vec<String> = std::env::args().collect();
    let Some((action, switch_volume)) = parse_args(&args) else {
        print_usage();
        std::process::exit(2);
    };

    let config = config::load();
    if config.server.host.is_empty() {
        bail!("no RomM host configured; set HOST or server.host in config.toml");
    }

    let transport =
        HttpTransport::new(config.credentials()).context("Failed to create HTTP client")?;
    let ctx = Arc::new(SyncContext::new(config));
    let status = Arc::new(SyncStatus::new());
    let worker = WorkerHandle::spawn(Arc::clone(&ctx), Arc::clone(&status), Arc::new(transport))
        .context("Failed to start sync worker")?;

    if switch_volume {
        worker.send(Command::SwitchVolume);
    }

    let result = match &action {
        Action::Me => {
            run_and_wait(&worker, Command::FetchProfile, &status.profile_ready).and_then(|_| {
                check_connection(&status)?;
                let profile = status.profile().context("server returned no profile")?;
                println!("{} ({})", profile.username, profile.role.as_deref().unwrap_or("user"));
                if let Some(avatar) = status.avatar() {
                    println!("Avatar saved to {}", avatar.display());
                }
                Ok(())
            })
        }
        Action::Platforms => {
            run_and_wait(&worker, Command::FetchPlatforms, &status.platforms_ready).and_then(|_| {
                check_connection(&status)?;
                for platform in status.platforms() {
                    println!(
                        "{:<16} {:<40} {:>6}  -> {}",
                        platform.slug,
                        platform.display_name,
                        platform.rom_count,
                        ctx.storage.platform_dir(&ctx.resolver, &platform.slug).display()
                    );
                }
                Ok(())
            })
        }
        Action::Collections => {
            run_and_wait(&worker, Command::FetchCollections, &status.collections_ready).and_then(
                |_| {
                    check_connection(&status)?;
                    for collection in status.collections() {
                        let kind = if collection.is_virtual { "virtual" } else { "" };
                        println!("{:<40} {:>6} {}", collection.name, collection.rom_count, kind);
                    }
                    Ok(())
                },
            )
        }
        Action::Titles { platform } => load_titles(&worker, &status, platform).map(|titles| {
            for title in titles {
                let marker = if ctx.storage.is_title_on_device(&ctx.resolver, &title) {
                    "*"
                } else {
                    " "
                };
                println!("{} {:<60} {:>10}", marker, title.name, title.human_size);
            }
        }),
        Action::Download { platform, filters } => load_titles(&worker, &status, platform)
            .and_then(|titles| download(&worker, &ctx, &status, titles, filters)),
    };

    if let Err(e) = worker.shutdown() {
        tracing::error!("Sync worker failed: {}", e);
        return Err(e.into());
    }
    result
}
