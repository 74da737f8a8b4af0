//! A command-line front-end for the blame engine, following `gitoxide`'s `pretty-cli`/`tracing`
//! feature wiring: a `tracing-subscriber` formatter driven by `RUST_LOG` when the `tracing`
//! feature is enabled, falling back to `env_logger` otherwise.

mod cli;
mod error;
mod render;

use clap::Parser;

use blame::{BlameRanges, Flags, Options};
use cli::Args;
use error::CliError;

fn init_logging() {
    #[cfg(feature = "tracing")]
    {
        tracing_subscriber::fmt::fmt().with_env_filter(tracing_subscriber::EnvFilter::from_default_env()).init();
    }
    #[cfg(not(feature = "tracing"))]
    {
        env_logger::Builder::from_default_env().init();
    }
}

fn options_from_args(args: &Args) -> Options {
    let mut flags = Flags::empty();
    flags.set(Flags::USE_MAILMAP, args.mailmap);
    flags.set(Flags::TRACK_COPIES_SAME_FILE, args.follow);
    flags.set(Flags::FIRST_PARENT, args.first_parent);
    flags.set(Flags::IGNORE_WHITESPACE, args.ignore_whitespace);

    let ranges = match args.range {
        Some((start, end)) => BlameRanges::from_one_based_inclusive_range(start..=end),
        None => BlameRanges::default(),
    };

    Options {
        ranges,
        flags,
        ..Options::default()
    }
}

fn load_mailmap(repo: &gix::Repository) -> Result<Option<gix_mailmap::Snapshot>, CliError> {
    let path = repo.work_dir().unwrap_or_else(|| repo.git_dir()).join(".mailmap");
    if !path.exists() {
        return Ok(None);
    }
    let bytes = std::fs::read(&path).map_err(CliError::Mailmap)?;
    Ok(Some(gix_mailmap::Snapshot::from_bytes(&bytes)))
}

fn run() -> Result<(), CliError> {
    let args = Args::parse();

    let repo = gix::discover(&args.repository).map_err(|source| CliError::Discover {
        path: args.repository.display().to_string(),
        source,
    })?;
    #[cfg(feature = "tracing")]
    tracing::debug!(repository = %repo.git_dir().display(), "discovered repository");

    let commit_id = if args.revision == "HEAD" {
        repo.head_id().map_err(CliError::Head)?.detach()
    } else {
        repo.rev_parse_single(args.revision.as_str())
            .map_err(|source| CliError::RevParse {
                revision: args.revision.clone(),
                source,
            })?
            .detach()
    };
    #[cfg(feature = "tracing")]
    tracing::debug!(revision = %args.revision, commit = %commit_id, "resolved revision");

    let mailmap = if args.mailmap { load_mailmap(&repo)? } else { None };
    let path = bstr::BString::from(args.path.to_string_lossy().into_owned());
    let options = options_from_args(&args);

    let result = blame::backend::file(&repo.objects, None, mailmap, commit_id, path, options)?;
    #[cfg(feature = "tracing")]
    tracing::debug!(hunks = result.hunk_count(), "blame complete");

    render::porcelain(&result);
    Ok(())
}

fn main() {
    init_logging();
    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}
