use std::path::Path;
use std::process::ExitCode;

use anyhow::Context as _;
use clap::Parser as _;

fn main() -> ExitCode {
    if let Err(err) = try_main() {
        eprintln!("{err:#}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn try_main() -> anyhow::Result<()> {
    let cli = booklookup::cli::Cli::parse();

    let run_log = booklookup::logging::RunLog::init(Path::new(booklookup::logging::LOG_DIR))
        .context("init logging")?;

    run_log.in_scope(|| {
        tracing::debug!(?cli, "parsed cli");
        booklookup::run::run(
            &cli.credential_file,
            &cli.book_list_file,
            booklookup::lookup::LookupConfig::default(),
        )
        .context("list books")
    })?;

    Ok(())
}
