use std::path::PathBuf;

use clap::Parser;

#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Cli {
    /// Google service account credential file (JSON).
    #[arg(long)]
    pub credential_file: PathBuf,

    /// Book list file: a title line followed by a `; `-separated author line, per book.
    #[arg(long)]
    pub book_list_file: PathBuf,
}
