use std::path::Path;
use std::time::Instant;

use anyhow::Context as _;

use crate::credentials::{BOOKS_SCOPE, ServiceAccountKey};
use crate::lookup::{LookupClient, LookupConfig};
use crate::report::RunSummary;

/// Book list → token → one search per title → FOUND / NOT FOUND lines.
///
/// Logs through whatever dispatcher is current, so callers wrap this in
/// [`crate::logging::RunLog::in_scope`].
pub fn run(
    credential_file: &Path,
    book_list_file: &Path,
    config: LookupConfig,
) -> anyhow::Result<RunSummary> {
    let stubs = crate::book_list::load(book_list_file)?;
    tracing::info!("Number of titles in the book list file: {}", stubs.len());

    let started_at = Instant::now();

    let key = ServiceAccountKey::from_file(credential_file)?;
    let client = crate::lookup::build_http_client(&config)?;
    let token = crate::credentials::fetch_access_token(&client, &key, BOOKS_SCOPE)
        .context("acquire access token")?;

    let lookup = LookupClient::new(client, config, token);
    Ok(crate::report::report(lookup.lookup_all(stubs), started_at))
}
