use std::path::Path;

use anyhow::Context as _;

use crate::formats::BookStub;

const AUTHOR_SEPARATOR: &str = "; ";

pub fn load(path: &Path) -> anyhow::Result<Vec<BookStub>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("read book list: {}", path.display()))?;
    parse(&contents).with_context(|| format!("parse book list: {}", path.display()))
}

enum ParseState {
    ExpectTitle,
    ExpectAuthors { title: String, line_no: usize },
}

/// Parses alternating title / author lines, ignoring blank lines.
///
/// A title with no author line before end of input is an error, not a dropped entry.
pub fn parse(contents: &str) -> anyhow::Result<Vec<BookStub>> {
    let mut stubs = Vec::new();
    let mut state = ParseState::ExpectTitle;

    for (idx, line) in contents.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        state = match state {
            ParseState::ExpectTitle => ParseState::ExpectAuthors {
                title: line.to_owned(),
                line_no: idx + 1,
            },
            ParseState::ExpectAuthors { title, .. } => {
                let authors = line.split(AUTHOR_SEPARATOR).map(str::to_owned).collect();
                stubs.push(BookStub { title, authors });
                ParseState::ExpectTitle
            }
        };
    }

    if let ParseState::ExpectAuthors { title, line_no } = state {
        anyhow::bail!("title {title:?} on line {line_no} has no author line");
    }

    Ok(stubs)
}
