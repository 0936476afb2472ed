#![forbid(unsafe_code)]

pub mod book_list;
pub mod cli;
pub mod credentials;
pub mod formats;
pub mod logging;
pub mod lookup;
pub mod report;
pub mod run;
