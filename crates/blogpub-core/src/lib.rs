pub mod comment_links;
pub mod config;
pub mod error;
pub mod generate;
pub mod git;
pub mod io;
pub mod linker;
pub mod paths;
pub mod post;
pub mod publish;
pub mod tags;

pub use error::{BlogError, Result};
