//! HTTP clients for the inventory server (Plex) and the catalog (TVMaze).

mod common;
pub mod plex;
pub mod tvmaze;

pub use common::FetchError;
pub use plex::{PlexClient, Section, SectionKind, ServerIdentity};
pub use tvmaze::TvMazeClient;
