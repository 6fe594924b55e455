//! TVMaze catalog client: expected seasons and episode counts per show.

use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use mediagrid_recon::{CatalogClient, CatalogEntry, CatalogError, CatalogId};

use super::common::{FetchClient, FetchError};

// ── Wire types ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct SearchHit {
    show: ShowRef,
}

#[derive(Debug, Deserialize)]
struct ShowRef {
    id: u64,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
struct Episode {
    /// Specials come back as season 0 on some shows; filtered downstream.
    #[serde(default)]
    season: u32,
}

// ── Client ──────────────────────────────────────────────────────────

pub struct TvMazeClient {
    client: FetchClient,
    base_url: String,
}

impl TvMazeClient {
    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self {
            client: FetchClient::new("TVMaze", timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Resolve an identifier to a show. Id lookups use the lookup endpoint;
    /// titles take the first search hit.
    fn find_show(&self, id: &CatalogId) -> Result<Option<ShowRef>, FetchError> {
        match id {
            CatalogId::Imdb(imdb) => self.lookup_show("imdb", imdb),
            CatalogId::Tvdb(tvdb) => self.lookup_show("thetvdb", &tvdb.to_string()),
            CatalogId::Title(title) => {
                let url = format!("{}/search/shows", self.base_url);
                let hits: Option<Vec<SearchHit>> =
                    self.client.get_json(|http| http.get(&url).query(&[("q", title.as_str())]))?;
                Ok(hits.and_then(|hits| hits.into_iter().next()).map(|hit| hit.show))
            }
        }
    }

    fn lookup_show(&self, param: &str, value: &str) -> Result<Option<ShowRef>, FetchError> {
        let url = format!("{}/lookup/shows", self.base_url);
        self.client.get_json(|http| http.get(&url).query(&[(param, value)]))
    }

    /// `None` when the episode list itself is missing (404).
    fn episodes(&self, show_id: u64) -> Result<Option<Vec<Episode>>, FetchError> {
        let url = format!("{}/shows/{show_id}/episodes", self.base_url);
        self.client.get_json(|http| http.get(&url))
    }
}

impl CatalogClient for TvMazeClient {
    fn lookup(&self, id: &CatalogId) -> Result<Option<CatalogEntry>, CatalogError> {
        let Some(show) = self.find_show(id)? else {
            debug!(%id, "no TVMaze match");
            return Ok(None);
        };
        // A matched show without an episode list is not a usable entry
        let Some(episodes) = self.episodes(show.id)? else {
            debug!(%id, show_id = show.id, "TVMaze show has no episode list");
            return Ok(None);
        };
        let entry = CatalogEntry::from_units(show.id, show.name, episodes.iter().map(|e| e.season));
        debug!(%id, show_id = entry.catalog_id, seasons = entry.total_group_count, "TVMaze match");
        Ok(Some(entry))
    }
}
