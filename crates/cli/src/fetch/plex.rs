//! Plex Media Server client: library sections, items and per-season counts.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use mediagrid_recon::{ExternalIds, GroupUnitCount, InventoryItem, MediaAttributes};

use super::common::{FetchClient, FetchError};

// ── Public types ────────────────────────────────────────────────────

/// Library section kinds we report on. Music, photos etc. are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Movie,
    Show,
}

impl SectionKind {
    fn from_plex(kind: &str) -> Option<Self> {
        match kind {
            "movie" => Some(Self::Movie),
            "show" => Some(Self::Show),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Movie => "movie",
            Self::Show => "show",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub key: String,
    pub title: String,
    pub kind: SectionKind,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ServerIdentity {
    pub machine_identifier: Option<String>,
    pub version: Option<String>,
}

// ── Wire types ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(rename = "MediaContainer")]
    media_container: T,
}

#[derive(Debug, Deserialize)]
struct IdentityJson {
    #[serde(rename = "machineIdentifier", default)]
    machine_identifier: Option<String>,
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DirectoryList {
    #[serde(rename = "Directory", default)]
    directories: Vec<DirectoryJson>,
}

#[derive(Debug, Deserialize)]
struct DirectoryJson {
    key: String,
    title: String,
    #[serde(rename = "type")]
    kind: String,
}

#[derive(Debug, Deserialize)]
struct MetadataList {
    #[serde(rename = "Metadata", default)]
    metadata: Vec<MetadataJson>,
}

#[derive(Debug, Deserialize)]
struct MetadataJson {
    #[serde(rename = "ratingKey")]
    rating_key: String,
    title: String,
    #[serde(default)]
    year: Option<i32>,
    #[serde(default)]
    studio: Option<String>,
    #[serde(rename = "contentRating", default)]
    content_rating: Option<String>,
    #[serde(rename = "Guid", default)]
    guids: Vec<GuidJson>,
    #[serde(rename = "Media", default)]
    media: Vec<MediaJson>,
}

#[derive(Debug, Deserialize)]
struct GuidJson {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MediaJson {
    #[serde(rename = "videoResolution", default)]
    video_resolution: Option<String>,
    #[serde(default)]
    container: Option<String>,
    #[serde(default)]
    bitrate: Option<u32>,
    #[serde(rename = "Part", default)]
    parts: Vec<PartJson>,
}

#[derive(Debug, Deserialize)]
struct PartJson {
    #[serde(default)]
    file: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LeafList {
    #[serde(rename = "Metadata", default)]
    leaves: Vec<LeafJson>,
}

#[derive(Debug, Deserialize)]
struct LeafJson {
    #[serde(rename = "parentIndex", default)]
    parent_index: Option<u32>,
}

// ── Mapping ─────────────────────────────────────────────────────────

/// Pull IMDB / TVDB ids out of `Guid` entries (`imdb://tt…`, `tvdb://…`).
fn external_ids(guids: &[GuidJson]) -> ExternalIds {
    let mut ids = ExternalIds::default();
    for guid in guids {
        if let Some(imdb) = guid.id.strip_prefix("imdb://") {
            ids.imdb.get_or_insert_with(|| imdb.to_string());
        } else if let Some(tvdb) = guid.id.strip_prefix("tvdb://") {
            if ids.tvdb.is_none() {
                ids.tvdb = tvdb.parse().ok();
            }
        }
    }
    ids
}

impl From<MetadataJson> for InventoryItem {
    fn from(m: MetadataJson) -> Self {
        let ids = external_ids(&m.guids);
        // First media / first part wins
        let media = m.media.into_iter().next();
        let (resolution, container, bitrate_kbps, file) = match media {
            Some(media) => {
                let file = media.parts.into_iter().next().and_then(|p| p.file);
                (media.video_resolution, media.container, media.bitrate, file)
            }
            None => (None, None, None, None),
        };

        let mut item = InventoryItem::new(m.rating_key, m.title);
        item.ids = ids;
        item.attributes = MediaAttributes {
            resolution,
            year: m.year,
            studio: m.studio,
            content_rating: m.content_rating,
            file,
            container,
            bitrate_kbps,
        };
        item
    }
}

// ── Client ──────────────────────────────────────────────────────────

pub struct PlexClient {
    client: FetchClient,
    base_url: String,
    token: String,
}

impl PlexClient {
    pub fn new(base_url: impl Into<String>, token: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        Ok(Self {
            client: FetchClient::new("Plex", timeout)?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        })
    }

    fn get<T: serde::de::DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, FetchError> {
        let url = format!("{}{path}", self.base_url);
        let envelope: Envelope<T> = self.client.get_json_required(&url, |http| {
            http.get(&url)
                .header("X-Plex-Token", &self.token)
                .header(reqwest::header::ACCEPT, "application/json")
                .query(query)
        })?;
        Ok(envelope.media_container)
    }

    /// Verify the server is reachable and accepts the token.
    pub fn connect(&self) -> Result<ServerIdentity, FetchError> {
        let identity: IdentityJson = self.get("/identity", &[])?;
        Ok(ServerIdentity { machine_identifier: identity.machine_identifier, version: identity.version })
    }

    /// Movie and show sections, in server order.
    pub fn sections(&self) -> Result<Vec<Section>, FetchError> {
        let list: DirectoryList = self.get("/library/sections", &[])?;
        Ok(list
            .directories
            .into_iter()
            .filter_map(|d| {
                SectionKind::from_plex(&d.kind).map(|kind| Section { key: d.key, title: d.title, kind })
            })
            .collect())
    }

    pub fn list_items(&self, section: &Section) -> Result<Vec<InventoryItem>, FetchError> {
        let path = format!("/library/sections/{}/all", section.key);
        let list: MetadataList = self.get(&path, &[("includeGuids", "1")])?;
        Ok(list.metadata.into_iter().map(InventoryItem::from).collect())
    }

    /// Episodes held per season for one show. Episodes with no season land
    /// in group 0 alongside specials, so they still count toward the total.
    pub fn group_unit_counts(&self, item: &InventoryItem) -> Result<GroupUnitCount, FetchError> {
        let path = format!("/library/metadata/{}/allLeaves", item.key);
        let list: LeafList = self.get(&path, &[])?;
        Ok(GroupUnitCount::from_units(list.leaves.iter().map(|leaf| leaf.parent_index.unwrap_or(0))))
    }
}

/// Find a section by title, case-insensitively, or by key.
pub fn find_section<'a>(sections: &'a [Section], name: &str) -> Option<&'a Section> {
    let name = name.trim();
    let folded = name.to_lowercase();
    sections.iter().find(|s| s.title.to_lowercase() == folded || s.key == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    const TOKEN: &str = "plex-test-token";

    fn client(server: &MockServer) -> PlexClient {
        PlexClient::new(server.base_url(), TOKEN, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn connect_sends_token() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/identity").header("X-Plex-Token", TOKEN);
            then.status(200).json_body(json!({
                "MediaContainer": {"machineIdentifier": "abc123", "version": "1.40.0"}
            }));
        });

        let identity = client(&server).connect().unwrap();
        mock.assert();
        assert_eq!(identity.machine_identifier.as_deref(), Some("abc123"));
    }

    #[test]
    fn connect_rejected_token() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/identity");
            then.status(401);
        });

        let err = client(&server).connect().unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 401, .. }));
    }

    #[test]
    fn sections_keep_movies_and_shows() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/library/sections");
            then.status(200).json_body(json!({
                "MediaContainer": {"Directory": [
                    {"key": "1", "title": "Movies", "type": "movie"},
                    {"key": "2", "title": "TV Shows", "type": "show"},
                    {"key": "3", "title": "Music", "type": "artist"}
                ]}
            }));
        });

        let sections = client(&server).sections().unwrap();
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].kind, SectionKind::Show);
        assert_eq!(find_section(&sections, "tv shows").map(|s| s.key.as_str()), Some("2"));
        assert!(find_section(&sections, "Music").is_none());
    }

    #[test]
    fn list_items_maps_attributes_and_guids() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/library/sections/1/all").query_param("includeGuids", "1");
            then.status(200).json_body(json!({
                "MediaContainer": {"Metadata": [
                    {
                        "ratingKey": "101",
                        "title": "Heat",
                        "year": 1995,
                        "studio": "Warner Bros.",
                        "contentRating": "R",
                        "Guid": [{"id": "imdb://tt0113277"}, {"id": "tmdb://949"}],
                        "Media": [
                            {"videoResolution": "1080", "container": "mkv", "bitrate": 9500,
                             "Part": [{"file": "/media/Heat (1995).mkv"}]},
                            {"videoResolution": "sd", "container": "avi"}
                        ]
                    },
                    {"ratingKey": "102", "title": "Bare"}
                ]}
            }));
        });

        let section = Section { key: "1".into(), title: "Movies".into(), kind: SectionKind::Movie };
        let items = client(&server).list_items(&section).unwrap();
        mock.assert();

        let heat = &items[0];
        assert_eq!(heat.key, "101");
        assert_eq!(heat.ids.imdb.as_deref(), Some("tt0113277"));
        assert_eq!(heat.attributes.resolution.as_deref(), Some("1080"));
        assert_eq!(heat.attributes.container.as_deref(), Some("mkv"));
        assert_eq!(heat.attributes.bitrate_kbps, Some(9500));
        assert_eq!(heat.attributes.file.as_deref(), Some("/media/Heat (1995).mkv"));

        let bare = &items[1];
        assert_eq!(bare.attributes, MediaAttributes::default());
        assert_eq!(bare.ids, ExternalIds::default());
    }

    #[test]
    fn group_unit_counts_by_parent_index() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/library/metadata/202/allLeaves");
            then.status(200).json_body(json!({
                "MediaContainer": {"Metadata": [
                    {"parentIndex": 1}, {"parentIndex": 1}, {"parentIndex": 2},
                    {"parentIndex": 0}, {}
                ]}
            }));
        });

        let show = InventoryItem::new("202", "Show A");
        let counts = client(&server).group_unit_counts(&show).unwrap();
        assert_eq!(counts.get(1), 2);
        assert_eq!(counts.get(2), 1);
        // Specials and season-less episodes share group 0
        assert_eq!(counts.get(0), 2);
        assert_eq!(counts.total_units(), 5);
    }

    #[test]
    fn find_section_folds_non_ascii_case() {
        let sections = vec![
            Section { key: "1".into(), title: "Séries".into(), kind: SectionKind::Show },
            Section { key: "2".into(), title: "FILMES".into(), kind: SectionKind::Movie },
        ];
        assert_eq!(find_section(&sections, "séries").map(|s| s.key.as_str()), Some("1"));
        assert_eq!(find_section(&sections, " SÉRIES ").map(|s| s.key.as_str()), Some("1"));
        assert_eq!(find_section(&sections, "filmes").map(|s| s.key.as_str()), Some("2"));
        assert_eq!(find_section(&sections, "2").map(|s| s.key.as_str()), Some("2"));
        assert!(find_section(&sections, "anime").is_none());
    }

    #[test]
    fn tvdb_guid_parsed() {
        let ids = external_ids(&[GuidJson { id: "tvdb://81189".into() }]);
        assert_eq!(ids.tvdb, Some(81189));
        assert!(ids.imdb.is_none());
    }
}
