//! Catalog identifiers and the client seam.

use std::fmt;

use crate::error::CatalogError;
use crate::model::{CatalogEntry, InventoryItem};

/// What to ask the catalog for.
///
/// Ids are unambiguous, titles are not: when an item carries both, the id
/// wins (see [`CatalogId::for_item`]).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CatalogId {
    Imdb(String),
    Tvdb(u32),
    Title(String),
}

impl CatalogId {
    /// Classify a free-form identifier by shape.
    ///
    /// - `tt` followed by digits → IMDB id
    /// - `tvdb:<digits>` → TVDB id
    /// - anything else → title
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if is_imdb_id(raw) {
            return Self::Imdb(raw.to_string());
        }
        if let Some(rest) = raw.strip_prefix("tvdb:") {
            if let Ok(id) = rest.trim().parse::<u32>() {
                return Self::Tvdb(id);
            }
        }
        Self::Title(raw.to_string())
    }

    /// Pick the best identifier an inventory item offers.
    pub fn for_item(item: &InventoryItem) -> Self {
        if let Some(imdb) = item.ids.imdb.as_deref().filter(|id| is_imdb_id(id)) {
            return Self::Imdb(imdb.to_string());
        }
        if let Some(tvdb) = item.ids.tvdb {
            return Self::Tvdb(tvdb);
        }
        Self::Title(item.title.trim().to_string())
    }

    /// Memoization key. Distinct variants never collide.
    pub fn cache_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CatalogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Imdb(id) => write!(f, "imdb:{id}"),
            Self::Tvdb(id) => write!(f, "tvdb:{id}"),
            Self::Title(title) => write!(f, "title:{title}"),
        }
    }
}

fn is_imdb_id(s: &str) -> bool {
    s.len() > 2 && s.starts_with("tt") && s[2..].bytes().all(|b| b.is_ascii_digit())
}

/// A source of expected group/unit counts.
///
/// `Ok(None)` means the catalog answered and has no match. Implementations
/// make a single attempt per call; retries are not part of the contract.
pub trait CatalogClient: Send + Sync {
    fn lookup(&self, id: &CatalogId) -> Result<Option<CatalogEntry>, CatalogError>;
}

impl<C: CatalogClient + ?Sized> CatalogClient for &C {
    fn lookup(&self, id: &CatalogId) -> Result<Option<CatalogEntry>, CatalogError> {
        (**self).lookup(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_by_shape() {
        assert_eq!(CatalogId::parse("tt0903747"), CatalogId::Imdb("tt0903747".into()));
        assert_eq!(CatalogId::parse("tvdb:81189"), CatalogId::Tvdb(81189));
        assert_eq!(CatalogId::parse("Breaking Bad"), CatalogId::Title("Breaking Bad".into()));
        // Looks like an id prefix but is a title
        assert_eq!(CatalogId::parse("ttt"), CatalogId::Title("ttt".into()));
        assert_eq!(CatalogId::parse("tvdb:abc"), CatalogId::Title("tvdb:abc".into()));
    }

    #[test]
    fn id_takes_precedence_over_title() {
        let mut item = InventoryItem::new("1", "The Office");
        assert_eq!(CatalogId::for_item(&item), CatalogId::Title("The Office".into()));

        item.ids.tvdb = Some(73244);
        assert_eq!(CatalogId::for_item(&item), CatalogId::Tvdb(73244));

        item.ids.imdb = Some("tt0386676".into());
        assert_eq!(CatalogId::for_item(&item), CatalogId::Imdb("tt0386676".into()));
    }

    #[test]
    fn malformed_imdb_falls_back() {
        let mut item = InventoryItem::new("1", "Show");
        item.ids.imdb = Some("nm123".into());
        assert_eq!(CatalogId::for_item(&item), CatalogId::Title("Show".into()));
    }

    #[test]
    fn cache_keys_are_distinct_per_variant() {
        assert_ne!(
            CatalogId::Title("81189".into()).cache_key(),
            CatalogId::Tvdb(81189).cache_key()
        );
    }
}
