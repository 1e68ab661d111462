//! Category mapping between Corsaro.red's native ids and Torznab codes.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Native filter value that asks the site for every category.
pub const ALL_CATEGORIES: &str = "0";

/// A category code in the host's (Torznab) taxonomy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryCode(pub u32);

impl CategoryCode {
    pub const MOVIES: CategoryCode = CategoryCode(2000);
    pub const AUDIO: CategoryCode = CategoryCode(3000);
    pub const PC: CategoryCode = CategoryCode(4000);
    pub const PC_GAMES: CategoryCode = CategoryCode(4050);
    pub const TV: CategoryCode = CategoryCode(5000);
    pub const TV_ANIME: CategoryCode = CategoryCode(5070);
    pub const OTHER: CategoryCode = CategoryCode(8000);

    /// Human readable Torznab name, "Unknown" for codes outside this indexer's table.
    pub fn name(&self) -> &'static str {
        match *self {
            Self::MOVIES => "Movies",
            Self::AUDIO => "Audio",
            Self::PC => "PC",
            Self::PC_GAMES => "PC/Games",
            Self::TV => "TV",
            Self::TV_ANIME => "TV/Anime",
            Self::OTHER => "Other",
            _ => "Unknown",
        }
    }
}

impl fmt::Display for CategoryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CategoryCode {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(CategoryCode)
    }
}

/// One row of the site's category table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryMapping {
    /// Category id used by the site.
    pub native_id: u32,
    /// Torznab code the native id maps to.
    pub code: CategoryCode,
    /// Site's own label for the category.
    pub description: &'static str,
}

impl CategoryMapping {
    pub const fn new(native_id: u32, code: CategoryCode, description: &'static str) -> Self {
        Self {
            native_id,
            code,
            description,
        }
    }
}

/// Bidirectional lookup between native ids and Torznab codes.
///
/// The table is fixed at construction and only read afterwards, so one mapper
/// can be shared by any number of concurrent queries.
#[derive(Debug, Clone)]
pub struct CategoryMapper {
    mappings: Vec<CategoryMapping>,
}

impl CategoryMapper {
    pub fn new(mappings: Vec<CategoryMapping>) -> Self {
        Self { mappings }
    }

    /// Corsaro.red's table. Native id 4 is not used by the site.
    pub fn corsaro() -> Self {
        Self::new(vec![
            CategoryMapping::new(0, CategoryCode::OTHER, "All"),
            CategoryMapping::new(1, CategoryCode::TV, "TV"),
            CategoryMapping::new(2, CategoryCode::MOVIES, "Movies"),
            CategoryMapping::new(3, CategoryCode::AUDIO, "Music"),
            CategoryMapping::new(5, CategoryCode::PC, "Software"),
            CategoryMapping::new(6, CategoryCode::PC_GAMES, "Games"),
            CategoryMapping::new(7, CategoryCode::TV_ANIME, "Anime"),
        ])
    }

    pub fn mappings(&self) -> &[CategoryMapping] {
        &self.mappings
    }

    /// Map a native id to its Torznab code. Unmapped ids degrade to `Other`.
    pub fn to_internal(&self, native_id: i64) -> CategoryCode {
        self.mappings
            .iter()
            .find(|m| i64::from(m.native_id) == native_id)
            .map(|m| m.code)
            .unwrap_or(CategoryCode::OTHER)
    }

    /// Build the `category` search parameter for a set of Torznab codes.
    ///
    /// Returns the comma-joined native ids in ascending order, or
    /// [`ALL_CATEGORIES`] when nothing is requested or nothing matches.
    pub fn to_native_filter(&self, codes: &BTreeSet<CategoryCode>) -> String {
        let native_ids: BTreeSet<u32> = self
            .mappings
            .iter()
            .filter(|m| codes.contains(&m.code))
            .map(|m| m.native_id)
            .collect();

        if native_ids.is_empty() {
            return ALL_CATEGORIES.to_string();
        }

        native_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl Default for CategoryMapper {
    fn default() -> Self {
        Self::corsaro()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(list: &[CategoryCode]) -> BTreeSet<CategoryCode> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_to_internal_known_ids() {
        let mapper = CategoryMapper::corsaro();
        assert_eq!(mapper.to_internal(1), CategoryCode::TV);
        assert_eq!(mapper.to_internal(2), CategoryCode::MOVIES);
        assert_eq!(mapper.to_internal(3), CategoryCode::AUDIO);
        assert_eq!(mapper.to_internal(5), CategoryCode::PC);
        assert_eq!(mapper.to_internal(6), CategoryCode::PC_GAMES);
        assert_eq!(mapper.to_internal(7), CategoryCode::TV_ANIME);
    }

    #[test]
    fn test_to_internal_unmapped_is_other() {
        let mapper = CategoryMapper::corsaro();
        assert_eq!(mapper.to_internal(4), CategoryCode::OTHER);
        assert_eq!(mapper.to_internal(99), CategoryCode::OTHER);
        assert_eq!(mapper.to_internal(-1), CategoryCode::OTHER);
    }

    #[test]
    fn test_native_filter_single() {
        let mapper = CategoryMapper::corsaro();
        assert_eq!(mapper.to_native_filter(&codes(&[CategoryCode::MOVIES])), "2");
    }

    #[test]
    fn test_native_filter_empty_is_all() {
        let mapper = CategoryMapper::corsaro();
        assert_eq!(mapper.to_native_filter(&BTreeSet::new()), ALL_CATEGORIES);
        assert_eq!(mapper.to_native_filter(&BTreeSet::new()), "0");
    }

    #[test]
    fn test_native_filter_multiple_sorted() {
        let mapper = CategoryMapper::corsaro();
        let filter = mapper.to_native_filter(&codes(&[
            CategoryCode::TV_ANIME,
            CategoryCode::TV,
            CategoryCode::AUDIO,
        ]));
        assert_eq!(filter, "1,3,7");
    }

    #[test]
    fn test_native_filter_unmatched_codes_fall_back_to_all() {
        let mapper = CategoryMapper::corsaro();
        // Books are not carried by the site
        assert_eq!(mapper.to_native_filter(&codes(&[CategoryCode(7000)])), "0");
    }

    #[test]
    fn test_native_filter_shared_code_yields_every_native_id() {
        let mapper = CategoryMapper::new(vec![
            CategoryMapping::new(10, CategoryCode::MOVIES, "Film"),
            CategoryMapping::new(11, CategoryCode::MOVIES, "Film HD"),
            CategoryMapping::new(12, CategoryCode::TV, "Serie"),
        ]);
        assert_eq!(
            mapper.to_native_filter(&codes(&[CategoryCode::MOVIES])),
            "10,11"
        );
    }

    #[test]
    fn test_category_code_parse_and_name() {
        let code: CategoryCode = " 5070 ".parse().unwrap();
        assert_eq!(code, CategoryCode::TV_ANIME);
        assert_eq!(code.name(), "TV/Anime");
        assert_eq!(CategoryCode(1234).name(), "Unknown");
        assert!("abc".parse::<CategoryCode>().is_err());
    }

    #[test]
    fn test_category_code_serializes_as_number() {
        assert_eq!(serde_json::to_string(&CategoryCode::MOVIES).unwrap(), "2000");
    }
}
