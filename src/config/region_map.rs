use std::collections::BTreeMap;

/// Country/territory codes grouped by the region they belong to
const DEFAULT_REGIONS: &[(&str, &[&str])] = &[
    (
        "South America",
        &["AR", "BO", "CL", "CO", "EC", "PE", "PY", "UY", "VE"],
    ),
    ("North America", &["US", "MX"]),
    ("Caribbean", &["CU", "DO", "PR"]),
    ("Central America", &["GT", "HN", "NI", "CR", "PA", "SV"]),
    ("Europe", &["ES"]),
];

/// Static lookup from a `condition` code to its region name
#[derive(Debug, Clone, PartialEq)]
pub struct RegionMap {
    entries: BTreeMap<String, String>,
}

impl RegionMap {
    /// Build a map from `(code, region)` pairs. Later pairs win on duplicates.
    pub fn from_pairs<I, C, R>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (C, R)>,
        C: Into<String>,
        R: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(code, region)| (code.into(), region.into()))
                .collect(),
        }
    }

    /// Region for a code. Matching is exact: `" US"` and `"us"` are unmapped.
    pub fn region_for(&self, code: &str) -> Option<&str> {
        self.entries.get(code).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct region names in sorted order
    pub fn regions(&self) -> Vec<&str> {
        let mut regions: Vec<&str> = self.entries.values().map(String::as_str).collect();
        regions.sort_unstable();
        regions.dedup();
        regions
    }
}

impl Default for RegionMap {
    fn default() -> Self {
        Self::from_pairs(DEFAULT_REGIONS.iter().flat_map(|(region, codes)| {
            codes.iter().map(move |code| (*code, *region))
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_lookup() {
        let map = RegionMap::default();
        assert_eq!(map.region_for("AR"), Some("South America"));
        assert_eq!(map.region_for("MX"), Some("North America"));
        assert_eq!(map.region_for("PR"), Some("Caribbean"));
        assert_eq!(map.region_for("SV"), Some("Central America"));
        assert_eq!(map.region_for("ES"), Some("Europe"));
    }

    #[test]
    fn test_unknown_code_is_none() {
        let map = RegionMap::default();
        assert_eq!(map.region_for("FR"), None);
        assert_eq!(map.region_for(""), None);
        // Lookups are case-sensitive
        assert_eq!(map.region_for("ar"), None);
    }

    #[test]
    fn test_lookup_does_not_trim_whitespace() {
        let map = RegionMap::default();
        assert_eq!(map.region_for(" US"), None);
        assert_eq!(map.region_for("US "), None);
        assert_eq!(map.region_for("US"), Some("North America"));
    }

    #[test]
    fn test_regions_are_distinct_and_sorted() {
        let map = RegionMap::default();
        assert_eq!(
            map.regions(),
            vec![
                "Caribbean",
                "Central America",
                "Europe",
                "North America",
                "South America"
            ]
        );
    }

    #[test]
    fn test_from_pairs() {
        let map = RegionMap::from_pairs([("X1", "A"), ("X2", "B")]);
        assert_eq!(map.len(), 2);
        assert_eq!(map.region_for("X2"), Some("B"));
    }
}
