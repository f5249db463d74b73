use serde::Serialize;
use std::collections::BTreeMap;

/// Row counts per region, keyed in region-name order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RegionDistribution {
    counts: BTreeMap<String, usize>,
}

impl RegionDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values<'a>(values: impl IntoIterator<Item = &'a str>) -> Self {
        let mut distribution = Self::new();
        for value in values {
            *distribution.counts.entry(value.to_string()).or_insert(0) += 1;
        }
        distribution
    }

    /// Get count for a specific region (0 if absent)
    pub fn count(&self, region: &str) -> usize {
        self.counts.get(region).copied().unwrap_or(0)
    }

    /// Get percentage of rows in a specific region
    pub fn percentage(&self, region: &str) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        (self.count(region) as f64 / total as f64) * 100.0
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    pub fn num_regions(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Regions in name order with their counts
    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.counts.iter().map(|(region, &count)| (region.as_str(), count))
    }

    /// Smallest region and its count; ties go to the first region by name
    pub fn min(&self) -> Option<(&str, usize)> {
        self.iter()
            .fold(None, |best: Option<(&str, usize)>, (region, count)| match best {
                Some((_, best_count)) if best_count <= count => best,
                _ => Some((region, count)),
            })
    }

    /// Regions sorted by descending count, then name
    pub fn by_count_desc(&self) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> = self.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_and_percentage() {
        let dist = RegionDistribution::from_values(["A", "B", "A", "A"]);
        assert_eq!(dist.count("A"), 3);
        assert_eq!(dist.count("B"), 1);
        assert_eq!(dist.count("C"), 0);
        assert_eq!(dist.total(), 4);
        assert!((dist.percentage("A") - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_percentage_is_zero() {
        let dist = RegionDistribution::new();
        assert_eq!(dist.percentage("A"), 0.0);
        assert!(dist.min().is_none());
    }

    #[test]
    fn test_min_ties_break_by_name() {
        let dist = RegionDistribution::from_values(["C", "B", "A", "A", "C", "B"]);
        assert_eq!(dist.min(), Some(("A", 2)));
    }

    #[test]
    fn test_by_count_desc() {
        let dist = RegionDistribution::from_values(["B", "A", "A", "C", "C"]);
        assert_eq!(dist.by_count_desc(), vec![("A", 2), ("C", 2), ("B", 1)]);
    }
}
