//! Region tree scraped from the site's quick-search script.
//!
//! The script declares every prefecture as
//!
//! ```text
//! KenData("北海道", "010000", new Array(
//!     LrgData("札幌", "010200"),
//!     LrgData("函館", "010800")
//! ))
//! ```
//!
//! Subregion declarations only make sense relative to the region that
//! encloses them, so parsing happens in two passes: regions first, then the
//! subregions inside each region's argument list.

use crate::urls::{ListingTarget, listing_url};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static REGION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?s)KenData\("(?P<region>[^"]+)",\s*"(?P<region_code>\d+)",\s*new\s*Array\((?P<subregions>.*?)\)\s*\)"#,
    )
    .expect("region pattern is valid")
});

// No closing paren: the region pattern's lazy terminator swallows the one
// belonging to the last declaration of each list.
static SUBREGION_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"LrgData\("(?P<subregion>[^"]+)",\s*"(?P<subregion_code>\d+)""#)
        .expect("subregion pattern is valid")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subregion {
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    pub code: String,
    pub subregions: Vec<Subregion>,
}

/// How a prefecture code from the base page selects regions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionMatch {
    /// Region code equals the prefecture code.
    #[default]
    Exact,
    /// Prefecture code appears anywhere inside the region code.
    Substring,
}

impl RegionMatch {
    pub fn matches(&self, prefecture_code: &str, region_code: &str) -> bool {
        match self {
            RegionMatch::Exact => prefecture_code == region_code,
            RegionMatch::Substring => region_code.contains(prefecture_code),
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "exact" => Some(RegionMatch::Exact),
            "substring" => Some(RegionMatch::Substring),
            _ => None,
        }
    }
}

pub fn extract_regions(raw_script: &str) -> Vec<Region> {
    REGION_PATTERN
        .captures_iter(raw_script)
        .map(|caps| {
            let subregions = SUBREGION_PATTERN
                .captures_iter(&caps["subregions"])
                .map(|sub| Subregion {
                    name: sub["subregion"].to_string(),
                    code: sub["subregion_code"].to_string(),
                })
                .collect();

            Region {
                name: caps["region"].to_string(),
                code: caps["region_code"].to_string(),
                subregions,
            }
        })
        .collect()
}

/// One listing target per (prefecture, subregion) pair.
///
/// Order follows the prefecture codes, then the regions in script order,
/// then each region's subregions.
pub fn listing_targets(
    prefecture_codes: &[String],
    regions: &[Region],
    region_match: RegionMatch,
    base_url: &str,
) -> Vec<ListingTarget> {
    let mut targets = Vec::new();
    for prefecture_code in prefecture_codes {
        for region in regions
            .iter()
            .filter(|r| region_match.matches(prefecture_code, &r.code))
        {
            for subregion in &region.subregions {
                targets.push(ListingTarget {
                    prefecture_code: prefecture_code.clone(),
                    subregion_code: subregion.code.clone(),
                    url: listing_url(base_url, prefecture_code, &subregion.code),
                });
            }
        }
    }
    targets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn synthetic_script(shape: &[usize]) -> String {
        let mut script = String::from("var qs = new Array(\n");
        for (r, width) in shape.iter().enumerate() {
            let subs: Vec<String> = (0..*width)
                .map(|s| format!("LrgData(\"sub{}-{}\", \"{:02}{:02}00\")", r, s, r, s))
                .collect();
            script.push_str(&format!(
                "KenData(\"region{}\", \"{:02}0000\", new Array(\n  {}\n) ),\n",
                r,
                r,
                subs.join(",\n  ")
            ));
        }
        script.push_str(");\n");
        script
    }

    #[test]
    fn test_extract_regions_matches_declaration_counts() {
        let shapes: [&[usize]; 4] = [&[1], &[3, 1, 4], &[2, 2, 2, 2, 2], &[7, 1]];
        for shape in shapes {
            let regions = extract_regions(&synthetic_script(shape));
            assert_eq!(regions.len(), shape.len(), "shape {:?}", shape);
            for (region, width) in regions.iter().zip(shape.iter()) {
                assert_eq!(region.subregions.len(), *width, "shape {:?}", shape);
            }
        }
    }

    #[test]
    fn test_subregions_stay_with_their_parent() {
        let script = r#"
            KenData("北海道", "010000", new Array(
                LrgData("札幌・定山渓", "010200"),
                LrgData("函館・湯の川・大沼", "010800")
            ) ),
            KenData("青森県", "020000", new Array(
                LrgData("青森・浅虫温泉", "020200")
            ) )
        "#;

        let regions = extract_regions(script);

        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].name, "北海道");
        assert_eq!(regions[0].code, "010000");
        assert_eq!(
            regions[0].subregions,
            vec![
                Subregion {
                    name: "札幌・定山渓".to_string(),
                    code: "010200".to_string()
                },
                Subregion {
                    name: "函館・湯の川・大沼".to_string(),
                    code: "010800".to_string()
                },
            ]
        );
        assert_eq!(regions[1].subregions.len(), 1);
        assert_eq!(regions[1].subregions[0].code, "020200");
    }

    #[test]
    fn test_compact_declarations_keep_last_subregion() {
        let script = r#"KenData("東京都","130000",new Array(LrgData("東京23区内","131000"),LrgData("八王子・立川","132000")));KenData("神奈川県","140000",new Array(LrgData("横浜","141000")));"#;

        let regions = extract_regions(script);

        assert_eq!(regions.len(), 2);
        let codes: Vec<&str> = regions[0]
            .subregions
            .iter()
            .map(|s| s.code.as_str())
            .collect();
        assert_eq!(codes, vec!["131000", "132000"]);
        assert_eq!(regions[1].subregions[0].name, "横浜");
    }

    #[test]
    fn test_region_with_empty_array_has_no_subregions() {
        let regions = extract_regions(r#"KenData("沖縄県", "470000", new Array() )"#);
        assert_eq!(regions.len(), 1);
        assert!(regions[0].subregions.is_empty());
    }

    #[test]
    fn test_garbage_yields_no_regions() {
        assert!(extract_regions("").is_empty());
        assert!(extract_regions("function foo() { return 1; }").is_empty());
    }

    #[test]
    fn test_region_match_strategies() {
        assert!(RegionMatch::Exact.matches("130000", "130000"));
        assert!(!RegionMatch::Exact.matches("13", "130000"));
        assert!(RegionMatch::Substring.matches("13", "130000"));
        assert!(!RegionMatch::Substring.matches("140000", "130000"));
        assert_eq!(RegionMatch::from_str("SUBSTRING"), Some(RegionMatch::Substring));
        assert_eq!(RegionMatch::from_str("fuzzy"), None);
    }

    #[test]
    fn test_listing_targets_follow_prefecture_then_subregion_order() {
        let regions = extract_regions(&synthetic_script(&[2, 1]));
        let prefectures = vec!["010000".to_string(), "000000".to_string()];

        let targets = listing_targets(
            &prefectures,
            &regions,
            RegionMatch::Exact,
            "https://www.jalan.net/",
        );

        let urls: Vec<&str> = targets.iter().map(|t| t.url.as_str()).collect();
        assert_eq!(
            urls,
            vec![
                "https://www.jalan.net/010000/LRG_010000/",
                "https://www.jalan.net/000000/LRG_000000/",
                "https://www.jalan.net/000000/LRG_000100/",
            ]
        );
        assert_eq!(targets[0].prefecture_code, "010000");
        assert_eq!(targets[0].subregion_code, "010000");
    }

    #[test]
    fn test_unknown_prefecture_yields_no_targets() {
        let regions = extract_regions(&synthetic_script(&[2]));
        let targets = listing_targets(
            &["990000".to_string()],
            &regions,
            RegionMatch::Exact,
            "https://www.jalan.net",
        );
        assert!(targets.is_empty());
    }
}
