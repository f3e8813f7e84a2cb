// src/router/regions.rs

use serde::{Deserialize, Serialize};

/// Regional upstream clusters. Each player's data is served exclusively by
/// one cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegionCluster {
    Americas,
    Europe,
    Asia,
    Sea,
}

/// Default cluster for universal account endpoints.
pub const DEFAULT_CLUSTER: RegionCluster = RegionCluster::Americas;

/// Cluster answering active-region discovery calls, regardless of where the
/// player's data eventually lives.
pub const DISCOVERY_CLUSTER: RegionCluster = RegionCluster::Americas;

impl RegionCluster {
    pub fn as_str(&self) -> &'static str {
        match self {
            RegionCluster::Americas => "americas",
            RegionCluster::Europe => "europe",
            RegionCluster::Asia => "asia",
            RegionCluster::Sea => "sea",
        }
    }

    pub fn host(&self) -> String {
        format!("https://{}.api.riotgames.com", self.as_str())
    }

    pub fn all() -> [RegionCluster; 4] {
        [
            RegionCluster::Americas,
            RegionCluster::Europe,
            RegionCluster::Asia,
            RegionCluster::Sea,
        ]
    }

    /// Parse a cluster name as returned by active-region discovery.
    pub fn from_cluster_name(name: &str) -> Option<RegionCluster> {
        match name.to_lowercase().as_str() {
            "americas" => Some(RegionCluster::Americas),
            "europe" => Some(RegionCluster::Europe),
            "asia" => Some(RegionCluster::Asia),
            "sea" => Some(RegionCluster::Sea),
            _ => None,
        }
    }
}

/// Canonical platform/prefix → cluster mapping, shared by inbound hint
/// parsing, match-id parsing and discovery-response validation.
///
/// Exact platform codes are tried first; the south-east-asia platforms only
/// match exactly. Otherwise the leading two letters decide.
pub fn cluster_for_platform(code: &str) -> Option<RegionCluster> {
    let code = code.to_lowercase();
    match code.as_str() {
        "na1" | "br1" | "la1" | "la2" => return Some(RegionCluster::Americas),
        "euw1" | "eun1" | "tr1" | "ru" => return Some(RegionCluster::Europe),
        "kr" | "jp1" => return Some(RegionCluster::Asia),
        // South-east-asia sub-group, exact platform codes
        "oc1" | "ph2" | "sg2" | "th2" | "tw2" | "vn2" => return Some(RegionCluster::Sea),
        _ => {}
    }
    match code.get(..2) {
        Some("na") | Some("br") | Some("la") => Some(RegionCluster::Americas),
        Some("eu") | Some("tr") | Some("ru") => Some(RegionCluster::Europe),
        Some("kr") | Some("jp") => Some(RegionCluster::Asia),
        Some("oc") | Some("ph") | Some("sg") | Some("th") | Some("tw") | Some("vn") => {
            Some(RegionCluster::Sea)
        }
        _ => None,
    }
}

/// Map an active-region discovery value: accepts either a cluster name or a
/// platform code, rejects anything unmapped.
pub fn cluster_for_discovery_value(value: &str) -> Option<RegionCluster> {
    RegionCluster::from_cluster_name(value).or_else(|| cluster_for_platform(value))
}

/// Cluster for a match id of the form `{PLATFORM}_{number}` (e.g. `KR_987654`).
pub fn cluster_for_match_id(match_id: &str) -> Option<RegionCluster> {
    let platform = match_id.split('_').next()?;
    if platform.is_empty() {
        return None;
    }
    cluster_for_platform(platform)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_PLATFORMS: [&str; 16] = [
        "na1", "br1", "la1", "la2", "euw1", "eun1", "tr1", "ru", "kr", "jp1", "oc1", "ph2",
        "sg2", "th2", "tw2", "vn2",
    ];

    #[test]
    fn test_every_platform_maps_to_exactly_one_cluster() {
        for platform in ALL_PLATFORMS {
            let cluster = cluster_for_platform(platform);
            assert!(cluster.is_some(), "unmapped platform {}", platform);
            let claims = RegionCluster::all()
                .iter()
                .filter(|c| cluster == Some(**c))
                .count();
            assert_eq!(claims, 1, "platform {} claimed by {} clusters", platform, claims);
        }
    }

    #[test]
    fn test_unknown_platform_is_unresolved() {
        assert_eq!(cluster_for_platform("xx9"), None);
        assert_eq!(cluster_for_platform(""), None);
    }

    #[test]
    fn test_match_id_prefix_resolution() {
        assert_eq!(cluster_for_match_id("KR_987654"), Some(RegionCluster::Asia));
        assert_eq!(
            cluster_for_match_id("NA1_4567890"),
            Some(RegionCluster::Americas)
        );
        assert_eq!(cluster_for_match_id("OC1_111"), Some(RegionCluster::Sea));
        assert_eq!(cluster_for_match_id("ZZ_123"), None);
        assert_eq!(cluster_for_match_id("_123"), None);
    }

    #[test]
    fn test_discovery_value_accepts_both_domains() {
        assert_eq!(
            cluster_for_discovery_value("americas"),
            Some(RegionCluster::Americas)
        );
        assert_eq!(
            cluster_for_discovery_value("kr"),
            Some(RegionCluster::Asia)
        );
        assert_eq!(cluster_for_discovery_value("atlantis"), None);
    }

    #[test]
    fn test_sea_subgroup_is_exact_and_prefix() {
        assert_eq!(cluster_for_platform("sg2"), Some(RegionCluster::Sea));
        assert_eq!(cluster_for_platform("vn2"), Some(RegionCluster::Sea));
        assert_eq!(cluster_for_platform("tw2"), Some(RegionCluster::Sea));
    }

    #[test]
    fn test_cluster_hosts() {
        assert_eq!(
            RegionCluster::Asia.host(),
            "https://asia.api.riotgames.com"
        );
        assert_eq!(RegionCluster::Sea.as_str(), "sea");
    }
}
