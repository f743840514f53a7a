//! Application-level configuration loading: scoring rules, point weights,
//! pool scoring, bout durations and weight categories.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "SHIAI_BACK_CONFIG_PATH";

/// Osaekomi hold durations (seconds) required to convert into each score tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OsaekomiRules {
    /// Seconds of hold needed to award a yuko.
    pub yuko: u32,
    /// Seconds of hold needed to award a waza-ri.
    pub wazari: u32,
    /// Seconds of hold that end the bout by ippon.
    pub ippon: u32,
}

impl Default for OsaekomiRules {
    fn default() -> Self {
        Self {
            yuko: 10,
            wazari: 15,
            ippon: 20,
        }
    }
}

impl OsaekomiRules {
    /// Thresholds must be strictly increasing to be meaningful.
    fn is_valid(&self) -> bool {
        self.yuko < self.wazari && self.wazari < self.ippon
    }
}

/// Rules the bout scoring engine needs to decide terminations and winners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringRules {
    /// Hold-to-score conversion thresholds.
    pub osaekomi: OsaekomiRules,
    /// Waza-ri count equivalent to an ippon.
    pub wazari_for_ippon: u8,
    /// Shido count that disqualifies the penalized side.
    pub shido_for_defeat: u8,
    /// Technical point weights used for confrontation totals.
    pub points: PointWeights,
    /// Regular bout duration in seconds.
    pub bout_duration_secs: u32,
    /// Golden-score period duration in seconds.
    pub golden_score_duration_secs: u32,
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self {
            osaekomi: OsaekomiRules::default(),
            wazari_for_ippon: 2,
            shido_for_defeat: 3,
            points: PointWeights::default(),
            bout_duration_secs: 240,
            golden_score_duration_secs: 180,
        }
    }
}

/// Technical point value of each scoring action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PointWeights {
    /// Value of an ippon.
    pub ippon: u32,
    /// Value of each waza-ri.
    pub wazari: u32,
    /// Value of each yuko.
    pub yuko: u32,
}

impl Default for PointWeights {
    fn default() -> Self {
        Self {
            ippon: 100,
            wazari: 10,
            yuko: 1,
        }
    }
}

/// Ranking points awarded per confrontation outcome in pool play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolRules {
    /// Points for winning a confrontation.
    pub points_victoire: i32,
    /// Points for losing a confrontation.
    pub points_defaite: i32,
    /// Points for a drawn confrontation.
    pub points_egalite: i32,
    /// Smallest allowed pool count for bulk creation.
    pub min_pools: usize,
    /// Largest allowed pool count for bulk creation.
    pub max_pools: usize,
}

impl Default for PoolRules {
    fn default() -> Self {
        Self {
            points_victoire: 1,
            points_defaite: 0,
            points_egalite: 0,
            min_pools: 1,
            max_pools: 10,
        }
    }
}

/// Weight-category codes per sex, plus the roster size cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRules {
    /// Male weight categories.
    pub male: Vec<String>,
    /// Female weight categories.
    pub female: Vec<String>,
    /// Maximum number of athletes a team may register.
    pub max_athletes_per_team: usize,
}

impl Default for CategoryRules {
    fn default() -> Self {
        Self {
            male: ["-60", "-66", "-73", "-81", "-90", "+90"]
                .map(String::from)
                .to_vec(),
            female: ["-48", "-52", "-57", "-63", "-70", "+70"]
                .map(String::from)
                .to_vec(),
            max_athletes_per_team: 20,
        }
    }
}

impl CategoryRules {
    /// Whether `weight` is a known category code for the given sex marker.
    pub fn is_valid_category(&self, sex: &str, weight: &str) -> bool {
        let set = match sex {
            "M" => &self.male,
            "F" => &self.female,
            _ => return false,
        };
        set.iter().any(|code| code == weight)
    }
}

#[derive(Debug, Clone, Default)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    /// Scoring engine rules.
    pub scoring: ScoringRules,
    /// Pool ranking rules.
    pub pools: PoolRules,
    /// Weight category sets.
    pub categories: CategoryRules,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to baked-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(path = %path.display(), "loaded tournament rules from config");
                    config.validated()
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Replace inconsistent sections with their defaults.
    fn validated(mut self) -> Self {
        if !self.scoring.osaekomi.is_valid() {
            warn!(
                yuko = self.scoring.osaekomi.yuko,
                wazari = self.scoring.osaekomi.wazari,
                ippon = self.scoring.osaekomi.ippon,
                "osaekomi thresholds are not strictly increasing; using defaults"
            );
            self.scoring.osaekomi = OsaekomiRules::default();
        }
        self
    }
}

#[derive(Debug, Deserialize, Default)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    osaekomi: Option<RawOsaekomi>,
    #[serde(default)]
    thresholds: Option<RawThresholds>,
    #[serde(default)]
    points: Option<RawPoints>,
    #[serde(default)]
    pools: Option<RawPools>,
    #[serde(default)]
    combat: Option<RawCombat>,
    #[serde(default)]
    categories: Option<RawCategories>,
}

#[derive(Debug, Deserialize)]
struct RawOsaekomi {
    yuko: u32,
    wazari: u32,
    ippon: u32,
}

#[derive(Debug, Deserialize)]
struct RawThresholds {
    wazari_for_ippon: u8,
    shido_for_defeat: u8,
}

#[derive(Debug, Deserialize)]
struct RawPoints {
    ippon: u32,
    wazari: u32,
    yuko: u32,
}

#[derive(Debug, Deserialize)]
struct RawPools {
    points_victoire: i32,
    points_defaite: i32,
    points_egalite: i32,
}

#[derive(Debug, Deserialize)]
struct RawCombat {
    duration_secs: u32,
    golden_score_duration_secs: u32,
}

#[derive(Debug, Deserialize)]
struct RawCategories {
    male: Vec<String>,
    female: Vec<String>,
    max_athletes_per_team: usize,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let mut config = Self::default();
        if let Some(raw) = value.osaekomi {
            config.scoring.osaekomi = OsaekomiRules {
                yuko: raw.yuko,
                wazari: raw.wazari,
                ippon: raw.ippon,
            };
        }
        if let Some(raw) = value.thresholds {
            config.scoring.wazari_for_ippon = raw.wazari_for_ippon;
            config.scoring.shido_for_defeat = raw.shido_for_defeat;
        }
        if let Some(raw) = value.points {
            config.scoring.points = PointWeights {
                ippon: raw.ippon,
                wazari: raw.wazari,
                yuko: raw.yuko,
            };
        }
        if let Some(raw) = value.pools {
            config.pools.points_victoire = raw.points_victoire;
            config.pools.points_defaite = raw.points_defaite;
            config.pools.points_egalite = raw.points_egalite;
        }
        if let Some(raw) = value.combat {
            config.scoring.bout_duration_secs = raw.duration_secs;
            config.scoring.golden_score_duration_secs = raw.golden_score_duration_secs;
        }
        if let Some(raw) = value.categories {
            config.categories = CategoryRules {
                male: raw.male,
                female: raw.female,
                max_athletes_per_team: raw.max_athletes_per_team,
            };
        }
        config
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_strictly_increasing() {
        assert!(OsaekomiRules::default().is_valid());
    }

    #[test]
    fn inverted_osaekomi_thresholds_fall_back_to_defaults() {
        let config = AppConfig {
            scoring: ScoringRules {
                osaekomi: OsaekomiRules {
                    yuko: 20,
                    wazari: 15,
                    ippon: 10,
                },
                ..ScoringRules::default()
            },
            ..AppConfig::default()
        }
        .validated();
        assert_eq!(config.scoring.osaekomi, OsaekomiRules::default());
    }

    #[test]
    fn category_lookup_is_sex_specific() {
        let categories = CategoryRules::default();
        assert!(categories.is_valid_category("M", "-73"));
        assert!(!categories.is_valid_category("F", "-73"));
        assert!(categories.is_valid_category("F", "+70"));
        assert!(!categories.is_valid_category("X", "-73"));
    }
}
