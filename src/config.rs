use directories::ProjectDirs;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::DrillError;
use crate::target::Target;

pub const CONFIG_VERSION: u32 = 2;

/// Darts thrown per question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ThrowUnit {
    One,
    Three,
}

impl ThrowUnit {
    pub fn count(&self) -> usize {
        match self {
            ThrowUnit::One => 1,
            ThrowUnit::Three => 3,
        }
    }
}

impl TryFrom<u8> for ThrowUnit {
    type Error = DrillError;

    fn try_from(v: u8) -> Result<Self, Self::Error> {
        match v {
            1 => Ok(ThrowUnit::One),
            3 => Ok(ThrowUnit::Three),
            other => Err(DrillError::invalid("throw unit", other, "must be 1 or 3")),
        }
    }
}

impl From<ThrowUnit> for u8 {
    fn from(unit: ThrowUnit) -> Self {
        unit.count() as u8
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum QuestionType {
    /// ask for the total scored
    Score,
    /// ask for what is left after the round
    Remaining,
    /// pick one of the two at random each round
    Both,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum JudgmentTiming {
    /// answer after each revealed dart
    Independent,
    /// answer once the whole round is visible
    Cumulative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PracticeConfig {
    pub throw_unit: ThrowUnit,
    pub question_type: QuestionType,
    pub judgment_timing: JudgmentTiming,
    pub starting_score: Option<i64>,
    pub std_dev_mm: f64,
    pub target: Option<Target>,
    pub randomize_target: bool,
    pub basic_targets: bool,
}

impl Default for PracticeConfig {
    fn default() -> Self {
        Self {
            throw_unit: ThrowUnit::One,
            question_type: QuestionType::Score,
            judgment_timing: JudgmentTiming::Cumulative,
            starting_score: Some(501),
            std_dev_mm: 20.0,
            target: None,
            randomize_target: false,
            basic_targets: false,
        }
    }
}

pub fn validate_std_dev(std_dev_mm: f64) -> crate::Result<f64> {
    if !std_dev_mm.is_finite() || std_dev_mm <= 0.0 {
        return Err(DrillError::invalid(
            "std dev",
            std_dev_mm,
            "must be a positive, finite number of millimetres",
        ));
    }
    Ok(std_dev_mm)
}

pub fn validate_starting_score(score: i64) -> crate::Result<i64> {
    if score <= 0 {
        return Err(DrillError::invalid(
            "starting score",
            score,
            "must be a positive integer",
        ));
    }
    Ok(score)
}

impl PracticeConfig {
    /// Whether rounds are subtracted from a running remaining score.
    pub fn tracks_remaining(&self) -> bool {
        self.question_type != QuestionType::Score
    }

    /// Basic practice: targets come from the shuffled basic-set bag.
    pub fn uses_target_bag(&self) -> bool {
        self.randomize_target && self.basic_targets
    }

    pub fn validate(&self) -> crate::Result<()> {
        validate_std_dev(self.std_dev_mm)?;
        match self.starting_score {
            Some(score) => {
                validate_starting_score(score)?;
            }
            None if self.tracks_remaining() => {
                return Err(DrillError::invalid(
                    "starting score",
                    "none",
                    "required when the remaining score is tracked",
                ));
            }
            None => {}
        }
        if let Some(target) = self.target {
            target.validate()?;
        }
        Ok(())
    }
}

/// A named, ready-made practice configuration.
#[derive(Debug, Clone)]
pub struct Preset {
    pub id: &'static str,
    pub description: &'static str,
    pub config: PracticeConfig,
}

pub fn presets() -> Vec<Preset> {
    let base = PracticeConfig::default();
    vec![
        Preset {
            id: "score-1",
            description: "single darts at T20, name the score",
            config: base.clone(),
        },
        Preset {
            id: "score-3",
            description: "three-dart visits at T20, name the total",
            config: PracticeConfig {
                throw_unit: ThrowUnit::Three,
                ..base.clone()
            },
        },
        Preset {
            id: "remaining-501",
            description: "play down from 501, name what is left",
            config: PracticeConfig {
                throw_unit: ThrowUnit::Three,
                question_type: QuestionType::Remaining,
                ..base.clone()
            },
        },
        Preset {
            id: "checkout-170",
            description: "finish from 170 with mixed questions",
            config: PracticeConfig {
                throw_unit: ThrowUnit::Three,
                question_type: QuestionType::Both,
                starting_score: Some(170),
                std_dev_mm: 15.0,
                ..base.clone()
            },
        },
        Preset {
            id: "checkout-40",
            description: "double practice from 40 with a tight grouping",
            config: PracticeConfig {
                question_type: QuestionType::Remaining,
                starting_score: Some(40),
                std_dev_mm: 8.0,
                ..base.clone()
            },
        },
        Preset {
            id: "basic-drill",
            description: "every single, double, triple and bull in shuffled order",
            config: PracticeConfig {
                question_type: QuestionType::Both,
                randomize_target: true,
                basic_targets: true,
                ..base
            },
        },
    ]
}

pub fn find_preset(id: &str) -> crate::Result<PracticeConfig> {
    presets()
        .into_iter()
        .find(|p| p.id == id)
        .map(|p| p.config)
        .ok_or_else(|| DrillError::UnknownPreset(id.to_string()))
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredConfig {
    version: u32,
    practice: PracticeConfig,
}

/// The pre-versioning layout: one flat camelCase object with the target
/// split into kind and number.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyConfig {
    throw_unit: Option<u8>,
    question_type: Option<QuestionType>,
    judgment_timing: Option<JudgmentTiming>,
    starting_score: Option<i64>,
    #[serde(rename = "stdDevMM")]
    std_dev_mm: Option<f64>,
    target_type: Option<String>,
    target_number: Option<u8>,
    is_randomize_target: Option<bool>,
    use_basic_targets: Option<bool>,
}

impl LegacyConfig {
    fn target(&self) -> Option<Target> {
        let kind = self.target_type.as_deref()?.to_ascii_uppercase();
        match (kind.as_str(), self.target_number) {
            ("SINGLE", Some(n)) => Target::single(n).ok(),
            ("DOUBLE", Some(n)) => Target::double(n).ok(),
            ("TRIPLE", Some(n)) => Target::triple(n).ok(),
            ("BULL", Some(25)) => Some(Target::OuterBull),
            ("BULL", _) => Some(Target::Bull),
            _ => None,
        }
    }

    fn into_config(self) -> Option<PracticeConfig> {
        let defaults = PracticeConfig::default();
        let throw_unit = match self.throw_unit {
            Some(v) => ThrowUnit::try_from(v).ok()?,
            None => defaults.throw_unit,
        };
        let cfg = PracticeConfig {
            throw_unit,
            question_type: self.question_type.unwrap_or(defaults.question_type),
            judgment_timing: self.judgment_timing.unwrap_or(defaults.judgment_timing),
            starting_score: self.starting_score.or(defaults.starting_score),
            std_dev_mm: self.std_dev_mm.unwrap_or(defaults.std_dev_mm),
            target: self.target(),
            randomize_target: self.is_randomize_target.unwrap_or(false),
            basic_targets: self.use_basic_targets.unwrap_or(false),
        };
        Some(cfg)
    }
}

/// Brings any stored document we know about up to the current shape.
/// Returns `None` for documents that are neither the current nor the legacy
/// layout, or that describe an invalid configuration.
pub fn migrate(value: serde_json::Value) -> Option<PracticeConfig> {
    let cfg = match value.get("version").and_then(|v| v.as_u64()) {
        Some(v) if v == CONFIG_VERSION as u64 => {
            serde_json::from_value::<StoredConfig>(value).ok()?.practice
        }
        Some(_) => return None,
        None => serde_json::from_value::<LegacyConfig>(value)
            .ok()?
            .into_config()?,
    };
    cfg.validate().ok()?;
    Some(cfg)
}

pub trait ConfigStore {
    fn load(&self) -> PracticeConfig;
    fn save(&self, cfg: &PracticeConfig) -> crate::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "dartdrill") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("dartdrill_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> PracticeConfig {
        let Ok(bytes) = fs::read(&self.path) else {
            return PracticeConfig::default();
        };
        let migrated = serde_json::from_slice::<serde_json::Value>(&bytes)
            .ok()
            .and_then(migrate);
        match migrated {
            Some(cfg) => cfg,
            None => {
                warn!(
                    "ignoring unreadable practice config at {}",
                    self.path.display()
                );
                PracticeConfig::default()
            }
        }
    }

    fn save(&self, cfg: &PracticeConfig) -> crate::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let doc = StoredConfig {
            version: CONFIG_VERSION,
            practice: cfg.clone(),
        };
        let data = serde_json::to_vec_pretty(&doc)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}
