// ********* Input data structures ***********

use std::collections::HashMap;
use std::error::Error;
use std::fmt::Display;
use std::str::FromStr;

/// The numeric score given by one user to one record.
///
/// The scale is decided by the caller (for example 0 to 10).
#[derive(PartialEq, Debug, Clone)]
pub struct RankingInput {
    pub user_id: String,
    pub score: f64,
}

impl RankingInput {
    pub fn new(user_id: &str, score: f64) -> RankingInput {
        RankingInput {
            user_id: user_id.to_string(),
            score,
        }
    }
}

/// The role of a collaborator in a collection.
///
/// Only the owner is treated differently by the formulas.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash)]
pub enum CollaboratorRole {
    Owner,
    Contributor,
    Viewer,
}

impl CollaboratorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollaboratorRole::Owner => "owner",
            CollaboratorRole::Contributor => "contributor",
            CollaboratorRole::Viewer => "viewer",
        }
    }
}

impl FromStr for CollaboratorRole {
    type Err = RavgErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "owner" => Ok(CollaboratorRole::Owner),
            "contributor" => Ok(CollaboratorRole::Contributor),
            "viewer" => Ok(CollaboratorRole::Viewer),
            x => Err(RavgErrors::UnknownRole(x.to_string())),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct CollaboratorInfo {
    pub user_id: String,
    pub role: CollaboratorRole,
}

impl CollaboratorInfo {
    pub fn new(user_id: &str, role: CollaboratorRole) -> CollaboratorInfo {
        CollaboratorInfo {
            user_id: user_id.to_string(),
            role,
        }
    }
}

/// A categorical vote cast by one user on one record.
#[derive(Eq, PartialEq, Debug, Clone, Hash)]
pub struct ChoiceInput {
    pub user_id: String,
    pub choice: String,
}

impl ChoiceInput {
    pub fn new(user_id: &str, choice: &str) -> ChoiceInput {
        ChoiceInput {
            user_id: user_id.to_string(),
            choice: choice.to_string(),
        }
    }
}

// ******** Output data structures *********

/// The outcome of aggregating the rankings of one record.
#[derive(PartialEq, Debug, Clone)]
pub struct RavgResult {
    /// The consensus of the team. When the supervisor weighting is active, the
    /// owner is not part of it.
    pub team_ravg: f64,
    /// The team consensus blended with the owner's own score. Only present
    /// when the supervisor weighting is active.
    pub super_ravg: Option<f64>,
    pub rank_count: usize,
    /// The users who ranked, in input order.
    pub contributors: Vec<String>,
}

impl RavgResult {
    pub const EMPTY: RavgResult = RavgResult {
        team_ravg: 0.0,
        super_ravg: None,
        rank_count: 0,
        contributors: Vec::new(),
    };

    /// The value to show for this record: the Super RAVG when there is one,
    /// the Team RAVG otherwise.
    pub fn display_ravg(&self) -> f64 {
        self.super_ravg.unwrap_or(self.team_ravg)
    }
}

/// One RAVG per axis, for records ranked on a 2-axis grid.
#[derive(PartialEq, Debug, Clone)]
pub struct TwoAxisResult {
    pub x: RavgResult,
    pub y: RavgResult,
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct VoteTallyResult {
    /// Vote count per choice, in the order the choices were first seen.
    pub tally: Vec<(String, u64)>,
    pub total: u64,
    /// The choice with strictly the most votes. A shared top count has no winner.
    pub winner: Option<String>,
}

impl VoteTallyResult {
    pub fn count(&self, choice: &str) -> u64 {
        self.tally
            .iter()
            .find(|(c, _)| c == choice)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }
}

/// Descriptive statistics over the raw scores of a record.
#[derive(PartialEq, Debug, Clone)]
pub struct ScoreStats {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    /// Sample standard deviation. Undefined below two rankings.
    pub stddev: Option<f64>,
    pub rank_count: usize,
}

#[derive(PartialEq, Debug, Clone)]
pub struct LeaderboardEntry {
    /// Starts at 1. Records with the same RAVG share a position.
    pub position: u32,
    pub record_id: String,
    pub ravg: f64,
    pub rank_count: usize,
}

/// How far a user went through the records of a collection.
#[derive(PartialEq, Debug, Clone)]
pub struct UserProgress {
    pub user_id: String,
    pub ranked_records: usize,
    pub total_records: usize,
    /// Between 0 and 100.
    pub completion_pct: f64,
}

/// Errors raised while building or validating the inputs of the engine.
///
/// The aggregation functions themselves never fail.
#[derive(PartialEq, Debug, Clone)]
pub enum RavgErrors {
    UnknownFormula(String),
    UnknownRole(String),
    UnknownRankingMode(String),
    InvalidSupervisorWeight(f64),
    InvalidMemberWeight { user_id: String, weight: f64 },
    NonFiniteScore { user_id: String },
    UnknownChoice { user_id: String, choice: String },
}

impl Error for RavgErrors {}

impl Display for RavgErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RavgErrors::UnknownFormula(x) => write!(f, "unknown RAVG formula: {}", x),
            RavgErrors::UnknownRole(x) => write!(f, "unknown collaborator role: {}", x),
            RavgErrors::UnknownRankingMode(x) => write!(f, "unknown ranking mode: {}", x),
            RavgErrors::InvalidSupervisorWeight(w) => {
                write!(f, "supervisor weight must be at least 1.0, got {}", w)
            }
            RavgErrors::InvalidMemberWeight { user_id, weight } => {
                write!(f, "invalid weight {} for member {}", weight, user_id)
            }
            RavgErrors::NonFiniteScore { user_id } => {
                write!(f, "score of user {} is not a finite number", user_id)
            }
            RavgErrors::UnknownChoice { user_id, choice } => {
                write!(f, "user {} voted for unknown choice {}", user_id, choice)
            }
        }
    }
}

// ********* Configuration **********

/// The formula used to compute the Team RAVG.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Default)]
pub enum RavgFormula {
    /// Arithmetic mean of all the scores.
    #[default]
    SimpleMean,
    /// The owner counts twice, everyone else once.
    WeightedByRole,
    /// Trimmed mean: drops 10% of the scores (at least one) at each end.
    ExcludeOutliers,
    /// Per-member weights taken from the configuration.
    Custom,
}

impl RavgFormula {
    pub fn as_str(&self) -> &'static str {
        match self {
            RavgFormula::SimpleMean => "simple_mean",
            RavgFormula::WeightedByRole => "weighted_by_role",
            RavgFormula::ExcludeOutliers => "exclude_outliers",
            RavgFormula::Custom => "custom",
        }
    }
}

impl FromStr for RavgFormula {
    type Err = RavgErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "simple_mean" => Ok(RavgFormula::SimpleMean),
            "weighted_by_role" => Ok(RavgFormula::WeightedByRole),
            "exclude_outliers" => Ok(RavgFormula::ExcludeOutliers),
            "custom" => Ok(RavgFormula::Custom),
            x => Err(RavgErrors::UnknownFormula(x.to_string())),
        }
    }
}

/// The aggregation policy of a collection.
#[derive(PartialEq, Debug, Clone)]
pub struct RavgConfig {
    pub formula: RavgFormula,
    /// Only read by the custom formula. Missing members have a weight of 1.
    pub member_weights: HashMap<String, f64>,
    /// Values above 1.0 turn on the Super RAVG.
    pub supervisor_weight: f64,
    pub owner_id: String,
}

impl RavgConfig {
    pub const DEFAULT_SUPERVISOR_WEIGHT: f64 = 1.0;

    pub fn new(owner_id: &str) -> RavgConfig {
        RavgConfig {
            formula: RavgFormula::SimpleMean,
            member_weights: HashMap::new(),
            supervisor_weight: RavgConfig::DEFAULT_SUPERVISOR_WEIGHT,
            owner_id: owner_id.to_string(),
        }
    }

    pub fn with_formula(self, formula: RavgFormula) -> RavgConfig {
        RavgConfig { formula, ..self }
    }

    pub fn with_supervisor_weight(self, supervisor_weight: f64) -> RavgConfig {
        RavgConfig {
            supervisor_weight,
            ..self
        }
    }

    pub fn with_member_weight(mut self, user_id: &str, weight: f64) -> RavgConfig {
        self.member_weights.insert(user_id.to_string(), weight);
        self
    }

    pub fn is_super_ravg_active(&self) -> bool {
        self.supervisor_weight > 1.0
    }

    /// Checks the invariants expected from a stored configuration.
    ///
    /// The engine tolerates configurations that fail this check.
    pub fn validate(&self) -> Result<(), RavgErrors> {
        if !self.supervisor_weight.is_finite() || self.supervisor_weight < 1.0 {
            return Err(RavgErrors::InvalidSupervisorWeight(self.supervisor_weight));
        }
        for (user_id, &weight) in self.member_weights.iter() {
            if !weight.is_finite() || weight < 0.0 {
                return Err(RavgErrors::InvalidMemberWeight {
                    user_id: user_id.clone(),
                    weight,
                });
            }
        }
        Ok(())
    }
}

/// How the users of a collection express their opinion on a record.
#[derive(Eq, PartialEq, Debug, Clone, Copy, Hash, Default)]
pub enum RankingMode {
    /// A single score.
    #[default]
    OneAxis,
    /// Two independent scores, placed on a grid.
    TwoAxis,
    /// One of four choices: a, b, c, d.
    Quaternary,
    /// Yes or no.
    Binary,
}

impl RankingMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RankingMode::OneAxis => "one_axis",
            RankingMode::TwoAxis => "two_axis",
            RankingMode::Quaternary => "quaternary",
            RankingMode::Binary => "binary",
        }
    }

    /// True for the modes that are tallied rather than averaged.
    pub fn is_categorical(&self) -> bool {
        matches!(self, RankingMode::Quaternary | RankingMode::Binary)
    }

    /// The accepted choice keys. Empty for the numeric modes.
    pub fn allowed_choices(&self) -> &'static [&'static str] {
        match self {
            RankingMode::OneAxis | RankingMode::TwoAxis => &[],
            RankingMode::Quaternary => &["a", "b", "c", "d"],
            RankingMode::Binary => &["yes", "no"],
        }
    }
}

impl FromStr for RankingMode {
    type Err = RavgErrors;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "one_axis" => Ok(RankingMode::OneAxis),
            "two_axis" => Ok(RankingMode::TwoAxis),
            "quaternary" => Ok(RankingMode::Quaternary),
            "binary" => Ok(RankingMode::Binary),
            x => Err(RavgErrors::UnknownRankingMode(x.to_string())),
        }
    }
}

/// Display labels for the four quaternary choices.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct QuaternaryLabels {
    pub a: String,
    pub b: String,
    pub c: String,
    pub d: String,
}

impl QuaternaryLabels {
    /// The label for a choice key, or the key itself when it is not one of a, b, c, d.
    pub fn label<'a>(&'a self, choice: &'a str) -> &'a str {
        match choice {
            "a" => self.a.as_str(),
            "b" => self.b.as_str(),
            "c" => self.c.as_str(),
            "d" => self.d.as_str(),
            _ => choice,
        }
    }
}

impl Default for QuaternaryLabels {
    fn default() -> Self {
        QuaternaryLabels {
            a: "A".to_string(),
            b: "B".to_string(),
            c: "C".to_string(),
            d: "D".to_string(),
        }
    }
}
