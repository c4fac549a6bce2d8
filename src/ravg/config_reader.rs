use crate::ravg::*;

use serde::{Deserialize, Serialize};
use serde_json::Value as JSValue;
use std::collections::HashMap;

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputSettings {
    #[serde(rename = "collectionName")]
    pub collection_name: String,
    #[serde(rename = "description")]
    pub description: Option<String>,
    #[serde(rename = "outputDirectory")]
    pub output_directory: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub collection: String,
    pub formula: String,
    #[serde(rename = "rankingMode")]
    pub ranking_mode: String,
    #[serde(rename = "superRavg")]
    pub super_ravg: bool,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RavgSettings {
    pub formula: Option<String>,
    #[serde(rename = "memberWeights")]
    pub member_weights: Option<HashMap<String, f64>>,
    #[serde(rename = "supervisorWeight")]
    pub supervisor_weight: Option<f64>,
    #[serde(rename = "ownerId")]
    pub owner_id: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CollaboratorEntry {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub role: String,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RecordEntry {
    pub id: String,
    pub title: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct QuaternaryLabelsEntry {
    pub a: Option<String>,
    pub b: Option<String>,
    pub c: Option<String>,
    pub d: Option<String>,
}

#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct RankingSource {
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: String,
    #[serde(rename = "recordColumn")]
    pub record_column: Option<String>,
    #[serde(rename = "userColumn")]
    pub user_column: Option<String>,
    #[serde(rename = "scoreColumn")]
    pub score_column: Option<String>,
    #[serde(rename = "scoreYColumn")]
    pub score_y_column: Option<String>,
    #[serde(rename = "choiceColumn")]
    pub choice_column: Option<String>,
    #[serde(rename = "excelWorksheetName")]
    pub excel_worksheet_name: Option<String>,
}

impl RankingSource {
    pub fn from_path(provider: &str, file_path: &str) -> RankingSource {
        RankingSource {
            provider: provider.to_string(),
            file_path: file_path.to_string(),
            record_column: None,
            user_column: None,
            score_column: None,
            score_y_column: None,
            choice_column: None,
            excel_worksheet_name: None,
        }
    }

    /// The names of the columns, with the defaults filled in.
    pub fn columns(&self) -> SourceColumns {
        let col = |x: &Option<String>, default: &str| x.clone().unwrap_or(default.to_string());
        SourceColumns {
            record: col(&self.record_column, "record_id"),
            user: col(&self.user_column, "user_id"),
            score: col(&self.score_column, "score"),
            score_y: col(&self.score_y_column, "score_y"),
            choice: col(&self.choice_column, "choice"),
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SourceColumns {
    pub record: String,
    pub user: String,
    pub score: String,
    pub score_y: String,
    pub choice: String,
}

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct CollectionConfig {
    #[serde(rename = "outputSettings")]
    pub output_settings: OutputSettings,
    #[serde(rename = "rankingMode")]
    pub ranking_mode: Option<String>,
    #[serde(rename = "quaternaryLabels")]
    pub quaternary_labels: Option<QuaternaryLabelsEntry>,
    pub ravg: RavgSettings,
    pub collaborators: Option<Vec<CollaboratorEntry>>,
    pub records: Option<Vec<RecordEntry>>,
    #[serde(rename = "rankingSources")]
    pub ranking_sources: Vec<RankingSource>,
}

pub fn read_config(path: &str) -> CliResult<CollectionConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu {
        path: path.to_string(),
    })?;
    let config: CollectionConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(config)
}

pub fn read_summary(path: String) -> CliResult<JSValue> {
    let contents = fs::read_to_string(path.clone()).context(OpeningJsonSnafu { path })?;
    let js: JSValue = serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    Ok(js)
}

pub fn validate_ravg_config(settings: &RavgSettings) -> CliResult<RavgConfig> {
    let formula = match settings.formula.as_deref() {
        Some(f) => f.parse::<RavgFormula>().context(InvalidValueSnafu {
            field: "ravg.formula",
        })?,
        None => RavgFormula::default(),
    };
    let res = RavgConfig {
        formula,
        member_weights: settings.member_weights.clone().unwrap_or_default(),
        supervisor_weight: settings
            .supervisor_weight
            .unwrap_or(RavgConfig::DEFAULT_SUPERVISOR_WEIGHT),
        owner_id: settings.owner_id.clone().unwrap_or_default(),
    };
    if res.is_super_ravg_active() && res.owner_id.is_empty() {
        warn!(
            "validate_ravg_config: supervisorWeight is set without an ownerId, the Super RAVG is the Team RAVG"
        );
    }
    if !res.member_weights.is_empty() && res.formula != RavgFormula::Custom {
        warn!(
            "validate_ravg_config: memberWeights are only used by the custom formula, not {}",
            res.formula.as_str()
        );
    }
    res.validate().context(InvalidValueSnafu {
        field: "ravg",
    })?;
    Ok(res)
}

pub fn validate_collaborators(entries: &[CollaboratorEntry]) -> CliResult<Vec<CollaboratorInfo>> {
    let mut res: Vec<CollaboratorInfo> = Vec::new();
    for e in entries.iter() {
        let role = e
            .role
            .parse::<CollaboratorRole>()
            .context(InvalidValueSnafu {
                field: "collaborators.role",
            })?;
        res.push(CollaboratorInfo {
            user_id: e.user_id.clone(),
            role,
        });
    }
    Ok(res)
}

pub fn validate_ranking_mode(mode: &Option<String>) -> CliResult<RankingMode> {
    match mode {
        Some(m) => m.parse::<RankingMode>().context(InvalidValueSnafu {
            field: "rankingMode",
        }),
        None => Ok(RankingMode::default()),
    }
}

pub fn validate_quaternary_labels(labels: &Option<QuaternaryLabelsEntry>) -> QuaternaryLabels {
    let default = QuaternaryLabels::default();
    match labels {
        Some(l) => QuaternaryLabels {
            a: l.a.clone().unwrap_or(default.a),
            b: l.b.clone().unwrap_or(default.b),
            c: l.c.clone().unwrap_or(default.c),
            d: l.d.clone().unwrap_or(default.d),
        },
        None => default,
    }
}
