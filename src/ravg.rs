use log::{debug, info, warn};

use ravg_engine::builder::Builder;
use ravg_engine::*;
use snafu::{prelude::*, Snafu};

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use serde_json::Value as JSValue;
use text_diff::print_diff;

use crate::ravg::config_reader::*;

pub mod config_reader;
mod io_common;
mod io_csv;
mod io_json;
mod io_xlsx;

#[derive(Debug, Snafu)]
pub enum CliError {
    #[snafu(display("Error opening Excel file {path}"))]
    OpeningExcel {
        source: calamine::XlsxError,
        path: String,
    },
    #[snafu(display("The Excel file {path} has no worksheet"))]
    EmptyExcel { path: String },
    #[snafu(display("Worksheet {name} not found in {path}"))]
    MissingWorksheet { name: String, path: String },
    #[snafu(display("The Excel file {path} has several worksheets, the worksheet name must be provided"))]
    AmbiguousWorksheet { path: String },
    #[snafu(display("Line {lineno}: could not understand cell {content}"))]
    ExcelWrongCellType { lineno: usize, content: String },
    #[snafu(display("Column {column} not found in the header of {path}"))]
    MissingColumn { column: String, path: String },
    #[snafu(display("Error opening file {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON"))]
    ParsingJson { source: serde_json::Error },
    #[snafu(display("Error opening CSV file {path}"))]
    CsvOpen { source: csv::Error, path: String },
    #[snafu(display("Error parsing CSV line {lineno}"))]
    CsvLineParse { source: csv::Error, lineno: usize },
    #[snafu(display("Line {lineno} is missing the column {column}"))]
    LineTooShort { lineno: usize, column: String },
    #[snafu(display("Line {lineno}: could not parse the score {content:?}"))]
    ParsingScore { lineno: usize, content: String },
    #[snafu(display("Invalid value for {field}"))]
    InvalidValue { source: RavgErrors, field: String },
    #[snafu(display("The path {path} has no parent directory"))]
    MissingParentDir { path: String },
    #[snafu(display("Error writing the summary to {path}"))]
    WritingSummary {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("No ranking source: provide --input or rankingSources in the configuration"))]
    MissingSource {},

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type CliResult<T> = Result<T, CliError>;
pub type BCliResult<T> = Result<T, Box<CliError>>;

/// One row of a ranking source, before it is checked against the ranking mode.
#[derive(PartialEq, Debug, Clone)]
pub struct ParsedRanking {
    pub id: String,
    pub record_id: String,
    pub user_id: String,
    pub score: Option<f64>,
    pub score_y: Option<f64>,
    pub choice: Option<String>,
}

/// The settings that can be passed on the command line instead of the configuration file.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Overrides {
    pub input: Option<String>,
    pub input_type: Option<String>,
    pub formula: Option<String>,
    pub supervisor_weight: Option<f64>,
    pub owner: Option<String>,
    pub excel_worksheet_name: Option<String>,
}

/// Everything needed to score the records of a collection.
struct Collection {
    config: RavgConfig,
    mode: RankingMode,
    labels: QuaternaryLabels,
    collaborators: Vec<CollaboratorInfo>,
}

fn read_ranking_data(root_path: &Path, source: &RankingSource) -> CliResult<Vec<ParsedRanking>> {
    let p: PathBuf = root_path.join(&source.file_path);
    let p2 = p.as_path().display().to_string();
    info!("Attempting to read ranking file {:?}", p2);
    let res = match source.provider.as_str() {
        "json" => io_json::read_json_rankings(&p2),
        "csv" => io_csv::read_csv_rankings(&p2, source),
        "xlsx" => io_xlsx::read_excel_rankings(&p2, source),
        x => whatever!("Provider not implemented {:?}", x),
    };
    res.map_err(|e| *e)
}

// Records declared in the configuration come first, in their order, then the
// records only found in the rankings, in order of first appearance.
fn collect_records(declared: &[RecordEntry], rankings: &[ParsedRanking]) -> Vec<RecordEntry> {
    let mut res: Vec<RecordEntry> = declared.to_vec();
    for r in rankings.iter() {
        if !res.iter().any(|re| re.id == r.record_id) {
            res.push(RecordEntry {
                id: r.record_id.clone(),
                title: None,
            });
        }
    }
    res
}

fn score_record(collection: &Collection, rankings: &[&ParsedRanking]) -> CliResult<Builder> {
    let mut builder = Builder::new(&collection.config)
        .context(InvalidValueSnafu { field: "ravg" })?
        .collaborators(&collection.collaborators)
        .context(InvalidValueSnafu {
            field: "collaborators",
        })?
        .ranking_mode(collection.mode)
        .context(InvalidValueSnafu {
            field: "rankingMode",
        })?;

    for pr in rankings.iter() {
        let added = match (collection.mode, pr.score, pr.score_y, &pr.choice) {
            (RankingMode::Quaternary | RankingMode::Binary, _, _, Some(choice)) => {
                builder.add_choice(&pr.user_id, choice)
            }
            (RankingMode::TwoAxis, Some(x), Some(y), _) => {
                builder.add_ranking_two_axis(&pr.user_id, x, y)
            }
            (RankingMode::OneAxis | RankingMode::TwoAxis, Some(x), _, _) => {
                builder.add_ranking(&pr.user_id, x)
            }
            _ => {
                warn!(
                    "score_record: ranking {}: nothing to use for mode {}, skipping",
                    pr.id,
                    collection.mode.as_str()
                );
                Ok(())
            }
        };
        if let Err(e) = added {
            warn!("score_record: ranking {}: skipping: {}", pr.id, e);
        }
    }
    Ok(builder)
}

fn ravg_to_json(res: &RavgResult) -> JSValue {
    json!({
        "teamRavg": res.team_ravg,
        "superRavg": res.super_ravg,
        "rankCount": res.rank_count,
        "contributors": res.contributors,
    })
}

fn stats_to_json(stats: &Option<ScoreStats>) -> JSValue {
    match stats {
        Some(s) => json!({
            "avg": s.avg,
            "min": s.min,
            "max": s.max,
            "stddev": s.stddev,
        }),
        None => JSValue::Null,
    }
}

fn tally_to_json(res: &VoteTallyResult, collection: &Collection) -> JSValue {
    let votes: Vec<JSValue> = res
        .tally
        .iter()
        .map(|(choice, count)| {
            let label = match collection.mode {
                RankingMode::Quaternary => collection.labels.label(choice).to_string(),
                _ => choice.clone(),
            };
            json!({"choice": choice, "label": label, "votes": count})
        })
        .collect();
    json!({"tally": votes, "total": res.total, "winner": res.winner})
}

fn leaderboard_to_json(entries: &[LeaderboardEntry], records: &[RecordEntry]) -> Vec<JSValue> {
    let titles: HashMap<&str, &Option<String>> = records
        .iter()
        .map(|r| (r.id.as_str(), &r.title))
        .collect();
    entries
        .iter()
        .map(|e| {
            json!({
                "position": e.position,
                "record": e.record_id,
                "title": titles.get(e.record_id.as_str()),
                "ravg": e.ravg,
                "rankCount": e.rank_count,
            })
        })
        .collect()
}

fn progress_to_json(progress: &[UserProgress]) -> Vec<JSValue> {
    progress
        .iter()
        .map(|p| {
            json!({
                "user": p.user_id,
                "rankedRecords": p.ranked_records,
                "totalRecords": p.total_records,
                "completionPct": p.completion_pct,
            })
        })
        .collect()
}

fn build_summary_js(
    config: &CollectionConfig,
    collection: &Collection,
    records: &[RecordEntry],
    rankings: &[ParsedRanking],
) -> CliResult<JSValue> {
    let mut by_record: HashMap<&str, Vec<&ParsedRanking>> = HashMap::new();
    for pr in rankings.iter() {
        by_record.entry(pr.record_id.as_str()).or_default().push(pr);
    }

    let mut results: Vec<JSValue> = Vec::new();
    let mut one_axis_results: Vec<(String, RavgResult)> = Vec::new();
    let mut rankers_per_record: Vec<Vec<String>> = Vec::new();
    for record in records.iter() {
        let record_rankings: &[&ParsedRanking] = by_record
            .get(record.id.as_str())
            .map(|v| v.as_slice())
            .unwrap_or(&[]);
        debug!(
            "build_summary_js: record {:?}: {:?} rankings",
            record.id,
            record_rankings.len()
        );
        let builder = score_record(collection, record_rankings)?;
        rankers_per_record.push(builder.rankers());
        let mut js = json!({"record": record.id, "title": record.title});
        match collection.mode {
            RankingMode::OneAxis => {
                let res = builder.ravg();
                js["ravg"] = ravg_to_json(&res);
                js["stats"] = stats_to_json(&builder.stats());
                one_axis_results.push((record.id.clone(), res));
            }
            RankingMode::TwoAxis => {
                let res = builder.ravg_two_axis();
                js["x"] = ravg_to_json(&res.x);
                js["y"] = ravg_to_json(&res.y);
            }
            RankingMode::Quaternary | RankingMode::Binary => {
                js["votes"] = tally_to_json(&builder.tally(), collection);
            }
        }
        info!("Record {}: {}", record.id, js);
        results.push(js);
    }

    let c = OutputConfig {
        collection: config.output_settings.collection_name.clone(),
        formula: collection.config.formula.as_str().to_string(),
        ranking_mode: collection.mode.as_str().to_string(),
        super_ravg: collection.config.is_super_ravg_active(),
    };
    let leaderboard = leaderboard_to_json(&build_leaderboard(&one_axis_results), records);
    let progress =
        progress_to_json(&user_progress(&collection.collaborators, &rankers_per_record));
    Ok(json!({
        "config": c,
        "results": results,
        "leaderboard": leaderboard,
        "progress": progress,
    }))
}

fn apply_overrides(config: &mut CollectionConfig, overrides: &Overrides) {
    if let Some(formula) = overrides.formula.clone() {
        info!("Overriding the formula with {:?}", formula);
        config.ravg.formula = Some(formula);
    }
    if let Some(weight) = overrides.supervisor_weight {
        info!("Overriding the supervisor weight with {:?}", weight);
        config.ravg.supervisor_weight = Some(weight);
    }
    if let Some(owner) = overrides.owner.clone() {
        info!("Overriding the owner with {:?}", owner);
        config.ravg.owner_id = Some(owner);
    }
}

// The configuration used when only an input file is given.
fn default_config(input_path: &str, overrides: &Overrides) -> CollectionConfig {
    CollectionConfig {
        output_settings: OutputSettings {
            collection_name: io_common::simplify_file_name(input_path),
            description: None,
            output_directory: None,
        },
        ranking_mode: None,
        quaternary_labels: None,
        ravg: RavgSettings {
            formula: None,
            member_weights: None,
            supervisor_weight: None,
            owner_id: overrides.owner.clone(),
        },
        collaborators: None,
        records: None,
        ranking_sources: Vec::new(),
    }
}

fn write_summary(pretty_js: &str, out: &Option<String>, config: &CollectionConfig) -> CliResult<()> {
    let out_path: Option<String> = match out {
        Some(x) if x == "stdout" => None,
        Some(x) => Some(x.clone()),
        None => config
            .output_settings
            .output_directory
            .clone()
            .map(|d| Path::new(&d).join("summary.json").display().to_string()),
    };
    match out_path {
        Some(path) => {
            info!("Writing summary to {:?}", path);
            fs::write(&path, pretty_js).context(WritingSummarySnafu { path })?;
        }
        None => {
            println!("{}", pretty_js);
        }
    }
    Ok(())
}

/// Reads a collection, scores all its records and writes the summary.
///
/// Arguments:
/// * `config_path` the JSON description of the collection. Optional if an input is
/// given in the overrides.
/// * `out` where to write the summary: a file path, `stdout`, or nothing to use the
/// output directory of the configuration (or the standard output).
/// * `check_summary_path` a reference summary. The run fails if the computed summary
/// differs from it.
pub fn run_collection(
    config_path: Option<String>,
    overrides: &Overrides,
    out: Option<String>,
    check_summary_path: Option<String>,
) -> CliResult<()> {
    let (mut config, root_p): (CollectionConfig, PathBuf) = match (&config_path, &overrides.input) {
        (Some(path), _) => {
            let config = read_config(path)?;
            let root_p = Path::new(path)
                .parent()
                .context(MissingParentDirSnafu { path: path.clone() })?
                .to_path_buf();
            (config, root_p)
        }
        (None, Some(input)) => (default_config(input, overrides), PathBuf::new()),
        (None, None) => return MissingSourceSnafu {}.fail(),
    };
    apply_overrides(&mut config, overrides);

    // The input given on the command line replaces the sources of the configuration.
    // It is not relative to the configuration file.
    let (sources, root_p) = match &overrides.input {
        Some(input) => {
            let mut source = RankingSource::from_path(
                overrides.input_type.as_deref().unwrap_or("json"),
                input,
            );
            source.excel_worksheet_name = overrides.excel_worksheet_name.clone();
            (vec![source], PathBuf::new())
        }
        None => (config.ranking_sources.clone(), root_p),
    };
    info!("config: {:?}", config);

    let collection = Collection {
        config: validate_ravg_config(&config.ravg)?,
        mode: validate_ranking_mode(&config.ranking_mode)?,
        labels: validate_quaternary_labels(&config.quaternary_labels),
        collaborators: validate_collaborators(&config.collaborators.clone().unwrap_or_default())?,
    };

    if sources.is_empty() {
        return MissingSourceSnafu {}.fail();
    }

    let mut data: Vec<ParsedRanking> = Vec::new();
    for source in sources.iter() {
        let mut file_data = read_ranking_data(&root_p, source)?;
        data.append(&mut file_data);
    }
    info!("Read {:?} rankings", data.len());

    let records = collect_records(&config.records.clone().unwrap_or_default(), &data);
    let result_js = build_summary_js(&config, &collection, &records, &data)?;
    let pretty_js_stats = serde_json::to_string_pretty(&result_js).context(ParsingJsonSnafu {})?;
    write_summary(&pretty_js_stats, &out, &config)?;

    // The reference summary, if provided for comparison
    if let Some(summary_p) = check_summary_path {
        let summary_ref = read_summary(summary_p)?;
        let pretty_js_summary_ref =
            serde_json::to_string_pretty(&summary_ref).context(ParsingJsonSnafu {})?;
        if pretty_js_summary_ref != pretty_js_stats {
            warn!("Found differences with the reference summary");
            print_diff(
                pretty_js_summary_ref.as_str(),
                pretty_js_stats.as_ref(),
                "\n",
            );
            whatever!("Difference detected between calculated summary and reference summary")
        }
    }

    Ok(())
}

#[cfg(test)]
fn run_collection_test(test_name: &str, config_lpath: &str, summary_lpath: &str) -> CliResult<()> {
    let _ = env_logger::builder().is_test(true).try_init();
    let test_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/data");
    info!("Running test {}", test_name);
    run_collection(
        Some(format!("{}/{}/{}", test_dir, test_name, config_lpath)),
        &Overrides::default(),
        Some("stdout".to_string()),
        Some(format!("{}/{}/{}", test_dir, test_name, summary_lpath)),
    )
}

#[cfg(test)]
pub fn test_wrapper(test_name: &str) {
    let res = run_collection_test(
        test_name,
        format!("{}_config.json", test_name).as_str(),
        format!("{}_expected_summary.json", test_name).as_str(),
    );
    if let Err(e) = res {
        panic!("Test {} failed: {}", test_name, e);
    }
}
