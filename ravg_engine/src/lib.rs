mod config;
mod tally;
use log::{debug, info};

use std::collections::HashMap;

pub use crate::config::*;
pub use crate::tally::calculate_vote_tally;

pub mod builder;
pub mod manual;

// Share of the scores dropped at each end by the outlier formula.
const OUTLIER_TRIM_RATIO: f64 = 0.10;

// Weight of the owner under the role-based formula.
const OWNER_ROLE_WEIGHT: f64 = 2.0;

/// Computes the consensus score of one record.
///
/// Arguments:
/// * `rankings` the scores given to the record, one per user
/// * `collaborators` the roles of the users. Only needed by the role-based formula,
/// unknown users get a weight of 1.
/// * `config` the aggregation policy of the collection
///
/// This never fails: degenerate inputs (no rankings, weights summing to zero, ...)
/// fall back to well-defined values. An infinite supervisor weight gives the owner's
/// score as the Super RAVG, a NaN weight turns the Super RAVG off.
pub fn calculate_ravg(
    rankings: &[RankingInput],
    collaborators: &[CollaboratorInfo],
    config: &RavgConfig,
) -> RavgResult {
    if rankings.is_empty() {
        debug!("calculate_ravg: no rankings");
        return RavgResult::EMPTY;
    }

    let use_super_ravg = config.is_super_ravg_active();
    let contributors: Vec<String> = rankings.iter().map(|r| r.user_id.clone()).collect();

    // Level 1: the team, without the supervisor when the Super RAVG is active.
    let team_rankings: Vec<RankingInput> = if use_super_ravg {
        rankings
            .iter()
            .filter(|r| r.user_id != config.owner_id)
            .cloned()
            .collect()
    } else {
        rankings.to_vec()
    };

    let team_ravg = if team_rankings.is_empty() {
        0.0
    } else {
        apply_formula(&team_rankings, collaborators, config)
    };
    debug!(
        "calculate_ravg: team_ravg: {:?} over {:?} rankings",
        team_ravg,
        team_rankings.len()
    );

    // Level 2: blend the supervisor's own score on top of the team.
    let super_ravg = if use_super_ravg {
        let owner_score = rankings
            .iter()
            .find(|r| r.user_id == config.owner_id)
            .map(|r| r.score);
        Some(blend_supervisor(
            team_ravg,
            team_rankings.is_empty(),
            owner_score,
            config.supervisor_weight,
        ))
    } else {
        None
    };

    info!(
        "calculate_ravg: formula: {:?} rank_count: {:?} team_ravg: {:?} super_ravg: {:?}",
        config.formula.as_str(),
        rankings.len(),
        team_ravg,
        super_ravg
    );

    RavgResult {
        team_ravg,
        super_ravg,
        rank_count: rankings.len(),
        contributors,
    }
}

/// Computes one RAVG per axis for records ranked on a grid.
///
/// The x axis uses all the rankings. The y axis only uses the rankings that have
/// a second score.
pub fn calculate_ravg_two_axis(
    rankings: &[(RankingInput, Option<f64>)],
    collaborators: &[CollaboratorInfo],
    config: &RavgConfig,
) -> TwoAxisResult {
    let x_rankings: Vec<RankingInput> = rankings.iter().map(|(r, _)| r.clone()).collect();
    let y_rankings: Vec<RankingInput> = rankings
        .iter()
        .filter_map(|(r, y)| y.map(|score| RankingInput::new(&r.user_id, score)))
        .collect();
    TwoAxisResult {
        x: calculate_ravg(&x_rankings, collaborators, config),
        y: calculate_ravg(&y_rankings, collaborators, config),
    }
}

fn blend_supervisor(
    team_ravg: f64,
    team_is_empty: bool,
    owner_score: Option<f64>,
    supervisor_weight: f64,
) -> f64 {
    match owner_score {
        // The owner is the only one who ranked: nothing to blend with.
        Some(score) if team_is_empty => score,
        // An infinite weight leaves no room for the team.
        Some(score) if supervisor_weight.is_infinite() => score,
        Some(score) => (team_ravg + score * supervisor_weight) / (1.0 + supervisor_weight),
        // No supervisor signal, both levels coincide.
        None => team_ravg,
    }
}

// Requires a non-empty list of rankings.
fn apply_formula(
    rankings: &[RankingInput],
    collaborators: &[CollaboratorInfo],
    config: &RavgConfig,
) -> f64 {
    match config.formula {
        RavgFormula::SimpleMean => simple_mean(rankings),
        RavgFormula::WeightedByRole => weighted_by_role(rankings, collaborators),
        RavgFormula::ExcludeOutliers => exclude_outliers(rankings),
        RavgFormula::Custom => custom_weighted(rankings, &config.member_weights),
    }
}

fn simple_mean(rankings: &[RankingInput]) -> f64 {
    if rankings.is_empty() {
        return 0.0;
    }
    let sum: f64 = rankings.iter().map(|r| r.score).sum();
    sum / rankings.len() as f64
}

// Weighted mean, or None when the weights sum to zero.
fn weighted_mean(weighted_scores: &[(f64, f64)]) -> Option<f64> {
    let total_weight: f64 = weighted_scores.iter().map(|(_, w)| *w).sum();
    if total_weight == 0.0 {
        return None;
    }
    let weighted_sum: f64 = weighted_scores.iter().map(|(s, w)| s * w).sum();
    Some(weighted_sum / total_weight)
}

fn weighted_by_role(rankings: &[RankingInput], collaborators: &[CollaboratorInfo]) -> f64 {
    let roles: HashMap<&str, CollaboratorRole> = collaborators
        .iter()
        .map(|c| (c.user_id.as_str(), c.role))
        .collect();
    let weighted: Vec<(f64, f64)> = rankings
        .iter()
        .map(|r| {
            let weight = match roles.get(r.user_id.as_str()) {
                Some(CollaboratorRole::Owner) => OWNER_ROLE_WEIGHT,
                _ => 1.0,
            };
            (r.score, weight)
        })
        .collect();
    weighted_mean(&weighted).unwrap_or_else(|| simple_mean(rankings))
}

fn exclude_outliers(rankings: &[RankingInput]) -> f64 {
    let n = rankings.len();
    // Trimming would remove everything.
    if n < 3 {
        return simple_mean(rankings);
    }

    let mut scores: Vec<f64> = rankings.iter().map(|r| r.score).collect();
    scores.sort_by(|a, b| a.total_cmp(b));

    let trim_count = std::cmp::max(1, (n as f64 * OUTLIER_TRIM_RATIO).floor() as usize);
    if 2 * trim_count >= n {
        debug!(
            "exclude_outliers: trimming {:?} at each end of {:?} scores leaves nothing",
            trim_count, n
        );
        return simple_mean(rankings);
    }
    let kept = &scores[trim_count..n - trim_count];
    debug!(
        "exclude_outliers: trim_count: {:?} kept: {:?}",
        trim_count, kept
    );
    kept.iter().sum::<f64>() / kept.len() as f64
}

fn custom_weighted(rankings: &[RankingInput], member_weights: &HashMap<String, f64>) -> f64 {
    let weighted: Vec<(f64, f64)> = rankings
        .iter()
        .map(|r| (r.score, *member_weights.get(&r.user_id).unwrap_or(&1.0)))
        .collect();
    match weighted_mean(&weighted) {
        Some(x) => x,
        None => {
            debug!("custom_weighted: all the weights are zero, using the simple mean");
            simple_mean(rankings)
        }
    }
}

/// Descriptive statistics over the raw scores of a record, regardless of the formula.
///
/// Returns None if nobody ranked the record.
pub fn score_stats(rankings: &[RankingInput]) -> Option<ScoreStats> {
    if rankings.is_empty() {
        return None;
    }
    let n = rankings.len();
    let avg = simple_mean(rankings);
    let min = rankings.iter().map(|r| r.score).fold(f64::INFINITY, f64::min);
    let max = rankings
        .iter()
        .map(|r| r.score)
        .fold(f64::NEG_INFINITY, f64::max);
    let stddev = if n < 2 {
        None
    } else {
        let sq_dev: f64 = rankings.iter().map(|r| (r.score - avg).powi(2)).sum();
        Some((sq_dev / (n - 1) as f64).sqrt())
    };
    Some(ScoreStats {
        avg,
        min,
        max,
        stddev,
        rank_count: n,
    })
}

/// Orders the records of a collection by their displayed RAVG, highest first.
///
/// Records with the same RAVG keep their input order and share the same position
/// (1, 2, 2, 4, ...). Records that nobody ranked are left out.
pub fn build_leaderboard(results: &[(String, RavgResult)]) -> Vec<LeaderboardEntry> {
    let mut ranked: Vec<(&String, &RavgResult)> = results
        .iter()
        .filter(|(_, r)| r.rank_count > 0)
        .map(|(id, r)| (id, r))
        .collect();
    // Stable sort: ties stay in input order.
    ranked.sort_by(|(_, a), (_, b)| b.display_ravg().total_cmp(&a.display_ravg()));

    let mut res: Vec<LeaderboardEntry> = Vec::new();
    for (idx, (record_id, r)) in ranked.iter().enumerate() {
        let ravg = r.display_ravg();
        let position = match res.last() {
            Some(prev) if prev.ravg == ravg => prev.position,
            _ => (idx + 1) as u32,
        };
        res.push(LeaderboardEntry {
            position,
            record_id: (*record_id).clone(),
            ravg,
            rank_count: r.rank_count,
        });
    }
    debug!("build_leaderboard: {:?} entries", res.len());
    res
}

/// Counts, for every user, the records they ranked.
///
/// `rankers_per_record` has one entry per record of the collection, with the users who
/// ranked it. Collaborators come first in their given order, even without any ranking,
/// then the other users in order of first appearance.
pub fn user_progress(
    collaborators: &[CollaboratorInfo],
    rankers_per_record: &[Vec<String>],
) -> Vec<UserProgress> {
    let total_records = rankers_per_record.len();
    let mut users: Vec<String> = collaborators.iter().map(|c| c.user_id.clone()).collect();
    for user_id in rankers_per_record.iter().flatten() {
        if !users.contains(user_id) {
            users.push(user_id.clone());
        }
    }

    users
        .into_iter()
        .map(|user_id| {
            let ranked_records = rankers_per_record
                .iter()
                .filter(|rankers| rankers.contains(&user_id))
                .count();
            let completion_pct = if total_records == 0 {
                0.0
            } else {
                ranked_records as f64 * 100.0 / total_records as f64
            };
            UserProgress {
                user_id,
                ranked_records,
                total_records,
                completion_pct,
            }
        })
        .collect()
}
