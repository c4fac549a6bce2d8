use serde::{Deserialize, Serialize};

use crate::ravg::{io_common::make_default_id, *};

#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
struct JsonRanking {
    pub id: Option<String>,
    pub record_id: String,
    pub user_id: String,
    pub score: Option<f64>,
    pub score_y: Option<f64>,
    pub choice: Option<String>,
}

/// Reads an array of rankings, one object per ranking.
pub fn read_json_rankings(path: &str) -> BCliResult<Vec<ParsedRanking>> {
    let default_id = make_default_id(path);
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let rows: Vec<JsonRanking> =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_json_rankings: {:?} rows", rows.len());

    let res = rows
        .into_iter()
        .enumerate()
        .map(|(idx, row)| ParsedRanking {
            // Rows are counted from 1.
            id: row.id.unwrap_or_else(|| default_id(idx + 1)),
            record_id: row.record_id,
            user_id: row.user_id,
            score: row.score,
            score_y: row.score_y,
            choice: row.choice.filter(|c| !c.is_empty()),
        })
        .collect();
    Ok(res)
}
