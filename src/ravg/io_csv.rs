// Primitives for reading CSV files.

use crate::ravg::{
    io_common::{column_index, make_default_id, non_empty, parse_score, required_column_index},
    *,
};

/// Reads a CSV file with a header row. The record and user columns are mandatory.
pub fn read_csv_rankings(path: &str, source: &RankingSource) -> BCliResult<Vec<ParsedRanking>> {
    let default_id = make_default_id(path);
    let cols = source.columns();

    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    let header: Vec<String> = rdr
        .headers()
        .context(CsvLineParseSnafu { lineno: 1_usize })?
        .iter()
        .map(|s| s.to_string())
        .collect();
    debug!("read_csv_rankings: header: {:?}", header);

    let record_idx = required_column_index(&header, &cols.record, path)?;
    let user_idx = required_column_index(&header, &cols.user, path)?;
    let score_idx = column_index(&header, &cols.score);
    let score_y_idx = column_index(&header, &cols.score_y);
    let choice_idx = column_index(&header, &cols.choice);

    let mut res: Vec<ParsedRanking> = Vec::new();
    for (idx, line_r) in rdr.records().enumerate() {
        // The header is line 1.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { lineno })?;
        debug!("read_csv_rankings: {:?} {:?}", lineno, line);

        let cell = |i: Option<usize>| i.and_then(|i| line.get(i)).map(|s| s.to_string());

        let record_id = cell(Some(record_idx)).context(LineTooShortSnafu {
            lineno,
            column: cols.record.as_str(),
        })?;
        let user_id = cell(Some(user_idx)).context(LineTooShortSnafu {
            lineno,
            column: cols.user.as_str(),
        })?;
        let (record_id, user_id) = match (non_empty(&record_id), non_empty(&user_id)) {
            (Some(r), Some(u)) => (r, u),
            _ => {
                warn!(
                    "read_csv_rankings: line {}: missing record or user, skipping",
                    lineno
                );
                continue;
            }
        };
        res.push(ParsedRanking {
            id: default_id(lineno),
            record_id,
            user_id,
            score: parse_score(&cell(score_idx).unwrap_or_default(), lineno)?,
            score_y: parse_score(&cell(score_y_idx).unwrap_or_default(), lineno)?,
            choice: non_empty(&cell(choice_idx).unwrap_or_default()),
        });
    }
    Ok(res)
}
