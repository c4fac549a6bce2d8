use calamine::{open_workbook, DataType, Reader, Xlsx};

use crate::ravg::{
    io_common::{column_index, make_default_id, non_empty, parse_score, required_column_index},
    *,
};

/// Reads the rankings from an Excel worksheet. The first row is the header.
pub fn read_excel_rankings(path: &str, source: &RankingSource) -> BCliResult<Vec<ParsedRanking>> {
    let default_id = make_default_id(path);
    let cols = source.columns();
    let wrange = get_range(path, source)?;

    let mut rows = wrange.rows();
    let header: Vec<String> = rows
        .next()
        .context(EmptyExcelSnafu { path })?
        .iter()
        .map(|dt| cell_to_string(dt).unwrap_or_default())
        .collect();
    debug!("read_excel_rankings: header: {:?}", header);

    let record_idx = required_column_index(&header, &cols.record, path)?;
    let user_idx = required_column_index(&header, &cols.user, path)?;
    let score_idx = column_index(&header, &cols.score);
    let score_y_idx = column_index(&header, &cols.score_y);
    let choice_idx = column_index(&header, &cols.choice);

    let mut res: Vec<ParsedRanking> = Vec::new();
    for (idx, row) in rows.enumerate() {
        // Same numbering as the spreadsheet, the header is row 1.
        let lineno = idx + 2;
        debug!("read_excel_rankings: lineno: {:?} row: {:?}", lineno, row);
        let cell = |i: Option<usize>| i.and_then(|i| row.get(i));

        // Rows without a record or a user are blank lines at the end of the sheet.
        let record_id = cell(Some(record_idx)).and_then(cell_to_string);
        let user_id = cell(Some(user_idx)).and_then(cell_to_string);
        let (record_id, user_id) = match (record_id, user_id) {
            (Some(r), Some(u)) => (r, u),
            _ => {
                warn!(
                    "read_excel_rankings: line {}: missing record or user, skipping",
                    lineno
                );
                continue;
            }
        };

        res.push(ParsedRanking {
            id: default_id(lineno),
            record_id,
            user_id,
            score: read_score(cell(score_idx), lineno)?,
            score_y: read_score(cell(score_y_idx), lineno)?,
            choice: cell(choice_idx).and_then(cell_to_string),
        });
    }
    Ok(res)
}

fn cell_to_string(cell: &DataType) -> Option<String> {
    match cell {
        DataType::String(s) => non_empty(s),
        DataType::Int(i) => Some(i.to_string()),
        DataType::Float(f) => Some(f.to_string()),
        DataType::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn read_score(cell: Option<&DataType>, lineno: usize) -> BCliResult<Option<f64>> {
    match cell {
        None | Some(DataType::Empty) => Ok(None),
        Some(DataType::Float(f)) => Ok(Some(*f)),
        Some(DataType::Int(i)) => Ok(Some(*i as f64)),
        Some(DataType::String(s)) => parse_score(s, lineno),
        Some(x) => Err(Box::new(CliError::ExcelWrongCellType {
            lineno,
            content: format!("{:?}", x),
        })),
    }
}

fn get_range(path: &str, source: &RankingSource) -> BCliResult<calamine::Range<DataType>> {
    debug!(
        "read_excel_rankings: path: {:?} worksheet: {:?}",
        path, &source.excel_worksheet_name
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(worksheet_name) = source.excel_worksheet_name.clone() {
        let wrange = workbook
            .worksheet_range(&worksheet_name)
            .context(MissingWorksheetSnafu {
                name: worksheet_name.clone(),
                path,
            })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let all_worksheets = workbook.worksheets();
        match all_worksheets.as_slice() {
            [] => Err(Box::new(CliError::EmptyExcel {
                path: path.to_string(),
            })),
            [(worksheet_name, wrange)] => {
                debug!(
                    "read_excel_rankings: path: {:?} worksheet: {:?}",
                    path, worksheet_name
                );
                Ok(wrange.clone())
            }
            _ => Err(Box::new(CliError::AmbiguousWorksheet {
                path: path.to_string(),
            })),
        }
    }
}
