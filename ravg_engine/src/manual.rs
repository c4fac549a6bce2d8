/*!

This is the long-form manual for `ravg_engine` and the `ravg` command line tool.

## Formulas

The Team RAVG of a record is computed with one of the following formulas. The name in
parentheses is the value used in configuration files.

### Simple mean (`simple_mean`)

The arithmetic mean of all the scores. This is the default.

### Weighted by role (`weighted_by_role`)

A weighted mean in which the owner of the collection counts twice and every other
collaborator counts once. Users who are not listed as collaborators count once.

### Exclude outliers (`exclude_outliers`)

A trimmed mean. The scores are sorted and 10% of them (at least one) are dropped at
each end before taking the mean:

| rankings | dropped at each end |
|----------|---------------------|
| 1 - 2    | none (simple mean)  |
| 3 - 19   | 1                   |
| 20 - 29  | 2                   |
| ...      | ...                 |

### Custom (`custom`)

A weighted mean with one weight per member, taken from `memberWeights`. Members without
a weight count once. If all the weights are zero, the simple mean is used instead.

## Super RAVG

When the supervisor weight is above 1.0, the owner of the collection is taken out of
the team and their score is blended on top of the Team RAVG:

```text
super_ravg = (team_ravg + owner_score * supervisor_weight) / (1 + supervisor_weight)
```

If the owner is the only one who ranked, the Super RAVG is the owner's score. If the
owner has not ranked, the Super RAVG is the Team RAVG. A supervisor weight of exactly
1.0 turns the mechanism off and the owner is part of the team like everyone else.

## Ranking modes

* `one_axis` one score per ranking
* `two_axis` two scores per ranking (`score` and `score_y`), one RAVG per axis
* `binary` a `yes` or `no` vote, tallied
* `quaternary` a vote for `a`, `b`, `c` or `d`, tallied. The labels displayed for each
  choice are set with `quaternaryLabels`.

A vote only has a winner if one choice has strictly more votes than all the others.

## Configuration

`ravg` reads the description of a collection in JSON:

```json
{
  "outputSettings": { "collectionName": "Logo contest" },
  "rankingMode": "one_axis",
  "ravg": {
    "formula": "custom",
    "memberWeights": { "alice": 2.0 },
    "supervisorWeight": 2.0,
    "ownerId": "olivia"
  },
  "collaborators": [
    { "userId": "olivia", "role": "owner" },
    { "userId": "alice", "role": "contributor" }
  ],
  "records": [ { "id": "logo-1", "title": "Blue logo" } ],
  "rankingSources": [ { "provider": "csv", "filePath": "rankings.csv" } ]
}
```

Only `outputSettings`, `ravg` and `rankingSources` are mandatory. `ravg.ownerId` is only
needed by the Super RAVG. The supervisor weight must be at least 1.0.

### Ranking sources

Each source provides rows with a record id, a user id and a score or a choice:

* `json` an array of objects with the keys `record_id`, `user_id`, `score`, `score_y`,
  `choice`
* `csv` a CSV file with a header row
* `xlsx` an Excel file with a header row. The worksheet is selected with
  `excelWorksheetName`. It can be omitted if the workbook has a single worksheet.

For `csv` and `xlsx`, the names of the columns default to `record_id`, `user_id`,
`score`, `score_y` and `choice`, and can be changed with `recordColumn`, `userColumn`,
`scoreColumn`, `scoreYColumn` and `choiceColumn`.

```text
record_id,user_id,score
logo-1,olivia,10
logo-1,alice,6
```

If a user ranks the same record more than once, the last ranking is kept.

Cells of the record and user columns are trimmed. Rows where either one is empty are
skipped.

## Summary

The summary written by `ravg` has four parts:

* `config` the collection name, formula, ranking mode and whether the Super RAVG is on
* `results` one entry per record, declared records first
* `leaderboard` the `one_axis` records sorted by RAVG. Records with the same RAVG share
  a position.
* `progress` for each user, the number of records ranked out of the total and the
  completion percentage. Collaborators who have not ranked anything are listed too.

*/
