use clap::Parser;

/// This program computes ranked averages (RAVG) and vote tallies for a collection.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The file describing the collection in JSON: collaborators, RAVG settings
    /// and the sources of the rankings. See the manual of ravg_engine for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,
    /// (file path) A reference file containing the expected summary in JSON format. If provided, ravg will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the collection will be written in JSON
    /// format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) A file of rankings. Setting this option overrides the sources that may be
    /// specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default json) The type of the input: json, csv or xlsx.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (simple_mean, weighted_by_role, exclude_outliers or custom) Overrides the formula of the collection.
    #[clap(long, value_parser)]
    pub formula: Option<String>,

    /// (number, at least 1.0) Overrides the supervisor weight. Values above 1.0 turn on the Super RAVG.
    #[clap(long, value_parser)]
    pub supervisor_weight: Option<f64>,

    /// (user id) Overrides the owner of the collection.
    #[clap(long, value_parser)]
    pub owner: Option<String>,

    /// When using an Excel file, indicates the name of the worksheet to use.
    #[clap(long, value_parser)]
    pub excel_worksheet_name: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
