use clap::Parser;

/// Compares a survey response to the other responses of the same survey.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) The file describing the analysis, in JSON format: where the responses are,
    /// which response to compare and the comparison rules. See the manual of survey_analysis for the format.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) A reference file containing the expected summary in JSON format. If provided, surveycmp will
    /// check that the computed summary matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (file path, 'stdout' or empty) If specified, the summary of the analysis will be written in JSON format to
    /// the given location. Otherwise it is printed on the standard output.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path or empty) A file of responses. Setting this option overrides the response sources that may be
    /// specified with the --config option.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (default json) The type of the input: json or csv.
    #[clap(long, value_parser)]
    pub input_type: Option<String>,

    /// (response id) The response to compare against the others. Overrides the target of the --config option.
    #[clap(short, long, value_parser)]
    pub target: Option<String>,

    /// If passed as an argument, the target response is also part of the group it is compared to.
    #[clap(long, takes_value = false)]
    pub include_target: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
