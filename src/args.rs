use clap::{Parser, Subcommand};

/// Collects the ballots of a weekend poll and tallies them.
///
/// The ballots are stored in the key-value store when KV_REST_API_URL and
/// KV_REST_API_TOKEN are set, and in a local JSON file otherwise.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON configuration file with the keys dataFile, kvKey and kvTimeoutMs.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (file path) The file holding the votes when no key-value store is configured.
    /// Setting this option overrides POLL_DATA_FILE and the path that may be specified with the --config option.
    #[clap(long, value_parser)]
    pub data_file: Option<String>,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Records a vote. A second vote under the same name (ignoring case) replaces the first one.
    Submit(SubmitArgs),
    /// Prints the results of the poll.
    Results(ResultsArgs),
    /// Prints all the stored votes.
    List,
}

#[derive(clap::Args, Debug, Clone)]
pub struct SubmitArgs {
    /// The name of the voter.
    #[clap(short, long, value_parser)]
    pub name: Option<String>,

    /// A weekend the voter is available for. Repeat the flag to select several weekends.
    #[clap(short, long = "weekend", value_parser)]
    pub weekends: Vec<String>,

    /// (yes or no, optional) Whether the voter can drive.
    #[clap(long, value_parser = parse_answer)]
    pub can_drive: Option<bool>,

    /// (yes or no, optional) Whether the voter has an Ikon pass.
    #[clap(long, value_parser = parse_answer)]
    pub ikon_pass: Option<bool>,

    /// (yes or no, optional) Whether the voter is willing to pitch in for the jet.
    #[clap(long, value_parser = parse_answer)]
    pub pitch_jet: Option<bool>,

    /// (file path or '-') A raw vote in JSON format, as sent by the poll form.
    /// When given, --name and --weekend are not allowed.
    #[clap(short, long, value_parser, conflicts_with_all = &["name", "weekends"])]
    pub input: Option<String>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct ResultsArgs {
    /// Prints the results in JSON format, as served to the dashboard.
    #[clap(long, takes_value = false)]
    pub json: bool,

    /// (file path) If specified, the results will also be written in JSON format to the given location.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference file containing the expected results in JSON format. If provided, polltally will
    /// check that the computed results match the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,
}

fn parse_answer(s: &str) -> Result<bool, String> {
    match s.trim().to_lowercase().as_str() {
        "yes" | "y" | "true" => Ok(true),
        "no" | "n" | "false" => Ok(false),
        x => Err(format!("expected yes or no, got {:?}", x)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_flags() {
        let args = Args::parse_from([
            "polltally",
            "--data-file",
            "votes.json",
            "submit",
            "--name",
            "Ann",
            "--weekend",
            "Jan 16-18",
            "-w",
            "Feb 13-15",
            "--can-drive",
            "yes",
            "--pitch-jet",
            "No",
        ]);
        assert_eq!(args.data_file, Some("votes.json".to_string()));
        match args.command {
            Command::Submit(s) => {
                assert_eq!(s.name, Some("Ann".to_string()));
                assert_eq!(s.weekends, vec!["Jan 16-18", "Feb 13-15"]);
                assert_eq!(s.can_drive, Some(true));
                assert_eq!(s.ikon_pass, None);
                assert_eq!(s.pitch_jet, Some(false));
                assert_eq!(s.input, None);
            }
            c => panic!("unexpected command {:?}", c),
        }
    }

    #[test]
    fn input_excludes_flags() {
        assert!(Args::try_parse_from(["polltally", "submit", "--input", "-", "--name", "Ann"]).is_err());
        assert!(Args::try_parse_from(["polltally", "submit", "--can-drive", "maybe"]).is_err());
    }

    #[test]
    fn results_flags() {
        let args = Args::parse_from(["polltally", "--verbose", "results", "--json", "-o", "out.json"]);
        assert!(args.verbose);
        match args.command {
            Command::Results(r) => {
                assert!(r.json);
                assert_eq!(r.out, Some("out.json".to_string()));
                assert_eq!(r.reference, None);
            }
            c => panic!("unexpected command {:?}", c),
        }
    }
}
