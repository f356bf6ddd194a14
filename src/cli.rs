use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "table tennis ranking backend")]
pub struct Cli {
    /// Command
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
#[clap(rename_all = "lower_case")]
pub enum Command {
    /// Start the backend server
    Serve {
        /// Port number (optional, defaults to 3000)
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
    /// Create the database schema
    Init {
        /// Drop every table first
        #[arg(long)]
        reset: bool,
    },
    /// Generate ranking snapshots from the current results
    Snapshot {
        /// Male, Female or Both
        #[arg(short, long, default_value = "Both")]
        gender: String,
        /// Senior, U19, U15, U13, U11 (any age category) or All
        #[arg(short, long, default_value = "All")]
        category: String,
        /// Display name of the snapshots
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Make a snapshot public, or hide it again
    Publish {
        id: i64,
        #[arg(long)]
        private: bool,
    },
    /// Export a snapshot as a semicolon separated spreadsheet
    Export {
        id: i64,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Reprice an event's results from the current point rules
    Recalculate { event_id: i64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_defaults_to_full_fan_out() {
        let cli = Cli::try_parse_from(["ranking", "snapshot"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Snapshot {
                gender: "Both".to_string(),
                category: "All".to_string(),
                name: None,
            }
        );
    }

    #[test]
    fn test_publish_and_export_arguments() {
        let cli = Cli::try_parse_from(["ranking", "publish", "7", "--private"]).unwrap();
        assert_eq!(cli.command, Command::Publish { id: 7, private: true });

        let cli = Cli::try_parse_from(["ranking", "export", "3", "-o", "out.csv"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Export {
                id: 3,
                output: Some("out.csv".to_string())
            }
        );
    }
}
