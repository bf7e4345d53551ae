//! Command-line surface

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Output mode shared by every command
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

#[derive(Debug, Parser)]
#[command(
    name = "coachdesk",
    version,
    about = "Career-coaching workstation: clients, documents and final reports"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// SQLite database file [env: COACHDESK_DB]
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Directory generated documents are written to [env: COACHDESK_WORKSPACE]
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,

    /// Login user [env: COACHDESK_USER]
    #[arg(short, long, global = true)]
    pub user: Option<String>,

    /// Login password [env: COACHDESK_PASSWORD]
    #[arg(long, global = true)]
    pub password: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create the database and the demo users if there are none
    Bootstrap,
    /// Check the configured credentials
    Login,
    /// Client records
    Client {
        #[command(subcommand)]
        action: ClientCommands,
    },
    /// Generated and attached documents
    Doc {
        #[command(subcommand)]
        action: DocCommands,
    },
    /// Final report
    Report {
        #[command(subcommand)]
        action: ReportCommands,
    },
    /// Sequential intake runner
    Pipeline {
        #[command(subcommand)]
        action: PipelineCommands,
    },
    /// Labor-demand analysis
    Demand {
        #[command(subcommand)]
        action: DemandCommands,
    },
    /// Database maintenance
    Db {
        #[command(subcommand)]
        action: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
pub enum ClientCommands {
    /// Create a client, or update the one with the same email
    Add(ClientAddArgs),
    /// List clients, optionally filtered by name or email
    List {
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show a client with its documents
    Show { id: i64 },
}

#[derive(Debug, Clone, Args)]
pub struct ClientAddArgs {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub email: String,
    #[arg(long)]
    pub phone: String,
    #[arg(long)]
    pub profession: String,
    #[arg(long)]
    pub age: i64,
    /// D, I, S or C
    #[arg(long)]
    pub disc: String,
    /// Also keep a candidate profile with this location
    #[arg(long)]
    pub location: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum DocCommands {
    /// List the document types that can be generated or attached
    Kinds,
    /// Generate a document from a JSON answers file and register it
    Generate(DocGenerateArgs),
    /// Register an externally produced file
    Attach(DocAttachArgs),
    /// List a client's documents
    List {
        #[arg(long)]
        client: i64,
    },
    /// Open a document with the default application
    Open { id: i64 },
    /// Delete a document row and its file
    Delete { id: i64 },
}

#[derive(Debug, Clone, Args)]
pub struct DocGenerateArgs {
    #[arg(long)]
    pub client: i64,
    /// Document type tag (see `doc kinds`)
    #[arg(long = "type")]
    pub doc_type: String,
    /// JSON file with the form answers
    #[arg(long, conflicts_with = "json")]
    pub answers: Option<PathBuf>,
    /// Form answers given inline as JSON
    #[arg(long)]
    pub json: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct DocAttachArgs {
    #[arg(long)]
    pub client: i64,
    /// Module number (1-3)
    #[arg(long, default_value_t = 1)]
    pub module: i64,
    #[arg(long = "type")]
    pub doc_type: String,
    pub path: String,
}

#[derive(Debug, Subcommand)]
pub enum ReportCommands {
    /// Merge a client's PDFs and workbooks into the final report
    Final {
        #[arg(long)]
        client: i64,
    },
}

#[derive(Debug, Subcommand)]
pub enum PipelineCommands {
    /// Run intake, brand canvas and demand analysis from an answers file
    Run {
        #[arg(long)]
        answers: PathBuf,
    },
}

#[derive(Debug, Subcommand)]
pub enum DemandCommands {
    /// Record comma-separated position titles for a candidate profile
    Add {
        #[arg(long)]
        candidate: i64,
        titles: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum DbCommands {
    /// Copy the database to a file with the online-backup API
    Backup { path: PathBuf },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_tree_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn global_flags_parse_after_subcommand() {
        let cli = Cli::try_parse_from([
            "coachdesk", "doc", "list", "--client", "3", "--format", "json", "-v", "--db", "x.db",
        ])
        .unwrap();

        assert_eq!(cli.format, OutputFormat::Json);
        assert!(cli.verbose);
        assert_eq!(cli.db, Some(PathBuf::from("x.db")));
        assert!(matches!(
            cli.command,
            Commands::Doc {
                action: DocCommands::List { client: 3 }
            }
        ));
    }

    #[test]
    fn generate_takes_file_or_inline_answers_but_not_both() {
        let cli = Cli::try_parse_from([
            "coachdesk", "doc", "generate", "--client", "1", "--type", "cv", "--json", "{}",
        ])
        .unwrap();
        match cli.command {
            Commands::Doc {
                action: DocCommands::Generate(args),
            } => {
                assert_eq!(args.doc_type, "cv");
                assert_eq!(args.json.as_deref(), Some("{}"));
            }
            other => panic!("unexpected command {:?}", other),
        }

        assert!(Cli::try_parse_from([
            "coachdesk", "doc", "generate", "--client", "1", "--type", "cv", "--json", "{}",
            "--answers", "a.json",
        ])
        .is_err());
    }

    #[test]
    fn unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["coachdesk", "--format", "xml", "login"]).is_err());
    }
}
