use clap::Parser;
use serde::Serialize;

use coachdesk::cli::{
    Cli, ClientCommands, Commands, DbCommands, DemandCommands, DocCommands, OutputFormat,
    PipelineCommands, ReportCommands,
};
use coachdesk::commands::{clients, documents, pipeline, report, session, storage, Session};
use coachdesk::config::{self, Overrides, Settings, ENV_LOG};
use coachdesk::error::{AppError, CommandError, CommandResult};
use coachdesk::output;
use coachdesk::registry::SystemOpener;

fn main() {
    let cli = Cli::parse();
    let format = cli.format;
    if let Err(error) = run(cli) {
        match format {
            OutputFormat::Json => match serde_json::to_string_pretty(&error) {
                Ok(json) => eprintln!("{}", json),
                Err(_) => eprintln!("coachdesk error: {}", error),
            },
            OutputFormat::Table => eprintln!("coachdesk error: {}", error),
        }
        std::process::exit(1);
    }
}

fn init_tracing(quiet: bool, verbose: bool) -> Result<(), AppError> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_env(ENV_LOG)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| AppError::InvalidOperation(format!("failed to initialize logging: {}", e)))
}

fn emit<T: Serialize>(value: &T, format: OutputFormat) -> CommandResult<()> {
    println!("{}", output::render(value, format)?);
    Ok(())
}

fn run(cli: Cli) -> CommandResult<()> {
    let env_file = config::load_env_files();
    init_tracing(cli.quiet, cli.verbose)?;
    if let Some(path) = env_file {
        tracing::debug!(path = %path.display(), "loaded environment file");
    }

    let settings = Settings::resolve(Overrides {
        db_path: cli.db,
        workspace: cli.workspace,
        username: cli.user,
        password: cli.password,
    });
    let format = cli.format;

    match cli.command {
        Commands::Bootstrap => return emit(&session::bootstrap(&settings)?, format),
        Commands::Login => return emit(&session::login(&settings)?, format),
        Commands::Doc {
            action: DocCommands::Kinds,
        } => return emit(&documents::list_kinds(), format),
        _ => {}
    }

    let session = session::start(settings)?;
    dispatch(cli.command, &session, format)
}

fn dispatch(command: Commands, session: &Session, format: OutputFormat) -> CommandResult<()> {
    match command {
        Commands::Client { action } => match action {
            ClientCommands::Add(args) => emit(&clients::add_client(session, &args)?, format),
            ClientCommands::List { search } => {
                emit(&clients::list_clients(session, search.as_deref())?, format)
            }
            ClientCommands::Show { id } => emit(&clients::show_client(session, id)?, format),
        },
        Commands::Doc { action } => match action {
            DocCommands::Kinds => emit(&documents::list_kinds(), format),
            DocCommands::Generate(args) => {
                emit(&documents::generate_document(session, &args)?, format)
            }
            DocCommands::Attach(args) => emit(&documents::attach_document(session, &args)?, format),
            DocCommands::List { client } => {
                emit(&documents::list_documents(session, client)?, format)
            }
            DocCommands::Open { id } => {
                emit(&documents::open_document(session, id, &SystemOpener)?, format)
            }
            DocCommands::Delete { id } => emit(&documents::delete_document(session, id)?, format),
        },
        Commands::Report {
            action: ReportCommands::Final { client },
        } => emit(&report::final_report(session, client)?, format),
        Commands::Pipeline {
            action: PipelineCommands::Run { answers },
        } => emit(&pipeline::run_pipeline(session, &answers)?, format),
        Commands::Demand {
            action: DemandCommands::Add { candidate, titles },
        } => emit(&pipeline::add_demand(session, candidate, &titles)?, format),
        Commands::Db {
            action: DbCommands::Backup { path },
        } => emit(&storage::backup_database(session, &path)?, format),
        Commands::Bootstrap | Commands::Login => Err(CommandError::from(AppError::InvalidOperation(
            "command does not need a session".to_string(),
        ))),
    }
}
