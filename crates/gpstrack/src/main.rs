//! `gpstrack` - CLI for gpstrack
//!
//! This binary provides the command-line interface for managing projects,
//! recording routes and browsing route logs.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{bail, Context};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use gpstrack::cli::{
    parse_meta_assignments, split_class_arg, Cli, Command, ConfigCommand, LogCommand,
    ProjectCommand, RoutesCommand, TaxonomyCommand,
};
use gpstrack::project::validate_interval;
use gpstrack::route::{spawn_logger, LoggerEvent, LoggerHandle};
use gpstrack::{
    init_logging, taxonomy, Config, LogRecord, LoggerState, MetaSelection, Project, ProjectStore,
    RouteLogger, RouteViewer, SimulatedLocation,
};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    // Load configuration
    let config = Config::load_from(cli.config.clone()).context("loading configuration")?;

    match cli.command {
        Command::Project(cmd) => handle_project(&config, cmd),
        Command::Taxonomy(cmd) => handle_taxonomy(&config, cmd),
        Command::Log(cmd) => handle_log(&config, &cmd),
        Command::Routes(cmd) => handle_routes(&config, cmd),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn handle_project(config: &Config, cmd: ProjectCommand) -> anyhow::Result<()> {
    let store = ProjectStore::new(config.projects_dir());

    match cmd {
        ProjectCommand::Create {
            name,
            interval,
            classes,
            force,
        } => {
            if store.exists(name.trim()) && !force {
                bail!("project '{}' already exists; use --force to overwrite it", name.trim());
            }

            let mut list = Vec::new();
            for arg in &classes {
                let added = split_class_arg(arg)
                    .is_some_and(|(class, attrs)| taxonomy::add_class(&mut list, class, attrs));
                if !added {
                    eprintln!("Skipping class '{arg}': expected Name=attr1,attr2");
                }
            }

            let project = store.create_project(&name, interval, list)?;
            println!("Project created");
            print_project(&project);
        }
        ProjectCommand::List { json } => {
            let names = store.list_projects()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&names)?);
            } else if names.is_empty() {
                println!("No projects in {}", store.dir().display());
            } else {
                for name in names {
                    println!("{name}");
                }
            }
        }
        ProjectCommand::Show { name, json } => {
            let project = store.load_project(&name)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&project)?);
            } else {
                print_project(&project);
            }
        }
        ProjectCommand::Edit { name, interval } => {
            validate_interval(interval)?;
            let mut project = store.load_project(&name)?;
            project.interval_secs = interval;
            store.save_project(&project)?;
            println!("Project updated successfully.");
            print_project(&project);
        }
    }
    Ok(())
}

fn handle_taxonomy(config: &Config, cmd: TaxonomyCommand) -> anyhow::Result<()> {
    let store = ProjectStore::new(config.projects_dir());

    let mut project = match &cmd {
        TaxonomyCommand::Add { project, .. }
        | TaxonomyCommand::Edit { project, .. }
        | TaxonomyCommand::Remove { project, .. } => store.load_project(project)?,
    };

    let changed = match &cmd {
        TaxonomyCommand::Add {
            class, attributes, ..
        } => taxonomy::add_class(&mut project.taxonomy, class, attributes),
        TaxonomyCommand::Edit {
            index,
            class,
            attributes,
            ..
        } => taxonomy::edit_class(&mut project.taxonomy, *index, class, attributes),
        TaxonomyCommand::Remove { index, .. } => {
            taxonomy::remove_class(&mut project.taxonomy, *index).is_some()
        }
    };

    if !changed {
        bail!("nothing changed: check the class index, name and attributes");
    }

    store.save_project(&project)?;
    println!("Project updated successfully.");
    print_project(&project);
    Ok(())
}

fn handle_log(config: &Config, cmd: &LogCommand) -> anyhow::Result<()> {
    let store = ProjectStore::new(config.projects_dir());
    let project = store.load_project(&cmd.project)?;

    let location =
        SimulatedLocation::new(config.base_coordinate(), config.logger.jitter_degrees);
    let logger = RouteLogger::new(project, config.routes_dir(), location)?
        .with_pending_capacity(config.pending_capacity());

    // Ticks and user input share one thread
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting runtime")?;
    runtime.block_on(run_log_session(logger, cmd.ticks))
}

async fn run_log_session(
    logger: RouteLogger<SimulatedLocation>,
    max_ticks: Option<u64>,
) -> anyhow::Result<()> {
    let project = logger.project().clone();
    let (handle, mut events, task) = spawn_logger(logger);

    let path = handle.start().await?;
    println!(
        "Logging '{}' every {}s to {}",
        project.name,
        project.interval_secs,
        path.display()
    );
    print_log_help(&project);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;
    let mut ticks = 0u64;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(LoggerEvent::Tick(record)) => {
                    ticks += 1;
                    println!("{}", format_record(&record));
                    if max_ticks.is_some_and(|limit| ticks >= limit) {
                        break;
                    }
                }
                Some(LoggerEvent::TickFailed(message)) => {
                    eprintln!("Failed to write log entry: {message}");
                }
                None => break,
            },
            line = lines.next_line(), if stdin_open => match line? {
                Some(line) => {
                    if !handle_input(&handle, &project, line.trim()).await {
                        break;
                    }
                }
                None => stdin_open = false,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    if handle.status().await?.state == LoggerState::Logging {
        let summary = handle.stop().await?;
        println!(
            "Logging stopped. Logs saved to {} ({} records)",
            summary.path.display(),
            summary.records
        );
    }

    drop(handle);
    task.await.context("route logger task failed")?;
    Ok(())
}

/// Apply one line of interactive input. Returns false to quit.
async fn handle_input(handle: &LoggerHandle, project: &Project, line: &str) -> bool {
    match line {
        "" => {}
        "quit" | "exit" => return false,
        "help" => print_log_help(project),
        "start" => match handle.start().await {
            Ok(path) => println!("Logging to {}", path.display()),
            Err(e) => eprintln!("{e}"),
        },
        "stop" => match handle.stop().await {
            Ok(summary) => println!(
                "Logging stopped. Logs saved to {} ({} records)",
                summary.path.display(),
                summary.records
            ),
            Err(e) => eprintln!("{e}"),
        },
        "status" => match handle.status().await {
            Ok(status) => {
                println!("State:   {}", status.state);
                if let Some(path) = status.session {
                    println!("Session: {}", path.display());
                }
                println!("Records: {}", status.records);
                println!("Pending: {}", status.pending);
            }
            Err(e) => eprintln!("{e}"),
        },
        assignments => submit_assignments(handle, project, assignments).await,
    }
    true
}

async fn submit_assignments(handle: &LoggerHandle, project: &Project, line: &str) {
    let pairs = match parse_meta_assignments(line) {
        Ok(pairs) => pairs,
        Err(message) => {
            eprintln!("{message} (type 'help' for usage)");
            return;
        }
    };

    let mut selection = MetaSelection::for_project(project);
    for (class, attribute) in pairs {
        if let Err(e) = selection.select(class, attribute) {
            eprintln!("{e}");
            return;
        }
    }

    match handle.submit_meta(&mut selection).await {
        Ok(true) => println!("Your meta data has been recorded."),
        Ok(false) => println!("No attribute selected; nothing submitted."),
        Err(e) => eprintln!("{e}"),
    }
}

fn print_log_help(project: &Project) {
    println!();
    println!("Tag upcoming samples with one line of Class=Attribute pairs, e.g.");
    if let Some(class) = project.taxonomy.first() {
        if let Some(attr) = class.attributes.first() {
            println!("  {}={}", class.name, attr);
        }
    }
    println!("Classes:");
    for class in &project.taxonomy {
        println!("  {class}");
    }
    println!("Commands: start, stop, status, help, quit");
    println!();
}

fn format_record(record: &LogRecord) -> String {
    let meta = serde_json::to_string(&record.meta_data).unwrap_or_default();
    format!(
        "{}: ({:.6}, {:.6}) {}",
        record.tick_timestamp, record.latitude, record.longitude, meta
    )
}

fn print_project(project: &Project) {
    println!("Name:          {}", project.name);
    println!("GPS Frequency: {}s", project.interval_secs);
    println!("Taxonomy:");
    for (i, class) in project.taxonomy.iter().enumerate() {
        println!("  [{i}] {} → {}", class.name, class.attributes.join(", "));
    }
}

fn handle_routes(config: &Config, cmd: RoutesCommand) -> anyhow::Result<()> {
    let viewer = RouteViewer::new(config.routes_dir());

    match cmd {
        RoutesCommand::List { project, json } => {
            let sessions = viewer.list_sessions(&project)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&sessions)?);
            } else if sessions.is_empty() {
                println!("No route logs found for project: {project}");
            } else {
                for session in sessions {
                    let started = chrono::DateTime::from_timestamp(session.started_at, 0)
                        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                        .unwrap_or_default();
                    println!("{}  {}", session.file_name, started);
                }
            }
        }
        RoutesCommand::Show { file, max_lines } => {
            let max_lines = max_lines.unwrap_or(config.viewer.max_lines);
            let entries = viewer.read_session(&file, max_lines)?;
            println!("{}", entries.join("\n\n"));
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Data dir:           {}", config.data_dir().display());
                println!("  Projects:           {}", config.projects_dir().display());
                println!("  Routes:             {}", config.routes_dir().display());
                println!();
                println!("[Logger]");
                println!("  Base position:      {}", config.base_coordinate());
                println!("  Jitter (degrees):   {}", config.logger.jitter_degrees);
                match config.pending_capacity() {
                    Some(n) => println!("  Max pending:        {n}"),
                    None => println!("  Max pending:        unlimited"),
                }
                println!();
                println!("[Viewer]");
                println!("  Max lines:          {}", config.viewer.max_lines);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
