use chrono::{Datelike, Local, NaiveDate};
use clap::{Arg, ArgAction, ArgMatches, Command};
use color_eyre::Result;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use taskboard::adapters::{
    api::{HttpTaskGateway, ScheduleClient},
    config::FileConfigStore,
    notify::ConsoleNotifier,
    render,
    storage::LocalStorage,
};
use taskboard::application::{AppError, ResourceService, TaskService};
use taskboard::domain::{CalendarMonth, ResourceId, Session, TaskDraft, TaskId, ValidationError};
use taskboard::ports::{ConfigStore, Notifier, ResourceStore};

fn cli() -> Command {
    Command::new("taskboard")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Track tasks, streaks and study resources from the terminal")
        .long_about("Tracks your to-do list against a schedule server and keeps study resources (files, YouTube links) in local storage.\n\nWith no subcommand, shows the dashboard.")
        .arg(
            Arg::new("server")
                .long("server")
                .value_name("URL")
                .help("Schedule server base URL (can also be set via TASKBOARD_SERVER env var)")
                .global(true),
        )
        .arg(
            Arg::new("user")
                .long("user")
                .short('u')
                .value_name("USERNAME")
                .help("Whose tasks and resources to use (can also be set via TASKBOARD_USER env var)")
                .global(true),
        )
        .arg(
            Arg::new("storage")
                .long("storage")
                .value_name("PATH")
                .help("Local storage file for resources")
                .global(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print JSON instead of text")
                .action(ArgAction::SetTrue)
                .global(true),
        )
        .subcommand(Command::new("dashboard").about("Show trackers and upcoming tasks"))
        .subcommand(
            Command::new("tasks")
                .about("Task operations")
                .subcommand(Command::new("list").about("List all tasks"))
                .subcommand(
                    Command::new("add")
                        .about("Add a task")
                        .arg(Arg::new("name").help("Task name").required(true).index(1))
                        .arg(
                            Arg::new("deadline")
                                .long("deadline")
                                .short('d')
                                .value_name("YYYY-MM-DD")
                                .help("Due date"),
                        )
                        .arg(
                            Arg::new("category")
                                .long("category")
                                .short('c')
                                .value_name("CATEGORY")
                                .default_value(""),
                        )
                        .arg(
                            Arg::new("priority")
                                .long("priority")
                                .short('p')
                                .value_name("High|Medium|Low")
                                .default_value("Medium"),
                        ),
                )
                .subcommand(
                    Command::new("toggle")
                        .about("Mark a task complete or incomplete")
                        .arg(task_id_arg()),
                )
                .subcommand(
                    Command::new("delete")
                        .about("Delete a task")
                        .arg(task_id_arg())
                        .arg(yes_arg()),
                )
                .subcommand(
                    Command::new("day")
                        .about("Show tasks due on a date")
                        .arg(
                            Arg::new("date")
                                .help("Date as YYYY-MM-DD (defaults to today)")
                                .index(1),
                        ),
                ),
        )
        .subcommand(
            Command::new("calendar")
                .about("Show a month with per-day task counts")
                .arg(
                    Arg::new("month")
                        .help("Month as YYYY-MM or \"June 2024\" (defaults to this month)")
                        .index(1),
                ),
        )
        .subcommand(
            Command::new("resources")
                .about("Resource operations")
                .subcommand(Command::new("list").about("List your resources"))
                .subcommand(
                    Command::new("add-file")
                        .about("Store a local file as a resource")
                        .arg(Arg::new("path").required(true).index(1)),
                )
                .subcommand(
                    Command::new("add-youtube")
                        .about("Store a YouTube link")
                        .arg(Arg::new("url").required(true).index(1)),
                )
                .subcommand(
                    Command::new("show")
                        .about("Show one resource")
                        .arg(resource_id_arg()),
                )
                .subcommand(
                    Command::new("delete")
                        .about("Delete a resource")
                        .arg(resource_id_arg())
                        .arg(yes_arg()),
                ),
        )
        .subcommand(
            Command::new("use")
                .about("Remember a username for later sessions")
                .arg(Arg::new("username").required(true).index(1)),
        )
}

fn task_id_arg() -> Arg {
    Arg::new("id")
        .help("Task id")
        .required(true)
        .index(1)
        .value_parser(clap::value_parser!(i64))
}

fn resource_id_arg() -> Arg {
    Arg::new("id")
        .help("Resource id")
        .required(true)
        .index(1)
        .value_parser(clap::value_parser!(i64))
}

fn id_arg(matches: &ArgMatches) -> i64 {
    matches.get_one::<i64>("id").copied().unwrap_or_default()
}

fn yes_arg() -> Arg {
    Arg::new("yes")
        .long("yes")
        .short('y')
        .help("Skip the confirmation prompt")
        .action(ArgAction::SetTrue)
}

fn confirm(question: &str) -> Result<bool> {
    print!("{question} [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::InvalidDate(raw.to_string()))
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("taskboard.log")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let matches = cli().get_matches();

    // Load configuration, then let flags and env vars win
    let config_store = FileConfigStore::new()?;
    let mut config = config_store.load_config().await?;

    if let Some(server) = matches.get_one::<String>("server") {
        config.server_url = server.clone();
    } else if let Ok(server) = std::env::var("TASKBOARD_SERVER") {
        config.server_url = server;
    }

    if let Some(path) = matches.get_one::<String>("storage") {
        config.storage_path = Some(PathBuf::from(path));
    }

    let storage_path = match config.storage_path.clone() {
        Some(path) => path,
        None => LocalStorage::default_path()?,
    };
    let storage = Arc::new(LocalStorage::new(storage_path, config.storage_quota_bytes));

    let session = Session::resolve([
        matches.get_one::<String>("user").cloned(),
        std::env::var("TASKBOARD_USER").ok(),
        config.username.clone(),
        storage.stored_username().await.map(|u| u.0),
    ]);
    tracing::info!("Session user: {}", session.username);

    let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);
    let json = matches.get_flag("json");
    let today = Local::now().date_naive();

    if let Some(("use", use_matches)) = matches.subcommand() {
        let username = use_matches
            .get_one::<String>("username")
            .map(|u| Session::new(u.trim()))
            .unwrap_or(session);
        storage.remember_username(&username.username).await?;
        config.username = Some(username.username.to_string());
        config_store.save_config(&config).await?;
        println!("Now using {}", username.username);
        return Ok(());
    }

    let result = match matches.subcommand() {
        Some(("resources", resource_matches)) => {
            let resources =
                ResourceService::load(storage.clone(), notifier.clone(), session).await;
            run_resources(&resources, resource_matches, json).await
        }
        other => {
            let client = ScheduleClient::new(
                config.server_url.clone(),
                Duration::from_secs(config.request_timeout_secs),
            )?;
            let tasks = TaskService::new(
                Arc::new(HttpTaskGateway::new(client)),
                notifier.clone(),
                session,
            );
            run_tasks(&tasks, other, json, today).await
        }
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {}", e);
        // Service errors have already raised their own banner
        if e.downcast_ref::<AppError>().is_none() {
            eprintln!("❌ {e}");
        }
        std::process::exit(1);
    }

    Ok(())
}

async fn run_tasks(
    tasks: &TaskService,
    command: Option<(&str, &ArgMatches)>,
    json: bool,
    today: NaiveDate,
) -> Result<()> {
    match command {
        Some(("tasks", task_matches)) => match task_matches.subcommand() {
            Some(("add", add)) => {
                let draft = TaskDraft {
                    name: add.get_one::<String>("name").cloned().unwrap_or_default(),
                    category: add.get_one::<String>("category").cloned().unwrap_or_default(),
                    priority: add.get_one::<String>("priority").cloned().unwrap_or_default(),
                    deadline: add.get_one::<String>("deadline").cloned(),
                };
                let task = tasks.create(&draft).await?;
                if json {
                    print_json(&task)?;
                }
            }
            Some(("toggle", toggle)) => {
                let id = TaskId(id_arg(toggle));
                tasks.toggle_complete(id).await?;
                if json {
                    if let Some(task) = tasks.find(id).await {
                        print_json(&task)?;
                    }
                }
            }
            Some(("delete", delete)) => {
                let id = TaskId(id_arg(delete));
                if !delete.get_flag("yes")
                    && !confirm("Are you sure you want to delete this task?")?
                {
                    return Ok(());
                }
                tasks.delete(id).await?;
            }
            Some(("day", day)) => {
                let date = match day.get_one::<String>("date") {
                    Some(raw) => parse_date(raw)?,
                    None => today,
                };
                let _ = tasks.refresh().await;
                let due = tasks.tasks_for_date(date).await;
                if json {
                    print_json(&due)?;
                } else {
                    print!("{}", render::render_day(date, &due));
                }
            }
            _ => {
                // `tasks` and `tasks list`
                let _ = tasks.refresh().await;
                let all = tasks.tasks().await;
                if json {
                    print_json(&all)?;
                } else {
                    print!("{}", render::render_task_list(&all, today));
                }
            }
        },
        Some(("calendar", calendar)) => {
            let (year, month) = match calendar.get_one::<String>("month") {
                Some(raw) => CalendarMonth::parse_month(raw)?,
                None => (today.year(), today.month()),
            };
            let _ = tasks.refresh().await;
            let month = tasks.calendar(year, month).await?;
            if json {
                print_json(&month)?;
            } else {
                print!("{}", render::render_calendar(&month, today));
            }
        }
        _ => {
            // Dashboard. A failed load still renders, just empty.
            let _ = tasks.load().await;
            let dashboard = tasks.dashboard(today).await;
            if json {
                print_json(&dashboard)?;
            } else {
                print!("{}", render::render_dashboard(&dashboard));
            }
        }
    }
    Ok(())
}

async fn run_resources(
    resources: &ResourceService,
    matches: &ArgMatches,
    json: bool,
) -> Result<()> {
    match matches.subcommand() {
        Some(("add-file", add)) => {
            let path = add.get_one::<String>("path").map(PathBuf::from).unwrap_or_default();
            let resource = resources.add_file(&path).await?;
            if json {
                print_json(&resource)?;
            }
        }
        Some(("add-youtube", add)) => {
            let url = add.get_one::<String>("url").cloned().unwrap_or_default();
            let resource = resources.add_youtube(&url).await?;
            if json {
                print_json(&resource)?;
            }
        }
        Some(("show", show)) => {
            let id = ResourceId(id_arg(show));
            let resource = resources.show(id).await?;
            if json {
                print_json(&resource)?;
            } else {
                print!("{}", render::render_resource(&resource));
            }
        }
        Some(("delete", delete)) => {
            let id = ResourceId(id_arg(delete));
            if !delete.get_flag("yes")
                && !confirm("Are you sure you want to delete this resource?")?
            {
                return Ok(());
            }
            resources.delete(id).await?;
        }
        _ => {
            let mine = resources.list().await;
            if json {
                print_json(&mine)?;
            } else {
                print!("{}", render::render_resources(&mine));
            }
        }
    }
    Ok(())
}
