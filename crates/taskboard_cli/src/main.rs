//! `taskboard` command line shell over `taskboard_core`.
//!
//! # Responsibility
//! - Map subcommands onto session gate and task board operations.
//! - Enforce the task board route guard before any board command.

mod args;

use args::{Cli, Command, Credentials, GlobalArgs};
use clap::Parser;
use log::error;
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use taskboard_core::{
    init_logging, new_user_fields, AppConfig, AppContext, BoardNotice, DocumentStore, ListItem,
    Route, SqliteDocumentStore, TaskBoard, USERS_COLLECTION,
};

type CliResult<T> = Result<T, Box<dyn Error>>;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let config = resolve_config(&cli.global)?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, &log_dir.to_string_lossy())?;
    }

    let json = cli.global.json;
    let context = AppContext::init(config)?;
    let result = dispatch(&context, cli.command, json);
    context.shutdown();
    result
}

fn resolve_config(global: &GlobalArgs) -> CliResult<AppConfig> {
    let mut config = AppConfig::from_env()?;
    if let Some(path) = &global.db_path {
        config.db_path = path.clone();
    }
    if let Some(level) = &global.log_level {
        config.log_level = level.clone();
    }
    if let Some(dir) = &global.log_dir {
        config.log_dir = Some(dir.clone());
    }
    if let Some(mode) = global.sync_mode {
        config.sync_mode = mode;
    }
    Ok(config)
}

fn dispatch(context: &AppContext, command: Command, json: bool) -> CliResult<()> {
    match command {
        Command::Signup(Credentials { email, password }) => {
            let mut gate = context.session_gate();
            gate.signup_form_mut().email = email;
            gate.signup_form_mut().password = password;
            match gate.signup() {
                Some(_) => println!("Account created. Log in with `taskboard login`."),
                None => return Err(gate_error(gate.signup_form().error()).into()),
            }
        }
        Command::Login(Credentials { email, password }) => {
            let mut gate = context.session_gate();
            gate.login_form_mut().email = email;
            gate.login_form_mut().password = password;
            match gate.login() {
                Some(_) => println!("Logged in."),
                None => return Err(gate_error(gate.login_form().error()).into()),
            }
        }
        Command::Logout => {
            context.session_gate().logout()?;
            println!("Logged out.");
        }
        Command::SeedUser { name } => {
            require_session(context)?;
            let id = context
                .store()
                .create_document(USERS_COLLECTION, new_user_fields(name))?;
            if json {
                println!("{}", serde_json::json!({ "id": id }));
            } else {
                println!("{id}");
            }
        }
        Command::List { search, history } => {
            let mut board = open_board(context)?;
            if let Some(term) = search {
                board.search(&term);
            }
            let items = if history {
                board.history_items()
            } else {
                board.active_items()
            };
            print_items(&items, json)?;
        }
        Command::Assign { user, task, status } => {
            let mut board = open_board(context)?;
            report(board.assign_task(&user, &task, status)?);
        }
        Command::Edit { user, task, status } => {
            let mut board = open_board(context)?;
            let record = board
                .record(&user)
                .ok_or_else(|| format!("no user record with id `{user}`"))?;
            board.edit_task(&record);
            if let Some(task) = task {
                board.set_task(task);
            }
            if let Some(status) = status {
                board.set_status(status);
            }
            report(board.submit()?);
        }
        Command::Complete { user } => {
            let mut board = open_board(context)?;
            report(board.complete_task(&user)?);
        }
        Command::Delete { user, yes } => {
            let mut board = open_board(context)?;
            let outcome = board.delete_task(&user, |prompt| yes || confirm_on_stdin(prompt))?;
            match outcome {
                Some(notice) => report(notice),
                None => println!("Cancelled."),
            }
        }
    }
    Ok(())
}

fn require_session(context: &AppContext) -> CliResult<()> {
    match context.resolve_route(Route::TaskBoard)? {
        Route::TaskBoard => Ok(()),
        _ => Err("not logged in or session expired; run `taskboard login`".into()),
    }
}

fn open_board(context: &AppContext) -> CliResult<TaskBoard<SqliteDocumentStore>> {
    require_session(context)?;
    let mut board = context.task_board();
    board.load_users();
    Ok(board)
}

fn gate_error(message: Option<&str>) -> String {
    message.unwrap_or("request failed").to_string()
}

fn report(notice: BoardNotice) {
    println!("{notice}");
}

fn print_items(items: &[ListItem], json: bool) -> CliResult<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(items)?);
        return Ok(());
    }
    if items.is_empty() {
        println!("No users.");
    }
    for item in items {
        println!("[{}] {}", item.record_id, item.primary);
        println!("    {}", item.secondary);
    }
    Ok(())
}

fn confirm_on_stdin(prompt: &str) -> bool {
    print!("{prompt} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
