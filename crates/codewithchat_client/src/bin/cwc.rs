//! cwc - terminal client for the CodeWithChat workspace.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use codewithchat_client::models::{RegisterForm, User};
use codewithchat_client::screens::{login, register, HomeScreen};
use codewithchat_client::{
    FileStorage, GuardOutcome, LocalStorage, Session, TerminalNotifier, DEFAULT_BASE_URL,
};
use console::style;
use dialoguer::Password;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cwc", version, about = "Terminal client for the CodeWithChat workspace")]
struct Cli {
    /// Base URL of the API
    #[arg(long, env = "CWC_API_URL", default_value = DEFAULT_BASE_URL)]
    api_url: String,

    /// File holding the stored token and user
    #[arg(long, env = "CWC_STORAGE")]
    storage: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create an account and sign in
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
        /// Image file to send as the profile picture
        #[arg(long)]
        profile_pic: Option<PathBuf>,
    },
    /// Sign in with email and password
    Login {
        #[arg(long)]
        email: String,
        /// Prompted for when omitted
        #[arg(long)]
        password: Option<String>,
    },
    /// Sign out and clear the stored session
    Logout,
    /// Show the signed-in user
    Whoami,
    /// List or create projects
    Projects {
        #[command(subcommand)]
        command: ProjectsCommand,
    },
}

#[derive(Subcommand)]
enum ProjectsCommand {
    /// List your projects
    List,
    /// Create a project
    Create { name: String },
}

fn password_or_prompt(password: Option<String>) -> Option<String> {
    if password.is_some() {
        return password;
    }
    Password::new().with_prompt("Password").interact().ok()
}

fn print_projects(home: &HomeScreen) {
    if home.projects.is_empty() {
        println!("No projects yet. Start by creating your first project.");
        return;
    }
    for project in &home.projects {
        println!(
            "{}  {} members  {}",
            style(&project.name).bold(),
            project.users.len(),
            style(project.id).dim()
        );
    }
}

async fn run(cli: Cli) -> bool {
    let storage: Arc<dyn LocalStorage> = Arc::new(FileStorage::new(
        cli.storage.unwrap_or_else(FileStorage::default_path),
    ));
    let session = match Session::new(&cli.api_url, storage, Arc::new(TerminalNotifier)) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("{}", e);
            return false;
        }
    };

    match cli.command {
        Command::Register {
            name,
            email,
            password,
            profile_pic,
        } => {
            let Some(password) = password_or_prompt(password) else {
                return false;
            };
            let form = RegisterForm {
                name,
                email,
                password,
                profile_pic,
            };
            register::submit(&session, &form).await
        }
        Command::Login { email, password } => {
            let Some(password) = password_or_prompt(password) else {
                return false;
            };
            login::submit(&session, &email, &password).await
        }
        Command::Logout => {
            HomeScreen::logout(&session).await;
            true
        }
        Command::Whoami => match require_user(&session).await {
            Some(user) => {
                println!("Welcome back {} <{}>", user.name, user.email);
                true
            }
            None => false,
        },
        Command::Projects { command } => {
            if require_user(&session).await.is_none() {
                return false;
            }
            match command {
                ProjectsCommand::List => {
                    print_projects(&HomeScreen::load(&session).await);
                    true
                }
                ProjectsCommand::Create { name } => {
                    let mut home = HomeScreen::default();
                    let created = home.create_project(&session, &name).await;
                    if created {
                        print_projects(&home);
                    }
                    created
                }
            }
        }
    }
}

/// Runs the auth guard; prints where to go when it redirects.
async fn require_user(session: &Session) -> Option<User> {
    match session.guard().await {
        Ok(GuardOutcome::Render(user)) => Some(user),
        Ok(GuardOutcome::RedirectToLogin) => {
            eprintln!("Please log in: cwc login --email <email>");
            None
        }
        Err(e) => {
            eprintln!("{}", e);
            None
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    if run(Cli::parse()).await {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
