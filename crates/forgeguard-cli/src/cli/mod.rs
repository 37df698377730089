//! CLI entry and dispatch.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use forgeguard_core::api::Role;
use forgeguard_core::{config, logging};

pub mod app;
mod commands;
pub mod render;

use app::App;

#[derive(Parser)]
#[command(name = "forgeguard")]
#[command(version = "0.1")]
#[command(about = "Image forgery detection from the terminal")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Backend URL (overrides FORGEGUARD_API_URL and config)
    #[arg(long, global = true, value_name = "URL")]
    api_url: Option<String>,

    /// Print raw JSON instead of tables
    #[arg(long, global = true)]
    json: bool,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Log in and store the session
    Login {
        #[arg(short, long)]
        email: String,
        /// Read from stdin when omitted
        #[arg(short, long, env = "FORGEGUARD_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Log out and clear the stored session
    Logout,
    /// Create an administrator account, then log in
    Register {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        name: String,
        /// Read from stdin when omitted
        #[arg(short, long, env = "FORGEGUARD_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Show the logged-in user and available commands
    Whoami,

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Upload and manage your images
    Images {
        #[command(subcommand)]
        command: ImageCommands,
    },
    /// Run and inspect the two-phase analysis
    Analyze {
        #[command(subcommand)]
        command: AnalyzeCommands,
    },
    /// Download protected result images
    Results {
        #[command(subcommand)]
        command: ResultCommands,
    },
    /// Administration: users and their data
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },
}

#[derive(clap::Subcommand)]
enum ConfigCommands {
    /// Show the path to the config file
    Path,
    /// Initialize a default config file (if not present)
    Init,
    /// Generate a fresh config from Rust defaults (for xtask)
    Generate,
}

#[derive(clap::Subcommand)]
enum ImageCommands {
    /// List your images
    List,
    /// Show one image and its analysis
    Show {
        #[arg(value_name = "IMAGE_ID")]
        id: String,
    },
    /// Upload an image file
    Upload {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Run both analysis phases after uploading
        #[arg(long)]
        analyze: bool,
    },
    /// Delete one image
    Delete {
        #[arg(value_name = "IMAGE_ID")]
        id: String,
    },
    /// Delete all of your images
    DeleteAll {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(clap::Subcommand)]
enum AnalyzeCommands {
    /// Run error level analysis
    Phase1 {
        #[arg(value_name = "IMAGE_ID")]
        id: String,
    },
    /// Run the deep learning classifier (requires phase 1)
    Phase2 {
        #[arg(value_name = "IMAGE_ID")]
        id: String,
    },
    /// Run phase 1 then phase 2
    Run {
        #[arg(value_name = "IMAGE_ID")]
        id: String,
    },
    /// Show the current analysis result
    Show {
        #[arg(value_name = "IMAGE_ID")]
        id: String,
    },
}

#[derive(clap::Subcommand)]
enum ResultCommands {
    /// Download a heatmap or mask
    Fetch {
        #[arg(value_name = "FILENAME")]
        filename: String,
        /// Directory to save into (default: config download_dir)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
        /// Open the file after downloading
        #[arg(long)]
        open: bool,
    },
}

#[derive(clap::Subcommand)]
enum AdminCommands {
    /// Aggregate statistics
    Dashboard,
    /// List users
    Users,
    /// Show one user
    User {
        #[arg(value_name = "USER_ID")]
        id: String,
    },
    /// Create a user
    CreateUser {
        #[arg(short, long)]
        email: String,
        #[arg(short, long)]
        name: String,
        #[arg(short, long)]
        password: String,
        #[arg(short, long, default_value = "user")]
        role: Role,
    },
    /// Update a user's fields
    UpdateUser {
        #[arg(value_name = "USER_ID")]
        id: String,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        role: Option<Role>,
        #[arg(long)]
        password: Option<String>,
    },
    /// Delete a user
    DeleteUser {
        #[arg(value_name = "USER_ID")]
        id: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// List a user's images
    UserImages {
        #[arg(value_name = "USER_ID")]
        id: String,
    },
    /// Show one of a user's images
    UserImage {
        #[arg(value_name = "USER_ID")]
        user_id: String,
        #[arg(value_name = "IMAGE_ID")]
        image_id: String,
    },
    /// Delete one of a user's images
    DeleteUserImage {
        #[arg(value_name = "USER_ID")]
        user_id: String,
        #[arg(value_name = "IMAGE_ID")]
        image_id: String,
    },
    /// Delete all of a user's images
    DeleteUserImages {
        #[arg(value_name = "USER_ID")]
        id: String,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
    /// Download a user's data as a zip archive
    Download {
        #[arg(value_name = "USER_ID")]
        id: String,
        /// Directory to save into (default: config download_dir)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,
    },
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    let config = config::Config::load().context("load config")?;

    // Keep the guard alive so buffered log lines are flushed on exit.
    let _log_guard = match logging::init(&config) {
        Ok(guard) => Some(guard),
        Err(err) => {
            eprintln!("Warning: logging disabled: {err:#}");
            None
        }
    };

    // one tokio runtime for everything
    let rt = tokio::runtime::Runtime::new().context("create tokio runtime")?;
    rt.block_on(async move { dispatch(cli, config).await })
}

async fn dispatch(cli: Cli, config: config::Config) -> Result<()> {
    let Cli {
        command,
        api_url,
        json,
    } = cli;

    match command {
        Commands::Config { command } => dispatch_config(command),
        command => {
            let mut app = App::open(config, api_url.as_deref())?;
            let result = dispatch_session(&mut app, command, json).await;
            app.finish(result)
        }
    }
}

fn dispatch_config(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Path => {
            commands::config::path();
            Ok(())
        }
        ConfigCommands::Init => commands::config::init(),
        ConfigCommands::Generate => commands::config::generate(),
    }
}

async fn dispatch_session(app: &mut App, command: Commands, json: bool) -> Result<()> {
    match command {
        Commands::Config { command } => dispatch_config(command),
        Commands::Login { email, password } => commands::auth::login(app, &email, password).await,
        Commands::Logout => commands::auth::logout(app).await,
        Commands::Register {
            email,
            name,
            password,
        } => commands::auth::register(app, &email, &name, password).await,
        Commands::Whoami => commands::auth::whoami(app, json),

        Commands::Images { command } => {
            app.require_session()?;
            match command {
                ImageCommands::List => commands::images::list(app, json).await,
                ImageCommands::Show { id } => commands::images::show(app, &id, json).await,
                ImageCommands::Upload { file, analyze } => {
                    commands::images::upload(app, &file, analyze, json).await
                }
                ImageCommands::Delete { id } => commands::images::delete(app, &id).await,
                ImageCommands::DeleteAll { yes } => commands::images::delete_all(app, yes).await,
            }
        }

        Commands::Analyze { command } => {
            app.require_session()?;
            match command {
                AnalyzeCommands::Phase1 { id } => commands::analyze::phase1(app, &id, json).await,
                AnalyzeCommands::Phase2 { id } => commands::analyze::phase2(app, &id, json).await,
                AnalyzeCommands::Run { id } => commands::analyze::run_all(app, &id, json).await,
                AnalyzeCommands::Show { id } => commands::analyze::show(app, &id, json).await,
            }
        }

        Commands::Results { command } => {
            app.require_session()?;
            match command {
                ResultCommands::Fetch {
                    filename,
                    output,
                    open,
                } => commands::results::fetch(app, &filename, output, open).await,
            }
        }

        Commands::Admin { command } => {
            app.require_session()?;
            dispatch_admin(app, command, json).await
        }
    }
}

async fn dispatch_admin(app: &App, command: AdminCommands, json: bool) -> Result<()> {
    use commands::admin;

    match command {
        AdminCommands::Dashboard => admin::dashboard(app, json).await,
        AdminCommands::Users => admin::users(app, json).await,
        AdminCommands::User { id } => admin::user(app, &id, json).await,
        AdminCommands::CreateUser {
            email,
            name,
            password,
            role,
        } => admin::create_user(app, &email, &name, &password, role, json).await,
        AdminCommands::UpdateUser {
            id,
            email,
            name,
            role,
            password,
        } => {
            let update = forgeguard_core::api::UserUpdate {
                email,
                name,
                role,
                password,
            };
            admin::update_user(app, &id, &update, json).await
        }
        AdminCommands::DeleteUser { id, yes } => admin::delete_user(app, &id, yes).await,
        AdminCommands::UserImages { id } => admin::user_images(app, &id, json).await,
        AdminCommands::UserImage { user_id, image_id } => {
            admin::user_image(app, &user_id, &image_id, json).await
        }
        AdminCommands::DeleteUserImage { user_id, image_id } => {
            admin::delete_user_image(app, &user_id, &image_id).await
        }
        AdminCommands::DeleteUserImages { id, yes } => admin::delete_user_images(app, &id, yes).await,
        AdminCommands::Download { id, output } => admin::download(app, &id, output).await,
    }
}
