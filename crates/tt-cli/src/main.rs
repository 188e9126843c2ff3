//! tt-cli - command line front end for the tasks/tickets backend
//!
//! Each run restores the session and last-used selection from the
//! preferences file, applies `--project`/`--filter` the way URL query
//! parameters would be applied, runs one command and prints JSON.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::{Value, json};
use std::sync::Arc;
use tt_api::HttpApiClient;
use tt_store::{App, FilePreferences, IssueQuery, MemoryNavigator, Preferences, Query, SortSpec, preferences::TOKEN};

use ::log::{debug, warn};

use crate::config::Config;

mod config;

/// tt-cli - browse and work on issues
#[derive(Parser, Debug)]
#[command(name = "tt-cli")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Route the selection is applied on; only the issues route mirrors it
    /// back into the query
    #[arg(long, default_value = "/issues")]
    route: String,

    /// Project acronym, takes precedence over the last used one
    #[arg(short, long)]
    project: Option<String>,

    /// Filter id, takes precedence over the last used one
    #[arg(short, long)]
    filter: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the session and the current selection
    Status,

    /// List one page of issues
    #[command(alias = "ls")]
    Issues {
        /// Page size, defaults to the configured one
        #[arg(short, long)]
        limit: Option<u32>,

        #[arg(short, long, default_value = "0")]
        skip: u32,

        /// Free-text search, replaces the filter
        #[arg(long)]
        search: Option<String>,
    },

    /// Show one issue and make it current
    Issue {
        id: String,

        /// Do not select the issue's project
        #[arg(long)]
        no_select: bool,
    },

    /// Change the sort of the issue list; without a target the sort is cleared
    Sort {
        target: Option<String>,

        /// Sort descending
        #[arg(long)]
        desc: bool,
    },

    /// Comment on an issue
    Comment {
        id: String,
        text: String,

        #[arg(long)]
        private: bool,
    },

    /// Run a workflow action on an issue
    Action {
        id: String,
        action: String,

        /// JSON object of fields to set
        #[arg(long)]
        set: Option<String>,
    },

    /// Delete an issue
    Delete { id: String },

    /// Log in and remember the session
    Login {
        login: String,

        #[arg(long)]
        password: String,

        #[arg(long)]
        remember: bool,
    },

    /// Forget the session
    Logout,
}

impl Commands {
    fn needs_catalog(&self) -> bool {
        matches!(
            self,
            Commands::Status | Commands::Issues { .. } | Commands::Issue { .. } | Commands::Sort { .. }
        )
    }
}

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("tt_store=info,tt_cli=info"))
        .init();
}

fn url_query(cli: &Cli) -> Query {
    let mut query = Query::new();
    if let Some(project) = &cli.project {
        query.insert("project".to_string(), Some(project.clone()));
    }
    if let Some(filter) = &cli.filter {
        query.insert("filter".to_string(), Some(filter.clone()));
    }
    query
}

#[tokio::main]
async fn main() -> Result<()> {
    init_logger();

    match dotenvy::dotenv() {
        Ok(path) => debug!("Loaded .env file from: {:?}", path),
        Err(_) => debug!(".env file not found, relying on environment variables"),
    }

    let cli = Cli::parse();
    let config = Config::load();

    let preferences = FilePreferences::open(&config.preferences_file)
        .with_context(|| format!("Failed to open preferences at {}", config.preferences_file.display()))?;
    if let Some(token) = &config.token {
        preferences.set(TOKEN, token).await?;
    }

    let api = Arc::new(HttpApiClient::new(config.api_base_url.clone()));
    let navigator = Arc::new(MemoryNavigator::new(&cli.route, url_query(&cli)));
    let app = App::new(api, Arc::new(preferences), navigator.clone());

    app.initialize().await.context("Failed to restore session")?;

    if cli.command.needs_catalog() {
        let outcome = app.load().await.context("Failed to load project catalog")?.settled().await;
        if !outcome.is_ok() {
            warn!("Selection only partially restored: {:?}", outcome);
        }
    }

    let output = run(&app, &config, cli.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);

    debug!("Navigation history: {:?}", navigator.history());
    Ok(())
}

async fn run(app: &App, config: &Config, command: Commands) -> Result<Value> {
    let output = match command {
        Commands::Status => status(app),

        Commands::Issues { limit, skip, search } => {
            let mut query = IssueQuery::page(limit.unwrap_or(config.page_size), skip);
            if let Some(search) = search {
                query = query.search(search);
            }
            app.get_issues(&query).await?
        }

        Commands::Issue { id, no_select } => {
            let issue = app.get_issue(&id, !no_select).await?;
            serde_json::to_value(issue)?
        }

        Commands::Sort { target, desc } => {
            let sort = target.map(|target| SortSpec::new(&target, if desc { -1 } else { 1 }));
            app.set_sort(sort).await;
            status(app)
        }

        Commands::Comment { id, text, private } => app.add_comment(&text, private, Some(&id)).await?,

        Commands::Action { id, action, set } => {
            let set = set
                .map(|set| serde_json::from_str::<Value>(&set))
                .transpose()
                .context("--set must be a JSON object")?;
            app.do_action(&action, set, Some(&id)).await?
        }

        Commands::Delete { id } => app.delete_issue(Some(&id)).await?,

        Commands::Login {
            login,
            password,
            remember,
        } => {
            app.login(&login, &password, Some(remember)).await?;
            json!({ "user": app.state().auth.user })
        }

        Commands::Logout => {
            app.logout().await;
            json!({ "loggedOut": true })
        }
    };

    Ok(output)
}

fn status(app: &App) -> Value {
    let state = app.state();
    let selection = &state.tt.selection;
    json!({
        "user": state.auth.user,
        "did": state.auth.did,
        "project": selection.acronym(),
        "filter": selection.filter.as_ref().map(|filter| json!({
            "id": filter.id(),
            "label": filter.label,
        })),
        "sort": selection.sort,
    })
}
