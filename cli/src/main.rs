use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use ghostwriter::{
    ApiClient, ApiError, AuthService, ClientConfig, ContentPieces, FileTokenStore, Personas,
};
use serde_json::Value;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("{0}")]
    Api(ApiError),
    #[error("{0}\nhint: no valid session; run `ghostwriter login`")]
    Unauthorized(ApiError),
    #[error("failed to read {path}: {source}")]
    ReadInput { path: String, source: io::Error },
    #[error("invalid --set value `{0}`; expected key=value")]
    InvalidAssignment(String),
    #[error("invalid JSON payload: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

impl From<ApiError> for CliError {
    fn from(error: ApiError) -> Self {
        if error.is_unauthorized() {
            Self::Unauthorized(error)
        } else {
            Self::Api(error)
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "ghostwriter", about = "Ghostwriter persona and content CLI")]
struct Cli {
    /// API root, e.g. http://localhost:8000/api/
    #[arg(long, env = "GHOSTWRITER_BASE_URL")]
    base_url: Option<String>,

    #[arg(long, env = "GHOSTWRITER_TOKEN_FILE")]
    token_file: Option<PathBuf>,

    #[arg(short, long, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    Login {
        #[arg(long)]
        username: String,
        #[arg(long, env = "GHOSTWRITER_PASSWORD", hide_env_values = true)]
        password: String,
    },
    Register {
        #[arg(long)]
        username: String,
        #[arg(long, env = "GHOSTWRITER_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        email: String,
    },
    Logout,
    /// Show where tokens are kept and whether a session is stored.
    Status,
    Persona(PersonaCommand),
    /// Generate a post in a persona's voice.
    Generate {
        persona_id: u64,
        #[arg(long)]
        prompt: String,
    },
    Post(PostCommand),
}

#[derive(Args, Debug)]
struct PersonaCommand {
    #[command(subcommand)]
    command: PersonaSubcommand,
}

#[derive(Subcommand, Debug)]
enum PersonaSubcommand {
    List,
    Show {
        persona_id: u64,
    },
    /// Create a persona from a writing sample.
    Upload {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "-", help = "Writing sample file path, or - for stdin")]
        sample: String,
    },
    Update {
        persona_id: u64,
        #[arg(long = "set", value_name = "KEY=VALUE", required = true)]
        assignments: Vec<String>,
    },
    Delete {
        persona_id: u64,
    },
}

#[derive(Args, Debug)]
struct PostCommand {
    #[command(subcommand)]
    command: PostSubcommand,
}

#[derive(Subcommand, Debug)]
enum PostSubcommand {
    List,
    Show { post_id: u64 },
    Delete { post_id: u64 },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = load_config(&cli)?;
    let store = Arc::new(FileTokenStore::open(&config.token_file));
    let client = ApiClient::from_config(&config, store)?;

    match cli.command {
        Command::Login { username, password } => run_login(&client, &username, &password).await,
        Command::Register { username, password, email } => {
            let body = AuthService::new(client).register(&username, &password, &email).await?;
            print_json(&body)
        }
        Command::Logout => {
            client.logout()?;
            eprintln!("logged out");
            Ok(())
        }
        Command::Status => print_json(&serde_json::json!({
            "base_url": config.base_url,
            "token_file": config.token_file.display().to_string(),
            "authenticated": client.is_authenticated(),
        })),
        Command::Persona(persona) => run_persona(client, persona).await,
        Command::Generate { persona_id, prompt } => {
            let piece = Personas::new(client).generate_content(persona_id, &prompt).await?;
            print_json(&serde_json::to_value(piece)?)
        }
        Command::Post(post) => run_post(client, post).await,
    }
}

fn load_config(cli: &Cli) -> Result<ClientConfig, CliError> {
    let mut config = ClientConfig::from_env()?;
    if let Some(base_url) = &cli.base_url {
        config = config.with_base_url(base_url)?;
    }
    if let Some(token_file) = &cli.token_file {
        config.token_file.clone_from(token_file);
    }
    Ok(config)
}

async fn run_login(client: &ApiClient, username: &str, password: &str) -> Result<(), CliError> {
    let pair = AuthService::new(client.clone()).login(username, password).await?;
    client.store_credentials(&pair)?;
    tracing::debug!(username, "credentials stored");
    eprintln!("logged in as {username}");
    Ok(())
}

async fn run_persona(client: ApiClient, persona: PersonaCommand) -> Result<(), CliError> {
    let personas = Personas::new(client);
    match persona.command {
        PersonaSubcommand::List => {
            let list = personas.list().await?;
            print_json(&serde_json::to_value(list)?)
        }
        PersonaSubcommand::Show { persona_id } => {
            let persona = personas.get(persona_id).await?;
            print_json(&serde_json::to_value(persona)?)
        }
        PersonaSubcommand::Upload { name, sample } => {
            let writing_sample = read_input(&sample)?;
            let created = personas.create_from_sample(&name, &writing_sample).await?;
            eprintln!("persona \"{}\" created", created.display_name());
            print_json(&serde_json::to_value(created)?)
        }
        PersonaSubcommand::Update { persona_id, assignments } => {
            let mut persona = personas.get(persona_id).await?;
            for raw in &assignments {
                let (key, value) = parse_assignment(raw)?;
                persona.set_field(&key, value)?;
            }
            let updated = personas.update(&persona).await?;
            print_json(&serde_json::to_value(updated)?)
        }
        PersonaSubcommand::Delete { persona_id } => {
            personas.delete(persona_id).await?;
            eprintln!("deleted persona {persona_id}");
            Ok(())
        }
    }
}

async fn run_post(client: ApiClient, post: PostCommand) -> Result<(), CliError> {
    let content = ContentPieces::new(client);
    match post.command {
        PostSubcommand::List => {
            let list = content.list().await?;
            print_json(&serde_json::to_value(list)?)
        }
        PostSubcommand::Show { post_id } => {
            let piece = content.get(post_id).await?;
            print_json(&serde_json::to_value(piece)?)
        }
        PostSubcommand::Delete { post_id } => {
            content.delete(post_id).await?;
            eprintln!("deleted post {post_id}");
            Ok(())
        }
    }
}

fn read_input(path: &str) -> Result<String, CliError> {
    let read = if path == "-" {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text).map(|_| text)
    } else {
        std::fs::read_to_string(path)
    };
    read.map_err(|source| CliError::ReadInput { path: path.to_owned(), source })
}

/// Split `key=value`. The value is taken as JSON when it parses (numbers,
/// booleans, null, quoted strings) and as a bare string otherwise.
fn parse_assignment(raw: &str) -> Result<(String, Value), CliError> {
    let Some((key, value)) = raw.split_once('=') else {
        return Err(CliError::InvalidAssignment(raw.to_owned()));
    };
    let key = key.trim();
    if key.is_empty() {
        return Err(CliError::InvalidAssignment(raw.to_owned()));
    }
    let value = value.trim();
    let parsed = serde_json::from_str::<Value>(value).unwrap_or_else(|_| Value::String(value.to_owned()));
    Ok((key.to_owned(), parsed))
}

fn print_json(value: &Value) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value)?;
    println!("{rendered}");
    Ok(())
}

#[cfg(test)]
#[path = "main_test.rs"]
mod tests;
