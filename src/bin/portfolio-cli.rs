use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::{json, Value};

use portfolio_server::auth::password::{hash_password, hash_password_with, DEFAULT_ITERATIONS};

#[derive(Parser)]
#[command(name = "portfolio-cli")]
#[command(about = "Management CLI for the portfolio server", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    /// Session token from `login`
    #[arg(short, long)]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a password hash for `auth.admin_password_hash`
    HashPassword {
        password: String,
        #[arg(long, default_value_t = DEFAULT_ITERATIONS)]
        iterations: u32,
    },
    /// Log in and print the session token
    Login { email: String, password: String },
    /// Show dashboard statistics
    Stats,
    /// List inbox messages
    Messages {
        /// NEW, READ or ARCHIVED
        #[arg(long)]
        status: Option<String>,
    },
    /// Check server liveness
    Health,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(token) = &cli.token {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))?,
        );
    }

    match cli.command {
        Commands::HashPassword { password, iterations } => {
            let hash = if iterations == DEFAULT_ITERATIONS {
                hash_password(&password)
            } else {
                let salt: [u8; 16] = rand::random();
                hash_password_with(&password, &salt, iterations)
            };
            println!("{}", hash);
        }
        Commands::Login { email, password } => {
            let res = client
                .post(format!("{}/api/auth/login", cli.url))
                .json(&json!({ "email": email, "password": password }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Stats => {
            let res = client
                .get(format!("{}/admin/dashboard", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Messages { status } => {
            let mut req = client.get(format!("{}/api/contact", cli.url)).headers(headers);
            if let Some(status) = status {
                req = req.query(&[("status", status.to_uppercase())]);
            }
            print_response(req.send().await?).await?;
        }
        Commands::Health => {
            let res = client.get(format!("{}/api/health", cli.url)).send().await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: server returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
