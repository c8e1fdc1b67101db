use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "rotor-cli")]
#[command(about = "Management CLI for the gen-rotor rotation layer", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[arg(short, long, default_value = "rotor-admin-key")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show rotation statistics and per-backend usage
    Stats,
    /// Force a rotation (advances the diagnostic counter)
    Rotate,
    /// Reset all counters and reactivate every backend
    Reset,
    /// Register a backend at runtime
    AddBackend {
        name: String,
        #[arg(long, default_value_t = 0)]
        priority: u32,
        #[arg(long)]
        daily_quota: u64,
        #[arg(long, default_value = "general")]
        category: String,
        #[arg(long, default_value_t = 1024)]
        max_output_length: u32,
        #[arg(long, default_value_t = 0.7)]
        sampling_temperature: f64,
    },
    /// Deregister a backend
    RemoveBackend { name: String },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    match cli.command {
        Commands::Stats => {
            let res = client
                .get(format!("{}/admin/stats", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Rotate => {
            let res = client
                .post(format!("{}/admin/rotate", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Reset => {
            let res = client
                .post(format!("{}/admin/reset", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::AddBackend {
            name,
            priority,
            daily_quota,
            category,
            max_output_length,
            sampling_temperature,
        } => {
            let body = serde_json::json!({
                "name": name,
                "priority": priority,
                "daily_quota": daily_quota,
                "category": category,
                "max_output_length": max_output_length,
                "sampling_temperature": sampling_temperature,
            });
            let res = client
                .post(format!("{}/admin/backends", cli.url))
                .headers(headers)
                .json(&body)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::RemoveBackend { name } => {
            let res = client
                .delete(format!("{}/admin/backends/{}", cli.url, name))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            if !text.is_empty() {
                eprintln!("{}", text);
            }
        }
        std::process::exit(1);
    }

    let text = res.text().await?;
    if text.is_empty() {
        println!("OK");
        return Ok(());
    }
    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }

    Ok(())
}
