//! CLI tool to generate organization API keys.
//!
//! Usage:
//!   cargo run --bin generate-api-key -- --org <uuid> --name "CI - GitHub Actions" --expires-in 365d

use std::env;

use uuid::Uuid;

use test_analytics_lib::config::Config;
use test_analytics_lib::db::DbPool;
use test_analytics_lib::services::api_key;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let args: Vec<String> = env::args().collect();

    let mut organization: Option<String> = None;
    let mut name: Option<String> = None;
    let mut expires_in: Option<String> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--org" | "-o" => {
                i += 1;
                organization = args.get(i).cloned();
            }
            "--name" | "-n" => {
                i += 1;
                name = args.get(i).cloned();
            }
            "--expires-in" | "-e" => {
                i += 1;
                expires_in = args.get(i).cloned();
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    let Some(name) = name else {
        eprintln!("Error: --name is required");
        print_usage();
        std::process::exit(1);
    };

    let organization_id = match organization.as_deref().map(Uuid::parse_str) {
        Some(Ok(id)) => id,
        Some(Err(_)) => {
            eprintln!("Error: --org must be a UUID");
            std::process::exit(1);
        }
        None => {
            eprintln!("Error: --org is required");
            print_usage();
            std::process::exit(1);
        }
    };

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            std::process::exit(1);
        }
    };

    let pool = match DbPool::new(&config.database).await {
        Ok(p) => p,
        Err(e) => {
            eprintln!("Error connecting to database: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = pool.run_migrations().await {
        eprintln!("Error running migrations: {}", e);
        std::process::exit(1);
    }

    let (full_key, api_key) =
        match api_key::create_key(&pool, organization_id, &name, expires_in.as_deref()).await {
            Ok(result) => result,
            Err(e) => {
                eprintln!("Error generating key: {}", e);
                std::process::exit(1);
            }
        };

    println!();
    println!("================================================================");
    println!("  API Key Generated");
    println!("================================================================");
    println!();
    println!("  ID:           {}", api_key.id);
    println!("  Organization: {}", api_key.organization_id);
    println!("  Name:         {}", api_key.name);
    println!("  Prefix:       {}", api_key.key_prefix);
    match api_key.expires_at {
        Some(expires) => println!("  Expires:      {}", expires.to_rfc3339()),
        None => println!("  Expires:      Never"),
    }
    println!();
    println!("  Key:          {}", full_key);
    println!();
    println!("  Save this key! It cannot be retrieved later.");
    println!("================================================================");
    println!();
}

fn print_usage() {
    eprintln!();
    eprintln!("Usage: generate-api-key --org <uuid> --name <name> [--expires-in <duration>]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --org, -o         Organization the key resolves to (required)");
    eprintln!("  --name, -n        Name for the API key (required)");
    eprintln!("  --expires-in, -e  Expiration: 30d, 2w, 6m, 1y (default: never)");
    eprintln!("  --help, -h        Show this help");
    eprintln!();
}
