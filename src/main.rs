mod cli;
mod handlers;

use cli::CLI;
use colored::Colorize;
use handlers::{admin_handler::AdminHandler, kyc_handler::KycHandler};
use lawkyc::config::ClientConfig;
use lawkyc::errors::Result;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    // stdout belongs to the prompts.
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(fmt::layer().json().flatten_event(true).with_writer(std::io::stderr))
        .init();
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    init_tracing();
    if let Err(e) = run().await {
        eprintln!("{}", format!("Application error: {}", e).red());
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let config = ClientConfig::from_env()?;
    let args: Vec<String> = std::env::args().collect();

    if args.len() == 1 {
        return run_interactive(&config).await;
    }

    match args[1].as_str() {
        "status" => cli::handle_status_command(&config).await?,
        "my-kyc" => cli::handle_my_kyc_command(&config).await?,
        "admin" => cli::handle_admin_command(&config, &args[2..]).await?,
        "help" => CLI::print_help(),
        _ => {
            println!("{}", "Unknown command. Use 'help' to see available commands.".red());
        }
    }

    Ok(())
}

async fn run_interactive(config: &ClientConfig) -> Result<()> {
    CLI::print_header();
    CLI::print_info(&format!("Backend: {}", config.api_url));
    if config.access_token.is_none() {
        CLI::print_info("KYC_ACCESS_TOKEN is not set; requests are sent without a bearer token.");
    }

    let kyc = KycHandler::new(config);
    let admin = AdminHandler::new(config);

    loop {
        println!("\n{}", "⚖️  Lawyer KYC".cyan().bold());
        println!("{}", "=".repeat(40).blue());
        println!("1. 📝 Submit KYC");
        println!("2. 🧾 View My KYC");
        println!("3. 📋 Check KYC Status");
        println!("4. 🔁 Resubmit Rejected KYC");
        println!("5. 🛡️  Admin Review Desk");
        println!("{}", "─".repeat(40).blue());
        println!("0. 🚪 Exit");

        let choice = CLI::get_input("Select an option:")?;

        let outcome = match choice.trim() {
            "1" => kyc.submit_interactive().await,
            "2" => kyc.show_my_kyc().await,
            "3" => kyc.show_status().await,
            "4" => kyc.resubmit_interactive().await,
            "5" => admin.show_admin_menu().await,
            "0" => {
                println!("{}", "👋 Goodbye!".green().bold());
                break;
            }
            _ => {
                CLI::print_error("Invalid option. Please try again.");
                Ok(())
            }
        };

        if let Err(e) = outcome {
            CLI::print_error(&e.to_string());
        }
    }

    Ok(())
}
