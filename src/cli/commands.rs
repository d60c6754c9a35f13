use crate::cli::CLI;
use crate::handlers::admin_handler::AdminHandler;
use crate::handlers::kyc_handler::KycHandler;
use colored::Colorize;
use lawkyc::config::ClientConfig;
use lawkyc::errors::{AppError, Result};
use lawkyc::models::kyc::ReviewStatus;

pub async fn handle_status_command(config: &ClientConfig) -> Result<()> {
    KycHandler::new(config).show_status().await
}

pub async fn handle_my_kyc_command(config: &ClientConfig) -> Result<()> {
    KycHandler::new(config).show_my_kyc().await
}

pub async fn handle_admin_command(config: &ClientConfig, args: &[String]) -> Result<()> {
    if args.is_empty() {
        print_admin_usage();
        return Ok(());
    }

    let handler = AdminHandler::new(config);
    match args[0].as_str() {
        "list" => {
            let filter = match args.get(1) {
                Some(raw) => Some(raw.parse::<ReviewStatus>().map_err(AppError::ValidationError)?),
                None => None,
            };
            handler.list(filter).await?;
        }
        "approve" => {
            let id = parse_id(args.get(1))?;
            handler.approve(id).await?;
        }
        "reject" => {
            let id = parse_id(args.get(1))?;
            let reason = args[2.min(args.len())..].join(" ");
            if reason.trim().is_empty() {
                println!("{}", "Error: Missing rejection reason".red().bold());
                println!("Usage: admin reject <id> <reason...>");
                return Ok(());
            }
            handler.reject(id, &reason).await?;
        }
        "detail" => {
            let id = parse_id(args.get(1))?;
            handler.show_detail(id).await?;
        }
        _ => {
            CLI::print_error("Unknown admin command.");
            print_admin_usage();
        }
    }

    Ok(())
}

fn parse_id(raw: Option<&String>) -> Result<u64> {
    let raw = raw.ok_or_else(|| AppError::ValidationError("Missing KYC id".to_string()))?;
    raw.parse::<u64>()
        .map_err(|_| AppError::ValidationError(format!("'{}' is not a valid id", raw)))
}

fn print_admin_usage() {
    println!("{}", "Admin command usage:".cyan().bold());
    println!("  admin list [pending|approved|rejected]");
    println!("  admin detail <id>");
    println!("  admin approve <id>");
    println!("  admin reject <id> <reason...>");
}
