mod commands;
pub use commands::*;

use colored::Colorize;
use lawkyc::errors::{AppError, Result};
use lawkyc::models::kyc::KycStatus;
use lawkyc::utils::validation::FieldErrors;
use std::io::{self, Write};

pub struct CLI;

impl CLI {
    pub fn print_header() {
        println!("{}", "=".repeat(50).bright_blue());
        println!("{}", "        ⚖️  Lawyer KYC - Command Line Interface   ".bright_yellow().bold());
        println!("{}", "=".repeat(50).bright_blue());
        println!();
    }

    pub fn print_success(message: &str) {
        println!("{} {}", "✅".green(), message.green());
    }

    pub fn print_error(message: &str) {
        println!("{} {}", "❌".red(), message.red());
    }

    pub fn print_info(message: &str) {
        println!("{} {}", "ℹ️".blue(), message.blue());
    }

    pub fn print_field_errors(errors: &FieldErrors) {
        for (field, message) in errors.iter() {
            println!("   {} {}: {}", "•".red(), field.label().yellow(), message.red());
        }
    }

    pub fn status_badge(status: &KycStatus) -> String {
        match status {
            KycStatus::Pending => "PENDING".yellow().bold().to_string(),
            KycStatus::Approved => "APPROVED".green().bold().to_string(),
            KycStatus::Rejected { .. } => "REJECTED".red().bold().to_string(),
        }
    }

    pub fn get_input(prompt: &str) -> Result<String> {
        print!("{} ", prompt.cyan());
        io::stdout().flush().map_err(|e| AppError::InternalError(format!("IO error: {}", e)))?;

        let mut input = String::new();
        io::stdin()
            .read_line(&mut input)
            .map_err(|e| AppError::InternalError(format!("Failed to read input: {}", e)))?;

        Ok(input.trim().to_string())
    }

    /// Prompts with the current value shown; an empty answer keeps it.
    pub fn get_input_or(prompt: &str, current: &str) -> Result<String> {
        if current.is_empty() {
            return Self::get_input(prompt);
        }
        let input = Self::get_input(&format!("{} [{}]", prompt, current))?;
        Ok(if input.is_empty() { current.to_string() } else { input })
    }

    pub fn confirm_action(prompt: &str) -> Result<bool> {
        loop {
            let input = Self::get_input(&format!("{} (y/n):", prompt))?;
            match input.to_lowercase().as_str() {
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => Self::print_error("Please enter 'y' for yes or 'n' for no"),
            }
        }
    }

    pub fn print_help() {
        println!("\n{}", "Available Commands:".cyan().bold());
        println!("  status");
        println!("    Show the status of your KYC submission");
        println!();
        println!("  my-kyc");
        println!("    Show your full KYC submission");
        println!();
        println!("  admin list [pending|approved|rejected]");
        println!("    List submissions, optionally filtered by status");
        println!();
        println!("  admin detail <id>");
        println!("    Show one submission in full");
        println!();
        println!("  admin approve <id>");
        println!("    Approve a pending submission");
        println!();
        println!("  admin reject <id> <reason...>");
        println!("    Reject a pending submission with a reason");
        println!();
        println!("  help");
        println!("    Show this help message");
        println!();
        println!("{}", "Run without arguments for the interactive menu.".dimmed());
        println!();
    }
}
