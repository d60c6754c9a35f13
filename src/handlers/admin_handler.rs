use crate::cli::CLI;
use crate::handlers::kyc_handler::print_submission;
use colored::*;
use lawkyc::api::HttpKycBackend;
use lawkyc::config::ClientConfig;
use lawkyc::errors::{AppError, Result};
use lawkyc::models::kyc::{KycReviewRecord, ReviewStatus};
use lawkyc::services::AdminReviewStore;

pub struct AdminHandler {
    store: AdminReviewStore<HttpKycBackend>,
}

impl AdminHandler {
    pub fn new(config: &ClientConfig) -> Self {
        Self { store: AdminReviewStore::new(HttpKycBackend::new(config)) }
    }

    pub async fn show_admin_menu(&self) -> Result<()> {
        loop {
            println!("\n{}", "🛡️  KYC Review Desk".cyan().bold());
            println!("{}", "=".repeat(50).blue());
            println!("1. 📋 List All Submissions");
            println!("2. 🔎 List by Status");
            println!("3. 🧾 View Submission Details");
            println!("4. ✅ Approve Submission");
            println!("5. ❌ Reject Submission");
            println!("6. 📊 Summary");
            println!("0. 🔙 Back to Main Menu");
            println!("{}", "=".repeat(50).blue());

            let choice = CLI::get_input("Select an option:")?;

            let outcome = match choice.trim() {
                "1" => self.list(None).await,
                "2" => match prompt_status()? {
                    Some(status) => self.list(Some(status)).await,
                    None => Ok(()),
                },
                "3" => match prompt_id()? {
                    Some(id) => self.show_detail(id).await,
                    None => Ok(()),
                },
                "4" => match prompt_id()? {
                    Some(id) => self.approve(id).await,
                    None => Ok(()),
                },
                "5" => match prompt_id()? {
                    Some(id) => {
                        let reason = CLI::get_input("Rejection reason:")?;
                        self.reject(id, &reason).await
                    }
                    None => Ok(()),
                },
                "6" => {
                    self.print_summary().await;
                    Ok(())
                }
                "0" => break,
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

    pub async fn list(&self, filter: Option<ReviewStatus>) -> Result<()> {
        let records = self.store.list(filter).await?;
        let title = match filter {
            Some(status) => format!("Submissions ({})", status),
            None => "All submissions".to_string(),
        };
        println!("\n{}", title.cyan().bold());
        println!("{}", "─".repeat(70).blue());
        if records.is_empty() {
            println!("{}", "No KYC submissions found.".yellow());
            return Ok(());
        }
        for record in &records {
            print_row(record);
        }
        Ok(())
    }

    pub async fn show_detail(&self, id: u64) -> Result<()> {
        let record = self.store.detail(id).await?;
        print_submission(&record.submission);
        Ok(())
    }

    pub async fn approve(&self, id: u64) -> Result<()> {
        if !CLI::confirm_action(&format!("Approve KYC #{}?", id))? {
            println!("{}", "Cancelled.".yellow());
            return Ok(());
        }
        let record = self.store.approve(id).await?;
        CLI::print_success(&format!("KYC #{} is now {}", record.id(), record.status()));
        Ok(())
    }

    pub async fn reject(&self, id: u64, reason: &str) -> Result<()> {
        let record = self.store.reject(id, reason).await?;
        CLI::print_success(&format!("KYC #{} is now {}", record.id(), record.status()));
        Ok(())
    }

    async fn print_summary(&self) {
        let state = self.store.state().await;
        if state.records.is_empty() {
            CLI::print_info("Load a list first.");
            return;
        }
        let counts = state.counts();
        println!("\n{}", "📊 Summary".cyan().bold());
        println!("  Pending:  {}", counts.pending.to_string().yellow());
        println!("  Approved: {}", counts.approved.to_string().green());
        println!("  Rejected: {}", counts.rejected.to_string().red());
        println!("  Total:    {}", counts.total());

        let reviewed: Vec<&KycReviewRecord> =
            state.records.iter().filter(|r| r.last_action.is_some()).collect();
        if !reviewed.is_empty() {
            println!("\n{}", "Reviewed this session:".bold());
            for record in reviewed {
                print_row(record);
            }
        }
    }
}

fn print_row(record: &KycReviewRecord) {
    let name = record.user_name.as_deref().unwrap_or_else(|| record.submission.applicant_name());
    let email = record.submission.user_email.as_deref().unwrap_or("-");
    let submitted = record
        .submission
        .created_at
        .map(|t| t.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "  #{:<5} {:<24} {:<28} {:<10} {}",
        record.id(),
        name,
        email,
        submitted,
        CLI::status_badge(record.status())
    );
    if let Some(reason) = record.status().rejection_reason() {
        println!("         {} {}", "reason:".dimmed(), reason);
    }
}

fn prompt_id() -> Result<Option<u64>> {
    let input = CLI::get_input("KYC id:")?;
    if input.is_empty() {
        return Ok(None);
    }
    input
        .parse::<u64>()
        .map(Some)
        .map_err(|_| AppError::ValidationError(format!("'{}' is not a valid id", input)))
}

fn prompt_status() -> Result<Option<ReviewStatus>> {
    let input = CLI::get_input("Status (pending/approved/rejected):")?;
    if input.is_empty() {
        return Ok(None);
    }
    input.parse::<ReviewStatus>().map(Some).map_err(AppError::ValidationError)
}
