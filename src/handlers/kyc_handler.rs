use crate::cli::CLI;
use colored::*;
use lawkyc::api::HttpKycBackend;
use lawkyc::config::ClientConfig;
use lawkyc::errors::Result;
use lawkyc::models::document::{DocumentFile, DocumentSlot};
use lawkyc::models::form::{FormField, KycForm, WizardTab, EXPERIENCE_BANDS, SPECIALIZATIONS, WEEKDAYS};
use lawkyc::models::kyc::{Gender, KycSubmission, SubmissionState};
use lawkyc::services::{FlowPhase, KycStore, KycWizard};

pub struct KycHandler {
    store: KycStore<HttpKycBackend>,
}

enum TabAction {
    Continue,
    Back,
    Quit,
}

impl KycHandler {
    pub fn new(config: &ClientConfig) -> Self {
        Self { store: KycStore::new(HttpKycBackend::new(config)) }
    }

    pub async fn submit_interactive(&self) -> Result<()> {
        println!("\n{}", "📝 Submit KYC".cyan().bold());
        println!("{}", "=".repeat(40).blue());

        let report = self.store.fetch_status().await?;
        if let SubmissionState::Submitted(status) = &report.state {
            println!("You already have a submission: {}", CLI::status_badge(status));
            if status.is_rejected() {
                CLI::print_info("Use 'Resubmit rejected KYC' to correct and resend it.");
            }
            return Ok(());
        }

        self.run_wizard(KycWizard::new()).await
    }

    pub async fn resubmit_interactive(&self) -> Result<()> {
        println!("\n{}", "🔁 Resubmit KYC".cyan().bold());
        println!("{}", "=".repeat(40).blue());

        let Some(kyc) = self.store.fetch_mine().await? else {
            CLI::print_info("No KYC submission found. Submit one first.");
            return Ok(());
        };
        if !kyc.status.is_rejected() {
            println!("Current status: {}", CLI::status_badge(&kyc.status));
            CLI::print_info("Only a rejected submission can be resubmitted.");
            return Ok(());
        }

        if let Some(reason) = kyc.status.rejection_reason() {
            println!("{} {}", "Rejection reason:".red().bold(), reason);
        }
        CLI::print_info("Your previous answers are pre-filled. Press Enter to keep a value.");
        self.run_wizard(KycWizard::resume(&kyc)?).await
    }

    pub async fn show_my_kyc(&self) -> Result<()> {
        match self.store.fetch_mine().await? {
            Some(kyc) => print_submission(&kyc),
            None => CLI::print_info("You have not submitted KYC yet."),
        }
        Ok(())
    }

    pub async fn show_status(&self) -> Result<()> {
        let report = self.store.fetch_status().await?;
        println!("\n{}", "📋 KYC Status".cyan().bold());
        match &report.state {
            SubmissionState::NotSubmitted => println!("Status: {}", "NOT SUBMITTED".dimmed()),
            SubmissionState::Submitted(status) => {
                println!("Status: {}", CLI::status_badge(status));
                if let Some(reason) = status.rejection_reason() {
                    println!("Reason: {}", reason.red());
                }
            }
        }
        if let Some(updated) = report.updated_at {
            println!("Last updated: {}", updated.format("%Y-%m-%d %H:%M:%S UTC"));
        }
        Ok(())
    }

    async fn run_wizard(&self, mut wizard: KycWizard) -> Result<()> {
        loop {
            let tab = wizard.tab();
            let position = WizardTab::ALL.iter().position(|t| *t == tab).unwrap_or(0) + 1;
            let label = match wizard.phase(&self.store.state().await) {
                FlowPhase::Resubmitting(_) => " (resubmission)",
                _ => "",
            };
            println!("\n{} {}{}", format!("Step {}/4:", position).yellow(), tab.title().cyan().bold(), label.dimmed());
            println!("{}", "─".repeat(40).blue());

            match tab {
                WizardTab::Personal => prompt_personal(&mut wizard)?,
                WizardTab::Professional => prompt_professional(&mut wizard)?,
                WizardTab::Identity => prompt_documents(&mut wizard).await?,
                WizardTab::Declaration => prompt_declaration(&mut wizard)?,
            }

            match ask_tab_action(tab)? {
                TabAction::Quit => {
                    CLI::print_info("KYC wizard closed. Nothing was sent.");
                    return Ok(());
                }
                TabAction::Back => {
                    wizard.back();
                    continue;
                }
                TabAction::Continue => {}
            }

            if let Err(errors) = wizard.advance() {
                CLI::print_error("Please fix the following before continuing:");
                CLI::print_field_errors(&errors);
                continue;
            }

            if tab == WizardTab::Declaration {
                match wizard.submit(&self.store).await {
                    Ok(submission) => {
                        CLI::print_success("KYC submitted for review.");
                        println!("Reference: #{}  Status: {}", submission.id, CLI::status_badge(&submission.status));
                        return Ok(());
                    }
                    Err(e) => {
                        CLI::print_error(&format!("Submission failed: {}", e));
                        if wizard.tab() != WizardTab::Declaration {
                            CLI::print_field_errors(wizard.errors());
                        }
                        if !CLI::confirm_action("Try again?")? {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}

fn ask_tab_action(tab: WizardTab) -> Result<TabAction> {
    let hint = if tab == WizardTab::Declaration { "submit" } else { "next" };
    loop {
        let input = CLI::get_input(&format!("[Enter] {}, [b] back, [q] quit:", hint))?;
        match input.to_lowercase().as_str() {
            "" | "n" => return Ok(TabAction::Continue),
            "b" => return Ok(TabAction::Back),
            "q" => return Ok(TabAction::Quit),
            _ => CLI::print_error("Unknown choice"),
        }
    }
}

fn prompt_text(
    wizard: &mut KycWizard,
    field: FormField,
    current: &str,
    apply: impl FnOnce(&mut KycForm, String),
) -> Result<()> {
    let value = CLI::get_input_or(&format!("{}:", field.label()), current)?;
    if let Some(message) = wizard.edit(field, |form| apply(form, value)) {
        println!("   {}", message.red());
    }
    Ok(())
}

fn prompt_personal(wizard: &mut KycWizard) -> Result<()> {
    let p = wizard.form().personal.clone();
    prompt_text(wizard, FormField::FullName, &p.full_name, |f, v| f.personal.full_name = v)?;
    prompt_text(wizard, FormField::Email, &p.email, |f, v| f.personal.email = v)?;
    prompt_text(wizard, FormField::Phone, &p.phone, |f, v| f.personal.phone = v)?;
    prompt_text(wizard, FormField::Dob, &p.dob, |f, v| f.personal.dob = v)?;

    let options: Vec<&str> = Gender::ALL.iter().map(|g| g.as_str()).collect();
    let current = p.gender.map(|g| g.as_str()).unwrap_or("");
    let answer = CLI::get_input_or(&format!("Gender ({}):", options.join("/")), current)?;
    let gender = answer.parse::<Gender>().ok();
    if let Some(message) = wizard.edit(FormField::Gender, |f| f.personal.gender = gender) {
        println!("   {}", message.red());
    }

    prompt_text(wizard, FormField::PermanentAddress, &p.permanent_address, |f, v| {
        f.personal.permanent_address = v
    })?;
    prompt_text(wizard, FormField::CurrentAddress, &p.current_address, |f, v| {
        f.personal.current_address = v
    })
}

fn prompt_professional(wizard: &mut KycWizard) -> Result<()> {
    let p = wizard.form().professional.clone();
    prompt_text(wizard, FormField::BarCouncilNumber, &p.bar_council_number, |f, v| {
        f.professional.bar_council_number = v
    })?;
    prompt_text(wizard, FormField::LawFirmName, &p.law_firm_name, |f, v| f.professional.law_firm_name = v)?;

    println!("Experience bands: {}", EXPERIENCE_BANDS.join(", "));
    prompt_text(wizard, FormField::YearsOfExperience, &p.years_of_experience, |f, v| {
        f.professional.years_of_experience = v
    })?;
    prompt_text(wizard, FormField::ConsultationFee, &p.consultation_fee, |f, v| {
        f.professional.consultation_fee = v
    })?;

    let picked = pick_many("Specializations", &SPECIALIZATIONS, &p.specializations)?;
    wizard.edit(FormField::Specializations, |f| {
        for tag in picked {
            f.professional.toggle_specialization(tag);
        }
    });
    let picked = pick_many("Availability days", &WEEKDAYS, &p.availability_days)?;
    wizard.edit(FormField::AvailabilityDays, |f| {
        for day in picked {
            f.professional.toggle_day(day);
        }
    });

    prompt_text(wizard, FormField::AvailableFrom, &p.available_from, |f, v| f.professional.available_from = v)?;
    prompt_text(wizard, FormField::AvailableUntil, &p.available_until, |f, v| {
        f.professional.available_until = v
    })
}

/// Shows a numbered checklist and returns the entries whose selection the user toggled.
fn pick_many<'a>(title: &str, options: &[&'a str], selected: &[String]) -> Result<Vec<&'a str>> {
    println!("{}", format!("{}:", title).bold());
    for (i, option) in options.iter().enumerate() {
        let mark = if selected.iter().any(|s| s == option) { "[x]".green() } else { "[ ]".normal() };
        println!("  {:>2}. {} {}", i + 1, mark, option);
    }
    let input = CLI::get_input("Numbers to toggle (comma separated, Enter to keep):")?;
    let mut toggled = Vec::new();
    for part in input.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        match part.parse::<usize>().ok().and_then(|n| n.checked_sub(1)).and_then(|i| options.get(i)) {
            Some(option) => toggled.push(*option),
            None => CLI::print_error(&format!("Ignoring '{}'", part)),
        }
    }
    Ok(toggled)
}

async fn prompt_documents(wizard: &mut KycWizard) -> Result<()> {
    CLI::print_info("Accepted: PDF, JPG, PNG up to 5MB. Enter a file path, or press Enter to keep.");
    for field in FormField::DOCUMENTS {
        let current = wizard
            .form()
            .documents
            .slot(field)
            .map(DocumentSlot::describe)
            .unwrap_or_default();
        println!("{} {}", field.label().bold(), format!("({})", current).dimmed());

        let path = CLI::get_input("  Path:")?;
        if !path.is_empty() {
            match DocumentFile::load(&path).await {
                Ok(file) => {
                    wizard.edit(field, |f| {
                        if let Some(slot) = f.documents.slot_mut(field) {
                            *slot = DocumentSlot::Upload(file);
                        }
                    });
                }
                Err(e) => CLI::print_error(&e.to_string()),
            }
        }
        if let Some(message) = wizard.validate_field(field) {
            println!("   {}", message.red());
        }
    }
    Ok(())
}

fn prompt_declaration(wizard: &mut KycWizard) -> Result<()> {
    let accuracy = CLI::confirm_action("I confirm that the information provided is accurate")?;
    wizard.edit(FormField::ConfirmAccuracy, |f| f.declaration.confirm_accuracy = accuracy);
    let authorize = CLI::confirm_action("I authorize verification of my documents")?;
    wizard.edit(FormField::AuthorizeVerification, |f| f.declaration.authorize_verification = authorize);
    let terms = CLI::confirm_action("I agree to the terms and conditions")?;
    wizard.edit(FormField::AgreeTerms, |f| f.declaration.agree_terms = terms);
    Ok(())
}

pub fn print_submission(kyc: &KycSubmission) {
    println!("\n{} #{}", "🧾 KYC Submission".cyan().bold(), kyc.id);
    println!("{}", "=".repeat(40).blue());
    println!("Status: {}", CLI::status_badge(&kyc.status));
    if let Some(reason) = kyc.status.rejection_reason() {
        println!("Reason: {}", reason.red());
    }
    if let Some(email) = &kyc.user_email {
        println!("Account: {}", email);
    }

    if let Some(p) = &kyc.personal_info {
        println!("\n{}", "Personal".bold());
        println!("  Name: {}", p.full_name);
        println!("  Email: {}  Phone: {}", p.email, p.phone);
        println!("  Date of birth: {}  Gender: {}", p.dob, p.gender);
        println!("  Permanent address: {}", p.permanent_address);
        println!("  Current address: {}", p.current_address);
    }

    if let Some(p) = &kyc.professional_info {
        println!("\n{}", "Professional".bold());
        println!("  Bar Council number: {}", p.bar_council_number);
        if let Some(firm) = &p.law_firm_name {
            println!("  Law firm: {}", firm);
        }
        println!("  Experience: {} years  Fee: {}", p.years_of_experience, p.consultation_fee);
        println!("  Specializations: {}", p.specializations.join(", "));
        println!(
            "  Available: {} {}-{}",
            p.availability_days.join(", "),
            p.available_from,
            p.available_until
        );
    }

    if let Some(docs) = &kyc.identity_documents {
        println!("\n{}", "Documents".bold());
        let entries = [
            (FormField::CitizenshipFront, &docs.citizenship_front),
            (FormField::CitizenshipBack, &docs.citizenship_back),
            (FormField::LawyerLicense, &docs.lawyer_license),
            (FormField::PassportPhoto, &docs.passport_photo),
            (FormField::LawDegree, &docs.law_degree),
            (FormField::ExperienceCertificate, &docs.experience_certificate),
        ];
        for (field, url) in entries {
            println!("  {}: {}", field.label(), url.as_deref().unwrap_or("-"));
        }
    }

    if let Some(created) = kyc.created_at {
        println!("\nSubmitted: {}", created.format("%Y-%m-%d %H:%M UTC"));
    }
}
