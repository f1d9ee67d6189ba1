use anyhow::Context;
use auth_identity::{IdentityConfig, IdentityService, SignupRequest};
use clinical_ai::{AiConfig, ClinicalAiService};
use colored::*;
use dialoguer::Password;
use email_service::{compose_reply_html, EmailConfig, EmailService};
use error_common::ScribeError;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use serde_json::json;
use std::path::Path;
use std::time::Duration;
use transcription_service::{TranscriptionConfig, TranscriptionService};
use visit_store::{EmailRecord, RecordingId, StoreConfig, VisitStore};

use crate::cli::{Cli, Command, EmailsCommand, ProcessArgs, RecordingsCommand, ReplyArgs, SignupArgs};
use crate::inbox::{sync_all_inboxes, sync_patient_inbox};
use crate::pipeline::{VisitPipeline, VisitRequest};

/// Run one parsed command line
pub async fn execute(cli: Cli) -> anyhow::Result<()> {
    let out = Output { json: cli.json };

    match cli.command {
        Command::Process(args) => process(&out, args).await,
        Command::Chat { message, image } => chat(&out, message.as_deref(), image.as_deref()).await,
        Command::HealthSummary { patient_id } => health_summary(&out, &patient_id).await,
        Command::Recordings(RecordingsCommand::List) => list_recordings(&out).await,
        Command::Recordings(RecordingsCommand::Delete { recording_id }) => {
            delete_recording(&out, &recording_id).await
        }
        Command::Emails(EmailsCommand::List { patient_id }) => list_emails(&out, &patient_id).await,
        Command::Emails(EmailsCommand::Reply(args)) => reply(&out, args).await,
        Command::Emails(EmailsCommand::Fetch { patient_id, email }) => {
            fetch_inbox(&out, patient_id.as_deref(), email.as_deref()).await
        }
        Command::Signup(args) => signup(&out, args).await,
        Command::Login { email, password } => login(&out, &email, password).await,
        Command::Health => health(&out),
    }
}

struct Output {
    json: bool,
}

impl Output {
    /// JSON mode prints `value`; text mode runs `text`
    fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce()) -> anyhow::Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            text();
        }
        Ok(())
    }

    fn spinner(&self, message: &'static str) -> ProgressBar {
        if self.json {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::with_template("{spinner:.cyan} {msg}") {
            bar.set_style(style);
        }
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(120));
        bar
    }
}

fn store() -> VisitStore {
    VisitStore::new(StoreConfig::from_env())
}

fn ai_service() -> Result<ClinicalAiService, ScribeError> {
    let config = AiConfig::from_env()?;
    Ok(ClinicalAiService::new(&config)?)
}

fn email_service() -> EmailService {
    EmailService::new(EmailConfig::from_env())
}

fn password_or_prompt(password: Option<String>, confirm: bool) -> anyhow::Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }
    let prompt = Password::new().with_prompt("Password");
    let prompt = if confirm {
        prompt.with_confirmation("Confirm password", "Passwords do not match")
    } else {
        prompt
    };
    prompt.interact().context("Failed to read password")
}

async fn process(out: &Output, args: ProcessArgs) -> anyhow::Result<()> {
    let config = TranscriptionConfig::from_env().map_err(ScribeError::from)?;
    let transcription = TranscriptionService::new(config).map_err(ScribeError::from)?;
    let pipeline = VisitPipeline::new(transcription, ai_service()?, email_service(), store());

    let spinner = out.spinner("Processing visit (transcription, summary, coding, email)...");
    let outcome = pipeline
        .process(VisitRequest {
            audio_path: args.audio,
            patient_id: args.patient_id,
            patient_email: args.email,
            recording_type: args.recording_type,
        })
        .await;
    spinner.finish_and_clear();
    let outcome = outcome?;

    out.emit(&outcome, || {
        let summary = &outcome.results.clinical_summary;
        println!("✅ {} {}", "Visit processed:".bright_green(), outcome.recording_id.bold());
        println!("\n{}", "Chief complaint".bright_cyan());
        println!("{}", summary.sections.chief_complaint);
        println!("\n{}", "History of present illness".bright_cyan());
        println!("{}", summary.sections.history_of_present_illness);
        println!("\n{}", "Assessment and plan".bright_cyan());
        println!("{}", summary.sections.assessment_plan);
        match &outcome.results.mdm_summary {
            Some(mdm) => {
                println!("\n{}", "Medical decision making".bright_cyan());
                println!("{}", mdm.mdm_summary);
            }
            None => println!(
                "\n⚠️  {} {}",
                "MDM unavailable:".bright_yellow(),
                outcome.results.mdm_error.as_deref().unwrap_or_default()
            ),
        }
        println!("\n{} {}", "Model:".dimmed(), summary.model_used.dimmed());
        print_email_status(&outcome.email);
    })
}

fn print_email_status(email: &EmailRecord) {
    if email.sent {
        println!("📤 {} {}", "Email sent to".bright_green(), email.to);
    } else if let Some(error) = &email.send_error {
        println!("⚠️  {} {}", "Email not sent:".bright_yellow(), error);
    } else {
        println!("ℹ️  {}", "No patient email provided, email not sent".bright_blue());
    }
}

async fn chat(out: &Output, message: Option<&str>, image: Option<&Path>) -> anyhow::Result<()> {
    let service = ai_service()?;
    let message = message.unwrap_or_default();
    let reply = match image {
        Some(path) => {
            let bytes = tokio::fs::read(path)
                .await
                .with_context(|| format!("failed to read image {}", path.display()))?;
            let spinner = out.spinner("Analyzing image...");
            let reply = service.chat_with_image(message, &bytes, image_mime_type(path)).await;
            spinner.finish_and_clear();
            reply
        }
        None => {
            let spinner = out.spinner("Thinking...");
            let reply = service.chat(message).await;
            spinner.finish_and_clear();
            reply
        }
    };
    let reply = reply.map_err(ScribeError::from)?;

    out.emit(&reply, || {
        println!("{}", reply.response);
        println!("\n{} ({})", reply.model_used.dimmed(), reply.category);
    })
}

/// MIME type from the file extension; unknown extensions are sent as JPEG
fn image_mime_type(path: &Path) -> &'static str {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("bmp") => "image/bmp",
        _ => "image/jpeg",
    }
}

async fn health_summary(out: &Output, patient_id: &str) -> anyhow::Result<()> {
    let service = ai_service()?;
    let records = store()
        .collect_clinical_records(patient_id)
        .await
        .map_err(ScribeError::from)?;

    let spinner = out.spinner("Summarizing patient history...");
    let summary = service.generate_health_summary(patient_id, &records).await;
    spinner.finish_and_clear();
    let summary = summary.map_err(ScribeError::from)?;

    out.emit(&summary, || {
        println!(
            "📋 {} {} ({} visits)",
            "Health summary for".bright_cyan(),
            patient_id.bold(),
            summary.total_visits
        );
        println!("\n{}", summary.summary);
    })
}

async fn list_recordings(out: &Output) -> anyhow::Result<()> {
    let recordings = store().list_recordings().await.map_err(ScribeError::from)?;

    out.emit(&json!({ "recordings": recordings }), || {
        if recordings.is_empty() {
            println!("No recordings yet");
        }
        for recording in &recordings {
            println!(
                "{}  {}  {}  {}",
                recording.recording_id.bold(),
                recording.created_at.dimmed(),
                recording.recording_type,
                recording.chief_complaint
            );
        }
    })
}

async fn delete_recording(out: &Output, recording_id: &str) -> anyhow::Result<()> {
    let id: RecordingId = recording_id.parse().map_err(ScribeError::from)?;
    let removed = store().delete_recording(&id).await.map_err(ScribeError::from)?;

    out.emit(
        &json!({ "success": true, "message": "Recording deleted successfully", "files_removed": removed }),
        || println!("🗑️  {} {}", "Deleted".bright_green(), id),
    )
}

async fn list_emails(out: &Output, patient_id: &str) -> anyhow::Result<()> {
    let emails = store().list_emails(patient_id).await.map_err(ScribeError::from)?;

    out.emit(&json!({ "emails": emails }), || {
        if emails.is_empty() {
            println!("No emails for {patient_id}");
        }
        for email in &emails {
            let party = email.from.as_deref().unwrap_or(&email.to);
            println!(
                "{}  {:<8}  {}  {}",
                email.timestamp.dimmed(),
                format!("{:?}", email.direction).to_lowercase(),
                party,
                email.subject.bold()
            );
        }
    })
}

async fn reply(out: &Output, args: ReplyArgs) -> anyhow::Result<()> {
    let store = store();
    let to = match args.to {
        Some(to) => to,
        None => store
            .find_patient_email(&args.patient_id)
            .await
            .map_err(ScribeError::from)?
            .ok_or_else(|| ScribeError::Validation("patient email is required".to_string()))?,
    };
    let html = compose_reply_html(&args.body);

    let receipt = email_service()
        .send_reply(&to, &args.subject, &html, &args.patient_id, args.in_reply_to.as_deref())
        .await
        .map_err(ScribeError::from)?;

    let mut record = EmailRecord::outbound(&args.patient_id, &to, &args.subject, &html)
        .with_in_reply_to(args.in_reply_to.as_deref());
    record.mark_sent(receipt.sent_at);
    store
        .save_email_record(&visit_store::file_timestamp(), &record, true)
        .await
        .map_err(ScribeError::from)?;

    out.emit(
        &json!({ "success": true, "message": "Reply sent successfully", "email": record }),
        || println!("📤 {} {}", "Reply sent to".bright_green(), to),
    )
}

async fn fetch_inbox(out: &Output, patient_id: Option<&str>, email: Option<&str>) -> anyhow::Result<()> {
    let store = store();
    let mail = email_service();
    let report = match patient_id {
        Some(patient_id) => sync_patient_inbox(&mail, &store, patient_id, email).await?,
        None => sync_all_inboxes(&mail, &store).await?,
    };

    out.emit(&report, || {
        println!(
            "📬 {} new email(s) for {} patient(s) ({} fetched)",
            report.new_emails.to_string().bold(),
            report.patients_updated,
            report.total_fetched
        );
    })
}

async fn signup(out: &Output, args: SignupArgs) -> anyhow::Result<()> {
    let password = password_or_prompt(args.password, true)?;
    let identity = IdentityService::from_config(&IdentityConfig::from_env());

    let profile = identity
        .signup(SignupRequest {
            first_name: args.first_name,
            last_name: args.last_name,
            email: args.email,
            password,
            newsletter: args.newsletter,
        })
        .await
        .map_err(ScribeError::from)?;

    out.emit(
        &json!({ "success": true, "message": "User registered successfully", "user": profile }),
        || println!("✅ {} {}", "Registered".bright_green(), profile.email),
    )
}

async fn login(out: &Output, email: &str, password: Option<String>) -> anyhow::Result<()> {
    let password = password_or_prompt(password, false)?;
    let identity = IdentityService::from_config(&IdentityConfig::from_env());

    let profile = identity
        .login(email, &password)
        .await
        .map_err(ScribeError::from)?;

    out.emit(&json!({ "success": true, "user": profile }), || {
        println!(
            "✅ {} {} {} <{}>",
            "Welcome back,".bright_green(),
            profile.first_name,
            profile.last_name,
            profile.email
        );
    })
}

fn health(out: &Output) -> anyhow::Result<()> {
    let ai = AiConfig::from_env().is_ok();
    let transcription = TranscriptionConfig::from_env().is_ok();
    let email = EmailConfig::from_env().email_enabled;
    let status = json!({
        "status": "healthy",
        "timestamp": chrono::Local::now().to_rfc3339(),
        "services": {
            "clinical_ai": ai,
            "transcription": transcription,
            "email": email,
        },
        "upload_folder": StoreConfig::from_env().upload_folder,
    });

    out.emit(&status, || {
        let mark = |ok: bool| if ok { "✅".to_string() } else { "❌".to_string() };
        println!("🏥 {} {}", "AIscribe".bright_cyan(), env!("CARGO_PKG_VERSION"));
        println!("{} OpenRouter credentials", mark(ai));
        println!("{} AssemblyAI credentials", mark(transcription));
        println!("{} Email sending", mark(email));
    })
}
