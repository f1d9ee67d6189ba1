use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use visit_store::RecordingType;

/// AIscribe medical transcription and documentation
#[derive(Parser, Debug)]
#[command(name = "aiscribe")]
#[command(version, about = "Transcribe visits, generate clinical documentation and email patients")]
pub struct Cli {
    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Transcribe a recording and generate the visit documentation
    Process(ProcessArgs),

    /// Ask the AIscribe assistant a question, optionally about an image
    Chat {
        /// The question
        #[arg(required_unless_present = "image")]
        message: Option<String>,

        /// Image (X-ray, photo, scan) for the vision model
        #[arg(long)]
        image: Option<PathBuf>,
    },

    /// Summarize a patient's history from all stored visits
    HealthSummary {
        patient_id: String,
    },

    /// Processed recordings
    #[command(subcommand)]
    Recordings(RecordingsCommand),

    /// Patient correspondence
    #[command(subcommand)]
    Emails(EmailsCommand),

    /// Create a clinician account
    Signup(SignupArgs),

    /// Check clinician credentials
    Login {
        #[arg(long)]
        email: String,

        /// Read from the environment or prompted when omitted
        #[arg(long, env = "AISCRIBE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Report configuration status
    Health,
}

#[derive(Args, Debug)]
pub struct ProcessArgs {
    /// Audio file (wav, mp3, mp4, m4a, flac, ogg, webm)
    pub audio: PathBuf,

    #[arg(long)]
    pub patient_id: String,

    /// Patient address; the summary is only emailed when given
    #[arg(long)]
    pub email: Option<String>,

    /// `conversation` (doctor and patient, speaker labels) or `notes` (dictation)
    #[arg(long, default_value = "conversation")]
    pub recording_type: RecordingType,
}

#[derive(Subcommand, Debug)]
pub enum RecordingsCommand {
    /// List processed recordings, newest first
    List,

    /// Delete a recording's audio and results
    Delete {
        /// `{patient_id}/{timestamp}` as shown by `recordings list`
        recording_id: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum EmailsCommand {
    /// Stored emails for a patient, newest first
    List {
        patient_id: String,
    },

    /// Send a reply to a patient and store it
    Reply(ReplyArgs),

    /// Pull patient replies from the inbox into patient folders
    Fetch {
        /// Only this patient's mail; every tagged message when omitted
        #[arg(long)]
        patient_id: Option<String>,

        /// Patient address; defaults to the one used for earlier mail
        #[arg(long, requires = "patient_id")]
        email: Option<String>,
    },
}

#[derive(Args, Debug)]
pub struct ReplyArgs {
    pub patient_id: String,

    /// Defaults to the address used for earlier mail
    #[arg(long)]
    pub to: Option<String>,

    #[arg(long)]
    pub subject: String,

    /// Plain text; converted to HTML
    #[arg(long)]
    pub body: String,

    /// Message-ID of the patient email being answered
    #[arg(long)]
    pub in_reply_to: Option<String>,
}

#[derive(Args, Debug)]
pub struct SignupArgs {
    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub last_name: String,

    #[arg(long)]
    pub email: String,

    /// Read from the environment or prompted when omitted
    #[arg(long, env = "AISCRIBE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    #[arg(long)]
    pub newsletter: bool,
}
