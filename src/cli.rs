use clap::{Parser, Subcommand};

/// Intake — project intake and recording review
#[derive(Parser)]
#[command(name = "intake", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to bind (defaults to INTAKE_PORT)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage client projects
    Project {
        #[command(subcommand)]
        command: ProjectCommands,
    },

    /// Review meeting recordings
    Recording {
        #[command(subcommand)]
        command: RecordingCommands,
    },

    /// Look up meetings on the meeting platform
    Meeting {
        #[command(subcommand)]
        command: MeetingCommands,
    },
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    /// Create a project and print its client link
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        company: String,
        #[arg(long)]
        hubspot_url: Option<String>,
        #[arg(long)]
        notes: Option<String>,
        #[arg(long)]
        key_contact: Option<String>,
        #[arg(long)]
        meeting_type: Option<String>,
        #[arg(long)]
        meeting_id: Option<String>,
        #[arg(long)]
        meeting_number: Option<String>,
        #[arg(long)]
        folder_url: Option<String>,
    },
    /// List all projects with their client links
    List,
}

#[derive(Subcommand)]
pub enum RecordingCommands {
    /// List recordings awaiting review
    Pending {
        #[arg(long, conflicts_with = "token", required_unless_present = "token")]
        project_id: Option<String>,
        /// Client link token instead of a project id
        #[arg(long)]
        token: Option<String>,
    },
    /// Register a pending recording for a project
    Add {
        #[arg(long)]
        project_id: String,
        #[arg(long)]
        zoom_record_id: String,
        #[arg(long)]
        meeting_id: String,
        #[arg(long)]
        topic: Option<String>,
        /// RFC 3339 timestamp, e.g. 2026-02-15T09:00:00Z
        #[arg(long)]
        date: Option<String>,
        /// Minutes
        #[arg(long)]
        duration: Option<i32>,
        #[arg(long)]
        host_id: Option<String>,
    },
    /// Approve a pending recording
    Accept {
        #[arg(long)]
        project_id: String,
        zoom_record_id: String,
    },
    /// Replace a pending recording's meeting with another meeting id
    Override {
        #[arg(long)]
        project_id: String,
        zoom_record_id: String,
        #[arg(long)]
        meeting_id: String,
    },
}

#[derive(Subcommand)]
pub enum MeetingCommands {
    /// Show meeting details and recording files
    Show { meeting_id: String },
}
