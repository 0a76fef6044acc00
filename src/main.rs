use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use intake::config::{self, Config};
use intake::models::meeting::MeetingDetails;
use intake::models::project::ProjectInput;
use intake::models::recording::ZoomMeeting;
use intake::store::RecordStore;
use intake::AppState;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Export spans over OTLP only when a collector endpoint is configured.
    use opentelemetry::KeyValue;
    use opentelemetry_sdk::{trace as sdktrace, Resource};

    let telemetry_layer = if std::env::var("OTEL_EXPORTER_OTLP_ENDPOINT").is_ok() {
        let tracer = opentelemetry_otlp::new_pipeline()
            .tracing()
            .with_exporter(opentelemetry_otlp::new_exporter().tonic())
            .with_trace_config(sdktrace::config().with_resource(Resource::new(vec![
                KeyValue::new("service.name", "intake"),
            ])))
            .install_batch(opentelemetry_sdk::runtime::Tokio)
            .context("failed to install OpenTelemetry tracer")?;
        Some(tracing_opentelemetry::layer().with_tracer(tracer))
    } else {
        None
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "intake=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .with(telemetry_layer)
        .init();

    let cfg = config::load()?;
    let args = cli::Cli::parse();

    let result = match args.command {
        Some(cli::Commands::Serve { port }) => run_server(cfg, port).await,
        Some(cli::Commands::Project { command }) => {
            let state = AppState::build(cfg, false).await?;
            handle_project_command(command, &state).await
        }
        Some(cli::Commands::Recording { command }) => {
            let state = AppState::build(cfg, false).await?;
            handle_recording_command(command, &state).await
        }
        Some(cli::Commands::Meeting { command }) => {
            let state = AppState::build(cfg, false).await?;
            handle_meeting_command(command, &state).await
        }
        None => run_server(cfg, None).await,
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

async fn run_server(cfg: Config, port: Option<u16>) -> anyhow::Result<()> {
    let port = port.unwrap_or(cfg.port);
    let state = Arc::new(AppState::build(cfg, true).await?);

    let app = intake::api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("intake listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn handle_project_command(cmd: cli::ProjectCommands, state: &AppState) -> anyhow::Result<()> {
    let wf = state.workflow();
    match cmd {
        cli::ProjectCommands::Create {
            name,
            company,
            hubspot_url,
            notes,
            key_contact,
            meeting_type,
            meeting_id,
            meeting_number,
            folder_url,
        } => {
            let created = wf
                .create_project(ProjectInput {
                    project_name: Some(name),
                    company_name: Some(company),
                    hubspot_url,
                    notes,
                    key_contact,
                    meeting_type,
                    meeting_id,
                    meeting_number,
                    folder_url,
                })
                .await?;
            println!("{}", created.message);
            println!("  ID:   {}", created.project.project_id);
            println!("  Link: {}", created.secure_link);
        }
        cli::ProjectCommands::List => {
            let rows = wf.overview().await?;
            if rows.is_empty() {
                println!("No projects found.");
                return Ok(());
            }
            println!("{:<38} {:<40} {:<12} LINK", "ID", "PROJECT", "CREATED");
            for row in rows {
                println!(
                    "{:<38} {:<40} {:<12} {}",
                    row.project.project_id,
                    truncate(&row.project.label(), 40),
                    row.project.created_at.format("%Y-%m-%d"),
                    row.secure_link
                );
            }
        }
    }
    Ok(())
}

async fn handle_recording_command(
    cmd: cli::RecordingCommands,
    state: &AppState,
) -> anyhow::Result<()> {
    let wf = state.workflow();
    match cmd {
        cli::RecordingCommands::Pending { project_id, token } => {
            let project = match (project_id, token) {
                (_, Some(token)) => wf.resolve_token(Some(token.as_str())).await?,
                (Some(id), None) => wf.resolve_project(parse_project_id(&id)?).await?,
                (None, None) => anyhow::bail!("--project-id or --token is required"),
            };
            let page = wf.review_page(&project, false).await?;
            println!("{}", project.label());
            if page.all_caught_up {
                println!("No pending recordings for this project. All caught up!");
                return Ok(());
            }
            println!(
                "{:<24} {:<14} {:<20} {:<6} TOPIC",
                "RECORD", "MEETING", "DATE", "MIN"
            );
            for r in page.recordings {
                println!(
                    "{:<24} {:<14} {:<20} {:<6} {}",
                    truncate(&r.zoom_record_id, 24),
                    r.meeting_id,
                    r.meeting_date
                        .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
                        .unwrap_or_else(|| "N/A".into()),
                    r.duration
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "N/A".into()),
                    r.meeting_topic.as_deref().unwrap_or("")
                );
            }
        }
        cli::RecordingCommands::Add {
            project_id,
            zoom_record_id,
            meeting_id,
            topic,
            date,
            duration,
            host_id,
        } => {
            let project = wf.resolve_project(parse_project_id(&project_id)?).await?;
            let mut rec = ZoomMeeting::pending(zoom_record_id, project.project_id, meeting_id);
            rec.meeting_topic = topic;
            rec.meeting_date = date
                .map(|d| {
                    chrono::DateTime::parse_from_rfc3339(&d)
                        .map(|t| t.with_timezone(&chrono::Utc))
                        .with_context(|| format!("invalid --date: {}", d))
                })
                .transpose()?;
            rec.duration = duration;
            rec.host_id = host_id;
            state.store.insert_recording(&rec).await?;
            println!("Recording {} added to {}.", rec.zoom_record_id, project.label());
        }
        cli::RecordingCommands::Accept {
            project_id,
            zoom_record_id,
        } => {
            let project = wf.resolve_project(parse_project_id(&project_id)?).await?;
            let outcome = wf.accept(&project, &zoom_record_id).await?;
            println!("{}", outcome.message);
        }
        cli::RecordingCommands::Override {
            project_id,
            zoom_record_id,
            meeting_id,
        } => {
            let project = wf.resolve_project(parse_project_id(&project_id)?).await?;
            // Always verify the replacement before confirming.
            let preview = wf
                .preview_override(&project, &zoom_record_id, Some(meeting_id.as_str()))
                .await?;
            print_meeting(&preview.meeting);
            let outcome = wf
                .confirm_override(&project, &zoom_record_id, &preview.draft)
                .await?;
            println!("{}", outcome.message);
        }
    }
    Ok(())
}

async fn handle_meeting_command(cmd: cli::MeetingCommands, state: &AppState) -> anyhow::Result<()> {
    match cmd {
        cli::MeetingCommands::Show { meeting_id } => {
            let meeting = state.workflow().lookup_meeting(&meeting_id).await?;
            print_meeting(&meeting);
        }
    }
    Ok(())
}

fn print_meeting(m: &MeetingDetails) {
    println!("Meeting Details");
    println!("  Topic:      {}", m.topic);
    println!("  Meeting ID: {}", m.id);
    println!("  Host:       {}", m.host_email);
    if let Some(start) = m.start_time {
        println!("  Scheduled:  {}", start.format("%B %d, %Y at %I:%M %p"));
    }
    println!("  Duration:   {} minutes", m.duration);
    if m.recording_files.is_empty() {
        println!("  No recording files available for this meeting");
        return;
    }
    println!("  Recordings: {} file(s)", m.recording_files.len());
    for f in &m.recording_files {
        let size = f
            .size_mb()
            .map(|mb| format!("{:.2} MB", mb))
            .unwrap_or_default();
        println!(
            "    {} - {} {} ({})",
            f.file_type,
            f.file_extension.to_uppercase(),
            size,
            f.status
        );
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}

fn parse_project_id(raw: &str) -> anyhow::Result<uuid::Uuid> {
    raw.parse()
        .map_err(|_| anyhow::anyhow!("invalid project ID: {}", raw))
}
