use clap::{Args, Parser, Subcommand};
use findmeagent::config::AppConfig;
use findmeagent::error::AppError;
use findmeagent::intake::{
    AnalyticsSink, BackgroundAnalytics, ConversionEvent, FormView, HttpConversionTransport,
    HttpLeadBackend, NoopAnalytics, PresentationEvent, ServiceCategory, SubmissionController,
    SubmissionState,
};
use findmeagent::telemetry;
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "FindMeAgent",
    about = "Submit a lead through the FindMeAgent intake form from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill in the lead form and submit it to the configured backend
    Submit(SubmitArgs),
    /// List the services a lead can ask for
    Services,
}

#[derive(Args, Debug)]
struct SubmitArgs {
    /// Full name
    #[arg(long)]
    name: String,
    /// Email address
    #[arg(long)]
    email: String,
    /// Phone number
    #[arg(long)]
    phone: String,
    /// Suburb or location
    #[arg(long)]
    suburb: String,
    /// Service wanted (Buying, Selling, Renting, Property Management, Other)
    #[arg(long, default_value = "", value_parser = parse_service)]
    message: String,
}

fn parse_service(raw: &str) -> Result<String, String> {
    if raw.is_empty() || ServiceCategory::from_value(raw).is_some() {
        return Ok(raw.to_string());
    }
    let offered: Vec<&str> = ServiceCategory::ALL
        .into_iter()
        .map(ServiceCategory::value)
        .collect();
    Err(format!("expected one of: {}", offered.join(", ")))
}

impl SubmitArgs {
    fn into_events(self) -> Vec<PresentationEvent> {
        [
            ("name", self.name),
            ("email", self.email),
            ("phone", self.phone),
            ("suburb", self.suburb),
            ("message", self.message),
        ]
        .into_iter()
        .map(|(field, value)| PresentationEvent::FieldChanged {
            field: field.to_string(),
            value,
        })
        .chain(std::iter::once(PresentationEvent::SubmitRequested))
        .collect()
    }
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Submit(args) => run_submit(args).await,
        Command::Services => {
            for category in ServiceCategory::ALL {
                println!("{:<20} {}", category.value(), category.label());
            }
            Ok(())
        }
    }
}

async fn run_submit(args: SubmitArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let backend = HttpLeadBackend::new(&config.backend.base_url, config.backend.request_timeout)?;
    let delivered = Arc::new(Notify::new());
    let analytics: Arc<dyn AnalyticsSink> = match &config.analytics.endpoint {
        Some(endpoint) => {
            let transport = HttpConversionTransport::connect(
                endpoint.clone(),
                config.analytics.event_timeout,
            )?;
            let notify = delivered.clone();
            Arc::new(
                BackgroundAnalytics::new(Arc::new(transport)).with_callback(Arc::new(
                    move |event: &ConversionEvent| {
                        info!(event = event.name(), "conversion tracked");
                        notify.notify_one();
                    },
                )),
            )
        }
        None => Arc::new(NoopAnalytics),
    };

    let controller = SubmissionController::new(backend)
        .with_analytics(analytics)
        .with_conversion_timeout(config.analytics.event_timeout);

    info!(endpoint = %config.backend.base_url, "submitting lead");
    let mut view = controller.view();
    for event in args.into_events() {
        view = controller.handle(event).await?;
    }

    if view.status == SubmissionState::Submitted && config.analytics.endpoint.is_some() {
        // The process exits right after rendering; give the conversion its delivery window.
        let _ = tokio::time::timeout(config.analytics.event_timeout, delivered.notified()).await;
    }

    println!("{}", render_view(&view));
    Ok(())
}

fn render_view(view: &FormView) -> String {
    match &view.status {
        SubmissionState::Submitted => "Thank you! We've received your details. One of our expert \
             real estate agents will contact you shortly."
            .to_string(),
        SubmissionState::Failed(message) => message.clone(),
        SubmissionState::Submitting => "Submitting...".to_string(),
        SubmissionState::Idle => "Nothing submitted yet.".to_string(),
    }
}
