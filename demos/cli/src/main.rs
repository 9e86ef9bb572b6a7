use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use notifier_core::{risk_percentage, Facility, NotifierConfig, Patient, WeatherSnapshot};
use notifier_engine::message::{recommendations, risk_level_label};
use notifier_engine::{
    EscalationOutcome, Escalator, FixedWeather, InMemoryDirectory, InMemoryStore,
    MessageComposer, MessageGenerator, NoGenerator, NoWeather, RiskEngine, WeatherLookup,
};
use notifier_services::{GeminiClient, OpenWeatherClient};
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod settings;

/// Total treated as 100% in the percentage display.
const REFERENCE_MAX_SCORE: i32 = 8;

#[derive(Parser, Debug)]
#[command(
    name = "notifier",
    about = "Assess pregnancy risk and run the notification escalation."
)]
struct Args {
    /// Optional TOML configuration file.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Score a patient and print the assessment.
    Assess {
        /// Patient JSON file.
        #[arg(short, long)]
        patient: PathBuf,
        /// Weather snapshot JSON used instead of the live lookup.
        #[arg(short, long)]
        weather: Option<PathBuf>,
    },
    /// Score a patient and run the escalation for the resulting level.
    Escalate {
        #[arg(short, long)]
        patient: PathBuf,
        /// JSON array of health facilities.
        #[arg(short, long)]
        facilities: Option<PathBuf>,
        #[arg(short, long)]
        weather: Option<PathBuf>,
        /// Attach a facility response to the doctor call, if one was made.
        #[arg(long, conflicts_with = "delivered")]
        respond: Option<String>,
        /// Mark the doctor call delivered, if one was made.
        #[arg(long)]
        delivered: bool,
    },
}

fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = settings::load_config(args.config.as_deref())
        .context("Could not load configuration")?;

    match args.command {
        Command::Assess { patient, weather } => {
            let patient: Patient = read_json(&patient)?;
            let engine = RiskEngine::new(
                weather_source(&config, weather.as_deref())?,
                config.scoring.clone(),
            );
            let assessment = engine.assess(&patient);

            let output = json!({
                "assessment": assessment,
                "risk_label": risk_level_label(assessment.risk_level),
                "risk_percentage": risk_percentage(assessment.risk_score, REFERENCE_MAX_SCORE),
                "recommendations": recommendations(assessment.risk_level, assessment.heat_wave_risk),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Escalate {
            patient,
            facilities,
            weather,
            respond,
            delivered,
        } => {
            let patient: Patient = read_json(&patient)?;
            let facilities: Vec<Facility> = match facilities {
                Some(path) => read_json(&path)?,
                None => Vec::new(),
            };

            let engine = RiskEngine::new(
                weather_source(&config, weather.as_deref())?,
                config.scoring.clone(),
            );
            let mut escalator = Escalator::new(
                engine,
                MessageComposer::new(message_generator(&config)),
                InMemoryStore::new(),
                InMemoryDirectory::new(facilities),
            );

            let result = escalator.escalate(&patient);
            info!(
                patient_id = patient.id,
                action_taken = result.action_taken(),
                "escalation finished"
            );

            let emergency = match &result.outcome {
                EscalationOutcome::DoctorCalled {
                    emergency_notification_id,
                    ..
                } if respond.is_some() || delivered => Some(
                    escalator
                        .respond(*emergency_notification_id, respond.as_deref())
                        .context("Could not update the emergency notification")?,
                ),
                _ => None,
            };

            let output = json!({
                "escalation": result,
                "emergency_notification": emergency,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
    }

    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let data = std::fs::read_to_string(path)
        .with_context(|| format!("Could not read file {:?}", path))?;
    serde_json::from_str(&data).with_context(|| format!("Invalid JSON in {:?}", path))
}

fn weather_source(
    config: &NotifierConfig,
    fixed: Option<&Path>,
) -> anyhow::Result<Box<dyn WeatherLookup>> {
    if let Some(path) = fixed {
        let snapshot: WeatherSnapshot = read_json(path)?;
        return Ok(Box::new(FixedWeather(snapshot)));
    }

    if config.weather.configured_api_key().is_none() {
        warn!("weather.api_key is not set, the location factor will use the default snapshot");
        return Ok(Box::new(NoWeather));
    }

    let client = OpenWeatherClient::from_config(&config.weather)
        .context("Could not build the weather client")?;
    Ok(Box::new(client))
}

fn message_generator(config: &NotifierConfig) -> Box<dyn MessageGenerator> {
    match GeminiClient::from_config(&config.messages) {
        Ok(client) => Box::new(client),
        Err(err) => {
            info!(error = %err, "message generation disabled, templates will be used");
            Box::new(NoGenerator)
        }
    }
}
