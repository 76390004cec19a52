//! Plot brainstorm terminal session.
//!
//! Commands: type an answer, `#n` to pick hint n, `/status`, `/reset`,
//! `/done` to finish the stage, `/quit` to leave.

use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::io::{stdin, AsyncBufReadExt, BufReader};

use plot_brainstorm::adapters::{DifyChannel, TracingInteractionLog};
use plot_brainstorm::application::{ExtractionController, TurnOutcome};
use plot_brainstorm::config::{AppConfig, LogFormat, LoggingConfig};
use plot_brainstorm::domain::foundation::{Guidance, Summarizer};
use plot_brainstorm::domain::plot::{
    LabelledFieldReconciler, PlotField, PlotSession, StructuredPlot, Turn,
};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("failed to load configuration")?;
    init_tracing(&config.logging);
    config.validate().context("invalid configuration")?;

    let controller = build_controller(&config)?;
    let mut session = PlotSession::new(config.student.participant()?);
    if let Some(character) = config.student.character() {
        session = session.with_character(character);
    }

    tracing::info!(session_id = %session.id(), "starting plot brainstorm");
    let opening = controller.start(&mut session).await?;
    print_agent_turn(&opening);

    let mut lines = BufReader::new(stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        match input {
            "" => continue,
            "/quit" => break,
            "/status" => print_plot(session.plot()),
            "/reset" => {
                controller.reset(&mut session);
                match controller.start(&mut session).await {
                    Ok(turn) => print_agent_turn(&turn),
                    Err(err) => println!("! {}", err),
                }
            }
            "/done" => match controller.complete_stage(&mut session) {
                Ok(plot) => {
                    println!("Plot complete!");
                    println!("  setting:  {}", plot.setting);
                    println!("  conflict: {}", plot.conflict);
                    println!("  goal:     {}", plot.goal);
                    break;
                }
                Err(reason) => println!("! not yet: {}", reason),
            },
            _ => {
                let result = match parse_hint(input) {
                    Some(Ok(index)) => controller.submit_hint(&mut session, index).await,
                    Some(Err(err)) => {
                        println!("! {}", err);
                        continue;
                    }
                    None => controller.submit_turn(&mut session, input).await,
                };
                match result {
                    Ok(outcome) => print_outcome(&outcome),
                    Err(err) => println!("! {} (try again)", err),
                }
            }
        }
    }

    Ok(())
}

fn init_tracing(config: &LoggingConfig) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(config.env_filter())
        .with_writer(std::io::stderr);
    match config.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.with_target(false).init(),
    }
}

fn build_controller(config: &AppConfig) -> Result<ExtractionController> {
    let guidance_config = config
        .dify
        .guidance_channel()
        .context("guidance API key missing")?;
    let summarizer_config = config
        .dify
        .summarizer_channel()
        .context("summarizer API key missing")?;

    let guidance = DifyChannel::<Guidance>::new(guidance_config)?;
    let summarizer = DifyChannel::<Summarizer>::new(summarizer_config)?;
    let extractor = LabelledFieldReconciler::new(config.extraction.reconciler_config())?;

    Ok(ExtractionController::new(Arc::new(guidance), Arc::new(summarizer), Arc::new(extractor))
        .with_hint_extractor(config.extraction.hint_extractor())
        .with_summary_prompt(config.extraction.summary_prompt())
        .with_greeting(config.extraction.greeting.clone())
        .with_interaction_log(Arc::new(TracingInteractionLog::new())))
}

/// Hints are numbered from 1 on screen.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
#[error("no hint #0, hints are numbered from 1")]
struct ZeroHintIndex;

/// `#3` picks the third hint. Input that is not `#` plus a number is an
/// answer.
fn parse_hint(input: &str) -> Option<Result<usize, ZeroHintIndex>> {
    let n: usize = input.strip_prefix('#')?.trim().parse().ok()?;
    Some(n.checked_sub(1).ok_or(ZeroHintIndex))
}

fn print_agent_turn(turn: &Turn) {
    println!("\nGuide: {}", turn.text);
    for (i, hint) in turn.hints.iter().enumerate() {
        print!("  #{} {}", i + 1, hint);
    }
    if !turn.hints.is_empty() {
        println!();
    }
}

fn print_outcome(outcome: &TurnOutcome) {
    print_agent_turn(&outcome.agent_turn);
    print_plot(&outcome.plot);
    if !outcome.updated.is_empty() {
        let names: Vec<&str> = outcome.updated.iter().map(PlotField::label).collect();
        println!("  updated: {}", names.join(", "));
    }
    if outcome.gate.is_open() {
        println!("  The plot is ready. Type /done to continue.");
    }
}

fn print_plot(plot: &StructuredPlot) {
    for field in PlotField::ALL {
        println!("  [{}] {}", field.label(), plot.get(field).display());
    }
}
