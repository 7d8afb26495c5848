//! Interactive terminal chat loop for the scheduling assistant.

use std::io::{BufRead, Write};
use std::sync::Arc;

use chrono::Utc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sahayak::{Config, GroqResponder, InMemoryCalendar, SchedulingOrchestrator};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load()?;
    tracing::info!(
        timezone = %config.working_hours.timezone,
        "Starting sahayak v{}",
        env!("CARGO_PKG_VERSION")
    );

    let calendar = Arc::new(InMemoryCalendar::new());
    let responder = Arc::new(GroqResponder::from_config(&config.responder)?);
    let orchestrator = SchedulingOrchestrator::from_config(&config, calendar, responder)?;

    println!("Sahayak scheduling assistant. Type a message, or 'quit' to exit.");

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if message.eq_ignore_ascii_case("quit") || message.eq_ignore_ascii_case("exit") {
            break;
        }

        let reply = orchestrator.handle(message, Utc::now()).await;
        println!("{reply}");
    }

    Ok(())
}
