//! Interactive console front end.
//!
//! One session per run: reads user messages from stdin, prints the
//! assistant's replies and ranked results. Exists for local exploration;
//! the crate's real surface is the library.

use std::io::{self, BufRead, Write};
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use fareline::adapters::{CityDirectory, InMemorySessionStore, SyntheticFlightSource};
use fareline::application::TurnProcessor;
use fareline::config::AppConfig;
use fareline::domain::foundation::SessionId;
use fareline::domain::ranking::RankedFlight;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load()?;
    let processor = TurnProcessor::new(
        config,
        Arc::new(CityDirectory::new()),
        Arc::new(SyntheticFlightSource::new()),
        Arc::new(InMemorySessionStore::new()),
    );
    let session_id = SessionId::new();

    println!("Flight assistant ready. Type 'quit' to exit.");
    println!("Try: from Mumbai to Delhi on 25 Dec");

    let stdin = io::stdin();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let message = line.trim();
        if message.eq_ignore_ascii_case("quit") || message.eq_ignore_ascii_case("exit") {
            break;
        }

        match processor.process(session_id, message).await {
            Ok(response) => {
                println!("{}", response.response_text);
                if let Some(outcome) = &response.ranking {
                    print_results(&outcome.all);
                }
                if !response.quick_replies.is_empty() {
                    println!("[{}]", response.quick_replies.join(" | "));
                }
            }
            Err(err) => {
                tracing::error!(error = %err, "turn failed");
                println!("Something went wrong, please try again.");
            }
        }
    }

    Ok(())
}

fn print_results(flights: &[RankedFlight]) {
    for flight in flights {
        let category = flight
            .category
            .map(|c| format!(" [{}]", c.label()))
            .unwrap_or_default();
        let stops = match flight.offer.stops {
            0 => "nonstop".to_string(),
            1 => "1 stop".to_string(),
            n => format!("{} stops", n),
        };
        println!(
            "  {:>2}. {}  ₹{:<8} {:>3}h{:02}m  {}  score {:.3}{}",
            flight.rank,
            flight.offer.id,
            flight.offer.price,
            flight.offer.duration_minutes / 60,
            flight.offer.duration_minutes % 60,
            stops,
            flight.score,
            category,
        );
    }
}
