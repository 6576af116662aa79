//! Agos - SMS flood-risk assistant
//!
//! CLI entry point: interactive chat, one-shot assessment, or geocode
//! lookup. The SMS transport itself runs elsewhere and talks to this
//! crate through the `MessagingGateway` seam.

use clap::Parser;
use eyre::Result;
use tracing_subscriber::EnvFilter;

use agos::cli::{Cli, Command};
use agos::config::Config;
use agos::gateway::to_twiml;
use agos::geo::LocationResolver;
use agos::reply::{render, ReplyView};
use agos::risk::RiskAssessor;
use agos::router::ConversationRouter;

fn setup_logging(cli_log_level: Option<&str>) {
    // CLI --log-level wins over RUST_LOG, default WARN keeps chat output
    // readable
    let filter = match cli_log_level {
        Some(level) => EnvFilter::new(level.to_lowercase()),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.log_level.as_deref());

    let config = Config::load(cli.config.as_ref())?;
    config.validate()?;

    match cli.command.unwrap_or(Command::Chat) {
        Command::Chat => {
            let router = ConversationRouter::from_config(&config)?;
            agos::chat::run(&router).await
        }
        Command::Assess { location, twiml } => {
            let resolver = LocationResolver::from_config(&config)?;
            let assessor = RiskAssessor::from_config(&config)?;

            let resolved = resolver.resolve(&location).await;
            let assessment = assessor.assess(resolved).await;
            let reply = render(ReplyView::Initial, &assessment);

            if twiml {
                println!("{}", to_twiml(&reply));
            } else {
                println!("{reply}");
            }
            Ok(())
        }
        Command::Resolve { location } => {
            let resolver = LocationResolver::from_config(&config)?;
            let resolved = resolver.resolve(&location).await;

            println!(
                "{}  {:.4}, {:.4}  [{}]{}",
                resolved.name,
                resolved.lat,
                resolved.lon,
                resolved.source.label(),
                if resolved.approximate { "  (approximate)" } else { "" }
            );
            Ok(())
        }
    }
}
