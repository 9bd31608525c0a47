use anyhow::{Context, Result};
use bat::PrettyPrinter;
use clap::Parser;
use cliclack::{input, spinner};
use console::style;
use std::io::Write;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use eduagent::agent::Agent;
use eduagent::agents::TutorAgent;
use eduagent::providers::base::{Generation, Provider};
use eduagent::providers::configs::{OllamaProviderConfig, ProviderConfig};
use eduagent::providers::ollama::OllamaProvider;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Ollama server URL (can also be set via OLLAMA_HOST environment variable)
    #[arg(long)]
    host: Option<String>,

    /// Model to use (can also be set via OLLAMA_MODEL environment variable)
    #[arg(short, long)]
    model: Option<String>,

    /// Do not launch `ollama serve` when the server is unreachable
    #[arg(long)]
    no_auto_start: bool,

    /// Stream raw generations instead of chatting with the tutor
    #[arg(short, long)]
    stream: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = OllamaProviderConfig::from_env().context("invalid Ollama configuration")?;
    if let Some(host) = cli.host {
        config.host = host;
    }
    if let Some(model) = cli.model {
        config.model = model;
    }
    if cli.no_auto_start {
        config.auto_start = false;
    }

    let spin = spinner();
    spin.start("connecting to ollama");
    let provider = OllamaProvider::new(config).context("failed to set up the Ollama provider")?;
    spin.stop(format!("connected to {}", provider.base_url()));

    let provider: Arc<dyn Provider> = Arc::new(provider);
    let mut tutor = TutorAgent::new("tutor", provider.clone());

    println!(
        "eduagent {} {}",
        style(provider.model()).cyan(),
        style("- type \"exit\" to end the session, /models, /clear or /recall <key>").dim()
    );
    println!("\n");

    loop {
        let message_text: String = input("Message:").placeholder("").multiline().interact()?;
        let message_text = message_text.trim();

        if message_text.eq_ignore_ascii_case("exit") {
            break;
        }

        match message_text.split_once(' ').unwrap_or((message_text, "")) {
            ("/models", _) => {
                for name in provider.list_models()? {
                    println!("{}", name);
                }
            }
            ("/clear", _) => {
                tutor.clear_memory();
                println!("{}", style("memory cleared").dim());
            }
            ("/recall", key) => match tutor.recall(key.trim()) {
                Some(value) => println!("{}", serde_json::to_string_pretty(value)?),
                None => println!("{}", style("nothing remembered under that key").dim()),
            },
            _ if cli.stream => {
                let generation = provider.generate(message_text, true)?;
                if let Generation::Stream(stream) = generation {
                    let mut stdout = std::io::stdout();
                    for chunk in stream.text_chunks() {
                        print!("{}", chunk?);
                        stdout.flush()?;
                    }
                }
                println!("\n");
            }
            _ => {
                let spin = spinner();
                spin.start("awaiting reply");
                let reply = tutor.respond(message_text);
                spin.stop("");

                render(&reply?)?;
                println!("\n");
            }
        }
    }
    Ok(())
}

fn render(content: &str) -> Result<()> {
    PrettyPrinter::new()
        .input_from_bytes(content.as_bytes())
        .language("markdown")
        .print()
        .context("failed to render reply")?;
    Ok(())
}
