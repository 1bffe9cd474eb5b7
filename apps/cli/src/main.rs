mod approval;
mod command;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use devpilot::llm::OpenAiCompatibleProvider;
use devpilot::{
    AgentConfig, Bus, ConfirmationDecision, ConfirmationGate, ConversationController,
    LocalBackend, ToolExecutor, ToolRegistry,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, oneshot};

use crate::approval::TerminalApproval;
use crate::command::{route, InputCommand, Route, HELP};

#[derive(Debug, Parser)]
#[command(name = "devpilot", version, about = "Coding agent for the terminal")]
struct Args {
    /// Workspace root. Defaults to the current directory.
    #[arg(short, long)]
    workspace: Option<PathBuf>,

    /// Run sensitive tools without asking for confirmation.
    #[arg(long)]
    auto_execute: bool,

    /// File reported by get_current_file.
    #[arg(long)]
    current_file: Option<PathBuf>,

    /// Model name, overriding configuration.
    #[arg(long)]
    model: Option<String>,

    /// Maximum model rounds per request.
    #[arg(long)]
    max_iterations: Option<u32>,
}

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(error) = run(Args::parse()).await {
        eprintln!("devpilot: {error}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let workspace = match args.workspace {
        Some(path) => path,
        None => std::env::current_dir()?,
    };
    let mut config = AgentConfig::load(&workspace)?;
    if args.auto_execute {
        config.preferences.auto_execute = true;
    }
    if let Some(model) = args.model {
        config.llm.model = model;
    }
    if let Some(max) = args.max_iterations {
        config.preferences.max_iterations = max;
    }
    log::info!("settings: {:?}", config.llm.redacted());
    if !config.llm.has_api_key() {
        println!("warning: no API key configured, set DEVPILOT_LLM_API_KEY or OPENAI_API_KEY");
    }

    let provider = Arc::new(OpenAiCompatibleProvider::new(config.llm.clone())?);
    let backend = Arc::new(LocalBackend::new(&workspace, &config));
    backend.set_active_file(args.current_file);

    let (approval_tx, mut approval_rx) = mpsc::unbounded_channel();
    let gate = ConfirmationGate::new(
        config.preferences.auto_execute,
        Arc::new(TerminalApproval::new(approval_tx)),
    );
    let executor = ToolExecutor::new(Arc::new(ToolRegistry::new()), backend.clone());
    let bus = Bus::default();
    let controller = Arc::new(ConversationController::new(
        provider, executor, gate, bus, &config,
    ));

    tokio::spawn(render::render_events(controller.subscribe()));

    println!(
        "devpilot in {} (auto-execute {}). Type /help for commands.",
        workspace.display(),
        if controller.auto_execute() { "on" } else { "off" }
    );

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut pending: Option<oneshot::Sender<ConfirmationDecision>> = None;

    loop {
        tokio::select! {
            Some(ask) = approval_rx.recv() => {
                println!("\n? {} [y/N]", ask.request.prompt());
                pending = Some(ask.reply);
            }
            line = lines.next_line() => {
                let Some(line) = line? else { break };

                // A prompt abandoned by the gate no longer takes an answer.
                if pending.as_ref().is_some_and(|reply| reply.is_closed()) {
                    pending = None;
                }

                let command = match route(&line, pending.is_some()) {
                    Route::Answer { allow } => {
                        if let Some(reply) = pending.take() {
                            let decision = if allow {
                                ConfirmationDecision::Allow
                            } else {
                                ConfirmationDecision::Deny
                            };
                            let _ = reply.send(decision);
                        }
                        continue;
                    }
                    Route::Command(command) => command,
                };
                let abandon_prompt = command.interrupts_prompt();

                match command {
                    InputCommand::Empty => {}
                    InputCommand::Quit => break,
                    InputCommand::Help => println!("{HELP}"),
                    InputCommand::Stop => {
                        if !controller.stop() {
                            println!("nothing is running");
                        }
                    }
                    InputCommand::New => controller.new_conversation()?,
                    InputCommand::Auto(enabled) => {
                        controller.set_auto_execute(enabled);
                        println!("auto-execute {}", if enabled { "on" } else { "off" });
                    }
                    InputCommand::Open(path) => backend.set_active_file(path),
                    InputCommand::Unknown(input) => println!("unknown command: {input}"),
                    InputCommand::Message(text) => {
                        let controller = controller.clone();
                        tokio::spawn(async move {
                            if let Err(error) = controller.submit(text).await {
                                log::debug!("submission rejected: {error}");
                            }
                        });
                    }
                }
                // Dropped after the stop so the gate sees cancellation, not a closed reply.
                if abandon_prompt {
                    pending = None;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                let stopped = controller.stop();
                pending = None;
                if !stopped {
                    break;
                }
            }
        }
    }

    controller.stop();
    Ok(())
}
