use std::io::Write;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use containerdesk::command::{SECTIONS, catalog, strip_cli_prefix};
use containerdesk::engine::{ComposeProject, inspect_json, render_transcript};
use containerdesk::process::{ExecutionResult, Invocation, OutputLine, OutputSource};
use containerdesk::{ContainerEngine, config};

#[derive(Parser)]
#[command(name = "containerdesk")]
#[command(about = "Manage containers through the container CLI using docker-style commands")]
#[command(version)]
struct Cli {
    /// Backend executable name or path (overrides config and environment)
    #[arg(long, global = true)]
    backend: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Backend system services
    System {
        #[command(subcommand)]
        action: SystemAction,
    },
    /// List containers
    Ps {
        /// Include stopped containers
        #[arg(short, long)]
        all: bool,
        #[arg(long)]
        json: bool,
    },
    /// Start a container
    Start { id: String },
    /// Stop a container
    Stop { id: String },
    /// Kill a container
    Kill { id: String },
    /// Delete a container
    Rm {
        #[arg(short, long)]
        force: bool,
        id: String,
    },
    /// Show a container's configuration
    Inspect { id: String },
    /// Stream a container's logs
    Logs {
        #[arg(short, long)]
        follow: bool,
        /// Include boot logs
        #[arg(long)]
        boot: bool,
        id: String,
    },
    /// List images
    Images {
        #[arg(long)]
        json: bool,
    },
    /// Pull an image
    Pull { reference: String },
    /// Delete an image
    Rmi {
        #[arg(short, long)]
        force: bool,
        reference: String,
    },
    /// Show an image's configuration
    ImageInspect { reference: String },
    /// Image builder
    Builder {
        #[command(subcommand)]
        action: BuilderAction,
    },
    /// Compose projects
    Compose(ComposeArgs),
    /// Run backend arguments verbatim
    Run {
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        args: Vec<String>,
    },
    /// Run a docker command, translated for the backend
    Docker {
        /// Stream output instead of printing a transcript
        #[arg(long)]
        stream: bool,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        args: Vec<String>,
    },
    /// List known docker commands, or show one
    Catalog { name: Option<String> },
}

#[derive(Subcommand)]
enum SystemAction {
    Start,
    Stop,
    Status,
    Logs {
        #[arg(short, long)]
        follow: bool,
    },
}

#[derive(Subcommand)]
enum BuilderAction {
    Status,
    Start {
        #[arg(long)]
        cpus: Option<u32>,
        #[arg(long)]
        memory: Option<String>,
    },
    Stop,
}

#[derive(Args)]
struct ComposeArgs {
    #[arg(short = 'f', long, default_value = "compose.yaml")]
    file: String,
    #[arg(short = 'p', long, default_value = "")]
    project: String,
    #[command(subcommand)]
    action: ComposeAction,
}

#[derive(Subcommand)]
enum ComposeAction {
    Up {
        /// Run in the background
        #[arg(short, long)]
        detach: bool,
    },
    Down {
        #[arg(long)]
        volumes: bool,
    },
    Pull,
    Build,
    Ps,
    Logs { service: Option<String> },
}

fn main() -> Result<()> {
    // Diagnostics go to stderr so they never mix with backend output.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let cli = Cli::parse();

    let cwd = std::env::current_dir().context("determining working directory")?;
    let mut cfg = config::load(&cwd)?;
    if let Some(backend) = cli.backend {
        cfg.backend = backend;
    }
    tracing::debug!(backend = %cfg.backend, "configured backend");
    let engine = ContainerEngine::from_config(&cfg);

    match cli.command {
        Command::System { action } => match action {
            SystemAction::Start => engine.system_start()?,
            SystemAction::Stop => engine.system_stop()?,
            SystemAction::Status => {
                let status = engine.system_status()?;
                println!("{}", status.message);
                if !status.running {
                    std::process::exit(1);
                }
            }
            SystemAction::Logs { follow } => pump(engine.system_logs(follow))?,
        },
        Command::Ps { all, json } => {
            let containers = engine.list_containers(all)?;
            if json {
                print_json(&containers)?;
            } else {
                println!("{:<14} {:<20} {:<28} {:<10} PORTS", "ID", "NAME", "IMAGE", "STATE");
                for c in &containers {
                    println!(
                        "{:<14} {:<20} {:<28} {:<10} {}",
                        short(&c.id),
                        c.name,
                        c.image,
                        c.state,
                        c.ports.as_deref().unwrap_or("")
                    );
                }
            }
        }
        Command::Start { id } => engine.start_container(&id)?,
        Command::Stop { id } => engine.stop_container(&id)?,
        Command::Kill { id } => engine.kill_container(&id)?,
        Command::Rm { force, id } => engine.delete_container(&id, force)?,
        Command::Inspect { id } => print_inspect(&engine.inspect_container(&id)?)?,
        Command::Logs { follow, boot, id } => pump(engine.container_logs(&id, follow, boot))?,
        Command::Images { json } => {
            let images = engine.list_images()?;
            if json {
                print_json(&images)?;
            } else {
                println!("{:<40} {:<14} SIZE", "REFERENCE", "ID");
                for img in &images {
                    println!(
                        "{:<40} {:<14} {}",
                        img.reference(),
                        short(&img.id),
                        img.size.as_deref().unwrap_or("")
                    );
                }
            }
        }
        Command::Pull { reference } => engine.pull_image(&reference)?,
        Command::Rmi { force, reference } => engine.delete_image(&reference, force)?,
        Command::ImageInspect { reference } => print_inspect(&engine.inspect_image(&reference)?)?,
        Command::Builder { action } => match action {
            BuilderAction::Status => {
                let status = engine.builder_status()?;
                println!("{}", status.message);
            }
            BuilderAction::Start { cpus, memory } => {
                engine.builder_start(cpus, memory.as_deref())?
            }
            BuilderAction::Stop => engine.builder_stop()?,
        },
        Command::Compose(args) => {
            let project = ComposeProject::new(args.file, args.project);
            let (requested, result) = match args.action {
                ComposeAction::Up { detach } => (
                    project.command(&up_args(detach)),
                    engine.compose_up(&project, detach)?,
                ),
                ComposeAction::Down { volumes } => (
                    project.command(&down_args(volumes)),
                    engine.compose_down(&project, volumes)?,
                ),
                ComposeAction::Pull => (project.command(&["pull"]), engine.compose_pull(&project)?),
                ComposeAction::Build => {
                    (project.command(&["build"]), engine.compose_build(&project)?)
                }
                ComposeAction::Ps => (
                    project.command(&["ps", "--all"]),
                    engine.compose_ps(&project)?,
                ),
                ComposeAction::Logs { service } => {
                    eprintln!("{}", project.logs_title());
                    return pump(engine.compose_logs(&project, service.as_deref())?);
                }
            };
            finish(&requested, &result);
        }
        Command::Run { args } => {
            let result = engine.run_command(&Invocation::new(args.clone()), false)?;
            finish(&args, &result);
        }
        Command::Docker { stream, args } => {
            // The shell has already split and unquoted the arguments.
            let args = strip_cli_prefix(args)?;
            let inv = Invocation::new(args.clone());
            if stream {
                pump(engine.stream_docker_compatible_command(&inv)?)?;
            } else {
                let result = engine.run_docker_compatible_command(&inv, false)?;
                finish(&args, &result);
            }
        }
        Command::Catalog { name: Some(name) } => match catalog::find(&name) {
            Some(cmd) => println!("{}\n  {}\n  {}", cmd.name, cmd.summary, cmd.template()),
            None => anyhow::bail!("unknown docker command: {name}"),
        },
        Command::Catalog { name: None } => {
            for section in SECTIONS {
                println!("{}", section.title);
                for cmd in section.commands {
                    println!("  {:<10} {}", cmd.name, cmd.summary);
                }
            }
        }
    }
    Ok(())
}

fn up_args(detach: bool) -> Vec<&'static str> {
    if detach { vec!["up", "-d"] } else { vec!["up"] }
}

fn down_args(volumes: bool) -> Vec<&'static str> {
    if volumes {
        vec!["down", "--volumes"]
    } else {
        vec!["down"]
    }
}

fn short(id: &str) -> String {
    id.chars().take(12).collect()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_inspect(text: &str) -> Result<()> {
    match inspect_json(text) {
        Some(value) => print_json(&value),
        None => {
            println!("{text}");
            Ok(())
        }
    }
}

/// Print the transcript and exit with the backend's code.
fn finish(requested: &[String], result: &ExecutionResult) {
    println!("{}", render_transcript(requested, result));
    if !result.success() {
        std::process::exit(result.exit_code.clamp(1, 255));
    }
}

/// Copy a live stream to our own stdout and stderr.
fn pump(stream: impl Iterator<Item = containerdesk::Result<OutputLine>>) -> Result<()> {
    let stdout = std::io::stdout();
    let stderr = std::io::stderr();
    for item in stream {
        let line = item?;
        match line.source {
            OutputSource::Stdout => {
                let mut out = stdout.lock();
                writeln!(out, "{}", line.text)?;
                out.flush()?;
            }
            OutputSource::Stderr => writeln!(stderr.lock(), "{}", line.text)?,
        }
    }
    Ok(())
}
