mod atomic_write;
mod config;
mod host;
mod resume_store;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use launchpad_composer::AttachmentError;
use launchpad_composer::AuthGate;
use launchpad_composer::Composer;
use launchpad_composer::ComposerCollaborators;
use launchpad_composer::ComposerEvent;
use launchpad_composer::ComposerEventSender;
use launchpad_composer::IncomingFile;
use launchpad_composer::Navigator;
use launchpad_composer::SubmitOutcome;
use launchpad_protocol::ExecutionMode;
use launchpad_protocol::SubmissionIntent;
use launchpad_protocol::intent::CREATE_APP_REASON;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::mpsc::unbounded_channel;
use tracing_subscriber::EnvFilter;

use crate::config::ConfigStore;
use crate::host::ConsoleNavigator;
use crate::host::PreviewAuthGate;
use crate::host::Session;
use crate::host::SessionAuthGate;
use crate::resume_store::ResumeStore;

const LOG_ENV: &str = "LAUNCHPAD_LOG";
const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
#[clap(rename_all = "kebab-case")]
enum CliMode {
    #[default]
    Deterministic,
    Agentic,
}

impl From<CliMode> for ExecutionMode {
    fn from(mode: CliMode) -> Self {
        match mode {
            CliMode::Deterministic => ExecutionMode::Deterministic,
            CliMode::Agentic => ExecutionMode::Agentic,
        }
    }
}

#[derive(Parser, Debug)]
#[command(version, about = "Compose an app-creation request from the terminal")]
struct Cli {
    /// Config file to read instead of `~/.launchpad/config.toml`.
    #[arg(long, env = "LAUNCHPAD_CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Directory holding the deferred-submission slot. Defaults to `~/.launchpad`.
    #[arg(long, env = "LAUNCHPAD_STATE_DIR", global = true)]
    state_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Build a request from text and images and submit it.
    Compose(ComposeArgs),
    /// Continue a submission that was deferred for sign-in.
    Resume {
        #[arg(long, value_enum, default_value_t)]
        session: Session,
    },
    /// Print the rotating placeholder prompt.
    Placeholder {
        /// Number of distinct prompts to print before exiting.
        #[arg(long, default_value_t = 40)]
        frames: usize,
    },
}

#[derive(Args, Debug)]
struct ComposeArgs {
    /// What to build, e.g. "todo list app".
    #[arg(long)]
    query: String,

    /// Execution mode. Only honored when `agent_mode_enabled` is set in config.
    #[arg(long, value_enum, default_value_t)]
    mode: CliMode,

    /// Image to attach; repeat for several.
    #[arg(long = "image", value_name = "PATH")]
    images: Vec<PathBuf>,

    #[arg(long, value_enum, default_value_t)]
    session: Session,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    let config_store = match cli.config {
        Some(path) => ConfigStore::new(path),
        None => ConfigStore::new_default()?,
    };
    let state_dir = match cli.state_dir {
        Some(dir) => dir,
        None => config::launchpad_home()?,
    };
    let resume_store = ResumeStore::new(&state_dir);

    match cli.command {
        CliCommand::Compose(args) => run_compose(&config_store, resume_store, args).await,
        CliCommand::Resume { session } => run_resume(&resume_store, session, &ConsoleNavigator),
        CliCommand::Placeholder { frames } => run_placeholder(&config_store, frames).await,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_composer(
    config_store: &ConfigStore,
    auth_gate: Arc<dyn AuthGate>,
) -> anyhow::Result<(Composer, UnboundedReceiver<ComposerEvent>)> {
    let config = config_store.load_composer_config()?;
    let (tx, rx) = unbounded_channel();
    let collaborators = ComposerCollaborators {
        auth_gate,
        navigator: Arc::new(ConsoleNavigator),
        error_sink: Arc::new(report_attachment_error),
    };
    let composer = Composer::new(config, collaborators, ComposerEventSender::new(tx))
        .context("create composer")?;
    Ok((composer, rx))
}

fn report_attachment_error(err: AttachmentError) {
    eprintln!("warning: skipped attachment: {err}");
}

async fn run_compose(
    config_store: &ConfigStore,
    resume_store: ResumeStore,
    args: ComposeArgs,
) -> anyhow::Result<()> {
    let ComposeArgs {
        query,
        mode,
        images,
        session,
    } = args;
    let slot = resume_store.path().display().to_string();
    let auth_gate = Arc::new(SessionAuthGate::new(session, resume_store));
    let (mut composer, mut rx) = build_composer(config_store, auth_gate)?;

    composer.set_text(query);
    let mode = ExecutionMode::from(mode);
    composer.set_mode(mode);
    if composer.mode() != mode {
        let actual = composer.mode();
        eprintln!("warning: agent mode is disabled; submitting as {actual}");
    }

    if !images.is_empty() {
        composer.add_files(images.into_iter().map(IncomingFile::from_path).collect());
        composer.settle_attachments(&mut rx).await;
    }

    match composer.submit()? {
        SubmitOutcome::Refused => anyhow::bail!("nothing to submit: --query is blank"),
        SubmitOutcome::Dispatched { .. } => Ok(()),
        SubmitOutcome::Blocked { .. } => {
            eprintln!("sign-in required {CREATE_APP_REASON}; saved to {slot}");
            eprintln!("run `launchpad resume --session full` once signed in");
            Ok(())
        }
    }
}

fn run_resume(
    store: &ResumeStore,
    session: Session,
    navigator: &dyn Navigator,
) -> anyhow::Result<()> {
    let Some(requirement) = store.peek()? else {
        anyhow::bail!("no submission is waiting for sign-in");
    };
    if !session.satisfies(&requirement) {
        anyhow::bail!(
            "session `{session}` cannot continue: sign in {}",
            requirement.reason
        );
    }
    SubmissionIntent::from_target(&requirement.resume_target)
        .context("stored submission is not a valid request")?;

    navigator.navigate(&requirement.resume_target);
    store.clear()
}

async fn run_placeholder(config_store: &ConfigStore, frames: usize) -> anyhow::Result<()> {
    let (mut composer, mut rx) = build_composer(config_store, Arc::new(PreviewAuthGate))?;
    composer.mount();

    let mut last = composer.placeholder_prompt();
    println!("{last}");
    let mut printed = 1;
    while printed < frames {
        let Some(event) = rx.recv().await else {
            break;
        };
        composer.handle_event(event);
        let prompt = composer.placeholder_prompt();
        if prompt != last {
            println!("{prompt}");
            last = prompt;
            printed += 1;
        }
    }

    composer.unmount();
    Ok(())
}
