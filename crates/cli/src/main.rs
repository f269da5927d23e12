use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use value_analyst_core::config::Settings;
use value_analyst_core::domain::Language;
use value_analyst_core::i18n;
use value_analyst_core::llm::AnalysisClient;
use value_analyst_core::ui::{Phase, Session};

mod render;

#[derive(Debug, Parser)]
#[command(name = "value_analyst_cli")]
struct Args {
    /// Product category, e.g. "Mechanical Keyboards".
    #[arg(long)]
    category: String,

    /// Budget as free text, e.g. "Under $150".
    #[arg(long)]
    budget: String,

    /// Language of the answer: en or my.
    #[arg(long, default_value = "en")]
    language: Language,

    /// Print the raw result JSON instead of cards.
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();

    let client = AnalysisClient::from_settings(&settings).context("cannot start analysis")?;

    let session = Session::new();
    session.set_language(args.language);
    session.set_inputs(args.category, args.budget);
    let submission = session.begin().context("invalid analysis input")?;

    let strings = i18n::strings(args.language);
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::with_template("{spinner} {prefix} {msg}")
            .context("invalid spinner template")?,
    );
    spinner.set_prefix(strings.btn_loading);
    spinner.set_message(strings.caption(0));
    spinner.enable_steady_tick(Duration::from_millis(120));

    let mut rx = session.subscribe();
    let run = submission.run(&client);
    tokio::pin!(run);
    let phase = loop {
        tokio::select! {
            phase = &mut run => break phase,
            changed = rx.changed() => {
                if changed.is_err() {
                    break (&mut run).await;
                }
                if let Some(caption) = rx.borrow_and_update().caption() {
                    spinner.set_message(caption);
                }
            }
        }
    };
    spinner.finish_and_clear();

    match phase {
        Phase::Result(result) => {
            if args.json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print!("{}", render::cards(&result, strings));
            }
            Ok(())
        }
        Phase::Error(message) => {
            let err = anyhow::anyhow!(message);
            sentry_anyhow::capture_anyhow(&err);
            tracing::error!(error = %err, "analysis failed");
            Err(err)
        }
        other => anyhow::bail!("analysis ended in unexpected state: {}", other.name()),
    }
}

fn init_sentry(settings: &Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
