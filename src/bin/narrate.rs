use anyhow::{Result, bail};
use clap::Parser;
use std::sync::Arc;
use talkify::{
    config::Config,
    extraction::{ExtractionRequest, ExtractionService},
    speech::{CommandEngine, PlaybackOutcome, SpeechController, command::DEFAULT_PROGRAM, segment},
    summarizer::SummaryMode,
};
use tokio::signal;
use tracing::info;

/// Read a web article aloud, one sentence at a time.
#[derive(Parser, Debug)]
#[command(name = "narrate", version)]
struct Args {
    /// Article URL to extract and narrate
    url: Option<String>,

    /// Narrate this text instead of fetching a URL
    #[arg(long, conflicts_with = "url")]
    text: Option<String>,

    /// Unit index to start from, as printed after an interrupted run
    #[arg(long, default_value_t = 0)]
    from: usize,

    /// Summary mode for fetched articles (off, extractive, generative)
    #[arg(long)]
    summary: Option<SummaryMode>,

    /// espeak-ng compatible speech program
    #[arg(long, default_value = DEFAULT_PROGRAM)]
    program: String,

    /// Speaking rate in words per minute
    #[arg(long)]
    rate: Option<u32>,

    /// Print the sentence units and exit without speaking
    #[arg(long)]
    list: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let text = match (&args.text, &args.url) {
        (Some(text), _) => text.clone(),
        (None, Some(url)) => fetch_article(url, args.summary).await?,
        (None, None) => bail!("pass an article URL or --text"),
    };

    if args.list {
        for unit in segment(&text).iter().filter(|unit| !unit.is_blank()) {
            println!("{:>4}  {}", unit.index(), unit.speakable());
        }
        return Ok(());
    }

    let mut engine = CommandEngine::new(&args.program).await;
    if let Some(rate) = args.rate {
        engine = engine.with_rate(rate);
    }
    let controller = SpeechController::new(Arc::new(engine));

    let mut narration = controller.speak(&text, args.from);
    let outcome = tokio::select! {
        outcome = &mut narration => outcome?,
        _ = signal::ctrl_c() => {
            controller.stop();
            narration.await?
        }
    };

    match outcome {
        PlaybackOutcome::Completed => info!("narration finished"),
        PlaybackOutcome::Stopped { cursor } => {
            println!("Stopped at unit {cursor}; continue with --from {cursor}");
        }
        PlaybackOutcome::Superseded => info!("narration replaced"),
    }
    Ok(())
}

async fn fetch_article(url: &str, summary: Option<SummaryMode>) -> Result<String> {
    let mut config = Config::from_env()?;
    if let Some(mode) = summary {
        config = config.with_summary_mode(mode);
    }
    let service = ExtractionService::from_config(&config)?;
    let article = service.extract(&ExtractionRequest::new(url)).await?;
    println!("{}", article.title);
    Ok(article.text().to_string())
}
