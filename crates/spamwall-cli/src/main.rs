mod display;
mod interactive;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use spamwall_ai::{ArtifactLocation, ModelHandle, OnnxLoader, SpamFilter, TokenDtype};
use spamwall_core::{Encoder, FilterConfig, Vocabulary};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "spamwall", version, about = "Comment spam filter and relay")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the token sequence the classifier would see.
    Encode {
        #[command(flatten)]
        filter: FilterArgs,
        text: String,
    },
    /// Classify one or more comments.
    Classify {
        #[command(flatten)]
        filter: FilterArgs,
        #[command(flatten)]
        model: ModelArgs,
        #[arg(required = true)]
        texts: Vec<String>,
    },
    /// Post comments from stdin; accepted ones are relayed, remote ones printed.
    Session {
        #[command(flatten)]
        filter: FilterArgs,
        #[command(flatten)]
        model: ModelArgs,
        /// Display name attached to relayed comments.
        #[arg(long, short)]
        user: Option<String>,
        /// Print remote comments as JSON `remoteComment` frames.
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Variant {
    /// START token, distinct UNKNOWN/PAD, spam when > 0.75.
    Start,
    /// No START, UNKNOWN = PAD = 0, ASCII-only words, spam when >= 0.815.
    Zero,
}

#[derive(Args)]
struct FilterArgs {
    /// Vocabulary JSON, dictionary or word-list form.
    #[arg(long, env = "SPAMWALL_VOCAB")]
    vocab: PathBuf,
    #[arg(long, value_enum, default_value_t = Variant::Start)]
    variant: Variant,
    /// Filter config JSON; takes precedence over --variant.
    #[arg(long, env = "SPAMWALL_CONFIG")]
    config: Option<PathBuf>,
    /// Override the spam threshold.
    #[arg(long)]
    threshold: Option<f32>,
}

impl FilterArgs {
    fn resolve(&self) -> anyhow::Result<(Arc<Vocabulary>, FilterConfig)> {
        let vocab = Vocabulary::load(&self.vocab)
            .with_context(|| format!("loading vocabulary {}", self.vocab.display()))?;

        let mut config = match &self.config {
            Some(path) => FilterConfig::load(path)
                .with_context(|| format!("loading filter config {}", path.display()))?,
            None => match self.variant {
                Variant::Start => FilterConfig::start_token_variant(&vocab.reserved()),
                Variant::Zero => FilterConfig::zero_token_variant(),
            },
        };

        if let Some(threshold) = self.threshold {
            config.threshold.value = threshold;
        }
        config
            .validate()
            .context("invalid filter config (word-list vocabularies need --variant zero)")?;
        config
            .check_against(&vocab)
            .with_context(|| format!("filter config does not fit {}", self.vocab.display()))?;

        Ok((Arc::new(vocab), config))
    }

    fn filter(&self) -> anyhow::Result<SpamFilter> {
        let (vocab, config) = self.resolve()?;
        Ok(SpamFilter::from_config(vocab, &config))
    }
}

#[derive(Args)]
struct ModelArgs {
    /// Path or URL of the `.onnx` spam model.
    #[arg(long, env = "SPAMWALL_MODEL")]
    model: ArtifactLocation,
    /// Element type of the model's input tensor (f32 or i64).
    #[arg(long, default_value = "f32")]
    dtype: TokenDtype,
}

impl ModelArgs {
    fn handle(&self) -> Arc<ModelHandle<OnnxLoader>> {
        Arc::new(ModelHandle::new(OnnxLoader::new(
            self.model.clone(),
            self.dtype,
        )))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!("spamwall v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Encode { filter, text } => {
            let (vocab, config) = filter.resolve()?;
            let encoder = Encoder::new(vocab, &config.encoder);
            println!("{}", encoder.encode(&text));
        }
        Command::Classify {
            filter,
            model,
            texts,
        } => {
            let filter = filter.filter()?;
            let model = model
                .handle()
                .get_or_load()
                .await
                .context("loading spam model")?;

            let results = filter.classify_batch(model.as_ref(), &texts)?;
            for (text, classification) in texts.iter().zip(&results) {
                println!("{}", display::verdict_line(text, classification));
            }
        }
        Command::Session {
            filter,
            model,
            user,
            json,
        } => {
            interactive::run(filter.filter()?, model.handle(), user, json).await?;
        }
    }

    Ok(())
}
