//! Command-line interface for scriptbot.
//!
//! Provides commands for building the training corpus from raw
//! transcripts and for running the tweet loop.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::{CharRnnSampler, Poster, Sampler, StdoutPoster, TwitterClient};
use crate::config::credentials::load_credentials;
use crate::config::{self, ResolvedConfig};
use crate::corpus::CorpusBuilder;
use crate::screenplay::extract_file;
use crate::tweet::{PostedTweet, TweetBot};

/// scriptbot - Screenplay dialog corpus builder and tweet bot
#[derive(Parser, Debug)]
#[command(name = "scriptbot")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract dialog from every transcript into the corpus file
    #[command(visible_alias = "data")]
    BuildCorpus {
        /// Transcript directory (default: data/raw/tng)
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Corpus output file (default: data/input.txt)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate and post a tweet now and then every interval
    #[command(visible_alias = "tweet")]
    RunTweetLoop {
        /// Post a single tweet and exit
        #[arg(long)]
        once: bool,

        /// Print tweets instead of posting them
        #[arg(long)]
        dry_run: bool,
    },

    /// Print the dialog extracted from one transcript
    Extract {
        /// Transcript file
        path: PathBuf,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::BuildCorpus { source, output } => build_corpus(source, output).await,
            Commands::RunTweetLoop { once, dry_run } => run_tweet_loop(once, dry_run).await,
            Commands::Extract { path } => extract(&path).await,
            Commands::Config => show_config(),
        }
    }
}

/// Build the corpus file
async fn build_corpus(source: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let config = config::config()?;
    let source = source.unwrap_or_else(|| config.raw_dir.clone());
    let output = output.unwrap_or_else(|| config.corpus_path.clone());

    let report = CorpusBuilder::new(&source)
        .build_to_file(&output)
        .await
        .with_context(|| format!("Failed to build corpus from {}", source.display()))?;

    eprintln!(
        "Wrote {} bytes of dialog from {} documents to {}",
        report.bytes,
        report.documents,
        output.display()
    );

    Ok(())
}

/// Run the tweet loop (or a single iteration)
async fn run_tweet_loop(once: bool, dry_run: bool) -> Result<()> {
    let config = config::config()?;
    let sampler = CharRnnSampler::new(config.generator.clone());

    if dry_run {
        run_bot(config, sampler, StdoutPoster, once).await?;
    } else {
        let credentials = load_credentials(&config.credentials_path)
            .context("Failed to sign in to Twitter")?;
        let poster = TwitterClient::from_credentials(credentials);
        run_bot(config, sampler, poster, once).await?;
    }

    Ok(())
}

/// Output belongs to the poster; the posted tweet is only returned.
async fn run_bot<S: Sampler, P: Poster>(
    config: &ResolvedConfig,
    sampler: S,
    poster: P,
    once: bool,
) -> Result<Option<PostedTweet>> {
    let mut bot = TweetBot::new(sampler, poster, config.tweet.clone());

    if once {
        Ok(Some(bot.run_once().await?))
    } else {
        bot.run_forever().await;
        Ok(None)
    }
}

/// Print one document's dialog
async fn extract(path: &Path) -> Result<()> {
    let dialog = extract_file(path).await?;
    print!("{}", dialog);
    Ok(())
}

/// Show resolved configuration
fn show_config() -> Result<()> {
    let config = config::config()?;

    println!("scriptbot configuration");
    println!("{}", "-".repeat(40));
    match &config.config_file {
        Some(path) => println!("Config file:   {}", path.display()),
        None => println!("Config file:   (none, using defaults)"),
    }
    println!("Transcripts:   {}", config.raw_dir.display());
    println!("Corpus:        {}", config.corpus_path.display());
    println!("Credentials:   {}", config.credentials_path.display());
    println!();
    println!("Generator:     {}", config.generator.binary);
    println!("  script:      {}", config.generator.script.display());
    println!("  checkpoint:  {}", config.generator.checkpoint.display());
    println!("  workdir:     {}", config.generator.workdir.display());
    println!("  timeout:     {:?}", config.generator.timeout);
    println!();
    println!("Sample length: {}", config.tweet.sample_length);
    println!("Max attempts:  {}", config.tweet.max_attempts);
    println!("Max chars:     {}", config.tweet.max_chars);
    println!(
        "Interval:      {}h",
        config.tweet.interval.as_secs() / 3600
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{PostError, SampleError};
    use async_trait::async_trait;
    use clap::CommandFactory;
    use std::sync::{Arc, Mutex};

    struct FixedSampler;

    #[async_trait]
    impl Sampler for FixedSampler {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn sample(&self, _seed: u64, _length: usize) -> Result<String, SampleError> {
            Ok("WORF: Today is a good day to die.\n".to_string())
        }
    }

    #[derive(Default, Clone)]
    struct CountingPoster {
        messages: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Poster for CountingPoster {
        fn name(&self) -> &str {
            "counting"
        }

        async fn post(&self, message: &str) -> Result<String, PostError> {
            self.messages.lock().unwrap().push(message.to_string());
            Ok("42".to_string())
        }
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbs_and_aliases() {
        let cli = Cli::try_parse_from(["scriptbot", "build-corpus"]).unwrap();
        assert!(matches!(cli.command, Commands::BuildCorpus { .. }));

        let cli = Cli::try_parse_from(["scriptbot", "data"]).unwrap();
        assert!(matches!(cli.command, Commands::BuildCorpus { .. }));

        let cli = Cli::try_parse_from(["scriptbot", "tweet", "--once", "--dry-run"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::RunTweetLoop {
                once: true,
                dry_run: true
            }
        ));
    }

    #[tokio::test]
    async fn test_run_once_hands_tweet_to_poster_once() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = config::load_config_from(temp.path()).unwrap();
        let poster = CountingPoster::default();

        let tweet = run_bot(&config, FixedSampler, poster.clone(), true)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(tweet.id, "42");
        assert_eq!(
            *poster.messages.lock().unwrap(),
            vec!["WORF: Today is a good day to die.".to_string()]
        );
    }

    #[test]
    fn test_missing_or_unknown_verb_is_rejected() {
        assert!(Cli::try_parse_from(["scriptbot"]).is_err());
        assert!(Cli::try_parse_from(["scriptbot", "dance"]).is_err());
    }
}
