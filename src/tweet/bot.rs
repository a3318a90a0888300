//! The tweet loop: sample, filter, post, repeat.

use std::time::Duration;

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use super::filter::{TweetFilter, MAX_TWEET_CHARS};
use crate::adapters::{PostError, Poster, SampleError, Sampler};

/// Errors from one tweet attempt
#[derive(Debug, Error)]
pub enum TweetError {
    #[error(transparent)]
    Sample(#[from] SampleError),

    #[error(transparent)]
    Post(#[from] PostError),

    #[error("No usable tweet after {attempts} samples")]
    NoCandidate { attempts: u32 },
}

/// Tweet loop tuning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TweetSettings {
    /// Characters requested per sample (default: 2000)
    pub sample_length: usize,

    /// Samples tried before giving up on one tweet (default: 20)
    pub max_attempts: u32,

    /// Time between tweets (default: 4 hours)
    pub interval: Duration,

    /// Character budget (default: 140)
    pub max_chars: usize,
}

impl Default for TweetSettings {
    fn default() -> Self {
        Self {
            sample_length: 2000,
            max_attempts: 20,
            interval: Duration::from_secs(4 * 60 * 60),
            max_chars: MAX_TWEET_CHARS,
        }
    }
}

/// A tweet that went out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedTweet {
    pub id: String,
    pub text: String,
}

/// Generates and posts tweets on a schedule
pub struct TweetBot<S, P> {
    sampler: S,
    poster: P,
    filter: TweetFilter,
    settings: TweetSettings,
    rng: StdRng,
}

impl<S: Sampler, P: Poster> TweetBot<S, P> {
    pub fn new(sampler: S, poster: P, settings: TweetSettings) -> Self {
        Self {
            sampler,
            poster,
            filter: TweetFilter::new().with_max_chars(settings.max_chars),
            settings,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Replace the candidate filter. The character budget still comes
    /// from `settings.max_chars`.
    pub fn with_filter(mut self, filter: TweetFilter) -> Self {
        self.filter = filter.with_max_chars(self.settings.max_chars);
        self
    }

    /// Seed the line-count roll (reproducible runs)
    pub fn with_rng_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn settings(&self) -> &TweetSettings {
        &self.settings
    }

    /// Sample until the filter yields a tweet, at most `max_attempts` times.
    ///
    /// Seeds start at the current unix time and advance by one per attempt
    /// so retries within the same second see different samples.
    pub async fn compose(&mut self) -> Result<String, TweetError> {
        let base_seed = Utc::now().timestamp().max(0) as u64;

        for attempt in 0..self.settings.max_attempts {
            let seed = base_seed + u64::from(attempt);
            debug!(seed, attempt, sampler = self.sampler.name(), "Sampling");

            let sample = self
                .sampler
                .sample(seed, self.settings.sample_length)
                .await?;

            match self.filter.extract(&sample, &mut self.rng) {
                Some(tweet) => return Ok(tweet),
                None => warn!(seed, attempt, "Sample held no usable dialog, retrying"),
            }
        }

        Err(TweetError::NoCandidate {
            attempts: self.settings.max_attempts,
        })
    }

    /// Compose one tweet and post it
    pub async fn run_once(&mut self) -> Result<PostedTweet, TweetError> {
        let text = self.compose().await?;
        let id = self.poster.post(&text).await?;

        info!(id = %id, poster = self.poster.name(), "Posted tweet:\n{}", text);
        Ok(PostedTweet { id, text })
    }

    /// Post immediately, then once per interval. Failures are logged and
    /// the schedule carries on. `max_runs` bounds the loop; `None` runs
    /// forever.
    pub async fn run_schedule(&mut self, max_runs: Option<usize>) -> Vec<PostedTweet> {
        let mut ticker = interval(self.settings.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut posted = Vec::new();
        let mut runs = 0;

        info!(
            "Tweeting every {} minutes",
            self.settings.interval.as_secs() / 60
        );

        while max_runs.map_or(true, |max| runs < max) {
            // First tick completes immediately
            ticker.tick().await;
            runs += 1;

            match self.run_once().await {
                Ok(tweet) => posted.push(tweet),
                Err(e) => error!("Tweet attempt failed: {}", e),
            }
        }

        posted
    }

    /// Run the schedule indefinitely
    pub async fn run_forever(&mut self) {
        self.run_schedule(None).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tweet::QuotePair;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Replays canned samples, then returns text with no dialog in it
    struct ScriptedSampler {
        samples: Mutex<VecDeque<Result<String, SampleError>>>,
        seeds: Mutex<Vec<u64>>,
    }

    impl ScriptedSampler {
        fn new(samples: Vec<Result<String, SampleError>>) -> Self {
            Self {
                samples: Mutex::new(samples.into()),
                seeds: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Sampler for ScriptedSampler {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn sample(&self, seed: u64, _length: usize) -> Result<String, SampleError> {
            self.seeds.lock().unwrap().push(seed);
            self.samples
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok("no dialog here\n".to_string()))
        }
    }

    #[derive(Default, Clone)]
    struct RecordingPoster {
        posted: Arc<Mutex<Vec<String>>>,
        failures: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Poster for RecordingPoster {
        fn name(&self) -> &str {
            "recording"
        }

        async fn post(&self, message: &str) -> Result<String, PostError> {
            if self.failures.load(Ordering::SeqCst) > 0 {
                self.failures.fetch_sub(1, Ordering::SeqCst);
                return Err(PostError::Rejected {
                    status: 403,
                    message: "duplicate content".to_string(),
                });
            }
            let mut posted = self.posted.lock().unwrap();
            posted.push(message.to_string());
            Ok(posted.len().to_string())
        }
    }

    fn settings() -> TweetSettings {
        TweetSettings {
            max_attempts: 3,
            interval: Duration::from_millis(5),
            ..Default::default()
        }
    }

    // A single candidate line always assembles to itself unless the roll
    // is exactly zero
    const GOOD: &str = "noise\nPICARD: Tea, Earl Grey, hot.\nmore noise";

    #[tokio::test]
    async fn test_compose_retries_until_usable() {
        let sampler = ScriptedSampler::new(vec![
            Ok("garbage\n".to_string()),
            Ok(GOOD.to_string()),
        ]);
        let mut bot =
            TweetBot::new(sampler, RecordingPoster::default(), settings()).with_rng_seed(1);

        let tweet = bot.compose().await.unwrap();
        assert_eq!(tweet, "PICARD: Tea, Earl Grey, hot.");

        let seeds = bot.sampler.seeds.lock().unwrap().clone();
        assert_eq!(seeds.len(), 2);
        assert_eq!(seeds[1], seeds[0] + 1);
    }

    #[tokio::test]
    async fn test_compose_gives_up_after_max_attempts() {
        let sampler = ScriptedSampler::new(vec![]);
        let mut bot = TweetBot::new(sampler, RecordingPoster::default(), settings());

        let result = bot.compose().await;
        assert!(matches!(result, Err(TweetError::NoCandidate { attempts: 3 })));
        assert_eq!(bot.sampler.seeds.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_replaced_filter_keeps_character_budget() {
        let sampler = ScriptedSampler::new(vec![Ok(GOOD.to_string())]);
        let settings = TweetSettings {
            max_attempts: 1,
            max_chars: 10,
            ..settings()
        };
        let mut bot = TweetBot::new(sampler, RecordingPoster::default(), settings)
            .with_filter(TweetFilter::new().with_quotes(QuotePair::typographic()))
            .with_rng_seed(1);

        let result = bot.compose().await;
        assert!(matches!(result, Err(TweetError::NoCandidate { attempts: 1 })));
    }

    #[tokio::test]
    async fn test_sample_error_ends_attempt() {
        let sampler = ScriptedSampler::new(vec![Err(SampleError::Exit {
            code: 1,
            stderr: "cuda error".to_string(),
        })]);
        let mut bot = TweetBot::new(sampler, RecordingPoster::default(), settings());

        let result = bot.run_once().await;
        assert!(matches!(result, Err(TweetError::Sample(_))));
    }

    #[tokio::test]
    async fn test_run_once_posts() {
        let poster = RecordingPoster::default();
        let sampler = ScriptedSampler::new(vec![Ok(GOOD.to_string())]);
        let mut bot = TweetBot::new(sampler, poster.clone(), settings()).with_rng_seed(9);

        let tweet = bot.run_once().await.unwrap();
        assert_eq!(tweet.id, "1");
        assert_eq!(
            *poster.posted.lock().unwrap(),
            vec!["PICARD: Tea, Earl Grey, hot.".to_string()]
        );
    }

    #[tokio::test]
    async fn test_schedule_survives_failures() {
        let poster = RecordingPoster::default();
        poster.failures.store(1, Ordering::SeqCst);

        let sampler = ScriptedSampler::new(vec![
            Ok(GOOD.to_string()),
            Err(SampleError::Stderr("out of memory".to_string())),
            Ok(GOOD.to_string()),
        ]);
        let mut bot = TweetBot::new(sampler, poster.clone(), settings()).with_rng_seed(5);

        let posted = bot.run_schedule(Some(3)).await;

        // Run 1: post rejected. Run 2: sample failed. Run 3: posted.
        assert_eq!(posted.len(), 1);
        assert_eq!(poster.posted.lock().unwrap().len(), 1);
    }
}
