//! Adapter interfaces for external systems.
//!
//! The tweet loop only talks to two collaborators: a text generator that
//! turns a seed into a sample, and a poster that publishes a message.

pub mod generator;
pub mod twitter;

use async_trait::async_trait;

pub use generator::{CharRnnSampler, SampleError};
pub use twitter::{PostError, TwitterClient};

/// Source of generated text
#[async_trait]
pub trait Sampler: Send + Sync {
    /// Human-readable sampler name
    fn name(&self) -> &str;

    /// Generate roughly `length` characters from `seed`
    async fn sample(&self, seed: u64, length: usize) -> Result<String, SampleError>;
}

/// Destination for finished tweets
#[async_trait]
pub trait Poster: Send + Sync {
    /// Human-readable poster name
    fn name(&self) -> &str;

    /// Publish a message, returning an identifier for it
    async fn post(&self, message: &str) -> Result<String, PostError>;
}

/// Poster that prints instead of publishing (dry runs)
#[derive(Debug, Default)]
pub struct StdoutPoster;

#[async_trait]
impl Poster for StdoutPoster {
    fn name(&self) -> &str {
        "stdout"
    }

    async fn post(&self, message: &str) -> Result<String, PostError> {
        println!("--- New Tweet ---");
        println!("{}", message);
        println!("-----------------");
        Ok("dry-run".to_string())
    }
}
