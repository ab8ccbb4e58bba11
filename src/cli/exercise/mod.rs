//! Exercise command - random CRUD traffic against a running server

use std::time::Duration;

use anyhow::bail;
use clap::Args;
use rand::{distributions::Alphanumeric, rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use tokio::signal;
use tracing::{info, warn};

use crate::config::LoggingConfig;
use crate::infrastructure::logging;

const KEY_LENGTH: usize = 8;
const VALUE_LENGTH: usize = 16;

#[derive(Args, Debug, Clone)]
pub struct ExerciseArgs {
    /// Base URL of the key-value API
    #[arg(long, default_value = "http://localhost:8081/api")]
    pub base_url: String,

    /// Number of tracked keys at which every tick deletes one
    #[arg(long, default_value_t = 10)]
    pub max_keys: usize,

    /// Minimum delay between requests, in seconds
    #[arg(long, default_value_t = 1)]
    pub min_delay_secs: u64,

    /// Maximum delay between requests, in seconds
    #[arg(long, default_value_t = 5)]
    pub max_delay_secs: u64,

    /// Stop after this many requests (runs until Ctrl+C when omitted)
    #[arg(long)]
    pub iterations: Option<u64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Operation {
    Create,
    Read,
    Modify,
    Delete,
}

impl Operation {
    const ALL: [Operation; 4] = [
        Operation::Create,
        Operation::Read,
        Operation::Modify,
        Operation::Delete,
    ];
}

/// Issues requests and tracks the keys it has created
pub struct Exerciser {
    client: reqwest::Client,
    base_url: String,
    max_keys: usize,
    keys: Vec<String>,
    rng: StdRng,
}

impl Exerciser {
    pub fn new(base_url: impl Into<String>, max_keys: usize) -> Self {
        Self::with_rng(base_url, max_keys, StdRng::from_entropy())
    }

    fn with_rng(base_url: impl Into<String>, max_keys: usize, rng: StdRng) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_keys,
            keys: Vec::new(),
            rng,
        }
    }

    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// One step: forced delete at the key limit, otherwise a random operation
    pub async fn tick(&mut self) {
        let operation = if self.keys.len() >= self.max_keys {
            Operation::Delete
        } else {
            Operation::ALL
                .choose(&mut self.rng)
                .copied()
                .unwrap_or(Operation::Create)
        };

        match operation {
            Operation::Create => self.create_key().await,
            Operation::Read => self.read_key().await,
            Operation::Modify => self.modify_key().await,
            Operation::Delete => self.delete_key().await,
        }
    }

    pub async fn create_key(&mut self) {
        let key = random_string(&mut self.rng, KEY_LENGTH);
        let value = random_string(&mut self.rng, VALUE_LENGTH);

        let result = self
            .client
            .post(format!("{}/create", self.base_url))
            .query(&[("key", &key), ("value", &value)])
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                info!(key = %key, "Created key");
                if !self.keys.contains(&key) {
                    self.keys.push(key);
                }
            }
            Ok(response) => warn!(key = %key, status = %response.status(), "Failed to create key"),
            Err(e) => warn!(error = %e, "Error creating key"),
        }
    }

    pub async fn read_key(&mut self) {
        let Some(key) = self.pick_key() else {
            info!("No keys available to read");
            return;
        };

        let result = self
            .client
            .get(format!("{}/read/{}", self.base_url, key))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                match response.json::<serde_json::Value>().await {
                    Ok(data) => info!(key = %key, data = %data, "Read key"),
                    Err(e) => warn!(key = %key, error = %e, "Unreadable response body"),
                }
            }
            Ok(response) => warn!(key = %key, status = %response.status(), "Failed to read key"),
            Err(e) => warn!(error = %e, "Error reading key"),
        }
    }

    pub async fn modify_key(&mut self) {
        let Some(key) = self.pick_key() else {
            info!("No keys available to modify");
            return;
        };
        let value = random_string(&mut self.rng, VALUE_LENGTH);

        let result = self
            .client
            .put(format!("{}/modify/{}", self.base_url, key))
            .query(&[("value", &value)])
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => info!(key = %key, "Modified key"),
            Ok(response) => warn!(key = %key, status = %response.status(), "Failed to modify key"),
            Err(e) => warn!(error = %e, "Error modifying key"),
        }
    }

    pub async fn delete_key(&mut self) {
        let Some(key) = self.pick_key() else {
            info!("No keys available to delete");
            return;
        };

        let result = self
            .client
            .delete(format!("{}/delete/{}", self.base_url, key))
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {
                self.keys.retain(|k| k != &key);
                info!(key = %key, "Deleted key");
            }
            Ok(response) => warn!(key = %key, status = %response.status(), "Failed to delete key"),
            Err(e) => warn!(error = %e, "Error deleting key"),
        }
    }

    fn pick_key(&mut self) -> Option<String> {
        self.keys.choose(&mut self.rng).cloned()
    }

    fn next_delay(&mut self, min_secs: u64, max_secs: u64) -> Duration {
        Duration::from_secs(self.rng.gen_range(min_secs..=max_secs))
    }
}

fn random_string<R: Rng>(rng: &mut R, length: usize) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

/// Run the traffic generator until Ctrl+C or the iteration limit
pub async fn run(args: ExerciseArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    logging::init_logging(&LoggingConfig::default());

    let mut exerciser = Exerciser::new(&args.base_url, args.max_keys);
    exercise(&args, &mut exerciser).await?;

    Ok(())
}

/// Drives `exerciser` with the delays and limit from `args`; returns the number of requests made
pub async fn exercise(args: &ExerciseArgs, exerciser: &mut Exerciser) -> anyhow::Result<u64> {
    if args.min_delay_secs > args.max_delay_secs {
        bail!(
            "--min-delay-secs ({}) must not exceed --max-delay-secs ({})",
            args.min_delay_secs,
            args.max_delay_secs
        );
    }

    info!(
        base_url = %args.base_url,
        max_keys = args.max_keys,
        "Starting exercise run, press Ctrl+C to stop"
    );

    let limit_reached = |completed: u64| args.iterations.is_some_and(|limit| completed >= limit);
    let shutdown = signal::ctrl_c();
    tokio::pin!(shutdown);

    let mut completed: u64 = 0;
    while !limit_reached(completed) {
        tokio::select! {
            _ = &mut shutdown => break,
            _ = exerciser.tick() => {}
        }

        completed += 1;
        if limit_reached(completed) {
            break;
        }

        let delay = exerciser.next_delay(args.min_delay_secs, args.max_delay_secs);
        tokio::select! {
            _ = &mut shutdown => break,
            _ = tokio::time::sleep(delay) => {}
        }
    }

    info!(requests = completed, "Exercise run stopped");

    Ok(completed)
}
