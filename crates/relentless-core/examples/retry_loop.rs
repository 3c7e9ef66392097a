//! Example: driving the retry controllers with a simulated transport
//!
//! This example demonstrates:
//! 1. Retrying a flaky endpoint until it answers
//! 2. A terminal status ending the call at once
//! 3. Jitter spreading out the waits (run multiple times to see variance)
//!
//! Run with:
//! ```bash
//! cargo run -p relentless-core --example retry_loop
//! ```

use relentless_core::prelude::*;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Instant;

/// A response carrying nothing but its status
struct Status(u16);

impl ResponseStatus for Status {
    fn status_code(&self) -> u16 {
        self.0
    }

    fn header(&self, _name: &str) -> Option<&str> {
        None
    }
}

/// A simulated endpoint that answers 503 a fixed number of times
struct FlakyEndpoint {
    calls: AtomicU32,
    failures: u32,
}

impl FlakyEndpoint {
    fn new(failures: u32) -> Self {
        Self {
            calls: AtomicU32::new(0),
            failures,
        }
    }

    fn call(&self) -> Result<Status, std::io::Error> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let status = if call < self.failures { 503 } else { 200 };
        println!("  Attempt {}: {}", call + 1, status);
        Ok(Status(status))
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let policy = RetryPolicy::builder()
        .max_retries(3)
        .backoff_factor(0.1)
        .jitter_factor(0.5)
        .build();

    println!("1. Async controller, two failures before success");
    let endpoint = FlakyEndpoint::new(2);
    let started = Instant::now();
    let response = AsyncController::new()
        .execute(&policy, "GET", "sim://flaky", |_attempt| async { endpoint.call() })
        .await?;
    println!(
        "  -> {} in {:?}\n",
        response.status_code(),
        started.elapsed()
    );

    println!("2. Blocking controller, terminal status");
    let result = BlockingController::new().execute(&policy, "GET", "sim://gone", |_attempt| {
        Ok::<_, std::io::Error>(Status(410))
    });
    match result {
        Err(RetryError::Failed(failure)) => println!("  -> {failure}\n"),
        other => println!("  -> unexpected: {:?}\n", other.map(|s| s.0)),
    }

    println!("3. Exhaustion");
    let endpoint = FlakyEndpoint::new(u32::MAX);
    let result = BlockingController::new()
        .execute(&policy, "GET", "sim://down", |_attempt| endpoint.call());
    if let Err(err) = result {
        println!("  -> {err}");
    }

    Ok(())
}
