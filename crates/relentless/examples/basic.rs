//! Fetch a URL with retries
//!
//! ```bash
//! cargo run --example basic -- https://httpbin.org/status/503
//!
//! # Policy from the environment, logs from RUST_LOG
//! RELENTLESS_MAX_RETRIES=5 RUST_LOG=relentless_core=debug \
//!     cargo run --example basic --features trace -- https://httpbin.org/get
//! ```

use relentless::{Client, RequestOptions};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "trace")]
    relentless::observability::init_tracing();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://httpbin.org/get".to_string());

    let client = Client::from_env()?;
    println!("policy: {:?}", client.retry_policy());

    match client.get(&url, RequestOptions::new()).await {
        Ok(response) => {
            println!("{} {}", response.status, url);
            println!("{}", response.text()?);
        }
        Err(err) => {
            eprintln!("{err}");
            if let Some(status) = err.status_code() {
                eprintln!("last status: {status}");
            }
            std::process::exit(1);
        }
    }

    Ok(())
}
