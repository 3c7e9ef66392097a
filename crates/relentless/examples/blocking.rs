//! Same as `basic`, without an async runtime
//!
//! ```bash
//! cargo run --example blocking -- https://httpbin.org/status/500
//! ```

use relentless::RequestOptions;
use relentless::blocking::BlockingClient;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "trace")]
    relentless::observability::init_tracing();

    let url = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://httpbin.org/get".to_string());

    let client = BlockingClient::from_env()?;
    let options = RequestOptions::new().jitter_factor(0.2);

    match client.get(&url, options) {
        Ok(response) => println!("{} after retries as needed", response.status),
        Err(err) => {
            eprintln!("{err} ({} attempts)", err.attempts());
            std::process::exit(1);
        }
    }

    Ok(())
}
