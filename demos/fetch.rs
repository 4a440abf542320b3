//! Fetches one URL, or a batch of URLs concurrently, and prints what came back.
//!
//! ```text
//! RUST_LOG=debug cargo run --example fetch -- https://httpbin.org/get https://httpbin.org/uuid
//! COURIER_DRIVER=ureq cargo run --example fetch -- https://httpbin.org/xml
//! ```

use courier::{HttpClient, HttpEvent};
use serde_json::json;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let urls: Vec<String> = std::env::args().skip(1).collect();
    if urls.is_empty() {
        anyhow::bail!("usage: fetch <url> [<url>...]");
    }

    let driver = std::env::var("COURIER_DRIVER").unwrap_or_else(|_| "Auto".into());
    let mut client = HttpClient::new(json!({ "driver": driver, "timeout": 10 }));
    client.subscribe(|event| {
        if let HttpEvent::Exception { error } = event {
            log::error!("Fetch: {}", error);
        }
        Ok(())
    });

    if let [url] = urls.as_slice() {
        let response = client.request(url.as_str())?;
        print_response(url, &response);
        return Ok(());
    }

    let batch = urls
        .iter()
        .enumerate()
        .map(|(idx, url)| (format!("#{}", idx + 1), url.clone()));
    for (name, response) in client.multi_request(batch)? {
        print_response(&name, &response);
    }

    Ok(())
}

fn print_response(label: &str, response: &courier::Response) {
    println!(
        "{} -> {} {} ({:.3}s)",
        label,
        response.code(),
        response.reason().unwrap_or("-"),
        response.time().unwrap_or_default()
    );
    for (name, value) in response.headers() {
        println!("  {}: {}", name, value);
    }
    if let Some(body) = response.body() {
        println!("{}", body);
    }
}
