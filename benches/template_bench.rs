//! Quick benchmark to verify path resolution and binding performance

use bindery::argument::{ArgumentBindingRegistry, ParameterDescriptor, QueueMessage};
use bindery::binding::{BindingData, PathResolver};
use std::time::Instant;

fn main() {
    let resolver = PathResolver::new();

    let patterns = vec![
        "input/report.txt",
        "input/{name}.txt",
        "{container}/{dir}/{name}-{date}.csv",
        "https://acct.blob.core.windows.net/input/a%20b.txt",
        "{url}",
    ];

    let values = BindingData::new()
        .with("name", "report")
        .with("container", "archive")
        .with("dir", "2024")
        .with("date", "01-15")
        .with("url", "https://acct.blob.core.windows.net/input/other.txt");

    println!("Path Resolution Performance Test");
    println!("================================\n");

    for pattern in &patterns {
        let iterations = 100_000;

        // Uncached: full parse every time
        let start = Instant::now();
        for _ in 0..iterations {
            let _ = resolver.resolve_uncached(pattern, false);
        }
        let uncached = start.elapsed();

        // Cached: one parse, then lookups
        let start = Instant::now();
        for _ in 0..iterations {
            let _ = resolver.resolve(pattern, false);
        }
        let cached = start.elapsed();

        // Bind against the shared resolution
        let Ok(path) = resolver.resolve(pattern, false) else {
            println!("Pattern {:60} failed to resolve\n", format!("\"{}\"", pattern));
            continue;
        };
        let start = Instant::now();
        for _ in 0..iterations {
            let _ = path.bind(&values);
        }
        let bind = start.elapsed();

        println!("Pattern: {:60}", format!("\"{}\"", pattern));
        println!("  resolve (uncached): {:?}/op", uncached / iterations);
        println!("  resolve (cached):   {:?}/op", cached / iterations);
        println!("  bind:               {:?}/op\n", bind / iterations);
    }

    println!("Argument Binding Performance");
    println!("============================\n");

    let registry = ArgumentBindingRegistry::standard();
    let message = QueueMessage::from_text("m-1", r#"{"name":"report","size":1024}"#);
    let parameters = vec![
        ParameterDescriptor::new::<QueueMessage>("message"),
        ParameterDescriptor::new::<Vec<u8>>("bytes"),
        ParameterDescriptor::new::<String>("text"),
        ParameterDescriptor::new::<serde_json::Value>("json"),
    ];

    let iterations = 100_000;
    for parameter in &parameters {
        let Ok(binder) = registry.select_binder(parameter) else {
            continue;
        };

        let start = Instant::now();
        for _ in 0..iterations {
            let _ = binder.bind(&message);
        }
        let elapsed = start.elapsed();

        println!("Parameter: {}", parameter.type_token());
        println!("  bind: {:?}/op\n", elapsed / iterations);
    }

    let start = Instant::now();
    for _ in 0..iterations {
        let _ = BindingData::from_message(&message);
    }
    println!("BindingData::from_message: {:?}/op", start.elapsed() / iterations);
}
