// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Mustekala CLI - Attempt-Oriented HTTP Client
//!
//! Example usage and demonstration of the mustekala library.

use std::env;
use std::process::ExitCode;

use mustekala::{HttpClient, Method, Payload};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mustekala=info".parse().unwrap()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    match args[1].as_str() {
        "fetch" => {
            if args.len() < 3 {
                eprintln!("Usage: mustekala fetch <url> [method]");
                return ExitCode::from(1);
            }
            fetch_url(&args[2], parse_method(args.get(3))).await
        }
        "once" => {
            if args.len() < 3 {
                eprintln!("Usage: mustekala once <url> [method] [body]");
                return ExitCode::from(1);
            }
            ask_once(&args[2], parse_method(args.get(3)), args.get(4)).await
        }
        "json" => {
            if args.len() < 3 {
                eprintln!("Usage: mustekala json <url> [method] [body]");
                return ExitCode::from(1);
            }
            ask_json(&args[2], parse_method(args.get(3)), args.get(4)).await
        }
        _ => {
            print_usage();
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!("Mustekala - Attempt-Oriented HTTP Client v{}", mustekala::VERSION);
    println!();
    println!("Usage:");
    println!("  mustekala fetch <url> [method]         Request with redirects and retries");
    println!("  mustekala once <url> [method] [body]   Single attempt, no orchestration");
    println!("  mustekala json <url> [method] [body]   Single attempt with JSON headers");
}

fn parse_method(arg: Option<&String>) -> Method {
    arg.and_then(|m| m.to_uppercase().parse().ok())
        .unwrap_or(Method::GET)
}

async fn fetch_url(url: &str, method: Method) -> ExitCode {
    let client = match HttpClient::new() {
        Ok(client) => client,
        Err(err) => {
            eprintln!("Failed to create client: {}", err);
            return ExitCode::from(1);
        }
    };

    let history = client.ask(url, method, None).await;
    print!("{}", history);

    match history.last() {
        Some(answer) => {
            println!("{}", answer.content_text());
            exit_for_status(answer.status)
        }
        None => ExitCode::from(1),
    }
}

async fn ask_once(url: &str, method: Method, body: Option<&String>) -> ExitCode {
    let client = match HttpClient::new() {
        Ok(client) => client,
        Err(err) => {
            eprintln!("Failed to create client: {}", err);
            return ExitCode::from(1);
        }
    };

    let payload = body.map(|b| Payload::from(b.as_str()));
    let answer = client.ask_once(url, method, payload).await;
    print_attempt(&answer)
}

async fn ask_json(url: &str, method: Method, body: Option<&String>) -> ExitCode {
    let client = match HttpClient::new() {
        Ok(client) => client,
        Err(err) => {
            eprintln!("Failed to create client: {}", err);
            return ExitCode::from(1);
        }
    };

    let payload = body.map(|b| Payload::from(b.as_str()));
    match client.ask_json(url, method, payload).await {
        Ok(answer) => print_attempt(&answer),
        Err(err) => {
            eprintln!("Request failed: {}", err);
            ExitCode::from(1)
        }
    }
}

fn print_attempt(answer: &mustekala::Attempt) -> ExitCode {
    match serde_json::to_string_pretty(answer) {
        Ok(json) => println!("{}", json),
        Err(_) => println!("{}", answer),
    }
    exit_for_status(answer.status)
}

fn exit_for_status(status: u16) -> ExitCode {
    if (200..400).contains(&status) {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
