// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! synchttp CLI - Blocking HTTP Client
//!
//! Sends one request and prints status, raw headers and body.

use std::env;
use std::process::ExitCode;

use anyhow::{bail, Context};
use synchttp::{ClientConfig, HttpClient, Response};

/// Parsed command line
struct Invocation {
    method: String,
    url: String,
    body: String,
    headers: Vec<String>,
    config: ClientConfig,
}

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("synchttp=info".parse().unwrap()),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    match args[1].as_str() {
        "get" | "post" | "put" | "patch" | "delete" => match parse_invocation(&args[1..]) {
            Ok(invocation) => run(invocation),
            Err(e) => {
                eprintln!("Error: {:#}", e);
                ExitCode::from(1)
            }
        },
        "--help" | "-h" | "help" => {
            print_usage();
            ExitCode::SUCCESS
        }
        "--version" | "-v" | "version" => {
            println!("synchttp {}", synchttp::VERSION);
            ExitCode::SUCCESS
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            ExitCode::from(1)
        }
    }
}

fn print_usage() {
    println!(
        r#"synchttp - Blocking HTTP Client

USAGE:
    synchttp <METHOD> <url> [body] [OPTIONS]

METHODS:
    get, post, put, patch, delete

OPTIONS:
    --header 'Name: Value'   Extra request header, repeatable
    --proxy <host:port>      Route through a named proxy
    --proxy-user <user>      Proxy username
    --proxy-pass <pass>      Proxy password
    --verify-tls             Validate server certificates
    --config <file.json>     Load client configuration from a JSON file

COMMANDS:
    help                     Show this help message
    version                  Show version information

EXAMPLES:
    synchttp get https://example.com/
    synchttp post https://example.com/login "user=a&pass=b"
    synchttp put https://api.example.com/items/1 '{{"a":1}}' --header 'Content-Type: application/json'
"#
    );
}

fn parse_invocation(args: &[String]) -> anyhow::Result<Invocation> {
    let method = args[0].to_uppercase();
    let mut positional = Vec::new();
    let mut headers = Vec::new();
    let mut config_path = None;
    let mut proxy = None;
    let mut proxy_user = String::new();
    let mut proxy_pass = String::new();
    let mut verify_tls = false;

    let mut iter = args[1..].iter();
    while let Some(arg) = iter.next() {
        let mut value = |flag: &str| {
            iter.next()
                .cloned()
                .with_context(|| format!("{} needs a value", flag))
        };
        match arg.as_str() {
            "--header" | "-H" => headers.push(value(arg.as_str())?),
            "--proxy" => proxy = Some(value(arg.as_str())?),
            "--proxy-user" => proxy_user = value(arg.as_str())?,
            "--proxy-pass" => proxy_pass = value(arg.as_str())?,
            "--config" => config_path = Some(value(arg.as_str())?),
            "--verify-tls" => verify_tls = true,
            flag if flag.starts_with("--") => bail!("unknown option {}", flag),
            _ => positional.push(arg.clone()),
        }
    }

    let mut positional = positional.into_iter();
    let url = positional.next().context("missing <url>")?;
    let body = positional.next().unwrap_or_default();
    if let Some(extra) = positional.next() {
        bail!("unexpected argument {}", extra);
    }

    let mut config = match config_path {
        Some(path) => ClientConfig::from_json_file(&path)
            .with_context(|| format!("failed to load config {}", path))?,
        None => ClientConfig::default(),
    };
    if let Some(host) = proxy {
        config = config.use_proxy(true).proxy(host, proxy_user, proxy_pass);
    }
    if verify_tls {
        config = config.verify_tls(true);
    }

    Ok(Invocation {
        method,
        url,
        body,
        headers,
        config,
    })
}

fn run(invocation: Invocation) -> ExitCode {
    let mut client = HttpClient::with_config(invocation.config);
    let extra_headers: String = invocation
        .headers
        .iter()
        .map(|h| format!("{}\r\n", h))
        .collect();

    let response = client.request(
        &invocation.method,
        &invocation.url,
        invocation.body.as_bytes(),
        &extra_headers,
    );

    print_response(&response);

    if !client.last_error().is_success() {
        eprintln!("Last error code: {}", client.last_error());
    }

    if response.is_aborted() || response.status_code == 0 {
        ExitCode::from(1)
    } else {
        ExitCode::SUCCESS
    }
}

fn print_response(response: &Response) {
    if response.is_aborted() {
        eprintln!("Request failed: {}", response.error);
    }
    for diagnostic in &response.diagnostics {
        eprintln!("  warning: {}", diagnostic);
    }

    println!("=== Status: {} ===", response.status_code);
    print!("{}", response.raw_headers);
    println!("=== Body ({} bytes) ===", response.content_length);
    println!("{}", response.text_lossy());
}
