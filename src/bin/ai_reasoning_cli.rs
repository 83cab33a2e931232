//! ai-reasoning-cli: route a model name, then run one generation against it.
//!
//! Usage:
//!   ai-reasoning-cli generate <model> <prompt> [OPTIONS]   Run a completion
//!   ai-reasoning-cli route <model> [--config <path>]       Show provider routing
//!   ai-reasoning-cli providers                             List known providers

use ai_lib_reasoning::{
    AiClientBuilder, AppConfig, ContentBlock, Credentials, GenerateRequest, MessageContent,
    Provider, ResponseFormat, ThinkingConfig, TransportSettings,
};
use anyhow::{bail, Context};
use futures::StreamExt;
use std::io::Write;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let result = match args[1].as_str() {
        "generate" => cmd_generate(&args[2..]),
        "route" => cmd_route(&args[2..]),
        "providers" => {
            cmd_providers();
            Ok(())
        }
        "version" | "--version" | "-V" => {
            println!("ai-reasoning-cli {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

fn print_usage() {
    println!(
        r#"ai-reasoning-cli

USAGE:
    ai-reasoning-cli <COMMAND> [OPTIONS]

COMMANDS:
    generate <model> <prompt>   Run one completion
    route <model>               Show which provider and endpoint a model resolves to
    providers                   List known providers and their default endpoints
    version                     Show version information
    help                        Show this help message

GENERATE OPTIONS:
    --stream                    Stream fragments as they arrive
    --thoughts                  Request and print reasoning
    --budget <tokens>           Thinking budget (default 1024, with --thoughts)
    --system <text>             System instruction
    --temperature <t>           Sampling temperature (clamped to 1.0)
    --json                      Request a JSON object response
    --image <path>              Attach a local image to the prompt
    --base-url <url>            Override the provider endpoint
    --api-key <key>             Explicit API key
    --config <path>             YAML or JSON file with client settings and custom models

ENVIRONMENT:
    AI_LIB_API_KEY              Primary fallback API key
    API_KEY                     Secondary fallback API key
    AI_HTTP_TIMEOUT_SECS        Request timeout for non-streaming calls
    AI_PROXY_URL                HTTP(S) proxy
    RUST_LOG                    Log filter (default: warn)"#
    );
}

/// Value following `flag`, if present.
fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.iter()
        .position(|a| a == flag)
        .and_then(|i| args.get(i + 1))
        .map(String::as_str)
}

fn has_flag(args: &[String], flag: &str) -> bool {
    args.iter().any(|a| a == flag)
}

fn load_config(args: &[String]) -> anyhow::Result<AppConfig> {
    let Some(path) = flag_value(args, "--config") else {
        return Ok(AppConfig::default());
    };
    let raw = std::fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let is_json = Path::new(path)
        .extension()
        .map(|e| e.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let config = if is_json {
        AppConfig::from_json_str(&raw)
    } else {
        AppConfig::from_yaml_str(&raw)
    };
    config.with_context(|| format!("parsing {path}"))
}

fn cmd_providers() {
    println!("{:<10} {:<18} DEFAULT ENDPOINT", "PROVIDER", "DIALECT");
    for p in Provider::ALL {
        println!(
            "{:<10} {:<18} {}",
            p.id(),
            format!("{:?}", p.dialect()),
            p.default_base_url().unwrap_or("(library default)")
        );
    }
}

fn cmd_route(args: &[String]) -> anyhow::Result<()> {
    let Some(model) = args.first() else {
        bail!("usage: ai-reasoning-cli route <model> [--config <path>]");
    };
    let app = load_config(args)?;
    let cfg = app.client_config_for(model);
    let provider = cfg.provider.unwrap_or_else(|| Provider::resolve(model));
    println!("model:    {model}");
    println!("provider: {provider}");
    println!("dialect:  {:?}", provider.dialect());
    match cfg.base_url.as_deref().or(provider.default_base_url()) {
        Some(url) => println!("endpoint: {url}"),
        None => println!("endpoint: (library default)"),
    }
    Ok(())
}

fn cmd_generate(args: &[String]) -> anyhow::Result<()> {
    let (Some(model), Some(prompt)) = (args.first(), args.get(1)) else {
        bail!("usage: ai-reasoning-cli generate <model> <prompt> [OPTIONS]");
    };

    let app = load_config(args)?;
    let mut config = app.client_config_for(model);
    if let Some(url) = flag_value(args, "--base-url") {
        config.base_url = Some(url.to_string());
    }
    if let Some(key) = flag_value(args, "--api-key") {
        config.api_key = Some(key.to_string());
    }

    let content: MessageContent = match flag_value(args, "--image") {
        Some(path) => vec![
            ContentBlock::text(prompt.as_str()),
            ContentBlock::image_from_file(path)?,
        ]
        .into(),
        None => prompt.as_str().into(),
    };
    let mut request = GenerateRequest::new(model.as_str(), content);
    if let Some(sys) = flag_value(args, "--system") {
        request = request.system_instruction(sys);
    }
    if let Some(t) = flag_value(args, "--temperature") {
        let t: f64 = t.parse().with_context(|| format!("invalid temperature '{t}'"))?;
        request = request.temperature(t);
    }
    if has_flag(args, "--json") {
        request = request.response_format(ResponseFormat::JsonObject);
    }
    let thoughts = has_flag(args, "--thoughts");
    if thoughts {
        let budget = match flag_value(args, "--budget") {
            Some(b) => b.parse().with_context(|| format!("invalid budget '{b}'"))?,
            None => 1024,
        };
        request = request.thinking(ThinkingConfig::new(true, budget));
    }

    let client = AiClientBuilder::new()
        .config(config)
        .credentials(Credentials::from_env())
        .transport_settings(TransportSettings::from_env())
        .build()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting tokio runtime")?;

    runtime.block_on(async {
        if has_flag(args, "--stream") {
            let mut stream = client.generate_content_stream(&request).await?;
            let mut stdout = std::io::stdout();
            while let Some(fragment) = stream.next().await {
                let fragment = fragment?;
                if fragment.is_thought() {
                    eprint!("{}", fragment.thought);
                } else {
                    print!("{}", fragment.text);
                    stdout.flush().ok();
                }
            }
            println!();
        } else {
            let completion = client.generate_content(&request).await?;
            if let Some(thought) = completion.thought.as_deref() {
                eprintln!("[thought]\n{thought}\n");
            }
            println!("{}", completion.text);
        }
        anyhow::Ok(())
    })
}
