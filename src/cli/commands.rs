use crate::app::{app_router, build_worker, AppContext, Services};
use crate::config::Env;
use crate::dispatcher::{PathPattern, RouterHandler};
use crate::request::ApiRequest;
use crate::response::ApiResponse;
use crate::storage::MemoryStore;
use anyhow::Context;
use clap::{Parser, Subcommand};
use http::Method;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Command-line interface for edgeroute
#[derive(Parser, Debug)]
#[command(name = "edgeroute")]
#[command(about = "Inspect and exercise the edgeroute reference application", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the flattened route table in match order
    Routes,
    /// Run one request through the application and print the response
    Invoke {
        /// Request method
        #[arg(short = 'X', long, default_value = "GET")]
        method: String,

        /// Absolute request URL, e.g. https://edge.local/v1/foo
        url: String,

        /// Request header as `Name: value`, repeatable
        #[arg(short = 'H', long = "header", value_parser = parse_header)]
        headers: Vec<(String, String)>,

        /// Request body; sent as JSON unless a Content-Type header is given
        #[arg(short, long)]
        body: Option<String>,

        /// TOML configuration file; defaults to environment variables
        #[arg(short, long, env = "EDGE_CONFIG")]
        config: Option<PathBuf>,
    },
}

/// Parse a `Name: value` header argument
pub fn parse_header(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected `Name: value`, got {raw:?}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("empty header name in {raw:?}"));
    }
    Ok((name.to_owned(), value.trim().to_owned()))
}

/// Run the parsed command
///
/// # Errors
///
/// Fails on invalid configuration, an unparseable method or URL, or a route table that
/// does not build.
pub async fn run_cli(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Commands::Routes => {
            print!("{}", render_routes()?);
            Ok(())
        }
        Commands::Invoke {
            method,
            url,
            headers,
            body,
            config,
        } => {
            let env = load_env(config.as_deref())?;
            let request = build_request(&method, &url, &headers, body)?;
            let services = Services::from_env(env, Arc::new(MemoryStore::new()))
                .context("failed to initialize services")?;
            let worker = build_worker(services)?;
            let response = worker.handle(request).await;
            print!("{}", render_response(&response));
            Ok(())
        }
    }
}

fn load_env(path: Option<&Path>) -> anyhow::Result<Env> {
    match path {
        Some(path) => Env::from_toml_file(path).context("failed to load configuration file"),
        None => Env::from_env().context("failed to load configuration from environment"),
    }
}

/// One line per flattened route: method, declared path and match kind
pub fn render_routes() -> anyhow::Result<String> {
    let table = RouterHandler::build(&app_router::<AppContext>())?;
    let mut out = String::new();
    for route in table.routes() {
        let kind = match &route.pattern {
            PathPattern::Exact(_) => "exact".to_owned(),
            PathPattern::Wildcard(re) => format!("wildcard {}", re.as_str()),
        };
        out.push_str(&format!("{:<7} {:<20} {kind}\n", route.method.as_str(), route.path));
    }
    Ok(out)
}

/// Assemble the request described by the `invoke` arguments
pub fn build_request(
    method: &str,
    url: &str,
    headers: &[(String, String)],
    body: Option<String>,
) -> anyhow::Result<ApiRequest> {
    let method = Method::from_bytes(method.to_uppercase().as_bytes())
        .with_context(|| format!("invalid method {method:?}"))?;
    let mut request = ApiRequest::new(method, url).with_context(|| format!("invalid URL {url:?}"))?;

    let has_content_type = headers
        .iter()
        .any(|(name, _)| name.eq_ignore_ascii_case("content-type"));
    for (name, value) in headers {
        request = request.with_header(name, value);
    }
    if let Some(body) = body {
        if !has_content_type {
            request = request.with_header("content-type", "application/json");
        }
        request = request.with_body(body);
    }
    Ok(request)
}

/// Status line, headers, a blank line and the body
pub fn render_response(response: &ApiResponse) -> String {
    let mut out = format!("{}\n", response.status());
    for (name, value) in response.headers() {
        out.push_str(&format!(
            "{}: {}\n",
            name,
            value.to_str().unwrap_or("<binary>")
        ));
    }
    out.push('\n');
    out.push_str(&response.body_text());
    out.push('\n');
    out
}
