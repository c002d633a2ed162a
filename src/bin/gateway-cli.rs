use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, ORIGIN};
use reqwest::{Method, StatusCode};
use serde_json::Value;

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Send authenticated requests through the edge gateway", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    /// Bearer token sent as Authorization.
    #[arg(short, long, env = "GATEWAY_TOKEN")]
    token: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send one request and print the response
    Request {
        method: String,
        path: String,
        /// Request body
        #[arg(short, long)]
        data: Option<String>,
        #[arg(long, default_value = "application/json")]
        content_type: String,
    },
    /// Send a CORS preflight and print the Access-Control headers
    Preflight {
        path: String,
        #[arg(short, long)]
        origin: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    let mut headers = HeaderMap::new();
    if let Some(token) = &cli.token {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))?,
        );
    }

    match cli.command {
        Commands::Request {
            method,
            path,
            data,
            content_type,
        } => {
            let method = Method::from_bytes(method.to_uppercase().as_bytes())?;
            let mut req = client
                .request(method, format!("{}{}", base, path))
                .headers(headers);
            if let Some(data) = data {
                req = req
                    .header(CONTENT_TYPE, content_type)
                    .body(data);
            }
            print_response(req.send().await?).await?;
        }
        Commands::Preflight { path, origin } => {
            let res = client
                .request(Method::OPTIONS, format!("{}{}", base, path))
                .header(ORIGIN, origin)
                .header("Access-Control-Request-Method", "POST")
                .send()
                .await?;
            println!("{}", res.status());
            for (name, value) in res.headers() {
                if name.as_str().starts_with("access-control-") {
                    println!("{}: {}", name, value.to_str().unwrap_or("<binary>"));
                }
            }
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    let text = res.text().await?;
    println!("{}", status);

    match serde_json::from_str::<Value>(&text) {
        Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
        Err(_) => println!("{}", text),
    }

    ensure_success(status)
}

/// Non-2xx becomes an error so the process exits non-zero.
fn ensure_success(status: StatusCode) -> Result<(), Box<dyn std::error::Error>> {
    if status.is_success() {
        Ok(())
    } else {
        Err(format!("gateway returned status {}", status).into())
    }
}
