use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use pit_core::api::{StateResponse, StatusResponse};
use reqwest::multipart::{Form, Part};

#[derive(Parser, Debug)]
#[command(name = "pitctl")]
struct Args {
    /// Base URL of the running pit-daemon.
    #[arg(long, global = true, default_value = "http://127.0.0.1:7860")]
    daemon: String,
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Upload one or more vehicle images into the queue.
    Upload {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Start (or resume) draining the queue.
    Start,
    /// Stop draining; queued images stay queued.
    Stop,
    /// Clear all state and delete every stored upload.
    Reset,
    /// Print the current pit view.
    State,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let client = reqwest::Client::new();
    let base = args.daemon.trim_end_matches('/');

    match args.cmd {
        Cmd::Upload { files } => {
            let mut form = Form::new();
            for path in &files {
                let bytes = tokio::fs::read(path)
                    .await
                    .with_context(|| format!("read {}", path.display()))?;
                let name = path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .with_context(|| format!("no usable file name in {}", path.display()))?
                    .to_string();
                form = form.part("files", Part::bytes(bytes).file_name(name));
            }
            let resp: StatusResponse = client
                .post(format!("{base}/upload"))
                .multipart(form)
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            println!("{}", serde_json::to_string_pretty(&resp)?);
        }
        Cmd::Start => post_status(&client, base, "start").await?,
        Cmd::Stop => post_status(&client, base, "stop").await?,
        Cmd::Reset => post_status(&client, base, "reset").await?,
        Cmd::State => {
            let resp: StateResponse = client
                .get(format!("{base}/state"))
                .send()
                .await?
                .error_for_status()?
                .json()
                .await?;
            println!("{}", serde_json::to_string_pretty(&resp)?);
        }
    }

    Ok(())
}

async fn post_status(client: &reqwest::Client, base: &str, action: &str) -> anyhow::Result<()> {
    let resp: StatusResponse = client
        .post(format!("{base}/{action}"))
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;
    println!("{}", serde_json::to_string_pretty(&resp)?);
    Ok(())
}
