//! Interactive terminal client for the todo API.
//!
//! ```bash
//! TODO_API_URL=http://localhost:5000 cargo run --bin todo-cli
//! ```
//!
//! Commands: `list`, `add <title> [| description]`, `toggle <id>`,
//! `rm <id>`, `filter all|active|completed`, `reload`, `help`, `quit`.

use anyhow::Context;
use composable_todo_client::render::render_text;
use composable_todo_client::{ClientConfig, Filter, SyncClient};
use composable_todo_core::TodoId;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const HELP: &str = "\
list                          show todos under the current filter
add <title> [| description]   create a todo
toggle <id>                   flip completed
rm <id>                       delete a todo
filter all|active|completed   change the filter
reload                        fetch the list now
quit                          exit";

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_cli=warn,composable_todo_client=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();
}

fn parse_id(arg: &str) -> Option<TodoId> {
    arg.parse().ok()
}

async fn print_view(client: &SyncClient) {
    let (text, notices) = client
        .with_state(|s| (render_text(s.view(), s.filter, s.counts()), s.notices.clone()))
        .await;
    println!("{text}");
    for notice in notices {
        println!("! {}", notice.message);
    }
}

/// Run one command line. Returns `false` on quit.
async fn run_command(client: &SyncClient, line: &str) -> anyhow::Result<bool> {
    let (command, rest) = line.split_once(' ').unwrap_or((line, ""));
    let rest = rest.trim();

    match command {
        "" => return Ok(true),
        "quit" | "exit" => return Ok(false),
        "help" => {
            println!("{HELP}");
            return Ok(true);
        },
        "list" | "ls" => {},
        "reload" => client.reload().await?,
        "add" => {
            let (title, description) = match rest.split_once('|') {
                Some((title, description)) => (title, Some(description.to_string())),
                None => (rest, None),
            };
            client.add(title, description).await?;
        },
        "toggle" | "rm" => {
            let Some(id) = parse_id(rest) else {
                println!("Expected a numeric id, got {rest:?}");
                return Ok(true);
            };
            if command == "toggle" {
                client.toggle(id).await?;
            } else {
                client.remove(id).await?;
            }
        },
        "filter" => match rest.parse::<Filter>() {
            Ok(filter) => client.set_filter(filter).await?,
            Err(message) => {
                println!("{message}");
                return Ok(true);
            },
        },
        other => {
            println!("Unknown command: {other} (try `help`)");
            return Ok(true);
        },
    }

    print_view(client).await;
    Ok(true)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ClientConfig::from_env()?;
    init_tracing();

    let client = SyncClient::from_config(&config).context("building HTTP client")?;
    println!("Connected to {} (type `help` for commands)", config.api_url);

    client.start_auto_reload().await?;
    print_view(&client).await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if !run_command(&client, line.trim()).await? {
            break;
        }
    }

    client.stop_auto_reload().await?;
    client.shutdown(Duration::from_secs(5)).await?;
    Ok(())
}
