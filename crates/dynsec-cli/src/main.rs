//! DynSec CLI - administer a Mosquitto broker's Dynamic Security plugin.
//!
//! Connects as an administrative user, sends one command, prints the result
//! as JSON and disconnects.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dynsec_core::{ConnectOptions, DynSecClient, ListRequest};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "dynsec")]
#[command(about = "Administer the Mosquitto Dynamic Security plugin")]
struct Args {
    /// Broker host
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Broker port
    #[arg(short, long, default_value = "1883")]
    port: u16,

    /// Administrative username
    #[arg(short, long, default_value = "admin-user")]
    username: String,

    /// Password for the administrative user
    #[arg(short = 'P', long, env = "DYNSEC_PASSWORD")]
    password: Option<String>,

    /// Per-command response timeout in milliseconds
    #[arg(long, default_value = "3000")]
    timeout_ms: u64,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Send any command by name
    Raw {
        /// Command name, e.g. getDefaultACLAccess
        command: String,
        /// Parameters as a JSON object
        #[arg(long, default_value = "{}")]
        params: String,
    },
    /// Show the default ACL access rules
    DefaultAcl,
    /// Show the anonymous group
    AnonymousGroup,
    /// List clients
    ListClients {
        #[arg(short, long)]
        verbose: bool,
    },
    /// Show one client
    GetClient { username: String },
    /// List groups
    ListGroups {
        #[arg(short, long)]
        verbose: bool,
    },
    /// Show one group
    GetGroup { groupname: String },
    /// List roles
    ListRoles {
        #[arg(short, long)]
        verbose: bool,
    },
    /// Show one role
    GetRole { rolename: String },
}

fn list_request(verbose: bool) -> ListRequest {
    if verbose {
        ListRequest::verbose()
    } else {
        ListRequest::default()
    }
}

async fn run(client: &DynSecClient, command: Command) -> Result<Value> {
    let value = match command {
        Command::Raw { command, params } => {
            let params: Value =
                serde_json::from_str(&params).context("--params must be a JSON object")?;
            client.send_raw(&command, params).await?
        }
        Command::DefaultAcl => serde_json::to_value(client.get_default_acl_access().await?)?,
        Command::AnonymousGroup => serde_json::to_value(client.get_anonymous_group().await?)?,
        Command::ListClients { verbose } => {
            serde_json::to_value(client.list_clients(list_request(verbose)).await?)?
        }
        Command::GetClient { username } => serde_json::to_value(client.get_client(&username).await?)?,
        Command::ListGroups { verbose } => {
            serde_json::to_value(client.list_groups(list_request(verbose)).await?)?
        }
        Command::GetGroup { groupname } => serde_json::to_value(client.get_group(&groupname).await?)?,
        Command::ListRoles { verbose } => {
            serde_json::to_value(client.list_roles(list_request(verbose)).await?)?
        }
        Command::GetRole { rolename } => serde_json::to_value(client.get_role(&rolename).await?)?,
    };
    Ok(value)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { Level::DEBUG } else { Level::WARN };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let mut options = ConnectOptions::new(&args.host, args.port);
    options.username = args.username.clone();
    options.password = args.password.clone();

    let client = DynSecClient::builder()
        .connect_options(options)
        .command_timeout(Duration::from_millis(args.timeout_ms))
        .connect()
        .await
        .with_context(|| format!("connecting to {}:{}", args.host, args.port))?;
    debug!("Connected to {}:{}", args.host, args.port);

    let outcome = run(&client, args.command).await;
    client.disconnect().await?;

    let value = outcome?;
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
