use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::{
    io::{AsyncBufRead, AsyncWrite, BufReader},
    net::TcpListener,
};
use tracing::{info, warn};

use turn_taking_chat::{
    cli::{Cli, Command, CommonArgs},
    client,
    config::ChatConfig,
    console,
    host::Host,
};

fn init_tracing() {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

async fn build_config<I, O>(common: CommonArgs, input: &mut I, out: &mut O) -> Result<ChatConfig>
where
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    let handle = match common.handle {
        Some(handle) => handle,
        None => console::prompt_handle(input, out)
            .await?
            .context("console input closed before a handle was chosen")?,
    };
    Ok(ChatConfig::new(handle).with_read_timeout(common.read_timeout))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut input = BufReader::new(tokio::io::stdin());
    let mut out = tokio::io::stdout();

    match cli.command {
        Command::Host(args) => {
            let addr = SocketAddr::new(args.bind, args.port);
            let listener = TcpListener::bind(addr)
                .await
                .with_context(|| format!("failed to listen on {addr}"))?;
            let config = build_config(args.common, &mut input, &mut out).await?;

            let host = Host::new(listener, config);
            let addr = host.local_addr()?;
            info!("host listening on {}", addr);
            console::write_line(
                &mut out,
                &format!("The server is ready to receive incoming messages on {addr}"),
            )
            .await?;

            if let Err(err) = host.run_until_ctrl_c(&mut input, &mut out).await {
                warn!("host exited with error: {err:?}");
                return Err(err);
            }
        }
        Command::Client(args) => {
            let config = build_config(args.common, &mut input, &mut out).await?;
            client::run(&args.address, args.port, &config, &mut input, &mut out).await?;
        }
    }

    Ok(())
}
