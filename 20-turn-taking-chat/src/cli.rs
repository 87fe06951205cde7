use std::{net::IpAddr, time::Duration};

use clap::{Args, Parser, Subcommand};

use crate::message::Handle;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Listen for one conversation at a time, letting the caller speak first.
    Host(HostArgs),
    /// Connect to a host and open the conversation.
    Client(ClientArgs),
}

#[derive(Args, Debug, Clone)]
pub struct HostArgs {
    /// TCP port to listen on.
    #[arg(value_parser = clap::value_parser!(u16).range(1..))]
    pub port: u16,

    /// Address to bind the listening socket to.
    #[arg(long, default_value = "0.0.0.0")]
    pub bind: IpAddr,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Args, Debug, Clone)]
pub struct ClientArgs {
    /// Host name or address of the listening side.
    pub address: String,

    /// TCP port the host listens on.
    #[arg(value_parser = clap::value_parser!(u16).range(1..))]
    pub port: u16,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Args, Debug, Clone)]
pub struct CommonArgs {
    /// Display handle (1-10 characters). Prompted for when omitted.
    #[arg(long)]
    pub handle: Option<Handle>,

    /// Give up on a silent peer after this many seconds.
    #[arg(long, value_name = "SECS", value_parser = parse_seconds)]
    pub read_timeout: Option<Duration>,
}

fn parse_seconds(raw: &str) -> Result<Duration, String> {
    match raw.parse::<u64>() {
        Ok(0) => Err("timeout must be at least one second".to_string()),
        Ok(secs) => Ok(Duration::from_secs(secs)),
        Err(err) => Err(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_requires_a_port() {
        assert!(Cli::try_parse_from(["turn_taking_chat", "host"]).is_err());
        assert!(Cli::try_parse_from(["turn_taking_chat", "host", "0"]).is_err());
        assert!(Cli::try_parse_from(["turn_taking_chat", "host", "70000"]).is_err());
        assert!(Cli::try_parse_from(["turn_taking_chat", "host", "5000", "6000"]).is_err());
    }

    #[test]
    fn host_arguments_parse() {
        let cli = Cli::try_parse_from([
            "turn_taking_chat",
            "host",
            "5000",
            "--handle",
            "srv",
            "--read-timeout",
            "30",
        ])
        .expect("valid arguments");

        let Command::Host(args) = cli.command else {
            panic!("expected host command");
        };
        assert_eq!(args.port, 5000);
        assert_eq!(args.common.handle, Some(Handle::new("srv").unwrap()));
        assert_eq!(args.common.read_timeout, Some(Duration::from_secs(30)));
    }

    #[test]
    fn overlong_handles_are_rejected_at_parse_time() {
        let result = Cli::try_parse_from([
            "turn_taking_chat",
            "client",
            "localhost",
            "5000",
            "--handle",
            "much-too-long",
        ]);
        assert!(result.is_err());
    }
}
