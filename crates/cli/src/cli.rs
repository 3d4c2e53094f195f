use clap::{Parser, Subcommand};

/// Copper CRM exposed as MCP tools.
///
/// Reads credentials from `COPPER_API_KEY` / `COPPER_USER_EMAIL` (or a `.env`
/// file). Logs go to stderr; stdout carries the protocol stream.
#[derive(Parser, Debug)]
#[command(name = "copper-mcp", version, about = "Copper CRM adapter for MCP clients")]
pub struct CliArgs {
    /// Log filter (e.g. `info`, `copper_client=debug`). `RUST_LOG` wins when set.
    #[arg(long, global = true, env = "COPPER_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Copper API base URL override
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// MCP server over stdio (default)
    Mcp,
    /// Newline-delimited `{tool, args}` commands over stdio
    Commands,
    /// HTTP server with `/health`, `/tools` and `POST /command`
    Serve {
        /// Bind address (default from `HOST`)
        #[arg(long)]
        host: Option<String>,
        /// Port (default from `PORT`)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print tool definitions as JSON and exit
    ListTools,
}

impl CliArgs {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Mcp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_mcp() {
        let args = CliArgs::parse_from(["copper-mcp"]);
        assert_eq!(args.command(), Command::Mcp);
        assert_eq!(args.log_level, "warn");
    }

    #[test]
    fn serve_with_global_flags_after_subcommand() {
        let args = CliArgs::parse_from(["copper-mcp", "serve", "--port", "9000", "--log-level", "debug"]);
        assert_eq!(args.command(), Command::Serve { host: None, port: Some(9000) });
        assert_eq!(args.log_level, "debug");
    }

    #[test]
    fn log_level_can_come_from_env() {
        let cmd = <CliArgs as clap::CommandFactory>::command();
        let arg = cmd.get_arguments().find(|a| a.get_id() == "log_level").unwrap();
        assert_eq!(arg.get_env(), Some(std::ffi::OsStr::new("COPPER_LOG_LEVEL")));
    }
}
