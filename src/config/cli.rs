use clap::{Parser, Subcommand};

#[derive(Debug, Clone, Parser)]
#[command(name = "bipt-inclusion")]
#[command(about = "Builds WWB inclusion lists from BIPT zone publications")]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Path to an optional TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    #[arg(long, env = "DATA_DIR", global = true)]
    pub data_dir: Option<String>,

    #[arg(long, env = "SOURCE_URL", global = true)]
    pub source_url: Option<String>,

    #[arg(long, env = "LANG_CODE", global = true)]
    pub lang: Option<String>,

    #[arg(long, env = "LIST_NAME", global = true)]
    pub list_name: Option<String>,

    #[arg(long, global = true)]
    pub free_group_name: Option<String>,

    /// Host identifier written into the list (defaults to the system host name)
    #[arg(long, env = "MACHINE_NAME", global = true)]
    pub machine: Option<String>,

    #[arg(long, env = "CHECK_HOUR", global = true)]
    pub check_hour: Option<u32>,

    #[arg(long, env = "CHECK_MINUTE", global = true)]
    pub check_minute: Option<u32>,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, global = true, help = "Emit logs as JSON")]
    pub json_logs: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Check for a new publication once and regenerate if needed
    Run,
    /// Print the inclusion list files currently kept
    List,
    /// Run at startup and then every day at the configured time
    Schedule,
}

impl CliArgs {
    pub fn command(&self) -> Command {
        self.command.unwrap_or(Command::Run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_to_run() {
        let args = CliArgs::parse_from(["bipt-inclusion"]);
        assert_eq!(args.command(), Command::Run);
        assert!(!args.verbose);
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let args = CliArgs::parse_from([
            "bipt-inclusion",
            "list",
            "--data-dir",
            "/tmp/data",
            "--lang",
            "FR",
            "-v",
        ]);
        assert_eq!(args.command(), Command::List);
        assert_eq!(args.data_dir.as_deref(), Some("/tmp/data"));
        assert_eq!(args.lang.as_deref(), Some("FR"));
        assert!(args.verbose);
    }
}
