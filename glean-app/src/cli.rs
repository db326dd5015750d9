use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use glean_llm::prompt::Action;
use url::Url;

#[derive(Debug, Parser)]
#[command(
    name = "glean",
    version,
    about = "Translate or summarize web pages through a completion API"
)]
pub struct Cli {
    /// YAML configuration file (default: ./glean.yaml when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Translate and/or summarize a page or a selection of it.
    Process(ProcessArgs),
    /// Save a processed result together with the page text as Markdown.
    Export(ExportArgs),
    /// Manage saved API keys.
    #[command(subcommand)]
    Keys(KeysCommand),
}

/// Where the page comes from.
#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
pub struct PageArgs {
    /// Fetch the page over HTTP.
    #[arg(long)]
    pub url: Option<Url>,
    /// Read the page from a local HTML file.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct ProcessArgs {
    /// translate, summary or translate-summary
    pub action: Action,

    #[command(flatten)]
    pub page: PageArgs,

    /// Process this text instead of the page body.
    #[arg(long, conflicts_with = "selection_stdin")]
    pub selection: Option<String>,

    /// Read the text to process from stdin instead of the page body.
    #[arg(long)]
    pub selection_stdin: bool,

    /// Completion model (overrides config).
    #[arg(long)]
    pub model: Option<String>,

    /// Credential used when no saved key is selected (overrides config).
    #[arg(long, env = "OPENROUTER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Export the result as Markdown after processing.
    #[arg(long)]
    pub save: bool,
}

#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub page: PageArgs,

    /// File holding the processed text; stdin when omitted.
    #[arg(long)]
    pub result_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum KeysCommand {
    /// Show saved keys, marking the selected one.
    List {
        /// Print keys in full instead of masked.
        #[arg(long)]
        reveal: bool,
    },
    /// Save a key and select it.
    Add { key: String },
    /// Forget a key.
    Remove { key: String },
    /// Select a key.
    Select { key: String },
    /// Print the selected key (masked).
    Selected,
    /// Show or set the legacy single-key slot.
    Legacy { key: Option<String> },
    /// Copy the legacy key into the saved list.
    Migrate,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn process_parses_action_and_page() {
        let cli = Cli::try_parse_from([
            "glean",
            "process",
            "translate-summary",
            "--url",
            "https://example.com/post",
            "--save",
        ])
        .unwrap();
        let Command::Process(args) = cli.command else {
            panic!("expected process");
        };
        assert_eq!(args.action, Action::TranslateSummary);
        assert_eq!(args.page.url.unwrap().host_str(), Some("example.com"));
        assert!(args.save);
    }

    #[test]
    fn unknown_action_is_rejected() {
        let err = Cli::try_parse_from(["glean", "process", "paraphrase", "--file", "a.html"]);
        assert!(err.is_err());
    }

    #[test]
    fn page_source_is_required_and_exclusive() {
        assert!(Cli::try_parse_from(["glean", "process", "summary"]).is_err());
        assert!(
            Cli::try_parse_from([
                "glean",
                "export",
                "--url",
                "https://example.com",
                "--file",
                "a.html"
            ])
            .is_err()
        );
    }

    #[test]
    fn keys_subcommands_parse() {
        let cli = Cli::try_parse_from(["glean", "keys", "legacy"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Keys(KeysCommand::Legacy { key: None })
        ));
        let cli = Cli::try_parse_from(["glean", "--config", "x.yaml", "keys", "add", "sk-1"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.yaml")));
        assert!(matches!(cli.command, Command::Keys(KeysCommand::Add { ref key }) if key == "sk-1"));
    }
}
