//! CLI definitions using clap derive API

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::InstallerConfig;

/// gatebundle - declarative configuration bundle installer
///
/// Install bundles of folders, certificates, encapsulated assertions, policies and
/// services onto a gateway, reusing whatever the gateway already holds.
#[derive(Parser, Debug)]
#[command(
    name = "gatebundle",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Declarative configuration bundle installer for gateways",
    long_about = "gatebundle installs configuration bundles (folders, trusted certificates, \
                  encapsulated assertions, policies and services) onto a gateway in dependency \
                  order, rewriting references to the identifiers the gateway assigns.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n    \
                  gatebundle install oauth-manager\n    \
                  gatebundle install oauth-manager --prefix version1a\n    \
                  gatebundle install oauth-manager --dry-run\n    \
                  gatebundle list\n    \
                  gatebundle show oauth-manager"
)]
pub struct Cli {
    /// Configuration file (defaults to ./gatebundle.yaml)
    #[arg(long, short = 'c', global = true, env = "GATEBUNDLE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Install bundles onto the target
    Install(InstallArgs),

    /// List available bundles
    List(ListArgs),

    /// Show bundle information
    Show(ShowArgs),

    /// Show version information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the install command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                   Install one bundle:\n    gatebundle install oauth-manager\n\n\
                   Install several bundles in order:\n    gatebundle install shared oauth-manager\n\n\
                   Install a second instance side by side:\n    gatebundle install oauth-manager --prefix version1a\n\n\
                   Install below a folder:\n    gatebundle install oauth-manager --install-folder /Integrations\n\n\
                   Show what would be created:\n    gatebundle install oauth-manager --dry-run\n\n\
                   Override detection with a mapping file:\n    gatebundle install oauth-manager --mapping mapping.yaml\n\n\
                   Fill in install variables:\n    gatebundle install oauth-manager --var host=gw.example.com")]
pub struct InstallArgs {
    /// Bundle ids or names, installed in the given order
    #[arg(required = true, value_name = "BUNDLE")]
    pub bundles: Vec<String>,

    /// Directory holding the bundles
    #[arg(long, value_name = "DIR", env = "GATEBUNDLE_BUNDLES_DIR")]
    pub bundles_dir: Option<PathBuf>,

    /// Target store file
    #[arg(long, value_name = "FILE", env = "GATEBUNDLE_TARGET")]
    pub target: Option<PathBuf>,

    /// Instance prefix for names, GUIDs and resolution URIs
    #[arg(long)]
    pub prefix: Option<String>,

    /// Mapping-override file
    #[arg(long, value_name = "FILE")]
    pub mapping: Option<PathBuf>,

    /// Folder path under the root folder that receives the bundle folders
    #[arg(long, value_name = "PATH")]
    pub install_folder: Option<String>,

    /// Id of the target's root folder
    #[arg(long, value_name = "ID")]
    pub root_folder_id: Option<String>,

    /// Cancel the install after this many seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Value of an `${install.NAME}` placeholder (repeatable)
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = parse_variable)]
    pub variables: Vec<(String, String)>,

    /// Show what would be installed without changing the target
    #[arg(long)]
    pub dry_run: bool,
}

fn parse_variable(arg: &str) -> Result<(String, String), String> {
    let (name, value) = arg
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{arg}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing variable name in '{arg}'"));
    }
    Ok((name.to_string(), value.to_string()))
}

impl InstallArgs {
    /// The flags that override configuration file values
    pub fn overrides(&self) -> InstallerConfig {
        InstallerConfig {
            bundles_dir: self.bundles_dir.clone(),
            target: self.target.clone(),
            root_folder_id: self.root_folder_id.clone(),
            install_folder: self.install_folder.clone(),
            prefix: self.prefix.clone(),
            mapping: self.mapping.clone(),
            timeout_secs: self.timeout,
            variables: self.variables.iter().cloned().collect(),
        }
    }
}

/// Arguments for the list command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  List bundles:\n    gatebundle list\n\n\
                  List bundles of another directory:\n    gatebundle list --bundles-dir ./vendor/bundles")]
pub struct ListArgs {
    /// Directory holding the bundles
    #[arg(long, value_name = "DIR", env = "GATEBUNDLE_BUNDLES_DIR")]
    pub bundles_dir: Option<PathBuf>,
}

/// Arguments for the show command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Show bundle information:\n    gatebundle show oauth-manager\n\n\
                  Use verbose output:\n    gatebundle show oauth-manager -v")]
pub struct ShowArgs {
    /// Bundle id or name
    pub name: String,

    /// Directory holding the bundles
    #[arg(long, value_name = "DIR", env = "GATEBUNDLE_BUNDLES_DIR")]
    pub bundles_dir: Option<PathBuf>,
}

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    gatebundle completions bash > ~/.bash_completion.d/gatebundle\n\n\
                  Generate zsh completions:\n    gatebundle completions zsh > ~/.zfunc/_gatebundle\n\n\
                  Generate fish completions:\n    gatebundle completions fish > ~/.config/fish/completions/gatebundle.fish\n\n\
                  Generate PowerShell completions:\n    gatebundle completions powershell")]
pub struct CompletionsArgs {
    /// Shell type (bash, elvish, fish, powershell, zsh)
    pub shell: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_install() {
        let cli = Cli::try_parse_from(["gatebundle", "install", "oauth"]).unwrap();
        match cli.command {
            Commands::Install(args) => {
                assert_eq!(args.bundles, vec!["oauth"]);
                assert!(!args.dry_run);
                assert_eq!(args.prefix, None);
            }
            _ => panic!("Expected Install command"),
        }
    }

    #[test]
    fn test_cli_parsing_install_requires_bundle() {
        assert!(Cli::try_parse_from(["gatebundle", "install"]).is_err());
    }

    #[test]
    fn test_cli_parsing_install_with_options() {
        let cli = Cli::try_parse_from([
            "gatebundle",
            "install",
            "shared",
            "oauth",
            "--prefix",
            "version1a",
            "--install-folder",
            "/Integrations",
            "--root-folder-id",
            "0000000000000000ffffffffffffec76",
            "--timeout",
            "30",
            "--var",
            "host=gw.example.com",
            "--var",
            "query=a=b",
            "--dry-run",
        ])
        .unwrap();
        match cli.command {
            Commands::Install(args) => {
                assert_eq!(args.bundles, vec!["shared", "oauth"]);
                assert!(args.dry_run);

                let overrides = args.overrides();
                assert_eq!(overrides.prefix.as_deref(), Some("version1a"));
                assert_eq!(overrides.install_folder.as_deref(), Some("/Integrations"));
                assert_eq!(overrides.timeout_secs, Some(30));
                assert_eq!(overrides.mapping, None);
                assert_eq!(overrides.variables["host"], "gw.example.com");
                assert_eq!(overrides.variables["query"], "a=b");
            }
            _ => panic!("Expected Install command"),
        }
    }

    #[test]
    fn test_cli_parsing_var_requires_name_and_value() {
        assert!(Cli::try_parse_from(["gatebundle", "install", "oauth", "--var", "host"]).is_err());
        assert!(Cli::try_parse_from(["gatebundle", "install", "oauth", "--var", "=x"]).is_err());
    }

    #[test]
    fn test_cli_parsing_list() {
        let cli = Cli::try_parse_from(["gatebundle", "list"]).unwrap();
        assert!(matches!(cli.command, Commands::List(_)));
    }

    #[test]
    fn test_cli_parsing_show() {
        let cli = Cli::try_parse_from(["gatebundle", "show", "oauth"]).unwrap();
        match cli.command {
            Commands::Show(args) => {
                assert_eq!(args.name, "oauth");
            }
            _ => panic!("Expected Show command"),
        }
    }

    #[test]
    fn test_cli_parsing_version() {
        let cli = Cli::try_parse_from(["gatebundle", "version"]).unwrap();
        assert!(matches!(cli.command, Commands::Version));
    }

    #[test]
    fn test_cli_global_options() {
        let cli =
            Cli::try_parse_from(["gatebundle", "-v", "--config", "/tmp/gb.yaml", "list"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/gb.yaml")));
    }

    #[test]
    fn test_cli_parsing_completions() {
        let cli = Cli::try_parse_from(["gatebundle", "completions", "bash"]).unwrap();
        match cli.command {
            Commands::Completions(args) => {
                assert_eq!(args.shell, "bash");
            }
            _ => panic!("Expected Completions command"),
        }
    }
}
