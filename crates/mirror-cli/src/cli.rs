//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};
use clap_complete::Shell;
use mirror_core::{Address, MirrorId};

/// Owner Mirror - Mirror an owner set and threshold into per-principal registries
#[derive(Parser, Debug)]
#[command(name = "mirror")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Registry root containing .mirror/
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Identity issuing the command (defaults to the directory admin)
    #[arg(long, global = true, env = "MIRROR_CALLER")]
    pub caller: Option<Address>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Initialize a registry root
    ///
    /// Creates .mirror/ with config.toml, an empty state.toml, and an empty
    /// authority.toml.
    Init {
        /// Directory admin, allowed to rebind principals
        #[arg(long)]
        admin: Address,

        /// Default batch size for new mirrors (1-50)
        #[arg(long)]
        max_sync_owners: Option<usize>,
    },

    /// Create a mirror for a principal
    Create {
        /// Principal whose owners the mirror follows
        principal: Address,
    },

    /// Create a mirror for the caller itself
    Attach,

    /// Point a principal at an existing mirror (admin only)
    Rebind {
        principal: Address,
        mirror: MirrorId,
    },

    /// List mirrors in creation order
    List {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Show a principal's mirror
    Status {
        principal: Address,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Copy the first batch of authoritative owners and the threshold
    Configure { principal: Address },

    /// Run one sync batch
    ///
    /// Examples:
    ///   mirror sync 0x…          # one batch of max_sync_owners entries
    ///   mirror sync 0x… --all    # batches until fully synced
    Sync {
        principal: Address,

        /// Keep running batches until fully synced
        #[arg(long)]
        all: bool,
    },

    /// Compare a mirror with the authoritative registry
    Check {
        principal: Address,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Add an owner at the head of the list
    AddOwner {
        principal: Address,
        owner: Address,

        /// Threshold after the change
        #[arg(short, long)]
        threshold: usize,
    },

    /// Remove an owner
    RemoveOwner {
        principal: Address,
        owner: Address,

        /// Threshold after the change
        #[arg(short, long)]
        threshold: usize,

        /// Predecessor of the owner (looked up when omitted)
        #[arg(long)]
        prev: Option<Address>,
    },

    /// Replace an owner in place
    ReplaceOwner {
        principal: Address,
        old: Address,
        new: Address,

        /// Predecessor of the old owner (looked up when omitted)
        #[arg(long)]
        prev: Option<Address>,
    },

    /// Change the approval threshold
    ChangeThreshold { principal: Address, threshold: usize },

    /// Set the batch size for future syncs (1-50)
    SetLimit { principal: Address, limit: usize },

    /// Enable or disable sync before owner commands
    SetAutoSync {
        principal: Address,
        #[arg(action = ArgAction::Set)]
        enabled: bool,
    },

    /// Require a completed sync before owner mutations
    SetRequireFullSync {
        principal: Address,
        #[arg(action = ArgAction::Set)]
        enabled: bool,
    },

    /// Record the principal's mirror as a delegate of the authoritative registry
    Authorize { principal: Address },

    /// Show the journal of applied operations
    Events {
        /// Only events for this principal's mirror
        principal: Option<Address>,

        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completions
    ///
    /// Examples:
    ///   mirror completions bash > ~/.local/share/bash-completion/completions/mirror
    ///   mirror completions zsh > ~/.zfunc/_mirror
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    const P: &str = "0x00000000000000000000000000000000000000cc";
    const O: &str = "0x000000000000000000000000000000000000000a";

    #[test]
    fn parse_no_command() {
        let cli = Cli::parse_from(["mirror"]);
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
        assert_eq!(cli.root, PathBuf::from("."));
    }

    #[test]
    fn parse_global_flags_after_command() {
        let cli = Cli::parse_from(["mirror", "list", "-v", "--root", "/tmp/r", "--caller", P]);
        assert!(cli.verbose);
        assert_eq!(cli.root, PathBuf::from("/tmp/r"));
        assert_eq!(cli.caller, Some(P.parse().unwrap()));
    }

    #[test]
    fn parse_remove_owner_without_prev() {
        let cli = Cli::parse_from(["mirror", "remove-owner", P, O, "--threshold", "1"]);
        match cli.command {
            Some(Commands::RemoveOwner {
                threshold, prev, ..
            }) => {
                assert_eq!(threshold, 1);
                assert_eq!(prev, None);
            }
            _ => panic!("Expected RemoveOwner command"),
        }
    }

    #[test]
    fn parse_bool_setting() {
        let cli = Cli::parse_from(["mirror", "set-auto-sync", P, "false"]);
        assert!(matches!(
            cli.command,
            Some(Commands::SetAutoSync { enabled: false, .. })
        ));
    }

    #[test]
    fn parse_sync_all() {
        let cli = Cli::parse_from(["mirror", "sync", P, "--all"]);
        assert!(matches!(cli.command, Some(Commands::Sync { all: true, .. })));
    }

    #[test]
    fn rejects_malformed_address() {
        let result = Cli::try_parse_from(["mirror", "create", "0x1234"]);
        assert!(result.is_err());
    }

    #[test]
    fn parse_completions_command() {
        let cli = Cli::parse_from(["mirror", "completions", "bash"]);
        assert!(matches!(cli.command, Some(Commands::Completions { .. })));
    }
}
