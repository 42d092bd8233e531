//! The standard command catalog.
//!
//! Hosts may register these as-is or build their own registry from scratch.

use textspace_foundation::Result;

use crate::command::{ArgType, Command};
use crate::registry::CommandRegistry;

/// Category for movement commands.
pub const MOVEMENT: &str = "Movement";
/// Category for talking to others.
pub const COMMUNICATION: &str = "Communication";
/// Category for item handling.
pub const ITEMS: &str = "Items";
/// Category for informational commands.
pub const INFORMATION: &str = "Information";
/// Category for admin commands.
pub const ADMIN: &str = "Admin";

/// Returns the standard commands in registration order.
#[must_use]
pub fn standard_commands() -> Vec<Command> {
    vec![
        // Information
        Command::new("look")
            .with_alias("l")
            .with_usage("look [target]")
            .with_args([ArgType::Examinable])
            .with_category(INFORMATION),
        Command::new("examine")
            .with_aliases(["x", "ex"])
            .with_min_args(1)
            .with_usage("examine <target>")
            .with_args([ArgType::Examinable])
            .with_category(INFORMATION),
        Command::new("inventory")
            .with_aliases(["i", "inv"])
            .with_category(INFORMATION),
        Command::new("who").with_category(INFORMATION),
        Command::new("help")
            .with_alias("?")
            .with_usage("help [command]")
            .with_category(INFORMATION),
        Command::new("quit")
            .with_alias("q")
            .with_category(INFORMATION),
        // Movement
        Command::new("go")
            .with_min_args(1)
            .with_usage("go <direction>")
            .with_args([ArgType::Direction])
            .with_category(MOVEMENT),
        // Communication
        Command::new("say")
            .with_min_args(1)
            .with_usage("say <message>")
            .with_args([ArgType::Text])
            .with_category(COMMUNICATION),
        Command::new("tell")
            .with_alias("t")
            .with_min_args(2)
            .with_usage("tell <user> <message>")
            .with_args([ArgType::User, ArgType::Text])
            .with_category(COMMUNICATION),
        Command::new("whisper")
            .with_alias("w")
            .with_min_args(2)
            .with_usage("whisper <user> <message>")
            .with_args([ArgType::User, ArgType::Text])
            .with_category(COMMUNICATION),
        // Items
        Command::new("get")
            .with_alias("take")
            .with_min_args(1)
            .with_usage("get <item>")
            .with_args([ArgType::RoomItem])
            .with_category(ITEMS),
        Command::new("drop")
            .with_min_args(1)
            .with_usage("drop <item>")
            .with_args([ArgType::InventoryItem])
            .with_category(ITEMS),
        Command::new("open")
            .with_min_args(1)
            .with_usage("open <container>")
            .with_args([ArgType::Openable])
            .with_category(ITEMS),
        Command::new("close")
            .with_min_args(1)
            .with_usage("close <container>")
            .with_args([ArgType::Closeable])
            .with_category(ITEMS),
        Command::new("put")
            .with_min_args(3)
            .with_usage("put <item> in <container>")
            .with_args([
                ArgType::InventoryItem,
                ArgType::Preposition("in".into()),
                ArgType::Container,
            ])
            .with_category(ITEMS),
        Command::new("give")
            .with_min_args(3)
            .with_usage("give <item> to <user>")
            .with_args([
                ArgType::InventoryItem,
                ArgType::Preposition("to".into()),
                ArgType::User,
            ])
            .with_category(ITEMS),
        // Admin
        Command::new("teleport")
            .admin_only()
            .with_min_args(1)
            .with_usage("teleport <room>")
            .with_args([ArgType::Room])
            .with_category(ADMIN),
        Command::new("broadcast")
            .admin_only()
            .with_min_args(1)
            .with_usage("broadcast <message>")
            .with_args([ArgType::Text])
            .with_category(ADMIN),
        Command::new("script")
            .admin_only()
            .with_min_args(1)
            .with_usage("script <name>")
            .with_args([ArgType::Text])
            .with_category(ADMIN),
        Command::new("scripts")
            .admin_only()
            .with_category(ADMIN),
    ]
}

/// Builds a registry holding the standard commands.
///
/// # Errors
/// Returns `DuplicateAlias` only if the catalog itself is inconsistent.
pub fn standard_registry() -> Result<CommandRegistry> {
    CommandRegistry::from_commands(standard_commands())
}
