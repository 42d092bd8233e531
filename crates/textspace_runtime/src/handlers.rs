//! Handlers for the standard command catalog.
//!
//! Each handler resolves its arguments against the caller's snapshot, acts on
//! the [`Session`], and returns the text shown to the caller. Other users hear
//! about it through the world's message queue.

use std::fmt::Write as _;
use std::sync::Arc;

use textspace_commands::{
    ArgType, ArgumentMatch, ArgumentResolver, CommandContext, CommandProcessor, CommandRegistry,
    HandlerError, Resolution, Resolver,
};
use textspace_engine::EventContext;
use textspace_foundation::Result;
use textspace_script::ScriptHost;

use crate::session::Session;
use crate::world::WorldError;

type HandlerResult = std::result::Result<String, HandlerError>;

/// Builds a processor with a handler for every standard command.
///
/// # Errors
/// Returns `CommandNotFound` if the registry lacks a standard command.
pub fn standard_processor(registry: Arc<CommandRegistry>) -> Result<CommandProcessor<Session>> {
    let mut processor = CommandProcessor::new(registry);
    processor.register_fn("look", look)?;
    processor.register_fn("examine", examine)?;
    processor.register_fn("inventory", inventory)?;
    processor.register_fn("who", who)?;
    processor.register_fn("help", help)?;
    processor.register_fn("quit", quit)?;
    processor.register_fn("go", go)?;
    processor.register_fn("say", say)?;
    processor.register_fn("tell", |s: &mut Session, ctx: &CommandContext<'_>, args: &[String]| {
        private_message(s, ctx, args, "tell", "tells")
    })?;
    processor.register_fn("whisper", |s: &mut Session, ctx: &CommandContext<'_>, args: &[String]| {
        private_message(s, ctx, args, "whisper to", "whispers")
    })?;
    processor.register_fn("get", get)?;
    processor.register_fn("drop", drop_item)?;
    processor.register_fn("open", |s: &mut Session, ctx: &CommandContext<'_>, args: &[String]| {
        set_open(s, ctx, args, true)
    })?;
    processor.register_fn("close", |s: &mut Session, ctx: &CommandContext<'_>, args: &[String]| {
        set_open(s, ctx, args, false)
    })?;
    processor.register_fn("put", put)?;
    processor.register_fn("give", give)?;
    processor.register_fn("teleport", teleport)?;
    processor.register_fn("broadcast", broadcast)?;
    processor.register_fn("script", run_script)?;
    processor.register_fn("scripts", list_scripts)?;
    Ok(processor)
}

// =============================================================================
// Helpers
// =============================================================================

fn resolve(
    session: &Session,
    ctx: &CommandContext<'_>,
    arg: &str,
    arg_type: &ArgType,
) -> std::result::Result<String, HandlerError> {
    let snapshot = session.snapshot(ctx.caller);
    match ArgumentResolver::resolve(arg, arg_type, &snapshot, ctx.is_admin) {
        ArgumentMatch::Found(name) => Ok(name),
        ArgumentMatch::Ambiguous(names) => Err(HandlerError::Ambiguous(names)),
        ArgumentMatch::NotFound => Err(HandlerError::NotFound(arg.to_string())),
    }
}

fn caller_room(session: &Session, ctx: &CommandContext<'_>) -> std::result::Result<String, HandlerError> {
    session
        .world()
        .user_room(ctx.caller)
        .map(str::to_string)
        .ok_or_else(|| HandlerError::from(WorldError::UnknownUser(ctx.caller.to_string())))
}

/// Splits `args` around the command's preposition: `["brass", "lamp", "in",
/// "chest"]` with `in` gives `("brass lamp", "chest")`.
fn split_at_preposition(
    ctx: &CommandContext<'_>,
    args: &[String],
) -> std::result::Result<(String, String), HandlerError> {
    let usage = || HandlerError::InvalidArgument(format!("usage: {}", ctx.command.usage));
    let Some((_, prep)) = ctx.command.preposition() else {
        return Err(usage());
    };
    let pos = args
        .iter()
        .skip(1)
        .position(|w| w.eq_ignore_ascii_case(prep))
        .map(|p| p + 1)
        .ok_or_else(usage)?;
    let (before, after) = (&args[..pos], &args[pos + 1..]);
    if after.is_empty() {
        return Err(usage());
    }
    Ok((before.join(" "), after.join(" ")))
}

// =============================================================================
// Information
// =============================================================================

fn look(session: &mut Session, ctx: &CommandContext<'_>, args: &[String]) -> HandlerResult {
    if !args.is_empty() {
        return examine(session, ctx, args);
    }
    let room = caller_room(session, ctx)?;
    Ok(session.world().describe_room(&room, ctx.caller)?)
}

fn examine(session: &mut Session, ctx: &CommandContext<'_>, args: &[String]) -> HandlerResult {
    let target = resolve(session, ctx, &args.join(" "), &ArgType::Examinable)?;
    Ok(session.world().describe_thing(&target))
}

fn inventory(session: &mut Session, ctx: &CommandContext<'_>, _args: &[String]) -> HandlerResult {
    match session.world().inventory(ctx.caller) {
        Some(items) if !items.is_empty() => Ok(format!("You are carrying: {}", items.join(", "))),
        _ => Ok("You are carrying nothing.".to_string()),
    }
}

fn who(session: &mut Session, _ctx: &CommandContext<'_>, _args: &[String]) -> HandlerResult {
    let users: Vec<&str> = session.world().users().collect();
    Ok(format!("Online ({}): {}", users.len(), users.join(", ")))
}

fn help(session: &mut Session, ctx: &CommandContext<'_>, args: &[String]) -> HandlerResult {
    let registry = session.registry();
    if let Some(topic) = args.first() {
        return match Resolver::new(registry).resolve(topic, ctx.is_admin) {
            Resolution::Resolved(cmd) => {
                let mut out = format!("Usage: {}", cmd.usage);
                if !cmd.aliases.is_empty() {
                    let _ = write!(out, "\nAliases: {}", cmd.aliases.join(", "));
                }
                Ok(out)
            }
            Resolution::Ambiguous(names) => Err(HandlerError::Ambiguous(names)),
            Resolution::NotFound => Err(HandlerError::Failed(format!("No help for '{topic}'."))),
        };
    }

    let mut out = String::from("Available commands:");
    let mut category = "";
    let mut commands = registry.all_commands(ctx.is_admin);
    commands.sort_by(|a, b| a.category.cmp(&b.category).then_with(|| a.name.cmp(&b.name)));
    for cmd in commands {
        if cmd.category != category {
            category = cmd.category.as_str();
            let _ = write!(out, "\n{category}:");
        }
        let _ = write!(out, "\n  {}", cmd.synopsis());
    }
    Ok(out)
}

fn quit(session: &mut Session, ctx: &CommandContext<'_>, _args: &[String]) -> HandlerResult {
    session.request_quit(ctx.caller);
    Ok("Goodbye!".to_string())
}

// =============================================================================
// Movement
// =============================================================================

fn go(session: &mut Session, ctx: &CommandContext<'_>, args: &[String]) -> HandlerResult {
    let direction = resolve(session, ctx, &args[0], &ArgType::Direction)?;
    let room = caller_room(session, ctx)?;
    let Some(target) = session.world().exit(&room, &direction).map(str::to_string) else {
        return Err(WorldError::NoExit(direction).into());
    };
    session.move_user(ctx.caller, &target)?;
    Ok(session.world().describe_room(&target, ctx.caller)?)
}

fn teleport(session: &mut Session, ctx: &CommandContext<'_>, args: &[String]) -> HandlerResult {
    if !ctx.is_admin {
        return Err(HandlerError::Denied);
    }
    let target = resolve(session, ctx, &args.join(" "), &ArgType::Room)?;
    session.move_user(ctx.caller, &target)?;
    Ok(session.world().describe_room(&target, ctx.caller)?)
}

// =============================================================================
// Communication
// =============================================================================

fn say(session: &mut Session, ctx: &CommandContext<'_>, args: &[String]) -> HandlerResult {
    let text = args.join(" ");
    let room = caller_room(session, ctx)?;
    session
        .world_mut()
        .announce(&room, &format!("{} says: {text}", ctx.caller), Some(ctx.caller));
    Ok(format!("You say: {text}"))
}

fn private_message(
    session: &mut Session,
    ctx: &CommandContext<'_>,
    args: &[String],
    verb: &str,
    verb_third: &str,
) -> HandlerResult {
    let target = resolve(session, ctx, &args[0], &ArgType::User)?;
    let text = args[1..].join(" ");
    session
        .world_mut()
        .deliver(&target, format!("{} {verb_third} you: {text}", ctx.caller));
    Ok(format!("You {verb} {target}: {text}"))
}

fn broadcast(session: &mut Session, ctx: &CommandContext<'_>, args: &[String]) -> HandlerResult {
    if !ctx.is_admin {
        return Err(HandlerError::Denied);
    }
    session
        .world_mut()
        .broadcast(ctx.caller, &args.join(" "))
        .map_err(|e| HandlerError::Failed(e.to_string()))?;
    Ok("Broadcast sent.".to_string())
}

// =============================================================================
// Items
// =============================================================================

fn get(session: &mut Session, ctx: &CommandContext<'_>, args: &[String]) -> HandlerResult {
    let item = resolve(session, ctx, &args.join(" "), &ArgType::RoomItem)?;
    session.world_mut().pick_up(ctx.caller, &item)?;
    Ok(format!("You take {item}."))
}

fn drop_item(session: &mut Session, ctx: &CommandContext<'_>, args: &[String]) -> HandlerResult {
    let item = resolve(session, ctx, &args.join(" "), &ArgType::InventoryItem)?;
    session.world_mut().drop_item(ctx.caller, &item)?;
    Ok(format!("You drop {item}."))
}

fn set_open(
    session: &mut Session,
    ctx: &CommandContext<'_>,
    args: &[String],
    open: bool,
) -> HandlerResult {
    let arg_type = if open {
        ArgType::Openable
    } else {
        ArgType::Closeable
    };
    let name = resolve(session, ctx, &args.join(" "), &arg_type)?;
    session.world_mut().set_open(&name, open)?;
    Ok(format!("You {} {name}.", if open { "open" } else { "close" }))
}

fn put(session: &mut Session, ctx: &CommandContext<'_>, args: &[String]) -> HandlerResult {
    let (item, container) = split_at_preposition(ctx, args)?;
    let item = resolve(session, ctx, &item, &ArgType::InventoryItem)?;
    let container = resolve(session, ctx, &container, &ArgType::Container)?;
    session.world_mut().put_in(ctx.caller, &item, &container)?;
    Ok(format!("You put {item} in {container}."))
}

fn give(session: &mut Session, ctx: &CommandContext<'_>, args: &[String]) -> HandlerResult {
    let (item, recipient) = split_at_preposition(ctx, args)?;
    let item = resolve(session, ctx, &item, &ArgType::InventoryItem)?;
    let recipient = resolve(session, ctx, &recipient, &ArgType::User)?;
    let world = session.world_mut();
    world.transfer(&item, ctx.caller, &recipient)?;
    world.deliver(&recipient, format!("{} gives you {item}.", ctx.caller));
    Ok(format!("You give {item} to {recipient}."))
}

// =============================================================================
// Scripts
// =============================================================================

fn run_script(session: &mut Session, ctx: &CommandContext<'_>, args: &[String]) -> HandlerResult {
    if !ctx.is_admin {
        return Err(HandlerError::Denied);
    }
    let name = &args[0];
    let room = caller_room(session, ctx)?;
    let context = EventContext::new(ctx.caller, room);
    let id = session
        .engine_mut()
        .run_script(name, &context)
        .map_err(|_| HandlerError::NotFound(name.clone()))?;
    Ok(format!("Started script {name} ({id})."))
}

fn list_scripts(session: &mut Session, ctx: &CommandContext<'_>, _args: &[String]) -> HandlerResult {
    if !ctx.is_admin {
        return Err(HandlerError::Denied);
    }
    let engine = session.engine();
    if engine.scripts().next().is_none() {
        return Ok("No scripts loaded.".to_string());
    }
    let mut out = String::from("Scripts:");
    for script in engine.scripts() {
        let _ = write!(out, "\n  {} [{}]", script.name, script.bot);
        if let Some(trigger) = &script.trigger {
            let _ = write!(out, " on {trigger}");
        }
    }
    let _ = write!(out, "\nRunning instances: {}", engine.scheduler().len());
    Ok(out)
}
