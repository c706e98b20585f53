//! The console command table.
//!
//! One table drives both dispatch and the help listing.

use std::fmt::Write;

/// Every console command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// List commands.
    Help,
    /// Save under the current name.
    Save,
    /// Save under a new name.
    SaveAs,
    /// Leave the session.
    Exit,
    /// Change a config setting.
    ConfigSet,
    /// Advance rounds.
    PassTime,
    /// Move a mercenary.
    MercMove,
    /// Attack with a mercenary.
    MercAttack,
    /// Open a construction site.
    Construct,
    /// Tear a field down.
    Destruct,
    /// Town summary.
    Status,
    /// Print the map.
    Map,
    /// Hire a mercenary.
    HireMerc,
    /// Spawn a mercenary of any faction for free.
    SpawnMerc,
    /// Apply raw damage.
    Hurt,
}

/// One row of the command table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandSpec {
    /// Command kind.
    pub verb: Verb,
    /// Full name.
    pub name: &'static str,
    /// Short alias.
    pub alias: &'static str,
    /// Argument synopsis.
    pub usage: &'static str,
    /// Minimum number of arguments.
    pub min_args: usize,
    /// Maximum number of arguments.
    pub max_args: usize,
    /// One-line description.
    pub description: &'static str,
    /// Only available in debug sessions.
    pub debug_only: bool,
}

const fn entry(
    verb: Verb,
    name: &'static str,
    alias: &'static str,
    usage: &'static str,
    args: (usize, usize),
    description: &'static str,
) -> CommandSpec {
    CommandSpec {
        verb,
        name,
        alias,
        usage,
        min_args: args.0,
        max_args: args.1,
        description,
        debug_only: false,
    }
}

const fn debug_command(mut command: CommandSpec) -> CommandSpec {
    command.debug_only = true;
    command
}

/// All commands in help order.
pub static COMMANDS: [CommandSpec; 15] = [
    entry(Verb::Help, "help", "h", "", (0, 0), "show this list"),
    entry(Verb::Status, "status", "st", "", (0, 0), "show round, money and units"),
    entry(Verb::Map, "map", "m", "", (0, 0), "print the town map"),
    entry(Verb::Save, "save", "s", "", (0, 0), "save the town"),
    entry(Verb::SaveAs, "save-as", "sa", "NAME", (1, 1), "save under a new name"),
    entry(
        Verb::ConfigSet,
        "config-set",
        "cs",
        "SETTING VALUE",
        (2, 2),
        "change a setting and write the config file",
    ),
    entry(
        Verb::PassTime,
        "pass-time",
        "pt",
        "[ROUNDS]",
        (0, 1),
        "advance 1-100 rounds (default 1)",
    ),
    entry(
        Verb::HireMerc,
        "hire-merc",
        "hm",
        "KIND X Y",
        (3, 3),
        "hire a mercenary onto an empty cell",
    ),
    entry(
        Verb::MercMove,
        "merc-move",
        "mm",
        "X Y X2 Y2",
        (4, 4),
        "move a mercenary",
    ),
    entry(
        Verb::MercAttack,
        "merc-attack",
        "ma",
        "X Y X2 Y2 SLOT",
        (5, 5),
        "attack with weapon slot 0 or 1",
    ),
    entry(
        Verb::Construct,
        "construct",
        "ct",
        "FIELD X Y",
        (3, 3),
        "open a construction site",
    ),
    entry(Verb::Destruct, "destruct", "dt", "X Y", (2, 2), "tear down a field"),
    entry(Verb::Exit, "exit", "q", "", (0, 0), "leave the town"),
    debug_command(entry(
        Verb::SpawnMerc,
        "spawn-merc",
        "sm",
        "KIND X Y FACTION",
        (4, 4),
        "spawn a mercenary without paying",
    )),
    debug_command(entry(Verb::Hurt, "hurt", "hu", "X Y AMOUNT", (3, 3), "damage a mercenary")),
];

/// Find a command by name or alias, case-insensitively.
///
/// Debug commands are only found when `debug` is set.
#[must_use]
pub fn lookup(word: &str, debug: bool) -> Option<&'static CommandSpec> {
    let word = word.to_ascii_lowercase();
    COMMANDS
        .iter()
        .filter(|c| debug || !c.debug_only)
        .find(|c| c.name == word || c.alias == word)
}

impl CommandSpec {
    /// `name ARGS` as shown in usage errors.
    #[must_use]
    pub fn synopsis(&self) -> String {
        if self.usage.is_empty() {
            self.name.to_string()
        } else {
            format!("{} {}", self.name, self.usage)
        }
    }
}

/// Render the help table.
#[must_use]
pub fn help_text(debug: bool) -> String {
    let rows: Vec<_> = COMMANDS.iter().filter(|c| debug || !c.debug_only).collect();
    let width = rows
        .iter()
        .map(|c| c.synopsis().len())
        .max()
        .unwrap_or_default();

    let mut text = String::from("Commands:\n");
    for command in rows {
        let _ = writeln!(
            text,
            "  {:<width$}  {:<3} {}{}",
            command.synopsis(),
            command.alias,
            command.description,
            if command.debug_only { " [debug]" } else { "" },
        );
    }
    text
}
