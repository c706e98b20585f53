//! The command console.
//!
//! Lines are tokenized, matched against the command table and dispatched
//! to the town, the store or the config. [`Interpreter::try_execute`]
//! returns structured errors; [`Interpreter::execute`] turns them into a
//! single message line for display.

mod commands;
mod tokenize;

pub use commands::{help_text, lookup, CommandSpec, Verb, COMMANDS};
pub use tokenize::{tokenize, TokenizeError, Tokens, MAX_ARGS, MAX_ARG_LEN};

use std::fmt::Write;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;
use tracing::debug;

use crate::config::{Config, ConfigError};
use crate::error::ErrorKind;
use crate::registry::{self, MercKindId};
use crate::session::SharedTown;
use crate::store::{self, PersistError, SaveReport, StoreError, TownStore};
use crate::town::{
    buildable, render_ascii, Coord, Faction, Field, RoundReport, Town, TownError, BUILDABLES,
    MAX_CONSTRUCTIONS, MAX_MERCENARIES,
};

/// Most rounds a single `pass-time` may advance.
pub const MAX_PASS_ROUNDS: u32 = 100;

/// Errors from running one console line.
#[derive(Debug, Error)]
pub enum CommandError {
    /// The line broke the tokenizer's bounds.
    #[error(transparent)]
    Tokenize(#[from] TokenizeError),
    /// No command has this name.
    #[error("unrecognized command '{0}'; type 'help' for a list of commands")]
    Unknown(String),
    /// Wrong number of arguments.
    #[error("usage: {0}")]
    Usage(String),
    /// An argument is not a valid integer.
    #[error("invalid {context} '{value}': expected an integer")]
    InvalidInteger {
        /// Which argument.
        context: &'static str,
        /// Rejected text.
        value: String,
    },
    /// An argument is outside its allowed set.
    #[error("invalid {context} '{value}': expected {expected}")]
    InvalidArgument {
        /// Which argument.
        context: &'static str,
        /// Rejected text.
        value: String,
        /// Accepted values.
        expected: String,
    },
    /// The town rejected the action.
    #[error(transparent)]
    Town(#[from] TownError),
    /// The setting could not be changed.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Saving failed.
    #[error(transparent)]
    Persist(#[from] PersistError),
}

impl CommandError {
    /// Classify the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            CommandError::Tokenize(_) | CommandError::Unknown(_) => ErrorKind::UnrecognizedInput,
            CommandError::Usage(_)
            | CommandError::InvalidInteger { .. }
            | CommandError::InvalidArgument { .. }
            | CommandError::Town(_) => ErrorKind::Validation,
            CommandError::Config(e) => e.kind(),
            CommandError::Persist(e) => e.kind(),
        }
    }
}

impl From<StoreError> for CommandError {
    fn from(e: StoreError) -> Self {
        CommandError::Persist(PersistError::Store(e))
    }
}

/// What the session should do after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Read the next line.
    Continue,
    /// The player left.
    Exit,
    /// The town went bankrupt.
    Bankrupt,
}

/// Output of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Text to show, possibly empty or multi-line.
    pub text: String,
    /// Whether the session continues.
    pub flow: Flow,
}

impl Reply {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            flow: Flow::Continue,
        }
    }

    const fn silent() -> Self {
        Self {
            text: String::new(),
            flow: Flow::Continue,
        }
    }
}

fn parse_int<T: FromStr>(value: &str, context: &'static str) -> Result<T, CommandError> {
    value.parse().map_err(|_| CommandError::InvalidInteger {
        context,
        value: value.to_string(),
    })
}

fn parse_coord(x: &str, y: &str) -> Result<Coord, CommandError> {
    let x = parse_int::<i64>(x, "x coordinate")?;
    let y = parse_int::<i64>(y, "y coordinate")?;
    Ok(Coord::checked(x, y)?)
}

fn parse_kind(value: &str) -> Result<MercKindId, CommandError> {
    let expected = || {
        registry::archetypes()
            .iter()
            .enumerate()
            .map(|(id, a)| format!("{id} ({})", a.name))
            .collect::<Vec<_>>()
            .join(", ")
    };
    value.parse().map_err(|_| CommandError::InvalidArgument {
        context: "mercenary kind",
        value: value.to_string(),
        expected: expected(),
    })
}

fn parse_buildable(value: &str) -> Result<Field, CommandError> {
    let name = value.to_ascii_lowercase();
    BUILDABLES
        .iter()
        .map(|b| b.field)
        .find(|f| f.name() == name)
        .ok_or_else(|| CommandError::InvalidArgument {
            context: "field",
            value: value.to_string(),
            expected: BUILDABLES
                .iter()
                .map(|b| b.field.name())
                .collect::<Vec<_>>()
                .join(", "),
        })
}

/// Console state for one connected town.
#[derive(Debug)]
pub struct Interpreter {
    town: SharedTown,
    town_name: String,
    store: TownStore,
    config: Config,
    config_path: PathBuf,
    debug: bool,
    dirty: bool,
}

impl Interpreter {
    /// Interpreter for `town`, saved as `town_name` in `store`.
    #[must_use]
    pub fn new(
        town: Town,
        town_name: impl Into<String>,
        store: TownStore,
        config: Config,
        config_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            town: SharedTown::new(town),
            town_name: town_name.into(),
            store,
            config,
            config_path: config_path.into(),
            debug: false,
            dirty: false,
        }
    }

    /// Enable the debug commands.
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Handle to the shared town.
    #[must_use]
    pub fn town(&self) -> SharedTown {
        self.town.clone()
    }

    /// Name the town is saved under.
    #[must_use]
    pub fn town_name(&self) -> &str {
        &self.town_name
    }

    /// Current configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// Check if the town changed since the last save.
    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Run one line and render any error as a message.
    pub fn execute(&mut self, line: &str) -> Reply {
        match self.try_execute(line) {
            Ok(reply) => reply,
            Err(e) => {
                debug!(kind = %e.kind(), error = %e, "command rejected");
                Reply::text(format!("error: {e}"))
            }
        }
    }

    /// Run one line.
    ///
    /// A rejected command leaves the town, the config and the files
    /// unchanged.
    ///
    /// # Errors
    ///
    /// Returns a [`CommandError`] describing why the line was rejected.
    pub fn try_execute(&mut self, line: &str) -> Result<Reply, CommandError> {
        let Some(tokens) = tokenize(line)? else {
            return Ok(Reply::silent());
        };
        let command =
            lookup(tokens.verb, self.debug).ok_or_else(|| CommandError::Unknown(tokens.verb.to_string()))?;
        let args = tokens.args.as_slice();
        if args.len() < command.min_args || args.len() > command.max_args {
            return Err(CommandError::Usage(command.synopsis()));
        }
        debug!(command = command.name, ?args, "executing");

        match command.verb {
            Verb::Help => Ok(Reply::text(help_text(self.debug))),
            Verb::Status => Ok(Reply::text(self.status())),
            Verb::Map => Ok(Reply::text(render_ascii(&self.town.read()))),
            Verb::Save => {
                let name = self.town_name.clone();
                let report = self.save_as(&name)?;
                Ok(Reply::text(describe_save(&report)))
            }
            Verb::SaveAs => {
                let name = args[0];
                store::validate_name(name)?;
                let report = self.save_as(name)?;
                self.town_name = name.to_string();
                Ok(Reply::text(describe_save(&report)))
            }
            Verb::Exit => Ok(Reply {
                text: format!("leaving {}", self.town_name),
                flow: Flow::Exit,
            }),
            Verb::ConfigSet => self.config_set(args[0], args[1]),
            Verb::PassTime => self.pass_time(args.first().copied()),
            Verb::HireMerc => {
                let kind = parse_kind(args[0])?;
                let at = parse_coord(args[1], args[2])?;
                let mut town = self.town.write();
                town.hire_mercenary(kind, at)?;
                self.dirty = true;
                let name = registry::archetype(kind).map_or("mercenary", |a| a.name);
                Ok(Reply::text(format!("hired a {name} at {at}, money left {}", town.money)))
            }
            Verb::MercMove => {
                let from = parse_coord(args[0], args[1])?;
                let to = parse_coord(args[2], args[3])?;
                let outcome = self.town.write().move_mercenary(from, to)?;
                self.dirty = true;
                let mut text = format!("moved {} tiles from {from} to {to}", outcome.distance);
                if outcome.revealed > 0 {
                    let _ = write!(text, ", revealed {} cells", outcome.revealed);
                }
                Ok(Reply::text(text))
            }
            Verb::MercAttack => {
                let from = parse_coord(args[0], args[1])?;
                let to = parse_coord(args[2], args[3])?;
                let slot = parse_int::<i64>(args[4], "weapon slot")?;
                let outcome = self.town.write().attack(from, to, slot)?;
                self.dirty = true;
                let result = if outcome.killed {
                    String::from("the target is dead")
                } else {
                    format!("{} hp left", outcome.remaining_hp)
                };
                Ok(Reply::text(format!(
                    "{} hits {to} for {} damage, {result}",
                    outcome.weapon, outcome.damage
                )))
            }
            Verb::Construct => {
                let field = parse_buildable(args[0])?;
                let at = parse_coord(args[1], args[2])?;
                let mut town = self.town.write();
                town.construct(field, at)?;
                self.dirty = true;
                let rounds = buildable(field).map_or(0, |b| b.build_rounds);
                Ok(Reply::text(format!(
                    "{} site opened at {at}, ready in {rounds} rounds, money left {}",
                    field.name(),
                    town.money
                )))
            }
            Verb::Destruct => {
                let at = parse_coord(args[0], args[1])?;
                let removed = self.town.write().destruct(at)?;
                self.dirty = true;
                Ok(Reply::text(format!("{} at {at} destructed", removed.name())))
            }
            Verb::SpawnMerc => {
                let kind = parse_kind(args[0])?;
                let at = parse_coord(args[1], args[2])?;
                let faction = Faction::parse(args[3]).ok_or_else(|| CommandError::InvalidArgument {
                    context: "faction",
                    value: args[3].to_string(),
                    expected: String::from("town or raider"),
                })?;
                self.town.write().spawn_mercenary(kind, at, faction)?;
                self.dirty = true;
                Ok(Reply::text(format!("spawned a {} mercenary at {at}", faction.name())))
            }
            Verb::Hurt => {
                let at = parse_coord(args[0], args[1])?;
                let amount = parse_int::<u32>(args[2], "amount")?;
                let outcome = self.town.write().hurt(at, amount)?;
                self.dirty = true;
                Ok(Reply::text(if outcome.killed {
                    format!("the mercenary at {at} died")
                } else {
                    format!("the mercenary at {at} has {} hp left", outcome.remaining_hp)
                }))
            }
        }
    }

    fn status(&self) -> String {
        let town = self.town.read();
        let admin = town
            .administrator()
            .map_or_else(|| format!("#{}", town.admin), |a| format!("{} (salary {})", a.name, a.salary));
        let hidden = town.hidden().iter().filter(|(_, h)| *h).count();
        format!(
            "town:          {}\nadministrator: {admin}\nround:         {}\nmoney:         {}\nmercenaries:   {}/{MAX_MERCENARIES}\nconstructions: {}/{MAX_CONSTRUCTIONS}\nunexplored:    {hidden}",
            self.town_name,
            town.round,
            town.money,
            town.mercenaries().len(),
            town.constructions().len(),
        )
    }

    fn config_set(&mut self, name: &str, value: &str) -> Result<Reply, CommandError> {
        let mut updated = self.config.clone();
        let setting = updated.set(name, value)?;
        updated.save(&self.config_path)?;
        self.config = updated;
        Ok(Reply::text(format!("{setting} = {}", self.config.get(setting))))
    }

    fn pass_time(&mut self, rounds: Option<&str>) -> Result<Reply, CommandError> {
        let rounds = match rounds {
            Some(text) => parse_int::<u32>(text, "round count")?,
            None => 1,
        };
        if !(1..=MAX_PASS_ROUNDS).contains(&rounds) {
            return Err(CommandError::InvalidArgument {
                context: "round count",
                value: rounds.to_string(),
                expected: format!("1 to {MAX_PASS_ROUNDS}"),
            });
        }

        let reports = self.town.write().pass_time(rounds);
        self.dirty = true;

        let mut text = String::new();
        for report in &reports {
            let _ = write!(
                text,
                "round {}: +{} income, -{} salary, money {}",
                report.round, report.income, report.upkeep, report.money
            );
            for (at, field) in &report.completed {
                let _ = write!(text, "; {} finished at {at}", field.name());
            }
            text.push('\n');
        }

        let bankrupt = reports.last().is_some_and(RoundReport::bankrupt);
        if bankrupt {
            text.push_str("the town is bankrupt; the administrator has been dismissed");
            return Ok(Reply {
                text,
                flow: Flow::Bankrupt,
            });
        }
        Ok(Reply::text(text))
    }

    fn save_as(&mut self, name: &str) -> Result<SaveReport, CommandError> {
        let snapshot = self.town.snapshot();
        let report = self.store.save(name, &snapshot)?;
        self.dirty = false;
        Ok(report)
    }

    /// Save under the current name if anything changed since the last
    /// save. Returns `None` when there was nothing to save.
    pub fn save_if_dirty(&mut self) -> Option<Result<SaveReport, PersistError>> {
        if !self.dirty {
            return None;
        }
        let snapshot = self.town.snapshot();
        let result = self.store.save(&self.town_name, &snapshot);
        if result.is_ok() {
            self.dirty = false;
        }
        Some(result)
    }
}

fn describe_save(report: &SaveReport) -> String {
    let mut text = format!("saved to {}", report.path.display());
    if report.backed_up {
        text.push_str(" (previous save kept as backup)");
    }
    if let Some(warning) = &report.backup_warning {
        let _ = write!(text, "\nwarning: {warning}");
    }
    text
}
