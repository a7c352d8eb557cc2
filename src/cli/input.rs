//! Text commands typed into a running game.

use crate::rules::{BuildingKind, Difficulty, Job, TechId, TradeResource, TradeSide};
use crate::simulation::Action;
use crate::world::FoodPriority;

pub const HELP: &str = "\
Commands:
  pause | resume              stop or continue the clock
  assign <job> <n>            move n unemployed adults into a job
  unassign <job> <n>          move n workers back to unemployed
  build <building>            construct a building
  research <tech>             research a technology
  buy <resource>              buy food, wood or stone
  sell <resource>             sell food, wood or stone
  priority <mode>             equal | children | workers | elderly-last
  festival                    hold a festival
  start [difficulty]          start a new game (easy | normal | hard)
  restart                     return to the menu
  status                      print the village summary
  report                      print the final report
  help                        show this help
  quit                        save and exit";

/// A parsed line of input.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Act(Action),
    SetPaused(bool),
    Status,
    Report,
    Help,
    Quit,
}

fn count(word: Option<&str>) -> Result<i32, String> {
    let word = word.ok_or("missing count")?;
    match word.parse::<i32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("count must be a positive number, got '{}'", word)),
    }
}

fn argument<'a>(word: Option<&'a str>, what: &str) -> Result<&'a str, String> {
    word.ok_or_else(|| format!("missing {}", what))
}

fn job(word: Option<&str>) -> Result<Job, String> {
    let name = argument(word, "job")?;
    Job::parse(name).ok_or_else(|| format!("unknown job '{}'", name))
}

fn trade(word: Option<&str>, side: TradeSide) -> Result<Command, String> {
    let name = argument(word, "resource")?;
    let resource = TradeResource::parse(name).ok_or_else(|| format!("unknown resource '{}'", name))?;
    Ok(Command::Act(Action::Trade { resource, side }))
}

/// Parse one input line. Matching is case-insensitive; extra words are an error.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let lower = line.trim().to_ascii_lowercase();
    let mut words = lower.split_whitespace();
    let Some(verb) = words.next() else {
        return Err("empty command".to_string());
    };

    let command = match verb {
        "pause" => Command::SetPaused(true),
        "resume" => Command::SetPaused(false),
        "assign" => {
            let job = job(words.next())?;
            Command::Act(Action::AssignJob { job, delta: count(words.next())? })
        }
        "unassign" => {
            let job = job(words.next())?;
            Command::Act(Action::AssignJob { job, delta: -count(words.next())? })
        }
        "build" => {
            let name = argument(words.next(), "building")?;
            let kind = BuildingKind::parse(name).ok_or_else(|| format!("unknown building '{}'", name))?;
            Command::Act(Action::Construct(kind))
        }
        "research" => {
            let key = argument(words.next(), "technology")?;
            let tech = TechId::parse(key).ok_or_else(|| format!("unknown technology '{}'", key))?;
            Command::Act(Action::Research(tech))
        }
        "buy" => trade(words.next(), TradeSide::Buy)?,
        "sell" => trade(words.next(), TradeSide::Sell)?,
        "priority" => {
            let mode = argument(words.next(), "priority mode")?;
            let priority = FoodPriority::parse(mode).ok_or_else(|| format!("unknown priority '{}'", mode))?;
            Command::Act(Action::SetFoodPriority(priority))
        }
        "festival" => Command::Act(Action::HoldFestival),
        "start" => {
            let difficulty = match words.next() {
                Some(name) => Difficulty::parse(name).ok_or_else(|| format!("unknown difficulty '{}'", name))?,
                None => Difficulty::Normal,
            };
            Command::Act(Action::StartGame(difficulty))
        }
        "restart" => Command::Act(Action::Restart),
        "status" => Command::Status,
        "report" => Command::Report,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(format!("unknown command '{}' (try 'help')", other)),
    };

    if let Some(extra) = words.next() {
        return Err(format!("unexpected '{}' after '{}'", extra, verb));
    }
    Ok(command)
}
