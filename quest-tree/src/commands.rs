use crate::{Cost, CostTree, Reward};
use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{fmt, io::BufRead, str::FromStr};

/// One operation line of the text protocol: `add <effort> <gold>` or
/// `query <budget>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Command {
    Add { effort: Cost, gold: Reward },
    Query { budget: Cost },
}

impl Command {
    /// Applies the command to `tree`. Queries return their profit.
    pub fn apply(&self, tree: &mut CostTree) -> Option<Reward> {
        match *self {
            Command::Add { effort, gold } => {
                tree.insert(effort, gold);
                None
            }
            Command::Query { budget } => Some(tree.query(budget)),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Add { effort, gold } => write!(f, "add {} {}", effort, gold),
            Command::Query { budget } => write!(f, "query {}", budget),
        }
    }
}

impl FromStr for Command {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tokens: Vec<&str> = s.split_whitespace().collect();
        match tokens.as_slice() {
            ["add", effort, gold] => Ok(Command::Add {
                effort: parse_int("effort", effort)?,
                gold: parse_int("gold", gold)?,
            }),
            ["query", budget] => Ok(Command::Query {
                budget: parse_int("budget", budget)?,
            }),
            ["add", args @ ..] => Err(anyhow!("add expects 2 arguments, got {}", args.len())),
            ["query", args @ ..] => Err(anyhow!("query expects 1 argument, got {}", args.len())),
            [op, ..] => Err(anyhow!("Unknown operation {:?}", op)),
            [] => Err(anyhow!("Empty operation line")),
        }
    }
}

fn parse_int(name: &str, token: &str) -> Result<i64> {
    token
        .parse()
        .map_err(|_| anyhow!("Invalid {} {:?}", name, token))
}

/// Operations sharing one tree. Every block starts from an empty tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandBlock {
    pub commands: Vec<Command>,
}

impl CommandBlock {
    pub fn new(commands: Vec<Command>) -> Self {
        Self { commands }
    }

    /// Runs the block on a fresh tree and returns the query answers in order.
    pub fn run(&self) -> Vec<Reward> {
        let mut tree = CostTree::new();
        self.run_on(&mut tree)
    }

    pub fn run_on(&self, tree: &mut CostTree) -> Vec<Reward> {
        self.commands
            .iter()
            .filter_map(|command| command.apply(tree))
            .collect()
    }

    pub fn num_queries(&self) -> usize {
        self.commands
            .iter()
            .filter(|command| matches!(command, Command::Query { .. }))
            .count()
    }
}

impl fmt::Display for CommandBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.commands.len())?;
        for command in &self.commands {
            writeln!(f, "{}", command)?;
        }
        Ok(())
    }
}

/// Reads blocks from the text protocol.
///
/// Iteration stops at end of input, at a blank or non-positive count line,
/// or after the first error. A block cut short by end of input or by a
/// malformed line is still yielded with the operations read before it; the
/// error follows on the next call.
pub struct BlockReader<R> {
    reader: R,
    line_number: usize,
    pending: Option<anyhow::Error>,
    done: bool,
}

impl<R: BufRead> BlockReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
            pending: None,
            done: false,
        }
    }

    /// Number of lines consumed so far.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    fn next_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        let read = self
            .reader
            .read_line(&mut line)
            .with_context(|| format!("Failed to read line {}", self.line_number + 1))?;
        if read == 0 {
            return Ok(None);
        }
        self.line_number += 1;
        Ok(Some(line.trim().to_string()))
    }

    fn read_block(&mut self) -> Result<Option<CommandBlock>> {
        let count = match self.next_line()? {
            Some(line) if !line.is_empty() => line,
            _ => return Ok(None),
        };
        let count: i64 = count.parse().map_err(|_| {
            anyhow!(
                "line {}: invalid operation count {:?}",
                self.line_number,
                count
            )
        })?;
        if count <= 0 {
            return Ok(None);
        }

        let mut block = CommandBlock::default();
        for _ in 0..count {
            let line = match self.next_line()? {
                Some(line) => line,
                None => {
                    self.done = true;
                    break;
                }
            };
            let line_number = self.line_number;
            match line.split_whitespace().next() {
                None => continue,
                Some("add") | Some("query") => match line.parse::<Command>() {
                    Ok(command) => block.commands.push(command),
                    Err(e) => {
                        let e = anyhow!("line {}: {}", line_number, e);
                        if block.commands.is_empty() {
                            return Err(e);
                        }
                        self.pending = Some(e);
                        break;
                    }
                },
                Some(_) => warn!("line {}: skipping unknown operation {:?}", line_number, line),
            }
        }
        Ok(Some(block))
    }
}

impl<R: BufRead> Iterator for BlockReader<R> {
    type Item = Result<CommandBlock>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(e) = self.pending.take() {
            self.done = true;
            return Some(Err(e));
        }
        if self.done {
            return None;
        }
        match self.read_block() {
            Ok(Some(block)) => Some(Ok(block)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

pub fn parse_blocks(input: &str) -> Result<Vec<CommandBlock>> {
    BlockReader::new(input.as_bytes()).collect()
}
