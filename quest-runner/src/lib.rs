use anyhow::{anyhow, Result};
use log::{debug, info};
use quest_tree::{BlockReader, Command, CostTree, Reward};
use serde::{Deserialize, Serialize};
use std::io::{BufRead, Write};

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Emit one JSON report per block instead of one profit per line.
    pub json: bool,
    /// Verify the tree invariants after every command.
    pub check: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub blocks: usize,
    pub commands: usize,
    pub queries: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockReport {
    pub block: usize,
    pub commands: Vec<Command>,
    pub answers: Vec<Reward>,
}

/// Runs every block of `reader` on its own tree and writes the answers to
/// `writer` as soon as each block is done.
pub fn run_stream<R: BufRead, W: Write>(
    reader: R,
    writer: &mut W,
    options: &RunOptions,
) -> Result<RunSummary> {
    let mut summary = RunSummary::default();

    for (index, block) in BlockReader::new(reader).enumerate() {
        let block = block?;
        let mut tree = CostTree::new();
        let mut answers = Vec::with_capacity(block.num_queries());

        for (position, command) in block.commands.iter().enumerate() {
            if let Some(profit) = command.apply(&mut tree) {
                answers.push(profit);
            }
            if options.check {
                tree.check_invariants().map_err(|e| {
                    anyhow!(
                        "block {}, command {} ({}): {}",
                        index,
                        position,
                        command,
                        e
                    )
                })?;
            }
        }
        debug!(
            "block {} finished with {} costs left:\n{}",
            index,
            tree.len(),
            tree
        );

        summary.blocks += 1;
        summary.commands += block.commands.len();
        summary.queries += answers.len();

        if options.json {
            let report = BlockReport {
                block: index,
                commands: block.commands,
                answers,
            };
            writeln!(writer, "{}", serde_json::to_string(&report)?)?;
        } else {
            for profit in &answers {
                writeln!(writer, "{}", profit)?;
            }
        }
    }

    writer.flush()?;
    info!(
        "processed {} blocks ({} commands, {} queries)",
        summary.blocks, summary.commands, summary.queries
    );
    Ok(summary)
}
