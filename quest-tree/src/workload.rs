use crate::{Command, CommandBlock, Cost, Reward};
use anyhow::{anyhow, Result};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct WorkloadSettings {
    pub seed: u64,
    pub num_blocks: usize,
    pub ops_per_block: usize,
    pub max_effort: Cost,
    pub max_gold: Reward,
    /// Share of operations that are queries, in percent.
    pub query_percent: u32,
}

impl Default for WorkloadSettings {
    fn default() -> Self {
        Self {
            seed: 0,
            num_blocks: 1,
            ops_per_block: 100,
            max_effort: 1000,
            max_gold: 1000,
            query_percent: 20,
        }
    }
}

impl WorkloadSettings {
    pub fn from_json(json_str: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(json_str)
            .map_err(|e| anyhow!("Failed to parse workload settings: {}", e))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        // a zero count line would end the whole stream
        if self.ops_per_block == 0 {
            return Err(anyhow!("ops_per_block must be at least 1"));
        }
        if self.max_effort < 1 {
            return Err(anyhow!("max_effort must be at least 1"));
        }
        if self.max_gold < 1 {
            return Err(anyhow!("max_gold must be at least 1"));
        }
        if self.query_percent > 100 {
            return Err(anyhow!(
                "query_percent ({}) must not exceed 100",
                self.query_percent
            ));
        }
        Ok(())
    }
}

/// Random command blocks, reproducible from `settings.seed`.
pub fn generate_blocks(settings: &WorkloadSettings) -> Result<Vec<CommandBlock>> {
    settings.validate()?;
    let mut rng = SmallRng::seed_from_u64(settings.seed);

    let blocks: Vec<CommandBlock> = (0..settings.num_blocks)
        .map(|_| {
            let commands = (0..settings.ops_per_block)
                .map(|_| {
                    if rng.gen_range(0..100) < settings.query_percent {
                        Command::Query {
                            budget: rng.gen_range(0..=settings.max_effort.saturating_mul(2)),
                        }
                    } else {
                        Command::Add {
                            effort: rng.gen_range(1..=settings.max_effort),
                            gold: rng.gen_range(1..=settings.max_gold),
                        }
                    }
                })
                .collect();
            CommandBlock::new(commands)
        })
        .collect();
    Ok(blocks)
}
