use clap::Parser;
use flowgrid::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fs;

/// A CLI tool to generate random, valid flow descriptions for the layout engine
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_flow.json")]
    output: String,

    /// Maximum gateway nesting depth
    #[arg(long, default_value_t = 4)]
    depth: usize,

    /// Maximum number of branches per gateway
    #[arg(long, default_value_t = 4)]
    max_branches: usize,

    /// Maximum number of content steps in a row
    #[arg(long, default_value_t = 3)]
    max_steps: usize,

    /// Seed for reproducible output
    #[arg(long)]
    seed: Option<u64>,
}

struct Generator {
    rng: StdRng,
    flow: FlowDescription,
    next_id: usize,
    max_branches: usize,
    max_steps: usize,
}

impl Generator {
    fn fresh_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{}{}", prefix, self.next_id)
    }

    /// Generates a chain of steps, optionally ending in a gateway, and returns its first id.
    /// Every path of the chain ends the flow.
    fn chain(&mut self, depth: usize) -> Option<String> {
        let steps = self.rng.random_range(0..=self.max_steps);
        let tail = if depth > 0 && self.rng.random_bool(0.6) {
            Some(self.gateway(depth))
        } else {
            None
        };

        let mut next = tail;
        for _ in 0..steps {
            let id = self.fresh_id("step");
            self.flow.elements.insert(
                id.clone(),
                FlowElement::Content(ContentElement {
                    next,
                    payload: Payload::new(),
                }),
            );
            next = Some(id);
        }
        next
    }

    fn gateway(&mut self, depth: usize) -> String {
        let id = self.fresh_id("gateway");
        let branch_count = self.rng.random_range(2..=self.max_branches.max(2));
        let branches = (0..branch_count)
            .map(|_| BranchDefinition {
                next: self.chain(depth - 1),
                payload: Payload::new(),
            })
            .collect();
        self.flow.elements.insert(
            id.clone(),
            FlowElement::Gateway(GatewayElement {
                branches,
                payload: Payload::new(),
            }),
        );
        id
    }
}

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let rng = match cli.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut generator = Generator {
        rng,
        flow: FlowDescription::new(),
        next_id: 0,
        max_branches: cli.max_branches,
        max_steps: cli.max_steps,
    };
    generator.flow.first_element_id = generator.chain(cli.depth);
    let flow = generator.flow;

    // Generated flows only merge at the end, so they must always be valid.
    validate(&flow)?;

    fs::write(&cli.output, flow.to_json_pretty()?)?;
    println!(
        "Successfully generated a flow with {} elements and saved it to '{}'",
        flow.elements.len(),
        cli.output
    );

    Ok(())
}
