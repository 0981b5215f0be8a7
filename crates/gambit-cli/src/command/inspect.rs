use std::path::PathBuf;

use anyhow::Context;
use gambit_brain::{Activation, Brain};
use gambit_evaluator::check_chess_brain;
use serde::Serialize;

use crate::util;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct InspectArg {
    /// Brain file to inspect
    path: PathBuf,
    /// Print the summary as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Serialize)]
struct BrainSummary {
    path: PathBuf,
    parameters: usize,
    layers: Vec<LayerSummary>,
    /// Why the brain cannot play chess, if it cannot.
    chess_incompatibility: Option<String>,
}

#[derive(Debug, Serialize)]
struct LayerSummary {
    input_size: usize,
    output_size: usize,
    activation: Activation,
}

pub(crate) fn run(arg: &InspectArg) -> anyhow::Result<()> {
    let brain = Brain::load(&arg.path).context("Failed to inspect brain")?;
    let summary = BrainSummary {
        path: arg.path.clone(),
        parameters: brain.parameter_count(),
        layers: brain
            .layers()
            .iter()
            .map(|layer| LayerSummary {
                input_size: layer.input_size(),
                output_size: layer.output_size(),
                activation: layer.activation(),
            })
            .collect(),
        chess_incompatibility: check_chess_brain(&brain).err().map(|e| e.to_string()),
    };

    if arg.json {
        return util::print_json(&summary);
    }

    println!("Brain: {}", summary.path.display());
    println!("  Parameters: {}", summary.parameters);
    println!("  Layers: {}", summary.layers.len());
    for (i, layer) in summary.layers.iter().enumerate() {
        let activation = match layer.activation {
            Activation::Softmax { temperature } => format!("softmax (temperature {temperature})"),
            activation => activation.name().to_owned(),
        };
        println!(
            "    {i:2}: {:5} -> {:5} {activation}",
            layer.input_size, layer.output_size
        );
    }
    match &summary.chess_incompatibility {
        None => println!("  Plays chess: yes"),
        Some(reason) => println!("  Plays chess: no, {reason}"),
    }
    Ok(())
}
