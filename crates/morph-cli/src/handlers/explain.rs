//! Explain command handler

use crate::cli::ExplainArgs;
use crate::config::Config;
use crate::error::Result;
use crate::output::OutputWriter;
use morph_core::{Chain, Instruction};
use serde::Serialize;

/// A compiled annotation, in serializable form
#[derive(Debug, Serialize, PartialEq)]
pub struct Explanation {
    pub annotation: String,
    pub chain: String,
    pub steps: Vec<Step>,
}

/// One compiled directive
#[derive(Debug, Serialize, PartialEq)]
pub struct Step {
    pub directive: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub keys: Vec<Step>,
}

impl Explanation {
    fn new(annotation: &str, chain: &Chain) -> Self {
        Self {
            annotation: annotation.to_string(),
            chain: chain.to_string(),
            steps: steps(chain),
        }
    }
}

fn steps(chain: &Chain) -> Vec<Step> {
    chain
        .instructions()
        .iter()
        .map(|instruction| Step {
            directive: instruction.name().to_string(),
            params: match instruction {
                Instruction::Transform(call) => call.params.clone(),
                _ => None,
            },
            keys: match instruction {
                Instruction::Keys(Some(keys)) => steps(keys),
                _ => Vec::new(),
            },
        })
        .collect()
}

/// Handle the explain command
pub fn handle_explain(args: ExplainArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let morpher = config.morpher()?;
    let chain = morpher.compile(&args.annotation)?;
    let explanation = Explanation::new(&args.annotation, &chain);

    if !output.is_human() {
        return output.data(&explanation);
    }

    output.section("Chain")?;
    output.field("Annotation", &explanation.annotation)?;
    if chain.is_empty() {
        return output.field("Compiled", "(no directives)");
    }
    output.field("Compiled", &explanation.chain)?;
    output.field("Dives", if chain.dives() { "yes" } else { "no" })?;
    Ok(())
}
