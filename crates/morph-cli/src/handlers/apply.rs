//! Apply command handler

use super::{load_document, render_document};
use crate::cli::ApplyArgs;
use crate::config::{Config, RuleConfig};
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use morph_core::Morpher;
use serde_json::Value;
use std::fs;
use tracing::{debug, info, instrument};

/// Handle the apply command
#[instrument(skip(config, output), fields(file = %args.file.display()))]
pub fn handle_apply(args: ApplyArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let timer = Timer::with_details("apply_command", &format!("file: {}", args.file.display()));

    let mut document = load_document(&args.file)?;
    let morpher = config.morpher()?;

    let mut rules = config.rules.clone();
    if let Some(chain) = args.chain {
        rules.push(RuleConfig {
            pointer: args.pointer.unwrap_or_default(),
            chain,
        });
    }

    output.info(&format!(
        "Applying {} rule(s) to {}",
        rules.len(),
        args.file.display()
    ))?;

    for rule in &rules {
        apply_rule(&morpher, &mut document, rule)?;
    }

    info!(
        rules = rules.len(),
        elapsed_ms = timer.elapsed().as_millis() as u64,
        "Document normalized"
    );

    match args.save_to {
        Some(path) => {
            fs::write(&path, render_document(&path, &document)?)?;
            output.success(&format!("Saved normalized document to {}", path.display()))
        }
        None => output.data(&document),
    }
}

/// Apply one rule to the value its pointer selects
pub fn apply_rule(morpher: &Morpher, document: &mut Value, rule: &RuleConfig) -> Result<()> {
    let target = document
        .pointer_mut(&rule.pointer)
        .ok_or_else(|| Error::PointerNotFound {
            pointer: rule.pointer.clone(),
        })?;

    debug!(pointer = %rule.pointer, chain = %rule.chain, "Applying rule");
    morpher.apply(target, &rule.chain)?;
    Ok(())
}
