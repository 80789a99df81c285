use crate::output::print_json;
use anyhow::Context;
use clap::Subcommand;
use companion_core::io::read_text_input;
use companion_core::mermaid;
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum MermaidSubcommand {
    /// Repair a diagram (or every ```mermaid block with --markdown)
    Repair {
        /// Input file; reads stdin when omitted or '-'
        file: Option<PathBuf>,

        /// Treat the input as Markdown and repair each mermaid block in place
        #[arg(long)]
        markdown: bool,
    },
}

pub fn run(subcmd: MermaidSubcommand, json: bool) -> anyhow::Result<()> {
    match subcmd {
        MermaidSubcommand::Repair { file, markdown } => repair(file, markdown, json),
    }
}

fn repair(file: Option<PathBuf>, markdown: bool, json: bool) -> anyhow::Result<()> {
    let input = read_text_input(file.as_deref()).context("failed to read input")?;

    if markdown {
        let out = mermaid::repair_markdown(&input);
        if json {
            let changed = out != input;
            print_json(&serde_json::json!({ "markdown": out, "changed": changed }))?;
        } else {
            print!("{out}");
            if !out.ends_with('\n') {
                println!();
            }
        }
        return Ok(());
    }

    if input.trim().is_empty() {
        anyhow::bail!("no diagram given");
    }
    let repaired = mermaid::repair(&input);
    if json {
        print_json(&repaired)?;
    } else {
        println!("{}", repaired.diagram);
    }
    Ok(())
}
