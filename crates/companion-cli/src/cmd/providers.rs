use crate::output::{print_json, print_table};
use anyhow::Context;
use companion_core::config::Config;
use companion_core::types::ProviderKind;
use std::path::Path;

pub fn run(config_path: Option<&Path>, json: bool) -> anyhow::Result<()> {
    let config = Config::load(config_path).context("failed to load config")?;
    let llm = &config.llm;

    if json {
        let list: Vec<serde_json::Value> = ProviderKind::all()
            .iter()
            .map(|k| {
                let p = llm.provider(*k);
                serde_json::json!({
                    "provider": k,
                    "model": p.model,
                    "baseUrl": p.base_url,
                    "configured": p.has_key(),
                    "default": *k == llm.default_provider,
                })
            })
            .collect();
        return print_json(&list);
    }

    let rows = ProviderKind::all()
        .iter()
        .map(|k| {
            let p = llm.provider(*k);
            vec![
                k.to_string(),
                p.model.clone(),
                p.base_url.clone(),
                if p.has_key() { "yes" } else { "no" }.to_string(),
                if *k == llm.default_provider { "*" } else { "" }.to_string(),
            ]
        })
        .collect();
    print_table(&["PROVIDER", "MODEL", "BASE URL", "KEY", "DEFAULT"], rows);
    Ok(())
}
