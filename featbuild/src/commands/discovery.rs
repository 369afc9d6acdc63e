//! Inspection commands that never build or write the cache.

use anyhow::Result;
use featbuild_core::{graph, Feature, RegistryGraph};
use owo_colors::OwoColorize;

use crate::formatting::{
    print_feature_list, print_feature_table, print_section_header, SectionStyle,
};

use super::Context;

pub fn cmd_order(ctx: &Context, feature: &str, json: bool) -> Result<()> {
    let (_, registry) = ctx.load()?;
    let order = graph::resolve(feature, &registry)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&order)?);
        return Ok(());
    }

    print_section_header(&format!("Build order for {}", feature), SectionStyle::Primary);
    for (idx, name) in order.iter().enumerate() {
        println!(
            "  {} {}",
            format!("{:>3}.", idx + 1).bright_black(),
            name.bold().white()
        );
    }
    println!();

    Ok(())
}

pub fn cmd_affected(ctx: &Context, feature: &str) -> Result<()> {
    let (_, registry) = ctx.load()?;
    let graph = RegistryGraph::new(&registry)?;
    let affected: Vec<String> = graph.all_dependents(feature)?.into_iter().collect();

    print_section_header(
        &format!("Features rebuilt when {} changes", feature),
        SectionStyle::Primary,
    );
    print_feature_list(&affected);
    println!();

    Ok(())
}

pub fn cmd_list(ctx: &Context, json: bool) -> Result<()> {
    let (loaded, registry) = ctx.load()?;
    let features: Vec<&Feature> = registry.iter().collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&features)?);
        return Ok(());
    }

    print_section_header(
        &format!("Features in {}", loaded.path.display()),
        SectionStyle::Primary,
    );
    if features.is_empty() {
        print_section_header("(no features)", SectionStyle::Secondary);
    } else {
        print_feature_table(&features);
    }
    println!();

    Ok(())
}
