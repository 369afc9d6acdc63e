//! Build and plan commands.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Result;
use featbuild_core::{
    graph, orchestrator, BuildAction, BuildOrchestrator, CommandValidator, ContainerBuildAction,
    Decision, RunSummary, ShellBuildAction,
};

use crate::formatting::{
    format_duration, print_decision, print_decision_table, print_section_header,
    print_separator_with_spacing, print_success, print_summary_box, SectionStyle,
};

use super::{Context, Executor};

fn create_action(
    executor: Executor,
    docker_bin: String,
    strict: bool,
    base_dir: PathBuf,
) -> Box<dyn BuildAction> {
    match executor {
        Executor::Docker => Box::new(ContainerBuildAction::new().with_program(docker_bin)),
        Executor::Shell => {
            let validator = if strict {
                CommandValidator::strict()
            } else {
                CommandValidator::new()
            };
            Box::new(ShellBuildAction::new(base_dir).with_validator(validator))
        }
    }
}

pub fn cmd_build(
    ctx: &Context,
    feature: &str,
    executor: Executor,
    docker_bin: String,
    strict: bool,
) -> Result<()> {
    let start = Instant::now();
    let (loaded, registry) = ctx.load()?;
    let cache = ctx.cache_store(&loaded);
    let action = create_action(executor, docker_bin, strict, loaded.base_dir.clone());

    let order = graph::resolve(feature, &registry)?;
    println!("Build order: {}", order);

    let orchestrator = BuildOrchestrator::new(cache, action);
    let decisions = orchestrator.run_order(&order, &registry, print_decision)?;

    let summary = RunSummary::from_decisions(&decisions);
    print_separator_with_spacing();
    if summary.built == 0 {
        print_success(&format!("{} is up to date", feature));
    } else {
        print_success(&format!(
            "Built {} of {} features",
            summary.built,
            summary.total()
        ));
    }
    println!();
    print_summary_box(
        "Summary",
        &[
            ("Built", &summary.built.to_string()),
            ("Skipped", &summary.skipped.to_string()),
            ("Duration", &format_duration(start.elapsed().as_secs_f64())),
        ],
    );
    println!();

    Ok(())
}

pub fn cmd_plan(ctx: &Context, feature: &str, json: bool) -> Result<()> {
    let (loaded, registry) = ctx.load()?;
    let cache = ctx.cache_store(&loaded);
    let decisions: Vec<Decision> = orchestrator::plan(&cache, feature, &registry)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&decisions)?);
        return Ok(());
    }

    print_section_header(&format!("Build plan for {}", feature), SectionStyle::Primary);
    print_decision_table(&decisions);
    println!();

    let summary = RunSummary::from_decisions(&decisions);
    print_summary_box(
        "Summary",
        &[
            ("Would build", &summary.built.to_string()),
            ("Would skip", &summary.skipped.to_string()),
        ],
    );
    println!();

    Ok(())
}

