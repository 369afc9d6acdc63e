//! Table formatting utilities using comfy-table.

use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use featbuild_core::{Decision, Feature};
use owo_colors::OwoColorize;

fn styled_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(*h).add_attribute(Attribute::Bold))
                .collect::<Vec<_>>(),
        )
        .load_preset(comfy_table::presets::UTF8_FULL)
        .apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Prints planned decisions with current and cached fingerprints.
pub fn print_decision_table(decisions: &[Decision]) {
    let mut table = styled_table(&["Status", "Feature", "Fingerprint", "Cached"]);

    for decision in decisions {
        let status_color = if decision.is_build() {
            Color::Yellow
        } else {
            Color::Green
        };
        let cached = decision
            .previous
            .as_ref()
            .map(|fp| fp.short().to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(decision.kind.as_str()).fg(status_color),
            Cell::new(&decision.feature).fg(Color::White),
            Cell::new(decision.fingerprint.short()),
            Cell::new(cached).fg(Color::DarkGrey),
        ]);
    }

    println!("{}", table);
}

/// Prints every configured feature with its inputs and dependencies.
pub fn print_feature_table(features: &[&Feature]) {
    let mut table = styled_table(&["Feature", "Inputs", "Depends on", "Command"]);

    for feature in features {
        let inputs = feature
            .inputs
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        let deps = if feature.depends_on.is_empty() {
            "-".to_string()
        } else {
            feature.depends_on.join(", ")
        };
        table.add_row(vec![
            Cell::new(&feature.name).fg(Color::White),
            Cell::new(inputs).fg(Color::DarkGrey),
            Cell::new(deps),
            Cell::new(&feature.command).fg(Color::DarkGrey),
        ]);
    }

    println!("{}", table);
}

/// Prints feature names one per line.
pub fn print_feature_list(names: &[String]) {
    if names.is_empty() {
        println!("  {} {}", "→".cyan(), "(none)".bright_black());
        return;
    }

    for name in names {
        println!("  {} {}", "→".cyan(), name.bold().white());
    }
}
