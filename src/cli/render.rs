//! Terminal rendering
//!
//! Pure functions from session state and transition outcomes to text. Tables
//! are drawn with comfy-table; nothing here performs I/O.

use std::fmt::Write as _;

use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Cell, CellAlignment, ContentArrangement, Table};
use indicatif::HumanBytes;

use crate::app::{
    BrowseState, Connection, DatasetDetail, Direction, Exchange, NavState, NodeRegistry, Outcome,
    StateKind, Stock,
};
use crate::cli::command::COMMANDS;
use crate::constants::render::{MAX_TEXT_SECTION, RULE_WIDTH};

/// Greeting shown when the REPL starts
pub fn welcome(registry: &NodeRegistry) -> String {
    let mut out = String::from("bwilcd - browse ILCD Network nodes. Type 'help' for commands.\n\n");
    out.push_str(&nodes_view(registry));
    out
}

/// Text for the result of a successful transition
pub fn render_outcome(state: &NavState, registry: &NodeRegistry, outcome: &Outcome) -> String {
    match outcome {
        Outcome::Nodes => nodes_view(registry),
        Outcome::Stocks => current_view(state, registry),
        Outcome::Datasets => current_view(state, registry),
        Outcome::NoMorePages => "Already on the last page.".to_string(),
        Outcome::AlreadyFirstPage => "Already on the first page.".to_string(),
        Outcome::Detail(detail) => detail_view(detail),
        Outcome::Downloaded { stock, path, bytes } => format!(
            "Downloaded '{}' ({}) to {}",
            stock,
            HumanBytes(*bytes),
            path.display()
        ),
    }
}

/// The listing that belongs to the current state
pub fn current_view(state: &NavState, registry: &NodeRegistry) -> String {
    match state {
        NavState::Disconnected => nodes_view(registry),
        NavState::Connected { connection, stocks } => stocks_view(connection, stocks),
        NavState::StockSelected {
            connection, browse, ..
        } => datasets_view(connection, browse),
    }
}

/// Current view followed by the commands valid in this state
pub fn help(state: &NavState, registry: &NodeRegistry) -> String {
    let mut out = current_view(state, registry);
    out.push_str("\n\n");
    out.push_str(&command_list(state.kind()));
    out
}

/// Commands available in `kind`
pub fn command_list(kind: StateKind) -> String {
    let mut table = new_table(&["Command", "Aliases", "Description"]);
    for entry in COMMANDS.iter().filter(|c| c.states.contains(&kind)) {
        table.add_row(vec![entry.usage, entry.aliases, entry.summary]);
    }
    format!("Commands ({}):\n{}", kind.describe(), table)
}

pub fn nodes_view(registry: &NodeRegistry) -> String {
    let mut table = new_table(&["#", "Node", "URL"]);
    for (i, node) in registry.nodes().iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&node.label),
            Cell::new(&node.base_url),
        ]);
    }
    right_align(&mut table, 0);
    format!("Available nodes:\n{}", table)
}

pub fn stocks_view(connection: &Connection, stocks: &[Stock]) -> String {
    let mut out = format!(
        "Connected to {} ({}){}\n",
        connection.node.label,
        connection.node.base_url,
        if connection.credentials.is_some() {
            " as authenticated user"
        } else {
            ""
        }
    );

    if stocks.is_empty() {
        out.push_str("No stocks available on this node.");
        return out;
    }

    let mut table = new_table(&["#", "Name", "UUID", "Description"]);
    for (i, stock) in stocks.iter().enumerate() {
        table.add_row(vec![
            Cell::new(i + 1),
            Cell::new(&stock.name),
            Cell::new(&stock.id),
            Cell::new(&stock.description),
        ]);
    }
    right_align(&mut table, 0);
    let _ = write!(out, "{}", table);
    out
}

pub fn datasets_view(connection: &Connection, browse: &BrowseState) -> String {
    let page = &browse.page;
    let mut header = format!(
        "{} / {} | page {}",
        connection.node.label,
        browse.stock.name,
        browse.page_index + 1
    );
    if let Some(total) = page.total_size {
        let _ = write!(header, " | {} datasets", total);
    }
    if let Some(query) = &browse.last_query {
        let _ = write!(header, " | search '{}'", query);
    }

    if page.is_empty() {
        let message = match &browse.last_query {
            Some(query) => format!("No datasets found matching '{}'", query),
            None => "No datasets found in this stock".to_string(),
        };
        return format!("{}\n{}", header, message);
    }

    let mut table = new_table(&["#", "Name", "Version", "Location", "UUID"]);
    for (offset, dataset) in page.datasets.iter().enumerate() {
        table.add_row(vec![
            Cell::new(page.start_index + offset + 1),
            Cell::new(&dataset.name),
            Cell::new(&dataset.version),
            Cell::new(dataset.location.as_deref().unwrap_or("-")),
            Cell::new(&dataset.uuid),
        ]);
    }
    right_align(&mut table, 0);

    let mut out = format!("{}\n{}", header, table);
    let mut hints = Vec::new();
    if browse.page_index > 0 {
        hints.push("'prev' for the previous page");
    }
    if page.has_more {
        hints.push("'next' for more");
    }
    if !hints.is_empty() {
        let _ = write!(out, "\n{}", hints.join(", "));
    }
    out
}

/// Multi-section description of one dataset
pub fn detail_view(detail: &DatasetDetail) -> String {
    let rule = "-".repeat(RULE_WIDTH);
    let mut out = String::new();

    let _ = writeln!(out, "{}", detail.name.as_deref().unwrap_or("(unnamed dataset)"));
    let _ = writeln!(out, "{}", rule);
    for (label, value) in [
        ("UUID", &detail.uuid),
        ("Reference year", &detail.reference_year),
        ("Geography", &detail.geography),
        ("Functional unit", &detail.functional_unit),
    ] {
        let _ = writeln!(out, "{:<16} {}", format!("{}:", label), value.as_deref().unwrap_or("-"));
    }

    for (title, text) in [
        ("Description", &detail.description),
        ("Technology", &detail.technology),
    ] {
        if let Some(text) = text.as_deref().filter(|t| !t.trim().is_empty()) {
            let _ = write!(out, "\n{}:\n{}\n", title, truncate(text.trim(), MAX_TEXT_SECTION));
        }
    }

    let inputs = sorted_exchanges(&detail.exchanges, Direction::Input);
    let outputs = sorted_exchanges(&detail.exchanges, Direction::Output);
    let _ = write!(out, "\n{}", exchange_section("Inputs", &inputs));
    let _ = write!(out, "\n{}", exchange_section("Outputs", &outputs));

    if detail.has_reference_flow {
        out.push_str("\n* reference flow");
    }
    out.trim_end().to_string()
}

fn exchange_section(title: &str, exchanges: &[&Exchange]) -> String {
    if exchanges.is_empty() {
        return format!("{}: none\n", title);
    }

    let mut table = new_table(&["", "Amount", "Unit", "Flow", "Type", "Category"]);
    for exchange in exchanges {
        table.add_row(vec![
            Cell::new(if exchange.is_reference_flow { "*" } else { "" }),
            Cell::new(format_amount(exchange.amount)),
            Cell::new(exchange.unit.as_deref().unwrap_or("")),
            Cell::new(&exchange.flow_name),
            Cell::new(exchange.flow_type.as_deref().unwrap_or("")),
            Cell::new(exchange.category.as_deref().unwrap_or("")),
        ]);
    }
    right_align(&mut table, 1);
    format!("{} ({}):\n{}\n", title, exchanges.len(), table)
}

/// Exchanges of one direction, largest absolute amount first
fn sorted_exchanges(exchanges: &[Exchange], direction: Direction) -> Vec<&Exchange> {
    let mut selected: Vec<&Exchange> = exchanges
        .iter()
        .filter(|e| e.direction == direction)
        .collect();
    selected.sort_by(|a, b| b.amount.abs().total_cmp(&a.amount.abs()));
    selected
}

/// Cut `text` to `max` characters, marking the cut
pub fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

/// Compact amount: plain decimals for ordinary values, scientific otherwise
pub fn format_amount(amount: f64) -> String {
    let magnitude = amount.abs();
    if amount != 0.0 && !(1e-3..1e6).contains(&magnitude) {
        return format!("{:.3e}", amount);
    }
    let fixed = format!("{:.4}", amount);
    fixed.trim_end_matches('0').trim_end_matches('.').to_string()
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers.to_vec());
    table
}

fn right_align(table: &mut Table, index: usize) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(CellAlignment::Right);
    }
}
