use super::ui;
use crate::orchestrator::ConversionOrchestrator;
use anyhow::{Result, bail};
use comfy_table::Cell;

const COLUMNS: usize = 8;

pub async fn run(orchestrator: &ConversionOrchestrator) -> Result<()> {
    let pb = ui::new_spinner("Fetching currencies...");
    orchestrator.ready().await;
    pb.finish_and_clear();

    let state = orchestrator.snapshot();
    if let Some(message) = state.error_message {
        bail!("Could not load currencies: {message}");
    }

    println!("{}", render(&state.currencies, orchestrator.provider_name()));
    Ok(())
}

pub fn render(currencies: &[String], provider: &str) -> String {
    let mut table = ui::new_styled_table();
    for row in currencies.chunks(COLUMNS) {
        table.add_row(row.iter().map(Cell::new).collect::<Vec<_>>());
    }

    format!(
        "{} {}\n{}\n{}",
        ui::style_text("Supported currencies", ui::StyleType::Title),
        ui::style_text(&format!("({provider})"), ui::StyleType::Subtle),
        table,
        ui::style_text(
            &format!("{} currencies", currencies.len()),
            ui::StyleType::Subtle
        )
    )
}
