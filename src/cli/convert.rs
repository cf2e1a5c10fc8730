use super::{chart, ui};
use crate::core::ConversionState;
use crate::core::convert::{format_amount, validate_amount};
use crate::core::history::format_rate_time;
use crate::orchestrator::ConversionOrchestrator;
use anyhow::{Result, anyhow, bail};

#[derive(Debug, Clone)]
pub struct ConvertArgs {
    pub amount: String,
    pub from: Option<String>,
    pub to: String,
    /// Print the final state as JSON instead of the rendered view.
    pub json: bool,
}

fn progress_message(state: &ConversionState) -> &'static str {
    match (state.is_loading_conversion, state.is_loading_history) {
        (true, true) => "Fetching rate and history...",
        (true, false) => "Fetching current rate...",
        (false, true) => "Fetching rate history...",
        (false, false) => "Done",
    }
}

fn check_supported(currencies: &[String], code: &str) -> Result<()> {
    if !currencies.is_empty() && !currencies.iter().any(|c| c == code) {
        bail!("Unsupported currency: {code}");
    }
    Ok(())
}

pub async fn run(orchestrator: &ConversionOrchestrator, args: ConvertArgs) -> Result<()> {
    let to = args.to.to_uppercase();

    orchestrator.ready().await;
    let state = orchestrator.snapshot();
    if let Some(message) = state.error_message {
        bail!("Could not load currencies: {message}");
    }

    if let Some(from) = &args.from {
        orchestrator.select_currency_from(&from.to_uppercase());
    }
    let from = orchestrator.snapshot().selected_currency_from;
    check_supported(&state.currencies, &from)?;
    check_supported(&state.currencies, &to)?;

    validate_amount(&args.amount).map_err(|e| anyhow!(e.to_string()))?;
    orchestrator.set_amount_from(&args.amount);

    let pb = ui::new_spinner("Fetching rates...");
    let mut rx = orchestrator.subscribe();
    let watcher_pb = pb.clone();
    let watcher = tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let message = progress_message(&rx.borrow_and_update());
            watcher_pb.set_message(message);
        }
    });

    let history = orchestrator.select_currency_to(&to);
    orchestrator.convert(&from, &to).await;
    let conversion_error = orchestrator.snapshot().error_message;
    if history.await.is_err() {
        tracing::warn!("History task did not complete");
    }

    watcher.abort();
    pb.finish_and_clear();

    let state = orchestrator.snapshot();
    if state.current_rate.is_none() {
        let message = conversion_error
            .or(state.error_message)
            .unwrap_or_else(|| "Conversion failed".to_string());
        bail!("{message}");
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&state)?);
    } else {
        println!("{}", render(&state));
    }
    Ok(())
}

/// Renders a completed conversion, its rate time and history.
pub fn render(state: &ConversionState) -> String {
    let from = &state.selected_currency_from;
    let to = &state.selected_currency_to;
    let amount_from = validate_amount(&state.amount_from)
        .map(format_amount)
        .unwrap_or_else(|_| state.amount_from.clone());

    let mut output = format!(
        "{}\n\n",
        ui::style_text("Currency Calculator", ui::StyleType::Title)
    );
    output.push_str(&format!(
        "{} {} = {} {}\n",
        ui::style_text(&amount_from, ui::StyleType::ResultLabel),
        from,
        ui::style_text(&state.amount_to, ui::StyleType::ResultValue),
        to
    ));

    if let Some(rate) = state.current_rate {
        output.push_str(&format!("1 {from} = {rate:.4} {to}\n"));
    }
    if let Some(timestamp) = state.rate_timestamp {
        output.push_str(&ui::style_text(
            &format!("Mid-market exchange rate at {}", format_rate_time(timestamp)),
            ui::StyleType::Subtle,
        ));
        output.push('\n');
    }

    if !state.history_points.is_empty() {
        output.push('\n');
        output.push_str(&chart::render(&state.history_points, from, to));
        output.push('\n');
    }

    if let Some(message) = &state.error_message {
        output.push('\n');
        output.push_str(&ui::style_text(message, ui::StyleType::Error));
        output.push('\n');
    }

    output
}
