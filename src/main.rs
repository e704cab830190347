// Entry point and interactive menu.
//
// - [1]/[2] load a dataset (user file or the bundled sample).
// - [3] prints summary cards, charts and tables and exports the reports.
// - [4]-[7] drive the single-session calculator and its saved history.
use anyhow::Result;
use carbon_report::analytics::{equivalences, session_suggestions};
use carbon_report::calculator::{CalculationInput, TransportMode};
use carbon_report::config::{Cli, Config};
use carbon_report::error::SessionError;
use carbon_report::history::{HistoryStore, JsonFileHistory};
use carbon_report::loader;
use carbon_report::output;
use carbon_report::pipeline::PipelineState;
use carbon_report::reports;
use carbon_report::util::{format_grouped, format_int, format_number};
use clap::Parser;
use std::io::{self, Write};
use std::path::Path;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Read a single line of input after printing `prompt`.
fn read_line(prompt: &str) -> Option<String> {
    print!("{}", prompt);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    match io::stdin().read_line(&mut buf) {
        Ok(0) | Err(_) => None,
        Ok(_) => Some(buf.trim().to_string()),
    }
}

/// Keep asking until the user enters a non-negative number. Blank means 0.
fn read_amount(prompt: &str) -> Option<f64> {
    loop {
        let s = read_line(prompt)?;
        if s.is_empty() {
            return Some(0.0);
        }
        match s.parse::<f64>() {
            Ok(v) if v.is_finite() && v >= 0.0 => return Some(v),
            _ => println!("Please enter a non-negative number."),
        }
    }
}

fn confirm(prompt: &str) -> bool {
    loop {
        let Some(resp) = read_line(prompt) else {
            return false;
        };
        match resp.to_uppercase().as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Options [1] and [2]: load a CSV and run it through the pipeline.
///
/// A failed user load is reported; a failed sample load is only logged and
/// leaves whatever dataset was there before.
fn handle_load(state: &mut PipelineState, path: &Path, is_sample: bool) {
    let ticket = state.begin_load();
    let source = path.display().to_string();
    match loader::load_from_path(path) {
        Ok((records, report)) => {
            let (total, loaded, skipped) =
                (report.total_rows, report.loaded_rows, report.skipped_rows());
            if state.complete_load(ticket, &source, records, report) {
                println!(
                    "Processing dataset... ({} rows read, {} loaded)",
                    format_int(total),
                    format_int(loaded)
                );
                if skipped > 0 {
                    println!(
                        "Note: {} rows skipped due to invalid dates or amounts.",
                        format_int(skipped)
                    );
                }
                println!();
            }
        }
        Err(e) => {
            state.fail_load(ticket, &source, &e);
            if !is_sample {
                eprintln!("Failed to load file: {}\n", e);
            }
        }
    }
}

/// Option [3]: print cards, charts and tables, then export every report.
///
/// Export failures are reported and the session carries on.
fn handle_generate_reports(state: &PipelineState, cfg: &Config) {
    let Some(ds) = state.dataset() else {
        println!("Error: No data loaded. Please load a dataset first (option 1 or 2).\n");
        return;
    };

    let eq = equivalences(ds.aggregates.total);
    println!("Carbon Footprint Summary ({})\n", ds.source);
    print!(
        "{}",
        output::render_cards(ds.aggregates.total, ds.cues.first(), eq.trees_needed, eq.phone_charges)
    );
    println!();

    println!("Emissions by Category (kg CO2e)\n");
    print!("{}", output::render_category_bars(&ds.cues));
    println!();
    println!("Monthly Trend (kg CO2e)\n");
    print!("{}", output::render_trend(&ds.aggregates.by_month));
    println!();

    println!("Report 1: Emissions and Reduction Cues by Category\n");
    output::preview_table_rows(&reports::category_report(&ds.cues), 5);
    println!("Report 2: Department Ranking\n");
    output::preview_table_rows(&reports::department_report(ds), 5);
    println!("Report 3: Monthly Totals\n");
    output::preview_table_rows(&reports::monthly_report(ds), 12);

    let summary = reports::generate_summary(ds);
    println!("Summary Stats:");
    println!("{}\n", reports::summary_line(&summary));

    match output::export_reports(ds, &cfg.out_dir) {
        Ok(files) => {
            info!(dir = %cfg.out_dir.display(), "reports written");
            for f in files {
                println!("(Full table exported to {})", f.display());
            }
            println!();
        }
        Err(e) => eprintln!("Write error: {}\n", e),
    }
}

/// Option [4]: prompt for transport, electricity and diet inputs.
fn handle_calculate(state: &mut PipelineState) {
    let mode = loop {
        let Some(s) = read_line("Transport mode ([1] car, [2] bus, [3] train, [4] flight): ") else {
            return;
        };
        match TransportMode::parse(&s) {
            Some(m) => break m,
            None => println!("Invalid mode."),
        }
    };
    let Some(distance_km) = read_amount("Distance travelled (km): ") else {
        return;
    };
    let Some(electricity_kwh) = read_amount("Electricity used (kWh): ") else {
        return;
    };
    let Some(meat_meals) = read_amount("Meat meals eaten: ") else {
        return;
    };
    let input = CalculationInput {
        transport_mode: mode,
        distance_km,
        electricity_kwh,
        meat_meals,
    };
    match state.calculate(&input) {
        Ok(entry) => {
            println!();
            println!("Total: {} kg CO2e", format_number(entry.total));
            println!("  Transport  : {}", format_grouped(entry.details.transport, 2));
            println!("  Electricity: {}", format_grouped(entry.details.electricity, 2));
            println!("  Meat       : {}", format_grouped(entry.details.meat, 2));
            let eq = equivalences(entry.total);
            println!(
                "That is about {} trees for a year, or {} phone charges.",
                format_number(eq.trees_needed),
                format_number(eq.phone_charges)
            );
            for (name, _, advice) in session_suggestions(&entry, &mode.category()) {
                println!("  - {}: {}", name, advice);
            }
            println!();
        }
        Err(e) => println!("Error: {}\n", e),
    }
}

fn handle_save(state: &PipelineState, store: &mut JsonFileHistory) {
    match state.save(store) {
        Ok(entry) => println!(
            "Saved calculation ({} kg CO2e).\n",
            format_number(entry.total)
        ),
        Err(SessionError::MissingSavedResult) => {
            println!("Please calculate your footprint before saving (option 4).\n")
        }
        Err(e) => eprintln!("Failed to save: {}\n", e),
    }
}

fn handle_history(store: &JsonFileHistory) {
    let entries = store.load_all();
    if entries.is_empty() {
        println!("No history saved yet.\n");
        return;
    }
    println!("Saved Calculations\n");
    output::preview_table_rows(&reports::history_report(&entries), entries.len());
}

fn handle_clear(store: &mut JsonFileHistory) {
    if !confirm("Clear all saved history? (Y/N): ") {
        return;
    }
    match store.clear_all() {
        Ok(()) => println!("History cleared. No history saved yet.\n"),
        Err(e) => eprintln!("Failed to clear history: {}\n", e),
    }
}

fn main() -> Result<()> {
    let cfg = Config::from(Cli::parse());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.log_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let mut state = PipelineState::new();
    let mut store = JsonFileHistory::new(&cfg.storage_path);
    info!(storage = %store.path().display(), "starting");

    loop {
        println!("Carbon Footprint Dashboard:");
        println!("[1] Load dataset ({})", cfg.data_path.display());
        println!("[2] Load sample dataset");
        println!("[3] Generate reports");
        println!("[4] Calculate footprint");
        println!("[5] Save last calculation");
        println!("[6] View history");
        println!("[7] Clear history");
        println!("[0] Exit\n");
        let Some(choice) = read_line("Enter choice: ") else {
            break;
        };
        match choice.as_str() {
            "1" => handle_load(&mut state, &cfg.data_path, false),
            "2" => handle_load(&mut state, &cfg.sample_path, true),
            "3" => {
                println!();
                handle_generate_reports(&state, &cfg);
            }
            "4" => handle_calculate(&mut state),
            "5" => handle_save(&state, &mut store),
            "6" => handle_history(&store),
            "7" => handle_clear(&mut store),
            "0" => {
                println!("Exiting the program.");
                break;
            }
            _ => println!("Invalid choice. Please enter 0-7.\n"),
        }
    }
    Ok(())
}
