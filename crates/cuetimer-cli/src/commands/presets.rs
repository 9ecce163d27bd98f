use cuetimer_core::presets;
use cuetimer_core::Config;
use serde::Serialize;

#[derive(Serialize)]
struct PresetRow {
    key: &'static str,
    label: String,
    ticks: u64,
    lead_in: u64,
    ticks_per_second: u64,
    total_secs: u64,
    selected: bool,
}

pub fn run(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let rows: Vec<PresetRow> = presets::iter()
        .map(|(key, preset)| PresetRow {
            key,
            label: preset.label(),
            ticks: preset.ticks,
            lead_in: preset.lead_in,
            ticks_per_second: preset.ticks_per_second,
            total_secs: preset.total_secs(),
            selected: config.timer.custom.is_none() && config.timer.preset == key,
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    for row in rows {
        let marker = if row.selected { "*" } else { " " };
        println!(
            "{marker} {:<6} {:<10} {:>4}s total",
            row.key, row.label, row.total_secs
        );
    }
    Ok(())
}
