use super::ui;
use crate::core::instrument::{Instrument, InstrumentKind};
use comfy_table::Cell;

/// Prints the instrument catalogue.
pub fn run() {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Symbol"),
        ui::header_cell("Name"),
        ui::header_cell("Description"),
        ui::header_cell("Type"),
    ]);

    for instrument in Instrument::all() {
        let kind = match instrument.kind {
            InstrumentKind::Index => "index",
            InstrumentKind::Stock => "stock",
        };
        table.add_row(vec![
            Cell::new(&instrument.symbol),
            Cell::new(&instrument.name),
            Cell::new(&instrument.description),
            Cell::new(kind),
        ]);
    }

    println!("{table}");
}
