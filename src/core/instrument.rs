use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstrumentKind {
    Index,
    Stock,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub name: String,
    pub description: String,
    pub kind: InstrumentKind,
}

impl Instrument {
    pub fn is_index(&self) -> bool {
        self.kind == InstrumentKind::Index
    }

    /// Looks up a symbol in the catalogue, case-insensitively.
    pub fn lookup(symbol: &str) -> Option<Instrument> {
        CATALOGUE
            .iter()
            .find(|(s, ..)| s.eq_ignore_ascii_case(symbol))
            .map(|(symbol, name, description, kind)| Instrument {
                symbol: symbol.to_string(),
                name: name.to_string(),
                description: description.to_string(),
                kind: *kind,
            })
    }

    pub fn all() -> Vec<Instrument> {
        CATALOGUE
            .iter()
            .filter_map(|(symbol, ..)| Instrument::lookup(symbol))
            .collect()
    }
}

pub const DEFAULT_SYMBOL: &str = "^IPSA";

const CATALOGUE: &[(&str, &str, &str, InstrumentKind)] = &[
    ("^IPSA", "IPSA", "Índice IPSA", InstrumentKind::Index),
    ("SQM-B.SN", "SQM-B", "SQM", InstrumentKind::Stock),
    ("FALABELLA.SN", "FALABELLA", "Falabella", InstrumentKind::Stock),
    ("COPEC.SN", "COPEC", "Empresas Copec", InstrumentKind::Stock),
    (
        "BSANTANDER.SN",
        "BSANTANDER",
        "Banco Santander Chile",
        InstrumentKind::Stock,
    ),
    ("CENCOSUD.SN", "CENCOSUD", "Cencosud", InstrumentKind::Stock),
    ("CHILE.SN", "CHILE", "Banco de Chile", InstrumentKind::Stock),
    ("ENELCHILE.SN", "ENELCHILE", "Enel Chile", InstrumentKind::Stock),
    ("CCU.SN", "CCU", "CCU", InstrumentKind::Stock),
    ("CMPC.SN", "CMPC", "CMPC", InstrumentKind::Stock),
    ("LTM.SN", "LTM", "LATAM Airlines", InstrumentKind::Stock),
];
