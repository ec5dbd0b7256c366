// src/domain/universe.rs
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::domain::errors::{AppError, AppResult};
use crate::domain::models::CapCategory;

// NSE symbols, without the ".NS" exchange suffix; vendors that need
// the suffix append it themselves. A symbol may appear in both lists;
// the snapshot deduplicates on (Symbol, Date).
const MID_CAP: &[&str] = &[
    "ADANIENT", "APOLLOHOSP", "VBL", "PAGEIND", "PERSISTENT", "ABB", "AUBANK", "GODREJCP",
    "POLICYBZR", "INDUSINDBK", "CUMMINSIND", "DIXON", "HAVELLS", "AMBUJACEM", "PIDILITIND",
    "TORNTPOWER", "LUPIN", "BHEL", "ABBOTINDIA", "TATACHEM", "ESCORTS", "MUTHOOTFIN", "DABUR",
    "CHOLAFIN", "COLPAL", "MPHASIS", "TATAELXSI", "BIOCON", "SUNDARMFIN", "KPIL", "TRENT", "LICI",
    "TATACOMM", "GAIL", "JINDALSTEL", "NAUKRI", "LTF", "KPITTECH", "OFSS", "JUBLFOOD", "SYNGENE",
    "ZYDUSLIFE", "ALKEM", "HDFCAMC", "MAZDOCK", "MAXHEALTH", "POLYCAB", "MANKIND", "WAAREEENER",
    "UNIONBANK", "GMRAIRPORT", "INDUSTOWER", "MARICO", "INDIANB", "BSE", "NHPC", "NTPCGREEN",
    "SRF", "BHARTIHEXA", "SBICARD", "ASHOKLEY", "PAYTM", "UNOMINDA", "ABCAPITAL", "RVNL",
    "FORTIS", "VOLTAS", "PRESTIGE", "NYKAA", "LLOYDSME",
];

const SMALL_CAP: &[&str] = &[
    "IDBI", "IOB", "FACT", "GODFRYPHLP", "AIIL", "KAYNES", "MCX", "RADICO", "UCOBANK", "SUVEN",
    "CHOLAHLDNG", "NH", "POONAWALLA", "DELHIVERY", "CENTRALBK", "CDSL", "GODIGIT", "GILLETTE",
    "ASTERDM", "ITI", "AFFLE", "GRSE", "KIMS", "NBCC", "SUMICHEM", "AEGISLOG", "AMBER",
    "HINDCOPPER", "LALPATHLAB", "PPLPHARMA", "JBCHEPHARM", "FSL", "INOXWIND", "ZFCVINDIA",
    "EMCURE", "TATACHEM", "SHYAMMETL", "NAVINFLUOR", "ANANDRATHI", "EIHOTEL", "WOCKPHARMA",
    "RAMCOCEM", "MANAPPURAM", "VSTIND", "RAJESHEXPO", "IRCON", "BEML", "IRCTC", "HUDCO", "HAL",
    "SAIL", "BEL", "COFORGE", "KPIGREEN", "CROMPTON", "THERMAX", "ASTRAL", "METROPOLIS", "SJVN",
    "IRB", "RBLBANK", "INDIAMART", "DEEPAKNTR", "LMW", "CREDITACC", "NAVA", "KEI", "OBEROIRLTY",
    "RATNAMANI",
];

/// The fixed mid-cap/small-cap ticker universe a snapshot covers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Universe {
    pub mid_cap: Vec<String>,
    pub small_cap: Vec<String>,
}

impl Default for Universe {
    fn default() -> Self {
        Self {
            mid_cap: MID_CAP.iter().map(|s| s.to_string()).collect(),
            small_cap: SMALL_CAP.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl Universe {
    /// Load a replacement universe from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let contents = std::fs::read_to_string(&path).map_err(|e| {
            AppError::Config(format!(
                "Failed to read universe file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        serde_json::from_str(&contents).map_err(|e| {
            AppError::Config(format!(
                "Failed to parse universe file {}: {}",
                path.as_ref().display(),
                e
            ))
        })
    }

    /// Category groups in fetch order.
    pub fn categories(&self) -> [(CapCategory, &[String]); 2] {
        [
            (CapCategory::MidCap, self.mid_cap.as_slice()),
            (CapCategory::SmallCap, self.small_cap.as_slice()),
        ]
    }

    pub fn len(&self) -> usize {
        self.mid_cap.len() + self.small_cap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mid_cap.is_empty() && self.small_cap.is_empty()
    }
}
