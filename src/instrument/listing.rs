use serde::{Deserialize, Serialize};

//listing board of an instrument, which determines the daily price limit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Board {
    //main boards (shanghai/shenzhen), 10% daily limit
    Main,
    //chinext (300 prefix), 20% daily limit
    ChiNext,
    //star market (688 prefix), 20% daily limit
    Star,
    //beijing exchange (8 prefix), 30% daily limit
    Beijing,
}

impl Board {
    //classifies a ticker by its code prefix
    pub fn from_ticker(ticker: &str) -> Self {
        if ticker.starts_with("688") {
            Board::Star
        } else if ticker.starts_with("300") {
            Board::ChiNext
        } else if ticker.starts_with('8') {
            Board::Beijing
        } else {
            Board::Main
        }
    }

    //maximum permitted daily move as a price multiplier
    pub fn limit_multiplier(&self) -> f64 {
        match self {
            Board::Main => 1.10,
            Board::ChiNext | Board::Star => 1.20,
            Board::Beijing => 1.30,
        }
    }
}

//an instrument identifier together with its market-tier metadata
//read-only for the core; the board is classified once at construction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instrument {
    pub symbol: String,
    pub board: Board,
}

impl Instrument {
    pub fn new(symbol: String) -> Self {
        let board = Board::from_ticker(&symbol);
        Instrument { symbol, board }
    }

    pub fn with_board(symbol: String, board: Board) -> Self {
        Instrument { symbol, board }
    }

    //limit-up price for a given previous close, rounded to cents
    pub fn limit_up_price(&self, pre_close: f64) -> f64 {
        (pre_close * self.board.limit_multiplier() * 100.0).round() / 100.0
    }
}
