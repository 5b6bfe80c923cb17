//! Box-drawn tables whose cells may carry colour codes.

use console::{measure_text_width, pad_str, Alignment, Style};
use wowfactor_bench::scoreboard::{RankTier, ScoreRow};

use super::cyan;

pub struct Table {
    headers: Vec<String>,
    aligns: Vec<Alignment>,
    rows: Vec<Vec<String>>,
}

impl Table {
    /// Columns are right-aligned unless changed with [`Table::align`].
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            aligns: vec![Alignment::Right; headers.len()],
            rows: Vec::new(),
        }
    }

    pub fn align(mut self, column: usize, align: Alignment) -> Self {
        if let Some(a) = self.aligns.get_mut(column) {
            *a = align;
        }
        self
    }

    pub fn align_all(mut self, align: Alignment) -> Self {
        self.aligns.iter_mut().for_each(|a| *a = align);
        self
    }

    /// Missing cells render empty; extra cells are dropped.
    pub fn add_row(&mut self, mut cells: Vec<String>) {
        cells.resize(self.headers.len(), String::new());
        self.rows.push(cells);
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| measure_text_width(h)).collect();
        for row in &self.rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(measure_text_width(cell));
            }
        }
        widths
    }

    pub fn render(&self) -> String {
        let widths = self.widths();
        let rule = format!(
            "┼{}┼",
            widths
                .iter()
                .map(|w| "─".repeat(w + 2))
                .collect::<Vec<_>>()
                .join("┼")
        );
        let line = |cells: &[String], aligns: &[Alignment]| {
            let body: Vec<String> = cells
                .iter()
                .zip(&widths)
                .zip(aligns)
                .map(|((cell, w), align)| format!(" {} ", pad_str(cell, *w, *align, None)))
                .collect();
            format!("│{}│", body.join("│"))
        };

        let header_cells: Vec<String> = self
            .headers
            .iter()
            .map(|h| cyan().apply_to(h).to_string())
            .collect();
        let centred = vec![Alignment::Center; widths.len()];

        let mut out = vec![rule.clone(), line(&header_cells, &centred), rule.clone()];
        for row in &self.rows {
            out.push(line(row, &self.aligns));
        }
        out.push(rule);
        out.join("\n")
    }
}

pub fn tier_style(tier: RankTier) -> Style {
    let base = Style::new().bold();
    match tier {
        RankTier::Gold => base.yellow().bright(),
        RankTier::Silver => base.white().bright(),
        RankTier::Bronze => base.blue().bright(),
        RankTier::TopTen => base.green().bright(),
        RankTier::Rest => base.blue(),
    }
}

pub const LEADERBOARD_HEADERS: [&str; 8] =
    ["#", "DATE", "OPS", "OS", "CPU", "FREQ", "TOTAL OPS", "TIME"];

/// Leaderboard with every row coloured by its rank tier.
pub fn leaderboard(rows: &[ScoreRow]) -> Table {
    let mut table = Table::new(&LEADERBOARD_HEADERS)
        .align(1, Alignment::Left)
        .align(3, Alignment::Left)
        .align(4, Alignment::Left)
        .align(5, Alignment::Left);
    for row in rows {
        let style = tier_style(row.tier);
        let cells = [
            &row.rank_label,
            &row.date,
            &row.ops,
            &row.platform,
            &row.cpu,
            &row.frequency,
            &row.total_ops,
            &row.time,
        ];
        table.add_row(cells.iter().map(|c| style.apply_to(c).to_string()).collect());
    }
    table
}
