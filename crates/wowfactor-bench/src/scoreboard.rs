//! Leaderboard queries over stored scores, and the cell formatting shared by
//! every leaderboard view.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::record::ScoreRecord;

/// Highest ops/sec first; equal scores keep their input order.
pub fn sort_by_score(scores: &mut [ScoreRecord]) {
    scores.sort_by(|a, b| {
        b.ops_per_second
            .partial_cmp(&a.ops_per_second)
            .unwrap_or(Ordering::Equal)
    });
}

pub fn all_scores(mut scores: Vec<ScoreRecord>) -> Vec<ScoreRecord> {
    sort_by_score(&mut scores);
    scores
}

/// Best record per (processor model, platform), sorted by score.
pub fn best_per_machine(scores: Vec<ScoreRecord>) -> Vec<ScoreRecord> {
    let mut best: Vec<ScoreRecord> = Vec::new();
    let mut index: HashMap<(String, String), usize> = HashMap::new();
    for score in scores {
        let (cpu, platform) = score.system.machine_id();
        let key = (cpu.to_string(), platform.to_string());
        match index.get(&key) {
            Some(&i) => {
                if score.ops_per_second > best[i].ops_per_second {
                    best[i] = score;
                }
            }
            None => {
                index.insert(key, best.len());
                best.push(score);
            }
        }
    }
    all_scores(best)
}

/// Distinct CPU models, sorted.
pub fn cpu_models(scores: &[ScoreRecord]) -> Vec<String> {
    let mut models: Vec<String> = scores
        .iter()
        .map(|s| s.system.processor_model.clone())
        .collect();
    models.sort();
    models.dedup();
    models
}

/// Records for one CPU model, sorted by score.
pub fn for_cpu(scores: Vec<ScoreRecord>, model: &str) -> Vec<ScoreRecord> {
    all_scores(
        scores
            .into_iter()
            .filter(|s| s.system.processor_model == model)
            .collect(),
    )
}

/// Visual tier of a leaderboard position (1-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RankTier {
    Gold,
    Silver,
    Bronze,
    TopTen,
    Rest,
}

impl RankTier {
    pub fn for_rank(rank: usize) -> Self {
        match rank {
            1 => RankTier::Gold,
            2 => RankTier::Silver,
            3 => RankTier::Bronze,
            4..=10 => RankTier::TopTen,
            _ => RankTier::Rest,
        }
    }

    pub fn label(&self, rank: usize) -> String {
        match self {
            RankTier::Gold => format!("★{}★", rank),
            RankTier::Silver | RankTier::Bronze => format!("#{}#", rank),
            RankTier::TopTen | RankTier::Rest => rank.to_string(),
        }
    }
}

/// One leaderboard row as plain text; colouring is up to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRow {
    pub rank: usize,
    pub tier: RankTier,
    pub rank_label: String,
    pub date: String,
    pub ops: String,
    pub platform: String,
    pub cpu: String,
    pub frequency: String,
    pub total_ops: String,
    pub time: String,
}

pub fn rows(scores: &[ScoreRecord]) -> Vec<ScoreRow> {
    scores
        .iter()
        .enumerate()
        .map(|(i, s)| {
            let rank = i + 1;
            let tier = RankTier::for_rank(rank);
            ScoreRow {
                rank,
                tier,
                rank_label: tier.label(rank),
                date: short_date(s),
                ops: format_large_number(s.ops_per_second),
                platform: truncate(&s.system.platform, 16),
                cpu: truncate(&s.system.processor_model, 24),
                frequency: truncate(&s.system.processor_frequency, 8),
                total_ops: group_thousands(s.total_operations),
                time: format!("{:.2}s", s.duration_seconds),
            }
        })
        .collect()
}

/// `YY-mm-dd HH:MM`, or the first 16 characters of an unparsable timestamp.
pub fn short_date(score: &ScoreRecord) -> String {
    match score.parsed_timestamp() {
        Some(dt) => dt.format("%y-%m-%d %H:%M").to_string(),
        None => score.timestamp.chars().take(16).collect(),
    }
}

/// First `max` characters, trimmed.
pub fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect::<String>().trim().to_string()
}

/// `1.23M`, `4.56K`, else `1,234.50`-style with two decimals.
pub fn format_large_number(n: f64) -> String {
    if n >= 1_000_000.0 {
        format!("{:.2}M", n / 1_000_000.0)
    } else if n >= 1_000.0 {
        format!("{:.2}K", n / 1_000.0)
    } else {
        format_decimal(n, 2)
    }
}

/// Integer with `,` thousands separators.
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

/// Float with thousands separators and fixed decimals: `1234.5` → `1,234.50`.
pub fn format_decimal(n: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, n.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };
    let grouped = int_part
        .parse::<u64>()
        .map(group_thousands)
        .unwrap_or_else(|_| int_part.to_string());
    let sign = if n < 0.0 && fixed.chars().any(|c| c != '0' && c != '.') {
        "-"
    } else {
        ""
    };
    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}
