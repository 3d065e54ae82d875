//! Plain-text renderers. Each view takes a decoded payload and returns the
//! text to print, so it can be tested without a terminal.

pub mod analysis;
pub mod calculator;
pub mod comparison;
pub mod compass;
pub mod glossary;
pub mod opportunities;
pub mod usage;

use std::fmt;

/// Colour band used for the headline score and the four dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScoreBand {
    High,
    Medium,
    Low,
    Unknown,
}

impl ScoreBand {
    pub fn of(score: Option<f64>) -> Self {
        match score.filter(|s| s.is_finite()) {
            Some(s) if s >= 70.0 => ScoreBand::High,
            Some(s) if s >= 50.0 => ScoreBand::Medium,
            Some(_) => ScoreBand::Low,
            None => ScoreBand::Unknown,
        }
    }
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ScoreBand::High => "high",
            ScoreBand::Medium => "medium",
            ScoreBand::Low => "low",
            ScoreBand::Unknown => "unknown",
        };
        f.write_str(label)
    }
}

/// Four-step tone shared by the compass point and the comparator scores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Excellent,
    Good,
    Moderate,
    Low,
}

impl Tone {
    pub fn of_score(score: f64) -> Self {
        if score >= 75.0 {
            Tone::Excellent
        } else if score >= 60.0 {
            Tone::Good
        } else if score >= 45.0 {
            Tone::Moderate
        } else {
            Tone::Low
        }
    }

    /// Percentage metrics (ROE, margins, growth) use lower cut-offs.
    pub fn of_percentage(value: f64) -> Self {
        if value >= 20.0 {
            Tone::Excellent
        } else if value >= 10.0 {
            Tone::Good
        } else if value >= 5.0 {
            Tone::Moderate
        } else {
            Tone::Low
        }
    }
}

impl fmt::Display for Tone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Tone::Excellent => "excellent",
            Tone::Good => "good",
            Tone::Moderate => "moderate",
            Tone::Low => "low",
        };
        f.write_str(label)
    }
}

/// Left-aligned text table with a header rule.
pub(crate) fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(i) {
                *width = (*width).max(cell.chars().count());
            }
        }
    }

    let line = |cells: Vec<&str>| -> String {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut out = Vec::with_capacity(rows.len() + 2);
    out.push(line(headers.to_vec()));
    out.push(
        widths
            .iter()
            .map(|w| "-".repeat(*w))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in rows {
        out.push(line(row.iter().map(String::as_str).collect()));
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_band_boundaries() {
        assert_eq!(ScoreBand::of(Some(70.0)), ScoreBand::High);
        assert_eq!(ScoreBand::of(Some(69.9)), ScoreBand::Medium);
        assert_eq!(ScoreBand::of(Some(50.0)), ScoreBand::Medium);
        assert_eq!(ScoreBand::of(Some(49.9)), ScoreBand::Low);
        assert_eq!(ScoreBand::of(None), ScoreBand::Unknown);
        assert_eq!(ScoreBand::of(Some(f64::NAN)), ScoreBand::Unknown);
    }

    #[test]
    fn test_tones() {
        assert_eq!(Tone::of_score(75.0), Tone::Excellent);
        assert_eq!(Tone::of_score(60.0), Tone::Good);
        assert_eq!(Tone::of_score(45.0), Tone::Moderate);
        assert_eq!(Tone::of_score(44.9), Tone::Low);
        assert_eq!(Tone::of_percentage(20.0), Tone::Excellent);
        assert_eq!(Tone::of_percentage(9.99), Tone::Moderate);
        assert_eq!(Tone::of_percentage(-3.0), Tone::Low);
    }

    #[test]
    fn test_render_table_aligns_columns() {
        let table = render_table(
            &["Ticker", "Score"],
            &[
                vec!["AAPL".to_string(), "72.5".to_string()],
                vec!["BRK.B".to_string(), "--".to_string()],
            ],
        );
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "Ticker  Score");
        assert_eq!(lines[1], "------  -----");
        assert_eq!(lines[2], "AAPL    72.5");
        assert_eq!(lines[3], "BRK.B   --");
    }
}
