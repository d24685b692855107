//! Point-to-path mapping for sparklines and the detail chart.

/// Sparkline characters (8 levels of height).
pub const SPARKLINE_CHARS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Value range of a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
    /// `max - min`, or 1 for a flat series so scaling never divides by zero.
    pub span: f64,
}

impl Bounds {
    /// Bounds of a series, `None` when empty.
    pub fn of(points: &[f64]) -> Option<Self> {
        let first = *points.first()?;
        let (min, max) = points
            .iter()
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v)));
        let span = if max - min == 0.0 { 1.0 } else { max - min };
        Some(Self { min, max, span })
    }
}

/// Series as `(index, value)` pairs for a ratatui chart dataset.
pub fn indexed(points: &[f64]) -> Vec<(f64, f64)> {
    points.iter().enumerate().map(|(i, &v)| (i as f64, v)).collect()
}

/// Normalize values to 0-7 for the sparkline characters.
pub fn sparkline_levels(points: &[f64]) -> Vec<u8> {
    let Some(bounds) = Bounds::of(points) else {
        return Vec::new();
    };
    points
        .iter()
        .map(|&v| {
            let normalized = ((v - bounds.min) / bounds.span * 7.0).round() as u8;
            normalized.min(7)
        })
        .collect()
}

/// Render the last `width` points as a sparkline string.
pub fn render_sparkline(points: &[f64], width: usize) -> String {
    let start = points.len().saturating_sub(width);
    sparkline_levels(&points[start..])
        .iter()
        .map(|&v| SPARKLINE_CHARS[v as usize])
        .collect()
}

/// Direction of a series from its first to its last point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Rising,
    Falling,
    Stable,
}

impl Trend {
    /// `None` when the series is empty.
    pub fn of(points: &[f64]) -> Option<Self> {
        let start = points.first()?;
        let end = points.last()?;
        Some(if end > start {
            Trend::Rising
        } else if end < start {
            Trend::Falling
        } else {
            Trend::Stable
        })
    }

    pub fn arrow(&self) -> &'static str {
        match self {
            Trend::Rising => "↗",
            Trend::Falling => "↘",
            Trend::Stable => "↔",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Trend::Rising => "Subiendo",
            Trend::Falling => "Bajando",
            Trend::Stable => "Estable",
        }
    }
}

/// Min, max and last value of a series, for the detail legend.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SeriesStats {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub last: Option<f64>,
}

impl SeriesStats {
    pub fn of(points: &[f64]) -> Self {
        let bounds = Bounds::of(points);
        Self {
            min: bounds.map(|b| b.min),
            max: bounds.map(|b| b.max),
            last: points.last().copied(),
        }
    }
}

/// Two decimals, or `--` when absent.
pub fn format_stat(v: Option<f64>) -> String {
    v.map(|v| format!("{:.2}", v)).unwrap_or_else(|| "--".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_flat_series_has_unit_span() {
        let b = Bounds::of(&[5.0, 5.0, 5.0]).unwrap();
        assert_eq!((b.min, b.max, b.span), (5.0, 5.0, 1.0));
        assert!(Bounds::of(&[]).is_none());
    }

    #[test]
    fn test_indexed_pairs_position_with_value() {
        assert_eq!(indexed(&[22.0, 23.5]), vec![(0.0, 22.0), (1.0, 23.5)]);
        assert!(indexed(&[]).is_empty());
    }

    #[test]
    fn test_sparkline() {
        assert_eq!(sparkline_levels(&[0.0, 7.0, 3.5]), vec![0, 7, 4]);
        assert_eq!(render_sparkline(&[1.0, 2.0, 0.0, 7.0], 2), "▁█");
        assert_eq!(render_sparkline(&[], 8), "");
    }

    #[test]
    fn test_trend() {
        assert_eq!(Trend::of(&[1.0, 0.0, 2.0]), Some(Trend::Rising));
        assert_eq!(Trend::of(&[3.0, 9.0, 2.0]), Some(Trend::Falling));
        assert_eq!(Trend::of(&[4.0]), Some(Trend::Stable));
        assert_eq!(Trend::of(&[]), None);
    }

    #[test]
    fn test_stats() {
        let stats = SeriesStats::of(&[22.0, 25.5, 21.0, 23.0]);
        assert_eq!(format_stat(stats.min), "21.00");
        assert_eq!(format_stat(stats.max), "25.50");
        assert_eq!(format_stat(stats.last), "23.00");
        assert_eq!(format_stat(SeriesStats::of(&[]).last), "--");
    }
}
