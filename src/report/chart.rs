use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Marker {
    Circle,
    Square,
    Triangle,
}

impl Marker {
    pub fn pgf(&self) -> &'static str {
        match self {
            Marker::Circle => "o",
            Marker::Square => "square",
            Marker::Triangle => "triangle",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series {
    pub label: String,
    pub marker: Option<Marker>,
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(label: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            marker: None,
            values,
        }
    }

    pub fn with_marker(mut self, marker: Marker) -> Self {
        self.marker = Some(marker);
        self
    }
}

/// Line chart sharing the arrival-rate x axis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    /// Short name used for exported file names.
    pub id: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x: Vec<f64>,
    pub series: Vec<Series>,
}

impl Chart {
    pub fn series(&self, label: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.label == label)
    }

    /// Box-drawn table: one row per x value, one column per series.
    pub fn render(&self) -> String {
        let x_width = self.x_label.chars().count().max(8);
        let widths: Vec<usize> = self
            .series
            .iter()
            .map(|s| s.label.chars().count().max(12))
            .collect();

        let rule = |left: &str, mid: &str, right: &str| {
            let mut line = String::from(left);
            line.push_str(&"═".repeat(x_width + 2));
            for w in &widths {
                line.push_str(mid);
                line.push_str(&"═".repeat(w + 2));
            }
            line.push_str(right);
            line
        };

        let mut out = Vec::new();
        out.push(self.title.clone());
        out.push(rule("╔", "╦", "╗"));

        let mut header = format!("║ {:<x_width$} ", self.x_label);
        for (series, w) in self.series.iter().zip(&widths) {
            header.push_str(&format!("║ {:<w$} ", series.label, w = w));
        }
        header.push('║');
        out.push(header);
        out.push(rule("╠", "╬", "╣"));

        for (i, x) in self.x.iter().enumerate() {
            let mut row = format!("║ {:>x_width$} ", x);
            for (series, w) in self.series.iter().zip(&widths) {
                match series.values.get(i) {
                    Some(v) => row.push_str(&format!("║ {:>w$.6} ", v, w = w)),
                    None => row.push_str(&format!("║ {:>w$} ", "-", w = w)),
                }
            }
            row.push('║');
            out.push(row);
        }
        out.push(rule("╚", "╩", "╝"));
        out.push(format!("y: {}", self.y_label));

        out.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chart() -> Chart {
        Chart {
            id: "demo".into(),
            title: "Demo".into(),
            x_label: "A".into(),
            y_label: "Sojourn time".into(),
            x: vec![10.0, 11.0],
            series: vec![
                Series::new("Mean", vec![0.25, 0.5]).with_marker(Marker::Circle),
                Series::new("Short", vec![1.0]),
            ],
        }
    }

    #[test]
    fn renders_one_line_per_point() {
        let text = chart().render();
        let lines: Vec<&str> = text.lines().collect();
        // title, top rule, header, separator, two rows, bottom rule, y label
        assert_eq!(lines.len(), 8);
        assert!(lines[2].contains("Mean"));
        assert!(lines[4].contains("0.250000"));
        assert!(lines[5].contains("-"));
    }

    #[test]
    fn rows_have_equal_width() {
        let text = chart().render();
        let widths: Vec<usize> = text
            .lines()
            .filter(|l| l.starts_with('║') || l.starts_with('╔'))
            .map(|l| l.chars().count())
            .collect();
        assert!(widths.windows(2).all(|w| w[0] == w[1]), "{:?}", widths);
    }

    #[test]
    fn looks_up_series_by_label() {
        let chart = chart();
        assert_eq!(chart.series("Mean").unwrap().marker, Some(Marker::Circle));
        assert!(chart.series("Missing").is_none());
    }
}
