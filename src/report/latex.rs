use super::chart::Chart;
use anyhow::Result;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

fn escape(text: &str) -> String {
    text.replace('\\', "\\textbackslash{}")
        .replace('&', "\\&")
        .replace('%', "\\%")
        .replace('_', "\\_")
        .replace('#', "\\#")
}

/// pgfplots figure with inline coordinates.
pub fn figure(chart: &Chart) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "\\begin{{figure}}[htbp]");
    let _ = writeln!(out, "\\centering");
    let _ = writeln!(out, "\\begin{{tikzpicture}}");
    let _ = writeln!(out, "\\begin{{axis}}[");
    let _ = writeln!(out, "    width=0.9\\textwidth,");
    let _ = writeln!(out, "    height=7cm,");
    let _ = writeln!(out, "    xlabel={{{}}},", escape(&chart.x_label));
    let _ = writeln!(out, "    ylabel={{{}}},", escape(&chart.y_label));
    let _ = writeln!(out, "    grid=major,");
    let _ = writeln!(out, "    legend pos=north west,");
    let _ = writeln!(out, "    legend cell align=left,");
    let _ = writeln!(out, "]");

    for series in &chart.series {
        let mark = series.marker.map(|m| m.pgf()).unwrap_or("none");
        let _ = write!(out, "\\addplot+[mark={}] coordinates {{", mark);
        for (x, y) in chart.x.iter().zip(&series.values) {
            let _ = write!(out, " ({}, {})", x, y);
        }
        let _ = writeln!(out, " }};");
        let _ = writeln!(out, "\\addlegendentry{{{}}}", escape(&series.label));
    }

    let _ = writeln!(out, "\\end{{axis}}");
    let _ = writeln!(out, "\\end{{tikzpicture}}");
    let _ = writeln!(out, "\\caption{{{}}}", escape(&chart.title));
    let _ = writeln!(out, "\\label{{fig:{}}}", chart.id);
    let _ = writeln!(out, "\\end{{figure}}");
    out
}

/// Whitespace-separated columns for `\addplot table`.
pub fn plot_data(chart: &Chart) -> String {
    let mut out = String::from("x");
    for i in 0..chart.series.len() {
        let _ = write!(out, " s{}", i);
    }
    out.push('\n');

    for (row, x) in chart.x.iter().enumerate() {
        let _ = write!(out, "{}", x);
        for series in &chart.series {
            match series.values.get(row) {
                Some(y) => {
                    let _ = write!(out, " {}", y);
                }
                None => out.push_str(" nan"),
            }
        }
        out.push('\n');
    }
    out
}

/// Writes `<id>.tex` and `<id>.dat` for every chart and returns the written paths.
pub fn export_all(charts: &[Chart], dir: impl AsRef<Path>) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(charts.len() * 2);
    for chart in charts {
        let tex_path = dir.join(format!("{}.tex", chart.id));
        fs::write(&tex_path, figure(chart))?;
        written.push(tex_path);

        let dat_path = dir.join(format!("{}.dat", chart.id));
        fs::write(&dat_path, plot_data(chart))?;
        written.push(dat_path);
    }
    Ok(written)
}
