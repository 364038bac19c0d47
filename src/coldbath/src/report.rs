use std::{
    collections::HashSet,
    fmt::{self, Write as _},
    io,
    path::Path,
    process::Command,
};

use chrono::NaiveDate;
use coldbath_algos::BathDayComparison;
use coldbath_types::{ColdBathObservation, SleepMetric, SleepObservation};

const CHART_HEIGHT: f64 = 240.0;
const BAR_WIDTH: f64 = 18.0;
const BAR_GAP: f64 = 4.0;
const BATH_COLOR: &str = "#2b7bb9";
const OTHER_COLOR: &str = "#b8c4cc";

#[derive(Clone, Debug)]
pub struct ReportOptions {
    pub title: String,
    pub metric: SleepMetric,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            title: "Cold baths and sleep".to_owned(),
            metric: SleepMetric::TotalSleep,
        }
    }
}

/// Renders a self-contained HTML page with a bar chart and the bath-day comparison.
pub fn render_report(
    sleep: &[SleepObservation],
    baths: &[ColdBathObservation],
    options: &ReportOptions,
) -> Result<String, fmt::Error> {
    let comparison = BathDayComparison::new(sleep, baths, options.metric);
    let title = escape(&options.title);

    let mut html = String::new();
    writeln!(html, "<!DOCTYPE html>")?;
    writeln!(html, "<html><head><meta charset=\"utf-8\"><title>{title}</title>")?;
    writeln!(
        html,
        "<style>body{{font-family:sans-serif;margin:2em}}table{{border-collapse:collapse}}\
         td,th{{border:1px solid #ccc;padding:4px 8px}}</style></head><body>"
    )?;
    writeln!(html, "<h1>{title}</h1>")?;
    writeln!(
        html,
        "<p>Correlation between cold baths and {}: <strong id=\"correlation\">{:.2}</strong></p>",
        options.metric, comparison.correlation
    )?;
    chart(&mut html, sleep, baths, options.metric)?;
    writeln!(
        html,
        "<table><tr><th></th><th>Days</th><th>Mean</th></tr>\
         <tr><td>Bath days</td><td>{}</td><td>{}</td></tr>\
         <tr><td>Other days</td><td>{}</td><td>{}</td></tr></table>",
        comparison.bath_days,
        comparison.format_value(comparison.bath_mean),
        comparison.other_days,
        comparison.format_value(comparison.other_mean),
    )?;
    writeln!(html, "</body></html>")?;
    Ok(html)
}

fn chart(
    out: &mut impl fmt::Write,
    sleep: &[SleepObservation],
    baths: &[ColdBathObservation],
    metric: SleepMetric,
) -> fmt::Result {
    let bath_dates = baths.iter().map(|b| b.date).collect::<HashSet<NaiveDate>>();
    let mut points = sleep
        .iter()
        .filter_map(|s| Some((s.date, s.metric(metric)?)))
        .collect::<Vec<_>>();
    points.sort_by_key(|(date, _)| *date);

    if points.is_empty() {
        return writeln!(out, "<p>No sleep data in range.</p>");
    }

    let max = points.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    let scale = if max > 0.0 { CHART_HEIGHT / max } else { 0.0 };
    let width = points.len() as f64 * (BAR_WIDTH + BAR_GAP);

    writeln!(
        out,
        "<svg xmlns=\"http://www.w3.org/2000/svg\" width=\"{width}\" height=\"{CHART_HEIGHT}\">"
    )?;
    for (i, (date, value)) in points.iter().enumerate() {
        let height = value * scale;
        let x = i as f64 * (BAR_WIDTH + BAR_GAP);
        let y = CHART_HEIGHT - height;
        let color = if bath_dates.contains(date) {
            BATH_COLOR
        } else {
            OTHER_COLOR
        };
        writeln!(
            out,
            "<rect x=\"{x:.1}\" y=\"{y:.1}\" width=\"{BAR_WIDTH}\" height=\"{height:.1}\" \
             fill=\"{color}\"><title>{date}: {value:.0}</title></rect>"
        )?;
    }
    writeln!(out, "</svg>")
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn write_report(path: impl AsRef<Path>, html: &str) -> io::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)?;
    info!("report written to {}", path.display());
    Ok(())
}

/// Opens `path` with the platform's default handler.
pub fn open_in_browser(path: &Path) -> io::Result<()> {
    #[cfg(target_os = "windows")]
    let mut command = {
        let mut command = Command::new("cmd");
        command.args(["/C", "start", ""]);
        command
    };

    #[cfg(target_os = "macos")]
    let mut command = Command::new("open");

    #[cfg(not(any(target_os = "windows", target_os = "macos")))]
    let mut command = Command::new("xdg-open");

    command.arg(path).spawn()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    fn data() -> (Vec<SleepObservation>, Vec<ColdBathObservation>) {
        (
            vec![
                SleepObservation::new(date(3), 28_800.0),
                SleepObservation::new(date(1), 28_800.0),
                SleepObservation::new(date(2), 25_200.0),
            ],
            vec![ColdBathObservation::new(date(2))],
        )
    }

    #[test]
    fn report_contains_correlation_and_groups() {
        let (sleep, baths) = data();
        let html = render_report(&sleep, &baths, &ReportOptions::default()).unwrap();
        assert!(html.contains("<strong id=\"correlation\">-1.00</strong>"));
        assert!(html.contains("<td>Bath days</td><td>1</td><td>07:00</td>"));
        assert!(html.contains("<td>Other days</td><td>2</td><td>08:00</td>"));
    }

    #[test]
    fn bars_sorted_by_date_and_highlighted() {
        let (sleep, baths) = data();
        let mut svg = String::new();
        chart(&mut svg, &sleep, &baths, SleepMetric::TotalSleep).unwrap();
        assert_eq!(svg.matches("<rect").count(), 3);
        assert_eq!(svg.matches(BATH_COLOR).count(), 1);
        let first = svg.find("2024-01-01").unwrap();
        let second = svg.find("2024-01-02").unwrap();
        assert!(first < second);
    }

    #[test]
    fn empty_chart() {
        let mut svg = String::new();
        chart(&mut svg, &[], &[], SleepMetric::TotalSleep).unwrap();
        assert!(svg.contains("No sleep data"));
    }

    /// Stops accepting text after `limit` bytes.
    struct Full {
        written: usize,
        limit: usize,
    }

    impl fmt::Write for Full {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            self.written += s.len();
            if self.written > self.limit {
                return Err(fmt::Error);
            }
            Ok(())
        }
    }

    #[test]
    fn chart_write_errors_propagate() {
        let (sleep, baths) = data();
        let mut out = Full {
            written: 0,
            limit: 200,
        };
        assert!(chart(&mut out, &sleep, &baths, SleepMetric::TotalSleep).is_err());
    }

    #[test]
    fn page_ends_after_chart() {
        let (sleep, baths) = data();
        let html = render_report(&sleep, &baths, &ReportOptions::default()).unwrap();
        let svg_end = html.find("</svg>").unwrap();
        assert!(svg_end < html.find("<table>").unwrap());
        assert!(html.ends_with("</body></html>\n"));
    }

    #[test]
    fn title_is_escaped() {
        let options = ReportOptions {
            title: "<baths & sleep>".to_owned(),
            ..ReportOptions::default()
        };
        let html = render_report(&[], &[], &options).unwrap();
        assert!(html.contains("&lt;baths &amp; sleep&gt;"));
        assert!(!html.contains("<baths"));
    }

    #[test]
    fn write_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out").join("report.html");
        write_report(&path, "<html></html>").unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "<html></html>");
    }
}
