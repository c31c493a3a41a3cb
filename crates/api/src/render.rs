//! HTML for the form and results pages. The pages are small enough that
//! escaped string building beats pulling in a template engine.

use stockcast_core::pipeline::ForecastReport;
use stockcast_core::series::PriceColumn;

pub fn index_page(companies: &[&str]) -> String {
    let mut options = String::new();
    for ticker in companies {
        let t = escape(ticker);
        options.push_str(&format!("        <option value=\"{t}\">{t}</option>\n"));
    }

    let mut columns = String::new();
    for column in PriceColumn::ALL {
        let label = column.label();
        let selected = if label == "Close" { " selected" } else { "" };
        columns.push_str(&format!(
            "        <option value=\"{label}\"{selected}>{label}</option>\n"
        ));
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Stock Forecast</title>
  <style>
    body {{ font-family: sans-serif; max-width: 40rem; margin: 2rem auto; }}
    label {{ display: block; margin-top: 0.8rem; }}
    input, select {{ padding: 0.3rem; }}
    button {{ margin-top: 1.2rem; padding: 0.5rem 1.5rem; }}
    .orders input {{ width: 4rem; }}
  </style>
</head>
<body>
  <h1>Stock Forecast</h1>
  <form action="/forecast" method="post">
    <label>Ticker
      <select name="ticker">
{options}      </select>
    </label>
    <label>Start date <input type="date" name="start" value="2020-01-01" required></label>
    <label>End date <input type="date" name="end" value="2020-06-01" required></label>
    <label>Column
      <select name="column">
{columns}      </select>
    </label>
    <label>Forecast days <input type="number" name="forecast_days" value="30" min="0" required></label>
    <div class="orders">
      <label>p <input type="number" name="p" value="1" min="0" required></label>
      <label>d <input type="number" name="d" value="1" min="0" required></label>
      <label>q <input type="number" name="q" value="1" min="0" required></label>
      <label>Seasonal period <input type="number" name="seasonal_p" value="12" min="0" required></label>
    </div>
    <button type="submit">Forecast</button>
  </form>
</body>
</html>
"#
    )
}

pub fn result_page(report: &ForecastReport) -> String {
    let stationarity = if report.is_stationary {
        format!("Stationary (ADF p = {:.4})", report.adf_p_value)
    } else {
        format!("Not stationary (ADF p = {:.4})", report.adf_p_value)
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>{ticker} Forecast</title>
  <style>
    body {{ font-family: sans-serif; max-width: 60rem; margin: 2rem auto; }}
    pre {{ background: #f4f4f4; padding: 1rem; overflow-x: auto; }}
    .meta {{ color: #444; }}
  </style>
</head>
<body>
  <h1>{ticker} forecast</h1>
  <p class="meta">{column} from {start} to {end}</p>
  <p>{stationarity}</p>
  <p>Seasonal strength: {strength:.2}</p>
  <div>
{chart}
  </div>
  <h2>Model summary</h2>
  <pre>{summary}</pre>
  <p><a href="/">Back</a></p>
</body>
</html>
"#,
        ticker = escape(&report.ticker),
        column = report.column_label,
        start = report.start,
        end = report.end,
        stationarity = stationarity,
        strength = report.seasonal_strength,
        chart = report.chart_svg,
        summary = escape(&report.summary),
    )
}

pub fn error_page(message: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Forecast failed</title>
</head>
<body>
  <h1>Forecast failed</h1>
  <p>{}</p>
  <p><a href="/">Back</a></p>
</body>
</html>
"#,
        escape(message)
    )
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn index_lists_every_company_and_column() {
        let page = index_page(&["AAPL", "MSFT"]);
        assert!(page.contains("<option value=\"AAPL\">AAPL</option>"));
        assert!(page.contains("<option value=\"MSFT\">MSFT</option>"));
        assert!(page.contains("<option value=\"Adj Close\">Adj Close</option>"));
        assert!(page.contains("<option value=\"Close\" selected>Close</option>"));
        assert!(page.contains("action=\"/forecast\""));
        assert!(page.contains("name=\"seasonal_p\""));
    }

    #[test]
    fn result_embeds_chart_and_summary() {
        let report = ForecastReport {
            ticker: "AAPL".to_string(),
            start: NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
            end: NaiveDate::from_ymd_opt(2020, 6, 1).unwrap(),
            column_label: "Close",
            is_stationary: false,
            adf_p_value: 0.3121,
            seasonal_strength: 0.42,
            forecast: vec![],
            chart_svg: "<svg data-test=\"chart\"></svg>".to_string(),
            summary: "SARIMA Results\ncoef < 1".to_string(),
        };

        let page = result_page(&report);
        assert!(page.contains("<svg data-test=\"chart\"></svg>"));
        assert!(page.contains("Not stationary (ADF p = 0.3121)"));
        assert!(page.contains("Seasonal strength: 0.42"));
        // Summary text is escaped, the chart markup is not.
        assert!(page.contains("coef &lt; 1"));
    }

    #[test]
    fn user_input_is_escaped() {
        let page = error_page("<script>alert(1)</script>");
        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;"));
    }
}
