//! The single HTML page served at `/`.

use crate::domain::DateBounds;

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>__TITLE__</title>
<style>
  body { font-family: Arial, sans-serif; color: black; background: white; margin: 24px; }
  .pickers { display: flex; gap: 16px; align-items: center; margin-bottom: 12px; }
  #chart svg { max-width: 100%; height: auto; }
</style>
</head>
<body>
<h1>BEA: price and quantities of goods and services</h1>
<div class="pickers">
  <label for="start-date-picker">Start Date:</label>
  <input type="date" id="start-date-picker" min="__MIN__" max="__MAX__" value="__START__">
  <label for="end-date-picker">End Date:</label>
  <input type="date" id="end-date-picker" min="__MIN__" max="__MAX__" value="__END__">
</div>
<div id="chart"></div>
<script>
  const start = document.getElementById("start-date-picker");
  const end = document.getElementById("end-date-picker");
  const chart = document.getElementById("chart");

  // Each change triggers an independent request; whichever answers last is shown.
  function dateRangeChanged() {
    const params = new URLSearchParams({ start: start.value, end: end.value });
    fetch("/chart.svg?" + params.toString())
      .then((resp) => (resp.ok ? resp.text() : Promise.reject(resp.status)))
      .then((svg) => { chart.innerHTML = svg; })
      .catch(() => {});
  }

  start.addEventListener("change", dateRangeChanged);
  end.addEventListener("change", dateRangeChanged);
  dateRangeChanged();
</script>
</body>
</html>
"#;

/// Render the page with pickers bounded by `bounds`.
pub fn render_index(title: &str, bounds: &DateBounds) -> String {
    let fmt = |d: chrono::NaiveDate| d.format("%Y-%m-%d").to_string();
    TEMPLATE
        .replace("__TITLE__", &escape_html(title))
        .replace("__MIN__", &fmt(bounds.min))
        .replace("__MAX__", &fmt(bounds.max))
        .replace("__START__", &fmt(bounds.default_start))
        .replace("__END__", &fmt(bounds.default_end))
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}
