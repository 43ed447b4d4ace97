use crate::models::{DashboardResponse, Entry};
use crate::tracker::TrendView;
use crate::trend::{ChartLayout, Metric};
use std::fmt::Write;

pub fn render_index(dashboard: &DashboardResponse, trend: &TrendView, entries: &[Entry]) -> String {
    let goals = &dashboard.goals;
    let today = &dashboard.today;
    let percent = &dashboard.percent;

    INDEX_HTML
        .replace("{{DATE}}", &dashboard.date.to_string())
        .replace("{{TODAY_STEPS}}", &fmt_num(today.steps))
        .replace("{{TODAY_CALORIES}}", &fmt_num(today.calories))
        .replace("{{TODAY_WORKOUTS}}", &fmt_num(today.workouts as f64))
        .replace("{{STEPS_PCT}}", &format!("{:.1}", percent.steps))
        .replace("{{CAL_PCT}}", &format!("{:.1}", percent.calories))
        .replace("{{WO_PCT}}", &format!("{:.1}", percent.workouts))
        .replace("{{GOAL_STEPS}}", &fmt_num(goals.steps))
        .replace("{{GOAL_CALORIES}}", &fmt_num(goals.calories))
        .replace("{{GOAL_WORKOUTS}}", &fmt_num(goals.workouts))
        .replace("{{GOAL_STEPS_RAW}}", &goals.steps.to_string())
        .replace("{{GOAL_CALORIES_RAW}}", &goals.calories.to_string())
        .replace("{{GOAL_WORKOUTS_RAW}}", &goals.workouts.to_string())
        .replace("{{WEEK_STEPS}}", &fmt_num(trend.totals.steps))
        .replace("{{WEEK_CALORIES}}", &fmt_num(trend.totals.calories))
        .replace("{{WEEK_WORKOUTS}}", &fmt_num(trend.totals.workouts))
        .replace("{{CHART}}", &render_chart(&trend.chart))
        .replace("{{ROWS}}", &render_rows(entries))
}

fn render_rows(entries: &[Entry]) -> String {
    if entries.is_empty() {
        return r#"<tr><td colspan="5" class="empty">Nothing logged yet.</td></tr>"#.to_string();
    }

    let mut rows = String::new();
    for entry in entries {
        let _ = write!(
            rows,
            r#"<tr data-id="{id}" data-date="{date}" data-type="{kind}" data-value="{value}" data-notes="{notes}">
  <td>{date}</td>
  <td class="cap">{kind}</td>
  <td>{shown}{suffix}</td>
  <td>{notes}</td>
  <td>
    <button class="btn ghost sm" type="button" data-edit="{id}">Edit</button>
    <button class="btn danger sm" type="button" data-del="{id}">Delete</button>
  </td>
</tr>
"#,
            id = escape_html(&entry.id),
            date = entry.date,
            kind = entry.kind,
            value = entry.value,
            shown = fmt_num(entry.value),
            suffix = entry.kind.unit_suffix(),
            notes = escape_html(&entry.notes),
        );
    }
    rows
}

fn render_chart(chart: &ChartLayout) -> String {
    let frame = chart.frame;
    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg id="weekChart" viewBox="0 0 {w} {h}" role="img" aria-label="Last 7 days">"#,
        w = frame.width,
        h = frame.height,
    );
    let _ = write!(
        svg,
        r#"<path class="chart-axis" d="M {x0:.2} {top:.2} L {x0:.2} {y0:.2} L {right:.2} {y0:.2}" />"#,
        x0 = chart.origin.x,
        y0 = chart.origin.y,
        top = frame.padding / 2.0,
        right = frame.width - frame.padding / 2.0,
    );

    for path in &chart.series {
        let color = series_color(path.metric);
        let points: Vec<String> = path
            .points
            .iter()
            .map(|point| format!("{:.2},{:.2}", point.x, point.y))
            .collect();
        let _ = write!(
            svg,
            r#"<polyline fill="none" stroke="{color}" stroke-width="2" points="{}" />"#,
            points.join(" ")
        );
        for point in &path.points {
            let _ = write!(
                svg,
                r#"<circle cx="{:.2}" cy="{:.2}" r="3" fill="{color}" />"#,
                point.x, point.y
            );
        }
    }

    for label in &chart.labels {
        let _ = write!(
            svg,
            r#"<text class="chart-label" x="{:.2}" y="{:.2}" text-anchor="middle">{}</text>"#,
            label.x,
            chart.origin.y + 16.0,
            label.text
        );
    }

    svg.push_str("</svg>");
    svg
}

fn series_color(metric: Metric) -> &'static str {
    match metric {
        Metric::Steps => "#22c55e",
        Metric::Calories => "#60a5fa",
        Metric::Workouts => "#f59e0b",
    }
}

/// Whole numbers get thousands separators; fractions keep up to two decimals.
fn fmt_num(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let rounded = (value * 100.0).round() / 100.0;
    let whole = rounded.trunc();
    let fraction = (rounded - whole).abs();

    let digits = format!("{}", whole.abs() as u64);
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    if rounded < 0.0 {
        grouped.insert(0, '-');
    }
    if fraction > 0.0 {
        let decimals = format!("{fraction:.2}");
        let decimals = decimals.trim_start_matches('0').trim_end_matches('0');
        if decimals != "." {
            grouped.push_str(decimals);
        }
    }
    grouped
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Fitness Tracker</title>
  <style>
    :root {
      --bg: #0f1320;
      --card: #171d2e;
      --ink: #e6ebf5;
      --muted: #9aa6c3;
      --line: #44506b;
      --steps: #22c55e;
      --calories: #60a5fa;
      --workouts: #f59e0b;
      --danger: #ef4444;
    }

    * { box-sizing: border-box; }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: system-ui, sans-serif;
      padding: 32px 18px 48px;
    }

    .app { width: min(960px, 100%); margin: 0 auto; display: grid; gap: 24px; }
    header { display: flex; justify-content: space-between; align-items: center; gap: 12px; }
    h1 { margin: 0; font-size: 2rem; }
    h2 { margin: 0 0 12px; font-size: 1.2rem; }
    .card { background: var(--card); border-radius: 18px; padding: 20px; }
    .grid { display: grid; grid-template-columns: repeat(auto-fit, minmax(200px, 1fr)); gap: 16px; }
    .label { font-size: 0.8rem; text-transform: uppercase; letter-spacing: 0.1em; color: var(--muted); }
    .value { font-size: 1.6rem; font-weight: 600; }
    .goal { font-size: 0.85rem; color: var(--muted); }
    .bar { height: 8px; border-radius: 999px; background: #26304a; overflow: hidden; margin-top: 8px; }
    .bar > span { display: block; height: 100%; }
    #stepsBar { background: var(--steps); }
    #calBar { background: var(--calories); }
    #woBar { background: var(--workouts); }
    form { display: grid; grid-template-columns: repeat(auto-fit, minmax(150px, 1fr)); gap: 12px; align-items: end; }
    input, select { width: 100%; padding: 10px; border-radius: 10px; border: 1px solid var(--line); background: #0f1320; color: var(--ink); }
    .btn { border: none; border-radius: 999px; padding: 10px 16px; font-weight: 600; cursor: pointer; background: var(--steps); color: #0f1320; }
    .btn.ghost { background: transparent; color: var(--ink); border: 1px solid var(--line); }
    .btn.danger { background: var(--danger); color: white; }
    .btn.sm { padding: 6px 10px; font-size: 0.8rem; }
    .actions { display: flex; flex-wrap: wrap; gap: 8px; }
    table { width: 100%; border-collapse: collapse; }
    th, td { text-align: left; padding: 8px; border-bottom: 1px solid #26304a; }
    .cap { text-transform: capitalize; }
    .empty { color: var(--muted); text-align: center; }
    #weekChart { width: 100%; height: auto; display: block; }
    .chart-axis { fill: none; stroke: var(--line); stroke-width: 1; }
    .chart-label { fill: var(--muted); font-size: 12px; }
    .legend span { margin-right: 14px; font-size: 0.85rem; }
    .status { min-height: 1.2em; color: var(--muted); }
    .status[data-type="error"] { color: var(--danger); }
    dialog { background: var(--card); color: var(--ink); border: 1px solid var(--line); border-radius: 16px; }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Fitness Tracker</h1>
      <button class="btn ghost" id="openSettings" type="button">Goals</button>
    </header>

    <section class="card">
      <h2>Log activity</h2>
      <form id="logForm">
        <label>Date<input id="date" type="date" value="{{DATE}}" /></label>
        <label>Type
          <select id="type">
            <option value="steps">Steps</option>
            <option value="calories">Calories</option>
            <option value="workout">Workout (min)</option>
          </select>
        </label>
        <label>Value<input id="value" type="number" min="0" step="any" required /></label>
        <label>Notes<input id="notes" type="text" /></label>
        <button class="btn" type="submit" id="submitBtn">Save</button>
      </form>
    </section>

    <section class="grid">
      <div class="card">
        <span class="label">Steps today</span>
        <div class="value" id="todaySteps">{{TODAY_STEPS}}</div>
        <div class="goal" id="stepsGoalText">Goal: {{GOAL_STEPS}}</div>
        <div class="bar"><span id="stepsBar" style="width: {{STEPS_PCT}}%"></span></div>
      </div>
      <div class="card">
        <span class="label">Calories today</span>
        <div class="value" id="todayCalories">{{TODAY_CALORIES}}</div>
        <div class="goal" id="calGoalText">Goal: {{GOAL_CALORIES}} kcal</div>
        <div class="bar"><span id="calBar" style="width: {{CAL_PCT}}%"></span></div>
      </div>
      <div class="card">
        <span class="label">Workouts today</span>
        <div class="value" id="todayWorkouts">{{TODAY_WORKOUTS}}</div>
        <div class="goal" id="woGoalText">Goal: {{GOAL_WORKOUTS}}</div>
        <div class="bar"><span id="woBar" style="width: {{WO_PCT}}%"></span></div>
      </div>
    </section>

    <section class="card">
      <h2>Last 7 days</h2>
      {{CHART}}
      <div class="legend">
        <span style="color: var(--steps)">Steps: <strong id="wSteps">{{WEEK_STEPS}}</strong></span>
        <span style="color: var(--calories)">Calories: <strong id="wCalories">{{WEEK_CALORIES}}</strong></span>
        <span style="color: var(--workouts)">Workouts: <strong id="wWorkouts">{{WEEK_WORKOUTS}}</strong></span>
      </div>
    </section>

    <section class="card">
      <h2>Log</h2>
      <div class="actions">
        <button class="btn ghost" id="clearToday" type="button">Clear today</button>
        <button class="btn danger" id="clearAll" type="button">Clear all</button>
        <a class="btn ghost" id="exportBtn" href="/api/export" download="fitness-tracker-export.json">Export</a>
        <button class="btn ghost" id="importBtn" type="button">Import</button>
        <input id="importFile" type="file" accept="application/json" hidden />
      </div>
      <table>
        <thead><tr><th>Date</th><th>Type</th><th>Value</th><th>Notes</th><th></th></tr></thead>
        <tbody id="logTable">
{{ROWS}}
        </tbody>
      </table>
    </section>

    <div class="status" id="status"></div>
  </main>

  <dialog id="settingsDlg">
    <h2>Daily goals</h2>
    <form id="goalsForm" method="dialog">
      <label>Steps<input id="goalSteps" type="number" min="0" value="{{GOAL_STEPS_RAW}}" /></label>
      <label>Calories<input id="goalCalories" type="number" min="0" value="{{GOAL_CALORIES_RAW}}" /></label>
      <label>Workouts<input id="goalWorkouts" type="number" min="0" value="{{GOAL_WORKOUTS_RAW}}" /></label>
      <button class="btn" id="saveGoals" type="button">Save goals</button>
    </form>
  </dialog>

  <script>
    const $ = (sel) => document.querySelector(sel);
    const form = $('#logForm');
    const statusEl = $('#status');
    let editingId = null;

    const setStatus = (message, type) => {
      statusEl.textContent = message;
      statusEl.dataset.type = type || '';
    };

    const call = async (method, url, body, raw) => {
      const res = await fetch(url, {
        method,
        headers: raw ? {} : { 'content-type': 'application/json' },
        body: body === undefined ? undefined : (raw ? body : JSON.stringify(body))
      });
      if (!res.ok) {
        throw new Error((await res.text()) || 'Request failed');
      }
      return res.status === 204 ? null : res.json();
    };

    form.addEventListener('submit', (event) => {
      event.preventDefault();
      const payload = {
        date: $('#date').value,
        type: $('#type').value,
        value: $('#value').value,
        notes: $('#notes').value
      };
      const request = editingId
        ? call('PUT', `/api/entries/${encodeURIComponent(editingId)}`, payload)
        : call('POST', '/api/entries', payload);
      request.then(() => location.reload()).catch((err) => alert(err.message));
    });

    document.querySelectorAll('[data-del]').forEach((btn) => {
      btn.addEventListener('click', () => {
        call('DELETE', `/api/entries/${encodeURIComponent(btn.dataset.del)}`)
          .then(() => location.reload())
          .catch((err) => setStatus(err.message, 'error'));
      });
    });

    document.querySelectorAll('[data-edit]').forEach((btn) => {
      btn.addEventListener('click', () => {
        const row = btn.closest('tr');
        $('#date').value = row.dataset.date;
        $('#type').value = row.dataset.type;
        $('#value').value = row.dataset.value;
        $('#notes').value = row.dataset.notes;
        editingId = row.dataset.id;
        $('#submitBtn').textContent = 'Update';
        window.scrollTo({ top: 0, behavior: 'smooth' });
      });
    });

    $('#clearAll').addEventListener('click', () => {
      if (!confirm('This will delete ALL your fitness data. Continue?')) {
        return;
      }
      call('DELETE', '/api/entries').then(() => location.reload()).catch((err) => setStatus(err.message, 'error'));
    });

    $('#clearToday').addEventListener('click', () => {
      call('POST', '/api/entries/clear-today')
        .then((res) => {
          if (res.removed === 0) {
            alert(res.message);
          } else {
            location.reload();
          }
        })
        .catch((err) => setStatus(err.message, 'error'));
    });

    $('#importBtn').addEventListener('click', () => $('#importFile').click());
    $('#importFile').addEventListener('change', async () => {
      const input = $('#importFile');
      const file = input.files[0];
      if (!file) {
        return;
      }
      try {
        const res = await call('POST', '/api/import', await file.text(), true);
        alert(res.message);
        location.reload();
      } catch (err) {
        alert(err.message);
      } finally {
        input.value = '';
      }
    });

    $('#openSettings').addEventListener('click', () => $('#settingsDlg').showModal());
    $('#saveGoals').addEventListener('click', () => {
      call('PUT', '/api/goals', {
        steps: $('#goalSteps').value,
        calories: $('#goalCalories').value,
        workouts: $('#goalWorkouts').value
      })
        .then(() => location.reload())
        .catch((err) => setStatus(err.message, 'error'));
    });
  </script>
</body>
</html>
"#;
