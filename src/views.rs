//! Server-rendered HTML pages.

use crate::dashboard::{Snapshot, REFRESH_INTERVAL};
use crate::models::Occupancy;

// ---

/// Outcome of a prediction shown under the form.
#[derive(Debug, Clone, PartialEq)]
pub struct Confirmation {
    pub occupancy: Occupancy,
    pub timestamp: String,
    /// Whether the reading reached the store.
    pub saved: bool,
}

const PAGE_STYLE: &str = r#"
body { font-family: 'Segoe UI', Arial, sans-serif; padding: 10px 100px; color: #2c3e50; }
h1 { font-size: 24px; text-align: center; font-weight: bold; margin-bottom: 30px; }
form { display: grid; grid-template-columns: 160px 240px; gap: 10px; justify-content: center; }
button { margin-top: 20px; padding: 12px; background-color: #4CAF50; color: white; border: none; border-radius: 6px; font-size: 16px; cursor: pointer; }
.result { margin: 30px auto; width: 420px; padding: 12px; border-radius: 7px; background-color: #E6FFE6; text-align: center; }
.warning { color: #b03a2e; }
.metrics { display: flex; justify-content: center; gap: 50px; }
.metric { border-radius: 7px; padding: 10px; background-color: #E6FFE6; font-size: 18px; text-align: center; width: 20%; }
.charts { display: flex; justify-content: center; gap: 50px; }
.charts > div { width: 50%; }
"#;

const FORM_FIELDS: [(&str, &str); 5] = [
    ("temperature", "Temperatura (°C)"),
    ("humidity", "Umidade (%)"),
    ("light", "Luminosidade"),
    ("co2", "CO2 (ppm)"),
    ("humidity_ratio", "Razão de umidade"),
];

fn page_head(title: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"pt-BR\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{title}</title>\n<style>{PAGE_STYLE}</style>\n"
    )
}

/// Prediction form, with the last result when there is one.
pub fn index_page(confirmation: Option<&Confirmation>) -> String {
    // ---
    let mut html = page_head("Detecção de ocupação");
    html.push_str("</head>\n<body>\n<h1>Realizar Predição</h1>\n");
    html.push_str("<form method=\"post\" action=\"/\">\n");
    for (name, label) in FORM_FIELDS {
        html.push_str(&format!(
            "<label for=\"{name}\">{label}</label>\
             <input id=\"{name}\" name=\"{name}\" type=\"number\" step=\"any\" required>\n"
        ));
    }
    html.push_str("<button type=\"submit\">Prever</button>\n</form>\n");

    if let Some(c) = confirmation {
        html.push_str("<div class=\"result\">\n");
        html.push_str(&format!(
            "<p>Ocupação prevista: <strong id=\"occupancy\">{}</strong> ({})</p>\n",
            c.occupancy.as_u8(),
            c.occupancy.label()
        ));
        html.push_str(&format!(
            "<p>Data/hora: <span id=\"timestamp\">{}</span></p>\n",
            c.timestamp
        ));
        if c.saved {
            html.push_str("<p id=\"saved\">Registro salvo.</p>\n");
        } else {
            html.push_str(
                "<p id=\"not-saved\" class=\"warning\">Previsão realizada, mas o registro não foi salvo.</p>\n",
            );
        }
        html.push_str("</div>\n");
    }

    html.push_str("<p><a href=\"/dashboard/\">Dashboard</a></p>\n</body>\n</html>\n");
    html
}

const DASHBOARD_SCRIPT: &str = r#"
let inFlight = false;

function render(snapshot) {
  const m = snapshot.summary.metrics;
  document.getElementById('metric-total').textContent = 'Total de registros: ' + m.total;
  document.getElementById('metric-occupied').textContent = 'Ambientes ocupados: ' + m.occupied;
  document.getElementById('metric-unoccupied').textContent = 'Ambientes desocupados: ' + m.unoccupied;
  Plotly.react('graficoOcupacao', snapshot.charts.occupancy.data, snapshot.charts.occupancy.layout);
  Plotly.react('graficoTurnos', snapshot.charts.shifts.data, snapshot.charts.shifts.layout);
  Plotly.react('graficoMediaVariaveis', snapshot.charts.means.data, snapshot.charts.means.layout);
}

async function refresh() {
  if (inFlight) return;
  inFlight = true;
  try {
    const response = await fetch('/dashboard/data');
    render(await response.json());
  } catch (e) {
    console.error('dashboard refresh failed', e);
  } finally {
    inFlight = false;
  }
}
"#;

/// Dashboard page, pre-rendered from `snapshot` and refreshed in the browser.
pub fn dashboard_page(snapshot: &Snapshot) -> String {
    // ---
    let m = &snapshot.summary.metrics;
    let initial = serde_json::to_string(snapshot)
        .unwrap_or_else(|_| "null".to_string())
        .replace("</", "<\\/");

    let mut html = page_head("Dashboard - Índices de ocupação dos ambientes");
    html.push_str("<script src=\"https://cdn.plot.ly/plotly-2.35.2.min.js\"></script>\n");
    html.push_str("</head>\n<body>\n");
    html.push_str("<h1>Dashboard - Índices de ocupação dos ambientes</h1>\n");
    html.push_str("<div class=\"metrics\">\n");
    html.push_str(&format!(
        "<div class=\"metric\" id=\"metric-total\">Total de registros: {}</div>\n",
        m.total
    ));
    html.push_str(&format!(
        "<div class=\"metric\" id=\"metric-occupied\">Ambientes ocupados: {}</div>\n",
        m.occupied
    ));
    html.push_str(&format!(
        "<div class=\"metric\" id=\"metric-unoccupied\">Ambientes desocupados: {}</div>\n",
        m.unoccupied
    ));
    html.push_str("</div>\n<div class=\"charts\">\n");
    html.push_str("<div id=\"graficoOcupacao\"></div>\n<div id=\"graficoTurnos\"></div>\n");
    html.push_str("</div>\n<div id=\"graficoMediaVariaveis\"></div>\n");
    html.push_str("<script>\n");
    html.push_str(DASHBOARD_SCRIPT);
    html.push_str(&format!("render({initial});\n"));
    html.push_str(&format!(
        "setInterval(refresh, {});\n",
        REFRESH_INTERVAL.as_millis()
    ));
    html.push_str("</script>\n</body>\n</html>\n");
    html
}
