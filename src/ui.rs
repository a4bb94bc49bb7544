use crate::form::FormState;
use crate::format::{currency, payment, percent};
use crate::list::ListState;
use crate::models::{AmortizationEntry, Field, LoanScenario};
use serde::Deserialize;

/// The two top-level views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    Home,
    Saved,
}

impl Tab {
    pub fn slug(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Saved => "saved",
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Saved => "/saved",
        }
    }
}

pub fn render_home(form: &FormState, list: &ListState) -> String {
    let mut content = render_form(form);
    content.push_str(&render_list(Tab::Home, list, false));
    render_page(Tab::Home, &content, &render_overlays(Tab::Home, list))
}

pub fn render_saved(list: &ListState, allow_delete: bool) -> String {
    let content = render_list(Tab::Saved, list, allow_delete);
    render_page(Tab::Saved, &content, &render_overlays(Tab::Saved, list))
}

fn render_page(active: Tab, content: &str, overlays: &str) -> String {
    let nav_class = |tab: Tab| if tab == active { "active" } else { "" };
    PAGE_HTML
        .replace("{{HOME_CLASS}}", nav_class(Tab::Home))
        .replace("{{SAVED_CLASS}}", nav_class(Tab::Saved))
        .replace("{{OVERLAYS}}", overlays)
        .replace("{{CONTENT}}", content)
}

fn render_form(form: &FormState) -> String {
    let disabled = if form.is_busy() { " disabled" } else { "" };
    let mut html = String::from(r#"<section class="card"><form method="post" action="/calculate">"#);

    for (field, name, label, placeholder, value) in [
        (Field::Amount, "amount", "Loan Amount", "250,000", &form.amount),
        (Field::Apr, "apr", "Interest Rate (APR)", "5.5", &form.apr),
        (Field::Term, "term", "Loan Term (Months)", "360", &form.term),
    ] {
        html.push_str(&format!(
            r#"<label for="{name}">{label}</label><input type="text" inputmode="decimal" id="{name}" name="{name}" value="{value}" placeholder="{placeholder}"{disabled} />"#,
            value = escape(value),
        ));
        if let Some(message) = form.errors.get(field) {
            html.push_str(&format!(r#"<p class="field-error">{}</p>"#, escape(message)));
        }
    }

    if let Some(message) = form.errors.get(Field::Server) {
        html.push_str(&format!(r#"<div class="error">{}</div>"#, escape(message)));
    }

    let label = if form.is_busy() { "Calculating..." } else { "Calculate &amp; Save" };
    html.push_str(&format!(
        r#"<button type="submit" name="action" value="save"{disabled}>{label}</button><button type="submit" name="action" value="preview" class="secondary"{disabled}>Preview only</button></form>"#
    ));

    let (monthly, schedule) = match &form.result {
        Some(result) => (Some(result.monthly_payment), result.schedule_preview.as_slice()),
        None => (None, &[][..]),
    };
    html.push_str(&render_payment_card(monthly, schedule));
    html.push_str("</section>");
    html
}

fn render_payment_card(monthly_payment: Option<f64>, schedule: &[AmortizationEntry]) -> String {
    let mut html = format!(
        r#"<div class="results"><div class="results-title">Monthly Payment</div><div class="monthly-payment">{}</div>"#,
        payment(monthly_payment)
    );

    let rows = &schedule[..schedule.len().min(crate::models::PREVIEW_MONTHS)];
    if !rows.is_empty() {
        html.push_str(
            "<h3>Amortization Schedule Preview</h3><table class=\"amortization\"><thead><tr><th>Month</th><th>Interest Paid</th><th>Principal Paid</th><th>Remaining Balance</th></tr></thead><tbody>",
        );
        for entry in rows {
            html.push_str(&format!(
                "<tr><td>Month {}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                entry.month,
                currency(entry.interest_paid, 2),
                currency(entry.principal_paid, 2),
                currency(entry.remaining_balance, 2),
            ));
        }
        html.push_str("</tbody></table>");
    }
    html.push_str("</div>");
    html
}

fn render_list(tab: Tab, list: &ListState, allow_delete: bool) -> String {
    let mut html = String::from(r#"<section class="card"><h2>Saved Scenarios</h2>"#);

    if let Some(error) = &list.error {
        html.push_str(&format!(r#"<div class="error">{}</div>"#, escape(error)));
    }

    if list.loans.is_empty() {
        let message = if list.loading { "Loading saved loans..." } else { "No saved loans yet." };
        html.push_str(&format!(r#"<p class="empty">{message}</p></section>"#));
        return html;
    }

    html.push_str(
        "<table class=\"loans\"><thead><tr><th>Loan Amount</th><th>APR</th><th>Term</th><th>Monthly Payment</th><th></th></tr></thead><tbody>",
    );
    let slug = tab.slug();
    let view_disabled = if list.viewing { " disabled" } else { "" };
    for loan in &list.loans {
        let id = escape(&loan.id.path_segment());
        html.push_str(&format!(
            r#"<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td><form method="post" action="/{slug}/scenarios/{id}/view"><button type="submit"{view_disabled}>View</button></form>"#,
            currency(loan.amount, 0),
            percent(loan.apr),
            loan.term_months,
            currency(loan.monthly_payment, 2),
        ));
        if allow_delete {
            html.push_str(&format!(
                r#"<form method="post" action="/{slug}/scenarios/{id}/delete"><button type="submit" class="danger">Delete</button></form>"#
            ));
        }
        html.push_str("</td></tr>");
    }
    html.push_str("</tbody></table></section>");
    html
}

fn render_overlays(tab: Tab, list: &ListState) -> String {
    let slug = tab.slug();
    if list.pending_delete_id.is_some() {
        return format!(
            r#"<div class="overlay"><div class="modal"><h3>Delete this scenario?</h3><p>This cannot be undone.</p><form method="post" action="/{slug}/delete/confirm"><button type="submit" class="danger">Delete</button></form><form method="post" action="/{slug}/delete/cancel"><button type="submit" class="secondary">Cancel</button></form></div></div>"#
        );
    }
    match list.open_detail() {
        Some(scenario) => render_detail(slug, scenario),
        None => String::new(),
    }
}

fn render_detail(slug: &str, scenario: &LoanScenario) -> String {
    format!(
        r#"<div class="overlay"><div class="modal"><form method="post" action="/{slug}/modal/close"><button type="submit" class="close" aria-label="Close">&times;</button></form><h3>Loan Details</h3><p>{} at {}% APR for {} months</p>{}</div></div>"#,
        currency(scenario.amount, 0),
        scenario.apr,
        scenario.term_months,
        render_payment_card(Some(scenario.monthly_payment), &scenario.schedule_preview),
    )
}

fn escape(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            '{' => escaped.push_str("&#123;"),
            '}' => escaped.push_str("&#125;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Loan Scenario Calculator</title>
  <style>
    body { margin: 0; font-family: "Trebuchet MS", sans-serif; background: #f4f6f8; color: #1f2933; }
    header { display: flex; justify-content: space-between; align-items: center; padding: 16px 32px; background: #1f3a5f; color: #fff; }
    header nav a { color: #cbd5e1; margin-left: 20px; text-decoration: none; }
    header nav a.active { color: #fff; font-weight: 600; }
    main { max-width: 960px; margin: 24px auto; display: grid; gap: 24px; padding: 0 16px; }
    .card { background: #fff; border-radius: 12px; padding: 24px; box-shadow: 0 8px 24px rgba(31, 58, 95, 0.08); }
    label { display: block; margin-top: 12px; font-weight: 600; }
    input { width: 100%; padding: 8px; margin-top: 4px; box-sizing: border-box; }
    button { margin-top: 16px; margin-right: 8px; padding: 8px 16px; border: 0; border-radius: 6px; background: #1f3a5f; color: #fff; cursor: pointer; }
    button.secondary { background: #e2e8f0; color: #1f2933; }
    button.danger { background: #b91c1c; }
    button[disabled] { opacity: 0.6; cursor: default; }
    td form { display: inline; }
    table { width: 100%; border-collapse: collapse; margin-top: 12px; }
    th, td { text-align: left; padding: 6px 8px; border-bottom: 1px solid #e2e8f0; }
    .monthly-payment { font-size: 2rem; font-weight: 700; }
    .results { margin-top: 24px; }
    .field-error { color: #b91c1c; margin: 4px 0 0; font-size: 0.875rem; }
    .error { margin: 12px 0; padding: 12px; background: #fef2f2; border: 1px solid #fca5a5; border-radius: 4px; color: #991b1b; }
    .empty { color: #64748b; }
    .overlay { position: fixed; inset: 0; background: rgba(15, 23, 42, 0.5); display: grid; place-items: center; }
    .modal { background: #fff; border-radius: 12px; padding: 24px; width: min(720px, 92vw); max-height: 90vh; overflow: auto; }
    .modal form { display: inline; }
    .close { float: right; margin: 0; background: transparent; color: #1f2933; font-size: 1.5rem; }
  </style>
</head>
<body>
  <header>
    <span>Loan Scenario Calculator</span>
    <nav>
      <a href="/" class="{{HOME_CLASS}}">Home</a>
      <a href="/saved" class="{{SAVED_CLASS}}">Saved Scenarios</a>
    </nav>
  </header>
  <main>
    {{CONTENT}}
  </main>
  {{OVERLAYS}}
</body>
</html>
"#;
