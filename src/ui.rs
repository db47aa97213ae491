//! Server-rendered listing page: a static shell filled in with escaped
//! rows, sharing the store query (and its clamping) with the JSON API.

use std::fmt::Write;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::Html,
};

use crate::{error::ApiError, routes::ListParams, state::AppState, store::model::Restaurant};

const PAGE_SHELL: &str = include_str!("ui/page.html");
const BOROUGHS: [&str; 5] = ["Bronx", "Brooklyn", "Manhattan", "Queens", "Staten Island"];
const UI_MAX_PER_PAGE: i64 = 50;

pub async fn restaurants_page(
    State(state): State<Arc<AppState>>,
    Query(params): Query<ListParams>,
) -> Result<Html<String>, ApiError> {
    let page = params.page.unwrap_or(1).max(1);
    let per_page = params.per_page.unwrap_or(10).clamp(1, UI_MAX_PER_PAGE);
    let borough = params
        .borough
        .as_deref()
        .map(str::trim)
        .filter(|b| !b.is_empty());

    let restaurants = state.store.list(page, per_page, borough).await?;
    Ok(Html(render_page(page, per_page, borough, &restaurants)))
}

fn render_page(
    page: i64,
    per_page: i64,
    borough: Option<&str>,
    restaurants: &[Restaurant],
) -> String {
    let mut rows = String::new();
    for restaurant in restaurants {
        let grades = restaurant
            .grades
            .iter()
            .filter_map(|g| g.grade.as_deref())
            .collect::<Vec<_>>()
            .join(", ");
        let _ = writeln!(
            rows,
            "      <tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&restaurant.name),
            escape_html(restaurant.borough.as_deref().unwrap_or("")),
            escape_html(restaurant.cuisine.as_deref().unwrap_or("")),
            escape_html(&grades),
        );
    }
    if restaurants.is_empty() {
        rows.push_str("      <tr><td colspan=\"4\">No restaurants found.</td></tr>\n");
    }

    let mut options = String::new();
    for name in BOROUGHS {
        let selected = if borough == Some(name) { " selected" } else { "" };
        let _ = writeln!(
            options,
            "        <option value=\"{name}\"{selected}>{name}</option>"
        );
    }

    let borough_query = borough
        .map(|b| format!("&amp;borough={}", encode_query(b)))
        .unwrap_or_default();

    PAGE_SHELL
        .replace("{{rows}}", rows.trim_end())
        .replace("{{borough_options}}", options.trim_end())
        .replace("{{page}}", &page.to_string())
        .replace("{{per_page}}", &per_page.to_string())
        .replace("{{prev_page}}", &(page - 1).max(1).to_string())
        .replace("{{next_page}}", &(page + 1).to_string())
        .replace("{{borough_query}}", &borough_query)
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
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

// Minimal percent-encoding for the query-string values we emit.
fn encode_query(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            _ => {
                let _ = write!(out, "%{byte:02X}");
            }
        }
    }
    out
}
