//! Batch report rendering for the command line

use std::io::Write;

use serde::Serialize;

use crate::services::QueryService;
use crate::types::{format_amount, OverviewReport, UserRollup};

/// Column widths: #(4) User(24) Count(7) Total(16) Due(16) Not due(16)
const USER_NAME_WIDTH: usize = 24;
const PRODUCT_NAME_WIDTH: usize = 28;

/// Whole-run JSON document
#[derive(Serialize)]
struct JsonOutput<'a> {
    #[serde(flatten)]
    report: &'a OverviewReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    lookup: Option<UserLookup<'a>>,
}

#[derive(Serialize)]
struct UserLookup<'a> {
    id: &'a str,
    found: bool,
    user: Option<&'a UserRollup>,
}

/// Write the overview, product rollups and top-user ranking, then the
/// optional single-user lookup.
pub fn write_report<W: Write>(
    out: &mut W,
    query: &QueryService,
    user: Option<&str>,
    json: bool,
) -> anyhow::Result<()> {
    if json {
        let output = JsonOutput {
            report: query.report(),
            lookup: user.map(|id| {
                let found = query.user(id);
                UserLookup {
                    id,
                    found: found.is_some(),
                    user: found,
                }
            }),
        };
        serde_json::to_writer_pretty(&mut *out, &output)?;
        writeln!(out)?;
        return Ok(());
    }

    write_overview(out, query)?;
    writeln!(out)?;
    write_products(out, query)?;
    writeln!(out)?;
    write_top_users(out, query)?;

    if let Some(id) = user {
        writeln!(out)?;
        match query.user(id) {
            Some(rollup) => {
                writeln!(out, "User {}", id)?;
                writeln!(out, "{}", serde_json::to_string_pretty(rollup)?)?;
            }
            None => writeln!(out, "user not found: {}", id)?,
        }
    }
    Ok(())
}

fn write_overview<W: Write>(out: &mut W, query: &QueryService) -> anyhow::Result<()> {
    let report = query.report();
    let totals = query.overview();

    writeln!(
        out,
        "Overview (as of {}, {} records)",
        report.reference_date.format("%Y-%m-%d %H:%M UTC"),
        report.record_count
    )?;
    for (label, value) in [
        ("Total subscribed", totals.total_subscribed),
        ("Total refunded", totals.total_refunded),
        ("Due, not refunded", totals.due_not_refunded),
        ("Not yet due", totals.not_due_total),
    ] {
        writeln!(out, "  {:<20}{:>18}", label, format_amount(value))?;
    }
    Ok(())
}

fn write_products<W: Write>(out: &mut W, query: &QueryService) -> anyhow::Result<()> {
    writeln!(out, "Products")?;
    writeln!(
        out,
        "  {:<width$}{:>7}{:>18}",
        "Product",
        "Count",
        "Total",
        width = PRODUCT_NAME_WIDTH
    )?;
    for product in query.products() {
        writeln!(
            out,
            "  {:<width$}{:>7}{:>18}",
            product.product,
            product.count,
            format_amount(product.total),
            width = PRODUCT_NAME_WIDTH
        )?;
    }
    Ok(())
}

fn write_top_users<W: Write>(out: &mut W, query: &QueryService) -> anyhow::Result<()> {
    let ranked = query.top_users(None);
    writeln!(out, "Top {} users", ranked.len())?;
    writeln!(
        out,
        "  {:>3} {:<width$}{:>7}{:>16}{:>16}{:>16}",
        "#",
        "User",
        "Count",
        "Total",
        "Due",
        "Not due",
        width = USER_NAME_WIDTH
    )?;
    for (rank, user) in ranked.iter().enumerate() {
        writeln!(
            out,
            "  {:>3} {:<width$}{:>7}{:>16}{:>16}{:>16}",
            rank + 1,
            user.user,
            user.count,
            format_amount(user.total),
            format_amount(user.due_not_refunded),
            format_amount(user.not_due_total),
            width = USER_NAME_WIDTH
        )?;
    }
    Ok(())
}
