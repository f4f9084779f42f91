//! Shareable bill summaries.

use std::io;

use smallvec::{SmallVec, smallvec};
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};
use thiserror::Error;

use crate::{receipt::Receipt, settlement::Settlement};

/// Errors that can occur when rendering a summary.
#[derive(Debug, Error)]
pub enum SummaryError {
    /// IO error
    #[error("IO error")]
    IO,
}

/// Write the full bill as shareable text: venue metadata, an itemized
/// table, and the subtotal/service/VAT/total block.
///
/// Every amount goes through the currency formatting table, and the totals
/// are the engine-derived ones, not whatever the receipt printed.
///
/// # Errors
///
/// Returns [`SummaryError::IO`] if the summary cannot be written.
pub fn write_bill(mut out: impl io::Write, receipt: &Receipt) -> Result<(), SummaryError> {
    let info = receipt.restaurant();

    writeln!(out, "Restaurant: {}", info.name).map_err(|_err| SummaryError::IO)?;
    writeln!(out, "Table: {}", info.table_number).map_err(|_err| SummaryError::IO)?;
    writeln!(out, "Order: {}", info.order_number).map_err(|_err| SummaryError::IO)?;
    writeln!(out, "Date: {}", info.date).map_err(|_err| SummaryError::IO)?;
    writeln!(out, "Time: {}", info.time).map_err(|_err| SummaryError::IO)?;
    writeln!(out, "Waiter: {}", info.waiter).map_err(|_err| SummaryError::IO)?;

    write_item_table(&mut out, receipt)?;
    write_totals(&mut out, receipt)?;

    Ok(())
}

/// Write the group settlement view: the claimed/total header and one block
/// per participant with their claimed items at split price.
///
/// # Errors
///
/// Returns [`SummaryError::IO`] if the summary cannot be written.
pub fn write_settlement(
    mut out: impl io::Write,
    settlement: &Settlement,
) -> Result<(), SummaryError> {
    let currency = settlement.currency;

    writeln!(
        out,
        "Claimed: {} / {}",
        currency.format(settlement.claimed_total),
        currency.format(settlement.subtotal),
    )
    .map_err(|_err| SummaryError::IO)?;

    writeln!(
        out,
        "With service and VAT: {}",
        currency.format(settlement.grand_total),
    )
    .map_err(|_err| SummaryError::IO)?;

    writeln!(
        out,
        "Unclaimed: {}",
        currency.format(settlement.remaining_unclaimed),
    )
    .map_err(|_err| SummaryError::IO)?;

    for share in &settlement.shares {
        writeln!(out).map_err(|_err| SummaryError::IO)?;
        writeln!(out, "{}: {}", share.name, currency.format(share.amount))
            .map_err(|_err| SummaryError::IO)?;

        for (idx, item) in share.items.iter().enumerate() {
            writeln!(
                out,
                "  {}. {} x{} - {}",
                idx + 1,
                item.name,
                item.shares,
                currency.format(item.amount),
            )
            .map_err(|_err| SummaryError::IO)?;
        }
    }

    Ok(())
}

/// Render the bill summary to a `String`.
///
/// # Errors
///
/// Returns [`SummaryError::IO`] if rendering fails.
pub fn bill_text(receipt: &Receipt) -> Result<String, SummaryError> {
    let mut buf = Vec::new();
    write_bill(&mut buf, receipt)?;

    String::from_utf8(buf).map_err(|_err| SummaryError::IO)
}

/// Render the settlement summary to a `String`.
///
/// # Errors
///
/// Returns [`SummaryError::IO`] if rendering fails.
pub fn settlement_text(settlement: &Settlement) -> Result<String, SummaryError> {
    let mut buf = Vec::new();
    write_settlement(&mut buf, settlement)?;

    String::from_utf8(buf).map_err(|_err| SummaryError::IO)
}

fn write_item_table(out: &mut impl io::Write, receipt: &Receipt) -> Result<(), SummaryError> {
    let currency = receipt.currency();
    let mut builder = Builder::default();

    builder.push_record(["#", "Item", "Qty", "Sum"]);

    for item in receipt.items() {
        builder.push_record([
            format!("{}", item.position()),
            item.name().to_string(),
            format!("{}", item.quantity().normalize()),
            currency.format(item.sum()),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::ascii());
    table.modify(Columns::new(2..4), Alignment::right());

    writeln!(out, "\n{table}").map_err(|_err| SummaryError::IO)
}

fn write_totals(out: &mut impl io::Write, receipt: &Receipt) -> Result<(), SummaryError> {
    let currency = receipt.currency();

    let vat_label = format!("VAT ({}%):", receipt.vat().rate.normalize());
    let service_label = format!("{}:", receipt.service_charge().name);

    let lines: SmallVec<[(String, String); 4]> = smallvec![
        (
            "Subtotal:".to_string(),
            currency.format(receipt.subtotal())
        ),
        (
            service_label,
            currency.format(receipt.service_charge().amount)
        ),
        (vat_label, currency.format(receipt.vat_amount())),
        ("Total:".to_string(), currency.format(receipt.grand_total())),
    ];

    let label_width = lines
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);

    let value_width = lines
        .iter()
        .map(|(_, value)| value.chars().count())
        .max()
        .unwrap_or(0);

    writeln!(out).map_err(|_err| SummaryError::IO)?;

    for (label, value) in &lines {
        write_summary_line(out, label, value, label_width, value_width)?;
    }

    Ok(())
}

/// Writes one totals line with a right-aligned label and a fixed-width value
/// column.
fn write_summary_line(
    out: &mut impl io::Write,
    label: &str,
    value: &str,
    label_col_width: usize,
    value_col_width: usize,
) -> Result<(), SummaryError> {
    let label_pad = label_col_width.saturating_sub(label.chars().count());
    let value_pad = value_col_width.saturating_sub(value.chars().count());

    writeln!(
        out,
        "{:>label_pad$}{label}  {:>value_pad$}{value}",
        "", ""
    )
    .map_err(|_err| SummaryError::IO)
}
