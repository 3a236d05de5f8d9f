//! Table renderers
//!
//! Thin text adapters over a generated [`LutTable`]: extended tuple rows,
//! the compact index/code table, hardware initializer literals and JSON.

use std::io::Write;

use actlut_fixed_point::{Fixed, FixedPointDomain};

use crate::error::{LutError, Result};
use crate::function::TargetFunction;
use crate::table::{LutTable, Sample, TableEntry, TableOrder};

/// Integer bits of the fixed-point rendering of inverse-sigmoid values
const INVERSE_SIGMOID_INT_BITS: u8 = 3;

/// Fraction bits of the fixed-point rendering of inverse-sigmoid values
const INVERSE_SIGMOID_FRAC_BITS: u8 = 7;

/// Column header for [`tuple_row`]
pub fn tuple_header(function: TargetFunction) -> String {
    let name = function.name();
    match function {
        TargetFunction::InverseSigmoid => format!(
            "(y, index, {name}, {name}_bf16, {name}_fp3.7, {name}_bf16_float, error)"
        ),
        _ => format!("(j, index, {name}, {name}_bf16, {name}_bf16_float, error)"),
    }
}

/// `(domainValue, indexBits, value, quantizedBits, decodedValue, error)`.
///
/// Inverse-sigmoid rows carry the ordinal index and an extra 3.7
/// fixed-point column for the value.
pub fn tuple_row(entry: &TableEntry, domain: &FixedPointDomain) -> Result<String> {
    let index = match entry.input {
        Sample::Grid(point) => point.sign_magnitude_bits(domain.int_bits()),
        Sample::NegativeZero => format!(
            "1_{}.{}",
            "0".repeat(domain.int_bits() as usize),
            "0".repeat(domain.frac_bits() as usize)
        ),
        Sample::Probability(_) => entry.index.to_string(),
    };
    let row = match entry.input {
        Sample::Probability(y) => {
            let fixed = Fixed::from_f64_trunc(entry.rounded, INVERSE_SIGMOID_FRAC_BITS)?;
            format!(
                "({:.6}, {}, {:.6}, {}, {}, {:.6}, {:.4})",
                y,
                index,
                entry.rounded,
                entry.quantized,
                fixed.unsigned_bits(INVERSE_SIGMOID_INT_BITS),
                entry.decoded,
                entry.error
            )
        }
        _ => format!(
            "({:.6}, {}, {:.6}, {}, {:.6}, {:.4})",
            entry.domain_value(),
            index,
            entry.rounded,
            entry.quantized,
            entry.decoded,
            entry.error
        ),
    };
    Ok(row)
}

/// `(compactIndex, quantizedBits)` rows for a grid-indexed table
pub fn simple_row(entry: &TableEntry, int_bits: u8) -> Option<String> {
    match entry.input {
        Sample::Grid(point) => Some(format!(
            "({}, {})",
            point.sign_magnitude_compact(int_bits),
            entry.quantized
        )),
        _ => None,
    }
}

/// One hardware initializer literal: `"b0011111110000000".U,`
pub fn literal(entry: &TableEntry) -> String {
    format!("\"b{}\".U,", entry.quantized)
}

/// Write the header and every tuple row
pub fn write_tuple_rows<W: Write>(out: &mut W, table: &LutTable) -> Result<()> {
    writeln!(out, "{}", tuple_header(table.function()))?;
    for entry in table {
        writeln!(out, "{}", tuple_row(entry, &table.config.domain)?)?;
    }
    Ok(())
}

/// Write the compact `(index, bits)` table; ascending grid tables only, since
/// the negative-zero slot of a sign-split table has no grid index
pub fn write_simple_rows<W: Write>(out: &mut W, table: &LutTable) -> Result<()> {
    if !table.function().is_grid_indexed() {
        return Err(LutError::InvalidConfig(format!(
            "{} tables have no fixed-point index column",
            table.function()
        )));
    }
    if table.order != TableOrder::Ascending {
        return Err(LutError::InvalidConfig(
            "simple rows require an ascending table; use literals for address order"
                .to_string(),
        ));
    }
    let int_bits = table.config.domain.int_bits();
    let name = table.function().name();
    writeln!(out, "(index, {name}_bf16)")?;
    for row in table.iter().filter_map(|e| simple_row(e, int_bits)) {
        writeln!(out, "{}", row)?;
    }
    Ok(())
}

/// Write one literal per line; the table must be in sign-split order so the
/// line number is the hardware address
pub fn write_literals<W: Write>(out: &mut W, table: &LutTable) -> Result<()> {
    if table.order != TableOrder::SignSplit {
        return Err(LutError::InvalidConfig(
            "hardware literals require a sign-split table".to_string(),
        ));
    }
    for entry in table {
        writeln!(out, "{}", literal(entry))?;
    }
    Ok(())
}

/// Write the table as pretty JSON
pub fn write_json<W: Write>(out: &mut W, table: &LutTable) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, table)?;
    writeln!(out)?;
    Ok(())
}

/// Write `(value, s_iii.ffff)` for every grid point of a domain
pub fn write_indices<W: Write>(out: &mut W, domain: &FixedPointDomain) -> Result<()> {
    for point in domain.grid() {
        writeln!(
            out,
            "({}, {})",
            point.to_f64(),
            point.sign_magnitude_bits(domain.int_bits())
        )?;
    }
    Ok(())
}
