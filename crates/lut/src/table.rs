//! Fixed-point-indexed LUT generation
//!
//! Every entry is evaluated in f64, rounded to the table's decimal budget,
//! narrowed to BF16 and checked against the tolerance. The first entry that
//! violates the tolerance aborts the whole table.

use actlut_bf16::Bf16;
use actlut_fixed_point::Fixed;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::config::LutConfig;
use crate::error::{LutError, Result};
use crate::function::{round_decimal, TargetFunction};

/// Entry order of a generated table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableOrder {
    /// Ascending input order
    Ascending,
    /// Hardware address order: non-negative inputs ascending, a negative-zero
    /// slot, then negative inputs by ascending magnitude
    SignSplit,
}

/// The input an entry was generated for
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Sample {
    /// A point on the fixed-point grid
    Grid(Fixed),
    /// A sigmoid output `y` in (0.5, 1.0)
    Probability(f64),
    /// The explicit `-0.0` slot of a sign-split table
    NegativeZero,
}

impl Sample {
    pub fn value(&self) -> f64 {
        match self {
            Sample::Grid(point) => point.to_f64(),
            Sample::Probability(y) => *y,
            Sample::NegativeZero => -0.0,
        }
    }
}

/// One quantized table row
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TableEntry {
    pub index: usize,
    pub input: Sample,
    /// Evaluator output at full f64 precision
    pub exact: f64,
    /// `exact` rounded to the table's decimal digits; this is what gets quantized
    pub rounded: f64,
    pub quantized: Bf16,
    pub decoded: f32,
    /// `rounded - decoded`
    pub error: f64,
}

impl TableEntry {
    pub fn domain_value(&self) -> f64 {
        self.input.value()
    }

    fn negative_zero(index: usize) -> Self {
        Self {
            index,
            input: Sample::NegativeZero,
            exact: 0.0,
            rounded: 0.0,
            quantized: Bf16::ZERO,
            decoded: 0.0,
            error: 0.0,
        }
    }
}

/// A generated table; immutable once produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LutTable {
    pub config: LutConfig,
    pub order: TableOrder,
    pub tolerance: f64,
    pub entries: Vec<TableEntry>,
}

impl LutTable {
    pub fn function(&self) -> TargetFunction {
        self.config.function
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TableEntry> {
        self.entries.iter()
    }

    /// Quantized codes in table order
    pub fn codes(&self) -> Vec<Bf16> {
        self.entries.iter().map(|e| e.quantized).collect()
    }

    pub fn max_abs_error(&self) -> f64 {
        self.entries
            .iter()
            .map(|e| e.error.abs())
            .fold(0.0, f64::max)
    }
}

impl<'a> IntoIterator for &'a LutTable {
    type Item = &'a TableEntry;
    type IntoIter = std::slice::Iter<'a, TableEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Evaluate, round, quantize and validate a single entry
fn quantize_entry(
    index: usize,
    input: Sample,
    function: TargetFunction,
    digits: usize,
    tolerance: f64,
) -> Result<TableEntry> {
    let exact = function.evaluate(input.value());
    let rounded = round_decimal(exact, digits);
    let quantized = Bf16::from_f32(rounded as f32);
    let decoded = quantized.to_f32();
    let error = rounded - decoded as f64;

    // Written as !(a < b) so a NaN error also fails
    if !(error.abs() < tolerance) {
        warn!(
            function = %function,
            input = input.value(),
            rounded,
            decoded,
            error,
            tolerance,
            "quantization error exceeds tolerance"
        );
        return Err(LutError::ToleranceExceeded {
            domain_value: input.value(),
            exact_value: rounded,
            decoded_value: decoded as f64,
            error,
            tolerance,
        });
    }

    trace!(index, input = input.value(), rounded, bits = %quantized, error, "entry");
    Ok(TableEntry {
        index,
        input,
        exact,
        rounded,
        quantized,
        decoded,
        error,
    })
}

/// Generate a table in ascending input order.
///
/// Grid-indexed functions get one 0-based entry per grid point. The
/// inverse-sigmoid table samples `y = 0.5 + k * 0.5/entries` for
/// `k = 1 .. entries - 1` and numbers its entries from 1.
pub fn generate_table(config: &LutConfig) -> Result<LutTable> {
    config.validate()?;
    let tolerance = config.tolerance();
    let digits = config.rounding_digits();
    let function = config.function;

    let entries = if function.is_grid_indexed() {
        config
            .domain
            .samples()
            .map(|s| quantize_entry(s.index, Sample::Grid(s.value), function, digits, tolerance))
            .collect::<Result<Vec<_>>>()?
    } else {
        let buckets = config.sigmoid_inv_entries;
        let step = 0.5 / buckets as f64;
        (1..buckets)
            .map(|k| {
                let y = 0.5 + k as f64 * step;
                quantize_entry(k as usize, Sample::Probability(y), function, digits, tolerance)
            })
            .collect::<Result<Vec<_>>>()?
    };

    debug!(
        function = %function,
        domain = %config.domain,
        entries = entries.len(),
        tolerance,
        "generated ascending table"
    );
    Ok(LutTable {
        config: *config,
        order: TableOrder::Ascending,
        tolerance,
        entries,
    })
}

/// Generate a table in sign-split (hardware address) order.
///
/// Position `p` holds the entry whose signed-magnitude index equals `p`, so
/// the table has `2^(int_bits + frac_bits + 1)` slots including `-0.0`.
pub fn generate_sign_split(config: &LutConfig) -> Result<LutTable> {
    config.validate()?;
    if !config.function.is_grid_indexed() {
        return Err(LutError::InvalidConfig(format!(
            "{} has no fixed-point input grid to split by sign",
            config.function
        )));
    }
    let tolerance = config.tolerance();
    let digits = config.rounding_digits();
    let function = config.function;
    let domain = config.domain;

    let mut entries = Vec::with_capacity(domain.slot_count());
    for point in domain.non_negative() {
        entries.push(quantize_entry(
            entries.len(),
            Sample::Grid(point),
            function,
            digits,
            tolerance,
        )?);
    }
    entries.push(TableEntry::negative_zero(entries.len()));
    for point in domain.negative_by_magnitude() {
        entries.push(quantize_entry(
            entries.len(),
            Sample::Grid(point),
            function,
            digits,
            tolerance,
        )?);
    }

    debug!(
        function = %function,
        domain = %domain,
        entries = entries.len(),
        tolerance,
        "generated sign-split table"
    );
    Ok(LutTable {
        config: *config,
        order: TableOrder::SignSplit,
        tolerance,
        entries,
    })
}
