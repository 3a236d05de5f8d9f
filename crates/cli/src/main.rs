//! actlut CLI
//!
//! Generates BF16 activation lookup tables and runs the supporting error
//! analyses.
//!
//! # Usage
//!
//! ```bash
//! # SiLU table over the 2.4 grid
//! actlut table --function silu
//!
//! # Hardware initializer literals for a 3.5 GELU table
//! actlut literals --function gelu --int-bits 3 --frac-bits 5
//!
//! # MSE of every standard shape
//! actlut mse --function silu --sweep
//! ```
//!
//! Logging goes to stderr and is controlled with `RUST_LOG`.

use std::io::{self, Write};

use actlut_bf16::{average_ulp, segment_ulps, Bf16};
use actlut_fixed_point::FixedPointDomain;
use actlut_lut::{
    emit, generate_sign_split, generate_table, mse, pwl, LutConfig, TargetFunction,
    DEFAULT_SIGMOID_INV_ENTRIES, STANDARD_SHAPES,
};
use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "actlut")]
#[command(version)]
#[command(about = "BF16 lookup tables for fixed-point-indexed activation functions")]
#[command(long_about = r#"
actlut

Generates BF16 lookup tables for SiLU, tanh, GELU and inverse sigmoid over a
signed fixed-point input grid, checks every entry against a quantization
error tolerance and renders the result as text rows, hardware literals or
JSON.

Examples:
  # Default SiLU table (2 integer bits, 4 fraction bits)
  actlut table

  # Compact index/code table for tanh
  actlut table -f tanh --format simple

  # Decode a BF16 bit pattern
  actlut bf16 to-float 0011111110000000
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a generated table
    Table {
        #[command(flatten)]
        table: TableArgs,

        /// Output format
        #[arg(long, value_enum, default_value = "rows")]
        format: OutputFormat,

        /// Emit in hardware address order instead of ascending input order
        #[arg(long, default_value = "false")]
        sign_split: bool,
    },

    /// Print sign-split hardware initializer literals, one per address
    Literals {
        #[command(flatten)]
        table: TableArgs,
    },

    /// Print every grid value with its signed-magnitude index bits
    Indices {
        /// Integer bits of the input grid
        #[arg(short, long, default_value = "2")]
        int_bits: u8,

        /// Fraction bits of the input grid
        #[arg(short = 'b', long, default_value = "4")]
        frac_bits: u8,
    },

    /// BF16 codec conversions
    Bf16 {
        #[command(subcommand)]
        command: Bf16Command,
    },

    /// Mean squared error of the LUT-backed approximation
    Mse {
        /// Target function
        #[arg(short, long, default_value = "silu")]
        function: TargetFunction,

        /// Integer bits of the input grid
        #[arg(short, long, default_value = "2")]
        int_bits: u8,

        /// Fraction bits of the input grid
        #[arg(short = 'b', long, default_value = "4")]
        frac_bits: u8,

        /// Lower end of the test range
        #[arg(long, default_value = "-6.0", allow_hyphen_values = true)]
        test_min: f64,

        /// Upper end of the test range (inclusive)
        #[arg(long, default_value = "6.0", allow_hyphen_values = true)]
        test_max: f64,

        /// Measure every standard shape instead of one
        #[arg(long, default_value = "false")]
        sweep: bool,

        /// Also report the hard-swish baseline (silu only)
        #[arg(long, default_value = "false")]
        baseline: bool,

        /// Print reports as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Piecewise-linear sigmoid coefficients
    Pwl {
        /// Print segments as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// BF16 unit-in-last-place per exponent segment
    Ulp {
        /// Exclusive upper exponent; 2 covers every segment below 4.0
        #[arg(long, default_value = "2", allow_hyphen_values = true)]
        max_exponent: i32,
    },
}

#[derive(Subcommand)]
enum Bf16Command {
    /// Decode 16 bits (binary, or hex with a 0x prefix) to a float
    ToFloat { bits: String },

    /// Encode a float with round-to-nearest-even
    ToBf16 {
        #[arg(allow_hyphen_values = true)]
        value: f32,
    },
}

#[derive(Args)]
struct TableArgs {
    /// Target function (silu, tanh, gelu, sigmoidInv)
    #[arg(short, long, default_value = "silu")]
    function: TargetFunction,

    /// Integer bits of the input grid
    #[arg(short, long, default_value = "2")]
    int_bits: u8,

    /// Fraction bits of the input grid
    #[arg(short = 'b', long, default_value = "4")]
    frac_bits: u8,

    /// Override the shape-derived error tolerance
    #[arg(short, long)]
    tolerance: Option<f64>,

    /// Output buckets of the inverse-sigmoid table
    #[arg(long, default_value_t = DEFAULT_SIGMOID_INV_ENTRIES)]
    sigmoid_inv_entries: u32,
}

impl TableArgs {
    fn config(&self) -> Result<LutConfig> {
        let domain = FixedPointDomain::new(self.int_bits, self.frac_bits)?;
        let mut config = LutConfig::new(self.function, domain)
            .with_sigmoid_inv_entries(self.sigmoid_inv_entries);
        if let Some(tolerance) = self.tolerance {
            config = config.with_tolerance(tolerance);
        }
        Ok(config)
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// `(j, index, value, bits, decoded, error)` rows
    Rows,
    /// `(index, bits)` rows
    Simple,
    /// The whole table as JSON
    Json,
}

fn main() -> Result<()> {
    // Initialize logging; stdout carries the table output
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "actlut=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Table {
            table,
            format,
            sign_split,
        } => {
            run_table(&mut out, &table, format, sign_split)?;
        }
        Commands::Literals { table } => {
            run_literals(&mut out, &table)?;
        }
        Commands::Indices {
            int_bits,
            frac_bits,
        } => {
            let domain = FixedPointDomain::new(int_bits, frac_bits)?;
            info!(%domain, points = domain.point_count(), "listing grid indices");
            emit::write_indices(&mut out, &domain)?;
        }
        Commands::Bf16 { command } => {
            run_bf16(&mut out, command)?;
        }
        Commands::Mse {
            function,
            int_bits,
            frac_bits,
            test_min,
            test_max,
            sweep,
            baseline,
            json,
        } => {
            let shapes = if sweep {
                STANDARD_SHAPES.to_vec()
            } else {
                vec![(int_bits, frac_bits)]
            };
            run_mse(&mut out, function, &shapes, test_min, test_max, baseline, json)?;
        }
        Commands::Pwl { json } => {
            run_pwl(&mut out, json)?;
        }
        Commands::Ulp { max_exponent } => {
            run_ulp(&mut out, max_exponent)?;
        }
    }

    out.flush()?;
    Ok(())
}

fn run_table<W: Write>(
    out: &mut W,
    args: &TableArgs,
    format: OutputFormat,
    sign_split: bool,
) -> Result<()> {
    let config = args.config()?;
    info!(
        function = %config.function,
        domain = %config.domain,
        tolerance = config.tolerance(),
        sign_split,
        "generating table"
    );

    let table = if sign_split {
        generate_sign_split(&config)?
    } else {
        generate_table(&config)?
    };

    match format {
        OutputFormat::Rows => emit::write_tuple_rows(out, &table)?,
        OutputFormat::Simple => emit::write_simple_rows(out, &table)?,
        OutputFormat::Json => emit::write_json(out, &table)?,
    }

    info!(
        entries = table.len(),
        max_abs_error = table.max_abs_error(),
        "table complete"
    );
    Ok(())
}

fn run_literals<W: Write>(out: &mut W, args: &TableArgs) -> Result<()> {
    let config = args.config()?;
    info!(
        function = %config.function,
        domain = %config.domain,
        slots = config.domain.slot_count(),
        "generating hardware literals"
    );
    let table = generate_sign_split(&config)?;
    emit::write_literals(out, &table)?;
    Ok(())
}

fn parse_bits(bits: &str) -> Result<Bf16> {
    if let Some(hex) = bits.strip_prefix("0x").or_else(|| bits.strip_prefix("0X")) {
        let code = u16::from_str_radix(hex, 16)
            .with_context(|| format!("invalid hex BF16 pattern: {}", bits))?;
        return Ok(Bf16::from_bits(code));
    }
    match Bf16::from_bit_string(bits) {
        Some(code) => Ok(code),
        None => bail!("expected 16 binary digits or a 0x-prefixed hex code, got {:?}", bits),
    }
}

fn run_bf16<W: Write>(out: &mut W, command: Bf16Command) -> Result<()> {
    match command {
        Bf16Command::ToFloat { bits } => {
            let code = parse_bits(&bits)?;
            writeln!(out, "{} {:#06x} {}", code, code.to_bits(), code.to_f32())?;
        }
        Bf16Command::ToBf16 { value } => {
            let code = Bf16::from_f32(value);
            writeln!(
                out,
                "{} {:#06x} {:.6}",
                code,
                code.to_bits(),
                code.to_f32()
            )?;
        }
    }
    Ok(())
}

fn run_mse<W: Write>(
    out: &mut W,
    function: TargetFunction,
    shapes: &[(u8, u8)],
    test_min: f64,
    test_max: f64,
    baseline: bool,
    json: bool,
) -> Result<()> {
    if baseline && function != TargetFunction::Silu {
        bail!("the hard-swish baseline approximates silu, not {}", function);
    }
    info!(%function, shapes = shapes.len(), test_min, test_max, "measuring mse");
    let reports = mse::sweep(&[function], shapes, test_min, test_max)?;

    if json {
        serde_json::to_writer_pretty(&mut *out, &reports)?;
        writeln!(out)?;
    } else {
        for report in &reports {
            writeln!(out, "{}", report)?;
        }
    }

    if baseline {
        let step = shapes
            .iter()
            .map(|&(_, frac_bits)| 1.0 / (1u64 << frac_bits) as f64)
            .fold(f64::INFINITY, f64::min);
        let hard_swish = mse::hard_swish_mse(test_min, test_max, step)?;
        writeln!(
            out,
            "hard-swish vs silu [{}, {}] step={} mse={:.7}",
            test_min, test_max, step, hard_swish
        )?;
    }
    Ok(())
}

/// Breakpoint sets of the hardware sigmoid, in evaluation order
fn pwl_sets() -> [(&'static str, &'static [(f64, f64)]); 3] {
    [
        ("equal-y", &pwl::EQUAL_Y_BREAKPOINTS),
        ("equal-y bf16", &pwl::EQUAL_Y_BF16_BREAKPOINTS),
        ("equal-x", &pwl::EQUAL_X_BREAKPOINTS),
    ]
}

fn write_renderings<W: Write>(out: &mut W, title: &str, values: &[f64]) -> Result<()> {
    writeln!(out, "# {}", title)?;
    for (i, &value) in values.iter().enumerate() {
        writeln!(out, "{}", pwl::render_value(value)?.row(i + 1))?;
    }
    Ok(())
}

fn run_pwl<W: Write>(out: &mut W, json: bool) -> Result<()> {
    let mut sets = Vec::new();
    for (name, points) in pwl_sets() {
        sets.push((name, points, pwl::segments(points)?));
    }
    info!(sets = sets.len(), "computed pwl coefficients");

    if json {
        let mut value = serde_json::Map::new();
        for (name, _, segments) in &sets {
            value.insert(name.to_string(), serde_json::to_value(segments)?);
        }
        serde_json::to_writer_pretty(&mut *out, &value)?;
        writeln!(out)?;
        return Ok(());
    }

    for (name, points, segments) in &sets {
        writeln!(out, "# {} segments: (start, end, slope, intercept)", name)?;
        for s in segments {
            writeln!(
                out,
                "({:.6}, {:.6}, {:.6}, {:.6})",
                s.start, s.end, s.slope, s.intercept
            )?;
        }
        let xs: Vec<f64> = points.iter().map(|&(x, _)| x).collect();
        let slopes: Vec<f64> = segments.iter().map(|s| s.slope).collect();
        let intercepts: Vec<f64> = segments.iter().map(|s| s.intercept).collect();
        write_renderings(out, &format!("{} breakpoints", name), &xs)?;
        write_renderings(out, &format!("{} slopes", name), &slopes)?;
        write_renderings(out, &format!("{} intercepts", name), &intercepts)?;
    }
    Ok(())
}

fn run_ulp<W: Write>(out: &mut W, max_exponent: i32) -> Result<()> {
    let segments = segment_ulps(max_exponent);
    if segments.is_empty() {
        bail!("no normal BF16 segments below 2^{}", max_exponent);
    }
    for s in &segments {
        writeln!(out, "2^{}: {:e}", s.exponent, s.ulp)?;
    }
    writeln!(out, "average: {:e}", average_ulp(&segments))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bits() {
        assert_eq!(parse_bits("0011111110000000").unwrap(), Bf16::ONE);
        assert_eq!(parse_bits("0x3F80").unwrap(), Bf16::ONE);
        assert!(parse_bits("0011").is_err());
        assert!(parse_bits("0xZZ").is_err());
    }

    #[test]
    fn test_cli_parses_table_flags() {
        let cli = Cli::try_parse_from([
            "actlut", "table", "-f", "gelu", "-i", "3", "-b", "5", "--format", "simple",
        ])
        .unwrap();
        match cli.command {
            Commands::Table { table, format, .. } => {
                assert_eq!(table.function, TargetFunction::Gelu);
                let config = table.config().unwrap();
                assert_eq!(config.domain.to_string(), "3.5");
                assert!(matches!(format, OutputFormat::Simple));
            }
            _ => panic!("expected table command"),
        }
    }

    #[test]
    fn test_table_output() {
        let args = TableArgs {
            function: TargetFunction::Silu,
            int_bits: 2,
            frac_bits: 4,
            tolerance: None,
            sigmoid_inv_entries: DEFAULT_SIGMOID_INV_ENTRIES,
        };
        let mut buf = Vec::new();
        run_literals(&mut buf, &args).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap().lines().count(), 128);
    }

    #[test]
    fn test_mse_rejects_misaligned_range() {
        let mut buf = Vec::new();
        let err = run_mse(&mut buf, TargetFunction::Silu, &[(2, 4)], -6.01, 6.0, false, false);
        assert!(err.is_err());
    }

    #[test]
    fn test_baseline_only_for_silu() {
        let mut buf = Vec::new();
        let err = run_mse(&mut buf, TargetFunction::Tanh, &[(2, 4)], -6.0, 6.0, true, false);
        assert!(err.is_err());
        assert!(buf.is_empty());

        run_mse(&mut buf, TargetFunction::Silu, &[(2, 4)], -6.0, 6.0, true, false).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.lines().any(|l| l.starts_with("hard-swish vs silu [-6, 6]")));
    }

    #[test]
    fn test_pwl_text() {
        let mut buf = Vec::new();
        run_pwl(&mut buf, false).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.contains("# equal-x segments"));
        assert!(text.contains("(4.000000, 1, 0100000010000000, 100_0000000, 4.000000)"));
    }
}
