//! Fixed-layout proof script records.
//!
//! A split line is a single slot letter `a..=f`. A verify line is `v`
//! followed by ten 16-character hexadecimal fields (alpha, then the nine
//! betas in row-major `(x, y)` order); every field after the first is
//! preceded by a one-character delimiter.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use exo_core::{ErrorInfo, ExoError};
use exo_num::Float;

use crate::region::BoundSlot;

/// Width of one numeric field.
pub const FIELD_WIDTH: usize = 16;

/// Distance between the starts of consecutive fields.
pub const FIELD_STRIDE: usize = FIELD_WIDTH + 1;

/// Number of numeric fields on a verify line.
pub const FIELD_COUNT: usize = 10;

/// Exact length of a verify line, without its newline.
pub const VERIFY_LINE_LEN: usize = FIELD_STRIDE * FIELD_COUNT;

const FRACTION_DIGITS: usize = FIELD_WIDTH - 2;

fn script_error(code: &str, message: impl Into<String>) -> ExoError {
    ExoError::Script(ErrorInfo::new(code, message))
}

/// Parameters of one leaf certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyRecord {
    /// Rényi order, expected in `(0.001, 0.999)`.
    pub alpha: Float,
    /// One coefficient per cell of the joint law, row-major.
    pub beta: [Float; 9],
}

/// One line of a proof script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofRecord {
    /// Halve the current region along a slot.
    Split(BoundSlot),
    /// Certify the current region as a leaf.
    Verify(VerifyRecord),
}

impl ProofRecord {
    /// Parses one line (without its terminator).
    pub fn parse(line: &str) -> Result<ProofRecord, ExoError> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let Some(leading) = line.chars().next() else {
            return Err(script_error("S002", "empty proof record"));
        };
        if let Some(slot) = BoundSlot::from_letter(leading) {
            if line.len() != 1 {
                return Err(script_error("S003", "split record carries trailing text")
                    .with_context("record", line));
            }
            return Ok(ProofRecord::Split(slot));
        }
        if leading != 'v' {
            return Err(script_error("S002", "unexpected leading character")
                .with_context("leading", leading.escape_default()));
        }
        if !line.is_ascii() {
            return Err(script_error("S008", "verify record contains non-ASCII characters")
                .with_context("record", line.escape_default()));
        }
        if line.len() != VERIFY_LINE_LEN {
            return Err(script_error("S004", "verify record has the wrong length")
                .with_context("expected", VERIFY_LINE_LEN)
                .with_context("found", line.len()));
        }
        let bytes = line.as_bytes();
        let mut fields = Vec::with_capacity(FIELD_COUNT);
        for index in 0..FIELD_COUNT {
            let start = 1 + FIELD_STRIDE * index;
            if index > 0 && !bytes[start - 1].is_ascii_whitespace() {
                return Err(script_error("S006", "field delimiter is not whitespace")
                    .with_context("column", start - 1));
            }
            let text = &line[start..start + FIELD_WIDTH];
            let value = Float::parse_radix(text.trim_end(), 16).map_err(|err| {
                ExoError::Script(
                    ErrorInfo::new("S005", "malformed numeric field")
                        .with_context("field", index.to_string())
                        .with_context("text", text)
                        .with_context("cause", err.info().code.clone()),
                )
            })?;
            fields.push(value);
        }
        let mut fields = fields.into_iter();
        let alpha = fields.next().unwrap_or_default();
        let mut beta: [Float; 9] = Default::default();
        for (slot, value) in beta.iter_mut().zip(fields) {
            *slot = value;
        }
        Ok(ProofRecord::Verify(VerifyRecord { alpha, beta }))
    }

    /// Formats the record back into its fixed layout.
    ///
    /// Fields must lie in `[0, 16)` with at most 14 fractional hex digits.
    pub fn to_line(&self) -> Result<String, ExoError> {
        match self {
            ProofRecord::Split(slot) => Ok(slot.letter().to_string()),
            ProofRecord::Verify(record) => {
                let mut line = String::with_capacity(VERIFY_LINE_LEN);
                line.push('v');
                line.push_str(&format_field(&record.alpha)?);
                for beta in &record.beta {
                    line.push(' ');
                    line.push_str(&format_field(beta)?);
                }
                Ok(line)
            }
        }
    }
}

fn format_field(value: &Float) -> Result<String, ExoError> {
    let hex = value.to_hex_string();
    let (int_part, frac_part) = hex.split_once('.').unwrap_or((hex.as_str(), ""));
    if value.is_negative() || int_part.len() != 1 || frac_part.len() > FRACTION_DIGITS {
        return Err(script_error("S007", "value does not fit a fixed-width field")
            .with_context("value", value));
    }
    Ok(format!("{int_part}.{frac_part:0<FRACTION_DIGITS$}"))
}

/// Sequential reader over proof script lines.
#[derive(Debug)]
pub struct ScriptReader<R> {
    source: R,
    line_number: usize,
    buffer: String,
}

impl ScriptReader<BufReader<File>> {
    /// Opens a script file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ExoError> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|err| ExoError::from(err).with_context("path", path.display()))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> ScriptReader<R> {
    /// Wraps any buffered source.
    pub fn new(source: R) -> Self {
        Self {
            source,
            line_number: 0,
            buffer: String::new(),
        }
    }

    /// Number of lines consumed so far.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Reads the next record. Running out of input is a script error,
    /// since the caller only asks while regions remain.
    pub fn next_record(&mut self) -> Result<ProofRecord, ExoError> {
        if !self.read_line()? {
            return Err(script_error("S001", "proof script ended while regions remain")
                .with_context("line", self.line_number));
        }
        let line = self.buffer.trim_end_matches('\n');
        ProofRecord::parse(line).map_err(|err| err.with_context("line", self.line_number))
    }

    /// Consumes the rest of the input, returning how many non-empty lines
    /// were left.
    pub fn drain_remaining(&mut self) -> Result<usize, ExoError> {
        let mut remaining = 0;
        while self.read_line()? {
            if !self.buffer.trim().is_empty() {
                remaining += 1;
            }
        }
        Ok(remaining)
    }

    fn read_line(&mut self) -> Result<bool, ExoError> {
        self.buffer.clear();
        let read = self
            .source
            .read_line(&mut self.buffer)
            .map_err(|err| ExoError::from(err).with_context("line", self.line_number + 1))?;
        if read == 0 {
            return Ok(false);
        }
        self.line_number += 1;
        Ok(true)
    }
}
