//! G-code command decoder.
//!
//! Owns one copied line at a time, extracts and validates the opcode, and
//! lazily parses `<letter><number>` argument pairs on first access. The
//! decoder is a plain value: the orchestrator holds one instance and reuses
//! it across lines, and independent decoders never share state.

use log::warn;

use crate::error::{ArgError, DecodeError};
use crate::scanner::{scan_float, scan_int, MAX_LINE_BYTES};

/// The opcodes this host knows how to handle.
///
/// G0/G1 move, G4 dwell, G20/G21 unit selection, G28 home, G90/G91
/// positioning mode, G92 set position.
pub const SUPPORTED_OPCODES: [i32; 9] = [0, 1, 4, 20, 21, 28, 90, 91, 92];

/// Axis and parameter letters a command may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgLetter {
    X,
    Y,
    Z,
    E,
    /// Feed rate, length units per minute.
    F,
    /// Dwell duration, milliseconds.
    P,
}

impl ArgLetter {
    /// Map a raw byte onto a recognized letter, case-insensitively.
    fn from_byte(b: u8) -> Option<Self> {
        match b {
            b'x' | b'X' => Some(ArgLetter::X),
            b'y' | b'Y' => Some(ArgLetter::Y),
            b'z' | b'Z' => Some(ArgLetter::Z),
            b'e' | b'E' => Some(ArgLetter::E),
            b'f' | b'F' => Some(ArgLetter::F),
            b'p' | b'P' => Some(ArgLetter::P),
            _ => None,
        }
    }

    fn slot(self) -> usize {
        self as usize
    }

    fn as_char(self) -> char {
        match self {
            ArgLetter::X => 'X',
            ArgLetter::Y => 'Y',
            ArgLetter::Z => 'Z',
            ArgLetter::E => 'E',
            ArgLetter::F => 'F',
            ArgLetter::P => 'P',
        }
    }
}

impl std::fmt::Display for ArgLetter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Which argument letters an opcode may legally carry. Requesting a letter
/// outside this set is an error even when the line contained the token.
fn allowed(code: i32, letter: ArgLetter) -> bool {
    use ArgLetter::*;
    match code {
        0 | 1 => matches!(letter, X | Y | Z | E | F),
        4 => matches!(letter, P),
        28 => matches!(letter, X | Y | Z),
        92 => matches!(letter, X | Y | Z | E),
        _ => false,
    }
}

/// Decoder for one G-line at a time.
pub struct CommandDecoder {
    /// Line payload plus one trailing space sentinel, so the argument
    /// scanner always terminates on whitespace.
    buf: [u8; MAX_LINE_BYTES + 1],
    len: usize,
    code: i32,
    parsed: bool,
    args: [Option<f32>; 6],
}

impl Default for CommandDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandDecoder {
    pub fn new() -> Self {
        Self {
            buf: [0; MAX_LINE_BYTES + 1],
            len: 0,
            code: -1,
            parsed: false,
            args: [None; 6],
        }
    }

    /// True for every opcode in the supported set, false otherwise.
    pub fn valid_code(code: i32) -> bool {
        SUPPORTED_OPCODES.contains(&code)
    }

    /// Load one line (first byte is the command letter) and extract its
    /// opcode. Argument state is reset; arguments themselves are parsed
    /// lazily on first access.
    pub fn set_line(&mut self, bytes: &[u8]) -> Result<(), DecodeError> {
        if bytes.len() > MAX_LINE_BYTES {
            return Err(DecodeError::LineTooLong { len: bytes.len() });
        }
        if bytes.is_empty() {
            return Err(DecodeError::MalformedCommand);
        }
        self.buf[..bytes.len()].copy_from_slice(bytes);
        self.buf[bytes.len()] = b' ';
        self.len = bytes.len() + 1;
        self.code = -1;
        self.parsed = false;
        self.args = [None; 6];

        // the sentinel space guarantees a non-digit terminates this scan
        let mut end = 1;
        while self.buf[end].is_ascii_digit() {
            end += 1;
        }
        if end == 1 {
            return Err(DecodeError::MalformedCommand);
        }
        // range [1, end) is non-empty and all digits
        self.code = scan_int(&self.buf[1..end]).unwrap_or(-1);
        if !Self::valid_code(self.code) {
            return Err(DecodeError::InvalidOpcode(self.code));
        }
        Ok(())
    }

    /// The opcode decoded by the last `set_line`.
    pub fn code(&self) -> i32 {
        self.code
    }

    /// Two-state scan over the buffer: seek a letter, then accumulate its
    /// value until whitespace. Unrecognized letters are logged and dropped;
    /// the `G` of the opcode token itself is skipped silently.
    fn parse_arguments(&mut self) {
        enum State {
            SeekLetter,
            SeekValue,
        }

        let mut state = State::SeekLetter;
        let mut letter = 0u8;
        let mut start = 0usize;

        for i in 0..self.len {
            let b = self.buf[i];
            match state {
                State::SeekLetter => {
                    if b != b' ' && b != b'\t' {
                        letter = b;
                        start = i + 1;
                        state = State::SeekValue;
                    }
                }
                State::SeekValue => {
                    if b == b' ' || b == b'\t' {
                        // empty value range means a bare letter token
                        let value = scan_float(&self.buf[start..i]).unwrap_or(0.0);
                        self.store(letter, value);
                        state = State::SeekLetter;
                    }
                }
            }
        }
        self.parsed = true;
    }

    fn store(&mut self, letter: u8, value: f32) {
        match ArgLetter::from_byte(letter) {
            Some(l) => self.args[l.slot()] = Some(value),
            None if letter == b'g' || letter == b'G' => {} // the opcode token
            None => warn!("ignoring unrecognized argument letter '{}'", letter as char),
        }
    }

    /// Fetch an argument value, parsing the line's arguments first if that
    /// has not happened yet.
    pub fn arg(&mut self, letter: ArgLetter) -> Result<f32, ArgError> {
        if !self.parsed {
            self.parse_arguments();
        }
        if !allowed(self.code, letter) {
            return Err(ArgError::Invalid {
                code: self.code,
                letter,
            });
        }
        self.args[letter.slot()].ok_or(ArgError::NotFound { letter })
    }

    /// Try-get variant: absent arguments become `None`, capability
    /// violations stay hard errors.
    pub fn arg_opt(&mut self, letter: ArgLetter) -> Result<Option<f32>, ArgError> {
        match self.arg(letter) {
            Ok(v) => Ok(Some(v)),
            Err(ArgError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Target X position (move, home, set-position opcodes).
    pub fn x(&mut self) -> Result<f32, ArgError> {
        self.arg(ArgLetter::X)
    }

    /// Target Y position (move, home, set-position opcodes).
    pub fn y(&mut self) -> Result<f32, ArgError> {
        self.arg(ArgLetter::Y)
    }

    /// Target Z position (move, home, set-position opcodes).
    pub fn z(&mut self) -> Result<f32, ArgError> {
        self.arg(ArgLetter::Z)
    }

    /// Extruder position (move and set-position opcodes).
    pub fn e(&mut self) -> Result<f32, ArgError> {
        self.arg(ArgLetter::E)
    }

    /// Feed rate in length units per minute (move opcodes).
    pub fn f(&mut self) -> Result<f32, ArgError> {
        self.arg(ArgLetter::F)
    }

    /// Dwell duration in milliseconds (G4).
    pub fn p(&mut self) -> Result<f32, ArgError> {
        self.arg(ArgLetter::P)
    }

    /// Human-readable description of the decoded command. Axes absent from
    /// the line are omitted; a partial description is valid output. Only a
    /// dwell with no duration propagates `NotFound`.
    pub fn explain(&mut self) -> Result<String, ArgError> {
        match self.code {
            0 | 1 => {
                let mut s = format!("G{} - Move to ", self.code);
                if let Some(v) = self.arg_opt(ArgLetter::X)? {
                    s.push_str(&format!("X:{v:?} "));
                }
                if let Some(v) = self.arg_opt(ArgLetter::Y)? {
                    s.push_str(&format!("Y:{v:?} "));
                }
                if let Some(v) = self.arg_opt(ArgLetter::Z)? {
                    s.push_str(&format!("Z:{v:?} "));
                }
                if let Some(v) = self.arg_opt(ArgLetter::E)? {
                    s.push_str(&format!("E:{v:?} "));
                }
                if let Some(v) = self.arg_opt(ArgLetter::F)? {
                    s.push_str(&format!("using feedrate:{v:?}"));
                }
                Ok(s)
            }
            4 => Ok(format!("G4 - Dwell {:?}ms", self.p()?)),
            20 => Ok("G20 - Use inches".to_string()),
            21 => Ok("G21 - Use mm".to_string()),
            28 => {
                let mut s = "G28 - Home ".to_string();
                if self.arg_opt(ArgLetter::X)?.is_some() {
                    s.push_str("X;");
                }
                if self.arg_opt(ArgLetter::Y)?.is_some() {
                    s.push_str("Y;");
                }
                if self.arg_opt(ArgLetter::Z)?.is_some() {
                    s.push_str("Z;");
                }
                Ok(s)
            }
            90 => Ok("G90 - Use absolute positioning".to_string()),
            91 => Ok("G91 - Use relative positioning".to_string()),
            92 => {
                let mut s = "G92 - Set axis to ".to_string();
                if let Some(v) = self.arg_opt(ArgLetter::X)? {
                    s.push_str(&format!("X={v:?} "));
                }
                if let Some(v) = self.arg_opt(ArgLetter::Y)? {
                    s.push_str(&format!("Y={v:?} "));
                }
                if let Some(v) = self.arg_opt(ArgLetter::Z)? {
                    s.push_str(&format!("Z={v:?} "));
                }
                if let Some(v) = self.arg_opt(ArgLetter::E)? {
                    s.push_str(&format!("E={v:?} "));
                }
                Ok(s)
            }
            other => Ok(format!("Unknown opcode {other}")),
        }
    }
}
