//! Positional printf-style formatting for translation templates.
//!
//! Templates use classic format specifiers (`%d`, `%s`, `%.2f`, ...) and are
//! filled with arguments in order. Mismatches never fail; they are rendered
//! inline so a broken translation stays visible instead of crashing a request:
//!
//! - missing argument: `%!d(MISSING)`
//! - wrong argument type: `%!d(string=abc)`
//! - unused arguments: `%!(EXTRA int=5, string=abc)`
//! - dangling `%`: `%!(NOVERB)`
//! - width or precision above one million: `%!(BADWIDTH)` / `%!(BADPREC)`

use std::fmt;
use std::iter::Peekable;
use std::str::Chars;

const MAX_WIDTH: usize = 1_000_000;

/// A single positional argument for a translation template.
#[derive(Debug, Clone, PartialEq)]
pub enum FormatArg {
    Int(i64),
    Uint(u64),
    Float(f64),
    Str(String),
    Bool(bool),
}

impl FormatArg {
    /// Type name used in mismatch markers.
    fn type_name(&self) -> &'static str {
        match self {
            FormatArg::Int(_) => "int",
            FormatArg::Uint(_) => "uint",
            FormatArg::Float(_) => "float64",
            FormatArg::Str(_) => "string",
            FormatArg::Bool(_) => "bool",
        }
    }
}

impl fmt::Display for FormatArg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatArg::Int(value) => write!(f, "{}", value),
            FormatArg::Uint(value) => write!(f, "{}", value),
            FormatArg::Float(value) => f.write_str(&format_float(*value, 'v', &Spec::default())),
            FormatArg::Str(value) => f.write_str(value),
            FormatArg::Bool(value) => write!(f, "{}", value),
        }
    }
}

macro_rules! impl_from_arg {
    ($variant:ident as $target:ty: $($source:ty),+) => {
        $(
            impl From<$source> for FormatArg {
                fn from(value: $source) -> Self {
                    FormatArg::$variant(value as $target)
                }
            }
        )+
    };
}

impl_from_arg!(Int as i64: i8, i16, i32, i64, isize);
impl_from_arg!(Uint as u64: u8, u16, u32, u64, usize);
impl_from_arg!(Float as f64: f32, f64);

impl From<bool> for FormatArg {
    fn from(value: bool) -> Self {
        FormatArg::Bool(value)
    }
}

impl From<&str> for FormatArg {
    fn from(value: &str) -> Self {
        FormatArg::Str(value.to_string())
    }
}

impl From<String> for FormatArg {
    fn from(value: String) -> Self {
        FormatArg::Str(value)
    }
}

impl From<&String> for FormatArg {
    fn from(value: &String) -> Self {
        FormatArg::Str(value.clone())
    }
}

/// Flags, width and precision of one directive.
#[derive(Debug, Default, Clone, Copy)]
struct Spec {
    minus: bool,
    plus: bool,
    zero: bool,
    space: bool,
    sharp: bool,
    width: Option<usize>,
    precision: Option<usize>,
    bad_width: bool,
    bad_precision: bool,
}

/// Substitute `args` into `template` in order.
pub fn sprintf(template: &str, args: &[FormatArg]) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut chars = template.chars().peekable();
    let mut next_arg = 0;

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }

        let spec = parse_spec(&mut chars);
        if spec.bad_width {
            out.push_str("%!(BADWIDTH)");
        }
        if spec.bad_precision {
            out.push_str("%!(BADPREC)");
        }

        let Some(verb) = chars.next() else {
            out.push_str("%!(NOVERB)");
            break;
        };

        if verb == '%' {
            out.push('%');
            continue;
        }

        match args.get(next_arg) {
            Some(arg) => {
                next_arg += 1;
                out.push_str(&format_arg(verb, &spec, arg));
            }
            None => {
                out.push_str("%!");
                out.push(verb);
                out.push_str("(MISSING)");
            }
        }
    }

    if next_arg < args.len() {
        let extra: Vec<String> = args[next_arg..]
            .iter()
            .map(|arg| format!("{}={}", arg.type_name(), arg))
            .collect();
        out.push_str("%!(EXTRA ");
        out.push_str(&extra.join(", "));
        out.push(')');
    }

    out
}

fn parse_spec(chars: &mut Peekable<Chars<'_>>) -> Spec {
    let mut spec = Spec::default();

    while let Some(&flag) = chars.peek() {
        match flag {
            '-' => spec.minus = true,
            '+' => spec.plus = true,
            '0' => spec.zero = true,
            ' ' => spec.space = true,
            '#' => spec.sharp = true,
            _ => break,
        }
        chars.next();
    }

    spec.width = take_number(chars);
    if spec.width.is_some_and(|width| width > MAX_WIDTH) {
        spec.width = None;
        spec.bad_width = true;
    }

    if chars.peek() == Some(&'.') {
        chars.next();
        let precision = take_number(chars).unwrap_or(0);
        if precision > MAX_WIDTH {
            spec.bad_precision = true;
        } else {
            spec.precision = Some(precision);
        }
    }

    spec
}

fn take_number(chars: &mut Peekable<Chars<'_>>) -> Option<usize> {
    let mut number: Option<usize> = None;
    while let Some(digit) = chars.peek().and_then(|c| c.to_digit(10)) {
        number = Some(number.unwrap_or(0).saturating_mul(10).saturating_add(digit as usize));
        chars.next();
    }
    number
}

fn format_arg(verb: char, spec: &Spec, arg: &FormatArg) -> String {
    match (verb, arg) {
        ('d' | 'v' | 'x' | 'X' | 'o' | 'b', FormatArg::Int(value)) => {
            format_integer(i128::from(*value), verb, spec)
        }
        ('d' | 'v' | 'x' | 'X' | 'o' | 'b', FormatArg::Uint(value)) => {
            format_integer(i128::from(*value), verb, spec)
        }
        ('c', FormatArg::Int(_) | FormatArg::Uint(_)) => {
            let code = match arg {
                FormatArg::Int(value) => u32::try_from(*value).ok(),
                FormatArg::Uint(value) => u32::try_from(*value).ok(),
                _ => None,
            };
            let ch = code.and_then(char::from_u32).unwrap_or('\u{FFFD}');
            pad(ch.to_string(), spec)
        }
        ('f' | 'F' | 'e' | 'E' | 'g' | 'G' | 'v', FormatArg::Float(value)) => {
            format_float(*value, verb, spec)
        }
        ('s' | 'v', FormatArg::Str(value)) => {
            let text = match spec.precision {
                Some(precision) => value.chars().take(precision).collect(),
                None => value.clone(),
            };
            pad(text, spec)
        }
        ('q', FormatArg::Str(value)) => pad(format!("{:?}", value), spec),
        ('x' | 'X', FormatArg::Str(value)) => {
            let hex: String = value
                .bytes()
                .map(|byte| {
                    if verb == 'X' {
                        format!("{:02X}", byte)
                    } else {
                        format!("{:02x}", byte)
                    }
                })
                .collect();
            pad(hex, spec)
        }
        ('t' | 'v', FormatArg::Bool(value)) => pad(value.to_string(), spec),
        _ => format!("%!{}({}={})", verb, arg.type_name(), arg),
    }
}

fn format_integer(value: i128, verb: char, spec: &Spec) -> String {
    let magnitude = value.unsigned_abs();
    let mut digits = match verb {
        'x' => format!("{:x}", magnitude),
        'X' => format!("{:X}", magnitude),
        'o' => format!("{:o}", magnitude),
        'b' => format!("{:b}", magnitude),
        _ => magnitude.to_string(),
    };

    if let Some(precision) = spec.precision {
        if digits.len() < precision {
            digits.insert_str(0, &"0".repeat(precision - digits.len()));
        }
    }

    let prefix = match (spec.sharp, verb) {
        (true, 'x') => "0x",
        (true, 'X') => "0X",
        (true, 'o') => "0",
        (true, 'b') => "0b",
        _ => "",
    };
    digits.insert_str(0, prefix);

    pad_number(sign_for(value < 0, spec), &digits, spec)
}

fn format_float(value: f64, verb: char, spec: &Spec) -> String {
    // Non-finite values are never zero padded
    let spaced = Spec { zero: false, ..*spec };
    if value.is_nan() {
        return pad("NaN".to_string(), &spaced);
    }
    if value.is_infinite() {
        let text = if value > 0.0 { "+Inf" } else { "-Inf" };
        return pad(text.to_string(), &spaced);
    }

    let magnitude = value.abs();
    let body = match verb {
        'e' | 'E' => exponent_form(magnitude, spec.precision.unwrap_or(6), verb == 'E'),
        'g' | 'G' | 'v' => general_form(magnitude, spec.precision, verb == 'G'),
        _ => format!("{:.*}", spec.precision.unwrap_or(6), magnitude),
    };

    pad_number(sign_for(value.is_sign_negative(), spec), &body, spec)
}

/// `1.500000e+03` style, exponent at least two digits.
fn exponent_form(magnitude: f64, precision: usize, upper: bool) -> String {
    let raw = format!("{:.*e}", precision, magnitude);
    let (mantissa, exponent) = split_exponent(&raw);
    join_exponent(mantissa, exponent, upper)
}

/// Shortest representation. Exponent form is used when the exponent is below
/// -4 or at least the precision, which is 6 when none is given.
fn general_form(magnitude: f64, precision: Option<usize>, upper: bool) -> String {
    match precision {
        None => {
            let raw = format!("{:e}", magnitude);
            let (mantissa, exponent) = split_exponent(&raw);
            if !(-4..6).contains(&exponent) {
                join_exponent(mantissa, exponent, upper)
            } else {
                magnitude.to_string()
            }
        }
        Some(precision) => {
            let precision = precision.max(1);
            let raw = format!("{:.*e}", precision - 1, magnitude);
            let (mantissa, exponent) = split_exponent(&raw);
            if exponent < -4 || exponent >= precision as i32 {
                join_exponent(trim_fraction(mantissa), exponent, upper)
            } else {
                let decimals = (precision as i32 - 1 - exponent).max(0) as usize;
                trim_fraction(&format!("{:.*}", decimals, magnitude)).to_string()
            }
        }
    }
}

fn split_exponent(raw: &str) -> (&str, i32) {
    match raw.split_once('e') {
        Some((mantissa, exponent)) => (mantissa, exponent.parse().unwrap_or(0)),
        None => (raw, 0),
    }
}

fn join_exponent(mantissa: &str, exponent: i32, upper: bool) -> String {
    let marker = if upper { 'E' } else { 'e' };
    let sign = if exponent < 0 { '-' } else { '+' };
    format!("{}{}{}{:02}", mantissa, marker, sign, exponent.abs())
}

fn trim_fraction(text: &str) -> &str {
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    }
}

fn sign_for(negative: bool, spec: &Spec) -> &'static str {
    if negative {
        "-"
    } else if spec.plus {
        "+"
    } else if spec.space {
        " "
    } else {
        ""
    }
}

fn pad_number(sign: &str, digits: &str, spec: &Spec) -> String {
    let len = sign.chars().count() + digits.chars().count();
    match spec.width {
        Some(width) if width > len && spec.zero && !spec.minus => {
            format!("{}{}{}", sign, "0".repeat(width - len), digits)
        }
        _ => pad(format!("{}{}", sign, digits), spec),
    }
}

fn pad(body: String, spec: &Spec) -> String {
    let len = body.chars().count();
    match spec.width {
        Some(width) if width > len => {
            if spec.minus {
                body + &" ".repeat(width - len)
            } else if spec.zero {
                "0".repeat(width - len) + &body
            } else {
                " ".repeat(width - len) + &body
            }
        }
        _ => body,
    }
}
