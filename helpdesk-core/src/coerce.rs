//! Field coercion utilities
//!
//! Pure, total functions that normalize loosely-typed wire text into strict
//! semantic values. The wire carries everything as text; parsers funnel each
//! value through one of these before it lands in a typed field. All functions
//! are side-effect free, never fail, and are idempotent on canonical input.

/// Returns the value as an owned string, or the default when absent.
pub fn assure_string(value: Option<&str>, default: Option<&str>) -> Option<String> {
    value.or(default).map(str::to_owned)
}

/// Returns the value as an integer, or the default when absent.
///
/// Numeric coercion is loose the way wire text demands: leading whitespace
/// and sign are honored, trailing garbage is ignored, and non-numeric text
/// coerces to 0 (`"42nd"` is 42, `"n/a"` is 0).
pub fn assure_int(value: Option<&str>, default: Option<i64>) -> Option<i64> {
    match value {
        Some(text) => Some(loose_int(text)),
        None => default,
    }
}

/// Returns the value as a positive integer; non-positive results (including
/// absent input) map to the default.
pub fn assure_positive_int(value: Option<&str>, default: Option<i64>) -> Option<i64> {
    let parsed = value.map(loose_int).unwrap_or(0);
    if parsed > 0 {
        Some(parsed)
    } else {
        default
    }
}

/// Truthy coercion: absent, empty and `"0"` are false, everything else true.
pub fn assure_bool(value: Option<&str>) -> bool {
    match value {
        None => false,
        Some(text) => {
            let trimmed = text.trim();
            !trimmed.is_empty() && trimmed != "0"
        }
    }
}

/// Wraps a scalar into a single-element sequence; absent input maps to the
/// default (typically empty).
pub fn assure_array<T>(value: Option<T>, default: Vec<T>) -> Vec<T> {
    match value {
        Some(item) => vec![item],
        None => default,
    }
}

/// A statically-declared group of valid enum-constant values.
///
/// Enum-like wire fields reject out-of-range values by membership lookup in
/// one of these tables, declared once per constant group next to the resource
/// that owns it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConstantGroup {
    pub name: &'static str,
    pub values: &'static [&'static str],
}

impl ConstantGroup {
    pub const fn new(name: &'static str, values: &'static [&'static str]) -> Self {
        Self { name, values }
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| *v == value)
    }
}

/// Returns the value unchanged iff it is a member of the constant group,
/// otherwise the default.
pub fn assure_constant(
    value: Option<&str>,
    group: &ConstantGroup,
    default: Option<&str>,
) -> Option<String> {
    match value {
        Some(v) if group.contains(v) => Some(v.to_owned()),
        _ => default.map(str::to_owned),
    }
}

/// Renders a byte count with a binary-unit suffix, e.g. `2048` as `"2.00 KB"`.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 6] = ["B", "KB", "MB", "GB", "TB", "PB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[unit])
    } else {
        format!("{:.2} {}", size, UNITS[unit])
    }
}

fn loose_int(text: &str) -> i64 {
    let trimmed = text.trim();
    let mut chars = trimmed.char_indices();
    let mut end = 0;
    if let Some((_, first)) = chars.next() {
        if first.is_ascii_digit() || first == '+' || first == '-' {
            end = first.len_utf8();
            for (idx, c) in chars {
                if !c.is_ascii_digit() {
                    break;
                }
                end = idx + c.len_utf8();
            }
        }
    }
    trimmed[..end].parse().unwrap_or(0)
}
