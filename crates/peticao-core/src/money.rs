//! Brazilian currency formatting
//!
//! Values are rendered as `R$ 1.234,50`: dot for thousands, comma for
//! decimals, always two decimal digits. Formatting never consults the host
//! locale.

use tracing::warn;

use crate::value::{Context, Value};

/// Fields that hold currency amounts
pub const MONETARY_FIELDS: [&str; 3] = ["VALOR_PAGO_INDEVIDO", "VALOR_INDEVIDO_DOBRO", "VALOR_CAUSA"];

/// Suffix marking a raw numeric amount that must be expanded into a
/// formatted field without the suffix
pub const FLOAT_SUFFIX: &str = "_FLOAT";

/// Format a number as Brazilian currency.
///
/// ```
/// use peticao_core::format_money;
///
/// assert_eq!(format_money(1234.5), "R$ 1.234,50");
/// assert_eq!(format_money(0.0), "R$ 0,00");
/// ```
pub fn format_money(value: f64) -> String {
    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let sign = if value < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0') {
        "-"
    } else {
        ""
    };

    format!("R$ {}{},{}", sign, group_thousands(int_part), frac_part)
}

fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// Format the designated monetary fields that arrived as numbers.
///
/// Text values are assumed to be formatted already and pass through.
pub fn format_monetary_fields(ctx: Context) -> Context {
    MONETARY_FIELDS.iter().fold(ctx, |ctx, field| {
        ctx.map_value(field, |value| match value.as_f64() {
            Some(amount) if amount.is_finite() => Value::Text(format_money(amount)),
            _ => value,
        })
    })
}

/// Replace every `*_FLOAT` field with a formatted field under the unsuffixed
/// name.
///
/// Numbers and numeric text are accepted. A value that cannot be read as a
/// number is left where it was.
pub fn expand_float_fields(ctx: Context) -> Context {
    let (floats, rest): (Vec<_>, Vec<_>) = ctx
        .into_iter()
        .partition(|(key, _)| key.ends_with(FLOAT_SUFFIX));

    let mut out: Context = rest.into_iter().collect();
    for (key, value) in floats {
        match parse_amount(&value) {
            Some(amount) => {
                let stem = float_stem(&key);
                if stem.is_empty() {
                    warn!(field = %key, "amount has no field name, dropping it");
                } else {
                    out.insert(stem, format_money(amount));
                }
            }
            None => {
                warn!(field = %key, value = %value, "could not read amount, leaving field as is");
                out.insert(key, value);
            }
        }
    }
    out
}

/// The key with every `_FLOAT` removed, so `X_FLOAT_FLOAT` becomes `X`
fn float_stem(key: &str) -> String {
    key.replace(FLOAT_SUFFIX, "")
}

fn parse_amount(value: &Value) -> Option<f64> {
    let amount = match value {
        Value::Number(n) => n.as_f64(),
        Value::Text(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    amount.is_finite().then_some(amount)
}
