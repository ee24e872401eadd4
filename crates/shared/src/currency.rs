//! Price formatting in the Brazilian style (`1.234,56`).

/// Format free-form input as a price mask.
///
/// Only ASCII digits are kept; the last two are the cents.
pub fn apply_mask(value: &str) -> String {
    let digits: String = value.chars().filter(|c| c.is_ascii_digit()).collect();
    let padded = format!("{digits:0>3}");
    let (integer, cents) = padded.split_at(padded.len() - 2);

    let integer = integer.trim_start_matches('0');
    let integer = if integer.is_empty() { "0" } else { integer };

    format!("{},{}", group_thousands(integer), cents)
}

/// Format an amount in cents, e.g. `123456` as `1.234,56`.
pub fn format_cents(cents: u64) -> String {
    apply_mask(&cents.to_string())
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    out
}
