/// `$1,419.47` style: fixed decimals with thousands separators.
pub fn currency(value: f64, decimals: usize) -> String {
    let fixed = format!("{:.*}", decimals, value.abs());
    let (whole, fraction) = match fixed.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (fixed.as_str(), None),
    };

    let is_zero = fixed.chars().all(|c| c == '0' || c == '.');
    let sign = if value.is_sign_negative() && !is_zero { "-" } else { "" };

    match fraction {
        Some(fraction) => format!("{sign}${}.{fraction}", group_thousands(whole)),
        None => format!("{sign}${}", group_thousands(whole)),
    }
}

/// Payment amount, or `$0.00` when there is none yet.
pub fn payment(value: Option<f64>) -> String {
    currency(value.unwrap_or(0.0), 2)
}

/// `5.50%`
pub fn percent(apr: f64) -> String {
    format!("{apr:.2}%")
}

fn group_thousands(digits: &str) -> String {
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}
