use std::time::Duration;

/// Integer printed with `'` between groups of three digits.
pub struct NiceInt(i128);

impl NiceInt {
    pub fn from_usize(value: usize) -> Self {
        Self(value as i128)
    }

    pub fn from_f64(value: f64) -> Self {
        Self(value as i128)
    }
}

impl std::fmt::Display for NiceInt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", with_delimiters(self.0))
    }
}

fn with_delimiters(value: i128) -> String {
    let mut result = value
        .abs()
        .to_string()
        .chars()
        .rev()
        .collect::<Vec<char>>()
        .chunks(3)
        .map(|c| c.iter().rev().collect::<String>())
        .rev()
        .collect::<Vec<String>>()
        .join("'");
    if value < 0 {
        result.insert(0, '-');
    }
    result
}

/// Wall-clock duration printed as whole minutes and fractional seconds,
/// e.g. `1m15.250s`.
pub struct Elapsed(pub Duration);

impl std::fmt::Display for Elapsed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let minutes = self.0.as_secs() / 60;
        let seconds = (self.0.as_secs() % 60) as f64 + self.0.subsec_nanos() as f64 * 1e-9;
        write!(f, "{minutes}m{seconds:.3}s")
    }
}
