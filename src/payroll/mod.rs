pub mod builder;
pub mod calculator;
pub mod tables;

/// Round to centavos. Applied after every running addition so repeated
/// float summation cannot drift between recomputations.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::round2;

    #[test]
    fn round2_rounds_to_cents() {
        assert_eq!(round2(1.006), 1.01);
        assert_eq!(round2(2.004), 2.0);
        assert_eq!(round2(10.0 / 3.0), 3.33);
        assert_eq!(round2(-1.006), -1.01);
    }
}
