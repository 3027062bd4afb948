//! Display scaling factor detection
//!
//! Selection tools report logical coordinates, while captures are in
//! physical pixels. The factor found here converts one into the other.

/// Environment variables consulted, in order
pub const SCALE_ENV_VARS: [&str; 2] = ["GDK_SCALE", "QT_SCALE_FACTOR"];

/// Detected display scaling factor and where it came from
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleFactor {
    factor: f64,
    source: Option<&'static str>,
}

impl ScaleFactor {
    /// Factor 1.0, not detected from anything
    pub const fn unscaled() -> Self {
        Self {
            factor: 1.0,
            source: None,
        }
    }

    /// Explicit factor with a named source
    pub fn detected(factor: f64, source: &'static str) -> Self {
        Self {
            factor,
            source: Some(source),
        }
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    /// Name of the variable the factor was read from
    pub fn source(&self) -> Option<&'static str> {
        self.source
    }
}

impl Default for ScaleFactor {
    fn default() -> Self {
        Self::unscaled()
    }
}

/// Reads the scaling factor from the process environment
pub fn detect_scale_factor() -> ScaleFactor {
    detect_scale_factor_with_env(&|key: &str| std::env::var(key).ok())
}

/// Reads the scaling factor through a custom environment provider
///
/// The first variable in [`SCALE_ENV_VARS`] holding a finite positive
/// number wins. Malformed or non-positive values are skipped.
pub fn detect_scale_factor_with_env<F>(env_provider: &F) -> ScaleFactor
where
    F: Fn(&str) -> Option<String> + ?Sized,
{
    for var in SCALE_ENV_VARS {
        let parsed = env_provider(var).and_then(|v| v.trim().parse::<f64>().ok());
        if let Some(factor) = parsed.filter(|f| f.is_finite() && *f > 0.0) {
            return ScaleFactor::detected(factor, var);
        }
    }
    ScaleFactor::unscaled()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(pairs: &'static [(&'static str, &'static str)]) -> impl Fn(&str) -> Option<String> {
        move |key: &str| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn test_default_is_unscaled() {
        let scale = detect_scale_factor_with_env(&lookup(&[]));
        assert_eq!(scale.factor(), 1.0);
        assert_eq!(scale.source(), None);
    }

    #[test]
    fn test_gdk_scale_wins() {
        let scale = detect_scale_factor_with_env(&lookup(&[("GDK_SCALE", "2"), ("QT_SCALE_FACTOR", "3")]));
        assert_eq!(scale, ScaleFactor::detected(2.0, "GDK_SCALE"));
    }

    #[test]
    fn test_qt_scale_factor_fallback() {
        let scale =
            detect_scale_factor_with_env(&lookup(&[("GDK_SCALE", "zero"), ("QT_SCALE_FACTOR", "1.5")]));
        assert_eq!(scale.factor(), 1.5);
        assert_eq!(scale.source(), Some("QT_SCALE_FACTOR"));
    }

    #[test]
    fn test_non_positive_values_ignored() {
        let scale = detect_scale_factor_with_env(&lookup(&[("GDK_SCALE", "0"), ("QT_SCALE_FACTOR", "-2")]));
        assert_eq!(scale, ScaleFactor::unscaled());

        let scale = detect_scale_factor_with_env(&lookup(&[("GDK_SCALE", "NaN")]));
        assert_eq!(scale, ScaleFactor::unscaled());
    }

    #[test]
    fn test_detect_from_process_env() {
        temp_env::with_vars([("GDK_SCALE", Some("2")), ("QT_SCALE_FACTOR", None::<&str>)], || {
            assert_eq!(detect_scale_factor().factor(), 2.0);
        });
    }
}
