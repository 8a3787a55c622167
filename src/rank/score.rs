use crate::extract::ExtractedIntel;

pub(super) const WEAK_SIGNAL: &str = "Weak funding signal";

/// Points and reasons for the weighted strategy.
///
/// Reasons are listed in table order; an item with none gets
/// [`WEAK_SIGNAL`].
pub(super) fn weighted(intel: &ExtractedIntel) -> (f64, String) {
    let checks = [
        (intel.amount.is_some(), 3.0, "Has funding amount"),
        (!intel.investors.is_empty(), 3.0, "Mentions investors"),
        (intel.stage.is_some(), 3.0, "Startup stage found"),
        (intel.sector.is_some(), 2.0, "Sector identified"),
        (intel.location.is_some(), 3.0, "Location present"),
        (intel.date.is_some(), 4.0, "Date included"),
    ];

    let mut score = 0.0;
    let mut reasons: Vec<String> = Vec::new();
    for (present, points, reason) in checks {
        if present {
            score += points;
            reasons.push(reason.to_string());
        }
    }

    let confidence = intel.confidence;
    score += confidence * 2.0;
    if confidence > 0.0 {
        reasons.push(format!("High confidence score ({})", format_float(confidence)));
    }

    let reasoning = if reasons.is_empty() {
        WEAK_SIGNAL.to_string()
    } else {
        reasons.join(", ")
    };
    (score, reasoning)
}

/// Whole numbers keep one decimal place (`1.0`), others print as-is (`0.75`).
pub(super) fn format_float(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}
