use crate::models::{AggregateResult, CourseRecord, CourseSummary, OverallTier, RiskTier};
use serde_json::Value;

pub const SAFE_THRESHOLD: f64 = 75.0;
pub const CAUTION_THRESHOLD: f64 = 65.0;

const UNKNOWN_CODE: &str = "Unknown";

pub fn aggregate(records: &[CourseRecord]) -> AggregateResult {
    let mut per_course = Vec::with_capacity(records.len());
    let mut total_attended = 0u64;
    let mut total_conducted = 0u64;

    for record in records {
        let attended = record.attended.as_ref().map(parse_count).unwrap_or(0);
        let total = record.total.as_ref().map(parse_count).unwrap_or(0);
        let percentage = record.percentage.as_ref().map(parse_percentage).unwrap_or(0.0);

        total_attended = total_attended.saturating_add(attended);
        total_conducted = total_conducted.saturating_add(total);

        per_course.push(CourseSummary {
            code: course_code(record.code.as_ref()),
            attended,
            total,
            percentage,
            risk_tier: classify(percentage),
        });
    }

    let overall_percentage = overall_percentage(total_attended, total_conducted);

    AggregateResult {
        no_data: per_course.is_empty(),
        per_course,
        total_attended,
        total_conducted,
        overall_percentage,
        overall_tier: overall_tier(overall_percentage),
    }
}

pub fn classify(percentage: f64) -> RiskTier {
    if percentage >= SAFE_THRESHOLD {
        RiskTier::Safe
    } else if percentage >= CAUTION_THRESHOLD {
        RiskTier::Caution
    } else {
        RiskTier::Danger
    }
}

pub fn overall_tier(percentage: f64) -> OverallTier {
    if percentage >= SAFE_THRESHOLD {
        OverallTier::Safe
    } else {
        OverallTier::Warning
    }
}

pub fn overall_percentage(attended: u64, conducted: u64) -> f64 {
    if conducted == 0 {
        return 0.0;
    }
    round2(attended as f64 / conducted as f64 * 100.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn course_code(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(code)) if !code.is_empty() => code.clone(),
        Some(Value::Number(code)) => code.to_string(),
        _ => UNKNOWN_CODE.to_string(),
    }
}

// Integer-prefix semantics: "12.5" -> 12, "7 classes" -> 7.
fn parse_count(value: &Value) -> u64 {
    match value {
        Value::Number(number) => number
            .as_u64()
            .or_else(|| {
                number
                    .as_f64()
                    .filter(|n| n.is_finite() && *n >= 0.0)
                    .map(|n| n.trunc() as u64)
            })
            .unwrap_or(0),
        Value::String(text) => {
            let text = text.trim();
            let end = text
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(text.len());
            let digits = &text[..end];
            if digits.is_empty() {
                0
            } else {
                // Only overflow can fail here.
                digits.parse().unwrap_or(u64::MAX)
            }
        }
        _ => 0,
    }
}

fn parse_percentage(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().trim_end_matches('%').trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite()).unwrap_or(0.0)
}
