//! Human-readable descriptions of five-field cron schedules.
//!
//! Only used to preview the schedule typed into the job form. A schedule that
//! does not parse yet (the user is mid-edit) yields [`CronDescription::Pending`]
//! and the view shows a waiting indicator instead of an error.

use std::sync::LazyLock;

use regex::Regex;

/// One comma-separated cron item: `*`, `*/n`, `a`, `a-b`, `a-b/n`, `a/n`.
static ITEM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\*|(\d+)(?:-(\d+))?)(?:/(\d+))?$").expect("cron item pattern is valid")
});

const FIELDS: [(&str, u32, u32); 5] = [
    ("minute", 0, 59),
    ("hour", 0, 23),
    ("day-of-month", 1, 31),
    ("month", 1, 12),
    ("day-of-week", 0, 7),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CronDescription {
    Resolved(String),
    Pending,
}

impl CronDescription {
    pub fn is_pending(&self) -> bool {
        matches!(self, CronDescription::Pending)
    }
}

/// Describe `expression`, or report it as pending when it does not parse.
pub fn describe(expression: &str) -> CronDescription {
    let fields: Vec<&str> = expression.split_whitespace().collect();
    if fields.len() != FIELDS.len() {
        return CronDescription::Pending;
    }

    for (value, (_, min, max)) in fields.iter().zip(FIELDS) {
        if !field_is_valid(value, min, max) {
            return CronDescription::Pending;
        }
    }

    CronDescription::Resolved(render(&fields))
}

fn field_is_valid(field: &str, min: u32, max: u32) -> bool {
    field.split(',').all(|item| {
        let Some(caps) = ITEM.captures(item) else {
            return false;
        };
        let number = |i: usize| caps.get(i).map(|m| m.as_str().parse::<u32>());

        let in_range = |n: u32| (min..=max).contains(&n);
        let start = match number(1) {
            Some(Ok(n)) if in_range(n) => Some(n),
            Some(_) => return false,
            None => None,
        };
        match number(2) {
            Some(Ok(end)) if in_range(end) && start.is_some_and(|s| s <= end) => {}
            Some(_) => return false,
            None => {}
        }
        match number(3) {
            Some(Ok(step)) if step > 0 => true,
            Some(_) => false,
            None => true,
        }
    })
}

fn render(fields: &[&str]) -> String {
    let (minute, hour) = (fields[0], fields[1]);

    let time = match (minute, hour) {
        ("*", "*") => "Every minute".to_string(),
        (m, "*") if m.starts_with("*/") => format!("Every {} minutes", &m[2..]),
        (m, "*") if is_number(m) => format!("At {} minutes past the hour", m),
        (m, h) if is_number(m) && is_number(h) => {
            format!("At {:0>2}:{:0>2}", h, m)
        }
        (m, h) => format!("At minute {}, hour {}", m, h),
    };

    let qualifiers: Vec<String> = FIELDS[2..]
        .iter()
        .zip(&fields[2..])
        .filter(|(_, value)| **value != "*")
        .map(|((name, _, _), value)| format!("{} {}", name, value))
        .collect();

    if qualifiers.is_empty() {
        time
    } else {
        format!("{}, on {}", time, qualifiers.join(", "))
    }
}

fn is_number(field: &str) -> bool {
    !field.is_empty() && field.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(expr: &str) -> String {
        match describe(expr) {
            CronDescription::Resolved(text) => text,
            CronDescription::Pending => panic!("expected {expr:?} to resolve"),
        }
    }

    #[test]
    fn describes_common_schedules() {
        assert_eq!(resolved("*/30 * * * *"), "Every 30 minutes");
        assert_eq!(resolved("* * * * *"), "Every minute");
        assert_eq!(resolved("15 * * * *"), "At 15 minutes past the hour");
        assert_eq!(resolved("5 3 * * *"), "At 03:05");
        assert_eq!(resolved("0 2 * * 1-5"), "At 02:00, on day-of-week 1-5");
        assert_eq!(resolved("0 */6 1 * *"), "At minute 0, hour */6, on day-of-month 1");
    }

    #[test]
    fn partial_or_invalid_input_is_pending() {
        assert!(describe("").is_pending());
        assert!(describe("*/30 * *").is_pending());
        assert!(describe("60 * * * *").is_pending());
        assert!(describe("* 24 * * *").is_pending());
        assert!(describe("*/0 * * * *").is_pending());
        assert!(describe("5-2 * * * *").is_pending());
        assert!(describe("a * * * *").is_pending());
        assert!(describe("* * * * * *").is_pending());
    }

    #[test]
    fn lists_and_ranges_are_accepted() {
        assert!(!describe("0,15,30,45 * * * *").is_pending());
        assert!(!describe("0 9-17/2 * 1-12 0").is_pending());
    }
}
