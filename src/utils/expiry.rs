use chrono::{DateTime, Duration, Utc};

use crate::errors::{Result, ScantyError};

/// 解析过期时间
///
/// 支持 RFC3339 绝对时间（`2030-01-01T00:00:00Z`），以及相对 `now`
/// 的时长：`30s`、`15m`、`2h`、`7d`、`2w`、`1y`，可组合如 `1d12h`。
pub fn parse_expires(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(at) = DateTime::parse_from_rfc3339(input) {
        return Ok(at.with_timezone(&Utc));
    }

    let offset = parse_duration(input)?;
    now.checked_add_signed(offset)
        .ok_or_else(|| ScantyError::date_parse(format!("过期时间超出范围: '{}'", input)))
}

fn parse_duration(input: &str) -> Result<Duration> {
    let invalid = || ScantyError::date_parse(format!("无效的时间格式: '{}'", input));

    let mut total = Duration::zero();
    let mut rest = input;

    while !rest.is_empty() {
        let digits = rest.find(|c: char| !c.is_ascii_digit()).unwrap_or(rest.len());
        if digits == 0 || digits == rest.len() {
            return Err(invalid());
        }

        let amount: i64 = rest[..digits].parse().map_err(|_| invalid())?;
        let unit = rest[digits..].chars().next().ok_or_else(invalid)?;

        let step = match unit {
            's' => Duration::try_seconds(amount),
            'm' => Duration::try_minutes(amount),
            'h' => Duration::try_hours(amount),
            'd' => Duration::try_days(amount),
            'w' => Duration::try_weeks(amount),
            'y' => amount.checked_mul(365).and_then(Duration::try_days),
            _ => {
                return Err(ScantyError::date_parse(format!(
                    "不支持的时间单位 '{}'，可用: s m h d w y",
                    unit
                )));
            }
        }
        .ok_or_else(invalid)?;

        total = total.checked_add(&step).ok_or_else(invalid)?;
        rest = &rest[digits + unit.len_utf8()..];
    }

    if total.is_zero() {
        return Err(ScantyError::date_parse("过期时长不能为零"));
    }
    Ok(total)
}
