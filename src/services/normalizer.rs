//! Record normalization service
//!
//! Maps arbitrarily keyed feed records to a canonical [`NormalizedRecord`] by
//! trying an ordered list of alias keys per canonical field. All schema
//! ambiguity across feeds lives here.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::amount::parse_amount;
use super::date::DateParser;
use crate::types::{NormalizedRecord, RawRecord};

/// Placeholder for unresolvable product and user keys
pub const UNKNOWN: &str = "unknown";

fn aliases(keys: &[&str]) -> Vec<String> {
    keys.iter().map(|k| k.to_string()).collect()
}

/// Ordered alias lists per canonical field (first present, usable key wins).
///
/// Any list left out of a config file keeps its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AliasTable {
    pub product: Vec<String>,
    pub amount: Vec<String>,
    pub user: Vec<String>,
    pub end_date: Vec<String>,
    pub start: Vec<String>,
    pub daily_return: Vec<String>,
    pub status: Vec<String>,
    pub extra: Vec<String>,
    pub address: Vec<String>,
}

impl Default for AliasTable {
    fn default() -> Self {
        Self {
            product: aliases(&["产品名称", "产品", "product_name"]),
            amount: aliases(&["购买金额", "认购额度", "amount", "认购金额"]),
            user: aliases(&["用户", "会员ID", "phone"]),
            end_date: aliases(&["结束时间", "结束", "end"]),
            start: aliases(&["开始", "买入时间", "start"]),
            daily_return: aliases(&["每日应返", "每期返", "daily_return"]),
            status: aliases(&["状态", "status"]),
            extra: aliases(&["额外", "extra"]),
            address: aliases(&["地址", "address"]),
        }
    }
}

/// A value counts as present unless it is null or a blank string
fn is_usable(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}

/// First usable value among `keys`
fn resolve<'a>(record: &'a RawRecord, keys: &[String]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|k| record.get(k))
        .find(|v| is_usable(v))
}

/// Render a scalar as text; phone numbers frequently arrive as JSON numbers
fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

fn resolve_text(record: &RawRecord, keys: &[String]) -> Option<String> {
    resolve(record, keys).map(value_to_text)
}

/// Optional numeric pass-through: absent stays absent, unparseable becomes 0
fn resolve_number(record: &RawRecord, keys: &[String]) -> Option<f64> {
    resolve(record, keys).map(|v| parse_amount(Some(v)))
}

/// Pure, total mapping from raw feed records to canonical records
#[derive(Debug, Clone)]
pub struct Normalizer {
    aliases: AliasTable,
    dates: DateParser,
}

impl Normalizer {
    pub fn new(aliases: AliasTable, dates: DateParser) -> Self {
        Self { aliases, dates }
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    /// Normalize one record. Never fails; missing or malformed fields degrade
    /// to their documented defaults.
    pub fn normalize(&self, record: &RawRecord) -> NormalizedRecord {
        let a = &self.aliases;

        let product = resolve_text(record, &a.product).unwrap_or_else(|| {
            tracing::debug!(origin = record.origin.key(), "no product alias matched");
            UNKNOWN.to_string()
        });
        let user = resolve_text(record, &a.user).unwrap_or_else(|| {
            tracing::debug!(origin = record.origin.key(), "no user alias matched");
            UNKNOWN.to_string()
        });
        let amount = parse_amount(resolve(record, &a.amount));
        let end_date_raw = resolve_text(record, &a.end_date);
        let end_date = self.dates.parse(end_date_raw.as_deref());
        if end_date.is_none() {
            if let Some(raw) = &end_date_raw {
                tracing::debug!(raw = raw.as_str(), "unparseable end date");
            }
        }

        NormalizedRecord {
            origin: record.origin,
            product,
            amount,
            user,
            end_date_raw,
            end_date,
            start: resolve_text(record, &a.start),
            daily_return: resolve_number(record, &a.daily_return),
            status: resolve_text(record, &a.status),
            extra: resolve_number(record, &a.extra),
            address: resolve_text(record, &a.address),
        }
    }

    /// Normalize a sequence, preserving order and count
    pub fn normalize_all<'a, I>(&'a self, records: I) -> impl Iterator<Item = NormalizedRecord> + 'a
    where
        I: IntoIterator<Item = &'a RawRecord>,
        I::IntoIter: 'a,
    {
        records.into_iter().map(move |r| self.normalize(r))
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(AliasTable::default(), DateParser::new(2026))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Origin;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn raw(value: Value) -> RawRecord {
        RawRecord::from_value(Origin::Inj, value)
    }

    // ========== Alias priority ==========

    #[test]
    fn test_first_alias_wins() {
        let rec = raw(json!({"产品": "B", "产品名称": "A"}));
        assert_eq!(Normalizer::default().normalize(&rec).product, "A");
    }

    #[test]
    fn test_later_alias_used_when_earlier_absent() {
        let rec = raw(json!({"product_name": "INJ-30", "会员ID": "M001", "amount": "500"}));
        let n = Normalizer::default().normalize(&rec);
        assert_eq!(n.product, "INJ-30");
        assert_eq!(n.user, "M001");
        assert_eq!(n.amount, 500.0);
    }

    #[test]
    fn test_null_and_blank_fall_through() {
        let rec = raw(json!({"用户": null, "会员ID": "  ", "phone": "139"}));
        assert_eq!(Normalizer::default().normalize(&rec).user, "139");
    }

    #[test]
    fn test_numeric_user_rendered_as_text() {
        let rec = raw(json!({"用户": 13392776413u64}));
        assert_eq!(Normalizer::default().normalize(&rec).user, "13392776413");
    }

    #[test]
    fn test_user_value_trimmed() {
        let rec = raw(json!({"用户": " 138 "}));
        assert_eq!(Normalizer::default().normalize(&rec).user, "138");
    }

    // ========== Defaults ==========

    #[test]
    fn test_empty_record_defaults() {
        let n = Normalizer::default().normalize(&raw(json!({})));
        assert_eq!(n.product, UNKNOWN);
        assert_eq!(n.user, UNKNOWN);
        assert_eq!(n.amount, 0.0);
        assert_eq!(n.end_date_raw, None);
        assert_eq!(n.end_date, None);
        assert_eq!(n.start, None);
        assert_eq!(n.daily_return, None);
    }

    #[test]
    fn test_non_object_record_defaults() {
        let n = Normalizer::default().normalize(&raw(json!(42)));
        assert_eq!(n.user, UNKNOWN);
        assert_eq!(n.origin, Origin::Inj);
    }

    // ========== Dates and pass-through ==========

    #[test]
    fn test_end_date_parsed() {
        let rec = raw(json!({"结束": "1月14日 23:00"}));
        let n = Normalizer::default().normalize(&rec);
        assert_eq!(n.end_date_raw.as_deref(), Some("1月14日 23:00"));
        assert_eq!(n.end_date, Some(Utc.with_ymd_and_hms(2026, 1, 14, 23, 0, 0).unwrap()));
    }

    #[test]
    fn test_unparseable_end_date_keeps_raw() {
        let rec = raw(json!({"结束时间": "长期"}));
        let n = Normalizer::default().normalize(&rec);
        assert_eq!(n.end_date_raw.as_deref(), Some("长期"));
        assert_eq!(n.end_date, None);
    }

    #[test]
    fn test_pass_through_fields() {
        let rec = raw(json!({
            "开始": "2026/1/1",
            "每日应返": "12.5",
            "状态": "进行中",
            "额外": 3,
            "地址": "Hangzhou"
        }));
        let n = Normalizer::default().normalize(&rec);
        assert_eq!(n.start.as_deref(), Some("2026/1/1"));
        assert_eq!(n.daily_return, Some(12.5));
        assert_eq!(n.status.as_deref(), Some("进行中"));
        assert_eq!(n.extra, Some(3.0));
        assert_eq!(n.address.as_deref(), Some("Hangzhou"));
    }

    #[test]
    fn test_custom_alias_table() {
        let aliases = AliasTable {
            user: vec!["wallet".into()],
            ..AliasTable::default()
        };
        let normalizer = Normalizer::new(aliases, DateParser::new(2026));
        let rec = raw(json!({"用户": "ignored", "wallet": "0xabc"}));
        assert_eq!(normalizer.normalize(&rec).user, "0xabc");
    }

    #[test]
    fn test_alias_table_partial_deserialize_keeps_defaults() {
        let table: AliasTable = serde_json::from_str(r#"{"user": ["uid"]}"#).unwrap();
        assert_eq!(table.user, vec!["uid".to_string()]);
        assert_eq!(table.product, AliasTable::default().product);
    }

    #[test]
    fn test_normalize_all_preserves_count_and_order() {
        let recs = vec![
            raw(json!({"用户": "a"})),
            raw(json!({})),
            raw(json!({"用户": "b"})),
        ];
        let normalizer = Normalizer::default();
        let users: Vec<String> = normalizer.normalize_all(&recs).map(|n| n.user).collect();
        assert_eq!(users, vec!["a", UNKNOWN, "b"]);
    }
}
