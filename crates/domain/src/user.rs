//! # ユーザー
//!
//! ユーザーエンティティとそれに関連する値オブジェクトを定義する。
//!
//! ## 設計方針
//!
//! - **呼び出し側が採番**: [`UserId`] は整数で、作成リクエストに含まれる
//! - **不変性**: ユーザーは作成後に更新・削除されない
//! - **検証順序**: [`NewUserInput::validate`] は必須項目 → ID → 誕生日の順に検証し、
//!   最初に失敗した検証のメッセージを返す

use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, Utc};
use derive_more::Display;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::DomainError;

/// 必須項目が欠けているときのメッセージ
pub const MISSING_FIELDS_MESSAGE: &str =
    "Missing required fields: id, first_name, last_name, birthday";
/// リクエストボディの ID が数値でないときのメッセージ
pub const INVALID_BODY_ID_MESSAGE: &str = "id must be a number";
/// パスパラメータの ID が数値でないときのメッセージ
pub const INVALID_PATH_ID_MESSAGE: &str = "User id must be a number";
/// 数値ではあるが整数 ID として保存できないときのメッセージ
pub const UNSUPPORTED_ID_MESSAGE: &str = "id must be an integer within the 64-bit range";
/// 誕生日が日付として解釈できないときのメッセージ
pub const INVALID_BIRTHDAY_MESSAGE: &str = "birthday must be a valid date";

/// 誕生日の出力形式（ミリ秒精度の UTC）
const BIRTHDAY_OUTPUT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3fZ";

// =========================================================================
// UserId
// =========================================================================

/// ユーザー ID（呼び出し側が指定する整数）
///
/// 全レコードで一意。一意性はリポジトリの挿入時に保証される。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(transparent)]
#[display("{_0}")]
pub struct UserId(i64);

impl UserId {
    pub fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }

    /// パスパラメータから ID を解釈する
    ///
    /// 前後の空白は無視する。数値表記（`10`, `1.5`, `1e3`, `Infinity` など）で
    /// あれば受け付ける。整数値として表せない数値は、どのユーザーにも一致しない
    /// ため `Ok(None)` を返す。
    ///
    /// # エラー
    ///
    /// 数値として解釈できない場合は `"User id must be a number"`。
    pub fn parse_path(raw: &str) -> Result<Option<Self>, DomainError> {
        parse_number(raw)
            .map(|n| n.to_user_id())
            .ok_or_else(|| DomainError::validation(INVALID_PATH_ID_MESSAGE))
    }

    /// リクエストボディの JSON 値から ID を解釈する
    ///
    /// JSON の数値と、数値を表す文字列を受け付ける。整数値として表せない
    /// 数値は `Ok(None)`。
    ///
    /// # エラー
    ///
    /// 数値として解釈できない場合は `"id must be a number"`。
    pub fn from_json(value: &Value) -> Result<Option<Self>, DomainError> {
        let parsed = match value {
            Value::Number(n) => n
                .as_i64()
                .map(ParsedNumber::Integer)
                .or_else(|| n.as_f64().map(ParsedNumber::Float)),
            Value::String(s) => parse_number(s),
            _ => None,
        };
        parsed
            .map(|n| n.to_user_id())
            .ok_or_else(|| DomainError::validation(INVALID_BODY_ID_MESSAGE))
    }
}

/// 数値として解釈した ID の候補
#[derive(Debug, Clone, Copy)]
enum ParsedNumber {
    Integer(i64),
    Float(f64),
}

impl ParsedNumber {
    fn to_user_id(self) -> Option<UserId> {
        match self {
            Self::Integer(value) => Some(UserId(value)),
            Self::Float(value) => integral_to_i64(value).map(UserId),
        }
    }
}

/// 数値表記を解釈する（`NaN` は数値として扱わない）
fn parse_number(raw: &str) -> Option<ParsedNumber> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(ParsedNumber::Integer(value));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .filter(|value| !value.is_nan())
        .map(ParsedNumber::Float)
}

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn integral_to_i64(value: f64) -> Option<i64> {
    let in_range = value >= i64::MIN as f64 && value < i64::MAX as f64;
    (value.is_finite() && value.fract() == 0.0 && in_range).then_some(value as i64)
}

// =========================================================================
// PersonName
// =========================================================================

/// 氏名の一部（名 / 姓）
///
/// 空文字列は不可。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonName(String);

impl PersonName {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = value.into();
        if value.is_empty() {
            return Err(DomainError::validation(MISSING_FIELDS_MESSAGE));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =========================================================================
// Birthday
// =========================================================================

/// 誕生日
///
/// 入力として ISO 8601 の日付・日時形式を受け付け、UTC の日時として保持する:
///
/// - 日付のみ（`2000`, `2000-01`, `2000-01-01`、UTC の 0 時として扱う）
/// - 日時（`2000-01-01T10:00`, `2000-01-01T10:00:00`, `2000-01-01T10:00:00.000`）
/// - 日時 + タイムゾーン（`Z`, `+09:00`, `+0900`）。タイムゾーンがなければ UTC として扱う
///
/// JSON には `2000-01-01T00:00:00.000Z` の形式で出力する。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Birthday(DateTime<Utc>);

impl Birthday {
    /// 文字列から誕生日を解釈する
    ///
    /// # エラー
    ///
    /// どの形式でも解釈できない場合は `"birthday must be a valid date"`。
    pub fn parse(raw: &str) -> Result<Self, DomainError> {
        let raw = raw.trim();

        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Ok(Self(dt.with_timezone(&Utc)));
        }

        parse_iso_date_time(raw)
            .map(Self)
            .ok_or_else(|| DomainError::validation(INVALID_BIRTHDAY_MESSAGE))
    }

    pub fn from_datetime(value: DateTime<Utc>) -> Self {
        Self(value)
    }

    pub fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl fmt::Display for Birthday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(BIRTHDAY_OUTPUT_FORMAT))
    }
}

impl Serialize for Birthday {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Birthday {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(|e| serde::de::Error::custom(e.message()))
    }
}

/// `YYYY[-MM[-DD]][THH:mm[:ss[.sss]][Z|±HH:mm]]` を解釈する
fn parse_iso_date_time(raw: &str) -> Option<DateTime<Utc>> {
    let (date_part, time_part) = match raw.split_once('T') {
        Some((date, time)) => (date, Some(time)),
        None => (raw, None),
    };
    let date = parse_iso_date(date_part)?;

    let Some(time_part) = time_part else {
        return date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc());
    };

    let (clock, offset) = split_offset(time_part)?;
    let time = NaiveTime::parse_from_str(clock, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(clock, "%H:%M"))
        .ok()?;

    date.and_time(time)
        .and_local_timezone(offset)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let well_formed = raw
        .bytes()
        .enumerate()
        .all(|(i, b)| if i == 4 || i == 7 { b == b'-' } else { b.is_ascii_digit() });
    if !well_formed {
        return None;
    }

    let padded = match raw.len() {
        4 => format!("{raw}-01-01"),
        7 => format!("{raw}-01"),
        10 => raw.to_string(),
        _ => return None,
    };
    NaiveDate::parse_from_str(&padded, "%Y-%m-%d").ok()
}

/// 時刻部分をタイムゾーン指定とそれ以外に分ける（指定なしは UTC）
fn split_offset(time: &str) -> Option<(&str, FixedOffset)> {
    let utc = FixedOffset::east_opt(0)?;
    if let Some(clock) = time.strip_suffix('Z') {
        return Some((clock, utc));
    }
    let Some(pos) = time.rfind(['+', '-']) else {
        return Some((time, utc));
    };

    let (clock, zone) = time.split_at(pos);
    let sign = if zone.starts_with('-') { -1 } else { 1 };
    let digits = zone[1..].replace(':', "");
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    if hours > 23 || minutes > 59 {
        return None;
    }
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60)).map(|offset| (clock, offset))
}

// =========================================================================
// User
// =========================================================================

/// ユーザー（エンティティ）
///
/// JSON 形式は `{id, first_name, last_name, birthday}`。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id:         UserId,
    first_name: PersonName,
    last_name:  PersonName,
    birthday:   Birthday,
}

impl User {
    pub fn new(
        id: UserId,
        first_name: PersonName,
        last_name: PersonName,
        birthday: Birthday,
    ) -> Self {
        Self {
            id,
            first_name,
            last_name,
            birthday,
        }
    }

    pub fn id(&self) -> UserId {
        self.id
    }

    pub fn first_name(&self) -> &PersonName {
        &self.first_name
    }

    pub fn last_name(&self) -> &PersonName {
        &self.last_name
    }

    pub fn birthday(&self) -> &Birthday {
        &self.birthday
    }
}

// =========================================================================
// NewUserInput
// =========================================================================

/// ユーザー作成リクエストの生入力
///
/// 型の不一致でデシリアライズ自体が失敗しないよう、各フィールドを
/// JSON 値のまま受け取り [`validate`](Self::validate) で検証する。
/// `null` は未指定として扱う。
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct NewUserInput {
    pub id:         Option<Value>,
    pub first_name: Option<Value>,
    pub last_name:  Option<Value>,
    pub birthday:   Option<Value>,
}

impl NewUserInput {
    /// 入力を検証し、永続化前の [`User`] を組み立てる
    ///
    /// 検証順序（最初の失敗を返す）:
    ///
    /// 1. 4 項目がすべて存在し、氏名と誕生日が空でない文字列であること
    /// 2. `id` が数値であること
    /// 3. `birthday` が日付として解釈できること
    /// 4. `id` が整数 ID として保存できること（`1.5` などは保存できない）
    pub fn validate(&self) -> Result<User, DomainError> {
        let (Some(id), Some(first_name), Some(last_name), Some(birthday)) = (
            self.id.as_ref(),
            non_empty_str(self.first_name.as_ref()),
            non_empty_str(self.last_name.as_ref()),
            non_empty_str(self.birthday.as_ref()),
        ) else {
            return Err(DomainError::validation(MISSING_FIELDS_MESSAGE));
        };

        let id = UserId::from_json(id)?;
        let birthday = Birthday::parse(birthday)?;
        let id = id.ok_or_else(|| DomainError::validation(UNSUPPORTED_ID_MESSAGE))?;

        Ok(User::new(
            id,
            PersonName::new(first_name)?,
            PersonName::new(last_name)?,
            birthday,
        ))
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<&str> {
    match value {
        Some(Value::String(s)) if !s.is_empty() => Some(s.as_str()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    use super::*;

    fn input(value: Value) -> NewUserInput {
        serde_json::from_value(value).unwrap()
    }

    // ===== UserId =====

    #[rstest]
    #[case("10", 10)]
    #[case(" 42 ", 42)]
    #[case("-7", -7)]
    #[case("1e3", 1000)]
    #[case("5.0", 5)]
    fn test_parse_path_整数値として解釈できる(#[case] raw: &str, #[case] expected: i64) {
        assert_eq!(UserId::parse_path(raw).unwrap(), Some(UserId::new(expected)));
    }

    #[rstest]
    #[case("1.5")]
    #[case("1e300")]
    #[case("Infinity")]
    #[case("-inf")]
    fn test_parse_path_整数で表せない数値はnone(#[case] raw: &str) {
        assert_eq!(UserId::parse_path(raw).unwrap(), None);
    }

    #[rstest]
    #[case("abc")]
    #[case("")]
    #[case("10abc")]
    #[case("0x10")]
    #[case("NaN")]
    fn test_parse_path_数値でなければエラー(#[case] raw: &str) {
        let err = UserId::parse_path(raw).unwrap_err();
        assert_eq!(err.message(), "User id must be a number");
    }

    #[rstest]
    #[case(json!(10), Some(10))]
    #[case(json!("11"), Some(11))]
    #[case(json!(12.0), Some(12))]
    #[case(json!(1.5), None)]
    #[case(json!("1e300"), None)]
    fn test_from_json_数値と数値文字列を受け付ける(
        #[case] value: Value,
        #[case] expected: Option<i64>,
    ) {
        assert_eq!(UserId::from_json(&value).unwrap(), expected.map(UserId::new));
    }

    #[rstest]
    #[case(json!("abc"))]
    #[case(json!(true))]
    #[case(json!([1]))]
    #[case(json!("NaN"))]
    fn test_from_json_数値でなければエラー(#[case] value: Value) {
        let err = UserId::from_json(&value).unwrap_err();
        assert_eq!(err.message(), "id must be a number");
    }

    // ===== Birthday =====

    #[test]
    fn test_birthday_日付のみはutcの0時として出力される() {
        let birthday = Birthday::parse("2000-01-01").unwrap();
        assert_eq!(birthday.to_string(), "2000-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_birthday_オフセット付き日時はutcに変換される() {
        let birthday = Birthday::parse("2000-01-01T09:00:00+09:00").unwrap();
        assert_eq!(birthday.to_string(), "2000-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_birthday_タイムゾーンなし日時はutcとして扱う() {
        let birthday = Birthday::parse("1999-12-31T23:59:59.5").unwrap();
        assert_eq!(birthday.to_string(), "1999-12-31T23:59:59.500Z");
    }

    #[rstest]
    #[case("2000", "2000-01-01T00:00:00.000Z")]
    #[case("2000-02", "2000-02-01T00:00:00.000Z")]
    #[case("2000-01-01T10:00", "2000-01-01T10:00:00.000Z")]
    #[case("2000-01-01T00:00Z", "2000-01-01T00:00:00.000Z")]
    #[case("2000-01-01T09:00+09:00", "2000-01-01T00:00:00.000Z")]
    #[case("2000-01-01T10:00:00-0130", "2000-01-01T11:30:00.000Z")]
    #[case("2000-01-01T10:00:00.250Z", "2000-01-01T10:00:00.250Z")]
    fn test_birthday_iso_8601の省略形を受け付ける(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(Birthday::parse(raw).unwrap().to_string(), expected);
    }

    #[rstest]
    #[case("bad-date")]
    #[case("2000-13-01")]
    #[case("2001-02-29")]
    #[case("2000-1")]
    #[case("2000-01-01T25:00")]
    #[case("2000-01-01T10")]
    #[case("2000-01-01T10:00+9")]
    fn test_birthday_不正な日付はエラー(#[case] raw: &str) {
        let err = Birthday::parse(raw).unwrap_err();
        assert_eq!(err.message(), "birthday must be a valid date");
    }

    // ===== User =====

    #[test]
    fn test_userのjson形式() {
        let user = User::new(
            UserId::new(10),
            PersonName::new("Test").unwrap(),
            PersonName::new("User").unwrap(),
            Birthday::parse("2000-01-01").unwrap(),
        );

        let json = serde_json::to_value(&user).unwrap();

        assert_eq!(
            json,
            json!({
                "id": 10,
                "first_name": "Test",
                "last_name": "User",
                "birthday": "2000-01-01T00:00:00.000Z"
            })
        );
    }

    // ===== NewUserInput::validate =====

    #[test]
    fn test_validate_正常な入力からユーザーを組み立てる() {
        let user = input(json!({
            "id": 10,
            "first_name": "Test",
            "last_name": "User",
            "birthday": "2000-01-01"
        }))
        .validate()
        .unwrap();

        assert_eq!(user.id(), UserId::new(10));
        assert_eq!(user.first_name().as_str(), "Test");
        assert_eq!(user.last_name().as_str(), "User");
        assert_eq!(user.birthday().to_string(), "2000-01-01T00:00:00.000Z");
    }

    #[rstest]
    #[case(json!({ "id": 10 }))]
    #[case(json!({ "first_name": "Test", "last_name": "User", "birthday": "2000-01-01" }))]
    #[case(json!({ "id": null, "first_name": "Test", "last_name": "User", "birthday": "2000-01-01" }))]
    #[case(json!({ "id": 10, "first_name": "", "last_name": "User", "birthday": "2000-01-01" }))]
    #[case(json!({ "id": 10, "first_name": "Test", "last_name": "User", "birthday": "" }))]
    #[case(json!({ "id": 10, "first_name": 5, "last_name": "User", "birthday": "2000-01-01" }))]
    fn test_validate_必須項目の欠落(#[case] value: Value) {
        let err = input(value).validate().unwrap_err();
        assert_eq!(
            err.message(),
            "Missing required fields: id, first_name, last_name, birthday"
        );
    }

    #[test]
    fn test_validate_必須項目の検証がid検証より先に行われる() {
        let err = input(json!({ "id": "abc", "first_name": "Test" }))
            .validate()
            .unwrap_err();
        assert_eq!(
            err.message(),
            "Missing required fields: id, first_name, last_name, birthday"
        );
    }

    #[test]
    fn test_validate_id検証が誕生日検証より先に行われる() {
        let err = input(json!({
            "id": "abc",
            "first_name": "Test",
            "last_name": "User",
            "birthday": "bad-date"
        }))
        .validate()
        .unwrap_err();
        assert_eq!(err.message(), "id must be a number");
    }

    #[test]
    fn test_validate_整数で表せないidは誕生日検証の後にエラー() {
        let err = input(json!({
            "id": 1.5,
            "first_name": "Test",
            "last_name": "User",
            "birthday": "2000-01-01"
        }))
        .validate()
        .unwrap_err();
        assert_eq!(err.message(), "id must be an integer within the 64-bit range");
    }

    #[test]
    fn test_validate_整数で表せないidより誕生日の不正が先に報告される() {
        let err = input(json!({
            "id": 1.5,
            "first_name": "Test",
            "last_name": "User",
            "birthday": "bad-date"
        }))
        .validate()
        .unwrap_err();
        assert_eq!(err.message(), "birthday must be a valid date");
    }

    #[test]
    fn test_validate_不正な誕生日() {
        let err = input(json!({
            "id": 10,
            "first_name": "Test",
            "last_name": "User",
            "birthday": "bad-date"
        }))
        .validate()
        .unwrap_err();
        assert_eq!(err.message(), "birthday must be a valid date");
    }
}
