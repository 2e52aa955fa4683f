//! # Canonical Log Line
//!
//! HTTP リクエスト完了時に、そのリクエストの重要情報を 1 件に集約した
//! サマリ（Canonical Log Line）を表現する。
//!
//! Stripe が提唱した [Canonical Log Lines パターン](https://brandur.org/canonical-log-lines)
//! に基づき、ログの検索性・集計性を向上させる。
//!
//! ## 責務分離
//!
//! - [`RequestFailure`]: ハンドラが失敗時にレスポンス extensions へ添付するエラー情報
//! - [`RequestLogEntry`]: 1 リクエスト 1 件の完了レコード（外部ログサービスへの送信形式を兼ねる）
//! - [`emit_canonical_log_line`]: レコードを tracing イベントとして出力する
//!
//! ミドルウェア本体（計測・送信）は各サービス側に置く。

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// ヘルスチェックパスかどうかを判定する
///
/// `/health`（liveness）と `/health/` 配下（`/health/ready` など）を除外対象とする。
pub fn is_health_check_path(path: &str) -> bool {
    path == "/health" || path.starts_with("/health/")
}

/// ハンドラが失敗したことを示すレスポンス extension
///
/// エラーレスポンスを生成する側が添付し、リクエストログ側が読み取る。
/// リクエスト間で共有される可変状態は存在しない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFailure {
    /// HTTP ステータスコード
    pub status:  u16,
    /// クライアントに返したエラーメッセージ
    pub message: String,
}

impl RequestFailure {
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

/// リクエスト完了レコード
///
/// JSON では camelCase（`statusCode`, `durationMs`）で出力される。
/// `error` は失敗時のみ値を持ち、成功時は `null`。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestLogEntry {
    pub service:     String,
    pub method:      String,
    pub url:         String,
    pub status_code: u16,
    /// マッチしたルートテンプレート（例: `/api/exists/{id}`）。未マッチ時はパス
    pub endpoint:    String,
    pub timestamp:   DateTime<Utc>,
    pub duration_ms: u64,
    pub message:     String,
    pub error:       Option<String>,
}

/// [`RequestLogEntry`] の組み立てに必要なリクエスト情報
#[derive(Debug, Clone)]
pub struct CompletedRequest<'a> {
    pub service:  &'a str,
    pub method:   &'a str,
    pub url:      &'a str,
    pub endpoint: &'a str,
    pub status:   u16,
    pub elapsed:  Duration,
    pub failure:  Option<&'a RequestFailure>,
}

impl RequestLogEntry {
    /// 完了したリクエストからレコードを作成する
    pub fn from_completed(request: CompletedRequest<'_>, timestamp: DateTime<Utc>) -> Self {
        let duration_ms = u64::try_from(request.elapsed.as_millis()).unwrap_or(u64::MAX);
        Self {
            service: request.service.to_string(),
            method: request.method.to_string(),
            url: request.url.to_string(),
            status_code: request.status,
            endpoint: request.endpoint.to_string(),
            timestamp,
            duration_ms,
            message: format!(
                "HTTP {} {} finished in {}ms",
                request.method, request.url, duration_ms
            ),
            error: request.failure.map(|f| f.message.clone()),
        }
    }
}

/// Canonical Log Line を tracing イベントとして出力する
///
/// INFO レベルで `log.type = "canonical"` マーカー付きのイベントを 1 件出力する。
/// 5xx の場合は ERROR レベルとする。
pub fn emit_canonical_log_line(entry: &RequestLogEntry) {
    if entry.status_code >= 500 {
        tracing::error!(
            log.r#type = "canonical",
            service = %entry.service,
            http.method = %entry.method,
            http.url = %entry.url,
            http.route = %entry.endpoint,
            http.status_code = entry.status_code,
            http.latency_ms = entry.duration_ms,
            error.message = entry.error.as_deref(),
            "リクエスト処理エラー"
        );
    } else {
        tracing::info!(
            log.r#type = "canonical",
            service = %entry.service,
            http.method = %entry.method,
            http.url = %entry.url,
            http.route = %entry.endpoint,
            http.status_code = entry.status_code,
            http.latency_ms = entry.duration_ms,
            error.message = entry.error.as_deref(),
            "リクエスト完了"
        );
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;
    use tracing_subscriber::layer::SubscriberExt;

    use super::*;

    /// テスト用にログイベントをキャプチャする Layer
    #[derive(Clone)]
    struct CaptureLayer {
        events: Arc<Mutex<Vec<CapturedEvent>>>,
    }

    #[derive(Debug, Clone)]
    struct CapturedEvent {
        level:   tracing::Level,
        message: String,
        fields:  Vec<(String, String)>,
    }

    impl CapturedEvent {
        fn field(&self, name: &str) -> Option<&str> {
            self.fields
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        }
    }

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for CaptureLayer {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            let mut visitor = FieldVisitor::default();
            event.record(&mut visitor);

            self.events.lock().unwrap().push(CapturedEvent {
                level:   *event.metadata().level(),
                message: visitor.message.unwrap_or_default(),
                fields:  visitor.fields,
            });
        }
    }

    #[derive(Default)]
    struct FieldVisitor {
        message: Option<String>,
        fields:  Vec<(String, String)>,
    }

    impl tracing::field::Visit for FieldVisitor {
        fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                self.message = Some(format!("{:?}", value));
            } else {
                self.fields
                    .push((field.name().to_string(), format!("{:?}", value)));
            }
        }

        fn record_u64(&mut self, field: &tracing::field::Field, value: u64) {
            self.fields
                .push((field.name().to_string(), value.to_string()));
        }

        fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
            if field.name() == "message" {
                self.message = Some(value.to_string());
            } else {
                self.fields
                    .push((field.name().to_string(), value.to_string()));
            }
        }
    }

    fn setup_capture() -> (
        tracing::subscriber::DefaultGuard,
        Arc<Mutex<Vec<CapturedEvent>>>,
    ) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let capture = CaptureLayer {
            events: events.clone(),
        };
        let subscriber = tracing_subscriber::registry().with(capture);
        let guard = tracing::subscriber::set_default(subscriber);
        (guard, events)
    }

    fn fixed_timestamp() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn completed<'a>(status: u16, failure: Option<&'a RequestFailure>) -> CompletedRequest<'a> {
        CompletedRequest {
            service: "user-service",
            method: "GET",
            url: "/api/exists/10",
            endpoint: "/api/exists/{id}",
            status,
            elapsed: Duration::from_millis(42),
            failure,
        }
    }

    // ===== is_health_check_path テスト =====

    #[test]
    fn test_is_health_check_path_healthでtrueを返す() {
        assert!(is_health_check_path("/health"));
        assert!(is_health_check_path("/health/ready"));
    }

    #[test]
    fn test_is_health_check_path_apiパスでfalseを返す() {
        assert!(!is_health_check_path("/api/users"));
        assert!(!is_health_check_path("/"));
    }

    #[test]
    fn test_is_health_check_path_healthで始まる別のパスでfalseを返す() {
        assert!(!is_health_check_path("/healthz"));
        assert!(!is_health_check_path("/health-anything"));
        assert!(!is_health_check_path("/api/health"));
    }

    // ===== RequestLogEntry テスト =====

    #[test]
    fn test_from_completed_成功時はerrorがnone() {
        let entry = RequestLogEntry::from_completed(completed(200, None), fixed_timestamp());

        assert_eq!(entry.status_code, 200);
        assert_eq!(entry.duration_ms, 42);
        assert_eq!(entry.endpoint, "/api/exists/{id}");
        assert_eq!(entry.message, "HTTP GET /api/exists/10 finished in 42ms");
        assert_eq!(entry.error, None);
    }

    #[test]
    fn test_from_completed_失敗時はfailureのメッセージを保持する() {
        let failure = RequestFailure::new(400, "User id must be a number");

        let entry =
            RequestLogEntry::from_completed(completed(400, Some(&failure)), fixed_timestamp());

        assert_eq!(entry.error.as_deref(), Some("User id must be a number"));
    }

    #[test]
    fn test_jsonシリアライズでcamel_caseになる() {
        let entry = RequestLogEntry::from_completed(completed(200, None), fixed_timestamp());

        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["statusCode"], 200);
        assert_eq!(json["durationMs"], 42);
        assert_eq!(json["service"], "user-service");
        assert_eq!(json["timestamp"], "2023-11-14T22:13:20Z");
        assert!(json["error"].is_null());
        assert!(json.get("status_code").is_none());
    }

    // ===== emit_canonical_log_line テスト =====

    #[test]
    fn test_正常リクエストでinfoレベルのcanonical_log_lineが出力される() {
        let (_guard, events) = setup_capture();
        let entry = RequestLogEntry::from_completed(completed(200, None), fixed_timestamp());

        emit_canonical_log_line(&entry);

        let captured = events.lock().unwrap();
        assert_eq!(captured.len(), 1, "1つのログイベントが出力されること");
        assert_eq!(captured[0].level, tracing::Level::INFO);
        assert_eq!(captured[0].message, "リクエスト完了");
        assert_eq!(captured[0].field("log.type"), Some("canonical"));
        assert_eq!(captured[0].field("http.status_code"), Some("200"));
        assert_eq!(captured[0].field("error.message"), None);
    }

    #[test]
    fn test_5xxはerrorレベルでエラーメッセージ付きで出力される() {
        let (_guard, events) = setup_capture();
        let failure = RequestFailure::new(500, "cost down");
        let entry =
            RequestLogEntry::from_completed(completed(500, Some(&failure)), fixed_timestamp());

        emit_canonical_log_line(&entry);

        let captured = events.lock().unwrap();
        assert_eq!(captured.len(), 1);
        assert_eq!(captured[0].level, tracing::Level::ERROR);
        assert_eq!(captured[0].message, "リクエスト処理エラー");
        assert_eq!(captured[0].field("error.message"), Some("cost down"));
    }
}
