/// Animal protection open data API (data.go.kr)
///
/// Two services are used: `abandonmentPublicService_v2` for abandoned
/// animals and the region/kind code tables, and `animalShelterSrvc_v2` for the
/// shelter registry. Both answer with the same envelope:
///
/// ```json
/// { "response": {
///     "header": { "resultCode": "00", "resultMsg": "NORMAL SERVICE." },
///     "body": { "items": { "item": [ ... ] }, "pageNo": 1, "numOfRows": 20, "totalCount": 2 } } }
/// ```
use super::{normalize_items, require, send_json};
use crate::config::OpenDataConfig;
use crate::error::{AppError, Result};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

const SERVICE: &str = "open-data";
const RESULT_OK: &str = "00";

/// Filters for the abandoned-animal listing, already validated
#[derive(Debug, Clone, Default)]
pub struct AnimalQuery {
    pub bgnde: String,
    pub endde: String,
    pub upkind: Option<String>,
    pub kind: Option<String>,
    pub upr_cd: Option<String>,
    pub org_cd: Option<String>,
    pub care_reg_no: Option<String>,
    pub state: Option<String>,
    pub neuter_yn: Option<String>,
    pub page_no: u32,
    pub num_of_rows: u32,
}

#[derive(Debug, Clone, Default)]
pub struct ShelterQuery {
    pub care_reg_no: Option<String>,
    pub care_nm: Option<String>,
    pub page_no: u32,
    pub num_of_rows: u32,
}

/// One page of upstream items, always as a list
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct OpenDataPage {
    #[schema(value_type = Vec<Object>)]
    pub items: Vec<Value>,
    pub total_count: u64,
    pub page_no: u32,
    pub num_of_rows: u32,
}

#[derive(Clone)]
pub struct OpenDataClient {
    http: reqwest::Client,
    animal_base_url: String,
    shelter_base_url: String,
    service_key: Option<String>,
}

impl OpenDataClient {
    pub fn new(http: reqwest::Client, config: &OpenDataConfig) -> Self {
        Self {
            http,
            animal_base_url: config.animal_base_url.trim_end_matches('/').to_string(),
            shelter_base_url: config.shelter_base_url.trim_end_matches('/').to_string(),
            service_key: config.service_key.clone(),
        }
    }

    pub async fn abandoned_animals(&self, query: &AnimalQuery) -> Result<OpenDataPage> {
        let mut params = vec![
            ("bgnde", query.bgnde.clone()),
            ("endde", query.endde.clone()),
            ("pageNo", query.page_no.to_string()),
            ("numOfRows", query.num_of_rows.to_string()),
        ];
        let optional = [
            ("upkind", &query.upkind),
            ("kind", &query.kind),
            ("upr_cd", &query.upr_cd),
            ("org_cd", &query.org_cd),
            ("care_reg_no", &query.care_reg_no),
            ("state", &query.state),
            ("neuter_yn", &query.neuter_yn),
        ];
        params.extend(
            optional
                .into_iter()
                .filter_map(|(name, value)| value.clone().map(|v| (name, v))),
        );

        self.fetch(&self.animal_base_url, "abandonmentPublic_v2", params)
            .await
    }

    pub async fn shelters(&self, query: &ShelterQuery) -> Result<OpenDataPage> {
        let mut params = vec![
            ("pageNo", query.page_no.to_string()),
            ("numOfRows", query.num_of_rows.to_string()),
        ];
        if let Some(care_reg_no) = &query.care_reg_no {
            params.push(("care_reg_no", care_reg_no.clone()));
        }
        if let Some(care_nm) = &query.care_nm {
            params.push(("care_nm", care_nm.clone()));
        }

        self.fetch(&self.shelter_base_url, "shelterInfo_v2", params)
            .await
    }

    /// Province (시도) codes
    pub async fn sido(&self) -> Result<OpenDataPage> {
        let params = vec![("pageNo", "1".to_string()), ("numOfRows", "1000".to_string())];
        self.fetch(&self.animal_base_url, "sido_v2", params).await
    }

    /// District (시군구) codes below a province
    pub async fn sigungu(&self, upr_cd: &str) -> Result<OpenDataPage> {
        let params = vec![("upr_cd", upr_cd.to_string())];
        self.fetch(&self.animal_base_url, "sigungu_v2", params).await
    }

    /// Breed codes below a species code (dog 417000, cat 422400, other 429900)
    pub async fn kinds(&self, up_kind_cd: &str) -> Result<OpenDataPage> {
        let params = vec![("up_kind_cd", up_kind_cd.to_string())];
        self.fetch(&self.animal_base_url, "kind_v2", params).await
    }

    async fn fetch(
        &self,
        base_url: &str,
        operation: &str,
        mut params: Vec<(&'static str, String)>,
    ) -> Result<OpenDataPage> {
        let service_key = require(&self.service_key, "OPEN_DATA_SERVICE_KEY")?;
        params.push(("serviceKey", service_key.to_string()));
        params.push(("_type", "json".to_string()));

        let url = format!("{}/{}", base_url, operation);
        tracing::debug!(operation, "calling open data API");

        let body: Value = send_json(SERVICE, self.http.get(&url).query(&params)).await?;
        parse_page(&body)
    }
}

/// Unwrap the `response` envelope, rejecting non-`00` result codes
pub fn parse_page(body: &Value) -> Result<OpenDataPage> {
    let response = body.get("response").ok_or_else(|| AppError::Upstream {
        service: SERVICE,
        status: 502,
        message: "response envelope missing".to_string(),
        detail: Some(body.to_string()),
    })?;

    let header = response.get("header");
    let result_code = header
        .and_then(|h| h.get("resultCode"))
        .and_then(Value::as_str)
        .unwrap_or_default();
    if result_code != RESULT_OK {
        let result_msg = header
            .and_then(|h| h.get("resultMsg"))
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(AppError::Upstream {
            service: SERVICE,
            status: 502,
            message: format!("resultCode {}: {}", result_code, result_msg),
            detail: header.map(Value::to_string),
        });
    }

    let body = response.get("body");
    let items = normalize_items(
        body.and_then(|b| b.get("items"))
            .and_then(|items| items.get("item")),
    );

    Ok(OpenDataPage {
        total_count: number(body, "totalCount").unwrap_or(items.len() as u64),
        page_no: number(body, "pageNo").unwrap_or(1) as u32,
        num_of_rows: number(body, "numOfRows").unwrap_or(items.len() as u64) as u32,
        items,
    })
}

/// Counters arrive as numbers or numeric strings depending on the endpoint
fn number(body: Option<&Value>, field: &str) -> Option<u64> {
    match body?.get(field)? {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn envelope(items: Value, total: Value) -> Value {
        json!({
            "response": {
                "header": { "reqNo": 1, "resultCode": "00", "resultMsg": "NORMAL SERVICE." },
                "body": { "items": items, "numOfRows": 20, "pageNo": 1, "totalCount": total }
            }
        })
    }

    #[test]
    fn test_single_item_becomes_list() {
        let page = parse_page(&envelope(
            json!({ "item": { "desertionNo": "448548202400123" } }),
            json!(1),
        ))
        .unwrap();

        assert_eq!(page.items.len(), 1);
        assert_eq!(page.total_count, 1);
        assert_eq!(page.items[0]["desertionNo"], "448548202400123");
    }

    #[test]
    fn test_empty_items_string() {
        let page = parse_page(&envelope(json!(""), json!("0"))).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total_count, 0);
        assert_eq!(page.num_of_rows, 20);
    }

    #[test]
    fn test_error_result_code() {
        let body = json!({
            "response": { "header": { "resultCode": "30", "resultMsg": "SERVICE_KEY_IS_NOT_REGISTERED_ERROR" } }
        });

        match parse_page(&body).unwrap_err() {
            AppError::Upstream { status, message, .. } => {
                assert_eq!(status, 502);
                assert!(message.contains("SERVICE_KEY_IS_NOT_REGISTERED_ERROR"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_envelope() {
        assert!(parse_page(&json!({ "unexpected": true })).is_err());
    }
}
