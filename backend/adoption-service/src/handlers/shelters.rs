/// Shelter data handlers - proxies to the animal protection open data API
use crate::clients::{AnimalQuery, ShelterQuery};
use crate::error::{AppError, Result};
use crate::state::AppState;
use crate::utils::dates::{format_yyyymmdd, resolve_range};
use actix_web::{web, HttpResponse};
use chrono::Local;
use serde::Deserialize;
use validator::Validate;

const DEFAULT_ROWS: u32 = 20;

#[derive(Debug, Default, Deserialize, Validate)]
pub struct AnimalListQuery {
    /// Search start date, `YYYYMMDD`
    pub bgnde: Option<String>,
    /// Search end date, `YYYYMMDD`
    pub endde: Option<String>,
    /// Species code (417000 dog, 422400 cat, 429900 other)
    pub upkind: Option<String>,
    pub kind: Option<String>,
    pub upr_cd: Option<String>,
    pub org_cd: Option<String>,
    pub care_reg_no: Option<String>,
    /// notice / protect
    pub state: Option<String>,
    /// Y / N / U
    pub neuter_yn: Option<String>,
    #[serde(rename = "pageNo")]
    #[validate(range(min = 1, message = "pageNo must be at least 1"))]
    pub page_no: Option<u32>,
    #[serde(rename = "numOfRows")]
    #[validate(range(min = 1, max = 1000, message = "numOfRows must be between 1 and 1000"))]
    pub num_of_rows: Option<u32>,
}

impl AnimalListQuery {
    fn into_upstream(self) -> Result<AnimalQuery> {
        self.validate()?;
        let today = Local::now().date_naive();
        let (begin, end) = resolve_range(self.bgnde.as_deref(), self.endde.as_deref(), today)?;

        Ok(AnimalQuery {
            bgnde: format_yyyymmdd(begin),
            endde: format_yyyymmdd(end),
            upkind: non_blank(self.upkind),
            kind: non_blank(self.kind),
            upr_cd: non_blank(self.upr_cd),
            org_cd: non_blank(self.org_cd),
            care_reg_no: non_blank(self.care_reg_no),
            state: non_blank(self.state),
            neuter_yn: non_blank(self.neuter_yn),
            page_no: self.page_no.unwrap_or(1),
            num_of_rows: self.num_of_rows.unwrap_or(DEFAULT_ROWS),
        })
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct ShelterListQuery {
    pub care_reg_no: Option<String>,
    pub care_nm: Option<String>,
    #[serde(rename = "pageNo")]
    #[validate(range(min = 1, message = "pageNo must be at least 1"))]
    pub page_no: Option<u32>,
    #[serde(rename = "numOfRows")]
    #[validate(range(min = 1, max = 1000, message = "numOfRows must be between 1 and 1000"))]
    pub num_of_rows: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SigunguQuery {
    pub upr_cd: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct KindQuery {
    pub up_kind_cd: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>, name: &str) -> Result<String> {
    non_blank(value).ok_or_else(|| AppError::BadRequest(format!("{} is required", name)))
}

/// Abandoned animals, last 30 days unless bounded
pub async fn list_animals(
    state: web::Data<AppState>,
    query: web::Query<AnimalListQuery>,
) -> Result<HttpResponse> {
    let query = query.into_inner().into_upstream()?;
    let page = state.open_data.abandoned_animals(&query).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Abandoned animals held by the shelter behind a shelter-id token
pub async fn animals_by_token(
    state: web::Data<AppState>,
    token: web::Path<String>,
    query: web::Query<AnimalListQuery>,
) -> Result<HttpResponse> {
    let care_reg_no = state
        .shelter_tokens()?
        .decode(&token)
        .ok_or_else(|| AppError::BadRequest("invalid shelter token".to_string()))?;

    let mut query = query.into_inner().into_upstream()?;
    query.care_reg_no = Some(care_reg_no);

    let page = state.open_data.abandoned_animals(&query).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Shelter registry
pub async fn list_shelters(
    state: web::Data<AppState>,
    query: web::Query<ShelterListQuery>,
) -> Result<HttpResponse> {
    let query = query.into_inner();
    query.validate()?;

    let page = state
        .open_data
        .shelters(&ShelterQuery {
            care_reg_no: non_blank(query.care_reg_no),
            care_nm: non_blank(query.care_nm),
            page_no: query.page_no.unwrap_or(1),
            num_of_rows: query.num_of_rows.unwrap_or(DEFAULT_ROWS),
        })
        .await?;
    Ok(HttpResponse::Ok().json(page))
}

pub async fn list_sido(state: web::Data<AppState>) -> Result<HttpResponse> {
    let page = state.open_data.sido().await?;
    Ok(HttpResponse::Ok().json(page))
}

pub async fn list_sigungu(
    state: web::Data<AppState>,
    query: web::Query<SigunguQuery>,
) -> Result<HttpResponse> {
    let upr_cd = required(query.into_inner().upr_cd, "upr_cd")?;
    let page = state.open_data.sigungu(&upr_cd).await?;
    Ok(HttpResponse::Ok().json(page))
}

pub async fn list_kinds(
    state: web::Data<AppState>,
    query: web::Query<KindQuery>,
) -> Result<HttpResponse> {
    let up_kind_cd = required(query.into_inner().up_kind_cd, "up_kind_cd")?;
    let page = state.open_data.kinds(&up_kind_cd).await?;
    Ok(HttpResponse::Ok().json(page))
}
