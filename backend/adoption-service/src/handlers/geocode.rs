use crate::error::{AppError, Result};
use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ReverseGeocodeQuery {
    pub longitude: Option<String>,
    pub latitude: Option<String>,
}

fn coordinate(raw: Option<&str>, name: &str, bound: f64) -> Result<f64> {
    let raw = raw
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest(format!("{} is required", name)))?;

    let value: f64 = raw
        .parse()
        .map_err(|_| AppError::BadRequest(format!("{} must be a number", name)))?;
    if !value.is_finite() || value.abs() > bound {
        return Err(AppError::BadRequest(format!(
            "{} must be between -{} and {}",
            name, bound, bound
        )));
    }
    Ok(value)
}

/// Region codes for a coordinate, upstream document passed through
pub async fn reverse_geocode(
    state: web::Data<AppState>,
    query: web::Query<ReverseGeocodeQuery>,
) -> Result<HttpResponse> {
    let longitude = coordinate(query.longitude.as_deref(), "longitude", 180.0)?;
    let latitude = coordinate(query.latitude.as_deref(), "latitude", 90.0)?;

    let document = state.geocoding.reverse(longitude, latitude).await?;
    Ok(HttpResponse::Ok().json(document))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_parsing() {
        assert_eq!(coordinate(Some(" 126.978 "), "longitude", 180.0).unwrap(), 126.978);
        assert!(coordinate(None, "longitude", 180.0).is_err());
        assert!(coordinate(Some("east"), "longitude", 180.0).is_err());
        assert!(coordinate(Some("95"), "latitude", 90.0).is_err());
        assert!(coordinate(Some("NaN"), "latitude", 90.0).is_err());
    }
}
