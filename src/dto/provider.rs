use serde::Deserialize;
use utoipa::IntoParams;
use validator::Validate;

use crate::dto::validation::validate_not_blank;

/// Query of `GET /{provider}/searchGame`.
#[derive(Debug, Default, Deserialize, IntoParams, Validate)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct SearchGameQuery {
    /// Title, or part of it, to search for.
    #[validate(custom(function = "validate_not_blank"))]
    pub title: String,
}

/// Query of the cover and screenshot endpoints.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(default, rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ImageQuery {
    /// Provider-side game identifier.
    pub game_id: Option<u64>,
    /// Provider-side platform identifier; required by MobyGames, ignored by IGDB.
    pub platform_id: Option<u64>,
}

/// Query of `GET /{provider}/searchGroup`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(default)]
#[into_params(parameter_in = Query)]
pub struct GroupQuery {
    /// Optional name filter; all groups are listed when absent.
    pub name: Option<String>,
}
