//! Wire DTOs for the excerpt generator API.

use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ExcerptCreatedDto {
    pub(super) excerpt_identifier: Uuid,
}
