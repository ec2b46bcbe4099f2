use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::models::{Principal, Role};

/// Principal record pushed by the identity layer after credential exchange.
#[derive(Debug, Deserialize, Validate)]
pub struct UpsertPrincipalRequest {
    pub principal_id: Uuid,
    pub institution_id: Uuid,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct PrincipalResponse {
    pub principal_id: Uuid,
    pub institution_id: Uuid,
    pub email: String,
    pub role: Role,
}

impl From<Principal> for PrincipalResponse {
    fn from(p: Principal) -> Self {
        Self {
            principal_id: p.principal_id,
            institution_id: p.institution_id,
            email: p.email,
            role: p.role,
        }
    }
}
