pub mod principal;

pub use principal::{CurrentPrincipal, PRINCIPAL_ID_HEADER};
