use utoipa::OpenApi;

use crate::handler::{
    self,
    contact::{ContactRequest, ContactResponse},
    health::Health,
};

#[derive(OpenApi)]
#[openapi(
    paths(handler::health::health, handler::contact::contact),
    components(schemas(Health, ContactRequest, ContactResponse)),
    tags(
        (name = "health", description = "Health check"),
        (name = "contact", description = "Contact form relay")
    )
)]
pub struct ApiDoc;
