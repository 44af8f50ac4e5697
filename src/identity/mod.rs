//! Brand identity request/response contract
//!
//! Holds the user input, the structured identity returned by the text model,
//! the logo artifact returned by the image model, and the schema the identity
//! response is checked against.

pub mod schema;
pub mod types;

pub use schema::{brand_identity_schema, parse_brand_identity, validate_against_schema};
pub use types::{
    BrandIdentity, ColorSwatch, GenerationInput, LogoArtifact, MarketPositioning, Typography,
};
