mod policy;
mod validator;

pub use policy::{SqlOperation, BLOCKED_KEYWORDS, DEFAULT_ALLOWED_TABLES, DEFAULT_SCHEMA};
pub use validator::{strip_comments, validate, SqlGuardrail, ValidationResult};
