pub mod errors;
pub mod factory;
pub mod local;

pub use errors::AppError;
pub use factory::AppFactory;
pub use local::{AppLocal, LinkCreate, PageDraft, RankedLink, SaveOpts};
