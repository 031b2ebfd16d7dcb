//! Resource services over the backend.
//!
//! Every operation returns a `FetchResult`: backend, decode and validation
//! failures are logged and flattened into an error message instead of being
//! propagated. Nothing here retries.

pub mod blogs;
pub mod catalog;
pub mod contact;
pub mod projects;
pub mod result;
pub mod resume;
pub mod skills;
pub mod storage;
pub mod table;

pub use blogs::BlogService;
pub use catalog::{AchievementsService, CatalogService, CertificationsService, ExperienceService};
pub use contact::ContactService;
pub use projects::ProjectService;
pub use result::FetchResult;
pub use resume::ResumeService;
pub use skills::SkillsService;
pub use storage::{is_valid_image, is_valid_pdf, StorageService, UploadFile, MAX_FILE_SIZE};
pub use table::{TableRow, TableService};
